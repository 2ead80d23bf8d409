use crate::stamp;
use crate::step;

/// Structure representing command-line arguments.
#[derive(Debug)]
pub struct Args {
    pub clean: bool,
    pub root: std::path::PathBuf,
    pub config: Option<std::path::PathBuf>,
    pub jobs: Option<usize>,
    pub invalidate: stamp::InvalidationMode,
    pub dry_run: bool,
}

/// Command-line arguments parser using Clap.
///
/// The hook is normally wired into the firmware build as a pre-build command,
/// with `--clean` passed on clean targets.
impl Args {
    /// Parses the process arguments; exits with usage on error.
    pub fn parse() -> Self {
        Self::try_parse_from(std::env::args_os()).unwrap_or_else(|e| e.exit())
    }

    /// Parses an explicit argument list.
    ///
    /// # Errors
    /// * If arguments are missing or invalid.
    pub fn try_parse_from<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Ok(Self::from_matches(&command().try_get_matches_from(args)?))
    }

    /// The action selected on the command line.
    pub fn action(&self) -> step::Action {
        if self.clean { step::Action::Clean } else { step::Action::Build }
    }

    fn from_matches(matches: &clap::ArgMatches) -> Self {
        Args {
            clean: matches.get_flag("clean"),
            root: matches
                .get_one::<std::path::PathBuf>("root")
                .cloned()
                .unwrap_or_else(|| std::path::PathBuf::from(".")),
            config: matches.get_one::<std::path::PathBuf>("config").cloned(),
            jobs: matches.get_one::<usize>("jobs").cloned(),
            invalidate: matches
                .get_one::<stamp::InvalidationMode>("invalidate")
                .copied()
                .unwrap_or_default(),
            dry_run: matches.get_flag("dry-run"),
        }
    }
}

fn command() -> clap::Command {
    clap::Command::new("fbs-prebuild")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Build flatc and generate the weather API header before the firmware build")
        .arg(
            clap::Arg::new("clean")
                .short('c')
                .long("clean")
                .help("Remove the flatc build directory and the generated header")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("root")
                .short('C')
                .long("root")
                .help("Project root that relative paths are resolved against (default: current directory)")
                .num_args(1)
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(
            clap::Arg::new("config")
            .long("config")
            .help("TOML file overriding the default paths (default: <root>/fbs-prebuild.toml if present)")
            .num_args(1)
            .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(
            clap::Arg::new("jobs")
            .short('j')
            .long("jobs")
            .help("Parallel make jobs (default: unbounded)")
            .num_args(1)
            .value_parser(clap::builder::ValueParser::new(parse_usize_positive)),
        )
        .arg(
            clap::Arg::new("invalidate")
            .long("invalidate")
            .help("When to regenerate an existing header")
            .num_args(1)
            .value_parser(clap::builder::EnumValueParser::<stamp::InvalidationMode>::new())
            .conflicts_with("clean"),
        )
        .arg(
            clap::Arg::new("dry-run")
            .short('n')
            .long("dry-run")
            .help("Print the steps that would run without running them")
            .action(clap::ArgAction::SetTrue),
        )
}

/// Validates that the number of jobs is a positive integer.
///
/// # Arguments
/// * `s` - String representation of the number of jobs.
///
/// # Returns
/// * `Result<usize>` - Validated number of jobs.
fn parse_usize_positive(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("Must be a positive integer".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(format!("Not a valid number: {}", e)),
    }
}
