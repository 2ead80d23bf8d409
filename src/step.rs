use crate::config;
use crate::utils;

/// Which action the host build system asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Clean,
    Build,
}

/// One external tool invocation performed by the build action.
///
/// Steps are plain data: they carry the resolved program and paths, and the
/// [`crate::host::Host`] decides how to run them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Configure the FlatBuffers project out-of-source.
    Configure {
        program: String,
        generator: String,
        build_type: String,
        source_dir: std::path::PathBuf,
        build_dir: std::path::PathBuf,
    },
    /// Build only the compiler target inside the build directory.
    Build {
        program: String,
        target: String,
        build_dir: std::path::PathBuf,
        jobs: utils::Jobs,
    },
    /// Run the freshly built (or previously built) compiler on the schema.
    Generate {
        flatc: std::path::PathBuf,
        lang: String,
        out_dir: std::path::PathBuf,
        schema: std::path::PathBuf,
    },
}

impl Step {
    pub fn configure(config: &config::PrebuildConfig) -> Self {
        Step::Configure {
            program: config.cmake.clone(),
            generator: config.generator.clone(),
            build_type: config.build_type.clone(),
            source_dir: config.flatbuffers_dir.clone(),
            build_dir: config.build_dir.clone(),
        }
    }

    pub fn build(config: &config::PrebuildConfig, jobs: utils::Jobs) -> Self {
        Step::Build {
            program: config.make.clone(),
            target: config.target.clone(),
            build_dir: config.build_dir.clone(),
            jobs,
        }
    }

    pub fn generate(config: &config::PrebuildConfig) -> Self {
        Step::Generate {
            flatc: config.flatc_path(),
            lang: config.lang.clone(),
            out_dir: config.out_dir.clone(),
            schema: config.schema.clone(),
        }
    }

    /// Short label used in progress output.
    pub fn name(&self) -> &'static str {
        match self {
            Step::Configure { .. } => "configure",
            Step::Build { .. } => "build",
            Step::Generate { .. } => "generate",
        }
    }

    /// Program to spawn.
    pub fn program(&self) -> std::ffi::OsString {
        match self {
            Step::Configure { program, .. } | Step::Build { program, .. } => program.into(),
            Step::Generate { flatc, .. } => flatc.as_os_str().to_os_string(),
        }
    }

    /// Arguments passed to [`Step::program`], in order.
    ///
    /// Generate arguments follow the order `flatc_rust::Flatc::run` emits
    /// (language flag, then `-o`, then inputs), so logs and dry runs show the
    /// command that actually runs.
    ///
    /// # Example
    /// ```text
    /// cmake -G "Unix Makefiles" -DCMAKE_BUILD_TYPE=Release -S extra_lib/flatbuffers -B build_flatbuffers
    /// make flatc -C build_flatbuffers -j
    /// build_flatbuffers/flatc --cpp -o include extra_lib/open-meteo-sdk/flatbuffers/weather_api.fbs
    /// ```
    pub fn args(&self) -> Vec<std::ffi::OsString> {
        match self {
            Step::Configure { generator, build_type, source_dir, build_dir, .. } => vec![
                "-G".into(),
                generator.into(),
                format!("-DCMAKE_BUILD_TYPE={}", build_type).into(),
                "-S".into(),
                source_dir.as_os_str().to_os_string(),
                "-B".into(),
                build_dir.as_os_str().to_os_string(),
            ],
            Step::Build { target, build_dir, jobs, .. } => vec![
                target.into(),
                "-C".into(),
                build_dir.as_os_str().to_os_string(),
                jobs.make_flag().into(),
            ],
            Step::Generate { lang, out_dir, schema, .. } => vec![
                format!("--{}", lang).into(),
                "-o".into(),
                out_dir.as_os_str().to_os_string(),
                schema.as_os_str().to_os_string(),
            ],
        }
    }
}

/// Renders the step as a shell-style command line.
impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", quote(&self.program().to_string_lossy()))?;
        for arg in self.args() {
            write!(f, " {}", quote(&arg.to_string_lossy()))?;
        }
        Ok(())
    }
}

fn quote(word: &str) -> std::borrow::Cow<'_, str> {
    if word.is_empty() || word.chars().any(|c| c.is_whitespace() || c == '"') {
        std::borrow::Cow::Owned(format!("\"{}\"", word.replace('"', "\\\"")))
    } else {
        std::borrow::Cow::Borrowed(word)
    }
}
