use crate::error::PrebuildError;
use crate::step;

/// The host build system as seen by the pre-build hook.
///
/// The host tells the hook which action is running and executes the external
/// steps for it. Execution is synchronous: `execute` returns only once the
/// step finished (or failed).
pub trait Host {
    fn is_clean_target(&self) -> bool;

    fn execute(&mut self, step: &step::Step) -> Result<(), PrebuildError>;

    /// Steps are reported but not run, so nothing should be recorded on disk.
    fn is_dry_run(&self) -> bool {
        false
    }
}

/// Host that runs steps as child processes of the current process.
///
/// Configure and build steps are spawned directly with inherited stdio, so the
/// tools' own output and diagnostics reach the terminal unchanged. The generate
/// step goes through `flatc_rust` pointed at the built compiler.
#[derive(Debug, Clone)]
pub struct ProcessHost {
    action: step::Action,
    dry_run: bool,
}

impl ProcessHost {
    pub fn new(action: step::Action) -> Self {
        ProcessHost { action, dry_run: false }
    }

    /// Print steps instead of running them.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    fn spawn(step: &step::Step) -> Result<(), PrebuildError> {
        let command = step.to_string();
        let status = std::process::Command::new(step.program())
            .args(step.args())
            .status()
            .map_err(|source| PrebuildError::Spawn { command: command.clone(), source })?;

        if status.success() {
            Ok(())
        } else {
            Err(PrebuildError::CommandFailed { command, code: status.code() })
        }
    }

    fn generate(
        step: &step::Step,
        flatc: &std::path::Path,
        lang: &str,
        out_dir: &std::path::Path,
        schema: &std::path::Path,
    ) -> Result<(), PrebuildError> {
        flatc_rust::Flatc::from_path(flatc)
            .run(flatc_rust::Args {
                lang,
                inputs: &[schema],
                out_dir,
                ..Default::default()
            })
            .map_err(|source| PrebuildError::Generate { command: step.to_string(), source })
    }
}

impl Host for ProcessHost {
    fn is_clean_target(&self) -> bool {
        self.action == step::Action::Clean
    }

    fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    fn execute(&mut self, step: &step::Step) -> Result<(), PrebuildError> {
        if self.dry_run {
            println!("[dry-run] {}", step);
            return Ok(());
        }

        tracing::info!(step = step.name(), command = %step, "running");
        match step {
            step::Step::Generate { flatc, lang, out_dir, schema } => {
                Self::generate(step, flatc, lang, out_dir, schema)
            }
            _ => Self::spawn(step),
        }
    }
}
