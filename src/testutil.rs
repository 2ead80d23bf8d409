//! Test doubles shared by unit tests.

use crate::error::PrebuildError;
use crate::host::Host;
use crate::step::{Action, Step};

/// Host that records the steps it is asked to run.
///
/// With `simulate` set, each step leaves behind what the real tool would:
/// configure creates the build directory, build drops an executable compiler
/// into it, and generate writes `<out_dir>/<schema stem>_generated.h`.
pub struct RecordingHost {
    pub action: Action,
    pub executed: Vec<Step>,
    pub simulate: bool,
    pub fail_on: Option<&'static str>,
}

impl RecordingHost {
    pub fn new(action: Action) -> Self {
        RecordingHost { action, executed: Vec::new(), simulate: true, fail_on: None }
    }

    pub fn failing_on(mut self, step_name: &'static str) -> Self {
        self.fail_on = Some(step_name);
        self
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.executed.iter().map(Step::name).collect()
    }
}

impl Host for RecordingHost {
    fn is_clean_target(&self) -> bool {
        self.action == Action::Clean
    }

    fn execute(&mut self, step: &Step) -> Result<(), PrebuildError> {
        self.executed.push(step.clone());
        if self.fail_on == Some(step.name()) {
            return Err(PrebuildError::CommandFailed { command: step.to_string(), code: Some(2) });
        }
        if !self.simulate {
            return Ok(());
        }

        match step {
            Step::Configure { build_dir, .. } => std::fs::create_dir_all(build_dir)?,
            Step::Build { build_dir, target, .. } => {
                std::fs::create_dir_all(build_dir)?;
                let bin = build_dir.join(format!("{}{}", target, std::env::consts::EXE_SUFFIX));
                write_executable(&bin)?;
            }
            Step::Generate { out_dir, schema, .. } => {
                std::fs::create_dir_all(out_dir)?;
                let stem = schema.file_stem().and_then(|s| s.to_str()).unwrap_or("schema");
                std::fs::write(out_dir.join(format!("{}_generated.h", stem)), "// generated\n")?;
            }
        }
        Ok(())
    }
}

/// Writes a stand-in compiler binary with the executable bit set.
pub fn write_executable(path: &std::path::Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, "#!/bin/sh\nexit 0\n")?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))?;
    }
    Ok(())
}
