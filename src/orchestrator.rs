use crate::clean;
use crate::config;
use crate::error::PrebuildError;
use crate::host;
use crate::stamp;
use crate::step;
use crate::utils;

/// What a single invocation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub action: step::Action,
    /// Steps handed to the host, in execution order.
    pub executed: Vec<step::Step>,
    /// Artifacts deleted by a clean action.
    pub removed: Vec<(std::path::PathBuf, clean::Removed)>,
}

impl Report {
    fn new(action: step::Action) -> Self {
        Report { action, executed: Vec::new(), removed: Vec::new() }
    }

    /// True when the invocation touched nothing.
    pub fn is_noop(&self) -> bool {
        self.executed.is_empty() && self.removed.is_empty()
    }
}

/// Pre-build hook: keeps the flatc build and the generated header present.
///
/// The orchestrator holds no state between invocations; every decision is made
/// from what is on disk when [`Orchestrator::run`] is called.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    config: config::PrebuildConfig,
    jobs: utils::Jobs,
    invalidation: stamp::InvalidationMode,
}

impl Orchestrator {
    pub fn new(config: config::PrebuildConfig) -> Self {
        Orchestrator {
            config,
            jobs: utils::Jobs::Unbounded,
            invalidation: stamp::InvalidationMode::default(),
        }
    }

    pub fn jobs(mut self, jobs: utils::Jobs) -> Self {
        self.jobs = jobs;
        self
    }

    pub fn invalidation(mut self, mode: stamp::InvalidationMode) -> Self {
        self.invalidation = mode;
        self
    }

    pub fn config(&self) -> &config::PrebuildConfig {
        &self.config
    }

    /// Runs the action the host asks for.
    ///
    /// # Arguments
    /// * `host` - Supplies the action and executes external steps.
    ///
    /// # Returns
    /// * `Result<Report, PrebuildError>` - Steps run and paths removed.
    ///
    /// # Errors
    /// * The first failing step or removal. Later steps are not attempted.
    pub fn run(&self, host: &mut dyn host::Host) -> Result<Report, PrebuildError> {
        if host.is_clean_target() {
            self.clean()
        } else {
            self.build(host)
        }
    }

    fn clean(&self) -> Result<Report, PrebuildError> {
        let mut report = Report::new(step::Action::Clean);
        for path in self.config.clean_targets() {
            if let Some(kind) = clean::remove_artifact(path)? {
                report.removed.push((path.to_path_buf(), kind));
            }
        }
        Ok(report)
    }

    fn build(&self, host: &mut dyn host::Host) -> Result<Report, PrebuildError> {
        let mut report = Report::new(step::Action::Build);

        let flatc = self.config.flatc_path();
        if utils::is_executable(&flatc) {
            tracing::debug!(flatc = %flatc.display(), "compiler present, skipping cmake build");
        } else {
            self.execute(host, step::Step::configure(&self.config), &mut report)?;
            self.execute(host, step::Step::build(&self.config, self.jobs), &mut report)?;
        }

        if self.header_is_stale()? {
            self.execute(host, step::Step::generate(&self.config), &mut report)?;
            if self.invalidation == stamp::InvalidationMode::ContentHash && !host.is_dry_run() {
                stamp::SchemaStamp::for_schema(&self.config.schema)?.store(self.config.stamp_path())?;
            }
        } else {
            tracing::debug!(header = %self.config.header.display(), "header up to date");
        }

        Ok(report)
    }

    fn header_is_stale(&self) -> Result<bool, PrebuildError> {
        if !self.config.header.exists() {
            return Ok(true);
        }
        match self.invalidation {
            stamp::InvalidationMode::Existence => Ok(false),
            stamp::InvalidationMode::ContentHash => {
                let fresh = stamp::is_fresh(self.config.stamp_path(), &self.config.schema)?;
                if !fresh {
                    tracing::info!(schema = %self.config.schema.display(), "schema changed since last generation");
                }
                Ok(!fresh)
            }
        }
    }

    fn execute(
        &self,
        host: &mut dyn host::Host,
        step: step::Step,
        report: &mut Report,
    ) -> Result<(), PrebuildError> {
        host.execute(&step)?;
        report.executed.push(step);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{RecordingHost, write_executable};

    struct Project {
        _dir: tempfile::TempDir,
        config: config::PrebuildConfig,
    }

    fn project() -> Project {
        let dir = tempfile::tempdir().unwrap();
        let config = config::PrebuildConfig::default().rooted(dir.path());
        std::fs::create_dir_all(config.schema.parent().unwrap()).unwrap();
        std::fs::write(&config.schema, "table Forecast { temp: float; }\nroot_type Forecast;\n").unwrap();
        Project { _dir: dir, config }
    }

    fn with_compiler(project: &Project) {
        write_executable(&project.config.flatc_path()).unwrap();
    }

    fn with_header(project: &Project) {
        std::fs::create_dir_all(&project.config.out_dir).unwrap();
        std::fs::write(&project.config.header, "// generated\n").unwrap();
    }

    #[test]
    fn clean_removes_present_artifacts() {
        let project = project();
        with_compiler(&project);
        with_header(&project);

        let mut host = RecordingHost::new(step::Action::Clean);
        let report = Orchestrator::new(project.config.clone()).run(&mut host).unwrap();

        assert!(!project.config.build_dir.exists());
        assert!(!project.config.header.exists());
        assert!(host.executed.is_empty());
        assert_eq!(
            report.removed,
            vec![
                (project.config.build_dir.clone(), clean::Removed::Directory),
                (project.config.header.clone(), clean::Removed::File),
            ]
        );
    }

    #[test]
    fn clean_without_artifacts_is_a_no_op() {
        let project = project();
        let mut host = RecordingHost::new(step::Action::Clean);

        let report = Orchestrator::new(project.config.clone()).run(&mut host).unwrap();
        assert!(report.is_noop());
        assert_eq!(report.action, step::Action::Clean);
    }

    #[test]
    fn fresh_tree_runs_configure_build_generate_in_order() {
        let project = project();
        let mut host = RecordingHost::new(step::Action::Build);

        let report = Orchestrator::new(project.config.clone()).run(&mut host).unwrap();

        assert_eq!(host.names(), vec!["configure", "build", "generate"]);
        assert_eq!(report.executed, host.executed);
        assert!(project.config.header.exists());
    }

    #[test]
    fn everything_present_runs_nothing() {
        let project = project();
        with_compiler(&project);
        with_header(&project);

        let mut host = RecordingHost::new(step::Action::Build);
        let report = Orchestrator::new(project.config.clone()).run(&mut host).unwrap();

        assert!(host.executed.is_empty());
        assert!(report.is_noop());
    }

    #[test]
    fn compiler_present_header_missing_only_generates() {
        let project = project();
        with_compiler(&project);

        let mut host = RecordingHost::new(step::Action::Build);
        Orchestrator::new(project.config.clone()).run(&mut host).unwrap();

        assert_eq!(host.names(), vec!["generate"]);
    }

    #[test]
    fn header_present_compiler_missing_only_builds_compiler() {
        let project = project();
        with_header(&project);

        let mut host = RecordingHost::new(step::Action::Build);
        Orchestrator::new(project.config.clone()).run(&mut host).unwrap();

        assert_eq!(host.names(), vec!["configure", "build"]);
    }

    #[cfg(unix)]
    #[test]
    fn non_executable_compiler_is_rebuilt() {
        use std::os::unix::fs::PermissionsExt;

        let project = project();
        with_compiler(&project);
        with_header(&project);
        let flatc = project.config.flatc_path();
        std::fs::set_permissions(&flatc, std::fs::Permissions::from_mode(0o644)).unwrap();

        let mut host = RecordingHost::new(step::Action::Build);
        Orchestrator::new(project.config.clone()).run(&mut host).unwrap();

        assert_eq!(host.names(), vec!["configure", "build"]);
    }

    #[test]
    fn second_build_is_idempotent() {
        let project = project();
        let orchestrator = Orchestrator::new(project.config.clone());

        let mut first = RecordingHost::new(step::Action::Build);
        orchestrator.run(&mut first).unwrap();
        assert_eq!(first.executed.len(), 3);

        let mut second = RecordingHost::new(step::Action::Build);
        let report = orchestrator.run(&mut second).unwrap();
        assert!(second.executed.is_empty());
        assert!(report.is_noop());
    }

    #[test]
    fn failing_configure_stops_the_run() {
        let project = project();
        let mut host = RecordingHost::new(step::Action::Build).failing_on("configure");

        let err = Orchestrator::new(project.config.clone()).run(&mut host).unwrap_err();

        assert!(matches!(err, PrebuildError::CommandFailed { code: Some(2), .. }));
        assert_eq!(host.names(), vec!["configure"]);
        assert!(!project.config.header.exists());
    }

    #[test]
    fn build_step_receives_job_limit() {
        let project = project();
        let mut host = RecordingHost::new(step::Action::Build);

        Orchestrator::new(project.config.clone())
            .jobs(utils::Jobs::Limited(2))
            .run(&mut host)
            .unwrap();

        match &host.executed[1] {
            step::Step::Build { jobs, .. } => assert_eq!(*jobs, utils::Jobs::Limited(2)),
            other => panic!("expected build step, got {:?}", other),
        }
    }

    #[test]
    fn existence_mode_ignores_schema_changes() {
        let project = project();
        let orchestrator = Orchestrator::new(project.config.clone());
        orchestrator.run(&mut RecordingHost::new(step::Action::Build)).unwrap();

        std::fs::write(&project.config.schema, "table Forecast { temp: double; }\n").unwrap();

        let mut host = RecordingHost::new(step::Action::Build);
        orchestrator.run(&mut host).unwrap();
        assert!(host.executed.is_empty());
    }

    #[test]
    fn content_hash_mode_regenerates_on_schema_change() {
        let project = project();
        let orchestrator = Orchestrator::new(project.config.clone())
            .invalidation(stamp::InvalidationMode::ContentHash);

        orchestrator.run(&mut RecordingHost::new(step::Action::Build)).unwrap();
        assert!(project.config.stamp_path().exists());

        let mut unchanged = RecordingHost::new(step::Action::Build);
        orchestrator.run(&mut unchanged).unwrap();
        assert!(unchanged.executed.is_empty());

        std::fs::write(&project.config.schema, "table Forecast { temp: double; }\n").unwrap();
        let mut changed = RecordingHost::new(step::Action::Build);
        orchestrator.run(&mut changed).unwrap();
        assert_eq!(changed.names(), vec!["generate"]);
    }

    #[test]
    fn content_hash_mode_without_stamp_regenerates_existing_header() {
        let project = project();
        with_compiler(&project);
        with_header(&project);

        let mut host = RecordingHost::new(step::Action::Build);
        Orchestrator::new(project.config.clone())
            .invalidation(stamp::InvalidationMode::ContentHash)
            .run(&mut host)
            .unwrap();

        assert_eq!(host.names(), vec!["generate"]);
        assert!(project.config.stamp_path().exists());
    }

    #[test]
    fn content_hash_mode_with_missing_schema_names_it() {
        let project = project();
        let orchestrator = Orchestrator::new(project.config.clone())
            .invalidation(stamp::InvalidationMode::ContentHash);
        orchestrator.run(&mut RecordingHost::new(step::Action::Build)).unwrap();

        std::fs::remove_file(&project.config.schema).unwrap();

        let mut host = RecordingHost::new(step::Action::Build);
        let err = orchestrator.run(&mut host).unwrap_err();
        assert!(matches!(err, PrebuildError::SchemaRead { ref path, .. } if path == &project.config.schema));
        assert!(err.to_string().contains("weather_api.fbs"));
        assert!(host.executed.is_empty());
    }

    #[test]
    fn dry_run_does_not_write_stamp() {
        let project = project();
        with_compiler(&project);

        let mut host = host::ProcessHost::new(step::Action::Build).dry_run(true);
        let report = Orchestrator::new(project.config.clone())
            .invalidation(stamp::InvalidationMode::ContentHash)
            .run(&mut host)
            .unwrap();

        assert_eq!(report.executed.len(), 1);
        assert!(!project.config.stamp_path().exists());
        assert!(!project.config.header.exists());
    }

    #[test]
    fn clean_also_drops_the_stamp() {
        let project = project();
        let orchestrator = Orchestrator::new(project.config.clone())
            .invalidation(stamp::InvalidationMode::ContentHash);
        orchestrator.run(&mut RecordingHost::new(step::Action::Build)).unwrap();

        orchestrator.run(&mut RecordingHost::new(step::Action::Clean)).unwrap();
        assert!(!project.config.stamp_path().exists());
    }
}
