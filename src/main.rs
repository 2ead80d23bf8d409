use anyhow::Context;

mod cli;
mod clean;
mod config;
mod error;
mod host;
mod orchestrator;
mod stamp;
mod step;
mod utils;

#[cfg(test)]
mod testutil;

/// Main entry point of the pre-build hook.
///
/// This function orchestrates one host build action:
/// 1. Parses command-line arguments.
/// 2. Resolves the project configuration against the project root.
/// 3. Runs the clean or build action through a process-spawning host.
/// 4. Turns a failed step into a non-zero exit so the firmware build aborts.
///
/// # Returns
///
/// * `anyhow::Result<()>` - Success or the first failing step.
fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .without_time()
        .init();

    let total_start = std::time::Instant::now();
    let args = cli::Args::parse();

    let config = config::PrebuildConfig::discover(&args.root, args.config.as_deref())
        .context("Failed to load fbs-prebuild configuration")?
        .rooted(&args.root);
    let jobs = utils::resolve_jobs(args.jobs)?;

    let orchestrator = orchestrator::Orchestrator::new(config)
        .jobs(jobs)
        .invalidation(args.invalidate);
    let mut host = host::ProcessHost::new(args.action()).dry_run(args.dry_run);

    let report = orchestrator
        .run(&mut host)
        .with_context(|| format!("Pre-build {:?} action failed", args.action()))?;

    if report.is_noop() {
        match report.action {
            step::Action::Clean => println!("✅ Nothing to clean"),
            step::Action::Build => {
                println!("✅ {} up to date", orchestrator.config().header.display())
            }
        }
    } else if !args.dry_run {
        for step in &report.executed {
            println!("✅ {} finished", step.name());
        }
        println!(
            "✅ Pre-build {:?} completed at {} in {:?} seconds",
            report.action,
            utils::format_timestamp(&chrono::Utc::now()),
            total_start.elapsed().as_secs_f64()
        );
    }
    Ok(())
}
