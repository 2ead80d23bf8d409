/// Parallelism requested from `make`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Jobs {
    /// Bare `-j`: let make start as many jobs as it likes.
    Unbounded,
    /// `-jN`.
    Limited(usize),
}

impl Jobs {
    pub fn make_flag(&self) -> String {
        match self {
            Jobs::Unbounded => "-j".to_string(),
            Jobs::Limited(n) => format!("-j{}", n),
        }
    }
}

/// Resolves the requested job count against the machine.
///
/// `None` keeps make's unbounded `-j`. A requested count above the number of
/// logical CPUs is clamped, with a warning. Zero is rejected.
///
/// # Arguments
/// * `requested` - Job count from the command line, if any.
///
/// # Returns
/// * `anyhow::Result<Jobs>` - The effective parallelism for the build step.
pub fn resolve_jobs(requested: Option<usize>) -> anyhow::Result<Jobs> {
    match requested {
        Some(n) if n > 0 => {
            let max_jobs = num_cpus::get();
            if n > max_jobs {
                tracing::warn!(requested = n, max = max_jobs, "limiting make jobs to available CPUs");
                println!("⚠️ Warning: Limiting job count to {} (max available)", max_jobs);
                Ok(Jobs::Limited(max_jobs))
            } else {
                Ok(Jobs::Limited(n))
            }
        }
        Some(_) => Err(anyhow::anyhow!("Number of jobs must be a positive integer")),
        None => Ok(Jobs::Unbounded),
    }
}

/// Checks whether `path` is a regular file with an execute bit set.
///
/// Any of the owner, group or other bits counts; the current user's access is
/// not checked. On non-Unix platforms any regular file counts.
pub fn is_executable<P: AsRef<std::path::Path>>(path: P) -> bool {
    let Ok(metadata) = std::fs::metadata(path.as_ref()) else {
        return false;
    };
    if !metadata.is_file() {
        return false;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        metadata.permissions().mode() & 0o111 != 0
    }

    #[cfg(not(unix))]
    {
        true
    }
}

/// Formats a UTC timestamp as `YYYYMMDD HHMMSS` for progress output.
pub fn format_timestamp(ts: &chrono::DateTime<chrono::Utc>) -> String {
    ts.format("%Y%m%d %H%M%S").to_string()
}
