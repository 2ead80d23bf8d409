use crate::error::PrebuildError;

/// Kind of artifact that was removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removed {
    File,
    Directory,
}

/// Removes a generated artifact if it is there.
///
/// Regular files are deleted, directories are deleted recursively, and
/// anything else (including a missing path) is left alone. `Removing <path>`
/// is printed before each deletion.
///
/// # Arguments
/// * `path` - Artifact to remove.
///
/// # Returns
/// * `Ok(Some(Removed))` - What was deleted.
/// * `Ok(None)` - Nothing was there.
///
/// # Errors
/// * `PrebuildError::Remove` if the deletion itself fails.
pub fn remove_artifact<P: AsRef<std::path::Path>>(path: P) -> Result<Option<Removed>, PrebuildError> {
    let path = path.as_ref();
    let to_err = |source| PrebuildError::Remove { path: path.to_path_buf(), source };

    if path.is_file() {
        println!("Removing {}", path.display());
        std::fs::remove_file(path).map_err(to_err)?;
        Ok(Some(Removed::File))
    } else if path.is_dir() {
        println!("Removing {}", path.display());
        std::fs::remove_dir_all(path).map_err(to_err)?;
        Ok(Some(Removed::Directory))
    } else {
        tracing::debug!(path = %path.display(), "nothing to remove");
        Ok(None)
    }
}
