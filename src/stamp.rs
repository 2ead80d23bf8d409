//! Content-hash invalidation of the generated header.
//!
//! By default the header is only regenerated when it is missing. With
//! [`InvalidationMode::ContentHash`] a small stamp next to the compiler build
//! records the SHA-256 of the schema the header was generated from, and a
//! mismatch triggers regeneration.

use std::io::Read;

use sha2::Digest;

use crate::error::PrebuildError;

/// File name of the stamp inside the build directory.
pub const STAMP_FILE: &str = ".schema-stamp";

/// How the build action decides the generated header is stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum InvalidationMode {
    /// Regenerate only when the header is missing.
    #[default]
    Existence,
    /// Also regenerate when the schema digest differs from the stamp.
    ContentHash,
}

/// Record of the schema a header was generated from, serialized with bincode.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SchemaStamp {
    /// Lowercase hex SHA-256 of the schema file.
    pub schema_digest: String,
    pub generated_at: chrono::DateTime<chrono::Utc>,
}

impl SchemaStamp {
    /// Creates a stamp for the current contents of `schema`.
    pub fn for_schema<P: AsRef<std::path::Path>>(schema: P) -> Result<Self, PrebuildError> {
        Ok(SchemaStamp {
            schema_digest: schema_digest(schema)?,
            generated_at: chrono::Utc::now(),
        })
    }

    /// Loads a stamp.
    ///
    /// A missing file yields `None`. A file that cannot be decoded also yields
    /// `None` (with a warning) so that a corrupt stamp simply forces regeneration.
    pub fn load<P: AsRef<std::path::Path>>(path: P) -> Result<Option<Self>, PrebuildError> {
        let path = path.as_ref();
        let data = match std::fs::read(path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(PrebuildError::StampIo { path: path.to_path_buf(), source }),
        };
        match bincode::deserialize(&data) {
            Ok(stamp) => Ok(Some(stamp)),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable schema stamp");
                Ok(None)
            }
        }
    }

    /// Writes the stamp, creating the parent directory when needed.
    pub fn store<P: AsRef<std::path::Path>>(&self, path: P) -> Result<(), PrebuildError> {
        let path = path.as_ref();
        let to_err = |source| PrebuildError::StampIo { path: path.to_path_buf(), source };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(to_err)?;
        }
        let data = bincode::serialize(self).map_err(|e| PrebuildError::Stamp {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        std::fs::write(path, data).map_err(to_err)?;
        Ok(())
    }
}

/// Hashes the schema file with SHA-256.
///
/// # Returns
/// * `Result<String, PrebuildError>` - 64-character lowercase hex digest.
///
/// # Errors
/// * `SchemaRead` naming the schema path if it cannot be opened or read.
pub fn schema_digest<P: AsRef<std::path::Path>>(schema: P) -> Result<String, PrebuildError> {
    let schema = schema.as_ref();
    let to_err = |source| PrebuildError::SchemaRead { path: schema.to_path_buf(), source };
    let mut file = std::fs::File::open(schema).map_err(to_err)?;
    let mut hasher = sha2::Sha256::new();
    let mut buffer = [0u8; 8192];
    loop {
        let read = file.read(&mut buffer).map_err(to_err)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

/// True when a stamp exists at `stamp_path` and matches the current schema.
pub fn is_fresh<P: AsRef<std::path::Path>, S: AsRef<std::path::Path>>(
    stamp_path: P,
    schema: S,
) -> Result<bool, PrebuildError> {
    let Some(stamp) = SchemaStamp::load(stamp_path)? else {
        return Ok(false);
    };
    Ok(stamp.schema_digest == schema_digest(schema)?)
}
