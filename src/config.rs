use crate::error::PrebuildError;

/// Name of the optional override file looked up in the project root.
pub const DEFAULT_CONFIG_FILE: &str = "fbs-prebuild.toml";

/// Paths and tool settings used by the pre-build hook.
///
/// Every field has a default matching the firmware project's layout, so a
/// project without an `fbs-prebuild.toml` gets the fixed behaviour:
/// build `flatc` out of `extra_lib/flatbuffers` into `build_flatbuffers`, then
/// generate `include/weather_api_generated.h` from the open-meteo schema.
///
/// Relative paths are interpreted against the project root, see [`PrebuildConfig::rooted`].
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PrebuildConfig {
    /// FlatBuffers source tree (cmake `-S`).
    pub flatbuffers_dir: std::path::PathBuf,
    /// Out-of-source build directory (cmake `-B`); removed on clean.
    pub build_dir: std::path::PathBuf,
    /// Generated header; removed on clean.
    pub header: std::path::PathBuf,
    /// Schema fed to flatc.
    pub schema: std::path::PathBuf,
    /// Directory flatc writes into (`-o`).
    pub out_dir: std::path::PathBuf,
    /// flatc output language flag, without the leading `--`.
    pub lang: String,
    pub cmake: String,
    pub make: String,
    pub generator: String,
    pub build_type: String,
    /// Make target that produces the compiler binary.
    pub target: String,
}

impl Default for PrebuildConfig {
    fn default() -> Self {
        PrebuildConfig {
            flatbuffers_dir: std::path::PathBuf::from("extra_lib/flatbuffers"),
            build_dir: std::path::PathBuf::from("build_flatbuffers"),
            header: std::path::PathBuf::from("include/weather_api_generated.h"),
            schema: std::path::PathBuf::from("extra_lib/open-meteo-sdk/flatbuffers/weather_api.fbs"),
            out_dir: std::path::PathBuf::from("include"),
            lang: "cpp".to_string(),
            cmake: "cmake".to_string(),
            make: "make".to_string(),
            generator: "Unix Makefiles".to_string(),
            build_type: "Release".to_string(),
            target: "flatc".to_string(),
        }
    }
}

impl PrebuildConfig {
    /// Loads a configuration from a TOML file.
    ///
    /// Keys missing from the file keep their defaults; unknown keys are rejected.
    ///
    /// # Arguments
    /// * `path` - Path to the TOML file.
    ///
    /// # Returns
    /// * `Result<PrebuildConfig, PrebuildError>` - Parsed configuration.
    ///
    /// # Errors
    /// * `ConfigRead` if the file cannot be read.
    /// * `ConfigParse` if the content is not valid for this schema.
    pub fn load<P: AsRef<std::path::Path>>(path: P) -> Result<Self, PrebuildError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| PrebuildError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| PrebuildError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Resolves the configuration for a project root.
    ///
    /// An explicit `config` path is always loaded (and must exist). Otherwise
    /// `<root>/fbs-prebuild.toml` is used when present, and the defaults when not.
    pub fn discover<P: AsRef<std::path::Path>>(
        root: P,
        config: Option<&std::path::Path>,
    ) -> Result<Self, PrebuildError> {
        match config {
            Some(path) => Self::load(path),
            None => {
                let candidate = root.as_ref().join(DEFAULT_CONFIG_FILE);
                if candidate.is_file() {
                    tracing::debug!(path = %candidate.display(), "loading project config");
                    Self::load(candidate)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Returns a copy with every relative path joined onto `root`.
    ///
    /// Absolute paths are left untouched.
    pub fn rooted<P: AsRef<std::path::Path>>(&self, root: P) -> Self {
        let root = root.as_ref();
        let join = |p: &std::path::Path| {
            if p.is_absolute() { p.to_path_buf() } else { root.join(p) }
        };
        PrebuildConfig {
            flatbuffers_dir: join(&self.flatbuffers_dir),
            build_dir: join(&self.build_dir),
            header: join(&self.header),
            schema: join(&self.schema),
            out_dir: join(&self.out_dir),
            ..self.clone()
        }
    }

    /// Path of the compiler binary inside the build directory.
    pub fn flatc_path(&self) -> std::path::PathBuf {
        self.build_dir
            .join(format!("{}{}", self.target, std::env::consts::EXE_SUFFIX))
    }

    /// Path of the schema stamp used by content-hash invalidation.
    pub fn stamp_path(&self) -> std::path::PathBuf {
        self.build_dir.join(crate::stamp::STAMP_FILE)
    }

    /// Artifacts removed by the clean action, in removal order.
    pub fn clean_targets(&self) -> [&std::path::Path; 2] {
        [self.build_dir.as_path(), self.header.as_path()]
    }
}
