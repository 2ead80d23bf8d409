/// Errors raised while running the pre-build hook.
///
/// External tool failures are reported as values so the caller (the binary
/// entry point, or any other host integration) decides whether the surrounding
/// build aborts.
#[derive(Debug, thiserror::Error)]
pub enum PrebuildError {
    #[error("command `{command}` failed with {}", exit_code_label(.code))]
    CommandFailed { command: String, code: Option<i32> },

    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("flatc generation `{command}` failed: {source}")]
    Generate {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to remove '{}': {source}", .path.display())]
    Remove {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read config '{}': {source}", .path.display())]
    ConfigRead {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config '{}': {source}", .path.display())]
    ConfigParse {
        path: std::path::PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to read schema '{}': {source}", .path.display())]
    SchemaRead {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to access schema stamp '{}': {source}", .path.display())]
    StampIo {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("schema stamp '{}': {message}", .path.display())]
    Stamp {
        path: std::path::PathBuf,
        message: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn exit_code_label(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("exit code {}", c),
        None => "no exit code (terminated by signal)".to_string(),
    }
}
