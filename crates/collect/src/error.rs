use std::path::PathBuf;

/// Errors from the I/O collaborators. Propagated as-is, never retried.
#[derive(Debug, thiserror::Error)]
pub enum CollectError {
    #[error("command `{program}` failed: {reason}")]
    Command { program: String, reason: String },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CollectError {
    pub(crate) fn command(program: &str, reason: impl Into<String>) -> Self {
        Self::Command {
            program: program.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
