//! Gateway error model.

use thiserror::Error;

/// Result type used across the gateway.
pub type GovmResult<T> = Result<T, GovmError>;

/// Closed set of failure classes. The HTTP layer maps each one to a status.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Invocation,
    Io,
    Unrecoverable,
}

#[derive(Debug, Error)]
pub enum GovmError {
    /// Settings could not be loaded. Only raised at startup.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The external tool exited non-zero. `output` is whatever it printed.
    #[error("{output} ({code})")]
    Invocation { output: String, code: i32 },

    /// Spawning the tool, or writing to a client, failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A handler panicked.
    #[error("unrecoverable fault: {0}")]
    Unrecoverable(String),
}

impl GovmError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn invocation(output: impl Into<String>, code: i32) -> Self {
        Self::Invocation {
            output: output.into(),
            code,
        }
    }

    pub fn unrecoverable(msg: impl Into<String>) -> Self {
        Self::Unrecoverable(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::Invocation { .. } => ErrorKind::Invocation,
            Self::Io(_) => ErrorKind::Io,
            Self::Unrecoverable(_) => ErrorKind::Unrecoverable,
        }
    }
}
