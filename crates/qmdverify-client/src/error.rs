use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Result type for qmdverify-client operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while talking to the qmd-check server
#[derive(Debug)]
pub enum Error {
    /// Local file could not be used for upload (detected before any request)
    Input { path: PathBuf, reason: String },

    /// Local file read failed
    Io { path: PathBuf, source: std::io::Error },

    /// Request could not be sent or the reply could not be read
    Transport(reqwest::Error),

    /// Non-success status without a decodable error body
    Http { status: u16 },

    /// Structured error body returned by the server
    Server(String),

    /// Job finished with status `error`
    JobFailed(String),

    /// Reply violates the job protocol (bad JSON, empty job id, unknown status, ...)
    Protocol(String),

    /// Polling gave up client-side after the deadline
    Timeout(Duration),
}

impl Error {
    pub fn input(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Error::Input {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn protocol(msg: impl Into<String>) -> Self {
        Error::Protocol(msg.into())
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Input { path, reason } => write!(f, "{}: {}", reason, path.display()),
            Error::Io { path, source } => {
                write!(f, "failed to read {}: {}", path.display(), source)
            }
            Error::Transport(err) => write!(f, "failed to send request: {}", err),
            Error::Http { status } => write!(f, "server returned status {}", status),
            Error::Server(msg) => write!(f, "server error: {}", msg),
            Error::JobFailed(msg) => write!(f, "{}", msg),
            Error::Protocol(msg) => write!(f, "protocol error: {}", msg),
            Error::Timeout(deadline) => {
                write!(f, "job polling timed out after {}s", deadline.as_secs())
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io { source, .. } => Some(source),
            Error::Transport(err) => Some(err),
            Error::Input { .. }
            | Error::Http { .. }
            | Error::Server(_)
            | Error::JobFailed(_)
            | Error::Protocol(_)
            | Error::Timeout(_) => None,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Transport(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Protocol(format!("failed to decode response: {}", err))
    }
}
