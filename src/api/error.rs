use thiserror::Error;

/// Failures talking to the remote order service.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RemoteError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("No credential available; request not sent")]
    Unauthenticated,
    #[error("Credential rejected (HTTP {status})")]
    Unauthorized { status: u16 },
    #[error("Request rejected: {0}")]
    Rejected(String),
    #[error("Server error (HTTP {status}): {message}")]
    Server { status: u16, message: String },
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Malformed response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        RemoteError::Transport(err.to_string())
    }
}
