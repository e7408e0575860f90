//! Error types for the phone tracker client

/// Result type alias for tracker operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when talking to the lookup backend
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Submission attempted with a blank phone number
    #[error("Phone number is empty")]
    EmptyPhoneNumber,

    /// Controller task is gone
    #[error("Form controller is not running")]
    ControllerClosed,

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a generic error from a string
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}

/// User-facing failure classes of a flow.
///
/// Only the message of a [`FlowError::UserInput`] or
/// [`FlowError::Application`] ever reaches the screen. Transport failures are
/// replaced by a fixed message and the detail goes to the log.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlowError {
    #[error("{0}")]
    UserInput(String),

    #[error("{0}")]
    Application(String),

    #[error("transport failure: {0}")]
    Transport(String),
}

impl From<&Error> for FlowError {
    fn from(err: &Error) -> Self {
        match err {
            Error::EmptyPhoneNumber => FlowError::UserInput(err.to_string()),
            other => FlowError::Transport(other.to_string()),
        }
    }
}
