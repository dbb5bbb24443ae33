//! Error types for the command pipeline.
//!
//! Every failure is classified into one of two kinds:
//! - [`ErrorKind::User`]: the input was not actionable. The message is shown
//!   verbatim to the invoking user with a success status.
//! - [`ErrorKind::Service`]: something broke on our side or upstream. The
//!   detail is logged and the caller only sees a generic failure.

use thiserror::Error;

/// Which side of the conversation an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input from the user (malformed arguments, unknown spell, ...).
    User,
    /// Internal, network or upstream fault.
    Service,
}

/// Errors that can occur while handling a slash command.
#[derive(Error, Debug)]
pub enum ActionError {
    /// The raw request body could not be decoded.
    #[error("{0}")]
    Decode(String),

    /// The command is not one of the known actions.
    #[error("unknown request type '{command}'. Only [/roll, /spell] are accepted")]
    UnknownCommand {
        /// The command as received, without the leading slash.
        command: String,
    },

    /// The command arguments do not have the expected shape.
    #[error("{0}")]
    InvalidArguments(String),

    /// The upstream source has no entry for the requested spell.
    #[error("the spell '{name}' was not found. Are you sure you spelled it correctly?")]
    SpellNotFound {
        /// The query text as the user typed it (not slugged).
        name: String,
    },

    /// Network/HTTP error talking to an upstream service.
    #[error("Network error: {0}")]
    Network(String),

    /// Upstream request timed out.
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// Upstream answered with an unexpected status.
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Upstream payload could not be parsed.
    #[error("Invalid upstream payload: {0}")]
    InvalidPayload(String),

    /// One or more fields could not be extracted from the upstream document.
    #[error("failed to find attributes for: [{}]", .0.join(", "))]
    MissingFields(Vec<String>),

    /// The response could not be serialized.
    #[error("JSON error: {0}")]
    Json(String),

    /// Configuration error (missing or invalid config).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ActionError {
    /// Classify the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Decode(_)
            | Self::UnknownCommand { .. }
            | Self::InvalidArguments(_)
            | Self::SpellNotFound { .. } => ErrorKind::User,
            Self::Network(_)
            | Self::Timeout(_)
            | Self::Upstream(_)
            | Self::InvalidPayload(_)
            | Self::MissingFields(_)
            | Self::Json(_)
            | Self::Config(_)
            | Self::Internal(_) => ErrorKind::Service,
        }
    }

    /// Whether the message may be shown to the end user.
    pub fn is_user_facing(&self) -> bool {
        self.kind() == ErrorKind::User
    }
}

impl From<reqwest::Error> for ActionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ActionError::Timeout(err.to_string())
        } else if err.is_connect() {
            ActionError::Network(format!("Connection failed: {}", err))
        } else if err.is_decode() {
            ActionError::InvalidPayload(err.to_string())
        } else {
            ActionError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ActionError {
    fn from(err: serde_json::Error) -> Self {
        ActionError::Json(err.to_string())
    }
}

/// Result type for pipeline operations.
pub type ActionResult<T> = std::result::Result<T, ActionError>;
