use thiserror::Error;

/// Result type for SmartTub operations
pub type Result<T> = std::result::Result<T, SmartTubError>;

/// Errors that can occur when talking to the SmartTub service
#[derive(Error, Debug)]
pub enum SmartTubError {
    /// The identity provider rejected the username/password exchange
    #[error("Login failed: {0}")]
    LoginFailed(String),

    /// An authenticated call was made before `login`
    #[error("Not logged in")]
    NotAuthenticated,

    /// The API (or the token endpoint during a refresh) answered with a
    /// non-2xx status, or the transport failed before a status was received
    #[error("API error{}: {detail}", http_status_suffix(.status))]
    ApiError {
        /// HTTP status, absent for connection-level failures
        status: Option<u16>,
        /// Response body or transport failure description
        detail: String,
    },

    /// A payload could not be projected onto the typed model
    #[error("Failed to decode {field}: {detail}")]
    Decode {
        /// Vendor key (and attribute) or payload part that failed
        field: String,
        /// What went wrong
        detail: String,
    },

    /// A command was accepted but its effect never showed up in the state.
    /// The command may or may not have been applied.
    #[error("Timed out waiting for {what} after {attempts} attempt(s)")]
    ConvergenceTimeout {
        /// Description of the awaited change
        what: String,
        /// Number of state fetches performed
        attempts: u32,
    },

    /// A client-side precondition was violated; nothing was sent
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The client could not be constructed from its configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

fn http_status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}

impl SmartTubError {
    pub(crate) fn decode(field: impl Into<String>, detail: impl std::fmt::Display) -> Self {
        SmartTubError::Decode {
            field: field.into(),
            detail: detail.to_string(),
        }
    }

    /// HTTP status carried by an `ApiError`, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            SmartTubError::ApiError { status, .. } => *status,
            _ => None,
        }
    }
}
