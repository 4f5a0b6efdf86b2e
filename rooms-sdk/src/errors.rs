use thiserror::Error;

/// Errors that can occur when calling the Rooms service
#[derive(Error, Debug)]
pub enum RoomsError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Rooms service returned error: {status} - {message}")]
    ServiceError { status: u16, message: String },

    #[error("Operation was cancelled")]
    Cancelled,

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Connection could not be established or the request timed out
    #[error("Transport error: {0}")]
    TransportError(String),

    #[error("JSON serialization/deserialization failed: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl RoomsError {
    /// True for failures that happened before a response was obtained.
    pub fn is_retriable(&self) -> bool {
        matches!(self, RoomsError::HttpError(_) | RoomsError::TransportError(_))
    }

    /// HTTP status carried by the error, if the service answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            RoomsError::NotFound { .. } => Some(404),
            RoomsError::ServiceError { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type for Rooms client operations
pub type Result<T> = std::result::Result<T, RoomsError>;
