use thiserror::Error;

#[derive(Debug, Error)]
pub enum RoomsServiceError {
    #[error("Room not found: {room_id}")]
    RoomNotFound { room_id: String },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Unsupported api-version: {0}")]
    UnsupportedApiVersion(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, RoomsServiceError>;
