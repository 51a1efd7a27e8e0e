use thiserror::Error;

/// Application-level errors
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Envelope error: {0}")]
    Envelope(#[from] EnvelopeError),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Storage layer errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database connection failed: {message}")]
    Connection { message: String },

    #[error("Migration failed: {message}")]
    Migration { message: String },

    #[error("Unknown menu item: {item}")]
    UnknownItem { item: String },

    #[error("SQLx error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

/// Webhook envelope decode errors
#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("Request has no output contexts")]
    MissingContexts,

    #[error("Could not extract a session id from context '{context}'")]
    SessionId { context: String },

    #[error("Invalid parameters for {intent}: {message}")]
    InvalidParameters { intent: String, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

/// Result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Result type alias for envelope decoding
pub type EnvelopeResult<T> = Result<T, EnvelopeError>;
