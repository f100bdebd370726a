use thiserror::Error;

/// Errors raised while rendering downstream schema artifacts.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("invalid source timestamp: {0}")]
    InvalidTimestamp(String),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for schema emitters.
pub type Result<T> = std::result::Result<T, SchemaError>;
