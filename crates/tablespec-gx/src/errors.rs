use thiserror::Error;

/// Errors emitted while reading or writing expectation suites.
///
/// Constraint extraction and sample synthesis never fail; only file-level
/// operations surface these.
#[derive(Debug, Error)]
pub enum GxError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("core error: {0}")]
    Core(#[from] tablespec_core::Error),
    #[error("invalid strictness: {0}")]
    InvalidStrictness(String),
}

/// Result type for suite operations.
pub type Result<T> = std::result::Result<T, GxError>;
