use thiserror::Error;

/// Core error type shared across tablespec crates.
#[derive(Debug, Error)]
pub enum Error {
    /// Filesystem failure while reading or writing a document.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// The document is not valid YAML or does not match the model.
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    /// The UMF document violates structural or business rules.
    #[error("invalid umf: {0}")]
    InvalidUmf(String),
    /// The generated JSON Schema could not be compiled.
    #[error("schema error: {0}")]
    Schema(String),
    #[error("not found: {0}")]
    NotFound(String),
}

/// Convenience alias for results returned by tablespec crates.
pub type Result<T> = std::result::Result<T, Error>;
