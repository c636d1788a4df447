/// Errors from state store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Keys must be non-empty strings.
    #[error("key must not be empty")]
    EmptyKey,

    /// The backend rejected or failed the operation.
    #[error("backend failure: {0}")]
    Backend(String),

    /// A selector or snapshot could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error while reading or writing a snapshot file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
