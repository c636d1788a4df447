use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("unknown entity kind: {0}")]
    UnknownKind(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for TypeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
