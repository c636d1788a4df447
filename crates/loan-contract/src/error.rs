use std::fmt;

use serde::{Deserialize, Serialize};

/// Errors raised while executing an operation.
#[derive(Debug, thiserror::Error)]
pub enum ContractError {
    /// The operation received the wrong number of arguments.
    #[error("incorrect number of arguments for {operation}: expected {expected}, got {actual}")]
    ArgumentCount {
        operation: String,
        expected: String,
        actual: usize,
    },

    /// A required argument was an empty string.
    #[error("argument {position} ({param}) must be a non-empty string")]
    EmptyArgument { position: usize, param: String },

    /// The creation target key is already present in the keyspace.
    #[error("{kind} {param} already exists: {key}")]
    DuplicateKey {
        kind: String,
        param: String,
        key: String,
    },

    /// The update target key is absent.
    #[error("{kind} does not exist: {key}")]
    NotFound { kind: String, key: String },

    /// A document could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The state backend failed.
    #[error("ledger error: {0}")]
    Ledger(#[from] loan_store::StoreError),

    /// No operation is registered under the requested name.
    #[error("unknown operation: {0}")]
    UnknownOperation(String),
}

impl ContractError {
    /// Wrong argument count where exactly `expected` were required.
    pub fn exact_arity(operation: &str, expected: usize, actual: usize) -> Self {
        Self::ArgumentCount {
            operation: operation.to_string(),
            expected: expected.to_string(),
            actual,
        }
    }

    /// Too few arguments where at least `minimum` were required.
    pub fn min_arity(operation: &str, minimum: usize, actual: usize) -> Self {
        Self::ArgumentCount {
            operation: operation.to_string(),
            expected: format!("at least {minimum}"),
            actual,
        }
    }

    /// The structured kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ArgumentCount { .. } => ErrorKind::ArgumentCount,
            Self::EmptyArgument { .. } => ErrorKind::EmptyArgument,
            Self::DuplicateKey { .. } => ErrorKind::DuplicateKey,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Serialization(_) => ErrorKind::Serialization,
            Self::Ledger(_) => ErrorKind::Ledger,
            Self::UnknownOperation(_) => ErrorKind::UnknownOperation,
        }
    }
}

impl From<loan_types::TypeError> for ContractError {
    fn from(err: loan_types::TypeError) -> Self {
        match err {
            loan_types::TypeError::Serialization(message) => Self::Serialization(message),
            other => Self::Serialization(other.to_string()),
        }
    }
}

/// Error taxonomy carried by failure outcomes.
///
/// Message text may change between releases; the kind does not.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ArgumentCount,
    EmptyArgument,
    DuplicateKey,
    NotFound,
    Serialization,
    Ledger,
    UnknownOperation,
}

impl ErrorKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ArgumentCount => "argument_count",
            Self::EmptyArgument => "empty_argument",
            Self::DuplicateKey => "duplicate_key",
            Self::NotFound => "not_found",
            Self::Serialization => "serialization",
            Self::Ledger => "ledger",
            Self::UnknownOperation => "unknown_operation",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result alias for contract operations.
pub type ContractResult<T> = Result<T, ContractError>;
