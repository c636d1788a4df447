use crate::error::{ContractError, ErrorKind};

/// The terminal result of one invocation, as handed back to the host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The operation completed. Queries carry a JSON array payload; writes
    /// carry none.
    Success { payload: Option<Vec<u8>> },
    /// The operation failed. Nothing it attempted to write should be
    /// committed.
    Failure { kind: ErrorKind, message: String },
}

impl Outcome {
    pub fn success(payload: Option<Vec<u8>>) -> Self {
        Self::Success { payload }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// The success payload, if any.
    pub fn payload(&self) -> Option<&[u8]> {
        match self {
            Self::Success { payload } => payload.as_deref(),
            Self::Failure { .. } => None,
        }
    }

    /// The failure kind, if this is a failure.
    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { kind, .. } => Some(*kind),
        }
    }

    /// The failure message, if this is a failure.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { message, .. } => Some(message),
        }
    }
}

impl From<ContractError> for Outcome {
    fn from(err: ContractError) -> Self {
        Self::Failure {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl From<Result<Option<Vec<u8>>, ContractError>> for Outcome {
    fn from(result: Result<Option<Vec<u8>>, ContractError>) -> Self {
        match result {
            Ok(payload) => Self::success(payload),
            Err(err) => err.into(),
        }
    }
}
