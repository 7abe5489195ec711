// Path: crates/jam-types/src/error.rs

use thiserror::Error;

/// Machine-readable error code, independent of the human-readable `Display`
/// text, suitable for logging and metrics.
pub trait ErrorCode {
    fn code(&self) -> &'static str;
}

/// Faults raised by the copy-on-write state fabric. These are the only
/// failure paths the fabric itself defines; everything else is total.
#[derive(Error, Debug)]
pub enum StateError {
    #[error("service account is gone (staged for deletion)")]
    ServiceGone,

    #[error("service account already exists")]
    AlreadyExists,

    #[error("allocation failed while committing staged state")]
    OutOfMemory,
}

impl ErrorCode for StateError {
    fn code(&self) -> &'static str {
        match self {
            StateError::ServiceGone => "SERVICE_GONE",
            StateError::AlreadyExists => "ALREADY_EXISTS",
            StateError::OutOfMemory => "OUT_OF_MEMORY",
        }
    }
}

/// Batch-level faults. These abort the current batch; earlier committed
/// batches are left untouched.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("state fabric fault: {0}")]
    State(#[from] StateError),

    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}

impl ErrorCode for EngineError {
    fn code(&self) -> &'static str {
        match self {
            EngineError::State(inner) => inner.code(),
            EngineError::InvariantViolation(_) => "INVARIANT_VIOLATION",
        }
    }
}
