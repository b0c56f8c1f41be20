use thiserror::Error;

/// Storage-layer failure.
///
/// `NotFound`/`Conflict` are expected outcomes the API layer maps to 404/400;
/// `Backend` is an unexpected fault that surfaces as a generic 500.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("not found")]
    NotFound,

    #[error("{0}")]
    Conflict(String),

    #[error("storage backend failure: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    /// Lock poisoning and similar infrastructure faults.
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}
