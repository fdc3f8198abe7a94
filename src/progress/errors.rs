use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProgressError {
    /// Malformed or out-of-range input
    #[error("Validation error: {0}")]
    Validation(String),

    /// A referenced patient or game does not exist
    #[error("Reference error: {0}")]
    Reference(String),

    /// The backing store failed; passed through uninterpreted
    #[error("Storage error: {0}")]
    Storage(String),
}
