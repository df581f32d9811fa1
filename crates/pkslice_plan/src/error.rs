use thiserror::Error;

/// Failures of the pure planning layer. All of them are caller contract
/// violations; a well-formed key and boundary list never produces one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    #[error("primary key has no columns")]
    EmptyKey,
    #[error("key tuple has {actual} values, key schema has {expected} columns")]
    ArityMismatch { expected: usize, actual: usize },
}
