//! Domain-level errors

use thiserror::Error;

use super::kind::RequestKind;

/// Common result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid status {status:?} for {kind}")]
    InvalidStatus { kind: RequestKind, status: String },
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
