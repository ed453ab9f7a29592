//! Gateway failure classes

use thiserror::Error;

use crate::domain::DomainError;

pub type GatewayResult<T> = Result<T, GatewayError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GatewayError {
    /// HTTP 401: the backend rejected the session
    #[error("authentication failed")]
    Unauthorized,
    /// HTTP 403: valid session, insufficient permission
    #[error("access denied: {0}")]
    Forbidden(String),
    /// The request never produced a response
    #[error("backend unreachable: {0}")]
    Unreachable(String),
    /// Any other non-2xx response
    #[error("backend returned {status}: {message}")]
    ServerError { status: u16, message: String },
    /// A 2xx response whose body could not be decoded
    #[error("malformed backend response: {0}")]
    MalformedResponse(String),
    /// The record cannot be turned into a valid request payload
    #[error(transparent)]
    InvalidRecord(#[from] DomainError),
}

impl GatewayError {
    /// Classify a non-success HTTP status
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            401 => GatewayError::Unauthorized,
            403 => GatewayError::Forbidden(message),
            _ => GatewayError::ServerError { status, message },
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, GatewayError::Unauthorized)
    }
}
