//! Controller errors

use thiserror::Error;

use crate::domain::DomainError;
use crate::gateway::GatewayError;

pub type ControllerResult<T> = Result<T, ControllerError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ControllerError {
    /// No local session; checked before any network call
    #[error("sign-in required")]
    AuthRequired,
    /// A mutation for this record has not finished yet
    #[error("an operation on {0} is already in progress")]
    InFlight(String),
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl ControllerError {
    /// True when the user has to sign in again
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            ControllerError::AuthRequired | ControllerError::Gateway(GatewayError::Unauthorized)
        )
    }
}
