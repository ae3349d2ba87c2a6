use thiserror::Error;

use super::transitions::TransitionError;
use crate::actor_framework::FrameworkError;
use crate::api::RemoteError;

/// Errors that can occur during order operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    NotFound(String),
    #[error("Invalid status change: {0}")]
    Validation(#[from] TransitionError),
    #[error("Another change is still in progress for order {0}")]
    Busy(String),
    #[error("Not signed in")]
    Unauthenticated,
    #[error("Order service error: {0}")]
    ServiceError(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<FrameworkError> for OrderError {
    fn from(err: FrameworkError) -> Self {
        match err {
            FrameworkError::Remote(RemoteError::NotFound(id)) => OrderError::NotFound(id),
            FrameworkError::Remote(RemoteError::Unauthenticated) => OrderError::Unauthenticated,
            FrameworkError::Remote(other) => OrderError::ServiceError(other.to_string()),
            FrameworkError::Busy(id) => OrderError::Busy(id),
            FrameworkError::ActorClosed | FrameworkError::ActorDropped => {
                OrderError::ActorCommunicationError(err.to_string())
            }
        }
    }
}
