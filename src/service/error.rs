use thiserror::Error;
use uuid::Uuid;
use axum::http::StatusCode;

use crate::{
    error::{ErrorMessage, HttpError},
    models::{complaintmodel::ComplaintStatus, usermodel::UserRole},
};

#[derive(Error, Debug, PartialEq)]
pub enum ServiceError {
    #[error("Complaint {0} not found")]
    ComplaintNotFound(Uuid),

    #[error("Cannot move complaint from {from} to {to}")]
    IllegalTransition {
        from: ComplaintStatus,
        to: ComplaintStatus,
    },

    #[error("A {0} cannot perform this action on complaint {1}")]
    ActionNotPermitted(UserRole, Uuid),

    #[error("Unknown agent {0}")]
    UnknownAgent(Uuid),

    #[error("Validation error: {0}")]
    Validation(String),

    /// Raised by the injected latency policy; carries the operation's user-facing message.
    #[error("{0}")]
    SimulatedFailure(String),

    #[error("Other error: {0}")]
    Other(String),
}

impl From<ServiceError> for HttpError {
    fn from(error: ServiceError) -> Self {
        let status = error.status_code();
        let message = match &error {
            ServiceError::ComplaintNotFound(_) => ErrorMessage::ComplaintNotFound.to_string(),
            ServiceError::Other(details) => {
                tracing::error!("Unexpected service error: {}", details);
                ErrorMessage::InternalServerError.to_string()
            }
            _ => error.to_string(),
        };

        HttpError::new(message, status)
    }
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::ComplaintNotFound(_) => StatusCode::NOT_FOUND,

            ServiceError::IllegalTransition { .. }
            | ServiceError::UnknownAgent(_)
            | ServiceError::Validation(_) => StatusCode::BAD_REQUEST,

            ServiceError::ActionNotPermitted(_, _) => StatusCode::FORBIDDEN,

            ServiceError::SimulatedFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,

            ServiceError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
