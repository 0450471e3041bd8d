use thiserror::Error;

use crate::{
    booking_flow::BookingFlowError,
    scheduling::{conflict::ConflictError, projector::ProjectionError},
    models::availability::SlotError,
};

#[derive(Error, Debug)]
pub enum HubError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Scheduling conflict: {0}")]
    Conflict(String),

    #[error("Unresolved scheduling check: {0}")]
    Unresolved(String),

    #[error("Database error: {0}")]
    Database(#[from] eyre::Report),

    #[error("Internal server error: {0}")]
    Internal(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl HubError {
    /// The bare message without the category prefix, as shown in inline banners.
    pub fn user_message(&self) -> String {
        match self {
            HubError::NotFound(msg)
            | HubError::Validation(msg)
            | HubError::Conflict(msg)
            | HubError::Unresolved(msg) => msg.clone(),
            HubError::Database(_) | HubError::Internal(_) => {
                "Something went wrong. Please try again.".to_string()
            }
        }
    }
}

impl From<SlotError> for HubError {
    fn from(err: SlotError) -> Self {
        HubError::Validation(err.to_string())
    }
}

impl From<ProjectionError> for HubError {
    fn from(err: ProjectionError) -> Self {
        HubError::Validation(err.to_string())
    }
}

impl From<ConflictError> for HubError {
    fn from(err: ConflictError) -> Self {
        match err {
            ConflictError::Unresolved(_) => HubError::Unresolved(err.to_string()),
            ConflictError::Overlap { .. }
            | ConflictError::SameAsCurrent
            | ConflictError::Full { .. } => HubError::Conflict(err.to_string()),
        }
    }
}

impl From<BookingFlowError> for HubError {
    fn from(err: BookingFlowError) -> Self {
        HubError::Validation(err.to_string())
    }
}

pub type HubResult<T> = Result<T, HubError>;
