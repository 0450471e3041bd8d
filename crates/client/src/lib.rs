//! # MentorHub Client
//!
//! Typed client for the MentorHub REST API, used by views and tools.
//!
//! - [`ApiClient`] issues one request per call. Every call takes a
//!   [`CancellationToken`](tokio_util::sync::CancellationToken) and returns
//!   [`ClientError::Cancelled`] as soon as it fires.
//! - [`ViewScope`] owns the token for a view and cancels it on drop.
//! - [`SessionContext`] holds the logged-in user.
//!
//! Inputs are checked locally before they are sent: an invalid slot or a
//! scheduling request without a start time fails here instead of at the
//! server.

pub mod api;
pub mod config;
pub mod context;
pub mod scope;

use mentorhub_core::{
    booking_flow::BookingFlowError,
    models::{availability::SlotError, envelope::EnvelopeError},
    scheduling::conflict::ConflictError,
};
use thiserror::Error;

pub use api::ApiClient;
pub use config::ClientConfig;
pub use context::{CurrentUser, SessionContext};
pub use scope::ViewScope;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Request cancelled")]
    Cancelled,

    #[error("Could not reach MentorHub. Please try again.")]
    Network(#[source] reqwest::Error),

    #[error("Unexpected response from MentorHub. Please try again.")]
    Response(#[source] EnvelopeError),

    /// The server refused the request; `message` is meant for the user.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unresolved(String),

    #[error("Please log in first")]
    NotLoggedIn,
}

impl ClientError {
    /// Transport and parse failures; the same call may succeed when repeated.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ClientError::Network(_) | ClientError::Response(_))
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, ClientError::Rejected { status: 409, .. })
    }
}

impl From<SlotError> for ClientError {
    fn from(err: SlotError) -> Self {
        ClientError::Validation(err.to_string())
    }
}

impl From<BookingFlowError> for ClientError {
    fn from(err: BookingFlowError) -> Self {
        ClientError::Validation(err.to_string())
    }
}

impl From<ConflictError> for ClientError {
    fn from(err: ConflictError) -> Self {
        match err {
            ConflictError::Unresolved(_) => ClientError::Unresolved(err.to_string()),
            _ => ClientError::Validation(err.to_string()),
        }
    }
}
