//! # Error Handling Middleware
//!
//! This module provides a standardized way to handle errors in the MentorHub API.
//! It maps domain-specific errors to appropriate HTTP status codes and
//! `{status: "error", message}` envelopes, so every failure reaches the client
//! in the same shape as a success.

use axum::{
    BoxError, Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use mentorhub_core::{errors::HubError, models::envelope::ErrorEnvelope};
use tracing::error;

/// Application error wrapper that provides HTTP status code mapping
///
/// `AppError` wraps `HubError` instances and implements `IntoResponse` to
/// convert them into HTTP responses.
///
/// # Example
///
/// ```
/// use axum::Json;
/// use mentorhub_api::middleware::error_handling::AppError;
/// use mentorhub_core::errors::HubError;
///
/// async fn handler(topic: String) -> Result<Json<String>, AppError> {
///     if topic.trim().is_empty() {
///         return Err(AppError(HubError::Validation("Please enter a topic".into())));
///     }
///     Ok(Json(topic))
/// }
/// # fn main() {}
/// ```
#[derive(Debug)]
pub struct AppError(pub HubError);

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match &self.0 {
            HubError::NotFound(_) => StatusCode::NOT_FOUND,
            HubError::Validation(_) => StatusCode::BAD_REQUEST,
            HubError::Conflict(_) => StatusCode::CONFLICT,
            HubError::Unresolved(_) => StatusCode::UNPROCESSABLE_ENTITY,
            HubError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            HubError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed: {}", self.0);
        }

        // Internal details stay in the log; the body carries the user-facing message
        let body = Json(ErrorEnvelope::new(self.0.user_message()));
        (status, body).into_response()
    }
}

/// Automatic conversion from HubError to AppError
///
/// Lets handlers use `?` on `HubResult` values. Domain errors such as
/// `ConflictError` go through [`AppError::from_domain`].
impl From<HubError> for AppError {
    fn from(err: HubError) -> Self {
        AppError(err)
    }
}

/// Repository failures surface as `HubError::Database`.
impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        AppError(HubError::Database(err))
    }
}

impl AppError {
    pub fn from_domain<E: Into<HubError>>(err: E) -> Self {
        AppError(err.into())
    }
}

/// Maps a HubError to an HTTP response
pub fn map_error(err: HubError) -> Response {
    AppError(err).into_response()
}

/// Turns a failure from the timeout layer into an error envelope.
pub async fn handle_timeout_error(err: BoxError) -> (StatusCode, Json<ErrorEnvelope>) {
    if err.is::<tower::timeout::error::Elapsed>() {
        (
            StatusCode::REQUEST_TIMEOUT,
            Json(ErrorEnvelope::new("Request timed out")),
        )
    } else {
        error!("Unhandled middleware error: {}", err);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorEnvelope::new("Something went wrong. Please try again.")),
        )
    }
}
