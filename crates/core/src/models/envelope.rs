//! Response envelopes.
//!
//! The API answers with `{"status": "success" | "error", "message": ..., ...payload}`.
//! Older endpoints answer with `{"success": true | false, "message": ..., ...}`
//! instead. Readers accept both shapes and treat neither as canonical: when a
//! body carries both fields and they disagree, it is rejected as inconsistent.

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

/// Successful response body: the payload's fields sit next to `status`.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope<T> {
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub payload: T,
}

impl<T> Envelope<T> {
    pub fn success(payload: T) -> Self {
        Self {
            status: Status::Success,
            message: None,
            payload,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub status: Status,
    pub message: String,
}

impl ErrorEnvelope {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum EnvelopeError {
    #[error("Malformed response: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Response carries neither a status nor a success flag")]
    MissingOutcome,

    #[error("Response status and success flag disagree")]
    Inconsistent,

    #[error("{0}")]
    Rejected(String),
}

#[derive(Deserialize)]
struct Header {
    status: Option<Status>,
    success: Option<bool>,
    message: Option<String>,
    error: Option<String>,
}

/// Reads either envelope convention and returns the payload on success.
pub fn read_envelope<T: DeserializeOwned>(body: &[u8]) -> Result<T, EnvelopeError> {
    let value: serde_json::Value = serde_json::from_slice(body)?;
    let header = Header::deserialize(&value)?;

    let ok = match (header.status, header.success) {
        (Some(status), Some(success)) if (status == Status::Success) != success => {
            return Err(EnvelopeError::Inconsistent);
        }
        (Some(status), _) => status == Status::Success,
        (None, Some(success)) => success,
        (None, None) => return Err(EnvelopeError::MissingOutcome),
    };

    if !ok {
        let message = header
            .message
            .or(header.error)
            .unwrap_or_else(|| "Request failed".to_string());
        return Err(EnvelopeError::Rejected(message));
    }

    Ok(T::deserialize(value)?)
}
