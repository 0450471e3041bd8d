use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::scheduling::interval::BookedInterval;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Declined,
}

impl RequestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Accepted => "accepted",
            RequestStatus::Declined => "declined",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(RequestStatus::Pending),
            "accepted" => Some(RequestStatus::Accepted),
            "declined" => Some(RequestStatus::Declined),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Scheduled,
    Completed,
    Cancelled,
}

impl SessionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionStatus::Scheduled => "scheduled",
            SessionStatus::Completed => "completed",
            SessionStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "scheduled" => Some(SessionStatus::Scheduled),
            "completed" => Some(SessionStatus::Completed),
            "cancelled" => Some(SessionStatus::Cancelled),
            _ => None,
        }
    }
}

/// A student's request for a mentoring session, awaiting the mentor's answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MentoringRequest {
    pub id: Uuid,
    pub mentor_id: Uuid,
    pub student_id: Uuid,
    pub topic: String,
    pub description: String,
    pub preferred_start: Option<DateTime<Utc>>,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MentoringSession {
    pub id: Uuid,
    pub mentor_id: Uuid,
    pub student_id: Uuid,
    pub request_id: Option<Uuid>,
    pub topic: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
}

impl MentoringSession {
    pub fn interval(&self) -> BookedInterval {
        BookedInterval::new(self.start, self.end)
    }

    /// Only scheduled sessions occupy the mentor's time.
    pub fn is_blocking(&self) -> bool {
        self.status == SessionStatus::Scheduled
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMentoringRequest {
    pub mentor_id: Uuid,
    pub student_id: Uuid,
    pub topic: String,
    pub description: String,
    pub preferred_start: Option<DateTime<Utc>>,
}

/// Body of the accept and reschedule endpoints.
///
/// `start` is optional on the wire so that a missing value is reported as an
/// unresolved check rather than a generic parse failure. `end` defaults to one
/// session length after `start`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduleTimeRequest {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MentoringRequestResponse {
    pub request: MentoringRequest,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcceptRequestResponse {
    pub request: MentoringRequest,
    pub session: MentoringSession,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    pub session: MentoringSession,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionListResponse {
    pub sessions: Vec<MentoringSession>,
}
