use chrono::{DateTime, NaiveTime, Utc};
use eyre::{Result, eyre};
use mentorhub_core::models::{
    availability::AvailabilitySlot,
    booking::{BookingStatus, TutoringBooking},
    mentoring::{MentoringRequest, MentoringSession, RequestStatus, SessionStatus},
    role::Role,
};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbAvailabilitySlot {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub role: String,
    pub day_of_week: i16,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub is_active: bool,
    pub max_occupants: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbMentoringRequest {
    pub id: Uuid,
    pub mentor_id: Uuid,
    pub student_id: Uuid,
    pub topic: String,
    pub description: String,
    pub preferred_start: Option<DateTime<Utc>>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbMentoringSession {
    pub id: Uuid,
    pub mentor_id: Uuid,
    pub student_id: Uuid,
    pub request_id: Option<Uuid>,
    pub topic: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbTutoringBooking {
    pub id: Uuid,
    pub tutor_id: Uuid,
    pub student_id: Uuid,
    pub availability_id: Uuid,
    pub topic: String,
    pub description: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: String,
    pub payment_reference: Option<String>,
    pub created_at: DateTime<Utc>,
}

// Rows are only ever written through the typed repositories, so a value that
// fails to convert back means the table was edited by hand.

impl TryFrom<DbAvailabilitySlot> for AvailabilitySlot {
    type Error = eyre::Report;

    fn try_from(row: DbAvailabilitySlot) -> Result<Self> {
        Ok(AvailabilitySlot {
            id: row.id,
            owner_id: row.owner_id,
            role: row.role.parse::<Role>()?,
            day_of_week: u8::try_from(row.day_of_week)
                .map_err(|_| eyre!("Invalid day_of_week {} on slot {}", row.day_of_week, row.id))?,
            start_time: row.start_time,
            end_time: row.end_time,
            is_active: row.is_active,
            max_occupants: u32::try_from(row.max_occupants)
                .map_err(|_| eyre!("Invalid max_occupants {} on slot {}", row.max_occupants, row.id))?,
            created_at: row.created_at,
        })
    }
}

impl TryFrom<DbMentoringRequest> for MentoringRequest {
    type Error = eyre::Report;

    fn try_from(row: DbMentoringRequest) -> Result<Self> {
        let status = RequestStatus::parse(&row.status)
            .ok_or_else(|| eyre!("Unknown request status '{}' on request {}", row.status, row.id))?;
        Ok(MentoringRequest {
            id: row.id,
            mentor_id: row.mentor_id,
            student_id: row.student_id,
            topic: row.topic,
            description: row.description,
            preferred_start: row.preferred_start,
            status,
            created_at: row.created_at,
        })
    }
}

impl TryFrom<DbMentoringSession> for MentoringSession {
    type Error = eyre::Report;

    fn try_from(row: DbMentoringSession) -> Result<Self> {
        let status = SessionStatus::parse(&row.status)
            .ok_or_else(|| eyre!("Unknown session status '{}' on session {}", row.status, row.id))?;
        Ok(MentoringSession {
            id: row.id,
            mentor_id: row.mentor_id,
            student_id: row.student_id,
            request_id: row.request_id,
            topic: row.topic,
            start: row.start_time,
            end: row.end_time,
            status,
            created_at: row.created_at,
        })
    }
}

impl TryFrom<DbTutoringBooking> for TutoringBooking {
    type Error = eyre::Report;

    fn try_from(row: DbTutoringBooking) -> Result<Self> {
        let status = BookingStatus::parse(&row.status)
            .ok_or_else(|| eyre!("Unknown booking status '{}' on booking {}", row.status, row.id))?;
        Ok(TutoringBooking {
            id: row.id,
            tutor_id: row.tutor_id,
            student_id: row.student_id,
            availability_id: row.availability_id,
            topic: row.topic,
            description: row.description,
            start: row.start_time,
            end: row.end_time,
            status,
            payment_reference: row.payment_reference,
            created_at: row.created_at,
        })
    }
}

/// Converts a batch of rows, failing on the first bad one.
pub fn convert_all<R, T>(rows: Vec<R>) -> Result<Vec<T>>
where
    T: TryFrom<R, Error = eyre::Report>,
{
    rows.into_iter().map(T::try_from).collect()
}
