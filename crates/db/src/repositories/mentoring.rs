use chrono::{DateTime, Utc};
use eyre::Result;
use mentorhub_core::models::mentoring::{
    MentoringRequest, MentoringSession, RequestStatus, SessionStatus,
};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::models::{DbMentoringRequest, DbMentoringSession, convert_all};

const REQUEST_COLUMNS: &str =
    "id, mentor_id, student_id, topic, description, preferred_start, status, created_at";
const SESSION_COLUMNS: &str =
    "id, mentor_id, student_id, request_id, topic, start_time, end_time, status, created_at";

pub async fn create_request(
    pool: &Pool<Postgres>,
    request: &MentoringRequest,
) -> Result<MentoringRequest> {
    tracing::debug!(
        "Creating mentoring request: id={}, mentor={}, student={}",
        request.id,
        request.mentor_id,
        request.student_id
    );

    let row = sqlx::query_as::<_, DbMentoringRequest>(&format!(
        r#"
        INSERT INTO mentoring_requests
            (id, mentor_id, student_id, topic, description, preferred_start, status, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING {REQUEST_COLUMNS}
        "#
    ))
    .bind(request.id)
    .bind(request.mentor_id)
    .bind(request.student_id)
    .bind(&request.topic)
    .bind(&request.description)
    .bind(request.preferred_start)
    .bind(request.status.as_str())
    .bind(request.created_at)
    .fetch_one(pool)
    .await?;

    MentoringRequest::try_from(row)
}

pub async fn get_request(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<MentoringRequest>> {
    let row = sqlx::query_as::<_, DbMentoringRequest>(&format!(
        "SELECT {REQUEST_COLUMNS} FROM mentoring_requests WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.map(MentoringRequest::try_from).transpose()
}

/// Answers a pending request. `None` when the request is missing or no
/// longer pending.
pub async fn set_request_status(
    pool: &Pool<Postgres>,
    id: Uuid,
    status: RequestStatus,
) -> Result<Option<MentoringRequest>> {
    let row = sqlx::query_as::<_, DbMentoringRequest>(&format!(
        "UPDATE mentoring_requests SET status = $2 WHERE id = $1 AND status = $3 RETURNING {REQUEST_COLUMNS}"
    ))
    .bind(id)
    .bind(status.as_str())
    .bind(RequestStatus::Pending.as_str())
    .fetch_optional(pool)
    .await?;

    row.map(MentoringRequest::try_from).transpose()
}

/// Marks the request accepted and creates its session in one transaction.
///
/// Nothing is written and `None` is returned when the request is no longer
/// pending.
pub async fn accept_request(
    pool: &Pool<Postgres>,
    request_id: Uuid,
    session: &MentoringSession,
) -> Result<Option<(MentoringRequest, MentoringSession)>> {
    let mut tx = pool.begin().await?;

    let Some(request_row) = sqlx::query_as::<_, DbMentoringRequest>(&format!(
        "UPDATE mentoring_requests SET status = $2 WHERE id = $1 AND status = $3 RETURNING {REQUEST_COLUMNS}"
    ))
    .bind(request_id)
    .bind(RequestStatus::Accepted.as_str())
    .bind(RequestStatus::Pending.as_str())
    .fetch_optional(&mut *tx)
    .await?
    else {
        tx.rollback().await?;
        tracing::debug!("Request {} is no longer pending", request_id);
        return Ok(None);
    };

    let session_row = sqlx::query_as::<_, DbMentoringSession>(&format!(
        r#"
        INSERT INTO mentoring_sessions
            (id, mentor_id, student_id, request_id, topic, start_time, end_time, status, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING {SESSION_COLUMNS}
        "#
    ))
    .bind(session.id)
    .bind(session.mentor_id)
    .bind(session.student_id)
    .bind(Some(request_id))
    .bind(&session.topic)
    .bind(session.start)
    .bind(session.end)
    .bind(session.status.as_str())
    .bind(session.created_at)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    tracing::debug!("Accepted request {} as session {}", request_id, session.id);

    Ok(Some((
        MentoringRequest::try_from(request_row)?,
        MentoringSession::try_from(session_row)?,
    )))
}

pub async fn get_session(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<MentoringSession>> {
    let row = sqlx::query_as::<_, DbMentoringSession>(&format!(
        "SELECT {SESSION_COLUMNS} FROM mentoring_sessions WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.map(MentoringSession::try_from).transpose()
}

/// All of a mentor's sessions, earliest first.
pub async fn list_sessions(pool: &Pool<Postgres>, mentor_id: Uuid) -> Result<Vec<MentoringSession>> {
    let rows = sqlx::query_as::<_, DbMentoringSession>(&format!(
        "SELECT {SESSION_COLUMNS} FROM mentoring_sessions WHERE mentor_id = $1 ORDER BY start_time ASC"
    ))
    .bind(mentor_id)
    .fetch_all(pool)
    .await?;

    convert_all(rows)
}

/// Closes a scheduled session. `None` when the session is missing or no
/// longer scheduled.
pub async fn set_session_status(
    pool: &Pool<Postgres>,
    id: Uuid,
    status: SessionStatus,
) -> Result<Option<MentoringSession>> {
    let row = sqlx::query_as::<_, DbMentoringSession>(&format!(
        "UPDATE mentoring_sessions SET status = $2 WHERE id = $1 AND status = $3 RETURNING {SESSION_COLUMNS}"
    ))
    .bind(id)
    .bind(status.as_str())
    .bind(SessionStatus::Scheduled.as_str())
    .fetch_optional(pool)
    .await?;

    row.map(MentoringSession::try_from).transpose()
}

/// Moves a scheduled session. `None` when the session is missing or no
/// longer scheduled.
pub async fn reschedule_session(
    pool: &Pool<Postgres>,
    id: Uuid,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Option<MentoringSession>> {
    let row = sqlx::query_as::<_, DbMentoringSession>(&format!(
        r#"
        UPDATE mentoring_sessions
        SET start_time = $2, end_time = $3
        WHERE id = $1 AND status = $4
        RETURNING {SESSION_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(start)
    .bind(end)
    .bind(SessionStatus::Scheduled.as_str())
    .fetch_optional(pool)
    .await?;

    row.map(MentoringSession::try_from).transpose()
}
