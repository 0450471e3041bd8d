//! # Mentoring Handlers
//!
//! Students request mentoring; the mentor accepts a request at a concrete time,
//! which creates a session. Sessions can then be rescheduled, cancelled or
//! completed.
//!
//! Accepting and rescheduling are conflict-checked against the mentor's other
//! scheduled sessions. A request that names no start time cannot be checked
//! and is refused as unresolved instead of being accepted blind.
//!
//! Every state change runs under the mentor's lock and re-reads the request
//! or session once the lock is held. The repository writes are also guarded
//! by status, so a change that lost a race with another server is refused.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use mentorhub_core::{
    errors::HubError,
    models::{
        envelope::Envelope,
        mentoring::{
            AcceptRequestResponse, CreateMentoringRequest, MentoringRequest, MentoringRequestResponse,
            MentoringSession, RequestStatus, ScheduleTimeRequest, SessionListResponse,
            SessionResponse, SessionStatus,
        },
    },
    scheduling::{
        conflict::{check_booking, check_reschedule},
        interval::{BookedInterval, CandidateInterval},
    },
};
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{ApiState, middleware::error_handling::AppError};

#[derive(Debug, Default, Deserialize)]
pub struct SessionListQuery {
    /// Only return sessions in this state
    pub status: Option<SessionStatus>,
}

/// Lists a mentor's sessions, earliest first.
///
/// # Endpoint
///
/// ```text
/// GET /api/mentoring/sessions/{mentor_id}/?status=scheduled
/// ```
#[axum::debug_handler]
pub async fn list_sessions(
    State(state): State<Arc<ApiState>>,
    Path(mentor_id): Path<Uuid>,
    Query(query): Query<SessionListQuery>,
) -> Result<Json<Envelope<SessionListResponse>>, AppError> {
    let sessions = state
        .sessions
        .list_sessions(mentor_id)
        .await?
        .into_iter()
        .filter(|session| query.status.is_none_or(|status| session.status == status))
        .collect();
    Ok(Json(Envelope::success(SessionListResponse { sessions })))
}

/// Records a student's request for mentoring.
///
/// # Endpoint
///
/// ```text
/// POST /api/mentoring/requests/
/// ```
#[axum::debug_handler]
pub async fn create_request(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<CreateMentoringRequest>,
) -> Result<(StatusCode, Json<Envelope<MentoringRequestResponse>>), AppError> {
    let topic = required(&payload.topic, "Please enter a topic")?;
    let description = required(&payload.description, "Please enter a description")?;

    let request = state
        .sessions
        .create_request(MentoringRequest {
            id: Uuid::new_v4(),
            mentor_id: payload.mentor_id,
            student_id: payload.student_id,
            topic,
            description,
            preferred_start: payload.preferred_start,
            status: RequestStatus::Pending,
            created_at: Utc::now(),
        })
        .await?;

    info!(request_id = %request.id, mentor_id = %request.mentor_id, "Mentoring request created");
    Ok((
        StatusCode::CREATED,
        Json(Envelope::success(MentoringRequestResponse { request }).with_message("Request sent")),
    ))
}

/// Accepts a pending request at the given time and creates its session.
///
/// # Endpoint
///
/// ```text
/// POST /api/mentoring/requests/{id}/accept/
/// {"start": "2024-02-15T14:00:00Z", "end": "2024-02-15T15:00:00Z"}
/// ```
///
/// `start` falls back to the request's preferred start; `end` defaults to one
/// session length after `start`.
///
/// # Errors
///
/// * `HubError::Unresolved` - No start time anywhere, or `end` not after `start`
/// * `HubError::Conflict` - Overlaps another scheduled session, or the request
///   was already answered
#[axum::debug_handler]
pub async fn accept_request(
    State(state): State<Arc<ApiState>>,
    Path(request_id): Path<Uuid>,
    Json(payload): Json<ScheduleTimeRequest>,
) -> Result<Json<Envelope<AcceptRequestResponse>>, AppError> {
    let mentor_id = find_request(&state, request_id).await?.mentor_id;
    let _guard = state.locks.lock(mentor_id).await;

    let request = pending_request(&state, request_id).await?;
    let candidate = CandidateInterval::new(payload.start.or(request.preferred_start), payload.end)
        .resolve(state.settings.session_length)
        .map_err(AppError::from_domain)?;

    let booked = blocking_intervals(&state, request.mentor_id).await?;
    if let Err(err) = check_booking(&candidate, &booked) {
        warn!(%request_id, mentor_id = %request.mentor_id, "Rejected conflicting acceptance: {}", err);
        return Err(AppError::from_domain(err));
    }

    let session = MentoringSession {
        id: Uuid::new_v4(),
        mentor_id: request.mentor_id,
        student_id: request.student_id,
        request_id: Some(request.id),
        topic: request.topic.clone(),
        start: candidate.start,
        end: candidate.end,
        status: SessionStatus::Scheduled,
        created_at: Utc::now(),
    };
    let (request, session) = state
        .sessions
        .accept_request(request_id, session)
        .await?
        .ok_or_else(request_answered)?;

    info!(%request_id, session_id = %session.id, start = %session.start, "Mentoring request accepted");
    Ok(Json(
        Envelope::success(AcceptRequestResponse { request, session }).with_message("Session scheduled"),
    ))
}

/// Declines a pending request.
///
/// # Endpoint
///
/// ```text
/// POST /api/mentoring/requests/{id}/decline/
/// ```
#[axum::debug_handler]
pub async fn decline_request(
    State(state): State<Arc<ApiState>>,
    Path(request_id): Path<Uuid>,
) -> Result<Json<Envelope<MentoringRequestResponse>>, AppError> {
    let mentor_id = find_request(&state, request_id).await?.mentor_id;
    let _guard = state.locks.lock(mentor_id).await;

    pending_request(&state, request_id).await?;
    let request = state
        .sessions
        .set_request_status(request_id, RequestStatus::Declined)
        .await?
        .ok_or_else(request_answered)?;

    info!(%request_id, "Mentoring request declined");
    Ok(Json(Envelope::success(MentoringRequestResponse { request })))
}

/// Cancels a scheduled session, freeing its time.
///
/// # Endpoint
///
/// ```text
/// POST /api/mentoring/sessions/{id}/cancel/
/// ```
#[axum::debug_handler]
pub async fn cancel_session(
    State(state): State<Arc<ApiState>>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<Envelope<SessionResponse>>, AppError> {
    finish_session(&state, session_id, SessionStatus::Cancelled).await
}

/// Marks a scheduled session as held.
///
/// # Endpoint
///
/// ```text
/// POST /api/mentoring/sessions/{id}/complete/
/// ```
#[axum::debug_handler]
pub async fn complete_session(
    State(state): State<Arc<ApiState>>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<Envelope<SessionResponse>>, AppError> {
    finish_session(&state, session_id, SessionStatus::Completed).await
}

async fn finish_session(
    state: &ApiState,
    session_id: Uuid,
    status: SessionStatus,
) -> Result<Json<Envelope<SessionResponse>>, AppError> {
    let mentor_id = find_session(state, session_id).await?.mentor_id;
    let _guard = state.locks.lock(mentor_id).await;

    scheduled_session(state, session_id).await?;
    let session = state
        .sessions
        .set_session_status(session_id, status)
        .await?
        .ok_or_else(session_closed)?;

    info!(%session_id, status = status.as_str(), "Mentoring session closed");
    Ok(Json(Envelope::success(SessionResponse { session })))
}

/// Moves a scheduled session to a new time.
///
/// # Endpoint
///
/// ```text
/// POST /api/mentoring/sessions/{id}/reschedule/
/// {"start": "2024-02-15T16:00:00Z"}
/// ```
///
/// # Errors
///
/// * `HubError::Conflict` - Same time as the session already has, or overlaps
///   another scheduled session
/// * `HubError::Unresolved` - No start time, or `end` not after `start`
#[axum::debug_handler]
pub async fn reschedule_session(
    State(state): State<Arc<ApiState>>,
    Path(session_id): Path<Uuid>,
    Json(payload): Json<ScheduleTimeRequest>,
) -> Result<Json<Envelope<SessionResponse>>, AppError> {
    let mentor_id = find_session(&state, session_id).await?.mentor_id;
    let _guard = state.locks.lock(mentor_id).await;

    let current = scheduled_session(&state, session_id).await?;
    let candidate = CandidateInterval::new(payload.start, payload.end)
        .resolve(state.settings.session_length)
        .map_err(AppError::from_domain)?;

    let booked = blocking_intervals(&state, current.mentor_id).await?;
    if let Err(err) = check_reschedule(&current.interval(), &candidate, &booked) {
        warn!(%session_id, mentor_id = %current.mentor_id, "Rejected reschedule: {}", err);
        return Err(AppError::from_domain(err));
    }

    let session = state
        .sessions
        .reschedule_session(session_id, candidate.start, candidate.end)
        .await?
        .ok_or_else(session_closed)?;

    info!(%session_id, start = %session.start, "Mentoring session rescheduled");
    Ok(Json(
        Envelope::success(SessionResponse { session }).with_message("Session rescheduled"),
    ))
}

async fn find_request(state: &ApiState, request_id: Uuid) -> Result<MentoringRequest, AppError> {
    state
        .sessions
        .get_request(request_id)
        .await?
        .ok_or_else(|| AppError(HubError::NotFound(format!("Mentoring request {} not found", request_id))))
}

/// Call with the mentor's lock held.
async fn pending_request(state: &ApiState, request_id: Uuid) -> Result<MentoringRequest, AppError> {
    let request = find_request(state, request_id).await?;
    if request.status != RequestStatus::Pending {
        return Err(AppError(HubError::Conflict(format!(
            "This request has already been {}",
            request.status.as_str()
        ))));
    }
    Ok(request)
}

async fn find_session(state: &ApiState, session_id: Uuid) -> Result<MentoringSession, AppError> {
    state
        .sessions
        .get_session(session_id)
        .await?
        .ok_or_else(|| AppError(HubError::NotFound(format!("Mentoring session {} not found", session_id))))
}

/// Call with the mentor's lock held.
async fn scheduled_session(state: &ApiState, session_id: Uuid) -> Result<MentoringSession, AppError> {
    let session = find_session(state, session_id).await?;
    if session.status != SessionStatus::Scheduled {
        return Err(AppError(HubError::Conflict(format!(
            "This session is already {}",
            session.status.as_str()
        ))));
    }
    Ok(session)
}

fn request_answered() -> AppError {
    AppError(HubError::Conflict("This request has already been answered".to_string()))
}

fn session_closed() -> AppError {
    AppError(HubError::Conflict("This session is no longer scheduled".to_string()))
}

async fn blocking_intervals(state: &ApiState, mentor_id: Uuid) -> Result<Vec<BookedInterval>, AppError> {
    Ok(state
        .sessions
        .list_sessions(mentor_id)
        .await?
        .iter()
        .filter(|session| session.is_blocking())
        .map(MentoringSession::interval)
        .collect())
}

fn required(value: &str, message: &str) -> Result<String, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError(HubError::Validation(message.to_string())));
    }
    Ok(value.to_string())
}
