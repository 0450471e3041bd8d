//! # Availability Handlers
//!
//! CRUD for an owner's weekly availability slots, plus the projection of those
//! slots onto concrete dates. Every endpoint is parameterized by role, so the
//! same handlers serve `/api/mentoring/...`, `/api/tutoring/...` and
//! `/api/counselling/...`.
//!
//! Writes go through the owner's lock: the overlap check against the owner's
//! other slots and the write that follows it happen as one step.

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{NaiveDate, Utc};
use mentorhub_core::{
    errors::HubError,
    models::{
        availability::{
            AvailabilityInput, AvailabilityListResponse, AvailabilityResponse, AvailabilitySlot,
            DeleteAvailabilityRequest, DeleteAvailabilityResponse, ProjectedSlotDates,
            ProjectionResponse,
        },
        envelope::Envelope,
        role::Role,
    },
    scheduling::{
        conflict::ensure_no_slot_overlap,
        projector::{Horizon, parse_timezone, project_dates},
    },
};
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{ApiState, middleware::error_handling::AppError};

/// Query parameters for the projection endpoint
#[derive(Debug, Default, Deserialize)]
pub struct ProjectionQuery {
    /// Number of days to look ahead, 1 to 30
    pub horizon: Option<u32>,

    /// IANA timezone whose calendar day counts as "today" (default UTC)
    pub timezone: Option<String>,
}

/// Lists an owner's slots for one role.
///
/// # Endpoint
///
/// ```text
/// GET /api/{role}/availability/{owner_id}/
/// ```
#[axum::debug_handler]
pub async fn list_availability(
    State(state): State<Arc<ApiState>>,
    Extension(role): Extension<Role>,
    Path(owner_id): Path<Uuid>,
) -> Result<Json<Envelope<AvailabilityListResponse>>, AppError> {
    let availability = state.availability.list_slots(owner_id, role).await?;
    Ok(Json(Envelope::success(AvailabilityListResponse { availability })))
}

/// Creates a slot, or updates it when the body carries `availability_id`.
///
/// # Endpoint
///
/// ```text
/// POST /api/{role}/availability/{owner_id}/
/// ```
///
/// Responds `201 Created` for a new slot and `200 OK` for an update.
///
/// # Errors
///
/// * `HubError::Validation` - Bad day, inverted times, zero capacity, or an
///   overlap with another active slot on the same day
/// * `HubError::NotFound` - `availability_id` names a slot of another owner
#[axum::debug_handler]
pub async fn create_availability(
    State(state): State<Arc<ApiState>>,
    Extension(role): Extension<Role>,
    Path(owner_id): Path<Uuid>,
    Json(input): Json<AvailabilityInput>,
) -> Result<(StatusCode, Json<Envelope<AvailabilityResponse>>), AppError> {
    let (slot, created) = save_slot(&state, role, owner_id, input, false).await?;
    let status = if created { StatusCode::CREATED } else { StatusCode::OK };
    let message = if created { "Availability added" } else { "Availability updated" };
    Ok((
        status,
        Json(Envelope::success(AvailabilityResponse { availability: slot }).with_message(message)),
    ))
}

/// Updates an existing slot named by `availability_id`.
///
/// # Endpoint
///
/// ```text
/// PUT /api/{role}/availability/{owner_id}/
/// ```
#[axum::debug_handler]
pub async fn update_availability(
    State(state): State<Arc<ApiState>>,
    Extension(role): Extension<Role>,
    Path(owner_id): Path<Uuid>,
    Json(input): Json<AvailabilityInput>,
) -> Result<Json<Envelope<AvailabilityResponse>>, AppError> {
    if input.availability_id.is_none() {
        return Err(AppError(HubError::Validation(
            "availability_id is required to update a slot".to_string(),
        )));
    }
    let (slot, _) = save_slot(&state, role, owner_id, input, true).await?;
    Ok(Json(
        Envelope::success(AvailabilityResponse { availability: slot }).with_message("Availability updated"),
    ))
}

/// Validates and stores a slot. Returns the stored slot and whether it is new.
async fn save_slot(
    state: &ApiState,
    role: Role,
    owner_id: Uuid,
    input: AvailabilityInput,
    must_exist: bool,
) -> Result<(AvailabilitySlot, bool), AppError> {
    input.validate().map_err(AppError::from_domain)?;

    let _guard = state.locks.lock(owner_id).await;

    let existing = match input.availability_id {
        Some(id) => match state.availability.get_slot(id).await? {
            Some(slot) if slot.owner_id == owner_id && slot.role == role => Some(slot),
            // Another owner's slot is never touched, even by id
            Some(_) => return Err(slot_not_found(id)),
            None if must_exist => return Err(slot_not_found(id)),
            None => None,
        },
        None => None,
    };

    let created = existing.is_none();
    let created_at = existing.as_ref().map_or_else(Utc::now, |slot| slot.created_at);
    let slot = input
        .into_slot(owner_id, role, created_at)
        .map_err(AppError::from_domain)?;

    let others = state.availability.list_slots(owner_id, role).await?;
    if let Err(err) = ensure_no_slot_overlap(&others, &slot) {
        warn!(%owner_id, %role, "Rejected overlapping slot: {}", err);
        return Err(AppError::from_domain(err));
    }

    // The id may have been claimed by another owner since it was looked up
    let slot_id = slot.id;
    let stored = state
        .availability
        .upsert_slot(slot)
        .await?
        .ok_or_else(|| slot_not_found(slot_id))?;
    info!(
        slot_id = %stored.id,
        %owner_id,
        %role,
        created,
        "Availability slot saved"
    );
    Ok((stored, created))
}

fn slot_not_found(id: Uuid) -> AppError {
    AppError(HubError::NotFound(format!("Availability slot {} not found", id)))
}

/// Deletes one slot.
///
/// # Endpoint
///
/// ```text
/// DELETE /api/{role}/availability/{owner_id}/
/// {"availability_id": "..."}
/// ```
#[axum::debug_handler]
pub async fn delete_availability(
    State(state): State<Arc<ApiState>>,
    Extension(role): Extension<Role>,
    Path(owner_id): Path<Uuid>,
    Json(request): Json<DeleteAvailabilityRequest>,
) -> Result<Json<Envelope<DeleteAvailabilityResponse>>, AppError> {
    let _guard = state.locks.lock(owner_id).await;
    let deleted = state
        .availability
        .delete_slot(owner_id, role, request.availability_id)
        .await?;
    if !deleted {
        return Err(slot_not_found(request.availability_id));
    }

    info!(slot_id = %request.availability_id, %owner_id, %role, "Availability slot deleted");
    Ok(Json(
        Envelope::success(DeleteAvailabilityResponse {
            availability_id: request.availability_id,
        })
        .with_message("Availability removed"),
    ))
}

/// Projects an owner's active slots onto the dates of the coming horizon.
///
/// # Endpoint
///
/// ```text
/// GET /api/{role}/availability/{owner_id}/projection/?horizon=14&timezone=Europe/Berlin
/// ```
///
/// Without `horizon` the configured default applies, falling back to the
/// role's own default.
#[axum::debug_handler]
pub async fn project_availability(
    State(state): State<Arc<ApiState>>,
    Extension(role): Extension<Role>,
    Path(owner_id): Path<Uuid>,
    Query(query): Query<ProjectionQuery>,
) -> Result<Json<Envelope<ProjectionResponse>>, AppError> {
    let horizon = match query.horizon {
        Some(days) => Horizon::new(days).map_err(AppError::from_domain)?,
        None => state.settings.horizon_for(role),
    };
    let today = match query.timezone.as_deref() {
        Some(name) => {
            let tz = parse_timezone(name).map_err(AppError::from_domain)?;
            Utc::now().with_timezone(&tz).date_naive()
        }
        None => Utc::now().date_naive(),
    };

    let slots = state.availability.list_slots(owner_id, role).await?;
    Ok(Json(Envelope::success(build_projection(&slots, today, horizon))))
}

pub fn build_projection(slots: &[AvailabilitySlot], today: NaiveDate, horizon: Horizon) -> ProjectionResponse {
    let projections = slots
        .iter()
        .filter(|slot| slot.is_active)
        .map(|slot| ProjectedSlotDates {
            availability_id: slot.id,
            day_of_week: slot.day_of_week,
            start_time: slot.start_time,
            end_time: slot.end_time,
            dates: project_dates(slot, today, horizon).collect(),
        })
        .collect();

    ProjectionResponse {
        today,
        horizon_days: horizon.days(),
        projections,
    }
}
