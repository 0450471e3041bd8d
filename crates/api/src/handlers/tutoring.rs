//! # Tutoring Handlers
//!
//! Students book one occurrence of a tutor's availability slot directly. The
//! booking holds its seat in `pending_payment` until a payment reference is
//! recorded against it, or until it is cancelled.
//!
//! A tutor is one person: a new booking must fit the capacity of its own slot
//! and must not overlap the tutor's bookings on any other slot, including
//! paused or deleted ones.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use chrono_tz::Tz;
use mentorhub_core::{
    errors::HubError,
    models::{
        booking::{
            BookingResponse, BookingStatus, ConfirmPaymentRequest, CreateBookingRequest,
            TutoringBooking,
        },
        envelope::Envelope,
        role::Role,
    },
    scheduling::{
        conflict::{check_booking, check_capacity},
        interval::BookedInterval,
        projector::{localize, parse_timezone, session_window},
    },
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{ApiState, middleware::error_handling::AppError};

/// Books a session inside one of the tutor's slots.
///
/// # Endpoint
///
/// ```text
/// POST /api/tutoring/bookings/create/
/// ```
///
/// `date` and `start_time` are read in `timezone` (default UTC). The session
/// must fit inside the slot on the slot's weekday and start in the future.
///
/// # Errors
///
/// * `HubError::NotFound` - The slot does not exist or is not this tutor's
/// * `HubError::Validation` - Missing details, wrong weekday, outside the slot,
///   unknown timezone, or a time in the past
/// * `HubError::Conflict` - The slot is already full at that time, or the
///   tutor is booked on another slot then
#[axum::debug_handler]
pub async fn create_booking(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<Envelope<BookingResponse>>), AppError> {
    let topic = payload.topic.trim();
    if topic.is_empty() {
        return Err(AppError(HubError::Validation("Please enter a topic".to_string())));
    }
    let description = payload.description.trim();
    if description.is_empty() {
        return Err(AppError(HubError::Validation("Please enter a description".to_string())));
    }

    let slot = state
        .availability
        .get_slot(payload.availability_id)
        .await?
        .filter(|slot| slot.owner_id == payload.tutor_id && slot.role == Role::Tutor)
        .ok_or_else(|| {
            HubError::NotFound(format!("Availability slot {} not found", payload.availability_id))
        })?;

    let tz = match payload.timezone.as_deref() {
        Some(name) => parse_timezone(name).map_err(AppError::from_domain)?,
        None => Tz::UTC,
    };
    let window = session_window(&slot, payload.date, payload.start_time, state.settings.session_length)
        .map_err(AppError::from_domain)?;
    let candidate = localize(&window, tz).map_err(AppError::from_domain)?;
    if candidate.start <= Utc::now() {
        return Err(AppError(HubError::Validation(
            "Please choose a date in the future".to_string(),
        )));
    }

    let _guard = state.locks.lock(slot.owner_id).await;
    let (same_slot, other_slots): (Vec<_>, Vec<_>) = state
        .bookings
        .active_bookings_for_tutor(slot.owner_id)
        .await?
        .into_iter()
        .filter(TutoringBooking::is_blocking)
        .partition(|booking| booking.availability_id == slot.id);
    let checked = check_capacity(&candidate, &intervals(&same_slot), slot.max_occupants)
        .and_then(|()| check_booking(&candidate, &intervals(&other_slots)));
    if let Err(err) = checked {
        warn!(slot_id = %slot.id, start = %candidate.start, "Rejected booking: {}", err);
        return Err(AppError::from_domain(err));
    }

    let booking = state
        .bookings
        .create_booking(TutoringBooking {
            id: Uuid::new_v4(),
            tutor_id: payload.tutor_id,
            student_id: payload.student_id,
            availability_id: slot.id,
            topic: topic.to_string(),
            description: description.to_string(),
            start: candidate.start,
            end: candidate.end,
            status: BookingStatus::PendingPayment,
            payment_reference: None,
            created_at: Utc::now(),
        })
        .await?;

    info!(booking_id = %booking.id, slot_id = %slot.id, start = %booking.start, "Tutoring booking created");
    Ok((
        StatusCode::CREATED,
        Json(Envelope::success(BookingResponse { booking }).with_message("Booking created")),
    ))
}

/// Records the payment reference and confirms the booking.
///
/// # Endpoint
///
/// ```text
/// POST /api/tutoring/bookings/{id}/confirm-payment/
/// {"payment_reference": "..."}
/// ```
///
/// Confirming again with the same reference returns the booking unchanged.
///
/// # Errors
///
/// * `HubError::NotFound` - No such booking
/// * `HubError::Conflict` - Cancelled, or confirmed with another reference
#[axum::debug_handler]
pub async fn confirm_payment(
    State(state): State<Arc<ApiState>>,
    Path(booking_id): Path<Uuid>,
    Json(payload): Json<ConfirmPaymentRequest>,
) -> Result<Json<Envelope<BookingResponse>>, AppError> {
    let reference = payload.payment_reference.trim();
    if reference.is_empty() {
        return Err(AppError(HubError::Validation(
            "Payment reference is required".to_string(),
        )));
    }

    let tutor_id = find_booking(&state, booking_id).await?.tutor_id;
    let _guard = state.locks.lock(tutor_id).await;

    let booking = find_booking(&state, booking_id).await?;
    match booking.status {
        BookingStatus::PendingPayment => {}
        BookingStatus::Confirmed if booking.payment_reference.as_deref() == Some(reference) => {
            return Ok(Json(Envelope::success(BookingResponse { booking })));
        }
        BookingStatus::Confirmed => {
            return Err(AppError(HubError::Conflict(
                "This booking is already confirmed".to_string(),
            )));
        }
        BookingStatus::Cancelled => {
            return Err(AppError(HubError::Conflict(
                "This booking has been cancelled".to_string(),
            )));
        }
    }

    let booking = state
        .bookings
        .confirm_payment(booking_id, reference.to_string())
        .await?
        .ok_or_else(|| {
            AppError(HubError::Conflict(
                "This booking is no longer awaiting payment".to_string(),
            ))
        })?;

    info!(%booking_id, "Tutoring booking confirmed");
    Ok(Json(
        Envelope::success(BookingResponse { booking }).with_message("Payment confirmed"),
    ))
}

/// Cancels a booking and releases its seat.
///
/// # Endpoint
///
/// ```text
/// POST /api/tutoring/bookings/{id}/cancel/
/// ```
///
/// Cancelling a cancelled booking returns it unchanged.
#[axum::debug_handler]
pub async fn cancel_booking(
    State(state): State<Arc<ApiState>>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<Envelope<BookingResponse>>, AppError> {
    let booking = find_booking(&state, booking_id).await?;
    if booking.status == BookingStatus::Cancelled {
        return Ok(Json(Envelope::success(BookingResponse { booking })));
    }

    let _guard = state.locks.lock(booking.tutor_id).await;
    let booking = state
        .bookings
        .cancel_booking(booking_id)
        .await?
        .ok_or_else(|| booking_not_found(booking_id))?;

    info!(%booking_id, "Tutoring booking cancelled");
    Ok(Json(
        Envelope::success(BookingResponse { booking }).with_message("Booking cancelled"),
    ))
}

async fn find_booking(state: &ApiState, booking_id: Uuid) -> Result<TutoringBooking, AppError> {
    state
        .bookings
        .get_booking(booking_id)
        .await?
        .ok_or_else(|| booking_not_found(booking_id))
}

fn booking_not_found(booking_id: Uuid) -> AppError {
    AppError(HubError::NotFound(format!("Tutoring booking {} not found", booking_id)))
}

fn intervals(bookings: &[TutoringBooking]) -> Vec<BookedInterval> {
    bookings.iter().map(TutoringBooking::interval).collect()
}
