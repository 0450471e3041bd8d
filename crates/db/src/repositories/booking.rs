use eyre::Result;
use mentorhub_core::models::booking::{BookingStatus, TutoringBooking};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::models::{DbTutoringBooking, convert_all};

const BOOKING_COLUMNS: &str = "id, tutor_id, student_id, availability_id, topic, description, \
     start_time, end_time, status, payment_reference, created_at";

pub async fn create_booking(
    pool: &Pool<Postgres>,
    booking: &TutoringBooking,
) -> Result<TutoringBooking> {
    tracing::debug!(
        "Creating booking: id={}, tutor={}, slot={}, start={}",
        booking.id,
        booking.tutor_id,
        booking.availability_id,
        booking.start
    );

    let row = sqlx::query_as::<_, DbTutoringBooking>(&format!(
        r#"
        INSERT INTO tutoring_bookings
            (id, tutor_id, student_id, availability_id, topic, description,
             start_time, end_time, status, payment_reference, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING {BOOKING_COLUMNS}
        "#
    ))
    .bind(booking.id)
    .bind(booking.tutor_id)
    .bind(booking.student_id)
    .bind(booking.availability_id)
    .bind(&booking.topic)
    .bind(&booking.description)
    .bind(booking.start)
    .bind(booking.end)
    .bind(booking.status.as_str())
    .bind(booking.payment_reference.as_deref())
    .bind(booking.created_at)
    .fetch_one(pool)
    .await?;

    TutoringBooking::try_from(row)
}

pub async fn get_booking(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<TutoringBooking>> {
    let row = sqlx::query_as::<_, DbTutoringBooking>(&format!(
        "SELECT {BOOKING_COLUMNS} FROM tutoring_bookings WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.map(TutoringBooking::try_from).transpose()
}

/// A tutor's bookings that still hold their time and have not ended yet,
/// across all of the tutor's slots.
pub async fn active_bookings_for_tutor(
    pool: &Pool<Postgres>,
    tutor_id: Uuid,
) -> Result<Vec<TutoringBooking>> {
    let rows = sqlx::query_as::<_, DbTutoringBooking>(&format!(
        r#"
        SELECT {BOOKING_COLUMNS}
        FROM tutoring_bookings
        WHERE tutor_id = $1 AND status <> $2 AND end_time > NOW()
        ORDER BY start_time ASC
        "#
    ))
    .bind(tutor_id)
    .bind(BookingStatus::Cancelled.as_str())
    .fetch_all(pool)
    .await?;

    convert_all(rows)
}

/// Records the payment of a booking that is still awaiting it. `None` when
/// the booking is missing or no longer pending payment.
pub async fn confirm_payment(
    pool: &Pool<Postgres>,
    id: Uuid,
    payment_reference: &str,
) -> Result<Option<TutoringBooking>> {
    let row = sqlx::query_as::<_, DbTutoringBooking>(&format!(
        r#"
        UPDATE tutoring_bookings
        SET status = $2, payment_reference = $3
        WHERE id = $1 AND status = $4
        RETURNING {BOOKING_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(BookingStatus::Confirmed.as_str())
    .bind(payment_reference)
    .bind(BookingStatus::PendingPayment.as_str())
    .fetch_optional(pool)
    .await?;

    if row.is_some() {
        tracing::debug!("Payment recorded for booking {}", id);
    }
    row.map(TutoringBooking::try_from).transpose()
}

/// Cancels a booking, releasing its seat. Cancelling twice is a no-op.
pub async fn cancel_booking(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<TutoringBooking>> {
    let row = sqlx::query_as::<_, DbTutoringBooking>(&format!(
        "UPDATE tutoring_bookings SET status = $2 WHERE id = $1 RETURNING {BOOKING_COLUMNS}"
    ))
    .bind(id)
    .bind(BookingStatus::Cancelled.as_str())
    .fetch_optional(pool)
    .await?;

    row.map(TutoringBooking::try_from).transpose()
}
