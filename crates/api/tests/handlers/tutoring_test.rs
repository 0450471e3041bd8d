use axum::http::StatusCode;
use mentorhub_core::models::{
    availability::AvailabilitySlot,
    booking::{BookingStatus, TutoringBooking},
    role::Role,
};
use mockall::predicate::eq;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::test_utils::{TestContext, at, slot};

fn monday_slot(tutor_id: Uuid) -> AvailabilitySlot {
    slot(tutor_id, Role::Tutor, 1, "09:00", "12:00")
}

fn booking_body(slot: &AvailabilitySlot, date: &str, start_time: &str) -> Value {
    json!({
        "tutor_id": slot.owner_id,
        "student_id": Uuid::new_v4(),
        "availability_id": slot.id,
        "date": date,
        "start_time": start_time,
        "topic": "Linear algebra",
        "description": "Eigenvalues before the exam"
    })
}

fn booking(slot: &AvailabilitySlot, start: &str, status: BookingStatus) -> TutoringBooking {
    let start = at(start);
    TutoringBooking {
        id: Uuid::new_v4(),
        tutor_id: slot.owner_id,
        student_id: Uuid::new_v4(),
        availability_id: slot.id,
        topic: "Linear algebra".to_string(),
        description: "Eigenvalues".to_string(),
        start,
        end: start + chrono::Duration::hours(1),
        status,
        payment_reference: None,
        created_at: at("2029-12-01T09:00:00Z"),
    }
}

#[test_log::test(tokio::test)]
async fn test_booking_holds_a_seat_pending_payment() {
    let tutor_id = Uuid::new_v4();
    let slot = monday_slot(tutor_id);

    let mut ctx = TestContext::new();
    let found = slot.clone();
    ctx.availability
        .expect_get_slot()
        .with(eq(slot.id))
        .returning(move |_| Ok(Some(found.clone())));
    ctx.bookings
        .expect_active_bookings_for_tutor()
        .returning(|_| Ok(Vec::new()));
    ctx.bookings
        .expect_create_booking()
        .withf(|booking| {
            booking.status == BookingStatus::PendingPayment
                && booking.start == at("2030-01-07T10:00:00Z")
                && booking.end == at("2030-01-07T11:00:00Z")
        })
        .times(1)
        .returning(Ok);

    let server = ctx.server();
    let response = server
        .post("/api/tutoring/bookings/create/")
        .json(&booking_body(&slot, "2030-01-07", "10:00"))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body = response.json::<Value>();
    assert_eq!(body["status"], "success");
    assert_eq!(body["booking"]["status"], "pending_payment");
    assert_eq!(body["booking"]["availability_id"], slot.id.to_string());
}

#[test_log::test(tokio::test)]
async fn test_booking_reads_time_in_the_given_timezone() {
    let slot = monday_slot(Uuid::new_v4());

    let mut ctx = TestContext::new();
    let found = slot.clone();
    ctx.availability
        .expect_get_slot()
        .returning(move |_| Ok(Some(found.clone())));
    ctx.bookings
        .expect_active_bookings_for_tutor()
        .returning(|_| Ok(Vec::new()));
    ctx.bookings
        .expect_create_booking()
        // Berlin is UTC+1 in January
        .withf(|booking| booking.start == at("2030-01-07T09:00:00Z"))
        .times(1)
        .returning(Ok);

    let mut body = booking_body(&slot, "2030-01-07", "10:00");
    body["timezone"] = json!("Europe/Berlin");

    let server = ctx.server();
    let response = server.post("/api/tutoring/bookings/create/").json(&body).await;

    response.assert_status(StatusCode::CREATED);
}

#[test_log::test(tokio::test)]
async fn test_full_slot_is_a_conflict() {
    let slot = monday_slot(Uuid::new_v4());
    let taken = booking(&slot, "2030-01-07T10:30:00Z", BookingStatus::Confirmed);

    let mut ctx = TestContext::new();
    let found = slot.clone();
    ctx.availability
        .expect_get_slot()
        .returning(move |_| Ok(Some(found.clone())));
    ctx.bookings
        .expect_active_bookings_for_tutor()
        .with(eq(slot.owner_id))
        .returning(move |_| Ok(vec![taken.clone()]));
    ctx.bookings.expect_create_booking().never();

    let server = ctx.server();
    let response = server
        .post("/api/tutoring/bookings/create/")
        .json(&booking_body(&slot, "2030-01-07", "10:00"))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    let message = response.json::<Value>()["message"].as_str().unwrap_or_default().to_string();
    assert!(message.contains("fully booked"), "{message}");
}

#[test_log::test(tokio::test)]
async fn test_cancelled_bookings_free_their_seat() {
    let slot = monday_slot(Uuid::new_v4());
    let cancelled = booking(&slot, "2030-01-07T10:00:00Z", BookingStatus::Cancelled);

    let mut ctx = TestContext::new();
    let found = slot.clone();
    ctx.availability
        .expect_get_slot()
        .returning(move |_| Ok(Some(found.clone())));
    ctx.bookings
        .expect_active_bookings_for_tutor()
        .returning(move |_| Ok(vec![cancelled.clone()]));
    ctx.bookings.expect_create_booking().times(1).returning(Ok);

    let server = ctx.server();
    let response = server
        .post("/api/tutoring/bookings/create/")
        .json(&booking_body(&slot, "2030-01-07", "10:00"))
        .await;

    response.assert_status(StatusCode::CREATED);
}

#[test_log::test(tokio::test)]
async fn test_date_must_fall_on_the_slot_weekday() {
    let slot = monday_slot(Uuid::new_v4());

    let mut ctx = TestContext::new();
    let found = slot.clone();
    ctx.availability
        .expect_get_slot()
        .returning(move |_| Ok(Some(found.clone())));
    ctx.bookings.expect_create_booking().never();

    let server = ctx.server();
    let response = server
        .post("/api/tutoring/bookings/create/")
        .json(&booking_body(&slot, "2030-01-09", "10:00"))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[test_log::test(tokio::test)]
async fn test_session_must_fit_inside_the_slot() {
    let slot = monday_slot(Uuid::new_v4());

    let mut ctx = TestContext::new();
    let found = slot.clone();
    ctx.availability
        .expect_get_slot()
        .returning(move |_| Ok(Some(found.clone())));
    ctx.bookings.expect_create_booking().never();

    let server = ctx.server();
    let response = server
        .post("/api/tutoring/bookings/create/")
        .json(&booking_body(&slot, "2030-01-07", "11:30"))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[test_log::test(tokio::test)]
async fn test_past_dates_are_rejected() {
    let slot = monday_slot(Uuid::new_v4());

    let mut ctx = TestContext::new();
    let found = slot.clone();
    ctx.availability
        .expect_get_slot()
        .returning(move |_| Ok(Some(found.clone())));
    ctx.bookings.expect_create_booking().never();

    let server = ctx.server();
    // 2024-01-01 was a Monday
    let response = server
        .post("/api/tutoring/bookings/create/")
        .json(&booking_body(&slot, "2024-01-01", "10:00"))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>()["message"],
        "Please choose a date in the future"
    );
}

#[test_log::test(tokio::test)]
async fn test_slot_of_another_tutor_is_not_found() {
    let slot = monday_slot(Uuid::new_v4());

    let mut ctx = TestContext::new();
    let found = slot.clone();
    ctx.availability
        .expect_get_slot()
        .returning(move |_| Ok(Some(found.clone())));

    let mut body = booking_body(&slot, "2030-01-07", "10:00");
    body["tutor_id"] = json!(Uuid::new_v4());

    let server = ctx.server();
    let response = server.post("/api/tutoring/bookings/create/").json(&body).await;

    response.assert_status(StatusCode::NOT_FOUND);
}

#[test_log::test(tokio::test)]
async fn test_confirm_payment() {
    let slot = monday_slot(Uuid::new_v4());
    let pending = booking(&slot, "2030-01-07T10:00:00Z", BookingStatus::PendingPayment);
    let booking_id = pending.id;

    let mut ctx = TestContext::new();
    let found = pending.clone();
    ctx.bookings
        .expect_get_booking()
        .with(eq(booking_id))
        .returning(move |_| Ok(Some(found.clone())));
    ctx.bookings
        .expect_confirm_payment()
        .with(eq(booking_id), eq("pay_123".to_string()))
        .times(1)
        .returning(move |_, reference| {
            let mut confirmed = pending.clone();
            confirmed.status = BookingStatus::Confirmed;
            confirmed.payment_reference = Some(reference);
            Ok(Some(confirmed))
        });

    let server = ctx.server();
    let response = server
        .post(&format!("/api/tutoring/bookings/{booking_id}/confirm-payment/"))
        .json(&json!({ "payment_reference": " pay_123 " }))
        .await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["booking"]["status"], "confirmed");
    assert_eq!(body["booking"]["payment_reference"], "pay_123");
}

#[test_log::test(tokio::test)]
async fn test_confirm_payment_is_idempotent_for_the_same_reference() {
    let slot = monday_slot(Uuid::new_v4());
    let mut confirmed = booking(&slot, "2030-01-07T10:00:00Z", BookingStatus::Confirmed);
    confirmed.payment_reference = Some("pay_123".to_string());
    let booking_id = confirmed.id;

    let mut ctx = TestContext::new();
    ctx.bookings
        .expect_get_booking()
        .returning(move |_| Ok(Some(confirmed.clone())));
    ctx.bookings.expect_confirm_payment().never();

    let server = ctx.server();
    let path = format!("/api/tutoring/bookings/{booking_id}/confirm-payment/");

    let response = server.post(&path).json(&json!({ "payment_reference": "pay_123" })).await;
    response.assert_status_ok();

    let response = server.post(&path).json(&json!({ "payment_reference": "pay_999" })).await;
    response.assert_status(StatusCode::CONFLICT);
}

#[test_log::test(tokio::test)]
async fn test_confirm_payment_needs_a_reference() {
    let server = TestContext::new().server();
    let response = server
        .post(&format!("/api/tutoring/bookings/{}/confirm-payment/", Uuid::new_v4()))
        .json(&json!({ "payment_reference": "  " }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[test_log::test(tokio::test)]
async fn test_cancelled_booking_cannot_be_paid() {
    let slot = monday_slot(Uuid::new_v4());
    let cancelled = booking(&slot, "2030-01-07T10:00:00Z", BookingStatus::Cancelled);
    let booking_id = cancelled.id;

    let mut ctx = TestContext::new();
    ctx.bookings
        .expect_get_booking()
        .returning(move |_| Ok(Some(cancelled.clone())));

    let server = ctx.server();
    let response = server
        .post(&format!("/api/tutoring/bookings/{booking_id}/confirm-payment/"))
        .json(&json!({ "payment_reference": "pay_123" }))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    assert_eq!(
        response.json::<Value>()["message"],
        "This booking has been cancelled"
    );
}

#[test_log::test(tokio::test)]
async fn test_tutor_booked_on_another_slot_is_a_conflict() {
    let tutor_id = Uuid::new_v4();
    let mut paused = monday_slot(tutor_id);
    paused.is_active = false;
    let active = monday_slot(tutor_id);
    let taken = booking(&paused, "2030-01-07T10:00:00Z", BookingStatus::Confirmed);

    let mut ctx = TestContext::new();
    let found = active.clone();
    ctx.availability
        .expect_get_slot()
        .with(eq(active.id))
        .returning(move |_| Ok(Some(found.clone())));
    ctx.bookings
        .expect_active_bookings_for_tutor()
        .with(eq(tutor_id))
        .returning(move |_| Ok(vec![taken.clone()]));
    ctx.bookings.expect_create_booking().never();

    let server = ctx.server();
    let response = server
        .post("/api/tutoring/bookings/create/")
        .json(&booking_body(&active, "2030-01-07", "10:00"))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    let message = response.json::<Value>()["message"].as_str().unwrap_or_default().to_string();
    assert!(message.contains("overlaps an existing session"), "{message}");
}

#[test_log::test(tokio::test)]
async fn test_group_slot_seats_do_not_stretch_to_other_slots() {
    let tutor_id = Uuid::new_v4();
    let mut group = monday_slot(tutor_id);
    group.max_occupants = 3;
    let elsewhere = monday_slot(tutor_id);
    let same_slot = booking(&group, "2030-01-07T10:00:00Z", BookingStatus::PendingPayment);
    let later_elsewhere = booking(&elsewhere, "2030-01-07T11:00:00Z", BookingStatus::Confirmed);

    let mut ctx = TestContext::new();
    let found = group.clone();
    ctx.availability
        .expect_get_slot()
        .returning(move |_| Ok(Some(found.clone())));
    ctx.bookings
        .expect_active_bookings_for_tutor()
        .returning(move |_| Ok(vec![same_slot.clone(), later_elsewhere.clone()]));
    ctx.bookings.expect_create_booking().times(1).returning(Ok);

    let server = ctx.server();

    // A second seat at 10:00 fits; the 11:00 booking on the other slot starts as it ends
    let response = server
        .post("/api/tutoring/bookings/create/")
        .json(&booking_body(&group, "2030-01-07", "10:00"))
        .await;
    response.assert_status(StatusCode::CREATED);

    let response = server
        .post("/api/tutoring/bookings/create/")
        .json(&booking_body(&group, "2030-01-07", "10:30"))
        .await;
    response.assert_status(StatusCode::CONFLICT);
}

#[test_log::test(tokio::test)]
async fn test_cancel_booking_frees_the_seat() {
    let slot = monday_slot(Uuid::new_v4());
    let pending = booking(&slot, "2030-01-07T10:00:00Z", BookingStatus::PendingPayment);
    let booking_id = pending.id;

    let mut ctx = TestContext::new();
    let found = pending.clone();
    ctx.bookings
        .expect_get_booking()
        .with(eq(booking_id))
        .returning(move |_| Ok(Some(found.clone())));
    ctx.bookings
        .expect_cancel_booking()
        .with(eq(booking_id))
        .times(1)
        .returning(move |_| {
            let mut cancelled = pending.clone();
            cancelled.status = BookingStatus::Cancelled;
            Ok(Some(cancelled))
        });

    let server = ctx.server();
    let response = server
        .post(&format!("/api/tutoring/bookings/{booking_id}/cancel/"))
        .await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["status"], "success");
    assert_eq!(body["booking"]["status"], "cancelled");
}

#[test_log::test(tokio::test)]
async fn test_cancelling_twice_changes_nothing() {
    let slot = monday_slot(Uuid::new_v4());
    let cancelled = booking(&slot, "2030-01-07T10:00:00Z", BookingStatus::Cancelled);
    let booking_id = cancelled.id;

    let mut ctx = TestContext::new();
    ctx.bookings
        .expect_get_booking()
        .returning(move |_| Ok(Some(cancelled.clone())));
    ctx.bookings.expect_cancel_booking().never();

    let server = ctx.server();
    let response = server
        .post(&format!("/api/tutoring/bookings/{booking_id}/cancel/"))
        .await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["booking"]["status"], "cancelled");
}

#[test_log::test(tokio::test)]
async fn test_cancel_unknown_booking_is_not_found() {
    let mut ctx = TestContext::new();
    ctx.bookings.expect_get_booking().returning(|_| Ok(None));

    let server = ctx.server();
    let response = server
        .post(&format!("/api/tutoring/bookings/{}/cancel/", Uuid::new_v4()))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
}

#[test_log::test(tokio::test)]
async fn test_payment_after_cancellation_elsewhere_is_a_conflict() {
    let slot = monday_slot(Uuid::new_v4());
    let pending = booking(&slot, "2030-01-07T10:00:00Z", BookingStatus::PendingPayment);
    let booking_id = pending.id;

    let mut ctx = TestContext::new();
    ctx.bookings
        .expect_get_booking()
        .returning(move |_| Ok(Some(pending.clone())));
    // The row left pending_payment after it was read
    ctx.bookings
        .expect_confirm_payment()
        .times(1)
        .returning(|_, _| Ok(None));

    let server = ctx.server();
    let response = server
        .post(&format!("/api/tutoring/bookings/{booking_id}/confirm-payment/"))
        .json(&json!({ "payment_reference": "pay_123" }))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    assert_eq!(
        response.json::<Value>()["message"],
        "This booking is no longer awaiting payment"
    );
}
