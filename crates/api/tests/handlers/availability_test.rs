use axum::http::StatusCode;
use chrono::{Datelike, NaiveDate};
use mentorhub_core::models::role::Role;
use mockall::predicate::{always, eq};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::test_utils::{TestContext, slot};

#[test_log::test(tokio::test)]
async fn test_list_availability_uses_role_from_path() {
    let owner_id = Uuid::new_v4();
    let existing = slot(owner_id, Role::Tutor, 2, "09:00", "11:00");

    let mut ctx = TestContext::new();
    let listed = vec![existing.clone()];
    ctx.availability
        .expect_list_slots()
        .with(eq(owner_id), eq(Role::Tutor))
        .times(1)
        .returning(move |_, _| Ok(listed.clone()));

    let server = ctx.server();
    let response = server
        .get(&format!("/api/tutoring/availability/{owner_id}/"))
        .await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["status"], "success");
    assert_eq!(body["availability"][0]["start_time"], "09:00");
    assert_eq!(body["availability"][0]["role"], "tutoring");
}

#[test_log::test(tokio::test)]
async fn test_inverted_slot_is_rejected_before_storage() {
    let mut ctx = TestContext::new();
    ctx.availability.expect_upsert_slot().never();

    let server = ctx.server();
    let response = server
        .post(&format!("/api/mentoring/availability/{}/", Uuid::new_v4()))
        .json(&json!({
            "day_of_week": 3,
            "start_time": "17:00",
            "end_time": "09:00"
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body = response.json::<Value>();
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "Start time must be before end time");
}

#[test_log::test(tokio::test)]
async fn test_new_slot_is_created() {
    let owner_id = Uuid::new_v4();
    let mut ctx = TestContext::new();
    ctx.availability
        .expect_list_slots()
        .returning(|_, _| Ok(Vec::new()));
    ctx.availability
        .expect_upsert_slot()
        .times(1)
        .returning(|slot| Ok(Some(slot)));

    let server = ctx.server();
    let response = server
        .post(&format!("/api/counselling/availability/{owner_id}/"))
        .json(&json!({
            "day_of_week": 1,
            "start_time": "13:00",
            "end_time": "15:30:00"
        }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body = response.json::<Value>();
    assert_eq!(body["availability"]["role"], "counselling");
    assert_eq!(body["availability"]["end_time"], "15:30");
    assert_eq!(body["availability"]["owner_id"], owner_id.to_string());
}

#[test_log::test(tokio::test)]
async fn test_resubmitted_edit_updates_the_same_slot() {
    let owner_id = Uuid::new_v4();
    let existing = slot(owner_id, Role::Mentor, 4, "10:00", "12:00");
    let slot_id = existing.id;

    let mut ctx = TestContext::new();
    let found = existing.clone();
    ctx.availability
        .expect_get_slot()
        .with(eq(slot_id))
        .times(2)
        .returning(move |_| Ok(Some(found.clone())));
    let listed = vec![existing.clone()];
    ctx.availability
        .expect_list_slots()
        .returning(move |_, _| Ok(listed.clone()));
    ctx.availability
        .expect_upsert_slot()
        .withf(move |slot| slot.id == slot_id)
        .times(2)
        .returning(|slot| Ok(Some(slot)));

    let server = ctx.server();
    let edit = json!({
        "availability_id": slot_id,
        "day_of_week": 4,
        "start_time": "10:00",
        "end_time": "13:00"
    });
    let path = format!("/api/mentoring/availability/{owner_id}/");

    for _ in 0..2 {
        let response = server.post(&path).json(&edit).await;
        // An update, never a second insert
        response.assert_status_ok();
        let body = response.json::<Value>();
        assert_eq!(body["availability"]["id"], slot_id.to_string());
        assert_eq!(body["availability"]["end_time"], "13:00");
    }
}

#[test_log::test(tokio::test)]
async fn test_overlapping_slot_is_rejected() {
    let owner_id = Uuid::new_v4();
    let existing = slot(owner_id, Role::Mentor, 2, "09:00", "11:00");

    let mut ctx = TestContext::new();
    let listed = vec![existing];
    ctx.availability
        .expect_list_slots()
        .returning(move |_, _| Ok(listed.clone()));
    ctx.availability.expect_upsert_slot().never();

    let server = ctx.server();
    let response = server
        .post(&format!("/api/mentoring/availability/{owner_id}/"))
        .json(&json!({
            "day_of_week": 2,
            "start_time": "10:30",
            "end_time": "12:00"
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let message = response.json::<Value>()["message"].as_str().unwrap_or_default().to_string();
    assert!(message.contains("overlaps an existing slot"), "{message}");
}

#[test_log::test(tokio::test)]
async fn test_slot_of_another_owner_is_not_editable() {
    let other_owner = Uuid::new_v4();
    let foreign = slot(other_owner, Role::Mentor, 2, "09:00", "11:00");
    let foreign_id = foreign.id;

    let mut ctx = TestContext::new();
    ctx.availability
        .expect_get_slot()
        .returning(move |_| Ok(Some(foreign.clone())));
    ctx.availability.expect_upsert_slot().never();

    let server = ctx.server();
    let response = server
        .put(&format!("/api/mentoring/availability/{}/", Uuid::new_v4()))
        .json(&json!({
            "availability_id": foreign_id,
            "day_of_week": 2,
            "start_time": "09:00",
            "end_time": "10:00"
        }))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
}

#[test_log::test(tokio::test)]
async fn test_update_requires_an_id() {
    let server = TestContext::new().server();
    let response = server
        .put(&format!("/api/tutoring/availability/{}/", Uuid::new_v4()))
        .json(&json!({
            "day_of_week": 2,
            "start_time": "09:00",
            "end_time": "10:00"
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[test_log::test(tokio::test)]
async fn test_delete_availability() {
    let owner_id = Uuid::new_v4();
    let slot_id = Uuid::new_v4();
    let missing_id = Uuid::new_v4();

    let mut ctx = TestContext::new();
    ctx.availability
        .expect_delete_slot()
        .with(eq(owner_id), eq(Role::Tutor), eq(slot_id))
        .returning(|_, _, _| Ok(true));
    ctx.availability
        .expect_delete_slot()
        .with(always(), always(), eq(missing_id))
        .returning(|_, _, _| Ok(false));

    let server = ctx.server();
    let path = format!("/api/tutoring/availability/{owner_id}/");

    let response = server.delete(&path).json(&json!({ "availability_id": slot_id })).await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["availability_id"], slot_id.to_string());

    let response = server.delete(&path).json(&json!({ "availability_id": missing_id })).await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[test_log::test(tokio::test)]
async fn test_projection_lists_dates_per_active_slot() {
    let owner_id = Uuid::new_v4();
    let monday = slot(owner_id, Role::Mentor, 1, "09:00", "10:00");
    let mut inactive = slot(owner_id, Role::Mentor, 3, "09:00", "10:00");
    inactive.is_active = false;

    let mut ctx = TestContext::new();
    let listed = vec![monday.clone(), inactive];
    ctx.availability
        .expect_list_slots()
        .returning(move |_, _| Ok(listed.clone()));

    let server = ctx.server();
    let response = server
        .get(&format!("/api/mentoring/availability/{owner_id}/projection/"))
        .add_query_param("horizon", 7)
        .await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["horizon_days"], 7);
    let projections = body["projections"].as_array().cloned().unwrap_or_default();
    assert_eq!(projections.len(), 1);
    assert_eq!(projections[0]["availability_id"], monday.id.to_string());

    // A seven-day window holds every weekday exactly once
    let dates = projections[0]["dates"].as_array().cloned().unwrap_or_default();
    assert_eq!(dates.len(), 1);
    let date: NaiveDate = serde_json::from_value(dates[0].clone()).unwrap();
    assert_eq!(date.weekday().num_days_from_sunday(), 1);
}

#[test_log::test(tokio::test)]
async fn test_projection_rejects_out_of_range_horizon() {
    let server = TestContext::new().server();
    let response = server
        .get(&format!("/api/mentoring/availability/{}/projection/", Uuid::new_v4()))
        .add_query_param("horizon", 31)
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[test_log::test(tokio::test)]
async fn test_unknown_role_has_no_routes() {
    let server = TestContext::new().server();
    let response = server
        .get(&format!("/api/plumbing/availability/{}/", Uuid::new_v4()))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
}

#[test_log::test(tokio::test)]
async fn test_new_id_claimed_by_another_owner_is_not_found() {
    let owner_id = Uuid::new_v4();
    let claimed_id = Uuid::new_v4();

    let mut ctx = TestContext::new();
    // Free when looked up, taken by the time the row is written
    ctx.availability
        .expect_get_slot()
        .with(eq(claimed_id))
        .returning(|_| Ok(None));
    ctx.availability
        .expect_list_slots()
        .returning(|_, _| Ok(Vec::new()));
    ctx.availability
        .expect_upsert_slot()
        .withf(move |slot| slot.id == claimed_id && slot.owner_id == owner_id)
        .times(1)
        .returning(|_| Ok(None));

    let server = ctx.server();
    let response = server
        .post(&format!("/api/tutoring/availability/{owner_id}/"))
        .json(&json!({
            "availability_id": claimed_id,
            "day_of_week": 5,
            "start_time": "14:00",
            "end_time": "16:00"
        }))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["status"], "error");
}
