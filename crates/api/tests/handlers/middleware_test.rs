use axum::{http::StatusCode, response::Response};
use mentorhub_api::middleware::error_handling::{AppError, map_error};
use mentorhub_core::{errors::HubError, scheduling::conflict::ConflictError};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::Value;

async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    serde_json::from_slice(&bytes).expect("Body is not JSON")
}

#[rstest]
#[case(HubError::NotFound("Mentoring session not found".into()), StatusCode::NOT_FOUND)]
#[case(HubError::Validation("Please enter a topic".into()), StatusCode::BAD_REQUEST)]
#[case(HubError::Conflict("This slot is fully booked".into()), StatusCode::CONFLICT)]
#[case(HubError::Unresolved("No start time".into()), StatusCode::UNPROCESSABLE_ENTITY)]
#[case(HubError::Database(eyre::eyre!("connection refused")), StatusCode::INTERNAL_SERVER_ERROR)]
#[tokio::test]
async fn test_error_status_mapping(#[case] error: HubError, #[case] expected: StatusCode) {
    let response = map_error(error);
    assert_eq!(response.status(), expected);

    let body = body_json(response).await;
    assert_eq!(body["status"], "error");
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_error_body_carries_the_bare_message() {
    let body = body_json(map_error(HubError::Validation("Please enter a topic".into()))).await;
    assert_eq!(body["message"], "Please enter a topic");
}

#[tokio::test]
async fn test_internal_details_stay_out_of_the_body() {
    let body = body_json(map_error(HubError::Database(eyre::eyre!("password authentication failed")))).await;
    let message = body["message"].as_str().unwrap_or_default();
    assert!(!message.contains("password"), "{message}");
}

#[tokio::test]
async fn test_domain_conflicts_map_by_kind() {
    let same = AppError::from_domain(ConflictError::SameAsCurrent);
    assert_eq!(same.status_code(), StatusCode::CONFLICT);

    let unresolved = AppError::from_domain(ConflictError::Unresolved("no start time".into()));
    assert_eq!(unresolved.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
}
