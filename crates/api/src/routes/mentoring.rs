use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/mentoring/requests/",
            post(handlers::mentoring::create_request),
        )
        .route(
            "/api/mentoring/requests/:id/accept/",
            post(handlers::mentoring::accept_request),
        )
        .route(
            "/api/mentoring/requests/:id/decline/",
            post(handlers::mentoring::decline_request),
        )
        // `:id` is the mentor here and the session below
        .route(
            "/api/mentoring/sessions/:id/",
            get(handlers::mentoring::list_sessions),
        )
        .route(
            "/api/mentoring/sessions/:id/cancel/",
            post(handlers::mentoring::cancel_session),
        )
        .route(
            "/api/mentoring/sessions/:id/complete/",
            post(handlers::mentoring::complete_session),
        )
        .route(
            "/api/mentoring/sessions/:id/reschedule/",
            post(handlers::mentoring::reschedule_session),
        )
}
