use axum::{
    routing::post,
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/tutoring/bookings/create/",
            post(handlers::tutoring::create_booking),
        )
        .route(
            "/api/tutoring/bookings/:id/confirm-payment/",
            post(handlers::tutoring::confirm_payment),
        )
        .route(
            "/api/tutoring/bookings/:id/cancel/",
            post(handlers::tutoring::cancel_booking),
        )
}
