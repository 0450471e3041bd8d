use axum::{
    routing::get,
    Extension, Router,
};
use mentorhub_core::models::role::Role;
use std::sync::Arc;

use crate::{handlers, ApiState};

/// Availability routes for every role, e.g. `/api/tutoring/availability/{owner_id}/`.
pub fn routes() -> Router<Arc<ApiState>> {
    Role::ALL
        .into_iter()
        .fold(Router::new(), |router, role| router.merge(role_routes(role)))
}

fn role_routes(role: Role) -> Router<Arc<ApiState>> {
    let base = format!("/api/{}/availability/:owner_id/", role.descriptor().path_segment);

    Router::new()
        .route(
            &base,
            get(handlers::availability::list_availability)
                .post(handlers::availability::create_availability)
                .put(handlers::availability::update_availability)
                .delete(handlers::availability::delete_availability),
        )
        .route(
            &format!("{base}projection/"),
            get(handlers::availability::project_availability),
        )
        .layer(Extension(role))
}
