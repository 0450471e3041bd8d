//! # MentorHub API
//!
//! The API crate provides the web server for MentorHub scheduling: owners'
//! weekly availability, mentoring requests and sessions, and tutoring
//! bookings.
//!
//! ## Architecture
//!
//! This crate follows a layered architecture:
//!
//! - **Routes**: Define API endpoints and URL structure
//! - **Handlers**: Validate requests, run the scheduling checks from
//!   `mentorhub-core` and call the repositories
//! - **Middleware**: Error mapping and per-owner write serialization
//! - **Config**: Handle environment and application configuration
//!
//! The API uses Axum as the web framework. Storage sits behind the repository
//! traits of `mentorhub-db`, so handlers run unchanged against Postgres or
//! against mocks.

/// Configuration module for API settings
pub mod config;
/// Request handlers that implement business logic
pub mod handlers;
/// Error mapping and owner locks
pub mod middleware;
/// Route definitions and API endpoint structure
pub mod routes;

use std::{sync::Arc, time::Duration as StdDuration};

use axum::{
    Router,
    error_handling::HandleErrorLayer,
    http::{HeaderValue, Method, header},
};
use chrono::Duration;
use eyre::{Result, WrapErr};
use mentorhub_core::{
    models::role::Role,
    scheduling::{interval::default_session_length, projector::Horizon},
};
use mentorhub_db::{AvailabilityRepository, BookingRepository, DbPool, PgStore, SessionRepository};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::FmtSubscriber;

use crate::middleware::{error_handling::handle_timeout_error, owner_lock::OwnerLocks};

/// Scheduling defaults applied when a request leaves them out.
#[derive(Debug, Clone, Copy)]
pub struct SchedulingSettings {
    /// Overrides every role's own projection horizon when set
    pub default_horizon: Option<Horizon>,
    pub session_length: Duration,
}

impl SchedulingSettings {
    pub fn from_config(config: &config::ApiConfig) -> Self {
        Self {
            default_horizon: config.default_horizon,
            session_length: config.session_length(),
        }
    }

    pub fn horizon_for(&self, role: Role) -> Horizon {
        self.default_horizon.unwrap_or_else(|| {
            Horizon::new(role.descriptor().default_horizon_days).unwrap_or_default()
        })
    }
}

impl Default for SchedulingSettings {
    fn default() -> Self {
        Self {
            default_horizon: None,
            session_length: default_session_length(),
        }
    }
}

/// Shared application state that is accessible to all request handlers
///
/// # Example
///
/// ```no_run
/// # async fn example(pool: mentorhub_db::DbPool) {
/// use std::sync::Arc;
/// use mentorhub_api::{ApiState, SchedulingSettings, build_router};
/// use mentorhub_db::PgStore;
///
/// let state = Arc::new(ApiState::new(PgStore::new(pool), SchedulingSettings::default()));
/// let app = build_router(state);
/// # }
/// ```
pub struct ApiState {
    pub availability: Arc<dyn AvailabilityRepository>,
    pub sessions: Arc<dyn SessionRepository>,
    pub bookings: Arc<dyn BookingRepository>,
    pub locks: OwnerLocks,
    pub settings: SchedulingSettings,
}

impl ApiState {
    pub fn new(store: PgStore, settings: SchedulingSettings) -> Self {
        let store = Arc::new(store);
        Self::from_repositories(store.clone(), store.clone(), store, settings)
    }

    pub fn from_repositories(
        availability: Arc<dyn AvailabilityRepository>,
        sessions: Arc<dyn SessionRepository>,
        bookings: Arc<dyn BookingRepository>,
        settings: SchedulingSettings,
    ) -> Self {
        Self {
            availability,
            sessions,
            bookings,
            locks: OwnerLocks::new(),
            settings,
        }
    }
}

/// Builds the application router with all routes attached to `state`.
pub fn build_router(state: Arc<ApiState>) -> Router {
    Router::new()
        // Health check endpoints
        .merge(routes::health::routes())
        // Availability endpoints for every role
        .merge(routes::availability::routes())
        // Mentoring request and session endpoints
        .merge(routes::mentoring::routes())
        // Tutoring booking endpoints
        .merge(routes::tutoring::routes())
        .with_state(state)
}

/// Starts the API server with the provided configuration and database connection
///
/// This function initializes logging, configures routes and middleware, and
/// serves HTTP until the process is stopped.
pub async fn start_server(config: config::ApiConfig, db_pool: DbPool) -> Result<()> {
    // Initialize tracing for logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Create shared state with dependencies
    let settings = SchedulingSettings::from_config(&config);
    let state = Arc::new(ApiState::new(PgStore::new(db_pool), settings));

    let app = build_router(state).layer(TraceLayer::new_for_http());

    // Apply CORS configuration if origins are specified
    let app = if let Some(origins) = &config.cors_origins {
        let origins = origins
            .iter()
            .map(|origin| {
                origin
                    .parse::<HeaderValue>()
                    .wrap_err_with(|| format!("Invalid CORS origin: {}", origin))
            })
            .collect::<Result<Vec<_>>>()?;

        let cors = CorsLayer::new()
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
            .allow_origin(origins)
            .allow_credentials(true);

        app.layer(cors)
    } else {
        app
    };

    // Add request timeout middleware
    let app = app.layer(
        ServiceBuilder::new()
            .layer(HandleErrorLayer::new(handle_timeout_error))
            .timeout(StdDuration::from_secs(config.request_timeout)),
    );

    // Start the HTTP server
    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
