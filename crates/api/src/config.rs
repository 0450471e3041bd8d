//! # API Configuration Module
//!
//! This module handles loading and managing configuration for the MentorHub API server.
//! It retrieves configuration values from environment variables and provides defaults
//! where appropriate.
//!
//! ## Environment Variables
//!
//! The following environment variables are used:
//!
//! - `API_HOST`: The host address to bind the server to (default: "0.0.0.0")
//! - `API_PORT`: The port to listen on (default: 3000)
//! - `DATABASE_URL`: PostgreSQL connection string (required)
//! - `LOG_LEVEL`: Logging level (default: "info")
//! - `API_CORS_ORIGINS`: Comma-separated list of allowed CORS origins
//! - `API_REQUEST_TIMEOUT_SECONDS`: Per-request timeout (default: 30)
//! - `DEFAULT_HORIZON_DAYS`: Projection horizon used when a request names none
//!   (default: the role's own horizon)
//! - `DEFAULT_SESSION_MINUTES`: Session length when a request gives no end time
//!   (default: 60)

use chrono::Duration;
use eyre::{Result, WrapErr, eyre};
use mentorhub_core::scheduling::{interval::DEFAULT_SESSION_MINUTES, projector::Horizon};
use std::env;
use tracing::Level;

/// Configuration for the MentorHub API server
///
/// # Example
///
/// ```no_run
/// use eyre::Result;
/// use mentorhub_api::config::ApiConfig;
///
/// fn example() -> Result<()> {
///     let config = ApiConfig::from_env()?;
///     println!("Starting server on {}:{}", config.host, config.port);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host address for the API server (e.g., "127.0.0.1", "0.0.0.0")
    pub host: String,

    /// Port for the API server to listen on
    pub port: u16,

    /// PostgreSQL database connection string
    pub database_url: String,

    /// Log level for the application
    pub log_level: Level,

    /// CORS allowed origins (optional)
    pub cors_origins: Option<Vec<String>>,

    /// Request timeout in seconds
    pub request_timeout: u64,

    /// Projection horizon override; `None` uses each role's default
    pub default_horizon: Option<Horizon>,

    /// Length of a session whose end time is not given
    pub session_minutes: i64,
}

impl ApiConfig {
    /// Creates a new ApiConfig from environment variables
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - The DATABASE_URL environment variable is not set
    /// - The API_PORT value cannot be parsed as a u16
    /// - DEFAULT_HORIZON_DAYS is not a number between 1 and 30
    /// - DEFAULT_SESSION_MINUTES is not a positive number
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Network settings
        let host = lookup("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = lookup("API_PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()
            .wrap_err("Invalid API_PORT value")?;

        // Database settings
        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| eyre!("DATABASE_URL environment variable must be set"))?;

        // Logging settings
        let log_level = match lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()).as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        };

        // CORS settings
        let cors_origins = lookup("API_CORS_ORIGINS").map(|origins| {
            origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        });

        // Performance settings
        let request_timeout = lookup("API_REQUEST_TIMEOUT_SECONDS")
            .unwrap_or_else(|| "30".to_string())
            .parse()
            .unwrap_or(30);

        // Scheduling settings
        let default_horizon = lookup("DEFAULT_HORIZON_DAYS")
            .map(|days| -> Result<Horizon> {
                let days = days.parse().wrap_err("Invalid DEFAULT_HORIZON_DAYS value")?;
                Horizon::new(days).wrap_err("Invalid DEFAULT_HORIZON_DAYS value")
            })
            .transpose()?;

        let session_minutes = match lookup("DEFAULT_SESSION_MINUTES") {
            Some(minutes) => minutes
                .parse::<i64>()
                .ok()
                .filter(|minutes| *minutes > 0)
                .ok_or_else(|| eyre!("Invalid DEFAULT_SESSION_MINUTES value: {}", minutes))?,
            None => DEFAULT_SESSION_MINUTES,
        };

        Ok(Self {
            host,
            port,
            database_url,
            log_level,
            cors_origins,
            request_timeout,
            default_horizon,
            session_minutes,
        })
    }

    /// Returns the server address as a string
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn session_length(&self) -> Duration {
        Duration::minutes(self.session_minutes)
    }
}
