use std::{env, time::Duration};

use eyre::{Result, WrapErr, eyre};

/// Configuration for the API client.
///
/// Read from `MENTORHUB_API_URL` (required) and `MENTORHUB_TIMEOUT_SECONDS`
/// (defaults to 15).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the MentorHub API, without a trailing slash
    pub api_url: String,
    /// Per-request timeout
    pub timeout: Duration,
}

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 15;

impl ClientConfig {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = lookup("MENTORHUB_API_URL")
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| eyre!("MENTORHUB_API_URL environment variable not set"))?;
        if !api_url.starts_with("http://") && !api_url.starts_with("https://") {
            return Err(eyre!("MENTORHUB_API_URL must start with http:// or https://"));
        }

        let timeout = match lookup("MENTORHUB_TIMEOUT_SECONDS") {
            Some(value) => value
                .parse::<u64>()
                .ok()
                .filter(|seconds| *seconds > 0)
                .ok_or_else(|| eyre!("got {:?}", value))
                .wrap_err("MENTORHUB_TIMEOUT_SECONDS must be a positive number")?,
            None => DEFAULT_TIMEOUT_SECONDS,
        };

        Ok(Self {
            timeout: Duration::from_secs(timeout),
            ..Self::new(api_url)
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }
}
