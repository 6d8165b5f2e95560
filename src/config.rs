// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client configuration loaded from environment variables.
//!
//! A `.env` file is honored for local use. Credentials are only required by
//! the command line tool; the library takes them as call arguments.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Production Garmin Connect host.
pub const DEFAULT_BASE_URL: &str = "https://connect.garmin.com";

/// Login form view-state marker accepted by the sign-in page at the time of
/// writing. Server-specific; override with `GARMIN_VIEW_STATE` if it changes.
pub const DEFAULT_VIEW_STATE: &str = "j_id1";

/// Message code the upload service uses for "activity already exists".
pub const DEFAULT_DUPLICATE_CODE: i64 = 202;

/// Garmin Connect client configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL without trailing slash
    pub base_url: String,
    /// `javax.faces.ViewState` value posted with the login form
    pub view_state: String,
    /// Failure message code treated as a duplicate upload
    pub duplicate_code: i64,
    /// Upper bound on search pages fetched by one listing
    pub max_pages: u32,
    /// Per-request transport timeout
    pub timeout: Duration,
    /// Account user name (CLI only)
    pub username: Option<String>,
    /// Account password (CLI only)
    pub password: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            view_state: DEFAULT_VIEW_STATE.to_string(),
            duplicate_code: DEFAULT_DUPLICATE_CODE,
            max_pages: 1000,
            timeout: Duration::from_secs(30),
            username: None,
            password: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to the
    /// production defaults for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let defaults = Self::default();

        Ok(Self {
            base_url: env::var("GARMIN_BASE_URL")
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            view_state: env::var("GARMIN_VIEW_STATE").unwrap_or(defaults.view_state),
            duplicate_code: parse_var("GARMIN_DUPLICATE_CODE")?
                .unwrap_or(defaults.duplicate_code),
            max_pages: parse_var("GARMIN_MAX_PAGES")?.unwrap_or(defaults.max_pages),
            timeout: parse_var("GARMIN_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            username: env::var("GARMIN_USERNAME").ok().map(|v| v.trim().to_string()),
            password: env::var("GARMIN_PASSWORD").ok(),
        })
    }

    /// Config pointed at an arbitrary host, used against mock servers.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }

    /// Username and password, both required.
    pub fn credentials(&self) -> Result<(&str, &str), ConfigError> {
        let username = self
            .username
            .as_deref()
            .filter(|u| !u.is_empty())
            .ok_or(ConfigError::Missing("GARMIN_USERNAME"))?;
        let password = self
            .password
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or(ConfigError::Missing("GARMIN_PASSWORD"))?;
        Ok((username, password))
    }
}

fn parse_var<T: FromStr>(var: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(var) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { var, value }),
        Err(_) => Ok(None),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}
