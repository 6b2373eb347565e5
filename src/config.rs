// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

/// Strava page size used when the environment does not override it.
pub const DEFAULT_PAGE_SIZE: u32 = 30;

/// Token refresh attempts allowed per aggregation run.
pub const DEFAULT_MAX_AUTH_RETRIES: u32 = 2;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Strava OAuth application ---
    /// Strava OAuth client ID (public)
    pub strava_client_id: String,
    /// Strava OAuth client secret
    pub strava_client_secret: String,
    /// Callback URL registered with Strava
    pub redirect_uri: String,
    /// Where the browser lands after a successful callback
    pub frontend_url: String,
    /// HMAC key for signing the OAuth `state` parameter (raw bytes)
    pub oauth_state_key: Vec<u8>,

    // --- Upstream endpoints ---
    /// Strava REST base, e.g. `https://www.strava.com/api/v3`
    pub strava_api_base: String,
    /// Browser-facing authorize URL
    pub strava_authorize_url: String,

    // --- Pipeline ---
    /// Durable credential pair location
    pub token_store_path: PathBuf,
    /// Records per activity page; a shorter page ends pagination
    pub page_size: u32,
    /// Auth retry budget per aggregation run
    pub max_auth_retries: u32,

    /// Server port
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            strava_client_id: env::var("STRAVA_CLIENT_ID")
                .map_err(|_| ConfigError::Missing("STRAVA_CLIENT_ID"))?,
            strava_client_secret: env::var("STRAVA_CLIENT_SECRET")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("STRAVA_CLIENT_SECRET"))?,
            redirect_uri: env::var("REDIRECT_URI")
                .unwrap_or_else(|_| "http://localhost:8080/auth/strava/callback".to_string()),
            frontend_url: env::var("FRONTEND_URL").unwrap_or_else(|_| "/".to_string()),
            oauth_state_key: env::var("OAUTH_STATE_KEY")
                .map_err(|_| ConfigError::Missing("OAUTH_STATE_KEY"))?
                .into_bytes(),

            strava_api_base: env::var("STRAVA_API_BASE")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| "https://www.strava.com/api/v3".to_string()),
            strava_authorize_url: env::var("STRAVA_AUTHORIZE_URL")
                .unwrap_or_else(|_| "https://www.strava.com/oauth/authorize".to_string()),

            token_store_path: env::var("TOKEN_STORE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".stracal/tokens.json")),
            page_size: parse_positive("PAGE_SIZE", DEFAULT_PAGE_SIZE)?,
            max_auth_retries: parse_positive("MAX_AUTH_RETRIES", DEFAULT_MAX_AUTH_RETRIES)?,

            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
        })
    }

    /// Config for tests; points Strava at an unroutable base unless overridden.
    pub fn test_default() -> Self {
        Self {
            strava_client_id: "test_client_id".to_string(),
            strava_client_secret: "test_secret".to_string(),
            redirect_uri: "http://localhost:8080/auth/strava/callback".to_string(),
            frontend_url: "/".to_string(),
            oauth_state_key: b"test_oauth_state_key".to_vec(),
            strava_api_base: "http://127.0.0.1:9/api/v3".to_string(),
            strava_authorize_url: "https://www.strava.com/oauth/authorize".to_string(),
            token_store_path: PathBuf::from("target/test-tokens.json"),
            page_size: DEFAULT_PAGE_SIZE,
            max_auth_retries: DEFAULT_MAX_AUTH_RETRIES,
            port: 8080,
        }
    }
}

/// Read an optional positive integer, rejecting zero and garbage.
fn parse_positive(name: &'static str, default: u32) -> Result<u32, ConfigError> {
    match env::var(name) {
        Err(_) => Ok(default),
        Ok(raw) => match raw.trim().parse::<u32>() {
            Ok(v) if v > 0 => Ok(v),
            _ => Err(ConfigError::Invalid(name, raw)),
        },
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}
