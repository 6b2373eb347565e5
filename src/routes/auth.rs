// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava OAuth authentication routes.

use axum::{
    extract::{Query, State},
    response::Redirect,
    routing::get,
    Json, Router,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use subtle::ConstantTimeEq;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::{AppError, Result};
use crate::AppState;

// Type alias for HMAC-SHA256
type HmacSha256 = Hmac<Sha256>;

/// Scopes needed to read private activities.
const OAUTH_SCOPE: &str = "read,activity:read_all";

/// How long a signed `state` stays valid.
const STATE_MAX_AGE_SECS: u64 = 10 * 60;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/strava", get(auth_start))
        .route("/auth/strava/callback", get(auth_callback))
        .route("/auth/status", get(auth_status))
        .route("/auth/logout", get(logout))
}

/// Start OAuth flow - redirect to Strava authorization.
async fn auth_start(State(state): State<Arc<AppState>>) -> Result<Redirect> {
    let now = unix_now()?;
    let oauth_state = sign_state(now, &state.config.oauth_state_key)?;

    let auth_url = format!(
        "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&state={}",
        state.config.strava_authorize_url,
        urlencoding::encode(&state.config.strava_client_id),
        urlencoding::encode(&state.config.redirect_uri),
        urlencoding::encode(OAUTH_SCOPE),
        oauth_state
    );

    tracing::info!(
        client_id = %state.config.strava_client_id,
        redirect_uri = %state.config.redirect_uri,
        "Starting OAuth flow, redirecting to Strava"
    );

    Ok(Redirect::temporary(&auth_url))
}

#[derive(Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// OAuth callback - exchange code for tokens and store them.
async fn auth_callback(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CallbackParams>,
) -> Result<Redirect> {
    let frontend_url = &state.config.frontend_url;

    // User denied access or Strava reported a problem
    if let Some(error) = params.error {
        tracing::warn!(error = %error, "OAuth error from Strava");
        let redirect = format!("{}?error={}", frontend_url, urlencoding::encode(&error));
        return Ok(Redirect::temporary(&redirect));
    }

    let oauth_state = params
        .state
        .ok_or_else(|| AppError::BadRequest("Missing state parameter".to_string()))?;
    if !verify_state(&oauth_state, &state.config.oauth_state_key, unix_now()?) {
        tracing::error!("Invalid, expired, or tampered OAuth state");
        return Err(AppError::BadRequest("Invalid state parameter".to_string()));
    }

    let code = params
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing code parameter".to_string()))?;

    tracing::info!("Exchanging authorization code for tokens");
    state.tokens.exchange_code(&code).await?;

    Ok(Redirect::temporary(frontend_url))
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AuthStatusResponse {
    pub authenticated: bool,
}

/// Whether a usable credential pair is stored.
async fn auth_status(State(state): State<Arc<AppState>>) -> Result<Json<AuthStatusResponse>> {
    Ok(Json(AuthStatusResponse {
        authenticated: state.tokens.is_authenticated().await?,
    }))
}

/// Logout - forget the stored credential pair and the committed calendar.
async fn logout(State(state): State<Arc<AppState>>) -> Result<Redirect> {
    state.tokens.forget().await?;
    *state.calendar.write().await = None;
    Ok(Redirect::temporary(&state.config.frontend_url))
}

/// Pull the `code` query parameter out of a full redirect URL.
///
/// For callers holding the whole redirect URL, such as a CLI that has the
/// user paste it back. The callback route reads `code` through [`Query`].
pub fn extract_authorization_code(redirect_url: &str) -> Option<String> {
    let url = url::Url::parse(redirect_url).ok()?;
    url.query_pairs()
        .find(|(key, _)| key == "code")
        .map(|(_, value)| value.into_owned())
        .filter(|code| !code.is_empty())
}

fn unix_now() -> Result<u64> {
    Ok(SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("System time error: {}", e)))?
        .as_secs())
}

fn state_signature(payload: &str, secret: &[u8]) -> Option<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(secret).ok()?;
    mac.update(payload.as_bytes());
    Some(mac.finalize().into_bytes().to_vec())
}

/// Build the OAuth `state`: base64("timestamp_hex|signature_hex").
fn sign_state(timestamp: u64, secret: &[u8]) -> Result<String> {
    let payload = format!("{:x}", timestamp);
    let signature = state_signature(&payload, secret)
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("HMAC init failed")))?;
    let signed = format!("{}|{}", payload, hex::encode(signature));
    Ok(URL_SAFE_NO_PAD.encode(signed.as_bytes()))
}

/// Check signature and age of an OAuth `state` value.
fn verify_state(state: &str, secret: &[u8], now: u64) -> bool {
    let Some(bytes) = URL_SAFE_NO_PAD.decode(state).ok() else {
        return false;
    };
    let Ok(state_str) = String::from_utf8(bytes) else {
        return false;
    };
    let Some((payload, signature_hex)) = state_str.split_once('|') else {
        return false;
    };
    let (Ok(signature), Some(expected)) =
        (hex::decode(signature_hex), state_signature(payload, secret))
    else {
        return false;
    };

    if !bool::from(signature.as_slice().ct_eq(expected.as_slice())) {
        return false;
    }

    match u64::from_str_radix(payload, 16) {
        Ok(issued) => issued <= now && now - issued <= STATE_MAX_AGE_SECS,
        Err(_) => false,
    }
}
