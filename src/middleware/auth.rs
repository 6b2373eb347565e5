// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Credential-presence middleware.

use crate::error::AppError;
use crate::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

/// Access token of the connected Strava account, for handlers.
#[derive(Debug, Clone)]
pub struct StravaSession {
    pub access_token: String,
}

/// Middleware that requires a stored credential pair.
///
/// Rejects with 401 so the frontend can send the user through
/// `/auth/strava` first.
pub async fn require_credentials(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let pair = match state.tokens.current().await {
        Ok(Some(pair)) => pair,
        Ok(None) => return AppError::Unauthorized.into_response(),
        Err(e) => return e.into_response(),
    };

    request.extensions_mut().insert(StravaSession {
        access_token: pair.access_token,
    });

    next.run(request).await
}
