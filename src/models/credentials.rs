// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! OAuth credential model.

use serde::{Deserialize, Serialize};

/// Marker a browser client wrote when a token response lacked a field.
/// Stored values equal to this are treated as absent.
pub const ABSENT_TOKEN_MARKER: &str = "undefined";

/// Access/refresh token pair. Always persisted and replaced as a unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialPair {
    /// Short-lived bearer token for the activity endpoint
    pub access_token: String,
    /// Long-lived token used to mint a new pair
    pub refresh_token: String,
}

impl CredentialPair {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }

    /// True when both tokens hold a real value.
    pub fn is_present(&self) -> bool {
        token_present(&self.access_token) && token_present(&self.refresh_token)
    }
}

fn token_present(token: &str) -> bool {
    let token = token.trim();
    !token.is_empty() && token != ABSENT_TOKEN_MARKER
}

/// Which OAuth grant a token exchange uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenGrant {
    /// Authorization code returned on the redirect callback
    AuthorizationCode(String),
    /// Stored refresh token
    RefreshToken(String),
}

impl TokenGrant {
    /// `grant_type` parameter value.
    pub fn grant_type(&self) -> &'static str {
        match self {
            TokenGrant::AuthorizationCode(_) => "authorization_code",
            TokenGrant::RefreshToken(_) => "refresh_token",
        }
    }

    /// Name and value of the grant-specific parameter.
    pub fn credential_param(&self) -> (&'static str, &str) {
        match self {
            TokenGrant::AuthorizationCode(code) => ("code", code),
            TokenGrant::RefreshToken(token) => ("refresh_token", token),
        }
    }
}

/// Token endpoint response. Extra fields (athlete, expiry) are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
}

impl From<TokenResponse> for CredentialPair {
    fn from(resp: TokenResponse) -> Self {
        CredentialPair::new(resp.access_token, resp.refresh_token)
    }
}
