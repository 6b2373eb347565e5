// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava API client.
//!
//! Handles:
//! - OAuth token exchange (authorization code and refresh token grants)
//! - Paginated activity listing
//! - Athlete profile lookup

use crate::config::Config;
use crate::error::AppError;
use crate::models::{ActivityPage, AthleteProfile, RawActivity, TokenGrant, TokenResponse};
use serde::Deserialize;

/// Strava API client.
#[derive(Clone)]
pub struct StravaClient {
    http: reqwest::Client,
    base_url: String,
    client_id: String,
    client_secret: String,
}

impl StravaClient {
    /// Create a new Strava client with OAuth credentials.
    pub fn new(base_url: impl Into<String>, client_id: String, client_secret: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client_id,
            client_secret,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.strava_api_base.clone(),
            config.strava_client_id.clone(),
            config.strava_client_secret.clone(),
        )
    }

    /// Exchange a code or refresh token for a new token pair.
    ///
    /// POST {base}/oauth/token?client_id=..&client_secret=..&code|refresh_token=..&grant_type=..
    pub async fn exchange_token(&self, grant: &TokenGrant) -> Result<TokenResponse, AppError> {
        let url = format!("{}/oauth/token", self.base_url);
        let (param, value) = grant.credential_param();

        let response = self
            .http
            .post(&url)
            .query(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                (param, value),
                ("grant_type", grant.grant_type()),
            ])
            .send()
            .await
            .map_err(|e| AppError::AuthExchange(format!("Token request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                status = %status,
                body = %body,
                grant_type = grant.grant_type(),
                "Strava token exchange failed"
            );
            return Err(AppError::AuthExchange(format!(
                "Token endpoint returned {}",
                status
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::AuthExchange(format!("Failed to parse token response: {}", e)))
    }

    /// List one page of activities started after `after` (Unix seconds).
    ///
    /// A non-2xx status is an error. A 2xx body that is not an array is an
    /// empty page. Array elements are parsed one by one; bad ones are
    /// skipped but still counted in [`ActivityPage::record_count`].
    pub async fn list_activities(
        &self,
        access_token: &str,
        after: i64,
        page: u32,
        per_page: u32,
    ) -> Result<ActivityPage, AppError> {
        let url = format!("{}/athlete/activities", self.base_url);

        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .query(&[
                ("after", after.to_string()),
                ("page", page.to_string()),
                ("per_page", per_page.to_string()),
            ])
            .send()
            .await
            .map_err(|e| AppError::StravaApi(e.to_string()))?;

        let response = check_response(response).await?;

        let body = response
            .bytes()
            .await
            .map_err(|e| AppError::StravaApi(format!("Failed to read activity page: {}", e)))?;

        Ok(parse_activity_page(&body, page))
    }

    /// Get authenticated athlete profile.
    pub async fn get_athlete(&self, access_token: &str) -> Result<AthleteProfile, AppError> {
        let url = format!("{}/athlete", self.base_url);
        self.get_json(&url, access_token).await
    }

    /// Generic GET request with JSON response.
    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        access_token: &str,
    ) -> Result<T, AppError> {
        let response = self
            .http
            .get(url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::StravaApi(e.to_string()))?;

        check_response(response)
            .await?
            .json()
            .await
            .map_err(|e| AppError::StravaApi(format!("JSON parse error: {}", e)))
    }
}

/// Split an activity list body into records and parse each on its own.
pub fn parse_activity_page(body: &[u8], page: u32) -> ActivityPage {
    let records = match serde_json::from_slice::<Vec<serde_json::Value>>(body) {
        Ok(records) => records,
        Err(e) => {
            tracing::warn!(page, error = %e, "Malformed activity page, treating as empty");
            return ActivityPage::default();
        }
    };

    let record_count = records.len();
    let activities = records
        .into_iter()
        .enumerate()
        .filter_map(
            |(index, record)| match serde_json::from_value::<RawActivity>(record) {
                Ok(activity) => Some(activity),
                Err(e) => {
                    tracing::warn!(page, index, error = %e, "Skipping malformed activity record");
                    None
                }
            },
        )
        .collect();

    ActivityPage {
        record_count,
        activities,
    }
}

/// Pass through successful responses, turn anything else into an error.
async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, AppError> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    if status.as_u16() == 429 {
        tracing::warn!("Strava rate limit hit (429)");
    }

    Err(AppError::StravaApi(format!("HTTP {}: {}", status, body)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_record_skipped_rest_kept() {
        let body = br#"[
            {"average_speed": 3.0, "elapsed_time": 600, "sport_type": "Run", "start_date": "2024-06-01T08:00:00Z"},
            {"average_speed": null, "elapsed_time": 600, "sport_type": "Run", "start_date": "2024-06-02T08:00:00Z"},
            {"average_speed": 3.0, "elapsed_time": 600, "sport_type": "Run"},
            {"average_speed": 4.0, "elapsed_time": 900, "sport_type": "Ride", "start_date": "2024-06-03T08:00:00Z"}
        ]"#;

        let page = parse_activity_page(body, 1);
        assert_eq!(page.record_count, 4);
        assert_eq!(page.activities.len(), 2);
        assert_eq!(page.skipped(), 2);
        assert_eq!(page.activities[1].sport_type, "Ride");
    }

    #[test]
    fn test_non_array_body_is_empty_page() {
        for body in [&br#"{"message":"nope"}"#[..], b"", b"not json"] {
            let page = parse_activity_page(body, 3);
            assert_eq!(page.record_count, 0);
            assert!(page.activities.is_empty());
        }
    }
}
