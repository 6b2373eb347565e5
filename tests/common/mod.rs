// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared test helpers: an in-process fake Strava API and app builders.

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{Duration, NaiveDate};
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use stracal::config::Config;
use stracal::db::MemoryCredentialStore;
use stracal::models::CredentialPair;
use stracal::routes::create_router;
use stracal::services::{ActivityAggregator, StravaClient, TokenManager};
use stracal::AppState;

/// One scripted reply from the activity list endpoint.
#[allow(dead_code)]
pub enum Scripted {
    Page(Vec<Value>),
    Status(StatusCode),
    Raw(&'static str),
}

/// A recorded activity list request.
#[derive(Debug, Clone)]
pub struct ActivityRequest {
    pub bearer: Option<String>,
    pub query: HashMap<String, String>,
}

impl ActivityRequest {
    #[allow(dead_code)]
    pub fn page(&self) -> u32 {
        self.query
            .get("page")
            .and_then(|p| p.parse().ok())
            .unwrap_or_default()
    }
}

#[derive(Default)]
pub struct FakeState {
    script: Mutex<VecDeque<Scripted>>,
    activity_requests: Mutex<Vec<ActivityRequest>>,
    token_requests: Mutex<Vec<HashMap<String, String>>>,
    token_counter: AtomicUsize,
    fail_tokens: AtomicBool,
    partial_tokens: AtomicBool,
}

/// Handle to a running fake Strava API.
#[derive(Clone)]
pub struct FakeStrava {
    pub base_url: String,
    state: Arc<FakeState>,
}

#[allow(dead_code)]
impl FakeStrava {
    pub fn push_page(&self, records: Vec<Value>) {
        self.push(Scripted::Page(records));
    }

    pub fn push_status(&self, status: StatusCode) {
        self.push(Scripted::Status(status));
    }

    pub fn push(&self, reply: Scripted) {
        self.state.script.lock().unwrap().push_back(reply);
    }

    /// Make the token endpoint answer 500.
    pub fn fail_token_exchange(&self) {
        self.state.fail_tokens.store(true, Ordering::SeqCst);
    }

    /// Make the token endpoint omit the refresh token.
    pub fn omit_refresh_token(&self) {
        self.state.partial_tokens.store(true, Ordering::SeqCst);
    }

    pub fn activity_requests(&self) -> Vec<ActivityRequest> {
        self.state.activity_requests.lock().unwrap().clone()
    }

    pub fn token_requests(&self) -> Vec<HashMap<String, String>> {
        self.state.token_requests.lock().unwrap().clone()
    }
}

async fn fake_token(
    State(state): State<Arc<FakeState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    state.token_requests.lock().unwrap().push(params);

    if state.fail_tokens.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response();
    }

    let n = state.token_counter.fetch_add(1, Ordering::SeqCst) + 1;
    if state.partial_tokens.load(Ordering::SeqCst) {
        return Json(json!({ "access_token": format!("access-{}", n) })).into_response();
    }

    Json(json!({
        "token_type": "Bearer",
        "access_token": format!("access-{}", n),
        "refresh_token": format!("refresh-{}", n),
        "expires_at": 1_900_000_000,
        "athlete": { "id": 42 }
    }))
    .into_response()
}

async fn fake_activities(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|s| s.to_string());
    state
        .activity_requests
        .lock()
        .unwrap()
        .push(ActivityRequest { bearer, query });

    let reply = state.script.lock().unwrap().pop_front();
    match reply {
        Some(Scripted::Page(records)) => Json(Value::Array(records)).into_response(),
        Some(Scripted::Status(status)) => (status, "rejected").into_response(),
        Some(Scripted::Raw(body)) => (StatusCode::OK, body).into_response(),
        None => Json(json!([])).into_response(),
    }
}

async fn fake_athlete(headers: HeaderMap) -> Response {
    match headers.get(header::AUTHORIZATION) {
        Some(_) => Json(json!({ "id": 42, "username": "lrhoads", "firstname": "Luke" }))
            .into_response(),
        None => StatusCode::UNAUTHORIZED.into_response(),
    }
}

/// Start a fake Strava API on an ephemeral port.
pub async fn spawn_fake_strava() -> FakeStrava {
    let state = Arc::new(FakeState::default());
    let app = Router::new()
        .route("/api/v3/oauth/token", post(fake_token))
        .route("/api/v3/athlete/activities", get(fake_activities))
        .route("/api/v3/athlete", get(fake_athlete))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind fake Strava");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    FakeStrava {
        base_url: format!("http://{}/api/v3", addr),
        state,
    }
}

/// One activity record as Strava returns it.
#[allow(dead_code)]
pub fn activity(sport: &str, average_speed: f64, elapsed_time: u64, start_date: &str) -> Value {
    json!({
        "id": 1,
        "name": "Morning Activity",
        "sport_type": sport,
        "average_speed": average_speed,
        "elapsed_time": elapsed_time,
        "distance": average_speed * elapsed_time as f64,
        "start_date": start_date,
    })
}

/// `count` runs on consecutive days starting at `first_day`, varied speeds.
#[allow(dead_code)]
pub fn page_of(count: usize, first_day: NaiveDate) -> Vec<Value> {
    (0..count)
        .map(|i| {
            let day = first_day + Duration::days(i as i64);
            activity(
                "Run",
                2.0 + (i % 5) as f64,
                1800,
                &format!("{}T07:30:00Z", day),
            )
        })
        .collect()
}

#[allow(dead_code)]
pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Config pointing at the fake.
#[allow(dead_code)]
pub fn test_config(fake: &FakeStrava) -> Config {
    let mut config = Config::test_default();
    config.strava_api_base = fake.base_url.clone();
    config
}

/// Store seeded with a known credential pair.
#[allow(dead_code)]
pub fn seeded_store() -> Arc<MemoryCredentialStore> {
    Arc::new(MemoryCredentialStore::with_pair(CredentialPair::new(
        "stored-access",
        "stored-refresh",
    )))
}

/// Token manager and aggregator wired to the fake.
#[allow(dead_code)]
pub fn test_aggregator(
    fake: &FakeStrava,
    store: Arc<MemoryCredentialStore>,
    max_auth_retries: u32,
) -> (ActivityAggregator, TokenManager) {
    let config = test_config(fake);
    let client = StravaClient::from_config(&config);
    let tokens = TokenManager::new(client.clone(), store);
    let aggregator =
        ActivityAggregator::new(client, tokens.clone(), config.page_size, max_auth_retries);
    (aggregator, tokens)
}

/// Full app wired to the fake.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app(
    fake: &FakeStrava,
    store: Arc<MemoryCredentialStore>,
) -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(test_config(fake), store));
    (create_router(state.clone()), state)
}
