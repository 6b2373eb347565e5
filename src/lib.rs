// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! StraCal: a Strava activity heat-map calendar.
//!
//! This crate connects to Strava over OAuth, pulls the last year of
//! activities, and scores each day from 1 to 4 for a calendar heat-map.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::CredentialStore;
use models::CalendarSnapshot;
use services::{ActivityAggregator, StravaClient, TokenManager};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub strava: StravaClient,
    pub tokens: TokenManager,
    pub aggregator: ActivityAggregator,
    /// Last committed calendar, replaced wholesale by each run
    pub calendar: RwLock<Option<CalendarSnapshot>>,
}

impl AppState {
    /// Wire services around a credential store.
    pub fn new(config: Config, store: Arc<dyn CredentialStore>) -> Self {
        let strava = StravaClient::from_config(&config);
        let tokens = TokenManager::new(strava.clone(), store);
        let aggregator = ActivityAggregator::from_config(&config, strava.clone(), tokens.clone());

        Self {
            config,
            strava,
            tokens,
            aggregator,
            calendar: RwLock::new(None),
        }
    }
}
