// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod aggregator;
pub mod scoring;
pub mod strava;
pub mod token;

pub use aggregator::{ActivityAggregator, AggregationRun};
pub use strava::StravaClient;
pub use token::TokenManager;
