// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Strava activity models used by the scoring pipeline.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Summary activity from `GET /athlete/activities`.
///
/// Only the fields the scoring pipeline reads are kept. Missing numeric
/// fields default to zero. A record that still fails to deserialize is
/// dropped on its own; the rest of its page survives.
#[derive(Debug, Clone, Deserialize)]
pub struct RawActivity {
    /// Average speed (meters/second)
    #[serde(default)]
    pub average_speed: f64,
    /// Elapsed time (seconds)
    #[serde(default)]
    pub elapsed_time: f64,
    /// Sport type (Ride, Run, MountainBikeRide, etc.)
    #[serde(default)]
    pub sport_type: String,
    /// Start date/time (ISO 8601, UTC)
    pub start_date: String,
}

/// One page of `GET /athlete/activities`.
#[derive(Debug, Clone, Default)]
pub struct ActivityPage {
    /// Records in the response body, parseable or not. Drives pagination.
    pub record_count: usize,
    pub activities: Vec<RawActivity>,
}

impl ActivityPage {
    /// Records that could not be turned into a [`RawActivity`].
    pub fn skipped(&self) -> usize {
        self.record_count - self.activities.len()
    }
}

/// One activity reduced to a scalar intensity and the day it happened.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationSample {
    pub eval_metric: f64,
    pub date: NaiveDate,
}

/// Athlete profile (subset of `GET /athlete`).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AthleteProfile {
    pub id: u64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub firstname: Option<String>,
    #[serde(default)]
    pub lastname: Option<String>,
}

impl AthleteProfile {
    /// Name shown above the calendar: username, else first name.
    pub fn display_name(&self) -> String {
        self.username
            .clone()
            .filter(|u| !u.is_empty())
            .or_else(|| self.firstname.clone())
            .unwrap_or_default()
    }
}
