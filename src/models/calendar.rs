// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Calendar heat-map output model.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Highest score a single day can reach.
pub const MAX_DAY_SCORE: u8 = 4;

/// Day -> score in `1..=4`. Days without activity are absent.
/// Serializes as `{"YYYY-MM-DD": score}`.
pub type ScoreMap = BTreeMap<NaiveDate, u8>;

/// Bucket boundaries derived from the global metric range of one run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuartileThresholds {
    pub upper_bottom_quartile: f64,
    pub mid_quartile: f64,
    pub lower_upper_quartile: f64,
}

impl QuartileThresholds {
    pub fn from_range(min: f64, max: f64) -> Self {
        let mid = min + (max - min) / 2.0;
        Self {
            upper_bottom_quartile: min + (mid - min) / 2.0,
            mid_quartile: mid,
            lower_upper_quartile: max - (max - mid) / 2.0,
        }
    }

    /// Per-activity score increment.
    ///
    /// Comparisons are strict: a metric exactly on a boundary above the
    /// lowest bucket falls through to 4.
    pub fn increment(&self, metric: f64) -> u8 {
        if metric < self.upper_bottom_quartile {
            1
        } else if metric > self.upper_bottom_quartile && metric < self.mid_quartile {
            2
        } else if metric > self.mid_quartile && metric < self.lower_upper_quartile {
            3
        } else {
            4
        }
    }
}

/// How an aggregation run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    /// Last page reached (short or empty page)
    Completed,
    /// Activity endpoint kept failing after every refresh
    RetryExhausted { retries: u32 },
    /// Token endpoint failed while refreshing
    AuthExchangeFailed { reason: String },
}

impl RunOutcome {
    pub fn is_complete(&self) -> bool {
        matches!(self, RunOutcome::Completed)
    }
}

/// Committed result of one aggregation run, as served to the renderer.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CalendarSnapshot {
    /// Day scores (possibly partial when the run failed)
    pub values: ScoreMap,
    /// Upper date bound for the renderer
    pub until: NaiveDate,
    pub outcome: RunOutcome,
    /// Activities that contributed to `values`
    pub activity_count: usize,
    /// RFC 3339 commit time
    pub generated_at: String,
}
