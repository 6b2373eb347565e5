// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity scoring.
//!
//! Each activity becomes one sample: `average_speed * elapsed_time`, halved
//! for cycling. Samples are bucketed against quartiles of the run's global
//! metric range, and buckets for the same day add up to at most 4.

use crate::models::{EvaluationSample, QuartileThresholds, RawActivity, ScoreMap, MAX_DAY_SCORE};
use crate::time_utils::activity_day;

/// Sport types containing this are cycling (Ride, GravelRide, EBikeRide, ...).
pub const CYCLING_MARKER: &str = "Ride";

/// Intensity metric for one activity.
pub fn derive_metric(activity: &RawActivity) -> f64 {
    let metric = activity.average_speed * activity.elapsed_time;
    if activity.sport_type.contains(CYCLING_MARKER) {
        metric / 2.0
    } else {
        metric
    }
}

/// Streaming collector of samples with a running min/max.
#[derive(Debug, Default, Clone)]
pub struct SampleAccumulator {
    samples: Vec<EvaluationSample>,
    range: Option<(f64, f64)>,
}

impl SampleAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an activity. Returns `false` (and skips it) if its start date
    /// cannot be parsed.
    pub fn push_activity(&mut self, activity: &RawActivity) -> bool {
        let Some(date) = activity_day(&activity.start_date) else {
            tracing::warn!(
                start_date = %activity.start_date,
                "Skipping activity with unparseable start date"
            );
            return false;
        };

        self.push(EvaluationSample {
            eval_metric: derive_metric(activity),
            date,
        });
        true
    }

    pub fn push(&mut self, sample: EvaluationSample) {
        let m = sample.eval_metric;
        self.range = Some(match self.range {
            None => (m, m),
            Some((min, max)) => (min.min(m), max.max(m)),
        });
        self.samples.push(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[EvaluationSample] {
        &self.samples
    }

    /// Global `(min, max)` metric, `None` when empty.
    pub fn range(&self) -> Option<(f64, f64)> {
        self.range
    }

    pub fn thresholds(&self) -> Option<QuartileThresholds> {
        self.range
            .map(|(min, max)| QuartileThresholds::from_range(min, max))
    }

    /// Bucket every sample. Empty input gives an empty map.
    pub fn score_map(&self) -> ScoreMap {
        match self.thresholds() {
            Some(thresholds) => bucket(&self.samples, &thresholds),
            None => ScoreMap::new(),
        }
    }
}

/// Sum per-sample increments by day, clamped to [`MAX_DAY_SCORE`].
pub fn bucket(samples: &[EvaluationSample], thresholds: &QuartileThresholds) -> ScoreMap {
    let mut scores = ScoreMap::new();
    for sample in samples {
        let increment = thresholds.increment(sample.eval_metric);
        let score = scores.entry(sample.date).or_insert(0);
        *score = score.saturating_add(increment).min(MAX_DAY_SCORE);
    }
    scores
}
