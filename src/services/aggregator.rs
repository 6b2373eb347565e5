// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity aggregation run.
//!
//! Walks the last year of activities page by page, refreshing the token
//! when Strava rejects a request, then buckets everything collected into a
//! day -> score map.
//!
//! Pagination and auth retries use separate budgets: a full page advances
//! to the next page for free, a rejected request costs one retry and
//! re-fetches the same page. A page shorter than the page size is the last.
//!
//! Samples gathered before a failure are kept and scored, so a failed run
//! still yields a partial calendar alongside its failure outcome.
//!
//! Runs are not serialized. Two concurrent runs may both refresh and
//! overwrite the stored credential pair; the last writer wins.

use crate::config::Config;
use crate::error::AppError;
use crate::models::{CalendarSnapshot, RunOutcome, ScoreMap};
use crate::services::scoring::SampleAccumulator;
use crate::services::{StravaClient, TokenManager};
use crate::time_utils::{format_utc_rfc3339, one_year_before};
use chrono::{DateTime, Utc};

/// Where the run is between network calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchState {
    /// Request this page next
    Fetching { page: u32 },
    /// Last request for this page was rejected
    Refreshing { page: u32 },
    /// No more pages
    Done,
}

/// State after a successful fetch of `page` returning `count` records.
pub fn after_page(page: u32, count: usize, page_size: u32) -> FetchState {
    if count == 0 {
        FetchState::Done
    } else if count >= page_size as usize {
        FetchState::Fetching { page: page + 1 }
    } else {
        FetchState::Done
    }
}

/// Result of one aggregation run.
#[derive(Debug, Clone)]
pub struct AggregationRun {
    pub scores: ScoreMap,
    pub outcome: RunOutcome,
    /// Activities that produced a sample
    pub activity_count: usize,
    /// Activity list requests issued
    pub fetch_calls: u32,
    /// Token refreshes performed
    pub retries_used: u32,
}

impl AggregationRun {
    /// Strict view: the score map only if the run completed.
    pub fn into_result(self) -> Result<ScoreMap, AppError> {
        match self.outcome {
            RunOutcome::Completed => Ok(self.scores),
            RunOutcome::RetryExhausted { retries } => Err(AppError::RetryExhausted { retries }),
            RunOutcome::AuthExchangeFailed { reason } => Err(AppError::AuthExchange(reason)),
        }
    }

    /// Package for the renderer, with `now`'s date as the upper bound.
    pub fn into_snapshot(self, now: DateTime<Utc>) -> CalendarSnapshot {
        CalendarSnapshot {
            values: self.scores,
            until: now.date_naive(),
            outcome: self.outcome,
            activity_count: self.activity_count,
            generated_at: format_utc_rfc3339(now),
        }
    }
}

/// Drives pagination, refresh-on-failure, and scoring.
#[derive(Clone)]
pub struct ActivityAggregator {
    client: StravaClient,
    tokens: TokenManager,
    page_size: u32,
    max_auth_retries: u32,
}

impl ActivityAggregator {
    pub fn new(
        client: StravaClient,
        tokens: TokenManager,
        page_size: u32,
        max_auth_retries: u32,
    ) -> Self {
        Self {
            client,
            tokens,
            page_size: page_size.max(1),
            max_auth_retries: max_auth_retries.max(1),
        }
    }

    pub fn from_config(config: &Config, client: StravaClient, tokens: TokenManager) -> Self {
        Self::new(client, tokens, config.page_size, config.max_auth_retries)
    }

    /// Run against the year ending now.
    pub async fn run(&self) -> Result<AggregationRun, AppError> {
        self.run_at(Utc::now()).await
    }

    /// Run against the year ending at `now`.
    ///
    /// Fails only when no credentials are stored at the start. Every other
    /// failure is reported through [`AggregationRun::outcome`].
    pub async fn run_at(&self, now: DateTime<Utc>) -> Result<AggregationRun, AppError> {
        if !self.tokens.is_authenticated().await? {
            return Err(AppError::Unauthorized);
        }

        let after = one_year_before(now);
        tracing::info!(
            after,
            page_size = self.page_size,
            max_auth_retries = self.max_auth_retries,
            "Starting aggregation run"
        );

        let mut samples = SampleAccumulator::new();
        let mut state = FetchState::Fetching { page: 1 };
        let mut fetch_calls = 0u32;
        let mut retries = 0u32;

        let outcome = loop {
            match state {
                FetchState::Fetching { page } => {
                    let access_token = match self.tokens.current().await {
                        Ok(Some(pair)) => pair.access_token,
                        Ok(None) => {
                            break RunOutcome::AuthExchangeFailed {
                                reason: "Stored credentials disappeared mid-run".to_string(),
                            }
                        }
                        Err(e) => break RunOutcome::AuthExchangeFailed {
                            reason: e.to_string(),
                        },
                    };

                    fetch_calls += 1;
                    match self
                        .client
                        .list_activities(&access_token, after, page, self.page_size)
                        .await
                    {
                        Ok(fetched) => {
                            for activity in &fetched.activities {
                                samples.push_activity(activity);
                            }
                            tracing::debug!(
                                page,
                                count = fetched.record_count,
                                skipped = fetched.skipped(),
                                "Fetched activity page"
                            );
                            state = after_page(page, fetched.record_count, self.page_size);
                        }
                        Err(e) => {
                            tracing::warn!(page, error = %e, "Activity request rejected");
                            state = FetchState::Refreshing { page };
                        }
                    }
                }
                FetchState::Refreshing { page } => {
                    if let Err(e) = self.tokens.refresh().await {
                        tracing::error!(page, error = %e, "Token refresh failed, stopping run");
                        break RunOutcome::AuthExchangeFailed {
                            reason: e.to_string(),
                        };
                    }
                    retries += 1;
                    if retries >= self.max_auth_retries {
                        tracing::warn!(retries, "Auth retry budget exhausted");
                        break RunOutcome::RetryExhausted { retries };
                    }
                    state = FetchState::Fetching { page };
                }
                FetchState::Done => break RunOutcome::Completed,
            }
        };

        let scores = samples.score_map();
        tracing::info!(
            outcome = ?outcome,
            activities = samples.len(),
            days = scores.len(),
            fetch_calls,
            retries,
            "Aggregation run finished"
        );

        Ok(AggregationRun {
            scores,
            outcome,
            activity_count: samples.len(),
            fetch_calls,
            retries_used: retries,
        })
    }
}
