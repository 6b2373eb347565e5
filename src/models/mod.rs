// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod activity;
pub mod calendar;
pub mod credentials;

pub use activity::{ActivityPage, AthleteProfile, EvaluationSample, RawActivity};
pub use calendar::{CalendarSnapshot, QuartileThresholds, RunOutcome, ScoreMap, MAX_DAY_SCORE};
pub use credentials::{CredentialPair, TokenGrant, TokenResponse};
