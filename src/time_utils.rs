// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time handling.

use chrono::{DateTime, Months, NaiveDate, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Unix-seconds lower bound exactly one calendar year before `now`.
///
/// Feb 29 clamps to Feb 28 of the previous year.
pub fn one_year_before(now: DateTime<Utc>) -> i64 {
    now.checked_sub_months(Months::new(12))
        .unwrap_or(now)
        .timestamp()
}

/// UTC calendar day of an ISO 8601 activity start time.
pub fn activity_day(start_date: &str) -> Option<NaiveDate> {
    DateTime::parse_from_rfc3339(start_date)
        .ok()
        .map(|dt| dt.with_timezone(&Utc).date_naive())
}
