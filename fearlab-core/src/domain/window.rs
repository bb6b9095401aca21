//! Display windows and the over-fetched retrieval window derived from them.
//!
//! Forward returns need data past the display end, so retrieval always
//! extends one year beyond it, capped at the present.

use chrono::{DateTime, Months, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const SECONDS_PER_DAY: i64 = 86_400;

/// Why a display range was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("both a start and an end date are required for a custom range")]
    Missing {
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    },

    #[error("start date {start} is after end date {end}")]
    Inverted { start: NaiveDate, end: NaiveDate },

    #[error("display window starting {start} lies entirely in the future")]
    Future { start: NaiveDate },
}

/// Named look-back windows ending today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindowPreset {
    OneYear,
    TwoYears,
    FiveYears,
    TenYears,
    TwentyYears,
    FiftyYears,
}

impl WindowPreset {
    pub const ALL: [WindowPreset; 6] = [
        WindowPreset::OneYear,
        WindowPreset::TwoYears,
        WindowPreset::FiveYears,
        WindowPreset::TenYears,
        WindowPreset::TwentyYears,
        WindowPreset::FiftyYears,
    ];

    pub fn years(&self) -> u32 {
        match self {
            WindowPreset::OneYear => 1,
            WindowPreset::TwoYears => 2,
            WindowPreset::FiveYears => 5,
            WindowPreset::TenYears => 10,
            WindowPreset::TwentyYears => 20,
            WindowPreset::FiftyYears => 50,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            WindowPreset::OneYear => "1y",
            WindowPreset::TwoYears => "2y",
            WindowPreset::FiveYears => "5y",
            WindowPreset::TenYears => "10y",
            WindowPreset::TwentyYears => "20y",
            WindowPreset::FiftyYears => "50y",
        }
    }
}

impl fmt::Display for WindowPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for WindowPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        WindowPreset::ALL
            .into_iter()
            .find(|p| p.code() == wanted)
            .ok_or_else(|| {
                format!("unknown window '{s}' (expected one of 1y, 2y, 5y, 10y, 20y, 50y)")
            })
    }
}

/// The inclusive date range a caller wants to see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRange {
    pub display_start: NaiveDate,
    pub display_end: NaiveDate,
}

impl QueryRange {
    /// Window of `preset` years ending on `today`.
    pub fn preset(preset: WindowPreset, today: NaiveDate) -> Self {
        let display_start = super::sub_months_rollover(today, Months::new(12 * preset.years()))
            .unwrap_or(NaiveDate::MIN);
        Self {
            display_start,
            display_end: today,
        }
    }

    /// Explicit range; both ends must be present and ordered.
    pub fn custom(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<Self, RangeError> {
        match (start, end) {
            (Some(start), Some(end)) if start <= end => Ok(Self {
                display_start: start,
                display_end: end,
            }),
            (Some(start), Some(end)) => Err(RangeError::Inverted { start, end }),
            (start, end) => Err(RangeError::Missing { start, end }),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.display_start && date <= self.display_end
    }

    /// Retrieval window: the display range plus one year, capped at `now`.
    pub fn fetch_window(&self, now: DateTime<Utc>) -> Result<FetchWindow, RangeError> {
        let extended_end =
            super::add_months_rollover(self.display_end, Months::new(12)).unwrap_or(self.display_end);

        let period1 = day_start(self.display_start);
        let period2 = (day_start(extended_end) + SECONDS_PER_DAY - 1).min(now.timestamp());
        if period2 < period1 {
            return Err(RangeError::Future {
                start: self.display_start,
            });
        }

        Ok(FetchWindow {
            start: self.display_start,
            end: extended_end.min(now.date_naive()),
            period1,
            period2,
        })
    }
}

/// What actually gets requested from the upstream source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Unix seconds, inclusive lower bound.
    pub period1: i64,
    /// Unix seconds, inclusive upper bound.
    pub period2: i64,
}

fn day_start(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}
