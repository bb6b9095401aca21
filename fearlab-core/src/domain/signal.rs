//! Signal events and the user-facing status label.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A day on which the volatility index had been above the fear threshold
/// and then fell.
///
/// The return fields start out `None` and are filled in by the return
/// calculator. `None` after that means the horizon lies beyond the
/// retrieved data (pending), not that anything failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalEvent {
    pub date: NaiveDate,
    pub primary_at_signal: f64,
    pub secondary_at_signal: f64,
    pub six_month_return: Option<f64>,
    pub twelve_month_return: Option<f64>,
}

impl SignalEvent {
    pub fn new(date: NaiveDate, primary_at_signal: f64, secondary_at_signal: f64) -> Self {
        Self {
            date,
            primary_at_signal,
            secondary_at_signal,
            six_month_return: None,
            twelve_month_return: None,
        }
    }

    /// True while either horizon is still waiting for forward data.
    pub fn is_pending(&self) -> bool {
        self.six_month_return.is_none() || self.twelve_month_return.is_none()
    }
}

/// Status of the most recent pair of display samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    /// The latest day completed a fear-spike-then-decline pair.
    GoodTimeToEnter,
    /// Volatility is above the threshold and has not started falling.
    HighFearMonitor,
    Wait,
    /// Fewer than two samples in the display window.
    NoData,
    /// The query failed; no result set exists.
    Error,
}

impl Status {
    pub fn label(&self) -> &'static str {
        match self {
            Status::GoodTimeToEnter => "Good Time to Enter",
            Status::HighFearMonitor => "High Fear: Monitor",
            Status::Wait => "Wait",
            Status::NoData => "No Data",
            Status::Error => "Error",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
