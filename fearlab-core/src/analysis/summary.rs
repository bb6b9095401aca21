//! Aggregate figures reported alongside a result set.

use super::detector::SignalDetector;
use super::returns::mean;
use crate::domain::{round2, ResultSet, Status};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub status: Status,
    /// Mean 6-month return over display-window events that have one.
    pub average_six_month_return: Option<f64>,
    /// Mean 12-month return over display-window events that have one.
    pub average_twelve_month_return: Option<f64>,
    pub benchmark_average_return: Option<f64>,
    pub signal_count: usize,
    /// Events still waiting on at least one horizon.
    pub pending_count: usize,
}

impl Summary {
    /// Summarise a finished result set. A display window with fewer than two
    /// samples reports [`Status::NoData`].
    pub fn from_result(result: &ResultSet, detector: &SignalDetector) -> Self {
        let status = detector
            .classify_latest(&result.display_series)
            .unwrap_or(Status::NoData);

        let six: Vec<f64> = result
            .signal_events
            .iter()
            .filter_map(|e| e.six_month_return)
            .collect();
        let twelve: Vec<f64> = result
            .signal_events
            .iter()
            .filter_map(|e| e.twelve_month_return)
            .collect();

        Self {
            status,
            average_six_month_return: mean(&six).map(round2),
            average_twelve_month_return: mean(&twelve).map(round2),
            benchmark_average_return: result.benchmark_average_return,
            signal_count: result.signal_events.len(),
            pending_count: result.signal_events.iter().filter(|e| e.is_pending()).count(),
        }
    }

    /// How far the signal-conditioned 12-month average beat the benchmark.
    pub fn edge_over_benchmark(&self) -> Option<f64> {
        match (self.average_twelve_month_return, self.benchmark_average_return) {
            (Some(signal), Some(benchmark)) => Some(round2(signal - benchmark)),
            _ => None,
        }
    }
}
