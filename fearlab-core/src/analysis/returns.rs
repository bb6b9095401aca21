//! Forward returns of the equity series.
//!
//! A forward point is the first sample of the full retrieved series dated on
//! or after `date + horizon`. The full series is sorted ascending, so the
//! lookup is a binary search rather than a scan from the front.

use crate::domain::{add_months_rollover, round2, CombinedSample, SignalEvent};
use chrono::{Months, NaiveDate};

pub const SIX_MONTHS: Months = Months::new(6);
pub const TWELVE_MONTHS: Months = Months::new(12);

/// Percentage change from `from` to `to`.
pub fn percent_return(from: f64, to: f64) -> f64 {
    (to - from) / from * 100.0
}

/// Forward-return lookups against one full retrieved series.
#[derive(Debug, Clone, Copy)]
pub struct ReturnCalculator<'a> {
    full: &'a [CombinedSample],
}

impl<'a> ReturnCalculator<'a> {
    pub fn new(full: &'a [CombinedSample]) -> Self {
        Self { full }
    }

    /// First sample dated on or after `from + horizon`.
    ///
    /// Calendar months roll over past the end of shorter months
    /// (Aug 31 + 6 months = Mar 2 in a leap year).
    pub fn forward_sample(&self, from: NaiveDate, horizon: Months) -> Option<&'a CombinedSample> {
        let target = add_months_rollover(from, horizon)?;
        let idx = self.full.partition_point(|s| s.date < target);
        self.full.get(idx)
    }

    /// Unrounded percentage return over `horizon`, or `None` when the horizon
    /// is not covered by the full series yet.
    pub fn forward_return(&self, from: NaiveDate, price: f64, horizon: Months) -> Option<f64> {
        self.forward_sample(from, horizon)
            .map(|fwd| percent_return(price, fwd.primary))
    }

    /// Fill in both horizons, rounded to 2 decimals.
    pub fn with_returns(&self, events: Vec<SignalEvent>) -> Vec<SignalEvent> {
        events
            .into_iter()
            .map(|mut event| {
                event.six_month_return = self
                    .forward_return(event.date, event.primary_at_signal, SIX_MONTHS)
                    .map(round2);
                event.twelve_month_return = self
                    .forward_return(event.date, event.primary_at_signal, TWELVE_MONTHS)
                    .map(round2);
                event
            })
            .collect()
    }

    /// Mean 12-month return over every display sample that has a forward point.
    ///
    /// Individual returns are averaged unrounded; the mean is rounded to 2
    /// decimals. `None` when no display sample has a forward point.
    pub fn benchmark_average(&self, display: &[CombinedSample]) -> Option<f64> {
        let returns: Vec<f64> = display
            .iter()
            .filter_map(|s| self.forward_return(s.date, s.primary, TWELVE_MONTHS))
            .collect();
        mean(&returns).map(round2)
    }
}

/// `withReturns(events, fullSeries)`.
pub fn with_returns(events: Vec<SignalEvent>, full: &[CombinedSample]) -> Vec<SignalEvent> {
    ReturnCalculator::new(full).with_returns(events)
}

/// `benchmarkAverage(displaySeries, fullSeries)`.
pub fn benchmark_average(display: &[CombinedSample], full: &[CombinedSample]) -> Option<f64> {
    ReturnCalculator::new(full).benchmark_average(display)
}

/// Arithmetic mean, `None` for an empty slice.
pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}
