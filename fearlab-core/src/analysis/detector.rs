//! Fear-spike-then-decline detector.
//!
//! Fires on day `i` when day `i-1` closed above the fear threshold and day
//! `i` closed strictly lower. The predicate looks at one adjacent pair at a
//! time and keeps no state, so a multi-day decline from above the threshold
//! fires on every day the prior close is still above it.

use super::AnalysisError;
use crate::domain::{CombinedSample, SignalEvent, Status};

/// Volatility index level treated as elevated fear.
pub const FEAR_THRESHOLD: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalDetector {
    pub threshold: f64,
}

impl SignalDetector {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// The pair predicate: prior strictly above threshold, then strictly lower.
    pub fn fires(&self, prior: &CombinedSample, current: &CombinedSample) -> bool {
        prior.secondary > self.threshold && current.secondary < prior.secondary
    }

    /// Evaluate a single index. Index 0 has no prior sample and never fires.
    pub fn evaluate(&self, series: &[CombinedSample], index: usize) -> Option<SignalEvent> {
        if index == 0 {
            return None;
        }
        let prior = series.get(index - 1)?;
        let current = series.get(index)?;
        self.fires(prior, current)
            .then(|| SignalEvent::new(current.date, current.primary, current.secondary))
    }

    /// Every qualifying index in ascending order. Return fields are left empty.
    pub fn detect(&self, series: &[CombinedSample]) -> Vec<SignalEvent> {
        (1..series.len())
            .filter_map(|i| self.evaluate(series, i))
            .collect()
    }

    /// Status of the two most recent samples of a display series.
    pub fn classify_latest(&self, display: &[CombinedSample]) -> Result<Status, AnalysisError> {
        let [.., prior, latest] = display else {
            return Err(AnalysisError::InsufficientData {
                available: display.len(),
            });
        };

        let status = if self.fires(prior, latest) {
            Status::GoodTimeToEnter
        } else if latest.secondary > self.threshold {
            Status::HighFearMonitor
        } else {
            Status::Wait
        };
        Ok(status)
    }
}

impl Default for SignalDetector {
    fn default() -> Self {
        Self::new(FEAR_THRESHOLD)
    }
}
