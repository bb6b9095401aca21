//! Signal detection and forward-return measurement over a combined series.
//!
//! Everything here is pure and synchronous: given the same combined series
//! it always produces the same events, returns and averages.

pub mod detector;
pub mod returns;
pub mod summary;

pub use detector::{SignalDetector, FEAR_THRESHOLD};
pub use returns::{benchmark_average, with_returns, ReturnCalculator, SIX_MONTHS, TWELVE_MONTHS};
pub use summary::Summary;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("need at least 2 samples to classify, have {available}")]
    InsufficientData { available: usize },
}
