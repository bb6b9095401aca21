//! The result of one query, restricted to the display window.

use super::{CombinedSample, SignalEvent};
use serde::{Deserialize, Serialize};

/// Display series, display-window signal events and the benchmark baseline.
///
/// Built once per query and never mutated after it is handed back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    pub display_series: Vec<CombinedSample>,
    pub signal_events: Vec<SignalEvent>,
    pub benchmark_average_return: Option<f64>,
}

impl ResultSet {
    /// BLAKE3 digest of the canonical JSON form.
    ///
    /// Two runs over identical raw payloads and the same range produce the
    /// same fingerprint.
    pub fn fingerprint(&self) -> String {
        let json = serde_json::to_string(self).unwrap_or_default();
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }

    pub fn latest(&self) -> Option<&CombinedSample> {
        self.display_series.last()
    }
}
