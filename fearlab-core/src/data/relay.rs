//! Relay chain: ordered forwarding intermediaries with sequential fallback.
//!
//! The upstream source refuses most direct requests, so every fetch goes
//! through a list of relays. Each relay is tried in order with its own
//! deadline; the first 2xx response with a structured body wins. Relays are
//! never raced, and one fetch's failures do not reorder another fetch's chain.

use super::provider::{AttemptOutcome, FetchError, FetchedSeries, RetrievalAttempt, SeriesRole};
use super::transport::Transport;
use super::yahoo::looks_structured;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

const PREVIEW_CHARS: usize = 200;

/// How a relay expects the target URL to be embedded after its prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelayEncoding {
    /// Percent-encode the whole target as a single URI component.
    Percent,
    /// Append the target verbatim.
    Raw,
}

/// One relay: an id for diagnostics and a rule for building its URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayDescriptor {
    pub id: String,
    pub prefix: String,
    pub encoding: RelayEncoding,
}

impl RelayDescriptor {
    pub fn new(id: impl Into<String>, prefix: impl Into<String>, encoding: RelayEncoding) -> Self {
        Self {
            id: id.into(),
            prefix: prefix.into(),
            encoding,
        }
    }

    /// Pass-through relay: requests the target directly.
    pub fn direct() -> Self {
        Self::new("direct", "", RelayEncoding::Raw)
    }

    pub fn build_url(&self, target: &str) -> String {
        match self.encoding {
            RelayEncoding::Percent => format!("{}{}", self.prefix, encode_component(target)),
            RelayEncoding::Raw => format!("{}{}", self.prefix, target),
        }
    }

    /// Host part of the prefix, for log lines.
    pub fn host(&self) -> &str {
        self.prefix.split('/').nth(2).unwrap_or(self.id.as_str())
    }
}

/// The relays the hosted monitor was deployed against, in fallback order.
pub fn default_relays() -> Vec<RelayDescriptor> {
    vec![
        RelayDescriptor::new(
            "codetabs",
            "https://api.codetabs.com/v1/proxy/?quest=",
            RelayEncoding::Percent,
        ),
        RelayDescriptor::new("corsproxy", "https://corsproxy.io/?", RelayEncoding::Percent),
        RelayDescriptor::new("cors-sh", "https://proxy.cors.sh/?", RelayEncoding::Percent),
    ]
}

/// Everything outside the URI-component unreserved set
/// (`A-Z a-z 0-9 - _ . ! ~ * ' ( )`).
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encode `input` as a single URI component.
pub fn encode_component(input: &str) -> String {
    utf8_percent_encode(input, COMPONENT).to_string()
}

/// Ordered relays plus the per-attempt deadline.
#[derive(Debug, Clone)]
pub struct RelayChain {
    relays: Vec<RelayDescriptor>,
    timeout: Duration,
}

impl RelayChain {
    pub fn new(relays: Vec<RelayDescriptor>, timeout: Duration) -> Self {
        Self { relays, timeout }
    }

    pub fn relays(&self) -> &[RelayDescriptor] {
        &self.relays
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Fetch `target` through the chain.
    ///
    /// Fails with [`FetchError::RetrievalFailed`] only once every relay has
    /// been tried; the error carries one attempt per relay.
    pub async fn fetch(
        &self,
        transport: &dyn Transport,
        role: SeriesRole,
        target: &str,
    ) -> Result<FetchedSeries, FetchError> {
        let mut attempts = Vec::with_capacity(self.relays.len());

        for (index, relay) in self.relays.iter().enumerate() {
            let url = relay.build_url(target);
            debug!(
                series = %role,
                relay = %relay.id,
                "attempting relay {}/{}: {url}",
                index + 1,
                self.relays.len()
            );

            let started = Instant::now();
            let result = tokio::time::timeout(self.timeout, transport.get(&url)).await;
            let duration_ms = started.elapsed().as_millis() as u64;

            let outcome = match result {
                Err(_) => AttemptOutcome::Timeout,
                Ok(Err(e)) => AttemptOutcome::NetworkError { message: e.0 },
                Ok(Ok(resp)) if !resp.is_success() => {
                    AttemptOutcome::HttpError { status: resp.status }
                }
                Ok(Ok(resp)) if !looks_structured(&resp.body) => AttemptOutcome::NotStructured {
                    preview: resp.body.trim().chars().take(PREVIEW_CHARS).collect(),
                },
                Ok(Ok(resp)) => {
                    info!(
                        series = %role,
                        relay = %relay.id,
                        status = resp.status,
                        duration_ms,
                        "relay {} answered",
                        relay.host()
                    );
                    attempts.push(RetrievalAttempt {
                        relay_id: relay.id.clone(),
                        url,
                        outcome: AttemptOutcome::Success {
                            status: resp.status,
                        },
                        duration_ms,
                    });
                    return Ok(FetchedSeries {
                        role,
                        body: resp.body,
                        relay_id: relay.id.clone(),
                        attempts,
                    });
                }
            };

            warn!(
                series = %role,
                relay = %relay.id,
                outcome = outcome.tag(),
                duration_ms,
                "relay {} failed: {outcome}",
                relay.host()
            );
            attempts.push(RetrievalAttempt {
                relay_id: relay.id.clone(),
                url,
                outcome,
                duration_ms,
            });
        }

        error!(series = %role, attempts = attempts.len(), "every relay failed");
        Err(FetchError::RetrievalFailed { attempts })
    }
}

impl Default for RelayChain {
    fn default() -> Self {
        Self::new(default_relays(), Duration::from_secs(30))
    }
}
