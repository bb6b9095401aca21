//! Retrieval diagnostics and structured error types for the data layer.
//!
//! Every relay attempt is recorded as a [`RetrievalAttempt`]. Attempts are
//! ephemeral: they decide the fallback order and end up in error messages
//! or the query report, nothing more.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Which of the two series a fetch is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeriesRole {
    /// Equity index level.
    Primary,
    /// Volatility index level.
    Secondary,
}

impl fmt::Display for SeriesRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeriesRole::Primary => f.write_str("primary"),
            SeriesRole::Secondary => f.write_str("secondary"),
        }
    }
}

/// How a single relay attempt ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttemptOutcome {
    Success { status: u16 },
    /// The per-attempt deadline expired and the request was dropped.
    Timeout,
    HttpError { status: u16 },
    NetworkError { message: String },
    /// 2xx response whose body does not open with `{` or `[`.
    NotStructured { preview: String },
}

impl AttemptOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, AttemptOutcome::Success { .. })
    }

    /// Short tag used in logs and summaries.
    pub fn tag(&self) -> &'static str {
        match self {
            AttemptOutcome::Success { .. } => "success",
            AttemptOutcome::Timeout => "timeout",
            AttemptOutcome::HttpError { .. } => "http_error",
            AttemptOutcome::NetworkError { .. } => "network_error",
            AttemptOutcome::NotStructured { .. } => "not_structured",
        }
    }
}

impl fmt::Display for AttemptOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptOutcome::Success { status } => write!(f, "HTTP {status}"),
            AttemptOutcome::Timeout => f.write_str("timed out"),
            AttemptOutcome::HttpError { status } => write!(f, "HTTP {status}"),
            AttemptOutcome::NetworkError { message } => write!(f, "network error: {message}"),
            AttemptOutcome::NotStructured { preview } => {
                write!(f, "body is not structured data (starts with {preview:?})")
            }
        }
    }
}

/// One relay attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievalAttempt {
    pub relay_id: String,
    pub url: String,
    pub outcome: AttemptOutcome,
    pub duration_ms: u64,
}

impl fmt::Display for RetrievalAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} after {}ms",
            self.relay_id, self.outcome, self.duration_ms
        )
    }
}

/// Raw body returned by the first relay that succeeded.
#[derive(Debug, Clone)]
pub struct FetchedSeries {
    pub role: SeriesRole,
    pub body: String,
    pub relay_id: String,
    /// Every attempt in order, the successful one last.
    pub attempts: Vec<RetrievalAttempt>,
}

impl FetchedSeries {
    /// Attempts that failed before the serving relay answered.
    pub fn failures(&self) -> impl Iterator<Item = &RetrievalAttempt> {
        self.attempts.iter().filter(|a| !a.outcome.is_success())
    }
}

/// Structured error types for data operations.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("all {} relays failed: {}", .attempts.len(), join_attempts(.attempts))]
    RetrievalFailed { attempts: Vec<RetrievalAttempt> },

    #[error("malformed payload: {0}")]
    MalformedPayload(String),
}

pub(crate) fn join_attempts(attempts: &[RetrievalAttempt]) -> String {
    attempts
        .iter()
        .map(|a| a.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
