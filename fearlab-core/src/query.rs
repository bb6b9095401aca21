//! One query: fetch both series, parse, align, detect, measure, trim.
//!
//! The two fetches run concurrently, each through its own copy of the relay
//! chain. A query either produces a complete [`QueryReport`] or a single
//! [`QueryError`]; there is no partial result. Dropping the future returned
//! by [`QueryEngine::run`] cancels any in-flight request.

use crate::analysis::{ReturnCalculator, SignalDetector, Summary};
use crate::config::FearlabConfig;
use crate::data::provider::join_attempts;
use crate::data::{
    chart_url, combine, parse_chart, FetchError, FetchedSeries, RelayChain, RetrievalAttempt,
    SeriesRole, Transport,
};
use crate::domain::window::RangeError;
use crate::domain::{FetchWindow, QueryRange, ResultSet, Status};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Every relay attempt made for one series whose chain was exhausted.
#[derive(Debug, Clone, Serialize)]
pub struct SeriesFailure {
    pub series: SeriesRole,
    pub attempts: Vec<RetrievalAttempt>,
}

impl fmt::Display for SeriesFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} series: {}", self.series, join_attempts(&self.attempts))
    }
}

/// Errors that end a query. None of them is retried automatically.
#[derive(Debug, Clone, Error)]
pub enum QueryError {
    #[error("failed to retrieve data through every relay ({})", join_failures(.failures))]
    RetrievalFailed { failures: Vec<SeriesFailure> },

    #[error("malformed {series} payload: {reason}")]
    MalformedPayload { series: SeriesRole, reason: String },

    #[error("invalid range: {0}")]
    InvalidRange(#[from] RangeError),
}

impl QueryError {
    /// Degraded status shown in place of a result.
    pub fn status(&self) -> Status {
        Status::Error
    }
}

fn join_failures(failures: &[SeriesFailure]) -> String {
    failures
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Which relay served a series, and what failed before it.
#[derive(Debug, Clone, Serialize)]
pub struct SourceReport {
    pub series: SeriesRole,
    pub symbol: String,
    pub relay_id: String,
    pub attempts: Vec<RetrievalAttempt>,
}

/// Everything one successful query hands back.
#[derive(Debug, Clone, Serialize)]
pub struct QueryReport {
    pub range: QueryRange,
    pub fetch_window: FetchWindow,
    pub result: ResultSet,
    pub summary: Summary,
    pub fingerprint: String,
    pub sources: Vec<SourceReport>,
}

/// Runs queries against a configured relay chain.
///
/// Holds no per-query state; concurrent queries share nothing but the
/// transport.
pub struct QueryEngine {
    config: FearlabConfig,
    chain: RelayChain,
    transport: Arc<dyn Transport>,
}

impl QueryEngine {
    pub fn new(config: FearlabConfig, transport: Arc<dyn Transport>) -> Self {
        let chain = config.relay_chain();
        Self {
            config,
            chain,
            transport,
        }
    }

    pub fn config(&self) -> &FearlabConfig {
        &self.config
    }

    pub fn chain(&self) -> &RelayChain {
        &self.chain
    }

    /// `runQuery(range)` against the current wall clock.
    pub async fn run(&self, range: QueryRange) -> Result<QueryReport, QueryError> {
        self.run_at(range, Utc::now()).await
    }

    /// `runQuery(range)` as of `now`, which caps the over-fetch.
    pub async fn run_at(
        &self,
        range: QueryRange,
        now: DateTime<Utc>,
    ) -> Result<QueryReport, QueryError> {
        let window = range.fetch_window(now)?;
        let source = &self.config.source;
        let primary_url = chart_url(&source.base_url, &source.primary_symbol, &window);
        let secondary_url = chart_url(&source.base_url, &source.secondary_symbol, &window);

        info!(
            start = %range.display_start,
            end = %range.display_end,
            fetch_end = %window.end,
            "starting query"
        );

        let transport = self.transport.as_ref();
        // Joined rather than raced: a failed series waits for the other chain
        // so a double failure reports both. Each chain is bounded by its
        // per-attempt timeouts.
        let (primary, secondary) = tokio::join!(
            self.chain.fetch(transport, SeriesRole::Primary, &primary_url),
            self.chain.fetch(transport, SeriesRole::Secondary, &secondary_url),
        );

        let (primary, secondary) = match (primary, secondary) {
            (Ok(p), Ok(s)) => (p, s),
            (p, s) => {
                let failures = [(SeriesRole::Primary, p), (SeriesRole::Secondary, s)]
                    .into_iter()
                    .filter_map(|(series, r)| match r {
                        Err(FetchError::RetrievalFailed { attempts }) => {
                            Some(SeriesFailure { series, attempts })
                        }
                        _ => None,
                    })
                    .collect();
                return Err(QueryError::RetrievalFailed { failures });
            }
        };

        let result = analyze(&primary.body, &secondary.body, &range, &self.config.detector())?;
        let summary = Summary::from_result(&result, &self.config.detector());
        let fingerprint = result.fingerprint();

        info!(
            status = %summary.status,
            display_samples = result.display_series.len(),
            signals = summary.signal_count,
            "query complete"
        );

        Ok(QueryReport {
            range,
            fetch_window: window,
            result,
            summary,
            fingerprint,
            sources: vec![
                source_report(primary, &source.primary_symbol),
                source_report(secondary, &source.secondary_symbol),
            ],
        })
    }
}

fn source_report(fetched: FetchedSeries, symbol: &str) -> SourceReport {
    SourceReport {
        series: fetched.role,
        symbol: symbol.to_string(),
        relay_id: fetched.relay_id,
        attempts: fetched.attempts,
    }
}

/// The synchronous half of a query: raw bodies in, display-window result out.
///
/// Signals are detected and measured over the full retrieved series, then
/// trimmed to the display window, so forward returns can see past its end.
pub fn analyze(
    primary_body: &str,
    secondary_body: &str,
    range: &QueryRange,
    detector: &SignalDetector,
) -> Result<ResultSet, QueryError> {
    let parse = |series: SeriesRole, body: &str| {
        parse_chart(body).map_err(|e| QueryError::MalformedPayload {
            series,
            reason: match e {
                FetchError::MalformedPayload(reason) => reason,
                other => other.to_string(),
            },
        })
    };
    let primary = parse(SeriesRole::Primary, primary_body)?;
    let secondary = parse(SeriesRole::Secondary, secondary_body)?;

    let full = combine(&primary, &secondary);
    debug!(
        primary = primary.len(),
        secondary = secondary.len(),
        combined = full.len(),
        "aligned series"
    );

    let calculator = ReturnCalculator::new(&full);
    let signal_events = calculator
        .with_returns(detector.detect(&full))
        .into_iter()
        .filter(|e| range.contains(e.date))
        .collect();

    let display_series: Vec<_> = full.iter().filter(|s| range.contains(s.date)).copied().collect();
    let benchmark_average_return = calculator.benchmark_average(&display_series);

    Ok(ResultSet {
        display_series,
        signal_events,
        benchmark_average_return,
    })
}
