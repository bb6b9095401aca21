//! Yahoo Finance v8 chart payloads.
//!
//! Builds the chart URL for a symbol and fetch window, and turns a raw chart
//! body into daily close samples. Yahoo has no official API and is subject
//! to unannounced format changes, so everything structural is checked and
//! reported as a malformed payload instead of panicking.

use super::provider::FetchError;
use super::relay::encode_component;
use crate::domain::{round2, FetchWindow, Sample};
use serde::Deserialize;

/// Yahoo Finance v8 chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    close: Option<Vec<Option<f64>>>,
}

/// Build the chart API URL for a symbol over a fetch window.
pub fn chart_url(base_url: &str, symbol: &str, window: &FetchWindow) -> String {
    format!(
        "{}/{}?period1={}&period2={}&interval=1d&events=history",
        base_url.trim_end_matches('/'),
        encode_component(symbol),
        window.period1,
        window.period2
    )
}

/// Does the trimmed body open like a JSON object or array?
///
/// Relays sometimes answer 200 with an HTML error page; this catches that
/// before the body reaches the JSON parser.
pub fn looks_structured(text: &str) -> bool {
    let trimmed = text.trim_start();
    trimmed.starts_with('{') || trimmed.starts_with('[')
}

/// Parse a chart body into samples, in upstream order.
///
/// Closes that are null, non-finite, zero or negative are dropped. Each kept
/// close is rounded to 2 decimals and dated by its UTC calendar day.
pub fn parse_chart(text: &str) -> Result<Vec<Sample>, FetchError> {
    if !looks_structured(text) {
        let preview: String = text.trim().chars().take(50).collect();
        return Err(FetchError::MalformedPayload(format!(
            "body is not JSON (starts with {preview:?})"
        )));
    }

    let resp: ChartResponse = serde_json::from_str(text)
        .map_err(|e| FetchError::MalformedPayload(format!("failed to parse chart JSON: {e}")))?;

    let data = match resp.chart.result.and_then(|r| r.into_iter().next()) {
        Some(data) => data,
        None => {
            let reason = match resp.chart.error {
                Some(err) => format!(
                    "upstream error {}: {}",
                    err.code.as_deref().unwrap_or("unknown"),
                    err.description.as_deref().unwrap_or("no description")
                ),
                None => "chart has no result envelope".into(),
            };
            return Err(FetchError::MalformedPayload(reason));
        }
    };

    let timestamps = data
        .timestamp
        .ok_or_else(|| FetchError::MalformedPayload("no timestamps".into()))?;

    let closes = data
        .indicators
        .quote
        .into_iter()
        .next()
        .and_then(|q| q.close)
        .ok_or_else(|| FetchError::MalformedPayload("no close prices".into()))?;

    if timestamps.len() != closes.len() {
        return Err(FetchError::MalformedPayload(format!(
            "{} timestamps but {} closes",
            timestamps.len(),
            closes.len()
        )));
    }

    let mut samples = Vec::with_capacity(timestamps.len());
    for (&ts, close) in timestamps.iter().zip(closes) {
        let Some(price) = close.filter(|p| p.is_finite() && *p > 0.0) else {
            continue;
        };
        let date = chrono::DateTime::from_timestamp(ts, 0)
            .map(|dt| dt.date_naive())
            .ok_or_else(|| FetchError::MalformedPayload(format!("invalid timestamp: {ts}")))?;
        samples.push(Sample::new(date, round2(price)));
    }

    Ok(samples)
}
