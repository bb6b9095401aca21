//! Shared fixtures: a scripted transport and Yahoo chart bodies.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use fearlab_core::data::{HttpResponse, RelayDescriptor, RelayEncoding, Transport, TransportError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// What the scripted transport does for a matching URL.
#[derive(Debug, Clone)]
pub enum Behavior {
    /// Answer with this status and body.
    Respond(u16, String),
    /// Never answer within any sane deadline.
    Hang,
    /// Fail at the transport level.
    Network(String),
}

/// Counts how many hanging requests were dropped before completing.
struct DropFlag(Arc<AtomicUsize>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// Transport that answers by URL substring, first matching rule wins.
#[derive(Default)]
pub struct ScriptedTransport {
    rules: Vec<(Vec<String>, Behavior)>,
    calls: Mutex<Vec<String>>,
    dropped: Arc<AtomicUsize>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `behavior` to URLs containing every one of `needles`.
    pub fn on(mut self, needles: &[&str], behavior: Behavior) -> Self {
        self.rules
            .push((needles.iter().map(|s| s.to_string()).collect(), behavior));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_matching(&self, needle: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|url| url.contains(needle))
            .collect()
    }

    /// Hanging requests whose futures were dropped (timed out or cancelled).
    pub fn dropped(&self) -> usize {
        self.dropped.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        self.calls.lock().unwrap().push(url.to_string());

        let behavior = self
            .rules
            .iter()
            .find(|(needles, _)| needles.iter().all(|n| url.contains(n.as_str())))
            .map(|(_, b)| b.clone())
            .unwrap_or(Behavior::Respond(404, "not found".into()));

        match behavior {
            Behavior::Respond(status, body) => Ok(HttpResponse { status, body }),
            Behavior::Network(msg) => Err(TransportError(msg)),
            Behavior::Hang => {
                let _flag = DropFlag(self.dropped.clone());
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(TransportError("hang finished".into()))
            }
        }
    }
}

pub fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// Three raw relays on distinct hosts, in order.
pub fn test_relays() -> Vec<RelayDescriptor> {
    vec![
        RelayDescriptor::new("relay-a", "https://relay-a.test/?url=", RelayEncoding::Percent),
        RelayDescriptor::new("relay-b", "https://relay-b.test/?", RelayEncoding::Percent),
        RelayDescriptor::new("relay-c", "https://relay-c.test/raw/", RelayEncoding::Raw),
    ]
}

/// Yahoo v8 chart body with one bar per `(date, close)`, stamped at the
/// 14:30 UTC open.
pub fn chart_body(symbol: &str, bars: &[(&str, Option<f64>)]) -> String {
    let timestamps: Vec<i64> = bars
        .iter()
        .map(|(date, _)| {
            d(date)
                .and_hms_opt(14, 30, 0)
                .unwrap()
                .and_utc()
                .timestamp()
        })
        .collect();
    let closes: Vec<Option<f64>> = bars.iter().map(|(_, c)| *c).collect();

    serde_json::json!({
        "chart": {
            "result": [{
                "meta": { "symbol": symbol, "currency": "USD" },
                "timestamp": timestamps,
                "indicators": {
                    "quote": [{ "close": closes, "open": closes }],
                    "adjclose": [{ "adjclose": closes }]
                }
            }],
            "error": null
        }
    })
    .to_string()
}

/// Equity index fixture. 2022-06-01 has no volatility counterpart and
/// 2023-06-01 has a null close; both drop out of the combined series.
pub fn spx_body() -> String {
    chart_body(
        "^GSPC",
        &[
            ("2022-03-01", Some(100.0)),
            ("2022-03-02", Some(98.0)),
            ("2022-03-03", Some(97.0)),
            ("2022-06-01", Some(105.0)),
            ("2022-09-02", Some(110.0)),
            ("2023-03-02", Some(120.0)),
            ("2023-03-03", Some(121.0)),
            ("2023-06-01", None),
        ],
    )
}

/// Volatility index fixture. Signals fire on 2022-03-02, 2022-09-02 and
/// 2023-03-03.
pub fn vix_body() -> String {
    chart_body(
        "^VIX",
        &[
            ("2022-03-01", Some(35.0)),
            ("2022-03-02", Some(32.0)),
            ("2022-03-03", Some(33.0)),
            ("2022-09-02", Some(25.0)),
            ("2023-03-02", Some(31.0)),
            ("2023-03-03", Some(29.0)),
            ("2023-06-01", Some(18.0)),
        ],
    )
}
