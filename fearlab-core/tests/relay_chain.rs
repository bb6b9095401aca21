//! Relay fallback behaviour against a scripted transport.

mod common;

use common::{spx_body, test_relays, vix_body, Behavior, ScriptedTransport};
use fearlab_core::data::{AttemptOutcome, FetchError, RelayChain, SeriesRole};
use std::time::Duration;

const TARGET: &str = "https://query1.finance.yahoo.com/v8/finance/chart/%5EGSPC?period1=1&period2=2&interval=1d&events=history";

fn chain() -> RelayChain {
    RelayChain::new(test_relays(), Duration::from_millis(50))
}

#[tokio::test]
async fn falls_through_timeout_and_500_to_third_relay() {
    let transport = ScriptedTransport::new()
        .on(&["relay-a.test"], Behavior::Hang)
        .on(&["relay-b.test"], Behavior::Respond(500, "Internal Server Error".into()))
        .on(&["relay-c.test"], Behavior::Respond(200, spx_body()));

    let fetched = chain()
        .fetch(&transport, SeriesRole::Primary, TARGET)
        .await
        .unwrap();

    assert_eq!(fetched.body, spx_body());
    assert_eq!(fetched.relay_id, "relay-c");

    let failures: Vec<_> = fetched.failures().collect();
    assert_eq!(failures.len(), 2);
    assert_eq!(failures[0].relay_id, "relay-a");
    assert_eq!(failures[0].outcome, AttemptOutcome::Timeout);
    assert_eq!(failures[1].relay_id, "relay-b");
    assert_eq!(failures[1].outcome, AttemptOutcome::HttpError { status: 500 });

    // The timed-out request was dropped, not left running.
    assert_eq!(transport.dropped(), 1);
}

#[tokio::test]
async fn first_success_stops_the_chain() {
    let transport = ScriptedTransport::new().on(&["relay-a.test"], Behavior::Respond(200, vix_body()));

    let fetched = chain()
        .fetch(&transport, SeriesRole::Secondary, TARGET)
        .await
        .unwrap();

    assert_eq!(fetched.relay_id, "relay-a");
    assert_eq!(fetched.failures().count(), 0);
    assert_eq!(transport.calls().len(), 1);
}

#[tokio::test]
async fn relays_are_tried_in_order_with_their_own_encoding() {
    let transport = ScriptedTransport::new().on(&["relay-c.test"], Behavior::Respond(200, "[]".into()));

    chain()
        .fetch(&transport, SeriesRole::Primary, TARGET)
        .await
        .unwrap();

    let calls = transport.calls();
    assert_eq!(calls.len(), 3);
    assert!(calls[0].starts_with("https://relay-a.test/?url=https%3A%2F%2Fquery1"));
    assert!(calls[1].starts_with("https://relay-b.test/?https%3A%2F%2Fquery1"));
    assert_eq!(calls[2], format!("https://relay-c.test/raw/{TARGET}"));
}

#[tokio::test]
async fn exhausted_chain_reports_every_attempt() {
    let transport = ScriptedTransport::new()
        .on(&["relay-a.test"], Behavior::Network("connection refused".into()))
        .on(&["relay-b.test"], Behavior::Respond(403, "Forbidden".into()))
        .on(&["relay-c.test"], Behavior::Hang);

    let err = chain()
        .fetch(&transport, SeriesRole::Primary, TARGET)
        .await
        .unwrap_err();

    let attempts = match err {
        FetchError::RetrievalFailed { attempts } => attempts,
        other => panic!("expected RetrievalFailed, got {other:?}"),
    };
    let tags: Vec<_> = attempts.iter().map(|a| a.outcome.tag()).collect();
    assert_eq!(tags, vec!["network_error", "http_error", "timeout"]);
    assert_eq!(
        attempts[0].outcome,
        AttemptOutcome::NetworkError {
            message: "connection refused".into()
        }
    );
}

#[tokio::test]
async fn html_error_page_with_200_moves_to_next_relay() {
    let transport = ScriptedTransport::new()
        .on(
            &["relay-a.test"],
            Behavior::Respond(200, "<html><body>Too many requests</body></html>".into()),
        )
        .on(&["relay-b.test"], Behavior::Respond(200, spx_body()));

    let fetched = chain()
        .fetch(&transport, SeriesRole::Primary, TARGET)
        .await
        .unwrap();

    assert_eq!(fetched.relay_id, "relay-b");
    let failures: Vec<_> = fetched.failures().collect();
    assert!(matches!(
        &failures[0].outcome,
        AttemptOutcome::NotStructured { preview } if preview.starts_with("<html>")
    ));
}

#[tokio::test]
async fn concurrent_fetches_keep_independent_chains() {
    // relay-a refuses the volatility symbol only.
    let transport = ScriptedTransport::new()
        .on(&["relay-a.test", "VIX"], Behavior::Respond(502, "Bad Gateway".into()))
        .on(&["relay-a.test", "GSPC"], Behavior::Respond(200, spx_body()))
        .on(&["relay-b.test", "VIX"], Behavior::Respond(200, vix_body()));

    let vix_target = TARGET.replace("GSPC", "VIX");
    let chain = chain();
    let (primary, secondary) = tokio::join!(
        chain.fetch(&transport, SeriesRole::Primary, TARGET),
        chain.fetch(&transport, SeriesRole::Secondary, &vix_target),
    );

    let primary = primary.unwrap();
    let secondary = secondary.unwrap();
    assert_eq!(primary.relay_id, "relay-a");
    assert_eq!(primary.attempts.len(), 1);
    assert_eq!(secondary.relay_id, "relay-b");
    assert_eq!(secondary.failures().count(), 1);
    assert_eq!(transport.calls_matching("GSPC").len(), 1);
}
