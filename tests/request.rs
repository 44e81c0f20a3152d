//! Integration tests for the request wrapper, driven through the mock
//! transport: success decoding, the three error kinds, the timeout window,
//! and independence of concurrent deadlines.

use std::time::{Duration, Instant};

use satchel::{Client, MockTransport, RawResponse, RequestOptions, SatchelError};
use serde_json::json;

fn options_with_timeout(timeout_ms: u64) -> RequestOptions {
    RequestOptions {
        timeout_ms: Some(timeout_ms),
        ..Default::default()
    }
}

#[test_log::test(tokio::test)]
async fn request_resolves_with_decoded_json() {
    let mock = MockTransport::new();
    mock.add_response(
        "GET https://api.example.com/data",
        Ok(RawResponse::new(200, "OK", r#"{"a":1}"#)),
    );

    let client = Client::with_transport(mock);
    let response = client
        .get("https://api.example.com/data", RequestOptions::default())
        .await
        .expect("request should succeed");

    assert_eq!(response.data, json!({"a": 1}));
    assert_eq!(response.status, 200);
    assert_eq!(response.status_text, "OK");
}

#[test_log::test(tokio::test)]
async fn http_404_rejects_with_status_error() {
    let mock = MockTransport::new();
    mock.add_response(
        "GET https://api.example.com/missing",
        Ok(RawResponse::new(404, "Not Found", r#"{"error":"nope"}"#)),
    );

    let client = Client::with_transport(mock);
    let err = client
        .get("https://api.example.com/missing", RequestOptions::default())
        .await
        .expect_err("404 should reject");

    match err {
        SatchelError::HttpStatus {
            status,
            status_text,
        } => {
            assert_eq!(status, 404);
            assert_eq!(status_text, "Not Found");
        }
        other => panic!("expected HttpStatus error, got: {:?}", other),
    }
}

#[test_log::test(tokio::test)]
async fn transport_failure_rejects_with_transport_error() {
    // No response configured: the mock fails before "completing", which is
    // the transport-failure case.
    let mock = MockTransport::new();
    let client = Client::with_transport(mock);

    let err = client
        .get("https://api.example.com/down", RequestOptions::default())
        .await
        .expect_err("unconfigured endpoint should reject");

    assert!(matches!(err, SatchelError::Transport(_)));
    assert!(!err.is_timeout());
    assert_eq!(err.status(), None);
}

#[test_log::test(tokio::test)]
async fn slow_endpoint_rejects_with_timeout_in_window() {
    let mock = MockTransport::new();
    // Hold the trigger without firing it: the endpoint never responds.
    let _trigger = mock.add_response_with_trigger(
        "GET https://api.example.com/slow",
        Ok(RawResponse::new(200, "OK", "{}")),
    );

    let client = Client::with_transport(mock.clone());
    let start = Instant::now();
    let err = client
        .get("https://api.example.com/slow", options_with_timeout(50))
        .await
        .expect_err("deadline should win");
    let elapsed = start.elapsed();

    match err {
        SatchelError::Timeout { timeout_ms } => assert_eq!(timeout_ms, 50),
        other => panic!("expected Timeout error, got: {:?}", other),
    }
    assert!(elapsed >= Duration::from_millis(50), "fired early: {:?}", elapsed);
    assert!(elapsed < Duration::from_millis(500), "fired late: {:?}", elapsed);

    // The losing transport future was dropped when the deadline won.
    assert_eq!(mock.in_flight_count(), 0);
    assert_eq!(mock.call_count(), 1);
}

#[test_log::test(tokio::test)]
async fn concurrent_requests_time_out_independently() {
    let mock = MockTransport::new();
    // First endpoint never responds; second responds once triggered.
    let _stuck = mock.add_response_with_trigger(
        "GET https://api.example.com/stuck",
        Ok(RawResponse::new(200, "OK", "{}")),
    );
    let release = mock.add_response_with_trigger(
        "GET https://api.example.com/eventually",
        Ok(RawResponse::new(200, "OK", r#"{"done":true}"#)),
    );

    let client = Client::with_transport(mock);

    // Release the second endpoint well after the first one's deadline.
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(150)).await;
        let _ = release.send(());
    });

    let (stuck_result, eventual_result) = tokio::join!(
        client.get("https://api.example.com/stuck", options_with_timeout(50)),
        client.get(
            "https://api.example.com/eventually",
            options_with_timeout(5_000),
        ),
    );

    // One deadline firing must not disturb the other call.
    assert!(matches!(
        stuck_result,
        Err(SatchelError::Timeout { timeout_ms: 50 })
    ));
    let response = eventual_result.expect("second request should succeed");
    assert_eq!(response.data, json!({"done": true}));
}

#[test_log::test(tokio::test)]
async fn default_timeout_applies_when_unset() {
    let mock = MockTransport::new();
    mock.add_response(
        "GET https://api.example.com/fast",
        Ok(RawResponse::new(200, "OK", "{}")),
    );

    let client = Client::with_transport(mock);
    // No timeout configured: the default (10s) applies, and a fast response
    // resolves long before it.
    let response = client
        .get("https://api.example.com/fast", RequestOptions::default())
        .await
        .expect("request should succeed");
    assert_eq!(response.status, 200);
}

#[test_log::test(tokio::test)]
async fn post_round_trip_through_wrapper() {
    let mock = MockTransport::new();
    mock.add_response(
        "POST https://api.example.com/items",
        Ok(RawResponse::new(201, "Created", r#"{"id":7}"#)),
    );

    let client = Client::with_transport(mock.clone());
    let response = client
        .post(
            "https://api.example.com/items",
            &json!({"name": "widget", "qty": 2}),
            RequestOptions::default(),
        )
        .await
        .expect("post should succeed");

    assert_eq!(response.status, 201);
    assert_eq!(response.data, json!({"id": 7}));

    let calls = mock.get_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].method, "POST");
    let sent: serde_json::Value =
        serde_json::from_str(calls[0].body.as_deref().unwrap()).unwrap();
    assert_eq!(sent, json!({"name": "widget", "qty": 2}));
}

#[test_log::test(tokio::test)]
async fn late_response_after_timeout_is_discarded() {
    let mock = MockTransport::new();
    let trigger = mock.add_response_with_trigger(
        "GET https://api.example.com/late",
        Ok(RawResponse::new(200, "OK", r#"{"late":true}"#)),
    );

    let client = Client::with_transport(mock.clone());
    let result = client
        .get("https://api.example.com/late", options_with_timeout(50))
        .await;
    assert!(matches!(result, Err(SatchelError::Timeout { .. })));

    // Firing the trigger after the deadline has no observable effect: the
    // wrapper already settled and the response queue entry was consumed.
    let _ = trigger.send(());
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(mock.in_flight_count(), 0);
}
