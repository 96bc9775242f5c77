//! Integration tests for DawnClient against a mock ephemeris service.

use chrono::{DateTime, Utc};
use trailwake_core::DawnError;
use trailwake_weather::{
    check_daylight_needed, Coordinates, DawnClient, MemoryStore, TtlCache,
};
use wiremock::matchers::{method, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> DawnClient<MemoryStore> {
    DawnClient::new(TtlCache::new(MemoryStore::new())).with_base_url(server.uri())
}

fn coords() -> Coordinates {
    Coordinates::new(40.713, -74.006).unwrap()
}

fn dawn_instant() -> DateTime<Utc> {
    // 05:12 local in New York (EDT) on a June morning.
    "2026-06-21T09:12:00Z".parse().unwrap()
}

fn ok_body() -> serde_json::Value {
    serde_json::json!({
        "status": "OK",
        "results": { "dawn": dawn_instant().timestamp() }
    })
}

#[tokio::test]
async fn test_fetch_dawn_happy_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("formatted", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
        .expect(1)
        .mount(&server)
        .await;

    let info = client(&server)
        .fetch_dawn(&coords(), "America/New_York")
        .await
        .unwrap();

    assert_eq!(info.date, dawn_instant());
    assert_eq!(info.tz, "America/New_York");
}

#[tokio::test]
async fn test_second_call_is_served_from_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let first = client
        .fetch_dawn(&coords(), "America/New_York")
        .await
        .unwrap();
    let second = client
        .fetch_dawn(&coords(), "America/New_York")
        .await
        .unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_http_failure_surfaces_with_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = client(&server)
        .fetch_dawn(&coords(), "America/New_York")
        .await
        .unwrap_err();
    assert!(matches!(err, DawnError::Http { status: 500 }));
}

#[tokio::test]
async fn test_rejecting_status_is_distinct_from_transport_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "INVALID_REQUEST",
            "results": null
        })))
        .mount(&server)
        .await;

    let err = client(&server)
        .fetch_dawn(&coords(), "America/New_York")
        .await
        .unwrap_err();
    match err {
        DawnError::ApiStatus(status) => assert_eq!(status, "INVALID_REQUEST"),
        other => panic!("expected ApiStatus, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unrepresentable_timestamp_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "OK",
            "results": { "dawn": 1.0e300 }
        })))
        .mount(&server)
        .await;

    let err = client(&server)
        .fetch_dawn(&coords(), "America/New_York")
        .await
        .unwrap_err();
    assert!(matches!(err, DawnError::InvalidTimestamp(_)));
}

#[tokio::test]
async fn test_missing_results_is_a_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "status": "OK" })),
        )
        .mount(&server)
        .await;

    let err = client(&server)
        .fetch_dawn(&coords(), "America/New_York")
        .await
        .unwrap_err();
    assert!(matches!(err, DawnError::Parse(_)));
}

#[tokio::test]
async fn test_unknown_timezone_fails_before_any_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
        .expect(0)
        .mount(&server)
        .await;

    let err = client(&server)
        .fetch_dawn(&coords(), "Not/AZone")
        .await
        .unwrap_err();
    assert!(matches!(err, DawnError::InvalidTimezone(_)));
}

#[tokio::test]
async fn test_fetched_dawn_feeds_daylight_check() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
        .mount(&server)
        .await;

    let info = client(&server)
        .fetch_dawn(&coords(), "America/New_York")
        .await
        .unwrap();

    // Dawn is 05:12 local; a 04:42 start needs light.
    let check = check_daylight_needed(Some(4 * 60 + 42), Some(&info));
    assert!(check.needed);
    assert!(check.message.unwrap().contains("30 min before dawn"));

    // A 06:00 start does not.
    let check = check_daylight_needed(Some(6 * 60), Some(&info));
    assert!(!check.needed);
}
