use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use message::ChainId;
use num_bigint::BigUint;
use relayer_lib::api::HealthApi;
use relayer_lib::chain::{ChainHandle, ChainSource};
use relayer_lib::health::HealthMonitor;
use relayer_lib::metrics::MetricsRegistry;
use serde_json::json;
use std::sync::Arc;
use time::macros::datetime;
use time::{Duration, OffsetDateTime};
use tower::ServiceExt;

fn build_api() -> (HealthApi, Arc<ChainHandle>, Arc<MetricsRegistry>) {
    let goerli = Arc::new(ChainHandle::new("goerli", ChainId::from(5)));
    let monitor = Arc::new(HealthMonitor::new(
        vec![goerli.clone() as Arc<dyn ChainSource>],
        Duration::seconds(180),
    ));
    let metrics = Arc::new(MetricsRegistry::new(["goerli"]));
    (HealthApi::new(monitor, metrics.clone()), goerli, metrics)
}

async fn get(api: &HealthApi, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = api
        .router()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_healthy_chain_returns_stats() {
    let (api, goerli, _) = build_api();
    goerli.update_at(BigUint::from(100u32), datetime!(2024-05-01 10:00:00 UTC));

    let (status, body) = get(&api, "/health/goerli").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "data": {
                "chainId": 5,
                "height": "100",
                "lastUpdated": "2024-05-01T10:00:00Z",
            }
        })
    );
}

#[tokio::test]
async fn test_progressing_chain_stays_healthy() {
    let (api, goerli, _) = build_api();
    goerli.update_at(BigUint::from(100u32), datetime!(2024-05-01 10:00:00 UTC));
    let (status, _) = get(&api, "/health/goerli").await;
    assert_eq!(status, StatusCode::OK);

    goerli.update_at(BigUint::from(150u32), datetime!(2024-05-01 10:00:12 UTC));
    let (status, body) = get(&api, "/health/goerli").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["height"], "150");
    assert_eq!(body["data"]["lastUpdated"], "2024-05-01T10:00:12Z");
}

#[tokio::test]
async fn test_unknown_chain_is_not_found() {
    let (api, _, _) = build_api();
    let (status, body) = get(&api, "/health/ropsten").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "invalid chain name" }));
}

#[tokio::test]
async fn test_stalled_chain_reports_server_error() {
    let (api, goerli, _) = build_api();
    let stalled_since = OffsetDateTime::now_utc() - Duration::seconds(200);
    goerli.update_at(BigUint::from(100u32), stalled_since);

    // First request records the observation, second one finds it unchanged
    // past the timeout.
    let (status, _) = get(&api, "/health/goerli").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = get(&api, "/health/goerli").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let error = body["error"].as_str().unwrap();
    assert!(
        error.starts_with("chain height hasn't changed for "),
        "unexpected message: {error}"
    );
    assert!(
        error.ends_with(" seconds (current height 100)"),
        "unexpected message: {error}"
    );
}

#[tokio::test]
async fn test_regressed_chain_reports_server_error() {
    let (api, goerli, _) = build_api();
    goerli.update(BigUint::from(100u32));
    let (status, _) = get(&api, "/health/goerli").await;
    assert_eq!(status, StatusCode::OK);

    goerli.update(BigUint::from(90u32));
    let (status, body) = get(&api, "/health/goerli").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({ "error": "unexpected block height: previous 100, current 90" })
    );

    // The recorded stats survive the error, so progress recovers.
    goerli.update(BigUint::from(150u32));
    let (status, body) = get(&api, "/health/goerli").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["height"], "150");
}

#[tokio::test]
async fn test_metrics_endpoint_snapshots_every_chain() {
    let (api, _, metrics) = build_api();
    let goerli = metrics.chain("goerli").unwrap();
    goerli.increment_blocks_processed();
    goerli.increment_votes_submitted();
    goerli.set_latest_processed_block(BigUint::from(100u32));
    goerli.set_latest_known_block(BigUint::from(104u32));

    let (status, body) = get(&api, "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "data": {
                "goerli": {
                    "blocks_processed": 1,
                    "votes_submitted": 1,
                    "latest_processed_block": "100",
                    "latest_known_block": "104",
                }
            }
        })
    );
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let (api, _, _) = build_api();
    let (status, body) = get(&api, "/api-docs/openapi.json").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/health/{chain}"].is_object());
    assert!(body["paths"]["/metrics"].is_object());
}
