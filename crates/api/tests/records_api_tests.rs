use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use beacon_dns_api::{create_api_routes, AppState};
use beacon_dns_application::{Provider, SharedRecords};
use beacon_dns_domain::{Record, RecordTable};
use beacon_dns_infrastructure::providers::ApiProvider;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

fn seeded_records() -> SharedRecords {
    let mut table = RecordTable::new();
    table.insert(Record::new("foo.local", "A", "127.0.0.1"));
    SharedRecords::from_table(table)
}

/// App with the push-API provider enabled and its run loop drained into a
/// throwaway mailbox.
fn app_with_provider() -> (Router, Arc<ApiProvider>) {
    let shutdown = CancellationToken::new();
    let provider = Arc::new(ApiProvider::new("api", shutdown));

    let (tx, mut rx) = tokio::sync::mpsc::channel(40);
    let runner = provider.clone();
    tokio::spawn(async move { runner.run(tx).await });
    tokio::spawn(async move { while rx.recv().await.is_some() {} });

    let state = AppState {
        records: seeded_records(),
        provider: Some(provider.clone()),
    };
    (create_api_routes(state), provider)
}

fn app_read_only() -> Router {
    create_api_routes(AppState {
        records: seeded_records(),
        provider: None,
    })
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn get_records_returns_the_merged_table() {
    let app = app_read_only();

    let response = app
        .oneshot(Request::builder().uri("/records").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(
        body["foo.local._A"][0],
        json!({"name": "foo.local", "type": "A", "value": "127.0.0.1"})
    );
}

#[tokio::test]
async fn post_valid_record_is_created() {
    let (app, provider) = app_with_provider();

    let response = app
        .oneshot(json_request(
            "POST",
            "/records",
            json!({"name": "bar.local", "type": "A", "value": "10.0.0.1"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    drop(provider);
}

#[tokio::test]
async fn post_record_with_empty_field_is_rejected() {
    let (app, _provider) = app_with_provider();

    let response = app
        .oneshot(json_request(
            "POST",
            "/records",
            json!({"name": "bar.local", "type": "", "value": "10.0.0.1"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn post_record_with_missing_field_is_rejected() {
    let (app, _provider) = app_with_provider();

    let response = app
        .oneshot(json_request(
            "POST",
            "/records",
            json!({"name": "bar.local", "type": "A"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delete_record_returns_ok() {
    let (app, provider) = app_with_provider();
    provider
        .add_record(Record::new("bar.local", "A", "10.0.0.1"))
        .await
        .unwrap();

    let response = app
        .oneshot(json_request(
            "DELETE",
            "/records",
            json!({"name": "bar.local", "type": "A", "value": "10.0.0.1"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn present_publishes_a_txt_record() {
    let (app, provider) = app_with_provider();

    let response = app
        .oneshot(json_request(
            "POST",
            "/records/present",
            json!({"fqdn": "_acme-challenge.foo.local", "value": "token"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    drop(provider);
}

#[tokio::test]
async fn cleanup_removes_a_txt_record() {
    let (app, provider) = app_with_provider();
    provider
        .present("_acme-challenge.foo.local".to_string(), "token".to_string())
        .await
        .unwrap();

    let response = app
        .oneshot(json_request(
            "POST",
            "/records/cleanup",
            json!({"fqdn": "_acme-challenge.foo.local", "value": "token"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn mutation_routes_vanish_without_the_provider() {
    let app = app_read_only();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/records",
            json!({"name": "bar.local", "type": "A", "value": "10.0.0.1"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

    let response = app
        .oneshot(json_request(
            "POST",
            "/records/present",
            json!({"fqdn": "x", "value": "y"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
