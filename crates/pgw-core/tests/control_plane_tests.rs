//! Control-plane router tests

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use pgw_core::api::{create_router, ApiState};
use pgw_core::{
    AdmissionPolicy, AuditAction, DrainCoordinator, MemoryAuditSink, SessionTable, ShutdownState,
};

struct Fixture {
    table: Arc<SessionTable>,
    audit: Arc<MemoryAuditSink>,
    drain: DrainCoordinator,
    router: Router,
}

fn fixture() -> Fixture {
    let table = Arc::new(SessionTable::new(AdmissionPolicy::new(
        Vec::<String>::new(),
        100,
        Duration::from_secs(30),
    )));
    let audit = Arc::new(MemoryAuditSink::new());
    let drain = DrainCoordinator::fixed_rate(
        table.clone(),
        audit.clone(),
        5,
        Duration::from_millis(10),
    );
    let router = create_router(ApiState {
        table: table.clone(),
        drain: drain.clone(),
    });

    Fixture {
        table,
        audit,
        drain,
        router,
    }
}

async fn get(router: &Router, uri: &str) -> (StatusCode, String) {
    let response = router
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn test_check_subscriber_active() {
    let fx = fixture();
    fx.table.try_create("123456789012345");

    let (status, body) = get(&fx.router, "/check_subscriber?imsi=123456789012345").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "active");
}

#[tokio::test]
async fn test_check_subscriber_not_active() {
    let fx = fixture();

    let (status, body) = get(&fx.router, "/check_subscriber?imsi=123456789012345").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "not active");
}

#[tokio::test]
async fn test_check_subscriber_missing_param() {
    let fx = fixture();

    let (status, body) = get(&fx.router, "/check_subscriber").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("IMSI parameter is required"));
}

#[tokio::test]
async fn test_check_subscriber_empty_param() {
    let fx = fixture();

    let (status, body) = get(&fx.router, "/check_subscriber?imsi=").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("IMSI parameter is required"));
}

#[tokio::test]
async fn test_check_subscriber_repeated_param_uses_first() {
    let fx = fixture();
    fx.table.try_create("111");

    let (status, body) = get(&fx.router, "/check_subscriber?imsi=111&imsi=222").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "active");

    let (status, body) = get(&fx.router, "/check_subscriber?imsi=222&imsi=111").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "not active");

    let (status, body) = get(&fx.router, "/check_subscriber?other=1&imsi=111").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "active");
}

#[tokio::test]
async fn test_check_subscriber_does_not_mutate() {
    let fx = fixture();

    get(&fx.router, "/check_subscriber?imsi=111").await;
    assert_eq!(fx.table.size(), 0);
    assert_eq!(fx.audit.len(), 0);
}

#[tokio::test]
async fn test_stop_endpoint_drains_sessions() {
    let fx = fixture();
    fx.table.try_create("111111111111111");
    fx.table.try_create("222222222222222");

    let (status, body) = get(&fx.router, "/stop").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Initiating graceful shutdown...");

    tokio::time::timeout(Duration::from_secs(2), fx.drain.wait_for(ShutdownState::Stopped))
        .await
        .expect("drain did not finish");

    assert_eq!(fx.table.size(), 0);
    assert_eq!(fx.audit.count(AuditAction::GracefulRemove), 2);
}

#[tokio::test]
async fn test_repeated_stop_starts_one_drain() {
    let fx = fixture();
    for i in 0..3 {
        fx.table.try_create(&format!("imsi-{i}"));
    }

    let (_, first) = get(&fx.router, "/stop").await;
    let (_, second) = get(&fx.router, "/stop").await;
    assert_eq!(first, second);

    fx.drain.wait_for(ShutdownState::Stopped).await;
    assert_eq!(fx.audit.count(AuditAction::GracefulRemove), 3);
}

#[tokio::test]
async fn test_unknown_route() {
    let fx = fixture();

    let (status, _) = get(&fx.router, "/sessions").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
