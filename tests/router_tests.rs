//! HTTP layer over the in-memory demo station, without a network socket

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use firestock_server::{
    api,
    config::{
        AppConfig, AuthConfig, DatabaseConfig, LedgerConfig, LoggingConfig, ServerConfig,
        StorageBackend, StorageConfig, VisionConfig,
    },
    repository::MemoryStore,
    services::Services,
    AppState,
};

const DUPONT: u128 = 0x0f1e_5700_0000_0000_0000_0000_0000_0001;
const BERNARD: u128 = 0x0f1e_5700_0000_0000_0000_0000_0000_0004;

async fn app() -> Router {
    let config = AppConfig {
        server: ServerConfig::default(),
        storage: StorageConfig {
            backend: StorageBackend::Memory,
        },
        database: DatabaseConfig::default(),
        auth: AuthConfig::default(),
        logging: LoggingConfig::default(),
        vision: VisionConfig::default(),
        ledger: LedgerConfig::default(),
    };
    let services = Services::new(Arc::new(MemoryStore::demo()), 5, None, None)
        .await
        .expect("demo store loads");

    api::create_router(AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    })
}

fn token_for(id: u128) -> String {
    let claims = json!({
        "sub": Uuid::from_u128(id),
        "exp": Utc::now().timestamp() + 600,
    });
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(AuthConfig::default().jwt_secret.as_bytes()),
    )
    .expect("token")
}

async fn call(app: &Router, method: Method, uri: &str, user: Option<u128>, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder()
        .method(method)
        .uri(format!("/api/v1{}", uri));
    if let Some(id) = user {
        request = request.header(header::AUTHORIZATION, format!("Bearer {}", token_for(id)));
    }
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn health_needs_no_token() {
    let app = app().await;
    let (status, body) = call(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, _) = call(&app, Method::GET, "/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn equipment_needs_a_valid_token() {
    let app = app().await;
    let (status, body) = call(&app, Method::GET, "/equipment", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "NotAuthenticated");
}

#[tokio::test]
async fn unknown_subject_is_rejected() {
    let app = app().await;
    let (status, _) = call(&app, Method::GET, "/auth/me", Some(0xdead), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn barcode_lookup_and_loan_flow() {
    let app = app().await;
    let (status, item) = call(&app, Method::GET, "/equipment/barcode/CAS-001", Some(DUPONT), None).await;
    assert_eq!(status, StatusCode::OK);
    let id = item["id"].as_str().unwrap().to_string();

    let (status, outcome) = call(
        &app,
        Method::POST,
        &format!("/equipment/{}/loan", id),
        Some(DUPONT),
        Some(json!({ "reason": "intervention" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["equipment"]["status"], "loaned");
    assert_eq!(outcome["transaction"]["type"], "OUT");

    let (status, body) = call(
        &app,
        Method::POST,
        &format!("/equipment/{}/loan", id),
        Some(DUPONT),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "InvalidTransition");

    let (status, recent) = call(&app, Method::GET, "/transactions/recent?limit=1", Some(DUPONT), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(recent.as_array().unwrap().len(), 1);
    assert_eq!(recent[0]["equipment_id"], id.as_str());
}

#[tokio::test]
async fn pair_offer_names_the_other_glove() {
    let app = app().await;
    let (_, left) = call(&app, Method::GET, "/equipment/barcode/2024GCG000494", Some(DUPONT), None).await;

    let (status, offer) = call(
        &app,
        Method::GET,
        &format!("/equipment/{}/pair-offer?action=loan", left["id"].as_str().unwrap()),
        Some(DUPONT),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(offer["partner"]["barcode"], "2024GCD000494");
}

#[tokio::test]
async fn only_admins_delete() {
    let app = app().await;
    let (_, item) = call(&app, Method::GET, "/equipment/barcode/GAN-007", Some(DUPONT), None).await;
    let uri = format!("/equipment/{}", item["id"].as_str().unwrap());

    let (status, _) = call(&app, Method::DELETE, &uri, Some(DUPONT), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = call(&app, Method::DELETE, &uri, Some(BERNARD), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = call(&app, Method::GET, &uri, Some(BERNARD), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn creation_errors_map_to_status_codes() {
    let app = app().await;

    let (status, body) = call(
        &app,
        Method::POST,
        "/equipment",
        Some(DUPONT),
        Some(json!({ "equipment_type": "helmet", "size": "M", "barcode": "CAS-001" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "DuplicateBarcode");

    let (status, _) = call(
        &app,
        Method::POST,
        "/equipment",
        Some(DUPONT),
        Some(json!({ "equipment_type": "gloves", "size": "9", "barcode": "G-1", "pair_barcode": "G-404" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, created) = call(
        &app,
        Method::POST,
        "/equipment",
        Some(DUPONT),
        Some(json!({ "equipment_type": "hood", "size": "U" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(created["barcode"].as_str().unwrap().starts_with("MAN-"));
}

#[tokio::test]
async fn stats_and_vision_without_service() {
    let app = app().await;
    let (status, stats) = call(&app, Method::GET, "/stats", Some(DUPONT), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["total"], 7);
    assert_eq!(stats["loaned"], 1);

    let (status, body) = call(&app, Method::POST, "/stats/insight", Some(DUPONT), None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "VisionUnavailable");
    assert_eq!(body["code"], 14);
    assert_eq!(body["message"], "Stock analysis is not configured on this server");
}

async fn loan_cas_001(app: &Router, reason: &str) -> (StatusCode, Value) {
    let (_, item) = call(app, Method::GET, "/equipment/barcode/CAS-001", Some(DUPONT), None).await;
    call(
        app,
        Method::POST,
        &format!("/equipment/{}/loan", item["id"].as_str().unwrap()),
        Some(DUPONT),
        Some(json!({ "reason": reason })),
    )
    .await
}

#[tokio::test]
async fn loan_reason_accepts_category_label() {
    let app = app().await;
    let (status, outcome) = loan_cas_001(&app, "Intervention").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["transaction"]["reason"], "intervention");
}

#[tokio::test]
async fn loan_reason_keeps_free_text() {
    let app = app().await;
    let (status, outcome) = loan_cas_001(&app, "Feu de cave").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["transaction"]["reason"], "Feu de cave");

    let (_, recent) = call(&app, Method::GET, "/transactions/recent?limit=1", Some(DUPONT), None).await;
    assert_eq!(recent[0]["reason"], "Feu de cave");
}
