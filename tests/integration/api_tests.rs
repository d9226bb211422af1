//! API integration tests
//!
//! Expect a server running the in-memory demo station with the default secret:
//! `FIRESTOCK_STORAGE__BACKEND=memory cargo run`, then `cargo test -- --ignored`.

use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use uuid::Uuid;

const BASE_URL: &str = "http://localhost:8080/api/v1";
const JWT_SECRET: &str = "change-this-secret-in-production";

/// DUPONT Jean in the demo directory
const OPERATOR: u128 = 0x0f1e_5700_0000_0000_0000_0000_0000_0001;
/// MARTIN Paul
const COLLEAGUE: u128 = 0x0f1e_5700_0000_0000_0000_0000_0000_0002;
/// BERNARD Sophie, administrator
const ADMIN: u128 = 0x0f1e_5700_0000_0000_0000_0000_0000_0004;

/// Token as the identity provider would issue it
fn token_for(id: u128) -> String {
    let claims = json!({
        "sub": Uuid::from_u128(id),
        "exp": Utc::now().timestamp() + 3600,
        "iat": Utc::now().timestamp(),
    });
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("Failed to sign token")
}

async fn equipment_by_barcode(client: &Client, token: &str, code: &str) -> Value {
    client
        .get(format!("{}/equipment/barcode/{}", BASE_URL, code))
        .bearer_auth(token)
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response")
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_requires_token() {
    let client = Client::new();

    let response = client
        .get(format!("{}/equipment", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore]
async fn test_me() {
    let client = Client::new();

    let response = client
        .get(format!("{}/auth/me", BASE_URL))
        .bearer_auth(token_for(ADMIN))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["role"], "admin");
}

#[tokio::test]
#[ignore]
async fn test_list_loaned_equipment() {
    let client = Client::new();

    let response = client
        .get(format!("{}/equipment?status=loaned", BASE_URL))
        .bearer_auth(token_for(OPERATOR))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body
        .as_array()
        .expect("Expected an array")
        .iter()
        .all(|e| e["status"] == "loaned"));
}

#[tokio::test]
#[ignore]
async fn test_loan_and_return_roundtrip() {
    let client = Client::new();
    let token = token_for(OPERATOR);
    let item = equipment_by_barcode(&client, &token, "BOT-101").await;
    let id = item["id"].as_str().expect("No id");

    let response = client
        .post(format!("{}/equipment/{}/loan", BASE_URL, id))
        .bearer_auth(&token)
        .json(&json!({ "reason": "training", "note": "manœuvre du jeudi" }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["equipment"]["status"], "loaned");
    assert_eq!(body["transaction"]["type"], "OUT");

    // Loaning it twice is a conflict
    let response = client
        .post(format!("{}/equipment/{}/loan", BASE_URL, id))
        .bearer_auth(&token)
        .json(&json!({}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = client
        .post(format!("{}/equipment/{}/return", BASE_URL, id))
        .bearer_auth(&token)
        .json(&json!({}))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let history: Value = client
        .get(format!("{}/equipment/{}/history", BASE_URL, id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(history[0]["type"], "IN");
    assert_eq!(history[1]["type"], "OUT");
}

#[tokio::test]
#[ignore]
async fn test_operator_cannot_loan_for_colleague() {
    let client = Client::new();
    let token = token_for(OPERATOR);
    let item = equipment_by_barcode(&client, &token, "CAS-005").await;

    let response = client
        .post(format!("{}/equipment/{}/loan", BASE_URL, item["id"].as_str().expect("No id")))
        .bearer_auth(&token)
        .json(&json!({ "assignee_id": Uuid::from_u128(COLLEAGUE) }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore]
async fn test_duplicate_barcode_is_rejected() {
    let client = Client::new();

    let response = client
        .post(format!("{}/equipment", BASE_URL))
        .bearer_auth(token_for(OPERATOR))
        .json(&json!({
            "equipment_type": "helmet",
            "size": "M",
            "barcode": "CAS-001"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore]
async fn test_delete_requires_admin() {
    let client = Client::new();
    let token = token_for(OPERATOR);
    let item = equipment_by_barcode(&client, &token, "GAN-007").await;

    let response = client
        .delete(format!("{}/equipment/{}", BASE_URL, item["id"].as_str().expect("No id")))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore]
async fn test_stats() {
    let client = Client::new();

    let response = client
        .get(format!("{}/stats", BASE_URL))
        .bearer_auth(token_for(OPERATOR))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["total"].as_u64().unwrap_or(0) > 0);
}
