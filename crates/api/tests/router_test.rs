//! Router tests for identity extraction and capability gating.
//!
//! These run against a disconnected database handle: every request here is
//! rejected before any query executes.

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

use tally_api::{AppState, create_router};
use tally_core::capability::PolicyGate;
use tally_core::tax::StaticTaxRates;
use tally_shared::config::SchedulerConfig;

fn test_state() -> AppState {
    AppState {
        db: sea_orm::DatabaseConnection::default(),
        tax: Arc::new(StaticTaxRates::default()),
        gate: Arc::new(PolicyGate),
        scheduler_config: SchedulerConfig::default(),
    }
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn entry_body() -> String {
    json!({
        "entry_date": "2026-03-01",
        "description": "Test entry",
        "lines": [
            { "account_id": Uuid::now_v7(), "side": "debit", "amount": "100.00" },
            { "account_id": Uuid::now_v7(), "side": "credit", "amount": "100.00" },
        ],
    })
    .to_string()
}

#[tokio::test]
async fn health_is_public() {
    let app = create_router(test_state());
    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn missing_identity_headers_reject_with_envelope() {
    let app = create_router(test_state());
    let company = Uuid::now_v7();
    let response = app
        .oneshot(
            Request::post(format!("/api/v1/companies/{company}/transactions"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(entry_body()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "MISSING_IDENTITY");
}

#[tokio::test]
async fn viewer_cannot_post() {
    let app = create_router(test_state());
    let company = Uuid::now_v7();
    let response = app
        .oneshot(
            Request::post(format!("/api/v1/companies/{company}/transactions"))
                .header(header::CONTENT_TYPE, "application/json")
                .header("x-user-id", Uuid::now_v7().to_string())
                .header("x-company-id", company.to_string())
                .header("x-role", "viewer")
                .header("x-tier", "enterprise")
                .body(Body::from(entry_body()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "FORBIDDEN");
}

#[tokio::test]
async fn foreign_company_is_forbidden() {
    let app = create_router(test_state());
    let response = app
        .oneshot(
            Request::post(format!(
                "/api/v1/companies/{}/transactions",
                Uuid::now_v7()
            ))
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-user-id", Uuid::now_v7().to_string())
            .header("x-company-id", Uuid::now_v7().to_string())
            .header("x-role", "accountant")
            .header("x-tier", "business")
            .body(Body::from(entry_body()))
            .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "FOREIGN_COMPANY");
}

#[tokio::test]
async fn starter_tier_cannot_trigger_recurring() {
    let app = create_router(test_state());
    let company = Uuid::now_v7();
    let response = app
        .oneshot(
            Request::post(format!("/api/v1/companies/{company}/recurring/trigger"))
                .header("x-user-id", Uuid::now_v7().to_string())
                .header("x-company-id", company.to_string())
                .header("x-role", "owner")
                .header("x-tier", "starter")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn malformed_amount_is_a_validation_error() {
    let app = create_router(test_state());
    let company = Uuid::now_v7();
    let body = json!({
        "entry_date": "2026-03-01",
        "description": "Bad amount",
        "lines": [
            { "account_id": Uuid::now_v7(), "side": "debit", "amount": "not-a-number" },
            { "account_id": Uuid::now_v7(), "side": "credit", "amount": "100.00" },
        ],
    })
    .to_string();

    let response = app
        .oneshot(
            Request::post(format!("/api/v1/companies/{company}/transactions"))
                .header(header::CONTENT_TYPE, "application/json")
                .header("x-user-id", Uuid::now_v7().to_string())
                .header("x-company-id", company.to_string())
                .header("x-role", "accountant")
                .header("x-tier", "business")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "INVALID_AMOUNT");
}
