//! Tests for `/api/v1/currency/eur-brl` when the quote service is down.

mod common;

use axum::http::StatusCode;
use common::{body_json, get, unreachable_pool};
use tna_core::currency::FALLBACK_EUR_BRL_RATE;

#[tokio::test]
async fn unreachable_quote_service_uses_fallback_rate() {
    let app = common::build_test_app(unreachable_pool());
    let response = get(app, "/api/v1/currency/eur-brl").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["rate"], FALLBACK_EUR_BRL_RATE);
    assert_eq!(json["source"], "fallback");
    assert!(json["amount_brl"].is_null());
}

#[tokio::test]
async fn amount_is_converted_and_labelled() {
    let app = common::build_test_app(unreachable_pool());
    let response = get(app, "/api/v1/currency/eur-brl?amount=100").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["amount_brl"], 550.0);
    assert_eq!(json["label"], "R$ 550,00");
}
