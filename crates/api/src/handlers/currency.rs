//! Handler for the EUR to BRL quote (`/currency/eur-brl`).

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tna_core::currency::{convert_eur_to_brl, format_brl};

use crate::error::AppResult;
use crate::fx::RateSource;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RateParams {
    /// Amount in euros to convert.
    pub amount: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct RateResponse {
    pub rate: f64,
    pub source: RateSource,
    pub amount_brl: Option<f64>,
    pub label: Option<String>,
}

/// GET /api/v1/currency/eur-brl?amount=
///
/// Always answers; when the live quote is unavailable the fallback rate is
/// used and `source` says so.
pub async fn eur_brl(
    State(state): State<AppState>,
    Query(params): Query<RateParams>,
) -> AppResult<Json<RateResponse>> {
    let quote = state.fx.current_rate().await;
    let amount_brl = params
        .amount
        .and_then(|eur| convert_eur_to_brl(Some(eur), quote.rate))
        .map(|v| (v * 100.0).round() / 100.0);
    let label = params.amount.map(|_| format_brl(amount_brl));

    Ok(Json(RateResponse {
        rate: quote.rate,
        source: quote.source,
        amount_brl,
        label,
    }))
}
