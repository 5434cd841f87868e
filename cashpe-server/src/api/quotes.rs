//! Quote API

use axum::{Json, Router, extract::State, routing::post};

use shared::Quote;
use shared::request::QuoteRequest;

use crate::core::ServerState;
use crate::utils::AppResult;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/quotes", post(create))
}

/// Compute an instant quote for a device.
async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<QuoteRequest>,
) -> AppResult<Json<Quote>> {
    let quote = state
        .pricing
        .quote(payload.base_price, &payload.condition, &payload.storage)?;
    Ok(Json(quote))
}
