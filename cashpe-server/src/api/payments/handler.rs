//! Payment API Handlers

use axum::{Json, extract::State};

use shared::order::ReconciliationEntry;
use shared::request::{CreateIntentRequest, VerifyPaymentRequest};
use shared::response::{PaymentIntent, PaymentOutcome, VerifyResponse};

use crate::core::ServerState;
use crate::payments::VerifyOutcome;
use crate::utils::AppResult;

/// Create a provider-side payment intent for an order.
pub async fn create_intent(
    State(state): State<ServerState>,
    Json(payload): Json<CreateIntentRequest>,
) -> AppResult<Json<PaymentIntent>> {
    let intent = state
        .payments
        .create_intent(&payload.order_id, payload.amount, &payload.currency)
        .await?;
    Ok(Json(intent))
}

/// Provider callback: verify the claimed payment signature.
///
/// `valid` reports the signature check; settlement problems (cancelled
/// order, conflicting reference) ride along as `outcome`.
pub async fn verify(
    State(state): State<ServerState>,
    Json(payload): Json<VerifyPaymentRequest>,
) -> AppResult<Json<VerifyResponse>> {
    let outcome = state
        .verifier
        .verify(&payload.intent_ref, &payload.payment_ref, &payload.signature)
        .await?;

    let response = match outcome {
        VerifyOutcome::Accepted { order } => VerifyResponse {
            valid: true,
            outcome: Some(PaymentOutcome::Applied),
            order_id: Some(order.id),
        },
        VerifyOutcome::StateConflict { order_id, .. } => VerifyResponse {
            valid: true,
            outcome: Some(PaymentOutcome::OrderStateConflict),
            order_id,
        },
        VerifyOutcome::PaymentMismatch { order_id } => VerifyResponse {
            valid: true,
            outcome: Some(PaymentOutcome::PaymentMismatch),
            order_id: Some(order_id),
        },
        VerifyOutcome::Rejected => VerifyResponse {
            valid: false,
            outcome: None,
            order_id: None,
        },
    };

    Ok(Json(response))
}

/// Payments waiting for manual review.
pub async fn list_reconciliation(
    State(state): State<ServerState>,
) -> AppResult<Json<Vec<ReconciliationEntry>>> {
    let entries = state.store.list_reconciliation()?;
    Ok(Json(entries))
}
