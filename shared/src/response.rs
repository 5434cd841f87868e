//! HTTP API response DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Provider-side payment intent reference, returned by intent creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub intent_ref: String,
    /// Amount registered with the provider, in paise
    pub provider_amount: u64,
    pub provider_currency: String,
}

/// Outcome of applying a verified payment to its order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentOutcome {
    /// Order transitioned to `paid` (or was already paid with the same ref)
    Applied,
    /// Signature valid but the order can no longer accept the payment;
    /// queued for manual reconciliation
    OrderStateConflict,
    /// Order already paid with a different payment reference
    PaymentMismatch,
}

/// `POST /api/payments/razorpay/verify` response.
///
/// `valid` reports the signature check alone; a valid payment can still
/// fail to settle (see [`PaymentOutcome`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<PaymentOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
}

/// A bookable pickup window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickupSlot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}
