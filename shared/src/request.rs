//! HTTP API request DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `POST /api/quotes`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteRequest {
    /// Catalog base price in paise
    pub base_price: u64,
    pub condition: String,
    pub storage: String,
}

/// `POST /api/orders/sell`
///
/// The server re-runs the quote from these attributes; a client-supplied
/// price is never trusted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSellOrder {
    pub category: String,
    pub brand: String,
    pub model: String,
    pub storage: String,
    pub condition: String,
    /// Catalog base price in paise
    pub base_price: u64,
}

/// `POST /api/orders/purchase`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePurchaseOrder {
    pub product_id: String,
    pub quantity: u32,
    /// Catalog unit price in paise (resolved by the catalog collaborator)
    pub unit_price: u64,
}

/// `POST /api/orders/{id}/schedule`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulePickupRequest {
    pub pickup_at: DateTime<Utc>,
    pub address: String,
}

/// `PUT /api/orders/{id}/pickup-details`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PickupDetailsRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pickup_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// `POST /api/orders/{id}/inspection`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct InspectionRequest {
    /// Adjusted price in paise; omit to keep the quoted price
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_price: Option<u64>,
}

/// `POST /api/orders/{id}/cancel`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CancelRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// `POST /api/payments/razorpay/order`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateIntentRequest {
    pub order_id: String,
    /// Must equal the order's current price (in paise)
    pub amount: u64,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "INR".to_string()
}

/// `POST /api/payments/razorpay/verify` - provider callback payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyPaymentRequest {
    pub intent_ref: String,
    pub payment_ref: String,
    /// Hex-encoded HMAC-SHA256 signature
    pub signature: String,
}
