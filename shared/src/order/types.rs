//! Order record, payload variants and audit records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{OrderStatus, OrderType};

/// Type-specific order payload.
///
/// Internally tagged by `order_type` so the persisted document keeps the
/// discriminant field while making illegal field combinations
/// unrepresentable (a purchase order cannot carry a `brand`, a sell order
/// cannot carry a `quantity`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "order_type", rename_all = "snake_case")]
pub enum OrderDetails {
    Sell(SellDetails),
    Purchase(PurchaseDetails),
}

impl OrderDetails {
    pub fn order_type(&self) -> OrderType {
        match self {
            OrderDetails::Sell(_) => OrderType::Sell,
            OrderDetails::Purchase(_) => OrderType::Purchase,
        }
    }
}

/// Device trade-in payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SellDetails {
    /// Device category slug (e.g. "phones")
    pub category: String,
    pub brand: String,
    pub model: String,
    /// Storage tier key, e.g. "128 GB"
    pub storage: String,
    /// Condition key, e.g. "Like New"
    pub condition: String,
}

/// Accessory purchase payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseDetails {
    pub product_id: String,
    pub quantity: u32,
}

/// A persisted marketplace order.
///
/// `status` and `payment_ref` are written exclusively by the lifecycle
/// manager; all amounts are integer paise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    #[serde(flatten)]
    pub details: OrderDetails,
    /// Opaque subject identifier; absent for anonymous sell-in flows
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_ref: Option<String>,
    /// Price in paise; set at creation, lowered at most once by inspection
    pub price: u64,
    pub status: OrderStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pickup_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Provider-side intent reference, set by the payment intent service
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_intent_ref: Option<String>,
    /// Provider payment reference, set exactly once at the `paid` transition
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_ref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancel_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn order_type(&self) -> OrderType {
        self.details.order_type()
    }
}

/// Input for order creation: everything except the server-assigned fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDraft {
    #[serde(flatten)]
    pub details: OrderDetails,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_ref: Option<String>,
    /// Price in paise (quote result for sell, catalog price for purchase)
    pub price: u64,
}

/// One entry in an order's audit stream: a successful status write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// Per-order sequence, starting at 1
    pub seq: u64,
    pub from: OrderStatus,
    pub to: OrderStatus,
    /// Lifecycle event name, e.g. "confirm_payment"
    pub event: String,
    pub at: DateTime<Utc>,
}

/// A verified payment that could not be applied to its order.
///
/// 款项已通过签名验证但订单无法接收（已取消/未知 intent），
/// 入队等待人工对账，绝不静默丢弃。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationEntry {
    /// Target order, when it could be located
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    pub intent_ref: String,
    pub payment_ref: String,
    pub reason: String,
    pub flagged_at: DateTime<Utc>,
}
