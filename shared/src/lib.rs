//! Shared types for the cashpe marketplace
//!
//! Common types used by the server and its clients: the order model,
//! quote structure and the request/response DTOs of the HTTP API.

pub mod order;
pub mod quote;
pub mod request;
pub mod response;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use order::{
    Order, OrderDetails, OrderDraft, OrderStatus, OrderType, PurchaseDetails,
    ReconciliationEntry, SellDetails, TransitionRecord,
};
pub use quote::Quote;
