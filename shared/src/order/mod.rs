//! Order model shared between server and clients

mod status;
mod types;

pub use status::{OrderStatus, OrderType};
pub use types::{
    Order, OrderDetails, OrderDraft, PurchaseDetails, ReconciliationEntry, SellDetails,
    TransitionRecord,
};
