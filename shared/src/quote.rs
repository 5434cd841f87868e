//! Quote structure produced by the pricing engine

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A computed trade-in quote.
///
/// Immutable once produced; embedded into an order at creation and never
/// persisted on its own. All amounts are in paise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Catalog base price for the device, in paise
    pub base_price: u64,
    /// Multiplier applied for the declared condition
    pub condition_multiplier: Decimal,
    /// Multiplier applied for the storage tier
    pub storage_multiplier: Decimal,
    /// `round_half_up(base_price * condition_multiplier * storage_multiplier)`
    pub computed_price: u64,
}
