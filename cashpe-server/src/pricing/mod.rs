//! Pricing Engine
//!
//! Pure quote computation for device trade-ins: catalog base price scaled
//! by condition and storage multipliers. No storage access, no side
//! effects; the multiplier tables are read-only configuration shared
//! across all concurrent callers.

mod engine;

pub use engine::{MultiplierTable, PricingEngine, PricingError};
