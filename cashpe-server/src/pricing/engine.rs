//! Quote calculator
//!
//! `computed_price = round_half_up(base_price * condition * storage)`,
//! carried out in `Decimal` and rounded to whole paise. Same inputs always
//! yield the same output; there is no hidden state.

use std::collections::BTreeMap;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

use shared::Quote;

/// Pricing errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PricingError {
    /// Condition/storage key absent from the configured table
    #[error("unknown {table} key: {key}")]
    UnknownAttribute { table: &'static str, key: String },

    #[error("base price must be positive")]
    InvalidBasePrice,

    #[error("computed price out of range")]
    Overflow,
}

pub type PricingResult<T> = Result<T, PricingError>;

/// Read-only multiplier lookup, keyed by attribute label.
#[derive(Debug, Clone)]
pub struct MultiplierTable {
    entries: BTreeMap<String, Decimal>,
}

impl MultiplierTable {
    pub fn new(entries: &[(&str, Decimal)]) -> Self {
        Self {
            entries: entries
                .iter()
                .map(|(key, value)| (key.to_string(), *value))
                .collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<Decimal> {
        self.entries.get(key).copied()
    }
}

/// The pricing engine: two multiplier tables and a pure `quote` function.
#[derive(Debug, Clone)]
pub struct PricingEngine {
    conditions: MultiplierTable,
    storages: MultiplierTable,
}

impl PricingEngine {
    pub fn new(conditions: MultiplierTable, storages: MultiplierTable) -> Self {
        Self {
            conditions,
            storages,
        }
    }

    /// Default tables matching the storefront's condition/storage options.
    pub fn with_defaults() -> Self {
        Self::new(
            MultiplierTable::new(&[
                ("Like New", Decimal::ONE),
                ("Good", Decimal::new(85, 2)),
                ("Fair", Decimal::new(70, 2)),
                ("Poor", Decimal::new(50, 2)),
            ]),
            MultiplierTable::new(&[
                ("64 GB", Decimal::new(90, 2)),
                ("128 GB", Decimal::ONE),
                ("256 GB", Decimal::new(110, 2)),
                ("512 GB", Decimal::new(120, 2)),
                ("1 TB", Decimal::new(130, 2)),
            ]),
        )
    }

    /// Compute a quote for `base_price` paise under the given attributes.
    ///
    /// Rounding is half-up to the nearest whole paise
    /// (`MidpointAwayFromZero` on a non-negative product).
    pub fn quote(&self, base_price: u64, condition: &str, storage: &str) -> PricingResult<Quote> {
        if base_price == 0 {
            return Err(PricingError::InvalidBasePrice);
        }

        let condition_multiplier =
            self.conditions
                .get(condition)
                .ok_or_else(|| PricingError::UnknownAttribute {
                    table: "condition",
                    key: condition.to_string(),
                })?;
        let storage_multiplier =
            self.storages
                .get(storage)
                .ok_or_else(|| PricingError::UnknownAttribute {
                    table: "storage",
                    key: storage.to_string(),
                })?;

        let product = Decimal::from(base_price)
            .checked_mul(condition_multiplier)
            .and_then(|value| value.checked_mul(storage_multiplier))
            .ok_or(PricingError::Overflow)?;

        let computed_price = product
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_u64()
            .ok_or(PricingError::Overflow)?;

        Ok(Quote {
            base_price,
            condition_multiplier,
            storage_multiplier,
            computed_price,
        })
    }
}

// ==================== Tests ====================
