//! Payment intent service
//!
//! Turns "the client wants to pay for this order" into a provider-side
//! intent. The amount is checked against the order's current price before
//! anything leaves the process, so a tampered client amount never reaches
//! the gateway.

use std::sync::Arc;

use thiserror::Error;

use shared::response::PaymentIntent;

use crate::orders::{LifecycleError, OrderStore, StoreError};

use super::provider::{PaymentProvider, ProviderError};

/// Payment layer errors
#[derive(Debug, Error)]
pub enum PaymentError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    /// Claimed amount does not match the order's current price. Rejected
    /// outright: either tampering or a stale quote.
    #[error("amount mismatch: order is priced {expected}, got {given}")]
    AmountMismatch { expected: u64, given: u64 },

    #[error("payment provider unavailable: {0}")]
    Provider(#[from] ProviderError),
}

pub type PaymentResult<T> = Result<T, PaymentError>;

/// Creates provider-side intents for orders.
pub struct PaymentIntents {
    store: Arc<OrderStore>,
    provider: Arc<dyn PaymentProvider>,
}

impl PaymentIntents {
    pub fn new(store: Arc<OrderStore>, provider: Arc<dyn PaymentProvider>) -> Self {
        Self { store, provider }
    }

    /// Create a provider intent for `order_id` over `amount` minor units.
    ///
    /// On provider failure nothing is written locally; on success the
    /// intent reference is stored on the order (a plain field update, not a
    /// status transition).
    pub async fn create_intent(
        &self,
        order_id: &str,
        amount: u64,
        currency: &str,
    ) -> PaymentResult<PaymentIntent> {
        let order = self.store.get(order_id)?;

        if amount != order.price {
            return Err(PaymentError::AmountMismatch {
                expected: order.price,
                given: amount,
            });
        }

        let intent = self
            .provider
            .create_intent(amount, currency, &order.id)
            .await?;

        self.store.set_payment_intent(&order.id, &intent.intent_ref)?;
        tracing::info!(
            order_id = %order.id,
            intent_ref = %intent.intent_ref,
            amount,
            currency,
            "payment intent created"
        );

        Ok(PaymentIntent {
            intent_ref: intent.intent_ref,
            provider_amount: intent.amount,
            provider_currency: intent.currency,
        })
    }
}

// ==================== Tests ====================
