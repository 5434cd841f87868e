//! Payment verification service
//!
//! A payment callback claims "intent X was settled by payment Y, signed S".
//! The expected signature is HMAC-SHA256 over `intent_ref + "|" + payment_ref`
//! with the shared provider secret, and the comparison is constant-time via
//! `Mac::verify_slice` - a mismatch never reveals which byte differed.
//!
//! Acceptance and settlement are separate concerns: a valid signature whose
//! order can no longer take the payment (already cancelled, unknown intent)
//! is queued for manual reconciliation instead of being dropped.

use std::sync::Arc;

use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use shared::order::{Order, ReconciliationEntry};

use crate::orders::{LifecycleError, OrderManager, OrderStore, StoreError};

use super::intent::{PaymentError, PaymentResult};

type HmacSha256 = Hmac<Sha256>;

/// `confirm_payment` is idempotent, so retrying a lost CAS race is safe -
/// but only a couple of times before giving up and surfacing the conflict.
const CONFIRM_RETRIES: u32 = 2;

/// Result of a verification attempt.
#[derive(Debug)]
pub enum VerifyOutcome {
    /// Signature valid and the order is paid (possibly already, with the
    /// same reference).
    Accepted { order: Box<Order> },
    /// Signature valid but the order could not take the payment; the
    /// payment is queued for manual reconciliation.
    StateConflict {
        order_id: Option<String>,
        reason: String,
    },
    /// Signature valid but the order is already paid under a different
    /// reference.
    PaymentMismatch { order_id: String },
    /// Signature invalid (wrong length, bad hex or content mismatch).
    Rejected,
}

/// Compute the hex signature the provider would attach to
/// `(intent_ref, payment_ref)`. Used by tests and sandbox tooling.
pub fn sign(secret: &str, intent_ref: &str, payment_ref: &str) -> Option<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(intent_ref.as_bytes());
    mac.update(b"|");
    mac.update(payment_ref.as_bytes());
    Some(hex::encode(mac.finalize().into_bytes()))
}

/// Verifies payment callbacks and hands accepted ones to the lifecycle
/// manager.
pub struct PaymentVerifier {
    secret: String,
    store: Arc<OrderStore>,
    manager: Arc<OrderManager>,
}

impl PaymentVerifier {
    pub fn new(
        secret: impl Into<String>,
        store: Arc<OrderStore>,
        manager: Arc<OrderManager>,
    ) -> Self {
        Self {
            secret: secret.into(),
            store,
            manager,
        }
    }

    /// Constant-time signature check; pure, no storage access.
    pub fn signature_matches(
        &self,
        intent_ref: &str,
        payment_ref: &str,
        claimed_signature: &str,
    ) -> bool {
        let Ok(mut mac) = HmacSha256::new_from_slice(self.secret.as_bytes()) else {
            return false;
        };
        mac.update(intent_ref.as_bytes());
        mac.update(b"|");
        mac.update(payment_ref.as_bytes());

        let Ok(claimed) = hex::decode(claimed_signature) else {
            return false;
        };
        mac.verify_slice(&claimed).is_ok()
    }

    /// Verify a claimed payment and, on acceptance, drive the `paid`
    /// transition.
    pub async fn verify(
        &self,
        intent_ref: &str,
        payment_ref: &str,
        claimed_signature: &str,
    ) -> PaymentResult<VerifyOutcome> {
        if !self.signature_matches(intent_ref, payment_ref, claimed_signature) {
            tracing::warn!(intent_ref, "payment signature rejected");
            return Ok(VerifyOutcome::Rejected);
        }

        let Some(order) = self.store.find_by_intent(intent_ref)? else {
            // Signed by the provider, so the money is real even if we cannot
            // place it; queue it rather than dropping it.
            let reason = "no order for intent reference".to_string();
            self.flag_for_reconciliation(None, intent_ref, payment_ref, &reason)?;
            return Ok(VerifyOutcome::StateConflict {
                order_id: None,
                reason,
            });
        };

        let mut attempts = 0;
        loop {
            match self.manager.confirm_payment(&order.id, payment_ref) {
                Ok(updated) => {
                    return Ok(VerifyOutcome::Accepted {
                        order: Box::new(updated),
                    });
                }
                Err(LifecycleError::Store(StoreError::Conflict { .. }))
                    if attempts < CONFIRM_RETRIES =>
                {
                    attempts += 1;
                    continue;
                }
                Err(LifecycleError::PaymentMismatch { order_id }) => {
                    tracing::error!(
                        %order_id,
                        payment_ref,
                        "conflicting payment reference; manual review required"
                    );
                    return Ok(VerifyOutcome::PaymentMismatch { order_id });
                }
                Err(LifecycleError::InvalidTransition { from, .. }) => {
                    let reason = format!("order in state {from} cannot accept payment");
                    self.flag_for_reconciliation(
                        Some(order.id.clone()),
                        intent_ref,
                        payment_ref,
                        &reason,
                    )?;
                    return Ok(VerifyOutcome::StateConflict {
                        order_id: Some(order.id),
                        reason,
                    });
                }
                Err(other) => return Err(other.into()),
            }
        }
    }

    fn flag_for_reconciliation(
        &self,
        order_id: Option<String>,
        intent_ref: &str,
        payment_ref: &str,
        reason: &str,
    ) -> Result<(), StoreError> {
        tracing::error!(
            order_id = order_id.as_deref().unwrap_or("<unknown>"),
            intent_ref,
            payment_ref,
            reason,
            "verified payment could not be applied; queued for reconciliation"
        );
        self.store.queue_reconciliation(&ReconciliationEntry {
            order_id,
            intent_ref: intent_ref.to_string(),
            payment_ref: payment_ref.to_string(),
            reason: reason.to_string(),
            flagged_at: Utc::now(),
        })
    }
}

// ==================== Tests ====================
