//! Order lifecycle manager
//!
//! Owns the transition table:
//!
//! ```text
//! created → scheduled → picked_up → inspected → paid → delivered
//!     └─────────┴──────────┴───────────┴──→ cancelled
//! ```
//!
//! `confirm_payment` is reachable from `inspected` for sell orders and from
//! `created`/`scheduled` for purchases. Every state write funnels through
//! the store's compare-and-set, and this manager is the sole writer of
//! `status` and `payment_ref`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use shared::order::{Order, OrderDraft, OrderStatus, OrderType, TransitionRecord};

use super::store::{OrderFilter, OrderStore, StatusPatch, StoreError};

const EV_SCHEDULE_PICKUP: &str = "schedule_pickup";
const EV_UPDATE_PICKUP: &str = "update_pickup";
const EV_MARK_PICKED_UP: &str = "mark_picked_up";
const EV_RECORD_INSPECTION: &str = "record_inspection";
const EV_CONFIRM_PAYMENT: &str = "confirm_payment";
const EV_MARK_DELIVERED: &str = "mark_delivered";
const EV_CANCEL: &str = "cancel";

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The event is not legal from the order's current status. The order is
    /// left exactly as it was; never retried automatically.
    #[error("invalid transition: {event} not allowed from {from}")]
    InvalidTransition {
        event: &'static str,
        from: OrderStatus,
    },

    /// The order is already paid under a different payment reference.
    /// Fatal for this order; requires manual review.
    #[error("conflicting payment reference for order {order_id}")]
    PaymentMismatch { order_id: String },

    #[error("validation failed: {0}")]
    Validation(String),
}

pub type LifecycleResult<T> = Result<T, LifecycleError>;

/// The lifecycle manager: one method per lifecycle event.
pub struct OrderManager {
    store: Arc<OrderStore>,
}

impl OrderManager {
    pub fn new(store: Arc<OrderStore>) -> Self {
        Self { store }
    }

    /// Create and persist a new order (status `created`).
    pub fn create_order(&self, draft: OrderDraft) -> LifecycleResult<Order> {
        let order = self.store.create(draft)?;
        tracing::info!(
            order_id = %order.id,
            order_type = %order.order_type(),
            price = order.price,
            "order created"
        );
        Ok(order)
    }

    pub fn get(&self, order_id: &str) -> LifecycleResult<Order> {
        Ok(self.store.get(order_id)?)
    }

    pub fn list(&self, filter: &OrderFilter) -> LifecycleResult<Vec<Order>> {
        Ok(self.store.list(filter)?)
    }

    pub fn transitions(&self, order_id: &str) -> LifecycleResult<Vec<TransitionRecord>> {
        Ok(self.store.transitions(order_id)?)
    }

    fn require(
        order: &Order,
        event: &'static str,
        allowed: &[OrderStatus],
    ) -> LifecycleResult<()> {
        if allowed.contains(&order.status) {
            Ok(())
        } else {
            Err(LifecycleError::InvalidTransition {
                event,
                from: order.status,
            })
        }
    }

    fn transition(
        &self,
        order: &Order,
        event: &'static str,
        next: OrderStatus,
        patch: StatusPatch,
    ) -> LifecycleResult<Order> {
        let updated = self
            .store
            .update_status(&order.id, order.status, next, event, patch)?;
        tracing::info!(
            order_id = %updated.id,
            event,
            from = %order.status,
            to = %updated.status,
            "order transition"
        );
        Ok(updated)
    }

    // ========== Lifecycle Events ==========

    /// `created → scheduled`
    pub fn schedule_pickup(
        &self,
        order_id: &str,
        pickup_at: DateTime<Utc>,
        address: String,
    ) -> LifecycleResult<Order> {
        let order = self.store.get(order_id)?;
        Self::require(&order, EV_SCHEDULE_PICKUP, &[OrderStatus::Created])?;
        self.transition(
            &order,
            EV_SCHEDULE_PICKUP,
            OrderStatus::Scheduled,
            StatusPatch {
                pickup_at: Some(pickup_at),
                address: Some(address),
                ..Default::default()
            },
        )
    }

    /// Edit pickup fields without advancing the lifecycle.
    ///
    /// Allowed only while `created`/`scheduled` (the only states where these
    /// fields are settable); implemented as a same-state compare-and-set so
    /// the edit races like any other write.
    pub fn update_pickup(
        &self,
        order_id: &str,
        pickup_at: Option<DateTime<Utc>>,
        address: Option<String>,
    ) -> LifecycleResult<Order> {
        let order = self.store.get(order_id)?;
        Self::require(
            &order,
            EV_UPDATE_PICKUP,
            &[OrderStatus::Created, OrderStatus::Scheduled],
        )?;
        self.transition(
            &order,
            EV_UPDATE_PICKUP,
            order.status,
            StatusPatch {
                pickup_at,
                address,
                ..Default::default()
            },
        )
    }

    /// `scheduled → picked_up`
    pub fn mark_picked_up(&self, order_id: &str) -> LifecycleResult<Order> {
        let order = self.store.get(order_id)?;
        Self::require(&order, EV_MARK_PICKED_UP, &[OrderStatus::Scheduled])?;
        self.transition(
            &order,
            EV_MARK_PICKED_UP,
            OrderStatus::PickedUp,
            StatusPatch::default(),
        )
    }

    /// `picked_up → inspected`
    ///
    /// `final_price` may lower the price to reflect condition discrepancies
    /// found at pickup, but never raise it above the quoted price.
    pub fn record_inspection(
        &self,
        order_id: &str,
        final_price: Option<u64>,
    ) -> LifecycleResult<Order> {
        let order = self.store.get(order_id)?;
        Self::require(&order, EV_RECORD_INSPECTION, &[OrderStatus::PickedUp])?;

        if let Some(price) = final_price
            && price > order.price
        {
            return Err(LifecycleError::Validation(format!(
                "inspection price {price} exceeds the quoted price {}",
                order.price
            )));
        }

        self.transition(
            &order,
            EV_RECORD_INSPECTION,
            OrderStatus::Inspected,
            StatusPatch {
                price: final_price,
                ..Default::default()
            },
        )
    }

    /// `inspected → paid` (sell) / `created|scheduled → paid` (purchase).
    ///
    /// Only the payment verification service calls this, after the
    /// signature check. Idempotent: confirming again with the same
    /// `payment_ref` succeeds without a second transition; a different ref
    /// on a paid order is a [`LifecycleError::PaymentMismatch`].
    pub fn confirm_payment(&self, order_id: &str, payment_ref: &str) -> LifecycleResult<Order> {
        let order = self.store.get(order_id)?;

        if let Some(existing) = &order.payment_ref {
            if existing == payment_ref {
                tracing::debug!(order_id = %order.id, payment_ref, "payment already confirmed");
                return Ok(order);
            }
            return Err(LifecycleError::PaymentMismatch { order_id: order.id });
        }

        let allowed: &[OrderStatus] = match order.order_type() {
            OrderType::Sell => &[OrderStatus::Inspected],
            OrderType::Purchase => &[OrderStatus::Created, OrderStatus::Scheduled],
        };
        Self::require(&order, EV_CONFIRM_PAYMENT, allowed)?;

        self.transition(
            &order,
            EV_CONFIRM_PAYMENT,
            OrderStatus::Paid,
            StatusPatch {
                payment_ref: Some(payment_ref.to_string()),
                ..Default::default()
            },
        )
    }

    /// `paid → delivered`
    pub fn mark_delivered(&self, order_id: &str) -> LifecycleResult<Order> {
        let order = self.store.get(order_id)?;
        Self::require(&order, EV_MARK_DELIVERED, &[OrderStatus::Paid])?;
        self.transition(
            &order,
            EV_MARK_DELIVERED,
            OrderStatus::Delivered,
            StatusPatch::default(),
        )
    }

    /// `created|scheduled|picked_up|inspected → cancelled`
    ///
    /// Once money has moved the order must be resolved forward; cancelling
    /// after `paid` is rejected.
    pub fn cancel(&self, order_id: &str, reason: Option<String>) -> LifecycleResult<Order> {
        let order = self.store.get(order_id)?;
        Self::require(
            &order,
            EV_CANCEL,
            &[
                OrderStatus::Created,
                OrderStatus::Scheduled,
                OrderStatus::PickedUp,
                OrderStatus::Inspected,
            ],
        )?;
        self.transition(
            &order,
            EV_CANCEL,
            OrderStatus::Cancelled,
            StatusPatch {
                cancel_reason: reason,
                ..Default::default()
            },
        )
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use shared::order::{OrderDetails, PurchaseDetails, SellDetails};

    fn manager() -> OrderManager {
        OrderManager::new(Arc::new(OrderStore::open_in_memory().unwrap()))
    }

    fn sell_draft() -> OrderDraft {
        OrderDraft {
            details: OrderDetails::Sell(SellDetails {
                category: "phones".into(),
                brand: "Google".into(),
                model: "Pixel 7".into(),
                storage: "128 GB".into(),
                condition: "Good".into(),
            }),
            owner_ref: None,
            price: 20000,
        }
    }

    fn purchase_draft() -> OrderDraft {
        OrderDraft {
            details: OrderDetails::Purchase(PurchaseDetails {
                product_id: "case-42".into(),
                quantity: 1,
            }),
            owner_ref: Some("user-9".into()),
            price: 49900,
        }
    }

    fn advance_to_inspected(manager: &OrderManager, order_id: &str, final_price: Option<u64>) {
        manager
            .schedule_pickup(order_id, Utc::now(), "42 MG Road".into())
            .unwrap();
        manager.mark_picked_up(order_id).unwrap();
        manager.record_inspection(order_id, final_price).unwrap();
    }

    #[test]
    fn test_full_sell_lifecycle() {
        let manager = manager();
        let order = manager.create_order(sell_draft()).unwrap();
        assert_eq!(order.status, OrderStatus::Created);

        advance_to_inspected(&manager, &order.id, Some(18000));
        let order = manager.get(&order.id).unwrap();
        assert_eq!(order.status, OrderStatus::Inspected);
        assert_eq!(order.price, 18000);

        let order = manager.confirm_payment(&order.id, "pay_123").unwrap();
        assert_eq!(order.status, OrderStatus::Paid);
        assert_eq!(order.payment_ref.as_deref(), Some("pay_123"));

        let order = manager.mark_delivered(&order.id).unwrap();
        assert_eq!(order.status, OrderStatus::Delivered);

        // One audit record per event, in order.
        let events: Vec<String> = manager
            .transitions(&order.id)
            .unwrap()
            .into_iter()
            .map(|record| record.event)
            .collect();
        assert_eq!(
            events,
            vec![
                "schedule_pickup",
                "mark_picked_up",
                "record_inspection",
                "confirm_payment",
                "mark_delivered"
            ]
        );
    }

    #[test]
    fn test_events_rejected_from_wrong_state() {
        let manager = manager();
        let order = manager.create_order(sell_draft()).unwrap();

        // Cannot pick up before scheduling
        let err = manager.mark_picked_up(&order.id).unwrap_err();
        assert!(matches!(
            err,
            LifecycleError::InvalidTransition {
                event: "mark_picked_up",
                from: OrderStatus::Created
            }
        ));

        // Cannot inspect before pickup
        assert!(matches!(
            manager.record_inspection(&order.id, None).unwrap_err(),
            LifecycleError::InvalidTransition { .. }
        ));

        // Cannot deliver before payment
        assert!(matches!(
            manager.mark_delivered(&order.id).unwrap_err(),
            LifecycleError::InvalidTransition { .. }
        ));

        // The failed events left the order unchanged.
        let stored = manager.get(&order.id).unwrap();
        assert_eq!(stored.status, OrderStatus::Created);
        assert!(manager.transitions(&order.id).unwrap().is_empty());
    }

    #[test]
    fn test_sell_payment_requires_inspection() {
        let manager = manager();
        let order = manager.create_order(sell_draft()).unwrap();

        let err = manager.confirm_payment(&order.id, "pay_1").unwrap_err();
        assert!(matches!(err, LifecycleError::InvalidTransition { .. }));
    }

    #[test]
    fn test_purchase_payment_allowed_from_created() {
        let manager = manager();
        let order = manager.create_order(purchase_draft()).unwrap();

        let order = manager.confirm_payment(&order.id, "pay_7").unwrap();
        assert_eq!(order.status, OrderStatus::Paid);
    }

    #[test]
    fn test_inspection_cannot_raise_price() {
        let manager = manager();
        let order = manager.create_order(sell_draft()).unwrap();
        manager
            .schedule_pickup(&order.id, Utc::now(), "42 MG Road".into())
            .unwrap();
        manager.mark_picked_up(&order.id).unwrap();

        let err = manager
            .record_inspection(&order.id, Some(20001))
            .unwrap_err();
        assert!(matches!(err, LifecycleError::Validation(_)));

        // Still picked_up at the quoted price.
        let stored = manager.get(&order.id).unwrap();
        assert_eq!(stored.status, OrderStatus::PickedUp);
        assert_eq!(stored.price, 20000);
    }

    #[test]
    fn test_confirm_payment_is_idempotent() {
        let manager = manager();
        let order = manager.create_order(sell_draft()).unwrap();
        advance_to_inspected(&manager, &order.id, None);

        let first = manager.confirm_payment(&order.id, "pay_42").unwrap();
        let second = manager.confirm_payment(&order.id, "pay_42").unwrap();
        assert_eq!(first.status, OrderStatus::Paid);
        assert_eq!(second.status, OrderStatus::Paid);
        assert_eq!(second.payment_ref.as_deref(), Some("pay_42"));

        // No second transition record for the repeat.
        let confirmations = manager
            .transitions(&order.id)
            .unwrap()
            .into_iter()
            .filter(|record| record.event == "confirm_payment")
            .count();
        assert_eq!(confirmations, 1);
    }

    #[test]
    fn test_conflicting_payment_ref_is_a_mismatch() {
        let manager = manager();
        let order = manager.create_order(sell_draft()).unwrap();
        advance_to_inspected(&manager, &order.id, None);
        manager.confirm_payment(&order.id, "pay_42").unwrap();

        let err = manager.confirm_payment(&order.id, "pay_43").unwrap_err();
        assert!(matches!(err, LifecycleError::PaymentMismatch { .. }));

        // The original reference survives.
        let stored = manager.get(&order.id).unwrap();
        assert_eq!(stored.status, OrderStatus::Paid);
        assert_eq!(stored.payment_ref.as_deref(), Some("pay_42"));
    }

    #[test]
    fn test_cancel_before_payment_but_not_after() {
        let manager = manager();

        let cancelled = manager.create_order(sell_draft()).unwrap();
        advance_to_inspected(&manager, &cancelled.id, None);
        let cancelled = manager
            .cancel(&cancelled.id, Some("found a better offer".into()))
            .unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);
        assert_eq!(
            cancelled.cancel_reason.as_deref(),
            Some("found a better offer")
        );

        let paid = manager.create_order(sell_draft()).unwrap();
        advance_to_inspected(&manager, &paid.id, None);
        manager.confirm_payment(&paid.id, "pay_9").unwrap();
        let err = manager.cancel(&paid.id, None).unwrap_err();
        assert!(matches!(
            err,
            LifecycleError::InvalidTransition {
                event: "cancel",
                from: OrderStatus::Paid
            }
        ));
    }

    #[test]
    fn test_cancelled_is_terminal() {
        let manager = manager();
        let order = manager.create_order(sell_draft()).unwrap();
        manager.cancel(&order.id, None).unwrap();

        assert!(matches!(
            manager
                .schedule_pickup(&order.id, Utc::now(), "anywhere".into())
                .unwrap_err(),
            LifecycleError::InvalidTransition { .. }
        ));
        assert!(matches!(
            manager.cancel(&order.id, None).unwrap_err(),
            LifecycleError::InvalidTransition { .. }
        ));
    }

    #[test]
    fn test_update_pickup_only_before_pickup() {
        let manager = manager();
        let order = manager.create_order(sell_draft()).unwrap();
        manager
            .schedule_pickup(&order.id, Utc::now(), "old address".into())
            .unwrap();

        let updated = manager
            .update_pickup(&order.id, None, Some("new address".into()))
            .unwrap();
        assert_eq!(updated.status, OrderStatus::Scheduled);
        assert_eq!(updated.address.as_deref(), Some("new address"));

        manager.mark_picked_up(&order.id).unwrap();
        let err = manager
            .update_pickup(&order.id, None, Some("too late".into()))
            .unwrap_err();
        assert!(matches!(err, LifecycleError::InvalidTransition { .. }));
    }
}
