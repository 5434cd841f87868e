//! redb-based order store
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `orders` | `order_id` | `Order` (JSON) | Authoritative order records |
//! | `intents` | `intent_ref` | `order_id` | Payment intent index |
//! | `transitions` | `(order_id, seq)` | `TransitionRecord` (JSON) | Per-order audit stream |
//! | `reconciliation` | `payment_ref` | `ReconciliationEntry` (JSON) | Manual-review queue |
//!
//! # Concurrency
//!
//! Every mutation runs inside a single redb write transaction. Write
//! transactions are serialized, so `update_status` can read the stored
//! status, compare it against the caller's expectation and write the new
//! record atomically - the compare-and-set the rest of the system relies
//! on. A failed compare aborts the transaction, so a losing caller never
//! leaves a partial write behind.
//!
//! Terminal orders are retained indefinitely; nothing here deletes.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use thiserror::Error;
use uuid::Uuid;

use shared::order::{
    Order, OrderDetails, OrderDraft, OrderStatus, OrderType, ReconciliationEntry,
    TransitionRecord,
};

/// Table for order records: key = order_id, value = JSON-serialized Order
const ORDERS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("orders");

/// Table for the payment intent index: key = intent_ref, value = order_id
const INTENTS_TABLE: TableDefinition<&str, &str> = TableDefinition::new("intents");

/// Table for the audit stream: key = (order_id, seq), value = JSON-serialized TransitionRecord
const TRANSITIONS_TABLE: TableDefinition<(&str, u64), &[u8]> =
    TableDefinition::new("transitions");

/// Table for flagged payments: key = payment_ref, value = JSON-serialized ReconciliationEntry
const RECONCILIATION_TABLE: TableDefinition<&str, &[u8]> =
    TableDefinition::new("reconciliation");

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Order not found: {0}")]
    NotFound(String),

    #[error("validation failed: {0}")]
    Validation(String),

    /// The compare-and-set lost a race: another writer changed the status
    /// between the caller's read and this write. Re-read and decide.
    #[error("status conflict on {order_id}: expected {expected}, found {actual}")]
    Conflict {
        order_id: String,
        expected: OrderStatus,
        actual: OrderStatus,
    },
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Field updates applied together with a status write.
///
/// `None` means "leave unchanged"; the patch commits atomically with the
/// status or not at all.
#[derive(Debug, Clone, Default)]
pub struct StatusPatch {
    pub pickup_at: Option<DateTime<Utc>>,
    pub address: Option<String>,
    pub price: Option<u64>,
    pub payment_ref: Option<String>,
    pub cancel_reason: Option<String>,
}

/// Read filter for `list`.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub owner_ref: Option<String>,
    pub status: Option<OrderStatus>,
    pub order_type: Option<OrderType>,
}

/// Order store backed by redb
#[derive(Clone)]
pub struct OrderStore {
    db: Arc<Database>,
}

impl OrderStore {
    /// Open or create the database at the given path.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let db = Database::create(path)?;
        Self::init_tables(&db)?;
        Ok(Self { db: Arc::new(db) })
    }

    /// Open an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> StoreResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init_tables(&db)?;
        Ok(Self { db: Arc::new(db) })
    }

    fn init_tables(db: &Database) -> StoreResult<()> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(ORDERS_TABLE)?;
            let _ = write_txn.open_table(INTENTS_TABLE)?;
            let _ = write_txn.open_table(TRANSITIONS_TABLE)?;
            let _ = write_txn.open_table(RECONCILIATION_TABLE)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    // ========== Order Operations ==========

    /// Persist a new order: assigns id and timestamps, status = `created`.
    pub fn create(&self, draft: OrderDraft) -> StoreResult<Order> {
        validate_draft(&draft)?;

        let now = Utc::now();
        let order = Order {
            id: Uuid::new_v4().to_string(),
            details: draft.details,
            owner_ref: draft.owner_ref,
            price: draft.price,
            status: OrderStatus::Created,
            pickup_at: None,
            address: None,
            payment_intent_ref: None,
            payment_ref: None,
            cancel_reason: None,
            created_at: now,
            updated_at: now,
        };

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(ORDERS_TABLE)?;
            let value = serde_json::to_vec(&order)?;
            table.insert(order.id.as_str(), value.as_slice())?;
        }
        write_txn.commit()?;

        Ok(order)
    }

    /// Load an order by id.
    pub fn get(&self, order_id: &str) -> StoreResult<Order> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;
        let guard = table
            .get(order_id)?
            .ok_or_else(|| StoreError::NotFound(order_id.to_string()))?;
        Ok(serde_json::from_slice(guard.value())?)
    }

    /// Atomic compare-and-set on the order status.
    ///
    /// Succeeds only if the stored status still equals `expected` at write
    /// time; otherwise fails with [`StoreError::Conflict`] and changes
    /// nothing. On success the patch is applied, `updated_at` is bumped and
    /// a [`TransitionRecord`] is appended, all in the same transaction.
    pub fn update_status(
        &self,
        order_id: &str,
        expected: OrderStatus,
        next: OrderStatus,
        event: &str,
        patch: StatusPatch,
    ) -> StoreResult<Order> {
        let write_txn = self.db.begin_write()?;
        let updated = {
            let mut table = write_txn.open_table(ORDERS_TABLE)?;
            let mut order: Order = {
                let guard = table
                    .get(order_id)?
                    .ok_or_else(|| StoreError::NotFound(order_id.to_string()))?;
                serde_json::from_slice(guard.value())?
            };

            if order.status != expected {
                // Dropping the transaction without commit discards everything.
                return Err(StoreError::Conflict {
                    order_id: order_id.to_string(),
                    expected,
                    actual: order.status,
                });
            }

            order.status = next;
            if let Some(pickup_at) = patch.pickup_at {
                order.pickup_at = Some(pickup_at);
            }
            if let Some(address) = patch.address {
                order.address = Some(address);
            }
            if let Some(price) = patch.price {
                order.price = price;
            }
            if let Some(payment_ref) = patch.payment_ref {
                order.payment_ref = Some(payment_ref);
            }
            if let Some(reason) = patch.cancel_reason {
                order.cancel_reason = Some(reason);
            }
            order.updated_at = Utc::now();

            let value = serde_json::to_vec(&order)?;
            table.insert(order_id, value.as_slice())?;

            let mut transitions = write_txn.open_table(TRANSITIONS_TABLE)?;
            // Highest existing seq + 1 for this order's audit stream.
            let mut seq = 1u64;
            for entry in transitions.range((order_id, 0u64)..=(order_id, u64::MAX))? {
                let (key, _value) = entry?;
                seq = key.value().1 + 1;
            }
            let record = TransitionRecord {
                seq,
                from: expected,
                to: next,
                event: event.to_string(),
                at: order.updated_at,
            };
            let record_value = serde_json::to_vec(&record)?;
            transitions.insert((order_id, seq), record_value.as_slice())?;

            order
        };
        write_txn.commit()?;

        Ok(updated)
    }

    /// Store the provider intent reference (plain field update, not a
    /// status transition) and index it for callback lookup.
    pub fn set_payment_intent(&self, order_id: &str, intent_ref: &str) -> StoreResult<Order> {
        let write_txn = self.db.begin_write()?;
        let updated = {
            let mut table = write_txn.open_table(ORDERS_TABLE)?;
            let mut order: Order = {
                let guard = table
                    .get(order_id)?
                    .ok_or_else(|| StoreError::NotFound(order_id.to_string()))?;
                serde_json::from_slice(guard.value())?
            };

            order.payment_intent_ref = Some(intent_ref.to_string());
            order.updated_at = Utc::now();

            let value = serde_json::to_vec(&order)?;
            table.insert(order_id, value.as_slice())?;

            let mut intents = write_txn.open_table(INTENTS_TABLE)?;
            intents.insert(intent_ref, order_id)?;

            order
        };
        write_txn.commit()?;

        Ok(updated)
    }

    /// Resolve a provider intent reference back to its order.
    pub fn find_by_intent(&self, intent_ref: &str) -> StoreResult<Option<Order>> {
        let read_txn = self.db.begin_read()?;
        let intents = read_txn.open_table(INTENTS_TABLE)?;
        let order_id = match intents.get(intent_ref)? {
            Some(guard) => guard.value().to_string(),
            None => return Ok(None),
        };

        let orders = read_txn.open_table(ORDERS_TABLE)?;
        match orders.get(order_id.as_str())? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// List orders matching the filter, newest first.
    pub fn list(&self, filter: &OrderFilter) -> StoreResult<Vec<Order>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;

        let mut orders = Vec::new();
        for entry in table.iter()? {
            let (_key, value) = entry?;
            let order: Order = serde_json::from_slice(value.value())?;

            if let Some(owner_ref) = &filter.owner_ref
                && order.owner_ref.as_deref() != Some(owner_ref.as_str())
            {
                continue;
            }
            if let Some(status) = filter.status
                && order.status != status
            {
                continue;
            }
            if let Some(order_type) = filter.order_type
                && order.order_type() != order_type
            {
                continue;
            }

            orders.push(order);
        }

        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    /// Audit stream for one order, in transition order.
    pub fn transitions(&self, order_id: &str) -> StoreResult<Vec<TransitionRecord>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TRANSITIONS_TABLE)?;

        let mut records = Vec::new();
        for entry in table.range((order_id, 0u64)..=(order_id, u64::MAX))? {
            let (_key, value) = entry?;
            let record: TransitionRecord = serde_json::from_slice(value.value())?;
            records.push(record);
        }

        records.sort_by_key(|record| record.seq);
        Ok(records)
    }

    // ========== Reconciliation Queue ==========

    /// Queue a verified payment that could not be applied to its order.
    pub fn queue_reconciliation(&self, entry: &ReconciliationEntry) -> StoreResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(RECONCILIATION_TABLE)?;
            let value = serde_json::to_vec(entry)?;
            table.insert(entry.payment_ref.as_str(), value.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// All flagged payments, oldest first.
    pub fn list_reconciliation(&self) -> StoreResult<Vec<ReconciliationEntry>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(RECONCILIATION_TABLE)?;

        let mut entries = Vec::new();
        for entry in table.iter()? {
            let (_key, value) = entry?;
            entries.push(serde_json::from_slice(value.value())?);
        }

        entries.sort_by_key(|entry: &ReconciliationEntry| entry.flagged_at);
        Ok(entries)
    }
}

/// Required-field validation for the given order type.
///
/// Negative prices are unrepresentable (`u64`), so only payload shape is
/// checked here.
fn validate_draft(draft: &OrderDraft) -> StoreResult<()> {
    match &draft.details {
        OrderDetails::Sell(details) => {
            let required = [
                ("category", &details.category),
                ("brand", &details.brand),
                ("model", &details.model),
                ("storage", &details.storage),
                ("condition", &details.condition),
            ];
            for (field, value) in required {
                if value.trim().is_empty() {
                    return Err(StoreError::Validation(format!(
                        "sell order is missing {field}"
                    )));
                }
            }
        }
        OrderDetails::Purchase(details) => {
            if details.product_id.trim().is_empty() {
                return Err(StoreError::Validation(
                    "purchase order is missing product_id".to_string(),
                ));
            }
            if details.quantity == 0 {
                return Err(StoreError::Validation(
                    "purchase quantity must be at least 1".to_string(),
                ));
            }
        }
    }
    Ok(())
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use shared::order::{PurchaseDetails, SellDetails};

    fn sell_draft() -> OrderDraft {
        OrderDraft {
            details: OrderDetails::Sell(SellDetails {
                category: "phones".into(),
                brand: "Apple".into(),
                model: "iPhone 12".into(),
                storage: "128 GB".into(),
                condition: "Like New".into(),
            }),
            owner_ref: Some("user-1".into()),
            price: 20000,
        }
    }

    fn purchase_draft() -> OrderDraft {
        OrderDraft {
            details: OrderDetails::Purchase(PurchaseDetails {
                product_id: "case-42".into(),
                quantity: 2,
            }),
            owner_ref: Some("user-2".into()),
            price: 99800,
        }
    }

    #[test]
    fn test_create_assigns_id_and_created_status() {
        let store = OrderStore::open_in_memory().unwrap();
        let order = store.create(sell_draft()).unwrap();

        assert!(!order.id.is_empty());
        assert_eq!(order.status, OrderStatus::Created);
        assert_eq!(order.price, 20000);
        assert_eq!(order.created_at, order.updated_at);
        assert!(order.payment_ref.is_none());

        let loaded = store.get(&order.id).unwrap();
        assert_eq!(loaded, order);
    }

    #[test]
    fn test_create_rejects_incomplete_sell_payload() {
        let store = OrderStore::open_in_memory().unwrap();
        let mut draft = sell_draft();
        if let OrderDetails::Sell(details) = &mut draft.details {
            details.brand = "  ".into();
        }

        let err = store.create(draft).unwrap_err();
        assert!(matches!(err, StoreError::Validation(msg) if msg.contains("brand")));
    }

    #[test]
    fn test_create_rejects_zero_quantity_purchase() {
        let store = OrderStore::open_in_memory().unwrap();
        let mut draft = purchase_draft();
        if let OrderDetails::Purchase(details) = &mut draft.details {
            details.quantity = 0;
        }

        let err = store.create(draft).unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[test]
    fn test_get_unknown_order_is_not_found() {
        let store = OrderStore::open_in_memory().unwrap();
        let err = store.get("missing").unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn test_update_status_applies_patch_and_records_transition() {
        let store = OrderStore::open_in_memory().unwrap();
        let order = store.create(sell_draft()).unwrap();

        let pickup_at = Utc::now();
        let updated = store
            .update_status(
                &order.id,
                OrderStatus::Created,
                OrderStatus::Scheduled,
                "schedule_pickup",
                StatusPatch {
                    pickup_at: Some(pickup_at),
                    address: Some("221B Baker Street".into()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.status, OrderStatus::Scheduled);
        assert_eq!(updated.pickup_at, Some(pickup_at));
        assert_eq!(updated.address.as_deref(), Some("221B Baker Street"));
        assert!(updated.updated_at >= order.updated_at);

        let records = store.transitions(&order.id).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].seq, 1);
        assert_eq!(records[0].from, OrderStatus::Created);
        assert_eq!(records[0].to, OrderStatus::Scheduled);
        assert_eq!(records[0].event, "schedule_pickup");
    }

    #[test]
    fn test_stale_expected_status_is_a_conflict() {
        let store = OrderStore::open_in_memory().unwrap();
        let order = store.create(sell_draft()).unwrap();

        store
            .update_status(
                &order.id,
                OrderStatus::Created,
                OrderStatus::Scheduled,
                "schedule_pickup",
                StatusPatch::default(),
            )
            .unwrap();

        // Second writer raced on the same expected status and must lose.
        let err = store
            .update_status(
                &order.id,
                OrderStatus::Created,
                OrderStatus::Scheduled,
                "schedule_pickup",
                StatusPatch {
                    address: Some("should not be written".into()),
                    ..Default::default()
                },
            )
            .unwrap_err();

        assert!(matches!(
            err,
            StoreError::Conflict {
                expected: OrderStatus::Created,
                actual: OrderStatus::Scheduled,
                ..
            }
        ));

        // The losing patch left no trace.
        let stored = store.get(&order.id).unwrap();
        assert_eq!(stored.status, OrderStatus::Scheduled);
        assert!(stored.address.is_none());
        assert_eq!(store.transitions(&order.id).unwrap().len(), 1);
    }

    #[test]
    fn test_concurrent_transition_has_exactly_one_winner() {
        let store = OrderStore::open_in_memory().unwrap();
        let order = store.create(sell_draft()).unwrap();

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let store = store.clone();
                let order_id = order.id.clone();
                std::thread::spawn(move || {
                    store.update_status(
                        &order_id,
                        OrderStatus::Created,
                        OrderStatus::Scheduled,
                        "schedule_pickup",
                        StatusPatch::default(),
                    )
                })
            })
            .collect();

        let results: Vec<_> = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect();

        let winners = results.iter().filter(|result| result.is_ok()).count();
        assert_eq!(winners, 1);
        assert!(results
            .iter()
            .any(|result| matches!(result, Err(StoreError::Conflict { .. }))));

        // Final state reflects the winner only: one transition record.
        assert_eq!(store.get(&order.id).unwrap().status, OrderStatus::Scheduled);
        assert_eq!(store.transitions(&order.id).unwrap().len(), 1);
    }

    #[test]
    fn test_intent_index_round_trip() {
        let store = OrderStore::open_in_memory().unwrap();
        let order = store.create(sell_draft()).unwrap();

        let updated = store.set_payment_intent(&order.id, "intent_abc").unwrap();
        assert_eq!(updated.payment_intent_ref.as_deref(), Some("intent_abc"));

        let found = store.find_by_intent("intent_abc").unwrap().unwrap();
        assert_eq!(found.id, order.id);

        assert!(store.find_by_intent("intent_unknown").unwrap().is_none());
    }

    #[test]
    fn test_list_filters_by_owner_and_status() {
        let store = OrderStore::open_in_memory().unwrap();
        let mine = store.create(sell_draft()).unwrap();
        store.create(purchase_draft()).unwrap();

        let by_owner = store
            .list(&OrderFilter {
                owner_ref: Some("user-1".into()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(by_owner.len(), 1);
        assert_eq!(by_owner[0].id, mine.id);

        let scheduled = store
            .list(&OrderFilter {
                status: Some(OrderStatus::Scheduled),
                ..Default::default()
            })
            .unwrap();
        assert!(scheduled.is_empty());

        let purchases = store
            .list(&OrderFilter {
                order_type: Some(OrderType::Purchase),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(purchases.len(), 1);
    }

    #[test]
    fn test_cancelled_orders_are_retained() {
        let store = OrderStore::open_in_memory().unwrap();
        let order = store.create(sell_draft()).unwrap();

        store
            .update_status(
                &order.id,
                OrderStatus::Created,
                OrderStatus::Cancelled,
                "cancel",
                StatusPatch {
                    cancel_reason: Some("changed my mind".into()),
                    ..Default::default()
                },
            )
            .unwrap();

        let stored = store.get(&order.id).unwrap();
        assert_eq!(stored.status, OrderStatus::Cancelled);
        assert_eq!(stored.cancel_reason.as_deref(), Some("changed my mind"));
    }

    #[test]
    fn test_reconciliation_queue_round_trip() {
        let store = OrderStore::open_in_memory().unwrap();

        let entry = ReconciliationEntry {
            order_id: Some("o-1".into()),
            intent_ref: "intent_1".into(),
            payment_ref: "pay_1".into(),
            reason: "order in state cancelled cannot accept payment".into(),
            flagged_at: Utc::now(),
        };
        store.queue_reconciliation(&entry).unwrap();

        let entries = store.list_reconciliation().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0], entry);
    }
}
