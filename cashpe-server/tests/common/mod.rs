//! Shared helpers for integration tests

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;

use cashpe_server::payments::{PaymentProvider, ProviderError, ProviderIntent};
use cashpe_server::{Config, OrderStore, ServerState};

/// In-memory stand-in for the payment gateway: issues sequential intent
/// references without any network traffic.
pub struct MockProvider {
    counter: AtomicU64,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            counter: AtomicU64::new(0),
        }
    }
}

#[async_trait]
impl PaymentProvider for MockProvider {
    async fn create_intent(
        &self,
        amount: u64,
        currency: &str,
        _receipt: &str,
    ) -> Result<ProviderIntent, ProviderError> {
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(ProviderIntent {
            intent_ref: format!("order_mock_{n}"),
            amount,
            currency: currency.to_string(),
        })
    }
}

/// Full server state over a temp-dir store and the mock gateway.
pub fn test_state() -> (ServerState, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let config = Config::with_overrides(dir.path().to_string_lossy(), 0);
    let store = Arc::new(OrderStore::open(dir.path().join("orders.redb")).expect("open store"));
    let state = ServerState::with_services(config, store, Arc::new(MockProvider::new()));
    (state, dir)
}
