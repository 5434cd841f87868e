//! Order lifecycle core
//!
//! - **store**: redb-backed order records with the compare-and-set status
//!   write every mutation funnels through
//! - **manager**: the lifecycle state machine built on top of it

pub mod manager;
pub mod store;

pub use manager::{LifecycleError, LifecycleResult, OrderManager};
pub use store::{OrderFilter, OrderStore, StatusPatch, StoreError, StoreResult};
