//! Payment API Module
//!
//! Intent creation for checkout plus the provider callback endpoint. The
//! callback never fails the HTTP exchange for a well-formed payload; the
//! verification verdict travels in the body.

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

/// Payment router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/payments", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/razorpay/order", post(handler::create_intent))
        .route("/razorpay/verify", post(handler::verify))
        .route("/reconciliation", get(handler::list_reconciliation))
}
