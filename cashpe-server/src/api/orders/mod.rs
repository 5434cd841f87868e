//! Order API Module
//!
//! Order creation, reads and the lifecycle event endpoints. All mutations
//! go through the lifecycle manager.

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

/// Order router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        // Creation
        .route("/sell", post(handler::create_sell))
        .route("/purchase", post(handler::create_purchase))
        // Reads
        .route("/my", get(handler::list_my))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/timeline", get(handler::get_timeline))
        // Lifecycle events
        .route("/{id}/schedule", post(handler::schedule_pickup))
        .route("/{id}/pickup-details", put(handler::update_pickup_details))
        .route("/{id}/pickup", post(handler::mark_picked_up))
        .route("/{id}/inspection", post(handler::record_inspection))
        .route("/{id}/deliver", post(handler::mark_delivered))
        .route("/{id}/cancel", post(handler::cancel))
}
