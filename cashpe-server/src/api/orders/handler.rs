//! Order API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use shared::order::{
    Order, OrderDetails, OrderDraft, PurchaseDetails, SellDetails, TransitionRecord,
};
use shared::request::{
    CancelRequest, CreatePurchaseOrder, CreateSellOrder, InspectionRequest,
    PickupDetailsRequest, SchedulePickupRequest,
};

use crate::api::OwnerRef;
use crate::core::ServerState;
use crate::orders::OrderFilter;
use crate::utils::{AppError, AppResult};

/// Create a sell-in order.
///
/// The price is recomputed from the multiplier tables; any price the client
/// may have displayed locally is ignored.
pub async fn create_sell(
    State(state): State<ServerState>,
    OwnerRef(owner_ref): OwnerRef,
    Json(payload): Json<CreateSellOrder>,
) -> AppResult<Json<Order>> {
    let quote = state
        .pricing
        .quote(payload.base_price, &payload.condition, &payload.storage)?;

    let order = state.orders.create_order(OrderDraft {
        details: OrderDetails::Sell(SellDetails {
            category: payload.category,
            brand: payload.brand,
            model: payload.model,
            storage: payload.storage,
            condition: payload.condition,
        }),
        owner_ref,
        price: quote.computed_price,
    })?;

    Ok(Json(order))
}

/// Create an accessory purchase order.
pub async fn create_purchase(
    State(state): State<ServerState>,
    OwnerRef(owner_ref): OwnerRef,
    Json(payload): Json<CreatePurchaseOrder>,
) -> AppResult<Json<Order>> {
    let price = payload
        .unit_price
        .checked_mul(u64::from(payload.quantity))
        .ok_or_else(|| AppError::validation("order total out of range"))?;

    let order = state.orders.create_order(OrderDraft {
        details: OrderDetails::Purchase(PurchaseDetails {
            product_id: payload.product_id,
            quantity: payload.quantity,
        }),
        owner_ref,
        price,
    })?;

    Ok(Json(order))
}

/// List the caller's orders, newest first.
pub async fn list_my(
    State(state): State<ServerState>,
    OwnerRef(owner_ref): OwnerRef,
) -> AppResult<Json<Vec<Order>>> {
    let owner_ref = owner_ref.ok_or(AppError::Unauthorized)?;
    let orders = state.orders.list(&OrderFilter {
        owner_ref: Some(owner_ref),
        ..Default::default()
    })?;
    Ok(Json(orders))
}

/// Get order by id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    Ok(Json(state.orders.get(&id)?))
}

/// Audit stream for an order.
pub async fn get_timeline(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<TransitionRecord>>> {
    // Surface 404 for unknown ids rather than an empty stream.
    state.orders.get(&id)?;
    Ok(Json(state.orders.transitions(&id)?))
}

/// `created → scheduled`
pub async fn schedule_pickup(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<SchedulePickupRequest>,
) -> AppResult<Json<Order>> {
    let order = state
        .orders
        .schedule_pickup(&id, payload.pickup_at, payload.address)?;
    Ok(Json(order))
}

/// Edit pickup fields while the order is still `created`/`scheduled`.
pub async fn update_pickup_details(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<PickupDetailsRequest>,
) -> AppResult<Json<Order>> {
    let order = state
        .orders
        .update_pickup(&id, payload.pickup_at, payload.address)?;
    Ok(Json(order))
}

/// `scheduled → picked_up`
pub async fn mark_picked_up(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    Ok(Json(state.orders.mark_picked_up(&id)?))
}

/// `picked_up → inspected`, optionally lowering the price.
pub async fn record_inspection(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<InspectionRequest>,
) -> AppResult<Json<Order>> {
    Ok(Json(state.orders.record_inspection(&id, payload.final_price)?))
}

/// `paid → delivered`
pub async fn mark_delivered(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    Ok(Json(state.orders.mark_delivered(&id)?))
}

/// Cancel a not-yet-paid order.
pub async fn cancel(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<CancelRequest>,
) -> AppResult<Json<Order>> {
    Ok(Json(state.orders.cancel(&id, payload.reason)?))
}
