//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`quotes`] - 报价接口
//! - [`orders`] - 订单与生命周期事件接口
//! - [`payments`] - 支付 intent 创建与回调验证
//! - [`pickup`] - 上门取件时段

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::core::ServerState;

mod extract;

pub mod health;
pub mod orders;
pub mod payments;
pub mod pickup;
pub mod quotes;

pub use extract::OwnerRef;

// Re-export common types for handlers
pub use crate::utils::{AppError, AppResult};

/// Build a router with all routes registered (no middleware, no state)
pub fn build_router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(quotes::router())
        .merge(orders::router())
        .merge(payments::router())
        .merge(pickup::router())
}

/// Build a fully configured application with middleware and state
pub fn build_app(state: &ServerState) -> Router {
    build_router()
        // CORS - the storefront runs on a different origin
        .layer(CorsLayer::permissive())
        // Request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone())
}
