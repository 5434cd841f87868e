//! 统一错误处理
//!
//! 领域层错误在这里统一映射到 HTTP 响应：
//!
//! | 错误 | 状态码 | 说明 |
//! |------|--------|------|
//! | `NotFound` | 404 | 资源不存在 |
//! | `Validation` / `UnknownAttribute` / `AmountMismatch` | 400 | 输入非法，不重试 |
//! | `Unauthorized` | 401 | 缺少主体标识 |
//! | `InvalidTransition` / `Conflict` / `PaymentMismatch` | 409 | 状态冲突 |
//! | `ProviderUnavailable` | 503 | 网关瞬态故障，可退避重试 |
//! | `Internal` | 500 | 内部错误，细节只进日志 |

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::orders::{LifecycleError, StoreError};
use crate::payments::PaymentError;
use crate::pricing::PricingError;

/// 应用错误枚举
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    UnknownAttribute(String),

    #[error("Authentication required")]
    Unauthorized,

    #[error("{0}")]
    InvalidTransition(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    PaymentMismatch(String),

    #[error("{0}")]
    AmountMismatch(String),

    #[error("{0}")]
    ProviderUnavailable(String),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            AppError::UnknownAttribute(_) => (StatusCode::BAD_REQUEST, "unknown_attribute"),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized"),
            AppError::InvalidTransition(_) => (StatusCode::CONFLICT, "invalid_transition"),
            AppError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            AppError::PaymentMismatch(_) => (StatusCode::CONFLICT, "payment_mismatch"),
            AppError::AmountMismatch(_) => (StatusCode::BAD_REQUEST, "amount_mismatch"),
            AppError::ProviderUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "provider_unavailable")
            }
            AppError::Internal(err) => {
                // 记录内部错误但不暴露详细信息
                tracing::error!(error = ?err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message: self.to_string(),
            details: None,
        };

        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => AppError::NotFound(format!("Order {id} not found")),
            StoreError::Validation(msg) => AppError::Validation(msg),
            StoreError::Conflict { .. } => AppError::Conflict(err.to_string()),
            other => AppError::Internal(other.into()),
        }
    }
}

impl From<LifecycleError> for AppError {
    fn from(err: LifecycleError) -> Self {
        match err {
            LifecycleError::Store(e) => e.into(),
            LifecycleError::InvalidTransition { .. } => {
                AppError::InvalidTransition(err.to_string())
            }
            LifecycleError::PaymentMismatch { .. } => AppError::PaymentMismatch(err.to_string()),
            LifecycleError::Validation(msg) => AppError::Validation(msg),
        }
    }
}

impl From<PaymentError> for AppError {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::Store(e) => e.into(),
            PaymentError::Lifecycle(e) => e.into(),
            PaymentError::AmountMismatch { .. } => AppError::AmountMismatch(err.to_string()),
            PaymentError::Provider(e) => AppError::ProviderUnavailable(e.to_string()),
        }
    }
}

impl From<PricingError> for AppError {
    fn from(err: PricingError) -> Self {
        match err {
            PricingError::UnknownAttribute { .. } => AppError::UnknownAttribute(err.to_string()),
            PricingError::InvalidBasePrice | PricingError::Overflow => {
                AppError::Validation(err.to_string())
            }
        }
    }
}

/// 处理器的 Result 类型别名
pub type AppResult<T> = std::result::Result<T, AppError>;
