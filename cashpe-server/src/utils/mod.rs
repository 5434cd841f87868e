//! 工具模块 - 错误映射与日志
//!
//! - [`AppError`] / [`AppResult`] - 应用错误类型与 HTTP 映射
//! - [`logger`] - tracing 初始化

pub mod error;
pub mod logger;

pub use error::{AppError, AppResult};
