//! cashpe server - 设备回收与配件商城后端
//!
//! # 架构概述
//!
//! 核心是订单生命周期与支付结算引擎：报价 → 订单创建 → 固定状态机
//! （取件/质检/支付事件驱动）→ 回调签名验证后标记已支付。
//!
//! # 模块结构
//!
//! ```text
//! cashpe-server/src/
//! ├── core/       # 配置、状态、服务器
//! ├── pricing/    # 报价引擎（纯计算）
//! ├── orders/     # 订单存储 + 生命周期状态机
//! ├── payments/   # 支付网关适配、intent、回调验证
//! ├── api/        # HTTP 路由和处理器
//! └── utils/      # 错误映射、日志
//! ```

pub mod api;
pub mod core;
pub mod orders;
pub mod payments;
pub mod pricing;
pub mod utils;

// Re-export 公共类型
pub use core::{Config, Server, ServerState};
pub use orders::{OrderManager, OrderStore};
pub use payments::{PaymentIntents, PaymentVerifier};
pub use pricing::PricingEngine;
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// 设置运行环境 (dotenv, 日志)
pub fn setup_environment() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    init_logger();
    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
   ______           __    ____
  / ____/___ ______/ /_  / __ \___
 / /   / __ `/ ___/ __ \/ /_/ / _ \
/ /___/ /_/ (__  ) / / / ____/  __/
\____/\__,_/____/_/ /_/_/    \___/
    "#
    );
}
