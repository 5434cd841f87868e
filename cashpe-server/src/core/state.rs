use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::core::Config;
use crate::orders::{OrderManager, OrderStore};
use crate::payments::{PaymentIntents, PaymentProvider, PaymentVerifier, RazorpayProvider};
use crate::pricing::PricingEngine;

/// 服务器状态 - 持有所有服务的单例引用
///
/// 使用 Arc 实现浅拷贝，所有权成本极低。
///
/// # 服务组件
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | store | Arc<OrderStore> | 订单存储 (redb) |
/// | pricing | Arc<PricingEngine> | 报价引擎 (只读表) |
/// | orders | Arc<OrderManager> | 生命周期状态机 |
/// | payments | Arc<PaymentIntents> | 支付 intent 服务 |
/// | verifier | Arc<PaymentVerifier> | 回调签名验证 |
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub store: Arc<OrderStore>,
    pub pricing: Arc<PricingEngine>,
    pub orders: Arc<OrderManager>,
    pub payments: Arc<PaymentIntents>,
    pub verifier: Arc<PaymentVerifier>,
}

impl ServerState {
    /// 初始化所有服务（打开数据库、构建支付网关客户端）
    pub fn initialize(config: &Config) -> anyhow::Result<Self> {
        std::fs::create_dir_all(&config.work_dir)?;
        let store = Arc::new(OrderStore::open(
            Path::new(&config.work_dir).join("orders.redb"),
        )?);

        let provider = Arc::new(RazorpayProvider::new(
            config.razorpay_base_url.clone(),
            config.razorpay_key_id.clone(),
            config.razorpay_key_secret.clone(),
            Duration::from_millis(config.provider_timeout_ms),
        )?);

        Ok(Self::with_services(config.clone(), store, provider))
    }

    /// 以注入的存储与网关构建状态（测试场景）
    pub fn with_services(
        config: Config,
        store: Arc<OrderStore>,
        provider: Arc<dyn PaymentProvider>,
    ) -> Self {
        let pricing = Arc::new(PricingEngine::with_defaults());
        let orders = Arc::new(OrderManager::new(store.clone()));
        let payments = Arc::new(PaymentIntents::new(store.clone(), provider));
        let verifier = Arc::new(PaymentVerifier::new(
            config.razorpay_key_secret.clone(),
            store.clone(),
            orders.clone(),
        ));

        Self {
            config,
            store,
            pricing,
            orders,
            payments,
            verifier,
        }
    }
}
