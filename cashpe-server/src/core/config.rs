/// 服务器配置
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./data | 工作目录（订单数据库） |
/// | HTTP_PORT | 4000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | RAZORPAY_KEY_ID | rzp_test_key | 支付网关 key id |
/// | RAZORPAY_KEY_SECRET | rzp_test_secret | 网关密钥，同时用作回调签名密钥 |
/// | RAZORPAY_BASE_URL | https://api.razorpay.com | 网关地址 |
/// | PAYMENT_PROVIDER_TIMEOUT_MS | 10000 | 网关请求超时(毫秒) |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/cashpe HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储订单数据库
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// 支付网关凭据
    pub razorpay_key_id: String,
    /// 网关密钥；回调签名用同一共享密钥
    pub razorpay_key_secret: String,
    /// 网关 API 地址
    pub razorpay_base_url: String,
    /// 网关请求超时 (毫秒)
    pub provider_timeout_ms: u64,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(4000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            razorpay_key_id: std::env::var("RAZORPAY_KEY_ID")
                .unwrap_or_else(|_| "rzp_test_key".into()),
            razorpay_key_secret: std::env::var("RAZORPAY_KEY_SECRET")
                .unwrap_or_else(|_| "rzp_test_secret".into()),
            razorpay_base_url: std::env::var("RAZORPAY_BASE_URL")
                .unwrap_or_else(|_| "https://api.razorpay.com".into()),
            provider_timeout_ms: std::env::var("PAYMENT_PROVIDER_TIMEOUT_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(10000),
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
