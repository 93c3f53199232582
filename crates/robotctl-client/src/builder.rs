//! Builder 模式实现
//!
//! 提供链式构造 `RobotClient` 的便捷方式。

use crate::client::RobotClient;
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::transport::TcpTransport;
use std::time::Duration;
use tracing::info;

/// RobotClient Builder（链式构造）
///
/// # Example
///
/// ```no_run
/// use robotctl_client::RobotClientBuilder;
/// use std::time::Duration;
///
/// let mut client = RobotClientBuilder::new()
///     .host("10.0.0.3")
///     .port(60000)
///     .read_timeout(Duration::from_secs(60))
///     .connect()
///     .unwrap();
///
/// client.goto_view("0").unwrap();
/// ```
#[derive(Debug, Clone, Default)]
pub struct RobotClientBuilder {
    config: ClientConfig,
}

impl RobotClientBuilder {
    /// 使用默认配置创建 Builder
    pub fn new() -> Self {
        Self::default()
    }

    /// 替换整份配置
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// 服务器地址
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// 服务器端口
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// 连接超时
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// 等待应答超时
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.config.read_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// 当前配置
    pub fn get_config(&self) -> &ClientConfig {
        &self.config
    }

    /// 建立连接
    ///
    /// # Errors
    /// - `ClientError::Config`: 超时为 0 或速度限制无效
    /// - `ClientError::Connect`: 地址解析失败或连接失败/超时
    pub fn connect(self) -> Result<RobotClient<TcpTransport>, ClientError> {
        self.config.validate()?;
        let transport = TcpTransport::connect(&self.config)?;
        info!("Connected to robot server at {}", self.config.addr());
        Ok(RobotClient::with_transport(transport, self.config.limits))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_chain() {
        let builder = RobotClientBuilder::new()
            .host("robot.local")
            .port(7000)
            .connect_timeout(Duration::from_millis(250))
            .read_timeout(Duration::from_secs(90));

        let config = builder.get_config();
        assert_eq!(config.addr(), "robot.local:7000");
        assert_eq!(config.connect_timeout_ms, 250);
        assert_eq!(config.read_timeout_ms, 90_000);
    }

    #[test]
    fn test_builder_config_then_override() {
        let config = ClientConfig {
            host: "10.0.0.1".to_string(),
            ..ClientConfig::default()
        };
        let builder = RobotClientBuilder::new().config(config).port(1234);
        assert_eq!(builder.get_config().addr(), "10.0.0.1:1234");
    }

    #[test]
    fn test_zero_timeout_fails_before_connecting() {
        let err = RobotClientBuilder::new()
            .read_timeout(Duration::ZERO)
            .connect()
            .unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }
}
