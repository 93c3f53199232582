//! One-shot 模式
//!
//! 每个命令独立执行：
//! 1. 读取配置
//! 2. 连接控制服务器
//! 3. 执行操作
//! 4. 断开连接

use anyhow::{Context, Result};
use robotctl_client::{ClientConfig, RobotClient, RobotClientBuilder, TcpTransport};
use tracing::debug;

use crate::TargetArgs;
use crate::safety;
use crate::validation;

/// 解析最终使用的客户端配置
///
/// 优先级：命令行参数 > 环境变量 > 配置文件 > 默认值
pub fn resolve_config(target: &TargetArgs) -> Result<ClientConfig> {
    let mut config = ClientConfig::from_env().context("加载客户端配置失败")?;
    if let Some(ref host) = target.host {
        config.host = host.clone();
    }
    if let Some(port) = target.port {
        config.port = port;
    }
    debug!("Resolved client config: {:?}", config);
    Ok(config)
}

/// One-shot 模式
pub struct OneShotMode {
    config: ClientConfig,
}

impl OneShotMode {
    /// 创建新的 One-shot 模式实例
    pub fn new(target: &TargetArgs) -> Result<Self> {
        Ok(Self {
            config: resolve_config(target)?,
        })
    }

    fn connect(&self) -> Result<RobotClient<TcpTransport>> {
        println!("⏳ 连接到 {}...", self.config.addr());
        let client = RobotClientBuilder::new()
            .config(self.config.clone())
            .connect()
            .context("连接控制服务器失败")?;
        println!("✅ 已连接");
        Ok(client)
    }

    /// 发送原始命令
    pub async fn send(&mut self, line: &str) -> Result<()> {
        validation::validate_argument("command", line)?;
        let mut client = self.connect()?;

        let payload = client.send_command(line)?;
        println!("✅ OK{}", format_payload(payload.as_deref()));
        Ok(())
    }

    /// 移动到视角
    pub async fn goto(&mut self, view: &str) -> Result<()> {
        validation::validate_argument("view", view)?;
        let mut client = self.connect()?;

        println!("⏳ 移动到视角 {}...", view);
        let payload = client.goto_view(view)?;
        println!("✅ 已到达{}", format_payload(payload.as_deref()));
        Ok(())
    }

    /// 加载路径
    pub async fn load(&mut self, path: &str) -> Result<()> {
        validation::validate_argument("path", path)?;
        let mut client = self.connect()?;

        let payload = client.load_path(path)?;
        println!("✅ 已加载{}", format_payload(payload.as_deref()));
        Ok(())
    }

    /// 加载并执行路径
    pub async fn execute(&mut self, path: &str, yes: bool) -> Result<()> {
        validation::validate_argument("path", path)?;

        if !yes && !safety::confirm_execution(path)? {
            println!("❌ 操作已取消");
            return Ok(());
        }

        let mut client = self.connect()?;
        client.load_path(path)?;

        println!("⏳ 执行路径 {}...", path);
        let payload = client.execute_path()?;
        println!("✅ 执行完成{}", format_payload(payload.as_deref()));
        Ok(())
    }

    /// 设置速度
    pub async fn velocity(&mut self, value: f32) -> Result<()> {
        validation::validate_velocity(value, &self.config.limits)?;
        let mut client = self.connect()?;

        client.set_velocity(value)?;
        println!("✅ 速度已设置: {}", value);
        Ok(())
    }
}

/// 应答附加信息的显示格式
pub fn format_payload(payload: Option<&str>) -> String {
    match payload {
        Some(text) => format!(": {}", text),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_payload() {
        assert_eq!(format_payload(None), "");
        assert_eq!(format_payload(Some("view 3")), ": view 3");
    }

    #[test]
    fn test_resolve_config_overrides() {
        let target = TargetArgs {
            host: Some("10.0.0.7".to_string()),
            port: Some(61000),
        };
        let config = resolve_config(&target).unwrap();
        assert_eq!(config.addr(), "10.0.0.7:61000");
    }
}
