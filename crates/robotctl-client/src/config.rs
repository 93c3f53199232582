//! 客户端配置
//!
//! 配置文件路径：
//! - Linux: `~/.config/robotctl/config.toml`
//! - macOS: `~/Library/Application Support/robotctl/config.toml`
//! - Windows: `%APPDATA%\robotctl\config.toml`
//!
//! 环境变量（优先级高于文件）：
//! - `ROBOTCTL_CONFIG`: 配置文件路径
//! - `ROBOTCTL_HOST` / `ROBOTCTL_PORT`: 覆盖服务器地址

use crate::error::ClientError;
use robotctl_protocol::DEFAULT_PORT;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 配置文件路径环境变量
pub const ENV_CONFIG: &str = "ROBOTCTL_CONFIG";
/// 服务器地址环境变量
pub const ENV_HOST: &str = "ROBOTCTL_HOST";
/// 服务器端口环境变量
pub const ENV_PORT: &str = "ROBOTCTL_PORT";

/// 客户端配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// 控制服务器地址
    pub host: String,

    /// 控制服务器端口
    pub port: u16,

    /// 连接超时（毫秒）
    pub connect_timeout_ms: u64,

    /// 等待应答超时（毫秒）
    ///
    /// 执行路径时服务器在运动结束后才应答，因此默认值较大。
    pub read_timeout_ms: u64,

    /// 写超时（毫秒）
    pub write_timeout_ms: u64,

    /// 速度限制
    pub limits: VelocityLimits,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            connect_timeout_ms: 3_000,
            read_timeout_ms: 30_000,
            write_timeout_ms: 3_000,
            limits: VelocityLimits::default(),
        }
    }
}

impl ClientConfig {
    /// 默认配置文件路径
    pub fn default_path() -> Option<PathBuf> {
        let mut path = dirs::config_dir()?;
        path.push("robotctl");
        path.push("config.toml");
        Some(path)
    }

    /// 从 TOML 文件加载，缺失字段使用默认值
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ClientError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| ClientError::Config(format!("read {}: {}", path.display(), e)))?;
        Self::from_toml(&content)
    }

    /// 从 TOML 文本解析
    pub fn from_toml(content: &str) -> Result<Self, ClientError> {
        let config: Self = toml::from_str(content).map_err(|e| ClientError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// 检查超时和速度限制
    ///
    /// 超时为 0 时 socket 无法设置超时，速度范围必须满足 `0 < min <= max`。
    pub fn validate(&self) -> Result<(), ClientError> {
        for (name, ms) in [
            ("connect_timeout_ms", self.connect_timeout_ms),
            ("read_timeout_ms", self.read_timeout_ms),
            ("write_timeout_ms", self.write_timeout_ms),
        ] {
            if ms == 0 {
                return Err(ClientError::Config(format!("{} must be positive", name)));
            }
        }
        self.limits.validate()
    }

    /// 保存为 TOML 文件（自动创建父目录）
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ClientError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .map_err(|e| ClientError::Config(format!("create {}: {}", parent.display(), e)))?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| ClientError::Config(e.to_string()))?;
        fs::write(path, content)
            .map_err(|e| ClientError::Config(format!("write {}: {}", path.display(), e)))
    }

    /// 从进程环境变量构造配置
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 按给定的查找函数构造配置
    ///
    /// 先读取 `ROBOTCTL_CONFIG` 指向的文件（未设置时尝试默认路径，文件不存在则用默认值），
    /// 再应用 `ROBOTCTL_HOST` / `ROBOTCTL_PORT` 覆盖。
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ClientError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match lookup(ENV_CONFIG) {
            Some(path) => Self::load(path)?,
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::load(path)?,
                _ => Self::default(),
            },
        };

        if let Some(host) = lookup(ENV_HOST).filter(|h| !h.trim().is_empty()) {
            config.host = host.trim().to_string();
        }

        if let Some(port) = lookup(ENV_PORT) {
            config.port = port
                .trim()
                .parse()
                .map_err(|_| ClientError::Config(format!("invalid {}: {:?}", ENV_PORT, port)))?;
        }

        config.validate()?;
        Ok(config)
    }

    /// `host:port`
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// 连接超时
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// 读超时
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    /// 写超时
    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }
}

/// 速度限制
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VelocityLimits {
    /// 最小速度
    pub min_velocity: f32,

    /// 最大速度
    pub max_velocity: f32,
}

impl Default for VelocityLimits {
    fn default() -> Self {
        Self {
            min_velocity: 0.001,
            max_velocity: 1.0,
        }
    }
}

impl VelocityLimits {
    /// 限制本身是否有效
    pub fn validate(&self) -> Result<(), ClientError> {
        let (min, max) = (self.min_velocity, self.max_velocity);
        if !min.is_finite() || !max.is_finite() || min <= 0.0 || min > max {
            return Err(ClientError::Config(format!(
                "invalid velocity limits {}..={}",
                min, max
            )));
        }
        Ok(())
    }

    /// 检查速度是否在限制内
    pub fn check(&self, velocity: f32) -> Result<(), ClientError> {
        if velocity < self.min_velocity || velocity > self.max_velocity {
            return Err(ClientError::VelocityOutOfRange {
                value: velocity,
                min: self.min_velocity,
                max: self.max_velocity,
            });
        }
        Ok(())
    }
}
