//! 配置管理命令
//!
//! 读写客户端配置文件（与 C 接口共用同一个文件）

use anyhow::{Context, Result};
use clap::Subcommand;
use robotctl_client::config::ENV_CONFIG;
use robotctl_client::{ClientConfig, RobotClientBuilder};
use std::path::PathBuf;

use crate::TargetArgs;
use crate::modes::oneshot::resolve_config;

/// 配置文件路径
///
/// `ROBOTCTL_CONFIG` 优先，否则使用平台配置目录。
pub fn config_file() -> Result<PathBuf> {
    if let Some(path) = std::env::var_os(ENV_CONFIG) {
        return Ok(PathBuf::from(path));
    }
    ClientConfig::default_path().ok_or_else(|| anyhow::anyhow!("无法确定配置目录"))
}

/// 读取配置文件，不存在时返回默认配置
pub fn load_config() -> Result<ClientConfig> {
    let path = config_file()?;
    if !path.exists() {
        return Ok(ClientConfig::default());
    }
    ClientConfig::load(&path).with_context(|| format!("读取配置文件失败: {}", path.display()))
}

/// 配置命令
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// 设置配置项
    Set {
        /// 应答超时（毫秒）
        #[arg(long)]
        read_timeout_ms: Option<u64>,

        /// 速度下限
        #[arg(long)]
        min_velocity: Option<f32>,

        /// 速度上限
        #[arg(long)]
        max_velocity: Option<f32>,
    },

    /// 获取配置项
    Get {
        /// 配置项名称
        #[arg(default_value = "all")]
        key: String,
    },

    /// 检查配置并尝试连接
    Check,
}

impl ConfigCommand {
    pub async fn execute(self, target: &TargetArgs) -> Result<()> {
        match self {
            ConfigCommand::Set {
                read_timeout_ms,
                min_velocity,
                max_velocity,
            } => Self::set_(target, read_timeout_ms, min_velocity, max_velocity).await,

            ConfigCommand::Get { key } => Self::get_(key).await,

            ConfigCommand::Check => Self::check_(target).await,
        }
    }

    async fn set_(
        target: &TargetArgs,
        read_timeout_ms: Option<u64>,
        min_velocity: Option<f32>,
        max_velocity: Option<f32>,
    ) -> Result<()> {
        let mut config = load_config()?;

        if let Some(ref host) = target.host {
            config.host = host.clone();
            println!("✅ 设置服务器地址: {}", host);
        }

        if let Some(port) = target.port {
            config.port = port;
            println!("✅ 设置服务器端口: {}", port);
        }

        if let Some(ms) = read_timeout_ms {
            config.read_timeout_ms = ms;
            println!("✅ 设置应答超时: {} ms", ms);
        }

        if let Some(v) = min_velocity {
            config.limits.min_velocity = v;
        }
        if let Some(v) = max_velocity {
            config.limits.max_velocity = v;
        }
        config
            .validate()
            .map_err(|e| anyhow::anyhow!("无效的配置: {}", e))?;
        if min_velocity.is_some() || max_velocity.is_some() {
            println!(
                "✅ 设置速度范围: [{}, {}]",
                config.limits.min_velocity, config.limits.max_velocity
            );
        }

        let path = config_file()?;
        config.save(&path).context("写入配置文件失败")?;
        println!("📝 {}", path.display());
        Ok(())
    }

    async fn get_(key: String) -> Result<()> {
        let config = load_config()?;

        match key.as_str() {
            "host" => println!("{}", config.host),
            "port" => println!("{}", config.port),
            "addr" => println!("{}", config.addr()),
            "read_timeout_ms" => println!("{}", config.read_timeout_ms),
            "velocity" => println!(
                "{} .. {}",
                config.limits.min_velocity, config.limits.max_velocity
            ),
            _ => print_config(&config),
        }

        Ok(())
    }

    async fn check_(target: &TargetArgs) -> Result<()> {
        let path = config_file()?;
        let config = resolve_config(target)?;

        println!("配置文件: {}", path.display());
        if !path.exists() {
            println!("  (不存在，使用默认值)");
        }
        print_config(&config);

        println!();
        println!("⏳ 连接到 {}...", config.addr());
        let addr = config.addr();
        RobotClientBuilder::new()
            .config(config)
            .connect()
            .with_context(|| format!("连接 {} 失败", addr))?;
        println!("✅ 连接正常");

        Ok(())
    }
}

fn print_config(config: &ClientConfig) {
    println!("RobotCtl 配置:");
    println!("  服务器: {}", config.addr());
    println!("  连接超时: {} ms", config.connect_timeout_ms);
    println!("  应答超时: {} ms", config.read_timeout_ms);
    println!("  写超时: {} ms", config.write_timeout_ms);
    println!(
        "  速度范围: [{}, {}]",
        config.limits.min_velocity, config.limits.max_velocity
    );
}
