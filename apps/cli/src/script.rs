//! 脚本系统
//!
//! JSON 脚本：一个会话内按顺序执行的采集步骤

use anyhow::{Context, Result};
use robotctl_client::{RobotClient, Transport};
use serde::{Deserialize, Serialize};
use std::fs;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::modes::oneshot::format_payload;

/// 脚本命令序列
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Script {
    /// 脚本名称
    pub name: String,

    /// 脚本描述
    #[serde(default)]
    pub description: String,

    /// 命令序列
    pub commands: Vec<ScriptCommand>,
}

/// 脚本命令
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ScriptCommand {
    /// 移动到视角
    Goto { view: String },

    /// 加载路径
    Load { path: String },

    /// 执行已加载的路径
    Execute,

    /// 设置速度
    Velocity { value: f32 },

    /// 原始命令
    Send { line: String },

    /// 等待
    Wait { duration_ms: u64 },
}

/// 脚本配置
#[derive(Debug, Clone)]
pub struct ScriptConfig {
    /// 失败时是否继续
    pub continue_on_error: bool,

    /// 步骤间延迟（毫秒）
    pub execution_delay_ms: u64,
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            continue_on_error: false,
            execution_delay_ms: 0,
        }
    }
}

/// 脚本执行器
#[derive(Default)]
pub struct ScriptExecutor {
    config: ScriptConfig,
}

impl ScriptExecutor {
    /// 创建新的脚本执行器
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置配置
    pub fn with_config(mut self, config: ScriptConfig) -> Self {
        self.config = config;
        self
    }

    /// 加载脚本文件
    pub fn load_script<P: AsRef<std::path::Path>>(path: P) -> Result<Script> {
        let content = fs::read_to_string(path).context("读取脚本文件失败")?;

        let script: Script = serde_json::from_str(&content).context("解析脚本 JSON 失败")?;

        Ok(script)
    }

    /// 在给定会话上执行脚本
    pub async fn execute<T: Transport>(
        &mut self,
        client: &mut RobotClient<T>,
        script: &Script,
    ) -> ScriptResult {
        let start = Instant::now();
        let mut result = ScriptResult {
            total_commands: script.commands.len(),
            succeeded: Vec::new(),
            failed: Vec::new(),
            duration_secs: 0.0,
        };

        for (i, cmd) in script.commands.iter().enumerate() {
            println!("命令 {}/{}:", i + 1, result.total_commands);
            debug!("Script {} step {}: {:?}", script.name, i + 1, cmd);

            match self.execute_command(client, cmd).await {
                Ok(_) => {
                    println!("  ✅ 成功");
                    result.succeeded.push(i);
                },

                Err(err) => {
                    println!("  ❌ 失败: {}", err);
                    warn!("Script {} step {} failed: {:#}", script.name, i + 1, err);
                    result.failed.push((i, err.to_string()));

                    // 会话已断开时继续执行没有意义
                    if !self.config.continue_on_error || !client.is_usable() {
                        println!();
                        println!("❌ 脚本执行失败，停止执行");
                        break;
                    }
                },
            }

            if self.config.execution_delay_ms > 0 && i + 1 < script.commands.len() {
                tokio::time::sleep(Duration::from_millis(self.config.execution_delay_ms)).await;
            }
        }

        result.duration_secs = start.elapsed().as_secs_f64();
        result
    }

    /// 执行单个命令
    async fn execute_command<T: Transport>(
        &self,
        client: &mut RobotClient<T>,
        cmd: &ScriptCommand,
    ) -> Result<()> {
        match cmd {
            ScriptCommand::Goto { view } => {
                println!("  移动: view = {}", view);
                client.goto_view(view)?;
            },

            ScriptCommand::Load { path } => {
                println!("  加载: path = {}", path);
                client.load_path(path)?;
            },

            ScriptCommand::Execute => {
                println!("  执行路径");
                let payload = client.execute_path()?;
                println!("    {}", format_payload(payload.as_deref()));
            },

            ScriptCommand::Velocity { value } => {
                println!("  速度: {}", value);
                client.set_velocity(*value)?;
            },

            ScriptCommand::Send { line } => {
                println!("  发送: {}", line);
                let payload = client.send_command(line)?;
                println!("    OK{}", format_payload(payload.as_deref()));
            },

            ScriptCommand::Wait { duration_ms } => {
                println!("  等待: {} ms", duration_ms);
                tokio::time::sleep(Duration::from_millis(*duration_ms)).await;
            },
        }

        Ok(())
    }
}

/// 脚本执行结果
#[derive(Debug)]
pub struct ScriptResult {
    /// 总命令数
    pub total_commands: usize,

    /// 成功的命令索引
    pub succeeded: Vec<usize>,

    /// 失败的命令索引和错误
    pub failed: Vec<(usize, String)>,

    /// 脚本执行时长（秒）
    pub duration_secs: f64,
}

impl ScriptResult {
    /// 所有命令都成功
    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && self.succeeded.len() == self.total_commands
    }
}
