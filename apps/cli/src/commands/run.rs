//! run 命令
//!
//! 执行脚本文件

use anyhow::{Context, Result};
use clap::Args;
use robotctl_client::RobotClientBuilder;

use crate::TargetArgs;
use crate::modes::oneshot::resolve_config;
use crate::script::{ScriptConfig, ScriptExecutor};
use crate::validation;

/// 脚本执行命令参数
#[derive(Args, Debug)]
pub struct RunCommand {
    /// 脚本文件路径
    #[arg(short, long)]
    pub script: String,

    /// 失败时继续执行
    #[arg(long)]
    pub continue_on_error: bool,

    /// 步骤间延迟（毫秒）
    #[arg(long, default_value_t = 0)]
    pub delay_ms: u64,
}

impl RunCommand {
    /// 执行脚本
    pub async fn execute(&self, target: &TargetArgs) -> Result<()> {
        println!("📜 加载脚本: {}", self.script);

        validation::validate_script_path(&self.script)?;
        let script = ScriptExecutor::load_script(&self.script)?;

        println!("📋 脚本: {}", script.name);
        if !script.description.is_empty() {
            println!("    {}", script.description);
        }
        println!("    {} 个命令", script.commands.len());
        println!();

        let config = resolve_config(target)?;
        validation::validate_script(&script, &config.limits)?;

        println!("🔌 连接到 {}...", config.addr());
        let mut client = RobotClientBuilder::new()
            .config(config)
            .connect()
            .context("连接控制服务器失败")?;
        println!("✅ 已连接\n");

        let mut executor = ScriptExecutor::new().with_config(ScriptConfig {
            continue_on_error: self.continue_on_error,
            execution_delay_ms: self.delay_ms,
        });

        let result = executor.execute(&mut client, &script).await;

        println!();
        println!("📊 执行结果:");
        println!("  总命令数: {}", result.total_commands);
        println!("  成功: {}", result.succeeded.len());
        println!("  失败: {}", result.failed.len());
        println!("  耗时: {:.2} 秒", result.duration_secs);

        if !result.failed.is_empty() {
            println!();
            println!("❌ 失败的命令:");
            for (idx, err) in &result.failed {
                println!("  命令 {}: {}", idx + 1, err);
            }
            anyhow::bail!("脚本 {} 执行失败", script.name);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_command_defaults() {
        let cmd = RunCommand {
            script: "capture.json".to_string(),
            continue_on_error: false,
            delay_ms: 0,
        };

        assert_eq!(cmd.script, "capture.json");
        assert!(!cmd.continue_on_error);
    }

    #[tokio::test]
    async fn test_missing_script_file() {
        let cmd = RunCommand {
            script: "/nonexistent/capture.json".to_string(),
            continue_on_error: false,
            delay_ms: 0,
        };

        assert!(cmd.execute(&TargetArgs::default()).await.is_err());
    }
}
