//! 输入验证模块
//!
//! 在连接服务器之前拒绝明显无效的输入

use anyhow::{Context, Result};
use robotctl_client::VelocityLimits;
use robotctl_protocol::Command;
use robotctl_protocol::command::validate_velocity as protocol_velocity;
use std::path::Path;

use crate::script::{Script, ScriptCommand};

/// 验证命令参数：非空、单行
pub fn validate_argument(name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        anyhow::bail!("{} 不能为空", name);
    }
    if value.contains(['\r', '\n']) {
        anyhow::bail!("{} 不能包含换行", name);
    }
    Ok(())
}

/// 验证速度：有限正数且在配置的范围内
pub fn validate_velocity(value: f32, limits: &VelocityLimits) -> Result<()> {
    protocol_velocity(value).map_err(|e| anyhow::anyhow!("{}", e))?;
    if value < limits.min_velocity || value > limits.max_velocity {
        anyhow::bail!(
            "速度 {} 超出范围 [{}, {}]",
            value,
            limits.min_velocity,
            limits.max_velocity
        );
    }
    Ok(())
}

/// 验证脚本文件路径
pub fn validate_script_path(path: &str) -> Result<()> {
    let path = Path::new(path);

    if path.as_os_str().is_empty() {
        anyhow::bail!("文件路径为空");
    }

    if !path.exists() {
        anyhow::bail!("文件不存在: {}", path.display());
    }

    // 尝试打开文件以验证可读性
    std::fs::File::open(path).with_context(|| format!("无法读取文件: {}", path.display()))?;

    Ok(())
}

/// 执行前检查整个脚本
///
/// 发现的第一个问题以步骤序号（从 1 开始）报告。
pub fn validate_script(script: &Script, limits: &VelocityLimits) -> Result<()> {
    let mut path_loaded = false;

    for (i, step) in script.commands.iter().enumerate() {
        let check = match step {
            ScriptCommand::Goto { view } => validate_argument("view", view),
            ScriptCommand::Load { path } => {
                path_loaded = true;
                validate_argument("path", path)
            },
            ScriptCommand::Execute => {
                if path_loaded {
                    Ok(())
                } else {
                    Err(anyhow::anyhow!("Execute 之前没有 Load"))
                }
            },
            ScriptCommand::Velocity { value } => validate_velocity(*value, limits),
            ScriptCommand::Send { line } => {
                // 原始命令同样可能加载或执行路径
                match Command::parse(line) {
                    Ok(Command::LoadPath(_)) => path_loaded = true,
                    Ok(Command::ExecutePath) if !path_loaded => {
                        return Err(anyhow::anyhow!("Execute 之前没有 Load"))
                            .with_context(|| format!("步骤 {} 无效", i + 1));
                    },
                    _ => {},
                }
                validate_argument("command", line)
            },
            ScriptCommand::Wait { .. } => Ok(()),
        };
        check.with_context(|| format!("步骤 {} 无效", i + 1))?;
    }

    Ok(())
}
