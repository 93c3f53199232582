//! 安全检查模块
//!
//! 执行路径会让机械臂大范围运动，执行前需要操作员确认

use anyhow::{Result, bail};
use std::io::IsTerminal;

/// 询问是否执行路径
///
/// 非交互终端下无法确认，要求显式传入 `--yes`。
pub fn confirm_execution(path: &str) -> Result<bool> {
    if !std::io::stdin().is_terminal() {
        bail!("标准输入不是终端，无法确认执行；请使用 --yes");
    }

    println!("⚠️  即将执行路径: {}", path);
    println!("  请确认工作区内无人员和遮挡物");

    // ✅ 使用 inquire 提供更好的交互体验
    let confirmed = inquire::Confirm::new("确定要继续吗？")
        .with_default(false) // 默认为 No（安全优先）
        .prompt()
        .map_err(|e| anyhow::anyhow!("用户交互失败: {}", e))?;

    Ok(confirmed)
}
