//! 模拟机械臂控制服务器主入口

use anyhow::{Context, Result};
use clap::Parser;
use robotctl_sim::{SimConfig, SimServer};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// 模拟机械臂控制服务器
///
/// 实现与真实控制服务器相同的行协议，用于没有机械臂时调试采集流程
#[derive(Parser, Debug)]
#[command(name = "robotctl-sim")]
#[command(about = "Simulated robot control server speaking the robotctl line protocol", long_about = None)]
#[command(version)]
struct Args {
    /// 监听地址
    ///
    /// 格式: IP:PORT (例如: 127.0.0.1:60000)
    #[arg(long, default_value = "127.0.0.1:60000")]
    listen: String,

    /// 已知视角列表（逗号分隔）
    ///
    /// 默认: 0 到 15
    #[arg(long, value_delimiter = ',')]
    views: Option<Vec<String>>,

    /// 接受任意视角名
    #[arg(long)]
    any_view: bool,

    /// 已知路径列表（逗号分隔）；不指定时接受任意路径
    #[arg(long, value_delimiter = ',')]
    paths: Option<Vec<String>>,

    /// 允许的最大速度
    #[arg(long, default_value_t = 1.0)]
    max_velocity: f32,

    /// 每次运动的模拟耗时（毫秒）
    #[arg(long, default_value_t = 0)]
    motion_delay_ms: u64,

    /// 日志目录（按天轮转）；不指定时输出到 stderr
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("robotctl_sim=info"))
}

fn main() -> Result<()> {
    let args = Args::parse();

    // 初始化日志（文件模式需要持有 guard 直到退出）
    let _guard = match &args.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "robotctl-sim.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Some(guard)
        },
        None => {
            tracing_subscriber::fmt().with_env_filter(env_filter()).init();
            None
        },
    };

    let mut config = SimConfig {
        listen: args.listen.clone(),
        any_view: args.any_view,
        max_velocity: args.max_velocity,
        motion_delay: Duration::from_millis(args.motion_delay_ms),
        ..SimConfig::default()
    };
    if let Some(views) = args.views {
        config.views = views.into_iter().map(|v| v.trim().to_string()).collect();
    }
    if let Some(paths) = args.paths {
        config.paths = paths.into_iter().map(|p| p.trim().to_string()).collect();
        config.any_path = false;
    }

    // 设置信号处理（Ctrl+C 优雅退出）
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        eprintln!("\nReceived interrupt signal. Shutting down...");
        r.store(false, Ordering::SeqCst);
    })
    .context("Failed to set signal handler")?;

    let mut server = SimServer::spawn(config).with_context(|| format!("Failed to bind {}", args.listen))?;
    eprintln!("robotctl-sim listening on {}. Press Ctrl+C to stop.", server.addr());

    while running.load(Ordering::SeqCst) {
        std::thread::sleep(Duration::from_millis(100));
    }

    server.shutdown();
    let state = server.state();
    eprintln!(
        "Served {} requests, executed {} paths.",
        state.requests,
        state.executed
    );
    Ok(())
}
