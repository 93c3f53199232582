//! # RobotCtl CLI
//!
//! 采集平台机械臂控制服务器的命令行工具。
//!
//! ## 双模式架构
//!
//! ### One-shot 模式（推荐用于 CI/脚本）
//!
//! ```bash
//! # 配置默认服务器
//! robotctl config set --host 192.168.1.20 --port 60000
//!
//! # 执行操作（内部：连接 -> 命令 -> 断开）
//! robotctl velocity 0.3
//! robotctl execute --path turntable --yes
//! ```
//!
//! ### REPL 模式（推荐用于调试）
//!
//! ```bash
//! $ robotctl shell
//! robotctl> connect 192.168.1.20:60000
//! robotctl> goto 3
//! robotctl> load turntable
//! robotctl> execute
//! robotctl> exit
//! ```

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

mod commands;
mod modes;
mod safety;
mod script;
mod validation;

use commands::{ConfigCommand, RunCommand};
use modes::oneshot::OneShotMode;
use modes::repl::run_repl;

/// RobotCtl CLI - 采集平台机械臂命令行工具
#[derive(Parser, Debug)]
#[command(name = "robotctl")]
#[command(about = "Command-line interface for the capture-rig robot control server", long_about = None)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    target: TargetArgs,

    #[command(subcommand)]
    command: Commands,
}

/// 服务器地址覆盖（优先级高于配置文件和环境变量）
#[derive(Args, Debug, Clone, Default)]
pub struct TargetArgs {
    /// 控制服务器地址
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// 控制服务器端口
    #[arg(long, global = true)]
    pub port: Option<u16>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 配置管理
    #[command(subcommand)]
    Config(ConfigCommand),

    /// 发送原始命令行
    Send {
        /// 命令内容（多个参数以空格连接）
        #[arg(required = true, num_args = 1..)]
        line: Vec<String>,
    },

    /// 移动到命名视角
    Goto {
        /// 视角名称
        view: String,
    },

    /// 加载路径
    Load {
        /// 路径名称
        path: String,
    },

    /// 执行路径
    Execute {
        /// 执行前先加载的路径（每次连接都是新会话，必须指定）
        #[arg(short, long)]
        path: String,

        /// 跳过确认
        #[arg(short, long)]
        yes: bool,
    },

    /// 设置运动速度
    Velocity {
        /// 速度值
        #[arg(allow_negative_numbers = true)]
        value: f32,
    },

    /// 执行脚本
    Run {
        #[command(flatten)]
        args: RunCommand,
    },

    /// 启动交互式 Shell（REPL 模式）
    Shell,
}

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志（stderr，不干扰命令输出）
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("robotctl=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let target = cli.target;

    match cli.command {
        Commands::Config(cmd) => {
            // One-shot 模式：配置管理
            cmd.execute(&target).await
        },

        Commands::Send { line } => {
            let mut mode = OneShotMode::new(&target)?;
            mode.send(&line.join(" ")).await
        },

        Commands::Goto { view } => {
            let mut mode = OneShotMode::new(&target)?;
            mode.goto(&view).await
        },

        Commands::Load { path } => {
            let mut mode = OneShotMode::new(&target)?;
            mode.load(&path).await
        },

        Commands::Execute { path, yes } => {
            let mut mode = OneShotMode::new(&target)?;
            mode.execute(&path, yes).await
        },

        Commands::Velocity { value } => {
            let mut mode = OneShotMode::new(&target)?;
            mode.velocity(value).await
        },

        Commands::Run { args } => {
            // One-shot 模式：整个脚本共用一个会话
            args.execute(&target).await
        },

        Commands::Shell => {
            // REPL 模式：交互式 Shell
            run_repl(&target).await
        },
    }
}
