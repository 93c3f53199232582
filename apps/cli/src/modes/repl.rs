//! REPL 模式（交互式 Shell）
//!
//! 专用输入线程 + crossbeam 通道：保留历史记录，不阻塞 tokio

use anyhow::Result;
use crossbeam_channel::{Receiver, bounded};
use robotctl_client::{ClientConfig, RobotClient, RobotClientBuilder, TcpTransport};
use rustyline::Editor;
use std::panic;
use std::thread;
use tracing::warn;

use crate::TargetArgs;
use crate::modes::oneshot::{format_payload, resolve_config};
use crate::validation;

/// REPL 会话（保持服务器连接）
pub struct ReplSession {
    config: ClientConfig,
    client: Option<RobotClient<TcpTransport>>,
}

impl ReplSession {
    /// 创建新会话（未连接）
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            client: None,
        }
    }

    /// 是否已连接
    pub fn is_connected(&self) -> bool {
        self.client.as_ref().is_some_and(|c| c.is_usable())
    }

    /// 连接到服务器
    ///
    /// `target` 为 `host`、`host:port` 或省略（使用配置）。
    pub fn connect(&mut self, target: Option<&str>) -> Result<()> {
        if self.is_connected() {
            println!("⚠️  已经连接，先断开旧连接");
            self.client = None;
        }

        if let Some(target) = target {
            match target.rsplit_once(':') {
                Some((host, port)) => {
                    self.config.host = host.to_string();
                    self.config.port = port
                        .parse()
                        .map_err(|_| anyhow::anyhow!("无效的端口: {}", port))?;
                },
                None => self.config.host = target.to_string(),
            }
        }

        println!("⏳ 连接到 {}...", self.config.addr());
        let client = RobotClientBuilder::new().config(self.config.clone()).connect()?;
        self.client = Some(client);

        println!("✅ 已连接");
        Ok(())
    }

    /// 断开连接
    pub fn disconnect(&mut self) -> Result<()> {
        if self.client.take().is_none() {
            println!("⚠️  未连接");
            return Ok(());
        }

        println!("✅ 已断开");
        Ok(())
    }

    /// 获取可用的客户端
    ///
    /// 连接已损坏时丢弃它，提示重新连接。
    fn client(&mut self) -> Result<&mut RobotClient<TcpTransport>> {
        if self.client.as_ref().is_some_and(|c| !c.is_usable()) {
            warn!("Dropping broken session to {}", self.config.addr());
            self.client = None;
            anyhow::bail!("连接已断开，请重新 connect");
        }
        self.client
            .as_mut()
            .ok_or_else(|| anyhow::anyhow!("未连接，请先使用 connect 命令"))
    }

    /// 状态描述
    pub fn status(&self) -> String {
        let Some(client) = self.client.as_ref().filter(|c| c.is_usable()) else {
            return "未连接".to_string();
        };

        format!(
            "已连接 {} | 视角: {} | 路径: {} | 速度: {}",
            self.config.addr(),
            client.current_view().unwrap_or("-"),
            client.loaded_path().unwrap_or("-"),
            client
                .velocity()
                .map(|v| v.to_string())
                .unwrap_or_else(|| "-".to_string()),
        )
    }
}

/// REPL 输入（专用输入线程）
pub struct ReplInput {
    command_rx: Receiver<String>,
    _input_thread: thread::JoinHandle<Result<()>>,
}

impl ReplInput {
    /// 创建专用输入线程（保留历史记录）
    pub fn new() -> Self {
        let (command_tx, command_rx) = bounded::<String>(10);

        // Editor 在输入线程内创建，生命周期 = REPL 会话
        let input_thread = thread::spawn(move || {
            use rustyline::history::DefaultHistory;

            let mut rl = Editor::<(), DefaultHistory>::new()
                .map_err(|e| anyhow::anyhow!("Failed to initialize readline: {}", e))?;

            let history_path = dirs::data_local_dir()
                .map(|dir| dir.join("robotctl").join("history"))
                .unwrap_or_else(|| ".robotctl_history".into());
            if let Some(parent) = history_path.parent() {
                std::fs::create_dir_all(parent).ok();
            }
            rl.load_history(&history_path).ok(); // 首次运行没有历史

            println!("RobotCtl CLI v{} - 交互式 Shell", env!("CARGO_PKG_VERSION"));
            println!("输入 'help' 查看帮助，'exit' 退出");
            println!();

            loop {
                match rl.readline("robotctl> ") {
                    Ok(line) => {
                        let line = line.trim().to_string();

                        if line.is_empty() {
                            continue;
                        }

                        if line == "exit" || line == "quit" {
                            rl.save_history(&history_path).ok();
                            let _ = command_tx.send(line);
                            break;
                        }

                        let _ = rl.add_history_entry(line.clone());

                        if command_tx.send(line).is_err() {
                            break; // 主线程已关闭
                        }
                    },

                    Err(rustyline::error::ReadlineError::Interrupted) => {
                        println!("^C");
                        println!("💡 输入 'exit' 退出");
                    },

                    Err(rustyline::error::ReadlineError::Eof) => {
                        // Ctrl+D：退出
                        rl.save_history(&history_path).ok();
                        let _ = command_tx.send("exit".to_string());
                        break;
                    },

                    Err(err) => {
                        eprintln!("Error: {:?}", err);
                        break;
                    },
                }
            }

            Ok(())
        });

        Self {
            command_rx,
            _input_thread: input_thread,
        }
    }

    /// 等待用户输入（在 tokio 任务中使用）
    pub async fn recv_command(&self) -> Option<String> {
        let rx = self.command_rx.clone();
        tokio::task::spawn_blocking(move || rx.recv())
            .await
            .ok()
            .and_then(|result| result.ok())
    }
}

/// 运行 REPL 模式
pub async fn run_repl(target: &TargetArgs) -> Result<()> {
    let mut session = ReplSession::new(resolve_config(target)?);
    let input = ReplInput::new();

    println!();
    println!("💡 提示: 使用 'connect' 连接到控制服务器");
    println!();

    loop {
        tokio::select! {
            line = input.recv_command() => {
                // 输入线程退出时通道关闭
                let Some(line) = line else { break };

                match line.as_str() {
                    "exit" | "quit" => {
                        println!("👋 再见！");
                        break;
                    }

                    "help" => {
                        print_help();
                    }

                    "status" => {
                        println!("📊 状态: {}", session.status());
                    }

                    _ => {
                        // 错误隔离：防止 panic 导致 REPL 崩溃
                        match panic::catch_unwind(panic::AssertUnwindSafe(|| {
                            handle_command(&line, &mut session)
                        })) {
                            Ok(Ok(())) => {}
                            Ok(Err(err)) => {
                                eprintln!("❌ Error: {:#}", err);
                                print_help_hint(&line);
                            }
                            Err(panic_err) => {
                                eprintln!("❌ Command panicked: {:?}", panic_err);
                            }
                        }
                    }
                }
            }

            _ = tokio::signal::ctrl_c() => {
                println!("\n👋 再见！");
                break;
            }
        }
    }

    Ok(())
}

/// 处理命令
fn handle_command(line: &str, session: &mut ReplSession) -> Result<()> {
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    match verb {
        "connect" => {
            session.connect((!rest.is_empty()).then_some(rest))?;
        },

        "disconnect" => {
            session.disconnect()?;
        },

        "goto" => {
            validation::validate_argument("view", rest)?;
            let payload = session.client()?.goto_view(rest)?;
            println!("✅ 已到达{}", format_payload(payload.as_deref()));
        },

        "load" => {
            validation::validate_argument("path", rest)?;
            let payload = session.client()?.load_path(rest)?;
            println!("✅ 已加载{}", format_payload(payload.as_deref()));
        },

        "execute" => {
            println!("⏳ 执行路径...");
            let payload = session.client()?.execute_path()?;
            println!("✅ 执行完成{}", format_payload(payload.as_deref()));
        },

        "velocity" => {
            let value: f32 = rest
                .parse()
                .map_err(|_| anyhow::anyhow!("无效的速度: {:?}", rest))?;
            let client = session.client()?;
            validation::validate_velocity(value, &client.limits())?;
            client.set_velocity(value)?;
            println!("✅ 速度已设置: {}", value);
        },

        "send" => {
            validation::validate_argument("command", rest)?;
            let payload = session.client()?.send_command(rest)?;
            println!("✅ OK{}", format_payload(payload.as_deref()));
        },

        _ => {
            anyhow::bail!("未知命令: {}", verb);
        },
    }

    Ok(())
}

/// 打印帮助信息
fn print_help() {
    println!("可用命令:");
    println!("  connect [host[:port]]         连接到控制服务器");
    println!("  disconnect                    断开连接");
    println!("  goto <view>                   移动到视角");
    println!("  load <path>                   加载路径");
    println!("  execute                       执行已加载的路径");
    println!("  velocity <v>                  设置速度");
    println!("  send <line>                   发送原始命令");
    println!("  status                        显示会话状态");
    println!("  help                          显示帮助");
    println!("  exit / quit                   退出");
    println!();
    println!("快捷键:");
    println!("  Ctrl+D                        退出");
    println!();
}

/// 提供基于错误的帮助提示
fn print_help_hint(command: &str) {
    if command.starts_with("connect") {
        eprintln!("💡 提示: 使用 'connect' 或 'connect 192.168.1.20:60000' 连接");
    } else if command.starts_with("execute") {
        eprintln!("💡 提示: 需要先使用 'load <path>' 加载路径");
    } else if command.starts_with("velocity") {
        eprintln!("💡 提示: 使用 'velocity 0.3' 设置速度");
    } else {
        eprintln!("💡 提示: 输入 'help' 查看所有命令");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use robotctl_sim::{SimConfig, SimServer};

    fn session_for(server: &robotctl_sim::SimHandle) -> ReplSession {
        let config = ClientConfig {
            port: server.addr().port(),
            read_timeout_ms: 500,
            ..ClientConfig::default()
        };
        ReplSession::new(config)
    }

    #[test]
    fn test_commands_require_connection() {
        let mut session = ReplSession::new(ClientConfig::default());
        assert!(handle_command("goto 1", &mut session).is_err());
        assert!(handle_command("execute", &mut session).is_err());
        assert_eq!(session.status(), "未连接");
    }

    #[test]
    fn test_session_flow() {
        let server = SimServer::spawn(SimConfig::ephemeral()).unwrap();
        let mut session = session_for(&server);

        handle_command("connect", &mut session).unwrap();
        assert!(session.is_connected());

        handle_command("velocity 0.2", &mut session).unwrap();
        handle_command("goto 4", &mut session).unwrap();
        assert!(handle_command("execute", &mut session).is_err());
        handle_command("load turntable", &mut session).unwrap();
        handle_command("execute", &mut session).unwrap();
        handle_command("send PING", &mut session).unwrap();

        assert!(session.status().contains("路径: turntable"));
        assert_eq!(server.state().executed, 1);

        handle_command("disconnect", &mut session).unwrap();
        assert!(!session.is_connected());
    }

    #[test]
    fn test_connect_with_address() {
        let server = SimServer::spawn(SimConfig::ephemeral()).unwrap();
        let mut session = ReplSession::new(ClientConfig::default());

        let target = format!("connect 127.0.0.1:{}", server.addr().port());
        handle_command(&target, &mut session).unwrap();
        assert!(session.is_connected());

        assert!(handle_command("connect 127.0.0.1:notaport", &mut session).is_err());
    }

    #[test]
    fn test_unknown_command() {
        let mut session = ReplSession::new(ClientConfig::default());
        assert!(handle_command("fly away", &mut session).is_err());
        assert!(handle_command("velocity fast", &mut session).is_err());
    }
}
