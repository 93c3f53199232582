//! 机械臂客户端会话
//!
//! 一个 `RobotClient` 对应一条连接和它的会话状态（已加载的路径、当前速度、当前视角）。
//! 每个操作写一行请求、读一行应答，同一时刻只有一个未完成的请求。
//!
//! # 会话损坏
//!
//! 传输错误、超时或应答格式错误后，连接上可能残留未读的应答，无法再对齐请求和应答。
//! 此时会话被标记为损坏，之后的调用都返回 [`ClientError::NotConnected`]，
//! 直到重新连接。服务器的 `ERR` 应答不会损坏会话。

use crate::builder::RobotClientBuilder;
use crate::config::VelocityLimits;
use crate::error::ClientError;
use crate::transport::Transport;
use robotctl_protocol::{Command, Reply, command::validate_velocity};
use std::net::SocketAddr;
use tracing::{debug, info, warn};

/// 机械臂客户端
#[derive(Debug)]
pub struct RobotClient<T: Transport> {
    transport: T,
    limits: VelocityLimits,
    loaded_path: Option<String>,
    current_view: Option<String>,
    velocity: Option<f32>,
    broken: bool,
}

impl RobotClient<crate::transport::TcpTransport> {
    /// 创建 Builder
    pub fn builder() -> RobotClientBuilder {
        RobotClientBuilder::new()
    }
}

impl<T: Transport> RobotClient<T> {
    /// 在已有传输上创建会话
    pub fn with_transport(transport: T, limits: VelocityLimits) -> Self {
        Self {
            transport,
            limits,
            loaded_path: None,
            current_view: None,
            velocity: None,
            broken: false,
        }
    }

    /// 发送原始命令行，返回成功应答的附加信息
    ///
    /// 可识别的动词（`GOTOVIEW` 等）会走对应的类型化操作，保证会话状态一致；
    /// 其余命令原样发送。
    pub fn send_command(&mut self, line: &str) -> Result<Option<String>, ClientError> {
        self.ensure_usable()?;
        let command = Command::parse(line).map_err(ClientError::InvalidArgument)?;
        match command {
            Command::GotoView(view) => self.goto_view(&view),
            Command::LoadPath(path) => self.load_path(&path),
            Command::ExecutePath => self.execute_path(),
            Command::SetVelocity(v) => self.set_velocity(v).map(|_| None),
            Command::Raw(_) => {
                // 原样发送，保留调用方的大小写和空白
                let raw = robotctl_protocol::strip_line_ending(line);
                self.request(&Command::Raw(raw.to_string()))
            },
        }
    }

    /// 移动到指定视角
    pub fn goto_view(&mut self, view: &str) -> Result<Option<String>, ClientError> {
        let command = Command::GotoView(view.to_string());
        let payload = self.request(&command)?;
        self.current_view = Some(view.trim().to_string());
        info!("Arrived at view {}", view.trim());
        Ok(payload)
    }

    /// 让服务器加载路径
    ///
    /// 失败时清除本地记录的已加载路径。
    pub fn load_path(&mut self, path: &str) -> Result<Option<String>, ClientError> {
        let command = Command::LoadPath(path.to_string());
        match self.request(&command) {
            Ok(payload) => {
                self.loaded_path = Some(path.trim().to_string());
                info!("Loaded path {}", path.trim());
                Ok(payload)
            },
            Err(e) => {
                if matches!(e, ClientError::Rejected { .. }) {
                    self.loaded_path = None;
                }
                Err(e)
            },
        }
    }

    /// 执行已加载的路径
    ///
    /// 本会话内没有成功加载过路径时直接返回 `NoPathLoaded`，不发送任何数据。
    pub fn execute_path(&mut self) -> Result<Option<String>, ClientError> {
        self.ensure_usable()?;
        let Some(path) = self.loaded_path.clone() else {
            warn!("ExecutePath requested with no path loaded");
            return Err(ClientError::NoPathLoaded);
        };

        info!("Executing path {}", path);
        let payload = self.request(&Command::ExecutePath)?;
        // 路径执行完后机械臂不在任何命名视角上
        self.current_view = None;
        Ok(payload)
    }

    /// 设置运动速度
    pub fn set_velocity(&mut self, velocity: f32) -> Result<(), ClientError> {
        self.ensure_usable()?;
        validate_velocity(velocity).map_err(ClientError::InvalidArgument)?;
        self.limits.check(velocity)?;

        self.request(&Command::SetVelocity(velocity))?;
        self.velocity = Some(velocity);
        info!("Velocity set to {}", velocity);
        Ok(())
    }

    /// 本会话内最近一次成功加载的路径
    pub fn loaded_path(&self) -> Option<&str> {
        self.loaded_path.as_deref()
    }

    /// 最近一次成功到达的视角
    pub fn current_view(&self) -> Option<&str> {
        self.current_view.as_deref()
    }

    /// 最近一次成功设置的速度
    pub fn velocity(&self) -> Option<f32> {
        self.velocity
    }

    /// 速度限制
    pub fn limits(&self) -> VelocityLimits {
        self.limits
    }

    /// 对端地址
    pub fn peer(&self) -> Option<SocketAddr> {
        self.transport.peer()
    }

    /// 会话是否可用
    pub fn is_usable(&self) -> bool {
        !self.broken
    }

    fn ensure_usable(&self) -> Result<(), ClientError> {
        if self.broken {
            return Err(ClientError::NotConnected);
        }
        Ok(())
    }

    /// 发送一条请求并等待应答
    fn request(&mut self, command: &Command) -> Result<Option<String>, ClientError> {
        self.ensure_usable()?;
        let line = command.encode().map_err(ClientError::InvalidArgument)?;

        debug!("Sending {}", command.verb());
        let reply = self
            .transport
            .send_line(&line)
            .and_then(|_| self.transport.recv_line())
            .and_then(|raw| Reply::parse(&raw).map_err(ClientError::Protocol));

        match reply {
            Ok(Reply::Ok(payload)) => Ok(payload),
            Ok(Reply::Err { code, message }) => {
                warn!(
                    "{} rejected by server: code {} {}",
                    command.verb(),
                    code,
                    message.as_deref().unwrap_or("")
                );
                Err(ClientError::Rejected { code, message })
            },
            Err(e) => {
                warn!("{} failed, dropping session: {}", command.verb(), e);
                self.broken = true;
                Err(e)
            },
        }
    }
}
