//! 模拟机械臂状态与命令处理

use crate::{
    ERR_NO_PATH_LOADED, ERR_UNKNOWN_COMMAND, ERR_UNKNOWN_PATH, ERR_UNKNOWN_VIEW, ERR_VELOCITY,
};
use robotctl_protocol::{Command, ProtocolError, Reply};
use std::collections::VecDeque;
use std::time::Duration;

/// 请求记录最多保留的行数
pub const LOG_CAPACITY: usize = 1024;

/// 模拟器配置
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// 监听地址（端口 0 表示由系统分配）
    pub listen: String,

    /// 已知视角
    pub views: Vec<String>,

    /// 接受任意视角名
    pub any_view: bool,

    /// 已知路径
    pub paths: Vec<String>,

    /// 接受任意路径名
    pub any_path: bool,

    /// 允许的最大速度
    pub max_velocity: f32,

    /// 每次运动的模拟耗时
    pub motion_delay: Duration,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            listen: format!("127.0.0.1:{}", robotctl_protocol::DEFAULT_PORT),
            views: (0..=15).map(|i| i.to_string()).collect(),
            any_view: false,
            paths: Vec::new(),
            any_path: true,
            max_velocity: 1.0,
            motion_delay: Duration::ZERO,
        }
    }
}

impl SimConfig {
    /// 测试用配置：随机端口，无运动延迟
    pub fn ephemeral() -> Self {
        Self {
            listen: "127.0.0.1:0".to_string(),
            ..Self::default()
        }
    }

    fn knows_view(&self, view: &str) -> bool {
        self.any_view || self.views.iter().any(|v| v == view)
    }

    fn knows_path(&self, path: &str) -> bool {
        self.any_path || self.paths.iter().any(|p| p == path)
    }
}

/// 注入的故障（只作用于下一条请求）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// 不应答
    NoReply,
    /// 应答一行无法解析的文本
    Garbage,
    /// 直接关闭连接
    Disconnect,
}

/// 模拟机械臂状态
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimState {
    /// 当前所在视角
    pub current_view: Option<String>,

    /// 已加载的路径
    pub loaded_path: Option<String>,

    /// 当前速度
    pub velocity: Option<f32>,

    /// 路径执行次数
    pub executed: u32,

    /// 收到的请求总数
    pub requests: u64,

    /// 最近收到的请求行（按顺序，最多 `LOG_CAPACITY` 行）
    pub log: VecDeque<String>,

    /// 待触发的故障
    pub pending_fault: Option<Fault>,
}

/// 处理一条请求行，更新状态并给出应答
///
/// 返回应答和本次需要模拟的运动耗时。
pub fn respond(config: &SimConfig, state: &mut SimState, line: &str) -> (Reply, Duration) {
    state.requests += 1;
    if state.log.len() == LOG_CAPACITY {
        state.log.pop_front();
    }
    state.log.push_back(line.to_string());

    let command = match Command::parse(line) {
        Ok(command) => command,
        Err(ProtocolError::InvalidVelocity(v)) => {
            return (
                Reply::err(ERR_VELOCITY, format!("invalid velocity {}", v)),
                Duration::ZERO,
            );
        },
        Err(e) => return (Reply::err(ERR_UNKNOWN_COMMAND, e.to_string()), Duration::ZERO),
    };

    match command {
        Command::GotoView(view) => {
            if !config.knows_view(&view) {
                return (Reply::err(ERR_UNKNOWN_VIEW, "unknown view"), Duration::ZERO);
            }
            let reply = Reply::ok_with(format!("view {}", view));
            state.current_view = Some(view);
            (reply, config.motion_delay)
        },

        Command::LoadPath(path) => {
            if !config.knows_path(&path) {
                state.loaded_path = None;
                return (Reply::err(ERR_UNKNOWN_PATH, "unknown path"), Duration::ZERO);
            }
            let reply = Reply::ok_with(format!("path {}", path));
            state.loaded_path = Some(path);
            (reply, Duration::ZERO)
        },

        Command::ExecutePath => match &state.loaded_path {
            Some(path) => {
                let reply = Reply::ok_with(format!("executed {}", path));
                state.executed += 1;
                state.current_view = None;
                (reply, config.motion_delay)
            },
            None => (Reply::err(ERR_NO_PATH_LOADED, "no path loaded"), Duration::ZERO),
        },

        Command::SetVelocity(v) => {
            if v > config.max_velocity {
                return (
                    Reply::err(ERR_VELOCITY, format!("velocity above {}", config.max_velocity)),
                    Duration::ZERO,
                );
            }
            state.velocity = Some(v);
            (Reply::ok(), Duration::ZERO)
        },

        Command::Raw(raw) => match raw.split_whitespace().next().map(str::to_ascii_uppercase).as_deref() {
            Some("PING") => (Reply::ok_with("pong"), Duration::ZERO),
            Some("STATUS") => (Reply::ok_with(status_line(state)), Duration::ZERO),
            _ => (Reply::err(ERR_UNKNOWN_COMMAND, "unknown command"), Duration::ZERO),
        },
    }
}

fn status_line(state: &SimState) -> String {
    format!(
        "view={} path={} velocity={} executed={}",
        state.current_view.as_deref().unwrap_or("-"),
        state.loaded_path.as_deref().unwrap_or("-"),
        state.velocity.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string()),
        state.executed
    )
}
