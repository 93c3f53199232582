//! 进程级会话

use parking_lot::{Mutex, const_mutex};
use robotctl_client::{ClientConfig, ClientError, RobotClient, RobotClientBuilder, TcpTransport};
use robotctl_protocol::StatusCode;
use tracing::{info, warn};

static SESSION: Mutex<Option<RobotClient<TcpTransport>>> = const_mutex(None);

/// 用给定配置建立新会话，替换已有会话
pub fn connect_with_config(config: ClientConfig) -> StatusCode {
    let mut slot = SESSION.lock();
    if slot.take().is_some() {
        info!("Replacing existing session");
    }

    let addr = config.addr();
    match RobotClientBuilder::new().config(config).connect() {
        Ok(client) => {
            *slot = Some(client);
            StatusCode::Ok
        },
        Err(e) => {
            warn!("Connect to {} failed: {}", addr, e);
            e.status_code()
        },
    }
}

/// 从环境变量读取配置并建立会话
pub(crate) fn connect_from_env() -> StatusCode {
    match ClientConfig::from_env() {
        Ok(config) => connect_with_config(config),
        Err(e) => {
            warn!("Invalid client configuration: {}", e);
            e.status_code()
        },
    }
}

/// 断开会话
pub fn disconnect() -> StatusCode {
    if SESSION.lock().take().is_some() {
        info!("Session closed");
    }
    StatusCode::Ok
}

/// 当前是否有可用会话
pub fn is_connected() -> bool {
    SESSION.lock().as_ref().is_some_and(|c| c.is_usable())
}

/// 在当前会话上执行操作
///
/// 没有会话返回 `NotConnected`；操作使会话损坏时丢弃会话。
pub(crate) fn with_session<R, F>(f: F) -> StatusCode
where
    F: FnOnce(&mut RobotClient<TcpTransport>) -> Result<R, ClientError>,
{
    let mut slot = SESSION.lock();
    let Some(client) = slot.as_mut() else {
        return StatusCode::NotConnected;
    };

    let code = match f(client) {
        Ok(_) => StatusCode::Ok,
        Err(e) => e.status_code(),
    };

    if !client.is_usable() {
        warn!("Session dropped after {}", code);
        *slot = None;
    }
    code
}
