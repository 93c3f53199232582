//! 模拟机械臂控制服务器
//!
//! 实现与真实控制服务器相同的行协议，用于台架调试和测试。
//! 每个客户端一个线程，共享一份机械臂状态。
//!
//! ```no_run
//! use robotctl_sim::{SimConfig, SimServer};
//!
//! let server = SimServer::spawn(SimConfig::default()).unwrap();
//! println!("listening on {}", server.addr());
//! ```

mod server;
mod state;

pub use server::{SimHandle, SimServer};
pub use state::{Fault, LOG_CAPACITY, SimConfig, SimState, respond};

/// 未知命令或请求行无法解析
pub const ERR_UNKNOWN_COMMAND: i32 = 1;
/// 未知视角
pub const ERR_UNKNOWN_VIEW: i32 = 2;
/// 未知路径
pub const ERR_UNKNOWN_PATH: i32 = 3;
/// 未加载路径
pub const ERR_NO_PATH_LOADED: i32 = 4;
/// 速度超出范围
pub const ERR_VELOCITY: i32 = 5;
