//! # RobotCtl Client
//!
//! 采集平台机械臂控制服务器的阻塞式 TCP 客户端。
//!
//! - [`RobotClient`]: 一条连接和它的会话状态
//! - [`RobotClientBuilder`]: 链式构造
//! - [`ClientConfig`]: TOML 配置 + 环境变量覆盖
//! - [`Transport`]: 行传输接口，测试可替换
//!
//! ```no_run
//! use robotctl_client::{ClientConfig, RobotClientBuilder};
//!
//! let config = ClientConfig::from_env()?;
//! let mut client = RobotClientBuilder::new().config(config).connect()?;
//!
//! client.set_velocity(0.3)?;
//! client.load_path("paths/turntable.path")?;
//! client.execute_path()?;
//! # Ok::<(), robotctl_client::ClientError>(())
//! ```

mod builder;
mod client;
pub mod config;
mod error;
pub mod transport;

pub use builder::RobotClientBuilder;
pub use client::RobotClient;
pub use config::{ClientConfig, VelocityLimits};
pub use error::ClientError;
pub use transport::{TcpTransport, Transport};

// 协议层常用类型
pub use robotctl_protocol::{Command, Reply, StatusCode};
