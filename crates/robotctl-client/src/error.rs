//! 客户端错误类型定义

use robotctl_protocol::{ProtocolError, StatusCode};
use thiserror::Error;

/// 客户端错误类型
#[derive(Error, Debug)]
pub enum ClientError {
    /// Socket 读写错误
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// 连接服务器失败
    #[error("Failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// 等待应答超时
    #[error("Timed out waiting for reply")]
    Timeout,

    /// 参数无法编码为请求行
    #[error("Invalid argument: {0}")]
    InvalidArgument(#[source] ProtocolError),

    /// 应答无法解析
    #[error("Protocol error: {0}")]
    Protocol(#[source] ProtocolError),

    /// 服务器返回 `ERR`
    #[error("Rejected by server (code {code}){}", .message.as_deref().map(|m| format!(": {}", m)).unwrap_or_default())]
    Rejected { code: i32, message: Option<String> },

    /// 会话不存在或已损坏
    #[error("Not connected")]
    NotConnected,

    /// 执行前没有成功加载路径
    #[error("No path loaded in this session")]
    NoPathLoaded,

    /// 速度超出配置的范围
    #[error("Velocity {value} out of range [{min}, {max}]")]
    VelocityOutOfRange { value: f32, min: f32, max: f32 },

    /// 配置加载/保存失败
    #[error("Config error: {0}")]
    Config(String),
}

impl ClientError {
    /// 对应的 C 返回码
    pub fn status_code(&self) -> StatusCode {
        match self {
            ClientError::Io(_) => StatusCode::Io,
            ClientError::Connect { .. } => StatusCode::ConnectFailed,
            ClientError::Timeout => StatusCode::Timeout,
            ClientError::InvalidArgument(_) => StatusCode::InvalidArgument,
            ClientError::Protocol(_) => StatusCode::Protocol,
            ClientError::Rejected { .. } => StatusCode::Rejected,
            ClientError::NotConnected => StatusCode::NotConnected,
            ClientError::NoPathLoaded => StatusCode::NoPathLoaded,
            ClientError::VelocityOutOfRange { .. } => StatusCode::InvalidArgument,
            ClientError::Config(_) => StatusCode::InvalidArgument,
        }
    }

    /// 把读超时类的 IO 错误归类为 `Timeout`
    pub(crate) fn from_read_error(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut => ClientError::Timeout,
            std::io::ErrorKind::InvalidData => ClientError::Protocol(ProtocolError::ParseError(
                "reply is not valid UTF-8".to_string(),
            )),
            _ => ClientError::Io(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_client_error_display() {
        let err = ClientError::Rejected {
            code: 2,
            message: Some("unknown view".to_string()),
        };
        assert_eq!(err.to_string(), "Rejected by server (code 2): unknown view");

        let err = ClientError::Rejected {
            code: 2,
            message: None,
        };
        assert_eq!(err.to_string(), "Rejected by server (code 2)");

        let err = ClientError::VelocityOutOfRange {
            value: 2.0,
            min: 0.001,
            max: 1.0,
        };
        assert!(err.to_string().contains("out of range"));

        assert_eq!(ClientError::NotConnected.to_string(), "Not connected");
    }

    #[test]
    fn test_status_code_mapping() {
        assert_eq!(ClientError::Timeout.status_code(), StatusCode::Timeout);
        assert_eq!(ClientError::NotConnected.status_code(), StatusCode::NotConnected);
        assert_eq!(ClientError::NoPathLoaded.status_code(), StatusCode::NoPathLoaded);
        assert_eq!(
            ClientError::InvalidArgument(ProtocolError::MultiLine).status_code(),
            StatusCode::InvalidArgument
        );
        assert_eq!(
            ClientError::Protocol(ProtocolError::MalformedReply("x".into())).status_code(),
            StatusCode::Protocol
        );
        assert_eq!(
            ClientError::Connect {
                addr: "127.0.0.1:1".into(),
                source: io::Error::from(io::ErrorKind::ConnectionRefused),
            }
            .status_code(),
            StatusCode::ConnectFailed
        );
    }

    #[test]
    fn test_from_read_error() {
        let err = ClientError::from_read_error(io::Error::from(io::ErrorKind::WouldBlock));
        assert!(matches!(err, ClientError::Timeout));

        let err = ClientError::from_read_error(io::Error::from(io::ErrorKind::TimedOut));
        assert!(matches!(err, ClientError::Timeout));

        let err = ClientError::from_read_error(io::Error::from(io::ErrorKind::InvalidData));
        assert!(matches!(err, ClientError::Protocol(_)));

        let err = ClientError::from_read_error(io::Error::from(io::ErrorKind::BrokenPipe));
        assert!(matches!(err, ClientError::Io(_)));
    }
}
