//! 整数状态码
//!
//! 导出的 C 函数统一返回 `int`：0 表示成功，负数表示失败原因。

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// 导出函数返回的状态码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(i32)]
pub enum StatusCode {
    /// 成功
    Ok = 0,
    /// 没有会话，需要先调用 `Clinet`
    NotConnected = -1,
    /// TCP 连接失败或超时
    ConnectFailed = -2,
    /// 参数无效（空指针、非 UTF-8、为空、多行、越界）
    InvalidArgument = -3,
    /// Socket 读写失败（会话被丢弃）
    Io = -4,
    /// 等待应答超时（会话被丢弃）
    Timeout = -5,
    /// 服务器返回 `ERR`
    Rejected = -6,
    /// 应答格式错误（会话被丢弃）
    Protocol = -7,
    /// 没有成功加载路径就执行
    NoPathLoaded = -8,
    /// 内部错误（边界处捕获的 panic 等）
    Internal = -9,
}

impl StatusCode {
    /// 转换为 C 返回值
    #[inline]
    pub fn as_raw(self) -> i32 {
        self.into()
    }

    /// 是否为成功
    #[inline]
    pub fn is_ok(self) -> bool {
        self == StatusCode::Ok
    }

    /// 是否意味着会话已不可用
    pub fn drops_session(self) -> bool {
        matches!(
            self,
            StatusCode::Io | StatusCode::Timeout | StatusCode::Protocol
        )
    }

    /// 简短描述
    pub fn description(self) -> &'static str {
        match self {
            StatusCode::Ok => "ok",
            StatusCode::NotConnected => "not connected",
            StatusCode::ConnectFailed => "connect failed",
            StatusCode::InvalidArgument => "invalid argument",
            StatusCode::Io => "I/O error",
            StatusCode::Timeout => "timeout",
            StatusCode::Rejected => "rejected by server",
            StatusCode::Protocol => "protocol error",
            StatusCode::NoPathLoaded => "no path loaded",
            StatusCode::Internal => "internal error",
        }
    }
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.description(), self.as_raw())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_values() {
        assert_eq!(StatusCode::Ok.as_raw(), 0);
        assert_eq!(StatusCode::NotConnected.as_raw(), -1);
        assert_eq!(StatusCode::NoPathLoaded.as_raw(), -8);
        assert_eq!(StatusCode::Internal.as_raw(), -9);
    }

    #[test]
    fn test_try_from_raw() {
        assert_eq!(StatusCode::try_from(-6).unwrap(), StatusCode::Rejected);
        assert!(StatusCode::try_from(1).is_err());
        assert!(StatusCode::try_from(-10).is_err());
    }

    #[test]
    fn test_only_ok_is_non_negative() {
        for raw in -9..=0 {
            let code = StatusCode::try_from(raw).unwrap();
            assert_eq!(code.is_ok(), raw == 0);
        }
    }

    #[test]
    fn test_drops_session() {
        assert!(StatusCode::Io.drops_session());
        assert!(StatusCode::Timeout.drops_session());
        assert!(StatusCode::Protocol.drops_session());
        assert!(!StatusCode::Rejected.drops_session());
        assert!(!StatusCode::InvalidArgument.drops_session());
    }

    #[test]
    fn test_display() {
        assert_eq!(StatusCode::Timeout.to_string(), "timeout (-5)");
    }
}
