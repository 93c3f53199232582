//! # RobotCtl Protocol
//!
//! 采集平台机械臂控制服务器的文本协议定义（无网络依赖）
//!
//! ## 模块
//!
//! - `constants`: 协议常量（动词、行结束符）
//! - `command`: 请求行的编码与解析
//! - `reply`: 应答行的编码与解析
//! - `status`: 导出函数返回的整数状态码
//!
//! ## 帧格式
//!
//! 每条请求和应答都是一行 UTF-8 文本，以 `\n` 结尾。
//! 一次只允许一个未完成的请求：写一行，读一行。
//!
//! ```rust
//! use robotctl_protocol::{Command, Reply};
//!
//! let line = Command::GotoView("3".into()).encode().unwrap();
//! assert_eq!(line, "GOTOVIEW 3\n");
//!
//! let reply = Reply::parse("OK view 3").unwrap();
//! assert!(reply.is_ok());
//! ```

pub mod command;
pub mod constants;
pub mod reply;
pub mod status;

// 重新导出常用类型
pub use command::Command;
pub use constants::*;
pub use reply::Reply;
pub use status::StatusCode;

use thiserror::Error;

/// 协议编解码错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProtocolError {
    #[error("Empty argument for {verb}")]
    EmptyArgument { verb: &'static str },

    #[error("Argument contains a line break")]
    MultiLine,

    #[error("Invalid velocity: {0}")]
    InvalidVelocity(f32),

    #[error("Malformed reply: {0:?}")]
    MalformedReply(String),

    #[error("Invalid status code in reply: {0:?}")]
    InvalidStatus(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// 去掉行尾的 `\n` / `\r\n`
pub fn strip_line_ending(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

/// 检查参数中是否含有换行符
pub(crate) fn reject_line_breaks(s: &str) -> Result<(), ProtocolError> {
    if s.contains(['\n', '\r']) {
        return Err(ProtocolError::MultiLine);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_line_ending() {
        assert_eq!(strip_line_ending("OK\n"), "OK");
        assert_eq!(strip_line_ending("OK\r\n"), "OK");
        assert_eq!(strip_line_ending("OK"), "OK");
        // 只去掉一个行结束符
        assert_eq!(strip_line_ending("OK\n\n"), "OK\n");
    }

    #[test]
    fn test_reject_line_breaks() {
        assert!(reject_line_breaks("view 1").is_ok());
        assert_eq!(reject_line_breaks("a\nb"), Err(ProtocolError::MultiLine));
        assert_eq!(reject_line_breaks("a\rb"), Err(ProtocolError::MultiLine));
    }

    #[test]
    fn test_protocol_error_display() {
        let err = ProtocolError::EmptyArgument { verb: VERB_GOTO_VIEW };
        assert_eq!(err.to_string(), "Empty argument for GOTOVIEW");

        let err = ProtocolError::MalformedReply("HELLO".to_string());
        assert!(err.to_string().contains("HELLO"));
    }
}
