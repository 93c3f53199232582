//! 服务器应答
//!
//! `OK [payload]` 或 `ERR <code> [message]`。

use crate::constants::*;
use crate::{ProtocolError, strip_line_ending};

/// 控制服务器应答
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Reply {
    /// 成功，可带附加信息
    Ok(Option<String>),
    /// 失败，`code` 为服务器定义的错误码
    Err { code: i32, message: Option<String> },
}

impl Reply {
    /// 无附加信息的成功应答
    pub fn ok() -> Self {
        Reply::Ok(None)
    }

    /// 带附加信息的成功应答
    pub fn ok_with(payload: impl Into<String>) -> Self {
        Reply::Ok(Some(payload.into()))
    }

    /// 失败应答
    pub fn err(code: i32, message: impl Into<String>) -> Self {
        Reply::Err {
            code,
            message: Some(message.into()),
        }
    }

    /// 是否为成功应答
    pub fn is_ok(&self) -> bool {
        matches!(self, Reply::Ok(_))
    }

    /// 成功应答的附加信息
    pub fn payload(&self) -> Option<&str> {
        match self {
            Reply::Ok(payload) => payload.as_deref(),
            Reply::Err { .. } => None,
        }
    }

    /// 解析应答行
    ///
    /// 行尾的 `\n` / `\r\n` 会被忽略，前缀区分大小写。
    pub fn parse(line: &str) -> Result<Self, ProtocolError> {
        let line = strip_line_ending(line);
        let (head, rest) = match line.split_once(' ') {
            Some((head, rest)) => (head, Some(rest.trim()).filter(|r| !r.is_empty())),
            None => (line, None),
        };

        match head {
            REPLY_OK => Ok(Reply::Ok(rest.map(str::to_string))),
            REPLY_ERR => {
                let rest = rest.ok_or_else(|| ProtocolError::InvalidStatus(String::new()))?;
                let (code, message) = match rest.split_once(' ') {
                    Some((code, message)) => (code, Some(message.trim()).filter(|m| !m.is_empty())),
                    None => (rest, None),
                };
                let code = code
                    .parse::<i32>()
                    .map_err(|_| ProtocolError::InvalidStatus(code.to_string()))?;
                Ok(Reply::Err {
                    code,
                    message: message.map(str::to_string),
                })
            },
            _ => Err(ProtocolError::MalformedReply(line.to_string())),
        }
    }

    /// 编码为应答行（包含结尾的 `\n`）
    ///
    /// 附加信息中的换行符会被替换为空格，保证一条应答只占一行。
    pub fn encode(&self) -> String {
        let mut line = match self {
            Reply::Ok(None) => REPLY_OK.to_string(),
            Reply::Ok(Some(payload)) => format!("{} {}", REPLY_OK, single_line(payload)),
            Reply::Err { code, message: None } => format!("{} {}", REPLY_ERR, code),
            Reply::Err {
                code,
                message: Some(message),
            } => format!("{} {} {}", REPLY_ERR, code, single_line(message)),
        };
        line.push(LINE_END);
        line
    }
}

fn single_line(s: &str) -> String {
    s.replace(['\n', '\r'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_ok() {
        assert_eq!(Reply::parse("OK\n").unwrap(), Reply::Ok(None));
        assert_eq!(Reply::parse("OK \r\n").unwrap(), Reply::Ok(None));
        assert_eq!(
            Reply::parse("OK view 3").unwrap(),
            Reply::ok_with("view 3")
        );
    }

    #[test]
    fn test_parse_err() {
        assert_eq!(
            Reply::parse("ERR 2 unknown view\n").unwrap(),
            Reply::err(2, "unknown view")
        );
        assert_eq!(
            Reply::parse("ERR -17").unwrap(),
            Reply::Err {
                code: -17,
                message: None
            }
        );
    }

    #[test]
    fn test_parse_malformed() {
        assert!(matches!(
            Reply::parse("HELLO"),
            Err(ProtocolError::MalformedReply(_))
        ));
        assert!(matches!(Reply::parse(""), Err(ProtocolError::MalformedReply(_))));
        assert!(matches!(Reply::parse("ok"), Err(ProtocolError::MalformedReply(_))));
        assert!(matches!(Reply::parse("ERR"), Err(ProtocolError::InvalidStatus(_))));
        assert!(matches!(
            Reply::parse("ERR x oops"),
            Err(ProtocolError::InvalidStatus(_))
        ));
    }

    #[test]
    fn test_encode_flattens_line_breaks() {
        assert_eq!(Reply::ok().encode(), "OK\n");
        assert_eq!(Reply::err(3, "bad\npath").encode(), "ERR 3 bad path\n");
    }

    #[test]
    fn test_payload() {
        assert_eq!(Reply::ok_with("x").payload(), Some("x"));
        assert_eq!(Reply::err(1, "x").payload(), None);
        assert!(!Reply::err(1, "x").is_ok());
    }

    proptest! {
        #[test]
        fn parse_never_panics(line in ".*") {
            let _ = Reply::parse(&line);
        }

        #[test]
        fn err_code_survives_encoding(code in any::<i32>(), msg in "[a-z ]{0,20}") {
            let parsed = Reply::parse(&Reply::err(code, msg).encode()).unwrap();
            match parsed {
                Reply::Err { code: c, .. } => prop_assert_eq!(c, code),
                Reply::Ok(_) => prop_assert!(false, "expected ERR"),
            }
        }
    }
}
