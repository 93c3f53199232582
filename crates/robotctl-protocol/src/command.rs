//! 请求命令
//!
//! 客户端发往控制服务器的请求行，以及服务器端（模拟器）对请求行的解析。

use crate::constants::*;
use crate::{ProtocolError, reject_line_breaks, strip_line_ending};

/// 控制服务器请求
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Command {
    /// 原样发送的命令行
    Raw(String),
    /// 移动到命名视角
    GotoView(String),
    /// 加载路径（服务器端的路径名或文件路径）
    LoadPath(String),
    /// 执行已加载的路径
    ExecutePath,
    /// 设置运动速度
    SetVelocity(f32),
}

impl Command {
    /// 命令动词（`Raw` 返回其第一个单词）
    pub fn verb(&self) -> &str {
        match self {
            Command::Raw(line) => line.split_whitespace().next().unwrap_or(""),
            Command::GotoView(_) => VERB_GOTO_VIEW,
            Command::LoadPath(_) => VERB_LOAD_PATH,
            Command::ExecutePath => VERB_EXECUTE_PATH,
            Command::SetVelocity(_) => VERB_SET_VELOCITY,
        }
    }

    /// 编码为请求行（包含结尾的 `\n`）
    ///
    /// # 错误
    /// - 参数为空或只有空白
    /// - 参数中含有换行符（不做转义，直接拒绝）
    /// - 速度不是有限正数
    pub fn encode(&self) -> Result<String, ProtocolError> {
        let mut line = match self {
            Command::Raw(raw) => {
                reject_line_breaks(raw)?;
                if raw.trim().is_empty() {
                    return Err(ProtocolError::EmptyArgument { verb: "raw command" });
                }
                raw.clone()
            },
            Command::GotoView(view) => format!("{} {}", VERB_GOTO_VIEW, argument(VERB_GOTO_VIEW, view)?),
            Command::LoadPath(path) => format!("{} {}", VERB_LOAD_PATH, argument(VERB_LOAD_PATH, path)?),
            Command::ExecutePath => VERB_EXECUTE_PATH.to_string(),
            Command::SetVelocity(v) => {
                validate_velocity(*v)?;
                format!("{} {}", VERB_SET_VELOCITY, v)
            },
        };
        line.push(LINE_END);
        Ok(line)
    }

    /// 解析请求行
    ///
    /// 动词不区分大小写；未知动词解析为 `Raw`。
    pub fn parse(line: &str) -> Result<Self, ProtocolError> {
        let line = strip_line_ending(line).trim();
        if line.is_empty() {
            return Err(ProtocolError::EmptyArgument { verb: "raw command" });
        }

        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        match verb.to_ascii_uppercase().as_str() {
            VERB_GOTO_VIEW => Ok(Command::GotoView(argument(VERB_GOTO_VIEW, rest)?.to_string())),
            VERB_LOAD_PATH => Ok(Command::LoadPath(argument(VERB_LOAD_PATH, rest)?.to_string())),
            VERB_EXECUTE_PATH => {
                if !rest.is_empty() {
                    return Err(ProtocolError::ParseError(format!(
                        "{} takes no argument, got {:?}",
                        VERB_EXECUTE_PATH, rest
                    )));
                }
                Ok(Command::ExecutePath)
            },
            VERB_SET_VELOCITY => {
                let raw = argument(VERB_SET_VELOCITY, rest)?;
                let v: f32 = raw
                    .parse()
                    .map_err(|_| ProtocolError::ParseError(format!("invalid velocity {:?}", raw)))?;
                validate_velocity(v)?;
                Ok(Command::SetVelocity(v))
            },
            _ => Ok(Command::Raw(line.to_string())),
        }
    }
}

/// 校验并裁剪参数
fn argument<'a>(verb: &'static str, arg: &'a str) -> Result<&'a str, ProtocolError> {
    reject_line_breaks(arg)?;
    let arg = arg.trim();
    if arg.is_empty() {
        return Err(ProtocolError::EmptyArgument { verb });
    }
    Ok(arg)
}

/// 速度必须是有限正数
pub fn validate_velocity(v: f32) -> Result<(), ProtocolError> {
    if !v.is_finite() || v <= 0.0 {
        return Err(ProtocolError::InvalidVelocity(v));
    }
    Ok(())
}
