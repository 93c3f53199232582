//! 协议常量定义
//!
//! 集中定义动词和应答前缀，避免在代码中散落字符串字面量。

/// 移动到指定视角
pub const VERB_GOTO_VIEW: &str = "GOTOVIEW";

/// 加载运动路径
pub const VERB_LOAD_PATH: &str = "LOADPATH";

/// 执行已加载的路径
pub const VERB_EXECUTE_PATH: &str = "EXECUTEPATH";

/// 设置运动速度
pub const VERB_SET_VELOCITY: &str = "SETVELOCITY";

/// 成功应答前缀
pub const REPLY_OK: &str = "OK";

/// 失败应答前缀
pub const REPLY_ERR: &str = "ERR";

/// 行结束符
pub const LINE_END: char = '\n';

/// 单行最大长度（字节）
///
/// 超过此长度的应答视为协议错误，防止对端不发换行时无限读取。
pub const MAX_LINE_LEN: usize = 64 * 1024;

/// 默认服务器端口
pub const DEFAULT_PORT: u16 = 60000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbs_are_uppercase_single_words() {
        for verb in [
            VERB_GOTO_VIEW,
            VERB_LOAD_PATH,
            VERB_EXECUTE_PATH,
            VERB_SET_VELOCITY,
        ] {
            assert_eq!(verb, verb.to_ascii_uppercase());
            assert!(!verb.contains(' '));
        }
    }
}
