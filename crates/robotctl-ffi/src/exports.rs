//! 导出的 C 函数
//!
//! 函数名与 `include/RobotControl.h` 保持一致（包括 `Clinet` 的拼写）。

#![allow(non_snake_case)]

use crate::session::{connect_from_env, disconnect, with_session};
use crate::{StatusCode, boundary, c_str_arg};
use std::ffi::{c_char, c_float, c_int};

/// 建立（或重新建立）与控制服务器的连接
///
/// 配置来自 `ROBOTCTL_CONFIG` / `ROBOTCTL_HOST` / `ROBOTCTL_PORT`，
/// 未设置时读取默认配置文件。已有会话会被替换。
#[unsafe(no_mangle)]
pub extern "C" fn Clinet() -> c_int {
    boundary("Clinet", connect_from_env)
}

/// `Clinet` 的正确拼写别名
#[unsafe(no_mangle)]
pub extern "C" fn Client() -> c_int {
    boundary("Client", connect_from_env)
}

/// 关闭当前会话（没有会话时同样返回 0）
#[unsafe(no_mangle)]
pub extern "C" fn Disconnect() -> c_int {
    boundary("Disconnect", disconnect)
}

/// 发送原始命令行
///
/// # Safety
/// `command` 为 NULL 或指向有效的 NUL 结尾字符串。
#[unsafe(no_mangle)]
pub unsafe extern "C" fn SendCommand(command: *const c_char) -> c_int {
    boundary("SendCommand", || {
        // SAFETY: 由调用方保证
        match unsafe { c_str_arg(command) } {
            Ok(line) => with_session(|client| client.send_command(line)),
            Err(code) => code,
        }
    })
}

/// 移动到命名视角
///
/// # Safety
/// `view` 为 NULL 或指向有效的 NUL 结尾字符串。
#[unsafe(no_mangle)]
pub unsafe extern "C" fn GotoView(view: *const c_char) -> c_int {
    boundary("GotoView", || {
        // SAFETY: 由调用方保证
        match unsafe { c_str_arg(view) } {
            Ok(view) => with_session(|client| client.goto_view(view)),
            Err(code) => code,
        }
    })
}

/// 让服务器加载路径
///
/// # Safety
/// `path` 为 NULL 或指向有效的 NUL 结尾字符串。
#[unsafe(no_mangle)]
pub unsafe extern "C" fn LoadPath(path: *const c_char) -> c_int {
    boundary("LoadPath", || {
        // SAFETY: 由调用方保证
        match unsafe { c_str_arg(path) } {
            Ok(path) => with_session(|client| client.load_path(path)),
            Err(code) => code,
        }
    })
}

/// 执行已加载的路径
#[unsafe(no_mangle)]
pub extern "C" fn ExecutePath() -> c_int {
    boundary("ExecutePath", || with_session(|client| client.execute_path()))
}

/// 设置运动速度
#[unsafe(no_mangle)]
pub extern "C" fn SetVelocity(velocity: c_float) -> c_int {
    boundary("SetVelocity", || {
        with_session(|client| client.set_velocity(velocity))
    })
}
