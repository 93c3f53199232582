//! # RobotCtl FFI
//!
//! 采集平台宿主程序使用的 C 接口，声明见 `include/RobotControl.h`。
//!
//! 所有函数返回 `int` 状态码：0 表示成功，负数见 [`StatusCode`]。
//! 进程内只有一个会话，所有调用串行执行。
//!
//! ```c
//! if (Clinet() != 0) { /* 连接失败 */ }
//! SetVelocity(0.3f);
//! GotoView("0");
//! LoadPath("paths/turntable.path");
//! ExecutePath();
//! ```
//!
//! # Safety
//!
//! `char *` 参数必须为 NULL 或指向以 NUL 结尾、在调用期间有效的字符串。
//! NULL 和非 UTF-8 字符串返回 `InvalidArgument`，不会触及会话。

mod exports;
mod session;

pub use exports::*;
pub use robotctl_protocol::StatusCode;
pub use session::{connect_with_config, disconnect, is_connected};

use std::ffi::{CStr, c_char, c_int};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Once;
use tracing::error;

static LOG_INIT: Once = Once::new();

/// 初始化日志（只执行一次）
///
/// 宿主进程可能已经安装了全局 subscriber，此时静默跳过。
pub(crate) fn init_logging() {
    LOG_INIT.call_once(|| {
        // 目标前缀匹配：覆盖 robotctl_client / robotctl_ffi
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("robotctl=info"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    });
}

/// 在 ABI 边界执行操作：捕获 panic，转换为 C 返回值
pub(crate) fn boundary<F>(name: &str, f: F) -> c_int
where
    F: FnOnce() -> StatusCode,
{
    init_logging();
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(code) => code.as_raw(),
        Err(_) => {
            error!("{} panicked", name);
            StatusCode::Internal.as_raw()
        },
    }
}

/// 把 C 字符串参数转换为 `&str`
///
/// # Safety
/// `ptr` 为 NULL 或指向调用期间有效的 NUL 结尾字符串。
pub(crate) unsafe fn c_str_arg<'a>(ptr: *const c_char) -> Result<&'a str, StatusCode> {
    if ptr.is_null() {
        return Err(StatusCode::InvalidArgument);
    }
    // SAFETY: 调用方保证非 NULL 指针指向有效的 NUL 结尾字符串
    let c_str = unsafe { CStr::from_ptr(ptr) };
    c_str.to_str().map_err(|_| StatusCode::InvalidArgument)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;

    #[test]
    fn test_c_str_arg() {
        let s = CString::new("view 1").unwrap();
        assert_eq!(unsafe { c_str_arg(s.as_ptr()) }, Ok("view 1"));
        assert_eq!(
            unsafe { c_str_arg(std::ptr::null()) },
            Err(StatusCode::InvalidArgument)
        );

        let bad = CString::new(vec![0xFF, 0xFE]).unwrap();
        assert_eq!(
            unsafe { c_str_arg(bad.as_ptr()) },
            Err(StatusCode::InvalidArgument)
        );
    }

    #[test]
    fn test_boundary_catches_panic() {
        let code = boundary("test", || panic!("boom"));
        assert_eq!(code, StatusCode::Internal.as_raw());
        assert_eq!(boundary("test", || StatusCode::Rejected), -6);
    }
}
