//! C 接口与模拟服务器的集成测试
//!
//! 会话是进程级全局状态，所有测试串行执行。

use robotctl_client::ClientConfig;
use robotctl_ffi::*;
use robotctl_sim::{Fault, SimConfig, SimHandle, SimServer};
use serial_test::serial;
use std::ffi::CString;

fn start() -> SimHandle {
    let server = SimServer::spawn(SimConfig::ephemeral()).unwrap();
    let config = ClientConfig {
        port: server.addr().port(),
        read_timeout_ms: 500,
        ..ClientConfig::default()
    };
    assert_eq!(connect_with_config(config), StatusCode::Ok);
    server
}

fn c(s: &str) -> CString {
    CString::new(s).unwrap()
}

#[test]
#[serial]
fn test_full_capture_sequence() {
    let server = start();

    assert_eq!(SetVelocity(0.25), 0);
    assert_eq!(unsafe { GotoView(c("3").as_ptr()) }, 0);
    assert_eq!(unsafe { LoadPath(c("sweep").as_ptr()) }, 0);
    assert_eq!(ExecutePath(), 0);
    assert_eq!(unsafe { SendCommand(c("PING").as_ptr()) }, 0);

    let state = server.state();
    assert_eq!(state.velocity, Some(0.25));
    assert_eq!(state.executed, 1);
    assert_eq!(state.log.back().map(String::as_str), Some("PING"));

    assert_eq!(Disconnect(), 0);
    assert!(!is_connected());
}

#[test]
#[serial]
fn test_execute_before_load() {
    let server = start();

    assert_eq!(ExecutePath(), StatusCode::NoPathLoaded.as_raw());
    // 本地拒绝，不发送任何数据
    assert!(server.state().log.is_empty());
    assert!(is_connected());
    Disconnect();
}

#[test]
#[serial]
fn test_invalid_velocity_sends_nothing() {
    let server = start();

    for v in [f32::NAN, 0.0, -1.0, 10.0] {
        assert_eq!(SetVelocity(v), StatusCode::InvalidArgument.as_raw(), "velocity {v}");
    }
    assert!(server.state().log.is_empty());
    Disconnect();
}

#[test]
#[serial]
fn test_rejection_keeps_session() {
    let _server = start();

    assert_eq!(
        unsafe { GotoView(c("attic").as_ptr()) },
        StatusCode::Rejected.as_raw()
    );
    assert!(is_connected());
    assert_eq!(unsafe { GotoView(c("0").as_ptr()) }, 0);
    Disconnect();
}

#[test]
#[serial]
fn test_timeout_drops_session() {
    let server = start();

    server.inject(Fault::NoReply);
    assert_eq!(
        unsafe { GotoView(c("1").as_ptr()) },
        StatusCode::Timeout.as_raw()
    );
    assert!(!is_connected());
    assert_eq!(ExecutePath(), StatusCode::NotConnected.as_raw());
    assert_eq!(
        unsafe { SendCommand(c("PING").as_ptr()) },
        StatusCode::NotConnected.as_raw()
    );

    // 重新连接后恢复正常
    let config = ClientConfig {
        port: server.addr().port(),
        read_timeout_ms: 500,
        ..ClientConfig::default()
    };
    assert_eq!(connect_with_config(config), StatusCode::Ok);
    assert_eq!(unsafe { GotoView(c("2").as_ptr()) }, 0);
    assert_eq!(server.state().current_view.as_deref(), Some("2"));
    Disconnect();
}

#[test]
#[serial]
fn test_multi_line_argument_rejected() {
    let server = start();

    assert_eq!(
        unsafe { GotoView(c("1\nEXECUTEPATH").as_ptr()) },
        StatusCode::InvalidArgument.as_raw()
    );
    assert!(server.state().log.is_empty());
    assert!(is_connected());
    Disconnect();
}

#[test]
#[serial]
fn test_connect_failure() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let config = ClientConfig {
        port,
        connect_timeout_ms: 500,
        ..ClientConfig::default()
    };
    assert_eq!(connect_with_config(config), StatusCode::ConnectFailed);
    assert!(!is_connected());
}

#[test]
#[serial]
fn test_zero_timeout_is_invalid_argument() {
    let server = SimServer::spawn(SimConfig::ephemeral()).unwrap();

    let config = ClientConfig {
        port: server.addr().port(),
        read_timeout_ms: 0,
        ..ClientConfig::default()
    };
    assert_eq!(connect_with_config(config), StatusCode::InvalidArgument);
    assert!(!is_connected());
    assert_eq!(server.client_count(), 0);
}

#[test]
#[serial]
fn test_clinet_reads_environment() {
    let server = SimServer::spawn(SimConfig::ephemeral()).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.toml");
    std::fs::write(&config_path, "read_timeout_ms = 500\n").unwrap();

    // SAFETY: 测试串行执行，没有其他线程读写环境变量
    unsafe {
        std::env::set_var("ROBOTCTL_CONFIG", &config_path);
        std::env::set_var("ROBOTCTL_HOST", "127.0.0.1");
        std::env::set_var("ROBOTCTL_PORT", server.addr().port().to_string());
    }

    assert_eq!(Clinet(), 0);
    assert_eq!(unsafe { GotoView(c("2").as_ptr()) }, 0);

    // 重新连接替换旧会话
    assert_eq!(Client(), 0);
    assert_eq!(unsafe { GotoView(c("4").as_ptr()) }, 0);
    assert_eq!(server.state().current_view.as_deref(), Some("4"));

    unsafe {
        std::env::remove_var("ROBOTCTL_CONFIG");
        std::env::remove_var("ROBOTCTL_HOST");
        std::env::remove_var("ROBOTCTL_PORT");
    }
    Disconnect();
}
