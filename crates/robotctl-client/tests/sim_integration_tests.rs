//! 客户端与模拟服务器的集成测试

use robotctl_client::{ClientConfig, ClientError, RobotClient, RobotClientBuilder, TcpTransport};
use robotctl_sim::{ERR_UNKNOWN_VIEW, Fault, SimConfig, SimHandle, SimServer};
use std::time::Duration;

fn start() -> (SimHandle, RobotClient<TcpTransport>) {
    start_with(SimConfig::ephemeral())
}

fn start_with(config: SimConfig) -> (SimHandle, RobotClient<TcpTransport>) {
    let server = SimServer::spawn(config).unwrap();
    let client = RobotClientBuilder::new()
        .host("127.0.0.1")
        .port(server.addr().port())
        .read_timeout(Duration::from_millis(500))
        .connect()
        .unwrap();
    (server, client)
}

#[test]
fn test_capture_session() {
    let (server, mut client) = start();

    client.set_velocity(0.4).unwrap();
    for view in ["0", "1", "2"] {
        client.goto_view(view).unwrap();
    }
    client.load_path("turntable").unwrap();
    let payload = client.execute_path().unwrap();
    assert_eq!(payload.as_deref(), Some("executed turntable"));

    let state = server.state();
    assert_eq!(state.velocity, Some(0.4));
    assert_eq!(state.executed, 1);
    assert_eq!(
        state.log,
        [
            "SETVELOCITY 0.4",
            "GOTOVIEW 0",
            "GOTOVIEW 1",
            "GOTOVIEW 2",
            "LOADPATH turntable",
            "EXECUTEPATH",
        ]
    );
    assert_eq!(client.peer(), Some(server.addr()));
}

#[test]
fn test_rejection_keeps_session() {
    let (_server, mut client) = start();

    let err = client.goto_view("nowhere").unwrap_err();
    match err {
        ClientError::Rejected { code, message } => {
            assert_eq!(code, ERR_UNKNOWN_VIEW);
            assert_eq!(message.as_deref(), Some("unknown view"));
        },
        other => panic!("expected Rejected, got {:?}", other),
    }

    assert!(client.is_usable());
    client.goto_view("5").unwrap();
}

#[test]
fn test_raw_command() {
    let (_server, mut client) = start();
    assert_eq!(client.send_command("PING").unwrap().as_deref(), Some("pong"));
}

#[test]
fn test_no_reply_times_out() {
    let (server, mut client) = start();

    server.inject(Fault::NoReply);
    assert!(matches!(client.goto_view("1"), Err(ClientError::Timeout)));
    assert!(matches!(client.goto_view("1"), Err(ClientError::NotConnected)));
}

#[test]
fn test_garbage_reply_is_protocol_error() {
    let (server, mut client) = start();

    server.inject(Fault::Garbage);
    assert!(matches!(client.goto_view("1"), Err(ClientError::Protocol(_))));
    assert!(!client.is_usable());
}

#[test]
fn test_server_disconnect_is_io_error() {
    let (server, mut client) = start();

    server.inject(Fault::Disconnect);
    assert!(matches!(client.goto_view("1"), Err(ClientError::Io(_))));
    assert!(matches!(client.execute_path(), Err(ClientError::NotConnected)));
}

#[test]
fn test_server_velocity_limit() {
    let config = SimConfig {
        max_velocity: 0.5,
        ..SimConfig::ephemeral()
    };
    let (_server, mut client) = start_with(config);

    // 客户端限制为 1.0，服务器限制为 0.5
    assert!(matches!(
        client.set_velocity(0.8),
        Err(ClientError::Rejected { .. })
    ));
    assert_eq!(client.velocity(), None);
}

#[test]
fn test_connect_with_config() {
    let server = SimServer::spawn(SimConfig::ephemeral()).unwrap();
    let config = ClientConfig {
        port: server.addr().port(),
        ..ClientConfig::default()
    };

    let mut client = RobotClient::builder().config(config).connect().unwrap();
    client.goto_view("0").unwrap();
}
