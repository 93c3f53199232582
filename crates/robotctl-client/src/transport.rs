//! 传输层抽象
//!
//! `Transport` 只负责按行收发；请求/应答的语义在 [`RobotClient`](crate::RobotClient) 中处理。
//! 测试可以实现自己的 `Transport`，不需要真实 socket。

use crate::config::ClientConfig;
use crate::error::ClientError;
use robotctl_protocol::{LINE_END, MAX_LINE_LEN, ProtocolError};
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use tracing::{debug, trace};

/// 行传输接口
pub trait Transport: Send {
    /// 发送一行（调用方负责结尾的 `\n`）
    fn send_line(&mut self, line: &str) -> Result<(), ClientError>;

    /// 接收一行（返回值不含行结束符）
    fn recv_line(&mut self) -> Result<String, ClientError>;

    /// 对端地址（如果有）
    fn peer(&self) -> Option<SocketAddr> {
        None
    }
}

/// TCP 传输
#[derive(Debug)]
pub struct TcpTransport {
    reader: BufReader<TcpStream>,
    writer: TcpStream,
    peer: SocketAddr,
}

impl TcpTransport {
    /// 按配置连接服务器
    ///
    /// 会依次尝试主机名解析出的每个地址，直到有一个连接成功。
    pub fn connect(config: &ClientConfig) -> Result<Self, ClientError> {
        let addr = config.addr();
        let candidates: Vec<SocketAddr> = (config.host.as_str(), config.port)
            .to_socket_addrs()
            .map_err(|source| ClientError::Connect {
                addr: addr.clone(),
                source,
            })?
            .collect();

        let mut last_err = std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "host resolved to no addresses",
        );

        for candidate in candidates {
            debug!("Connecting to {} (timeout {:?})", candidate, config.connect_timeout());
            match TcpStream::connect_timeout(&candidate, config.connect_timeout()) {
                Ok(stream) => return Self::from_stream(stream, config),
                Err(e) => {
                    debug!("Connect to {} failed: {}", candidate, e);
                    last_err = e;
                },
            }
        }

        Err(ClientError::Connect {
            addr,
            source: last_err,
        })
    }

    /// 包装已建立的连接
    pub fn from_stream(stream: TcpStream, config: &ClientConfig) -> Result<Self, ClientError> {
        stream.set_nodelay(true)?;
        stream.set_read_timeout(Some(config.read_timeout()))?;
        stream.set_write_timeout(Some(config.write_timeout()))?;

        let peer = stream.peer_addr()?;
        let writer = stream.try_clone()?;

        Ok(Self {
            reader: BufReader::new(stream),
            writer,
            peer,
        })
    }
}

impl Transport for TcpTransport {
    fn send_line(&mut self, line: &str) -> Result<(), ClientError> {
        trace!("-> {:?}", line);
        self.writer.write_all(line.as_bytes())?;
        self.writer.flush()?;
        Ok(())
    }

    fn recv_line(&mut self) -> Result<String, ClientError> {
        read_bounded_line(&mut self.reader)
    }

    fn peer(&self) -> Option<SocketAddr> {
        Some(self.peer)
    }
}

/// 读取一行，长度受 `MAX_LINE_LEN` 限制
///
/// - 连接关闭返回 `Io(UnexpectedEof)`
/// - 超长行返回 `Protocol`
pub fn read_bounded_line<R: BufRead>(reader: &mut R) -> Result<String, ClientError> {
    let mut line = String::new();
    let n = reader
        .by_ref()
        .take(MAX_LINE_LEN as u64)
        .read_line(&mut line)
        .map_err(ClientError::from_read_error)?;

    if n == 0 {
        return Err(ClientError::Io(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "connection closed by server",
        )));
    }

    if !line.ends_with(LINE_END) {
        if n >= MAX_LINE_LEN {
            return Err(ClientError::Protocol(ProtocolError::MalformedReply(format!(
                "line longer than {} bytes",
                MAX_LINE_LEN
            ))));
        }
        // 对端在行中途关闭
        return Err(ClientError::Io(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "connection closed mid-line",
        )));
    }

    let line = robotctl_protocol::strip_line_ending(&line).to_string();
    trace!("<- {:?}", line);
    Ok(line)
}
