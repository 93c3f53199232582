//! TCP 服务端
//!
//! 多线程阻塞架构：一个 accept 线程，每个客户端一个处理线程。
//! 停止标志通过 `AtomicBool` 共享，各线程用短超时轮询。

use crate::state::{Fault, SimConfig, SimState, respond};
use parking_lot::Mutex;
use robotctl_protocol::strip_line_ending;
use std::io::{self, BufRead, BufReader, Write};
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

/// 轮询间隔
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// 模拟服务器
pub struct SimServer;

impl SimServer {
    /// 绑定地址并在后台线程中运行
    pub fn spawn(config: SimConfig) -> io::Result<SimHandle> {
        let listener = TcpListener::bind(&config.listen)?;
        listener.set_nonblocking(true)?;
        let addr = listener.local_addr()?;

        let shared = Arc::new(Shared {
            config,
            state: Mutex::new(SimState::default()),
            stop: AtomicBool::new(false),
            clients: AtomicUsize::new(0),
        });

        let accept_shared = shared.clone();
        let accept = thread::Builder::new()
            .name("sim-accept".to_string())
            .spawn(move || accept_loop(listener, accept_shared))?;

        info!("Simulated robot server listening on {}", addr);
        Ok(SimHandle {
            addr,
            shared,
            accept: Some(accept),
        })
    }
}

struct Shared {
    config: SimConfig,
    state: Mutex<SimState>,
    stop: AtomicBool,
    clients: AtomicUsize,
}

/// 运行中的模拟服务器句柄
///
/// Drop 时自动停止。
pub struct SimHandle {
    addr: SocketAddr,
    shared: Arc<Shared>,
    accept: Option<thread::JoinHandle<()>>,
}

impl SimHandle {
    /// 实际监听地址
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// 状态快照
    pub fn state(&self) -> SimState {
        self.shared.state.lock().clone()
    }

    /// 当前客户端数
    pub fn client_count(&self) -> usize {
        self.shared.clients.load(Ordering::SeqCst)
    }

    /// 对下一条请求注入故障
    pub fn inject(&self, fault: Fault) {
        self.shared.state.lock().pending_fault = Some(fault);
    }

    /// 是否已停止
    pub fn is_stopped(&self) -> bool {
        self.shared.stop.load(Ordering::SeqCst)
    }

    /// 停止服务器（客户端线程在下一次轮询时退出）
    pub fn shutdown(&mut self) {
        self.shared.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.accept.take()
            && handle.join().is_err()
        {
            warn!("Accept thread panicked");
        }
    }
}

impl Drop for SimHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn accept_loop(listener: TcpListener, shared: Arc<Shared>) {
    while !shared.stop.load(Ordering::SeqCst) {
        match listener.accept() {
            Ok((stream, peer)) => {
                info!("Client connected: {}", peer);
                let client_shared = shared.clone();
                let spawned = thread::Builder::new()
                    .name(format!("sim-client-{}", peer))
                    .spawn(move || {
                        client_shared.clients.fetch_add(1, Ordering::SeqCst);
                        if let Err(e) = serve_client(stream, &client_shared) {
                            debug!("Client {} ended with error: {}", peer, e);
                        }
                        client_shared.clients.fetch_sub(1, Ordering::SeqCst);
                        info!("Client disconnected: {}", peer);
                    });
                if let Err(e) = spawned {
                    warn!("Failed to spawn client thread: {}", e);
                }
            },
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => thread::sleep(POLL_INTERVAL),
            Err(e) => {
                warn!("Accept failed: {}", e);
                thread::sleep(POLL_INTERVAL);
            },
        }
    }
    debug!("Accept loop stopped");
}

fn serve_client(stream: TcpStream, shared: &Shared) -> io::Result<()> {
    // accept 出来的 socket 可能继承非阻塞标志
    stream.set_nonblocking(false)?;
    stream.set_read_timeout(Some(POLL_INTERVAL))?;
    stream.set_nodelay(true)?;

    let mut writer = stream.try_clone()?;
    let mut reader = BufReader::new(stream);
    let mut buf = String::new();

    loop {
        if shared.stop.load(Ordering::SeqCst) {
            return Ok(());
        }

        // 超时返回时已读到的部分保留在 buf 中，下一轮继续追加
        match reader.read_line(&mut buf) {
            Ok(0) => return Ok(()),
            Ok(_) if !buf.ends_with('\n') => continue,
            Ok(_) => {},
            Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {
                continue;
            },
            Err(e) => return Err(e),
        }

        let line = strip_line_ending(&buf).to_string();
        buf.clear();
        debug!("<- {:?}", line);

        let (reply, delay, fault) = {
            let mut state = shared.state.lock();
            let fault = state.pending_fault.take();
            let (reply, delay) = respond(&shared.config, &mut state, &line);
            (reply, delay, fault)
        };

        match fault {
            Some(Fault::NoReply) => {
                info!("Fault injected: dropping reply to {:?}", line);
                continue;
            },
            Some(Fault::Garbage) => {
                info!("Fault injected: garbage reply to {:?}", line);
                writer.write_all(b"?!garbage\n")?;
                continue;
            },
            Some(Fault::Disconnect) => {
                info!("Fault injected: closing connection on {:?}", line);
                let _ = writer.shutdown(Shutdown::Both);
                return Ok(());
            },
            None => {},
        }

        if !delay.is_zero() {
            thread::sleep(delay);
        }

        let encoded = reply.encode();
        debug!("-> {:?}", encoded.trim_end());
        writer.write_all(encoded.as_bytes())?;
        writer.flush()?;
    }
}
