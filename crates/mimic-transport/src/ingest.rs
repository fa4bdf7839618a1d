//! UDP pose ingestion
//!
//! A dedicated thread runs a single-threaded tokio runtime that receives
//! datagrams and pushes them onto a [`MessageQueue`]. The tick loop polls
//! the queue, at most one message per tick. Shutdown is cooperative: a
//! oneshot signal wakes the receive loop, which then drops the socket.
//!
//! The socket is registered with the runtime before [`PoseIngestor::bind`]
//! returns, so every setup failure is reported to the caller.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::thread::JoinHandle;

use tokio::net::UdpSocket;
use tokio::sync::oneshot;
use tracing::{debug, error, info, trace, warn};

use mimic_core::{MimicError, MimicResult};

use crate::{MessageQueue, MessageSource, OverflowPolicy, DEFAULT_QUEUE_CAPACITY};

/// Default UDP port trackers send to
pub const DEFAULT_POSE_PORT: u16 = 5056;

/// Largest datagram accepted
pub const MAX_DATAGRAM_SIZE: usize = 65535;

/// Smallest receive buffer; a full tracker frame fits comfortably
pub const MIN_RECV_BUFFER: usize = 2048;

/// Ingestor configuration
#[derive(Clone, Debug)]
pub struct IngestConfig {
    /// Address to listen on
    pub bind_addr: IpAddr,
    /// Port to listen on (0 picks an ephemeral port)
    pub port: u16,
    /// Pending message limit
    pub queue_capacity: usize,
    /// Behavior when the queue is full
    pub overflow: OverflowPolicy,
    /// Receive buffer size, raised to [`MIN_RECV_BUFFER`] if smaller.
    /// Datagrams that fill the whole buffer are treated as truncated and dropped.
    pub recv_buffer: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        IngestConfig {
            bind_addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_POSE_PORT,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            overflow: OverflowPolicy::DropOldest,
            recv_buffer: MAX_DATAGRAM_SIZE,
        }
    }
}

impl IngestConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }
}

struct Worker {
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

/// Receives pose messages in the background
pub struct PoseIngestor {
    queue: MessageQueue,
    local_addr: Option<SocketAddr>,
    bind_error: Option<String>,
    worker: Option<Worker>,
}

impl PoseIngestor {
    /// Bind the socket and start the receive thread
    pub fn bind(config: &IngestConfig) -> MimicResult<Self> {
        let addr = config.socket_addr();
        let socket = std::net::UdpSocket::bind(addr).map_err(|e| MimicError::BindFailed {
            addr: addr.to_string(),
            reason: e.to_string(),
        })?;
        socket.set_nonblocking(true)?;
        let local_addr = socket.local_addr()?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_io()
            .build()?;
        let socket = {
            let _entered = runtime.enter();
            UdpSocket::from_std(socket).map_err(|e| {
                MimicError::TransportError(format!("failed to register UDP socket: {}", e))
            })?
        };

        let queue = MessageQueue::new(config.queue_capacity, config.overflow);
        let loop_queue = queue.clone();
        let recv_buffer = config.recv_buffer.max(MIN_RECV_BUFFER);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let handle = std::thread::Builder::new()
            .name("mimic-ingest".into())
            .spawn(move || {
                runtime.block_on(receive_loop(socket, loop_queue, recv_buffer, shutdown_rx));
            })?;

        info!("listening for pose data on {}", local_addr);

        Ok(PoseIngestor {
            queue,
            local_addr: Some(local_addr),
            bind_error: None,
            worker: Some(Worker {
                shutdown: Some(shutdown_tx),
                handle,
            }),
        })
    }

    /// Start ingestion, disabling it instead of failing if the socket can't be set up
    pub fn start(config: &IngestConfig) -> Self {
        match Self::bind(config) {
            Ok(ingestor) => ingestor,
            Err(e) => {
                error!("UDP bind failed, running without pose updates: {}", e);
                Self::disabled(config, e)
            }
        }
    }

    fn disabled(config: &IngestConfig, err: MimicError) -> Self {
        PoseIngestor {
            queue: MessageQueue::new(config.queue_capacity, config.overflow),
            local_addr: None,
            bind_error: Some(err.to_string()),
            worker: None,
        }
    }

    /// Pop at most one pending message
    pub fn poll(&self) -> Option<String> {
        self.queue.pop()
    }

    /// Address actually bound (None when disabled)
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// Why the ingestor is disabled, if it is
    pub fn bind_error(&self) -> Option<&str> {
        self.bind_error.as_deref()
    }

    /// Whether the receive thread is running
    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    /// Shared queue handle
    pub fn queue(&self) -> &MessageQueue {
        &self.queue
    }

    /// Signal the receive loop and wait for its thread to exit
    pub fn stop(&mut self) {
        let Some(mut worker) = self.worker.take() else {
            return;
        };
        if let Some(tx) = worker.shutdown.take() {
            // The loop may already be gone; nothing to signal then
            let _ = tx.send(());
        }
        if worker.handle.join().is_err() {
            error!("pose receive thread panicked");
        }
        debug!("pose ingestor stopped");
    }
}

impl MessageSource for PoseIngestor {
    fn poll(&self) -> Option<String> {
        PoseIngestor::poll(self)
    }

    fn stop(&mut self) {
        PoseIngestor::stop(self)
    }
}

impl Drop for PoseIngestor {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn receive_loop(
    socket: UdpSocket,
    queue: MessageQueue,
    recv_buffer: usize,
    mut shutdown: oneshot::Receiver<()>,
) {
    let mut buf = vec![0u8; recv_buffer];
    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            result = socket.recv_from(&mut buf) => match result {
                Ok((len, from)) if len == buf.len() => {
                    warn!(%from, recv_buffer, "datagram filled the receive buffer, dropped as truncated");
                }
                Ok((len, from)) => match std::str::from_utf8(&buf[..len]) {
                    Ok(text) => {
                        if !queue.push(text.to_owned()) {
                            trace!(%from, "pose queue full, dropped datagram");
                        }
                    }
                    Err(e) => debug!(%from, "dropping non UTF-8 datagram: {}", e),
                },
                Err(e) => debug!("UDP receive error: {}", e),
            },
        }
    }
    // Socket closes here
}
