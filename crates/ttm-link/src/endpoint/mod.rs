//! UDP endpoints
//!
//! An endpoint owns one socket and two tasks:
//!
//! ```text
//!            ┌──────────────── Endpoint ────────────────┐
//!  socket ──►│ receive task ── WireFormat::ingest ──────┼──► peer queue
//!            │                                          │
//!  socket ◄──┼── WireFormat::egress ── stamp ── transmit│◄── inbox queue
//!            └──────────────────────────────────────────┘
//! ```
//!
//! Endpoints know nothing about each other; they only share queues.

mod wire;

pub use wire::{MabxWire, TtmWire, WireFormat};

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tokio::net::UdpSocket;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use ttm_core::RelayQueue;

use crate::error::LinkResult;
use crate::shutdown::Shutdown;
use crate::socket::bind_udp;

/// Largest datagram the receive task accepts
pub const RECV_BUFFER_SIZE: usize = 65536;

/// Socket and routing parameters for one endpoint
#[derive(Debug, Clone)]
pub struct EndpointConfig {
    /// Name used in logs ("mabx", "ttm")
    pub name: &'static str,
    /// Local port to listen on, 0 for ephemeral
    pub rx_port: u16,
    /// Where transmitted datagrams go
    pub destination: SocketAddr,
}

/// Per-endpoint traffic counters
#[derive(Debug, Default)]
pub struct EndpointStats {
    received: AtomicU64,
    forwarded: AtomicU64,
    rejected: AtomicU64,
    transmitted: AtomicU64,
    skipped: AtomicU64,
    send_errors: AtomicU64,
}

/// Point-in-time copy of [`EndpointStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Datagrams read from the socket
    pub received: u64,
    /// Datagrams converted and pushed to the peer queue
    pub forwarded: u64,
    /// Datagrams dropped because they failed conversion
    pub rejected: u64,
    /// Records sent to the destination
    pub transmitted: u64,
    /// Records with no outgoing form, or failing conversion
    pub skipped: u64,
    pub send_errors: u64,
}

impl EndpointStats {
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            received: self.received.load(Ordering::Relaxed),
            forwarded: self.forwarded.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            transmitted: self.transmitted.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            send_errors: self.send_errors.load(Ordering::Relaxed),
        }
    }

    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// A bound endpoint, ready to spawn
pub struct Endpoint<W: WireFormat> {
    name: &'static str,
    socket: Arc<UdpSocket>,
    destination: SocketAddr,
    wire: Arc<W>,
    /// Records this endpoint transmits
    inbox: Arc<RelayQueue>,
    /// Where received records go
    peer: Arc<RelayQueue>,
    stats: Arc<EndpointStats>,
}

impl<W: WireFormat> Endpoint<W> {
    /// Bind the receive socket; failure here is fatal for the gateway
    pub fn bind(
        config: EndpointConfig,
        wire: W,
        inbox: Arc<RelayQueue>,
        peer: Arc<RelayQueue>,
    ) -> LinkResult<Self> {
        let socket = bind_udp(config.rx_port)?;
        let local = socket.local_addr()?;
        info!(
            endpoint = config.name,
            %local,
            destination = %config.destination,
            "Endpoint bound"
        );

        Ok(Self {
            name: config.name,
            socket: Arc::new(socket),
            destination: config.destination,
            wire: Arc::new(wire),
            inbox,
            peer,
            stats: Arc::new(EndpointStats::default()),
        })
    }

    pub fn local_addr(&self) -> LinkResult<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    /// Start the receive and transmit tasks
    pub fn spawn(self, shutdown: Shutdown) -> LinkResult<EndpointHandle> {
        let local_addr = self.local_addr()?;

        let rx = tokio::spawn(receive_loop(
            self.name,
            self.socket.clone(),
            self.wire.clone(),
            self.peer,
            self.stats.clone(),
            shutdown.clone(),
        ));

        let tx = tokio::spawn(transmit_loop(
            self.name,
            self.socket,
            self.destination,
            self.wire,
            self.inbox,
            self.stats.clone(),
            shutdown,
        ));

        Ok(EndpointHandle {
            name: self.name,
            local_addr,
            stats: self.stats,
            rx,
            tx,
        })
    }
}

/// Running endpoint
pub struct EndpointHandle {
    name: &'static str,
    local_addr: SocketAddr,
    stats: Arc<EndpointStats>,
    rx: JoinHandle<()>,
    tx: JoinHandle<()>,
}

impl EndpointHandle {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Wait for both tasks after shutdown was triggered
    ///
    /// Returns false if either task missed the deadline; it is aborted.
    pub async fn join(self, timeout: Duration) -> bool {
        let mut clean = true;
        for (task, handle) in [("receive", self.rx), ("transmit", self.tx)] {
            let abort = handle.abort_handle();
            if tokio::time::timeout(timeout, handle).await.is_err() {
                warn!(endpoint = self.name, task, "Task did not stop in time, aborting");
                abort.abort();
                clean = false;
            }
        }
        clean
    }
}

async fn receive_loop<W: WireFormat>(
    name: &'static str,
    socket: Arc<UdpSocket>,
    wire: Arc<W>,
    peer: Arc<RelayQueue>,
    stats: Arc<EndpointStats>,
    mut shutdown: Shutdown,
) {
    let mut buf = vec![0u8; RECV_BUFFER_SIZE];

    loop {
        let result = tokio::select! {
            _ = shutdown.wait() => break,
            result = socket.recv_from(&mut buf) => result,
        };

        match result {
            Ok((0, _)) => continue,
            Ok((len, from)) => {
                EndpointStats::bump(&stats.received);
                match wire.ingest(&buf[..len]) {
                    Ok(record) => {
                        debug!(endpoint = name, %from, stream = record.stream_number(), "Received record");
                        EndpointStats::bump(&stats.forwarded);
                        peer.push(record);
                    }
                    Err(e) => {
                        EndpointStats::bump(&stats.rejected);
                        warn!(endpoint = name, %from, len, error = %e, "Dropping datagram");
                    }
                }
            }
            Err(e) => {
                warn!(endpoint = name, error = %e, "Receive failed");
            }
        }
    }

    debug!(endpoint = name, "Receive task stopped");
}

async fn transmit_loop<W: WireFormat>(
    name: &'static str,
    socket: Arc<UdpSocket>,
    destination: SocketAddr,
    wire: Arc<W>,
    inbox: Arc<RelayQueue>,
    stats: Arc<EndpointStats>,
    mut shutdown: Shutdown,
) {
    let mut counter: u32 = 0;

    loop {
        let mut record = tokio::select! {
            _ = shutdown.wait() => break,
            record = inbox.pop() => record,
        };

        record.stamp(counter, epoch_ms());

        let datagram = match wire.egress(&record) {
            Ok(Some(datagram)) => datagram,
            Ok(None) => {
                EndpointStats::bump(&stats.skipped);
                continue;
            }
            Err(e) => {
                EndpointStats::bump(&stats.skipped);
                warn!(endpoint = name, stream = record.stream_number(), error = %e, "Cannot encode record");
                continue;
            }
        };

        match socket.send_to(&datagram, destination).await {
            Ok(_) => {
                debug!(endpoint = name, stream = record.stream_number(), counter, "Sent record");
                EndpointStats::bump(&stats.transmitted);
                counter = counter.wrapping_add(1);
            }
            Err(e) => {
                EndpointStats::bump(&stats.send_errors);
                error!(endpoint = name, %destination, error = %e, "Send failed");
            }
        }
    }

    debug!(endpoint = name, "Transmit task stopped");
}

/// Wall-clock milliseconds since the epoch, truncated to the header's 32 bits
fn epoch_ms() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u32)
        .unwrap_or(0)
}
