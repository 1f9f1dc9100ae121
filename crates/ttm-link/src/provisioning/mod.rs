//! TTM port provisioning
//!
//! Before any UDP traffic the gateway asks the TTM backend which port to use:
//! connect over TCP, send the vehicle id, read back an ASCII decimal port.
//! The connection is closed on every exit path.

mod mock;
mod tcp;

pub use mock::ScriptedLink;
pub use tcp::TcpProvisioningLink;

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::error::{ProvisionError, ProvisionResult};
use crate::shutdown::Shutdown;

/// Delay between connection attempts and between empty reads
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Largest port reply accepted from the server
pub const MAX_REPLY_SIZE: usize = 32;

/// One provisioning connection
#[async_trait]
pub trait ProvisioningLink: Send {
    async fn connect(&mut self, host: IpAddr, port: u16) -> ProvisionResult<()>;

    async fn send(&mut self, data: &[u8]) -> ProvisionResult<()>;

    /// Read up to [`MAX_REPLY_SIZE`] bytes; `None` when nothing was available
    async fn receive(&mut self) -> ProvisionResult<Option<String>>;

    /// Release the connection; safe to call when not connected
    async fn close(&mut self);
}

/// Run the provisioning handshake and return the port the backend assigned
pub async fn provision<L: ProvisioningLink + ?Sized>(
    link: &mut L,
    server: SocketAddr,
    vehicle_id: &str,
    shutdown: &mut Shutdown,
) -> ProvisionResult<u16> {
    let result = handshake(link, server, vehicle_id, shutdown).await;
    link.close().await;
    debug!("Provisioning connection closed");
    result
}

async fn handshake<L: ProvisioningLink + ?Sized>(
    link: &mut L,
    server: SocketAddr,
    vehicle_id: &str,
    shutdown: &mut Shutdown,
) -> ProvisionResult<u16> {
    let mut attempts: u64 = 0;
    loop {
        let result = tokio::select! {
            _ = shutdown.wait() => return Err(ProvisionError::Cancelled),
            result = link.connect(server.ip(), server.port()) => result,
        };
        attempts += 1;

        match result {
            Ok(()) => break,
            Err(e) if attempts == 1 => {
                warn!(%server, error = %e, "Provisioning server not reachable, retrying");
            }
            Err(e) => debug!(%server, attempts, error = %e, "Connect retry failed"),
        }

        pause(shutdown).await?;
    }
    info!(%server, attempts, "Connected to provisioning server");

    link.send(vehicle_id.as_bytes()).await?;
    info!(vehicle_id, "Sent vehicle id");

    // Empty or failed reads mean the port is not ready yet
    let mut empty_reads: u64 = 0;
    loop {
        let reply = tokio::select! {
            _ = shutdown.wait() => return Err(ProvisionError::Cancelled),
            reply = link.receive() => reply,
        };

        match reply {
            Ok(Some(text)) if !trim_reply(&text).is_empty() => {
                let port = parse_port(&text)?;
                info!(port, "Received TTM port");
                return Ok(port);
            }
            Ok(_) => debug!(empty_reads, "No port reply yet"),
            Err(e) => debug!(empty_reads, error = %e, "Port read failed, retrying"),
        }

        if empty_reads == 0 {
            info!("Waiting to receive port number for UDP connection");
        }
        empty_reads += 1;
        pause(shutdown).await?;
    }
}

async fn pause(shutdown: &mut Shutdown) -> ProvisionResult<()> {
    tokio::select! {
        _ = shutdown.wait() => Err(ProvisionError::Cancelled),
        _ = tokio::time::sleep(POLL_INTERVAL) => Ok(()),
    }
}

fn trim_reply(text: &str) -> &str {
    text.trim_matches(|c: char| c.is_whitespace() || c == '\0')
}

/// Parse the server's port reply, ignoring surrounding whitespace and NULs
pub fn parse_port(text: &str) -> ProvisionResult<u16> {
    match trim_reply(text).parse::<u16>() {
        Ok(port) if port != 0 => Ok(port),
        _ => Err(ProvisionError::InvalidPort(text.to_string())),
    }
}
