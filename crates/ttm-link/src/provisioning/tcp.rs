//! TCP provisioning link

use std::net::IpAddr;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

use super::{ProvisioningLink, MAX_REPLY_SIZE};
use crate::error::{ProvisionError, ProvisionResult};

/// Provisioning over a plain TCP connection
#[derive(Debug, Default)]
pub struct TcpProvisioningLink {
    stream: Option<TcpStream>,
}

impl TcpProvisioningLink {
    pub fn new() -> Self {
        Self::default()
    }

    fn stream(&mut self) -> Option<&mut TcpStream> {
        self.stream.as_mut()
    }
}

#[async_trait]
impl ProvisioningLink for TcpProvisioningLink {
    async fn connect(&mut self, host: IpAddr, port: u16) -> ProvisionResult<()> {
        let stream = TcpStream::connect((host, port))
            .await
            .map_err(|e| ProvisionError::ConnectFailed(e.to_string()))?;
        debug!(local = ?stream.local_addr().ok(), "Provisioning TCP connection open");
        self.stream = Some(stream);
        Ok(())
    }

    async fn send(&mut self, data: &[u8]) -> ProvisionResult<()> {
        let stream = self
            .stream()
            .ok_or_else(|| ProvisionError::SendFailed("not connected".into()))?;
        stream
            .write_all(data)
            .await
            .map_err(|e| ProvisionError::SendFailed(e.to_string()))
    }

    async fn receive(&mut self) -> ProvisionResult<Option<String>> {
        let stream = self
            .stream()
            .ok_or_else(|| ProvisionError::ReceiveFailed("not connected".into()))?;

        let mut buf = [0u8; MAX_REPLY_SIZE];
        let n = stream
            .read(&mut buf)
            .await
            .map_err(|e| ProvisionError::ReceiveFailed(e.to_string()))?;

        if n == 0 {
            return Ok(None);
        }
        Ok(Some(String::from_utf8_lossy(&buf[..n]).into_owned()))
    }

    async fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            let _ = stream.shutdown().await;
        }
    }
}
