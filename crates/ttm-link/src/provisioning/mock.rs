//! Scripted provisioning link for testing

use std::collections::VecDeque;
use std::net::IpAddr;

use async_trait::async_trait;

use super::ProvisioningLink;
use crate::error::{ProvisionError, ProvisionResult};

/// Provisioning link that plays back a fixed script
///
/// Once the scripted replies run out, `receive` keeps returning `None`.
#[derive(Debug, Default)]
pub struct ScriptedLink {
    connect_failures: usize,
    receive_failures: usize,
    fail_send: bool,
    replies: VecDeque<Option<String>>,
    connected: bool,
    connects: usize,
    receives: usize,
    closes: usize,
    sent: Vec<Vec<u8>>,
}

impl ScriptedLink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the first `n` connection attempts
    pub fn failing_connects(mut self, n: usize) -> Self {
        self.connect_failures = n;
        self
    }

    /// Fail the first `n` reads after connecting
    pub fn failing_receives(mut self, n: usize) -> Self {
        self.receive_failures = n;
        self
    }

    pub fn failing_send(mut self) -> Self {
        self.fail_send = true;
        self
    }

    /// Queue the next `receive` result
    pub fn reply(mut self, reply: Option<&str>) -> Self {
        self.replies.push_back(reply.map(str::to_string));
        self
    }

    pub fn connect_count(&self) -> usize {
        self.connects
    }

    pub fn receive_count(&self) -> usize {
        self.receives
    }

    pub fn close_count(&self) -> usize {
        self.closes
    }

    pub fn sent(&self) -> &[Vec<u8>] {
        &self.sent
    }
}

#[async_trait]
impl ProvisioningLink for ScriptedLink {
    async fn connect(&mut self, host: IpAddr, port: u16) -> ProvisionResult<()> {
        self.connects += 1;
        if self.connect_failures > 0 {
            self.connect_failures -= 1;
            return Err(ProvisionError::ConnectFailed(format!(
                "{}:{} refused (scripted)",
                host, port
            )));
        }
        self.connected = true;
        Ok(())
    }

    async fn send(&mut self, data: &[u8]) -> ProvisionResult<()> {
        if !self.connected || self.fail_send {
            return Err(ProvisionError::SendFailed("scripted failure".into()));
        }
        self.sent.push(data.to_vec());
        Ok(())
    }

    async fn receive(&mut self) -> ProvisionResult<Option<String>> {
        self.receives += 1;
        if !self.connected {
            return Err(ProvisionError::ReceiveFailed("not connected".into()));
        }
        if self.receive_failures > 0 {
            self.receive_failures -= 1;
            return Err(ProvisionError::ReceiveFailed("would block (scripted)".into()));
        }
        Ok(self.replies.pop_front().flatten())
    }

    async fn close(&mut self) {
        self.closes += 1;
        self.connected = false;
    }
}
