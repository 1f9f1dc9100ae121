//! Gateway configuration
//!
//! Loaded from TOML. Every field has a default matching the bench setup, so
//! an empty file is a valid configuration.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;

use serde::{Deserialize, Serialize};
use ttm_core::DEFAULT_QUEUE_CAPACITY;

use crate::error::{LinkError, LinkResult};

/// Complete gateway configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Vehicle identifier sent during provisioning (ASCII decimal)
    #[serde(default = "default_vehicle_id")]
    pub vehicle_id: String,

    #[serde(default)]
    pub mabx: MabxConfig,

    #[serde(default)]
    pub ttm: TtmConfig,

    #[serde(default)]
    pub relay: RelayConfig,
}

fn default_vehicle_id() -> String {
    "199".to_string()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            vehicle_id: default_vehicle_id(),
            mabx: MabxConfig::default(),
            ttm: TtmConfig::default(),
            relay: RelayConfig::default(),
        }
    }
}

impl GatewayConfig {
    /// Load and validate configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> LinkResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            LinkError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(content: &str) -> LinkResult<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| LinkError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> LinkResult<()> {
        self.vehicle_id_number()?;
        if self.relay.queue_capacity == 0 {
            return Err(LinkError::Config(
                "relay.queue_capacity must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    /// Vehicle identifier as a number, for payload fields
    pub fn vehicle_id_number(&self) -> LinkResult<u64> {
        self.vehicle_id.parse().map_err(|_| {
            LinkError::Config(format!(
                "vehicle_id must be a decimal number, got {:?}",
                self.vehicle_id
            ))
        })
    }
}

// =============================================================================
// Mabx
// =============================================================================

/// Local vehicle controller link (binary records over UDP)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MabxConfig {
    /// Port the gateway listens on for Mabx records
    #[serde(default = "default_mabx_port")]
    pub rx_port: u16,

    /// Mabx address records are sent to
    #[serde(default = "default_mabx_address")]
    pub tx_address: IpAddr,

    #[serde(default = "default_mabx_port")]
    pub tx_port: u16,
}

fn default_mabx_port() -> u16 {
    5000
}

fn default_mabx_address() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(10, 0, 0, 193))
}

impl Default for MabxConfig {
    fn default() -> Self {
        Self {
            rx_port: default_mabx_port(),
            tx_address: default_mabx_address(),
            tx_port: default_mabx_port(),
        }
    }
}

impl MabxConfig {
    pub fn destination(&self) -> SocketAddr {
        SocketAddr::new(self.tx_address, self.tx_port)
    }
}

// =============================================================================
// TTM
// =============================================================================

/// Infrastructure backend link (TCP provisioning, then JSON over UDP)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TtmConfig {
    /// Backend address, used for provisioning and as the UDP destination
    #[serde(default = "default_ttm_host")]
    pub host: IpAddr,

    /// TCP port of the provisioning server
    #[serde(default = "default_provisioning_port")]
    pub provisioning_port: u16,

    /// Transmit port = provisioned receive port + this offset
    #[serde(default = "default_tx_port_offset")]
    pub tx_port_offset: u16,
}

fn default_ttm_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::LOCALHOST)
}

fn default_provisioning_port() -> u16 {
    54000
}

fn default_tx_port_offset() -> u16 {
    1
}

impl Default for TtmConfig {
    fn default() -> Self {
        Self {
            host: default_ttm_host(),
            provisioning_port: default_provisioning_port(),
            tx_port_offset: default_tx_port_offset(),
        }
    }
}

impl TtmConfig {
    pub fn provisioning_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.provisioning_port)
    }

    /// Receive and transmit ports for a provisioned port
    pub fn ports(&self, provisioned: u16) -> LinkResult<(u16, u16)> {
        let tx = provisioned.checked_add(self.tx_port_offset).ok_or_else(|| {
            LinkError::Config(format!(
                "provisioned port {} + offset {} exceeds 65535",
                provisioned, self.tx_port_offset
            ))
        })?;
        Ok((provisioned, tx))
    }
}

// =============================================================================
// Relay
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Bound for each direction; the oldest record is evicted when full
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

fn default_queue_capacity() -> usize {
    DEFAULT_QUEUE_CAPACITY
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
        }
    }
}
