//! Gateway assembly: one relay, two endpoints

use std::net::SocketAddr;
use std::time::Duration;

use tracing::info;
use ttm_conv::Codec;
use ttm_core::Relay;

use crate::config::GatewayConfig;
use crate::endpoint::{Endpoint, EndpointConfig, EndpointHandle, MabxWire, StatsSnapshot, TtmWire};
use crate::error::LinkResult;
use crate::shutdown::Shutdown;

/// UDP ports of the TTM side, as handed out by provisioning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtmPorts {
    pub rx_port: u16,
    pub tx_port: u16,
}

/// The running relay between Mabx and TTM
pub struct Gateway {
    relay: Relay,
    mabx: EndpointHandle,
    ttm: EndpointHandle,
}

impl Gateway {
    /// Bind both endpoints and start relaying
    ///
    /// Nothing is spawned unless both sockets bind.
    pub fn start(config: &GatewayConfig, ttm_ports: TtmPorts, shutdown: Shutdown) -> LinkResult<Self> {
        let vehicle_id = config.vehicle_id_number()?;
        let relay = Relay::new(config.relay.queue_capacity);

        let mabx = Endpoint::bind(
            EndpointConfig {
                name: "mabx",
                rx_port: config.mabx.rx_port,
                destination: config.mabx.destination(),
            },
            MabxWire,
            relay.to_mabx.clone(),
            relay.to_ttm.clone(),
        )?;

        let ttm = Endpoint::bind(
            EndpointConfig {
                name: "ttm",
                rx_port: ttm_ports.rx_port,
                destination: SocketAddr::new(config.ttm.host, ttm_ports.tx_port),
            },
            TtmWire::new(Codec::new(vehicle_id)),
            relay.to_ttm.clone(),
            relay.to_mabx.clone(),
        )?;

        let mabx = mabx.spawn(shutdown.clone())?;
        let ttm = ttm.spawn(shutdown)?;

        info!(
            mabx = %mabx.local_addr(),
            ttm = %ttm.local_addr(),
            vehicle_id,
            "Gateway running"
        );

        Ok(Self { relay, mabx, ttm })
    }

    pub fn mabx_addr(&self) -> SocketAddr {
        self.mabx.local_addr()
    }

    pub fn ttm_addr(&self) -> SocketAddr {
        self.ttm.local_addr()
    }

    pub fn mabx_stats(&self) -> StatsSnapshot {
        self.mabx.stats()
    }

    pub fn ttm_stats(&self) -> StatsSnapshot {
        self.ttm.stats()
    }

    pub fn relay(&self) -> &Relay {
        &self.relay
    }

    /// Wait for all endpoint tasks once shutdown has been triggered
    pub async fn join(self, timeout: Duration) -> bool {
        let dropped_to_ttm = self.relay.to_ttm.dropped();
        let dropped_to_mabx = self.relay.to_mabx.dropped();

        let mabx_clean = self.mabx.join(timeout).await;
        let ttm_clean = self.ttm.join(timeout).await;

        info!(dropped_to_ttm, dropped_to_mabx, "Gateway stopped");
        mabx_clean && ttm_clean
    }
}
