//! ttm-link - Network side of the TTM vehicle gateway
//!
//! Provisions the TTM port, binds both UDP endpoints and relays records
//! between them through the bounded queues from `ttm-core`.
//!
//! # Architecture
//!
//! ```text
//!  ┌─────────┐  binary/UDP  ┌──────────────┐     to_ttm      ┌──────────────┐  JSON/UDP  ┌─────────┐
//!  │  Mabx   │─────────────►│ Mabx endpoint│────────────────►│ TTM endpoint │───────────►│   TTM   │
//!  │         │◄─────────────│  (MabxWire)  │◄────────────────│  (TtmWire)   │◄───────────│ backend │
//!  └─────────┘              └──────────────┘     to_mabx     └──────────────┘            └────┬────┘
//!                                                                                              │
//!                                    provisioning (TCP, once at startup) ◄─────────────────────┘
//! ```

pub mod config;
pub mod endpoint;
pub mod error;
pub mod gateway;
pub mod provisioning;
pub mod shutdown;
pub mod socket;

pub use config::{GatewayConfig, MabxConfig, RelayConfig, TtmConfig};
pub use endpoint::{Endpoint, EndpointConfig, EndpointHandle, MabxWire, StatsSnapshot, TtmWire, WireFormat};
pub use error::{LinkError, LinkResult, ProvisionError, ProvisionResult};
pub use gateway::{Gateway, TtmPorts};
pub use provisioning::{provision, ProvisioningLink, ScriptedLink, TcpProvisioningLink};
pub use shutdown::{Shutdown, ShutdownTrigger};
