//! ttm-core - Shared types for the TTM vehicle gateway
//!
//! Everything that crosses a relay queue is a [`Record`]: a fixed 24-byte
//! header followed by a schema-specific payload. This crate owns that framing,
//! the static stream catalog, the typed payload schemas and the bounded queues
//! the two endpoints exchange records through.
//!
//! # Architecture
//!
//! ```text
//!   Mabx endpoint                                   TTM endpoint
//!  ┌─────────────┐     Relay::to_ttm (1024)      ┌─────────────┐
//!  │ rx (binary) │ ────────────────────────────▶ │ tx (JSON)   │
//!  │             │                               │             │
//!  │ tx (binary) │ ◀──────────────────────────── │ rx (JSON)   │
//!  └─────────────┘     Relay::to_mabx (1024)     └─────────────┘
//! ```

pub mod catalog;
pub mod error;
pub mod payload;
pub mod queue;
pub mod record;

pub use catalog::{StreamDescriptor, StreamKind, StreamSource, CATALOG};
pub use error::{RecordError, RecordResult};
pub use payload::StreamPayload;
pub use queue::{Relay, RelayQueue, DEFAULT_QUEUE_CAPACITY};
pub use record::{Header, Record, HEADER_SIZE, PAYLOAD_CAPACITY, RECORD_VERSION, VERSION_INFO};
