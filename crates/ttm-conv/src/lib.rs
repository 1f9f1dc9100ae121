//! ttm-conv - Record ⇄ JSON conversion for the TTM backend
//!
//! The TTM backend speaks one JSON object per UDP datagram. This crate turns
//! those objects into canonical records and back.
//!
//! # Wire conventions
//!
//! - `msg_type` is a string-encoded integer; inbound and outbound messages
//!   use disjoint codes (see [`msg_type`])
//! - every other value is a decimal string, never a native JSON number
//! - floats are written in their shortest exact form, so decoding an encoded
//!   value gives back the same `f64`
//!
//! # Quick Start
//!
//! ```rust
//! use serde_json::json;
//! use ttm_conv::Codec;
//!
//! let codec = Codec::new(199);
//!
//! let record = codec
//!     .decode_value(&json!({"msg_type": "1", "timestamp": "1000"}))
//!     .unwrap();
//! assert_eq!(record.stream_number(), 5);
//!
//! // Infrastructure-origin records have no outbound message
//! assert_eq!(codec.encode(&record).unwrap(), None);
//! ```

pub mod decode;
pub mod encode;
pub mod error;
mod fields;
pub mod msg_type;

pub use error::{ConvError, ConvResult};
pub use msg_type::{InboundMsg, OutboundMsg};

use serde_json::Value;
use ttm_core::Record;

/// Converter bound to one vehicle identity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Codec {
    vehicle_id: u64,
}

impl Codec {
    pub fn new(vehicle_id: u64) -> Self {
        Self { vehicle_id }
    }

    pub fn vehicle_id(&self) -> u64 {
        self.vehicle_id
    }

    /// Decode a raw datagram
    pub fn decode(&self, data: &[u8]) -> ConvResult<Record> {
        let value: Value = serde_json::from_slice(data)?;
        self.decode_value(&value)
    }

    /// Decode an already-parsed message
    pub fn decode_value(&self, value: &Value) -> ConvResult<Record> {
        decode::decode(value, self.vehicle_id)
    }

    /// Encode a record; `None` when the stream has no outbound message
    pub fn encode(&self, record: &Record) -> ConvResult<Option<Value>> {
        encode::encode(record, self.vehicle_id)
    }

    /// Encode a record straight to datagram bytes
    pub fn encode_to_vec(&self, record: &Record) -> ConvResult<Option<Vec<u8>>> {
        match self.encode(record)? {
            Some(value) => Ok(Some(serde_json::to_vec(&value)?)),
            None => Ok(None),
        }
    }
}
