//! Static stream catalog
//!
//! Maps (source, stream number) to payload layout. Vehicle-origin and
//! infrastructure-origin streams use disjoint numbers even for the same
//! concept (vehicle heartbeat is 143, infrastructure heartbeat is 5).

use std::fmt;

use crate::error::{RecordError, RecordResult};

/// Stream source application id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StreamSource {
    /// Sent by the vehicle fusion PC (Mabx side)
    FusionPc = 40,
    /// Sent by the parking infrastructure (TTM side)
    Infrastructure = 63,
}

impl From<StreamSource> for u8 {
    fn from(source: StreamSource) -> Self {
        source as u8
    }
}

impl TryFrom<u8> for StreamSource {
    type Error = RecordError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            40 => Ok(Self::FusionPc),
            63 => Ok(Self::Infrastructure),
            other => Err(RecordError::InvalidEnum {
                field: "stream source",
                value: other,
            }),
        }
    }
}

impl fmt::Display for StreamSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FusionPc => f.write_str("fusion-pc"),
            Self::Infrastructure => f.write_str("infrastructure"),
        }
    }
}

/// Every message kind the gateway understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    VehicleHeartbeat,
    VehicleLocalization,
    RouteRequest,
    ClosestSlotRequest,
    InfrastructureHeartbeat,
    InfrastructureLocalization,
    Routing,
    ClosestSlotResponse,
}

impl StreamKind {
    /// Catalog entry for this kind
    pub fn descriptor(self) -> &'static StreamDescriptor {
        // CATALOG is ordered to match the enum discriminants
        &CATALOG[self as usize]
    }
}

/// One catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamDescriptor {
    pub kind: StreamKind,
    pub source: StreamSource,
    pub number: u8,
    pub version: u8,
    /// Exact payload size in bytes
    pub payload_size: usize,
}

/// The complete stream catalog
pub static CATALOG: [StreamDescriptor; 8] = [
    StreamDescriptor {
        kind: StreamKind::VehicleHeartbeat,
        source: StreamSource::FusionPc,
        number: 143,
        version: 1,
        payload_size: 24,
    },
    StreamDescriptor {
        kind: StreamKind::VehicleLocalization,
        source: StreamSource::FusionPc,
        number: 140,
        version: 1,
        payload_size: 112,
    },
    StreamDescriptor {
        kind: StreamKind::RouteRequest,
        source: StreamSource::FusionPc,
        number: 142,
        version: 1,
        payload_size: 16,
    },
    StreamDescriptor {
        kind: StreamKind::ClosestSlotRequest,
        source: StreamSource::FusionPc,
        number: 141,
        version: 1,
        payload_size: 32,
    },
    StreamDescriptor {
        kind: StreamKind::InfrastructureHeartbeat,
        source: StreamSource::Infrastructure,
        number: 5,
        version: 1,
        payload_size: 16,
    },
    StreamDescriptor {
        kind: StreamKind::InfrastructureLocalization,
        source: StreamSource::Infrastructure,
        number: 1,
        version: 1,
        payload_size: 112,
    },
    StreamDescriptor {
        kind: StreamKind::Routing,
        source: StreamSource::Infrastructure,
        number: 11,
        version: 1,
        payload_size: 16344,
    },
    StreamDescriptor {
        kind: StreamKind::ClosestSlotResponse,
        source: StreamSource::Infrastructure,
        number: 21,
        version: 1,
        payload_size: 72,
    },
];

/// Look up a stream by source and number
pub fn lookup(source: StreamSource, number: u8) -> Option<&'static StreamDescriptor> {
    CATALOG
        .iter()
        .find(|d| d.source == source && d.number == number)
}

/// Look up a stream by the raw header fields
pub fn lookup_raw(source: u8, number: u8) -> RecordResult<&'static StreamDescriptor> {
    StreamSource::try_from(source)
        .ok()
        .and_then(|s| lookup(s, number))
        .ok_or(RecordError::UnknownStream {
            stream_source: source,
            number,
        })
}
