//! Typed payload schemas
//!
//! Each schema reads and writes named fields at fixed offsets. The layouts
//! reproduce the vehicle-side C structs (natural alignment, little-endian,
//! zero padding) byte for byte, so records stay interchangeable with the Mabx.

mod enablement;
mod localization;
mod routing;
mod slot;

pub use enablement::{InfrastructureHeartbeat, VehicleHeartbeat, VehicleStatus};
pub use localization::{
    CoordinateFrame, CoordinateSystem, InfrastructureLocalization, LocalizationEstimate, Pose,
    PoseUncertainty, VehicleLocalization,
};
pub use routing::{RequestType, RouteMode, RouteRequest, Routing, Waypoint, MAX_WAYPOINTS};
pub use slot::{ClosestSlotRequest, ClosestSlotResponse, Wgs84Pose, Wgs84Position};

use crate::catalog::StreamKind;
use crate::error::{RecordError, RecordResult};
use crate::record::Record;

/// A payload schema bound to one catalog stream
pub trait StreamPayload: Sized {
    /// Catalog stream this payload travels on
    const KIND: StreamKind;

    /// Write the fields into `buf`, which is exactly `payload_size` zeroed bytes
    fn encode_into(&self, buf: &mut [u8]) -> RecordResult<()>;

    /// Read the fields from `buf`, which is exactly `payload_size` bytes
    fn decode_from(buf: &[u8]) -> RecordResult<Self>;

    /// Build a canonical record carrying this payload
    fn to_record(&self) -> RecordResult<Record> {
        let desc = Self::KIND.descriptor();
        let mut buf = vec![0u8; desc.payload_size];
        self.encode_into(&mut buf)?;
        Record::new(desc, buf)
    }

    /// Extract this payload from a record of the matching stream
    fn from_record(record: &Record) -> RecordResult<Self> {
        let desc = Self::KIND.descriptor();
        let header = record.header();
        if header.source_info != u8::from(desc.source) || header.stream_number != desc.number {
            return Err(RecordError::UnknownStream {
                stream_source: header.source_info,
                number: header.stream_number,
            });
        }
        if record.payload().len() != desc.payload_size {
            return Err(RecordError::PayloadSize {
                number: desc.number,
                expected: desc.payload_size,
                actual: record.payload().len(),
            });
        }
        Self::decode_from(record.payload())
    }
}

// Fixed-offset field access. Callers guarantee `buf` covers the full layout,
// which `from_record`/`to_record` check against the catalog size.

pub(crate) fn put_u8(buf: &mut [u8], off: usize, v: u8) {
    buf[off] = v;
}

pub(crate) fn put_u16(buf: &mut [u8], off: usize, v: u16) {
    buf[off..off + 2].copy_from_slice(&v.to_le_bytes());
}

pub(crate) fn put_u32(buf: &mut [u8], off: usize, v: u32) {
    buf[off..off + 4].copy_from_slice(&v.to_le_bytes());
}

pub(crate) fn put_i32(buf: &mut [u8], off: usize, v: i32) {
    buf[off..off + 4].copy_from_slice(&v.to_le_bytes());
}

pub(crate) fn put_u64(buf: &mut [u8], off: usize, v: u64) {
    buf[off..off + 8].copy_from_slice(&v.to_le_bytes());
}

pub(crate) fn put_f64(buf: &mut [u8], off: usize, v: f64) {
    buf[off..off + 8].copy_from_slice(&v.to_le_bytes());
}

pub(crate) fn get_u8(buf: &[u8], off: usize) -> u8 {
    buf[off]
}

pub(crate) fn get_u16(buf: &[u8], off: usize) -> u16 {
    u16::from_le_bytes([buf[off], buf[off + 1]])
}

pub(crate) fn get_u32(buf: &[u8], off: usize) -> u32 {
    let mut b = [0u8; 4];
    b.copy_from_slice(&buf[off..off + 4]);
    u32::from_le_bytes(b)
}

pub(crate) fn get_i32(buf: &[u8], off: usize) -> i32 {
    let mut b = [0u8; 4];
    b.copy_from_slice(&buf[off..off + 4]);
    i32::from_le_bytes(b)
}

pub(crate) fn get_u64(buf: &[u8], off: usize) -> u64 {
    let mut b = [0u8; 8];
    b.copy_from_slice(&buf[off..off + 8]);
    u64::from_le_bytes(b)
}

pub(crate) fn get_f64(buf: &[u8], off: usize) -> f64 {
    let mut b = [0u8; 8];
    b.copy_from_slice(&buf[off..off + 8]);
    f64::from_le_bytes(b)
}

/// Guard used by `decode_from` implementations
pub(crate) fn check_len(buf: &[u8], kind: StreamKind) -> RecordResult<()> {
    let desc = kind.descriptor();
    if buf.len() < desc.payload_size {
        return Err(RecordError::TooShort {
            expected: desc.payload_size,
            actual: buf.len(),
        });
    }
    Ok(())
}
