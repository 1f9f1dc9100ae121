//! Canonical binary record framing
//!
//! A record is a packed little-endian header immediately followed by the
//! payload. Only `HEADER_SIZE + stream_data_length` bytes ever go on the wire.
//!
//! ```text
//!  0      2      4            8    9..12  12          16     18 19 20 21 22 23
//!  ┌──────┬──────┬────────────┬────┬─────┬───────────┬──────┬──┬──┬──┬──┬──┬──┐
//!  │ver   │txcnt │tx time ms  │src │ rsv │ ref index │ len  │tc│nr│vr│ch│ci│rs│
//!  └──────┴──────┴────────────┴────┴─────┴───────────┴──────┴──┴──┴──┴──┴──┴──┘
//! ```

use crate::catalog::StreamDescriptor;
use crate::error::{RecordError, RecordResult};

/// Size of the packed record header in bytes
pub const HEADER_SIZE: usize = 24;

/// Maximum payload bytes a record may carry
pub const PAYLOAD_CAPACITY: usize = 32768;

/// Record protocol major version
pub const RECORD_VERSION: u16 = 0xA1;

/// `version_info` value stamped into every record built by this gateway
pub const VERSION_INFO: u16 = (RECORD_VERSION << 8) | HEADER_SIZE as u16;

/// Record header
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Header {
    /// Protocol version and header size (`VERSION_INFO`)
    pub version_info: u16,
    /// Per-sender transmit counter
    pub source_tx_count: u16,
    /// Transmit time, epoch milliseconds truncated to 32 bits
    pub source_tx_time_ms: u32,
    /// Sending application id (see [`crate::StreamSource`])
    pub source_info: u8,
    /// Stream-specific index used for data retrieval
    pub stream_ref_index: u32,
    /// Payload size in bytes
    pub stream_data_length: u16,
    /// How many times this stream has been sent
    pub stream_tx_count: u8,
    /// Catalog stream number
    pub stream_number: u8,
    /// Payload layout version
    pub stream_version: u8,
    /// Chunk count, 0 when not chunked
    pub stream_chunks: u8,
    /// Chunk index within a chunk series
    pub stream_chunk_index: u8,
}

impl Header {
    /// Serialize to the packed wire layout
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        out[0..2].copy_from_slice(&self.version_info.to_le_bytes());
        out[2..4].copy_from_slice(&self.source_tx_count.to_le_bytes());
        out[4..8].copy_from_slice(&self.source_tx_time_ms.to_le_bytes());
        out[8] = self.source_info;
        // 9..12 reserved
        out[12..16].copy_from_slice(&self.stream_ref_index.to_le_bytes());
        out[16..18].copy_from_slice(&self.stream_data_length.to_le_bytes());
        out[18] = self.stream_tx_count;
        out[19] = self.stream_number;
        out[20] = self.stream_version;
        out[21] = self.stream_chunks;
        out[22] = self.stream_chunk_index;
        // 23 reserved
        out
    }

    /// Parse the packed wire layout; reserved bytes are ignored
    pub fn from_bytes(data: &[u8]) -> RecordResult<Self> {
        if data.len() < HEADER_SIZE {
            return Err(RecordError::TooShort {
                expected: HEADER_SIZE,
                actual: data.len(),
            });
        }

        Ok(Self {
            version_info: u16::from_le_bytes([data[0], data[1]]),
            source_tx_count: u16::from_le_bytes([data[2], data[3]]),
            source_tx_time_ms: u32::from_le_bytes([data[4], data[5], data[6], data[7]]),
            source_info: data[8],
            stream_ref_index: u32::from_le_bytes([data[12], data[13], data[14], data[15]]),
            stream_data_length: u16::from_le_bytes([data[16], data[17]]),
            stream_tx_count: data[18],
            stream_number: data[19],
            stream_version: data[20],
            stream_chunks: data[21],
            stream_chunk_index: data[22],
        })
    }
}

/// The canonical internal message unit
///
/// The payload holds exactly `stream_data_length` bytes; the header length
/// field and the payload can never disagree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    header: Header,
    payload: Vec<u8>,
}

impl Record {
    /// Build a fresh record for a catalog stream
    ///
    /// Freshness fields (counters, transmit time) are left at zero; the
    /// transmitting endpoint stamps them.
    pub fn new(descriptor: &StreamDescriptor, payload: Vec<u8>) -> RecordResult<Self> {
        if payload.len() != descriptor.payload_size {
            return Err(RecordError::PayloadSize {
                number: descriptor.number,
                expected: descriptor.payload_size,
                actual: payload.len(),
            });
        }

        let header = Header {
            version_info: VERSION_INFO,
            source_info: descriptor.source.into(),
            stream_data_length: payload.len() as u16,
            stream_number: descriptor.number,
            stream_version: descriptor.version,
            ..Header::default()
        };

        Ok(Self { header, payload })
    }

    /// Parse a datagram received from the wire
    pub fn from_wire(data: &[u8]) -> RecordResult<Self> {
        let header = Header::from_bytes(data)?;
        let len = header.stream_data_length as usize;

        if len > PAYLOAD_CAPACITY {
            return Err(RecordError::LengthExceedsCapacity(len));
        }
        if data.len() < HEADER_SIZE + len {
            return Err(RecordError::TooShort {
                expected: HEADER_SIZE + len,
                actual: data.len(),
            });
        }

        Ok(Self {
            header,
            payload: data[HEADER_SIZE..HEADER_SIZE + len].to_vec(),
        })
    }

    /// Serialize header plus the meaningful payload prefix
    pub fn to_wire(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_SIZE + self.payload.len());
        out.extend_from_slice(&self.header.to_bytes());
        out.extend_from_slice(&self.payload);
        out
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn stream_number(&self) -> u8 {
        self.header.stream_number
    }

    /// Stamp freshness fields right before transmission
    pub fn stamp(&mut self, counter: u32, now_ms: u32) {
        self.header.source_tx_count = counter as u16;
        self.header.stream_ref_index = counter;
        self.header.source_tx_time_ms = now_ms;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{StreamKind, StreamSource};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_version_info() {
        assert_eq!(VERSION_INFO, 0xA118);
    }

    #[test]
    fn test_header_layout() {
        let header = Header {
            version_info: VERSION_INFO,
            source_tx_count: 0x0102,
            source_tx_time_ms: 0x0A0B0C0D,
            source_info: 40,
            stream_ref_index: 0x11223344,
            stream_data_length: 24,
            stream_tx_count: 7,
            stream_number: 143,
            stream_version: 1,
            stream_chunks: 0,
            stream_chunk_index: 0,
        };

        let bytes = header.to_bytes();
        assert_eq!(
            bytes,
            [
                0x18, 0xA1, // version info
                0x02, 0x01, // tx count
                0x0D, 0x0C, 0x0B, 0x0A, // tx time
                40, 0, 0, 0, // source + reserved
                0x44, 0x33, 0x22, 0x11, // ref index
                24, 0, // data length
                7, 143, 1, 0, 0, 0,
            ]
        );
        assert_eq!(Header::from_bytes(&bytes).unwrap(), header);
    }

    #[test]
    fn test_to_wire_sends_only_used_bytes() {
        let desc = StreamKind::VehicleHeartbeat.descriptor();
        let record = Record::new(desc, vec![0xAB; desc.payload_size]).unwrap();

        let wire = record.to_wire();
        assert_eq!(wire.len(), HEADER_SIZE + 24);
        assert_eq!(record.header().source_info, u8::from(StreamSource::FusionPc));
        assert_eq!(Record::from_wire(&wire).unwrap(), record);
    }

    #[test]
    fn test_from_wire_rejects_truncated_payload() {
        let desc = StreamKind::InfrastructureHeartbeat.descriptor();
        let record = Record::new(desc, vec![0; 16]).unwrap();
        let wire = record.to_wire();

        let err = Record::from_wire(&wire[..wire.len() - 1]).unwrap_err();
        assert_eq!(
            err,
            RecordError::TooShort {
                expected: HEADER_SIZE + 16,
                actual: HEADER_SIZE + 15
            }
        );
        assert!(matches!(
            Record::from_wire(&wire[..10]),
            Err(RecordError::TooShort { .. })
        ));
    }

    #[test]
    fn test_from_wire_rejects_oversized_length() {
        let mut header = Header {
            stream_data_length: u16::MAX,
            ..Header::default()
        }
        .to_bytes()
        .to_vec();
        header.resize(HEADER_SIZE + u16::MAX as usize, 0);

        assert_eq!(
            Record::from_wire(&header),
            Err(RecordError::LengthExceedsCapacity(u16::MAX as usize))
        );
    }

    #[test]
    fn test_new_rejects_wrong_payload_size() {
        let desc = StreamKind::Routing.descriptor();
        assert!(matches!(
            Record::new(desc, vec![0; 10]),
            Err(RecordError::PayloadSize { number: 11, .. })
        ));
    }

    #[test]
    fn test_stamp() {
        let desc = StreamKind::VehicleHeartbeat.descriptor();
        let mut record = Record::new(desc, vec![0; 24]).unwrap();
        record.stamp(70_000, 1234);

        assert_eq!(record.header().source_tx_count, (70_000u32 & 0xFFFF) as u16);
        assert_eq!(record.header().stream_ref_index, 70_000);
        assert_eq!(record.header().source_tx_time_ms, 1234);
    }
}
