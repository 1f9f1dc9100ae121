//! Wire formats spoken at each endpoint's socket

use tracing::debug;
use ttm_conv::Codec;
use ttm_core::catalog;
use ttm_core::{Record, RecordError, StreamSource};

use crate::error::LinkResult;

/// Conversion between socket datagrams and canonical records
pub trait WireFormat: Send + Sync + 'static {
    /// Turn a received datagram into a record for the peer queue
    fn ingest(&self, data: &[u8]) -> LinkResult<Record>;

    /// Turn a record into a datagram; `None` means nothing is sent
    fn egress(&self, record: &Record) -> LinkResult<Option<Vec<u8>>>;
}

/// Binary records, as spoken by the Mabx
#[derive(Debug, Clone, Copy, Default)]
pub struct MabxWire;

impl WireFormat for MabxWire {
    fn ingest(&self, data: &[u8]) -> LinkResult<Record> {
        let record = Record::from_wire(data)?;
        let header = record.header();

        let desc = catalog::lookup_raw(header.source_info, header.stream_number)?;
        if record.payload().len() != desc.payload_size {
            return Err(RecordError::PayloadSize {
                number: desc.number,
                expected: desc.payload_size,
                actual: record.payload().len(),
            }
            .into());
        }

        Ok(record)
    }

    fn egress(&self, record: &Record) -> LinkResult<Option<Vec<u8>>> {
        Ok(Some(record.to_wire()))
    }
}

/// JSON messages, as spoken by the TTM backend
#[derive(Debug, Clone, Copy)]
pub struct TtmWire {
    codec: Codec,
}

impl TtmWire {
    pub fn new(codec: Codec) -> Self {
        Self { codec }
    }
}

impl WireFormat for TtmWire {
    fn ingest(&self, data: &[u8]) -> LinkResult<Record> {
        Ok(self.codec.decode(data)?)
    }

    fn egress(&self, record: &Record) -> LinkResult<Option<Vec<u8>>> {
        // Only vehicle-side records travel to the infrastructure
        if record.header().source_info != u8::from(StreamSource::FusionPc) {
            debug!(
                source = record.header().source_info,
                stream = record.stream_number(),
                "Not forwarding non-vehicle record to TTM"
            );
            return Ok(None);
        }
        Ok(self.codec.encode_to_vec(record)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LinkError;
    use ttm_core::payload::{InfrastructureHeartbeat, VehicleHeartbeat, VehicleStatus};
    use ttm_core::StreamPayload;

    fn vehicle_heartbeat() -> Record {
        VehicleHeartbeat {
            timestamp_ms: 500,
            vehicle_id: 199,
            status: VehicleStatus::Ready,
        }
        .to_record()
        .unwrap()
    }

    #[test]
    fn test_mabx_ingest_accepts_catalog_stream() {
        let wire = vehicle_heartbeat().to_wire();
        let record = MabxWire.ingest(&wire).unwrap();
        assert_eq!(record, vehicle_heartbeat());
    }

    #[test]
    fn test_mabx_ingest_rejects_unknown_stream() {
        let mut wire = vehicle_heartbeat().to_wire();
        wire[19] = 99;
        assert!(matches!(
            MabxWire.ingest(&wire),
            Err(LinkError::Record(RecordError::UnknownStream { number: 99, .. }))
        ));
    }

    #[test]
    fn test_mabx_ingest_rejects_wrong_length() {
        let mut wire = vehicle_heartbeat().to_wire();
        // Claim 16 bytes for a 24-byte stream
        wire[16..18].copy_from_slice(&16u16.to_le_bytes());
        assert!(matches!(
            MabxWire.ingest(&wire),
            Err(LinkError::Record(RecordError::PayloadSize { .. }))
        ));
    }

    #[test]
    fn test_mabx_ingest_rejects_truncated() {
        let wire = vehicle_heartbeat().to_wire();
        assert!(MabxWire.ingest(&wire[..30]).is_err());
        assert!(MabxWire.ingest(&wire[..10]).is_err());
    }

    #[test]
    fn test_ttm_egress_gates_infrastructure_records() {
        let ttm = TtmWire::new(Codec::new(199));
        let infra = InfrastructureHeartbeat {
            timestamp_ms: 1,
            vehicle_id: 199,
        }
        .to_record()
        .unwrap();
        assert_eq!(ttm.egress(&infra).unwrap(), None);

        let bytes = ttm.egress(&vehicle_heartbeat()).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["status"], "1");
        assert_eq!(value["msg_type"], "101");
    }

    #[test]
    fn test_ttm_ingest_rejects_bad_json() {
        let ttm = TtmWire::new(Codec::new(199));
        assert!(matches!(ttm.ingest(b"not json"), Err(LinkError::Conv(_))));
    }
}
