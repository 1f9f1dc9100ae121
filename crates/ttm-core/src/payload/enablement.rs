//! Heartbeat streams (automated parking enablement)

use super::{check_len, get_u64, get_u8, put_u64, put_u8, StreamPayload};
use crate::catalog::StreamKind;
use crate::error::{RecordError, RecordResult};

/// Vehicle state as reported to the infrastructure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum VehicleStatus {
    /// Not requesting automated parking
    Standby = 0,
    /// Ready to engage
    Ready = 1,
    /// Searching for a slot or parking
    AutoDriving = 2,
    /// Maneuver completed
    Parked = 3,
    /// Interrupted by an obstacle
    Blocked = 4,
    /// Maneuver aborted
    EmergencyStop = 5,
}

impl TryFrom<u8> for VehicleStatus {
    type Error = RecordError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Standby),
            1 => Ok(Self::Ready),
            2 => Ok(Self::AutoDriving),
            3 => Ok(Self::Parked),
            4 => Ok(Self::Blocked),
            5 => Ok(Self::EmergencyStop),
            other => Err(RecordError::InvalidEnum {
                field: "vehicle status",
                value: other,
            }),
        }
    }
}

/// Periodic vehicle → infrastructure heartbeat (stream 143, 24 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VehicleHeartbeat {
    /// GPS-synchronised local clock, milliseconds
    pub timestamp_ms: u64,
    pub vehicle_id: u64,
    pub status: VehicleStatus,
}

impl StreamPayload for VehicleHeartbeat {
    const KIND: StreamKind = StreamKind::VehicleHeartbeat;

    fn encode_into(&self, buf: &mut [u8]) -> RecordResult<()> {
        put_u64(buf, 0, self.timestamp_ms);
        put_u64(buf, 8, self.vehicle_id);
        put_u8(buf, 16, self.status as u8);
        Ok(())
    }

    fn decode_from(buf: &[u8]) -> RecordResult<Self> {
        check_len(buf, Self::KIND)?;
        Ok(Self {
            timestamp_ms: get_u64(buf, 0),
            vehicle_id: get_u64(buf, 8),
            status: VehicleStatus::try_from(get_u8(buf, 16))?,
        })
    }
}

/// Periodic infrastructure → vehicle heartbeat (stream 5, 16 bytes)
///
/// The vehicle stops honouring infrastructure requests when these stop arriving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InfrastructureHeartbeat {
    pub timestamp_ms: u64,
    pub vehicle_id: u64,
}

impl StreamPayload for InfrastructureHeartbeat {
    const KIND: StreamKind = StreamKind::InfrastructureHeartbeat;

    fn encode_into(&self, buf: &mut [u8]) -> RecordResult<()> {
        put_u64(buf, 0, self.timestamp_ms);
        put_u64(buf, 8, self.vehicle_id);
        Ok(())
    }

    fn decode_from(buf: &[u8]) -> RecordResult<Self> {
        check_len(buf, Self::KIND)?;
        Ok(Self {
            timestamp_ms: get_u64(buf, 0),
            vehicle_id: get_u64(buf, 8),
        })
    }
}
