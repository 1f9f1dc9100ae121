//! Parking slot availability: closest-slot request (vehicle 141, 32 bytes)
//! and response (infrastructure 21, 72 bytes)

use super::{check_len, get_f64, get_u64, put_f64, put_u64, StreamPayload};
use crate::catalog::StreamKind;
use crate::error::RecordResult;

/// WGS84 position in degrees
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Wgs84Position {
    pub longitude_deg: f64,
    pub latitude_deg: f64,
}

/// WGS84 pose; heading 0 is due north, clockwise, in [0, 2π]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Wgs84Pose {
    pub position: Wgs84Position,
    pub heading_rad: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClosestSlotRequest {
    pub timestamp_ms: u64,
    pub reference_pose: Wgs84Pose,
}

impl StreamPayload for ClosestSlotRequest {
    const KIND: StreamKind = StreamKind::ClosestSlotRequest;

    fn encode_into(&self, buf: &mut [u8]) -> RecordResult<()> {
        put_u64(buf, 0, self.timestamp_ms);
        put_f64(buf, 8, self.reference_pose.position.longitude_deg);
        put_f64(buf, 16, self.reference_pose.position.latitude_deg);
        put_f64(buf, 24, self.reference_pose.heading_rad);
        Ok(())
    }

    fn decode_from(buf: &[u8]) -> RecordResult<Self> {
        check_len(buf, Self::KIND)?;
        Ok(Self {
            timestamp_ms: get_u64(buf, 0),
            reference_pose: Wgs84Pose {
                position: Wgs84Position {
                    longitude_deg: get_f64(buf, 8),
                    latitude_deg: get_f64(buf, 16),
                },
                heading_rad: get_f64(buf, 24),
            },
        })
    }
}

/// Corner points of the closest free slot, seen from the slot entrance:
/// front-left, rear-left, rear-right, front-right
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClosestSlotResponse {
    pub timestamp_ms: u64,
    pub corners: [Wgs84Position; 4],
}

impl StreamPayload for ClosestSlotResponse {
    const KIND: StreamKind = StreamKind::ClosestSlotResponse;

    fn encode_into(&self, buf: &mut [u8]) -> RecordResult<()> {
        put_u64(buf, 0, self.timestamp_ms);
        for (i, corner) in self.corners.iter().enumerate() {
            put_f64(buf, 8 + i * 16, corner.longitude_deg);
            put_f64(buf, 16 + i * 16, corner.latitude_deg);
        }
        Ok(())
    }

    fn decode_from(buf: &[u8]) -> RecordResult<Self> {
        check_len(buf, Self::KIND)?;
        let corner = |i: usize| Wgs84Position {
            longitude_deg: get_f64(buf, 8 + i * 16),
            latitude_deg: get_f64(buf, 16 + i * 16),
        };
        Ok(Self {
            timestamp_ms: get_u64(buf, 0),
            corners: [corner(0), corner(1), corner(2), corner(3)],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_layout() {
        let corners = [
            Wgs84Position {
                longitude_deg: -83.1,
                latitude_deg: 42.3,
            },
            Wgs84Position {
                longitude_deg: -83.2,
                latitude_deg: 42.4,
            },
            Wgs84Position {
                longitude_deg: -83.3,
                latitude_deg: 42.5,
            },
            Wgs84Position {
                longitude_deg: -83.4,
                latitude_deg: 42.6,
            },
        ];
        let record = ClosestSlotResponse {
            timestamp_ms: 9,
            corners,
        }
        .to_record()
        .unwrap();

        let p = record.payload();
        assert_eq!(p.len(), 72);
        assert_eq!(&p[56..64], &(-83.4f64).to_le_bytes());
        assert_eq!(&p[64..72], &42.6f64.to_le_bytes());
        assert_eq!(
            ClosestSlotResponse::from_record(&record).unwrap().corners,
            corners
        );
    }

    #[test]
    fn test_request_size() {
        let record = ClosestSlotRequest {
            timestamp_ms: 1,
            reference_pose: Wgs84Pose::default(),
        }
        .to_record()
        .unwrap();
        assert_eq!(record.payload().len(), 32);
    }
}
