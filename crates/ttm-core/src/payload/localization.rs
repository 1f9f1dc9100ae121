//! Localization streams (vehicle 140, infrastructure 1), 112 bytes each
//!
//! ```text
//!   0  timestamp_ms        u64
//!   8  coordinate system   u8  (+3 padding)
//!  12  origin zone         u32
//!  16  pose                6 x f64
//!  64  pose uncertainty    6 x f64
//! ```

use super::{check_len, get_f64, get_u32, get_u64, get_u8, put_f64, put_u32, put_u64, put_u8};
use super::StreamPayload;
use crate::catalog::StreamKind;
use crate::error::{RecordError, RecordResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CoordinateSystem {
    Wgs84 = 0,
    Utm = 1,
}

impl TryFrom<u8> for CoordinateSystem {
    type Error = RecordError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Wgs84),
            1 => Ok(Self::Utm),
            other => Err(RecordError::InvalidEnum {
                field: "coordinate system",
                value: other,
            }),
        }
    }
}

/// Coordinate frame of a localization update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinateFrame {
    pub system: CoordinateSystem,
    /// UTM zone when `system` is UTM, unused for WGS84
    pub origin_zone: u32,
}

/// Estimated pose; origin at the centre of the rear axle
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Pose {
    /// Longitude (WGS84, deg) or easting (UTM, m)
    pub x: f64,
    /// Latitude (WGS84, deg) or northing (UTM, m)
    pub y: f64,
    pub z_m: f64,
    pub roll_rad: f64,
    pub pitch_rad: f64,
    pub yaw_rad: f64,
}

/// Variances of the pose estimate
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PoseUncertainty {
    pub x: f64,
    pub y: f64,
    pub z_m2: f64,
    pub roll_rad2: f64,
    pub pitch_rad2: f64,
    pub yaw_rad2: f64,
}

/// Shared body of both localization streams
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalizationEstimate {
    pub timestamp_ms: u64,
    pub frame: CoordinateFrame,
    pub state: Pose,
    pub uncertainty: PoseUncertainty,
}

impl LocalizationEstimate {
    fn encode(&self, buf: &mut [u8]) {
        put_u64(buf, 0, self.timestamp_ms);
        put_u8(buf, 8, self.frame.system as u8);
        put_u32(buf, 12, self.frame.origin_zone);

        let s = &self.state;
        for (i, v) in [s.x, s.y, s.z_m, s.roll_rad, s.pitch_rad, s.yaw_rad]
            .into_iter()
            .enumerate()
        {
            put_f64(buf, 16 + i * 8, v);
        }

        let u = &self.uncertainty;
        for (i, v) in [u.x, u.y, u.z_m2, u.roll_rad2, u.pitch_rad2, u.yaw_rad2]
            .into_iter()
            .enumerate()
        {
            put_f64(buf, 64 + i * 8, v);
        }
    }

    fn decode(buf: &[u8]) -> RecordResult<Self> {
        let f = |off: usize| get_f64(buf, off);
        Ok(Self {
            timestamp_ms: get_u64(buf, 0),
            frame: CoordinateFrame {
                system: CoordinateSystem::try_from(get_u8(buf, 8))?,
                origin_zone: get_u32(buf, 12),
            },
            state: Pose {
                x: f(16),
                y: f(24),
                z_m: f(32),
                roll_rad: f(40),
                pitch_rad: f(48),
                yaw_rad: f(56),
            },
            uncertainty: PoseUncertainty {
                x: f(64),
                y: f(72),
                z_m2: f(80),
                roll_rad2: f(88),
                pitch_rad2: f(96),
                yaw_rad2: f(104),
            },
        })
    }
}

/// Vehicle's own localization estimate sent to the infrastructure
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleLocalization(pub LocalizationEstimate);

/// Infrastructure-sensed vehicle pose, fused on board like a GNSS fix
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InfrastructureLocalization(pub LocalizationEstimate);

impl StreamPayload for VehicleLocalization {
    const KIND: StreamKind = StreamKind::VehicleLocalization;

    fn encode_into(&self, buf: &mut [u8]) -> RecordResult<()> {
        self.0.encode(buf);
        Ok(())
    }

    fn decode_from(buf: &[u8]) -> RecordResult<Self> {
        check_len(buf, Self::KIND)?;
        LocalizationEstimate::decode(buf).map(Self)
    }
}

impl StreamPayload for InfrastructureLocalization {
    const KIND: StreamKind = StreamKind::InfrastructureLocalization;

    fn encode_into(&self, buf: &mut [u8]) -> RecordResult<()> {
        self.0.encode(buf);
        Ok(())
    }

    fn decode_from(buf: &[u8]) -> RecordResult<Self> {
        check_len(buf, Self::KIND)?;
        LocalizationEstimate::decode(buf).map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> LocalizationEstimate {
        LocalizationEstimate {
            timestamp_ms: 42,
            frame: CoordinateFrame {
                system: CoordinateSystem::Utm,
                origin_zone: 17,
            },
            state: Pose {
                x: 1.5,
                y: -2.25,
                z_m: 0.125,
                roll_rad: 0.01,
                pitch_rad: -0.02,
                yaw_rad: 3.1,
            },
            uncertainty: PoseUncertainty {
                x: 0.1,
                y: 0.2,
                z_m2: 0.3,
                roll_rad2: 0.4,
                pitch_rad2: 0.5,
                yaw_rad2: 0.6,
            },
        }
    }

    #[test]
    fn test_layout_offsets() {
        let record = InfrastructureLocalization(sample()).to_record().unwrap();
        let p = record.payload();

        assert_eq!(p.len(), 112);
        assert_eq!(p[8], 1);
        assert_eq!(&p[9..12], &[0, 0, 0]);
        assert_eq!(&p[12..16], &17u32.to_le_bytes());
        assert_eq!(&p[16..24], &1.5f64.to_le_bytes());
        assert_eq!(&p[104..112], &0.6f64.to_le_bytes());
    }

    #[test]
    fn test_decode_matches_encode() {
        let record = VehicleLocalization(sample()).to_record().unwrap();
        let decoded = VehicleLocalization::from_record(&record).unwrap();
        assert_eq!(decoded.0, sample());
    }

    #[test]
    fn test_invalid_coordinate_system() {
        let mut buf = [0u8; 112];
        buf[8] = 2;
        assert!(matches!(
            InfrastructureLocalization::decode_from(&buf),
            Err(RecordError::InvalidEnum { value: 2, .. })
        ));
    }
}
