//! Routing streams: route request (vehicle 142) and route (infrastructure 11)
//!
//! Route layout, 16344 bytes:
//!
//! ```text
//!      0  timestamp_ms              u64
//!      8  mode                      u8  (+1 padding)
//!     10  number of waypoints       u16 (+4 padding)
//!     16  waypoints                 255 x 64 bytes
//!  16336  destination index         i32 (+4 padding)
//! ```
//!
//! Waypoint layout: index i32 (+4 padding), then x, y, z, k, max speed,
//! right lane width, left lane width as f64.

use super::{
    check_len, get_f64, get_i32, get_u16, get_u64, get_u8, put_f64, put_i32, put_u16, put_u64,
    put_u8, StreamPayload,
};
use crate::catalog::StreamKind;
use crate::error::{RecordError, RecordResult};

/// Maximum waypoints a route can carry
pub const MAX_WAYPOINTS: usize = 255;

const WAYPOINTS_OFFSET: usize = 16;
const WAYPOINT_SIZE: usize = 64;
const DESTINATION_OFFSET: usize = WAYPOINTS_OFFSET + MAX_WAYPOINTS * WAYPOINT_SIZE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RouteMode {
    Startup = 0,
    Drive = 1,
    Park = 2,
    Stop = 3,
    Shutdown = 4,
}

impl TryFrom<u8> for RouteMode {
    type Error = RecordError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Startup),
            1 => Ok(Self::Drive),
            2 => Ok(Self::Park),
            3 => Ok(Self::Stop),
            4 => Ok(Self::Shutdown),
            other => Err(RecordError::InvalidEnum {
                field: "route mode",
                value: other,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RequestType {
    Park = 0,
    Summon = 1,
}

impl TryFrom<u8> for RequestType {
    type Error = RecordError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Park),
            1 => Ok(Self::Summon),
            other => Err(RecordError::InvalidEnum {
                field: "request type",
                value: other,
            }),
        }
    }
}

/// Single routing waypoint, in the localization coordinate frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Waypoint {
    pub index: i32,
    pub x: f64,
    pub y: f64,
    pub z_m: f64,
    /// Path curvature, 1/m
    pub k: f64,
    pub max_speed_mps: f64,
    pub lane_width_right_m: f64,
    pub lane_width_left_m: f64,
}

impl Waypoint {
    fn encode(&self, buf: &mut [u8], off: usize) {
        put_i32(buf, off, self.index);
        let fields = [
            self.x,
            self.y,
            self.z_m,
            self.k,
            self.max_speed_mps,
            self.lane_width_right_m,
            self.lane_width_left_m,
        ];
        for (i, v) in fields.into_iter().enumerate() {
            put_f64(buf, off + 8 + i * 8, v);
        }
    }

    fn decode(buf: &[u8], off: usize) -> Self {
        Self {
            index: get_i32(buf, off),
            x: get_f64(buf, off + 8),
            y: get_f64(buf, off + 16),
            z_m: get_f64(buf, off + 24),
            k: get_f64(buf, off + 32),
            max_speed_mps: get_f64(buf, off + 40),
            lane_width_right_m: get_f64(buf, off + 48),
            lane_width_left_m: get_f64(buf, off + 56),
        }
    }
}

/// Vehicle asks the infrastructure for a route (stream 142, 16 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteRequest {
    pub timestamp_ms: u64,
    pub request_type: RequestType,
}

impl StreamPayload for RouteRequest {
    const KIND: StreamKind = StreamKind::RouteRequest;

    fn encode_into(&self, buf: &mut [u8]) -> RecordResult<()> {
        put_u64(buf, 0, self.timestamp_ms);
        put_u8(buf, 8, self.request_type as u8);
        Ok(())
    }

    fn decode_from(buf: &[u8]) -> RecordResult<Self> {
        check_len(buf, Self::KIND)?;
        Ok(Self {
            timestamp_ms: get_u64(buf, 0),
            request_type: RequestType::try_from(get_u8(buf, 8))?,
        })
    }
}

/// Route sent to the vehicle after a request (stream 11)
#[derive(Debug, Clone, PartialEq)]
pub struct Routing {
    pub timestamp_ms: u64,
    pub mode: RouteMode,
    /// Valid waypoints only; at most [`MAX_WAYPOINTS`]
    pub waypoints: Vec<Waypoint>,
    /// Index of the waypoint marking the destination
    pub destination_index: i32,
}

impl StreamPayload for Routing {
    const KIND: StreamKind = StreamKind::Routing;

    fn encode_into(&self, buf: &mut [u8]) -> RecordResult<()> {
        if self.waypoints.len() > MAX_WAYPOINTS {
            return Err(RecordError::TooManyWaypoints(self.waypoints.len()));
        }

        put_u64(buf, 0, self.timestamp_ms);
        put_u8(buf, 8, self.mode as u8);
        put_u16(buf, 10, self.waypoints.len() as u16);
        for (i, wp) in self.waypoints.iter().enumerate() {
            wp.encode(buf, WAYPOINTS_OFFSET + i * WAYPOINT_SIZE);
        }
        put_i32(buf, DESTINATION_OFFSET, self.destination_index);
        Ok(())
    }

    fn decode_from(buf: &[u8]) -> RecordResult<Self> {
        check_len(buf, Self::KIND)?;

        let count = get_u16(buf, 10) as usize;
        if count > MAX_WAYPOINTS {
            return Err(RecordError::TooManyWaypoints(count));
        }

        let waypoints = (0..count)
            .map(|i| Waypoint::decode(buf, WAYPOINTS_OFFSET + i * WAYPOINT_SIZE))
            .collect();

        Ok(Self {
            timestamp_ms: get_u64(buf, 0),
            mode: RouteMode::try_from(get_u8(buf, 8))?,
            waypoints,
            destination_index: get_i32(buf, DESTINATION_OFFSET),
        })
    }
}
