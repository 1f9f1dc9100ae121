//! Decoding TTM JSON messages into canonical records
//!
//! Inbound messages come from the infrastructure, so every record produced
//! here carries the infrastructure stream source.

use serde_json::Value;
use tracing::debug;

use ttm_core::payload::{
    ClosestSlotResponse, CoordinateFrame, CoordinateSystem, InfrastructureHeartbeat,
    InfrastructureLocalization, LocalizationEstimate, Pose, PoseUncertainty, RouteMode, Routing,
    Waypoint, Wgs84Position, MAX_WAYPOINTS,
};
use ttm_core::{Record, RecordError, StreamPayload};

use crate::error::{ConvError, ConvResult};
use crate::fields::Fields;
use crate::msg_type::InboundMsg;

/// Decode one inbound message
///
/// `vehicle_id` fills the heartbeat's vehicle id when the message omits it.
pub fn decode(value: &Value, vehicle_id: u64) -> ConvResult<Record> {
    let fields = Fields::root(value)?;

    let tag = match fields.text("msg_type") {
        Ok(tag) => tag,
        Err(ConvError::MissingField(_)) => return Err(ConvError::MissingMsgType),
        Err(e) => return Err(e),
    };
    let msg = tag
        .parse::<u32>()
        .ok()
        .and_then(InboundMsg::from_code)
        .ok_or_else(|| ConvError::UnknownMsgType(tag.to_string()))?;

    debug!(msg = %msg, "Decoding TTM message");

    let record = match msg {
        InboundMsg::Heartbeat => decode_heartbeat(&fields, vehicle_id)?.to_record()?,
        InboundMsg::Localization => decode_localization(&fields)?.to_record()?,
        InboundMsg::Routing => decode_routing(&fields)?.to_record()?,
        InboundMsg::SlotResponse => decode_slot_response(&fields)?.to_record()?,
    };
    Ok(record)
}

fn decode_heartbeat(fields: &Fields<'_>, vehicle_id: u64) -> ConvResult<InfrastructureHeartbeat> {
    let vehicle_id = if fields.has("veh_id") {
        fields.parse("veh_id")?
    } else {
        vehicle_id
    };

    Ok(InfrastructureHeartbeat {
        timestamp_ms: fields.parse("timestamp")?,
        vehicle_id,
    })
}

/// Localization body, identical in both directions
fn decode_estimate(fields: &Fields<'_>) -> ConvResult<LocalizationEstimate> {
    let system: u8 = fields.parse("frame")?;

    Ok(LocalizationEstimate {
        timestamp_ms: fields.parse("meas_time")?,
        frame: CoordinateFrame {
            system: CoordinateSystem::try_from(system)?,
            origin_zone: fields.parse("zone")?,
        },
        state: Pose {
            x: fields.parse("X")?,
            y: fields.parse("Y")?,
            z_m: fields.parse("Z")?,
            roll_rad: fields.parse("roll")?,
            pitch_rad: fields.parse("pitch")?,
            yaw_rad: fields.parse("yaw")?,
        },
        uncertainty: PoseUncertainty {
            x: fields.parse("var_X")?,
            y: fields.parse("var_Y")?,
            z_m2: fields.parse("var_Z")?,
            roll_rad2: fields.parse("var_roll")?,
            pitch_rad2: fields.parse("var_pitch")?,
            yaw_rad2: fields.parse("var_yaw")?,
        },
    })
}

fn decode_localization(fields: &Fields<'_>) -> ConvResult<InfrastructureLocalization> {
    decode_estimate(fields).map(InfrastructureLocalization)
}

fn decode_routing(fields: &Fields<'_>) -> ConvResult<Routing> {
    let count: u16 = fields.parse("N")?;
    let count = usize::from(count);
    if count > MAX_WAYPOINTS {
        return Err(RecordError::TooManyWaypoints(count).into());
    }

    let mode: u8 = fields.parse("mode")?;

    let mut waypoints = Vec::with_capacity(count);
    for i in 0..count {
        let wp = fields.child(&i.to_string())?;
        waypoints.push(Waypoint {
            index: wp.parse("index")?,
            x: wp.parse("X")?,
            y: wp.parse("Y")?,
            z_m: wp.parse("Z")?,
            k: wp.parse("K")?,
            max_speed_mps: wp.parse("speed")?,
            lane_width_right_m: wp.parse("lanewidth_right")?,
            lane_width_left_m: wp.parse("lanewidth_left")?,
        });
    }

    Ok(Routing {
        timestamp_ms: fields.parse("timestamp")?,
        mode: RouteMode::try_from(mode)?,
        waypoints,
        destination_index: fields.parse("dest")?,
    })
}

fn decode_slot_response(fields: &Fields<'_>) -> ConvResult<ClosestSlotResponse> {
    let mut corners = [Wgs84Position::default(); 4];
    for (i, corner) in corners.iter_mut().enumerate() {
        let c = fields.child(&i.to_string())?;
        *corner = Wgs84Position {
            longitude_deg: c.parse("lon")?,
            latitude_deg: c.parse("lat")?,
        };
    }

    Ok(ClosestSlotResponse {
        timestamp_ms: fields.parse("timestamp")?,
        corners,
    })
}
