//! Encoding vehicle-origin records as TTM JSON messages

use serde_json::{Map, Value};
use tracing::{debug, warn};

use ttm_core::catalog;
use ttm_core::payload::{
    ClosestSlotRequest, LocalizationEstimate, RouteRequest, VehicleHeartbeat, VehicleLocalization,
};
use ttm_core::{Record, StreamKind, StreamPayload, StreamSource};

use crate::error::ConvResult;
use crate::fields::{float, text};
use crate::msg_type::OutboundMsg;

/// Encode one record for the TTM backend
///
/// Returns `None` for stream numbers with no outbound message; nothing is
/// sent for those. `vehicle_id` fills `veh_id` where the payload has none.
pub fn encode(record: &Record, vehicle_id: u64) -> ConvResult<Option<Value>> {
    let number = record.stream_number();
    let Some((kind, msg)) = catalog::lookup(StreamSource::FusionPc, number)
        .and_then(|desc| OutboundMsg::for_stream(desc.kind).map(|msg| (desc.kind, msg)))
    else {
        warn!(stream = number, "Unrecognized stream number, record not encoded");
        return Ok(None);
    };

    debug!(stream = number, "Encoding record for TTM");

    let mut obj = Map::new();
    obj.insert("msg_type".into(), text(msg.code()));

    match kind {
        StreamKind::VehicleHeartbeat => {
            let hb = VehicleHeartbeat::from_record(record)?;
            obj.insert("timestamp".into(), text(hb.timestamp_ms));
            obj.insert("veh_id".into(), text(hb.vehicle_id));
            obj.insert("status".into(), text(hb.status as u8));
        }
        StreamKind::VehicleLocalization => {
            let loc = VehicleLocalization::from_record(record)?;
            encode_estimate(&mut obj, &loc.0);
        }
        StreamKind::RouteRequest => {
            let req = RouteRequest::from_record(record)?;
            obj.insert("timestamp".into(), text(req.timestamp_ms));
            obj.insert("veh_id".into(), text(vehicle_id));
            obj.insert("type".into(), text(req.request_type as u8));
        }
        StreamKind::ClosestSlotRequest => {
            let req = ClosestSlotRequest::from_record(record)?;
            let pose = &req.reference_pose;
            obj.insert("timestamp".into(), text(req.timestamp_ms));
            obj.insert("veh_id".into(), text(vehicle_id));
            obj.insert("lon".into(), float(pose.position.longitude_deg));
            obj.insert("lat".into(), float(pose.position.latitude_deg));
            obj.insert("heading".into(), float(pose.heading_rad));
        }
        // for_stream only maps the four vehicle streams
        _ => return Ok(None),
    }

    Ok(Some(Value::Object(obj)))
}

fn encode_estimate(obj: &mut Map<String, Value>, est: &LocalizationEstimate) {
    let s = &est.state;
    let u = &est.uncertainty;
    let fields = [
        ("meas_time", text(est.timestamp_ms)),
        ("frame", text(est.frame.system as u8)),
        ("zone", text(est.frame.origin_zone)),
        ("X", float(s.x)),
        ("Y", float(s.y)),
        ("Z", float(s.z_m)),
        ("roll", float(s.roll_rad)),
        ("pitch", float(s.pitch_rad)),
        ("yaw", float(s.yaw_rad)),
        ("var_X", float(u.x)),
        ("var_Y", float(u.y)),
        ("var_Z", float(u.z_m2)),
        ("var_roll", float(u.roll_rad2)),
        ("var_pitch", float(u.pitch_rad2)),
        ("var_yaw", float(u.yaw_rad2)),
    ];
    for (key, value) in fields {
        obj.insert(key.into(), value);
    }
}
