//! End-to-end relay tests
//!
//! A real gateway is started on loopback with ephemeral ports. Two plain UDP
//! sockets play the Mabx and the TTM backend.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use serde_json::{json, Value};
use tokio::net::UdpSocket;
use ttm_core::payload::{
    InfrastructureHeartbeat, RequestType, RouteRequest, Routing, VehicleHeartbeat, VehicleStatus,
};
use ttm_core::{Record, StreamPayload, StreamSource, VERSION_INFO};
use ttm_link::{shutdown, Gateway, GatewayConfig, ShutdownTrigger, TtmPorts};

const WAIT: Duration = Duration::from_secs(2);

// =============================================================================
// Harness
// =============================================================================

struct Harness {
    gateway: Gateway,
    trigger: ShutdownTrigger,
    /// Stands in for the Mabx
    mabx: UdpSocket,
    /// Stands in for the TTM backend
    ttm: UdpSocket,
}

impl Harness {
    async fn start() -> Self {
        let mabx = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let ttm = UdpSocket::bind("127.0.0.1:0").await.unwrap();

        let mut config = GatewayConfig::default();
        config.mabx.rx_port = 0;
        config.mabx.tx_address = IpAddr::V4(Ipv4Addr::LOCALHOST);
        config.mabx.tx_port = mabx.local_addr().unwrap().port();
        config.ttm.host = IpAddr::V4(Ipv4Addr::LOCALHOST);

        let ports = TtmPorts {
            rx_port: 0,
            tx_port: ttm.local_addr().unwrap().port(),
        };

        let (trigger, listener) = shutdown::channel();
        let gateway = Gateway::start(&config, ports, listener).unwrap();

        Self {
            gateway,
            trigger,
            mabx,
            ttm,
        }
    }

    fn gateway_mabx_port(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::LOCALHOST, self.gateway.mabx_addr().port()))
    }

    fn gateway_ttm_port(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::LOCALHOST, self.gateway.ttm_addr().port()))
    }

    async fn mabx_sends(&self, record: &Record) {
        self.mabx
            .send_to(&record.to_wire(), self.gateway_mabx_port())
            .await
            .unwrap();
    }

    async fn ttm_sends(&self, msg: &Value) {
        self.ttm
            .send_to(&serde_json::to_vec(msg).unwrap(), self.gateway_ttm_port())
            .await
            .unwrap();
    }

    async fn ttm_receives(&self) -> Value {
        let mut buf = vec![0u8; 65536];
        let (len, _) = tokio::time::timeout(WAIT, self.ttm.recv_from(&mut buf))
            .await
            .expect("TTM side received nothing")
            .unwrap();
        serde_json::from_slice(&buf[..len]).unwrap()
    }

    async fn mabx_receives(&self) -> Record {
        let mut buf = vec![0u8; 65536];
        let (len, _) = tokio::time::timeout(WAIT, self.mabx.recv_from(&mut buf))
            .await
            .expect("Mabx side received nothing")
            .unwrap();
        Record::from_wire(&buf[..len]).unwrap()
    }

    async fn stop(self) {
        self.trigger.trigger();
        assert!(self.gateway.join(WAIT).await, "endpoint tasks did not stop");
    }
}

fn vehicle_heartbeat(ts: u64, status: VehicleStatus) -> Record {
    VehicleHeartbeat {
        timestamp_ms: ts,
        vehicle_id: 199,
        status,
    }
    .to_record()
    .unwrap()
}

// =============================================================================
// Mabx → TTM
// =============================================================================

#[tokio::test]
async fn test_vehicle_heartbeat_reaches_ttm_as_json() {
    let h = Harness::start().await;

    h.mabx_sends(&vehicle_heartbeat(1000, VehicleStatus::Ready)).await;

    let msg = h.ttm_receives().await;
    assert_eq!(
        msg,
        json!({"msg_type": "101", "timestamp": "1000", "veh_id": "199", "status": "1"})
    );

    h.stop().await;
}

#[tokio::test]
async fn test_route_request_reaches_ttm() {
    let h = Harness::start().await;

    let request = RouteRequest {
        timestamp_ms: 55,
        request_type: RequestType::Park,
    }
    .to_record()
    .unwrap();
    h.mabx_sends(&request).await;

    let msg = h.ttm_receives().await;
    assert_eq!(msg["msg_type"], json!("103"));
    assert_eq!(msg["type"], json!("0"));
    assert_eq!(msg["veh_id"], json!("199"));

    h.stop().await;
}

#[tokio::test]
async fn test_infrastructure_record_from_mabx_not_forwarded() {
    let h = Harness::start().await;

    let infra = InfrastructureHeartbeat {
        timestamp_ms: 1,
        vehicle_id: 199,
    }
    .to_record()
    .unwrap();
    h.mabx_sends(&infra).await;
    h.mabx_sends(&vehicle_heartbeat(2, VehicleStatus::Parked)).await;

    // Only the vehicle record comes out, and it is the first datagram
    let msg = h.ttm_receives().await;
    assert_eq!(msg["timestamp"], json!("2"));
    assert_eq!(h.gateway.ttm_stats().skipped, 1);

    h.stop().await;
}

#[tokio::test]
async fn test_malformed_mabx_datagram_dropped() {
    let h = Harness::start().await;

    h.mabx
        .send_to(&[0xA1, 0x18, 0x00], h.gateway_mabx_port())
        .await
        .unwrap();
    h.mabx_sends(&vehicle_heartbeat(3, VehicleStatus::Standby)).await;

    let msg = h.ttm_receives().await;
    assert_eq!(msg["timestamp"], json!("3"));
    assert_eq!(h.gateway.mabx_stats().rejected, 1);

    h.stop().await;
}

// =============================================================================
// TTM → Mabx
// =============================================================================

#[tokio::test]
async fn test_ttm_heartbeat_reaches_mabx_as_record() {
    let h = Harness::start().await;

    h.ttm_sends(&json!({"msg_type": "1", "timestamp": "1000"})).await;

    let record = h.mabx_receives().await;
    let header = record.header();
    assert_eq!(header.version_info, VERSION_INFO);
    assert_eq!(header.source_info, u8::from(StreamSource::Infrastructure));
    assert_eq!(header.stream_number, 5);
    assert_eq!(header.stream_data_length, 16);
    assert_eq!(header.source_tx_count, 0);
    assert_ne!(header.source_tx_time_ms, 0);

    let hb = InfrastructureHeartbeat::from_record(&record).unwrap();
    assert_eq!(hb.timestamp_ms, 1000);
    assert_eq!(hb.vehicle_id, 199);

    h.stop().await;
}

#[tokio::test]
async fn test_ttm_routing_reaches_mabx() {
    let h = Harness::start().await;

    h.ttm_sends(&json!({
        "msg_type": "3", "timestamp": "42", "mode": "1", "N": "2", "dest": "1",
        "0": {"index": "0", "X": "1.5", "Y": "2.5", "Z": "0", "K": "0",
              "speed": "3", "lanewidth_right": "1.5", "lanewidth_left": "1.5"},
        "1": {"index": "1", "X": "4.25", "Y": "5.75", "Z": "0", "K": "0.1",
              "speed": "2", "lanewidth_right": "1.5", "lanewidth_left": "1.5"}
    }))
    .await;

    let record = h.mabx_receives().await;
    assert_eq!(record.to_wire().len(), 24 + 16344);

    let route = Routing::from_record(&record).unwrap();
    assert_eq!(route.waypoints.len(), 2);
    assert_eq!((route.waypoints[1].x, route.waypoints[1].y), (4.25, 5.75));

    h.stop().await;
}

#[tokio::test]
async fn test_counter_increments_per_record() {
    let h = Harness::start().await;

    for ts in 0..3 {
        h.ttm_sends(&json!({"msg_type": "1", "timestamp": ts.to_string()}))
            .await;
    }

    for expected in 0u16..3 {
        let record = h.mabx_receives().await;
        assert_eq!(record.header().source_tx_count, expected);
        assert_eq!(record.header().stream_ref_index, u32::from(expected));
    }

    h.stop().await;
}

#[tokio::test]
async fn test_bad_json_dropped_and_relay_continues() {
    let h = Harness::start().await;

    h.ttm
        .send_to(b"{\"msg_type\":", h.gateway_ttm_port())
        .await
        .unwrap();
    h.ttm_sends(&json!({"msg_type": "77", "timestamp": "1"})).await;
    h.ttm_sends(&json!({"msg_type": "1"})).await;
    h.ttm_sends(&json!({"msg_type": "1", "timestamp": "9"})).await;

    let record = h.mabx_receives().await;
    assert_eq!(
        InfrastructureHeartbeat::from_record(&record)
            .unwrap()
            .timestamp_ms,
        9
    );
    assert_eq!(h.gateway.ttm_stats().rejected, 3);

    h.stop().await;
}
