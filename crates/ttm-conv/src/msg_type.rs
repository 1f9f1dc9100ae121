//! `msg_type` tag space
//!
//! Inbound (infrastructure → vehicle) and outbound (vehicle → infrastructure)
//! messages use disjoint codes: the two directions carry different schemas.

use std::fmt;

use ttm_core::StreamKind;

/// Messages the TTM backend sends to the vehicle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundMsg {
    Heartbeat,
    Localization,
    Routing,
    SlotResponse,
}

impl InboundMsg {
    pub const ALL: [InboundMsg; 4] = [
        InboundMsg::Heartbeat,
        InboundMsg::Localization,
        InboundMsg::Routing,
        InboundMsg::SlotResponse,
    ];

    pub fn code(self) -> u32 {
        match self {
            InboundMsg::Heartbeat => 1,
            InboundMsg::Localization => 2,
            InboundMsg::Routing => 3,
            InboundMsg::SlotResponse => 4,
        }
    }

    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.code() == code)
    }

    /// Catalog stream the message decodes into
    pub fn stream(self) -> StreamKind {
        match self {
            InboundMsg::Heartbeat => StreamKind::InfrastructureHeartbeat,
            InboundMsg::Localization => StreamKind::InfrastructureLocalization,
            InboundMsg::Routing => StreamKind::Routing,
            InboundMsg::SlotResponse => StreamKind::ClosestSlotResponse,
        }
    }
}

impl fmt::Display for InboundMsg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InboundMsg::Heartbeat => "heartbeat",
            InboundMsg::Localization => "localization",
            InboundMsg::Routing => "routing",
            InboundMsg::SlotResponse => "slot response",
        };
        f.write_str(name)
    }
}

/// Messages the vehicle sends to the TTM backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutboundMsg {
    Heartbeat,
    Localization,
    RouteRequest,
    SlotRequest,
}

impl OutboundMsg {
    pub fn code(self) -> u32 {
        match self {
            OutboundMsg::Heartbeat => 101,
            OutboundMsg::Localization => 102,
            OutboundMsg::RouteRequest => 103,
            OutboundMsg::SlotRequest => 104,
        }
    }

    /// Outbound message for a vehicle-origin stream, if it has one
    pub fn for_stream(kind: StreamKind) -> Option<Self> {
        match kind {
            StreamKind::VehicleHeartbeat => Some(OutboundMsg::Heartbeat),
            StreamKind::VehicleLocalization => Some(OutboundMsg::Localization),
            StreamKind::RouteRequest => Some(OutboundMsg::RouteRequest),
            StreamKind::ClosestSlotRequest => Some(OutboundMsg::SlotRequest),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inbound_codes() {
        for msg in InboundMsg::ALL {
            assert_eq!(InboundMsg::from_code(msg.code()), Some(msg));
        }
        assert_eq!(InboundMsg::from_code(0), None);
        assert_eq!(InboundMsg::from_code(101), None);
    }

    #[test]
    fn test_outbound_only_for_vehicle_streams() {
        assert_eq!(
            OutboundMsg::for_stream(StreamKind::RouteRequest),
            Some(OutboundMsg::RouteRequest)
        );
        assert_eq!(OutboundMsg::for_stream(StreamKind::Routing), None);
    }
}
