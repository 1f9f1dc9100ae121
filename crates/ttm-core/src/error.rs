//! Error types for record framing and payload schemas

use thiserror::Error;

/// Errors raised while framing or interpreting records
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// Datagram shorter than the fixed header or the declared payload
    #[error("record too short: expected {expected} bytes, got {actual}")]
    TooShort { expected: usize, actual: usize },

    /// Declared payload length exceeds the fixed payload capacity
    #[error("stream data length {0} exceeds payload capacity")]
    LengthExceedsCapacity(usize),

    /// No catalog entry for this (source, stream number) pair
    #[error("unknown stream: source {stream_source}, number {number}")]
    UnknownStream { stream_source: u8, number: u8 },

    /// Payload length does not match the catalog entry
    #[error("payload size mismatch for stream {number}: expected {expected}, got {actual}")]
    PayloadSize {
        number: u8,
        expected: usize,
        actual: usize,
    },

    /// Enumerated field holds a value outside its defined set
    #[error("invalid {field} value: {value}")]
    InvalidEnum { field: &'static str, value: u8 },

    /// Routing payload declares more waypoints than it can carry
    #[error("too many waypoints: {0} (max 255)")]
    TooManyWaypoints(usize),
}

/// Result type for record operations
pub type RecordResult<T> = Result<T, RecordError>;
