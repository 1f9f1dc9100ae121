//! Error types for record conversion

use thiserror::Error;
use ttm_core::RecordError;

/// Errors that can occur converting between records and JSON messages
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConvError {
    /// Datagram is not a JSON object
    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    /// Object has no `msg_type`
    #[error("missing msg_type")]
    MissingMsgType,

    /// `msg_type` is not a known inbound message
    #[error("unknown msg_type: {0}")]
    UnknownMsgType(String),

    /// Required field absent; nested fields use a dotted path (`"0.X"`)
    #[error("missing field: {0}")]
    MissingField(String),

    /// Field present but not a decimal string of the expected type
    #[error("invalid field {field}: {value}")]
    InvalidField { field: String, value: String },

    /// Payload could not be built or read
    #[error("record error: {0}")]
    Record(#[from] RecordError),
}

impl From<serde_json::Error> for ConvError {
    fn from(err: serde_json::Error) -> Self {
        ConvError::InvalidJson(err.to_string())
    }
}

/// Result type for conversion operations
pub type ConvResult<T> = Result<T, ConvError>;
