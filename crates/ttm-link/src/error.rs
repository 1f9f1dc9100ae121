//! Link layer errors

use std::net::SocketAddr;

use thiserror::Error;
use ttm_conv::ConvError;
use ttm_core::RecordError;

#[derive(Debug, Error)]
pub enum LinkError {
    /// Receive socket could not be set up; fatal at startup
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Binary datagram rejected
    #[error("Invalid record: {0}")]
    Record(#[from] RecordError),

    /// JSON datagram rejected or record not convertible
    #[error("Conversion failed: {0}")]
    Conv(#[from] ConvError),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type LinkResult<T> = Result<T, LinkError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProvisionError {
    #[error("Connection failed: {0}")]
    ConnectFailed(String),

    #[error("Send failed: {0}")]
    SendFailed(String),

    #[error("Receive failed: {0}")]
    ReceiveFailed(String),

    /// Server reply is not a usable port number
    #[error("Invalid port reply: {0:?}")]
    InvalidPort(String),

    #[error("Provisioning cancelled")]
    Cancelled,
}

pub type ProvisionResult<T> = Result<T, ProvisionError>;
