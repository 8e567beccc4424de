//! Transport error types.

use std::net::SocketAddr;
use std::time::Duration;

use msgwire_codec::CodecError;
use thiserror::Error;

/// Errors that can occur during a request/response exchange.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The connection could not be established.
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        /// The address that was dialed.
        addr: SocketAddr,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Writing the request failed.
    #[error("write failed: {0}")]
    Write(#[source] std::io::Error),

    /// Reading the response failed.
    #[error("read failed: {0}")]
    Read(#[source] std::io::Error),

    /// The response header was rejected by the codec.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// The stream ended before the announced body was complete.
    #[error("response truncated: expected {expected} body bytes, received {received}")]
    Truncated {
        /// Body bytes announced by the header.
        expected: usize,
        /// Body bytes received before end-of-stream.
        received: usize,
    },

    /// The exchange deadline passed.
    #[error("deadline exceeded after {elapsed:?}")]
    DeadlineExceeded {
        /// Time spent in the exchange.
        elapsed: Duration,
    },

    /// The exchange was cancelled through its token.
    #[error("exchange cancelled")]
    Cancelled,

    /// Configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Configuration values are out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl TransportError {
    /// Returns `true` if the error came from the underlying stream rather than
    /// from the protocol or the caller's controls.
    #[must_use]
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Connect { .. } | Self::Write(_) | Self::Read(_))
    }
}

/// A specialized Result type for transport operations.
pub type Result<T> = std::result::Result<T, TransportError>;
