//! Codec error types.

use thiserror::Error;

/// Errors that can occur while decoding a frame.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// The header declares a total size above the applicable limit.
    #[error("frame over capacity: declared {declared} bytes (max {cap})")]
    OverCapacity {
        /// The declared total size.
        declared: i64,
        /// The limit that was exceeded.
        cap: i64,
    },

    /// Fewer bytes than a complete header were supplied.
    #[error("malformed header: need {needed} bytes, got {available}")]
    MalformedHeader {
        /// The fixed header size.
        needed: usize,
        /// The bytes actually available.
        available: usize,
    },
}

/// A specialized Result type for codec operations.
pub type Result<T> = std::result::Result<T, CodecError>;
