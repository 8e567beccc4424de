//! Big frames: size-only header, bounded by a sanity ceiling.
//!
//! The size field is a full 8-byte little-endian `i64`, filling the header.

use bytes::{BufMut, Bytes, BytesMut};

use crate::{CodecError, Result, BIG_HEADER_SIZE};

/// Decoded big-frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BigHeader {
    /// Header plus body length, as declared on the wire.
    pub total_size: i64,
}

impl BigHeader {
    /// Parses a header from the first 8 bytes of `buf` without a ceiling check.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::MalformedHeader`] if `buf` is too short.
    pub fn parse(buf: &[u8]) -> Result<Self> {
        let Some(raw) = buf.get(..BIG_HEADER_SIZE) else {
            return Err(CodecError::MalformedHeader {
                needed: BIG_HEADER_SIZE,
                available: buf.len(),
            });
        };
        let mut size = [0u8; BIG_HEADER_SIZE];
        size.copy_from_slice(raw);
        Ok(Self {
            total_size: i64::from_le_bytes(size),
        })
    }

    /// Number of body bytes the header announces.
    #[must_use]
    pub fn body_len(&self) -> usize {
        usize::try_from(self.total_size)
            .unwrap_or(0)
            .saturating_sub(BIG_HEADER_SIZE)
    }
}

/// A big frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BigFrame {
    total_size: i64,
    body: Bytes,
}

impl BigFrame {
    /// Creates a frame whose size field matches `body`.
    #[must_use]
    pub fn new(body: impl Into<Bytes>) -> Self {
        let body = body.into();
        Self {
            total_size: big_total_size(body.len()),
            body,
        }
    }

    /// Creates a frame from a decoded header and its body bytes.
    #[must_use]
    pub fn from_parts(header: BigHeader, body: Bytes) -> Self {
        Self {
            total_size: header.total_size,
            body,
        }
    }

    /// Declared total size (header + body).
    #[must_use]
    pub fn total_size(&self) -> i64 {
        self.total_size
    }

    /// Frame body.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Consumes the frame and returns its body.
    #[must_use]
    pub fn into_body(self) -> Bytes {
        self.body
    }

    /// Encodes the frame, recomputing the size field from the body.
    #[must_use]
    pub fn encode(&self) -> Bytes {
        encode_big(&self.body)
    }
}

/// Encodes a big frame: total size, body.
#[must_use]
pub fn encode_big(body: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(BIG_HEADER_SIZE + body.len());
    buf.put_i64_le(big_total_size(body.len()));
    buf.put_slice(body);
    buf.freeze()
}

fn big_total_size(body_len: usize) -> i64 {
    i64::try_from(BIG_HEADER_SIZE.saturating_add(body_len)).unwrap_or(i64::MAX)
}
