//! Small frames: typed, capacity-capped.

use bytes::{BufMut, Bytes, BytesMut};

use crate::{CodecError, Result, SMALL_HEADER_SIZE};

/// Decoded small-frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmallHeader {
    /// Caller-defined message type.
    pub frame_type: i32,
    /// Header plus body length, as declared on the wire.
    pub total_size: i32,
}

impl SmallHeader {
    /// Parses a header from the first 8 bytes of `buf` without any cap check.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::MalformedHeader`] if `buf` is too short.
    pub fn parse(buf: &[u8]) -> Result<Self> {
        let Some(raw) = buf.get(..SMALL_HEADER_SIZE) else {
            return Err(CodecError::MalformedHeader {
                needed: SMALL_HEADER_SIZE,
                available: buf.len(),
            });
        };
        let (type_bytes, size_bytes) = raw.split_at(4);
        let mut frame_type = [0u8; 4];
        let mut total_size = [0u8; 4];
        frame_type.copy_from_slice(type_bytes);
        total_size.copy_from_slice(size_bytes);
        Ok(Self {
            frame_type: i32::from_le_bytes(frame_type),
            total_size: i32::from_le_bytes(total_size),
        })
    }

    /// Number of body bytes the header announces; zero if it declares no more
    /// than the header itself.
    #[must_use]
    pub fn body_len(&self) -> usize {
        usize::try_from(self.total_size)
            .unwrap_or(0)
            .saturating_sub(SMALL_HEADER_SIZE)
    }
}

/// A small frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    frame_type: i32,
    total_size: i32,
    body: Bytes,
}

impl Frame {
    /// Creates a frame whose size field matches `body`.
    #[must_use]
    pub fn new(frame_type: i32, body: impl Into<Bytes>) -> Self {
        let body = body.into();
        Self {
            frame_type,
            total_size: small_total_size(body.len()),
            body,
        }
    }

    /// Creates a frame from a decoded header and the body bytes read for it.
    ///
    /// `total_size` is kept as declared even when `body` was clamped.
    #[must_use]
    pub fn from_parts(header: SmallHeader, body: Bytes) -> Self {
        Self {
            frame_type: header.frame_type,
            total_size: header.total_size,
            body,
        }
    }

    /// Caller-defined message type.
    #[must_use]
    pub fn frame_type(&self) -> i32 {
        self.frame_type
    }

    /// Declared total size (header + body).
    #[must_use]
    pub fn total_size(&self) -> i32 {
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

    /// Returns the header of this frame.
    #[must_use]
    pub fn header(&self) -> SmallHeader {
        SmallHeader {
            frame_type: self.frame_type,
            total_size: self.total_size,
        }
    }

    /// Encodes the frame's type and body.
    ///
    /// The size field is recomputed from the body.
    #[must_use]
    pub fn encode(&self) -> Bytes {
        encode_small(self.frame_type, &self.body)
    }
}

/// Encodes a small frame: type, total size, body.
///
/// The capacity cap is not enforced here; callers that need the result to
/// decode must keep `8 + body.len()` within the receiver's cap.
#[must_use]
pub fn encode_small(frame_type: i32, body: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(SMALL_HEADER_SIZE + body.len());
    buf.put_i32_le(frame_type);
    buf.put_i32_le(small_total_size(body.len()));
    buf.put_slice(body);
    buf.freeze()
}

// Saturates rather than wrapping for bodies beyond i32 range.
fn small_total_size(body_len: usize) -> i32 {
    i32::try_from(SMALL_HEADER_SIZE.saturating_add(body_len)).unwrap_or(i32::MAX)
}
