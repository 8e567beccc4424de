//! # msgwire Codec
//!
//! Wire format for msgwire frames.
//!
//! Two frame variants share an 8-byte header:
//!
//! ```text
//! small: | type: i32 LE | total_size: i32 LE | body ... |
//! big:   |      total_size: i64 LE           | body ... |
//! ```
//!
//! `total_size` always counts the header itself, so a header-only frame
//! declares a size of 8. Small frames are bounded by a configurable capacity
//! cap (1024 bytes by default); big frames only by a sanity ceiling.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod big;
mod error;
mod framing;
mod limits;
mod small;

pub use big::{encode_big, BigFrame, BigHeader};
pub use error::{CodecError, Result};
pub use framing::{BigFraming, Framing, SmallFraming};
pub use limits::{FrameLimits, DEFAULT_BIG_CEILING, DEFAULT_SMALL_CAP};
pub use small::{encode_small, Frame, SmallHeader};

use bytes::{BufMut, Bytes, BytesMut};

/// Header size of a small frame in bytes (type + size).
pub const SMALL_HEADER_SIZE: usize = 8;

/// Header size of a big frame in bytes (size only).
pub const BIG_HEADER_SIZE: usize = 8;

/// Decoder for both frame variants, bound to a set of [`FrameLimits`].
///
/// Encoding is a total function and does not need limits, see
/// [`encode_small`] and [`encode_big`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameCodec {
    limits: FrameLimits,
}

impl FrameCodec {
    /// Creates a codec enforcing the given limits.
    #[must_use]
    pub fn new(limits: FrameLimits) -> Self {
        Self { limits }
    }

    /// Returns the limits this codec enforces.
    #[must_use]
    pub fn limits(&self) -> &FrameLimits {
        &self.limits
    }

    /// Parses a small-frame header and checks it against the capacity cap.
    ///
    /// Only the first [`SMALL_HEADER_SIZE`] bytes of `buf` are inspected.
    ///
    /// # Errors
    ///
    /// [`CodecError::MalformedHeader`] if `buf` is shorter than a header,
    /// [`CodecError::OverCapacity`] if the declared size exceeds the cap.
    pub fn decode_small_header(&self, buf: &[u8]) -> Result<SmallHeader> {
        let header = SmallHeader::parse(buf)?;
        let cap = self.limits.small_cap;
        if header.total_size > cap {
            return Err(CodecError::OverCapacity {
                declared: i64::from(header.total_size),
                cap: i64::from(cap),
            });
        }
        Ok(header)
    }

    /// Decodes a small frame.
    ///
    /// The body aliases `data`. If fewer body bytes are present than the
    /// header declares, the body is clamped to the bytes actually available;
    /// a short buffer is not an error.
    ///
    /// # Errors
    ///
    /// See [`FrameCodec::decode_small_header`].
    pub fn decode_small(&self, data: Bytes) -> Result<Frame> {
        let header = self.decode_small_header(&data)?;
        let body = clamped_body(&data, SMALL_HEADER_SIZE, header.body_len());
        Ok(Frame::from_parts(header, body))
    }

    /// Parses a big-frame header and checks it against the sanity ceiling.
    ///
    /// # Errors
    ///
    /// [`CodecError::MalformedHeader`] if `buf` is shorter than a header,
    /// [`CodecError::OverCapacity`] if the declared size exceeds the ceiling.
    pub fn decode_big_header(&self, buf: &[u8]) -> Result<BigHeader> {
        let header = BigHeader::parse(buf)?;
        let ceiling = self.limits.big_ceiling;
        if header.total_size > ceiling {
            return Err(CodecError::OverCapacity {
                declared: header.total_size,
                cap: ceiling,
            });
        }
        Ok(header)
    }

    /// Decodes a big frame, clamping the body like [`FrameCodec::decode_small`].
    ///
    /// # Errors
    ///
    /// See [`FrameCodec::decode_big_header`].
    pub fn decode_big(&self, data: Bytes) -> Result<BigFrame> {
        let header = self.decode_big_header(&data)?;
        let body = clamped_body(&data, BIG_HEADER_SIZE, header.body_len());
        Ok(BigFrame::from_parts(header, body))
    }
}

/// Concatenates two byte sequences into a fresh buffer.
///
/// Neither input is modified.
#[must_use]
pub fn concat(a: &[u8], b: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(a.len() + b.len());
    buf.put_slice(a);
    buf.put_slice(b);
    buf.freeze()
}

/// Slices at most `want` body bytes following a `header_len` prefix.
fn clamped_body(data: &Bytes, header_len: usize, want: usize) -> Bytes {
    if want == 0 {
        return Bytes::new();
    }
    let available = data.len().saturating_sub(header_len);
    let take = want.min(available);
    data.slice(header_len..header_len + take)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn small_header(frame_type: i32, total_size: i32) -> Vec<u8> {
        let mut buf = frame_type.to_le_bytes().to_vec();
        buf.extend_from_slice(&total_size.to_le_bytes());
        buf
    }

    #[test]
    fn encode_small_wire_layout() {
        let encoded = encode_small(7, &[0x41, 0x42]);
        assert_eq!(
            encoded.as_ref(),
            &[0x07, 0, 0, 0, 0x0A, 0, 0, 0, 0x41, 0x42]
        );
    }

    #[test]
    fn decode_small_scenario() {
        let codec = FrameCodec::default();
        let frame = codec
            .decode_small(Bytes::from_static(&[0x07, 0, 0, 0, 0x0A, 0, 0, 0, 0x41, 0x42]))
            .unwrap();
        assert_eq!(frame.frame_type(), 7);
        assert_eq!(frame.total_size(), 10);
        assert_eq!(frame.body().as_ref(), &[0x41, 0x42]);
    }

    #[test]
    fn decode_small_over_capacity() {
        let codec = FrameCodec::default();
        let mut data = small_header(1, 2000);
        data.extend_from_slice(&[0u8; 16]);

        let result = codec.decode_small(Bytes::from(data));
        assert!(matches!(
            result,
            Err(CodecError::OverCapacity {
                declared: 2000,
                cap: 1024
            })
        ));
    }

    #[test]
    fn decode_small_cap_boundary() {
        let codec = FrameCodec::new(FrameLimits::new(16, DEFAULT_BIG_CEILING));

        let at_cap = encode_small(1, &[0u8; 8]);
        assert_eq!(codec.decode_small(at_cap).unwrap().body().len(), 8);

        let over_cap = encode_small(1, &[0u8; 9]);
        assert!(matches!(
            codec.decode_small(over_cap),
            Err(CodecError::OverCapacity { declared: 17, cap: 16 })
        ));
    }

    #[test]
    fn decode_small_clamps_short_body() {
        let codec = FrameCodec::default();
        let mut data = small_header(3, 8 + 100);
        data.extend_from_slice(b"only five");

        let frame = codec.decode_small(Bytes::from(data)).unwrap();
        assert_eq!(frame.total_size(), 108);
        assert_eq!(frame.body().as_ref(), b"only five");
    }

    #[test]
    fn decode_small_ignores_trailing_bytes() {
        let codec = FrameCodec::default();
        let mut data = encode_small(9, b"abc").to_vec();
        data.extend_from_slice(b"next frame");

        let frame = codec.decode_small(Bytes::from(data)).unwrap();
        assert_eq!(frame.body().as_ref(), b"abc");
    }

    #[test]
    fn decode_small_header_only() {
        let codec = FrameCodec::default();
        let frame = codec.decode_small(Bytes::from(small_header(5, 8))).unwrap();
        assert_eq!(frame.frame_type(), 5);
        assert_eq!(frame.total_size(), 8);
        assert!(frame.body().is_empty());
    }

    #[test]
    fn decode_small_undersized_total_is_empty_body() {
        let codec = FrameCodec::default();
        let mut data = small_header(5, -40);
        data.extend_from_slice(b"ignored");

        let frame = codec.decode_small(Bytes::from(data)).unwrap();
        assert_eq!(frame.total_size(), -40);
        assert!(frame.body().is_empty());
    }

    #[test]
    fn decode_small_malformed_header() {
        let codec = FrameCodec::default();
        let result = codec.decode_small(Bytes::from_static(&[1, 0, 0]));
        assert!(matches!(
            result,
            Err(CodecError::MalformedHeader {
                needed: 8,
                available: 3
            })
        ));
    }

    #[test]
    fn big_roundtrip() {
        let codec = FrameCodec::default();
        let body = vec![0xAB; 5000];
        let frame = codec.decode_big(encode_big(&body)).unwrap();
        assert_eq!(frame.total_size(), 5008);
        assert_eq!(frame.body().as_ref(), body.as_slice());
    }

    #[test]
    fn big_wire_layout_uses_eight_byte_size() {
        let encoded = encode_big(b"hi");
        assert_eq!(encoded.as_ref(), &[10, 0, 0, 0, 0, 0, 0, 0, b'h', b'i']);
    }

    #[test]
    fn big_over_ceiling() {
        let codec = FrameCodec::default();
        let declared = i64::from(i32::MAX) + 1;
        let result = codec.decode_big(Bytes::from(declared.to_le_bytes().to_vec()));
        assert!(matches!(result, Err(CodecError::OverCapacity { .. })));
    }

    #[test]
    fn big_not_bound_by_small_cap() {
        let codec = FrameCodec::default();
        let body = vec![1u8; DEFAULT_SMALL_CAP as usize * 4];
        assert!(codec.decode_big(encode_big(&body)).is_ok());
    }

    #[test]
    fn concat_joins_slices() {
        let joined = concat(b"head", b"tail");
        assert_eq!(joined.as_ref(), b"headtail");
        assert!(concat(&[], &[]).is_empty());
    }
}
