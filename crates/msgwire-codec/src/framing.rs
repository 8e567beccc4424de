//! Framing abstraction over the two frame variants.
//!
//! Readers that assemble frames from a stream need the header size up front,
//! then how many body bytes the header announces, then a way to build the
//! final frame. [`Framing`] captures exactly that, so a single reader can
//! reassemble either variant.

use bytes::Bytes;

use crate::{
    BigFrame, BigHeader, Frame, FrameCodec, Result, SmallHeader, BIG_HEADER_SIZE,
    SMALL_HEADER_SIZE,
};

/// A frame variant as seen by a stream reader.
pub trait Framing {
    /// Parsed header type.
    type Header: Copy + std::fmt::Debug;
    /// Assembled frame type.
    type Frame;

    /// Fixed header size in bytes.
    const HEADER_SIZE: usize;

    /// Parses a complete header and applies the codec's limits.
    ///
    /// # Errors
    ///
    /// Propagates [`crate::CodecError`] from the header decoder.
    fn decode_header(codec: &FrameCodec, buf: &[u8]) -> Result<Self::Header>;

    /// Body bytes still to read after the header.
    fn body_len(header: &Self::Header) -> usize;

    /// Builds a frame from its header and body.
    fn assemble(header: Self::Header, body: Bytes) -> Self::Frame;
}

/// Small-frame variant (type + size header).
#[derive(Debug, Clone, Copy, Default)]
pub struct SmallFraming;

impl Framing for SmallFraming {
    type Header = SmallHeader;
    type Frame = Frame;

    const HEADER_SIZE: usize = SMALL_HEADER_SIZE;

    fn decode_header(codec: &FrameCodec, buf: &[u8]) -> Result<SmallHeader> {
        codec.decode_small_header(buf)
    }

    fn body_len(header: &SmallHeader) -> usize {
        header.body_len()
    }

    fn assemble(header: SmallHeader, body: Bytes) -> Frame {
        Frame::from_parts(header, body)
    }
}

/// Big-frame variant (size-only header).
#[derive(Debug, Clone, Copy, Default)]
pub struct BigFraming;

impl Framing for BigFraming {
    type Header = BigHeader;
    type Frame = BigFrame;

    const HEADER_SIZE: usize = BIG_HEADER_SIZE;

    fn decode_header(codec: &FrameCodec, buf: &[u8]) -> Result<BigHeader> {
        codec.decode_big_header(buf)
    }

    fn body_len(header: &BigHeader) -> usize {
        header.body_len()
    }

    fn assemble(header: BigHeader, body: Bytes) -> BigFrame {
        BigFrame::from_parts(header, body)
    }
}
