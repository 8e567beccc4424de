//! Fuzz target for frame decoding.
//!
//! Tests that both decoders handle arbitrary input without panicking, and
//! that a clamped body never exceeds the bytes supplied.

#![no_main]

use bytes::Bytes;
use libfuzzer_sys::fuzz_target;
use msgwire_codec::{FrameCodec, FrameLimits, BIG_HEADER_SIZE, SMALL_HEADER_SIZE};

fuzz_target!(|data: &[u8]| {
    let codec = FrameCodec::default();

    if let Ok(frame) = codec.decode_small(Bytes::copy_from_slice(data)) {
        assert!(frame.body().len() <= data.len().saturating_sub(SMALL_HEADER_SIZE));
        assert!(frame.total_size() <= codec.limits().small_cap);
    }

    if let Ok(frame) = codec.decode_big(Bytes::copy_from_slice(data)) {
        assert!(frame.body().len() <= data.len().saturating_sub(BIG_HEADER_SIZE));
    }

    // Tight limits exercise the boundary checks.
    let tight = FrameCodec::new(FrameLimits::new(16, 16));
    let _ = tight.decode_small(Bytes::copy_from_slice(data));
    let _ = tight.decode_big(Bytes::copy_from_slice(data));
});
