//! Fuzz target for response reassembly.
//!
//! Feeds an arbitrary byte stream, split at arbitrary points, through an
//! exchange and checks that the driver either fails cleanly or returns a
//! frame whose body matches the announced size.

#![no_main]

use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::time::Duration;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use msgwire_codec::SmallFraming;
use msgwire_transport::{Connection, Exchange, ExchangeControl, TransportConfig};

#[derive(Debug, Arbitrary)]
struct Input {
    stream: Vec<u8>,
    splits: Vec<u8>,
}

struct Chunked {
    chunks: VecDeque<Vec<u8>>,
}

impl Read for Chunked {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let Some(mut chunk) = self.chunks.pop_front() else {
            return Ok(0);
        };
        let n = chunk.len().min(buf.len());
        buf[..n].copy_from_slice(&chunk[..n]);
        if n < chunk.len() {
            self.chunks.push_front(chunk.split_off(n));
        }
        Ok(n)
    }
}

impl Write for Chunked {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Connection for Chunked {
    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fuzz_target!(|input: Input| {
    let mut chunks = VecDeque::new();
    let mut rest = input.stream.as_slice();
    for split in input.splits {
        if rest.is_empty() {
            break;
        }
        let at = usize::from(split).min(rest.len());
        chunks.push_back(rest[..at].to_vec());
        rest = &rest[at..];
    }
    chunks.push_back(rest.to_vec());

    let mut conn = Chunked { chunks };
    // A short header spins on empty reads until the deadline.
    let control = ExchangeControl::new().with_timeout(Duration::from_millis(5));
    let mut exchange = Exchange::new(&TransportConfig::default(), control);

    if let Ok(frame) = exchange.receive::<SmallFraming, _>(&mut conn) {
        assert_eq!(frame.body().len(), frame.header().body_len());
    }
});
