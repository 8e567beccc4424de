//! One request/response exchange.
//!
//! An [`Exchange`] writes a request to a connection and reassembles the
//! response frame from whatever fragments the stream delivers:
//!
//! ```text
//! Idle -> Connecting -> Sent -> HeaderPending -> BodyPending -> Complete
//!   \__________\___________\__________\______________\______> Failed
//! ```
//!
//! The header is accumulated until all of its bytes have arrived, sleeping
//! briefly whenever a read yields nothing. The body is then read until exactly
//! the announced number of bytes has been collected.

use std::fmt;
use std::io;
use std::thread;
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use msgwire_codec::{FrameCodec, Framing};
use tracing::{debug, trace, warn};

use crate::{Connection, ExchangeControl, Result, TransportConfig, TransportError};

/// Body bytes requested from the connection per read.
const BODY_CHUNK: usize = 64 * 1024;

/// Consecutive empty header reads after which a stalled peer is reported.
const EMPTY_READS_BEFORE_WARN: u32 = 20_000;

/// Progress of an exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExchangeState {
    /// Nothing done yet.
    Idle,
    /// Dialing the peer.
    Connecting,
    /// Request fully written.
    Sent,
    /// Waiting for the response header.
    HeaderPending,
    /// Header decoded, waiting for the body.
    BodyPending,
    /// Response frame assembled.
    Complete,
    /// Aborted by an error; terminal.
    Failed,
}

impl ExchangeState {
    /// Returns `true` for `Complete` and `Failed`.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Failed)
    }
}

impl fmt::Display for ExchangeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Connecting => "connecting",
            Self::Sent => "sent",
            Self::HeaderPending => "header_pending",
            Self::BodyPending => "body_pending",
            Self::Complete => "complete",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Drives a single request/response cycle over a caller-supplied connection.
///
/// The exchange never retries a failed request and never closes the
/// connection itself; [`crate::Client`] owns both concerns.
#[derive(Debug)]
pub struct Exchange {
    state: ExchangeState,
    codec: FrameCodec,
    control: ExchangeControl,
    retry_backoff: Duration,
    poll_interval: Duration,
}

impl Exchange {
    /// Creates an idle exchange using the limits and pacing of `config`.
    #[must_use]
    pub fn new(config: &TransportConfig, control: ExchangeControl) -> Self {
        Self {
            state: ExchangeState::Idle,
            codec: FrameCodec::new(config.limits),
            control,
            retry_backoff: config.retry_backoff(),
            poll_interval: config.poll_interval(),
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> ExchangeState {
        self.state
    }

    /// Deadline and cancellation in effect.
    #[must_use]
    pub fn control(&self) -> &ExchangeControl {
        &self.control
    }

    /// Records that the connection is being established.
    pub(crate) fn begin_connect(&mut self) -> Result<()> {
        self.transition(ExchangeState::Connecting);
        let checked = self.control.check();
        self.settle(checked)
    }

    /// Marks the exchange failed and hands back `err`.
    pub(crate) fn fail(&mut self, err: TransportError) -> TransportError {
        self.transition(ExchangeState::Failed);
        err
    }

    /// Writes `request` in full.
    ///
    /// # Errors
    ///
    /// [`TransportError::Write`] on stream errors, or the control's
    /// deadline/cancellation error.
    pub fn send<C: Connection>(&mut self, conn: &mut C, request: &[u8]) -> Result<()> {
        let written = self.write_all(conn, request);
        let settled = self.settle(written);
        if settled.is_ok() {
            debug!(bytes = request.len(), "Request sent");
            self.transition(ExchangeState::Sent);
        }
        settled
    }

    /// Reads one response frame of variant `F`.
    ///
    /// # Errors
    ///
    /// [`TransportError::Read`] on stream errors, [`TransportError::Codec`]
    /// if the header is rejected, [`TransportError::Truncated`] if the stream
    /// ends mid-body, or the control's deadline/cancellation error.
    pub fn receive<F: Framing, C: Connection>(&mut self, conn: &mut C) -> Result<F::Frame> {
        let received = self.read_frame::<F, C>(conn);
        self.settle(received)
    }

    fn read_frame<F: Framing, C: Connection>(&mut self, conn: &mut C) -> Result<F::Frame> {
        self.transition(ExchangeState::HeaderPending);
        let mut raw = vec![0u8; F::HEADER_SIZE];
        self.read_header(conn, &mut raw)?;

        let header = F::decode_header(&self.codec, &raw)?;
        let remaining = F::body_len(&header);
        trace!(?header, remaining, "Header decoded");

        let body = if remaining == 0 {
            Bytes::new()
        } else {
            self.transition(ExchangeState::BodyPending);
            self.read_body(conn, remaining)?
        };

        self.transition(ExchangeState::Complete);
        debug!(body = body.len(), elapsed = ?self.control.elapsed(), "Response received");
        Ok(F::assemble(header, body))
    }

    fn write_all<C: Connection>(&mut self, conn: &mut C, mut buf: &[u8]) -> Result<()> {
        while !buf.is_empty() {
            self.control.check()?;
            conn.set_write_timeout(Some(self.control.io_timeout(self.poll_interval)))
                .map_err(TransportError::Write)?;
            match conn.write(buf) {
                Ok(0) => {
                    return Err(TransportError::Write(io::Error::new(
                        io::ErrorKind::WriteZero,
                        "connection accepted no bytes",
                    )))
                }
                Ok(n) => buf = &buf[n..],
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) if is_idle(&e) => thread::sleep(self.retry_backoff),
                Err(e) => return Err(TransportError::Write(e)),
            }
        }
        conn.flush().map_err(TransportError::Write)
    }

    /// Fills `buf` completely. Reads that yield nothing, including a clean
    /// end-of-stream, are retried after a short sleep, so a peer that closed
    /// early is only given up on through the deadline or cancellation.
    fn read_header<C: Connection>(&mut self, conn: &mut C, buf: &mut [u8]) -> Result<()> {
        let mut filled = 0;
        let mut empty_reads = 0u32;
        while filled < buf.len() {
            self.control.check()?;
            self.arm_read_timeout(conn)?;
            match conn.read(&mut buf[filled..]) {
                Ok(0) => {
                    empty_reads = empty_reads.saturating_add(1);
                    if empty_reads == EMPTY_READS_BEFORE_WARN {
                        warn!(
                            empty_reads,
                            filled,
                            deadline = ?self.control.deadline(),
                            "Peer sent nothing for many header reads; it may have closed"
                        );
                    }
                    thread::sleep(self.retry_backoff);
                }
                Ok(n) => {
                    empty_reads = 0;
                    filled += n;
                    trace!(read = n, filled, "Header bytes");
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) if is_idle(&e) => thread::sleep(self.retry_backoff),
                Err(e) => return Err(TransportError::Read(e)),
            }
        }
        Ok(())
    }

    /// Reads exactly `len` bytes. `Ok(0)` is end of stream and fails the
    /// exchange as truncated; only `WouldBlock` or `TimedOut` mean "no data yet".
    fn read_body<C: Connection>(&mut self, conn: &mut C, len: usize) -> Result<Bytes> {
        let mut body = BytesMut::with_capacity(len.min(BODY_CHUNK));
        while body.len() < len {
            self.control.check()?;
            self.arm_read_timeout(conn)?;

            let start = body.len();
            body.resize(start + (len - start).min(BODY_CHUNK), 0);
            let read = conn.read(&mut body[start..]);
            let got = match &read {
                Ok(n) => *n,
                Err(_) => 0,
            };
            body.truncate(start + got);

            match read {
                Ok(0) => {
                    return Err(TransportError::Truncated {
                        expected: len,
                        received: start,
                    })
                }
                Ok(n) => trace!(read = n, filled = start + n, len, "Body bytes"),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) if is_idle(&e) => thread::sleep(self.retry_backoff),
                Err(e) => return Err(TransportError::Read(e)),
            }
        }
        Ok(body.freeze())
    }

    fn arm_read_timeout<C: Connection>(&self, conn: &mut C) -> Result<()> {
        conn.set_read_timeout(Some(self.control.io_timeout(self.poll_interval)))
            .map_err(TransportError::Read)
    }

    fn settle<T>(&mut self, result: Result<T>) -> Result<T> {
        result.map_err(|e| self.fail(e))
    }

    fn transition(&mut self, next: ExchangeState) {
        trace!(from = %self.state, to = %next, "Exchange state");
        self.state = next;
    }
}

/// A read or write that produced nothing because the stream has no data yet
/// or the per-call timeout elapsed.
fn is_idle(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
    )
}
