//! Connection abstraction and the TCP implementation.

use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::time::Duration;

use tracing::{debug, warn};

/// A blocking byte-stream connection.
///
/// Reads and writes come from [`Read`] and [`Write`]. A read that would
/// block past its timeout reports `WouldBlock` or `TimedOut`; `Ok(0)` is end
/// of stream. While a response header is still incomplete the driver treats
/// `Ok(0)` like an idle read and keeps polling, but once the header is decoded
/// an `Ok(0)` ends the exchange as truncated.
pub trait Connection: Read + Write {
    /// Bounds how long a single read may block. `None` blocks indefinitely.
    fn set_read_timeout(&mut self, timeout: Option<Duration>) -> io::Result<()> {
        let _ = timeout;
        Ok(())
    }

    /// Bounds how long a single write may block. `None` blocks indefinitely.
    fn set_write_timeout(&mut self, timeout: Option<Duration>) -> io::Result<()> {
        let _ = timeout;
        Ok(())
    }

    /// Closes the connection.
    fn close(&mut self) -> io::Result<()>;
}

impl Connection for TcpStream {
    fn set_read_timeout(&mut self, timeout: Option<Duration>) -> io::Result<()> {
        TcpStream::set_read_timeout(self, timeout)
    }

    fn set_write_timeout(&mut self, timeout: Option<Duration>) -> io::Result<()> {
        TcpStream::set_write_timeout(self, timeout)
    }

    fn close(&mut self) -> io::Result<()> {
        match self.shutdown(Shutdown::Both) {
            // Peer already went away; nothing left to release.
            Err(e) if e.kind() == io::ErrorKind::NotConnected => Ok(()),
            other => other,
        }
    }
}

/// Opens connections to an address.
pub trait Connector {
    /// The connection type produced.
    type Connection: Connection;

    /// Dials `addr`, giving up after `timeout` when one is set.
    fn connect(&self, addr: SocketAddr, timeout: Option<Duration>)
        -> io::Result<Self::Connection>;
}

/// Connector producing plain [`TcpStream`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnector;

impl Connector for TcpConnector {
    type Connection = TcpStream;

    fn connect(&self, addr: SocketAddr, timeout: Option<Duration>) -> io::Result<TcpStream> {
        let stream = match timeout {
            Some(timeout) => TcpStream::connect_timeout(&addr, timeout)?,
            None => TcpStream::connect(addr)?,
        };
        stream.set_nodelay(true)?;
        debug!(addr = %addr, "Connected");
        Ok(stream)
    }
}

/// Owns a connection for one exchange and closes it exactly once when
/// dropped.
pub(crate) struct ConnectionGuard<C: Connection> {
    conn: C,
}

impl<C: Connection> ConnectionGuard<C> {
    pub(crate) fn new(conn: C) -> Self {
        Self { conn }
    }

    pub(crate) fn get_mut(&mut self) -> &mut C {
        &mut self.conn
    }
}

impl<C: Connection> Drop for ConnectionGuard<C> {
    fn drop(&mut self) {
        if let Err(e) = self.conn.close() {
            warn!(error = %e, "Failed to close connection");
        }
    }
}
