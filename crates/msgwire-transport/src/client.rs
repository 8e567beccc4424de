//! Request/response client.

use std::net::SocketAddr;
use std::time::Duration;

use msgwire_codec::{BigFrame, BigFraming, Frame, Framing, SmallFraming};
use tracing::{debug, instrument};

use crate::connection::ConnectionGuard;
use crate::{
    Connection, Connector, Exchange, ExchangeControl, Result, TcpConnector, TransportConfig,
    TransportError,
};

/// Performs one-shot request/response exchanges.
///
/// Every exchange uses its own connection, which is closed when the exchange
/// ends, whether it succeeded or not. Failed exchanges are never retried.
#[derive(Debug, Clone)]
pub struct Client<K = TcpConnector> {
    connector: K,
    config: TransportConfig,
}

impl Client<TcpConnector> {
    /// Creates a TCP client.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::InvalidConfig`] if `config` does not validate.
    pub fn new(config: TransportConfig) -> Result<Self> {
        Self::with_connector(TcpConnector, config)
    }
}

impl Default for Client<TcpConnector> {
    fn default() -> Self {
        Self {
            connector: TcpConnector,
            config: TransportConfig::default(),
        }
    }
}

impl<K: Connector> Client<K> {
    /// Creates a client dialing through `connector`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::InvalidConfig`] if `config` does not validate.
    pub fn with_connector(connector: K, config: TransportConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { connector, config })
    }

    /// The configuration in use.
    #[must_use]
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// A fresh control carrying the configured exchange timeout.
    #[must_use]
    pub fn control(&self) -> ExchangeControl {
        let control = ExchangeControl::new();
        match self.config.exchange_timeout() {
            Some(timeout) => control.with_timeout(timeout),
            None => control,
        }
    }

    /// Opens a connection to `addr`. Failures are reported, not retried.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Connect`] if the connection cannot be made.
    pub fn connect(&self, addr: SocketAddr) -> Result<K::Connection> {
        self.connect_within(addr, &self.control())
    }

    /// Sends `request` to `addr` and returns the small response frame.
    ///
    /// # Errors
    ///
    /// Any [`TransportError`]; a header-only response is `Ok` with an empty
    /// body.
    pub fn request(&self, addr: SocketAddr, request: &[u8]) -> Result<Frame> {
        self.request_with::<SmallFraming>(addr, request, self.control())
    }

    /// Sends `request` to `addr` and returns the big response frame.
    ///
    /// # Errors
    ///
    /// Any [`TransportError`].
    pub fn request_big(&self, addr: SocketAddr, request: &[u8]) -> Result<BigFrame> {
        self.request_with::<BigFraming>(addr, request, self.control())
    }

    /// Connects, sends `request` and reads a response of variant `F` under
    /// `control`.
    ///
    /// # Errors
    ///
    /// Any [`TransportError`].
    #[instrument(level = "debug", skip(self, request, control), fields(request_len = request.len()))]
    pub fn request_with<F: Framing>(
        &self,
        addr: SocketAddr,
        request: &[u8],
        control: ExchangeControl,
    ) -> Result<F::Frame> {
        let mut exchange = Exchange::new(&self.config, control);
        exchange.begin_connect()?;
        let conn = self
            .connect_within(addr, exchange.control())
            .map_err(|e| exchange.fail(e))?;
        run::<F, _>(&mut exchange, conn, request)
    }

    /// Exchanges `request` for a small response frame over an already open
    /// connection, closing it afterwards.
    ///
    /// # Errors
    ///
    /// Any [`TransportError`] except [`TransportError::Connect`].
    pub fn exchange<C: Connection>(&self, conn: C, request: &[u8]) -> Result<Frame> {
        self.exchange_with::<SmallFraming, C>(conn, request, self.control())
    }

    /// Exchanges `request` for a big response frame over an already open
    /// connection, closing it afterwards.
    ///
    /// # Errors
    ///
    /// Any [`TransportError`] except [`TransportError::Connect`].
    pub fn exchange_big<C: Connection>(&self, conn: C, request: &[u8]) -> Result<BigFrame> {
        self.exchange_with::<BigFraming, C>(conn, request, self.control())
    }

    /// Exchanges `request` for a response of variant `F` over `conn` under
    /// `control`, closing `conn` afterwards.
    ///
    /// # Errors
    ///
    /// Any [`TransportError`] except [`TransportError::Connect`].
    pub fn exchange_with<F: Framing, C: Connection>(
        &self,
        conn: C,
        request: &[u8],
        control: ExchangeControl,
    ) -> Result<F::Frame> {
        let mut exchange = Exchange::new(&self.config, control);
        run::<F, _>(&mut exchange, conn, request)
    }

    /// Connects, writes `request` and closes without reading a response.
    ///
    /// # Errors
    ///
    /// [`TransportError::Connect`] or [`TransportError::Write`].
    pub fn send(&self, addr: SocketAddr, request: &[u8]) -> Result<()> {
        let mut exchange = Exchange::new(&self.config, self.control());
        exchange.begin_connect()?;
        let conn = self
            .connect_within(addr, exchange.control())
            .map_err(|e| exchange.fail(e))?;
        let mut guard = ConnectionGuard::new(conn);
        exchange.send(guard.get_mut(), request)
    }

    /// Dials with the tighter of the connect timeout and the time left before
    /// the exchange deadline.
    fn connect_within(&self, addr: SocketAddr, control: &ExchangeControl) -> Result<K::Connection> {
        let configured = self.config.connect_timeout();
        let timeout = match control.deadline() {
            Some(_) => Some(control.io_timeout(configured.unwrap_or(Duration::MAX))),
            None => configured,
        };
        let conn = self
            .connector
            .connect(addr, timeout)
            .map_err(|source| TransportError::Connect { addr, source })?;
        debug!(addr = %addr, ?timeout, "Exchange connected");
        Ok(conn)
    }
}

fn run<F: Framing, C: Connection>(
    exchange: &mut Exchange,
    conn: C,
    request: &[u8],
) -> Result<F::Frame> {
    let mut guard = ConnectionGuard::new(conn);
    exchange.send(guard.get_mut(), request)?;
    exchange.receive::<F, C>(guard.get_mut())
}
