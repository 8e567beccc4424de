//! # msgwire Transport
//!
//! Synchronous request/response exchange of msgwire frames.
//!
//! A [`Client`] opens one connection per exchange, writes the encoded
//! request, reassembles the response frame from however many fragments the
//! stream delivers it in, and closes the connection on every exit path.
//!
//! ```rust,no_run
//! use msgwire_codec::encode_small;
//! use msgwire_transport::{Client, TransportConfig};
//!
//! # fn main() -> msgwire_transport::Result<()> {
//! let client = Client::new(TransportConfig::default())?;
//! let response = client.request("127.0.0.1:7000".parse().unwrap(), &encode_small(1, b"ping"))?;
//! println!("type={} body={:?}", response.frame_type(), response.body());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod client;
mod config;
mod connection;
mod control;
mod error;
mod exchange;
#[cfg(feature = "logging")]
mod logging;

pub use msgwire_codec as codec;

pub use client::Client;
pub use crate::config::{TransportConfig, ENV_PREFIX};
pub use connection::{Connection, Connector, TcpConnector};
pub use control::{CancellationToken, ExchangeControl};
pub use error::{Result, TransportError};
pub use exchange::{Exchange, ExchangeState};
#[cfg(feature = "logging")]
pub use logging::{init_logging, LogFormat};
