//! Transport configuration.

use std::path::Path;
use std::time::Duration;

use msgwire_codec::FrameLimits;
use serde::{Deserialize, Serialize};

use crate::{Result, TransportError};

/// Environment variable prefix, e.g. `MSGWIRE_LIMITS__SMALL_CAP=2048`.
pub const ENV_PREFIX: &str = "MSGWIRE";

/// Configuration for the transport driver.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Frame size limits applied to responses.
    pub limits: FrameLimits,
    /// Sleep between header reads that returned nothing, in microseconds.
    pub retry_backoff_us: u64,
    /// Upper bound on a single blocking read or write, in milliseconds.
    pub poll_interval_ms: u64,
    /// TCP connect timeout in milliseconds; `None` uses the OS default.
    pub connect_timeout_ms: Option<u64>,
    /// Deadline for a whole exchange in milliseconds; `None` waits forever.
    ///
    /// Empty reads during header assembly are retried, so without a deadline
    /// a peer that closes before sending a full header stalls the exchange
    /// until it is cancelled.
    pub exchange_timeout_ms: Option<u64>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            limits: FrameLimits::default(),
            retry_backoff_us: 50,
            poll_interval_ms: 100,
            connect_timeout_ms: None,
            exchange_timeout_ms: None,
        }
    }
}

impl TransportConfig {
    /// Loads configuration from an optional file, overridden by `MSGWIRE_*`
    /// environment variables.
    ///
    /// The file format is inferred from its extension (TOML, JSON, YAML...).
    ///
    /// # Errors
    ///
    /// [`TransportError::Config`] if a source cannot be read or parsed,
    /// [`TransportError::InvalidConfig`] if the merged values do not validate.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let loaded: Self = builder.build()?.try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Checks that every value is usable.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::InvalidConfig`] naming the offending value.
    pub fn validate(&self) -> Result<()> {
        if !self.limits.is_valid() {
            return Err(TransportError::InvalidConfig(format!(
                "frame limits must admit an 8-byte header (small_cap={}, big_ceiling={})",
                self.limits.small_cap, self.limits.big_ceiling
            )));
        }
        if self.poll_interval_ms == 0 {
            return Err(TransportError::InvalidConfig(
                "poll_interval_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Sleep between empty header reads.
    #[must_use]
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_micros(self.retry_backoff_us)
    }

    /// Upper bound on a single blocking call.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// TCP connect timeout.
    #[must_use]
    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_ms.map(Duration::from_millis)
    }

    /// Per-exchange deadline budget.
    #[must_use]
    pub fn exchange_timeout(&self) -> Option<Duration> {
        self.exchange_timeout_ms.map(Duration::from_millis)
    }
}
