//! Deadlines and cancellation for blocking exchanges.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::{Result, TransportError};

/// Shortest timeout handed to a connection; zero means "no timeout" to std.
const MIN_IO_TIMEOUT: Duration = Duration::from_millis(1);

/// Cooperative cancellation flag shared between threads.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates a token that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation of every exchange holding a clone of this token.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Returns `true` once [`CancellationToken::cancel`] has been called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Deadline and cancellation checked before every blocking call of an
/// exchange.
#[derive(Debug, Clone)]
pub struct ExchangeControl {
    started: Instant,
    deadline: Option<Instant>,
    cancel: Option<CancellationToken>,
}

impl Default for ExchangeControl {
    fn default() -> Self {
        Self::new()
    }
}

impl ExchangeControl {
    /// No deadline, no cancellation.
    #[must_use]
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            deadline: None,
            cancel: None,
        }
    }

    /// Aborts the exchange once `deadline` has passed.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Aborts the exchange `timeout` after this control was created.
    #[must_use]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        let deadline = self.started + timeout;
        self.with_deadline(deadline)
    }

    /// Aborts the exchange when `token` is cancelled.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// The deadline, if any.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time since this control was created.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Fails if the exchange was cancelled or its deadline has passed.
    ///
    /// # Errors
    ///
    /// [`TransportError::Cancelled`] or [`TransportError::DeadlineExceeded`].
    pub fn check(&self) -> Result<()> {
        if self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled) {
            return Err(TransportError::Cancelled);
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(TransportError::DeadlineExceeded {
                    elapsed: self.elapsed(),
                });
            }
        }
        Ok(())
    }

    /// Timeout for the next blocking call: the time left before the deadline,
    /// capped at `poll`, so cancellation is observed at least once per `poll`.
    #[must_use]
    pub fn io_timeout(&self, poll: Duration) -> Duration {
        let bound = match self.deadline {
            Some(deadline) => deadline
                .saturating_duration_since(Instant::now())
                .min(poll),
            None => poll,
        };
        bound.max(MIN_IO_TIMEOUT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unbounded_control_always_passes() {
        let control = ExchangeControl::new();
        assert!(control.check().is_ok());
        assert!(control.deadline().is_none());
        assert_eq!(
            control.io_timeout(Duration::from_millis(100)),
            Duration::from_millis(100)
        );
    }

    #[test]
    fn expired_deadline_fails() {
        let control = ExchangeControl::new().with_deadline(Instant::now());
        assert!(matches!(
            control.check(),
            Err(TransportError::DeadlineExceeded { .. })
        ));
    }

    #[test]
    fn io_timeout_never_zero() {
        let control = ExchangeControl::new().with_deadline(Instant::now());
        assert_eq!(control.io_timeout(Duration::from_secs(1)), MIN_IO_TIMEOUT);
    }

    #[test]
    fn io_timeout_capped_by_remaining_time() {
        let control = ExchangeControl::new().with_timeout(Duration::from_millis(20));
        assert!(control.io_timeout(Duration::from_secs(5)) <= Duration::from_millis(20));
    }

    #[test]
    fn cancellation_is_shared() {
        let token = CancellationToken::new();
        let control = ExchangeControl::new().with_cancellation(token.clone());
        assert!(control.check().is_ok());

        std::thread::spawn(move || token.cancel()).join().unwrap();
        assert!(matches!(control.check(), Err(TransportError::Cancelled)));
    }
}
