//! Dialing the sandbox server over TCP.

use std::io;
use std::time::Duration;

use rand::Rng;
use tokio::net::TcpStream;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::TransportError;

// ---------------------------------------------------------------------------
// DialConfig
// ---------------------------------------------------------------------------

/// How hard [`dial`] tries before giving up.
///
/// The sandbox server and the commander process are usually launched
/// together, so the first few attempts often race the server's listener.
/// Failed attempts are retried every `retry_interval` until
/// `retry_window` has elapsed since the first attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialConfig {
    /// Total time budget for connection attempts. Each attempt is cut off
    /// when the window runs out, but gets at least `retry_interval`. Zero
    /// means a single attempt. Default: 10 seconds.
    pub retry_window: Duration,
    /// Pause between attempts. Default: 500 ms.
    pub retry_interval: Duration,
    /// Upper bound of a random delay added to every pause. Default: zero.
    pub retry_jitter: Duration,
}

impl Default for DialConfig {
    fn default() -> Self {
        Self {
            retry_window: Duration::from_secs(10),
            retry_interval: Duration::from_millis(500),
            retry_jitter: Duration::ZERO,
        }
    }
}

impl DialConfig {
    /// Smallest accepted retry interval.
    pub const MIN_RETRY_INTERVAL: Duration = Duration::from_millis(10);

    /// A config that makes exactly one attempt.
    pub fn no_retry() -> Self {
        Self {
            retry_window: Duration::ZERO,
            ..Self::default()
        }
    }

    /// Fixes out-of-range values so the config is safe to use.
    ///
    /// A zero `retry_interval` would spin on a refused port, so it is
    /// raised to [`Self::MIN_RETRY_INTERVAL`].
    pub fn validated(mut self) -> Self {
        if self.retry_interval < Self::MIN_RETRY_INTERVAL {
            warn!(
                interval_ms = self.retry_interval.as_millis() as u64,
                min_ms = Self::MIN_RETRY_INTERVAL.as_millis() as u64,
                "retry_interval below minimum, raising"
            );
            self.retry_interval = Self::MIN_RETRY_INTERVAL;
        }
        self
    }

    /// How long a single connection attempt may take after `elapsed` of
    /// the window has passed.
    ///
    /// Bounded by what is left of the window, but never shorter than one
    /// retry interval so a final or single attempt still gets a chance.
    fn attempt_timeout(&self, elapsed: Duration) -> Duration {
        self.retry_window
            .saturating_sub(elapsed)
            .max(self.retry_interval)
    }

    /// The pause before the next attempt, jitter included.
    fn next_delay(&self) -> Duration {
        if self.retry_jitter.is_zero() {
            return self.retry_interval;
        }
        let max_us = self.retry_jitter.as_micros() as u64;
        let us = rand::rng().random_range(0..=max_us);
        self.retry_interval + Duration::from_micros(us)
    }
}

// ---------------------------------------------------------------------------
// dial
// ---------------------------------------------------------------------------

/// Connects to `addr` (`"host:port"`), retrying per `config`.
///
/// # Errors
/// Returns [`TransportError::ConnectFailed`] carrying the last I/O error
/// once the retry window is exhausted.
pub async fn dial(
    addr: &str,
    config: &DialConfig,
) -> Result<TcpStream, TransportError> {
    let config = config.clone().validated();
    let start = Instant::now();
    let mut attempts: u32 = 0;

    loop {
        attempts += 1;
        let budget = config.attempt_timeout(start.elapsed());
        let attempt = tokio::time::timeout(budget, TcpStream::connect(addr))
            .await
            .unwrap_or_else(|_| {
                Err(io::Error::new(
                    io::ErrorKind::TimedOut,
                    format!("no answer within {} ms", budget.as_millis()),
                ))
            });
        let err = match attempt {
            Ok(stream) => {
                if let Err(e) = stream.set_nodelay(true) {
                    debug!(addr, error = %e, "could not set TCP_NODELAY");
                }
                info!(addr, attempts, "connected to sandbox server");
                return Ok(stream);
            }
            Err(e) => e,
        };

        let delay = config.next_delay();
        if start.elapsed() + delay > config.retry_window {
            warn!(addr, attempts, error = %err, "giving up on connection");
            return Err(TransportError::ConnectFailed {
                addr: addr.to_string(),
                attempts,
                source: err,
            });
        }

        debug!(
            addr,
            attempts,
            error = %err,
            retry_in_ms = delay.as_millis() as u64,
            "connection attempt failed"
        );
        tokio::time::sleep(delay).await;
    }
}
