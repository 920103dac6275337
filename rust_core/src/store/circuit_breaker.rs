//! Circuit breaker for remote document store reads.
//!
//! Trips on consecutive *transport* failures only. A decode error or a 4xx
//! still means the store answered, so it counts as a successful round trip
//! and never opens the breaker.
//!
//! Once open, reads are refused until `recovery_timeout` has passed since the
//! breaker opened (not since the last failure: refused reads never extend the
//! outage). The next read is then a probe; `success_threshold` answered
//! probes close the breaker, a failed probe reopens it with a fresh timer.

use super::StoreError;
use parking_lot::Mutex;
use std::time::{Duration, Instant};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreCircuitState {
    /// Reads are allowed
    Closed,
    /// Reads are refused without touching the store
    Open,
    /// Recovery timeout elapsed; reads go through as probes
    HalfOpen,
}

#[derive(Debug, Clone)]
pub struct StoreCircuitBreakerConfig {
    /// Consecutive transport failures that open the breaker
    pub failure_threshold: u32,
    /// How long the breaker stays open, measured from when it opened
    pub recovery_timeout: Duration,
    /// Answered probes needed to close again
    pub success_threshold: u32,
}

impl Default for StoreCircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            recovery_timeout: Duration::from_secs(30),
            success_threshold: 2,
        }
    }
}

#[derive(Debug)]
struct BreakerState {
    state: StoreCircuitState,
    consecutive_failures: u32,
    answered_probes: u32,
    opened_at: Option<Instant>,
    last_failure: Option<(Instant, String)>,
}

impl BreakerState {
    fn closed() -> Self {
        Self {
            state: StoreCircuitState::Closed,
            consecutive_failures: 0,
            answered_probes: 0,
            opened_at: None,
            last_failure: None,
        }
    }
}

/// Guards every read a `RestDocumentStore` makes. All transitions happen
/// under one lock.
pub struct StoreCircuitBreaker {
    name: String,
    config: StoreCircuitBreakerConfig,
    inner: Mutex<BreakerState>,
}

impl std::fmt::Debug for StoreCircuitBreaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("StoreCircuitBreaker")
            .field("name", &self.name)
            .field("state", &inner.state)
            .field("consecutive_failures", &inner.consecutive_failures)
            .finish()
    }
}

impl StoreCircuitBreaker {
    pub fn new(name: &str, config: StoreCircuitBreakerConfig) -> Self {
        Self {
            name: name.to_string(),
            config,
            inner: Mutex::new(BreakerState::closed()),
        }
    }

    /// Admit a read, or refuse it with `StoreError::CircuitOpen`.
    ///
    /// An open breaker whose recovery timeout has elapsed moves to half-open
    /// here and admits the read as a probe.
    pub fn admit(&self) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        if inner.state != StoreCircuitState::Open {
            return Ok(());
        }

        let elapsed = inner
            .opened_at
            .map(|t| t.elapsed() >= self.config.recovery_timeout)
            .unwrap_or(true);
        if !elapsed {
            return Err(StoreError::CircuitOpen(self.name.clone()));
        }

        inner.state = StoreCircuitState::HalfOpen;
        inner.answered_probes = 0;
        info!("Store breaker '{}' half-open, probing the store", self.name);
        Ok(())
    }

    /// Feed the outcome of an admitted read back into the breaker.
    pub fn record<T>(&self, result: &Result<T, StoreError>) {
        match result {
            Err(e) if e.is_transient() => self.on_transport_failure(e),
            _ => self.on_answer(),
        }
    }

    fn on_answer(&self) {
        let mut inner = self.inner.lock();
        inner.consecutive_failures = 0;

        if inner.state != StoreCircuitState::HalfOpen {
            return;
        }
        inner.answered_probes += 1;
        if inner.answered_probes >= self.config.success_threshold {
            let outage = inner.opened_at.map(|t| t.elapsed()).unwrap_or_default();
            *inner = BreakerState::closed();
            info!(
                "Store breaker '{}' closed, store back after {}s",
                self.name,
                outage.as_secs()
            );
        }
    }

    fn on_transport_failure(&self, error: &StoreError) {
        let now = Instant::now();
        let mut inner = self.inner.lock();
        inner.consecutive_failures += 1;
        inner.last_failure = Some((now, error.to_string()));

        let trip = match inner.state {
            StoreCircuitState::Closed => {
                inner.consecutive_failures >= self.config.failure_threshold
            }
            StoreCircuitState::HalfOpen => true,
            // A read admitted before the breaker opened; the timer keeps running
            StoreCircuitState::Open => false,
        };

        if trip {
            let probing = inner.state == StoreCircuitState::HalfOpen;
            inner.state = StoreCircuitState::Open;
            inner.opened_at = Some(now);
            inner.answered_probes = 0;
            warn!(
                "Store breaker '{}' open for {}s ({}): {}",
                self.name,
                self.config.recovery_timeout.as_secs(),
                if probing {
                    "probe failed".to_string()
                } else {
                    format!("{} consecutive failures", inner.consecutive_failures)
                },
                error
            );
        }
    }

    pub fn state(&self) -> StoreCircuitState {
        self.inner.lock().state
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn failure_count(&self) -> u32 {
        self.inner.lock().consecutive_failures
    }

    /// When the breaker last opened, if it is not closed
    pub fn opened_at(&self) -> Option<Instant> {
        self.inner.lock().opened_at
    }

    /// Most recent transport failure and when it happened
    pub fn last_failure(&self) -> Option<(Instant, String)> {
        self.inner.lock().last_failure.clone()
    }

    pub fn reset(&self) {
        *self.inner.lock() = BreakerState::closed();
    }
}
