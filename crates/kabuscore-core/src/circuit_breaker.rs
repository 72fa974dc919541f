//! Circuit breaker for the stock API.
//!
//! Consecutive failed lookups open the circuit; while open, lookups fail fast
//! without touching the network. After `open_timeout` one trial request is
//! let through. Its outcome closes or reopens the circuit. If the trial never
//! reports back (the caller's future was dropped), another trial is granted
//! once `open_timeout` passes again.

use std::sync::Mutex;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures that open the circuit.
    pub failure_threshold: u32,
    /// Cool-down before a trial request, and the lease of that trial.
    pub open_timeout: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            open_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Phase {
    Closed { failures: u32 },
    Open { since: Instant, failures: u32 },
    Trial { started: Instant, failures: u32 },
}

impl Phase {
    const fn failures(&self) -> u32 {
        match self {
            Self::Closed { failures }
            | Self::Open { failures, .. }
            | Self::Trial { failures, .. } => *failures,
        }
    }
}

/// Thread-safe breaker shared by every lookup of one adapter.
#[derive(Debug)]
pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    phase: Mutex<Phase>,
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(CircuitBreakerConfig::default())
    }
}

impl CircuitBreaker {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            phase: Mutex::new(Phase::Closed { failures: 0 }),
        }
    }

    /// Whether a request may go out now. Grants at most one trial request
    /// while the circuit is recovering.
    pub fn allow_request(&self) -> bool {
        let mut phase = self
            .phase
            .lock()
            .expect("circuit breaker lock is not poisoned");
        let now = Instant::now();
        let current = *phase;
        match current {
            Phase::Closed { .. } => true,
            Phase::Open { since, failures } | Phase::Trial { started: since, failures } => {
                if now.duration_since(since) < self.config.open_timeout {
                    return false;
                }
                tracing::info!("circuit breaker letting a trial request through");
                *phase = Phase::Trial {
                    started: now,
                    failures,
                };
                true
            }
        }
    }

    /// Whether [`allow_request`](Self::allow_request) would refuse right now.
    pub fn is_rejecting(&self) -> bool {
        let phase = self
            .phase
            .lock()
            .expect("circuit breaker lock is not poisoned");
        match *phase {
            Phase::Closed { .. } => false,
            Phase::Open { since, .. } | Phase::Trial { started: since, .. } => {
                since.elapsed() < self.config.open_timeout
            }
        }
    }

    /// The stock API answered; closes the circuit.
    pub fn record_success(&self) {
        let mut phase = self
            .phase
            .lock()
            .expect("circuit breaker lock is not poisoned");
        if !matches!(*phase, Phase::Closed { .. }) {
            tracing::info!("circuit breaker closed");
        }
        *phase = Phase::Closed { failures: 0 };
    }

    /// The stock API was unreachable or failed server-side.
    pub fn record_failure(&self) {
        let mut phase = self
            .phase
            .lock()
            .expect("circuit breaker lock is not poisoned");
        let current = *phase;
        let failures = current.failures().saturating_add(1);
        let reopen = match current {
            Phase::Closed { .. } => failures >= self.config.failure_threshold,
            Phase::Open { .. } | Phase::Trial { .. } => true,
        };

        *phase = if reopen {
            if matches!(current, Phase::Closed { .. }) {
                tracing::warn!(failures, "circuit breaker opened");
            }
            Phase::Open {
                since: Instant::now(),
                failures,
            }
        } else {
            Phase::Closed { failures }
        };
    }

    pub fn state(&self) -> CircuitState {
        match *self
            .phase
            .lock()
            .expect("circuit breaker lock is not poisoned")
        {
            Phase::Closed { .. } => CircuitState::Closed,
            Phase::Open { .. } => CircuitState::Open,
            Phase::Trial { .. } => CircuitState::HalfOpen,
        }
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.phase
            .lock()
            .expect("circuit breaker lock is not poisoned")
            .failures()
    }
}
