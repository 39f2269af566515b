//! Scale-up rate limiter.
//!
//! Caps how many nodes the control loop may add per minute. Quota accrues
//! at `max_nodes_per_minute` for every whole minute since the last
//! successful reservation, plus whatever the previous reservation left
//! unused, and is clamped to `burst_max_nodes_per_minute` before use.
//!
//! # Concurrency
//!
//! All accounting state sits behind a single `std::sync::Mutex` that is held
//! for the whole read-modify-write of a decision. Lock hold time is one
//! clock read and a handful of integer operations.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tracing::{debug, info, trace, warn};

use crate::clock::{Clock, MonotonicClock};
use crate::config::RateLimiterConfig;

const MINUTE: Duration = Duration::from_secs(60);

/// Outcome of a single admission decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Admission {
    /// Whether any quota was reserved.
    pub admitted: bool,
    /// Nodes the caller may provision now. Always zero when not admitted.
    pub granted: u32,
}

impl Admission {
    pub const REJECTED: Admission = Admission {
        admitted: false,
        granted: 0,
    };

    fn granted(nodes: u32) -> Self {
        Self {
            admitted: true,
            granted: nodes,
        }
    }

    /// True when fewer nodes were granted than `requested`.
    pub fn is_partial(&self, requested: u32) -> bool {
        self.granted < requested
    }
}

/// Point-in-time view of the limiter's accounting, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimiterSnapshot {
    pub unused_slots: u32,
    /// `None` until the first successful reservation.
    pub last_reserve: Option<Instant>,
}

#[derive(Debug, Default)]
struct ReserveState {
    /// Quota left over by the previous reservation.
    unused_slots: u32,
    /// Last decision that reserved quota. `None` acts as a distant epoch.
    last_reserve: Option<Instant>,
}

/// Limits the rate at which new nodes are requested from the control plane.
///
/// Bulk node additions can make the control-plane API unresponsive to
/// everyone else. The limiter lets the scale-up loop add at most
/// `max_nodes_per_minute` nodes per minute on average, while an idle period
/// builds up headroom for a burst of up to `burst_max_nodes_per_minute`.
#[derive(Debug)]
pub struct ScaleUpRateLimiter<C = MonotonicClock> {
    config: RateLimiterConfig,
    clock: C,
    state: Mutex<ReserveState>,
}

impl ScaleUpRateLimiter<MonotonicClock> {
    /// Create a limiter on the process monotonic clock.
    pub fn new(config: RateLimiterConfig) -> Self {
        Self::with_clock(config, MonotonicClock)
    }
}

impl<C: Clock> ScaleUpRateLimiter<C> {
    /// Create a limiter that reads time from `clock`.
    ///
    /// The limiter starts with no unused slots and no prior reservation, so
    /// the first decision may use the full burst ceiling whenever the rate
    /// is non-zero.
    pub fn with_clock(config: RateLimiterConfig, clock: C) -> Self {
        if config.burst_max_nodes_per_minute < config.max_nodes_per_minute {
            warn!(
                max_per_minute = config.max_nodes_per_minute,
                burst = config.burst_max_nodes_per_minute,
                "scale-up burst ceiling is below the steady rate"
            );
        }
        info!(
            max_per_minute = config.max_nodes_per_minute,
            burst = config.burst_max_nodes_per_minute,
            "scale-up rate limiter configured"
        );

        Self {
            config,
            clock,
            state: Mutex::new(ReserveState::default()),
        }
    }

    /// Seed the carry-over quota. Clamped to the burst ceiling.
    pub fn with_initial_slots(mut self, slots: u32) -> Self {
        let state = self
            .state
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        state.unused_slots = slots.min(self.config.burst_max_nodes_per_minute);
        self
    }

    /// Try to reserve `requested` nodes for scale-up.
    ///
    /// Returns how many nodes may be added right now, which can be fewer
    /// than requested. A rejected decision leaves the accounting untouched,
    /// so time keeps accruing against the last successful reservation.
    pub fn acquire_nodes(&self, requested: u32) -> Admission {
        let mut state = self.lock_state();
        let now = self.clock.now();

        let available = self.available(&state, now);
        if available == 0 {
            trace!(requested, "no scale-up quota available");
            return Admission::REJECTED;
        }

        // Never move the reservation time backwards, even for a clock that does.
        state.last_reserve = Some(state.last_reserve.map_or(now, |last| last.max(now)));
        let granted = requested.min(available);
        state.unused_slots = available - granted;

        debug!(
            requested,
            granted,
            unused_slots = state.unused_slots,
            "reserved scale-up quota"
        );
        Admission::granted(granted)
    }

    pub fn config(&self) -> &RateLimiterConfig {
        &self.config
    }

    /// Current accounting state (for diagnostics).
    pub fn snapshot(&self) -> LimiterSnapshot {
        let state = self.lock_state();
        LimiterSnapshot {
            unused_slots: state.unused_slots,
            last_reserve: state.last_reserve,
        }
    }

    /// Quota available at `now`, clamped to the burst ceiling.
    fn available(&self, state: &ReserveState, now: Instant) -> u32 {
        // Partial minutes are not lost: they keep accruing against
        // `last_reserve` until a reservation succeeds.
        let elapsed_minutes = match state.last_reserve {
            Some(last) => now.saturating_duration_since(last).as_secs() / MINUTE.as_secs(),
            None => u64::MAX,
        };

        let burst = self.config.burst_max_nodes_per_minute;
        let rate = u64::from(self.config.max_nodes_per_minute);
        let accrued = elapsed_minutes.saturating_mul(rate);
        let total = accrued.saturating_add(u64::from(state.unused_slots));
        u32::try_from(total).map_or(burst, |total| total.min(burst))
    }

    fn lock_state(&self) -> MutexGuard<'_, ReserveState> {
        // Both fields are written without any fallible step in between, so a
        // poisoned guard still holds consistent accounting.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
