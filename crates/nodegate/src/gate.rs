//! Scale-up gate: applies the node rate limiter to scaling decisions.
//!
//! The autoscaler works out how many nodes a pool should have. The gate
//! asks the limiter how many of the missing nodes may be requested right
//! now and turns the answer into a decision. Whatever is not granted is
//! reported as deferred; the next evaluation round asks again.

use std::sync::Arc;

use tracing::debug;

use crate::clock::{Clock, MonotonicClock};
use crate::limiter::ScaleUpRateLimiter;

/// A scale-up decision for a single pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScaleUpDecision {
    /// Scale to `target` nodes. `deferred` nodes were wanted on top of that
    /// but must wait for a later round.
    ScaleTo { target: u32, deferred: u32 },
    /// Nodes are wanted but no quota is available this round.
    Deferred { wanted: u32 },
    /// The pool already has the desired number of nodes.
    NoChange,
}

/// Gates scale-up decisions through a shared [`ScaleUpRateLimiter`].
///
/// Several gates may share one limiter, in which case the rate applies to
/// all of them together.
pub struct ScaleUpGate<C = MonotonicClock> {
    limiter: Arc<ScaleUpRateLimiter<C>>,
}

impl<C: Clock> ScaleUpGate<C> {
    pub fn new(limiter: Arc<ScaleUpRateLimiter<C>>) -> Self {
        Self { limiter }
    }

    pub fn limiter(&self) -> &Arc<ScaleUpRateLimiter<C>> {
        &self.limiter
    }

    /// Decide how far `pool` may grow from `current` towards `desired`.
    ///
    /// Scale-down and steady pools never consult the limiter.
    pub fn admit(&self, pool: &str, current: u32, desired: u32) -> ScaleUpDecision {
        if desired <= current {
            return ScaleUpDecision::NoChange;
        }

        let wanted = desired - current;
        let admission = self.limiter.acquire_nodes(wanted);

        if !admission.admitted {
            debug!(pool, wanted, "scale-up deferred: no quota");
            return ScaleUpDecision::Deferred { wanted };
        }
        // Admitted with `wanted > 0` means at least one node of quota.
        debug_assert!(admission.granted > 0);

        let target = current + admission.granted;
        let deferred = wanted - admission.granted;
        debug!(
            pool,
            from = current,
            to = target,
            deferred,
            "scaling up"
        );
        ScaleUpDecision::ScaleTo { target, deferred }
    }
}
