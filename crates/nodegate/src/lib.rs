//! nodegate: scale-up admission limiting for node autoscalers.
//!
//! Adding many nodes at once can leave the control-plane API unresponsive
//! to interactive and automated clients. [`ScaleUpRateLimiter`] caps how
//! many nodes the scale-up loop may request per minute, while letting idle
//! periods build up headroom for a bounded burst.
//!
//! # Admission Algorithm
//!
//! ```text
//! elapsed   = whole minutes since the last successful reservation
//! available = min(elapsed * max_nodes_per_minute + unused_slots,
//!                 burst_max_nodes_per_minute)
//!
//! if available == 0:
//!     reject, leave state untouched
//! else:
//!     last_reserve = now
//!     granted      = min(requested, available)
//!     unused_slots = available - granted
//! ```
//!
//! [`ScaleUpGate`] applies the limiter to a pool's current and desired
//! node counts and reports the part that has to wait for a later round.

pub mod clock;
pub mod config;
pub mod error;
pub mod gate;
pub mod limiter;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use config::{RateLimiterConfig, ScaleUpFile};
pub use error::{ConfigError, ConfigResult};
pub use gate::{ScaleUpDecision, ScaleUpGate};
pub use limiter::{Admission, LimiterSnapshot, ScaleUpRateLimiter};
