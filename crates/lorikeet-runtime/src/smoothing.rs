//! Exponential smoothing toward a target.
//!
//! Every continuous pose field the controller drives is pulled toward its
//! target by a fixed fraction of the remaining distance on each tick.  The
//! fractions are tuning constants, not physical rates: applied per tick they
//! make motion speed depend on the tick rate.  [`BlendMode::TimeScaled`]
//! re-derives the fraction from the real tick length so that the same
//! constant produces the same motion at any cadence.
//!
//! | Mode | Effective factor for base `f` over a tick of `dt` seconds |
//! |---|---|
//! | [`BlendMode::PerTick`] | `f` |
//! | [`BlendMode::TimeScaled`] | `1 − (1 − f)^(dt · reference_hz)` |

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Linear interpolation from `from` toward `to` by `t`.
///
/// ```rust
/// use lorikeet_runtime::smoothing::lerp;
///
/// assert_eq!(lerp(0.0, 2.0, 0.25), 0.5);
/// assert_eq!(lerp(0.4, 0.4, 0.1), 0.4);
/// ```
#[inline]
pub fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}

/// How blend factors are turned into per-tick pull fractions.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    /// Use each factor as-is on every tick.
    #[default]
    PerTick,
    /// Scale each factor by the tick length, treating it as the pull that
    /// one tick at `reference_hz` would apply.
    TimeScaled { reference_hz: f32 },
}

impl BlendMode {
    /// Effective pull fraction for base factor `base` over a tick of `dt`.
    ///
    /// `dt` is `None` for the first tick, which has no measurable length; the
    /// base factor is used unchanged.
    pub fn factor(self, base: f32, dt: Option<Duration>) -> f32 {
        match (self, dt) {
            (BlendMode::PerTick, _) | (BlendMode::TimeScaled { .. }, None) => base,
            (BlendMode::TimeScaled { reference_hz }, Some(dt)) => {
                let ticks = dt.as_secs_f32() * reference_hz.max(0.0);
                1.0 - (1.0 - base.clamp(0.0, 1.0)).powf(ticks)
            }
        }
    }
}
