//! [`TickDriver`] – one render tick.
//!
//! Each tick the driver takes the pending gesture (if any) from its
//! [`CommandLatch`], applies it to the controller it is handed, then advances
//! the controller.  The resulting [`TickReport`] carries everything the
//! presentation layer reads: the full pose plus what changed this tick.

use std::time::Duration;

use lorikeet_types::{BehaviorState, GestureSymbol, LovePhase, Pose};
use serde::Serialize;
use tracing::trace;

use crate::controller::BehaviorController;
use crate::latch::CommandLatch;

/// A behavior-state change observed across one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StateChange {
    pub from: BehaviorState,
    pub to: BehaviorState,
}

/// Outcome of a single [`TickDriver::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TickReport {
    pub tick: u64,
    pub elapsed_ms: u64,
    /// Gesture applied at the start of this tick.
    pub symbol: Option<GestureSymbol>,
    pub state: BehaviorState,
    pub phase: LovePhase,
    /// Set when the state at the end of the tick differs from the start.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transition: Option<StateChange>,
    pub pose: Pose,
}

/// Applies latched gestures and advances the controller once per tick.
///
/// The driver does not own the controller; callers keep it and pass it in,
/// so it can also be commanded directly between ticks.
#[derive(Debug, Clone, Default)]
pub struct TickDriver {
    latch: CommandLatch,
    ticks: u64,
}

impl TickDriver {
    pub fn new(latch: CommandLatch) -> Self {
        Self { latch, ticks: 0 }
    }

    /// The latch this driver drains.  Clone it to hand to a producer.
    pub fn latch(&self) -> &CommandLatch {
        &self.latch
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn tick(&mut self, controller: &mut BehaviorController, now: Duration) -> TickReport {
        self.ticks += 1;
        let before = controller.state();

        let symbol = self.latch.take();
        if let Some(symbol) = symbol {
            trace!(%symbol, tick = self.ticks, "applying gesture");
            controller.apply_gesture(symbol);
        }

        let pose = *controller.advance(now);
        let after = controller.state();

        TickReport {
            tick: self.ticks,
            elapsed_ms: now.as_millis() as u64,
            symbol,
            state: after,
            phase: controller.phase(),
            transition: (before != after).then_some(StateChange {
                from: before,
                to: after,
            }),
            pose,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn quiet_tick_reports_no_change() {
        let mut ctl = BehaviorController::new();
        let mut driver = TickDriver::default();
        let report = driver.tick(&mut ctl, ms(16));
        assert_eq!(report.tick, 1);
        assert_eq!(report.symbol, None);
        assert_eq!(report.transition, None);
        assert_eq!(report.state, BehaviorState::Idle);
    }

    #[test]
    fn latched_gesture_is_applied_once() {
        let mut ctl = BehaviorController::new();
        let mut driver = TickDriver::default();
        driver.latch().post(GestureSymbol::Open);

        let first = driver.tick(&mut ctl, ms(16));
        assert_eq!(first.symbol, Some(GestureSymbol::Open));
        assert_eq!(
            first.transition,
            Some(StateChange {
                from: BehaviorState::Idle,
                to: BehaviorState::Flying
            })
        );

        let second = driver.tick(&mut ctl, ms(32));
        assert_eq!(second.symbol, None);
        assert_eq!(second.transition, None);
        assert_eq!(driver.ticks(), 2);
    }

    #[test]
    fn only_last_gesture_between_ticks_counts() {
        let mut ctl = BehaviorController::new();
        let mut driver = TickDriver::default();
        let producer = driver.latch().clone();
        producer.post(GestureSymbol::Open);
        producer.post(GestureSymbol::Peace);

        let report = driver.tick(&mut ctl, ms(16));
        assert_eq!(report.symbol, Some(GestureSymbol::Peace));
        assert_eq!(report.state, BehaviorState::PresentingLove);
    }

    #[test]
    fn command_and_touchdown_in_one_tick_cancel_out() {
        let mut ctl = BehaviorController::new();
        let mut driver = TickDriver::default();
        driver.latch().post(GestureSymbol::Closed);
        // Landing from the ground completes on the same tick.
        let report = driver.tick(&mut ctl, ms(16));
        assert_eq!(report.state, BehaviorState::Idle);
        assert_eq!(report.transition, None);
    }

    #[test]
    fn report_serializes_without_empty_transition() {
        let mut ctl = BehaviorController::new();
        let mut driver = TickDriver::default();
        let json = serde_json::to_string(&driver.tick(&mut ctl, ms(16))).unwrap();
        assert!(json.contains("\"state\":\"idle\""));
        assert!(!json.contains("transition"));
    }
}
