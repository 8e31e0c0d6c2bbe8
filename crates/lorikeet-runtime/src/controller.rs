//! [`BehaviorController`] – the character's timed state machine.
//!
//! The controller owns the [`BehaviorState`], the [`LovePhase`] counter and
//! the [`Pose`].  Commands only switch the state; all motion happens in
//! [`BehaviorController::advance`], which must be called once per render
//! tick with the time elapsed since the session started.
//!
//! # States
//!
//! | State | Motion | Exit |
//! |---|---|---|
//! | `Idle` | relax to the rest pose, gentle sway, shrink the heart | command |
//! | `Flying` | fast flap, climb to cruise height with a bob, pitch forward | command |
//! | `Landing` | slow flap, sink and level out | altitude below threshold → `Idle` |
//! | `PresentingLove` | five-phase choreography, fluttering folded wings | command |
//!
//! # Love choreography
//!
//! | Phase | Motion | Advance when |
//! |---|---|---|
//! | 0 `TurnAway` | yaw toward π | within tolerance of π |
//! | 1 `WalkBack` | walk back with a footstep bob | past the rear threshold |
//! | 2 `RevealProp` | bounce, grow the heart behind the body | [`REVEAL_HOLD`] after the heart is grown |
//! | 3 `TurnForward` | yaw toward 2π, bring the heart to the front | within tolerance of 2π |
//! | 4 `WalkForward` | walk forward holding the heart | never |
//!
//! Leaving `PresentingLove` abandons the phase on the spot.  Only `Idle`
//! shrinks the heart and resets the phase; `Flying` and `Landing` leave the
//! heart as it was.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use lorikeet_runtime::BehaviorController;
//! use lorikeet_types::BehaviorState;
//!
//! let mut ctl = BehaviorController::new();
//! ctl.fly();
//! for tick in 0..600 {
//!     ctl.advance(Duration::from_millis(tick * 16));
//! }
//! assert_eq!(ctl.state(), BehaviorState::Flying);
//! assert!((ctl.pose().altitude() - 2.0).abs() < 0.1);
//! ```

use std::f32::consts::{PI, TAU};
use std::time::Duration;

use glam::Vec3;
use lorikeet_types::{BehaviorState, Command, GestureSymbol, LovePhase, Pose};
use tracing::{debug, info};

use crate::scheduler::{PhaseTimer, PhaseToken};
use crate::smoothing::{BlendMode, lerp};

// ────────────────────────────────────────────────────────────────────────────
// Tuning constants
// ────────────────────────────────────────────────────────────────────────────
//
// Blend factors below are fractions of the remaining distance covered per
// reference tick.  They shape the feel of the motion and are not physical
// rates.

/// Wing angle held at rest, mirrored between the two wings.
pub const WING_REST: f32 = 0.4;

/// Target altitude while flying.
pub const CRUISE_HEIGHT: f32 = 2.0;
const CRUISE_BLEND: f32 = 0.03;
/// Amplitude of the bob added on top of the cruise altitude.
pub const CRUISE_BOB: f32 = 0.08;
const CRUISE_BOB_RATE: f32 = 3.0;
const FLIGHT_PITCH: f32 = -0.1;
const FLIGHT_FLAP_RATE: f32 = 20.0;
const FLIGHT_FLAP_AMPLITUDE: f32 = 0.9;

const LANDING_FLAP_RATE: f32 = 8.0;
const LANDING_FLAP_AMPLITUDE: f32 = 0.3;
const LANDING_ALTITUDE_BLEND: f32 = 0.04;
const LANDING_PITCH_BLEND: f32 = 0.05;
/// Altitude below which a landing completes.
pub const TOUCHDOWN_ALTITUDE: f32 = 0.05;

const IDLE_BLEND: f32 = 0.05;
const IDLE_WING_BLEND: f32 = 0.1;
const IDLE_BODY_SWAY: f32 = 0.05;
const IDLE_HEAD_RATE: f32 = 1.5;
const IDLE_HEAD_SWAY: f32 = 0.1;
const PROP_SHRINK_BLEND: f32 = 0.2;
/// Heart scale below which the idle rule hides it.
const PROP_HIDE_BELOW: f32 = 0.01;

const LOVE_TURN_BLEND: f32 = 0.05;
const LOVE_TURN_TOLERANCE: f32 = 0.1;
const WALK_BLEND: f32 = 0.03;
const WALK_BOB_RATE: f32 = 10.0;
const WALK_BOB: f32 = 0.1;
const WALK_BACK_TARGET: f32 = -2.5;
const WALK_BACK_DONE: f32 = -2.0;
const WALK_FORWARD_TARGET: f32 = 1.5;

const REVEAL_BOB_RATE: f32 = 15.0;
const REVEAL_BOB: f32 = 0.05;
const REVEAL_GROW_BLEND: f32 = 0.1;
const REVEAL_SWAY_RATE: f32 = 3.0;
const REVEAL_SWAY: f32 = 0.1;
/// Heart scale that counts as fully revealed.
pub const REVEAL_READY_SCALE: f32 = 0.9;
/// Wall-clock pause between revealing the heart and turning forward.
pub const REVEAL_HOLD: Duration = Duration::from_millis(1000);
const PROP_BEHIND: Vec3 = Vec3::new(0.0, -0.1, -0.5);
const PROP_IN_FRONT: Vec3 = Vec3::new(0.0, 0.05, 0.8);
const PROP_CARRY_BLEND: f32 = 0.1;
const PRESENT_SCALE: f32 = 1.2;
const PRESENT_GROW_BLEND: f32 = 0.05;
const PRESENT_SWAY_RATE: f32 = 2.0;
const PRESENT_SWAY: f32 = 0.2;

const FLUTTER_RATE: f32 = 20.0;
const FLUTTER: f32 = 0.05;

// ────────────────────────────────────────────────────────────────────────────
// BehaviorController
// ────────────────────────────────────────────────────────────────────────────

/// Owned character state machine.
///
/// There is no global instance: the tick driver holds the controller and
/// passes it by `&mut` to whatever needs to command or advance it.
#[derive(Debug, Clone)]
pub struct BehaviorController {
    state: BehaviorState,
    phase: LovePhase,
    pose: Pose,
    /// Number of state changes so far; part of every [`PhaseToken`].
    epoch: u64,
    /// Smoothed altitude the flight bob is layered onto.
    cruise_base: f32,
    blend: BlendMode,
    reveal_timer: PhaseTimer,
    clock: Option<Duration>,
    /// Set when `land` was issued while already idle on the ground.
    ground_hop: bool,
}

impl Default for BehaviorController {
    fn default() -> Self {
        Self::with_blend(BlendMode::default())
    }
}

impl BehaviorController {
    /// Controller at rest in `Idle` with per-tick blending.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blend(blend: BlendMode) -> Self {
        Self {
            state: BehaviorState::Idle,
            phase: LovePhase::TurnAway,
            pose: Pose {
                left_wing: WING_REST,
                right_wing: -WING_REST,
                ..Pose::default()
            },
            epoch: 0,
            cruise_base: 0.0,
            blend,
            reveal_timer: PhaseTimer::new(REVEAL_HOLD),
            clock: None,
            ground_hop: false,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────────

    pub fn state(&self) -> BehaviorState {
        self.state
    }

    /// Current love phase.  Only meaningful while presenting love.
    pub fn phase(&self) -> LovePhase {
        self.phase
    }

    pub fn pose(&self) -> &Pose {
        &self.pose
    }

    pub fn blend(&self) -> BlendMode {
        self.blend
    }

    /// Number of state changes since construction.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Altitude the flight bob oscillates around.
    pub fn cruise_altitude(&self) -> f32 {
        self.cruise_base
    }

    /// `true` while the reveal pause is counting down.
    pub fn reveal_pending(&self) -> bool {
        self.reveal_timer.is_armed()
    }

    // ── Commands ─────────────────────────────────────────────────────────

    pub fn fly(&mut self) {
        self.set_state(BehaviorState::Flying);
    }

    pub fn land(&mut self) {
        if self.state == BehaviorState::Landing {
            return;
        }
        // A held fist re-lands every frame; keep those hops out of `info`.
        self.ground_hop = self.state == BehaviorState::Idle
            && self.pose.position.y < TOUCHDOWN_ALTITUDE;
        self.change_state(BehaviorState::Landing, self.ground_hop);
    }

    pub fn show_love(&mut self) {
        self.set_state(BehaviorState::PresentingLove);
    }

    pub fn apply(&mut self, command: Command) {
        match command {
            Command::Fly => self.fly(),
            Command::Land => self.land(),
            Command::ShowLove => self.show_love(),
        }
    }

    /// Apply the command a gesture stands for.
    pub fn apply_gesture(&mut self, symbol: GestureSymbol) {
        self.apply(Command::from(symbol));
    }

    // ── Tick ─────────────────────────────────────────────────────────────

    /// Advance one render tick.
    ///
    /// `elapsed` is the time since the session started.  A value earlier
    /// than the previous tick is treated as a zero-length tick.
    pub fn advance(&mut self, elapsed: Duration) -> &Pose {
        let (now, dt) = match self.clock {
            Some(prev) => {
                let now = elapsed.max(prev);
                (now, Some(now - prev))
            }
            None => (elapsed, None),
        };
        self.clock = Some(now);

        self.fire_reveal_timer(now);

        let t = now.as_secs_f32();
        let blend = self.blend;
        let k = |base: f32| blend.factor(base, dt);

        match self.state {
            BehaviorState::Flying => self.tick_flying(t, &k),
            BehaviorState::Landing => self.tick_landing(t, &k),
            BehaviorState::PresentingLove => self.tick_love(t, now, &k),
            BehaviorState::Idle => self.tick_idle(t, &k),
        }

        &self.pose
    }

    // ── Internals ────────────────────────────────────────────────────────

    fn set_state(&mut self, next: BehaviorState) {
        self.change_state(next, false);
    }

    /// Switch state; `quiet` logs the change at `debug` instead of `info`.
    fn change_state(&mut self, next: BehaviorState, quiet: bool) {
        if next == self.state {
            return;
        }
        if quiet {
            debug!(from = %self.state, to = %next, "behavior state changed");
        } else {
            info!(
                from = %self.state,
                to = %next,
                phase = self.phase.index(),
                "behavior state changed"
            );
        }
        self.state = next;
        self.epoch += 1;
        if next == BehaviorState::Flying {
            self.cruise_base = self.pose.position.y;
        }
    }

    fn token(&self) -> PhaseToken {
        PhaseToken {
            phase: self.phase,
            epoch: self.epoch,
        }
    }

    fn advance_phase(&mut self) {
        if let Some(next) = self.phase.next() {
            debug!(from = self.phase.index(), to = next.index(), "love phase advanced");
            self.phase = next;
        }
    }

    fn fire_reveal_timer(&mut self, now: Duration) {
        let Some(token) = self.reveal_timer.poll(now) else {
            return;
        };
        if self.state == BehaviorState::PresentingLove && token == self.token() {
            self.advance_phase();
        } else {
            debug!(
                armed_phase = token.phase.index(),
                armed_epoch = token.epoch,
                phase = self.phase.index(),
                epoch = self.epoch,
                "stale reveal timer ignored"
            );
        }
    }

    fn flap(&mut self, angle: f32) {
        self.pose.left_wing = angle;
        self.pose.right_wing = -angle;
    }

    fn tick_flying(&mut self, t: f32, k: &impl Fn(f32) -> f32) {
        self.flap((t * FLIGHT_FLAP_RATE).sin() * FLIGHT_FLAP_AMPLITUDE);
        self.cruise_base = lerp(self.cruise_base, CRUISE_HEIGHT, k(CRUISE_BLEND));
        self.pose.position.y = self.cruise_base + (t * CRUISE_BOB_RATE).sin() * CRUISE_BOB;
        self.pose.pitch = FLIGHT_PITCH;
    }

    fn tick_landing(&mut self, t: f32, k: &impl Fn(f32) -> f32) {
        self.flap((t * LANDING_FLAP_RATE).sin() * LANDING_FLAP_AMPLITUDE);
        let pose = &mut self.pose;
        pose.position.y = lerp(pose.position.y, 0.0, k(LANDING_ALTITUDE_BLEND));
        pose.pitch = lerp(pose.pitch, 0.0, k(LANDING_PITCH_BLEND));

        if pose.position.y < TOUCHDOWN_ALTITUDE {
            self.flap(WING_REST);
            let quiet = std::mem::take(&mut self.ground_hop);
            self.change_state(BehaviorState::Idle, quiet);
        }
    }

    fn tick_idle(&mut self, t: f32, k: &impl Fn(f32) -> f32) {
        let rest = k(IDLE_BLEND);
        let pose = &mut self.pose;
        pose.position.y = lerp(pose.position.y, 0.0, rest);
        pose.position.z = lerp(pose.position.z, 0.0, rest);
        pose.yaw = lerp(pose.yaw, 0.0, rest);
        pose.pitch = lerp(pose.pitch, 0.0, rest);

        let wing = k(IDLE_WING_BLEND);
        pose.left_wing = lerp(pose.left_wing, WING_REST, wing);
        pose.right_wing = lerp(pose.right_wing, -WING_REST, wing);

        pose.body_sway = t.sin() * IDLE_BODY_SWAY;
        pose.head_yaw = (t * IDLE_HEAD_RATE).sin() * IDLE_HEAD_SWAY;

        pose.prop.scale = lerp(pose.prop.scale, 0.0, k(PROP_SHRINK_BLEND));
        if pose.prop.scale < PROP_HIDE_BELOW {
            pose.prop.visible = false;
        }

        self.phase = LovePhase::TurnAway;
    }

    fn tick_love(&mut self, t: f32, now: Duration, k: &impl Fn(f32) -> f32) {
        match self.phase {
            LovePhase::TurnAway => {
                self.pose.yaw = lerp(self.pose.yaw, PI, k(LOVE_TURN_BLEND));
                if (self.pose.yaw - PI).abs() < LOVE_TURN_TOLERANCE {
                    self.advance_phase();
                }
            }
            LovePhase::WalkBack => {
                self.pose.position.z = lerp(self.pose.position.z, WALK_BACK_TARGET, k(WALK_BLEND));
                self.pose.position.y = (t * WALK_BOB_RATE).sin().abs() * WALK_BOB;
                if self.pose.position.z < WALK_BACK_DONE {
                    self.advance_phase();
                }
            }
            LovePhase::RevealProp => {
                self.pose.position.y = (t * REVEAL_BOB_RATE).sin().abs() * REVEAL_BOB;

                let prop = &mut self.pose.prop;
                prop.visible = true;
                prop.scale = lerp(prop.scale, 1.0, k(REVEAL_GROW_BLEND));
                prop.position = PROP_BEHIND;
                prop.yaw = (t * REVEAL_SWAY_RATE).sin() * REVEAL_SWAY;

                if prop.scale > REVEAL_READY_SCALE {
                    let token = self.token();
                    if self.reveal_timer.arm(token, now) {
                        debug!(
                            epoch = token.epoch,
                            delay_ms = REVEAL_HOLD.as_millis() as u64,
                            "reveal pause started"
                        );
                    }
                }
            }
            LovePhase::TurnForward => {
                self.pose.yaw = lerp(self.pose.yaw, TAU, k(LOVE_TURN_BLEND));
                let prop = &mut self.pose.prop;
                prop.position = prop.position.lerp(PROP_IN_FRONT, k(PROP_CARRY_BLEND));
                if (self.pose.yaw - TAU).abs() < LOVE_TURN_TOLERANCE {
                    self.advance_phase();
                }
            }
            LovePhase::WalkForward => {
                self.pose.position.z =
                    lerp(self.pose.position.z, WALK_FORWARD_TARGET, k(WALK_BLEND));
                self.pose.position.y = (t * WALK_BOB_RATE).sin().abs() * WALK_BOB;

                let prop = &mut self.pose.prop;
                prop.visible = true;
                prop.scale = lerp(prop.scale, PRESENT_SCALE, k(PRESENT_GROW_BLEND));
                prop.position = PROP_IN_FRONT;
                prop.yaw = (t * PRESENT_SWAY_RATE).sin() * PRESENT_SWAY;
            }
        }

        let flutter = (t * FLUTTER_RATE).sin() * FLUTTER;
        self.pose.left_wing = WING_REST + flutter;
        self.pose.right_wing = -WING_REST - flutter;
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
