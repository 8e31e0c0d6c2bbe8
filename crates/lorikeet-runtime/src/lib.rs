//! `lorikeet-runtime` – the character's behavior engine.
//!
//! Turns gesture symbols into a continuously animated pose.
//!
//! # Modules
//!
//! - [`controller`] – [`BehaviorController`][controller::BehaviorController]:
//!   the timed state machine (`Idle`, `Flying`, `Landing`, `PresentingLove`)
//!   with its five-phase love choreography.  Owned by the caller and advanced
//!   once per render tick.
//! - [`scheduler`] – [`PhaseTimer`][scheduler::PhaseTimer]: the deferred
//!   reveal-to-turn advance, checked against a captured
//!   [`PhaseToken`][scheduler::PhaseToken] when it comes due.
//! - [`smoothing`] – [`lerp`][smoothing::lerp] and
//!   [`BlendMode`][smoothing::BlendMode]: per-tick or time-scaled exponential
//!   smoothing toward targets.
//! - [`latch`] – [`CommandLatch`][latch::CommandLatch]: last-write-wins hand-off
//!   of gestures from the provider thread to the render tick.
//! - [`pipeline`] – [`GesturePipeline`][pipeline::GesturePipeline]: provider →
//!   classifier → [`GestureSink`][pipeline::GestureSink].
//! - [`driver`] – [`TickDriver`][driver::TickDriver]: applies the latched
//!   gesture and advances the controller, producing a
//!   [`TickReport`][driver::TickReport].
//! - [`telemetry`] – [`init_tracing`][telemetry::init_tracing]: global
//!   `tracing` subscriber setup.
//!
//! # Threads
//!
//! The controller is never shared.  A provider thread runs a
//! [`GesturePipeline`] into a [`CommandLatch`]; the render thread owns the
//! [`BehaviorController`] and a [`TickDriver`] draining the same latch.

pub mod controller;
pub mod driver;
pub mod latch;
pub mod pipeline;
pub mod scheduler;
pub mod smoothing;
pub mod telemetry;

pub use controller::BehaviorController;
pub use driver::{StateChange, TickDriver, TickReport};
pub use latch::CommandLatch;
pub use pipeline::{GesturePipeline, GestureSink, PipelineStats};
pub use scheduler::{PhaseTimer, PhaseToken};
pub use smoothing::BlendMode;
pub use telemetry::init_tracing;
