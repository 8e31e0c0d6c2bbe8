//! `lorikeet-hal` – landmark source abstraction.
//!
//! The real landmark detector (camera + hand-pose model) lives outside this
//! workspace.  Everything here talks to it through one trait so that the
//! classifier and controller never see device details.
//!
//! # Modules
//!
//! - [`provider`] – [`LandmarkProvider`][provider::LandmarkProvider]: yields
//!   zero or one [`HandSkeleton`][lorikeet_types::HandSkeleton] per frame.
//! - [`synth`] – [`HandShape`][synth::HandShape] and
//!   [`synthesize_hand`][synth::synthesize_hand]: builds plausible skeletons
//!   with chosen fingertip distances.
//! - [`sim`] – [`ScriptedProvider`][sim::ScriptedProvider] and
//!   [`ManualProvider`][sim::ManualProvider]: in-process stand-ins for the
//!   camera, used by the CLI and by tests.

pub mod provider;
pub mod sim;
pub mod synth;

pub use provider::LandmarkProvider;
pub use sim::{ManualProvider, ScriptStep, ScriptedProvider};
pub use synth::{HandShape, synthesize_hand};
