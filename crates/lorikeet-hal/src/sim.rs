//! In-process landmark sources for headless runs and tests.
//!
//! [`ScriptedProvider`] replays a time-stamped list of [`HandShape`]s;
//! [`ManualProvider`] reports whatever shape was last set on it from another
//! thread (the CLI REPL drives one).  Both synthesise full skeletons, so the
//! real classifier sees the same kind of input it would get from a camera.
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use lorikeet_hal::sim::{ScriptedProvider, ScriptStep};
//! use lorikeet_hal::{HandShape, LandmarkProvider};
//!
//! let mut provider = ScriptedProvider::new("demo")
//!     .then(0.5, HandShape::Open)
//!     .then(3.0, HandShape::Fist)
//!     .build();
//!
//! // Nothing scripted yet at t = 0.
//! assert!(provider.next_frame(Duration::ZERO).unwrap().is_none());
//! // Open hand from 0.5 s.
//! assert!(provider.next_frame(Duration::from_secs(1)).unwrap().is_some());
//! ```

use std::sync::{Arc, Mutex};
use std::time::Duration;

use lorikeet_types::{HandSkeleton, LorikeetError};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::provider::LandmarkProvider;
use crate::synth::HandShape;

// ────────────────────────────────────────────────────────────────────────────
// Scripted provider
// ────────────────────────────────────────────────────────────────────────────

/// One entry of a hand script: from `at_secs` onward, show `hand`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScriptStep {
    pub at_secs: f32,
    pub hand: HandShape,
}

/// Replays a fixed timeline of hand shapes.
///
/// Before the first step no hand is reported.  Steps are kept sorted by
/// time; the latest step whose `at_secs` has been reached is shown.
#[derive(Debug, Clone)]
pub struct ScriptedProvider {
    id: String,
    steps: Vec<ScriptStep>,
    current: Option<usize>,
}

impl ScriptedProvider {
    /// Start building a script with the given provider id.
    pub fn new(id: impl Into<String>) -> ScriptBuilder {
        ScriptBuilder {
            id: id.into(),
            steps: Vec::new(),
        }
    }

    /// Build directly from a list of steps (e.g. parsed from a file).
    pub fn from_steps(id: impl Into<String>, steps: Vec<ScriptStep>) -> Self {
        ScriptBuilder {
            id: id.into(),
            steps,
        }
        .build()
    }

    pub fn steps(&self) -> &[ScriptStep] {
        &self.steps
    }

    /// Time of the last step, or zero for an empty script.  Saturates at
    /// [`Duration::MAX`] for a step too far out to represent.
    pub fn duration(&self) -> Duration {
        self.steps
            .last()
            .map(|s| Duration::try_from_secs_f32(s.at_secs.max(0.0)).unwrap_or(Duration::MAX))
            .unwrap_or(Duration::ZERO)
    }

    /// `true` once every step has been reached.
    pub fn is_finished(&self, now: Duration) -> bool {
        now >= self.duration()
    }

    /// Shape shown at time `now`.
    pub fn shape_at(&self, now: Duration) -> HandShape {
        let secs = now.as_secs_f32();
        self.steps
            .iter()
            .rev()
            .find(|s| s.at_secs <= secs)
            .map(|s| s.hand)
            .unwrap_or(HandShape::Absent)
    }
}

impl LandmarkProvider for ScriptedProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn next_frame(&mut self, now: Duration) -> Result<Option<HandSkeleton>, LorikeetError> {
        let secs = now.as_secs_f32();
        let idx = self.steps.iter().rposition(|s| s.at_secs <= secs);
        if idx != self.current {
            if let Some(i) = idx {
                debug!(
                    provider = %self.id,
                    at_secs = self.steps[i].at_secs,
                    hand = %self.steps[i].hand,
                    "script step reached"
                );
            }
            self.current = idx;
        }
        Ok(idx.and_then(|i| self.steps[i].hand.skeleton()))
    }
}

/// Builder returned by [`ScriptedProvider::new`].
#[derive(Debug, Default)]
pub struct ScriptBuilder {
    id: String,
    steps: Vec<ScriptStep>,
}

impl ScriptBuilder {
    /// Show `hand` from `at_secs` onward.
    pub fn then(mut self, at_secs: f32, hand: HandShape) -> Self {
        self.steps.push(ScriptStep { at_secs, hand });
        self
    }

    pub fn build(mut self) -> ScriptedProvider {
        self.steps.sort_by(|a, b| a.at_secs.total_cmp(&b.at_secs));
        ScriptedProvider {
            id: self.id,
            steps: self.steps,
            current: None,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Manual provider
// ────────────────────────────────────────────────────────────────────────────

/// A provider whose hand shape is set from outside, e.g. by REPL commands.
///
/// Clones share the same shape, so one clone can be handed to the provider
/// thread while another stays with the caller.
#[derive(Debug, Clone)]
pub struct ManualProvider {
    id: String,
    shape: Arc<Mutex<HandShape>>,
}

impl ManualProvider {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            shape: Arc::new(Mutex::new(HandShape::Absent)),
        }
    }

    /// Replace the shape reported from the next frame on.
    pub fn set_shape(&self, shape: HandShape) {
        let mut guard = self.shape.lock().unwrap_or_else(|e| e.into_inner());
        *guard = shape;
    }

    pub fn shape(&self) -> HandShape {
        *self.shape.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl LandmarkProvider for ManualProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn next_frame(&mut self, _now: Duration) -> Result<Option<HandSkeleton>, LorikeetError> {
        Ok(self.shape().skeleton())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
