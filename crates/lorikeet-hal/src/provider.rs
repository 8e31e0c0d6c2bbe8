//! Generic `LandmarkProvider` trait for hand-pose sources.

use std::time::Duration;

use lorikeet_types::{HandSkeleton, LorikeetError};

/// A source of per-frame hand landmarks (camera + detector, a recording, a
/// script).
///
/// Cadence and jitter are up to the implementation; callers must not assume
/// a fixed frame interval.
pub trait LandmarkProvider: Send {
    /// Stable identifier for this source, e.g. `"webcam0"`.
    fn id(&self) -> &str;

    /// Produce the frame for time `now` (elapsed since the session started).
    ///
    /// Returns `Ok(None)` when no hand is in view.
    ///
    /// # Errors
    ///
    /// Returns [`LorikeetError::MalformedSkeleton`] when the detector emitted
    /// a frame with the wrong number of landmarks, and
    /// [`LorikeetError::ProviderFault`] when the source itself is unusable
    /// (device gone, stream closed).
    fn next_frame(&mut self, now: Duration) -> Result<Option<HandSkeleton>, LorikeetError>;
}
