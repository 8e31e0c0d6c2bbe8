//! Gesture Classifier.
//!
//! Maps a single frame's [`HandSkeleton`] to at most one [`GestureSymbol`].
//! The classifier keeps no state between frames: there is no smoothing and
//! no debouncing, so one noisy frame can flip the result.
//!
//! # Decision rule
//!
//! For each long finger the planar fingertip-to-wrist distance `d` is
//! measured.  A finger is *extended* when `d > extended_above` and *folded*
//! when `d < folded_below`; between the two it is neither.
//!
//! Rules are evaluated in order and the first match wins:
//!
//! | # | Condition | Symbol |
//! |---|-----------|--------|
//! | 1 | index & middle extended, ring & pinky folded | [`GestureSymbol::Peace`] |
//! | 2 | mean of the four distances `> open_above` | [`GestureSymbol::Open`] |
//! | 3 | mean of the four distances `< closed_below` | [`GestureSymbol::Closed`] |
//! | – | anything else | no symbol |
//!
//! # Example
//!
//! ```rust
//! use lorikeet_perception::classifier::{GestureClassifier, HandMetrics};
//! use lorikeet_types::GestureSymbol;
//!
//! let classifier = GestureClassifier::default();
//!
//! // index 0.5, middle 0.5, ring 0.1, pinky 0.1
//! let peace = HandMetrics { tip_distances: [0.5, 0.5, 0.1, 0.1] };
//! assert_eq!(classifier.classify_metrics(&peace), Some(GestureSymbol::Peace));
//!
//! let relaxed = HandMetrics { tip_distances: [0.3; 4] };
//! assert_eq!(classifier.classify_metrics(&relaxed), None);
//!
//! // No hand in frame: nothing is emitted.
//! assert_eq!(classifier.classify(None), None);
//! ```

use lorikeet_types::{Finger, GestureSymbol, HandSkeleton};
use serde::{Deserialize, Serialize};
use tracing::trace;

// ────────────────────────────────────────────────────────────────────────────
// Configuration
// ────────────────────────────────────────────────────────────────────────────

/// Distance thresholds, in normalised image units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// A finger is extended when its tip is further than this from the wrist.
    pub extended_above: f32,
    /// A finger is folded when its tip is closer than this to the wrist.
    pub folded_below: f32,
    /// Mean tip distance above which the hand reads as open.
    pub open_above: f32,
    /// Mean tip distance below which the hand reads as closed.
    pub closed_below: f32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            extended_above: 0.30,
            folded_below: 0.25,
            open_above: 0.45,
            closed_below: 0.20,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Per-frame measurements
// ────────────────────────────────────────────────────────────────────────────

/// Extension state of a single finger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FingerState {
    Extended,
    Folded,
    /// Inside the dead zone between the two thresholds.
    Ambiguous,
}

/// Fingertip-to-wrist distances for one frame, in [`Finger::ALL`] order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandMetrics {
    pub tip_distances: [f32; 4],
}

impl HandMetrics {
    /// Measure a skeleton.  Distances are recomputed on every call.
    pub fn measure(skeleton: &HandSkeleton) -> Self {
        Self {
            tip_distances: Finger::ALL.map(|finger| skeleton.tip_to_wrist(finger)),
        }
    }

    pub fn distance(&self, finger: Finger) -> f32 {
        let slot = match finger {
            Finger::Index => 0,
            Finger::Middle => 1,
            Finger::Ring => 2,
            Finger::Pinky => 3,
        };
        self.tip_distances[slot]
    }

    /// Mean of the four fingertip distances.
    pub fn average(&self) -> f32 {
        self.tip_distances.iter().sum::<f32>() / self.tip_distances.len() as f32
    }
}

// ────────────────────────────────────────────────────────────────────────────
// GestureClassifier
// ────────────────────────────────────────────────────────────────────────────

/// Stateless gesture classifier.  See the [module docs](self) for the rule
/// table.
#[derive(Debug, Clone, Default)]
pub struct GestureClassifier {
    config: ClassifierConfig,
}

impl GestureClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Classify one frame.  `None` (no hand) always yields no symbol.
    pub fn classify(&self, skeleton: Option<&HandSkeleton>) -> Option<GestureSymbol> {
        skeleton.and_then(|s| self.classify_metrics(&HandMetrics::measure(s)))
    }

    /// Apply the rule table to pre-computed distances.
    pub fn classify_metrics(&self, metrics: &HandMetrics) -> Option<GestureSymbol> {
        if self.is_peace(metrics) {
            trace!(distances = ?metrics.tip_distances, "peace sign");
            return Some(GestureSymbol::Peace);
        }

        // NaN distances fail every comparison below and fall through to None.
        let avg = metrics.average();
        let symbol = if avg > self.config.open_above {
            Some(GestureSymbol::Open)
        } else if avg < self.config.closed_below {
            Some(GestureSymbol::Closed)
        } else {
            None
        };
        trace!(avg_dist = avg, symbol = ?symbol, "aggregate classification");
        symbol
    }

    /// Classify a single fingertip distance.
    pub fn finger_state(&self, distance: f32) -> FingerState {
        if distance > self.config.extended_above {
            FingerState::Extended
        } else if distance < self.config.folded_below {
            FingerState::Folded
        } else {
            FingerState::Ambiguous
        }
    }

    fn is_peace(&self, metrics: &HandMetrics) -> bool {
        let state = |finger| self.finger_state(metrics.distance(finger));
        state(Finger::Index) == FingerState::Extended
            && state(Finger::Middle) == FingerState::Extended
            && state(Finger::Ring) == FingerState::Folded
            && state(Finger::Pinky) == FingerState::Folded
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use lorikeet_types::{LANDMARK_COUNT, Landmark};

    /// Fan of fingertip directions, radians from vertical.
    const FAN: [f32; 4] = [-0.25, -0.08, 0.08, 0.25];

    /// Build a skeleton whose fingertips sit at the given planar distances
    /// from a wrist near the bottom of the frame.
    fn hand(distances: [f32; 4]) -> HandSkeleton {
        let wrist = Landmark::new(0.5, 0.95, 0.0);
        let mut points = [wrist; LANDMARK_COUNT];
        for (finger, (d, angle)) in Finger::ALL.iter().zip(distances.iter().zip(FAN)) {
            points[finger.tip()] = Landmark::new(
                wrist.x + d * angle.sin(),
                wrist.y - d * angle.cos(),
                -0.02,
            );
        }
        HandSkeleton::from_array(points)
    }

    fn classify(distances: [f32; 4]) -> Option<GestureSymbol> {
        GestureClassifier::default().classify(Some(&hand(distances)))
    }

    #[test]
    fn example_peace_sign() {
        assert_eq!(classify([0.5, 0.5, 0.1, 0.1]), Some(GestureSymbol::Peace));
    }

    #[test]
    fn example_open_hand() {
        assert_eq!(classify([0.6; 4]), Some(GestureSymbol::Open));
    }

    #[test]
    fn example_closed_hand() {
        assert_eq!(classify([0.1; 4]), Some(GestureSymbol::Closed));
    }

    #[test]
    fn example_relaxed_hand_emits_nothing() {
        assert_eq!(classify([0.3; 4]), None);
    }

    #[test]
    fn peace_wins_over_open_average() {
        // avg = 0.5 > 0.45, but the peace rule is checked first.
        assert_eq!(classify([0.9, 0.9, 0.1, 0.1]), Some(GestureSymbol::Peace));
    }

    #[test]
    fn peace_wins_over_closed_average() {
        // avg = 0.18 < 0.20, but the peace rule is checked first.
        assert_eq!(classify([0.31, 0.31, 0.05, 0.05]), Some(GestureSymbol::Peace));
    }

    #[test]
    fn open_when_not_peace() {
        // Ring extended → not a peace sign; avg = 0.55.
        assert_eq!(classify([0.6, 0.6, 0.6, 0.4]), Some(GestureSymbol::Open));
    }

    #[test]
    fn closed_when_not_peace() {
        // Middle folded → not a peace sign; avg = 0.1375.
        assert_eq!(classify([0.35, 0.1, 0.05, 0.05]), Some(GestureSymbol::Closed));
    }

    #[test]
    fn middle_band_is_silent_and_stable() {
        let classifier = GestureClassifier::default();
        let skel = hand([0.4, 0.35, 0.3, 0.2]);
        let first = classifier.classify(Some(&skel));
        assert_eq!(first, None);
        for _ in 0..10 {
            assert_eq!(classifier.classify(Some(&skel)), first);
        }
    }

    #[test]
    fn absent_hand_yields_no_symbol() {
        assert_eq!(GestureClassifier::default().classify(None), None);
    }

    #[test]
    fn dead_zone_finger_blocks_peace_and_defers_to_average() {
        // Ring tip at 0.27 is neither extended nor folded.  Whether this
        // should suppress classification outright is unresolved; today only
        // the aggregate rule sees it.
        assert_eq!(classify([0.5, 0.5, 0.27, 0.1]), None);
        assert_eq!(classify([0.9, 0.9, 0.27, 0.27]), Some(GestureSymbol::Open));
    }

    #[test]
    fn finger_state_thresholds_are_exclusive() {
        let c = GestureClassifier::default();
        assert_eq!(c.finger_state(0.31), FingerState::Extended);
        assert_eq!(c.finger_state(0.30), FingerState::Ambiguous);
        assert_eq!(c.finger_state(0.27), FingerState::Ambiguous);
        assert_eq!(c.finger_state(0.25), FingerState::Ambiguous);
        assert_eq!(c.finger_state(0.24), FingerState::Folded);
    }

    #[test]
    fn depth_is_ignored() {
        let mut points = *hand([0.6; 4]).landmarks();
        for p in points.iter_mut() {
            p.z = 5.0;
        }
        let skel = HandSkeleton::from_array(points);
        assert_eq!(
            GestureClassifier::default().classify(Some(&skel)),
            Some(GestureSymbol::Open)
        );
    }

    #[test]
    fn nan_landmark_yields_no_symbol() {
        let mut points = *hand([0.6; 4]).landmarks();
        points[Finger::Pinky.tip()].x = f32::NAN;
        let skel = HandSkeleton::from_array(points);
        assert_eq!(GestureClassifier::default().classify(Some(&skel)), None);
    }

    #[test]
    fn metrics_follow_finger_order() {
        let m = HandMetrics::measure(&hand([0.4, 0.3, 0.2, 0.1]));
        assert!((m.distance(Finger::Index) - 0.4).abs() < 1e-5);
        assert!((m.distance(Finger::Middle) - 0.3).abs() < 1e-5);
        assert!((m.distance(Finger::Ring) - 0.2).abs() < 1e-5);
        assert!((m.distance(Finger::Pinky) - 0.1).abs() < 1e-5);
        assert!((m.average() - 0.25).abs() < 1e-5);
    }

    #[test]
    fn custom_thresholds_are_honoured() {
        let classifier = GestureClassifier::new(ClassifierConfig {
            open_above: 0.25,
            ..ClassifierConfig::default()
        });
        assert_eq!(
            classifier.classify(Some(&hand([0.3; 4]))),
            Some(GestureSymbol::Open)
        );
    }
}
