//! Synthetic hand skeletons.
//!
//! Places each finger along a fixed fan of directions from the wrist so that
//! its tip lands at a requested planar distance.  Joints between knuckle and
//! tip are spaced evenly along the same ray; the thumb points off to the
//! side and never affects classification.

use std::str::FromStr;

use lorikeet_types::{Finger, HandSkeleton, LANDMARK_COUNT, Landmark, LorikeetError};
use serde::{Deserialize, Serialize};

/// Default wrist position: horizontally centred, near the bottom of frame.
pub const DEFAULT_WRIST: Landmark = Landmark {
    x: 0.5,
    y: 0.95,
    z: 0.0,
};

/// Finger directions in radians from straight up, in [`Finger::ALL`] order.
const FAN: [f32; 4] = [-0.25, -0.08, 0.08, 0.25];

/// Fractions of the tip distance at which MCP, PIP, DIP and tip sit.
const JOINT_FRACTIONS: [f32; 4] = [0.4, 0.6, 0.8, 1.0];

const THUMB_ANGLE: f32 = -0.9;
const THUMB_REACH: f32 = 0.2;

/// Canned hand poses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandShape {
    /// All fingers spread.
    Open,
    /// All fingers curled.
    Fist,
    /// Index and middle up, ring and pinky curled.
    Peace,
    /// Loosely half-open; lands between the open and closed bands.
    Relaxed,
    /// No hand in view.
    #[default]
    Absent,
}

impl HandShape {
    /// Fingertip-to-wrist distances that produce this shape, or `None` for
    /// [`HandShape::Absent`].
    pub fn tip_distances(self) -> Option<[f32; 4]> {
        match self {
            HandShape::Open => Some([0.6, 0.62, 0.58, 0.5]),
            HandShape::Fist => Some([0.12, 0.12, 0.11, 0.1]),
            HandShape::Peace => Some([0.5, 0.52, 0.12, 0.11]),
            HandShape::Relaxed => Some([0.34, 0.33, 0.3, 0.28]),
            HandShape::Absent => None,
        }
    }

    /// Synthesise this shape at [`DEFAULT_WRIST`].
    pub fn skeleton(self) -> Option<HandSkeleton> {
        self.tip_distances()
            .map(|d| synthesize_hand(DEFAULT_WRIST, d))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HandShape::Open => "open",
            HandShape::Fist => "fist",
            HandShape::Peace => "peace",
            HandShape::Relaxed => "relaxed",
            HandShape::Absent => "absent",
        }
    }
}

impl std::fmt::Display for HandShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HandShape {
    type Err = LorikeetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "open" => Ok(HandShape::Open),
            "fist" | "closed" => Ok(HandShape::Fist),
            "peace" => Ok(HandShape::Peace),
            "relaxed" => Ok(HandShape::Relaxed),
            "absent" | "away" | "none" => Ok(HandShape::Absent),
            other => Err(LorikeetError::Config(format!("unknown hand shape '{other}'"))),
        }
    }
}

/// Build a full 21-point skeleton whose index/middle/ring/pinky tips lie at
/// `tip_distances` (planar) from `wrist`.
pub fn synthesize_hand(wrist: Landmark, tip_distances: [f32; 4]) -> HandSkeleton {
    let mut points = [wrist; LANDMARK_COUNT];

    let along = |angle: f32, reach: f32| {
        Landmark::new(
            wrist.x + reach * angle.sin(),
            wrist.y - reach * angle.cos(),
            wrist.z,
        )
    };

    // Thumb: CMC, MCP, IP, tip.
    for (i, frac) in JOINT_FRACTIONS.iter().enumerate() {
        points[1 + i] = along(THUMB_ANGLE, THUMB_REACH * frac);
    }

    for ((finger, angle), reach) in Finger::ALL.iter().zip(FAN).zip(tip_distances) {
        let base = finger.mcp();
        for (offset, frac) in JOINT_FRACTIONS.iter().enumerate() {
            points[base + offset] = along(angle, reach * frac);
        }
    }

    HandSkeleton::from_array(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lorikeet_perception::GestureClassifier;
    use lorikeet_types::{GestureSymbol, WRIST};

    #[test]
    fn tips_land_at_requested_distances() {
        let skel = synthesize_hand(DEFAULT_WRIST, [0.4, 0.3, 0.2, 0.1]);
        for (finger, expected) in Finger::ALL.iter().zip([0.4, 0.3, 0.2, 0.1]) {
            assert!((skel.tip_to_wrist(*finger) - expected).abs() < 1e-5);
        }
    }

    #[test]
    fn tip_index_matches_ray_end() {
        let skel = synthesize_hand(DEFAULT_WRIST, [0.5; 4]);
        // MCP at 40 % of the reach, tip at 100 %.
        let mcp = skel.distance(Finger::Middle.mcp(), WRIST);
        assert!((mcp - 0.2).abs() < 1e-5);
        assert!((skel.tip_to_wrist(Finger::Middle) - 0.5).abs() < 1e-5);
    }

    #[test]
    fn canned_shapes_classify_as_intended() {
        let c = GestureClassifier::default();
        let classify = |shape: HandShape| c.classify(shape.skeleton().as_ref());
        assert_eq!(classify(HandShape::Open), Some(GestureSymbol::Open));
        assert_eq!(classify(HandShape::Fist), Some(GestureSymbol::Closed));
        assert_eq!(classify(HandShape::Peace), Some(GestureSymbol::Peace));
        assert_eq!(classify(HandShape::Relaxed), None);
        assert_eq!(classify(HandShape::Absent), None);
    }

    #[test]
    fn landmarks_stay_in_frame() {
        for shape in [HandShape::Open, HandShape::Fist, HandShape::Peace, HandShape::Relaxed] {
            let skel = shape.skeleton().unwrap();
            for p in skel.landmarks() {
                assert!((0.0..=1.0).contains(&p.x), "{shape}: x={}", p.x);
                assert!((0.0..=1.0).contains(&p.y), "{shape}: y={}", p.y);
            }
        }
    }

    #[test]
    fn shape_parsing_accepts_aliases() {
        assert_eq!("Open".parse::<HandShape>().unwrap(), HandShape::Open);
        assert_eq!("closed".parse::<HandShape>().unwrap(), HandShape::Fist);
        assert_eq!(" away ".parse::<HandShape>().unwrap(), HandShape::Absent);
        assert!("wave".parse::<HandShape>().is_err());
    }
}
