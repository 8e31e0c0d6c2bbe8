//! `lorikeet-types` – shared data model for the Lorikeet gesture puppet.
//!
//! Every other crate in the workspace speaks in these types: the landmark
//! provider emits [`HandSkeleton`]s, the classifier turns them into
//! [`GestureSymbol`]s, the behavior controller consumes [`Command`]s and
//! publishes a [`Pose`] each tick.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ────────────────────────────────────────────────────────────────────────────
// Hand landmarks
// ────────────────────────────────────────────────────────────────────────────

/// Number of keypoints in one hand skeleton.
pub const LANDMARK_COUNT: usize = 21;

/// Index of the palm base (wrist) landmark.
pub const WRIST: usize = 0;

/// A single detected keypoint.
///
/// `x` and `y` are normalised to `[0, 1]` relative to the camera frame; `z` is
/// a relative depth that the classifier never looks at.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance in the image plane (`z` ignored).
    pub fn planar_distance(&self, other: &Landmark) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// The four long fingers the classifier inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Finger {
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub const ALL: [Finger; 4] = [Finger::Index, Finger::Middle, Finger::Ring, Finger::Pinky];

    /// Landmark index of the fingertip.
    pub fn tip(self) -> usize {
        match self {
            Finger::Index => 8,
            Finger::Middle => 12,
            Finger::Ring => 16,
            Finger::Pinky => 20,
        }
    }

    /// Landmark index of the metacarpophalangeal (knuckle) joint.
    pub fn mcp(self) -> usize {
        match self {
            Finger::Index => 5,
            Finger::Middle => 9,
            Finger::Ring => 13,
            Finger::Pinky => 17,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Finger::Index => "index",
            Finger::Middle => "middle",
            Finger::Ring => "ring",
            Finger::Pinky => "pinky",
        }
    }
}

impl std::fmt::Display for Finger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One hand's worth of landmarks for a single frame.
///
/// The index → joint mapping follows the provider convention (0 = wrist,
/// 5/9/13/17 = knuckles, 8/12/16/20 = fingertips).  A skeleton always holds
/// exactly [`LANDMARK_COUNT`] points; shorter or longer inputs are rejected by
/// [`HandSkeleton::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandSkeleton {
    landmarks: [Landmark; LANDMARK_COUNT],
}

impl HandSkeleton {
    /// Build a skeleton from a provider frame.
    ///
    /// # Errors
    ///
    /// Returns [`LorikeetError::MalformedSkeleton`] when `landmarks` does not
    /// contain exactly [`LANDMARK_COUNT`] points.
    pub fn new(landmarks: Vec<Landmark>) -> Result<Self, LorikeetError> {
        let actual = landmarks.len();
        let landmarks: [Landmark; LANDMARK_COUNT] =
            landmarks
                .try_into()
                .map_err(|_| LorikeetError::MalformedSkeleton {
                    expected: LANDMARK_COUNT,
                    actual,
                })?;
        Ok(Self { landmarks })
    }

    pub fn from_array(landmarks: [Landmark; LANDMARK_COUNT]) -> Self {
        Self { landmarks }
    }

    pub fn landmarks(&self) -> &[Landmark; LANDMARK_COUNT] {
        &self.landmarks
    }

    pub fn wrist(&self) -> Landmark {
        self.landmarks[WRIST]
    }

    pub fn tip(&self, finger: Finger) -> Landmark {
        self.landmarks[finger.tip()]
    }

    /// Planar distance between two landmarks, computed fresh on every call.
    ///
    /// # Panics
    ///
    /// Panics if either index is `>= LANDMARK_COUNT`.
    pub fn distance(&self, a: usize, b: usize) -> f32 {
        self.landmarks[a].planar_distance(&self.landmarks[b])
    }

    /// Planar distance from the fingertip of `finger` to the wrist.
    pub fn tip_to_wrist(&self, finger: Finger) -> f32 {
        self.distance(finger.tip(), WRIST)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Gestures and commands
// ────────────────────────────────────────────────────────────────────────────

/// A discrete per-frame classification result.
///
/// "No symbol this frame" is expressed as `Option::<GestureSymbol>::None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GestureSymbol {
    Open,
    Closed,
    Peace,
}

impl GestureSymbol {
    pub fn as_str(self) -> &'static str {
        match self {
            GestureSymbol::Open => "open",
            GestureSymbol::Closed => "closed",
            GestureSymbol::Peace => "peace",
        }
    }
}

impl std::fmt::Display for GestureSymbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Commands accepted by the behavior controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    Fly,
    Land,
    ShowLove,
}

impl From<GestureSymbol> for Command {
    fn from(symbol: GestureSymbol) -> Self {
        match symbol {
            GestureSymbol::Open => Command::Fly,
            GestureSymbol::Closed => Command::Land,
            GestureSymbol::Peace => Command::ShowLove,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Behavior state
// ────────────────────────────────────────────────────────────────────────────

/// Top-level state of the behavior controller.
///
/// Take-off and cruise share a single `Flying` state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BehaviorState {
    #[default]
    Idle,
    Flying,
    Landing,
    PresentingLove,
}

impl BehaviorState {
    pub fn as_str(self) -> &'static str {
        match self {
            BehaviorState::Idle => "idle",
            BehaviorState::Flying => "flying",
            BehaviorState::Landing => "landing",
            BehaviorState::PresentingLove => "presenting_love",
        }
    }
}

impl std::fmt::Display for BehaviorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sub-stage of [`BehaviorState::PresentingLove`].
///
/// Phases are ordered; the controller only ever moves to [`LovePhase::next`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum LovePhase {
    /// Rotate to face away from the viewer.
    #[default]
    TurnAway = 0,
    /// Walk backward with a footstep bob.
    WalkBack = 1,
    /// Pause and reveal the heart behind the body.
    RevealProp = 2,
    /// Rotate to face the viewer again, bringing the heart to the front.
    TurnForward = 3,
    /// Walk forward holding the heart.  No exit.
    WalkForward = 4,
}

impl LovePhase {
    pub fn index(self) -> u8 {
        self as u8
    }

    /// The following phase, or `None` for the final one.
    pub fn next(self) -> Option<LovePhase> {
        match self {
            LovePhase::TurnAway => Some(LovePhase::WalkBack),
            LovePhase::WalkBack => Some(LovePhase::RevealProp),
            LovePhase::RevealProp => Some(LovePhase::TurnForward),
            LovePhase::TurnForward => Some(LovePhase::WalkForward),
            LovePhase::WalkForward => None,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Pose
// ────────────────────────────────────────────────────────────────────────────

/// Transform of the auxiliary heart prop, relative to the character.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PropPose {
    pub visible: bool,
    /// Uniform scale; `0.0` is fully shrunk.
    pub scale: f32,
    pub position: Vec3,
    /// Rotation about the vertical axis (radians).
    pub yaw: f32,
}

impl Default for PropPose {
    fn default() -> Self {
        Self {
            visible: false,
            scale: 0.0,
            position: Vec3::ZERO,
            yaw: 0.0,
        }
    }
}

/// Full set of continuous transform parameters read by the renderer each
/// tick.  Angles are in radians.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    /// Character offset; `y` is altitude, `z` is depth (negative = away).
    pub position: Vec3,
    /// Rotation about the lateral axis; negative pitches forward.
    pub pitch: f32,
    /// Rotation about the vertical axis; `π` faces away from the viewer.
    pub yaw: f32,
    /// Idle sway of the body mesh.
    pub body_sway: f32,
    /// Idle yaw of the head mesh.
    pub head_yaw: f32,
    pub left_wing: f32,
    pub right_wing: f32,
    pub prop: PropPose,
}

impl Pose {
    pub fn altitude(&self) -> f32 {
        self.position.y
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Errors
// ────────────────────────────────────────────────────────────────────────────

/// Workspace-wide error type.
///
/// The classifier and the controller are total and never produce one of
/// these; errors come from the edges (landmark sources, files, output).
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LorikeetError {
    #[error("Malformed skeleton: expected {expected} landmarks, got {actual}")]
    MalformedSkeleton { expected: usize, actual: usize },

    #[error("Landmark provider {provider} failed: {details}")]
    ProviderFault { provider: String, details: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_hand() -> Vec<Landmark> {
        (0..LANDMARK_COUNT)
            .map(|i| Landmark::new(i as f32 * 0.01, 0.5, 0.0))
            .collect()
    }

    #[test]
    fn skeleton_accepts_exactly_21_landmarks() {
        let skel = HandSkeleton::new(flat_hand()).expect("21 points must be accepted");
        assert_eq!(skel.landmarks().len(), LANDMARK_COUNT);
        assert!((skel.wrist().x - 0.0).abs() < 1e-6);
    }

    #[test]
    fn skeleton_rejects_short_frame() {
        let mut points = flat_hand();
        points.truncate(20);
        let err = HandSkeleton::new(points).unwrap_err();
        assert_eq!(
            err,
            LorikeetError::MalformedSkeleton {
                expected: 21,
                actual: 20
            }
        );
    }

    #[test]
    fn skeleton_rejects_long_frame() {
        let mut points = flat_hand();
        points.push(Landmark::default());
        assert!(matches!(
            HandSkeleton::new(points),
            Err(LorikeetError::MalformedSkeleton { actual: 22, .. })
        ));
    }

    #[test]
    fn planar_distance_ignores_depth() {
        let a = Landmark::new(0.0, 0.0, 0.0);
        let b = Landmark::new(0.3, 0.4, 9.0);
        assert!((a.planar_distance(&b) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn finger_display_matches_serde_name() {
        for finger in Finger::ALL {
            let json = serde_json::to_string(&finger).unwrap();
            assert_eq!(json, format!("\"{finger}\""));
        }
        assert_eq!(Finger::Pinky.to_string(), "pinky");
    }

    #[test]
    fn tip_to_wrist_uses_fingertip_indices() {
        let mut points = vec![Landmark::new(0.5, 0.9, 0.0); LANDMARK_COUNT];
        points[Finger::Ring.tip()] = Landmark::new(0.5, 0.6, 0.0);
        let skel = HandSkeleton::new(points).unwrap();
        assert!((skel.tip_to_wrist(Finger::Ring) - 0.3).abs() < 1e-5);
        assert!(skel.tip_to_wrist(Finger::Index).abs() < 1e-6);
    }

    #[test]
    fn gestures_map_to_commands() {
        assert_eq!(Command::from(GestureSymbol::Open), Command::Fly);
        assert_eq!(Command::from(GestureSymbol::Closed), Command::Land);
        assert_eq!(Command::from(GestureSymbol::Peace), Command::ShowLove);
    }

    #[test]
    fn gesture_symbol_serializes_lowercase() {
        let json = serde_json::to_string(&GestureSymbol::Peace).unwrap();
        assert_eq!(json, "\"peace\"");
        let back: GestureSymbol = serde_json::from_str("\"closed\"").unwrap();
        assert_eq!(back, GestureSymbol::Closed);
    }

    #[test]
    fn love_phases_are_strictly_ordered() {
        let mut phase = LovePhase::default();
        let mut seen = vec![phase.index()];
        while let Some(next) = phase.next() {
            assert!(next > phase);
            phase = next;
            seen.push(phase.index());
        }
        assert_eq!(seen, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn default_pose_hides_prop() {
        let pose = Pose::default();
        assert!(!pose.prop.visible);
        assert_eq!(pose.prop.scale, 0.0);
        assert_eq!(pose.altitude(), 0.0);
    }

    #[test]
    fn pose_serializes_to_json() {
        let pose = Pose {
            yaw: std::f32::consts::PI,
            ..Pose::default()
        };
        let json = serde_json::to_string(&pose).unwrap();
        assert!(json.contains("\"yaw\""));
        assert!(json.contains("\"prop\""));
    }

    #[test]
    fn error_display() {
        let err = LorikeetError::ProviderFault {
            provider: "webcam".to_string(),
            details: "device busy".to_string(),
        };
        assert!(err.to_string().contains("webcam"));
        assert!(err.to_string().contains("device busy"));
    }
}
