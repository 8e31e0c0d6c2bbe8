//! Hand scripts for `lorikeet demo` and `lorikeet run <file>`.
//!
//! A script is a TOML file with one `[[step]]` table per change of hand:
//!
//! ```toml
//! name = "wave hello"
//!
//! [[step]]
//! at_secs = 0.5
//! hand = "open"
//!
//! [[step]]
//! at_secs = 4.0
//! hand = "fist"
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use lorikeet_hal::{HandShape, ScriptStep, ScriptedProvider};
use lorikeet_types::LorikeetError;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ScriptFile {
    name: Option<String>,
    #[serde(default, rename = "step")]
    steps: Vec<ScriptStep>,
}

/// Parse script text.  `fallback_id` names the provider when the script has
/// no `name`.
pub fn parse_script(raw: &str, fallback_id: &str) -> Result<ScriptedProvider, LorikeetError> {
    let file: ScriptFile = toml::from_str(raw)
        .map_err(|e| LorikeetError::Config(format!("failed to parse script: {e}")))?;

    if file.steps.is_empty() {
        return Err(LorikeetError::Config("script has no [[step]] entries".to_string()));
    }
    // Rejects negative, non-finite and out-of-range times in one check.
    if let Some(bad) = file
        .steps
        .iter()
        .find(|s| Duration::try_from_secs_f32(s.at_secs).is_err())
    {
        return Err(LorikeetError::Config(format!(
            "step time must be a non-negative number of seconds, got {}",
            bad.at_secs
        )));
    }

    let id = file.name.unwrap_or_else(|| fallback_id.to_string());
    Ok(ScriptedProvider::from_steps(id, file.steps))
}

/// Read and parse a script file.
pub fn load_script(path: &Path) -> Result<ScriptedProvider, LorikeetError> {
    let raw = fs::read_to_string(path).map_err(|e| {
        LorikeetError::Config(format!("failed to read script at {}: {e}", path.display()))
    })?;
    let fallback = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "script".to_string());
    parse_script(&raw, &fallback)
}

/// The built-in tour: take off, land, present the heart, then land again.
pub fn demo_script() -> ScriptedProvider {
    ScriptedProvider::new("demo")
        .then(0.5, HandShape::Open)
        .then(4.0, HandShape::Fist)
        .then(6.0, HandShape::Absent)
        .then(6.5, HandShape::Peace)
        .then(7.0, HandShape::Relaxed)
        .then(12.5, HandShape::Fist)
        .then(14.0, HandShape::Absent)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lorikeet_hal::LandmarkProvider;

    #[test]
    fn parses_steps_and_name() {
        let provider = parse_script(
            r#"
name = "hello"

[[step]]
at_secs = 2.0
hand = "fist"

[[step]]
at_secs = 0.5
hand = "open"
"#,
            "fallback",
        )
        .unwrap();
        assert_eq!(provider.id(), "hello");
        assert_eq!(provider.steps().len(), 2);
        assert_eq!(provider.shape_at(Duration::from_secs(1)), HandShape::Open);
        assert_eq!(provider.duration(), Duration::from_secs(2));
    }

    #[test]
    fn missing_name_uses_fallback() {
        let provider = parse_script("[[step]]\nat_secs = 0.0\nhand = \"peace\"\n", "wave").unwrap();
        assert_eq!(provider.id(), "wave");
    }

    #[test]
    fn unknown_hand_is_rejected() {
        let err = parse_script("[[step]]\nat_secs = 0.0\nhand = \"wave\"\n", "x").unwrap_err();
        assert!(matches!(err, LorikeetError::Config(_)));
    }

    #[test]
    fn empty_script_is_rejected() {
        assert!(parse_script("name = \"nothing\"\n", "x").is_err());
    }

    #[test]
    fn negative_time_is_rejected() {
        let err = parse_script("[[step]]\nat_secs = -1.0\nhand = \"open\"\n", "x").unwrap_err();
        assert!(err.to_string().contains("non-negative"));
    }

    #[test]
    fn out_of_range_time_is_rejected() {
        let err = parse_script("[[step]]\nat_secs = 1e30\nhand = \"open\"\n", "x").unwrap_err();
        assert!(matches!(err, LorikeetError::Config(_)));
        assert!(err.to_string().contains("non-negative"));
    }

    #[test]
    fn non_finite_time_is_rejected() {
        assert!(parse_script("[[step]]\nat_secs = inf\nhand = \"open\"\n", "x").is_err());
        assert!(parse_script("[[step]]\nat_secs = nan\nhand = \"open\"\n", "x").is_err());
    }

    #[test]
    fn load_script_reads_file() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("land.toml");
        fs::write(&path, "[[step]]\nat_secs = 1.0\nhand = \"fist\"\n").unwrap();
        let provider = load_script(&path).unwrap();
        assert_eq!(provider.steps()[0].hand, HandShape::Fist);
    }

    #[test]
    fn load_script_missing_file_is_config_error() {
        let dir = tempfile::tempdir().expect("tmp dir");
        assert!(matches!(
            load_script(&dir.path().join("nope.toml")),
            Err(LorikeetError::Config(_))
        ));
    }

    #[test]
    fn demo_covers_every_gesture() {
        let demo = demo_script();
        for shape in [HandShape::Open, HandShape::Fist, HandShape::Peace] {
            assert!(demo.steps().iter().any(|s| s.hand == shape), "{shape} missing");
        }
    }
}
