//! Settings file – reads/writes `~/.lorikeet/config.toml`.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use lorikeet_perception::ClassifierConfig;
use lorikeet_runtime::BlendMode;
use lorikeet_types::LorikeetError;
use serde::{Deserialize, Serialize};

/// Smoothing mode as written in the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendKind {
    #[default]
    PerTick,
    TimeScaled,
}

impl std::fmt::Display for BlendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BlendKind::PerTick => write!(f, "per_tick"),
            BlendKind::TimeScaled => write!(f, "time_scaled"),
        }
    }
}

impl FromStr for BlendKind {
    type Err = LorikeetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "per_tick" => Ok(BlendKind::PerTick),
            "time_scaled" => Ok(BlendKind::TimeScaled),
            other => Err(LorikeetError::Config(format!("unknown blend mode '{other}'"))),
        }
    }
}

/// Persisted user configuration stored in `~/.lorikeet/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Render ticks per second.
    #[serde(default = "default_tick_hz")]
    pub tick_hz: u32,

    /// Landmark frames per second.
    #[serde(default = "default_frame_hz")]
    pub frame_hz: u32,

    #[serde(default)]
    pub blend: BlendKind,

    /// Tick rate the blend factors were tuned at; used by `time_scaled`.
    #[serde(default = "default_reference_hz")]
    pub reference_hz: f32,

    /// Print tick reports as JSON lines on stdout.
    #[serde(default)]
    pub print_pose: bool,

    /// Print every N-th tick when `print_pose` is on.
    #[serde(default = "default_pose_every")]
    pub pose_every: u32,

    /// Gesture thresholds.
    #[serde(default)]
    pub classifier: ClassifierConfig,
}

fn default_tick_hz() -> u32 {
    60
}
fn default_frame_hz() -> u32 {
    30
}
fn default_reference_hz() -> f32 {
    60.0
}
fn default_pose_every() -> u32 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tick_hz: default_tick_hz(),
            frame_hz: default_frame_hz(),
            blend: BlendKind::default(),
            reference_hz: default_reference_hz(),
            print_pose: false,
            pose_every: default_pose_every(),
            classifier: ClassifierConfig::default(),
        }
    }
}

impl Config {
    pub fn blend_mode(&self) -> BlendMode {
        match self.blend {
            BlendKind::PerTick => BlendMode::PerTick,
            BlendKind::TimeScaled => BlendMode::TimeScaled {
                reference_hz: self.reference_hz,
            },
        }
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.tick_hz.max(1)))
    }

    pub fn frame_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.frame_hz.max(1)))
    }

    /// Reject settings the runtime cannot work with.
    ///
    /// # Errors
    ///
    /// Returns [`LorikeetError::Config`] for a zero cadence or a
    /// non-positive reference rate.
    pub fn validate(&self) -> Result<(), LorikeetError> {
        if self.tick_hz == 0 {
            return Err(LorikeetError::Config("tick_hz must be at least 1".to_string()));
        }
        if self.frame_hz == 0 {
            return Err(LorikeetError::Config("frame_hz must be at least 1".to_string()));
        }
        if self.reference_hz.is_nan() || self.reference_hz <= 0.0 {
            return Err(LorikeetError::Config(
                "reference_hz must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Return the path to `~/.lorikeet/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

/// Build the config path relative to the given home directory.
pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".lorikeet").join("config.toml")
}

/// Load the config from disk.  Returns `None` if the file does not exist.
pub fn load() -> Result<Option<Config>, LorikeetError> {
    load_from(&config_path())
}

/// Load the config from a specific path.
pub(crate) fn load_from(path: &Path) -> Result<Option<Config>, LorikeetError> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path).map_err(|e| {
        LorikeetError::Config(format!("failed to read config at {}: {e}", path.display()))
    })?;
    let mut cfg = from_toml(&raw)?;
    apply_env_overrides(&mut cfg);
    cfg.validate()?;
    Ok(Some(cfg))
}

/// Defaults with the `LORIKEET_*` overrides applied; used when no config
/// file exists.
pub fn defaults() -> Result<Config, LorikeetError> {
    let mut cfg = Config::default();
    apply_env_overrides(&mut cfg);
    cfg.validate()?;
    Ok(cfg)
}

/// Parse config text without consulting the environment.
pub(crate) fn from_toml(raw: &str) -> Result<Config, LorikeetError> {
    toml::from_str(raw).map_err(|e| LorikeetError::Config(format!("failed to parse config: {e}")))
}

/// Apply `LORIKEET_*` environment variable overrides to `cfg`.
///
/// Supported variables:
///
/// | Variable | Config field |
/// |---|---|
/// | `LORIKEET_TICK_HZ` | `tick_hz` |
/// | `LORIKEET_FRAME_HZ` | `frame_hz` |
/// | `LORIKEET_PRINT_POSE` | `print_pose` |
/// | `LORIKEET_BLEND` | `blend` |
///
/// Values that do not parse are ignored.
pub fn apply_env_overrides(cfg: &mut Config) {
    if let Ok(v) = std::env::var("LORIKEET_TICK_HZ")
        && let Ok(hz) = v.trim().parse::<u32>()
    {
        cfg.tick_hz = hz;
    }
    if let Ok(v) = std::env::var("LORIKEET_FRAME_HZ")
        && let Ok(hz) = v.trim().parse::<u32>()
    {
        cfg.frame_hz = hz;
    }
    if let Ok(v) = std::env::var("LORIKEET_PRINT_POSE")
        && let Ok(on) = v.trim().parse::<bool>()
    {
        cfg.print_pose = on;
    }
    if let Ok(v) = std::env::var("LORIKEET_BLEND")
        && let Ok(kind) = v.parse::<BlendKind>()
    {
        cfg.blend = kind;
    }
}

/// Save the config to disk, creating `~/.lorikeet/` if necessary.
pub fn save(cfg: &Config) -> Result<(), LorikeetError> {
    save_to(cfg, &config_path())
}

/// Save the config to a specific path.
pub(crate) fn save_to(cfg: &Config, path: &Path) -> Result<(), LorikeetError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            LorikeetError::Config(format!("failed to create config directory: {e}"))
        })?;
    }
    let raw = toml::to_string_pretty(cfg)
        .map_err(|e| LorikeetError::Serialization(format!("failed to serialize config: {e}")))?;
    fs::write(path, raw).map_err(|e| {
        LorikeetError::Config(format!("failed to write config at {}: {e}", path.display()))
    })
}

/// Serialises tests that read or write `LORIKEET_*` / `HOME`.
#[cfg(test)]
pub(crate) static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
