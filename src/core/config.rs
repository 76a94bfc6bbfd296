//! # Configuration
//!
//! Centralizes all tuning with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.bubbles/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::clearance::{ClearanceSpec, DEFAULT_LABEL_WIDTH, DEFAULT_MIN_CLEARANCE};
use crate::core::gesture::{
    DEFAULT_DETECTION_DISTANCE, DEFAULT_DIRECTION_RATIO, DEFAULT_MAX_DRAG_DISTANCE,
    DEFAULT_REPLY_THRESHOLD, GestureConfig,
};
use crate::core::spring::{
    DEFAULT_REPLY_DAMPING_RATIO, DEFAULT_REVEAL_DAMPING_RATIO, DEFAULT_STIFFNESS, SpringConfig,
};
use crate::core::state::PipelineSettings;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct BubblesConfig {
    #[serde(default)]
    pub gesture: GestureSection,
    #[serde(default)]
    pub clearance: ClearanceSection,
    #[serde(default)]
    pub spring: SpringSection,
    #[serde(default)]
    pub display: DisplaySection,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GestureSection {
    pub detection_distance: Option<f32>,
    pub direction_ratio: Option<f32>,
    pub reply_threshold: Option<f32>,
    pub max_drag_distance: Option<f32>,
    pub reply_enabled: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ClearanceSection {
    pub label_width: Option<f32>,
    pub min_clearance: Option<f32>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct SpringSection {
    pub stiffness: Option<f32>,
    pub reply_damping_ratio: Option<f32>,
    pub reveal_damping_ratio: Option<f32>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct DisplaySection {
    pub pixels_per_cell: Option<f32>,
    pub group_chat: Option<bool>,
}

// ============================================================================
// Defaults
// ============================================================================

/// Horizontal pixels one terminal column stands for in the demo.
pub const DEFAULT_PIXELS_PER_CELL: f32 = 8.0;

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedConfig {
    pub settings: PipelineSettings,
    pub pixels_per_cell: f32,
    pub group_chat: bool,
}

/// Values supplied on the command line. `None`/`false` = not specified.
#[derive(Debug, Clone, Copy, Default)]
pub struct CliOverrides {
    pub reply_threshold: Option<f32>,
    pub group_chat: bool,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.bubbles/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".bubbles").join("config.toml"))
}

/// Load config from `~/.bubbles/config.toml`.
pub fn load_config() -> Result<BubblesConfig, ConfigError> {
    match config_path() {
        Some(path) => load_config_from(&path),
        None => {
            warn!("Could not determine home directory, using default config");
            Ok(BubblesConfig::default())
        }
    }
}

/// Load config from an explicit path.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `BubblesConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config_from(path: &Path) -> Result<BubblesConfig, ConfigError> {
    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(path);
        return Ok(BubblesConfig::default());
    }

    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: BubblesConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# Bubbles Configuration
# All settings are optional; defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.
# Distances are in pixels.

# [gesture]
# detection_distance = 10.0     # Drag length before direction is decided
# direction_ratio = 2.0         # |dx| must exceed |dy| × ratio to swipe
# reply_threshold = 60.0        # Or set BUBBLES_REPLY_THRESHOLD
# max_drag_distance = 120.0     # Drag that fully reveals the date label
# reply_enabled = true

# [clearance]
# label_width = 80.0
# min_clearance = 12.0

# [spring]
# stiffness = 400.0
# reply_damping_ratio = 0.5     # < 1.0 bounces
# reveal_damping_ratio = 1.0

# [display]
# pixels_per_cell = 8.0         # Or set BUBBLES_PIXELS_PER_CELL
# group_chat = false            # Or set BUBBLES_GROUP_CHAT
"#;

    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            warn!("Failed to create config directory: {}", e);
            return;
        }
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &BubblesConfig, cli: CliOverrides) -> ResolvedConfig {
    resolve_with_env(config, cli, |key| std::env::var(key).ok())
}

/// Keeps `value` only if it is finite and strictly positive.
fn positive(source: &str, value: Option<f32>) -> Option<f32> {
    value.filter(|n| {
        let ok = n.is_finite() && *n > 0.0;
        if !ok {
            warn!("Ignoring invalid {} = {}", source, n);
        }
        ok
    })
}

/// Keeps `value` only if it is finite and not negative.
fn non_negative(source: &str, value: Option<f32>) -> Option<f32> {
    value.filter(|n| {
        let ok = n.is_finite() && *n >= 0.0;
        if !ok {
            warn!("Ignoring invalid {} = {}", source, n);
        }
        ok
    })
}

/// Same as [`resolve`], reading environment variables through `env`.
///
/// Every numeric value, whatever its source, must be finite. Distances,
/// ratios and spring constants must also be positive. Rejected values are
/// logged and the next source down the hierarchy is used instead.
pub fn resolve_with_env(
    config: &BubblesConfig,
    cli: CliOverrides,
    env: impl Fn(&str) -> Option<String>,
) -> ResolvedConfig {
    let env_f32 = |key: &str| {
        env(key).and_then(|v| match v.trim().parse::<f32>() {
            Ok(n) => positive(key, Some(n)),
            Err(_) => {
                warn!("Ignoring invalid {}={:?}", key, v);
                None
            }
        })
    };
    let env_bool = |key: &str| {
        env(key).map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
    };

    let g = &config.gesture;
    // Reply threshold: CLI → env → config → default
    let reply_threshold = positive("--reply-threshold", cli.reply_threshold)
        .or_else(|| env_f32("BUBBLES_REPLY_THRESHOLD"))
        .or_else(|| positive("gesture.reply_threshold", g.reply_threshold))
        .unwrap_or(DEFAULT_REPLY_THRESHOLD);

    let gesture = GestureConfig {
        detection_distance: env_f32("BUBBLES_DETECTION_DISTANCE")
            .or_else(|| positive("gesture.detection_distance", g.detection_distance))
            .unwrap_or(DEFAULT_DETECTION_DISTANCE),
        direction_ratio: positive("gesture.direction_ratio", g.direction_ratio)
            .unwrap_or(DEFAULT_DIRECTION_RATIO),
        reply_threshold,
        max_drag_distance: positive("gesture.max_drag_distance", g.max_drag_distance)
            .unwrap_or(DEFAULT_MAX_DRAG_DISTANCE),
        reply_enabled: g.reply_enabled.unwrap_or(true),
    };

    let s = &config.spring;
    let springs = SpringConfig::new(
        positive("spring.stiffness", s.stiffness).unwrap_or(DEFAULT_STIFFNESS),
        positive("spring.reply_damping_ratio", s.reply_damping_ratio)
            .unwrap_or(DEFAULT_REPLY_DAMPING_RATIO),
        positive("spring.reveal_damping_ratio", s.reveal_damping_ratio)
            .unwrap_or(DEFAULT_REVEAL_DAMPING_RATIO),
    );

    let c = &config.clearance;
    let clearance = ClearanceSpec {
        label_width: non_negative("clearance.label_width", c.label_width)
            .unwrap_or(DEFAULT_LABEL_WIDTH),
        min_clearance: non_negative("clearance.min_clearance", c.min_clearance)
            .unwrap_or(DEFAULT_MIN_CLEARANCE),
    };

    // Pixels per cell: env → config → default
    let pixels_per_cell = env_f32("BUBBLES_PIXELS_PER_CELL")
        .or_else(|| positive("display.pixels_per_cell", config.display.pixels_per_cell))
        .unwrap_or(DEFAULT_PIXELS_PER_CELL);

    // Group chat: CLI flag → env → config → default
    let group_chat = cli.group_chat
        || env_bool("BUBBLES_GROUP_CHAT")
            .or(config.display.group_chat)
            .unwrap_or(false);

    ResolvedConfig {
        settings: PipelineSettings {
            gesture,
            springs,
            clearance,
        },
        pixels_per_cell,
        group_chat,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_resolve_uses_defaults_when_empty() {
        let resolved = resolve_with_env(&BubblesConfig::default(), CliOverrides::default(), no_env);
        assert_eq!(resolved.settings, PipelineSettings::default());
        assert_eq!(resolved.pixels_per_cell, DEFAULT_PIXELS_PER_CELL);
        assert!(!resolved.group_chat);
    }

    #[test]
    fn test_resolve_config_values_override_defaults() {
        let config = BubblesConfig {
            gesture: GestureSection {
                reply_threshold: Some(40.0),
                direction_ratio: Some(3.0),
                reply_enabled: Some(false),
                ..Default::default()
            },
            clearance: ClearanceSection {
                label_width: Some(100.0),
                ..Default::default()
            },
            display: DisplaySection {
                group_chat: Some(true),
                ..Default::default()
            },
            ..Default::default()
        };
        let resolved = resolve_with_env(&config, CliOverrides::default(), no_env);
        assert_eq!(resolved.settings.gesture.reply_threshold, 40.0);
        assert_eq!(resolved.settings.gesture.direction_ratio, 3.0);
        assert!(!resolved.settings.gesture.reply_enabled);
        assert_eq!(resolved.settings.clearance.required_space(), 112.0);
        assert!(resolved.group_chat);
    }

    #[test]
    fn test_env_overrides_config_and_cli_wins() {
        let config = BubblesConfig {
            gesture: GestureSection {
                reply_threshold: Some(40.0),
                ..Default::default()
            },
            ..Default::default()
        };
        let env = |key: &str| match key {
            "BUBBLES_REPLY_THRESHOLD" => Some("50".to_string()),
            "BUBBLES_PIXELS_PER_CELL" => Some("10".to_string()),
            _ => None,
        };
        let resolved = resolve_with_env(&config, CliOverrides::default(), env);
        assert_eq!(resolved.settings.gesture.reply_threshold, 50.0);
        assert_eq!(resolved.pixels_per_cell, 10.0);

        let cli = CliOverrides {
            reply_threshold: Some(70.0),
            group_chat: true,
        };
        let resolved = resolve_with_env(&config, cli, env);
        assert_eq!(resolved.settings.gesture.reply_threshold, 70.0);
        assert!(resolved.group_chat);
    }

    #[test]
    fn test_invalid_env_value_is_ignored() {
        let env = |key: &str| (key == "BUBBLES_REPLY_THRESHOLD").then(|| "-3".to_string());
        let resolved = resolve_with_env(&BubblesConfig::default(), CliOverrides::default(), env);
        assert_eq!(resolved.settings.gesture.reply_threshold, DEFAULT_REPLY_THRESHOLD);
    }

    #[test]
    fn test_out_of_range_file_values_fall_back_to_defaults() {
        let config: BubblesConfig = toml::from_str(
            r#"
[gesture]
reply_threshold = -5.0
max_drag_distance = 0.0
direction_ratio = nan
detection_distance = -1.0

[clearance]
label_width = -10.0
min_clearance = 0.0

[spring]
stiffness = inf

[display]
pixels_per_cell = 0.0
"#,
        )
        .unwrap();
        let resolved = resolve_with_env(&config, CliOverrides::default(), no_env);
        let gesture = resolved.settings.gesture;
        assert_eq!(gesture, GestureConfig::default());
        assert_eq!(resolved.settings.clearance.label_width, DEFAULT_LABEL_WIDTH);
        assert_eq!(resolved.settings.clearance.min_clearance, 0.0);
        assert_eq!(resolved.settings.springs.reply.stiffness, DEFAULT_STIFFNESS);
        assert_eq!(resolved.pixels_per_cell, DEFAULT_PIXELS_PER_CELL);
    }

    #[test]
    fn test_invalid_cli_threshold_falls_through_to_config() {
        let config = BubblesConfig {
            gesture: GestureSection {
                reply_threshold: Some(45.0),
                ..Default::default()
            },
            ..Default::default()
        };
        for bad in [-5.0, 0.0, f32::NAN] {
            let cli = CliOverrides {
                reply_threshold: Some(bad),
                group_chat: false,
            };
            let resolved = resolve_with_env(&config, cli, no_env);
            assert_eq!(resolved.settings.gesture.reply_threshold, 45.0);
        }
    }

    #[test]
    fn test_negative_threshold_from_file_cannot_break_reply_drag() {
        use crate::core::gesture::{SwipeGestureEngine, SwipeTarget};
        use crate::test_support::outbound;

        let config: BubblesConfig = toml::from_str("[gesture]\nreply_threshold = -5.0\n").unwrap();
        let resolved = resolve_with_env(&config, CliOverrides::default(), no_env);
        let mut engine = SwipeGestureEngine::new(
            resolved.settings.gesture,
            resolved.settings.springs,
            SwipeTarget::from_message(&outbound("m", "hi"), true),
        );
        engine.on_pointer_down(&mut ());
        assert!(engine.on_pointer_move(-30.0, 0.0, true, &mut ()));
        assert_eq!(engine.snapshot().reply_offset, -30.0);
    }

    #[test]
    fn test_toml_round_trip() {
        let toml_str = r#"
[gesture]
detection_distance = 12.0
direction_ratio = 2.5
reply_threshold = 48.0
max_drag_distance = 96.0
reply_enabled = true

[clearance]
label_width = 70.0
min_clearance = 10.0

[spring]
stiffness = 500.0
reply_damping_ratio = 0.4

[display]
pixels_per_cell = 9.0
group_chat = true
"#;
        let config: BubblesConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.gesture.detection_distance, Some(12.0));
        assert_eq!(config.gesture.max_drag_distance, Some(96.0));
        assert_eq!(config.clearance.min_clearance, Some(10.0));
        assert_eq!(config.spring.reply_damping_ratio, Some(0.4));
        assert_eq!(config.spring.reveal_damping_ratio, None);
        assert_eq!(config.display.group_chat, Some(true));

        let resolved = resolve_with_env(&config, CliOverrides::default(), no_env);
        assert_eq!(resolved.settings.springs.reply.stiffness, 500.0);
        assert_eq!(resolved.settings.springs.reveal.damping_ratio, DEFAULT_REVEAL_DAMPING_RATIO);
    }

    #[test]
    fn test_sparse_toml_parses() {
        // Only override one thing, everything else stays default
        let toml_str = r#"
[gesture]
reply_threshold = 30.0
"#;
        let config: BubblesConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.gesture.reply_threshold, Some(30.0));
        assert!(config.gesture.detection_distance.is_none());
        assert!(config.display.pixels_per_cell.is_none());
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[gesture\nreply_threshold = ").unwrap();
        assert!(matches!(load_config_from(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_file_generates_commented_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = load_config_from(&path).unwrap();
        assert!(config.gesture.reply_threshold.is_none());

        let generated = fs::read_to_string(&path).unwrap();
        assert!(generated.contains("# [gesture]"));
        // Everything is commented out, so it parses to the defaults.
        let reparsed = load_config_from(&path).unwrap();
        assert!(reparsed.display.group_chat.is_none());
    }
}
