//! Settings persistence using TOML
//!
//! Stores settings in ~/.config/fallgrid/settings.toml (or platform equivalent)

use crate::game::SessionConfig;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

/// Smallest board that still fits every piece in every rotation
pub const MIN_BOARD_SIDE: usize = 4;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("board must be at least {min}x{min} cells, got {rows}x{cols}", min = MIN_BOARD_SIDE)]
    BoardTooSmall { rows: usize, cols: usize },
    #[error("frame rate must be positive")]
    ZeroFps,
    #[error("{name} must be between 1 and the frame rate ({fps}), got {value}")]
    RateOutOfRange {
        name: &'static str,
        value: u32,
        fps: u32,
    },
    #[error("could not determine config directory")]
    NoConfigDir,
    #[error("failed to write settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Game settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Board size and cadence
    pub session: SessionSettings,
    /// Keybindings
    pub keys: KeyBindings,
    /// Visual settings
    pub visual: VisualSettings,
}

/// Board size and timing, as written in the settings file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    pub rows: usize,
    pub cols: usize,
    pub fps: u32,
    pub lines_per_second: u32,
    pub keys_per_second: u32,
}

impl Default for SessionSettings {
    fn default() -> Self {
        let config = SessionConfig::default();
        Self {
            rows: config.rows,
            cols: config.cols,
            fps: config.fps,
            lines_per_second: config.lines_per_second,
            keys_per_second: config.keys_per_second,
        }
    }
}

impl SessionSettings {
    /// Check the values and turn them into a game configuration
    pub fn validate(&self) -> Result<SessionConfig, ConfigError> {
        if self.rows < MIN_BOARD_SIDE || self.cols < MIN_BOARD_SIDE {
            return Err(ConfigError::BoardTooSmall {
                rows: self.rows,
                cols: self.cols,
            });
        }
        if self.fps == 0 {
            return Err(ConfigError::ZeroFps);
        }
        for (name, value) in [
            ("lines per second", self.lines_per_second),
            ("keys per second", self.keys_per_second),
        ] {
            if value == 0 || value > self.fps {
                return Err(ConfigError::RateOutOfRange {
                    name,
                    value,
                    fps: self.fps,
                });
            }
        }
        Ok(SessionConfig {
            rows: self.rows,
            cols: self.cols,
            fps: self.fps,
            lines_per_second: self.lines_per_second,
            keys_per_second: self.keys_per_second,
        })
    }
}

/// Key bindings (stored as strings for easy editing)
/// Each action can have one or more keys bound to it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub move_left: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub move_right: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub rotate_cw: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub soft_drop: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub hard_drop: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub pause: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub restart: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub quit: Vec<String>,
}

/// Deserialize keys as either a single string or array of strings
fn deserialize_keys<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};

    struct KeysVisitor;

    impl<'de> Visitor<'de> for KeysVisitor {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a string or array of strings")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![v.to_string()])
        }

        fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
        where
            A: de::SeqAccess<'de>,
        {
            let mut keys = Vec::new();
            while let Some(key) = seq.next_element::<String>()? {
                keys.push(key);
            }
            Ok(keys)
        }
    }

    deserializer.deserialize_any(KeysVisitor)
}

/// Serialize keys: single key as string, multiple as array
fn serialize_keys<S>(keys: &[String], serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    use serde::ser::SerializeSeq;

    if let [key] = keys {
        serializer.serialize_str(key)
    } else {
        let mut seq = serializer.serialize_seq(Some(keys.len()))?;
        for key in keys {
            seq.serialize_element(key)?;
        }
        seq.end()
    }
}

/// Visual settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualSettings {
    /// Ghost piece visibility
    pub show_ghost: bool,
    /// Block style: "solid", "bracket", "round"
    pub block_style: String,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            move_left: vec!["Left".to_string(), "a".to_string()],
            move_right: vec!["Right".to_string(), "d".to_string()],
            rotate_cw: vec!["Up".to_string(), "w".to_string()],
            soft_drop: vec!["Down".to_string(), "s".to_string()],
            hard_drop: vec!["Space".to_string()],
            pause: vec!["p".to_string(), "Esc".to_string()],
            restart: vec!["r".to_string()],
            quit: vec!["q".to_string()],
        }
    }
}

impl Default for VisualSettings {
    fn default() -> Self {
        Self {
            show_ghost: true,
            block_style: "solid".to_string(),
        }
    }
}

impl Settings {
    /// Get the config directory path
    fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("com", "fallgrid", "fallgrid").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Get the settings file path
    pub fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("settings.toml"))
    }

    /// Load settings from file, or fall back to defaults
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else {
            return Self::default();
        };

        match fs::read_to_string(&path) {
            Ok(contents) => Self::parse(&contents).unwrap_or_else(|e| {
                tracing::warn!("Ignoring unreadable settings {}: {}", path.display(), e);
                Self::default()
            }),
            Err(_) => {
                tracing::debug!("No settings at {}, using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Parse settings from TOML text
    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Save settings to file
    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let dir = Self::config_dir().ok_or(ConfigError::NoConfigDir)?;
        let path = dir.join("settings.toml");

        fs::create_dir_all(&dir)?;
        let contents = toml::to_string_pretty(self)?;
        fs::write(&path, contents)?;

        tracing::info!("Saved settings to {}", path.display());
        Ok(path)
    }
}

impl VisualSettings {
    /// Get the block characters based on style
    pub fn block_chars(&self) -> (&'static str, &'static str) {
        match self.block_style.as_str() {
            "bracket" => ("[]", ".."),
            "round" => ("()", ".."),
            _ => ("██", "░░"), // "solid" or default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = SessionSettings::default().validate().unwrap();
        assert_eq!(config, SessionConfig::default());
    }

    #[test]
    fn test_rejects_small_board() {
        let settings = SessionSettings {
            rows: 3,
            ..SessionSettings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::BoardTooSmall { rows: 3, cols: 10 })
        ));
    }

    #[test]
    fn test_rejects_bad_rates() {
        let zero_fps = SessionSettings {
            fps: 0,
            ..SessionSettings::default()
        };
        assert!(matches!(zero_fps.validate(), Err(ConfigError::ZeroFps)));

        let too_fast = SessionSettings {
            lines_per_second: 61,
            ..SessionSettings::default()
        };
        assert!(matches!(
            too_fast.validate(),
            Err(ConfigError::RateOutOfRange { value: 61, .. })
        ));

        let no_keys = SessionSettings {
            keys_per_second: 0,
            ..SessionSettings::default()
        };
        assert!(no_keys.validate().is_err());
    }

    #[test]
    fn test_parse_partial_file() {
        let settings = Settings::parse(
            r#"
            [session]
            rows = 12

            [keys]
            hard_drop = "Enter"
            rotate_cw = ["Up", "x"]
            "#,
        )
        .unwrap();
        assert_eq!(settings.session.rows, 12);
        assert_eq!(settings.session.cols, 10);
        assert_eq!(settings.keys.hard_drop, vec!["Enter"]);
        assert_eq!(settings.keys.rotate_cw, vec!["Up", "x"]);
        assert_eq!(settings.keys.quit, vec!["q"]);
        assert!(settings.visual.show_ghost);
    }

    #[test]
    fn test_roundtrip_through_toml() {
        let mut settings = Settings::default();
        settings.session.fps = 30;
        settings.visual.block_style = "bracket".to_string();
        let text = toml::to_string_pretty(&settings).unwrap();
        let parsed = Settings::parse(&text).unwrap();
        assert_eq!(parsed.session, settings.session);
        assert_eq!(parsed.keys.move_left, settings.keys.move_left);
        assert_eq!(parsed.keys.hard_drop, vec!["Space"]);
        assert_eq!(parsed.visual.block_chars(), ("[]", ".."));
    }

    #[test]
    fn test_error_messages() {
        let err = SessionSettings {
            keys_per_second: 90,
            ..SessionSettings::default()
        }
        .validate()
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "keys per second must be between 1 and the frame rate (60), got 90"
        );
    }
}
