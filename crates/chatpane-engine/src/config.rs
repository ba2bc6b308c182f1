//! Configuration types for chatpane.
//!
//! This module defines the configuration schema: which responder answers
//! messages, how much history it sees, and view timing.

use crate::chat::{DEFAULT_HISTORY_WINDOW, DEFAULT_SYSTEM_PROMPT};
use crate::client::ResponderConfig;
use crate::view::{ScrollBehavior, TypingTemplate, ViewOptions, DEFAULT_ENTRY_FRAMES};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory holding chatpane files, relative to the working directory.
pub const CHATPANE_DIR: &str = ".chatpane";

/// Main configuration for chatpane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// What produces replies.
    #[serde(default)]
    pub responder: ResponderConfig,

    /// Instructions sent ahead of the conversation.
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Number of history messages sent with each request.
    #[serde(default = "default_history_window")]
    pub history_window: usize,

    /// Seconds before a request is abandoned.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,

    /// Label of the typing indicator.
    #[serde(default = "default_typing_label")]
    pub typing_label: String,

    /// Ticks a message entry transition lasts.
    #[serde(default = "default_entry_frames")]
    pub entry_frames: u8,

    /// Whether scrolling to a new message is animated.
    #[serde(default = "default_smooth_scroll")]
    pub smooth_scroll: bool,

    /// UI tick rate in milliseconds.
    #[serde(default = "default_tick_rate")]
    pub tick_rate_ms: u64,

    /// Color theme.
    #[serde(default)]
    pub theme: ThemeName,
}

fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.into()
}

fn default_history_window() -> usize {
    DEFAULT_HISTORY_WINDOW
}

fn default_request_timeout() -> u64 {
    120
}

fn default_typing_label() -> String {
    "Assistant is typing".into()
}

fn default_entry_frames() -> u8 {
    DEFAULT_ENTRY_FRAMES
}

fn default_smooth_scroll() -> bool {
    true
}

fn default_tick_rate() -> u64 {
    100
}

/// Color theme selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ThemeName {
    /// Dark theme.
    #[default]
    Mocha,
    /// Light theme.
    Latte,
    /// High contrast theme.
    HighContrast,
}

impl Config {
    /// Default config path under the given directory.
    pub fn default_path(base: &Path) -> PathBuf {
        base.join(CHATPANE_DIR).join("config.json")
    }

    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        let config: Self = serde_json::from_str(&content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration, falling back to defaults if the file is missing.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigError::Io)?;
        }
        std::fs::write(path, content).map_err(ConfigError::Io)
    }

    /// Reject values the view or client cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.entry_frames == 0 {
            return Err(ConfigError::Invalid("entry_frames must be at least 1".into()));
        }
        if self.tick_rate_ms == 0 {
            return Err(ConfigError::Invalid("tick_rate_ms must be at least 1".into()));
        }
        if self.request_timeout_seconds == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_seconds must be at least 1".into(),
            ));
        }
        if let ResponderConfig::Command { command_argv } = &self.responder {
            if command_argv.is_empty() {
                return Err(ConfigError::Invalid(
                    "responder command_argv is empty".into(),
                ));
            }
        }
        Ok(())
    }

    /// View options derived from this config.
    pub fn view_options(&self) -> ViewOptions {
        ViewOptions {
            entry_frames: self.entry_frames,
            scroll_behavior: if self.smooth_scroll {
                ScrollBehavior::Smooth
            } else {
                ScrollBehavior::Instant
            },
        }
    }

    /// Typing placeholder template derived from this config.
    pub fn typing_template(&self) -> TypingTemplate {
        TypingTemplate::new(self.typing_label.clone())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            responder: ResponderConfig::default(),
            system_prompt: default_system_prompt(),
            history_window: default_history_window(),
            request_timeout_seconds: default_request_timeout(),
            typing_label: default_typing_label(),
            entry_frames: default_entry_frames(),
            smooth_scroll: default_smooth_scroll(),
            tick_rate_ms: default_tick_rate(),
            theme: ThemeName::default(),
        }
    }
}

/// Errors that can occur when working with configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error reading or writing config.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing config JSON.
    #[error("Parse error: {0}")]
    Parse(#[source] serde_json::Error),

    /// Error serializing config to JSON.
    #[error("Serialize error: {0}")]
    Serialize(#[source] serde_json::Error),

    /// A value is out of range.
    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.history_window, 5);
        assert_eq!(config.request_timeout_seconds, 120);
        assert!(config.smooth_scroll);
        assert_eq!(config.theme, ThemeName::Mocha);
        assert!(matches!(config.responder, ResponderConfig::Echo { .. }));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let json = r#"{"history_window": 2, "theme": "latte"}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.history_window, 2);
        assert_eq!(config.theme, ThemeName::Latte);
        assert_eq!(config.typing_label, "Assistant is typing");
    }

    #[test]
    fn test_config_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = Config::default_path(dir.path());

        let config = Config {
            responder: ResponderConfig::Command {
                command_argv: vec!["cat".into()],
            },
            smooth_scroll: false,
            ..Config::default()
        };
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(&dir.path().join("nope.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_validate_rejects_zero_frames() {
        let config = Config {
            entry_frames: 0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_rejects_empty_command() {
        let config = Config {
            responder: ResponderConfig::Command {
                command_argv: Vec::new(),
            },
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_view_options() {
        let config = Config {
            smooth_scroll: false,
            entry_frames: 2,
            ..Config::default()
        };
        let options = config.view_options();
        assert_eq!(options.scroll_behavior, ScrollBehavior::Instant);
        assert_eq!(options.entry_frames, 2);
    }
}
