//! User preferences
//!
//! Stored in `~/.config/brlkeys/preferences.yaml`. The engine receives a
//! snapshot explicitly; nothing here is global.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading or saving preferences
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no config directory available")]
    NoConfigDir,

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid preferences in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to serialize preferences: {0}")]
    Serialize(#[from] serde_yaml::Error),
}

/// How typed braille characters reach the host
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrailleTypingMode {
    /// Dots are translated to text
    #[default]
    Text,
    /// Dots are typed as Unicode braille patterns
    Dots,
}

/// Which windows the full-window pan commands skip
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipBlankWindowsMode {
    /// Every blank window
    #[default]
    All,
    /// Blank windows at the end of a line
    EndOfLine,
    /// The rest of a line once it is blank
    RestOfLine,
}

/// Preferences read by the key engine and the navigation handler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    /// Hold time (ms) before a key's long-press command fires
    pub long_press_time: u64,
    pub autorepeat_enabled: bool,
    /// Interval (ms) between repeats of a held repeatable command
    pub autorepeat_interval: u64,
    /// Allow the full-window pan commands to repeat
    pub autorepeat_panning: bool,
    /// Fire a deferred command when the first key is released rather than the last
    pub release_on_first: bool,
    pub braille_typing_mode: BrailleTypingMode,
    /// Input commands are rejected while this is off
    pub braille_keyboard_enabled: bool,
    /// Allow space+dots chords from mapped keys
    pub braille_quick_space: bool,
    pub skip_identical_lines: bool,
    pub skip_blank_windows: bool,
    pub skip_blank_windows_mode: SkipBlankWindowsMode,
    /// End braille windows at the last space that fits
    pub word_wrap: bool,
    /// Announce the title of a context when switching to it
    pub speak_key_context: bool,
    pub show_screen_cursor: bool,
    /// Time (ms) after which held keys are force-released; 0 disables it
    pub autorelease_time: u64,
    /// Regular expressions recognising command prompts
    pub prompt_patterns: Vec<String>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            long_press_time: 500,
            autorepeat_enabled: true,
            autorepeat_interval: 100,
            autorepeat_panning: false,
            release_on_first: false,
            braille_typing_mode: BrailleTypingMode::Text,
            braille_keyboard_enabled: true,
            braille_quick_space: false,
            skip_identical_lines: false,
            skip_blank_windows: false,
            skip_blank_windows_mode: SkipBlankWindowsMode::All,
            word_wrap: false,
            speak_key_context: false,
            show_screen_cursor: true,
            autorelease_time: 20_000,
            prompt_patterns: Vec::new(),
        }
    }
}

impl Preferences {
    /// Load preferences from disk, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = crate::config_paths::preferences_file() else {
            tracing::debug!("No config directory available, using default preferences");
            return Self::default();
        };

        if !path.exists() {
            tracing::debug!(
                "Preferences not found at {}, using defaults",
                path.display()
            );
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(prefs) => prefs,
            Err(e) => {
                tracing::warn!("{}; using default preferences", e);
                Self::default()
            }
        }
    }

    /// Load preferences from a specific file
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let prefs = serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!("Loaded preferences from {}", path.display());
        Ok(prefs)
    }

    /// Save preferences to the config directory
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = crate::config_paths::preferences_file().ok_or(ConfigError::NoConfigDir)?;
        self.save_to(&path)
    }

    /// Save preferences to a specific file
    ///
    /// Creates the parent directory if it doesn't exist.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::info!("Saved preferences to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let prefs: Preferences = serde_yaml::from_str("long_press_time: 750\nword_wrap: true\n").unwrap();
        assert_eq!(prefs.long_press_time, 750);
        assert!(prefs.word_wrap);
        assert_eq!(prefs.autorepeat_interval, 100);
        assert_eq!(prefs.skip_blank_windows_mode, SkipBlankWindowsMode::All);
    }

    #[test]
    fn test_enum_names() {
        let prefs: Preferences = serde_yaml::from_str(
            "braille_typing_mode: dots\nskip_blank_windows_mode: rest_of_line\n",
        )
        .unwrap();
        assert_eq!(prefs.braille_typing_mode, BrailleTypingMode::Dots);
        assert_eq!(prefs.skip_blank_windows_mode, SkipBlankWindowsMode::RestOfLine);
    }
}
