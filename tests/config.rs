//! Configuration system tests
//!
//! Tests for config paths, preferences persistence, and key table loading.

use std::fs;

use brlkeys::config::{ConfigError, SkipBlankWindowsMode};
use brlkeys::config_paths;
use brlkeys::keytable::{load_key_table, load_keytable_file, Cmd, Command, KeyTableError};
use brlkeys::Preferences;
use tempfile::TempDir;

// ========================================================================
// Config Paths Tests
// ========================================================================

#[test]
fn test_config_dir_contains_app_name() {
    if let Some(dir) = config_paths::config_dir() {
        assert!(dir.to_string_lossy().contains("brlkeys"));
    }
}

#[test]
fn test_files_live_in_config_dir() {
    let Some(config) = config_paths::config_dir() else {
        return;
    };
    let prefs = config_paths::preferences_file().unwrap();
    let table = config_paths::keytable_file().unwrap();
    let logs = config_paths::logs_dir().unwrap();

    assert!(prefs.starts_with(&config));
    assert!(prefs.to_string_lossy().ends_with("preferences.yaml"));
    assert!(table.to_string_lossy().ends_with("keytable.yaml"));
    assert!(logs.ends_with("logs"));
}

// ========================================================================
// Preferences Tests
// ========================================================================

#[test]
fn test_preferences_save_and_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("preferences.yaml");

    let mut prefs = Preferences::default();
    prefs.long_press_time = 800;
    prefs.skip_blank_windows = true;
    prefs.skip_blank_windows_mode = SkipBlankWindowsMode::EndOfLine;
    prefs.prompt_patterns = vec![r"\$ ".to_string()];
    prefs.save_to(&path).unwrap();

    let loaded = Preferences::load_from(&path).unwrap();
    assert_eq!(loaded, prefs);
}

#[test]
fn test_preferences_missing_file() {
    let dir = TempDir::new().unwrap();
    let result = Preferences::load_from(&dir.path().join("absent.yaml"));
    assert!(matches!(result, Err(ConfigError::Io { .. })));
}

#[test]
fn test_preferences_invalid_yaml() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("preferences.yaml");
    fs::write(&path, "long_press_time: soon\n").unwrap();

    let error = Preferences::load_from(&path).unwrap_err();
    assert!(matches!(error, ConfigError::Parse { .. }));
    assert!(error.to_string().contains("preferences.yaml"));
}

// ========================================================================
// Key Table Loading Tests
// ========================================================================

const SMALL_TABLE: &str = r#"
keys:
  Up: [0, 1]
  Down: [0, 2]
contexts:
  - id: 0
    bind:
      - keys: "!Up"
        command: LNUP
      - keys: "!Down"
        command: LNDN
        long: BOT
"#;

#[test]
fn test_load_keytable_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("keytable.yaml");
    fs::write(&path, SMALL_TABLE).unwrap();

    let table = load_keytable_file(&path).unwrap();
    let context = table.context(0).unwrap();
    assert_eq!(context.name, "default");
    assert_eq!(context.bindings().len(), 2);
    let down = context
        .bindings()
        .iter()
        .find(|binding| binding.primary.map(|bound| bound.value) == Some(Command::cmd(Cmd::LineDown)))
        .unwrap();
    assert_eq!(down.secondary.map(|bound| bound.value), Some(Command::cmd(Cmd::Bottom)));
}

#[test]
fn test_explicit_table_errors_are_returned() {
    let dir = TempDir::new().unwrap();

    let missing = dir.path().join("missing.yaml");
    assert!(matches!(load_key_table(Some(&missing)), Err(KeyTableError::Io { .. })));

    let path = dir.path().join("bad.yaml");
    fs::write(&path, SMALL_TABLE.replace("!Up", "!Left")).unwrap();
    assert!(matches!(load_key_table(Some(&path)), Err(KeyTableError::UnknownKey(_))));

    fs::write(&path, SMALL_TABLE.replace("LNUP", "FLY")).unwrap();
    assert!(matches!(load_key_table(Some(&path)), Err(KeyTableError::UnknownCommand(_))));

    fs::write(&path, "contexts: [").unwrap();
    assert!(matches!(load_key_table(Some(&path)), Err(KeyTableError::Parse(_))));
}
