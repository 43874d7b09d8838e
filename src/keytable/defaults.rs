//! Default key table
//!
//! The table that ships with brlkeys is embedded from keytable.yaml at the
//! project root. A user table in the config directory replaces it.

use std::path::Path;

use super::command::{Cmd, Command};
use super::config::{load_keytable_file, parse_keytable_yaml};
use super::context::KeyContext;
use super::table::{bind, KeyNames, KeyTable, KeyTableError};
use super::types::KeyValue;

/// Default key table YAML embedded at compile time
const DEFAULT_KEYTABLE_YAML: &str = include_str!("../../keytable.yaml");

pub fn get_default_keytable_yaml() -> &'static str {
    DEFAULT_KEYTABLE_YAML
}

/// Load the embedded table, falling back to a minimal hardcoded one
pub fn load_default_key_table() -> Result<KeyTable, KeyTableError> {
    match parse_keytable_yaml(DEFAULT_KEYTABLE_YAML) {
        Ok(table) => {
            tracing::info!("Loaded embedded default key table");
            Ok(table)
        }
        Err(e) => {
            tracing::warn!(
                "Failed to parse embedded key table: {}, using hardcoded defaults",
                e
            );
            builtin_key_table()
        }
    }
}

/// Load the key table to use
///
/// Loading order (the first that exists wins):
/// 1. `explicit`, when given (errors are returned)
/// 2. User table at ~/.config/brlkeys/keytable.yaml (errors fall through)
/// 3. Embedded default table
pub fn load_key_table(explicit: Option<&Path>) -> Result<KeyTable, KeyTableError> {
    if let Some(path) = explicit {
        let table = load_keytable_file(path)?;
        tracing::info!("Loaded key table from {}", path.display());
        return Ok(table);
    }

    if let Some(user_path) = crate::config_paths::keytable_file() {
        if user_path.exists() {
            match load_keytable_file(&user_path) {
                Ok(table) => {
                    tracing::info!("Loaded user key table from {}", user_path.display());
                    return Ok(table);
                }
                Err(e) => {
                    tracing::warn!(
                        "Failed to load user key table from {}: {}",
                        user_path.display(),
                        e
                    );
                }
            }
        }
    }

    load_default_key_table()
}

/// Panning and line motion on a minimal set of keys
pub fn builtin_key_table() -> Result<KeyTable, KeyTableError> {
    let pan_left = KeyValue::new(0, 10);
    let pan_right = KeyValue::new(0, 11);
    let space = KeyValue::new(0, 9);
    let dot1 = KeyValue::new(0, 1);
    let dot4 = KeyValue::new(0, 4);

    let mut names = KeyNames::new();
    names.add_key("Dot1", dot1);
    names.add_key("Dot4", dot4);
    names.add_key("Space", space);
    names.add_key("PanLeft", pan_left);
    names.add_key("PanRight", pan_right);

    let mut context = KeyContext::new("default").with_title("Default");
    context.add_binding(bind([], Some(pan_left), Command::cmd(Cmd::FullWindowLeft)));
    context.add_binding(bind([], Some(pan_right), Command::cmd(Cmd::FullWindowRight)));
    context.add_binding(bind([space, dot1], None, Command::cmd(Cmd::LineUp)));
    context.add_binding(bind([space, dot4], None, Command::cmd(Cmd::LineDown)));
    context.add_binding(bind([pan_left, pan_right], None, Command::cmd(Cmd::Home)));

    KeyTable::builder().names(names).context(0, context).build()
}
