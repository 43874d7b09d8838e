//! Key table translation engine
//!
//! This module turns raw key events from a braille display into commands:
//! - Matches held keys against combinations, with group wildcards
//! - Distinguishes immediate (fire on press) and deferred (fire on release) bindings
//! - Fires long-press and autorepeat commands from alarms
//! - Synthesises braille input from mapped keys
//! - Switches between one-shot and persistent contexts
//!
//! # Architecture
//!
//! ```text
//! (group, number, press) → KeyTable::process_key_event() → Command → CommandQueue
//! ```
//!
//! # Loading Key Tables
//!
//! ```ignore
//! // Load the embedded default table
//! let table = load_default_key_table()?;
//!
//! // Or load from a YAML file
//! let table = load_keytable_file(Path::new("keytable.yaml"))?;
//! ```

mod binding;
mod command;
mod config;
mod context;
mod defaults;
mod lookup;
mod table;
mod translate;
mod types;

pub use binding::{BoundCommand, HotkeyEntry, KeyBinding, KeyboardFunction, MappedKeyEntry};
pub use command::{
    Argument, Block, Cmd, Command, CommandEntry, CommandFlags, PassKey, ALL_DOTS, COMMANDS, DOT1,
    DOT2, DOT3, DOT4, DOT5, DOT6, DOT7, DOT8, DOT_SPACE, UNICODE_BRAILLE_ROW,
};
pub use config::{load_keytable_file, parse_combination, parse_keytable_yaml};
pub use context::KeyContext;
pub use defaults::{builtin_key_table, get_default_keytable_yaml, load_default_key_table, load_key_table};
pub use lookup::{find_binding, keyboard_command, resolve_command, BindingMatch};
pub use table::{bind, ContextState, KeyAlarm, KeyNames, KeyTable, KeyTableBuilder, KeyTableError};
pub use translate::{KeyEnv, KeyTableState};
pub use types::{
    ContextId, KeyCombination, KeyGroup, KeyNumber, KeyValue, PressedKeys, DEFAULT_CONTEXT,
    MAX_MODIFIERS,
};
