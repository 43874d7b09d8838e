//! brlkeys - braille display key table engine
//!
//! This crate turns key events from a braille display into commands through
//! a contextual key table, and dispatches the navigation commands that move
//! the braille window over a text screen.

pub mod alarm;
pub mod alert;
pub mod cli;
pub mod config;
pub mod config_paths;
pub mod effects;
pub mod engine;
pub mod host;
pub mod keytable;
pub mod navigation;
pub mod queue;
pub mod screen;
pub mod script;
pub mod session;
pub mod tracing;

// Re-export commonly used types
pub use alert::Alert;
pub use config::Preferences;
pub use effects::Effect;
pub use engine::Engine;
pub use keytable::{Command, KeyTable};
pub use screen::{Screen, TextScreen};
