//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use brlkeys::host::RecordingLauncher;
use brlkeys::keytable::{load_default_key_table, Block, Cmd, Command, KeyValue};
use brlkeys::script::resolve_key;
use brlkeys::session::WindowGeometry;
use brlkeys::{Alert, Effect, Engine, Preferences, TextScreen};

/// Engine over `screen` with the embedded default key table
pub fn test_engine_with(screen: TextScreen, prefs: Preferences, columns: usize) -> Engine {
    let mut engine =
        Engine::new(prefs, Box::new(screen)).with_geometry(WindowGeometry::new(columns, 1));
    engine.set_host_launcher(Box::new(RecordingLauncher::default()));
    engine.set_key_table(load_default_key_table().unwrap());
    engine
}

/// Engine over lines of text, one-row window of `columns` cells
pub fn test_engine(lines: &[&str], columns: usize) -> Engine {
    test_engine_with(TextScreen::from_lines(lines), Preferences::default(), columns)
}

pub fn key(engine: &Engine, name: &str) -> KeyValue {
    let names = engine.key_table().unwrap().names();
    resolve_key(name, names).unwrap_or_else(|| panic!("unknown key {}", name))
}

pub fn press(engine: &mut Engine, name: &str) {
    let key = key(engine, name);
    engine.key_event(0, key.group, key.number.number().unwrap(), true);
}

pub fn release(engine: &mut Engine, name: &str) {
    let key = key(engine, name);
    engine.key_event(0, key.group, key.number.number().unwrap(), false);
}

/// Press keys in order, then release them in reverse
pub fn chord(engine: &mut Engine, names: &[&str]) {
    for name in names {
        press(engine, name);
    }
    for name in names.iter().rev() {
        release(engine, name);
    }
}

pub fn tap(engine: &mut Engine, name: &str) {
    chord(engine, &[name]);
}

pub fn run(engine: &mut Engine, cmd: Cmd) {
    engine.execute(Command::cmd(cmd));
}

pub fn run_block(engine: &mut Engine, block: Block, arg: u16) {
    engine.execute(Command::block(block, arg));
}

pub fn alerts(effects: &[Effect]) -> Vec<Alert> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::Alert(alert) => Some(*alert),
            _ => None,
        })
        .collect()
}

/// Alerts raised since the last drain
pub fn take_alerts(engine: &mut Engine) -> Vec<Alert> {
    alerts(&engine.take_effects())
}
