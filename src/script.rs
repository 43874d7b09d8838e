//! Event scripts replayed against an [`Engine`]
//!
//! A script is a YAML document holding a screen and a list of steps:
//!
//! ```yaml
//! screen: |
//!   $ ls
//!   Cargo.toml  src
//! cursor: [2, 0]
//! steps:
//!   - press: Space
//!   - tap: Dot4
//!   - release: Space
//!   - wait: 600
//!   - press: RoutingKey.5
//!   - command: LNDN
//! ```
//!
//! Keys are named as in the key table; `Group.n` or `g.n` address a key of
//! a group by number.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

use crate::effects::Effect;
use crate::engine::Engine;
use crate::keytable::{Command, KeyNames, KeyTableError, KeyValue};
use crate::screen::TextScreen;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("failed to read script {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid script: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("step {step}: unknown key '{key}'")]
    UnknownKey { step: usize, key: String },

    #[error("step {step}: {source}")]
    Command {
        step: usize,
        #[source]
        source: KeyTableError,
    },

    #[error("step {0}: expected exactly one of press, release, tap, wait, command")]
    InvalidStep(usize),
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct StepConfig {
    press: Option<String>,
    release: Option<String>,
    tap: Option<String>,
    wait: Option<u64>,
    command: Option<String>,
}

/// Root structure of a script file
#[derive(Debug, Default, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub screen: String,
    /// Screen cursor as `[column, row]`
    #[serde(default)]
    pub cursor: Option<[usize; 2]>,
    #[serde(default)]
    steps: Vec<StepConfig>,
}

/// One resolved script step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Press(KeyValue),
    Release(KeyValue),
    Tap(KeyValue),
    Wait(u64),
    Command(Command),
}

/// What one step produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRecord {
    pub step: Step,
    pub effects: Vec<Effect>,
    /// Window position after the step
    pub position: (usize, usize),
}

impl Script {
    pub fn load(path: &Path) -> Result<Self, ScriptError> {
        let content = std::fs::read_to_string(path).map_err(|source| ScriptError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    pub fn parse(yaml: &str) -> Result<Self, ScriptError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn screen(&self) -> TextScreen {
        let mut screen = TextScreen::from_text(&self.screen);
        if let Some([column, row]) = self.cursor {
            screen.set_cursor(column, row);
        }
        screen
    }

    /// Resolve key names and commands
    pub fn steps(&self, names: &KeyNames) -> Result<Vec<Step>, ScriptError> {
        self.steps
            .iter()
            .enumerate()
            .map(|(index, config)| resolve_step(index + 1, config, names))
            .collect()
    }
}

fn resolve_step(step: usize, config: &StepConfig, names: &KeyNames) -> Result<Step, ScriptError> {
    let key = |name: &str| {
        resolve_key(name, names).ok_or_else(|| ScriptError::UnknownKey {
            step,
            key: name.to_string(),
        })
    };

    match config {
        StepConfig {
            press: Some(name),
            release: None,
            tap: None,
            wait: None,
            command: None,
        } => Ok(Step::Press(key(name)?)),
        StepConfig {
            press: None,
            release: Some(name),
            tap: None,
            wait: None,
            command: None,
        } => Ok(Step::Release(key(name)?)),
        StepConfig {
            press: None,
            release: None,
            tap: Some(name),
            wait: None,
            command: None,
        } => Ok(Step::Tap(key(name)?)),
        StepConfig {
            press: None,
            release: None,
            tap: None,
            wait: Some(ms),
            command: None,
        } => Ok(Step::Wait(*ms)),
        StepConfig {
            press: None,
            release: None,
            tap: None,
            wait: None,
            command: Some(text),
        } => Command::from_str(text)
            .map(Step::Command)
            .map_err(|source| ScriptError::Command { step, source }),
        _ => Err(ScriptError::InvalidStep(step)),
    }
}

/// Resolve a concrete key: a key name, `Group.n` or `g.n`
pub fn resolve_key(name: &str, names: &KeyNames) -> Option<KeyValue> {
    if let Some(key) = names.resolve(name).filter(|key| !key.is_any()) {
        return Some(key);
    }

    let (group, number) = name.split_once('.')?;
    let group = match names.resolve(group) {
        Some(key) if key.is_any() => key.group,
        _ => group.parse().ok()?,
    };
    Some(KeyValue::new(group, number.parse().ok()?))
}

/// Run steps against an engine, recording the effects of each
pub fn replay(engine: &mut Engine, steps: &[Step]) -> Vec<StepRecord> {
    steps
        .iter()
        .map(|step| {
            match *step {
                Step::Press(key) => {
                    engine.key_event(0, key.group, key.number.number().unwrap_or(0), true);
                }
                Step::Release(key) => {
                    engine.key_event(0, key.group, key.number.number().unwrap_or(0), false);
                }
                Step::Tap(key) => {
                    let number = key.number.number().unwrap_or(0);
                    engine.key_event(0, key.group, number, true);
                    engine.key_event(0, key.group, number, false);
                }
                Step::Wait(ms) => engine.advance(ms),
                Step::Command(command) => engine.execute(command),
            }
            StepRecord {
                step: *step,
                effects: engine.take_effects(),
                position: engine.session().position(),
            }
        })
        .collect()
}
