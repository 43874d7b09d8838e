//! The key table aggregate: compiled contexts plus per-session key state

use std::collections::BTreeMap;
use std::path::PathBuf;

use thiserror::Error;

use super::binding::{BoundCommand, KeyBinding};
use super::command::{Block, Command};
use super::context::KeyContext;
use super::types::{
    ContextId, KeyCombination, KeyGroup, KeyValue, PressedKeys, DEFAULT_CONTEXT, MAX_MODIFIERS,
};
use crate::alarm::{AlarmId, AlarmQueue};

/// Errors that can occur while building or loading a key table
#[derive(Debug, Error)]
pub enum KeyTableError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("unknown key name: {0}")]
    UnknownKey(String),

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("invalid key combination: {0}")]
    InvalidCombination(String),

    #[error("unknown keyboard function: {0}")]
    UnknownFunction(String),

    #[error("invalid context: {0}")]
    InvalidContext(String),

    #[error("combination {combination} in context {context} has more than {MAX_MODIFIERS} modifiers")]
    TooManyModifiers {
        context: ContextId,
        combination: String,
    },

    #[error("key {key} appears more than once in combination {combination}")]
    DuplicateKey { key: String, combination: String },

    #[error("{kind} {index} is not defined ({count} defined)")]
    IndexOutOfRange {
        kind: &'static str,
        index: usize,
        count: usize,
    },
}

/// Alarms a key table schedules on the engine's alarm queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAlarm {
    LongPress,
    Autorelease,
}

/// Key and group names, used by the loader and for describing keys
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyNames {
    keys: BTreeMap<String, KeyValue>,
    groups: BTreeMap<String, KeyGroup>,
}

impl KeyNames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_key(&mut self, name: impl Into<String>, key: KeyValue) {
        self.keys.insert(name.into(), key);
    }

    pub fn add_group(&mut self, name: impl Into<String>, group: KeyGroup) {
        self.groups.insert(name.into(), group);
    }

    /// Resolve a key name; a group name stands for any key of that group
    pub fn resolve(&self, name: &str) -> Option<KeyValue> {
        self.keys
            .get(name)
            .copied()
            .or_else(|| self.groups.get(name).map(|group| KeyValue::any(*group)))
    }

    /// Human-readable name of a key
    pub fn describe(&self, key: KeyValue) -> String {
        if let Some((name, _)) = self.keys.iter().find(|(_, value)| **value == key) {
            return name.clone();
        }
        match (
            self.groups.iter().find(|(_, group)| **group == key.group),
            key.number.number(),
        ) {
            (Some((name, _)), Some(number)) => format!("{}.{}", name, number),
            (Some((name, _)), None) => name.clone(),
            (None, _) => key.to_string(),
        }
    }
}

/// Which context key events are resolved in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContextState {
    /// Context of the combination being typed
    pub current: ContextId,
    /// Context the next combination starts in
    pub next: ContextId,
    /// Context to return to after a one-shot context was used
    pub persistent: ContextId,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct LongPress {
    pub command: Option<Command>,
    pub repeat: bool,
    /// Set once the command has fired; later firings are repeats
    pub fired: bool,
    pub alarm: Option<AlarmId>,
    pub context: ContextId,
    pub key: Option<KeyValue>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Autorelease {
    pub timeout_ms: u64,
    pub alarm: Option<AlarmId>,
}

/// A compiled key table and the key state of the session using it
#[derive(Debug, Clone)]
pub struct KeyTable {
    pub(crate) contexts: Vec<Option<KeyContext>>,
    pub(crate) macros: Vec<Vec<Command>>,
    pub(crate) host_commands: Vec<Vec<String>>,
    names: KeyNames,
    pub(crate) pressed: PressedKeys,
    pub(crate) context: ContextState,
    pub(crate) long_press: LongPress,
    pub(crate) release: Option<Command>,
    pub(crate) autorelease: Autorelease,
}

impl KeyTable {
    pub fn builder() -> KeyTableBuilder {
        KeyTableBuilder::new()
    }

    pub fn context(&self, id: ContextId) -> Option<&KeyContext> {
        self.contexts.get(usize::from(id)).and_then(Option::as_ref)
    }

    /// Defined contexts with their ids
    pub fn contexts(&self) -> impl Iterator<Item = (ContextId, &KeyContext)> {
        self.contexts
            .iter()
            .enumerate()
            .filter_map(|(id, context)| context.as_ref().map(|context| (id as ContextId, context)))
    }

    /// One-shot contexts have no title and are never the default
    pub fn is_temporary_context(&self, id: ContextId) -> bool {
        id != DEFAULT_CONTEXT && self.context(id).is_some_and(|context| context.title.is_none())
    }

    pub fn names(&self) -> &KeyNames {
        &self.names
    }

    pub fn macro_commands(&self, index: usize) -> Option<&[Command]> {
        self.macros.get(index).map(Vec::as_slice)
    }

    pub fn host_command(&self, index: usize) -> Option<&[String]> {
        self.host_commands.get(index).map(Vec::as_slice)
    }

    pub fn pressed_keys(&self) -> &[KeyValue] {
        self.pressed.as_slice()
    }

    pub fn context_state(&self) -> ContextState {
        self.context
    }

    /// The command waiting for its keys to be released
    pub fn pending_release(&self) -> Option<Command> {
        self.release
    }

    pub fn autorelease_time(&self) -> u64 {
        self.autorelease.timeout_ms
    }

    /// Set the stuck-key timeout in milliseconds (0 disables it)
    pub fn set_autorelease_time(&mut self, timeout_ms: u64, alarms: &mut AlarmQueue<KeyAlarm>) {
        self.autorelease.timeout_ms = timeout_ms;
        self.update_autorelease(alarms);
    }

    pub(crate) fn cancel_long_press(&mut self, alarms: &mut AlarmQueue<KeyAlarm>) {
        if let Some(alarm) = self.long_press.alarm.take() {
            alarms.cancel(alarm);
        }
        self.long_press = LongPress::default();
    }

    pub(crate) fn update_autorelease(&mut self, alarms: &mut AlarmQueue<KeyAlarm>) {
        let timeout = self.autorelease.timeout_ms;
        if timeout > 0 && !self.pressed.is_empty() {
            match self.autorelease.alarm {
                Some(alarm) if alarms.reschedule(alarm, timeout) => {}
                _ => {
                    self.autorelease.alarm = Some(alarms.schedule(timeout, KeyAlarm::Autorelease));
                }
            }
        } else if let Some(alarm) = self.autorelease.alarm.take() {
            alarms.cancel(alarm);
        }
    }

    /// Forget every held key and pending command, returning to the default context
    pub fn reset(&mut self, alarms: &mut AlarmQueue<KeyAlarm>) {
        self.cancel_long_press(alarms);
        self.pressed.clear();
        self.release = None;
        self.context = ContextState::default();
        self.update_autorelease(alarms);
    }
}

/// Assembles a [`KeyTable`], validating it as a whole
#[derive(Debug, Default)]
pub struct KeyTableBuilder {
    contexts: BTreeMap<ContextId, KeyContext>,
    macros: Vec<Vec<Command>>,
    host_commands: Vec<Vec<String>>,
    names: KeyNames,
}

impl KeyTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn names(mut self, names: KeyNames) -> Self {
        self.names = names;
        self
    }

    /// Add or replace a context
    pub fn context(mut self, id: ContextId, context: KeyContext) -> Self {
        self.contexts.insert(id, context);
        self
    }

    pub fn add_macro(mut self, commands: Vec<Command>) -> Self {
        self.macros.push(commands);
        self
    }

    pub fn add_host_command(mut self, argv: Vec<String>) -> Self {
        self.host_commands.push(argv);
        self
    }

    /// Validate every context and produce the table
    pub fn build(mut self) -> Result<KeyTable, KeyTableError> {
        self.contexts
            .entry(DEFAULT_CONTEXT)
            .or_insert_with(|| KeyContext::new("default").with_title("Default"));

        for (id, context) in &self.contexts {
            for binding in context.bindings() {
                check_combination(*id, &binding.combination)?;
                for bound in [binding.primary, binding.secondary].into_iter().flatten() {
                    self.check_command(bound.value)?;
                }
            }
            for hotkey in context.hotkeys() {
                self.check_command(hotkey.press.value)?;
                self.check_command(hotkey.release.value)?;
            }
        }
        for commands in &self.macros {
            for command in commands {
                self.check_command(*command)?;
            }
        }
        for (index, argv) in self.host_commands.iter().enumerate() {
            if argv.is_empty() {
                return Err(KeyTableError::IndexOutOfRange {
                    kind: "host command argument",
                    index,
                    count: 0,
                });
            }
        }

        let count = self
            .contexts
            .keys()
            .next_back()
            .map_or(1, |last| usize::from(*last) + 1);
        let mut contexts: Vec<Option<KeyContext>> = vec![None; count];
        for (id, context) in self.contexts {
            contexts[usize::from(id)] = Some(context);
        }

        let bindings: usize = contexts.iter().flatten().map(|c| c.bindings().len()).sum();
        tracing::debug!(
            "Built key table: {} contexts, {} bindings, {} macros, {} host commands",
            contexts.iter().flatten().count(),
            bindings,
            self.macros.len(),
            self.host_commands.len()
        );

        Ok(KeyTable {
            contexts,
            macros: self.macros,
            host_commands: self.host_commands,
            names: self.names,
            pressed: PressedKeys::new(),
            context: ContextState::default(),
            long_press: LongPress::default(),
            release: None,
            autorelease: Autorelease::default(),
        })
    }

    fn check_command(&self, command: Command) -> Result<(), KeyTableError> {
        let index = usize::from(command.arg());
        match command.block_kind() {
            Some(Block::Context) => {
                let Ok(id) = ContextId::try_from(command.arg()) else {
                    return Err(KeyTableError::InvalidContext(command.arg().to_string()));
                };
                if id != DEFAULT_CONTEXT && !self.contexts.contains_key(&id) {
                    return Err(KeyTableError::InvalidContext(id.to_string()));
                }
            }
            Some(Block::Macro) if index >= self.macros.len() => {
                return Err(KeyTableError::IndexOutOfRange {
                    kind: "macro",
                    index,
                    count: self.macros.len(),
                });
            }
            Some(Block::HostCommand) if index >= self.host_commands.len() => {
                return Err(KeyTableError::IndexOutOfRange {
                    kind: "host command",
                    index,
                    count: self.host_commands.len(),
                });
            }
            _ => {}
        }
        Ok(())
    }
}

fn check_combination(context: ContextId, combination: &KeyCombination) -> Result<(), KeyTableError> {
    let modifiers = combination.modifier_keys();
    if modifiers.len() > MAX_MODIFIERS {
        return Err(KeyTableError::TooManyModifiers {
            context,
            combination: combination.to_string(),
        });
    }

    // Modifiers are sorted, so duplicates are adjacent. Wildcards may repeat:
    // each one is satisfied by a different key of the group.
    let duplicate = modifiers
        .windows(2)
        .find(|pair| pair[0] == pair[1] && !pair[0].is_any())
        .map(|pair| pair[0])
        .or_else(|| {
            combination
                .immediate_key()
                .filter(|immediate| !immediate.is_any() && modifiers.contains(immediate))
        });
    match duplicate {
        Some(key) => Err(KeyTableError::DuplicateKey {
            key: key.to_string(),
            combination: combination.to_string(),
        }),
        None => Ok(()),
    }
}

/// Convenience for tests and embedders: a binding from raw parts
pub fn bind(
    modifiers: impl IntoIterator<Item = KeyValue>,
    immediate: Option<KeyValue>,
    command: impl Into<BoundCommand>,
) -> KeyBinding {
    KeyBinding::new(KeyCombination::new(modifiers, immediate), command)
}
