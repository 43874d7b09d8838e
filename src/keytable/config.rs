//! YAML configuration parsing for key tables
//!
//! Parses keytable.yaml files into a [`KeyTable`].

use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use super::binding::{BoundCommand, HotkeyEntry, KeyBinding, KeyboardFunction, MappedKeyEntry};
use super::command::{Argument, Command, CommandEntry, CommandFlags};
use super::context::KeyContext;
use super::table::{KeyNames, KeyTable, KeyTableError};
use super::types::{ContextId, KeyCombination, KeyGroup, KeyValue, DEFAULT_CONTEXT};

/// Root structure of a key-table YAML file
#[derive(Debug, Deserialize)]
pub struct KeyTableConfig {
    /// Key name -> [group, number]
    #[serde(default)]
    pub keys: BTreeMap<String, [u8; 2]>,
    /// Group name -> group; stands for any key of the group
    #[serde(default)]
    pub groups: BTreeMap<String, KeyGroup>,
    #[serde(default)]
    pub contexts: Vec<ContextConfig>,
    #[serde(default)]
    pub macros: Vec<Vec<String>>,
    #[serde(default)]
    pub host_commands: Vec<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct ContextConfig {
    pub id: ContextId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub isolated: bool,
    #[serde(default)]
    pub superimpose: Vec<String>,
    #[serde(default)]
    pub bind: Vec<BindingConfig>,
    #[serde(default)]
    pub hotkeys: Vec<HotkeyConfig>,
    /// Key name -> keyboard function
    #[serde(default)]
    pub map: BTreeMap<String, String>,
}

/// A single binding entry from YAML
#[derive(Debug, Deserialize)]
pub struct BindingConfig {
    pub keys: String,
    /// Omitted or `incomplete` marks a prefix of longer combinations
    #[serde(default)]
    pub command: Option<String>,
    /// Long-press command
    #[serde(default)]
    pub long: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HotkeyConfig {
    pub key: String,
    #[serde(default)]
    pub press: Option<String>,
    #[serde(default)]
    pub release: Option<String>,
}

/// Load a key table from a YAML file
pub fn load_keytable_file(path: &Path) -> Result<KeyTable, KeyTableError> {
    let content = std::fs::read_to_string(path).map_err(|source| KeyTableError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    parse_keytable_yaml(&content)
}

/// Parse a key table from a YAML string
pub fn parse_keytable_yaml(yaml: &str) -> Result<KeyTable, KeyTableError> {
    let config: KeyTableConfig = serde_yaml::from_str(yaml)?;

    let mut names = KeyNames::new();
    for (name, [group, number]) in &config.keys {
        names.add_key(name.clone(), KeyValue::new(*group, *number));
    }
    for (name, group) in &config.groups {
        names.add_group(name.clone(), *group);
    }

    let mut builder = KeyTable::builder();

    for commands in &config.macros {
        let commands = commands
            .iter()
            .map(|text| Command::from_str(text))
            .collect::<Result<Vec<_>, _>>()?;
        builder = builder.add_macro(commands);
    }
    for argv in config.host_commands {
        builder = builder.add_host_command(argv);
    }

    for entry in &config.contexts {
        let context = parse_context(entry, &names)?;
        builder = builder.context(entry.id, context);
    }

    builder.names(names).build()
}

fn parse_context(entry: &ContextConfig, names: &KeyNames) -> Result<KeyContext, KeyTableError> {
    let name = entry.name.clone().unwrap_or_else(|| {
        if entry.id == DEFAULT_CONTEXT {
            "default".to_string()
        } else {
            format!("context{}", entry.id)
        }
    });

    let mut context = KeyContext::new(name);
    context.title = entry.title.clone();
    context.isolated = entry.isolated;
    for function in &entry.superimpose {
        context.superimpose |= parse_function(function)?.bit();
    }

    for binding in &entry.bind {
        let combination = parse_combination(&binding.keys, names)?;
        let mut parsed = match parse_bound(binding.command.as_deref())? {
            Some(primary) => KeyBinding::new(combination, primary),
            None => KeyBinding::incomplete(combination),
        };
        if let Some(long) = parse_bound(binding.long.as_deref())? {
            parsed = parsed.with_secondary(long);
        }
        context.add_binding(parsed);
    }

    for hotkey in &entry.hotkeys {
        let key = resolve_key(&hotkey.key, names)?;
        let press = parse_bound(hotkey.press.as_deref())?.unwrap_or(BoundCommand::NOOP);
        let release = parse_bound(hotkey.release.as_deref())?.unwrap_or(BoundCommand::NOOP);
        context.add_hotkey(HotkeyEntry::new(key, press, release));
    }

    for (key, function) in &entry.map {
        context.add_mapped_key(MappedKeyEntry {
            key: resolve_key(key, names)?,
            function: parse_function(function)?,
        });
    }

    Ok(context)
}

fn resolve_key(name: &str, names: &KeyNames) -> Result<KeyValue, KeyTableError> {
    names
        .resolve(name.trim())
        .ok_or_else(|| KeyTableError::UnknownKey(name.to_string()))
}

fn parse_function(name: &str) -> Result<KeyboardFunction, KeyTableError> {
    KeyboardFunction::from_name(name.trim())
        .ok_or_else(|| KeyTableError::UnknownFunction(name.to_string()))
}

/// Parse a combination like "Space+Dot1+!Dot4"
///
/// Parts are joined with `+`; a leading `!` marks the immediate key.
pub fn parse_combination(text: &str, names: &KeyNames) -> Result<KeyCombination, KeyTableError> {
    let mut modifiers = Vec::new();
    let mut immediate = None;

    for part in text.split('+') {
        let part = part.trim();
        if part.is_empty() {
            return Err(KeyTableError::InvalidCombination(text.to_string()));
        }

        match part.strip_prefix('!') {
            Some(name) => {
                if immediate.is_some() {
                    return Err(KeyTableError::InvalidCombination(format!(
                        "more than one immediate key in {}",
                        text
                    )));
                }
                immediate = Some(resolve_key(name, names)?);
            }
            None => modifiers.push(resolve_key(part, names)?),
        }
    }

    Ok(KeyCombination::new(modifiers, immediate))
}

/// Parse a bound command; `None` means "more keys needed"
fn parse_bound(text: Option<&str>) -> Result<Option<BoundCommand>, KeyTableError> {
    match text.map(str::trim) {
        None => Ok(None),
        Some(text) if text.eq_ignore_ascii_case("incomplete") => Ok(None),
        Some(text) => Command::from_str(text).map(|command| Some(BoundCommand::new(command))),
    }
}

fn parse_number(text: &str) -> Option<u16> {
    let text = text.trim();
    match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16).ok(),
        None => text.parse().ok(),
    }
}

// Command syntax: NAME, NAME+n, with optional :toggle_on / :toggle_off suffixes
impl FromStr for Command {
    type Err = KeyTableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || KeyTableError::UnknownCommand(s.to_string());
        let mut parts = s.trim().split(':');
        let body = parts.next().ok_or_else(unknown)?;

        let (name, offset) = match body.split_once('+') {
            Some((name, offset)) => (name.trim(), Some(parse_number(offset).ok_or_else(unknown)?)),
            None => (body.trim(), None),
        };

        let entry = CommandEntry::find(name).ok_or_else(unknown)?;
        let mut command = entry.code;
        if let Some(offset) = offset {
            if entry.argument == Argument::None {
                return Err(unknown());
            }
            command = command.with_arg_added(offset);
        }

        for flag in parts {
            let flag = match flag.trim().to_ascii_lowercase().as_str() {
                "toggle_on" | "on" => CommandFlags::TOGGLE_ON,
                "toggle_off" | "off" => CommandFlags::TOGGLE_OFF,
                _ => return Err(unknown()),
            };
            command = command.with_flags(flag);
        }

        Ok(command)
    }
}
