//! Binding entries: key combinations, hotkeys and mapped keys

use super::command::{
    Command, CommandEntry, CommandFlags, DOT1, DOT2, DOT3, DOT4, DOT5, DOT6, DOT7, DOT8,
    DOT_SPACE, FLAG_SHIFT,
};
use super::types::{KeyCombination, KeyValue};

/// A command as bound in a key table, with the registry entry it came from
///
/// The entry supplies the argument metadata used to derive an argument from
/// the keys that satisfied wildcard slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundCommand {
    pub value: Command,
    pub entry: Option<&'static CommandEntry>,
}

impl BoundCommand {
    pub fn new(value: Command) -> Self {
        Self {
            value,
            entry: CommandEntry::for_command(value),
        }
    }

    pub const NOOP: BoundCommand = BoundCommand {
        value: Command::NOOP,
        entry: None,
    };
}

impl From<Command> for BoundCommand {
    fn from(value: Command) -> Self {
        Self::new(value)
    }
}

/// A combination bound to a primary and an optional long-press command
///
/// A `None` primary is the "more keys needed" sentinel: the combination is a
/// prefix of a longer one and matching it only keeps the engine gathering
/// modifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBinding {
    pub combination: KeyCombination,
    pub primary: Option<BoundCommand>,
    pub secondary: Option<BoundCommand>,
}

impl KeyBinding {
    pub fn new(combination: KeyCombination, primary: impl Into<BoundCommand>) -> Self {
        Self {
            combination,
            primary: Some(primary.into()),
            secondary: None,
        }
    }

    /// A binding that only marks a prefix of longer combinations
    pub fn incomplete(combination: KeyCombination) -> Self {
        Self {
            combination,
            primary: None,
            secondary: None,
        }
    }

    /// Add a long-press command (builder pattern)
    pub fn with_secondary(mut self, secondary: impl Into<BoundCommand>) -> Self {
        self.secondary = Some(secondary.into());
        self
    }

    #[inline]
    pub fn is_complete(&self) -> bool {
        self.primary.is_some()
    }
}

/// A key whose press and release fire commands regardless of other held keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HotkeyEntry {
    pub key: KeyValue,
    pub press: BoundCommand,
    pub release: BoundCommand,
}

impl HotkeyEntry {
    pub fn new(key: KeyValue, press: impl Into<BoundCommand>, release: impl Into<BoundCommand>) -> Self {
        Self {
            key,
            press: press.into(),
            release: release.into(),
        }
    }
}

/// What a mapped key contributes to a synthesised braille character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyboardFunction {
    Dot1,
    Dot2,
    Dot3,
    Dot4,
    Dot5,
    Dot6,
    Dot7,
    Dot8,
    Space,
    Shift,
    Upper,
    Control,
    Meta,
}

impl KeyboardFunction {
    /// The bit this function ORs into a PASSDOTS command
    pub const fn bit(self) -> u32 {
        match self {
            KeyboardFunction::Dot1 => DOT1,
            KeyboardFunction::Dot2 => DOT2,
            KeyboardFunction::Dot3 => DOT3,
            KeyboardFunction::Dot4 => DOT4,
            KeyboardFunction::Dot5 => DOT5,
            KeyboardFunction::Dot6 => DOT6,
            KeyboardFunction::Dot7 => DOT7,
            KeyboardFunction::Dot8 => DOT8,
            KeyboardFunction::Space => DOT_SPACE,
            KeyboardFunction::Shift => (CommandFlags::INPUT_SHIFT.bits() as u32) << FLAG_SHIFT,
            KeyboardFunction::Upper => (CommandFlags::INPUT_UPPER.bits() as u32) << FLAG_SHIFT,
            KeyboardFunction::Control => (CommandFlags::INPUT_CONTROL.bits() as u32) << FLAG_SHIFT,
            KeyboardFunction::Meta => (CommandFlags::INPUT_META.bits() as u32) << FLAG_SHIFT,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let function = match name.to_ascii_uppercase().as_str() {
            "DOT1" => KeyboardFunction::Dot1,
            "DOT2" => KeyboardFunction::Dot2,
            "DOT3" => KeyboardFunction::Dot3,
            "DOT4" => KeyboardFunction::Dot4,
            "DOT5" => KeyboardFunction::Dot5,
            "DOT6" => KeyboardFunction::Dot6,
            "DOT7" => KeyboardFunction::Dot7,
            "DOT8" => KeyboardFunction::Dot8,
            "SPACE" => KeyboardFunction::Space,
            "SHIFT" => KeyboardFunction::Shift,
            "UPPER" => KeyboardFunction::Upper,
            "CONTROL" => KeyboardFunction::Control,
            "META" => KeyboardFunction::Meta,
            _ => return None,
        };
        Some(function)
    }
}

/// A key that contributes a keyboard function when typing braille
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappedKeyEntry {
    pub key: KeyValue,
    pub function: KeyboardFunction,
}
