//! Core types for the key table: KeyValue, KeyNumber, KeyCombination

use std::cmp::Ordering;
use std::fmt;

/// Group of physically related keys (dots, routing keys, panning keys...)
pub type KeyGroup = u8;

/// Identifier of a key context within a key table
pub type ContextId = u8;

/// The default (global) context
pub const DEFAULT_CONTEXT: ContextId = 0;

/// Largest number of modifier keys a combination may hold
///
/// The subset search enumerates `2^n` generalisations of the pressed keys,
/// so this also bounds the size of that search.
pub const MAX_MODIFIERS: usize = 10;

/// The number of a key within its group, or the `Any` wildcard
///
/// `Any` only appears inside binding patterns, never in a live pressed-key set.
/// It sorts after every concrete key number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyNumber {
    Key(u8),
    Any,
}

impl KeyNumber {
    /// The concrete key number, if this is not the wildcard
    pub const fn number(self) -> Option<u8> {
        match self {
            KeyNumber::Key(n) => Some(n),
            KeyNumber::Any => None,
        }
    }
}

/// One physical key: a group and a number within that group
///
/// Ordering is total, group major and number minor, so pressed-key sets and
/// binding patterns can be kept sorted and compared structurally.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyValue {
    pub group: KeyGroup,
    pub number: KeyNumber,
}

impl KeyValue {
    /// A concrete key
    pub const fn new(group: KeyGroup, number: u8) -> Self {
        Self {
            group,
            number: KeyNumber::Key(number),
        }
    }

    /// The wildcard for every key of a group
    pub const fn any(group: KeyGroup) -> Self {
        Self {
            group,
            number: KeyNumber::Any,
        }
    }

    #[inline]
    pub const fn is_any(self) -> bool {
        matches!(self.number, KeyNumber::Any)
    }

    /// This key generalised to its group's wildcard
    #[inline]
    pub const fn to_any(self) -> Self {
        Self::any(self.group)
    }

    /// Check if this key satisfies a pattern key (exact or wildcard match)
    pub fn matches(self, pattern: KeyValue) -> bool {
        self.group == pattern.group && (pattern.is_any() || self.number == pattern.number)
    }
}

impl fmt::Display for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.number {
            KeyNumber::Key(n) => write!(f, "{}.{}", self.group, n),
            KeyNumber::Any => write!(f, "{}.*", self.group),
        }
    }
}

/// The trigger pattern of a binding
///
/// Modifier keys are kept sorted so combinations compare and binary-search
/// structurally. The immediate key, when present, is the terminal key whose
/// press completes the combination and is never part of the modifier list.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct KeyCombination {
    modifiers: Vec<KeyValue>,
    immediate: Option<KeyValue>,
}

impl KeyCombination {
    /// Create a combination; the modifiers are sorted here
    pub fn new(modifiers: impl IntoIterator<Item = KeyValue>, immediate: Option<KeyValue>) -> Self {
        let mut modifiers: Vec<KeyValue> = modifiers.into_iter().collect();
        modifiers.sort_unstable();
        Self {
            modifiers,
            immediate,
        }
    }

    /// A combination made of a single immediate key
    pub fn immediate(key: KeyValue) -> Self {
        Self::new([], Some(key))
    }

    /// A combination of modifier keys only (fires on release)
    pub fn modifiers(keys: impl IntoIterator<Item = KeyValue>) -> Self {
        Self::new(keys, None)
    }

    pub fn modifier_keys(&self) -> &[KeyValue] {
        &self.modifiers
    }

    pub fn immediate_key(&self) -> Option<KeyValue> {
        self.immediate
    }

    #[inline]
    pub fn has_immediate(&self) -> bool {
        self.immediate.is_some()
    }

    /// Every key of the pattern, modifiers first, immediate key last
    pub fn keys(&self) -> impl Iterator<Item = KeyValue> + '_ {
        self.modifiers.iter().copied().chain(self.immediate)
    }

    /// Number of wildcard slots in the pattern
    pub fn any_count(&self) -> usize {
        self.keys().filter(|key| key.is_any()).count()
    }

    /// Compare against a probe given as parts, without building a combination
    ///
    /// The order is: combinations without an immediate key first, then by
    /// immediate key, then by modifier count, then modifier by modifier.
    /// `probe_modifiers` must already be sorted.
    pub fn cmp_parts(&self, probe_modifiers: &[KeyValue], probe_immediate: Option<KeyValue>) -> Ordering {
        self.immediate
            .is_some()
            .cmp(&probe_immediate.is_some())
            .then_with(|| self.immediate.cmp(&probe_immediate))
            .then_with(|| self.modifiers.len().cmp(&probe_modifiers.len()))
            .then_with(|| self.modifiers.as_slice().cmp(probe_modifiers))
    }
}

impl PartialOrd for KeyCombination {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for KeyCombination {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cmp_parts(&other.modifiers, other.immediate)
    }
}

impl fmt::Display for KeyCombination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = self.modifiers.iter().map(|k| k.to_string()).collect();
        if let Some(immediate) = self.immediate {
            parts.push(format!("!{}", immediate));
        }
        write!(f, "{}", parts.join("+"))
    }
}

/// The set of keys currently held down, always sorted and without duplicates
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PressedKeys {
    keys: Vec<KeyValue>,
}

impl PressedKeys {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a key; returns false if it was already held
    pub fn insert(&mut self, key: KeyValue) -> bool {
        match self.keys.binary_search(&key) {
            Ok(_) => false,
            Err(position) => {
                self.keys.insert(position, key);
                true
            }
        }
    }

    /// Remove a key; returns true if it was held
    pub fn remove(&mut self, key: KeyValue) -> bool {
        match self.keys.binary_search(&key) {
            Ok(position) => {
                self.keys.remove(position);
                true
            }
            Err(_) => false,
        }
    }

    pub fn contains(&self, key: KeyValue) -> bool {
        self.keys.binary_search(&key).is_ok()
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn as_slice(&self) -> &[KeyValue] {
        &self.keys
    }
}
