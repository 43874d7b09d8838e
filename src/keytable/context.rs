//! Key contexts: named namespaces of bindings, hotkeys and mapped keys
//!
//! Every table is kept sorted on insertion so that lookups are binary
//! searches over the structural key order.

use super::binding::{HotkeyEntry, KeyBinding, MappedKeyEntry};
use super::types::{KeyCombination, KeyValue, MAX_MODIFIERS};

/// A switchable set of bindings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyContext {
    pub name: String,
    /// Contexts with a title are persistent; untitled ones are one-shot
    pub title: Option<String>,
    /// Isolated contexts never fall back to the default context
    pub isolated: bool,
    /// Bits ORed into every synthesised braille character
    pub superimpose: u32,
    bindings: Vec<KeyBinding>,
    hotkeys: Vec<HotkeyEntry>,
    mapped_keys: Vec<MappedKeyEntry>,
}

impl KeyContext {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn isolated(mut self) -> Self {
        self.isolated = true;
        self
    }

    pub fn bindings(&self) -> &[KeyBinding] {
        &self.bindings
    }

    pub fn hotkeys(&self) -> &[HotkeyEntry] {
        &self.hotkeys
    }

    pub fn mapped_keys(&self) -> &[MappedKeyEntry] {
        &self.mapped_keys
    }

    /// Add a binding, keeping the table sorted
    ///
    /// A complete binding replaces an earlier one for the same combination.
    /// Every partial combination leading up to it is registered as an
    /// incomplete binding unless something is already bound there, so the
    /// engine keeps gathering modifiers while the combination is being typed.
    pub fn add_binding(&mut self, binding: KeyBinding) {
        let combination = binding.combination.clone();
        self.insert_binding(binding);

        let modifiers = combination.modifier_keys();
        let count = modifiers.len();
        if count == 0 || count > MAX_MODIFIERS {
            return;
        }

        // An immediate binding needs every subset of its modifiers; a deferred
        // one only the proper subsets since the full set is itself bound.
        let full = (1u32 << count) - 1;
        let last = if combination.has_immediate() { full } else { full - 1 };
        for mask in 1..=last {
            let subset = modifiers
                .iter()
                .enumerate()
                .filter(|(index, _)| mask & (1 << index) != 0)
                .map(|(_, key)| *key);
            let prefix = KeyCombination::modifiers(subset);
            if self.position(&prefix).is_err() {
                self.insert_binding(KeyBinding::incomplete(prefix));
            }
        }
    }

    fn position(&self, combination: &KeyCombination) -> Result<usize, usize> {
        self.bindings
            .binary_search_by(|probe| probe.combination.cmp(combination))
    }

    fn insert_binding(&mut self, binding: KeyBinding) {
        match self.position(&binding.combination) {
            Ok(index) => {
                let existing = &self.bindings[index];
                if !binding.is_complete() {
                    return;
                }
                if existing.is_complete() {
                    tracing::warn!(
                        "Context '{}': binding for {} redefined",
                        self.name,
                        binding.combination
                    );
                }
                self.bindings[index] = binding;
            }
            Err(index) => self.bindings.insert(index, binding),
        }
    }

    /// Add a hotkey; a later entry for the same key replaces the earlier one
    pub fn add_hotkey(&mut self, hotkey: HotkeyEntry) {
        match self.hotkeys.binary_search_by(|probe| probe.key.cmp(&hotkey.key)) {
            Ok(index) => {
                tracing::warn!("Context '{}': hotkey {} redefined", self.name, hotkey.key);
                self.hotkeys[index] = hotkey;
            }
            Err(index) => self.hotkeys.insert(index, hotkey),
        }
    }

    /// Add a mapped key; a later entry for the same key replaces the earlier one
    pub fn add_mapped_key(&mut self, mapped: MappedKeyEntry) {
        match self
            .mapped_keys
            .binary_search_by(|probe| probe.key.cmp(&mapped.key))
        {
            Ok(index) => {
                tracing::warn!("Context '{}': mapped key {} redefined", self.name, mapped.key);
                self.mapped_keys[index] = mapped;
            }
            Err(index) => self.mapped_keys.insert(index, mapped),
        }
    }

    /// Find the binding whose combination is exactly the given pattern
    ///
    /// `modifiers` must be sorted.
    pub fn find_exact(&self, modifiers: &[KeyValue], immediate: Option<KeyValue>) -> Option<&KeyBinding> {
        self.bindings
            .binary_search_by(|probe| probe.combination.cmp_parts(modifiers, immediate))
            .ok()
            .map(|index| &self.bindings[index])
    }

    /// Find the hotkey for a key, falling back to its group's wildcard
    pub fn find_hotkey(&self, key: KeyValue) -> Option<&HotkeyEntry> {
        let find = |key: KeyValue| {
            self.hotkeys
                .binary_search_by(|probe| probe.key.cmp(&key))
                .ok()
                .map(|index| &self.hotkeys[index])
        };
        find(key).or_else(|| if key.is_any() { None } else { find(key.to_any()) })
    }

    /// Find the mapped-key entry for a key, falling back to its group's wildcard
    pub fn find_mapped_key(&self, key: KeyValue) -> Option<&MappedKeyEntry> {
        let find = |key: KeyValue| {
            self.mapped_keys
                .binary_search_by(|probe| probe.key.cmp(&key))
                .ok()
                .map(|index| &self.mapped_keys[index])
        };
        find(key).or_else(|| if key.is_any() { None } else { find(key.to_any()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keytable::binding::KeyboardFunction;
    use crate::keytable::command::{Cmd, Command};

    fn key(number: u8) -> KeyValue {
        KeyValue::new(0, number)
    }

    #[test]
    fn test_bindings_stay_sorted() {
        let mut context = KeyContext::new("default");
        context.add_binding(KeyBinding::new(
            KeyCombination::immediate(key(5)),
            Command::cmd(Cmd::LineDown),
        ));
        context.add_binding(KeyBinding::new(
            KeyCombination::modifiers([key(2)]),
            Command::cmd(Cmd::LineUp),
        ));

        let bindings = context.bindings();
        assert!(bindings.windows(2).all(|pair| pair[0].combination < pair[1].combination));
    }

    #[test]
    fn test_immediate_binding_generates_every_modifier_subset() {
        let mut context = KeyContext::new("default");
        context.add_binding(KeyBinding::new(
            KeyCombination::new([key(1), key(2)], Some(key(3))),
            Command::cmd(Cmd::Top),
        ));

        for subset in [vec![key(1)], vec![key(2)], vec![key(1), key(2)]] {
            let binding = context.find_exact(&subset, None).unwrap();
            assert!(!binding.is_complete());
        }
        assert!(context.find_exact(&[key(1), key(2)], Some(key(3))).unwrap().is_complete());
    }

    #[test]
    fn test_deferred_binding_generates_proper_subsets() {
        let mut context = KeyContext::new("default");
        context.add_binding(KeyBinding::new(
            KeyCombination::modifiers([key(1), key(2)]),
            Command::cmd(Cmd::Top),
        ));

        assert!(!context.find_exact(&[key(1)], None).unwrap().is_complete());
        assert!(!context.find_exact(&[key(2)], None).unwrap().is_complete());
        assert!(context.find_exact(&[key(1), key(2)], None).unwrap().is_complete());
    }

    #[test]
    fn test_complete_binding_replaces_generated_prefix() {
        let mut context = KeyContext::new("default");
        context.add_binding(KeyBinding::new(
            KeyCombination::modifiers([key(1), key(2)]),
            Command::cmd(Cmd::Top),
        ));
        context.add_binding(KeyBinding::new(
            KeyCombination::modifiers([key(1)]),
            Command::cmd(Cmd::LineUp),
        ));

        let binding = context.find_exact(&[key(1)], None).unwrap();
        assert_eq!(binding.primary.map(|b| b.value), Some(Command::cmd(Cmd::LineUp)));
    }

    #[test]
    fn test_generated_prefix_never_hides_complete_binding() {
        let mut context = KeyContext::new("default");
        context.add_binding(KeyBinding::new(
            KeyCombination::modifiers([key(1)]),
            Command::cmd(Cmd::LineUp),
        ));
        context.add_binding(KeyBinding::new(
            KeyCombination::modifiers([key(1), key(2)]),
            Command::cmd(Cmd::Top),
        ));

        assert!(context.find_exact(&[key(1)], None).unwrap().is_complete());
    }

    #[test]
    fn test_hotkey_falls_back_to_group_wildcard() {
        let mut context = KeyContext::new("default");
        context.add_hotkey(HotkeyEntry::new(
            KeyValue::any(3),
            Command::cmd(Cmd::Home),
            Command::NOOP,
        ));

        assert!(context.find_hotkey(KeyValue::new(3, 8)).is_some());
        assert!(context.find_hotkey(KeyValue::new(2, 8)).is_none());
    }

    #[test]
    fn test_mapped_key_lookup() {
        let mut context = KeyContext::new("default");
        context.add_mapped_key(MappedKeyEntry {
            key: key(1),
            function: KeyboardFunction::Dot1,
        });

        assert_eq!(
            context.find_mapped_key(key(1)).map(|entry| entry.function),
            Some(KeyboardFunction::Dot1)
        );
        assert!(context.find_mapped_key(key(2)).is_none());
    }
}
