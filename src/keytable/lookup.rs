//! Binding search over the pressed-key set
//!
//! The search generalises every subset of the pressed keys to their group
//! wildcards and binary-searches the context for each generalised pattern,
//! trying the fully specific pattern first.

use super::binding::{BoundCommand, KeyBinding};
use super::command::{Argument, Block, Command, ALL_DOTS, DOT_SPACE};
use super::context::KeyContext;
use super::types::{KeyValue, MAX_MODIFIERS};

/// Outcome of a binding search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingMatch<'a> {
    /// A binding with a command matched
    Complete(&'a KeyBinding),
    /// Only prefixes of longer combinations matched
    Incomplete,
    /// Nothing matched
    Missing,
}

impl<'a> BindingMatch<'a> {
    pub fn binding(self) -> Option<&'a KeyBinding> {
        match self {
            BindingMatch::Complete(binding) => Some(binding),
            _ => None,
        }
    }

    pub fn is_missing(self) -> bool {
        matches!(self, BindingMatch::Missing)
    }
}

/// Find the most specific binding for the held modifiers plus an optional
/// immediate key
///
/// Bit `i` of the subset mask generalises modifier `i` to its wildcard, and
/// masks are tried in increasing order so the exact pattern wins. If no
/// complete binding is found for a concrete immediate key, the search is
/// repeated once with the immediate key generalised.
pub fn find_binding<'a>(
    context: &'a KeyContext,
    modifiers: &[KeyValue],
    immediate: Option<KeyValue>,
) -> BindingMatch<'a> {
    let count = modifiers.len();
    if count > MAX_MODIFIERS {
        return BindingMatch::Missing;
    }

    let mut incomplete = false;
    let mut immediate = immediate;
    let mut probe = Vec::with_capacity(count);

    loop {
        for mask in 0u32..(1 << count) {
            probe.clear();
            probe.extend(modifiers.iter().enumerate().map(|(index, key)| {
                if mask & (1 << index) != 0 {
                    key.to_any()
                } else {
                    *key
                }
            }));
            probe.sort_unstable();

            if let Some(binding) = context.find_exact(&probe, immediate) {
                if binding.is_complete() {
                    return BindingMatch::Complete(binding);
                }
                incomplete = true;
            }
        }

        match immediate {
            Some(key) if !key.is_any() => immediate = Some(key.to_any()),
            _ => break,
        }
    }

    if incomplete {
        BindingMatch::Incomplete
    } else {
        BindingMatch::Missing
    }
}

/// Synthesise a PASSDOTS command from mapped keys
///
/// Every pressed key must be mapped. Space on its own types a blank cell;
/// space together with dots is a chord, which is only produced when
/// `allow_chords` is set.
pub fn keyboard_command(context: &KeyContext, pressed: &[KeyValue], allow_chords: bool) -> Option<Command> {
    if pressed.is_empty() {
        return None;
    }

    let mut bits = 0u32;
    for key in pressed {
        bits |= context.find_mapped_key(*key)?.function.bit();
    }

    if bits & DOT_SPACE != 0 {
        if bits & ALL_DOTS == 0 {
            bits &= !DOT_SPACE;
        } else if !allow_chords {
            return None;
        }
    }

    bits |= context.superimpose;
    Some(Command::block(Block::PassDots, 0).with_bits(bits))
}

/// Resolve a bound command's argument from the keys that matched wildcards
///
/// The number of the key that satisfied each wildcard slot is added to the
/// argument: one key for offsets, columns and rows, two for ranges (first key
/// in the low byte, second in the high byte).
pub fn resolve_command(
    bound: BoundCommand,
    binding: &KeyBinding,
    modifiers: &[KeyValue],
    immediate: Option<KeyValue>,
) -> Command {
    let Some(entry) = bound.entry else {
        return bound.value;
    };
    if !entry.argument.from_keys() || binding.combination.any_count() == 0 {
        return bound.value;
    }

    let numbers = wildcard_numbers(binding, modifiers, immediate);
    match (entry.argument, numbers.as_slice()) {
        (Argument::Range, [first, second, ..]) => {
            bound.value.with_arg_added(u16::from(*first) | (u16::from(*second) << 8))
        }
        (_, [first, ..]) => bound.value.with_arg_added(u16::from(*first)),
        (_, []) => bound.value,
    }
}

fn wildcard_numbers(binding: &KeyBinding, modifiers: &[KeyValue], immediate: Option<KeyValue>) -> Vec<u8> {
    let combination = &binding.combination;
    let concrete: Vec<KeyValue> = combination
        .modifier_keys()
        .iter()
        .copied()
        .filter(|key| !key.is_any())
        .collect();

    let mut candidates: Vec<KeyValue> = modifiers
        .iter()
        .copied()
        .filter(|key| !concrete.contains(key))
        .collect();
    let mut numbers = Vec::new();

    for slot in combination.modifier_keys().iter().filter(|key| key.is_any()) {
        if let Some(index) = candidates.iter().position(|key| key.matches(*slot)) {
            let key = candidates.remove(index);
            numbers.extend(key.number.number());
        }
    }

    if let (Some(slot), Some(key)) = (combination.immediate_key(), immediate) {
        if slot.is_any() && key.matches(slot) {
            numbers.extend(key.number.number());
        }
    }

    numbers
}
