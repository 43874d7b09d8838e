//! Key event state machine
//!
//! Turns press/release events into commands. Immediate bindings fire on
//! press; deferred bindings fire when their keys are released. Holding a key
//! arms a long-press alarm for the binding's secondary command, which keeps
//! re-arming itself while the command is repeatable. A separate alarm
//! force-releases keys that have been held for too long.

use super::binding::KeyBinding;
use super::command::{Block, Command, CommandFlags, ALL_DOTS, UNICODE_BRAILLE_ROW};
use super::lookup::{find_binding, keyboard_command, resolve_command, BindingMatch};
use super::table::{KeyAlarm, KeyTable, LongPress};
use super::types::{ContextId, KeyGroup, KeyValue, DEFAULT_CONTEXT};
use crate::alarm::{AlarmId, AlarmQueue};
use crate::alert::Alert;
use crate::config::{BrailleTypingMode, Preferences};
use crate::effects::{Effect, Effects};
use crate::host::HostLauncher;
use crate::queue::CommandQueue;

/// Deepest macro nesting before a macro is rejected
const MAX_MACRO_DEPTH: usize = 8;

/// What a key event resolved to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyTableState {
    /// No command resolved
    Unbound,
    /// A prefix of a longer combination is being typed
    Modifiers,
    /// A command was resolved (fired now or deferred to release)
    Command,
    /// A hotkey fired
    Hotkey,
}

/// Collaborators a key table needs while processing an event
pub struct KeyEnv<'a> {
    pub prefs: &'a Preferences,
    pub alarms: &'a mut AlarmQueue<KeyAlarm>,
    pub queue: &'a mut CommandQueue,
    pub effects: &'a mut Effects,
    pub host: &'a mut dyn HostLauncher,
}

/// A binding resolved against the keys that triggered it
#[derive(Debug, Clone, Copy)]
struct Resolution {
    command: Command,
    secondary: Option<Command>,
    immediate: bool,
}

enum Search {
    Found(Resolution),
    Incomplete,
    Nothing,
}

fn resolve(binding: &KeyBinding, modifiers: &[KeyValue], immediate: Option<KeyValue>) -> Option<Resolution> {
    let primary = binding.primary?;
    Some(Resolution {
        command: resolve_command(primary, binding, modifiers, immediate),
        secondary: binding
            .secondary
            .map(|secondary| resolve_command(secondary, binding, modifiers, immediate)),
        immediate: binding.combination.has_immediate(),
    })
}

impl KeyTable {
    /// The context events are resolved in, falling back to the default one
    fn effective_context(&self, context: ContextId) -> ContextId {
        if self.context(context).is_some() {
            context
        } else {
            DEFAULT_CONTEXT
        }
    }

    /// Search one context for `key` pressed on top of the held keys
    ///
    /// The key is first tried as the immediate key of a combination, then
    /// as one more modifier of a deferred combination.
    fn search_context(&self, context: ContextId, key: KeyValue) -> Search {
        let Some(keys) = self.context(context) else {
            return Search::Nothing;
        };
        let held = self.pressed.as_slice();
        let mut incomplete = false;

        match find_binding(keys, held, Some(key)) {
            BindingMatch::Complete(binding) => {
                if let Some(resolution) = resolve(binding, held, Some(key)) {
                    return Search::Found(resolution);
                }
            }
            BindingMatch::Incomplete => incomplete = true,
            BindingMatch::Missing => {}
        }

        let mut all = held.to_vec();
        if let Err(position) = all.binary_search(&key) {
            all.insert(position, key);
        }
        match find_binding(keys, &all, None) {
            BindingMatch::Complete(binding) => {
                if let Some(resolution) = resolve(binding, &all, None) {
                    return Search::Found(resolution);
                }
            }
            BindingMatch::Incomplete => incomplete = true,
            BindingMatch::Missing => {}
        }

        if incomplete {
            Search::Incomplete
        } else {
            Search::Nothing
        }
    }

    fn log_action(&self, action: &str, context: ContextId, key: Option<KeyValue>, command: Option<Command>) {
        let key = key.map_or_else(|| "-".to_string(), |key| self.names().describe(key));
        match command {
            Some(command) => tracing::debug!("{} ctx={} key={} -> {}", action, context, key, command),
            None => tracing::debug!("{} ctx={} key={}", action, context, key),
        }
    }

    /// Process one key event
    ///
    /// `context` selects the context to resolve in; the default context
    /// means "whatever context is current".
    pub fn process_key_event(
        &mut self,
        env: &mut KeyEnv<'_>,
        context: ContextId,
        group: KeyGroup,
        number: u8,
        press: bool,
    ) -> KeyTableState {
        let key = KeyValue::new(group, number);

        if press && self.pressed.is_empty() {
            self.context.current = self.context.next;
            self.context.next = self.context.persistent;
        }

        let context = self.effective_context(if context == DEFAULT_CONTEXT {
            self.context.current
        } else {
            context
        });

        let hotkey = self.context(context).and_then(|keys| keys.find_hotkey(key)).copied();
        if let Some(hotkey) = hotkey {
            let command = if press { hotkey.press.value } else { hotkey.release.value };
            self.log_action(if press { "hotkey press" } else { "hotkey release" }, context, Some(key), Some(command));
            if !command.is_noop() || !command.flags().is_empty() {
                self.process_command(env, command);
            }
            return KeyTableState::Hotkey;
        }

        let was_pressed = self.pressed.remove(key);
        let state = if press {
            self.press_key(env, context, key, was_pressed)
        } else {
            self.release_key(env, context, key)
        };

        self.update_autorelease(env.alarms);
        state
    }

    fn press_key(&mut self, env: &mut KeyEnv<'_>, context: ContextId, key: KeyValue, was_pressed: bool) -> KeyTableState {
        let isolated = self.context(context).is_some_and(|keys| keys.isolated);

        // Only a context with no binding at all defers to the default context
        let mut search = self.search_context(context, key);
        if matches!(search, Search::Nothing) && context != DEFAULT_CONTEXT && !isolated {
            search = self.search_context(DEFAULT_CONTEXT, key);
        }
        let incomplete = matches!(search, Search::Incomplete);

        let mut found = match search {
            Search::Found(resolution) => Some(resolution),
            _ => None,
        };

        self.pressed.insert(key);

        if found.is_none() {
            let allow_chords = env.prefs.braille_quick_space;
            let mut contexts = vec![context];
            if context != DEFAULT_CONTEXT && !isolated {
                contexts.push(DEFAULT_CONTEXT);
            }
            found = contexts.into_iter().find_map(|id| {
                let keys = self.context(id)?;
                keyboard_command(keys, self.pressed.as_slice(), allow_chords).map(|command| Resolution {
                    command,
                    secondary: None,
                    immediate: false,
                })
            });
        }

        if was_pressed {
            return match found {
                Some(_) => KeyTableState::Command,
                None if incomplete => KeyTableState::Modifiers,
                None => KeyTableState::Unbound,
            };
        }

        self.cancel_long_press(env.alarms);

        let Some(resolution) = found else {
            self.release = None;
            if incomplete {
                self.log_action("modifiers", context, Some(key), None);
                return KeyTableState::Modifiers;
            }
            self.log_action("unbound", context, Some(key), None);
            if isolated {
                env.queue.enqueue(Command::alert(Alert::CommandRejected));
            }
            return KeyTableState::Unbound;
        };

        let prefs = env.prefs;
        let repeatable = |command: Command| {
            command.is_repeatable(prefs.autorepeat_enabled, prefs.autorepeat_panning)
        };
        let secondary = resolution
            .secondary
            .or_else(|| repeatable(resolution.command).then_some(resolution.command));

        if resolution.immediate {
            self.release = None;
            self.log_action("press", context, Some(key), Some(resolution.command));
            self.process_command(env, resolution.command);
        } else {
            self.log_action("defer", context, Some(key), Some(resolution.command));
            self.release = Some(resolution.command);
        }

        if let Some(secondary) = secondary {
            let alarm = env.alarms.schedule(env.prefs.long_press_time, KeyAlarm::LongPress);
            self.long_press = LongPress {
                command: Some(secondary),
                repeat: repeatable(secondary),
                fired: false,
                alarm: Some(alarm),
                context,
                key: Some(key),
            };
        }

        KeyTableState::Command
    }

    fn release_key(&mut self, env: &mut KeyEnv<'_>, context: ContextId, key: KeyValue) -> KeyTableState {
        self.cancel_long_press(env.alarms);

        if env.prefs.release_on_first || self.pressed.is_empty() {
            if let Some(command) = self.release.take() {
                self.log_action("release", context, Some(key), Some(command));
                self.process_command(env, command);
                return KeyTableState::Command;
            }
        }

        KeyTableState::Unbound
    }

    /// Deliver an alarm scheduled by this table
    ///
    /// Stale alarms (already cancelled or superseded) are ignored.
    pub fn handle_alarm(&mut self, env: &mut KeyEnv<'_>, id: AlarmId, alarm: KeyAlarm) {
        match alarm {
            KeyAlarm::LongPress => self.fire_long_press(env, id),
            KeyAlarm::Autorelease => self.fire_autorelease(env, id),
        }
    }

    fn fire_long_press(&mut self, env: &mut KeyEnv<'_>, id: AlarmId) {
        if self.long_press.alarm != Some(id) {
            return;
        }
        self.long_press.alarm = None;

        let Some(command) = self.long_press.command else {
            return;
        };
        let action = if self.long_press.fired { "repeat" } else { "long" };
        self.log_action(action, self.long_press.context, self.long_press.key, Some(command));

        if self.long_press.repeat {
            self.long_press.fired = true;
            let interval = env.prefs.autorepeat_interval.max(1);
            self.long_press.alarm = Some(env.alarms.schedule(interval, KeyAlarm::LongPress));
        } else {
            self.long_press = LongPress::default();
        }

        self.release = None;
        self.process_command(env, command);
    }

    fn fire_autorelease(&mut self, env: &mut KeyEnv<'_>, id: AlarmId) {
        if self.autorelease.alarm != Some(id) {
            return;
        }
        self.autorelease.alarm = None;

        for key in self.pressed.as_slice() {
            tracing::warn!("Autoreleasing stuck key {}", self.names().describe(*key));
        }
        self.reset(env.alarms);
        env.effects.alert(Alert::KeysAutoreleased);
    }

    /// Post-process a resolved command and queue it
    pub fn process_command(&mut self, env: &mut KeyEnv<'_>, command: Command) {
        self.process_command_at(env, command, 0);
    }

    fn process_command_at(&mut self, env: &mut KeyEnv<'_>, command: Command, depth: usize) {
        match command.block_kind() {
            Some(Block::Context) => self.switch_context(env, command),

            Some(Block::Macro) => {
                let index = usize::from(command.arg());
                let commands = match self.macro_commands(index) {
                    Some(commands) if depth < MAX_MACRO_DEPTH => commands.to_vec(),
                    Some(_) => {
                        tracing::warn!("Macro {} nested too deeply", index);
                        env.queue.enqueue(Command::alert(Alert::CommandRejected));
                        return;
                    }
                    None => {
                        tracing::warn!("Macro {} is not defined", index);
                        env.queue.enqueue(Command::alert(Alert::CommandRejected));
                        return;
                    }
                };
                for command in commands {
                    self.process_command_at(env, command, depth + 1);
                }
            }

            Some(Block::HostCommand) => {
                let index = usize::from(command.arg());
                let Some(argv) = self.host_command(index).map(<[String]>::to_vec) else {
                    tracing::warn!("Host command {} is not defined", index);
                    env.queue.enqueue(Command::alert(Alert::CommandRejected));
                    return;
                };
                match env.host.launch(&argv) {
                    Ok(()) => env.effects.push(Effect::HostCommand(argv)),
                    Err(e) => {
                        tracing::warn!("Failed to launch host command {:?}: {}", argv, e);
                        env.queue.enqueue(Command::alert(Alert::CommandRejected));
                    }
                }
            }

            _ => {
                if command.is_input() && !env.prefs.braille_keyboard_enabled {
                    tracing::debug!("braille keyboard disabled, rejecting {}", command);
                    env.queue.enqueue(Command::alert(Alert::CommandRejected));
                    return;
                }

                let command = if command.is_block(Block::PassDots)
                    && env.prefs.braille_typing_mode == BrailleTypingMode::Dots
                {
                    let dots = u32::from(command.arg()) & ALL_DOTS;
                    Command::block(Block::PassChar, 0)
                        .with_bits(UNICODE_BRAILLE_ROW | dots)
                        .with_flags(command.flags())
                } else {
                    command
                };
                env.queue.enqueue(command);
            }
        }
    }

    fn switch_context(&mut self, env: &mut KeyEnv<'_>, command: Command) {
        let target = ContextId::try_from(command.arg())
            .ok()
            .filter(|id| self.context(*id).is_some());
        let Some(id) = target else {
            tracing::warn!("Context {} is not defined", command.arg());
            env.queue.enqueue(Command::alert(Alert::CommandRejected));
            return;
        };

        self.context.next = id;
        let feedback = if self.is_temporary_context(id) {
            CommandFlags::TOGGLE_ON
        } else {
            self.context.persistent = id;
            if id == DEFAULT_CONTEXT {
                CommandFlags::TOGGLE_OFF
            } else {
                CommandFlags::TOGGLE_ON
            }
        };
        env.queue.enqueue(Command::NOOP.with_flags(feedback));

        if env.prefs.speak_key_context {
            if let Some(keys) = self.context(id) {
                let title = keys.title.as_deref().unwrap_or(&keys.name);
                env.effects.speak(title);
            }
        }
        tracing::debug!("switch context -> {}", id);
    }
}
