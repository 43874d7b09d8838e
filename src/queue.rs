//! Command queue and the stack of command handlers
//!
//! Commands resolved from key events are queued and later offered to the
//! handlers, newest handler first. The first handler that accepts a command
//! consumes it.

use std::collections::VecDeque;

use crate::alert::Alert;
use crate::config::Preferences;
use crate::effects::Effects;
use crate::keytable::{Block, Cmd, Command, CommandFlags};
use crate::screen::Screen;
use crate::session::{DisplayMode, SessionState, WindowGeometry};

#[derive(Debug, Clone, Default)]
pub struct CommandQueue {
    commands: VecDeque<Command>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, command: Command) {
        tracing::trace!("enqueue {}", command);
        self.commands.push_back(command);
    }

    pub fn pop(&mut self) -> Option<Command> {
        self.commands.pop_front()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Everything a handler may read or change while handling one command
pub struct CommandContext<'a> {
    pub prefs: &'a mut Preferences,
    pub screen: &'a dyn Screen,
    pub session: &'a mut SessionState,
    pub geometry: WindowGeometry,
    pub effects: &'a mut Effects,
}

pub trait CommandHandler {
    fn name(&self) -> &str;

    /// Handle a command; return false to offer it to the next handler
    fn handle_command(&mut self, command: Command, ctx: &mut CommandContext<'_>) -> bool;
}

/// Handlers in push order; dispatch walks them newest first
#[derive(Default)]
pub struct CommandHandlers {
    stack: Vec<Box<dyn CommandHandler>>,
}

impl CommandHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, handler: Box<dyn CommandHandler>) {
        tracing::debug!("push command handler '{}'", handler.name());
        self.stack.push(handler);
    }

    pub fn names(&self) -> Vec<&str> {
        self.stack.iter().rev().map(|handler| handler.name()).collect()
    }

    /// Offer a command to every handler; unhandled commands are rejected
    pub fn dispatch(&mut self, command: Command, ctx: &mut CommandContext<'_>) -> bool {
        for handler in self.stack.iter_mut().rev() {
            if handler.handle_command(command, ctx) {
                return true;
            }
        }

        tracing::debug!("unhandled command {}", command);
        ctx.effects.alert(Alert::CommandRejected);
        false
    }
}

impl std::fmt::Debug for CommandHandlers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandHandlers")
            .field("stack", &self.names())
            .finish()
    }
}

// ============================================================================
// Built-in handlers
// ============================================================================

/// Turns ALERT commands and toggle feedback on NOOP into alerts
#[derive(Debug, Default)]
pub struct FeedbackHandler;

impl CommandHandler for FeedbackHandler {
    fn name(&self) -> &str {
        "feedback"
    }

    fn handle_command(&mut self, command: Command, ctx: &mut CommandContext<'_>) -> bool {
        if command.is_block(Block::Alert) {
            match Alert::from_arg(command.arg()) {
                Some(alert) => ctx.effects.alert(alert),
                None => ctx.effects.alert(Alert::CommandRejected),
            }
            return true;
        }

        if command.is_noop() {
            let flags = command.flags();
            if flags.contains(CommandFlags::TOGGLE_ON) {
                ctx.effects.alert(Alert::ToggleOn);
            } else if flags.contains(CommandFlags::TOGGLE_OFF) {
                ctx.effects.alert(Alert::ToggleOff);
            }
            return true;
        }

        false
    }
}

/// Session and preference toggles
#[derive(Debug, Default)]
pub struct ToggleHandler;

/// Apply a toggle command's flags to a setting, returning the new value
fn toggle(setting: &mut bool, command: Command) -> bool {
    let flags = command.flags();
    *setting = if flags.contains(CommandFlags::TOGGLE_ON) {
        true
    } else if flags.contains(CommandFlags::TOGGLE_OFF) {
        false
    } else {
        !*setting
    };
    *setting
}

impl CommandHandler for ToggleHandler {
    fn name(&self) -> &str {
        "toggle"
    }

    fn handle_command(&mut self, command: Command, ctx: &mut CommandContext<'_>) -> bool {
        let state = match command.as_cmd() {
            Some(Cmd::SkipIdenticalLines) => toggle(&mut ctx.prefs.skip_identical_lines, command),
            Some(Cmd::SkipBlankWindows) => toggle(&mut ctx.prefs.skip_blank_windows, command),
            Some(Cmd::CursorTracking) => toggle(&mut ctx.session.track_cursor, command),
            Some(Cmd::DisplayMode) => {
                let mut attributes = ctx.session.display_mode == DisplayMode::Attributes;
                let state = toggle(&mut attributes, command);
                ctx.session.display_mode = if attributes {
                    DisplayMode::Attributes
                } else {
                    DisplayMode::Text
                };
                ctx.effects.redraw();
                state
            }
            _ => return false,
        };

        ctx.effects
            .alert(if state { Alert::ToggleOn } else { Alert::ToggleOff });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screen::TextScreen;

    struct Recorder {
        seen: Vec<Command>,
        accept: bool,
    }

    impl CommandHandler for Recorder {
        fn name(&self) -> &str {
            "recorder"
        }

        fn handle_command(&mut self, command: Command, _ctx: &mut CommandContext<'_>) -> bool {
            self.seen.push(command);
            self.accept
        }
    }

    fn with_context<R>(run: impl FnOnce(&mut CommandContext<'_>) -> R) -> (R, Preferences, SessionState, Effects) {
        let mut prefs = Preferences::default();
        let mut session = SessionState::new();
        let mut effects = Effects::new();
        let screen = TextScreen::from_text("hello");
        let result = {
            let mut ctx = CommandContext {
                prefs: &mut prefs,
                screen: &screen,
                session: &mut session,
                geometry: WindowGeometry::default(),
                effects: &mut effects,
            };
            run(&mut ctx)
        };
        (result, prefs, session, effects)
    }

    #[test]
    fn test_queue_is_fifo() {
        let mut queue = CommandQueue::new();
        queue.enqueue(Command::cmd(Cmd::Top));
        queue.enqueue(Command::cmd(Cmd::Bottom));
        assert_eq!(queue.pop(), Some(Command::cmd(Cmd::Top)));
        assert_eq!(queue.pop(), Some(Command::cmd(Cmd::Bottom)));
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn test_unhandled_command_is_rejected() {
        let (handled, _, _, effects) = with_context(|ctx| {
            let mut handlers = CommandHandlers::new();
            handlers.push(Box::new(FeedbackHandler));
            handlers.dispatch(Command::cmd(Cmd::Top), ctx)
        });
        assert!(!handled);
        assert_eq!(effects.alerts().collect::<Vec<_>>(), vec![Alert::CommandRejected]);
    }

    #[test]
    fn test_newest_handler_first() {
        let mut handlers = CommandHandlers::new();
        handlers.push(Box::new(ToggleHandler));
        handlers.push(Box::new(Recorder {
            seen: Vec::new(),
            accept: true,
        }));
        assert_eq!(handlers.names(), vec!["recorder", "toggle"]);

        let (_, prefs, _, _) = with_context(|ctx| handlers.dispatch(Command::cmd(Cmd::SkipIdenticalLines), ctx));
        // The recorder accepted it, so the toggle never ran
        assert!(!prefs.skip_identical_lines);
    }

    #[test]
    fn test_feedback_for_toggle_flags() {
        let (_, _, _, effects) = with_context(|ctx| {
            let mut handler = FeedbackHandler;
            handler.handle_command(Command::NOOP.with_flags(CommandFlags::TOGGLE_ON), ctx);
            handler.handle_command(Command::NOOP.with_flags(CommandFlags::TOGGLE_OFF), ctx);
            handler.handle_command(Command::alert(Alert::WrapDown), ctx);
        });
        assert_eq!(
            effects.alerts().collect::<Vec<_>>(),
            vec![Alert::ToggleOn, Alert::ToggleOff, Alert::WrapDown]
        );
    }

    #[test]
    fn test_toggle_flags_force_state() {
        let (_, prefs, session, _) = with_context(|ctx| {
            let mut handler = ToggleHandler;
            handler.handle_command(Command::cmd(Cmd::SkipIdenticalLines), ctx);
            handler.handle_command(
                Command::cmd(Cmd::SkipBlankWindows).with_flags(CommandFlags::TOGGLE_OFF),
                ctx,
            );
            handler.handle_command(Command::cmd(Cmd::DisplayMode), ctx);
            handler.handle_command(
                Command::cmd(Cmd::CursorTracking).with_flags(CommandFlags::TOGGLE_ON),
                ctx,
            );
        });
        assert!(prefs.skip_identical_lines);
        assert!(!prefs.skip_blank_windows);
        assert_eq!(session.display_mode, DisplayMode::Attributes);
        assert!(session.track_cursor);
    }
}
