//! The engine: one key table driving one braille session
//!
//! The embedding application feeds in key events and clock ticks and
//! collects [`Effect`]s. Everything runs on the caller's thread: alarms are
//! only delivered from [`Engine::advance`], never behind the caller's back.
//!
//! ```text
//! key_event() ─→ KeyTable ─→ CommandQueue ─→ CommandHandlers ─→ Effects
//! advance()   ─→ AlarmQueue ─→ KeyTable (long press / autorelease) ─┘
//! ```

use crate::alarm::AlarmQueue;
use crate::config::Preferences;
use crate::effects::{Effect, Effects};
use crate::host::{HostLauncher, ProcessLauncher};
use crate::keytable::{Cmd, Command, ContextId, KeyAlarm, KeyEnv, KeyGroup, KeyTable, KeyTableState};
use crate::navigation::NavigationHandler;
use crate::queue::{CommandContext, CommandHandler, CommandHandlers, CommandQueue, FeedbackHandler, ToggleHandler};
use crate::screen::Screen;
use crate::session::{SessionState, WindowGeometry};

pub struct Engine {
    prefs: Preferences,
    geometry: WindowGeometry,
    key_table: Option<KeyTable>,
    alarms: AlarmQueue<KeyAlarm>,
    queue: CommandQueue,
    handlers: CommandHandlers,
    screen: Box<dyn Screen>,
    session: SessionState,
    effects: Effects,
    host: Box<dyn HostLauncher>,
}

impl Engine {
    /// Create an engine with the built-in handlers and no key table
    pub fn new(prefs: Preferences, screen: Box<dyn Screen>) -> Self {
        let mut handlers = CommandHandlers::new();
        handlers.push(Box::new(FeedbackHandler));
        handlers.push(Box::new(ToggleHandler));
        handlers.push(Box::new(NavigationHandler::new()));

        Self {
            prefs,
            geometry: WindowGeometry::default(),
            key_table: None,
            alarms: AlarmQueue::new(),
            queue: CommandQueue::new(),
            handlers,
            screen,
            session: SessionState::new(),
            effects: Effects::new(),
            host: Box::new(ProcessLauncher),
        }
    }

    pub fn with_geometry(mut self, geometry: WindowGeometry) -> Self {
        self.geometry = geometry;
        self
    }

    /// Install a key table, returning the previous one
    ///
    /// The previous table is reset so none of its alarms stay outstanding.
    pub fn set_key_table(&mut self, mut table: KeyTable) -> Option<KeyTable> {
        table.set_autorelease_time(self.prefs.autorelease_time, &mut self.alarms);
        let mut previous = self.key_table.replace(table);
        if let Some(previous) = previous.as_mut() {
            previous.reset(&mut self.alarms);
            previous.set_autorelease_time(0, &mut self.alarms);
        }
        tracing::info!("Installed key table");
        previous
    }

    pub fn key_table(&self) -> Option<&KeyTable> {
        self.key_table.as_ref()
    }

    /// Replace the preferences snapshot
    pub fn set_preferences(&mut self, prefs: Preferences) {
        self.prefs = prefs;
        if let Some(table) = self.key_table.as_mut() {
            table.set_autorelease_time(self.prefs.autorelease_time, &mut self.alarms);
        }
    }

    pub fn preferences(&self) -> &Preferences {
        &self.prefs
    }

    pub fn set_host_launcher(&mut self, host: Box<dyn HostLauncher>) {
        self.host = host;
    }

    /// Replace the screen contents
    ///
    /// With cursor tracking on, a moved screen cursor brings the window to it.
    pub fn set_screen(&mut self, screen: Box<dyn Screen>) {
        let before = self.screen.describe();
        self.screen = screen;
        let after = self.screen.describe();

        let moved = !before.has_cursor || (before.posx, before.posy) != (after.posx, after.posy);
        if self.session.track_cursor && after.has_cursor && moved {
            self.queue.enqueue(Command::cmd(Cmd::Home));
            self.dispatch_queued();
        }
    }

    pub fn screen(&self) -> &dyn Screen {
        self.screen.as_ref()
    }

    /// Add a handler; it is consulted before every handler added earlier
    pub fn push_handler(&mut self, handler: Box<dyn CommandHandler>) {
        self.handlers.push(handler);
    }

    pub fn handler_names(&self) -> Vec<&str> {
        self.handlers.names()
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn geometry(&self) -> WindowGeometry {
        self.geometry
    }

    /// Current virtual time in milliseconds
    pub fn now(&self) -> u64 {
        self.alarms.now()
    }

    /// Process one key event and dispatch every command it produced
    ///
    /// Without a key table every event is unbound.
    pub fn key_event(&mut self, context: ContextId, group: KeyGroup, number: u8, press: bool) -> KeyTableState {
        let Some(table) = self.key_table.as_mut() else {
            tracing::debug!("key event without a key table: {}.{}", group, number);
            return KeyTableState::Unbound;
        };

        let mut env = KeyEnv {
            prefs: &self.prefs,
            alarms: &mut self.alarms,
            queue: &mut self.queue,
            effects: &mut self.effects,
            host: &mut *self.host,
        };
        let state = table.process_key_event(&mut env, context, group, number, press);
        self.dispatch_queued();
        state
    }

    /// Run a command as if a key had produced it
    ///
    /// Context, macro and host commands are expanded by the key table when
    /// one is installed.
    pub fn execute(&mut self, command: Command) {
        match self.key_table.as_mut() {
            Some(table) => {
                let mut env = KeyEnv {
                    prefs: &self.prefs,
                    alarms: &mut self.alarms,
                    queue: &mut self.queue,
                    effects: &mut self.effects,
                    host: &mut *self.host,
                };
                table.process_command(&mut env, command);
            }
            None => self.queue.enqueue(command),
        }
        self.dispatch_queued();
    }

    /// Advance the clock, firing every alarm that falls due on the way
    pub fn advance(&mut self, elapsed_ms: u64) {
        let until = self.alarms.now().saturating_add(elapsed_ms);
        while let Some((id, alarm)) = self.alarms.pop_due(until) {
            if let Some(table) = self.key_table.as_mut() {
                let mut env = KeyEnv {
                    prefs: &self.prefs,
                    alarms: &mut self.alarms,
                    queue: &mut self.queue,
                    effects: &mut self.effects,
                    host: &mut *self.host,
                };
                table.handle_alarm(&mut env, id, alarm);
            }
            self.dispatch_queued();
        }
        self.alarms.set_now(until);
    }

    /// Milliseconds until the next alarm, if any is outstanding
    pub fn next_alarm_in(&self) -> Option<u64> {
        self.alarms
            .next_deadline()
            .map(|deadline| deadline.saturating_sub(self.alarms.now()))
    }

    /// Forget held keys and pending commands
    pub fn reset_keys(&mut self) {
        if let Some(table) = self.key_table.as_mut() {
            table.reset(&mut self.alarms);
        }
    }

    pub fn effects(&self) -> &Effects {
        &self.effects
    }

    /// Drain the effects produced since the last call
    pub fn take_effects(&mut self) -> Vec<Effect> {
        self.effects.take()
    }

    fn dispatch_queued(&mut self) {
        while let Some(command) = self.queue.pop() {
            tracing::debug!("dispatch {}", command);
            let mut ctx = CommandContext {
                prefs: &mut self.prefs,
                screen: self.screen.as_ref(),
                session: &mut self.session,
                geometry: self.geometry,
                effects: &mut self.effects,
            };
            self.handlers.dispatch(command, &mut ctx);
        }
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("geometry", &self.geometry)
            .field("has_key_table", &self.key_table.is_some())
            .field("now", &self.alarms.now())
            .field("session", &self.session)
            .field("handlers", &self.handlers)
            .finish()
    }
}
