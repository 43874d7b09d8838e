//! Alert kinds: advisory, non-blocking feedback for the user
//!
//! Alerts never interrupt a session. A renderer (tone generator, display
//! flash) consumes them from the effects outbox.

use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum Alert {
    /// A navigation command had no effect (edge of screen, nothing found)
    Bounce = 0,
    /// Input was refused (keyboard disabled, isolated context, bad command)
    CommandRejected,
    /// The window wrapped up to the previous line
    WrapUp,
    /// The window wrapped down to the next line
    WrapDown,
    /// First identical line skipped
    SkipFirst,
    /// Another identical line skipped
    SkipOne,
    /// Every fourth identical line skipped
    SkipSeveral,
    /// A toggle or temporary context was switched on
    ToggleOn,
    /// A toggle was switched off, or the default context restored
    ToggleOff,
    /// Stuck keys were force-released
    KeysAutoreleased,
}

impl Alert {
    const ALL: [Alert; 10] = [
        Alert::Bounce,
        Alert::CommandRejected,
        Alert::WrapUp,
        Alert::WrapDown,
        Alert::SkipFirst,
        Alert::SkipOne,
        Alert::SkipSeveral,
        Alert::ToggleOn,
        Alert::ToggleOff,
        Alert::KeysAutoreleased,
    ];

    /// Decode the argument of an ALERT command
    pub fn from_arg(arg: u16) -> Option<Alert> {
        Self::ALL.get(usize::from(arg)).copied()
    }

    pub const fn name(self) -> &'static str {
        match self {
            Alert::Bounce => "bounce",
            Alert::CommandRejected => "command_rejected",
            Alert::WrapUp => "wrap_up",
            Alert::WrapDown => "wrap_down",
            Alert::SkipFirst => "skip_first",
            Alert::SkipOne => "skip_one",
            Alert::SkipSeveral => "skip_several",
            Alert::ToggleOn => "toggle_on",
            Alert::ToggleOff => "toggle_off",
            Alert::KeysAutoreleased => "keys_autoreleased",
        }
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
