//! Packed command codes and the command registry
//!
//! A command is a 32-bit value: the argument in bits 0-15, the block
//! (command family) in bits 16-23 and flags in bits 24-31. Block 0 holds the
//! argument-less commands enumerated by [`Cmd`]; every other block takes an
//! argument (a column offset, a context id, a dot pattern...).

use std::fmt;

use crate::alert::Alert;

pub const ARG_MASK: u32 = 0x0000_FFFF;
pub const BLOCK_SHIFT: u32 = 16;
pub const BLOCK_MASK: u32 = 0x00FF_0000;
pub const FLAG_SHIFT: u32 = 24;
pub const FLAG_MASK: u32 = 0xFF00_0000;

// Dot bits of a PASSDOTS argument
pub const DOT1: u32 = 0x0001;
pub const DOT2: u32 = 0x0002;
pub const DOT3: u32 = 0x0004;
pub const DOT4: u32 = 0x0008;
pub const DOT5: u32 = 0x0010;
pub const DOT6: u32 = 0x0020;
pub const DOT7: u32 = 0x0040;
pub const DOT8: u32 = 0x0080;
/// The space bar (chord) bit of a PASSDOTS argument
pub const DOT_SPACE: u32 = 0x0100;
pub const ALL_DOTS: u32 = 0x00FF;

/// First code point of the Unicode braille patterns block
pub const UNICODE_BRAILLE_ROW: u32 = 0x2800;

/// Command flags as a bitfield (the top byte of a command)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CommandFlags(u8);

impl CommandFlags {
    pub const NONE: CommandFlags = CommandFlags(0);
    pub const TOGGLE_ON: CommandFlags = CommandFlags(0x01);
    pub const TOGGLE_OFF: CommandFlags = CommandFlags(0x02);
    pub const INPUT_SHIFT: CommandFlags = CommandFlags(0x04);
    pub const INPUT_UPPER: CommandFlags = CommandFlags(0x08);
    pub const INPUT_CONTROL: CommandFlags = CommandFlags(0x10);
    pub const INPUT_META: CommandFlags = CommandFlags(0x20);

    pub const fn from_bits(bits: u8) -> Self {
        CommandFlags(bits)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn contains(self, other: CommandFlags) -> bool {
        (self.0 & other.0) == other.0
    }

    #[inline]
    pub const fn union(self, other: CommandFlags) -> CommandFlags {
        CommandFlags(self.0 | other.0)
    }
}

impl std::ops::BitOr for CommandFlags {
    type Output = CommandFlags;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

/// Argument-less commands (block 0)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum Cmd {
    Noop = 0,
    LineUp,
    LineDown,
    WindowUp,
    WindowDown,
    PrevDifferentLine,
    NextDifferentLine,
    AttributesUp,
    AttributesDown,
    Top,
    Bottom,
    TopLeft,
    BottomLeft,
    PrevParagraph,
    NextParagraph,
    PrevPrompt,
    NextPrompt,
    LineBegin,
    LineEnd,
    CharLeft,
    CharRight,
    HalfWindowLeft,
    HalfWindowRight,
    FullWindowLeft,
    FullWindowRight,
    FullWindowLeftSkip,
    FullWindowRightSkip,
    Home,
    Back,
    Return,
    DisplayMode,
    CursorTracking,
    SkipIdenticalLines,
    SkipBlankWindows,
}

impl Cmd {
    const ALL: [Cmd; 34] = [
        Cmd::Noop,
        Cmd::LineUp,
        Cmd::LineDown,
        Cmd::WindowUp,
        Cmd::WindowDown,
        Cmd::PrevDifferentLine,
        Cmd::NextDifferentLine,
        Cmd::AttributesUp,
        Cmd::AttributesDown,
        Cmd::Top,
        Cmd::Bottom,
        Cmd::TopLeft,
        Cmd::BottomLeft,
        Cmd::PrevParagraph,
        Cmd::NextParagraph,
        Cmd::PrevPrompt,
        Cmd::NextPrompt,
        Cmd::LineBegin,
        Cmd::LineEnd,
        Cmd::CharLeft,
        Cmd::CharRight,
        Cmd::HalfWindowLeft,
        Cmd::HalfWindowRight,
        Cmd::FullWindowLeft,
        Cmd::FullWindowRight,
        Cmd::FullWindowLeftSkip,
        Cmd::FullWindowRightSkip,
        Cmd::Home,
        Cmd::Back,
        Cmd::Return,
        Cmd::DisplayMode,
        Cmd::CursorTracking,
        Cmd::SkipIdenticalLines,
        Cmd::SkipBlankWindows,
    ];

    pub fn from_code(code: u16) -> Option<Cmd> {
        Self::ALL.get(usize::from(code)).copied()
    }
}

/// Command families that carry an argument
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Block {
    Route = 1,
    PassKey,
    PassChar,
    PassDots,
    Context,
    Macro,
    HostCommand,
    Alert,
    SetLeft,
    GotoLine,
    SetMark,
    GotoMark,
    PrevIndent,
    NextIndent,
    PrevDifferentChar,
    NextDifferentChar,
    GotoColumn,
    SpeakRange,
}

impl Block {
    const ALL: [Block; 18] = [
        Block::Route,
        Block::PassKey,
        Block::PassChar,
        Block::PassDots,
        Block::Context,
        Block::Macro,
        Block::HostCommand,
        Block::Alert,
        Block::SetLeft,
        Block::GotoLine,
        Block::SetMark,
        Block::GotoMark,
        Block::PrevIndent,
        Block::NextIndent,
        Block::PrevDifferentChar,
        Block::NextDifferentChar,
        Block::GotoColumn,
        Block::SpeakRange,
    ];

    pub fn from_code(code: u8) -> Option<Block> {
        if code == 0 {
            return None;
        }
        Self::ALL.get(usize::from(code) - 1).copied()
    }
}

/// Keyboard keys that can be passed through to the host (PASSKEY arguments)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum PassKey {
    Enter = 0,
    Tab,
    Backspace,
    Escape,
    CursorLeft,
    CursorRight,
    CursorUp,
    CursorDown,
    PageUp,
    PageDown,
    Home,
    End,
    Insert,
    Delete,
}

/// A packed command code
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Command(u32);

impl Command {
    pub const NOOP: Command = Command(0);

    pub const fn from_raw(raw: u32) -> Self {
        Command(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    /// An argument-less command
    pub const fn cmd(cmd: Cmd) -> Self {
        Command(cmd as u32)
    }

    /// A command of an argument-carrying block
    pub const fn block(block: Block, arg: u16) -> Self {
        Command(((block as u32) << BLOCK_SHIFT) | arg as u32)
    }

    pub const fn pass_key(key: PassKey) -> Self {
        Self::block(Block::PassKey, key as u16)
    }

    pub const fn alert(alert: Alert) -> Self {
        Self::block(Block::Alert, alert as u16)
    }

    pub const fn context(context: u8) -> Self {
        Self::block(Block::Context, context as u16)
    }

    /// The block number (0 for argument-less commands)
    #[inline]
    pub const fn block_code(self) -> u8 {
        ((self.0 & BLOCK_MASK) >> BLOCK_SHIFT) as u8
    }

    #[inline]
    pub fn block_kind(self) -> Option<Block> {
        Block::from_code(self.block_code())
    }

    #[inline]
    pub const fn arg(self) -> u16 {
        (self.0 & ARG_MASK) as u16
    }

    #[inline]
    pub const fn flags(self) -> CommandFlags {
        CommandFlags::from_bits(((self.0 & FLAG_MASK) >> FLAG_SHIFT) as u8)
    }

    /// The command without its flags
    #[inline]
    pub const fn code(self) -> Command {
        Command(self.0 & !FLAG_MASK)
    }

    pub const fn with_flags(self, flags: CommandFlags) -> Self {
        Command(self.0 | ((flags.bits() as u32) << FLAG_SHIFT))
    }

    /// OR raw bits (dots, flags) into the command
    pub const fn with_bits(self, bits: u32) -> Self {
        Command(self.0 | bits)
    }

    /// Add to the argument, keeping block and flags intact
    pub const fn with_arg_added(self, amount: u16) -> Self {
        let arg = self.arg().wrapping_add(amount) as u32;
        Command((self.0 & !ARG_MASK) | arg)
    }

    /// The block 0 command this value encodes, if any
    pub fn as_cmd(self) -> Option<Cmd> {
        if self.block_code() == 0 {
            Cmd::from_code(self.arg())
        } else {
            None
        }
    }

    #[inline]
    pub fn is(self, cmd: Cmd) -> bool {
        self.code() == Command::cmd(cmd)
    }

    #[inline]
    pub fn is_block(self, block: Block) -> bool {
        self.block_code() == block as u8
    }

    #[inline]
    pub fn is_noop(self) -> bool {
        self.code() == Command::NOOP
    }

    /// Commands that type something on the host
    pub fn is_input(self) -> bool {
        matches!(
            self.block_kind(),
            Some(Block::PassKey | Block::PassChar | Block::PassDots)
        )
    }

    /// Check if holding the key should repeat this command
    pub fn is_repeatable(self, autorepeat: bool, panning: bool) -> bool {
        if !autorepeat {
            return false;
        }

        match self.block_kind() {
            Some(Block::PassChar | Block::PassDots) => true,
            Some(Block::PassKey) => matches!(
                self.arg(),
                a if a == PassKey::Enter as u16
                    || a == PassKey::Tab as u16
                    || a == PassKey::Backspace as u16
                    || a == PassKey::Delete as u16
                    || a == PassKey::PageUp as u16
                    || a == PassKey::PageDown as u16
                    || a == PassKey::CursorLeft as u16
                    || a == PassKey::CursorRight as u16
                    || a == PassKey::CursorUp as u16
                    || a == PassKey::CursorDown as u16
            ),
            Some(_) => false,
            None => match self.as_cmd() {
                Some(
                    Cmd::LineUp
                    | Cmd::LineDown
                    | Cmd::PrevDifferentLine
                    | Cmd::NextDifferentLine
                    | Cmd::CharLeft
                    | Cmd::CharRight,
                ) => true,
                Some(Cmd::FullWindowLeft | Cmd::FullWindowRight) => panning,
                _ => false,
            },
        }
    }
}

impl From<Cmd> for Command {
    fn from(cmd: Cmd) -> Self {
        Command::cmd(cmd)
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Command({:#010x} {})", self.0, self)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match CommandEntry::for_command(*self) {
            Some(entry) if entry.code == self.code() => write!(f, "{}", entry.name)?,
            Some(entry) => {
                let offset = self.arg() - entry.code.arg();
                write!(f, "{}+{}", entry.name, offset)?;
            }
            None => write!(f, "{:#x}", self.code().raw())?,
        }

        let flags = self.flags();
        if flags.contains(CommandFlags::TOGGLE_ON) {
            write!(f, ":toggle_on")?;
        }
        if flags.contains(CommandFlags::TOGGLE_OFF) {
            write!(f, ":toggle_off")?;
        }
        Ok(())
    }
}

// ============================================================================
// Command registry
// ============================================================================

/// How a command's argument is obtained
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Argument {
    /// No argument
    None,
    /// Written explicitly in the key table (`CONTEXT+2`, `MACRO+0`)
    Explicit,
    /// Number of the wildcard key, as an offset into the braille window
    Offset,
    /// Number of the wildcard key, as a screen column
    Column,
    /// Number of the wildcard key, as a screen row
    Row,
    /// Numbers of two wildcard keys, as a range (first in the low byte)
    Range,
}

impl Argument {
    /// Check if the argument is taken from the keys that matched wildcards
    pub const fn from_keys(self) -> bool {
        matches!(
            self,
            Argument::Offset | Argument::Column | Argument::Row | Argument::Range
        )
    }
}

/// A registry entry describing a command
#[derive(Debug, PartialEq, Eq)]
pub struct CommandEntry {
    pub name: &'static str,
    pub code: Command,
    pub argument: Argument,
    pub description: &'static str,
}

const fn entry(name: &'static str, cmd: Cmd, description: &'static str) -> CommandEntry {
    CommandEntry {
        name,
        code: Command::cmd(cmd),
        argument: Argument::None,
        description,
    }
}

const fn block_entry(
    name: &'static str,
    block: Block,
    argument: Argument,
    description: &'static str,
) -> CommandEntry {
    CommandEntry {
        name,
        code: Command::block(block, 0),
        argument,
        description,
    }
}

const fn key_entry(name: &'static str, key: PassKey, description: &'static str) -> CommandEntry {
    CommandEntry {
        name,
        code: Command::pass_key(key),
        argument: Argument::None,
        description,
    }
}

/// Static registry of every command a key table can bind
pub static COMMANDS: &[CommandEntry] = &[
    entry("NOOP", Cmd::Noop, "do nothing"),
    entry("LNUP", Cmd::LineUp, "go up one line"),
    entry("LNDN", Cmd::LineDown, "go down one line"),
    entry("WINUP", Cmd::WindowUp, "go up several lines"),
    entry("WINDN", Cmd::WindowDown, "go down several lines"),
    entry("PRDIFLN", Cmd::PrevDifferentLine, "go up to nearest line with different content"),
    entry("NXDIFLN", Cmd::NextDifferentLine, "go down to nearest line with different content"),
    entry("ATTRUP", Cmd::AttributesUp, "go up to nearest line with different highlighting"),
    entry("ATTRDN", Cmd::AttributesDown, "go down to nearest line with different highlighting"),
    entry("TOP", Cmd::Top, "go to top line"),
    entry("BOT", Cmd::Bottom, "go to bottom line"),
    entry("TOP_LEFT", Cmd::TopLeft, "go to beginning of top line"),
    entry("BOT_LEFT", Cmd::BottomLeft, "go to beginning of bottom line"),
    entry("PRPGRPH", Cmd::PrevParagraph, "go up to first line of paragraph"),
    entry("NXPGRPH", Cmd::NextParagraph, "go down to first line of next paragraph"),
    entry("PRPROMPT", Cmd::PrevPrompt, "go up to previous command prompt"),
    entry("NXPROMPT", Cmd::NextPrompt, "go down to next command prompt"),
    entry("LNBEG", Cmd::LineBegin, "go to beginning of line"),
    entry("LNEND", Cmd::LineEnd, "go to end of line"),
    entry("CHRLT", Cmd::CharLeft, "go left one character"),
    entry("CHRRT", Cmd::CharRight, "go right one character"),
    entry("HWINLT", Cmd::HalfWindowLeft, "go left half a braille window"),
    entry("HWINRT", Cmd::HalfWindowRight, "go right half a braille window"),
    entry("FWINLT", Cmd::FullWindowLeft, "go backward one braille window"),
    entry("FWINRT", Cmd::FullWindowRight, "go forward one braille window"),
    entry("FWINLTSKIP", Cmd::FullWindowLeftSkip, "go backward skipping blank braille windows"),
    entry("FWINRTSKIP", Cmd::FullWindowRightSkip, "go forward skipping blank braille windows"),
    entry("HOME", Cmd::Home, "go to screen cursor"),
    entry("BACK", Cmd::Back, "go back after cursor tracking"),
    entry("RETURN", Cmd::Return, "go to screen cursor or go back after cursor tracking"),
    entry("DISPMD", Cmd::DisplayMode, "set display mode attributes/text"),
    entry("CSRTRK", Cmd::CursorTracking, "set track screen cursor on/off"),
    entry("SKPIDLNS", Cmd::SkipIdenticalLines, "set skip identical lines on/off"),
    entry("SKPBLNKWINS", Cmd::SkipBlankWindows, "set skip blank braille windows on/off"),
    key_entry("KEY_ENTER", PassKey::Enter, "enter key"),
    key_entry("KEY_TAB", PassKey::Tab, "tab key"),
    key_entry("KEY_BACKSPACE", PassKey::Backspace, "backspace key"),
    key_entry("KEY_ESCAPE", PassKey::Escape, "escape key"),
    key_entry("KEY_CURSOR_LEFT", PassKey::CursorLeft, "cursor-left key"),
    key_entry("KEY_CURSOR_RIGHT", PassKey::CursorRight, "cursor-right key"),
    key_entry("KEY_CURSOR_UP", PassKey::CursorUp, "cursor-up key"),
    key_entry("KEY_CURSOR_DOWN", PassKey::CursorDown, "cursor-down key"),
    key_entry("KEY_PAGE_UP", PassKey::PageUp, "page-up key"),
    key_entry("KEY_PAGE_DOWN", PassKey::PageDown, "page-down key"),
    key_entry("KEY_HOME", PassKey::Home, "home key"),
    key_entry("KEY_END", PassKey::End, "end key"),
    key_entry("KEY_INSERT", PassKey::Insert, "insert key"),
    key_entry("KEY_DELETE", PassKey::Delete, "delete key"),
    block_entry("ROUTE", Block::Route, Argument::Offset, "bring screen cursor to character"),
    block_entry("PASSCHAR", Block::PassChar, Argument::Explicit, "type unicode character"),
    block_entry("PASSDOTS", Block::PassDots, Argument::Explicit, "type braille character"),
    block_entry("CONTEXT", Block::Context, Argument::Explicit, "switch to command context"),
    block_entry("MACRO", Block::Macro, Argument::Explicit, "execute command macro"),
    block_entry("HOSTCMD", Block::HostCommand, Argument::Explicit, "execute host command"),
    block_entry("ALERT", Block::Alert, Argument::Explicit, "render alert"),
    block_entry("SETLEFT", Block::SetLeft, Argument::Offset, "place left end of braille window at character"),
    block_entry("GOTOLINE", Block::GotoLine, Argument::Row, "go to selected line"),
    block_entry("SETMARK", Block::SetMark, Argument::Explicit, "remember current braille window position"),
    block_entry("GOTOMARK", Block::GotoMark, Argument::Explicit, "go to remembered braille window position"),
    block_entry("PRINDENT", Block::PrevIndent, Argument::Offset, "go up to nearest line with less indent than character"),
    block_entry("NXINDENT", Block::NextIndent, Argument::Offset, "go down to nearest line with less indent than character"),
    block_entry("PRDIFCHAR", Block::PrevDifferentChar, Argument::Offset, "go up to nearest line with different character"),
    block_entry("NXDIFCHAR", Block::NextDifferentChar, Argument::Offset, "go down to nearest line with different character"),
    block_entry("GOTOCOL", Block::GotoColumn, Argument::Column, "go to selected column"),
    block_entry("SAYRANGE", Block::SpeakRange, Argument::Range, "speak characters between two cells"),
];

impl CommandEntry {
    /// Find an entry by name (case-insensitive)
    pub fn find(name: &str) -> Option<&'static CommandEntry> {
        COMMANDS
            .iter()
            .find(|entry| entry.name.eq_ignore_ascii_case(name))
    }

    /// Find the entry that describes a command value
    ///
    /// Exact codes win (block 0 commands, individual PASSKEY keys); otherwise
    /// the entry of the command's block is returned.
    pub fn for_command(command: Command) -> Option<&'static CommandEntry> {
        let code = command.code();
        if let Some(entry) = COMMANDS.iter().find(|entry| entry.code == code) {
            return Some(entry);
        }

        if command.block_code() == 0 || command.is_block(Block::PassKey) {
            return None;
        }

        COMMANDS.iter().find(|entry| {
            entry.code.block_code() == command.block_code() && entry.code.arg() == 0
        })
    }
}
