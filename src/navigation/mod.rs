//! Navigation command handler
//!
//! Interprets motion commands against the screen and moves the braille
//! window over it:
//! - Vertical motion, optionally skipping identical lines
//! - Paragraph and prompt searches
//! - Horizontal panning with wrapping and blank-window skipping
//! - Cursor routing, marks and the motion anchor (HOME/BACK/RETURN)
//!
//! A command that cannot move the window raises a bounce alert. Every
//! successful move records the previous position as the motion anchor and
//! requests a redraw.

mod search;
mod window;

use regex::Regex;

use crate::alert::Alert;
use crate::config::Preferences;
use crate::effects::Effect;
use crate::keytable::{Block, Cmd, Command};
use crate::queue::{CommandContext, CommandHandler};
use crate::screen::{ScreenCharacter, ScreenDescription};

pub use search::{is_blank_row, skip_alert, RowMatch};

/// Maximum number of wrap alerts while searching for a non-blank window
const MAX_WRAP_ALERTS: usize = 3;

/// Vertical search direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vertical {
    Up,
    Down,
}

/// Prompt regexes compiled from [`Preferences::prompt_patterns`]
///
/// Patterns are anchored at the start of the row. They are recompiled only
/// when the preference changes; invalid patterns are skipped with a warning.
#[derive(Debug, Default)]
pub struct PromptPatterns {
    source: Vec<String>,
    compiled: Vec<Regex>,
}

impl PromptPatterns {
    pub fn new(patterns: &[String]) -> Self {
        let mut prompts = Self::default();
        prompts.update(patterns);
        prompts
    }

    pub fn update(&mut self, patterns: &[String]) {
        if self.source == patterns {
            return;
        }

        self.source = patterns.to_vec();
        self.compiled = patterns
            .iter()
            .filter_map(|pattern| match Regex::new(&format!("^(?:{})", pattern)) {
                Ok(regex) => Some(regex),
                Err(e) => {
                    tracing::warn!("Ignoring invalid prompt pattern '{}': {}", pattern, e);
                    None
                }
            })
            .collect();
        tracing::debug!("compiled {} prompt patterns", self.compiled.len());
    }

    pub fn is_empty(&self) -> bool {
        self.compiled.is_empty()
    }

    pub fn len(&self) -> usize {
        self.compiled.len()
    }

    pub fn is_prompt(&self, row: &str) -> bool {
        self.compiled.iter().any(|regex| regex.is_match(row))
    }
}

/// Moves the braille window in response to navigation commands
#[derive(Debug, Default)]
pub struct NavigationHandler {
    prompts: PromptPatterns,
}

impl NavigationHandler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CommandHandler for NavigationHandler {
    fn name(&self) -> &str {
        "navigation"
    }

    fn handle_command(&mut self, command: Command, ctx: &mut CommandContext<'_>) -> bool {
        self.prompts.update(&ctx.prefs.prompt_patterns);

        let mut nav = Nav::new(ctx);
        let handled = match (command.as_cmd(), command.block_kind()) {
            (Some(cmd), _) => nav.run(cmd, &self.prompts),
            (None, Some(block)) => nav.run_block(block, command.arg()),
            (None, None) => false,
        };
        if !handled {
            return false;
        }

        let (x, y) = (nav.x, nav.y);
        if ctx.session.move_window(x, y) {
            tracing::debug!("{} -> window {},{}", command, x, y);
            ctx.effects.redraw();
        }
        true
    }
}

/// Working state for one navigation command
///
/// The window position is tracked locally and committed by the handler.
pub(crate) struct Nav<'c, 'a> {
    ctx: &'c mut CommandContext<'a>,
    screen: ScreenDescription,
    x: usize,
    y: usize,
}

impl<'c, 'a> Nav<'c, 'a> {
    fn new(ctx: &'c mut CommandContext<'a>) -> Self {
        let screen = ctx.screen.describe();
        let (x, y) = ctx.session.position();
        Self { ctx, screen, x, y }
    }

    fn prefs(&self) -> &Preferences {
        &*self.ctx.prefs
    }

    /// Window width in cells
    fn width(&self) -> usize {
        self.ctx.geometry.text_columns.max(1)
    }

    fn text_rows(&self) -> usize {
        self.ctx.geometry.text_rows.max(1)
    }

    /// Lowest row the window's top edge may reach
    fn max_y(&self) -> usize {
        self.screen.rows.saturating_sub(self.text_rows())
    }

    fn bounce(&mut self) {
        self.ctx.effects.alert(Alert::Bounce);
    }

    fn read(&self, row: usize, column: usize, width: usize) -> Vec<ScreenCharacter> {
        self.ctx.screen.read_cells(row, column, width)
    }

    fn row_text(&self, row: usize) -> String {
        self.read(row, 0, self.screen.cols)
            .iter()
            .map(|cell| cell.text)
            .collect()
    }

    /// Check if the visible screen cursor lies on `row` within the columns
    fn cursor_in(&self, row: usize, from: usize, width: usize) -> bool {
        self.prefs().show_screen_cursor
            && self.screen.has_cursor
            && self.screen.posy == row
            && self.screen.posx >= from
            && self.screen.posx < from + width
    }

    /// Where HOME puts the window, if the screen has a cursor
    fn cursor_window(&self) -> Option<(usize, usize)> {
        if !self.screen.has_cursor {
            return None;
        }

        let width = self.width();
        let rows = self.text_rows();
        let x = (self.screen.posx / width) * width;
        let y = if self.screen.posy >= self.y && self.screen.posy < self.y + rows {
            self.y
        } else {
            self.screen.posy.min(self.max_y())
        };
        Some((x, y))
    }

    /// Run an argument-less command; false if it is not a navigation command
    fn run(&mut self, cmd: Cmd, prompts: &PromptPatterns) -> bool {
        match cmd {
            Cmd::LineUp => self.line(Vertical::Up),
            Cmd::LineDown => self.line(Vertical::Down),
            Cmd::WindowUp => self.window_vertical(Vertical::Up),
            Cmd::WindowDown => self.window_vertical(Vertical::Down),

            Cmd::PrevDifferentLine => {
                self.to_different_line(RowMatch::Text, Vertical::Up, 0, self.screen.cols)
            }
            Cmd::NextDifferentLine => {
                self.to_different_line(RowMatch::Text, Vertical::Down, 0, self.screen.cols)
            }
            Cmd::AttributesUp => {
                self.to_different_line(RowMatch::Attributes, Vertical::Up, 0, self.screen.cols)
            }
            Cmd::AttributesDown => {
                self.to_different_line(RowMatch::Attributes, Vertical::Down, 0, self.screen.cols)
            }

            Cmd::Top => self.y = 0,
            Cmd::Bottom => self.y = self.max_y(),
            Cmd::TopLeft => (self.x, self.y) = (0, 0),
            Cmd::BottomLeft => (self.x, self.y) = (0, self.max_y()),

            Cmd::PrevParagraph => self.previous_paragraph(),
            Cmd::NextParagraph => self.next_paragraph(),
            Cmd::PrevPrompt => self.to_prompt(Vertical::Up, prompts),
            Cmd::NextPrompt => self.to_prompt(Vertical::Down, prompts),

            Cmd::LineBegin => {
                if self.x == 0 {
                    self.bounce();
                } else {
                    self.x = 0;
                }
            }
            Cmd::LineEnd => {
                let right = self.right_edge();
                if right == self.x {
                    self.bounce();
                } else {
                    self.x = right;
                }
            }
            Cmd::CharLeft => {
                if !self.shift_left(1) {
                    self.bounce();
                }
            }
            Cmd::CharRight => {
                if !self.shift_right(1) {
                    self.bounce();
                }
            }
            Cmd::HalfWindowLeft => {
                let half = (self.width() / 2).max(1);
                if !self.shift_left(half) {
                    self.bounce();
                }
            }
            Cmd::HalfWindowRight => {
                let half = (self.width() / 2).max(1);
                if !self.shift_right(half) {
                    self.bounce();
                }
            }
            Cmd::FullWindowLeft => self.full_window_left(),
            Cmd::FullWindowRight => self.full_window_right(),
            Cmd::FullWindowLeftSkip => self.previous_nonblank_window(),
            Cmd::FullWindowRightSkip => self.next_nonblank_window(),

            Cmd::Home => self.home(),
            Cmd::Back => (self.x, self.y) = (self.ctx.session.motx, self.ctx.session.moty),
            Cmd::Return => {
                if self.cursor_window() == Some((self.x, self.y)) {
                    (self.x, self.y) = (self.ctx.session.motx, self.ctx.session.moty);
                } else {
                    self.home();
                }
            }

            _ => return false,
        }
        true
    }

    /// Run a command with an argument; false if it is not a navigation command
    fn run_block(&mut self, block: Block, arg: u16) -> bool {
        let offset = usize::from(arg);
        match block {
            Block::Route => {
                let width = self.width();
                let column = self.x + offset % width;
                let row = self.y + offset / width;
                if column < self.screen.cols && row < self.screen.rows {
                    self.ctx.effects.push(Effect::RouteCursor { column, row });
                } else {
                    self.bounce();
                }
            }
            Block::SetLeft => match self.column(offset) {
                Some(column) => self.x = column,
                None => self.bounce(),
            },
            Block::GotoLine => {
                if offset < self.screen.rows {
                    self.slide_to_row(offset);
                } else {
                    self.bounce();
                }
            }
            Block::SetMark => {
                self.ctx.session.set_mark(arg);
            }
            Block::GotoMark => match self.ctx.session.mark(arg) {
                Some((x, y)) => (self.x, self.y) = (x, y),
                None => self.bounce(),
            },
            Block::PrevIndent => self.to_indent(Vertical::Up, offset),
            Block::NextIndent => self.to_indent(Vertical::Down, offset),
            Block::PrevDifferentChar => self.to_different_character(Vertical::Up, offset),
            Block::NextDifferentChar => self.to_different_character(Vertical::Down, offset),
            Block::GotoColumn => {
                if offset < self.screen.cols {
                    self.slide_to_column(offset);
                } else {
                    self.bounce();
                }
            }
            Block::SpeakRange => self.speak_range(arg),
            _ => return false,
        }
        true
    }

    /// Screen column of a window offset, if it is on the screen
    fn column(&self, offset: usize) -> Option<usize> {
        let column = self.x + offset;
        (column < self.screen.cols).then_some(column)
    }

    fn line(&mut self, direction: Vertical) {
        if self.step(self.y, direction).is_none() {
            self.bounce();
        } else if self.prefs().skip_identical_lines {
            self.to_different_line(RowMatch::Text, direction, self.x, self.width());
        } else if let Some(row) = self.step(self.y, direction) {
            self.y = row;
        }
    }

    fn window_vertical(&mut self, direction: Vertical) {
        let shift = self.text_rows();
        match direction {
            Vertical::Up if self.y > 0 => self.y = self.y.saturating_sub(shift),
            Vertical::Down if self.y < self.max_y() => self.y = (self.y + shift).min(self.max_y()),
            _ => self.bounce(),
        }
    }

    fn home(&mut self) {
        match self.cursor_window() {
            Some((x, y)) => (self.x, self.y) = (x, y),
            None => self.bounce(),
        }
    }

    /// Move the window horizontally just far enough to show `column`
    fn slide_to_column(&mut self, column: usize) {
        let width = self.width();
        if column < self.x {
            self.x = column;
        } else if column >= self.x + width {
            self.x = column + 1 - width;
        }
    }

    /// Speak the window cells between the two offsets packed in `arg`
    fn speak_range(&mut self, arg: u16) {
        let [low, high] = arg.to_le_bytes();
        let (from, to) = (usize::from(low.min(high)), usize::from(low.max(high)));
        if to >= self.width() || self.column(to).is_none() {
            self.bounce();
            return;
        }
        let start = self.x + from;
        let text: String = self
            .read(self.y, start, to - from + 1)
            .iter()
            .map(|cell| cell.text)
            .collect();
        self.ctx.effects.speak(text);
    }

    /// Move the window vertically just far enough to show `row`
    fn slide_to_row(&mut self, row: usize) {
        let rows = self.text_rows();
        if row < self.y {
            self.y = row;
        } else if row >= self.y + rows {
            self.y = (row + 1 - rows).min(self.max_y());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::{Effect, Effects};
    use crate::screen::TextScreen;
    use crate::session::{SessionState, WindowGeometry};

    fn run(screen: &TextScreen, session: &mut SessionState, prefs: &mut Preferences, command: Command) -> Effects {
        let mut effects = Effects::new();
        let mut handler = NavigationHandler::new();
        let mut ctx = CommandContext {
            prefs,
            screen,
            session,
            geometry: WindowGeometry::new(10, 1),
            effects: &mut effects,
        };
        assert!(handler.handle_command(command, &mut ctx));
        effects
    }

    #[test]
    fn test_prompt_patterns_anchor_and_skip_invalid() {
        let prompts = PromptPatterns::new(&["\\$ ".to_string(), "(".to_string(), ">>>".to_string()]);
        assert_eq!(prompts.len(), 2);
        assert!(prompts.is_prompt("$ ls"));
        assert!(prompts.is_prompt(">>> print()"));
        assert!(!prompts.is_prompt("total $ 3"));
    }

    #[test]
    fn test_prompt_patterns_recompile_on_change() {
        let mut prompts = PromptPatterns::new(&[]);
        assert!(prompts.is_empty());
        prompts.update(&["# ".to_string()]);
        assert!(prompts.is_prompt("# whoami"));
    }

    #[test]
    fn test_non_navigation_command_not_handled() {
        let screen = TextScreen::from_text("abc");
        let mut session = SessionState::new();
        let mut prefs = Preferences::default();
        let mut effects = Effects::new();
        let mut ctx = CommandContext {
            prefs: &mut prefs,
            screen: &screen,
            session: &mut session,
            geometry: WindowGeometry::default(),
            effects: &mut effects,
        };
        let mut handler = NavigationHandler::new();
        assert!(!handler.handle_command(Command::cmd(Cmd::CursorTracking), &mut ctx));
        assert!(!handler.handle_command(Command::block(Block::PassDots, 1), &mut ctx));
    }

    #[test]
    fn test_line_down_and_bounce() {
        let screen = TextScreen::from_text("one\ntwo");
        let mut session = SessionState::new();
        let mut prefs = Preferences::default();

        let effects = run(&screen, &mut session, &mut prefs, Command::cmd(Cmd::LineDown));
        assert_eq!(session.position(), (0, 1));
        assert_eq!(effects.as_slice(), &[Effect::Redraw]);

        let effects = run(&screen, &mut session, &mut prefs, Command::cmd(Cmd::LineDown));
        assert_eq!(session.position(), (0, 1));
        assert_eq!(effects.alerts().collect::<Vec<_>>(), vec![Alert::Bounce]);
    }

    #[test]
    fn test_route_emits_cursor_effect() {
        let screen = TextScreen::from_text("0123456789abcdefghij");
        let mut session = SessionState::new();
        session.move_window(10, 0);
        let mut prefs = Preferences::default();

        let effects = run(&screen, &mut session, &mut prefs, Command::block(Block::Route, 3));
        assert_eq!(effects.as_slice(), &[Effect::RouteCursor { column: 13, row: 0 }]);

        let effects = run(&screen, &mut session, &mut prefs, Command::block(Block::Route, 12));
        assert_eq!(effects.alerts().collect::<Vec<_>>(), vec![Alert::Bounce]);
    }

    #[test]
    fn test_marks() {
        let screen = TextScreen::from_text("a\nb\nc\nd");
        let mut session = SessionState::new();
        let mut prefs = Preferences::default();

        run(&screen, &mut session, &mut prefs, Command::cmd(Cmd::Bottom));
        run(&screen, &mut session, &mut prefs, Command::block(Block::SetMark, 1));
        run(&screen, &mut session, &mut prefs, Command::cmd(Cmd::Top));
        run(&screen, &mut session, &mut prefs, Command::block(Block::GotoMark, 1));
        assert_eq!(session.position(), (0, 3));

        let effects = run(&screen, &mut session, &mut prefs, Command::block(Block::GotoMark, 2));
        assert_eq!(effects.alerts().collect::<Vec<_>>(), vec![Alert::Bounce]);
    }

    #[test]
    fn test_goto_line_slides_window() {
        let screen = TextScreen::from_text("a\nb\nc\nd\ne");
        let mut session = SessionState::new();
        let mut prefs = Preferences::default();

        run(&screen, &mut session, &mut prefs, Command::block(Block::GotoLine, 3));
        assert_eq!(session.position(), (0, 3));

        let effects = run(&screen, &mut session, &mut prefs, Command::block(Block::GotoLine, 9));
        assert_eq!(session.position(), (0, 3));
        assert_eq!(effects.alerts().collect::<Vec<_>>(), vec![Alert::Bounce]);
    }

    #[test]
    fn test_goto_column_slides_window() {
        let screen = TextScreen::from_text("0123456789abcdefghij");
        let mut session = SessionState::new();
        let mut prefs = Preferences::default();

        run(&screen, &mut session, &mut prefs, Command::block(Block::GotoColumn, 15));
        assert_eq!(session.position(), (6, 0));
        run(&screen, &mut session, &mut prefs, Command::block(Block::GotoColumn, 2));
        assert_eq!(session.position(), (2, 0));

        let effects = run(&screen, &mut session, &mut prefs, Command::block(Block::GotoColumn, 25));
        assert_eq!(session.position(), (2, 0));
        assert_eq!(effects.alerts().collect::<Vec<_>>(), vec![Alert::Bounce]);
    }

    #[test]
    fn test_speak_range_in_either_order() {
        let screen = TextScreen::from_text("0123456789abcdefghij");
        let mut session = SessionState::new();
        session.move_window(10, 0);
        let mut prefs = Preferences::default();

        let effects = run(&screen, &mut session, &mut prefs, Command::block(Block::SpeakRange, 2 | (5 << 8)));
        assert!(effects.as_slice().contains(&Effect::Speak("cdef".to_string())));

        let effects = run(&screen, &mut session, &mut prefs, Command::block(Block::SpeakRange, 5 | (2 << 8)));
        assert!(effects.as_slice().contains(&Effect::Speak("cdef".to_string())));

        let effects = run(&screen, &mut session, &mut prefs, Command::block(Block::SpeakRange, 3 | (12 << 8)));
        assert_eq!(effects.alerts().collect::<Vec<_>>(), vec![Alert::Bounce]);
    }
}
