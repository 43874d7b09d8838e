//! Horizontal window motion: panning, wrapping, blank-window skipping

use super::{is_blank_row, Nav, MAX_WRAP_ALERTS};
use crate::alert::Alert;
use crate::config::SkipBlankWindowsMode;

impl<'c, 'a> Nav<'c, 'a> {
    pub(super) fn shift_left(&mut self, amount: usize) -> bool {
        if self.x == 0 {
            return false;
        }
        self.x = self.x.saturating_sub(amount);
        true
    }

    pub(super) fn shift_right(&mut self, amount: usize) -> bool {
        let x = self.x + amount;
        if x >= self.screen.cols {
            return false;
        }
        self.x = x;
        true
    }

    /// Left edge of the last window on a row
    pub(super) fn right_edge(&self) -> usize {
        let width = self.width();
        (self.screen.cols.saturating_sub(1) / width) * width
    }

    /// Left edge of the window showing `column`
    fn window_at(&self, column: usize) -> usize {
        let width = self.width();
        (column / width) * width
    }

    /// How far a full-window pan to the right moves
    ///
    /// With word wrap, a word cut off by the right edge of the window starts
    /// the next window instead.
    fn full_window_shift(&self) -> usize {
        let width = self.width();
        if !self.prefs().word_wrap {
            return width;
        }

        let cells = self.read(self.y, self.x, width + 1);
        if !cells[width].is_blank() && !cells[width - 1].is_blank() {
            if let Some(blank) = cells[..width].iter().rposition(|cell| cell.is_blank()) {
                return blank + 1;
            }
        }
        width
    }

    fn skip_mode(&self) -> Option<SkipBlankWindowsMode> {
        let prefs = self.prefs();
        prefs.skip_blank_windows.then_some(prefs.skip_blank_windows_mode)
    }

    pub(super) fn full_window_left(&mut self) {
        let mode = self.skip_mode();
        if mode == Some(SkipBlankWindowsMode::All) {
            self.previous_nonblank_window();
            return;
        }

        let old_x = self.x;
        let width = self.width();
        if self.shift_left(width) {
            match mode {
                None => return,
                Some(SkipBlankWindowsMode::EndOfLine) => {
                    self.skip_blank_end_of_line();
                    return;
                }
                _ => {
                    let end = (self.x + width).min(self.screen.cols);
                    let y = self.y;
                    if self.cursor_in(y, 0, end) || !is_blank_row(&self.read(y, 0, end)) {
                        return;
                    }
                }
            }
        }

        if self.y == 0 {
            self.x = old_x;
            self.bounce();
            return;
        }
        self.ctx.effects.alert(Alert::WrapUp);
        self.y -= 1;
        self.x = self.right_edge();

        if mode == Some(SkipBlankWindowsMode::EndOfLine) {
            self.skip_blank_end_of_line();
        }
    }

    /// Pull the window back to the last non-blank character of its row
    fn skip_blank_end_of_line(&mut self) {
        let cells = self.read(self.y, 0, self.screen.cols);
        let mut last = cells.iter().rposition(|cell| !cell.is_blank()).unwrap_or(0);
        if self.prefs().show_screen_cursor && self.screen.has_cursor && self.screen.posy == self.y {
            last = last.max(self.screen.posx);
        }
        if last < self.x {
            self.x = self.window_at(last);
        }
    }

    pub(super) fn full_window_right(&mut self) {
        let mode = self.skip_mode();
        if mode == Some(SkipBlankWindowsMode::All) {
            self.next_nonblank_window();
            return;
        }

        let old_x = self.x;
        let shift = self.full_window_shift();
        if self.shift_right(shift) {
            if mode.is_none() {
                return;
            }

            let cursor_ahead = self.prefs().show_screen_cursor
                && self.screen.has_cursor
                && self.screen.posy == self.y
                && self.screen.posx >= self.x;
            let rest = self.read(self.y, self.x, self.screen.cols - self.x);
            if cursor_ahead || !is_blank_row(&rest) {
                return;
            }
        }

        if self.y >= self.max_y() {
            self.x = old_x;
            self.bounce();
            return;
        }
        self.ctx.effects.alert(Alert::WrapDown);
        self.y += 1;
        self.x = 0;
    }

    /// Pan left until a window shows something, wrapping to earlier rows
    pub(super) fn previous_nonblank_window(&mut self) {
        let (old_x, old_y) = (self.x, self.y);
        let width = self.width();
        let mut wraps = 0;

        loop {
            if !self.shift_left(width) {
                if self.y == 0 {
                    (self.x, self.y) = (old_x, old_y);
                    self.bounce();
                    return;
                }
                if wraps < MAX_WRAP_ALERTS {
                    self.ctx.effects.alert(Alert::WrapUp);
                }
                wraps += 1;
                self.y -= 1;
                self.x = self.right_edge();
            }

            if self.window_has_content() {
                return;
            }
        }
    }

    /// Pan right until a window shows something, wrapping to later rows
    pub(super) fn next_nonblank_window(&mut self) {
        let (old_x, old_y) = (self.x, self.y);
        let width = self.width();
        let mut wraps = 0;

        loop {
            if !self.shift_right(width) {
                if self.y >= self.max_y() {
                    (self.x, self.y) = (old_x, old_y);
                    self.bounce();
                    return;
                }
                if wraps < MAX_WRAP_ALERTS {
                    self.ctx.effects.alert(Alert::WrapDown);
                }
                wraps += 1;
                self.y += 1;
                self.x = 0;
            }

            if self.window_has_content() {
                return;
            }
        }
    }

    /// Check if the window shows a non-blank character or the screen cursor
    fn window_has_content(&self) -> bool {
        let count = self.width().min(self.screen.cols.saturating_sub(self.x));
        self.cursor_in(self.y, self.x, count) || !is_blank_row(&self.read(self.y, self.x, count))
    }
}

#[cfg(test)]
mod tests {
    use crate::alert::Alert;
    use crate::config::{Preferences, SkipBlankWindowsMode};
    use crate::effects::Effects;
    use crate::keytable::{Cmd, Command};
    use crate::navigation::NavigationHandler;
    use crate::queue::{CommandContext, CommandHandler};
    use crate::screen::TextScreen;
    use crate::session::{SessionState, WindowGeometry};

    struct Fixture {
        screen: TextScreen,
        session: SessionState,
        prefs: Preferences,
        handler: NavigationHandler,
    }

    impl Fixture {
        fn new(lines: &[&str]) -> Self {
            Self {
                screen: TextScreen::from_lines(lines),
                session: SessionState::new(),
                prefs: Preferences::default(),
                handler: NavigationHandler::new(),
            }
        }

        fn run(&mut self, cmd: Cmd) -> Vec<Alert> {
            let mut effects = Effects::new();
            let mut ctx = CommandContext {
                prefs: &mut self.prefs,
                screen: &self.screen,
                session: &mut self.session,
                geometry: WindowGeometry::new(4, 1),
                effects: &mut effects,
            };
            self.handler.handle_command(Command::cmd(cmd), &mut ctx);
            effects.alerts().collect()
        }
    }

    #[test]
    fn test_full_window_right_wraps_to_next_line() {
        let mut fixture = Fixture::new(&["abcdefgh", "ijkl"]);

        assert!(fixture.run(Cmd::FullWindowRight).is_empty());
        assert_eq!(fixture.session.position(), (4, 0));

        assert_eq!(fixture.run(Cmd::FullWindowRight), vec![Alert::WrapDown]);
        assert_eq!(fixture.session.position(), (0, 1));
    }

    #[test]
    fn test_full_window_left_wraps_to_end_of_previous_line() {
        let mut fixture = Fixture::new(&["abcdefghij", "klmn"]);
        fixture.session.move_window(0, 1);

        assert_eq!(fixture.run(Cmd::FullWindowLeft), vec![Alert::WrapUp]);
        assert_eq!(fixture.session.position(), (8, 0));

        fixture.run(Cmd::FullWindowLeft);
        fixture.run(Cmd::FullWindowLeft);
        assert_eq!(fixture.session.position(), (0, 0));
        assert_eq!(fixture.run(Cmd::FullWindowLeft), vec![Alert::Bounce]);
        assert_eq!(fixture.session.position(), (0, 0));
    }

    #[test]
    fn test_skip_blank_end_of_line_when_moving_left() {
        let mut fixture = Fixture::new(&["ab          ", "xyz"]);
        fixture.prefs.skip_blank_windows = true;
        fixture.prefs.skip_blank_windows_mode = SkipBlankWindowsMode::EndOfLine;
        fixture.session.move_window(0, 1);

        assert_eq!(fixture.run(Cmd::FullWindowLeft), vec![Alert::WrapUp]);
        assert_eq!(fixture.session.position(), (0, 0));
    }

    #[test]
    fn test_skip_blank_rest_of_line_when_moving_right() {
        let mut fixture = Fixture::new(&["abcd        ", "xyz"]);
        fixture.prefs.skip_blank_windows = true;
        fixture.prefs.skip_blank_windows_mode = SkipBlankWindowsMode::RestOfLine;

        assert_eq!(fixture.run(Cmd::FullWindowRight), vec![Alert::WrapDown]);
        assert_eq!(fixture.session.position(), (0, 1));
    }

    #[test]
    fn test_nonblank_window_search_limits_wrap_alerts() {
        let mut fixture = Fixture::new(&["a", "", "", "", "", "b"]);

        let alerts = fixture.run(Cmd::FullWindowRightSkip);
        assert_eq!(alerts, vec![Alert::WrapDown; 3]);
        assert_eq!(fixture.session.position(), (0, 5));

        let alerts = fixture.run(Cmd::FullWindowRightSkip);
        assert_eq!(alerts, vec![Alert::Bounce]);
        assert_eq!(fixture.session.position(), (0, 5));

        fixture.run(Cmd::FullWindowLeftSkip);
        assert_eq!(fixture.session.position(), (0, 0));
    }

    #[test]
    fn test_word_wrap_breaks_at_blank() {
        let mut fixture = Fixture::new(&["ab cdef gh"]);
        fixture.prefs.word_wrap = true;

        fixture.run(Cmd::FullWindowRight);
        assert_eq!(fixture.session.position(), (3, 0));
    }

    #[test]
    fn test_half_window_and_characters() {
        let mut fixture = Fixture::new(&["abcdefgh"]);

        fixture.run(Cmd::HalfWindowRight);
        assert_eq!(fixture.session.position(), (2, 0));
        fixture.run(Cmd::CharRight);
        assert_eq!(fixture.session.position(), (3, 0));
        fixture.run(Cmd::LineEnd);
        assert_eq!(fixture.session.position(), (4, 0));
        fixture.run(Cmd::LineBegin);
        assert_eq!(fixture.session.position(), (0, 0));
        assert_eq!(fixture.run(Cmd::CharLeft), vec![Alert::Bounce]);
    }
}
