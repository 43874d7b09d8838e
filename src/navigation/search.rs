//! Row scans: identical-line skipping, paragraphs, prompts, indents

use super::{Nav, PromptPatterns, Vertical};
use crate::alert::Alert;
use crate::screen::ScreenCharacter;
use crate::session::DisplayMode;

/// How two rows are compared when skipping identical lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowMatch {
    Text,
    Attributes,
}

impl RowMatch {
    pub fn same(self, a: &[ScreenCharacter], b: &[ScreenCharacter]) -> bool {
        match self {
            RowMatch::Text => a.iter().map(|c| c.text).eq(b.iter().map(|c| c.text)),
            RowMatch::Attributes => a
                .iter()
                .map(|c| c.attributes)
                .eq(b.iter().map(|c| c.attributes)),
        }
    }
}

pub fn is_blank_row(cells: &[ScreenCharacter]) -> bool {
    cells.iter().all(|cell| cell.is_blank())
}

/// Alert for the `skipped`-th identical line
///
/// The first skip and the following ones up to the third each tick; after
/// that only every fourth line is announced.
pub fn skip_alert(skipped: usize) -> Option<Alert> {
    match skipped {
        0 => None,
        1 => Some(Alert::SkipFirst),
        n if n % 4 == 0 => Some(Alert::SkipSeveral),
        n if n < 4 => Some(Alert::SkipOne),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParagraphScan {
    Starting,
    StartLineNotBlank,
    FindingLastLine,
    FindingFirstLine,
}

impl<'c, 'a> Nav<'c, 'a> {
    /// The next row in `direction` the window's top edge may reach
    pub(super) fn step(&self, row: usize, direction: Vertical) -> Option<usize> {
        match direction {
            Vertical::Up => row.checked_sub(1),
            Vertical::Down => (row < self.max_y()).then_some(row + 1),
        }
    }

    fn row_is_blank(&self, row: usize) -> bool {
        is_blank_row(&self.read(row, 0, self.screen.cols))
    }

    /// Move to the nearest row whose cells in `from..from + width` differ
    ///
    /// Stops early on the row holding the screen cursor. Each identical row
    /// passed over may raise a skip alert; running into the edge of the
    /// screen leaves the window there and bounces.
    pub(super) fn to_different_line(&mut self, compare: RowMatch, direction: Vertical, from: usize, width: usize) {
        let compare = match (compare, self.ctx.session.display_mode) {
            (RowMatch::Text, DisplayMode::Attributes) => RowMatch::Attributes,
            (compare, _) => compare,
        };

        if self.step(self.y, direction).is_none() {
            self.bounce();
            return;
        }

        let reference = self.read(self.y, from, width);
        let mut skipped = 0;
        while let Some(row) = self.step(self.y, direction) {
            self.y = row;
            let cells = self.read(row, from, width);
            if !compare.same(&reference, &cells) || self.cursor_in(row, from, width) {
                return;
            }

            skipped += 1;
            if let Some(alert) = skip_alert(skipped) {
                self.ctx.effects.alert(alert);
            }
        }

        self.bounce();
    }

    /// Move to the first row, after the current one, for which `test` holds
    pub(super) fn find_row(&mut self, direction: Vertical, test: impl Fn(&Self, usize) -> bool) {
        let mut row = self.y;
        while let Some(next) = self.step(row, direction) {
            if test(self, next) {
                self.y = next;
                return;
            }
            row = next;
        }
        self.bounce();
    }

    /// Go up to the first line of the current paragraph, or of the
    /// previous one when already on a first line
    pub(super) fn previous_paragraph(&mut self) {
        let mut state = ParagraphScan::Starting;
        let mut row = self.y;

        let found = loop {
            let blank = self.row_is_blank(row);
            state = match state {
                ParagraphScan::Starting if blank => ParagraphScan::FindingLastLine,
                ParagraphScan::Starting => ParagraphScan::StartLineNotBlank,
                ParagraphScan::StartLineNotBlank if blank => ParagraphScan::FindingLastLine,
                ParagraphScan::StartLineNotBlank => ParagraphScan::FindingFirstLine,
                ParagraphScan::FindingLastLine if blank => ParagraphScan::FindingLastLine,
                ParagraphScan::FindingLastLine => ParagraphScan::FindingFirstLine,
                ParagraphScan::FindingFirstLine if blank => break Some(row + 1),
                ParagraphScan::FindingFirstLine => ParagraphScan::FindingFirstLine,
            };

            if row == 0 {
                break (state == ParagraphScan::FindingFirstLine).then_some(0);
            }
            row -= 1;
        };

        match found {
            Some(row) => (self.x, self.y) = (0, row.min(self.max_y())),
            None => self.bounce(),
        }
    }

    /// Go down to the first line of the next paragraph
    pub(super) fn next_paragraph(&mut self) {
        let mut find_blank = true;
        let found = (self.y..=self.max_y()).find(|row| {
            let blank = self.row_is_blank(*row);
            if find_blank {
                if blank {
                    find_blank = false;
                }
                false
            } else {
                !blank
            }
        });

        match found {
            Some(row) => (self.x, self.y) = (0, row),
            None => self.bounce(),
        }
    }

    /// Move to the previous or next command prompt
    ///
    /// With prompt patterns configured a row is a prompt when a pattern
    /// matches it. Otherwise the current row's first word, including the
    /// blank after it, is taken as the prompt to look for.
    pub(super) fn to_prompt(&mut self, direction: Vertical, prompts: &PromptPatterns) {
        if !prompts.is_empty() {
            self.find_row(direction, |nav, row| prompts.is_prompt(&nav.row_text(row)));
            return;
        }

        let cells = self.read(self.y, 0, self.screen.cols);
        let Some(length) = cells.iter().position(|cell| cell.is_blank()) else {
            self.bounce();
            return;
        };
        let prompt = &cells[..=length];
        self.find_row(direction, |nav, row| {
            RowMatch::Text.same(prompt, &nav.read(row, 0, prompt.len()))
        });
    }

    /// Move to the nearest row with a character at or left of a window column
    pub(super) fn to_indent(&mut self, direction: Vertical, offset: usize) {
        let Some(column) = self.column(offset) else {
            self.bounce();
            return;
        };
        self.find_row(direction, |nav, row| !is_blank_row(&nav.read(row, 0, column + 1)));
    }

    /// Move to the nearest row with a different character in a window column
    pub(super) fn to_different_character(&mut self, direction: Vertical, offset: usize) {
        let Some(column) = self.column(offset) else {
            self.bounce();
            return;
        };
        let text = self.read(self.y, column, 1)[0].text;
        self.find_row(direction, |nav, row| nav.read(row, column, 1)[0].text != text);
    }
}
