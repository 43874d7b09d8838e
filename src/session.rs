//! Per-session window state

use std::collections::BTreeMap;

/// Size of the braille window in screen cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowGeometry {
    pub text_columns: usize,
    pub text_rows: usize,
}

impl WindowGeometry {
    pub const fn new(text_columns: usize, text_rows: usize) -> Self {
        Self {
            text_columns,
            text_rows,
        }
    }
}

impl Default for WindowGeometry {
    fn default() -> Self {
        Self::new(40, 1)
    }
}

/// What the braille window shows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DisplayMode {
    #[default]
    Text,
    Attributes,
}

/// Window position, motion anchor, marks and session toggles
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    /// Screen column of the window's left edge
    pub winx: usize,
    /// Screen row of the window's top edge
    pub winy: usize,
    /// Where the window was before its last move
    pub motx: usize,
    pub moty: usize,
    pub marks: BTreeMap<u16, (usize, usize)>,
    /// Bring the window to the screen cursor whenever the cursor moves
    pub track_cursor: bool,
    pub display_mode: DisplayMode,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            winx: 0,
            winy: 0,
            motx: 0,
            moty: 0,
            marks: BTreeMap::new(),
            track_cursor: true,
            display_mode: DisplayMode::Text,
        }
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> (usize, usize) {
        (self.winx, self.winy)
    }

    /// Move the window, remembering where it was; returns false if it stayed put
    pub fn move_window(&mut self, winx: usize, winy: usize) -> bool {
        if (winx, winy) == (self.winx, self.winy) {
            return false;
        }
        self.motx = self.winx;
        self.moty = self.winy;
        self.winx = winx;
        self.winy = winy;
        true
    }

    pub fn set_mark(&mut self, mark: u16) {
        self.marks.insert(mark, (self.winx, self.winy));
    }

    pub fn mark(&self, mark: u16) -> Option<(usize, usize)> {
        self.marks.get(&mark).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_records_motion_anchor() {
        let mut session = SessionState::new();
        assert!(session.move_window(10, 3));
        assert_eq!((session.motx, session.moty), (0, 0));
        assert!(!session.move_window(10, 3));
        assert!(session.move_window(0, 4));
        assert_eq!((session.motx, session.moty), (10, 3));
    }

    #[test]
    fn test_marks() {
        let mut session = SessionState::new();
        session.move_window(5, 6);
        session.set_mark(2);
        assert_eq!(session.mark(2), Some((5, 6)));
        assert_eq!(session.mark(3), None);
    }
}
