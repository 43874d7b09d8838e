//! Screen model consumed by the navigation handler
//!
//! The real screen reader lives outside this crate; [`TextScreen`] is an
//! in-memory implementation used by the binary and the tests.

/// One screen cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenCharacter {
    pub text: char,
    pub attributes: u8,
}

impl ScreenCharacter {
    pub const BLANK: ScreenCharacter = ScreenCharacter {
        text: ' ',
        attributes: 0,
    };

    pub const fn new(text: char, attributes: u8) -> Self {
        Self { text, attributes }
    }

    #[inline]
    pub fn is_blank(self) -> bool {
        self.text.is_whitespace()
    }
}

impl Default for ScreenCharacter {
    fn default() -> Self {
        Self::BLANK
    }
}

/// Dimensions of the screen and the position of its cursor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScreenDescription {
    pub cols: usize,
    pub rows: usize,
    pub posx: usize,
    pub posy: usize,
    /// False when the cursor is hidden or unknown
    pub has_cursor: bool,
}

pub trait Screen {
    fn describe(&self) -> ScreenDescription;

    /// Read `out.len()` cells of `row` starting at `column`
    ///
    /// Cells outside the screen read as blanks.
    fn read_row(&self, row: usize, column: usize, out: &mut [ScreenCharacter]);

    /// Convenience: a freshly allocated slice of a row
    fn read_cells(&self, row: usize, column: usize, width: usize) -> Vec<ScreenCharacter> {
        let mut cells = vec![ScreenCharacter::BLANK; width];
        self.read_row(row, column, &mut cells);
        cells
    }
}

/// A screen held in memory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextScreen {
    cells: Vec<Vec<ScreenCharacter>>,
    cols: usize,
    cursor: Option<(usize, usize)>,
}

impl TextScreen {
    /// Build a screen from lines of text; the width is the longest line
    pub fn from_text(text: &str) -> Self {
        let lines: Vec<&str> = text.lines().collect();
        Self::from_lines(&lines)
    }

    pub fn from_lines<S: AsRef<str>>(lines: &[S]) -> Self {
        let cells: Vec<Vec<ScreenCharacter>> = lines
            .iter()
            .map(|line| {
                line.as_ref()
                    .chars()
                    .map(|c| ScreenCharacter::new(c, 0))
                    .collect()
            })
            .collect();
        let cols = cells.iter().map(Vec::len).max().unwrap_or(0);
        Self {
            cells,
            cols,
            cursor: None,
        }
    }

    /// Force a width wider than the longest line
    pub fn with_columns(mut self, cols: usize) -> Self {
        self.cols = self.cols.max(cols);
        self
    }

    pub fn set_cursor(&mut self, column: usize, row: usize) {
        self.cursor = Some((column, row));
    }

    pub fn hide_cursor(&mut self) {
        self.cursor = None;
    }

    /// Set the attributes of a run of cells on one row
    pub fn set_attributes(&mut self, row: usize, columns: std::ops::Range<usize>, attributes: u8) {
        if let Some(line) = self.cells.get_mut(row) {
            if line.len() < columns.end {
                line.resize(columns.end, ScreenCharacter::BLANK);
            }
            for cell in &mut line[columns] {
                cell.attributes = attributes;
            }
        }
    }
}

impl Screen for TextScreen {
    fn describe(&self) -> ScreenDescription {
        let (posx, posy) = self.cursor.unwrap_or((0, 0));
        ScreenDescription {
            cols: self.cols,
            rows: self.cells.len(),
            posx,
            posy,
            has_cursor: self.cursor.is_some(),
        }
    }

    fn read_row(&self, row: usize, column: usize, out: &mut [ScreenCharacter]) {
        let line = self.cells.get(row).map(Vec::as_slice).unwrap_or(&[]);
        for (offset, cell) in out.iter_mut().enumerate() {
            *cell = line
                .get(column + offset)
                .copied()
                .unwrap_or(ScreenCharacter::BLANK);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_screen_dimensions() {
        let mut screen = TextScreen::from_text("abc\nlonger line\n");
        screen.set_cursor(2, 1);
        let description = screen.describe();
        assert_eq!(description.cols, 11);
        assert_eq!(description.rows, 2);
        assert_eq!((description.posx, description.posy), (2, 1));
        assert!(description.has_cursor);
    }

    #[test]
    fn test_read_row_pads_with_blanks() {
        let screen = TextScreen::from_text("ab");
        let cells = screen.read_cells(0, 1, 3);
        assert_eq!(cells[0].text, 'b');
        assert!(cells[1].is_blank());
        assert!(screen.read_cells(5, 0, 2).iter().all(|c| c.is_blank()));
    }

    #[test]
    fn test_set_attributes() {
        let mut screen = TextScreen::from_text("abcd");
        screen.set_attributes(0, 1..3, 0x70);
        let cells = screen.read_cells(0, 0, 4);
        assert_eq!(
            cells.iter().map(|c| c.attributes).collect::<Vec<_>>(),
            vec![0, 0x70, 0x70, 0]
        );
    }
}
