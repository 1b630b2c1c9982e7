//! View state — the window size and where the cursor is in it.
//!
//! The size is fixed when the view is created; there is no resize handling.
//! The cursor is always clamped inside the window: a move that would leave
//! it is ignored rather than producing an off-screen (or negative)
//! coordinate.

use kiln_term::input::Key;
use kiln_term::terminal::Size;

/// A cursor movement direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// The direction an arrow key moves in, if `key` is an arrow key.
    #[must_use]
    pub const fn from_key(key: Key) -> Option<Self> {
        match key {
            Key::MoveUp => Some(Self::Up),
            Key::MoveDown => Some(Self::Down),
            Key::MoveLeft => Some(Self::Left),
            Key::MoveRight => Some(Self::Right),
            _ => None,
        }
    }
}

/// Window dimensions and cursor position, all 0-indexed.
///
/// Invariant: `cursor_row < rows` and `cursor_col < cols`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewState {
    rows: u16,
    cols: u16,
    cursor_row: u16,
    cursor_col: u16,
}

impl ViewState {
    /// A view of the given size with the cursor at the top-left.
    ///
    /// Zero dimensions are raised to one, so the window always has a cell
    /// for the cursor to sit on.
    #[must_use]
    pub fn new(size: Size) -> Self {
        Self {
            rows: size.rows.max(1),
            cols: size.cols.max(1),
            cursor_row: 0,
            cursor_col: 0,
        }
    }

    /// A view with the cursor placed at `(row, col)`, clamped into the window.
    #[must_use]
    pub fn with_cursor(size: Size, row: u16, col: u16) -> Self {
        let mut view = Self::new(size);
        view.cursor_row = row.min(view.rows - 1);
        view.cursor_col = col.min(view.cols - 1);
        view
    }

    #[inline]
    #[must_use]
    pub const fn rows(&self) -> u16 {
        self.rows
    }

    #[inline]
    #[must_use]
    pub const fn cols(&self) -> u16 {
        self.cols
    }

    #[inline]
    #[must_use]
    pub const fn cursor_row(&self) -> u16 {
        self.cursor_row
    }

    #[inline]
    #[must_use]
    pub const fn cursor_col(&self) -> u16 {
        self.cursor_col
    }

    /// Move the cursor one cell. Returns `false` if it was already at the
    /// edge in that direction and did not move.
    pub fn move_cursor(&mut self, direction: Direction) -> bool {
        let (row, col) = (self.cursor_row, self.cursor_col);
        match direction {
            Direction::Up => self.cursor_row = row.saturating_sub(1),
            Direction::Down => self.cursor_row = (row + 1).min(self.rows - 1),
            Direction::Left => self.cursor_col = col.saturating_sub(1),
            Direction::Right => self.cursor_col = (col + 1).min(self.cols - 1),
        }
        (self.cursor_row, self.cursor_col) != (row, col)
    }
}
