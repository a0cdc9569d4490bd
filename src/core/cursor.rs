//! Cursor position
//!
//! The cursor is a (row, column) pair of indices into the line buffer.
//! The column is not bounded by the row length; a write at a column past
//! the end pads the row first.

use serde::{Deserialize, Serialize};

/// Distance between tab stops
pub const TAB_WIDTH: usize = 8;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    /// Row index (0-indexed)
    pub row: usize,
    /// Column index (0-indexed)
    pub col: usize,
}

impl Cursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move to column 0
    pub fn carriage_return(&mut self) {
        self.col = 0;
    }

    /// Move one column left, stopping at column 0.
    /// Returns whether the cursor moved.
    pub fn back(&mut self) -> bool {
        if self.col == 0 {
            return false;
        }
        self.col -= 1;
        true
    }

    /// Advance to the next tab stop (strictly to the right)
    pub fn tab(&mut self) {
        self.col = self.col.saturating_add(TAB_WIDTH - self.col % TAB_WIDTH);
    }

    /// Move right by n columns
    pub fn forward(&mut self, n: usize) {
        self.col = self.col.saturating_add(n);
    }

    /// Move up by n rows, stopping at row 0
    pub fn up(&mut self, n: usize) {
        self.row = self.row.saturating_sub(n);
    }
}
