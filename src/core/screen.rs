//! Line buffer
//!
//! The transcript under construction: an ordered list of growable rows
//! and a cursor. Unlike a terminal screen there is no fixed size. Rows are
//! created by line feeds, columns by writes, and nothing ever scrolls off.
//!
//! Every operation that touches a row keeps `col <= len` for the cursor's
//! row after padding; a violation is reported as [`Error::Invariant`].

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::cursor::Cursor;
use super::line::Line;
use crate::error::{Error, Result};
use crate::parser::EraseMode;

/// Default ceiling on the width of a single row. Only runaway virtual
/// columns (`CSI 4294967295 C`) reach it; real text does not.
pub const DEFAULT_MAX_ROW_WIDTH: usize = i32::MAX as usize;

/// What backspace does to the byte it moves onto
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum BackspaceMode {
    /// Move the cursor left, leaving the row alone
    #[default]
    Move,
    /// Move left and remove the byte under the cursor
    Erase,
}

impl fmt::Display for BackspaceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackspaceMode::Move => f.write_str("move"),
            BackspaceMode::Erase => f.write_str("erase"),
        }
    }
}

impl FromStr for BackspaceMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "move" => Ok(BackspaceMode::Move),
            "erase" => Ok(BackspaceMode::Erase),
            other => Err(format!(
                "unknown backspace mode '{}', expected 'move' or 'erase'",
                other
            )),
        }
    }
}

/// Behavior knobs for the line buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenOptions {
    /// Emulate a terminal of this many columns: writes past it are clamped
    /// and reaching it starts a new row. `None` lets rows grow freely.
    pub wrap_width: Option<usize>,
    pub backspace: BackspaceMode,
    /// Widest a row may grow before processing is aborted
    pub max_row_width: usize,
}

impl Default for ScreenOptions {
    fn default() -> Self {
        Self {
            wrap_width: None,
            backspace: BackspaceMode::Move,
            max_row_width: DEFAULT_MAX_ROW_WIDTH,
        }
    }
}

/// The transcript line buffer
#[derive(Debug, Clone)]
pub struct Screen {
    /// Rows, never empty
    lines: Vec<Line>,
    cursor: Cursor,
    options: ScreenOptions,
}

impl Default for Screen {
    fn default() -> Self {
        Self::new(ScreenOptions::default())
    }
}

impl Screen {
    /// Create a buffer holding a single empty row
    pub fn new(options: ScreenOptions) -> Self {
        Self {
            lines: vec![Line::new()],
            cursor: Cursor::new(),
            options,
        }
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn line(&self, row: usize) -> Option<&Line> {
        self.lines.get(row)
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn options(&self) -> &ScreenOptions {
        &self.options
    }

    /// The wrap width, when the cursor sits at or past it
    pub fn beyond_wrap(&self) -> Option<usize> {
        self.options
            .wrap_width
            .filter(|&width| self.cursor.col >= width)
    }

    /// Borrow the cursor's row, padded with spaces up to the cursor column.
    ///
    /// `min_width` is how wide the caller is about to make the row and
    /// `added` how many bytes it is about to insert; together they are
    /// checked against the row-width ceiling before anything changes.
    fn pad_current(
        &mut self,
        operation: &'static str,
        min_width: usize,
        added: usize,
    ) -> Result<&mut Line> {
        let Cursor { row, col } = self.cursor;
        let limit = self.options.max_row_width;
        let rows = self.lines.len();
        let line = self.lines.get_mut(row).ok_or(Error::MissingRow {
            operation,
            row,
            rows,
        })?;

        let width = line.len().max(col).max(min_width).saturating_add(added);
        if width > limit {
            return Err(Error::RowTooLong { row, width, limit });
        }

        line.pad_to(col);
        if col > line.len() {
            return Err(Error::Invariant {
                operation,
                col,
                len: line.len(),
            });
        }
        Ok(line)
    }

    fn current_line_mut(&mut self, operation: &'static str) -> Result<&mut Line> {
        let row = self.cursor.row;
        let rows = self.lines.len();
        self.lines
            .get_mut(row)
            .ok_or(Error::MissingRow { operation, row, rows })
    }

    /// Write a byte at the cursor and advance
    pub fn put_char(&mut self, byte: u8) -> Result<()> {
        if let Some(width) = self.beyond_wrap() {
            self.cursor.col = width.saturating_sub(1);
        }

        let col = self.cursor.col;
        let line = self.pad_current("put_char", col.saturating_add(1), 0)?;
        match col.cmp(&line.len()) {
            Ordering::Less | Ordering::Equal => line.set(col, byte),
            Ordering::Greater => {
                return Err(Error::Invariant {
                    operation: "put_char",
                    col,
                    len: line.len(),
                })
            }
        }
        self.cursor.col += 1;

        if self.beyond_wrap().is_some() {
            self.next_line()?;
        }
        Ok(())
    }

    /// Insert a byte at the cursor, shifting the rest of the row right.
    /// The cursor does not move.
    pub fn insert_char(&mut self, byte: u8) -> Result<()> {
        let col = self.cursor.col;
        let line = self.pad_current("insert_char", col, 1)?;
        line.insert(col, byte);
        Ok(())
    }

    /// Insert n blanks at the cursor (ICH). Does nothing at or past the end
    /// of the row.
    pub fn insert_chars(&mut self, n: usize) -> Result<()> {
        let col = self.cursor.col;
        let limit = self.options.max_row_width;
        let row = self.cursor.row;
        let line = self.current_line_mut("insert_chars")?;
        if n == 0 || col >= line.len() {
            return Ok(());
        }

        let width = line.len().saturating_add(n);
        if width > limit {
            return Err(Error::RowTooLong { row, width, limit });
        }
        line.insert_blanks(col, n);
        Ok(())
    }

    /// Delete n bytes at the cursor (DCH)
    pub fn delete_chars(&mut self, n: usize) -> Result<()> {
        let col = self.cursor.col;
        self.current_line_mut("delete_chars")?.delete(col, n);
        Ok(())
    }

    /// Erase in line (EL)
    pub fn erase_in_line(&mut self, mode: EraseMode) -> Result<()> {
        let col = self.cursor.col;
        let line = self.current_line_mut("erase_in_line")?;
        match mode {
            EraseMode::ToEnd => line.truncate_from(col),
            EraseMode::ToStart => {
                if col.saturating_add(1) < line.len() {
                    line.blank_through(col);
                } else {
                    line.clear();
                }
            }
            EraseMode::All => line.clear(),
        }
        Ok(())
    }

    /// Move down one row (IND), creating it if needed. The column is kept.
    pub fn linefeed(&mut self) -> Result<()> {
        self.cursor.row += 1;
        if self.cursor.row >= self.lines.len() {
            self.lines.push(Line::new());
        }
        let col = self.cursor.col;
        self.pad_current("linefeed", col, 0)?;
        Ok(())
    }

    /// Carriage return followed by line feed
    pub fn next_line(&mut self) -> Result<()> {
        self.carriage_return();
        self.linefeed()
    }

    /// Index (ESC D)
    pub fn index(&mut self) -> Result<()> {
        self.linefeed()
    }

    /// Move up one row (RI). At the top a new empty row is inserted above.
    pub fn reverse_index(&mut self) -> Result<()> {
        if self.cursor.row == 0 {
            self.lines.insert(0, Line::new());
        } else {
            self.cursor.row -= 1;
        }
        let col = self.cursor.col;
        self.pad_current("reverse_index", col, 0)?;
        Ok(())
    }

    pub fn carriage_return(&mut self) {
        self.cursor.carriage_return();
    }

    /// Handle backspace (BS) according to the configured mode
    pub fn backspace(&mut self) -> Result<()> {
        let moved = self.cursor.back();
        if moved && self.options.backspace == BackspaceMode::Erase {
            let col = self.cursor.col;
            self.current_line_mut("backspace")?.delete(col, 1);
        }
        Ok(())
    }

    /// Handle horizontal tab (HT)
    pub fn tab(&mut self) {
        self.cursor.tab();
    }

    /// Move cursor up (CUU), stopping at the first row
    pub fn move_cursor_up(&mut self, n: usize) {
        self.cursor.up(n);
    }

    /// Move cursor down (CUD), stopping at the last existing row
    pub fn move_cursor_down(&mut self, n: usize) {
        let last = self.lines.len().saturating_sub(1);
        self.cursor.row = self.cursor.row.saturating_add(n).min(last);
    }

    /// Move cursor forward (CUF). The column may pass the end of the row.
    pub fn move_cursor_forward(&mut self, n: usize) {
        self.cursor.forward(n);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn screen_with(options: ScreenOptions) -> Screen {
        Screen::new(options)
    }

    fn write(screen: &mut Screen, text: &str) {
        for &byte in text.as_bytes() {
            screen.put_char(byte).unwrap();
        }
    }

    fn row(screen: &Screen, row: usize) -> String {
        screen.line(row).unwrap().to_string_lossy()
    }

    #[test]
    fn test_screen_new() {
        let screen = Screen::default();
        assert_eq!(screen.lines().len(), 1);
        assert!(screen.line(0).unwrap().is_empty());
        assert_eq!(screen.cursor(), Cursor::new());
    }

    #[test]
    fn test_put_char() {
        let mut screen = Screen::default();
        write(&mut screen, "Hi");

        assert_eq!(row(&screen, 0), "Hi");
        assert_eq!(screen.cursor().col, 2);
    }

    #[test]
    fn test_put_char_pads_gap() {
        let mut screen = Screen::default();
        screen.move_cursor_forward(3);
        write(&mut screen, "x");
        assert_eq!(row(&screen, 0), "   x");
    }

    #[test]
    fn test_put_char_overwrites() {
        let mut screen = Screen::default();
        write(&mut screen, "abc");
        screen.carriage_return();
        write(&mut screen, "X");
        assert_eq!(row(&screen, 0), "Xbc");
    }

    #[test]
    fn test_wrap_width() {
        let mut screen = screen_with(ScreenOptions {
            wrap_width: Some(5),
            ..ScreenOptions::default()
        });
        write(&mut screen, "Hello World");

        assert_eq!(row(&screen, 0), "Hello");
        assert_eq!(row(&screen, 1), " Worl");
        assert_eq!(row(&screen, 2), "d");
    }

    #[test]
    fn test_wrap_clamps_far_column() {
        let mut screen = screen_with(ScreenOptions {
            wrap_width: Some(4),
            ..ScreenOptions::default()
        });
        screen.move_cursor_forward(10);
        assert_eq!(screen.beyond_wrap(), Some(4));

        write(&mut screen, "z");
        assert_eq!(row(&screen, 0), "   z");
        assert_eq!(screen.cursor().row, 1);
        assert_eq!(screen.cursor().col, 0);
    }

    #[test]
    fn test_insert_char() {
        let mut screen = Screen::default();
        write(&mut screen, "ac");
        screen.carriage_return();
        screen.move_cursor_forward(1);
        screen.insert_char(b'b').unwrap();

        assert_eq!(row(&screen, 0), "abc");
        assert_eq!(screen.cursor().col, 1);
    }

    #[test]
    fn test_insert_chars() {
        let mut screen = Screen::default();
        write(&mut screen, "abc");
        screen.carriage_return();
        screen.move_cursor_forward(1);
        screen.insert_chars(2).unwrap();
        assert_eq!(row(&screen, 0), "a  bc");

        // At the end of the row nothing happens
        screen.move_cursor_forward(10);
        screen.insert_chars(2).unwrap();
        assert_eq!(row(&screen, 0), "a  bc");
    }

    #[test]
    fn test_delete_chars() {
        let mut screen = Screen::default();
        write(&mut screen, "abcdef");
        screen.carriage_return();
        screen.move_cursor_forward(1);
        screen.delete_chars(2).unwrap();
        assert_eq!(row(&screen, 0), "adef");

        screen.delete_chars(0).unwrap();
        assert_eq!(row(&screen, 0), "adef");
    }

    #[test]
    fn test_erase_in_line() {
        let mut screen = Screen::default();
        write(&mut screen, "hello");
        screen.carriage_return();
        screen.move_cursor_forward(2);

        screen.erase_in_line(EraseMode::ToEnd).unwrap();
        assert_eq!(row(&screen, 0), "he");
    }

    #[test]
    fn test_erase_to_start() {
        let mut screen = Screen::default();
        write(&mut screen, "hello");
        screen.carriage_return();
        screen.move_cursor_forward(1);

        screen.erase_in_line(EraseMode::ToStart).unwrap();
        assert_eq!(row(&screen, 0), "  llo");

        // On the last character the whole row goes
        screen.move_cursor_forward(3);
        screen.erase_in_line(EraseMode::ToStart).unwrap();
        assert_eq!(row(&screen, 0), "");
        assert_eq!(screen.cursor().col, 4);
    }

    #[test]
    fn test_erase_all_keeps_column() {
        let mut screen = Screen::default();
        write(&mut screen, "hello");
        screen.erase_in_line(EraseMode::All).unwrap();
        assert_eq!(row(&screen, 0), "");
        assert_eq!(screen.cursor().col, 5);
    }

    #[test]
    fn test_linefeed_keeps_column() {
        let mut screen = Screen::default();
        write(&mut screen, "abc");
        screen.linefeed().unwrap();

        assert_eq!(screen.cursor().row, 1);
        assert_eq!(screen.cursor().col, 3);
        assert_eq!(row(&screen, 1), "   ");
    }

    #[test]
    fn test_next_line() {
        let mut screen = Screen::default();
        write(&mut screen, "abc");
        screen.next_line().unwrap();
        write(&mut screen, "d");

        assert_eq!(row(&screen, 0), "abc");
        assert_eq!(row(&screen, 1), "d");
    }

    #[test]
    fn test_linefeed_reuses_existing_rows() {
        let mut screen = Screen::default();
        screen.next_line().unwrap();
        screen.next_line().unwrap();
        screen.move_cursor_up(2);
        screen.next_line().unwrap();

        assert_eq!(screen.lines().len(), 3);
        assert_eq!(screen.cursor().row, 1);
    }

    #[test]
    fn test_reverse_index_at_top_inserts_row() {
        let mut screen = Screen::default();
        write(&mut screen, "second");
        screen.carriage_return();
        screen.reverse_index().unwrap();
        write(&mut screen, "first");

        assert_eq!(screen.lines().len(), 2);
        assert_eq!(row(&screen, 0), "first");
        assert_eq!(row(&screen, 1), "second");
    }

    #[test]
    fn test_reverse_index_moves_up() {
        let mut screen = Screen::default();
        screen.next_line().unwrap();
        screen.reverse_index().unwrap();
        assert_eq!(screen.cursor().row, 0);
        assert_eq!(screen.lines().len(), 2);
    }

    #[test]
    fn test_backspace_move() {
        let mut screen = Screen::default();
        write(&mut screen, "ab");
        screen.backspace().unwrap();
        assert_eq!(screen.cursor().col, 1);
        assert_eq!(row(&screen, 0), "ab");

        screen.backspace().unwrap();
        screen.backspace().unwrap();
        assert_eq!(screen.cursor().col, 0);
    }

    #[test]
    fn test_backspace_erase() {
        let mut screen = screen_with(ScreenOptions {
            backspace: BackspaceMode::Erase,
            ..ScreenOptions::default()
        });
        write(&mut screen, "abc");
        screen.backspace().unwrap();
        assert_eq!(row(&screen, 0), "ab");

        // Nothing to erase at column 0
        screen.carriage_return();
        screen.backspace().unwrap();
        assert_eq!(row(&screen, 0), "ab");
    }

    #[test]
    fn test_tab() {
        let mut screen = Screen::default();
        screen.tab();
        assert_eq!(screen.cursor().col, 8);
        write(&mut screen, "x");
        assert_eq!(row(&screen, 0), "        x");
    }

    #[test]
    fn test_cursor_vertical_clamps() {
        let mut screen = Screen::default();
        screen.next_line().unwrap();
        screen.next_line().unwrap();

        screen.move_cursor_up(10);
        assert_eq!(screen.cursor().row, 0);

        screen.move_cursor_down(10);
        assert_eq!(screen.cursor().row, 2);
    }

    #[test]
    fn test_row_width_ceiling() {
        let mut screen = screen_with(ScreenOptions {
            max_row_width: 4,
            ..ScreenOptions::default()
        });
        write(&mut screen, "abcd");

        let err = screen.put_char(b'e').unwrap_err();
        assert!(matches!(
            err,
            Error::RowTooLong {
                row: 0,
                width: 5,
                limit: 4
            }
        ));

        // Overwriting within the limit is still fine
        screen.carriage_return();
        screen.put_char(b'A').unwrap();
        assert_eq!(row(&screen, 0), "Abcd");
    }

    #[test]
    fn test_backspace_mode_parse() {
        assert_eq!("move".parse::<BackspaceMode>(), Ok(BackspaceMode::Move));
        assert_eq!(" Erase ".parse::<BackspaceMode>(), Ok(BackspaceMode::Erase));
        assert!("wipe".parse::<BackspaceMode>().is_err());
        assert_eq!(BackspaceMode::Erase.to_string(), "erase");
    }
}
