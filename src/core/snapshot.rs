//! Transcript output
//!
//! Serializes the line buffer as plain text: every row followed by a
//! newline, except that an empty final row (the one a trailing newline in
//! the capture opens) gets none. Output is a pure function of the buffer,
//! so writing the same buffer twice yields identical bytes.
//!
//! [`Snapshot`] is a structured view of the same state for `--json` and
//! for debugging.

use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use super::cursor::Cursor;
use super::line::Line;
use super::screen::Screen;

/// Whether the row at `row` is followed by a newline
fn terminated(lines: &[Line], row: usize) -> bool {
    row + 1 < lines.len() || lines.get(row).is_some_and(|line| !line.is_empty())
}

/// Write the rows as plain text
pub fn write_text<W: Write>(lines: &[Line], out: &mut W) -> io::Result<()> {
    for (row, line) in lines.iter().enumerate() {
        out.write_all(line.as_bytes())?;
        if terminated(lines, row) {
            out.write_all(b"\n")?;
        }
    }
    Ok(())
}

/// The plain-text transcript as bytes
pub fn to_text(lines: &[Line]) -> Vec<u8> {
    let capacity = lines.iter().map(|line| line.len() + 1).sum();
    let mut text = Vec::with_capacity(capacity);
    for (row, line) in lines.iter().enumerate() {
        text.extend_from_slice(line.as_bytes());
        if terminated(lines, row) {
            text.push(b'\n');
        }
    }
    text
}

/// A structured snapshot of the line buffer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Number of rows in the buffer
    pub rows: usize,
    /// Row contents, decoded as UTF-8 with invalid sequences replaced
    pub lines: Vec<String>,
    /// Final cursor position
    pub cursor: Cursor,
}

impl Snapshot {
    /// Create a snapshot from the current buffer state
    pub fn from_screen(screen: &Screen) -> Self {
        Snapshot {
            rows: screen.lines().len(),
            lines: screen.lines().iter().map(Line::to_string_lossy).collect(),
            cursor: screen.cursor(),
        }
    }

    /// Convert snapshot to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse snapshot from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
