//! Transcript line representation
//!
//! A line is a growable row of raw bytes. It has no fixed width: writes
//! past the end extend it, padding the gap with spaces.

use serde::{Deserialize, Serialize};

/// Byte used to fill gaps and blanked columns
pub const BLANK: u8 = b' ';

/// A row of the transcript
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    bytes: Vec<u8>,
}

impl Line {
    /// Create an empty line
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Append spaces until the line is at least `col` bytes long
    pub fn pad_to(&mut self, col: usize) {
        if self.bytes.len() < col {
            self.bytes.resize(col, BLANK);
        }
    }

    /// Overwrite the byte at `col`, or append it when `col` is the end
    ///
    /// Callers pad first, so `col <= len()` holds on entry.
    pub fn set(&mut self, col: usize, byte: u8) {
        match self.bytes.get_mut(col) {
            Some(slot) => *slot = byte,
            None => self.bytes.push(byte),
        }
    }

    /// Insert a byte at `col`, shifting the rest right
    pub fn insert(&mut self, col: usize, byte: u8) {
        self.bytes.insert(col, byte);
    }

    /// Insert `n` blanks at `col`, shifting the rest right
    pub fn insert_blanks(&mut self, col: usize, n: usize) {
        if col > self.bytes.len() {
            return;
        }
        self.bytes
            .splice(col..col, std::iter::repeat(BLANK).take(n));
    }

    /// Remove up to `n` bytes starting at `col`
    pub fn delete(&mut self, col: usize, n: usize) {
        if col >= self.bytes.len() {
            return;
        }
        let end = col.saturating_add(n).min(self.bytes.len());
        self.bytes.drain(col..end);
    }

    /// Drop everything from `col` to the end
    pub fn truncate_from(&mut self, col: usize) {
        self.bytes.truncate(col);
    }

    /// Replace columns `0..=col` with blanks
    pub fn blank_through(&mut self, col: usize) {
        let end = col.saturating_add(1).min(self.bytes.len());
        self.bytes[..end].fill(BLANK);
    }

    pub fn clear(&mut self) {
        self.bytes.clear();
    }

    /// Lossy UTF-8 rendering, for display and snapshots
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

impl From<&[u8]> for Line {
    fn from(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.to_vec(),
        }
    }
}

impl From<&str> for Line {
    fn from(text: &str) -> Self {
        Self::from(text.as_bytes())
    }
}
