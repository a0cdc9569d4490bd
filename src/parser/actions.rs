//! Actions produced by the parser
//!
//! Each action is one line-buffer operation with its parameters already
//! resolved, or a diagnostic to pass on to the sink.

use serde::{Deserialize, Serialize};

use crate::diagnostics::Diagnostic;

/// Erase-in-line (CSI K) variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EraseMode {
    /// Remove everything from the cursor to the end of the row
    ToEnd,
    /// Blank the row up to and including the cursor
    ToStart,
    /// Clear the row, keeping the cursor column
    All,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Write a byte at the cursor and advance
    Print(u8),
    /// BS
    Backspace,
    /// HT
    Tab,
    /// CR
    CarriageReturn,
    /// LF, VT, FF, ESC E: carriage return followed by line feed
    NewLine,
    /// ESC D: line feed without carriage return
    Index,
    /// ESC M: reverse line feed
    ReverseIndex,
    /// CSI n @
    InsertBlanks(usize),
    /// CSI n A
    CursorUp(usize),
    /// CSI n B
    CursorDown(usize),
    /// CSI n C
    CursorForward(usize),
    /// CSI n P
    DeleteChars(usize),
    /// CSI K
    EraseInLine(EraseMode),
    /// Report only, no effect on the buffer
    Diagnostic(Diagnostic),
}

impl Action {
    /// Check if this action only reports and never touches the buffer
    pub fn is_diagnostic(&self) -> bool {
        matches!(self, Action::Diagnostic(_))
    }
}
