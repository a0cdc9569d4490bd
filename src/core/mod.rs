//! Transcript Core Module
//!
//! The line buffer the parser's actions are applied to:
//! - Growable byte rows
//! - Cursor position
//! - Buffer operations (put, insert, delete, erase, line feeds)
//! - Plain-text and structured output
//!
//! The core is deterministic: the same sequence of actions always
//! produces the same buffer.

mod cursor;
mod line;
mod screen;
mod snapshot;

pub use cursor::{Cursor, TAB_WIDTH};
pub use line::{Line, BLANK};
pub use screen::{BackspaceMode, Screen, ScreenOptions, DEFAULT_MAX_ROW_WIDTH};
pub use snapshot::{to_text, write_text, Snapshot};
