//! Session capture parser
//!
//! A byte-at-a-time state machine that turns a recorded terminal session
//! into line-buffer actions and diagnostics. Sequences may be split
//! across calls to [`Parser::feed`].

mod actions;
mod control;
mod params;
mod state;

pub use actions::{Action, EraseMode};
pub use control::{Caret, ControlCode};
pub use params::Params;
pub use state::Parser;
