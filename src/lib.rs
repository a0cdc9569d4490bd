//! Mochi Transcript Library
//!
//! Turns a raw terminal session capture (as recorded by `script(1)`) into
//! the plain text a reader would have seen, by replaying the subset of
//! terminal control sequences that affect line content.
//!
//! - `parser`: byte-level escape sequence parser
//! - `core`: line buffer, cursor and text output
//! - `interpreter`: drives the parser and applies its actions
//! - `diagnostics`: reports for sequences that are not applied
//! - `config`: layered configuration and command-line arguments

pub mod config;
pub mod core;
pub mod diagnostics;
pub mod error;
pub mod interpreter;
pub mod parser;

pub use config::{CliArgs, Config, ConfigError};
pub use error::{Error, Result};
pub use interpreter::{transcribe, Interpreter};
