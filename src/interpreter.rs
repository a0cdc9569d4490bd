//! Transcript Interpreter
//!
//! Ties together the parser and the line buffer: bytes go through the
//! parser, buffer actions are applied to the [`Screen`], and diagnostics go
//! to a [`DiagnosticSink`]. This is the main integration point between
//! parsing and the buffer model.

use std::io::{self, Read, Write};

use tracing::{debug, trace};

use crate::config::Config;
use crate::core::{to_text, write_text, Screen, ScreenOptions, Snapshot};
use crate::diagnostics::{Diagnostic, DiagnosticSink, TracingSink};
use crate::error::Result;
use crate::parser::{Action, Parser};

/// Input is read in chunks of this size
const READ_CHUNK: usize = 64 * 1024;

/// Interpreter that turns a session capture into a line buffer
pub struct Interpreter<S: DiagnosticSink = TracingSink> {
    parser: Parser,
    screen: Screen,
    sink: S,
}

impl Interpreter<TracingSink> {
    /// Create an interpreter that logs diagnostics through `tracing`
    pub fn new(config: &Config) -> Self {
        Self::with_sink(config.screen_options(), TracingSink::new())
    }
}

impl Default for Interpreter<TracingSink> {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl<S: DiagnosticSink> Interpreter<S> {
    pub fn with_sink(options: ScreenOptions, sink: S) -> Self {
        Self {
            parser: Parser::new(),
            screen: Screen::new(options),
            sink,
        }
    }

    /// Get a reference to the line buffer
    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Process a chunk of the capture. Sequences may continue into the
    /// next chunk.
    pub fn process(&mut self, data: &[u8]) -> Result<()> {
        for action in self.parser.feed(data) {
            self.apply(action)?;
        }
        Ok(())
    }

    /// Process everything `reader` yields, returning the byte count
    pub fn process_reader<R: Read>(&mut self, mut reader: R) -> Result<u64> {
        let mut buf = vec![0u8; READ_CHUNK];
        let mut total = 0u64;
        loop {
            let n = match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            self.process(&buf[..n])?;
            total += n as u64;
        }
        self.finish();
        Ok(total)
    }

    /// Note the end of input. A sequence still open at this point is
    /// dropped, as a terminal would do when the session ends.
    pub fn finish(&mut self) {
        if !self.parser.is_ground() {
            debug!("capture ended inside an escape sequence");
            self.parser.reset();
        }
    }

    /// Apply a single parsed action to the buffer
    fn apply(&mut self, action: Action) -> Result<()> {
        trace!(?action, "apply");
        match action {
            Action::Print(byte) => {
                if let Some(width) = self.screen.beyond_wrap() {
                    self.sink.report(Diagnostic::CursorBeyondWrap {
                        col: self.screen.cursor().col,
                        width,
                    });
                }
                self.screen.put_char(byte)?;
            }
            Action::Backspace => self.screen.backspace()?,
            Action::Tab => self.screen.tab(),
            Action::CarriageReturn => self.screen.carriage_return(),
            Action::NewLine => self.screen.next_line()?,
            Action::Index => self.screen.index()?,
            Action::ReverseIndex => self.screen.reverse_index()?,
            Action::InsertBlanks(n) => self.screen.insert_chars(n)?,
            Action::CursorUp(n) => self.screen.move_cursor_up(n),
            Action::CursorDown(n) => self.screen.move_cursor_down(n),
            Action::CursorForward(n) => self.screen.move_cursor_forward(n),
            Action::DeleteChars(n) => self.screen.delete_chars(n)?,
            Action::EraseInLine(mode) => self.screen.erase_in_line(mode)?,
            Action::Diagnostic(diagnostic) => self.sink.report(diagnostic),
        }
        Ok(())
    }

    /// The plain-text transcript of everything processed so far
    pub fn transcript(&self) -> Vec<u8> {
        to_text(self.screen.lines())
    }

    /// Write the plain-text transcript
    pub fn write_transcript<W: Write>(&self, out: &mut W) -> Result<()> {
        write_text(self.screen.lines(), out)?;
        Ok(())
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::from_screen(&self.screen)
    }

    /// Consume the interpreter, returning the buffer and the sink
    pub fn into_parts(self) -> (Screen, S) {
        (self.screen, self.sink)
    }
}

/// Convert a whole capture to text with default settings
pub fn transcribe(input: &[u8]) -> Result<Vec<u8>> {
    let mut interpreter = Interpreter::default();
    interpreter.process(input)?;
    interpreter.finish();
    Ok(interpreter.transcript())
}
