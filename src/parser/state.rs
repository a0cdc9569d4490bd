//! Parser State Machine
//!
//! Consumes a session capture one byte at a time. Control characters are
//! classified first (see [`super::control`]); everything else is dispatched
//! on the current state. Completed sequences become [`Action`]s.
//!
//! States:
//! - Ground: ordinary text, every byte is printed
//! - Escape: after ESC, waiting for the selector byte
//! - Csi: after ESC [ or 0x9B, collecting parameters until the final byte
//! - CsiBracket: after ESC [ [, swallows one byte (Linux console key echo)
//! - Osc: after ESC ], waiting for the command selector
//! - OscString: title/icon payload, swallowed up to BEL
//! - OscPalette: ESC ] P, reading seven hex digits
//! - Osc4/Osc5: first digit of OSC 46 / OSC 50 seen
//! - EscapePercent, EscapeHash, DesignateG0, DesignateG1: one-byte suffixes

use tracing::{debug, trace};

use super::actions::{Action, EraseMode};
use super::control::ControlCode;
use super::params::Params;
use crate::diagnostics::{unimplemented_csi_name, Diagnostic, SequenceContext};

const BEL: u8 = 0x07;

/// Hex digits in ESC ] P: one for the palette index, six for the color
const PALETTE_DIGITS: u8 = 7;

/// Parser state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Ground,
    Escape,
    Csi,
    CsiBracket,
    Osc,
    OscString,
    OscPalette { digits: u8, index: u8, rgb: u32 },
    Osc4,
    Osc5,
    EscapePercent,
    EscapeHash,
    DesignateG0,
    DesignateG1,
}

/// The session capture parser
#[derive(Debug)]
pub struct Parser {
    state: State,
    /// Parameters of the CSI sequence in progress
    params: Params,
    /// Whether the CSI sequence in progress started with `?`
    private: bool,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    /// Create a new parser in the ground state
    pub fn new() -> Self {
        Self {
            state: State::Ground,
            params: Params::new(),
            private: false,
        }
    }

    /// Abandon any sequence in progress
    pub fn reset(&mut self) {
        self.enter(State::Ground);
    }

    /// True when no sequence is in progress
    pub fn is_ground(&self) -> bool {
        self.state == State::Ground
    }

    /// Switch state. Parameters belong to the sequence being read, so they
    /// are discarded on every transition.
    fn enter(&mut self, state: State) {
        self.state = state;
        self.params.clear();
        self.private = false;
    }

    /// Process a chunk of bytes, returning actions
    pub fn feed(&mut self, data: &[u8]) -> Vec<Action> {
        let mut actions = Vec::new();
        for &byte in data {
            self.advance(byte, &mut actions);
        }
        actions
    }

    /// Process a single byte, appending any resulting actions
    pub fn advance(&mut self, byte: u8, actions: &mut Vec<Action>) {
        // OSC payloads are opaque: even control bytes are swallowed
        let control = match self.state {
            State::OscString => None,
            _ => ControlCode::classify(byte),
        };
        if let Some(code) = control {
            self.execute(code, actions);
            return;
        }

        match self.state {
            State::Ground => actions.push(Action::Print(byte)),
            State::Escape => self.process_escape(byte, actions),
            State::Csi => self.process_csi(byte, actions),
            State::CsiBracket => {
                trace!(byte, "console key echo swallowed");
                self.enter(State::Ground);
            }
            State::Osc => self.process_osc(byte, actions),
            State::OscString => {
                if byte == BEL {
                    self.enter(State::Ground);
                }
            }
            State::OscPalette { digits, index, rgb } => {
                self.process_palette(byte, digits, index, rgb, actions)
            }
            State::Osc4 => self.process_osc_suffix(byte, b'6', SequenceContext::Osc4, actions),
            State::Osc5 => self.process_osc_suffix(byte, b'0', SequenceContext::Osc5, actions),
            State::EscapePercent => {
                let diagnostic = match byte {
                    b'@' | b'G' | b'8' => Diagnostic::CharsetSelect { code: byte },
                    _ => unknown(SequenceContext::CharsetSelect, byte),
                };
                actions.push(Action::Diagnostic(diagnostic));
                self.enter(State::Ground);
            }
            State::EscapeHash => {
                let diagnostic = match byte {
                    b'8' => Diagnostic::DecAlignment,
                    _ => unknown(SequenceContext::DecAlignment, byte),
                };
                actions.push(Action::Diagnostic(diagnostic));
                self.enter(State::Ground);
            }
            State::DesignateG0 => self.process_designate(0, byte, actions),
            State::DesignateG1 => self.process_designate(1, byte, actions),
        }
    }

    /// Apply a classified control character
    fn execute(&mut self, code: ControlCode, actions: &mut Vec<Action>) {
        match code {
            ControlCode::Bell | ControlCode::Delete => {}
            ControlCode::Backspace => actions.push(Action::Backspace),
            ControlCode::Tab => actions.push(Action::Tab),
            ControlCode::LineFeed => actions.push(Action::NewLine),
            ControlCode::CarriageReturn => actions.push(Action::CarriageReturn),
            ControlCode::ShiftOut => {
                actions.push(Action::Diagnostic(Diagnostic::CharsetShift { set: 1 }))
            }
            ControlCode::ShiftIn => {
                actions.push(Action::Diagnostic(Diagnostic::CharsetShift { set: 0 }))
            }
            ControlCode::Cancel => self.enter(State::Ground),
            ControlCode::Escape => self.enter(State::Escape),
            ControlCode::Csi => self.enter(State::Csi),
            ControlCode::Other(byte) => {
                actions.push(Action::Diagnostic(Diagnostic::UnknownControl { byte }))
            }
        }
    }

    /// Process the byte following ESC
    fn process_escape(&mut self, byte: u8, actions: &mut Vec<Action>) {
        let next = match byte {
            b'[' => State::Csi,
            b']' => State::Osc,
            b'(' => State::DesignateG0,
            b')' => State::DesignateG1,
            b'%' => State::EscapePercent,
            b'#' => State::EscapeHash,
            b'D' => {
                actions.push(Action::Index);
                State::Ground
            }
            b'E' => {
                actions.push(Action::NewLine);
                State::Ground
            }
            b'M' => {
                actions.push(Action::ReverseIndex);
                State::Ground
            }
            b'H' => {
                actions.push(Action::Diagnostic(Diagnostic::TabStop));
                State::Ground
            }
            b'7' => {
                actions.push(Action::Diagnostic(Diagnostic::SaveCursor));
                State::Ground
            }
            b'8' => {
                actions.push(Action::Diagnostic(Diagnostic::RestoreCursor));
                State::Ground
            }
            // Reset, identify request, keypad modes: nothing to do for text
            b'c' | b'Z' | b'>' | b'=' => {
                debug!(byte, "escape sequence ignored");
                State::Ground
            }
            _ => {
                actions.push(Action::Diagnostic(unknown(SequenceContext::Escape, byte)));
                State::Ground
            }
        };
        self.enter(next);
    }

    /// Process a byte inside a control sequence
    fn process_csi(&mut self, byte: u8, actions: &mut Vec<Action>) {
        match byte {
            b'0'..=b'9' => self.params.push_digit(byte - b'0'),
            b';' => self.params.separator(),
            b'?' => {
                if self.params.is_empty() {
                    self.private = true;
                } else {
                    actions.push(Action::Diagnostic(Diagnostic::MisplacedPrivateMarker));
                }
            }
            b'[' if self.params.is_empty() && !self.private => self.enter(State::CsiBracket),
            // Intermediates and other private markers: unknown, but the
            // sequence is still running
            0x20..=0x2F | b':' | b'<' | b'=' | b'>' => {
                actions.push(Action::Diagnostic(unknown(SequenceContext::Csi, byte)));
            }
            0x40..=0x7E => {
                self.dispatch_csi(byte, actions);
                self.enter(State::Ground);
            }
            _ => {
                actions.push(Action::Diagnostic(unknown(SequenceContext::Csi, byte)));
                self.enter(State::Ground);
            }
        }
    }

    /// Dispatch a CSI final byte using the accumulated parameters
    fn dispatch_csi(&mut self, final_byte: u8, actions: &mut Vec<Action>) {
        match final_byte {
            b'@' => {
                let n = self.count(final_byte, actions);
                actions.push(Action::InsertBlanks(n));
            }
            b'A' => {
                let n = self.count(final_byte, actions);
                actions.push(Action::CursorUp(n));
            }
            b'B' => {
                let n = self.count(final_byte, actions);
                actions.push(Action::CursorDown(n));
            }
            b'C' => {
                let n = self.count(final_byte, actions);
                actions.push(Action::CursorForward(n));
            }
            b'P' => {
                let n = self.count(final_byte, actions);
                actions.push(Action::DeleteChars(n));
            }
            b'K' => self.dispatch_erase_in_line(actions),
            // Device attributes, SGR, LEDs, mouse tracking, terminal
            // parameters: no bearing on plain text
            b'c' | b'm' | b'q' | b'T' | b'x' => {
                trace!(final_byte, params = ?self.params, "control sequence ignored");
            }
            _ if unimplemented_csi_name(final_byte).is_some() => {
                actions.push(Action::Diagnostic(Diagnostic::UnimplementedCsi {
                    final_byte,
                    private: self.private,
                    params: self.params.to_vec(),
                }));
            }
            _ => {
                actions.push(Action::Diagnostic(unknown(SequenceContext::Csi, final_byte)));
            }
        }
    }

    /// The count argument of a CSI command: first parameter, 1 when absent
    fn count(&self, final_byte: u8, actions: &mut Vec<Action>) -> usize {
        self.warn_extra_params(final_byte, actions);
        usize::try_from(self.params.first_or(1)).unwrap_or(usize::MAX)
    }

    fn warn_extra_params(&self, final_byte: u8, actions: &mut Vec<Action>) {
        if self.params.len() > 1 {
            actions.push(Action::Diagnostic(Diagnostic::ExtraParameters {
                final_byte,
                params: self.params.to_vec(),
            }));
        }
    }

    fn dispatch_erase_in_line(&self, actions: &mut Vec<Action>) {
        self.warn_extra_params(b'K', actions);
        let mode = match self.params.get(0) {
            None => EraseMode::ToEnd,
            Some(1) => EraseMode::ToStart,
            Some(2) => EraseMode::All,
            Some(mode) => {
                actions.push(Action::Diagnostic(Diagnostic::EraseInLineMode { mode }));
                return;
            }
        };
        actions.push(Action::EraseInLine(mode));
    }

    /// Process the selector byte following ESC ]
    fn process_osc(&mut self, byte: u8, actions: &mut Vec<Action>) {
        let next = match byte {
            // Icon name and window title
            b'0' | b'1' | b'2' => State::OscString,
            b'4' => State::Osc4,
            b'5' => State::Osc5,
            b'P' => State::OscPalette {
                digits: 0,
                index: 0,
                rgb: 0,
            },
            b'R' => {
                actions.push(Action::Diagnostic(Diagnostic::ResetPalette));
                State::Ground
            }
            // Unrecognized numeric selector: report it, then eat the payload
            b'0'..=b'9' => {
                actions.push(Action::Diagnostic(unknown(SequenceContext::Osc, byte)));
                State::OscString
            }
            _ => {
                actions.push(Action::Diagnostic(unknown(SequenceContext::Osc, byte)));
                State::Ground
            }
        };
        self.enter(next);
    }

    /// OSC 46 / OSC 50: check the second digit, then swallow the payload
    fn process_osc_suffix(
        &mut self,
        byte: u8,
        expected: u8,
        context: SequenceContext,
        actions: &mut Vec<Action>,
    ) {
        if byte != expected {
            actions.push(Action::Diagnostic(unknown(context, byte)));
        }
        self.enter(State::OscString);
    }

    fn process_palette(
        &mut self,
        byte: u8,
        digits: u8,
        index: u8,
        rgb: u32,
        actions: &mut Vec<Action>,
    ) {
        let Some(value) = char::from(byte).to_digit(16) else {
            actions.push(Action::Diagnostic(Diagnostic::MalformedPalette { byte, digits }));
            self.enter(State::Ground);
            return;
        };

        let digits = digits + 1;
        let (index, rgb) = if digits == 1 {
            // A single hex digit always fits the 16-entry palette
            (value as u8, rgb)
        } else {
            (index, (rgb << 4) | value)
        };

        if digits == PALETTE_DIGITS {
            actions.push(Action::Diagnostic(Diagnostic::SetPalette { index, rgb }));
            self.enter(State::Ground);
        } else {
            self.state = State::OscPalette { digits, index, rgb };
        }
    }

    fn process_designate(&mut self, slot: u8, byte: u8, actions: &mut Vec<Action>) {
        let diagnostic = match byte {
            b'B' | b'0' | b'U' | b'K' => Diagnostic::CharsetDesignate { slot, code: byte },
            _ if slot == 0 => unknown(SequenceContext::DesignateG0, byte),
            _ => unknown(SequenceContext::DesignateG1, byte),
        };
        actions.push(Action::Diagnostic(diagnostic));
        self.enter(State::Ground);
    }
}

fn unknown(context: SequenceContext, byte: u8) -> Diagnostic {
    Diagnostic::UnknownSequence { context, byte }
}
