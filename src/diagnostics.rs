//! Diagnostics side channel
//!
//! Sequences the interpreter does not apply (unknown codes, unimplemented
//! CSI commands, charset and palette changes) are reported here instead of
//! being silently dropped. Reporting never alters the transcript and never
//! stops processing.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::parser::Caret;

/// How serious a diagnostic is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Input the interpreter understood but chose not to apply, or did not
    /// recognize
    Warning,
    /// Input that is malformed in a way a well-behaved terminal never sends
    Severe,
}

/// The sequence being parsed when an unknown byte arrived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SequenceContext {
    Escape,
    Csi,
    Osc,
    Osc4,
    Osc5,
    CharsetSelect,
    DecAlignment,
    DesignateG0,
    DesignateG1,
}

impl fmt::Display for SequenceContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SequenceContext::Escape => "escape sequence",
            SequenceContext::Csi => "control sequence (ESC [ or 0x9B)",
            SequenceContext::Osc => "operating system command (ESC ])",
            SequenceContext::Osc4 => "operating system command 4x (ESC ] 4)",
            SequenceContext::Osc5 => "operating system command 5x (ESC ] 5)",
            SequenceContext::CharsetSelect => "character set selection (ESC %)",
            SequenceContext::DecAlignment => "DEC screen alignment command (ESC #)",
            SequenceContext::DesignateG0 => "G0 character set designation (ESC ()",
            SequenceContext::DesignateG1 => "G1 character set designation (ESC ))",
        };
        f.write_str(name)
    }
}

/// Conventional meaning of the CSI commands that could affect plain text
/// but are not applied.
pub fn unimplemented_csi_name(final_byte: u8) -> Option<&'static str> {
    let name = match final_byte {
        b'D' => "cursor left",
        b'E' => "cursor down and to column 1",
        b'F' => "cursor up and to column 1",
        b'G' => "cursor to column",
        b'H' => "cursor to row, column",
        b'J' => "erase display",
        b'L' => "insert lines",
        b'M' => "delete lines",
        b'X' => "erase characters",
        b'a' => "cursor right",
        b'd' => "cursor to row",
        b'e' => "cursor down",
        b'f' => "cursor to row, column",
        b'g' => "clear tab stop",
        b'h' => "set mode",
        b'l' => "reset mode",
        b'n' => "device status report",
        b'r' => "set scrolling region",
        b's' => "save cursor location",
        b'u' => "restore cursor location",
        b'`' => "cursor to column",
        _ => return None,
    };
    Some(name)
}

/// A single advisory report about the input stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A C0 control code with no defined effect
    UnknownControl { byte: u8 },
    /// SO/SI: switch to the G1/G0 character set
    CharsetShift { set: u8 },
    /// A byte with no meaning in the current sequence
    UnknownSequence { context: SequenceContext, byte: u8 },
    /// A recognized CSI command that is not applied to the transcript
    UnimplementedCsi {
        final_byte: u8,
        private: bool,
        params: Vec<u32>,
    },
    /// More parameters than the CSI command accepts; the extras are ignored
    ExtraParameters { final_byte: u8, params: Vec<u32> },
    /// `?` after parameters in a CSI sequence
    MisplacedPrivateMarker,
    /// Unsupported erase-in-line mode
    EraseInLineMode { mode: u32 },
    /// ESC H
    TabStop,
    /// ESC 7
    SaveCursor,
    /// ESC 8
    RestoreCursor,
    /// ESC % @ / ESC % G / ESC % 8
    CharsetSelect { code: u8 },
    /// ESC ( x / ESC ) x
    CharsetDesignate { slot: u8, code: u8 },
    /// ESC # 8
    DecAlignment,
    /// ESC ] P followed by seven hex digits
    SetPalette { index: u8, rgb: u32 },
    /// ESC ] R
    ResetPalette,
    /// A non-hex byte inside ESC ] P
    MalformedPalette { byte: u8, digits: u8 },
    /// A write at or past the wrap width; the column was clamped
    CursorBeyondWrap { col: usize, width: usize },
}

impl Diagnostic {
    pub fn severity(&self) -> Severity {
        match self {
            Diagnostic::MalformedPalette { .. } => Severity::Severe,
            _ => Severity::Warning,
        }
    }

    /// Stable short name, used for summaries and structured logging
    pub fn kind(&self) -> &'static str {
        match self {
            Diagnostic::UnknownControl { .. } => "unknown_control",
            Diagnostic::CharsetShift { .. } => "charset_shift",
            Diagnostic::UnknownSequence { .. } => "unknown_sequence",
            Diagnostic::UnimplementedCsi { .. } => "unimplemented_csi",
            Diagnostic::ExtraParameters { .. } => "extra_parameters",
            Diagnostic::MisplacedPrivateMarker => "misplaced_private_marker",
            Diagnostic::EraseInLineMode { .. } => "erase_in_line_mode",
            Diagnostic::TabStop => "tab_stop",
            Diagnostic::SaveCursor => "save_cursor",
            Diagnostic::RestoreCursor => "restore_cursor",
            Diagnostic::CharsetSelect { .. } => "charset_select",
            Diagnostic::CharsetDesignate { .. } => "charset_designate",
            Diagnostic::DecAlignment => "dec_alignment",
            Diagnostic::SetPalette { .. } => "set_palette",
            Diagnostic::ResetPalette => "reset_palette",
            Diagnostic::MalformedPalette { .. } => "malformed_palette",
            Diagnostic::CursorBeyondWrap { .. } => "cursor_beyond_wrap",
        }
    }
}

fn write_params(f: &mut fmt::Formatter<'_>, params: &[u32]) -> fmt::Result {
    if params.is_empty() {
        return f.write_str("no parameters");
    }
    f.write_str("parameters ")?;
    for (i, param) in params.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", param)?;
    }
    Ok(())
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnknownControl { byte } => {
                write!(f, "control code {} (0x{:02X}) has no effect, ignored", Caret(*byte), byte)
            }
            Diagnostic::CharsetShift { set } => {
                write!(f, "switch to the G{} character set ignored", set)
            }
            Diagnostic::UnknownSequence { context, byte } => {
                write!(f, "unknown byte '{}' (0x{:02X}) in {}", Caret(*byte), byte, context)
            }
            Diagnostic::UnimplementedCsi {
                final_byte,
                private,
                params,
            } => {
                let marker = if *private { "? " } else { "" };
                let name = unimplemented_csi_name(*final_byte).unwrap_or("unknown");
                write!(
                    f,
                    "unimplemented control sequence \"ESC [ {}... {}\" ({}) with ",
                    marker,
                    Caret(*final_byte),
                    name
                )?;
                write_params(f, params)?;
                f.write_str(", ignored")
            }
            Diagnostic::ExtraParameters { final_byte, params } => {
                write!(
                    f,
                    "too many parameters for \"ESC [ ... {}\": ",
                    Caret(*final_byte)
                )?;
                write_params(f, params)?;
                f.write_str("; only the first is used")
            }
            Diagnostic::MisplacedPrivateMarker => {
                f.write_str("'?' after parameters in a control sequence, ignored")
            }
            Diagnostic::EraseInLineMode { mode } => {
                write!(f, "erase-in-line mode {} is not supported, ignored", mode)
            }
            Diagnostic::TabStop => f.write_str("tab stop change ignored"),
            Diagnostic::SaveCursor => f.write_str("cursor save ignored"),
            Diagnostic::RestoreCursor => f.write_str("cursor restore ignored"),
            Diagnostic::CharsetSelect { code } => {
                let charset = if *code == b'@' {
                    "ISO 646 / ISO 8859-1"
                } else {
                    "UTF-8"
                };
                write!(f, "character set selection ({}) ignored", charset)
            }
            Diagnostic::CharsetDesignate { slot, code } => {
                let mapping = match code {
                    b'B' => "ISO 8859-1",
                    b'0' => "VT100 graphics",
                    b'U' => "null mapping",
                    b'K' => "user mapping",
                    _ => "unknown mapping",
                };
                write!(f, "designation of G{} as {} ignored", slot, mapping)
            }
            Diagnostic::DecAlignment => f.write_str("DEC screen alignment test ignored"),
            Diagnostic::SetPalette { index, rgb } => write!(
                f,
                "palette entry {} set to rgb({}, {}, {}) ignored",
                index,
                (rgb >> 16) & 0xFF,
                (rgb >> 8) & 0xFF,
                rgb & 0xFF
            ),
            Diagnostic::ResetPalette => f.write_str("palette reset ignored"),
            Diagnostic::MalformedPalette { byte, digits } => write!(
                f,
                "malformed palette command: '{}' after {} hex digits, sequence dropped",
                Caret(*byte),
                digits
            ),
            Diagnostic::CursorBeyondWrap { col, width } => write!(
                f,
                "cursor at column {} is beyond the wrap width {}, clamped",
                col, width
            ),
        }
    }
}

/// Receiver for diagnostics produced while interpreting a stream
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

/// Logs every diagnostic through `tracing` and keeps per-kind counts
#[derive(Debug, Default)]
pub struct TracingSink {
    counts: BTreeMap<&'static str, usize>,
}

impl TracingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of diagnostics reported, keyed by [`Diagnostic::kind`]
    pub fn counts(&self) -> &BTreeMap<&'static str, usize> {
        &self.counts
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }
}

impl DiagnosticSink for TracingSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        let kind = diagnostic.kind();
        match diagnostic.severity() {
            Severity::Warning => warn!(kind, "{}", diagnostic),
            Severity::Severe => error!(kind, "{}", diagnostic),
        }
        *self.counts.entry(kind).or_insert(0) += 1;
    }
}

/// Stores diagnostics in order of arrival
#[derive(Debug, Default, Clone)]
pub struct CollectingSink {
    diagnostics: Vec<Diagnostic>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unimplemented_csi_message() {
        let diagnostic = Diagnostic::UnimplementedCsi {
            final_byte: b'D',
            private: false,
            params: vec![2],
        };
        let message = diagnostic.to_string();
        assert!(message.contains("ESC [ ... D"), "{}", message);
        assert!(message.contains("cursor left"), "{}", message);
        assert!(message.contains("parameters 2"), "{}", message);
    }

    #[test]
    fn test_private_csi_message() {
        let diagnostic = Diagnostic::UnimplementedCsi {
            final_byte: b'h',
            private: true,
            params: vec![1049],
        };
        assert!(diagnostic.to_string().contains("ESC [ ? ... h"));
    }

    #[test]
    fn test_palette_message_splits_rgb() {
        let diagnostic = Diagnostic::SetPalette {
            index: 3,
            rgb: 0xFF8000,
        };
        assert!(diagnostic.to_string().contains("rgb(255, 128, 0)"));
    }

    #[test]
    fn test_severity() {
        assert_eq!(Diagnostic::TabStop.severity(), Severity::Warning);
        assert_eq!(
            Diagnostic::MalformedPalette { byte: b'g', digits: 2 }.severity(),
            Severity::Severe
        );
    }

    #[test]
    fn test_unimplemented_csi_names() {
        assert_eq!(unimplemented_csi_name(b'J'), Some("erase display"));
        assert_eq!(unimplemented_csi_name(b'm'), None);
        assert_eq!(unimplemented_csi_name(b'A'), None);
    }

    #[test]
    fn test_tracing_sink_counts() {
        let mut sink = TracingSink::new();
        sink.report(Diagnostic::SaveCursor);
        sink.report(Diagnostic::SaveCursor);
        sink.report(Diagnostic::ResetPalette);

        assert_eq!(sink.total(), 3);
        assert_eq!(sink.counts().get("save_cursor"), Some(&2));
        assert_eq!(sink.counts().get("reset_palette"), Some(&1));
    }

    #[test]
    fn test_collecting_sink_order() {
        let mut sink = CollectingSink::new();
        assert!(sink.is_empty());
        sink.report(Diagnostic::TabStop);
        sink.report(Diagnostic::DecAlignment);
        assert_eq!(
            sink.diagnostics(),
            &[Diagnostic::TabStop, Diagnostic::DecAlignment]
        );
    }

    #[test]
    fn test_diagnostic_serialization() {
        let diagnostic = Diagnostic::UnknownSequence {
            context: SequenceContext::Escape,
            byte: b'Q',
        };
        let json = serde_json::to_string(&diagnostic).unwrap();
        assert!(json.contains("\"kind\":\"unknown_sequence\""));
        let restored: Diagnostic = serde_json::from_str(&json).unwrap();
        assert_eq!(diagnostic, restored);
    }
}
