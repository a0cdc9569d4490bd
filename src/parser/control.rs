//! Control character classification
//!
//! C0 controls (0x00-0x1F), DEL and the 8-bit CSI introducer have effects
//! that do not depend on the parser state, so they are recognized before
//! any state-specific dispatch.

use std::fmt;

/// A byte with a state-independent meaning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCode {
    /// BEL - Bell (no effect on text)
    Bell,
    /// BS - Backspace
    Backspace,
    /// HT - Horizontal Tab
    Tab,
    /// LF, VT, FF - all treated as CR + LF
    LineFeed,
    /// CR - Carriage Return
    CarriageReturn,
    /// SO - Shift Out (switch to G1 charset)
    ShiftOut,
    /// SI - Shift In (switch to G0 charset)
    ShiftIn,
    /// CAN, SUB - abort the sequence in progress
    Cancel,
    /// ESC - start an escape sequence
    Escape,
    /// DEL - ignored
    Delete,
    /// 0x9B - single-byte CSI
    Csi,
    /// Any other C0 control, which has no effect
    Other(u8),
}

impl ControlCode {
    /// Classify a raw byte, returning `None` for ordinary data bytes
    pub fn classify(byte: u8) -> Option<Self> {
        let code = match byte {
            0x07 => ControlCode::Bell,
            0x08 => ControlCode::Backspace,
            0x09 => ControlCode::Tab,
            0x0A..=0x0C => ControlCode::LineFeed,
            0x0D => ControlCode::CarriageReturn,
            0x0E => ControlCode::ShiftOut,
            0x0F => ControlCode::ShiftIn,
            0x18 | 0x1A => ControlCode::Cancel,
            0x1B => ControlCode::Escape,
            0x7F => ControlCode::Delete,
            0x9B => ControlCode::Csi,
            0x00..=0x1F => ControlCode::Other(byte),
            _ => return None,
        };
        Some(code)
    }
}

/// Printable rendering of a byte for diagnostics: caret notation for C0
/// controls, `DEL`, hex for bytes above 0x7E, the character otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caret(pub u8);

impl fmt::Display for Caret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            byte @ 0x00..=0x1F => write!(f, "^{}", char::from(byte + b'@')),
            0x7F => f.write_str("DEL"),
            byte @ 0x20..=0x7E => write!(f, "{}", char::from(byte)),
            byte => write!(f, "0x{:02X}", byte),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_printable() {
        assert_eq!(ControlCode::classify(b'A'), None);
        assert_eq!(ControlCode::classify(b' '), None);
        assert_eq!(ControlCode::classify(0x80), None);
        assert_eq!(ControlCode::classify(0xFF), None);
    }

    #[test]
    fn test_classify_line_feeds() {
        for byte in [0x0A, 0x0B, 0x0C] {
            assert_eq!(ControlCode::classify(byte), Some(ControlCode::LineFeed));
        }
    }

    #[test]
    fn test_classify_cancel_and_introducers() {
        assert_eq!(ControlCode::classify(0x18), Some(ControlCode::Cancel));
        assert_eq!(ControlCode::classify(0x1A), Some(ControlCode::Cancel));
        assert_eq!(ControlCode::classify(0x1B), Some(ControlCode::Escape));
        assert_eq!(ControlCode::classify(0x9B), Some(ControlCode::Csi));
        assert_eq!(ControlCode::classify(0x7F), Some(ControlCode::Delete));
    }

    #[test]
    fn test_classify_other_c0() {
        assert_eq!(ControlCode::classify(0x00), Some(ControlCode::Other(0x00)));
        assert_eq!(ControlCode::classify(0x1C), Some(ControlCode::Other(0x1C)));
    }

    #[test]
    fn test_caret_rendering() {
        assert_eq!(Caret(0x08).to_string(), "^H");
        assert_eq!(Caret(0x1B).to_string(), "^[");
        assert_eq!(Caret(0x7F).to_string(), "DEL");
        assert_eq!(Caret(b'q').to_string(), "q");
        assert_eq!(Caret(0xC3).to_string(), "0xC3");
    }
}
