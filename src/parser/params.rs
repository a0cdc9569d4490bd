//! Parameter accumulation for CSI sequences.
//!
//! CSI sequences carry decimal parameters separated by semicolons. Digits
//! are folded into the last parameter as they arrive, so the list is always
//! complete up to the byte just consumed. Absent parameters are resolved by
//! the command that reads them (almost always 1 for counts).

use std::fmt;

#[derive(Clone, Default, PartialEq, Eq)]
pub struct Params {
    values: Vec<u32>,
}

impl Params {
    pub fn new() -> Self {
        Self {
            values: Vec::with_capacity(16),
        }
    }

    /// Fold a decimal digit (`0..=9`) into the last parameter, creating it
    /// when the list is empty. Saturates instead of overflowing.
    pub fn push_digit(&mut self, digit: u8) {
        debug_assert!(digit <= 9);
        if self.values.is_empty() {
            self.values.push(0);
        }
        if let Some(last) = self.values.last_mut() {
            *last = last.saturating_mul(10).saturating_add(u32::from(digit));
        }
    }

    /// Handle a `;` separator. A leading separator materializes the empty
    /// first parameter as 0 before starting the next one.
    pub fn separator(&mut self) {
        if self.values.is_empty() {
            self.values.push(0);
        }
        self.values.push(0);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<u32> {
        self.values.get(index).copied()
    }

    pub fn get_or(&self, index: usize, default: u32) -> u32 {
        self.get(index).unwrap_or(default)
    }

    /// The first parameter, or `default` when no parameter was given
    pub fn first_or(&self, default: u32) -> u32 {
        self.get_or(0, default)
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.values
    }

    pub fn to_vec(&self) -> Vec<u32> {
        self.values.clone()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}

impl fmt::Debug for Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.values.iter()).finish()
    }
}
