//! The four digits currently shown, as a circular buffer of segment patterns.

use crate::glyph::{Symbol, BLANK};
use crate::scan::Slot;
use crate::DIGITS;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplayBuffer {
    patterns: [u8; DIGITS],
    /// Digit the next accepted key is written to.
    cursor: Slot,
}

impl DisplayBuffer {
    /// All digits blank, cursor on digit 0.
    pub const fn new() -> Self {
        Self {
            patterns: [BLANK; DIGITS],
            cursor: Slot::FIRST,
        }
    }

    /// Preload a fixed message. The cursor stays on digit 0.
    pub fn from_symbols(symbols: [Symbol; DIGITS]) -> Self {
        let mut buffer = Self::new();
        for (pattern, symbol) in buffer.patterns.iter_mut().zip(symbols) {
            *pattern = symbol.segments();
        }
        buffer
    }

    /// Preload from text such as `"76A0"`. Missing digits are blank, extra
    /// characters are ignored, and `None` is returned for an undisplayable character.
    pub fn with_text(text: &str) -> Option<Self> {
        let mut symbols = [Symbol::Blank; DIGITS];
        for (slot, c) in symbols.iter_mut().zip(text.chars()) {
            *slot = Symbol::from_char(c)?;
        }
        Some(Self::from_symbols(symbols))
    }

    /// Write `symbol` at the cursor and advance it, overwriting the oldest digit.
    ///
    /// Returns the digit that was written.
    pub fn push(&mut self, symbol: Symbol) -> Slot {
        let written = self.cursor;
        self.patterns[written.index()] = symbol.segments();
        self.cursor = written.next();
        written
    }

    pub fn pattern(&self, slot: Slot) -> u8 {
        self.patterns[slot.index()]
    }

    pub fn patterns(&self) -> &[u8; DIGITS] {
        &self.patterns
    }

    pub fn cursor(&self) -> Slot {
        self.cursor
    }

    /// Blank every digit and rewind the cursor.
    pub fn clear(&mut self) {
        *self = Self::new();
    }
}

impl Default for DisplayBuffer {
    fn default() -> Self {
        Self::new()
    }
}
