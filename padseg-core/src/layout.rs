//! Keypad layout: which symbol sits at each (row, column signal) position.
//!
//! The column bus is 4 bits wide and one-hot for a single pressed key, so
//! the table is indexed by the raw signal value (1, 2, 4 or 8) and every
//! other index holds the "no key" sentinel.

use crate::glyph::Symbol;
use crate::scan::Slot;
use crate::{COLUMN_SIGNALS, ROWS};

/// One of the four column lines, identified by its one-hot signal.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Column {
    Line0 = 0b0001,
    Line1 = 0b0010,
    Line2 = 0b0100,
    Line3 = 0b1000,
}

impl Column {
    pub const ALL: [Column; 4] = [Column::Line0, Column::Line1, Column::Line2, Column::Line3];

    /// Column for a one-hot signal value, `None` for anything else.
    pub fn from_bits(bits: u8) -> Option<Column> {
        match bits {
            0b0001 => Some(Column::Line0),
            0b0010 => Some(Column::Line1),
            0b0100 => Some(Column::Line2),
            0b1000 => Some(Column::Line3),
            _ => None,
        }
    }

    pub fn bits(self) -> u8 {
        self as u8
    }
}

/// A raw column read, classified.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ColumnSample {
    /// No column line asserted.
    Open,
    /// Exactly one line asserted.
    Single(Column),
    /// Several lines asserted at once; never decoded.
    Ghost(u8),
}

impl ColumnSample {
    /// Classify the low nibble of a column bus read.
    pub fn from_raw(raw: u8) -> ColumnSample {
        let bits = raw & 0x0F;
        match Column::from_bits(bits) {
            Some(column) => ColumnSample::Single(column),
            None if bits == 0 => ColumnSample::Open,
            None => ColumnSample::Ghost(bits),
        }
    }

    /// Raw bit pattern this sample was read as.
    pub fn bits(self) -> u8 {
        match self {
            ColumnSample::Open => 0,
            ColumnSample::Single(column) => column.bits(),
            ColumnSample::Ghost(bits) => bits,
        }
    }

    pub fn is_open(self) -> bool {
        self == ColumnSample::Open
    }
}

/// A physical key: the row it is scanned on and the column it pulls.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Key {
    pub row: Slot,
    pub column: Column,
}

impl Key {
    pub fn new(row: Slot, column: Column) -> Self {
        Self { row, column }
    }

    /// Decode through the layout table.
    pub fn symbol(self) -> Symbol {
        lookup(self.row, self.column)
    }
}

/// No key at this position.
const ___: Option<Symbol> = None;

const N0: Option<Symbol> = Some(Symbol::N0);
const N1: Option<Symbol> = Some(Symbol::N1);
const N2: Option<Symbol> = Some(Symbol::N2);
const N3: Option<Symbol> = Some(Symbol::N3);
const N4: Option<Symbol> = Some(Symbol::N4);
const N5: Option<Symbol> = Some(Symbol::N5);
const N6: Option<Symbol> = Some(Symbol::N6);
const N7: Option<Symbol> = Some(Symbol::N7);
const N8: Option<Symbol> = Some(Symbol::N8);
const N9: Option<Symbol> = Some(Symbol::N9);
const XA: Option<Symbol> = Some(Symbol::A);
const XB: Option<Symbol> = Some(Symbol::B);
const XC: Option<Symbol> = Some(Symbol::C);
const XD: Option<Symbol> = Some(Symbol::D);
const XE: Option<Symbol> = Some(Symbol::E);
const XF: Option<Symbol> = Some(Symbol::F);

const LAYOUT: [[Option<Symbol>; COLUMN_SIGNALS]; ROWS] = [
    //  0   1    2   3    4   5    6    7    8
    [___, XA, N3, ___, N2, ___, ___, ___, N1],
    [___, XB, N6, ___, N5, ___, ___, ___, N4],
    [___, XC, N9, ___, N8, ___, ___, ___, N7],
    [___, XD, XF, ___, N0, ___, ___, ___, XE],
];

/// Keypad layout, `[row][column signal]`.
///
/// Physical keypad, columns left to right are signals 8, 4, 2, 1:
///
/// ```text
/// 1 2 3 A
/// 4 5 6 b
/// 7 8 9 C
/// E 0 F d
/// ```
pub static KEYPAD_LAYOUT: [[Option<Symbol>; COLUMN_SIGNALS]; ROWS] = LAYOUT;

// Every one-hot column must decode on every row.
const _: () = {
    let mut row = 0;
    while row < ROWS {
        let mut line = 0;
        while line < 4 {
            assert!(LAYOUT[row][1 << line].is_some());
            line += 1;
        }
        row += 1;
    }
};

/// Symbol under the key at `row`/`column`.
pub fn lookup(row: Slot, column: Column) -> Symbol {
    match KEYPAD_LAYOUT[row.index()][column.bits() as usize] {
        Some(symbol) => symbol,
        None => unreachable!("one-hot columns are checked at compile time"),
    }
}

/// Find the key that produces `symbol`. Blank has no key.
pub fn position_of(symbol: Symbol) -> Option<Key> {
    Slot::ALL.iter().find_map(|&row| {
        Column::ALL
            .iter()
            .find(|&&column| lookup(row, column) == symbol)
            .map(|&column| Key::new(row, column))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn classifies_column_reads() {
        assert_eq!(ColumnSample::from_raw(0), ColumnSample::Open);
        assert_eq!(ColumnSample::from_raw(0b0100), ColumnSample::Single(Column::Line2));
        assert_eq!(ColumnSample::from_raw(0b0110), ColumnSample::Ghost(0b0110));
        // upper nibble is not part of the bus
        assert_eq!(ColumnSample::from_raw(0xF0), ColumnSample::Open);
    }

    #[test]
    fn sentinel_covers_non_one_hot_signals() {
        for row in KEYPAD_LAYOUT.iter() {
            for (signal, entry) in row.iter().enumerate() {
                let one_hot = Column::from_bits(signal as u8).is_some();
                assert_eq!(entry.is_some(), one_hot, "signal {}", signal);
            }
        }
    }

    #[test]
    fn row_one_second_line_is_six() {
        let row = Slot::new(1).unwrap();
        assert_eq!(lookup(row, Column::Line1), Symbol::N6);
        assert_eq!(lookup(row, Column::Line1).segments(), 0x82);
    }

    #[test]
    fn every_hex_digit_has_exactly_one_key() {
        for value in 0..16 {
            let symbol = Symbol::hex(value).unwrap();
            let key = position_of(symbol).expect("no key for symbol");
            assert_eq!(key.symbol(), symbol);
            let count = Slot::ALL
                .iter()
                .flat_map(|&row| Column::ALL.iter().map(move |&column| lookup(row, column)))
                .filter(|&s| s == symbol)
                .count();
            assert_eq!(count, 1);
        }
        assert_eq!(position_of(Symbol::Blank), None);
    }

    proptest! {
        #[test]
        fn decode_composition_stays_in_table(row in 0u8..4, line in 0usize..4) {
            let key = Key::new(Slot::new(row).unwrap(), Column::ALL[line]);
            let symbol = key.symbol();
            prop_assert!(symbol.index() < crate::glyph::DIGIT_ENCODING.len());
            prop_assert_ne!(symbol, Symbol::Blank);
            prop_assert_ne!(symbol.segments(), crate::glyph::BLANK);
        }
    }
}
