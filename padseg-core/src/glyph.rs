//! Seven-segment glyphs for the hexadecimal digits.
//!
//! Patterns are active-low: a cleared bit lights its segment.
//!
//! ```text
//!    a
//!   ---
//! f| g |b
//!   ---
//! e|   |c
//!   ---  .dp
//!    d
//! ```

/// Segment pattern that lights nothing.
pub const BLANK: u8 = 0xFF;

/// Digit encoding table, indexed by [`Symbol::index`].
///
/// Bit 0 = segment a, bit 6 = segment g, bit 7 = decimal point.
pub static DIGIT_ENCODING: [u8; Symbol::COUNT] = [
    0b1100_0000, // 0
    0b1111_1001, // 1
    0b1010_0100, // 2
    0b1011_0000, // 3
    0b1001_1001, // 4
    0b1001_0010, // 5
    0b1000_0010, // 6
    0b1111_1000, // 7
    0b1000_0000, // 8
    0b1001_0000, // 9
    0b1000_1000, // A
    0b1000_0011, // b
    0b1100_0110, // C
    0b1010_0001, // d
    0b1000_0110, // E
    0b1000_1110, // F
    BLANK,       // blank
];

/// Something a single digit can show.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Symbol {
    N0 = 0x0,
    N1 = 0x1,
    N2 = 0x2,
    N3 = 0x3,
    N4 = 0x4,
    N5 = 0x5,
    N6 = 0x6,
    N7 = 0x7,
    N8 = 0x8,
    N9 = 0x9,
    A = 0xA,
    B = 0xB,
    C = 0xC,
    D = 0xD,
    E = 0xE,
    F = 0xF,
    /// Nothing lit.
    Blank = 0x10,
}

impl Symbol {
    /// Number of symbols, blank included.
    pub const COUNT: usize = 17;

    /// Every symbol in table order.
    pub const ALL: [Symbol; Self::COUNT] = [
        Symbol::N0,
        Symbol::N1,
        Symbol::N2,
        Symbol::N3,
        Symbol::N4,
        Symbol::N5,
        Symbol::N6,
        Symbol::N7,
        Symbol::N8,
        Symbol::N9,
        Symbol::A,
        Symbol::B,
        Symbol::C,
        Symbol::D,
        Symbol::E,
        Symbol::F,
        Symbol::Blank,
    ];

    /// The symbol for a hex digit value, `None` above 0xF.
    pub fn hex(value: u8) -> Option<Symbol> {
        if value <= 0xF {
            Some(Self::ALL[value as usize])
        } else {
            None
        }
    }

    /// Parse a display character. Space is blank; hex letters in either case.
    pub fn from_char(c: char) -> Option<Symbol> {
        match c {
            ' ' => Some(Symbol::Blank),
            _ => c.to_digit(16).and_then(|v| Self::hex(v as u8)),
        }
    }

    /// The character that best matches how the glyph looks (`b` and `d` are lowercase).
    pub fn to_char(self) -> char {
        match self {
            Symbol::B => 'b',
            Symbol::D => 'd',
            Symbol::Blank => ' ',
            other => char::from_digit(other as u32, 16)
                .map(|c| c.to_ascii_uppercase())
                .unwrap_or(' '),
        }
    }

    /// Position in [`DIGIT_ENCODING`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Active-low segment pattern for this symbol.
    pub fn segments(self) -> u8 {
        DIGIT_ENCODING[self.index()]
    }
}

/// One bar of a seven-segment digit, plus the decimal point.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Segment {
    A = 0,
    B = 1,
    C = 2,
    D = 3,
    E = 4,
    F = 5,
    G = 6,
    Dp = 7,
}

impl Segment {
    pub const ALL: [Segment; 8] = [
        Segment::A,
        Segment::B,
        Segment::C,
        Segment::D,
        Segment::E,
        Segment::F,
        Segment::G,
        Segment::Dp,
    ];

    /// Check whether this segment is lit in an active-low pattern.
    pub fn is_lit(self, pattern: u8) -> bool {
        pattern & (1 << self as u8) == 0
    }
}
