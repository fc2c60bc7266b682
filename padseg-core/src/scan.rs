//! Multiplexed scan/refresh: one digit and one keypad row per tick.
//!
//! Digit select line `k` doubles as keypad row `k`, so lighting a digit and
//! sampling the keypad row behind it happen in the same slot.

use embedded_hal::delay::DelayNs;

use crate::display::DisplayBuffer;
use crate::glyph::BLANK;
use crate::layout::ColumnSample;
use crate::DIGITS;

/// The active scan slot: one display digit and one keypad row (0-3).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Slot(u8);

impl Slot {
    pub const FIRST: Slot = Slot(0);

    /// All slots in scan order.
    pub const ALL: [Slot; DIGITS] = [Slot(0), Slot(1), Slot(2), Slot(3)];

    pub fn new(index: u8) -> Option<Slot> {
        if (index as usize) < DIGITS {
            Some(Slot(index))
        } else {
            None
        }
    }

    /// The slot after this one, wrapping from 3 back to 0.
    pub fn next(self) -> Slot {
        Slot((self.0 + 1) % DIGITS as u8)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Byte-wide hardware ports the scan cycle drives.
///
/// Outputs are active-low. Inputs are logical: a set bit means the column
/// line is asserted, whatever the electrical polarity.
pub trait Bus {
    /// Drive the 8 segment lines.
    fn write_segments(&mut self, pattern: u8);
    /// Drive the select lines; bits 0-3 are slots 0-3.
    fn write_select(&mut self, lines: u8);
    /// Read the column lines; only the low nibble is meaningful.
    fn read_columns(&mut self) -> u8;
}

/// Select-line byte for `slot`, or with every line released for `None`.
pub fn select_mask(slot: Option<Slot>) -> u8 {
    match slot {
        Some(slot) => !(1u8 << slot.0),
        None => 0xFF,
    }
}

/// What one slot of the scan saw.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Sample {
    /// Row the columns were read on.
    pub slot: Slot,
    pub columns: ColumnSample,
}

/// Owns the scan cursor and the settle time between select and read.
#[derive(Clone, Debug)]
pub struct Scanner {
    slot: Slot,
    settle_ns: u32,
}

impl Scanner {
    pub const fn new(settle_ns: u32) -> Self {
        Self {
            slot: Slot::FIRST,
            settle_ns,
        }
    }

    /// Slot the next refresh will drive.
    pub fn slot(&self) -> Slot {
        self.slot
    }

    pub fn settle_ns(&self) -> u32 {
        self.settle_ns
    }

    /// Run one slot of the cycle: release every line, select the current
    /// slot, show its digit, wait for the lines to settle, sample the
    /// keypad row, then move to the next slot.
    pub fn refresh<B, D>(&mut self, bus: &mut B, delay: &mut D, display: &DisplayBuffer) -> Sample
    where
        B: Bus,
        D: DelayNs,
    {
        let slot = self.slot;

        bus.write_segments(BLANK);
        bus.write_select(select_mask(None));

        bus.write_select(select_mask(Some(slot)));
        bus.write_segments(display.pattern(slot));

        delay.delay_ns(self.settle_ns);
        let columns = ColumnSample::from_raw(bus.read_columns());

        self.slot = slot.next();
        Sample { slot, columns }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glyph::Symbol;
    use crate::layout::Column;
    use crate::testing::{BusEvent, RecordingBus, RecordingDelay};
    use embedded_hal_mock::eh1::delay::NoopDelay;

    #[test]
    fn slot_wraps() {
        assert_eq!(Slot::new(3).unwrap().next(), Slot::FIRST);
        assert_eq!(Slot::new(4), None);
    }

    #[test]
    fn exactly_one_select_line_low() {
        assert_eq!(select_mask(None), 0xFF);
        for slot in Slot::ALL {
            let mask = select_mask(Some(slot));
            assert_eq!(mask.count_zeros(), 1);
            assert_eq!(mask & (1 << slot.index()), 0);
        }
    }

    #[test]
    fn refresh_follows_select_then_read_order() {
        let display = DisplayBuffer::from_symbols([Symbol::N7, Symbol::N6, Symbol::A, Symbol::N0]);
        let mut bus = RecordingBus::with_columns([0, 0b0010, 0, 0]);
        let mut scanner = Scanner::new(5_000);

        let first = scanner.refresh(&mut bus, &mut NoopDelay::new(), &display);
        assert_eq!(first.slot, Slot::FIRST);
        assert_eq!(first.columns, ColumnSample::Open);
        assert_eq!(
            bus.events,
            vec![
                BusEvent::Segments(0xFF),
                BusEvent::Select(0xFF),
                BusEvent::Select(0b1111_1110),
                BusEvent::Segments(Symbol::N7.segments()),
                BusEvent::Read(0),
            ]
        );

        let second = scanner.refresh(&mut bus, &mut NoopDelay::new(), &display);
        assert_eq!(second.slot.index(), 1);
        assert_eq!(second.columns, ColumnSample::Single(Column::Line1));
        assert_eq!(scanner.slot().index(), 2);
    }

    #[test]
    fn settle_delay_is_a_parameter() {
        let display = DisplayBuffer::new();
        let mut bus = RecordingBus::default();
        let mut delay = RecordingDelay::default();
        let mut scanner = Scanner::new(1_234);

        for _ in 0..4 {
            scanner.refresh(&mut bus, &mut delay, &display);
        }
        assert_eq!(delay.waits, vec![1_234; 4]);
        assert_eq!(scanner.slot(), Slot::FIRST);
    }

    #[test]
    fn every_slot_lit_once_per_pass() {
        let display = DisplayBuffer::with_text("1234").unwrap();
        let mut bus = RecordingBus::default();
        let mut scanner = Scanner::new(0);

        for _ in 0..4 {
            scanner.refresh(&mut bus, &mut NoopDelay::new(), &display);
        }
        assert_eq!(bus.latched, *display.patterns());
    }
}
