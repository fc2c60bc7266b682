//! Test doubles for the hardware boundary.

use embedded_hal::delay::DelayNs;

use crate::scan::Bus;
use crate::DIGITS;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BusEvent {
    Segments(u8),
    Select(u8),
    Read(u8),
}

/// Records every port access and answers column reads per selected row.
pub struct RecordingBus {
    pub events: Vec<BusEvent>,
    /// Column bits each row reports while it is selected.
    pub columns: [u8; DIGITS],
    /// Last pattern written while each digit was selected.
    pub latched: [u8; DIGITS],
    select: u8,
}

impl Default for RecordingBus {
    fn default() -> Self {
        Self {
            events: Vec::new(),
            columns: [0; DIGITS],
            latched: [0xFF; DIGITS],
            select: 0xFF,
        }
    }
}

impl RecordingBus {
    pub fn with_columns(columns: [u8; DIGITS]) -> Self {
        Self {
            columns,
            ..Self::default()
        }
    }

    fn selected(&self) -> Option<usize> {
        (0..DIGITS).find(|&row| self.select & (1 << row) == 0)
    }
}

impl Bus for RecordingBus {
    fn write_segments(&mut self, pattern: u8) {
        self.events.push(BusEvent::Segments(pattern));
        if let Some(row) = self.selected() {
            self.latched[row] = pattern;
        }
    }

    fn write_select(&mut self, lines: u8) {
        self.events.push(BusEvent::Select(lines));
        self.select = lines;
    }

    fn read_columns(&mut self) -> u8 {
        let bits = self.selected().map_or(0, |row| self.columns[row]);
        self.events.push(BusEvent::Read(bits));
        bits
    }
}

/// Remembers every settle wait it was asked for.
#[derive(Default)]
pub struct RecordingDelay {
    pub waits: Vec<u32>,
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.waits.push(ns);
    }
}
