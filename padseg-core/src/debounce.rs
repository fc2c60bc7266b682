//! Debounced key acquisition.
//!
//! A press is only trusted after the row it was seen on has been scanned
//! again and again with the same column asserted; a release likewise needs
//! a run of open readings on that row. Samples from the other rows are
//! ignored until the machine is back in [`State::Idle`].
//!
//! ```text
//! Idle --single column--> Press --more than N matches--> Process
//!  ^                        |                                |
//!  +------ mismatch --------+                                v
//!  +------------- more than N open readings ------------- Release
//! ```

use crate::display::DisplayBuffer;
use crate::glyph::Symbol;
use crate::layout::{ColumnSample, Key};
use crate::scan::Sample;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum State {
    /// Waiting for any row to report a single column.
    Idle,
    /// Counting matching readings of `key`'s row.
    Press { key: Key, pulses: u16 },
    /// Accepted; decoded and written within the same step.
    Process { key: Key },
    /// Counting open readings of `key`'s row.
    Release { key: Key, pulses: u16 },
}

/// Debounce state machine for one keypad.
#[derive(Clone, Debug)]
pub struct Acquisition {
    state: State,
    threshold: u16,
}

impl Acquisition {
    /// `threshold` is the number of confirming readings that must be
    /// exceeded; it is clamped to `1..u16::MAX` so a count can always pass it.
    pub const fn new(threshold: u16) -> Self {
        let threshold = if threshold == 0 {
            1
        } else if threshold == u16::MAX {
            u16::MAX - 1
        } else {
            threshold
        };
        Self {
            state: State::Idle,
            threshold,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn threshold(&self) -> u16 {
        self.threshold
    }

    /// Drop any half-seen press or release.
    pub fn reset(&mut self) {
        self.state = State::Idle;
    }

    /// Feed one scan sample. Returns the symbol accepted on this tick, which
    /// has already been written to `display`.
    pub fn step(&mut self, sample: Sample, display: &mut DisplayBuffer) -> Option<Symbol> {
        self.state = self.advance(sample);

        if let State::Process { key } = self.state {
            let symbol = key.symbol();
            display.push(symbol);
            debug!("key {:?} at {:?} accepted", symbol, key);
            self.state = State::Release { key, pulses: 0 };
            return Some(symbol);
        }
        None
    }

    fn advance(&self, sample: Sample) -> State {
        match self.state {
            State::Idle => match sample.columns {
                ColumnSample::Single(column) => {
                    let key = Key::new(sample.slot, column);
                    trace!("press candidate {:?}", key);
                    State::Press { key, pulses: 0 }
                }
                _ => State::Idle,
            },
            State::Press { key, pulses } if sample.slot == key.row => {
                if sample.columns != ColumnSample::Single(key.column) {
                    trace!("press {:?} rejected, row read {:#06b}", key, sample.columns.bits());
                    return State::Idle;
                }
                let pulses = pulses + 1;
                if pulses > self.threshold {
                    State::Process { key }
                } else {
                    State::Press { key, pulses }
                }
            }
            State::Release { key, pulses } if sample.slot == key.row => {
                if !sample.columns.is_open() {
                    return State::Release { key, pulses: 0 };
                }
                let pulses = pulses + 1;
                if pulses > self.threshold {
                    debug!("key {:?} released", key);
                    State::Idle
                } else {
                    State::Release { key, pulses }
                }
            }
            // Another row's turn in the scan; no evidence either way.
            other => other,
        }
    }
}
