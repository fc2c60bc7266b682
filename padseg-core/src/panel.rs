//! One keypad, one display, one polling loop.

use embedded_hal::delay::DelayNs;

use crate::debounce::{Acquisition, State};
use crate::display::DisplayBuffer;
use crate::glyph::Symbol;
use crate::scan::{Bus, Sample, Scanner, Slot};

/// Tuning knobs for a [`Panel`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Confirming same-row readings that must be exceeded before a press or
    /// release is believed.
    pub threshold: u16,
    /// Wait between selecting a slot and reading its columns, in nanoseconds.
    pub settle_ns: u32,
}

impl Config {
    pub const DEFAULT_THRESHOLD: u16 = 100;
    pub const DEFAULT_SETTLE_NS: u32 = 5_000;

    pub const fn new(threshold: u16, settle_ns: u32) -> Self {
        Self {
            threshold,
            settle_ns,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Self::DEFAULT_THRESHOLD, Self::DEFAULT_SETTLE_NS)
    }
}

/// Scan cycle, debounce state machine and display buffer, owned together.
#[derive(Clone, Debug)]
pub struct Panel {
    scanner: Scanner,
    acquisition: Acquisition,
    display: DisplayBuffer,
}

impl Panel {
    pub const fn new(config: Config) -> Self {
        Self::with_display(config, DisplayBuffer::new())
    }

    /// Start with `display` already showing something.
    pub const fn with_display(config: Config, display: DisplayBuffer) -> Self {
        Self {
            scanner: Scanner::new(config.settle_ns),
            acquisition: Acquisition::new(config.threshold),
            display,
        }
    }

    /// One tick: refresh the current slot, then let the state machine look
    /// at what that slot's keypad row reported.
    pub fn tick<B, D>(&mut self, bus: &mut B, delay: &mut D) -> Option<Symbol>
    where
        B: Bus,
        D: DelayNs,
    {
        let sample = self.refresh(bus, delay);
        self.acquisition.step(sample, &mut self.display)
    }

    /// Refresh the current slot without acquiring keys.
    pub fn refresh<B, D>(&mut self, bus: &mut B, delay: &mut D) -> Sample
    where
        B: Bus,
        D: DelayNs,
    {
        self.scanner.refresh(bus, delay, &self.display)
    }

    pub fn display(&self) -> &DisplayBuffer {
        &self.display
    }

    pub fn state(&self) -> State {
        self.acquisition.state()
    }

    /// Slot the next tick will drive.
    pub fn slot(&self) -> Slot {
        self.scanner.slot()
    }

    pub fn config(&self) -> Config {
        Config::new(self.acquisition.threshold(), self.scanner.settle_ns())
    }
}
