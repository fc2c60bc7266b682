//! Port wiring for the keypad and the 4-digit display.
//!
//! Display digit `k` and keypad row `k` share select line `k`, so the whole
//! panel needs three ports:
//!
//! | Signal              | Pins      | Direction | Level      |
//! |---------------------|-----------|-----------|------------|
//! | Segments a-g, dp    | PB0-PB7   | output    | active-low |
//! | Digit / row select  | PD0-PD3   | output    | active-low |
//! | Keypad columns      | PF4-PF7   | input     | pull-up, pressed reads low |

use avr_device::atmega32u4::Peripherals;
use padseg_core::scan::Bus;

/// Select lines on PORTD.
const SELECT_PINS: u8 = 0x0F;
/// Column lines on PORTF.
const COLUMN_PINS: u8 = 0xF0;
/// Shift that brings PF4 down to bit 0.
const COLUMN_SHIFT: u8 = 4;

/// Set pin directions and park every output in its inactive state.
///
/// Must run once before the first scan.
pub fn init_gpio(dp: &Peripherals) {
    let portb = &dp.PORTB;
    let portd = &dp.PORTD;
    let portf = &dp.PORTF;

    // Segments: all outputs, driven high (blank)
    portb.portb.write(|w| unsafe { w.bits(0xFF) });
    portb.ddrb.write(|w| unsafe { w.bits(0xFF) });

    // Select lines: outputs, driven high (deselected)
    portd.portd.modify(|r, w| unsafe { w.bits(r.bits() | SELECT_PINS) });
    portd.ddrd.modify(|r, w| unsafe { w.bits(r.bits() | SELECT_PINS) });

    // Columns: inputs with pull-ups
    portf.ddrf.modify(|r, w| unsafe { w.bits(r.bits() & !COLUMN_PINS) });
    portf.portf.modify(|r, w| unsafe { w.bits(r.bits() | COLUMN_PINS) });
}

/// The three panel ports, register-backed.
pub struct PortBus<'a> {
    dp: &'a Peripherals,
}

impl<'a> PortBus<'a> {
    pub fn new(dp: &'a Peripherals) -> Self {
        Self { dp }
    }
}

impl Bus for PortBus<'_> {
    fn write_segments(&mut self, pattern: u8) {
        self.dp.PORTB.portb.write(|w| unsafe { w.bits(pattern) });
    }

    fn write_select(&mut self, lines: u8) {
        // Leave PD4-PD7 (board LED on PD6) alone
        self.dp.PORTD.portd.modify(|r, w| unsafe {
            w.bits((r.bits() & !SELECT_PINS) | (lines & SELECT_PINS))
        });
    }

    fn read_columns(&mut self) -> u8 {
        // Pull-ups hold open columns high; a pressed key pulls its line low
        let pinf = self.dp.PORTF.pinf.read().bits();
        (!pinf & COLUMN_PINS) >> COLUMN_SHIFT
    }
}
