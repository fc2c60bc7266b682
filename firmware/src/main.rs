//! Keypad-to-display firmware for ATmega32U4 (Teensy 2.0).
//!
//! A 4×4 keypad and a 4-digit 7-segment display share four select lines.
//! The main loop refreshes one digit per tick, samples the keypad row behind
//! it, and debounces presses into a scrolling 4-digit buffer:
//! - Multiplexed refresh, ~4 kHz per digit
//! - Press and release debouncing on the row that first reported the key
//! - Last four accepted keys shown, oldest overwritten

#![no_std]
#![no_main]
#![feature(asm_experimental_arch)]

mod delay;
mod ports;

use avr_device::atmega32u4::Peripherals;
use embedded_hal::delay::DelayNs;
use padseg_core::{Config, Panel};

use delay::BusyDelay;
use ports::PortBus;

/// Same-row readings that must be exceeded to accept a press or release.
/// One reading per full pass, so ~100 passes (~25ms) of stable contact.
const THRESHOLD: u16 = 100;

/// Settle time between selecting a slot and reading its columns.
const SETTLE_NS: u32 = 5_000;

/// Pause after each tick. Four ticks per pass keeps every digit well
/// above the 60 Hz flicker limit.
const TICK_DELAY_US: u32 = 50;

/// Nothing to report to on AVR; park the CPU.
#[panic_handler]
fn panic(_info: &core::panic::PanicInfo) -> ! {
    loop {}
}

/// Main entry point.
#[no_mangle]
pub extern "C" fn main() -> ! {
    let dp = unsafe { Peripherals::steal() };

    // Disable clock prescaler (CLKPR), run at the full 16MHz
    dp.CPU.clkpr.write(|w| w.clkpce().set_bit());
    dp.CPU.clkpr.write(|w| unsafe { w.bits(0) });

    disable_watchdog(&dp);

    // Board LED on PD6 for diagnostics
    dp.PORTD.ddrd.modify(|r, w| unsafe { w.bits(r.bits() | 0x40) });

    ports::init_gpio(&dp);

    let mut bus = PortBus::new(&dp);
    let mut delay = BusyDelay;
    let mut panel = new_panel();

    // LED on to indicate firmware is running
    dp.PORTD
        .portd
        .modify(|r, w| unsafe { w.bits(r.bits() | 0x40) });

    loop {
        if cfg!(feature = "static-display") {
            panel.refresh(&mut bus, &mut delay);
        } else {
            panel.tick(&mut bus, &mut delay);
        }

        delay.delay_us(TICK_DELAY_US);
    }
}

#[cfg(not(feature = "static-display"))]
fn new_panel() -> Panel {
    Panel::new(Config::new(THRESHOLD, SETTLE_NS))
}

#[cfg(feature = "static-display")]
fn new_panel() -> Panel {
    use padseg_core::{DisplayBuffer, Symbol};

    let message = DisplayBuffer::from_symbols([Symbol::N7, Symbol::N6, Symbol::A, Symbol::N0]);
    Panel::with_display(Config::new(THRESHOLD, SETTLE_NS), message)
}

/// Stop the watchdog a previous program or the bootloader may have left running.
fn disable_watchdog(dp: &Peripherals) {
    // WDRF in MCUSR overrides WDE, clear it first
    dp.CPU.mcusr.modify(|r, w| unsafe { w.bits(r.bits() & !0x08) });
    // Timed sequence: set WDCE|WDE, then clear everything within 4 cycles.
    // Only met with optimisation on, see the firmware dev profile.
    dp.WDT.wdtcsr.write(|w| unsafe { w.bits(0x18) });
    dp.WDT.wdtcsr.write(|w| unsafe { w.bits(0x00) });
}
