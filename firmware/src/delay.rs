//! Busy-wait delays calibrated for a 16 MHz ATmega32U4.

use embedded_hal::delay::DelayNs;

/// Approximate cost of one spin iteration: nop plus a 32-bit counter
/// compare/increment/branch, ~8 cycles at 16 MHz.
const NS_PER_SPIN: u32 = 500;

/// Spins the CPU. Cannot fail and cannot be interrupted early.
pub struct BusyDelay;

impl DelayNs for BusyDelay {
    fn delay_ns(&mut self, ns: u32) {
        let spins = ns / NS_PER_SPIN;
        for _ in 0..spins {
            unsafe { core::arch::asm!("nop") };
        }
    }
}
