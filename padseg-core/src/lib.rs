//! Shared keypad and seven-segment display logic.
//!
//! A 4×4 matrix keypad and a 4-digit multiplexed display hang off the same
//! four select lines. Every tick selects one slot, refreshes that digit and
//! samples the keypad row behind it; a debounce state machine turns those
//! samples into accepted keys that land in a 4-digit circular buffer.
//!
//! This crate is `no_std` so the AVR firmware and the host simulator run the
//! exact same state machine. Hardware is only reached through [`scan::Bus`]
//! and [`embedded_hal::delay::DelayNs`].

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod debounce;
pub mod display;
pub mod glyph;
pub mod layout;
pub mod panel;
pub mod scan;

#[cfg(test)]
mod testing;

/// Number of display digits, which is also the number of keypad rows.
pub const DIGITS: usize = 4;
/// Number of keypad rows (one per select line).
pub const ROWS: usize = DIGITS;
/// Number of raw column signal values the layout table is indexed by (0..=8).
pub const COLUMN_SIGNALS: usize = 9;

pub use debounce::{Acquisition, State};
pub use display::DisplayBuffer;
pub use glyph::Symbol;
pub use layout::{Column, ColumnSample, Key};
pub use panel::{Config, Panel};
pub use scan::{Bus, Sample, Scanner, Slot};
