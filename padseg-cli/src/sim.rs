//! Host-side stand-in for the panel hardware.
//!
//! [`SimBus`] behaves like the real ports: the display latches whatever is
//! on the segment lines while a digit is selected, and the column lines
//! only show a key while its row is selected. A [`Script`] decides, tick by
//! tick, which key (if any) is making contact.

use embedded_hal::delay::DelayNs;
use log::{info, warn};
use padseg_core::{Bus, Config, DisplayBuffer, Key, Panel, Symbol, DIGITS};
use rand::Rng;

/// How long each scripted key stays down and up, in ticks.
#[derive(Copy, Clone, Debug)]
pub struct Timing {
    /// Solid contact after the press bounce.
    pub hold: usize,
    /// Solid release after the release bounce.
    pub gap: usize,
    /// Chatter at each edge.
    pub bounce: usize,
}

/// Per-tick contact timeline for the simulated keypad.
pub struct Script {
    contacts: Vec<Option<Key>>,
}

impl Script {
    /// Press `keys` one after another. Bounce windows flip the contact at random.
    pub fn new<R: Rng>(keys: &[Key], timing: Timing, rng: &mut R) -> Self {
        let mut contacts = Vec::new();
        for &key in keys {
            contacts.extend((0..timing.bounce).map(|_| rng.gen_bool(0.5).then_some(key)));
            contacts.extend((0..timing.hold).map(|_| Some(key)));
            contacts.extend((0..timing.bounce).map(|_| rng.gen_bool(0.5).then_some(key)));
            contacts.extend((0..timing.gap).map(|_| None));
        }
        Self { contacts }
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn contact(&self, tick: usize) -> Option<Key> {
        self.contacts.get(tick).copied().flatten()
    }
}

/// Ports of a simulated panel.
pub struct SimBus {
    /// Key currently making contact.
    pub contact: Option<Key>,
    /// What each digit was last lit with.
    pub latched: [u8; DIGITS],
    select: u8,
}

impl SimBus {
    pub fn new() -> Self {
        Self {
            contact: None,
            latched: [0xFF; DIGITS],
            select: 0xFF,
        }
    }

    fn selected(&self) -> Option<usize> {
        (0..DIGITS).find(|&row| self.select & (1 << row) == 0)
    }
}

impl Bus for SimBus {
    fn write_segments(&mut self, pattern: u8) {
        if let Some(digit) = self.selected() {
            self.latched[digit] = pattern;
        }
    }

    fn write_select(&mut self, lines: u8) {
        self.select = lines;
    }

    fn read_columns(&mut self) -> u8 {
        match (self.contact, self.selected()) {
            (Some(key), Some(row)) if key.row.index() == row => key.column.bits(),
            _ => 0,
        }
    }
}

/// Keeps simulated time instead of waiting.
#[derive(Default)]
pub struct SimClock {
    pub elapsed_ns: u64,
}

impl DelayNs for SimClock {
    fn delay_ns(&mut self, ns: u32) {
        self.elapsed_ns += ns as u64;
    }
}

/// Outcome of a simulation run.
pub struct Report {
    pub accepted: Vec<Symbol>,
    pub ticks: usize,
    pub elapsed_ns: u64,
    /// What the display physically showed at the end.
    pub latched: [u8; DIGITS],
    pub display: DisplayBuffer,
}

/// Drive a panel through `script`, plus one trailing scan pass so every
/// digit is refreshed with the final contents.
pub fn run(config: Config, initial: DisplayBuffer, script: &Script, tick_ns: u32) -> Report {
    let mut panel = Panel::with_display(config, initial);
    let mut bus = SimBus::new();
    let mut clock = SimClock::default();
    let mut accepted = Vec::new();

    let ticks = script.len() + DIGITS;
    for tick in 0..ticks {
        bus.contact = script.contact(tick);
        if let Some(symbol) = panel.tick(&mut bus, &mut clock) {
            info!("tick {}: accepted {}", tick, symbol.to_char());
            accepted.push(symbol);
        }
        clock.delay_ns(tick_ns);
    }

    Report {
        accepted,
        ticks,
        elapsed_ns: clock.elapsed_ns,
        latched: bus.latched,
        display: panel.display().clone(),
    }
}

/// Ticks of solid contact a press needs: the arming pass plus more than
/// `threshold` confirming passes, one per [`DIGITS`] ticks.
pub fn press_ticks(config: &Config) -> usize {
    DIGITS * (config.threshold as usize + 2)
}

/// Ticks of solid release a release needs: more than `threshold` open passes.
pub fn release_ticks(config: &Config) -> usize {
    DIGITS * (config.threshold as usize + 1)
}

/// Warn when the script cannot register keys at this threshold.
pub fn check_timing(config: &Config, timing: &Timing) {
    let press = press_ticks(config);
    if timing.hold < press {
        warn!(
            "hold of {} ticks is shorter than the {} a press needs at threshold {}",
            timing.hold, press, config.threshold
        );
    }
    let release = release_ticks(config);
    if timing.gap < release {
        warn!(
            "gap of {} ticks is shorter than the {} a release needs at threshold {}",
            timing.gap, release, config.threshold
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use padseg_core::layout::position_of;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn keys(text: &str) -> Vec<Key> {
        text.chars()
            .map(|c| position_of(Symbol::from_char(c).unwrap()).unwrap())
            .collect()
    }

    #[test]
    fn bus_only_reports_selected_row() {
        let mut bus = SimBus::new();
        bus.contact = keys("5").first().copied();
        let key = bus.contact.unwrap();

        bus.write_select(!(1 << key.row.index()));
        assert_eq!(bus.read_columns(), key.column.bits());

        bus.write_select(!(1 << ((key.row.index() + 1) % DIGITS)));
        assert_eq!(bus.read_columns(), 0);

        bus.write_select(0xFF);
        assert_eq!(bus.read_columns(), 0);
    }

    #[test]
    fn bouncy_typing_lands_every_key_once() {
        let config = Config::new(20, 5_000);
        let timing = Timing {
            hold: 200,
            gap: 200,
            bounce: 30,
        };
        let mut rng = StdRng::seed_from_u64(7);
        let script = Script::new(&keys("C0FE5"), timing, &mut rng);

        let report = run(config, DisplayBuffer::new(), &script, 50_000);

        let typed: String = report.accepted.iter().map(|s| s.to_char()).collect();
        assert_eq!(typed, "C0FE5");
        // fifth key wrapped around onto digit 0
        assert_eq!(report.display.patterns(), DisplayBuffer::with_text("50FE").unwrap().patterns());
        assert_eq!(&report.latched, report.display.patterns());
        assert_eq!(report.ticks, script.len() + DIGITS);
        assert_eq!(report.elapsed_ns, report.ticks as u64 * 55_000);
    }

    #[test]
    fn minimum_hold_and_gap_are_enough() {
        let config = Config::new(10, 0);
        assert_eq!(press_ticks(&config), 48);
        assert_eq!(release_ticks(&config), 44);

        let timing = Timing {
            hold: press_ticks(&config),
            gap: release_ticks(&config),
            bounce: 0,
        };
        let mut rng = StdRng::seed_from_u64(3);
        let script = Script::new(&keys("AAA"), timing, &mut rng);

        let report = run(config, DisplayBuffer::new(), &script, 0);
        let typed: String = report.accepted.iter().map(|s| s.to_char()).collect();
        assert_eq!(typed, "AAA");
    }

    #[test]
    fn taps_shorter_than_threshold_are_dropped() {
        let config = Config::new(50, 0);
        let timing = Timing {
            hold: 40,
            gap: 400,
            bounce: 0,
        };
        let mut rng = StdRng::seed_from_u64(1);
        let script = Script::new(&keys("123"), timing, &mut rng);

        let report = run(config, DisplayBuffer::with_text("76A0").unwrap(), &script, 0);
        assert!(report.accepted.is_empty());
        assert_eq!(report.display, DisplayBuffer::with_text("76A0").unwrap());
    }
}
