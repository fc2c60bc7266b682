mod halfkay;
mod ihex;
mod layout;
mod render;
mod sim;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use log::info;
use padseg_core::layout::position_of;
use padseg_core::{Config, DisplayBuffer, Key, Symbol};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use halfkay::Teensy;
use sim::{Script, Timing};

#[derive(Parser)]
#[command(name = "padseg-cli")]
#[command(about = "Keypad and 7-segment panel tools: simulator, layout sheet, firmware flasher")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Type keys on a simulated panel and show what the display ends up with
    Simulate(SimulateArgs),
    /// Write an HTML page showing the keypad layout and digit glyphs
    Layout {
        /// Output file
        #[arg(short, long, default_value = "layout.html")]
        output: PathBuf,
    },
    /// Flash a .hex firmware file to Teensy via HalfKay bootloader
    Flash {
        /// Path to the Intel HEX firmware file
        firmware: PathBuf,
        /// Wait for the bootloader instead of giving up when it is not there
        #[arg(long)]
        wait: bool,
    },
    /// Detect if a Teensy is connected in bootloader mode
    Detect,
}

#[derive(Args)]
struct SimulateArgs {
    /// Keys to press, in order (0-9, A-F; whitespace is ignored)
    #[arg(short, long)]
    keys: String,
    /// Confirming readings that must be exceeded for a press or release
    #[arg(long, default_value_t = Config::DEFAULT_THRESHOLD)]
    threshold: u16,
    /// Settle time between select and column read, in nanoseconds
    #[arg(long, default_value_t = Config::DEFAULT_SETTLE_NS)]
    settle_ns: u32,
    /// Extra time per tick, in microseconds
    #[arg(long, default_value_t = 50)]
    tick_us: u32,
    /// Ticks each key is held down after its press bounce
    #[arg(long, default_value_t = 1000)]
    hold: usize,
    /// Ticks between keys after the release bounce
    #[arg(long, default_value_t = 1000)]
    gap: usize,
    /// Ticks of contact bounce at every press and release
    #[arg(long, default_value_t = 40)]
    bounce: usize,
    /// Seed for the bounce generator
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Text already on the display before the first key
    #[arg(long, default_value = "")]
    initial: String,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Command::Simulate(args) => simulate(args)?,
        Command::Layout { output } => {
            fs::write(&output, layout::generate_html())
                .with_context(|| format!("writing {}", output.display()))?;
            println!("Layout written to {}", output.display());
        }
        Command::Flash { firmware, wait } => {
            let contents = fs::read_to_string(&firmware)
                .with_context(|| format!("reading {}", firmware.display()))?;
            let image = ihex::Image::parse(&contents).context("parsing Intel HEX file")?;

            println!(
                "Firmware: {} bytes at base address 0x{:04X}",
                image.bytes.len(),
                image.base
            );

            let teensy = match Teensy::find()? {
                Some(teensy) => teensy,
                None if wait => Teensy::wait(Duration::from_secs(120))?,
                None => bail!(
                    "Teensy bootloader not detected. Press the reset button on the Teensy \
                     and try again, or pass --wait."
                ),
            };

            teensy.program(&image)?;
            teensy.boot();
        }
        Command::Detect => {
            if halfkay::detect()? {
                println!("Teensy bootloader detected (HalfKay mode).");
            } else {
                println!("Teensy bootloader not detected.");
                println!("Press the reset button on the Teensy to enter bootloader mode.");
            }
        }
    }

    Ok(())
}

fn simulate(args: SimulateArgs) -> Result<()> {
    let keys = parse_keys(&args.keys)?;
    let initial = DisplayBuffer::with_text(&args.initial)
        .with_context(|| format!("cannot display {:?}", args.initial))?;

    let config = Config::new(args.threshold, args.settle_ns);
    let timing = Timing {
        hold: args.hold,
        gap: args.gap,
        bounce: args.bounce,
    };
    sim::check_timing(&config, &timing);

    let mut rng = StdRng::seed_from_u64(args.seed);
    let script = Script::new(&keys, timing, &mut rng);
    info!("simulating {} keys over {} ticks", keys.len(), script.len());

    let report = sim::run(config, initial, &script, args.tick_us.saturating_mul(1_000));

    let typed: Vec<String> = report.accepted.iter().map(|s| s.to_char().to_string()).collect();
    println!("Accepted: {}", typed.join(" "));
    println!();
    println!("{}", render::render(&report.latched));
    println!();
    println!(
        "{} ticks, {:.1} ms simulated",
        report.ticks,
        report.elapsed_ns as f64 / 1e6
    );

    if report.accepted.len() != keys.len() {
        log::warn!(
            "{} of {} keys registered; try a longer --hold/--gap or a lower --threshold",
            report.accepted.len(),
            keys.len()
        );
    }
    Ok(())
}

/// Map typed characters to the keys that produce them.
fn parse_keys(text: &str) -> Result<Vec<Key>> {
    text.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| {
            Symbol::from_char(c)
                .and_then(position_of)
                .with_context(|| format!("no key on the keypad for {:?}", c))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_map_through_layout() {
        let keys = parse_keys("1 a F").unwrap();
        let symbols: Vec<Symbol> = keys.iter().map(|k| k.symbol()).collect();
        assert_eq!(symbols, vec![Symbol::N1, Symbol::A, Symbol::F]);
    }

    #[test]
    fn unknown_key_is_an_error() {
        assert!(parse_keys("12G").is_err());
    }

    #[test]
    fn cli_parses_simulate_flags() {
        let cli = Cli::try_parse_from(["padseg-cli", "simulate", "--keys", "12", "--threshold", "7"])
            .unwrap();
        match cli.command {
            Command::Simulate(args) => {
                assert_eq!(args.keys, "12");
                assert_eq!(args.threshold, 7);
                assert_eq!(args.hold, 1000);
            }
            _ => panic!("expected simulate"),
        }
    }
}
