use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use emu8_core::{Config, ShiftSource};

mod keymap;
mod run;

#[derive(Parser, Debug)]
#[command(version, about = "A Chip-8 emulator", long_about = None)]
struct Args {
    /// Path to the ROM to run
    rom: PathBuf,

    /// Instructions per second
    #[arg(long, default_value_t = 500)]
    clock_hz: u32,

    /// Shift Vy into Vx for 8XY6/8XYE instead of shifting Vx in place
    #[arg(long)]
    shift_vy: bool,

    /// Seed for CXNN, random when unset
    #[arg(long)]
    seed: Option<u64>,

    /// Window pixels per Chip-8 pixel
    #[arg(long, default_value_t = 10)]
    scale: u32,
}

impl Args {
    fn config(&self) -> Config {
        Config {
            clock_period: Duration::from_secs(1) / self.clock_hz.max(1),
            shift_source: if self.shift_vy {
                ShiftSource::Vy
            } else {
                ShiftSource::Vx
            },
            seed: self.seed,
            ..Config::default()
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    run::run(&args.rom, args.config(), args.scale)
}
