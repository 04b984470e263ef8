use std::time::Duration;

use crate::constants::{CLOCK_PERIOD, TIMER_PERIOD};

/// Which register the 8XY6 and 8XYE shifts read from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShiftSource {
    /// Shift Vx in place and ignore Vy (CHIP-48 and SUPER-CHIP behaviour)
    Vx,
    /// Shift Vy and store the result in Vx (COSMAC VIP behaviour)
    Vy,
}

/// Construction-time settings for a `Chip8`
#[derive(Clone, Debug)]
pub struct Config {
    /// Time between two instructions
    pub clock_period: Duration,
    /// Time between two decrements of the delay and sound timers
    pub timer_period: Duration,
    pub shift_source: ShiftSource,
    /// Fixed seed for CXNN; the OS is asked for one when unset
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            clock_period: CLOCK_PERIOD,
            timer_period: TIMER_PERIOD,
            shift_source: ShiftSource::Vx,
            seed: None,
        }
    }
}
