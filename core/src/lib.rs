//! A Chip-8 virtual machine that runs on its own thread.
//!
//! Build a [`Chip8`], load a program into it and [`Chip8::spawn`] it; the
//! returned [`MachineHandle`] reads the display and forwards key presses.

pub use chip8::Chip8;
pub use config::{Config, ShiftSource};
pub use display::{DisplayBuffer, FrameBuffer};
pub use error::{Error, Result};
pub use handle::{MachineHandle, Signal, Status};
pub use instruction::{AluOp, Instruction};
pub use keypad::{Key, Keyboard, Keypad};
pub use opcode::DecodedOpcode;
pub use timer::Timer;

mod chip8;
mod config;
pub mod constants;
mod display;
mod error;
mod handle;
mod instruction;
mod keypad;
mod opcode;
mod operations;
mod random;
mod scheduler;
mod state;
mod timer;
