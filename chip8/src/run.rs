use std::error::Error;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use log::{error, info};
use sdl2::event::Event;
use sdl2::keyboard::Keycode;

use emu8_core::{Chip8, Config, Keypad, Status};
use emu8_display::Display;

use crate::keymap::keymap;

/// How long the frontend sleeps between polls (roughly 60 frames a second)
const FRAME_PERIOD: Duration = Duration::from_millis(16);

pub fn run(rom: &Path, config: Config, scale: u32) -> Result<(), Box<dyn Error>> {
    let keypad = Arc::new(Keypad::new());
    let mut chip8 = Chip8::new(config, keypad.clone());

    // Load ROM
    let file = File::open(rom)?;
    let mut reader = BufReader::new(file);
    chip8.load_rom(&mut reader)?;
    info!("loaded {}", rom.display());

    // Get SDL2 context
    let sdl = sdl2::init()?;
    let mut display = Display::new(&sdl, scale)?;
    let mut events = sdl.event_pump()?;

    let handle = chip8.spawn()?;
    let mut reported_halt = false;

    'event: loop {
        // Render the current frame if anything was drawn since the last one
        if let Some(frame) = handle.frame() {
            display.render(&frame)?;
        }

        // Handle input
        for event in events.poll_iter() {
            match event {
                Event::Quit { .. }
                | Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                } => break 'event,
                Event::KeyDown {
                    keycode: Some(key),
                    repeat: false,
                    ..
                } => {
                    if let Some(key) = keymap(key) {
                        keypad.press(key);
                        handle.key_down(key);
                    }
                }
                Event::KeyUp {
                    keycode: Some(key), ..
                } => {
                    if let Some(key) = keymap(key) {
                        keypad.release(key);
                    }
                }
                _ => continue,
            };
        }

        if let Status::Halted(err) = handle.status() {
            if !reported_halt {
                error!("machine halted: {}", err);
                reported_halt = true;
            }
        }

        std::thread::sleep(FRAME_PERIOD);
    }

    info!("exiting: {:?}", handle.stop());
    Ok(())
}
