use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::constants::{DISPLAY_HEIGHT, DISPLAY_WIDTH};

/// The FrameBuffer is indexed as [y][x]; `true` is a lit pixel
pub type FrameBuffer = [[bool; DISPLAY_WIDTH]; DISPLAY_HEIGHT];

/// # Display buffer
///
/// The 64x32 monochrome screen the machine draws to.
///
/// Only the execution thread mutates it. Any other thread reads it through
/// `snapshot`, which copies the whole grid under the lock, or `frame`, which
/// additionally reports `None` when nothing was drawn since the last call.
#[derive(Debug)]
pub struct DisplayBuffer {
    pixels: Mutex<FrameBuffer>,
    dirty: AtomicBool,
}

impl DisplayBuffer {
    pub fn new() -> Self {
        DisplayBuffer {
            pixels: Mutex::new([[false; DISPLAY_WIDTH]; DISPLAY_HEIGHT]),
            dirty: AtomicBool::new(true),
        }
    }

    pub fn width(&self) -> usize {
        DISPLAY_WIDTH
    }

    pub fn height(&self) -> usize {
        DISPLAY_HEIGHT
    }

    /// A copy of every pixel
    pub fn snapshot(&self) -> FrameBuffer {
        *self.lock()
    }

    /// Returns the FrameBuffer if the display should be redrawn
    pub fn frame(&self) -> Option<FrameBuffer> {
        let pixels = self.lock();
        if self.dirty.swap(false, Ordering::AcqRel) {
            Some(*pixels)
        } else {
            None
        }
    }

    pub(crate) fn clear(&self) {
        *self.lock() = [[false; DISPLAY_WIDTH]; DISPLAY_HEIGHT];
        self.dirty.store(true, Ordering::Release);
    }

    /// XORs a sprite onto the display with its top left corner at `x`, `y`.
    ///
    /// Each byte of `sprite` is one row, most significant bit leftmost. Pixels
    /// at or past the right and bottom edges are dropped; nothing wraps, so an
    /// origin off the screen draws nothing.
    ///
    /// Returns whether any lit pixel was erased.
    pub(crate) fn draw(&self, x: u8, y: u8, sprite: &[u8]) -> bool {
        let (x, y) = (usize::from(x), usize::from(y));
        if x >= DISPLAY_WIDTH || y >= DISPLAY_HEIGHT {
            return false;
        }
        let mut erased = false;
        {
            let mut pixels = self.lock();
            for (row, &byte) in (y..DISPLAY_HEIGHT).zip(sprite.iter()) {
                for (column, bit) in (x..DISPLAY_WIDTH).zip(0..8u8) {
                    if (byte >> (7 - bit)) & 0x1 == 0x1 {
                        let pixel = &mut pixels[row][column];
                        erased |= *pixel;
                        *pixel = !*pixel;
                    }
                }
            }
        }
        self.dirty.store(true, Ordering::Release);
        erased
    }

    fn lock(&self) -> MutexGuard<'_, FrameBuffer> {
        self.pixels.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for DisplayBuffer {
    fn default() -> Self {
        Self::new()
    }
}
