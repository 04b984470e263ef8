use std::fmt;
use std::sync::atomic::{AtomicU16, Ordering};

use crate::error::{Error, Result};

/// # Keypad
/// Chip-8 input is generated with a hexadecimal keypad.
///
/// ```text
/// |1|2|3|C|
/// |4|5|6|D|
/// |7|8|9|E|
/// |A|0|B|F|
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Key(u8);

impl Key {
    pub const COUNT: u8 = 16;

    pub fn new(code: u8) -> Result<Self> {
        if code < Self::COUNT {
            Ok(Key(code))
        } else {
            Err(Error::InvalidKey { key: code })
        }
    }

    pub fn code(self) -> u8 {
        self.0
    }

    fn mask(self) -> u16 {
        1 << self.0
    }
}

impl TryFrom<u8> for Key {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self> {
        Key::new(code)
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key({:X})", self.0)
    }
}

/// What the machine needs to know about the keyboard.
///
/// Implementations are queried from the execution thread while the frontend
/// updates them from its own thread.
pub trait Keyboard: Send + Sync {
    fn is_pressed(&self, key: Key) -> bool;
}

/// Pressed state of all 16 keys, shared between the frontend and the machine
#[derive(Debug, Default)]
pub struct Keypad {
    pressed: AtomicU16,
}

impl Keypad {
    pub fn new() -> Self {
        Keypad {
            pressed: AtomicU16::new(0),
        }
    }

    pub fn press(&self, key: Key) {
        self.pressed.fetch_or(key.mask(), Ordering::AcqRel);
    }

    pub fn release(&self, key: Key) {
        self.pressed.fetch_and(!key.mask(), Ordering::AcqRel);
    }

    pub fn release_all(&self) {
        self.pressed.store(0, Ordering::Release);
    }
}

impl Keyboard for Keypad {
    fn is_pressed(&self, key: Key) -> bool {
        self.pressed.load(Ordering::Acquire) & key.mask() != 0
    }
}

#[cfg(test)]
mod test_keypad {
    use super::*;

    #[test]
    fn test_key_range() {
        assert_eq!(Key::new(0xF).unwrap().code(), 0xF);
        assert!(matches!(Key::new(0x10), Err(Error::InvalidKey { key: 0x10 })));
        assert!(Key::try_from(0xFF).is_err());
    }

    #[test]
    fn test_press_and_release() {
        let keypad = Keypad::new();
        let a = Key::new(0xA).unwrap();
        let b = Key::new(0xB).unwrap();
        assert!(!keypad.is_pressed(a));
        keypad.press(a);
        keypad.press(b);
        assert!(keypad.is_pressed(a));
        keypad.release(a);
        assert!(!keypad.is_pressed(a));
        assert!(keypad.is_pressed(b));
        keypad.release_all();
        assert!(!keypad.is_pressed(b));
    }
}
