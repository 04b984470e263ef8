use crate::error::{Error, Result};

/// Number of nibbles in an opcode
pub const NIBBLE_COUNT: usize = 4;

const NIBBLE_BITS: usize = 4;

/// # Opcodes
///
/// Chip-8 opcodes are 16 bits each. Their behavior is cased on some combination of:
/// - `(n, _, _, _)` broad categorization; applies to all opcodes
/// - `(_, _, _, n)` specific behavior within a category
/// - `(_, _, n, n)` more specific behavior within a category
///
/// Nibbles not used to determine the operation often (but not always) carry important data.
/// - `(_, n, n, n)` represent a 12-bit address
/// - `(_, _, n, n)` encodes some data that is assigned to and/or compared with Vx
/// - `(_, n, _, _)` refers either to the register Vx or a range of registers V0..Vx
/// - `(_, _, n, _)` refers to the the register Vy
///
/// Nibbles are stored most significant first, so `nibbles[0]` is the category.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecodedOpcode {
    nibbles: [u8; NIBBLE_COUNT],
}

impl From<u16> for DecodedOpcode {
    fn from(op: u16) -> Self {
        DecodedOpcode {
            nibbles: [
                ((op & 0xF000) >> 12) as u8,
                ((op & 0x0F00) >> 8) as u8,
                ((op & 0x00F0) >> 4) as u8,
                (op & 0x000F) as u8,
            ],
        }
    }
}

impl DecodedOpcode {
    /// Returns the Opcode's component nibbles.
    pub fn nibbles(&self) -> (u8, u8, u8, u8) {
        let [a, b, c, d] = self.nibbles;
        (a, b, c, d)
    }

    /// The Opcode's first nibble.
    /// `[p___]`
    pub fn prefix(&self) -> u8 {
        self.nibbles[0]
    }

    /// The Opcode's second nibble.
    /// `[_x__]`
    pub fn x(&self) -> usize {
        usize::from(self.nibbles[1])
    }

    /// The Opcode's third nibble.
    /// `[__y_]`
    pub fn y(&self) -> usize {
        usize::from(self.nibbles[2])
    }

    /// The Opcode's fourth nibble.
    /// `[___n]`
    pub fn n(&self) -> u8 {
        self.nibbles[3]
    }

    /// The register pair `(x, y)` most two-register instructions operate on.
    pub fn reg_indices(&self) -> (usize, usize) {
        (self.x(), self.y())
    }

    /// The Opcode's least significant byte.
    /// `[__kk]`
    pub fn kk(&self) -> u8 {
        self.low(2) as u8
    }

    /// The Opcode without its most significant nibble.
    /// `[_adr]`
    pub fn addr(&self) -> u16 {
        self.low(3)
    }

    /// The whole opcode.
    pub fn raw(&self) -> u16 {
        self.low(NIBBLE_COUNT)
    }

    /// Reassembles the `count` least significant nibbles into an integer.
    pub fn to_u16(&self, count: usize) -> Result<u16> {
        if count > NIBBLE_COUNT {
            return Err(Error::InvalidNibbleCount { count });
        }
        Ok(self.low(count))
    }

    fn low(&self, count: usize) -> u16 {
        self.nibbles[NIBBLE_COUNT - count..]
            .iter()
            .fold(0, |acc, &nibble| acc << NIBBLE_BITS | u16::from(nibble))
    }
}
