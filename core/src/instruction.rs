use crate::error::{Error, Result};
use crate::opcode::DecodedOpcode;

/// The register-to-register operations selected by the last nibble of an 8XY_ opcode
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AluOp {
    /// Vx = Vy
    Assign,
    /// Vx |= Vy
    Or,
    /// Vx &= Vy
    And,
    /// Vx ^= Vy
    Xor,
    /// Vx += Vy; VF = carry
    Add,
    /// Vx -= Vy; VF = !borrow
    Sub,
    /// Vx = src >> 1; VF = shifted out bit
    ShiftRight,
    /// Vx = Vy - Vx; VF = !borrow
    SubReverse,
    /// Vx = src << 1; VF = shifted out bit
    ShiftLeft,
}

impl AluOp {
    fn from_nibble(n: u8) -> Option<Self> {
        match n {
            0x0 => Some(AluOp::Assign),
            0x1 => Some(AluOp::Or),
            0x2 => Some(AluOp::And),
            0x3 => Some(AluOp::Xor),
            0x4 => Some(AluOp::Add),
            0x5 => Some(AluOp::Sub),
            0x6 => Some(AluOp::ShiftRight),
            0x7 => Some(AluOp::SubReverse),
            0xE => Some(AluOp::ShiftLeft),
            _ => None,
        }
    }
}

/// A fully classified instruction.
///
/// Registers are indices into V0..VF, addresses are 12 bits wide.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Instruction {
    /// 00E0 - clear the display
    Clear,
    /// 00EE - return from subroutine
    Return,
    /// 0NNN - machine code routine; ignored
    Sys(u16),
    /// 1NNN - jump to NNN
    Jump(u16),
    /// 2NNN - call subroutine at NNN
    Call(u16),
    /// 3XNN - skip next if VX == NN
    SkipIfEqual(usize, u8),
    /// 4XNN - skip next if VX != NN
    SkipIfNotEqual(usize, u8),
    /// 5XY0 - skip next if VX == VY
    SkipIfRegistersEqual(usize, usize),
    /// 6XNN - VX = NN
    Set(usize, u8),
    /// 7XNN - VX += NN, no carry
    Add(usize, u8),
    /// 8XY_ - register to register arithmetic and logic
    Alu(AluOp, usize, usize),
    /// 9XY0 - skip next if VX != VY
    SkipIfRegistersNotEqual(usize, usize),
    /// ANNN - I = NNN
    SetIndex(u16),
    /// BNNN - jump to NNN + V0
    JumpWithOffset(u16),
    /// CXNN - VX = rand() & NN
    Random(usize, u8),
    /// DXYN - draw N rows of sprite data from I at (VX, VY)
    Draw(usize, usize, u8),
    /// EX9E - skip next if key VX is pressed
    SkipIfPressed(usize),
    /// EXA1 - skip next if key VX is not pressed
    SkipIfNotPressed(usize),
    /// FX07 - VX = delay timer
    ReadDelay(usize),
    /// FX0A - wait for a key press and store it in VX
    WaitForKey(usize),
    /// FX15 - delay timer = VX
    SetDelay(usize),
    /// FX18 - sound timer = VX
    SetSound(usize),
    /// FX1E - I += VX
    AddToIndex(usize),
    /// FX29 - I = address of the glyph for digit VX
    Glyph(usize),
    /// FX33 - store the decimal digits of VX at I, I+1, I+2
    Bcd(usize),
    /// FX55 - store V0..=VX from I
    StoreRegisters(usize),
    /// FX65 - load V0..=VX from I
    LoadRegisters(usize),
}

impl Instruction {
    /// Selects the Instruction for a given Opcode
    ///
    /// The first nibble picks the category; the 0, 8, E and F categories look
    /// at the last nibble or the low byte to pick the operation.
    pub fn decode(op: DecodedOpcode) -> Result<Self> {
        let (x, y) = op.reg_indices();
        let instruction = match op.nibbles() {
            (0x0, ..) => Some(Self::decode_system(op)),
            (0x1, ..) => Some(Instruction::Jump(op.addr())),
            (0x2, ..) => Some(Instruction::Call(op.addr())),
            (0x3, ..) => Some(Instruction::SkipIfEqual(x, op.kk())),
            (0x4, ..) => Some(Instruction::SkipIfNotEqual(x, op.kk())),
            (0x5, .., 0x0) => Some(Instruction::SkipIfRegistersEqual(x, y)),
            (0x6, ..) => Some(Instruction::Set(x, op.kk())),
            (0x7, ..) => Some(Instruction::Add(x, op.kk())),
            (0x8, .., n) => AluOp::from_nibble(n).map(|alu| Instruction::Alu(alu, x, y)),
            (0x9, .., 0x0) => Some(Instruction::SkipIfRegistersNotEqual(x, y)),
            (0xA, ..) => Some(Instruction::SetIndex(op.addr())),
            (0xB, ..) => Some(Instruction::JumpWithOffset(op.addr())),
            (0xC, ..) => Some(Instruction::Random(x, op.kk())),
            (0xD, .., n) => Some(Instruction::Draw(x, y, n)),
            (0xE, ..) => Self::decode_key(op),
            (0xF, ..) => Self::decode_misc(op),
            _ => None,
        };
        instruction.ok_or(Error::UnimplementedOpcode { opcode: op.raw() })
    }

    /// 0___: only the last nibble is checked, so 0x0120 clears and 0x012E
    /// returns just like 00E0 and 00EE. Everything else is skipped rather
    /// than faulted.
    fn decode_system(op: DecodedOpcode) -> Self {
        match op.n() {
            0x0 => Instruction::Clear,
            0xE => Instruction::Return,
            _ => Instruction::Sys(op.addr()),
        }
    }

    fn decode_key(op: DecodedOpcode) -> Option<Self> {
        match op.kk() {
            0x9E => Some(Instruction::SkipIfPressed(op.x())),
            0xA1 => Some(Instruction::SkipIfNotPressed(op.x())),
            _ => None,
        }
    }

    fn decode_misc(op: DecodedOpcode) -> Option<Self> {
        let x = op.x();
        match op.kk() {
            0x07 => Some(Instruction::ReadDelay(x)),
            0x0A => Some(Instruction::WaitForKey(x)),
            0x15 => Some(Instruction::SetDelay(x)),
            0x18 => Some(Instruction::SetSound(x)),
            0x1E => Some(Instruction::AddToIndex(x)),
            0x29 => Some(Instruction::Glyph(x)),
            0x33 => Some(Instruction::Bcd(x)),
            0x55 => Some(Instruction::StoreRegisters(x)),
            0x65 => Some(Instruction::LoadRegisters(x)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod test_instruction {
    use super::*;

    fn decode(raw: u16) -> Result<Instruction> {
        Instruction::decode(DecodedOpcode::from(raw))
    }

    fn assert_unimplemented(raw: u16) {
        match decode(raw) {
            Err(Error::UnimplementedOpcode { opcode }) => assert_eq!(opcode, raw),
            other => panic!("expected {:04X} to be unimplemented, got {:?}", raw, other),
        }
    }

    #[test]
    fn test_decodes_zero_prefix() {
        assert_eq!(decode(0x00E0).unwrap(), Instruction::Clear);
        assert_eq!(decode(0x00EE).unwrap(), Instruction::Return);
        assert_eq!(decode(0x0123).unwrap(), Instruction::Sys(0x123));
        assert_eq!(decode(0x0120).unwrap(), Instruction::Clear);
        assert_eq!(decode(0x012E).unwrap(), Instruction::Return);
    }

    #[test]
    fn test_decodes_addresses() {
        assert_eq!(decode(0x1ABC).unwrap(), Instruction::Jump(0xABC));
        assert_eq!(decode(0x2ABC).unwrap(), Instruction::Call(0xABC));
        assert_eq!(decode(0xAABC).unwrap(), Instruction::SetIndex(0xABC));
        assert_eq!(decode(0xBABC).unwrap(), Instruction::JumpWithOffset(0xABC));
    }

    #[test]
    fn test_decodes_immediates() {
        assert_eq!(decode(0x3122).unwrap(), Instruction::SkipIfEqual(0x1, 0x22));
        assert_eq!(decode(0x4122).unwrap(), Instruction::SkipIfNotEqual(0x1, 0x22));
        assert_eq!(decode(0x6122).unwrap(), Instruction::Set(0x1, 0x22));
        assert_eq!(decode(0x7122).unwrap(), Instruction::Add(0x1, 0x22));
        assert_eq!(decode(0xC1F0).unwrap(), Instruction::Random(0x1, 0xF0));
    }

    #[test]
    fn test_decodes_register_pairs() {
        assert_eq!(
            decode(0x5120).unwrap(),
            Instruction::SkipIfRegistersEqual(0x1, 0x2)
        );
        assert_eq!(
            decode(0x9120).unwrap(),
            Instruction::SkipIfRegistersNotEqual(0x1, 0x2)
        );
        assert_eq!(decode(0xD125).unwrap(), Instruction::Draw(0x1, 0x2, 0x5));
    }

    #[test]
    fn test_decodes_every_alu_op() {
        let ops = [
            (0x0, AluOp::Assign),
            (0x1, AluOp::Or),
            (0x2, AluOp::And),
            (0x3, AluOp::Xor),
            (0x4, AluOp::Add),
            (0x5, AluOp::Sub),
            (0x6, AluOp::ShiftRight),
            (0x7, AluOp::SubReverse),
            (0xE, AluOp::ShiftLeft),
        ];
        for (n, alu) in ops.iter() {
            let raw = 0x8AB0 | *n;
            assert_eq!(decode(raw).unwrap(), Instruction::Alu(*alu, 0xA, 0xB));
        }
    }

    #[test]
    fn test_decodes_key_ops() {
        assert_eq!(decode(0xE39E).unwrap(), Instruction::SkipIfPressed(0x3));
        assert_eq!(decode(0xE3A1).unwrap(), Instruction::SkipIfNotPressed(0x3));
    }

    #[test]
    fn test_decodes_misc_ops() {
        assert_eq!(decode(0xF407).unwrap(), Instruction::ReadDelay(0x4));
        assert_eq!(decode(0xF40A).unwrap(), Instruction::WaitForKey(0x4));
        assert_eq!(decode(0xF415).unwrap(), Instruction::SetDelay(0x4));
        assert_eq!(decode(0xF418).unwrap(), Instruction::SetSound(0x4));
        assert_eq!(decode(0xF41E).unwrap(), Instruction::AddToIndex(0x4));
        assert_eq!(decode(0xF429).unwrap(), Instruction::Glyph(0x4));
        assert_eq!(decode(0xF433).unwrap(), Instruction::Bcd(0x4));
        assert_eq!(decode(0xF455).unwrap(), Instruction::StoreRegisters(0x4));
        assert_eq!(decode(0xF465).unwrap(), Instruction::LoadRegisters(0x4));
    }

    #[test]
    fn test_rejects_unknown_sub_operations() {
        for raw in [0x5121, 0x9121, 0x8128, 0x812F, 0xE19F, 0xE100, 0xF100, 0xF1FF].iter() {
            assert_unimplemented(*raw);
        }
    }
}
