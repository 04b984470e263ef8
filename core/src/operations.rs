use std::time::Instant;

use log::{debug, trace};

use crate::chip8::Chip8;
use crate::config::ShiftSource;
use crate::constants::{FLAG_REGISTER, FONT_ADDRESS, GLYPH_SIZE, INSTRUCTION_WIDTH, REGISTER_COUNT};
use crate::error::Result;
use crate::instruction::{AluOp, Instruction};
use crate::keypad::Key;
use crate::scheduler::Task;

/// Instruction semantics.
///
/// Every instruction is followed by a `INSTRUCTION_WIDTH` increment of the pc
/// in `Chip8::step`, so anything that sets the pc compensates for it here.
impl Chip8 {
    pub(crate) fn execute(&mut self, instruction: Instruction) -> Result<()> {
        match instruction {
            Instruction::Clear => self.clr(),
            Instruction::Return => self.rts()?,
            Instruction::Sys(addr) => self.sys(addr),
            Instruction::Jump(addr) => self.jump(addr),
            Instruction::Call(addr) => self.call(addr)?,
            Instruction::SkipIfEqual(x, kk) => self.skip_if(self.state.v[x] == kk),
            Instruction::SkipIfNotEqual(x, kk) => self.skip_if(self.state.v[x] != kk),
            Instruction::SkipIfRegistersEqual(x, y) => {
                self.skip_if(self.state.v[x] == self.state.v[y])
            }
            Instruction::Set(x, kk) => self.state.v[x] = kk,
            Instruction::Add(x, kk) => self.state.v[x] = self.state.v[x].wrapping_add(kk),
            Instruction::Alu(op, x, y) => self.alu(op, x, y),
            Instruction::SkipIfRegistersNotEqual(x, y) => {
                self.skip_if(self.state.v[x] != self.state.v[y])
            }
            Instruction::SetIndex(addr) => self.state.i = addr,
            Instruction::JumpWithOffset(addr) => self.jump(addr + u16::from(self.state.v[0x0])),
            Instruction::Random(x, kk) => self.state.v[x] = self.rng.next_byte() & kk,
            Instruction::Draw(x, y, n) => self.draw(x, y, n)?,
            Instruction::SkipIfPressed(x) => self.skpr(x)?,
            Instruction::SkipIfNotPressed(x) => self.skup(x)?,
            Instruction::ReadDelay(x) => self.state.v[x] = self.delay_timer.value(),
            Instruction::WaitForKey(x) => self.state.register_needing_key = Some(x),
            Instruction::SetDelay(x) => self.loads(x),
            Instruction::SetSound(x) => self.ld(x),
            Instruction::AddToIndex(x) => {
                self.state.i = self.state.i.wrapping_add(u16::from(self.state.v[x]))
            }
            Instruction::Glyph(x) => self.ldspr(x),
            Instruction::Bcd(x) => self.bcd(x)?,
            Instruction::StoreRegisters(x) => self.stor(x)?,
            Instruction::LoadRegisters(x) => self.read(x)?,
        }
        Ok(())
    }

    /// clear
    fn clr(&mut self) {
        self.display.clear();
    }

    /// PC = STACK.pop()
    fn rts(&mut self) -> Result<()> {
        self.state.pc = self.state.pop()?;
        Ok(())
    }

    /// 0NNN targets the host CPU; there's nothing to run
    fn sys(&mut self, addr: u16) {
        debug!(
            "ignoring machine code routine {:#05X} at {:#05X}",
            addr, self.state.pc
        );
    }

    /// PC = addr
    fn jump(&mut self, addr: u16) {
        self.state.pc = addr.wrapping_sub(INSTRUCTION_WIDTH);
    }

    /// STACK.push(PC); PC = addr
    fn call(&mut self, addr: u16) -> Result<()> {
        self.state.push(self.state.pc)?;
        self.jump(addr);
        Ok(())
    }

    /// if condition then pc += 2
    fn skip_if(&mut self, condition: bool) {
        if condition {
            self.state.pc = self.state.pc.wrapping_add(INSTRUCTION_WIDTH);
        }
    }

    /// 8XY_
    /// The result lands in Vx before VF is written, so VF as a destination
    /// ends up holding the flag.
    fn alu(&mut self, op: AluOp, x: usize, y: usize) {
        let vx = self.state.v[x];
        let vy = self.state.v[y];
        let shifted = match self.config.shift_source {
            ShiftSource::Vx => vx,
            ShiftSource::Vy => vy,
        };
        let (result, flag) = match op {
            AluOp::Assign => (vy, None),
            AluOp::Or => (vx | vy, None),
            AluOp::And => (vx & vy, None),
            AluOp::Xor => (vx ^ vy, None),
            AluOp::Add => {
                let (sum, carry) = vx.overflowing_add(vy);
                (sum, Some(u8::from(carry)))
            }
            AluOp::Sub => (vx.wrapping_sub(vy), Some(u8::from(vx >= vy))),
            AluOp::ShiftRight => (shifted >> 1, Some(shifted & 0x1)),
            AluOp::SubReverse => (vy.wrapping_sub(vx), Some(u8::from(vy >= vx))),
            AluOp::ShiftLeft => (shifted << 1, Some(shifted >> 7)),
        };
        self.state.v[x] = result;
        if let Some(flag) = flag {
            self.state.v[FLAG_REGISTER] = flag;
        }
    }

    /// Draw an n-byte sprite from I at (Vx, Vy); VF = collision
    fn draw(&mut self, x: usize, y: usize, n: u8) -> Result<()> {
        let (vx, vy) = (self.state.v[x], self.state.v[y]);
        let sprite = self.state.read(self.state.i, usize::from(n))?;
        let erased = self.display.draw(vx, vy, sprite);
        self.state.v[FLAG_REGISTER] = u8::from(erased);
        Ok(())
    }

    /// if key Vx is pressed then pc += 2
    fn skpr(&mut self, x: usize) -> Result<()> {
        let key = Key::new(self.state.v[x])?;
        self.skip_if(self.keyboard.is_pressed(key));
        Ok(())
    }

    /// if key Vx isn't pressed then pc += 2
    fn skup(&mut self, x: usize) -> Result<()> {
        let key = Key::new(self.state.v[x])?;
        self.skip_if(!self.keyboard.is_pressed(key));
        Ok(())
    }

    /// delay_timer = Vx
    fn loads(&mut self, x: usize) {
        if self.delay_timer.set(self.state.v[x]) {
            self.scheduler
                .schedule(Task::DelayTimer, Instant::now() + self.config.timer_period);
        }
    }

    /// sound_timer = Vx
    fn ld(&mut self, x: usize) {
        if self.sound_timer.set(self.state.v[x]) {
            trace!("sound on for {} ticks", self.state.v[x]);
            self.scheduler
                .schedule(Task::SoundTimer, Instant::now() + self.config.timer_period);
        }
    }

    /// I = location of sprite for digit Vx
    fn ldspr(&mut self, x: usize) {
        self.state.i = FONT_ADDRESS + GLYPH_SIZE * u16::from(self.state.v[x] & 0xF);
    }

    /// Store BCD representation of Vx in memory locations I, I+1, and I+2
    fn bcd(&mut self, x: usize) -> Result<()> {
        let value = self.state.v[x];
        let digits = [value / 100, value / 10 % 10, value % 10];
        self.state
            .write(self.state.i, digits.len())?
            .copy_from_slice(&digits);
        Ok(())
    }

    /// Store registers V0 through Vx in memory starting at location I
    fn stor(&mut self, x: usize) -> Result<()> {
        let registers = self.state.v;
        self.state
            .write(self.state.i, x + 1)?
            .copy_from_slice(&registers[..=x]);
        Ok(())
    }

    /// Read registers V0 through Vx from memory starting at location I
    fn read(&mut self, x: usize) -> Result<()> {
        let mut registers = [0; REGISTER_COUNT];
        registers[..=x].copy_from_slice(self.state.read(self.state.i, x + 1)?);
        self.state.v[..=x].copy_from_slice(&registers[..=x]);
        Ok(())
    }
}
