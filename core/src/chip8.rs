use std::io::Read;
use std::sync::mpsc::{Receiver, RecvTimeoutError, TryRecvError};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Instant;

use log::{debug, error, info, trace};

use crate::config::Config;
use crate::constants::INSTRUCTION_WIDTH;
use crate::display::DisplayBuffer;
use crate::error::{Error, Result};
use crate::handle::{MachineHandle, Signal, Status};
use crate::instruction::Instruction;
use crate::keypad::{Key, Keyboard};
use crate::opcode::DecodedOpcode;
use crate::random::RandomByteSource;
use crate::scheduler::{Scheduler, Task};
use crate::state::State;
use crate::timer::Timer;

/// # Chip-8
/// Chip-8 is a virtual machine and corresponding interpreted language.
///
/// Tracks:
///  - current `state`
///  - the `display` it draws to, shared with whoever renders it
///  - the delay and sound timers
///  - a `keyboard` it can query but never changes
///
/// Supplies interfaces for:
/// - loading roms
/// - stepping the CPU one instruction at a time
/// - running on its own thread, paced by a scheduler, via `spawn`
pub struct Chip8 {
    pub(crate) state: State,
    pub(crate) display: Arc<DisplayBuffer>,
    pub(crate) delay_timer: Timer,
    pub(crate) sound_timer: Timer,
    pub(crate) keyboard: Arc<dyn Keyboard>,
    pub(crate) rng: RandomByteSource,
    pub(crate) scheduler: Scheduler,
    pub(crate) config: Config,
    status: Arc<Mutex<Status>>,
}

impl Chip8 {
    pub fn new(config: Config, keyboard: Arc<dyn Keyboard>) -> Self {
        let rng = match config.seed {
            Some(seed) => RandomByteSource::seeded(seed),
            None => RandomByteSource::from_os(),
        };
        Chip8 {
            state: State::new(),
            display: Arc::new(DisplayBuffer::new()),
            delay_timer: Timer::new(),
            sound_timer: Timer::new(),
            keyboard,
            rng,
            scheduler: Scheduler::new(),
            config,
            status: Arc::new(Mutex::new(Status::Stopped)),
        }
    }

    /// Copy a program into memory at 0x200
    pub fn load_program(&mut self, program: &[u8]) -> Result<()> {
        self.state.load_program(program)?;
        debug!("loaded {} byte program", program.len());
        Ok(())
    }

    /// Load a rom from a source file
    ///
    /// # Arguments
    /// * `reader` a file reader that contains a ROM
    pub fn load_rom(&mut self, reader: &mut dyn Read) -> Result<()> {
        let mut program = Vec::new();
        reader.read_to_end(&mut program)?;
        self.load_program(&program)
    }

    pub fn display(&self) -> Arc<DisplayBuffer> {
        Arc::clone(&self.display)
    }

    pub fn delay_timer(&self) -> &Timer {
        &self.delay_timer
    }

    pub fn sound_timer(&self) -> &Timer {
        &self.sound_timer
    }

    /// The register FX0A will store the next key press in, if it's waiting
    pub fn awaiting_key(&self) -> Option<usize> {
        self.state.register_needing_key
    }

    /// Advances the CPU by a single instruction
    /// - does nothing while awaiting a keypress
    /// - fetches, decodes and executes the opcode at the pc, then moves past it
    pub fn step(&mut self) -> Result<()> {
        if self.state.register_needing_key.is_some() {
            return Ok(());
        }
        let op = DecodedOpcode::from(self.state.fetch()?);
        trace!(
            "{:04X} v{:02X?} i{:04X} pc{:04X}",
            op.raw(),
            self.state.v,
            self.state.i,
            self.state.pc
        );
        let instruction = Instruction::decode(op)?;
        self.execute(instruction)?;
        self.state.pc = self.state.pc.wrapping_add(INSTRUCTION_WIDTH);
        Ok(())
    }

    /// Resolve a pending FX0A with `key`
    ///
    /// Returns false when no instruction was waiting; the press is dropped.
    pub fn key_press(&mut self, key: Key) -> bool {
        match self.state.register_needing_key.take() {
            Some(register) => {
                self.state.v[register] = key.code();
                true
            }
            None => false,
        }
    }

    /// Starts the clock and moves the machine onto its own thread.
    pub fn spawn(mut self) -> std::io::Result<MachineHandle> {
        let (sender, receiver) = std::sync::mpsc::channel();
        let display = self.display();
        let status = Arc::clone(&self.status);
        self.set_status(Status::Running);
        self.scheduler.schedule(Task::Cycle, Instant::now());
        let thread = thread::Builder::new()
            .name("emu8-cpu".to_string())
            .spawn(move || self.run(receiver))?;
        Ok(MachineHandle::new(sender, thread, display, status))
    }

    /// The event loop: fires whichever task is due next until nothing is
    /// scheduled, handling signals as they arrive.
    ///
    /// Blocks on the channel while a key press is awaited with no timer running.
    pub fn run(&mut self, signals: Receiver<Signal>) {
        debug!("starting at {:#05X}", self.state.pc);
        loop {
            loop {
                match signals.try_recv() {
                    Ok(signal) => self.handle_signal(signal),
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        self.shutdown();
                        return;
                    }
                }
            }
            let (task, due) = match self.scheduler.next_due() {
                Some(next) => next,
                None if self.state.register_needing_key.is_some() => {
                    match signals.recv() {
                        Ok(signal) => self.handle_signal(signal),
                        Err(_) => self.shutdown(),
                    }
                    continue;
                }
                None => break,
            };
            let now = Instant::now();
            if due > now {
                match signals.recv_timeout(due - now) {
                    Ok(signal) => {
                        self.handle_signal(signal);
                        continue;
                    }
                    Err(RecvTimeoutError::Timeout) => {}
                    Err(RecvTimeoutError::Disconnected) => {
                        self.shutdown();
                        return;
                    }
                }
            }
            self.fire(task, due);
        }
        debug!("event loop finished");
    }

    /// Runs `task`, which was due at `due`, and reschedules its chain
    pub(crate) fn fire(&mut self, task: Task, due: Instant) {
        self.scheduler.cancel(task);
        match task {
            Task::Cycle => match self.step() {
                Ok(()) => match self.state.register_needing_key {
                    Some(register) => {
                        debug!("waiting for a key press into V{:X}", register);
                        self.set_status(Status::AwaitingKey { register });
                    }
                    None => self
                        .scheduler
                        .schedule(Task::Cycle, due + self.config.clock_period),
                },
                Err(err) => self.halt(err),
            },
            Task::DelayTimer => {
                if self.delay_timer.tick() {
                    self.scheduler
                        .schedule(Task::DelayTimer, due + self.config.timer_period);
                }
            }
            Task::SoundTimer => {
                if self.sound_timer.tick() {
                    self.scheduler
                        .schedule(Task::SoundTimer, due + self.config.timer_period);
                } else {
                    trace!("sound off");
                }
            }
        }
    }

    pub(crate) fn handle_signal(&mut self, signal: Signal) {
        match signal {
            Signal::KeyDown(key) => {
                if self.key_press(key) {
                    trace!("{:?} resumes execution", key);
                    self.scheduler
                        .schedule(Task::Cycle, Instant::now() + self.config.clock_period);
                    self.set_status(Status::Running);
                }
            }
            Signal::Stop => self.shutdown(),
        }
    }

    fn halt(&mut self, err: Error) {
        error!("halted at {:#05X}: {}", self.state.pc, err);
        self.cancel_chains();
        self.set_status(Status::Halted(Arc::new(err)));
    }

    fn shutdown(&mut self) {
        self.cancel_chains();
        let mut status = self.status.lock().unwrap_or_else(PoisonError::into_inner);
        if !matches!(*status, Status::Halted(_)) {
            info!("stopped at {:#05X}", self.state.pc);
            *status = Status::Stopped;
        }
    }

    fn cancel_chains(&mut self) {
        self.scheduler.cancel_all();
        self.delay_timer.cancel();
        self.sound_timer.cancel();
        self.state.register_needing_key = None;
    }

    fn set_status(&self, status: Status) {
        *self.status.lock().unwrap_or_else(PoisonError::into_inner) = status;
    }

    #[cfg(test)]
    pub(crate) fn status(&self) -> Status {
        self.status
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod test_chip8 {
    use std::io::Cursor;
    use std::sync::mpsc::channel;
    use std::time::Duration;

    use crate::constants::MAX_PROGRAM_SIZE;
    use crate::keypad::Keypad;

    use super::*;

    fn chip8() -> Chip8 {
        Chip8::new(Config::default(), Arc::new(Keypad::new()))
    }

    fn key(code: u8) -> Key {
        Key::new(code).unwrap()
    }

    #[test]
    fn test_loads_rom() {
        let mut chip8 = chip8();
        let mut rom = Cursor::new(vec![0x12, 0x00]);
        chip8.load_rom(&mut rom).unwrap();
        assert_eq!(chip8.state.memory[0x200..0x202], [0x12, 0x00]);
    }

    #[test]
    fn test_rejects_oversized_rom() {
        let mut chip8 = chip8();
        let mut rom = Cursor::new(vec![0x0; MAX_PROGRAM_SIZE + 1]);
        assert!(matches!(
            chip8.load_rom(&mut rom),
            Err(Error::ProgramTooLarge { .. })
        ));
    }

    #[test]
    fn test_cycles_while_no_register_needs_key() {
        let mut chip8 = chip8();
        let starting_pc = chip8.state.pc;
        chip8.state.memory[0x200..0x202].copy_from_slice(&[0x00, 0xE0]);
        chip8.step().unwrap();
        assert_eq!(chip8.state.pc, starting_pc + 0x2);
    }

    #[test]
    fn test_doesnt_cycle_while_register_needs_key() {
        let mut chip8 = chip8();
        let starting_pc = chip8.state.pc;
        chip8.state.register_needing_key = Some(0x1);
        chip8.step().unwrap();
        assert_eq!(chip8.state.pc, starting_pc);
    }

    #[test]
    fn test_captures_key_presses() {
        let mut chip8 = chip8();
        chip8.state.register_needing_key = Some(0x1);
        assert!(chip8.key_press(key(0xE)));
        assert_eq!(chip8.state.register_needing_key, None);
        assert_eq!(chip8.state.v[0x1], 0xE);
    }

    #[test]
    fn test_ignores_key_presses_when_not_waiting() {
        let mut chip8 = chip8();
        assert!(!chip8.key_press(key(0xE)));
        assert_eq!(chip8.state.v, [0; 16]);
    }

    #[test]
    fn test_cycle_reschedules_itself() {
        let mut chip8 = chip8();
        chip8.state.memory[0x200..0x202].copy_from_slice(&[0x12, 0x00]);
        let start = Instant::now();
        chip8.fire(Task::Cycle, start);
        assert_eq!(
            chip8.scheduler.next_due(),
            Some((Task::Cycle, start + chip8.config.clock_period))
        );
    }

    #[test]
    fn test_delay_timer_chain_stops_at_zero() {
        let mut chip8 = chip8();
        let start = Instant::now();
        assert!(chip8.delay_timer.set(3));
        let mut due = start;
        for _ in 0..3 {
            chip8.fire(Task::DelayTimer, due);
            due += chip8.config.timer_period;
        }
        assert_eq!(chip8.delay_timer().value(), 0);
        assert!(!chip8.scheduler.is_scheduled(Task::DelayTimer));
        assert!(chip8.scheduler.is_idle());
    }

    #[test]
    fn test_waiting_for_key_parks_the_clock_but_not_the_timers() {
        let mut chip8 = chip8();
        // F115 F20A
        chip8.state.memory[0x200..0x204].copy_from_slice(&[0xF1, 0x15, 0xF2, 0x0A]);
        chip8.state.v[0x1] = 0x5;
        let start = Instant::now();
        chip8.fire(Task::Cycle, start);
        chip8.fire(Task::Cycle, start + chip8.config.clock_period);
        assert!(matches!(chip8.status(), Status::AwaitingKey { register: 2 }));
        assert!(!chip8.scheduler.is_scheduled(Task::Cycle));
        assert!(chip8.scheduler.is_scheduled(Task::DelayTimer));

        chip8.handle_signal(Signal::KeyDown(key(0x7)));
        assert_eq!(chip8.state.v[0x2], 0x7);
        assert!(chip8.scheduler.is_scheduled(Task::Cycle));
        assert!(matches!(chip8.status(), Status::Running));
    }

    #[test]
    fn test_fault_halts_and_cancels_everything() {
        let mut chip8 = chip8();
        chip8.state.memory[0x200..0x202].copy_from_slice(&[0xFF, 0xFF]);
        chip8.delay_timer.set(10);
        chip8.scheduler.schedule(Task::DelayTimer, Instant::now());
        chip8.fire(Task::Cycle, Instant::now());
        assert!(chip8.scheduler.is_idle());
        match chip8.status() {
            Status::Halted(err) => assert!(matches!(
                *err,
                Error::UnimplementedOpcode { opcode: 0xFFFF }
            )),
            other => panic!("expected a halt, got {:?}", other),
        }
    }

    #[test]
    fn test_stop_signal_ends_the_loop() {
        let mut chip8 = Chip8::new(
            Config {
                clock_period: Duration::from_millis(1),
                ..Config::default()
            },
            Arc::new(Keypad::new()),
        );
        chip8.state.memory[0x200..0x202].copy_from_slice(&[0x12, 0x00]);
        chip8.scheduler.schedule(Task::Cycle, Instant::now());
        let (sender, receiver) = channel();
        sender.send(Signal::Stop).unwrap();
        chip8.run(receiver);
        assert!(chip8.scheduler.is_idle());
        assert!(matches!(chip8.status(), Status::Stopped));
    }

    #[test]
    fn test_run_returns_once_halted() {
        let mut chip8 = chip8();
        chip8.state.memory[0x200..0x202].copy_from_slice(&[0xFF, 0xFF]);
        chip8.scheduler.schedule(Task::Cycle, Instant::now());
        let (_sender, receiver) = channel();
        chip8.run(receiver);
        assert!(matches!(chip8.status(), Status::Halted(_)));
    }
}
