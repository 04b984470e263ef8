use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;

use log::{trace, warn};

use crate::display::{DisplayBuffer, FrameBuffer};
use crate::error::Error;
use crate::keypad::Key;

/// Messages from the frontend to the execution thread
#[derive(Debug)]
pub enum Signal {
    /// A key went down; completes a pending FX0A
    KeyDown(Key),
    /// Cancel every chain and leave the event loop
    Stop,
}

/// What the execution thread is doing
#[derive(Clone, Debug)]
pub enum Status {
    Running,
    /// Parked on FX0A until a key press arrives
    AwaitingKey { register: usize },
    /// An instruction faulted; nothing runs anymore
    Halted(Arc<Error>),
    Stopped,
}

/// The frontend's side of a spawned `Chip8`.
///
/// Dropping the handle stops the machine and waits for its thread.
pub struct MachineHandle {
    signals: Sender<Signal>,
    thread: Option<JoinHandle<()>>,
    display: Arc<DisplayBuffer>,
    status: Arc<Mutex<Status>>,
}

impl MachineHandle {
    pub(crate) fn new(
        signals: Sender<Signal>,
        thread: JoinHandle<()>,
        display: Arc<DisplayBuffer>,
        status: Arc<Mutex<Status>>,
    ) -> Self {
        MachineHandle {
            signals,
            thread: Some(thread),
            display,
            status,
        }
    }

    /// Returns the FrameBuffer if the display should be redrawn
    pub fn frame(&self) -> Option<FrameBuffer> {
        self.display.frame()
    }

    pub fn snapshot(&self) -> FrameBuffer {
        self.display.snapshot()
    }

    pub fn display(&self) -> Arc<DisplayBuffer> {
        Arc::clone(&self.display)
    }

    pub fn status(&self) -> Status {
        self.status
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Tell the machine a key went down.
    ///
    /// The pressed state queried by EX9E/EXA1 lives in the `Keyboard` the
    /// machine was built with; this only wakes a pending FX0A.
    pub fn key_down(&self, key: Key) {
        if self.signals.send(Signal::KeyDown(key)).is_err() {
            trace!("{:?} dropped, machine is no longer running", key);
        }
    }

    /// Stops the machine, waits for its thread and reports how it ended
    pub fn stop(mut self) -> Status {
        self.join();
        self.status()
    }

    fn join(&mut self) {
        if let Some(thread) = self.thread.take() {
            // The loop may already have returned after a halt
            let _ = self.signals.send(Signal::Stop);
            if thread.join().is_err() {
                warn!("execution thread panicked");
            }
        }
    }
}

impl Drop for MachineHandle {
    fn drop(&mut self) {
        self.join();
    }
}
