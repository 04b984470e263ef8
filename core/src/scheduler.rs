//! Deadlines for the self-rescheduling chains that run on the execution thread.
//!
//! Each chain has at most one pending deadline. Firing a task disarms it; the
//! handler decides whether to schedule the next one.

use std::time::Instant;

/// Event identifiers for scheduled events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum Task {
    /// One fetch-decode-execute cycle
    Cycle = 0,
    /// One delay timer decrement
    DelayTimer = 1,
    /// One sound timer decrement
    SoundTimer = 2,
}

impl Task {
    pub const ALL: [Task; 3] = [Task::Cycle, Task::DelayTimer, Task::SoundTimer];
}

#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    deadlines: [Option<Instant>; Task::ALL.len()],
}

impl Scheduler {
    pub fn new() -> Self {
        Scheduler {
            deadlines: [None; Task::ALL.len()],
        }
    }

    /// Arm `task` to fire at `at`, replacing any pending deadline
    pub fn schedule(&mut self, task: Task, at: Instant) {
        self.deadlines[task as usize] = Some(at);
    }

    pub fn cancel(&mut self, task: Task) {
        self.deadlines[task as usize] = None;
    }

    pub fn cancel_all(&mut self) {
        self.deadlines = [None; Task::ALL.len()];
    }

    pub fn is_scheduled(&self, task: Task) -> bool {
        self.deadlines[task as usize].is_some()
    }

    pub fn is_idle(&self) -> bool {
        self.deadlines.iter().all(Option::is_none)
    }

    /// The armed task with the earliest deadline; ties go to the task listed first
    pub fn next_due(&self) -> Option<(Task, Instant)> {
        Task::ALL
            .iter()
            .zip(self.deadlines.iter())
            .filter_map(|(&task, deadline)| deadline.map(|at| (task, at)))
            .min_by_key(|&(_, at)| at)
    }
}

#[cfg(test)]
mod test_scheduler {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_starts_idle() {
        let scheduler = Scheduler::new();
        assert!(scheduler.is_idle());
        assert_eq!(scheduler.next_due(), None);
    }

    #[test]
    fn test_next_due_is_earliest() {
        let now = Instant::now();
        let mut scheduler = Scheduler::new();
        scheduler.schedule(Task::Cycle, now + Duration::from_millis(5));
        scheduler.schedule(Task::SoundTimer, now + Duration::from_millis(1));
        scheduler.schedule(Task::DelayTimer, now + Duration::from_millis(3));
        assert_eq!(
            scheduler.next_due(),
            Some((Task::SoundTimer, now + Duration::from_millis(1)))
        );
    }

    #[test]
    fn test_ties_go_to_cycle() {
        let now = Instant::now();
        let mut scheduler = Scheduler::new();
        scheduler.schedule(Task::DelayTimer, now);
        scheduler.schedule(Task::Cycle, now);
        assert_eq!(scheduler.next_due(), Some((Task::Cycle, now)));
    }

    #[test]
    fn test_reschedule_replaces_deadline() {
        let now = Instant::now();
        let later = now + Duration::from_millis(10);
        let mut scheduler = Scheduler::new();
        scheduler.schedule(Task::Cycle, now);
        scheduler.schedule(Task::Cycle, later);
        assert_eq!(scheduler.next_due(), Some((Task::Cycle, later)));
    }

    #[test]
    fn test_cancel() {
        let now = Instant::now();
        let mut scheduler = Scheduler::new();
        scheduler.schedule(Task::Cycle, now);
        scheduler.schedule(Task::DelayTimer, now);
        scheduler.cancel(Task::Cycle);
        assert!(!scheduler.is_scheduled(Task::Cycle));
        assert!(scheduler.is_scheduled(Task::DelayTimer));
        scheduler.cancel_all();
        assert!(scheduler.is_idle());
    }
}
