/// # Timer
///
/// An 8-bit counter that counts down to zero once per timer period.
///
/// The timer doesn't keep time itself: the machine's scheduler fires `tick`
/// while the decrement chain is armed. `set` and `tick` report whether the
/// chain should be (re)armed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Timer {
    value: u8,
}

impl Timer {
    pub fn new() -> Self {
        Timer { value: 0 }
    }

    pub fn value(&self) -> u8 {
        self.value
    }

    pub fn is_active(&self) -> bool {
        self.value > 0
    }

    /// Loads `value` if the timer is idle; a running timer is left alone.
    ///
    /// Returns whether the decrement chain needs arming.
    pub fn set(&mut self, value: u8) -> bool {
        if self.value != 0 {
            return false;
        }
        self.value = value;
        self.is_active()
    }

    /// One period has elapsed.
    ///
    /// Returns whether another tick should be scheduled.
    pub fn tick(&mut self) -> bool {
        self.value = self.value.saturating_sub(1);
        self.is_active()
    }

    /// Drops the remaining count
    pub fn cancel(&mut self) {
        self.value = 0;
    }
}

#[cfg(test)]
mod test_timer {
    use super::*;

    #[test]
    fn test_counts_down_to_zero_and_stays() {
        let mut timer = Timer::new();
        assert!(timer.set(10));
        for remaining in (1..10).rev() {
            assert!(timer.tick());
            assert_eq!(timer.value(), remaining);
        }
        assert!(!timer.tick());
        assert_eq!(timer.value(), 0);
        assert!(!timer.tick());
        assert_eq!(timer.value(), 0);
    }

    #[test]
    fn test_set_while_running_is_ignored() {
        let mut timer = Timer::new();
        timer.set(5);
        timer.tick();
        timer.tick();
        assert_eq!(timer.value(), 3);
        assert!(!timer.set(5));
        assert_eq!(timer.value(), 3);
    }

    #[test]
    fn test_set_zero_does_not_arm() {
        let mut timer = Timer::new();
        assert!(!timer.set(0));
        assert!(!timer.is_active());
    }

    #[test]
    fn test_can_be_rearmed_once_expired() {
        let mut timer = Timer::new();
        timer.set(1);
        timer.tick();
        assert!(timer.set(7));
        assert_eq!(timer.value(), 7);
    }

    #[test]
    fn test_cancel() {
        let mut timer = Timer::new();
        timer.set(200);
        timer.cancel();
        assert_eq!(timer.value(), 0);
        assert!(!timer.tick());
    }
}
