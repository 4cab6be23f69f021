//! One-shot timers of the engine
//!
//! A timer holds at most one pending deadline. Scheduling again replaces the
//! pending one, so a timer can never fire twice for one request.

/// Pending wake-up in wall-clock milliseconds
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Deadline {
    due: Option<i64>,
}

impl Deadline {
    pub const fn new() -> Self {
        Self { due: None }
    }

    /// Replace any pending deadline with `at`
    pub fn schedule(&mut self, at: i64) {
        self.due = Some(at);
    }

    pub fn cancel(&mut self) {
        self.due = None;
    }

    pub fn due(&self) -> Option<i64> {
        self.due
    }

    pub fn is_pending(&self) -> bool {
        self.due.is_some()
    }

    /// Consume the deadline if it has passed
    pub fn fire(&mut self, now: i64) -> bool {
        match self.due {
            Some(at) if at <= now => {
                self.due = None;
                true
            }
            _ => false,
        }
    }
}

/// Delay until the next multiple of `period`, a full period when already on one
pub fn until_next_boundary(now: i64, period: i64) -> i64 {
    period - now.rem_euclid(period)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once() {
        let mut deadline = Deadline::new();
        deadline.schedule(100);
        assert!(!deadline.fire(99));
        assert!(deadline.fire(100));
        assert!(!deadline.fire(101));
        assert!(!deadline.is_pending());
    }

    #[test]
    fn rescheduling_replaces() {
        let mut deadline = Deadline::new();
        deadline.schedule(100);
        deadline.schedule(300);
        assert!(!deadline.fire(200));
        assert_eq!(deadline.due(), Some(300));
        deadline.cancel();
        assert!(!deadline.fire(1_000));
    }

    #[test]
    fn boundaries() {
        assert_eq!(until_next_boundary(1_250, 1_000), 750);
        assert_eq!(until_next_boundary(2_000, 1_000), 1_000);
        assert_eq!(until_next_boundary(1_999, 1_000), 1);
    }
}
