use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Monotonic time source injected into a session.
pub trait Clock {
    /// Time since an arbitrary, fixed origin.
    fn now(&self) -> Duration;
}

/// Production clock backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Manually advanced clock for tests. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct FakeClock {
    now: Rc<Cell<Duration>>,
}

impl FakeClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn advance_secs(&self, secs: u64) {
        self.advance(Duration::from_secs(secs));
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

/// A deadline, optionally repeating. Timers only fire when polled; dropping
/// one cancels it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timer {
    due: Duration,
    period: Option<Duration>,
    spent: bool,
}

impl Timer {
    /// Fires once, `delay` after `now`.
    pub fn once(now: Duration, delay: Duration) -> Self {
        Self {
            due: now + delay,
            period: None,
            spent: false,
        }
    }

    /// Fires every `period`, starting one period after `now`.
    pub fn every(now: Duration, period: Duration) -> Self {
        Self {
            due: now + period,
            period: Some(period),
            spent: false,
        }
    }

    /// How many times the timer has come due since the last poll.
    pub fn poll(&mut self, now: Duration) -> u32 {
        if self.spent || now < self.due {
            return 0;
        }
        match self.period {
            None => {
                self.spent = true;
                1
            }
            Some(period) if period.is_zero() => {
                self.spent = true;
                1
            }
            Some(period) => {
                let mut fired = 0;
                while self.due <= now {
                    self.due += period;
                    fired += 1;
                }
                fired
            }
        }
    }

    pub fn is_spent(&self) -> bool {
        self.spent
    }

    /// When the timer next fires, or `None` once a one-shot has fired.
    pub fn due(&self) -> Option<Duration> {
        (!self.spent).then_some(self.due)
    }
}
