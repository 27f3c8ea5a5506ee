//! Waiting primitives for pages that settle on their own schedule.
//!
//! Every delay in the scraper goes through a [`Clock`], so the orchestration can be
//! driven by a simulated clock in tests where sleeping is a no-op.

use std::cell::{Cell, RefCell};
use std::time::{Duration, Instant};

/// Source of time and sleeping.
pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, duration: Duration);
}

/// Wall clock backed by `std::thread::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Simulated clock: `sleep` advances time instantly and records each call.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    elapsed: Cell<Duration>,
    sleeps: RefCell<Vec<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            elapsed: Cell::new(Duration::ZERO),
            sleeps: RefCell::new(Vec::new()),
        }
    }

    /// Total simulated time slept so far.
    pub fn elapsed(&self) -> Duration {
        self.elapsed.get()
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.borrow().clone()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed.get()
    }

    fn sleep(&self, duration: Duration) {
        self.elapsed.set(self.elapsed.get() + duration);
        self.sleeps.borrow_mut().push(duration);
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Instant {
        (**self).now()
    }

    fn sleep(&self, duration: Duration) {
        (**self).sleep(duration)
    }
}

/// Poll `predicate` every `interval` until it holds or `timeout` elapses.
///
/// Returns `Ok(true)` once the predicate holds and `Ok(false)` on timeout. The predicate is
/// always evaluated at least once, and once more at the deadline.
pub fn poll_until<C, E, F>(
    clock: &C,
    timeout: Duration,
    interval: Duration,
    mut predicate: F,
) -> Result<bool, E>
where
    C: Clock + ?Sized,
    F: FnMut() -> Result<bool, E>,
{
    let start = clock.now();

    loop {
        if predicate()? {
            return Ok(true);
        }

        let elapsed = clock.now().saturating_duration_since(start);
        if elapsed >= timeout {
            return Ok(false);
        }

        clock.sleep(interval.min(timeout - elapsed));
    }
}

/// Run `attempt`; if it yields nothing, wait `delay` and run it exactly once more.
pub fn retry_once<C, T, E, F>(clock: &C, delay: Duration, mut attempt: F) -> Result<Vec<T>, E>
where
    C: Clock + ?Sized,
    F: FnMut() -> Result<Vec<T>, E>,
{
    let first = attempt()?;
    if !first.is_empty() {
        return Ok(first);
    }

    clock.sleep(delay);
    attempt()
}
