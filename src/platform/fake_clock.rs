use std::sync::Mutex;
use std::time::{Duration, SystemTime};

use super::Clock;

#[derive(Debug, Default)]
struct Ticks {
    calls: u32,
    slept: Duration,
    sleeps: usize,
}

/// Test double for time.
///
/// The n-th call to [`Clock::now`] returns `start + n * step`, so every read
/// observes time moving forward. [`Clock::sleep`] only records the request
/// and yields the thread.
#[derive(Debug)]
pub struct FakeClock {
    start: SystemTime,
    step: Duration,
    ticks: Mutex<Ticks>,
}

impl FakeClock {
    pub fn new(start: SystemTime, step: Duration) -> Self {
        Self {
            start,
            step,
            ticks: Mutex::new(Ticks::default()),
        }
    }

    /// Total duration requested through [`Clock::sleep`].
    pub fn slept(&self) -> Duration {
        self.ticks().slept
    }

    /// Number of [`Clock::sleep`] calls.
    pub fn sleeps(&self) -> usize {
        self.ticks().sleeps
    }

    fn ticks(&self) -> std::sync::MutexGuard<'_, Ticks> {
        self.ticks
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new(SystemTime::UNIX_EPOCH, Duration::from_millis(1))
    }
}

impl Clock for FakeClock {
    fn now(&self) -> SystemTime {
        let mut ticks = self.ticks();
        let now = self.start + self.step * ticks.calls;
        ticks.calls = ticks.calls.saturating_add(1);
        now
    }

    fn sleep(&self, duration: Duration) {
        {
            let mut ticks = self.ticks();
            ticks.slept += duration;
            ticks.sleeps += 1;
        }
        std::thread::yield_now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_advances_by_step() {
        let start = SystemTime::UNIX_EPOCH + Duration::from_secs(100);
        let clock = FakeClock::new(start, Duration::from_secs(1));
        assert_eq!(clock.now(), start);
        assert_eq!(clock.now(), start + Duration::from_secs(1));
        assert_eq!(clock.now(), start + Duration::from_secs(2));
    }

    #[test]
    fn test_sleep_is_recorded_not_waited() {
        let clock = FakeClock::default();
        clock.sleep(Duration::from_secs(3600));
        clock.sleep(Duration::from_secs(1));
        assert_eq!(clock.sleeps(), 2);
        assert_eq!(clock.slept(), Duration::from_secs(3601));
    }
}
