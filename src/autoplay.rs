//! Autoplay as a cancellable deadline inside the cooperative event
//! loop. There is no background thread: the loop derives its poll
//! timeout from [`Autoplay::time_until_tick`] and calls
//! [`Autoplay::tick`] when it wakes.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoplayState {
    Stopped,
    Running,
}

#[derive(Debug)]
pub struct Autoplay {
    interval: Duration,
    deadline: Option<Instant>,
}

impl Autoplay {
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            deadline: None,
        }
    }

    pub const fn state(&self) -> AutoplayState {
        if self.deadline.is_some() {
            AutoplayState::Running
        } else {
            AutoplayState::Stopped
        }
    }

    pub const fn is_running(&self) -> bool {
        self.deadline.is_some()
    }

    pub const fn interval(&self) -> Duration {
        self.interval
    }

    pub fn toggle(&mut self, now: Instant) -> AutoplayState {
        if self.deadline.take().is_some() {
            AutoplayState::Stopped
        } else {
            self.deadline = Some(now + self.interval);
            AutoplayState::Running
        }
    }

    pub fn stop(&mut self) {
        self.deadline = None;
    }

    /// Changes the cadence. The live deadline is cancelled before the
    /// interval changes so a stale tick can never fire; a fresh one is
    /// armed only if autoplay was running.
    pub fn set_interval(&mut self, interval: Duration, now: Instant) {
        let was_running = self.deadline.take().is_some();
        self.interval = interval;
        if was_running {
            self.deadline = Some(now + interval);
        }
    }

    /// True when a tick is due, rescheduling the next one. Manual
    /// navigation between ticks does not touch the deadline.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = Some(now + self.interval);
                true
            }
            _ => false,
        }
    }

    pub fn time_until_tick(&self, now: Instant) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(now))
    }
}

#[cfg(test)]
mod tests {
    use {super::*, assert2::check as assert};

    const INTERVAL: Duration = Duration::from_millis(100);

    #[test]
    fn test_toggle_arms_and_cancels() {
        let now = Instant::now();
        let mut autoplay = Autoplay::new(INTERVAL);
        assert!(autoplay.state() == AutoplayState::Stopped);

        assert!(autoplay.toggle(now) == AutoplayState::Running);
        assert!(autoplay.time_until_tick(now) == Some(INTERVAL));

        assert!(autoplay.toggle(now) == AutoplayState::Stopped);
        assert!(autoplay.time_until_tick(now).is_none());
    }

    #[test]
    fn test_exactly_one_tick_per_interval() {
        let start = Instant::now();
        let mut autoplay = Autoplay::new(INTERVAL);
        autoplay.toggle(start);

        assert!(!autoplay.tick(start));
        assert!(!autoplay.tick(start + INTERVAL / 2));
        assert!(autoplay.tick(start + INTERVAL));
        // Rescheduled one interval ahead, not immediately due again.
        assert!(!autoplay.tick(start + INTERVAL));
        assert!(autoplay.tick(start + 2 * INTERVAL));
    }

    #[test]
    fn test_no_ticks_after_stop() {
        let start = Instant::now();
        let mut autoplay = Autoplay::new(INTERVAL);
        autoplay.toggle(start);
        autoplay.stop();
        assert!(!autoplay.tick(start + 10 * INTERVAL));
    }

    #[test]
    fn test_interval_change_cancels_before_rearming() {
        let start = Instant::now();
        let mut autoplay = Autoplay::new(INTERVAL);
        autoplay.toggle(start);

        let longer = Duration::from_millis(300);
        autoplay.set_interval(longer, start);
        assert!(autoplay.is_running());
        // The old deadline must not fire.
        assert!(!autoplay.tick(start + INTERVAL));
        assert!(autoplay.tick(start + longer));
    }

    #[test]
    fn test_interval_change_while_stopped_stays_stopped() {
        let start = Instant::now();
        let mut autoplay = Autoplay::new(INTERVAL);
        autoplay.set_interval(Duration::from_millis(50), start);
        assert!(!autoplay.is_running());
        assert!(!autoplay.tick(start + Duration::from_secs(1)));
    }
}
