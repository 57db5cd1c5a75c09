use std::future::Future;
use std::time::Duration;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};

/// Granularity of every timer the state machine runs.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Which of the two timers a handle refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    Countdown,
    ReminderTimeout,
}

/// Owned token for an armed timer.
///
/// The state machine bumps the generation whenever it arms or disarms a
/// timer, so a tick carrying an older handle is recognised as stale and
/// dropped instead of mutating state after cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerHandle {
    pub kind: TimerKind,
    pub generation: u64,
}

/// Source of periodic ticks driving the state machine.
///
/// Implementations deliver one tick at a time; ticks that would overlap an
/// in-flight one are dropped rather than queued.
pub trait ClockSource {
    /// Resolve at the next tick.
    fn tick(&mut self) -> impl Future<Output = ()> + Send;

    /// Restart the period so the next tick is a full period away.
    fn reset(&mut self);
}

/// Production clock backed by a tokio interval
pub struct IntervalClock {
    interval: Interval,
}

impl IntervalClock {
    pub fn new(period: Duration) -> Self {
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self { interval }
    }

    pub fn period(&self) -> Duration {
        self.interval.period()
    }
}

impl Default for IntervalClock {
    fn default() -> Self {
        Self::new(TICK_PERIOD)
    }
}

impl ClockSource for IntervalClock {
    fn tick(&mut self) -> impl Future<Output = ()> + Send {
        async move {
            self.interval.tick().await;
        }
    }

    fn reset(&mut self) {
        self.interval.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_first_tick_is_one_period_away() {
        let mut clock = IntervalClock::default();
        let start = Instant::now();

        clock.tick().await;

        assert_eq!(start.elapsed(), TICK_PERIOD);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_pushes_next_tick_back() {
        let mut clock = IntervalClock::new(Duration::from_secs(2));
        tokio::time::advance(Duration::from_secs(1)).await;

        clock.reset();
        let reset_at = Instant::now();
        clock.tick().await;

        assert_eq!(reset_at.elapsed(), Duration::from_secs(2));
    }
}
