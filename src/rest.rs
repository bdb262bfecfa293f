use std::time::Duration;

/// Work shorter than this earns no rest.
pub const REST_THRESHOLD_SECS: u64 = 300;

/// Rest owed for a stretch of focused work, in whole seconds.
///
/// One fifth of the whole seconds worked, once at least five minutes were
/// worked; nothing below that.
pub fn rest_policy(elapsed: Duration) -> u64 {
    let work_secs = elapsed.as_secs();
    if work_secs < REST_THRESHOLD_SECS {
        0
    } else {
        work_secs / 5
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestTick {
    /// Whole seconds still to rest, rounded up
    Remaining(u64),
    Finished,
}

/// One-shot rest countdown, polled once per second.
///
/// Remaining time is derived from the start instant rather than counted down
/// per tick, so a poll that arrives late still reports the right value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestTimer {
    duration: Duration,
    started_at: Duration,
    finished: bool,
}

impl RestTimer {
    pub fn start(seconds: u64, now: Duration) -> Self {
        Self {
            duration: Duration::from_secs(seconds),
            started_at: now,
            finished: false,
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn remaining(&self, now: Duration) -> Duration {
        self.duration
            .saturating_sub(now.saturating_sub(self.started_at))
    }

    pub fn remaining_secs(&self, now: Duration) -> u64 {
        let remaining = self.remaining(now);
        remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0)
    }

    /// Returns `Finished` exactly once, `None` on every poll after that.
    pub fn tick(&mut self, now: Duration) -> Option<RestTick> {
        if self.finished {
            return None;
        }
        if self.remaining(now).is_zero() {
            self.finished = true;
            return Some(RestTick::Finished);
        }
        Some(RestTick::Remaining(self.remaining_secs(now)))
    }
}
