//! Elapsed-time accounting shared by the focus and countdown timers.
//!
//! While running, elapsed time is always recomputed as `now - anchor`. It is
//! never accumulated from ticks, so samples missed while the terminal was in
//! the background are absorbed by the next sample.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Phase {
    Idle,
    Running,
    Paused,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum TimerKind {
    Focus,
    Countdown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerState {
    phase: Phase,
    // Only set while Running.
    anchor: Option<Duration>,
    elapsed: Duration,
}

impl Default for TimerState {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerState {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            anchor: None,
            elapsed: Duration::ZERO,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn anchor(&self) -> Option<Duration> {
        self.anchor
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    /// Running or Paused
    pub fn is_active(&self) -> bool {
        matches!(self.phase, Phase::Running | Phase::Paused)
    }

    /// Begin a run from zero.
    pub(crate) fn run_fresh(&mut self, now: Duration) {
        self.elapsed = Duration::ZERO;
        self.anchor = Some(now);
        self.phase = Phase::Running;
    }

    /// Continue a run, keeping what has already elapsed.
    pub(crate) fn run_resumed(&mut self, now: Duration) {
        self.anchor = Some(now.saturating_sub(self.elapsed));
        self.phase = Phase::Running;
    }

    /// Recompute elapsed from the anchor. No-op unless Running.
    pub(crate) fn sample(&mut self, now: Duration) -> Duration {
        if let (Phase::Running, Some(anchor)) = (self.phase, self.anchor) {
            self.elapsed = self.elapsed.max(now.saturating_sub(anchor));
        }
        self.elapsed
    }

    /// Like `sample`, but elapsed never exceeds `cap`.
    pub(crate) fn sample_capped(&mut self, now: Duration, cap: Duration) -> Duration {
        self.sample(now);
        self.elapsed = self.elapsed.min(cap);
        self.elapsed
    }

    pub(crate) fn freeze(&mut self) {
        self.anchor = None;
        self.phase = Phase::Paused;
    }

    pub(crate) fn complete_at(&mut self, elapsed: Duration) {
        self.elapsed = elapsed;
        self.anchor = None;
        self.phase = Phase::Completed;
    }

    pub(crate) fn deduct(&mut self, amount: Duration) {
        self.elapsed = self.elapsed.saturating_sub(amount);
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::new();
    }
}
