use std::time::Duration;

use crate::error::TimerError;
use crate::timer::{Phase, TimerKind, TimerState};

/// Build a countdown target from the hours/minutes/seconds inputs.
pub fn duration_from_hms(hours: u64, minutes: u64, seconds: u64) -> Duration {
    Duration::from_secs(hours * 3600 + minutes * 60 + seconds)
}

/// Split a target back into the hours/minutes/seconds inputs.
pub fn hms_from_duration(duration: Duration) -> (u64, u64, u64) {
    let total = duration.as_secs();
    (total / 3600, (total % 3600) / 60, total % 60)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HmsField {
    Hours,
    Minutes,
    Seconds,
}

/// The three duration inputs shown next to the countdown
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CountdownInputs {
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl CountdownInputs {
    pub fn from_duration(duration: Duration) -> Self {
        let (hours, minutes, seconds) = hms_from_duration(duration);
        Self {
            hours,
            minutes,
            seconds,
        }
    }

    pub fn to_duration(self) -> Duration {
        duration_from_hms(self.hours, self.minutes, self.seconds)
    }

    /// Step one field, staying within 0-99 hours and 0-59 minutes/seconds.
    pub fn adjusted(self, field: HmsField, delta: i64) -> Self {
        let step = |value: u64, max: u64| {
            let next = value as i64 + delta;
            next.clamp(0, max as i64) as u64
        };
        let mut next = self;
        match field {
            HmsField::Hours => next.hours = step(self.hours, 99),
            HmsField::Minutes => next.minutes = step(self.minutes, 59),
            HmsField::Seconds => next.seconds = step(self.seconds, 59),
        }
        next
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountdownReport {
    pub target: Duration,
    pub elapsed: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownSample {
    Running { remaining: Duration },
    /// Reached the target on this sample. Reported once per run.
    Completed(CountdownReport),
}

/// Fixed-duration timer that completes by itself when the target is reached.
#[derive(Debug, Clone, Default)]
pub struct CountdownTimer {
    state: TimerState,
    target: Duration,
}

impl CountdownTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_target(target: Duration) -> Self {
        Self {
            state: TimerState::new(),
            target,
        }
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn elapsed(&self) -> Duration {
        self.state.elapsed()
    }

    pub fn target(&self) -> Duration {
        self.target
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn remaining(&self) -> Duration {
        self.target.saturating_sub(self.state.elapsed())
    }

    /// Set the target. Only allowed while the timer is not running or paused.
    pub fn configure(&mut self, target: Duration) -> Result<(), TimerError> {
        if self.state.is_active() {
            return Err(TimerError::invalid(
                TimerKind::Countdown,
                "configure",
                self.phase(),
            ));
        }
        self.state.reset();
        self.target = target;
        tracing::debug!(?target, "countdown configured");
        Ok(())
    }

    pub fn start(&mut self, now: Duration) -> Result<(), TimerError> {
        if self.target.is_zero() {
            return Err(TimerError::UnconfiguredStart);
        }
        match self.phase() {
            Phase::Idle => self.state.run_fresh(now),
            Phase::Paused => self.state.run_resumed(now),
            phase => return Err(TimerError::invalid(TimerKind::Countdown, "start", phase)),
        }
        tracing::debug!(elapsed = ?self.elapsed(), target = ?self.target, "countdown running");
        Ok(())
    }

    pub fn pause(&mut self, now: Duration) -> Result<Duration, TimerError> {
        if !self.state.is_running() {
            return Err(TimerError::invalid(
                TimerKind::Countdown,
                "pause",
                self.phase(),
            ));
        }
        let elapsed = self.state.sample_capped(now, self.target);
        self.state.freeze();
        Ok(elapsed)
    }

    pub fn resume(&mut self, now: Duration) -> Result<(), TimerError> {
        if self.phase() != Phase::Paused {
            return Err(TimerError::invalid(
                TimerKind::Countdown,
                "resume",
                self.phase(),
            ));
        }
        self.start(now)
    }

    /// Recompute elapsed; clamp and complete once the target is reached.
    pub fn sample(&mut self, now: Duration) -> Option<CountdownSample> {
        if !self.state.is_running() {
            return None;
        }
        let elapsed = self.state.sample_capped(now, self.target);
        if elapsed >= self.target {
            self.state.complete_at(self.target);
            tracing::debug!(target = ?self.target, "countdown completed");
            return Some(CountdownSample::Completed(CountdownReport {
                target: self.target,
                elapsed: self.target,
            }));
        }
        Some(CountdownSample::Running {
            remaining: self.remaining(),
        })
    }

    /// Manual stop before completion. Returns to Idle, keeping the target.
    pub fn stop(&mut self, now: Duration) -> Result<CountdownReport, TimerError> {
        if !self.state.is_active() {
            return Err(TimerError::invalid(
                TimerKind::Countdown,
                "stop",
                self.phase(),
            ));
        }
        let elapsed = self.state.sample_capped(now, self.target);
        self.state.reset();
        Ok(CountdownReport {
            target: self.target,
            elapsed,
        })
    }

    /// Back to Idle with the configured target intact.
    pub fn reset(&mut self) {
        self.state.reset();
    }
}
