use std::fmt;
use std::time::Duration;

/// Focus timer display: `MM:SS.mmm`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopwatchReadout {
    pub minutes: u64,
    pub seconds: u64,
    pub millis: u64,
}

impl From<Duration> for StopwatchReadout {
    fn from(d: Duration) -> Self {
        let total_secs = d.as_secs();
        Self {
            minutes: total_secs / 60,
            seconds: total_secs % 60,
            millis: u64::from(d.subsec_millis()),
        }
    }
}

impl fmt::Display for StopwatchReadout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}.{:03}", self.minutes, self.seconds, self.millis)
    }
}

/// Countdown and rest display: `MM:SS`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockReadout {
    pub minutes: u64,
    pub seconds: u64,
}

impl ClockReadout {
    pub fn from_secs(total_secs: u64) -> Self {
        Self {
            minutes: total_secs / 60,
            seconds: total_secs % 60,
        }
    }
}

impl From<Duration> for ClockReadout {
    /// Truncates to whole seconds.
    fn from(d: Duration) -> Self {
        Self::from_secs(d.as_secs())
    }
}

impl fmt::Display for ClockReadout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.minutes, self.seconds)
    }
}
