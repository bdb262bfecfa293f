use crate::error::TimerError;
use crate::timer::TimerKind;

/// The visible timer context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum_macros::Display)]
pub enum Tab {
    #[default]
    Focus,
    Countdown,
}

impl Tab {
    pub fn kind(self) -> TimerKind {
        match self {
            Tab::Focus => TimerKind::Focus,
            Tab::Countdown => TimerKind::Countdown,
        }
    }

    pub fn other(self) -> Tab {
        match self {
            Tab::Focus => Tab::Countdown,
            Tab::Countdown => Tab::Focus,
        }
    }
}

impl From<TimerKind> for Tab {
    fn from(kind: TimerKind) -> Self {
        match kind {
            TimerKind::Focus => Tab::Focus,
            TimerKind::Countdown => Tab::Countdown,
        }
    }
}

/// Which timers are currently Running or Paused.
///
/// Advisory only: while one timer is active, context switches and countdown
/// configuration are refused.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActivationRegistry {
    focus: bool,
    countdown: bool,
}

impl ActivationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_active(&mut self, kind: TimerKind, active: bool) {
        match kind {
            TimerKind::Focus => self.focus = active,
            TimerKind::Countdown => self.countdown = active,
        }
    }

    pub fn is_active(&self, kind: TimerKind) -> bool {
        match kind {
            TimerKind::Focus => self.focus,
            TimerKind::Countdown => self.countdown,
        }
    }

    /// The active timer, focus first when both are.
    pub fn active(&self) -> Option<TimerKind> {
        if self.focus {
            Some(TimerKind::Focus)
        } else if self.countdown {
            Some(TimerKind::Countdown)
        } else {
            None
        }
    }

    pub fn any_active(&self) -> bool {
        self.active().is_some()
    }

    pub fn check_switch(&self, from: Tab, to: Tab) -> Result<(), TimerError> {
        if from == to {
            return Ok(());
        }
        match self.active() {
            Some(active) => Err(TimerError::ContextLocked { active }),
            None => Ok(()),
        }
    }

    pub fn check_configure(&self) -> Result<(), TimerError> {
        match self.active() {
            Some(active) => Err(TimerError::ConfigurationLocked { active }),
            None => Ok(()),
        }
    }
}
