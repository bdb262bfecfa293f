use thiserror::Error;

use crate::timer::{Phase, TimerKind};

/// Rejections raised by the timer state machines and the activation policy.
///
/// None of these are fatal; the display text is what the user sees on the
/// status line of the affected timer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimerError {
    #[error("Cannot {action} the {timer} timer while it is {phase}.")]
    InvalidTransition {
        timer: TimerKind,
        action: &'static str,
        phase: Phase,
    },
    #[error("Please set a timer duration first.")]
    UnconfiguredStart,
    #[error("Cannot switch tabs while the {active} timer is running.")]
    ContextLocked { active: TimerKind },
    #[error("Cannot change the countdown while the {active} timer is running.")]
    ConfigurationLocked { active: TimerKind },
}

impl TimerError {
    pub(crate) fn invalid(timer: TimerKind, action: &'static str, phase: Phase) -> Self {
        Self::InvalidTransition {
            timer,
            action,
            phase,
        }
    }
}
