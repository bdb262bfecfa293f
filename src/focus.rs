use std::time::Duration;

use crate::effects::Decider;
use crate::error::TimerError;
use crate::rest::rest_policy;
use crate::timer::{Phase, TimerKind, TimerState};

/// What a finished focus run amounted to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusReport {
    pub work: Duration,
    pub rest_seconds: u64,
}

impl FocusReport {
    pub fn work_seconds(&self) -> u64 {
        self.work.as_secs()
    }

    pub fn work_minutes(&self) -> u64 {
        self.work_seconds() / 60
    }
}

/// Result of leaving the Paused phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resumed {
    pub paused_for: Duration,
    pub deducted: bool,
}

/// Open-ended stopwatch. Runs until stopped by hand.
#[derive(Debug, Clone, Default)]
pub struct FocusTimer {
    state: TimerState,
    paused_for: Duration,
}

impl FocusTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn elapsed(&self) -> Duration {
        self.state.elapsed()
    }

    pub fn paused_for(&self) -> Duration {
        self.paused_for
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    /// From Idle this begins a new run; from Paused it resumes. `now` is read
    /// once, after any question has been answered.
    pub fn start(
        &mut self,
        now: impl FnOnce() -> Duration,
        decider: &mut dyn Decider,
    ) -> Result<Option<Resumed>, TimerError> {
        match self.phase() {
            Phase::Idle => {
                self.state.run_fresh(now());
                self.paused_for = Duration::ZERO;
                tracing::debug!("focus timer started");
                Ok(None)
            }
            Phase::Paused => self.resume(now, decider).map(Some),
            phase => Err(TimerError::invalid(TimerKind::Focus, "start", phase)),
        }
    }

    /// Leave Paused. When time was spent paused the decider is asked whether
    /// to take it off the elapsed total; the accumulator clears either way.
    /// The run is re-anchored at the time the answer came back.
    pub fn resume(
        &mut self,
        now: impl FnOnce() -> Duration,
        decider: &mut dyn Decider,
    ) -> Result<Resumed, TimerError> {
        if self.phase() != Phase::Paused {
            return Err(TimerError::invalid(TimerKind::Focus, "resume", self.phase()));
        }

        let paused_for = self.paused_for;
        let mut deducted = false;
        if !paused_for.is_zero() {
            let question = format!(
                "You paused for {} seconds. Deduct this time from your work session?",
                paused_for.as_secs()
            );
            if decider.confirm(&question) {
                self.state.deduct(paused_for);
                deducted = true;
            }
        }
        self.paused_for = Duration::ZERO;

        self.state.run_resumed(now());
        tracing::debug!(?paused_for, deducted, elapsed = ?self.elapsed(), "focus timer resumed");
        Ok(Resumed {
            paused_for,
            deducted,
        })
    }

    /// Recompute elapsed. `None` once the timer is no longer running.
    pub fn sample(&mut self, now: Duration) -> Option<Duration> {
        self.state.is_running().then(|| self.state.sample(now))
    }

    pub fn pause(&mut self, now: Duration) -> Result<Duration, TimerError> {
        if !self.state.is_running() {
            return Err(TimerError::invalid(TimerKind::Focus, "pause", self.phase()));
        }
        let elapsed = self.state.sample(now);
        self.state.freeze();
        tracing::debug!(?elapsed, "focus timer paused");
        Ok(elapsed)
    }

    /// Coarse paused-time accounting, fed by a one-second ticker.
    pub fn add_paused(&mut self, amount: Duration) -> Duration {
        if self.phase() == Phase::Paused {
            self.paused_for += amount;
        }
        self.paused_for
    }

    /// Finalize the run and return to Idle.
    pub fn stop(&mut self, now: Duration) -> Result<FocusReport, TimerError> {
        if !self.state.is_active() {
            return Err(TimerError::invalid(TimerKind::Focus, "stop", self.phase()));
        }
        let work = self.state.sample(now);
        self.state.complete_at(work);
        let report = FocusReport {
            work,
            rest_seconds: rest_policy(work),
        };
        self.reset();
        Ok(report)
    }

    pub fn reset(&mut self) {
        self.state.reset();
        self.paused_for = Duration::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{Clock, ManualClock};
    use crate::effects::FixedDecider;
    use assert_matches::assert_matches;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn running_for(elapsed_ms: u64) -> FocusTimer {
        let mut timer = FocusTimer::new();
        timer.start(|| ms(0), &mut FixedDecider::no()).unwrap();
        timer.sample(ms(elapsed_ms));
        timer
    }

    #[test]
    fn start_twice_is_rejected() {
        let mut timer = running_for(10);
        let err = timer.start(|| ms(20), &mut FixedDecider::no()).unwrap_err();
        assert_matches!(
            err,
            TimerError::InvalidTransition {
                timer: TimerKind::Focus,
                phase: Phase::Running,
                ..
            }
        );
    }

    #[test]
    fn pause_and_resume_without_deduction_keeps_elapsed() {
        let mut timer = running_for(10_000);
        assert_eq!(timer.pause(ms(10_000)).unwrap(), ms(10_000));
        timer.add_paused(ms(1_000));
        timer.add_paused(ms(1_000));

        let mut decider = FixedDecider::no();
        let resumed = timer.resume(|| ms(12_000), &mut decider).unwrap();
        assert!(!resumed.deducted);
        assert_eq!(resumed.paused_for, ms(2_000));
        assert_eq!(timer.elapsed(), ms(10_000));
        assert_eq!(timer.paused_for(), Duration::ZERO);
        assert_eq!(decider.asked.len(), 1);
        // the run continues from where it was paused
        assert_eq!(timer.sample(ms(13_000)), Some(ms(11_000)));
    }

    #[test]
    fn accepted_deduction_subtracts_paused_time() {
        let mut timer = running_for(10_000);
        timer.pause(ms(10_000)).unwrap();
        for _ in 0..5 {
            timer.add_paused(ms(1_000));
        }

        let mut decider = FixedDecider::yes();
        let resumed = timer.resume(|| ms(15_000), &mut decider).unwrap();
        assert!(resumed.deducted);
        assert_eq!(timer.elapsed(), ms(5_000));
        assert_eq!(
            decider.asked,
            vec!["You paused for 5 seconds. Deduct this time from your work session?"]
        );
        assert_eq!(timer.sample(ms(15_000)), Some(ms(5_000)));
    }

    /// Takes `delay` of wall time to answer.
    struct SlowDecider {
        clock: ManualClock,
        delay: Duration,
        answer: bool,
    }

    impl Decider for SlowDecider {
        fn confirm(&mut self, _question: &str) -> bool {
            self.clock.advance(self.delay);
            self.answer
        }
    }

    #[test]
    fn time_spent_answering_is_not_work() {
        for (answer, expected) in [(false, ms(10_000)), (true, ms(5_000))] {
            let clock = ManualClock::starting_at(ms(15_000));
            let mut timer = running_for(10_000);
            timer.pause(ms(10_000)).unwrap();
            timer.add_paused(ms(5_000));

            let mut decider = SlowDecider {
                clock: clock.clone(),
                delay: ms(10_000),
                answer,
            };
            timer.resume(|| clock.now(), &mut decider).unwrap();
            assert_eq!(clock.now(), ms(25_000));
            assert_eq!(timer.elapsed(), expected);
            assert_eq!(timer.sample(clock.now()), Some(expected));
        }
    }

    #[test]
    fn deduction_never_goes_negative() {
        let mut timer = running_for(2_000);
        timer.pause(ms(2_000)).unwrap();
        timer.add_paused(ms(9_000));
        timer.resume(|| ms(11_000), &mut FixedDecider::yes()).unwrap();
        assert_eq!(timer.elapsed(), Duration::ZERO);
    }

    #[test]
    fn no_question_without_paused_time() {
        let mut timer = running_for(500);
        timer.pause(ms(500)).unwrap();
        let mut decider = FixedDecider::yes();
        timer.start(|| ms(600), &mut decider).unwrap();
        assert!(decider.asked.is_empty());
        assert_eq!(timer.phase(), Phase::Running);
        assert_eq!(timer.elapsed(), ms(500));
    }

    #[test]
    fn paused_time_only_accrues_while_paused() {
        let mut timer = running_for(100);
        assert_eq!(timer.add_paused(ms(1_000)), Duration::ZERO);
    }

    #[test]
    fn sample_stops_once_paused() {
        let mut timer = running_for(100);
        timer.pause(ms(200)).unwrap();
        assert_eq!(timer.sample(ms(5_000)), None);
        assert_eq!(timer.elapsed(), ms(200));
    }

    #[test]
    fn stop_reports_work_and_rest() {
        let mut timer = running_for(0);
        let report = timer.stop(ms(400_000)).unwrap();
        assert_eq!(report.work_seconds(), 400);
        assert_eq!(report.rest_seconds, 80);
        assert_eq!(report.work_minutes(), 6);
        assert_eq!(timer.phase(), Phase::Idle);
        assert_eq!(timer.elapsed(), Duration::ZERO);
    }

    #[test]
    fn stop_from_paused_uses_frozen_elapsed() {
        let mut timer = running_for(0);
        timer.pause(ms(30_000)).unwrap();
        let report = timer.stop(ms(90_000)).unwrap();
        assert_eq!(report.work, ms(30_000));
        assert_eq!(report.rest_seconds, 0);
    }

    #[test]
    fn stop_while_idle_is_rejected() {
        let mut timer = FocusTimer::new();
        assert_matches!(
            timer.stop(ms(0)),
            Err(TimerError::InvalidTransition { phase: Phase::Idle, .. })
        );
    }

    #[test]
    fn reset_is_idempotent() {
        let mut timer = FocusTimer::new();
        timer.reset();
        assert_eq!(timer.phase(), Phase::Idle);
        assert_eq!(timer.elapsed(), Duration::ZERO);
        timer.reset();
        assert_eq!(timer.phase(), Phase::Idle);
        assert_eq!(timer.paused_for(), Duration::ZERO);
    }
}
