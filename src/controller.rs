//! Wires the timers to the scheduler, the store and the user-facing effects.
//!
//! Every state change happens on the caller's thread: key handlers call the
//! operations below and the event loop calls [`Controller::pump`] once per
//! tick. Scheduled jobs are identified by handle, and a job whose handle is
//! no longer the current one for its timer is ignored, so a cancelled frame
//! can never mutate state.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::config::Config;
use crate::countdown::{
    CountdownInputs, CountdownReport, CountdownSample, CountdownTimer, HmsField,
};
use crate::effects::{Alarm, AlarmTone, Decider, Notice, Notifier};
use crate::error::TimerError;
use crate::focus::{FocusReport, FocusTimer};
use crate::registry::{ActivationRegistry, Tab};
use crate::rest::{RestTick, RestTimer};
use crate::scheduler::{Handle, Job, Scheduler};
use crate::session::{SessionLog, SessionRecord};
use crate::status::StatusLine;
use crate::store::{KvStore, StoreError};
use crate::timer::{Phase, TimerKind};

/// Key of the in-progress focus snapshot
pub const FOCUS_SNAPSHOT_KEY: &str = "pomodoroState";

/// Period of the pause and rest tickers
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FocusSnapshot {
    total_milliseconds: u64,
}

/// Lifecycle events, drained by the event loop after each pump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    FocusCompleted {
        record: SessionRecord,
        work: Duration,
        rest_seconds: u64,
    },
    CountdownCompleted {
        target: Duration,
    },
    CountdownStopped {
        elapsed: Duration,
    },
    RestStarted {
        seconds: u64,
    },
    RestCompleted,
}

#[derive(Debug, Default)]
struct Handles {
    focus_frame: Option<Handle>,
    countdown_frame: Option<Handle>,
    pause_ticker: Option<Handle>,
    rest_ticker: Option<Handle>,
}

pub struct Controller<C: Clock, N: Notifier, A: Alarm> {
    clock: C,
    config: Config,
    store: Box<dyn KvStore>,
    notifier: N,
    alarm: A,

    focus: FocusTimer,
    countdown: CountdownTimer,
    inputs: CountdownInputs,
    rest: Option<RestTimer>,
    sessions: SessionLog,

    registry: ActivationRegistry,
    scheduler: Scheduler,
    handles: Handles,
    tab: Tab,
    focus_status: StatusLine,
    countdown_status: StatusLine,
    signals: Vec<Signal>,
    last_snapshot_secs: Option<u64>,
}

impl<C: Clock, N: Notifier, A: Alarm> Controller<C, N, A> {
    /// Load the session log and discard any focus snapshot left behind by a
    /// previous run; a focus timer never survives a restart.
    pub fn new(
        clock: C,
        config: Config,
        mut store: Box<dyn KvStore>,
        notifier: N,
        alarm: A,
    ) -> Self {
        let sessions = SessionLog::load(store.as_ref());
        if let Err(e) = store.remove(FOCUS_SNAPSHOT_KEY) {
            tracing::warn!(error = %e, "could not discard stale focus snapshot");
        }
        Self {
            clock,
            config,
            store,
            notifier,
            alarm,
            focus: FocusTimer::new(),
            countdown: CountdownTimer::new(),
            inputs: CountdownInputs::default(),
            rest: None,
            sessions,
            registry: ActivationRegistry::new(),
            scheduler: Scheduler::new(),
            handles: Handles::default(),
            tab: Tab::Focus,
            focus_status: StatusLine::new(),
            countdown_status: StatusLine::new(),
            signals: Vec::new(),
            last_snapshot_secs: None,
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn focus(&self) -> &FocusTimer {
        &self.focus
    }

    pub fn countdown(&self) -> &CountdownTimer {
        &self.countdown
    }

    pub fn inputs(&self) -> CountdownInputs {
        self.inputs
    }

    pub fn sessions(&self) -> &SessionLog {
        &self.sessions
    }

    pub fn store(&self) -> &dyn KvStore {
        self.store.as_ref()
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn alarm(&self) -> &A {
        &self.alarm
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn registry(&self) -> &ActivationRegistry {
        &self.registry
    }

    pub fn status(&self, kind: TimerKind) -> &StatusLine {
        match kind {
            TimerKind::Focus => &self.focus_status,
            TimerKind::Countdown => &self.countdown_status,
        }
    }

    /// Whole seconds of rest left, while resting.
    pub fn rest_remaining(&self) -> Option<u64> {
        let now = self.clock.now();
        self.rest
            .as_ref()
            .filter(|rest| !rest.is_finished())
            .map(|rest| rest.remaining_secs(now))
    }

    pub fn is_resting(&self) -> bool {
        self.rest.is_some()
    }

    pub fn drain_signals(&mut self) -> Vec<Signal> {
        std::mem::take(&mut self.signals)
    }

    // ---- focus ----

    pub fn toggle_focus(&mut self, decider: &mut dyn Decider) -> Result<(), TimerError> {
        match self.focus.phase() {
            Phase::Running => self.pause_focus(),
            _ => self.start_focus(decider),
        }
    }

    /// Start a fresh run, or resume a paused one.
    pub fn start_focus(&mut self, decider: &mut dyn Decider) -> Result<(), TimerError> {
        if self.focus.phase() == Phase::Paused {
            self.cancel(|h| &mut h.pause_ticker);
        }
        let clock = &self.clock;
        match self.focus.start(|| clock.now(), decider) {
            Ok(resumed) => {
                let message = if resumed.is_some() {
                    "Timer resumed..."
                } else {
                    "Timer running..."
                };
                self.focus_status.show(message);
                self.handles.focus_frame = Some(self.scheduler.request_frame(Job::FocusFrame));
                self.sync_registry();
                Ok(())
            }
            Err(e) => {
                if self.focus.phase() == Phase::Paused {
                    self.start_pause_ticker(self.clock.now());
                }
                self.reject(TimerKind::Focus, e)
            }
        }
    }

    pub fn pause_focus(&mut self) -> Result<(), TimerError> {
        let now = self.clock.now();
        self.cancel(|h| &mut h.focus_frame);
        match self.focus.pause(now) {
            Ok(elapsed) => {
                self.persist_snapshot(elapsed);
                self.start_pause_ticker(now);
                self.focus_status.show("Timer paused.");
                self.sync_registry();
                Ok(())
            }
            Err(e) => self.reject(TimerKind::Focus, e),
        }
    }

    pub fn resume_focus(&mut self, decider: &mut dyn Decider) -> Result<(), TimerError> {
        if self.focus.phase() != Phase::Paused {
            let e = TimerError::invalid(TimerKind::Focus, "resume", self.focus.phase());
            return self.reject(TimerKind::Focus, e);
        }
        self.start_focus(decider)
    }

    /// Finish the run: log it, announce it, and offer the rest it earned.
    pub fn stop_focus(&mut self, decider: &mut dyn Decider) -> Result<FocusReport, TimerError> {
        let now = self.clock.now();
        self.cancel(|h| &mut h.focus_frame);
        self.cancel(|h| &mut h.pause_ticker);
        let report = match self.focus.stop(now) {
            Ok(report) => report,
            Err(e) => return self.reject(TimerKind::Focus, e),
        };
        self.sync_registry();
        self.clear_snapshot();

        let record = self
            .sessions
            .append(report.work_seconds(), self.store.as_mut());
        self.play_alarm(self.config.alarm);
        self.notify(Notice::new(
            "Pomodoro Complete!",
            format!(
                "Great job! You worked for {} minutes.",
                report.work_minutes()
            ),
        ));
        self.focus_status.show(format!(
            "You worked for {} minutes. Rest needed: {} seconds.",
            report.work_minutes(),
            report.rest_seconds
        ));
        self.signals.push(Signal::FocusCompleted {
            record,
            work: report.work,
            rest_seconds: report.rest_seconds,
        });

        if decider.confirm(&format!("Start {} seconds of rest?", report.rest_seconds)) {
            self.start_rest(report.rest_seconds);
        }
        Ok(report)
    }

    /// Discard the current run without logging it.
    pub fn reset_focus(&mut self) {
        self.cancel(|h| &mut h.focus_frame);
        self.cancel(|h| &mut h.pause_ticker);
        self.focus.reset();
        self.clear_snapshot();
        self.focus_status.clear();
        self.sync_registry();
    }

    fn start_pause_ticker(&mut self, now: Duration) {
        self.cancel(|h| &mut h.pause_ticker);
        self.handles.pause_ticker = Some(self.scheduler.every(Job::PauseTick, TICK_PERIOD, now));
    }

    // ---- rest ----

    pub fn start_rest(&mut self, seconds: u64) {
        let now = self.clock.now();
        self.cancel(|h| &mut h.rest_ticker);
        self.rest = Some(RestTimer::start(seconds, now));
        self.handles.rest_ticker = Some(self.scheduler.every(Job::RestTick, TICK_PERIOD, now));
        self.focus_status
            .show(format!("Resting... {seconds} seconds remaining."));
        self.signals.push(Signal::RestStarted { seconds });
        tracing::info!(seconds, "rest started");
    }

    fn poll_rest(&mut self, now: Duration) {
        let Some(rest) = self.rest.as_mut() else {
            return;
        };
        match rest.tick(now) {
            Some(RestTick::Remaining(secs)) => {
                self.focus_status
                    .show(format!("Resting... {secs} seconds remaining."));
            }
            Some(RestTick::Finished) => {
                self.cancel(|h| &mut h.rest_ticker);
                self.rest = None;
                self.play_alarm(self.config.alarm);
                self.notify(Notice::new("Rest Complete!", "Time to get back to work!"));
                self.focus_status.show("Rest is over! Get back to work.");
                self.signals.push(Signal::RestCompleted);
                tracing::info!("rest completed");
            }
            None => {}
        }
    }

    // ---- countdown ----

    /// Set the countdown from the three inputs.
    pub fn configure_countdown(
        &mut self,
        hours: u64,
        minutes: u64,
        seconds: u64,
    ) -> Result<(), TimerError> {
        self.configure_inputs(CountdownInputs {
            hours,
            minutes,
            seconds,
        })
    }

    pub fn adjust_input(&mut self, field: HmsField, delta: i64) -> Result<(), TimerError> {
        self.configure_inputs(self.inputs.adjusted(field, delta))
    }

    /// Load the preset at `index`. Out-of-range indices do nothing.
    pub fn apply_preset(&mut self, index: usize) -> Result<(), TimerError> {
        let Some(&secs) = self.config.presets.get(index) else {
            return Ok(());
        };
        self.configure_inputs(CountdownInputs::from_duration(Duration::from_secs(secs)))
    }

    fn configure_inputs(&mut self, inputs: CountdownInputs) -> Result<(), TimerError> {
        if let Err(e) = self.registry.check_configure() {
            return self.reject(TimerKind::Countdown, e);
        }
        if let Err(e) = self.countdown.configure(inputs.to_duration()) {
            return self.reject(TimerKind::Countdown, e);
        }
        self.inputs = inputs;
        Ok(())
    }

    pub fn toggle_countdown(&mut self) -> Result<(), TimerError> {
        match self.countdown.phase() {
            Phase::Running => self.pause_countdown(),
            Phase::Paused => self.resume_countdown(),
            _ => self.start_countdown(),
        }
    }

    pub fn start_countdown(&mut self) -> Result<(), TimerError> {
        let now = self.clock.now();
        let resuming = self.countdown.phase() == Phase::Paused;
        if let Err(e) = self.countdown.start(now) {
            return self.reject(TimerKind::Countdown, e);
        }
        self.countdown_status.show(if resuming {
            "Custom timer resumed..."
        } else {
            "Custom timer running..."
        });
        self.handles.countdown_frame = Some(self.scheduler.request_frame(Job::CountdownFrame));
        self.sync_registry();
        Ok(())
    }

    pub fn pause_countdown(&mut self) -> Result<(), TimerError> {
        let now = self.clock.now();
        self.cancel(|h| &mut h.countdown_frame);
        if let Err(e) = self.countdown.pause(now) {
            return self.reject(TimerKind::Countdown, e);
        }
        self.countdown_status.show("Custom timer paused...");
        self.sync_registry();
        Ok(())
    }

    pub fn resume_countdown(&mut self) -> Result<(), TimerError> {
        if self.countdown.phase() != Phase::Paused {
            let e = TimerError::invalid(TimerKind::Countdown, "resume", self.countdown.phase());
            return self.reject(TimerKind::Countdown, e);
        }
        self.start_countdown()
    }

    /// Manual stop before the target is reached.
    pub fn stop_countdown(&mut self) -> Result<CountdownReport, TimerError> {
        let now = self.clock.now();
        self.cancel(|h| &mut h.countdown_frame);
        let report = match self.countdown.stop(now) {
            Ok(report) => report,
            Err(e) => return self.reject(TimerKind::Countdown, e),
        };
        self.sync_registry();

        let secs = report.elapsed.as_secs();
        let (minutes, seconds) = (secs / 60, secs % 60);
        self.notify(Notice::new(
            "Custom Timer Stopped!",
            format!("You worked for {minutes} minutes and {seconds} seconds."),
        ));
        self.countdown_status.show(format!(
            "Timer stopped. You worked for {minutes}:{seconds:02}."
        ));
        self.signals.push(Signal::CountdownStopped {
            elapsed: report.elapsed,
        });
        tracing::info!(elapsed = ?report.elapsed, "countdown stopped");
        Ok(report)
    }

    /// Back to the configured target. A completion or stop message stays up.
    pub fn reset_countdown(&mut self) {
        let was_active = self.countdown.is_active();
        self.cancel(|h| &mut h.countdown_frame);
        self.countdown.reset();
        if was_active {
            self.countdown_status.clear();
        }
        self.sync_registry();
    }

    fn complete_countdown(&mut self, report: CountdownReport) {
        self.cancel(|h| &mut h.countdown_frame);
        self.play_alarm(AlarmTone::Standard);
        self.notify(Notice::new(
            "Custom Timer Complete!",
            format!(
                "Great job! You completed your {} minute session.",
                report.target.as_secs() / 60
            ),
        ));
        self.countdown_status
            .show("Custom timer completed! Great work!");
        self.signals.push(Signal::CountdownCompleted {
            target: report.target,
        });
        tracing::info!(target = ?report.target, "countdown completed");
        self.countdown.reset();
        self.sync_registry();
    }

    // ---- context ----

    pub fn switch_tab(&mut self, to: Tab) -> Result<(), TimerError> {
        if let Err(e) = self.registry.check_switch(self.tab, to) {
            let line = match &e {
                TimerError::ContextLocked { active } => *active,
                _ => self.tab.kind(),
            };
            return self.reject(line, e);
        }
        self.tab = to;
        Ok(())
    }

    // ---- loop ----

    /// One pass of the sampling loop: expire flashes, then run whatever the
    /// scheduler has due.
    pub fn pump(&mut self) {
        let now = self.clock.now();
        self.focus_status.expire(now);
        self.countdown_status.expire(now);

        for fired in self.scheduler.pump(now) {
            let current = match fired.job {
                Job::FocusFrame => self.handles.focus_frame,
                Job::CountdownFrame => self.handles.countdown_frame,
                Job::PauseTick => self.handles.pause_ticker,
                Job::RestTick => self.handles.rest_ticker,
            };
            if current != Some(fired.handle) {
                tracing::trace!(job = ?fired.job, "ignoring stale job");
                continue;
            }

            match fired.job {
                Job::FocusFrame => {
                    self.handles.focus_frame = None;
                    if let Some(elapsed) = self.focus.sample(now) {
                        self.persist_snapshot(elapsed);
                        self.handles.focus_frame =
                            Some(self.scheduler.request_frame(Job::FocusFrame));
                    }
                }
                Job::CountdownFrame => {
                    self.handles.countdown_frame = None;
                    match self.countdown.sample(now) {
                        Some(CountdownSample::Running { .. }) => {
                            self.handles.countdown_frame =
                                Some(self.scheduler.request_frame(Job::CountdownFrame));
                        }
                        Some(CountdownSample::Completed(report)) => self.complete_countdown(report),
                        None => {}
                    }
                }
                Job::PauseTick => {
                    let paused = self.focus.add_paused(TICK_PERIOD * fired.count);
                    self.focus_status
                        .show(format!("Paused for {} seconds.", paused.as_secs()));
                }
                Job::RestTick => self.poll_rest(now),
            }
        }
    }

    /// Resynchronize every running timer with the clock right away, e.g.
    /// after the terminal regains focus.
    pub fn reactivate(&mut self) {
        let now = self.clock.now();
        if let Some(elapsed) = self.focus.sample(now) {
            self.persist_snapshot(elapsed);
        }
        if let Some(CountdownSample::Completed(report)) = self.countdown.sample(now) {
            self.complete_countdown(report);
        }
        self.poll_rest(now);
        tracing::debug!("timers resynchronized");
    }

    /// Write the in-progress focus snapshot one last time.
    pub fn shutdown(&mut self) {
        if self.focus.is_active() {
            let now = self.clock.now();
            let elapsed = self.focus.sample(now).unwrap_or(self.focus.elapsed());
            self.last_snapshot_secs = None;
            self.persist_snapshot(elapsed);
        }
        tracing::debug!("controller shut down");
    }

    // ---- helpers ----

    fn cancel(&mut self, slot: impl FnOnce(&mut Handles) -> &mut Option<Handle>) {
        if let Some(handle) = slot(&mut self.handles).take() {
            self.scheduler.cancel(handle);
        }
    }

    fn sync_registry(&mut self) {
        self.registry
            .set_active(TimerKind::Focus, self.focus.is_active());
        self.registry
            .set_active(TimerKind::Countdown, self.countdown.is_active());
    }

    fn reject<T>(&mut self, line: TimerKind, e: TimerError) -> Result<T, TimerError> {
        tracing::debug!(error = %e, "request rejected");
        let now = self.clock.now();
        match line {
            TimerKind::Focus => self.focus_status.flash(e.to_string(), now),
            TimerKind::Countdown => self.countdown_status.flash(e.to_string(), now),
        }
        Err(e)
    }

    /// Only written when the displayed whole second changes.
    fn persist_snapshot(&mut self, elapsed: Duration) {
        let secs = elapsed.as_secs();
        if self.last_snapshot_secs == Some(secs) {
            return;
        }
        let snapshot = FocusSnapshot {
            total_milliseconds: elapsed.as_millis() as u64,
        };
        let result = serde_json::to_vec(&snapshot)
            .map_err(StoreError::Encode)
            .and_then(|bytes| self.store.store(FOCUS_SNAPSHOT_KEY, &bytes));
        match result {
            Ok(()) => self.last_snapshot_secs = Some(secs),
            Err(e) => tracing::debug!(error = %e, "focus snapshot not written"),
        }
    }

    fn clear_snapshot(&mut self) {
        self.last_snapshot_secs = None;
        if let Err(e) = self.store.remove(FOCUS_SNAPSHOT_KEY) {
            tracing::debug!(error = %e, "focus snapshot not removed");
        }
    }

    fn notify(&mut self, notice: Notice) {
        if !self.config.notifications {
            return;
        }
        if let Err(e) = self.notifier.notify(&notice) {
            tracing::debug!(error = %e, title = %notice.title, "notification skipped");
        }
    }

    fn play_alarm(&mut self, tone: AlarmTone) {
        if let Err(e) = self.alarm.play(tone) {
            tracing::warn!(error = %e, %tone, "could not play alarm");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::effects::{FixedDecider, RecordingAlarm, RecordingNotifier};
    use crate::session::SESSION_LOG_KEY;
    use crate::store::MemoryStore;
    use assert_matches::assert_matches;

    type TestController = Controller<ManualClock, RecordingNotifier, RecordingAlarm>;

    fn controller_with(store: MemoryStore) -> (TestController, ManualClock) {
        let clock = ManualClock::new();
        let controller = Controller::new(
            clock.clone(),
            Config::default(),
            Box::new(store),
            RecordingNotifier::default(),
            RecordingAlarm::default(),
        );
        (controller, clock)
    }

    fn controller() -> (TestController, ManualClock) {
        controller_with(MemoryStore::new())
    }

    /// Advance in frame-sized steps, pumping after each.
    fn run_for(controller: &mut TestController, clock: &ManualClock, ms: u64) {
        let mut left = ms;
        while left > 0 {
            let step = left.min(16);
            clock.advance_ms(step);
            controller.pump();
            left -= step;
        }
    }

    fn snapshot(controller: &TestController) -> Option<serde_json::Value> {
        controller
            .store()
            .load(FOCUS_SNAPSHOT_KEY)
            .unwrap()
            .map(|bytes| serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn countdown_completes_once_and_announces() {
        let (mut c, clock) = controller();
        c.configure_countdown(0, 1, 30).unwrap();
        assert_eq!(c.countdown().target(), Duration::from_millis(90_000));
        c.start_countdown().unwrap();

        run_for(&mut c, &clock, 90_000);
        run_for(&mut c, &clock, 5_000);

        let completions: Vec<_> = c
            .drain_signals()
            .into_iter()
            .filter(|s| matches!(s, Signal::CountdownCompleted { .. }))
            .collect();
        assert_eq!(
            completions,
            vec![Signal::CountdownCompleted {
                target: Duration::from_secs(90)
            }]
        );
        assert_eq!(
            c.notifier().sent,
            vec![Notice::new(
                "Custom Timer Complete!",
                "Great job! You completed your 1 minute session."
            )]
        );
        assert_eq!(c.alarm().played, vec![AlarmTone::Standard]);
        assert_eq!(
            c.status(TimerKind::Countdown).text(),
            "Custom timer completed! Great work!"
        );
        // ready for another run with the same target
        assert_eq!(c.countdown().phase(), Phase::Idle);
        assert_eq!(c.countdown().remaining(), Duration::from_secs(90));
        assert!(!c.registry().any_active());
    }

    #[test]
    fn countdown_completion_after_background_gap() {
        let (mut c, clock) = controller();
        c.configure_countdown(0, 0, 10).unwrap();
        c.start_countdown().unwrap();
        c.pump();

        clock.advance(Duration::from_secs(60));
        c.reactivate();
        c.pump();

        assert_eq!(c.notifier().sent.len(), 1);
        assert_eq!(c.countdown().phase(), Phase::Idle);
    }

    #[test]
    fn focus_stop_logs_session_and_offers_rest() {
        let (mut c, clock) = controller();
        let mut decider = FixedDecider::no();
        c.start_focus(&mut decider).unwrap();
        assert_eq!(c.status(TimerKind::Focus).text(), "Timer running...");

        clock.advance_ms(400_000);
        c.pump();
        let report = c.stop_focus(&mut decider).unwrap();

        assert_eq!(report.work_seconds(), 400);
        assert_eq!(report.rest_seconds, 80);
        assert_eq!(
            c.sessions().records(),
            &[SessionRecord {
                session: 1,
                duration: 400
            }]
        );
        assert_eq!(decider.asked, vec!["Start 80 seconds of rest?".to_string()]);
        assert_eq!(
            c.notifier().sent,
            vec![Notice::new(
                "Pomodoro Complete!",
                "Great job! You worked for 6 minutes."
            )]
        );
        assert_eq!(
            c.status(TimerKind::Focus).text(),
            "You worked for 6 minutes. Rest needed: 80 seconds."
        );
        assert!(c.store().load(SESSION_LOG_KEY).unwrap().is_some());
        assert_eq!(snapshot(&c), None);
        assert!(!c.is_resting());
        assert_eq!(c.focus().phase(), Phase::Idle);
    }

    #[test]
    fn short_focus_run_still_offers_empty_rest() {
        let (mut c, clock) = controller();
        let mut decider = FixedDecider::yes();
        c.start_focus(&mut decider).unwrap();
        clock.advance_ms(30_000);
        let report = c.stop_focus(&mut decider).unwrap();
        assert_eq!(report.rest_seconds, 0);
        assert_eq!(decider.asked, vec!["Start 0 seconds of rest?".to_string()]);
        assert_eq!(c.rest_remaining(), Some(0));

        clock.advance_ms(1_000);
        c.pump();
        assert!(!c.is_resting());
        assert_eq!(c.alarm().played.len(), 2);
    }

    #[test]
    fn accepted_rest_runs_to_completion() {
        let config = Config {
            alarm: AlarmTone::High,
            ..Config::default()
        };
        let clock = ManualClock::new();
        let mut c = Controller::new(
            clock.clone(),
            config,
            Box::new(MemoryStore::new()),
            RecordingNotifier::default(),
            RecordingAlarm::default(),
        );
        let mut decider = FixedDecider::yes();
        c.start_focus(&mut decider).unwrap();
        clock.advance_ms(600_000);
        c.stop_focus(&mut decider).unwrap();
        assert_eq!(c.rest_remaining(), Some(120));

        clock.advance_ms(2_500);
        c.pump();
        assert_eq!(
            c.status(TimerKind::Focus).text(),
            "Resting... 118 seconds remaining."
        );

        clock.advance_ms(200_000);
        c.pump();
        c.pump();
        assert!(!c.is_resting());
        assert_eq!(
            c.status(TimerKind::Focus).text(),
            "Rest is over! Get back to work."
        );
        assert_eq!(c.alarm().played, vec![AlarmTone::High, AlarmTone::High]);
        let rest_done = c
            .drain_signals()
            .into_iter()
            .filter(|s| *s == Signal::RestCompleted)
            .count();
        assert_eq!(rest_done, 1);
        assert_eq!(
            c.notifier().sent.last(),
            Some(&Notice::new("Rest Complete!", "Time to get back to work!"))
        );
    }

    #[test]
    fn pause_accumulates_and_deduction_applies() {
        let (mut c, clock) = controller();
        let mut decider = FixedDecider::yes();
        c.start_focus(&mut decider).unwrap();
        run_for(&mut c, &clock, 10_000);
        c.pause_focus().unwrap();

        run_for(&mut c, &clock, 5_000);
        assert_eq!(c.focus().paused_for(), Duration::from_secs(5));
        assert_eq!(c.status(TimerKind::Focus).text(), "Paused for 5 seconds.");

        c.toggle_focus(&mut decider).unwrap();
        assert_eq!(
            decider.asked,
            vec!["You paused for 5 seconds. Deduct this time from your work session?".to_string()]
        );
        assert_eq!(c.focus().elapsed(), Duration::from_secs(5));
        assert_eq!(c.status(TimerKind::Focus).text(), "Timer resumed...");

        // the pause ticker is gone after resuming
        run_for(&mut c, &clock, 3_000);
        assert_eq!(c.focus().paused_for(), Duration::ZERO);
        assert_eq!(c.focus().elapsed(), Duration::from_secs(8));
    }

    /// Answers only after `delay` has passed on the clock.
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
    fn deduction_prompt_time_is_not_counted_as_work() {
        for (answer, expected) in [(false, 10), (true, 5)] {
            let (mut c, clock) = controller();
            let mut decider = SlowDecider {
                clock: clock.clone(),
                delay: Duration::from_secs(10),
                answer,
            };
            c.start_focus(&mut decider).unwrap();
            run_for(&mut c, &clock, 10_000);
            c.pause_focus().unwrap();
            run_for(&mut c, &clock, 5_000);

            c.resume_focus(&mut decider).unwrap();
            c.pump();
            assert_eq!(c.focus().elapsed(), Duration::from_secs(expected));
            run_for(&mut c, &clock, 1_000);
            assert_eq!(c.focus().elapsed(), Duration::from_secs(expected + 1));
        }
    }

    #[test]
    fn paused_focus_does_not_advance() {
        let (mut c, clock) = controller();
        let mut decider = FixedDecider::no();
        c.start_focus(&mut decider).unwrap();
        run_for(&mut c, &clock, 2_000);
        c.pause_focus().unwrap();
        run_for(&mut c, &clock, 4_000);
        assert_eq!(c.focus().elapsed(), Duration::from_secs(2));
        c.resume_focus(&mut decider).unwrap();
        assert_eq!(c.focus().elapsed(), Duration::from_secs(2));
    }

    #[test]
    fn countdown_locked_while_focus_runs() {
        let (mut c, clock) = controller();
        c.configure_countdown(0, 5, 0).unwrap();
        c.start_focus(&mut FixedDecider::no()).unwrap();

        let err = c.configure_countdown(0, 10, 0).unwrap_err();
        assert_eq!(
            err,
            TimerError::ConfigurationLocked {
                active: TimerKind::Focus
            }
        );
        assert_eq!(c.countdown().target(), Duration::from_secs(300));
        assert_eq!(c.inputs().minutes, 5);
        assert!(c.status(TimerKind::Countdown).is_flashing());
        assert_eq!(
            c.status(TimerKind::Countdown).text(),
            "Cannot change the countdown while the focus timer is running."
        );

        clock.advance(Duration::from_secs(2));
        c.pump();
        assert!(!c.status(TimerKind::Countdown).is_flashing());
        assert_eq!(c.status(TimerKind::Countdown).text(), "");
    }

    #[test]
    fn tab_switch_refused_while_active() {
        let (mut c, _clock) = controller();
        c.start_focus(&mut FixedDecider::no()).unwrap();
        assert_matches!(
            c.switch_tab(Tab::Countdown),
            Err(TimerError::ContextLocked {
                active: TimerKind::Focus
            })
        );
        assert_eq!(c.tab(), Tab::Focus);
        assert!(c.status(TimerKind::Focus).is_flashing());

        c.pause_focus().unwrap();
        assert!(c.switch_tab(Tab::Countdown).is_err());

        c.reset_focus();
        c.switch_tab(Tab::Countdown).unwrap();
        assert_eq!(c.tab(), Tab::Countdown);
    }

    #[test]
    fn unconfigured_countdown_refuses_to_start() {
        let (mut c, _clock) = controller();
        assert_eq!(c.start_countdown(), Err(TimerError::UnconfiguredStart));
        assert_eq!(
            c.status(TimerKind::Countdown).text(),
            "Please set a timer duration first."
        );
        assert_eq!(c.countdown().phase(), Phase::Idle);
    }

    #[test]
    fn countdown_pause_cancels_pending_frame() {
        let (mut c, clock) = controller();
        c.configure_countdown(0, 0, 3).unwrap();
        c.start_countdown().unwrap();
        clock.advance_ms(1_000);
        c.pause_countdown().unwrap();

        clock.advance_ms(10_000);
        c.pump();
        assert_eq!(c.countdown().phase(), Phase::Paused);
        assert_eq!(c.countdown().remaining(), Duration::from_secs(2));

        c.toggle_countdown().unwrap();
        assert_eq!(
            c.status(TimerKind::Countdown).text(),
            "Custom timer resumed..."
        );
        run_for(&mut c, &clock, 2_000);
        assert_eq!(c.notifier().sent.len(), 1);
    }

    #[test]
    fn manual_countdown_stop_reports_elapsed() {
        let (mut c, clock) = controller();
        c.configure_countdown(0, 10, 0).unwrap();
        c.start_countdown().unwrap();
        run_for(&mut c, &clock, 75_000);
        let report = c.stop_countdown().unwrap();
        assert_eq!(report.elapsed, Duration::from_secs(75));
        assert_eq!(
            c.notifier().sent,
            vec![Notice::new(
                "Custom Timer Stopped!",
                "You worked for 1 minutes and 15 seconds."
            )]
        );
        assert_eq!(
            c.status(TimerKind::Countdown).text(),
            "Timer stopped. You worked for 1:15."
        );
        assert!(c.alarm().played.is_empty());

        c.reset_countdown();
        assert_eq!(
            c.status(TimerKind::Countdown).text(),
            "Timer stopped. You worked for 1:15."
        );
        assert_eq!(c.countdown().remaining(), Duration::from_secs(600));
    }

    #[test]
    fn presets_fill_the_inputs() {
        let (mut c, _clock) = controller();
        c.apply_preset(3).unwrap();
        assert_eq!(c.countdown().target(), Duration::from_secs(1500));
        assert_eq!(c.inputs().minutes, 25);
        c.apply_preset(42).unwrap();
        assert_eq!(c.countdown().target(), Duration::from_secs(1500));

        c.adjust_input(HmsField::Hours, 1).unwrap();
        assert_eq!(c.countdown().target(), Duration::from_secs(5100));
    }

    #[test]
    fn snapshot_tracks_whole_seconds_and_clears_on_reset() {
        let (mut c, clock) = controller();
        c.start_focus(&mut FixedDecider::no()).unwrap();
        run_for(&mut c, &clock, 1_500);
        assert_eq!(
            snapshot(&c),
            Some(serde_json::json!({ "totalMilliseconds": 1008 }))
        );

        c.shutdown();
        assert_eq!(
            snapshot(&c),
            Some(serde_json::json!({ "totalMilliseconds": 1500 }))
        );

        c.reset_focus();
        assert_eq!(snapshot(&c), None);
    }

    #[test]
    fn stale_snapshot_is_discarded_at_startup() {
        let mut store = MemoryStore::new();
        store
            .store(FOCUS_SNAPSHOT_KEY, br#"{"totalMilliseconds":5000}"#)
            .unwrap();
        let (c, _clock) = controller_with(store);
        assert_eq!(snapshot(&c), None);
        assert_eq!(c.focus().elapsed(), Duration::ZERO);
    }

    #[test]
    fn session_numbering_resumes_from_store() {
        let mut store = MemoryStore::new();
        store
            .store(SESSION_LOG_KEY, br#"[{"session":1,"duration":400}]"#)
            .unwrap();
        let (mut c, clock) = controller_with(store);
        let mut decider = FixedDecider::no();
        c.start_focus(&mut decider).unwrap();
        clock.advance_ms(60_000);
        c.stop_focus(&mut decider).unwrap();
        assert_eq!(c.sessions().records()[1].session, 2);
    }

    #[test]
    fn disabled_notifications_still_sound_alarm() {
        let clock = ManualClock::new();
        let config = Config {
            notifications: false,
            ..Config::default()
        };
        let mut c = Controller::new(
            clock.clone(),
            config,
            Box::new(MemoryStore::new()),
            RecordingNotifier::default(),
            RecordingAlarm::default(),
        );
        let mut decider = FixedDecider::no();
        c.start_focus(&mut decider).unwrap();
        clock.advance_ms(1_000);
        c.stop_focus(&mut decider).unwrap();
        assert!(c.notifier().sent.is_empty());
        assert_eq!(c.alarm().played, vec![AlarmTone::Standard]);
    }
}
