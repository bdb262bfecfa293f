//! Cancellable scheduling for the sampling loop and the one-second tickers.
//!
//! Frame requests fire once, on the next pump. Intervals fire every `period`
//! and report how many periods went by since they last fired, so a pump that
//! arrives late (terminal suspended, slow redraw) fires once with a count
//! instead of replaying every missed tick.

use std::collections::BTreeMap;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Handle(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Job {
    FocusFrame,
    CountdownFrame,
    PauseTick,
    RestTick,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fired {
    pub handle: Handle,
    pub job: Job,
    /// Periods elapsed; always 1 for frames.
    pub count: u32,
}

#[derive(Debug, Clone, Copy)]
struct Interval {
    job: Job,
    period: Duration,
    next_due: Duration,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    next_id: u64,
    frames: BTreeMap<Handle, Job>,
    intervals: BTreeMap<Handle, Interval>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_handle(&mut self) -> Handle {
        self.next_id += 1;
        Handle(self.next_id)
    }

    /// Run `job` once on the next pump.
    pub fn request_frame(&mut self, job: Job) -> Handle {
        let handle = self.next_handle();
        self.frames.insert(handle, job);
        handle
    }

    /// Run `job` every `period`, first at `now + period`.
    pub fn every(&mut self, job: Job, period: Duration, now: Duration) -> Handle {
        let handle = self.next_handle();
        self.intervals.insert(
            handle,
            Interval {
                job,
                period,
                next_due: now + period,
            },
        );
        handle
    }

    /// Drop a pending job. Cancelling twice, or after it fired, is a no-op.
    pub fn cancel(&mut self, handle: Handle) {
        self.frames.remove(&handle);
        self.intervals.remove(&handle);
    }

    pub fn is_pending(&self, handle: Handle) -> bool {
        self.frames.contains_key(&handle) || self.intervals.contains_key(&handle)
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty() && self.intervals.is_empty()
    }

    /// Everything due at `now`, frames first, in scheduling order.
    pub fn pump(&mut self, now: Duration) -> Vec<Fired> {
        let mut fired: Vec<Fired> = std::mem::take(&mut self.frames)
            .into_iter()
            .map(|(handle, job)| Fired {
                handle,
                job,
                count: 1,
            })
            .collect();

        for (handle, interval) in self.intervals.iter_mut() {
            if now < interval.next_due || interval.period.is_zero() {
                continue;
            }
            let behind = now - interval.next_due;
            let count = 1 + (behind.as_nanos() / interval.period.as_nanos()) as u32;
            interval.next_due += interval.period * count;
            fired.push(Fired {
                handle: *handle,
                job: interval.job,
                count,
            });
        }

        fired
    }
}
