use std::sync::{Mutex, MutexGuard, PoisonError};

use detangler_shared::Tick;

use crate::DetanglerConfig;

/// Which periodic checks are due after a tick
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DueChecks {
    pub registry_check: bool,
    pub full_sweep: bool,
}

impl DueChecks {
    pub fn any(&self) -> bool {
        self.registry_check || self.full_sweep
    }
}

// TickTimer
/// Counts ticks up to its interval, fires, and restarts from zero.
/// An interval of `0` never fires.
#[derive(Clone, Copy, Debug)]
struct TickTimer {
    interval: Tick,
    elapsed: Tick,
}

impl TickTimer {
    fn new(interval: Tick) -> Self {
        Self {
            interval,
            elapsed: 0,
        }
    }

    fn advance(&mut self, ticks: Tick) -> bool {
        if self.interval == 0 {
            return false;
        }
        self.elapsed = self.elapsed.saturating_add(ticks);
        if self.elapsed >= self.interval {
            self.elapsed = 0;
            return true;
        }
        false
    }

    fn reset(&mut self) {
        self.elapsed = 0;
    }
}

struct SchedulerState {
    last_tick: Option<Tick>,
    registry_check: TickTimer,
    full_sweep: TickTimer,
}

/// Drives the registry check and full sweep cadences from the host's tick
/// counter. There is no internal clock: time only moves when the host
/// reports a tick.
pub struct PeriodicScheduler {
    state: Mutex<SchedulerState>,
}

impl PeriodicScheduler {
    pub fn new(registry_check_interval: Tick, clean_interval: Tick) -> Self {
        Self {
            state: Mutex::new(SchedulerState {
                last_tick: None,
                registry_check: TickTimer::new(registry_check_interval),
                full_sweep: TickTimer::new(clean_interval),
            }),
        }
    }

    pub fn from_config(config: &DetanglerConfig) -> Self {
        Self::new(
            config.registry_check_interval_ticks,
            config.clean_interval_ticks,
        )
    }

    /// Records that the host finished `current_tick` and returns what is due.
    /// A tick reported twice advances nothing; a tick counter that moved
    /// backwards counts as a single step.
    pub fn advance(&self, current_tick: Tick) -> DueChecks {
        let mut state = self.lock();

        let elapsed = match state.last_tick {
            None => 1,
            Some(last) if current_tick == last => return DueChecks::default(),
            Some(last) if current_tick > last => current_tick - last,
            Some(_) => 1,
        };
        state.last_tick = Some(current_tick);

        DueChecks {
            registry_check: state.registry_check.advance(elapsed),
            full_sweep: state.full_sweep.advance(elapsed),
        }
    }

    pub fn reset(&self) {
        let mut state = self.lock();
        state.last_tick = None;
        state.registry_check.reset();
        state.full_sweep.reset();
    }

    fn lock(&self) -> MutexGuard<'_, SchedulerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
