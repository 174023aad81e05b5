//! Production scheduler: independent periodic tasks on one virtual clock.
//!
//! A producer with rate `r` credits one unit every `1000 / r` milliseconds.
//! Firings are counted from the install time (`floor(elapsed * r / 1000)`),
//! so fractional intervals never drift and the first credit lands exactly
//! one interval after the task is installed.

use crate::ledger::ResourceLedger;
use crate::state::ResourceId;

const MS_PER_SECOND: u64 = 1_000;

/// What a periodic task does when it fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Task {
    /// Credit one unit of the resource per firing.
    Produce(ResourceId),
    Autosave,
}

#[derive(Clone, Debug)]
struct Schedule {
    task: Task,
    /// Fires `count` times per `window_ms`.
    count: u64,
    window_ms: u64,
    installed_at: u64,
    fired: u64,
}

impl Schedule {
    fn due_total(&self, now_ms: u64) -> u64 {
        let elapsed = u128::from(now_ms.saturating_sub(self.installed_at));
        let total = elapsed * u128::from(self.count) / u128::from(self.window_ms);
        u64::try_from(total).unwrap_or(u64::MAX)
    }

    /// Clock time of the next firing.
    fn next_due_ms(&self) -> u64 {
        // Smallest t with floor(t * count / window) > fired.
        let needed = u128::from(self.fired + 1) * u128::from(self.window_ms);
        let count = u128::from(self.count);
        let offset = needed.div_ceil(count);
        self.installed_at
            .saturating_add(u64::try_from(offset).unwrap_or(u64::MAX))
    }
}

/// Work done by one [`ProductionScheduler::advance`] call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Firings {
    /// Units credited per resource, in `ResourceId::all()` order, zeros omitted.
    pub credited: Vec<(ResourceId, u64)>,
    pub autosaves: u64,
}

impl Firings {
    pub fn is_empty(&self) -> bool {
        self.credited.is_empty() && self.autosaves == 0
    }

    pub fn credited(&self, id: ResourceId) -> u64 {
        self.credited
            .iter()
            .find(|(r, _)| *r == id)
            .map_or(0, |(_, n)| *n)
    }
}

#[derive(Clone, Debug, Default)]
pub struct ProductionScheduler {
    now_ms: u64,
    schedules: Vec<Schedule>,
}

impl ProductionScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Cancel the resource's task and, for `rate > 0`, install a new one
    /// starting now.
    pub fn reschedule(&mut self, id: ResourceId, rate: u64) {
        self.cancel(Task::Produce(id));
        if rate > 0 {
            self.install(Task::Produce(id), rate, MS_PER_SECOND);
        }
    }

    /// Replace the autosave task. `interval_ms == 0` disables autosave.
    pub fn schedule_autosave(&mut self, interval_ms: u64) {
        self.cancel(Task::Autosave);
        if interval_ms > 0 {
            self.install(Task::Autosave, 1, interval_ms);
        }
    }

    pub fn is_scheduled(&self, task: Task) -> bool {
        self.schedules.iter().any(|s| s.task == task)
    }

    /// Clock time at which the task fires next.
    pub fn next_due_ms(&self, task: Task) -> Option<u64> {
        self.schedules
            .iter()
            .find(|s| s.task == task)
            .map(Schedule::next_due_ms)
    }

    /// Move the clock forward and credit every producer that came due.
    pub fn advance(&mut self, elapsed_ms: u64, ledger: &mut ResourceLedger) -> Firings {
        self.now_ms = self.now_ms.saturating_add(elapsed_ms);
        let now = self.now_ms;

        let mut credited = [0u64; ResourceId::COUNT];
        let mut autosaves = 0;
        for schedule in &mut self.schedules {
            let due = schedule.due_total(now);
            let fresh = due.saturating_sub(schedule.fired);
            if fresh == 0 {
                continue;
            }
            schedule.fired = due;
            match schedule.task {
                Task::Produce(id) => {
                    ledger.credit(id, fresh);
                    credited[id.index()] += fresh;
                }
                Task::Autosave => autosaves += fresh,
            }
        }

        Firings {
            credited: ResourceId::all()
                .iter()
                .filter(|id| credited[id.index()] > 0)
                .map(|&id| (id, credited[id.index()]))
                .collect(),
            autosaves,
        }
    }

    fn cancel(&mut self, task: Task) {
        self.schedules.retain(|s| s.task != task);
    }

    fn install(&mut self, task: Task, count: u64, window_ms: u64) {
        self.schedules.push(Schedule {
            task,
            count,
            window_ms,
            installed_at: self.now_ms,
            fired: 0,
        });
    }
}
