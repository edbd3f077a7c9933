use std::sync::atomic;


// Resource contraints, counted from the start of a solve call:
pub struct Budget {
    conflict_budget: i64,    // -1 means no budget.
    propagation_budget: i64, // -1 means no budget.
    asynch_interrupt: atomic::AtomicBool,
}

impl Budget {
    pub fn new() -> Budget {
        Budget {
            conflict_budget: -1,
            propagation_budget: -1,
            asynch_interrupt: atomic::AtomicBool::new(false),
        }
    }

    pub fn within(&self, conflicts: u64, propagations: u64) -> bool {
        !self.interrupted()
            && (self.conflict_budget < 0 || conflicts < self.conflict_budget as u64)
            && (self.propagation_budget < 0 || propagations < self.propagation_budget as u64)
    }

    pub fn interrupt(&self) {
        self.asynch_interrupt.store(true, atomic::Ordering::Relaxed);
    }

    pub fn interrupted(&self) -> bool {
        self.asynch_interrupt.load(atomic::Ordering::Relaxed)
    }

    pub fn set_conflict_budget(&mut self, conflicts: u64) {
        self.conflict_budget = conflicts as i64;
    }

    pub fn set_propagation_budget(&mut self, propagations: u64) {
        self.propagation_budget = propagations as i64;
    }

    pub fn off(&mut self) {
        self.conflict_budget = -1;
        self.propagation_budget = -1;
        self.asynch_interrupt.store(false, atomic::Ordering::Relaxed);
    }
}

impl Default for Budget {
    fn default() -> Self {
        Budget::new()
    }
}


/// Observer of a single solve call. The search polls `detected_conflict` once
/// per conflict and gives up with `SolveRes::Canceled` when it returns `false`.
pub trait SolveHandler {
    /// Called before the search starts
    fn started(&mut self) {}

    /// Called on every conflict; `false` cancels the search
    fn detected_conflict(&mut self) -> bool {
        true
    }

    /// Called when the search is over, whatever the outcome
    fn finished(&mut self) {}
}


pub struct NoHandler;

impl SolveHandler for NoHandler {}


/// Cancels the search once a wall-clock deadline has passed.
pub struct TimeoutHandler {
    timeout: f64,
    deadline: f64,
    canceled: bool,
}

impl TimeoutHandler {
    pub fn new(timeout_secs: f64) -> Self {
        TimeoutHandler {
            timeout: timeout_secs,
            deadline: 0.0,
            canceled: false,
        }
    }

    pub fn canceled(&self) -> bool {
        self.canceled
    }
}

impl SolveHandler for TimeoutHandler {
    fn started(&mut self) {
        self.deadline = time::precise_time_s() + self.timeout;
        self.canceled = false;
    }

    fn detected_conflict(&mut self) -> bool {
        if time::precise_time_s() >= self.deadline {
            self.canceled = true;
        }
        !self.canceled
    }
}


/// Cancels the search after a fixed number of conflicts.
pub struct ConflictLimitHandler {
    limit: u64,
    seen: u64,
}

impl ConflictLimitHandler {
    pub fn new(limit: u64) -> Self {
        ConflictLimitHandler { limit, seen: 0 }
    }
}

impl SolveHandler for ConflictLimitHandler {
    fn started(&mut self) {
        self.seen = 0;
    }

    fn detected_conflict(&mut self) -> bool {
        self.seen += 1;
        self.seen <= self.limit
    }
}
