//! Reactive and async scheduling state.
//!
//! The model is single-threaded and cooperative: exactly one logical frame
//! advances at a time, and the data here is only ever touched between
//! statements or between frames. The executor (`interp.rs`) owns the drive
//! loops; this module holds the queues and registries.

use std::{
    collections::VecDeque,
    rc::Rc,
    time::Instant,
};

use crate::{
    binding::VarId,
    expressions::ExprLoc,
    heap::HeapId,
    namespace::NamespaceId,
    statements::Stmt,
    value::PlainValue,
};

/// A spawned async call, waiting in the ready queue.
///
/// Tasks run to completion on their tick (their own `await`s drive the
/// queue recursively), then resolve their promise.
#[derive(Debug)]
pub(crate) struct Task {
    /// Function name, for tracing.
    pub name: Box<str>,
    /// The async function's heap cell.
    pub func: HeapId,
    pub args: Vec<crate::value::Value>,
    /// The promise handed back to the caller; filled on completion.
    pub promise: HeapId,
}

/// A registered `when` watcher.
///
/// Watchers are tombstoned (`cancelled`), never removed, so registration
/// order and indices stay stable for the firing rules.
#[derive(Debug)]
pub(crate) struct Watcher {
    pub cond: ExprLoc,
    pub body: Rc<[Stmt]>,
    /// Namespace chain captured by reference at registration.
    pub scope: Vec<NamespaceId>,
    /// Variables the predicate reads; the watcher subscribes to these.
    pub deps: Vec<VarId>,
    /// Head-value snapshots used for change detection, parallel to `deps`.
    pub last_seen: Vec<PlainValue>,
    /// Guards against re-entrant firing of this watcher.
    pub in_progress: bool,
    pub cancelled: bool,
}

/// How an `after` timer matures.
#[derive(Debug)]
pub(crate) enum TimerKind {
    /// Matures when the count reaches zero; decremented per executed statement.
    Lines(i64),
    /// Matures at a wall-clock deadline.
    Clock(Instant),
}

/// A registered `after` timer.
#[derive(Debug)]
pub(crate) struct AfterTimer {
    pub kind: TimerKind,
    pub body: Rc<[Stmt]>,
    /// Namespace chain captured by reference at registration.
    pub scope: Vec<NamespaceId>,
    /// The innermost namespace at registration; popping it cancels the timer.
    pub host_scope: NamespaceId,
    /// Line counts tick on *subsequent* statements; the registering
    /// statement's own housekeeping only clears this flag.
    pub fresh: bool,
    pub cancelled: bool,
    pub fired: bool,
    /// Source line of the `after` statement, for tracing.
    pub line: u32,
}

/// All reactive and async state.
#[derive(Debug, Default)]
pub(crate) struct Scheduler {
    /// FIFO of runnable async tasks.
    pub ready: VecDeque<Task>,
    /// Watchers in registration order.
    pub watchers: Vec<Watcher>,
    /// After-timers in scheduling order.
    pub timers: Vec<AfterTimer>,
    /// Variables written since the last watcher pass.
    pub write_set: Vec<VarId>,
    /// Set while watcher/timer bodies run; nested statement housekeeping
    /// defers firing to the outer pass instead of re-entering.
    pub reactive_in_progress: bool,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a write for the current tick's watcher pass.
    pub fn record_write(&mut self, var_id: VarId) {
        if !self.write_set.contains(&var_id) {
            self.write_set.push(var_id);
        }
    }

    /// Cancels timers whose host scope is being popped.
    pub fn cancel_scope(&mut self, scope: NamespaceId) {
        for timer in &mut self.timers {
            if timer.host_scope == scope && !timer.fired {
                timer.cancelled = true;
            }
        }
    }

    /// Number of watchers that can still fire.
    pub fn live_watchers(&self) -> usize {
        self.watchers.iter().filter(|w| !w.cancelled).count()
    }

    /// Number of timers that can still mature.
    pub fn live_timers(&self) -> usize {
        self.timers.iter().filter(|t| !t.cancelled && !t.fired).count()
    }

    /// The earliest wall-clock deadline among live timers.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers
            .iter()
            .filter(|t| !t.cancelled && !t.fired)
            .filter_map(|t| match t.kind {
                TimerKind::Clock(deadline) => Some(deadline),
                TimerKind::Lines(_) => None,
            })
            .min()
    }
}
