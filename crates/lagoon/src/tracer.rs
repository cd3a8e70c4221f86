//! Engine execution tracing infrastructure.
//!
//! Provides a trait-based tracing system for the interpreter with zero-cost
//! abstraction. When using [`NoopTracer`], all trace methods compile away via
//! monomorphization.
//!
//! # Architecture
//!
//! The [`ExecTracer`] trait defines hook points at key execution events
//! (statement dispatch, watcher activity, task scheduling, lifetime expiry).
//! Concrete implementations collect different kinds of data:
//!
//! | Tracer | Purpose |
//! |--------|---------|
//! | [`NoopTracer`] | Zero-cost no-op (production default) |
//! | [`StderrTracer`] | Human-readable execution log to stderr |
//! | [`RecordingTracer`] | Full event recording for tests and post-mortem |

use crate::errors::RunError;

/// Trace event emitted during execution.
///
/// Used by [`RecordingTracer`] to capture a full execution trace.
#[derive(Debug, Clone, PartialEq)]
pub enum TraceEvent {
    /// A statement was executed. `debug` is the statement's debug attribute
    /// (number of terminating `!` minus one); plain statements carry 0.
    Statement { line: u32, debug: u32 },
    /// A `when` watcher was registered.
    WatcherRegistered { index: usize },
    /// A watcher's predicate became true and its body ran.
    WatcherFired { index: usize },
    /// A watcher was removed because every dependency became undefined.
    WatcherCancelled { index: usize },
    /// An async function call was queued as a task.
    TaskSpawned { name: String },
    /// A task ran to completion and resolved its promise.
    TaskCompleted { name: String },
    /// An `after` timer matured and its body ran.
    TimerFired { line: u32 },
    /// A variable lifetime expired (by line count or wall clock).
    LifetimeExpired { name: String },
    /// An error was contained inside a watcher/timer/task frame.
    FrameError { error: RunError },
    /// Main returned with reactive work still pending.
    CompletionHint { pending_watchers: usize, pending_timers: usize, pending_tasks: usize },
}

/// Trait for engine execution tracing.
///
/// All methods have default no-op implementations, so [`NoopTracer`] requires
/// zero lines of code and compiles to zero instructions. Implementations only
/// override the hooks they care about.
pub trait ExecTracer: std::fmt::Debug {
    /// Called after every executed statement.
    ///
    /// This is the hottest hook; implementations should be lightweight.
    #[inline(always)]
    fn on_statement(&mut self, _line: u32, _debug: u32) {}

    /// Called when a `when` watcher is registered.
    #[inline(always)]
    fn on_watcher_registered(&mut self, _index: usize) {}

    /// Called when a watcher fires (predicate truthy after a dependency change).
    #[inline(always)]
    fn on_watcher_fired(&mut self, _index: usize) {}

    /// Called when a watcher is auto-cancelled.
    #[inline(always)]
    fn on_watcher_cancelled(&mut self, _index: usize) {}

    /// Called when an async call is queued.
    #[inline(always)]
    fn on_task_spawned(&mut self, _name: &str) {}

    /// Called when a task completes and its promise resolves.
    #[inline(always)]
    fn on_task_completed(&mut self, _name: &str) {}

    /// Called when an `after` timer matures.
    #[inline(always)]
    fn on_timer_fired(&mut self, _line: u32) {}

    /// Called when `clear_outdated` drops the last lifetime of a variable.
    #[inline(always)]
    fn on_lifetime_expired(&mut self, _name: &str) {}

    /// Called when an isolated frame (watcher, timer, task) aborts with an
    /// error. The error does not propagate to the main frame.
    #[inline(always)]
    fn on_frame_error(&mut self, _error: &RunError) {}

    /// Called once if the main frame returns while the reactive set is
    /// nonempty; the engine keeps servicing events until idle.
    #[inline(always)]
    fn on_completion_hint(&mut self, _pending_watchers: usize, _pending_timers: usize, _pending_tasks: usize) {}
}

/// Zero-cost no-op tracer (production default).
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTracer;

impl ExecTracer for NoopTracer {}

/// Tracer that logs human-readable events to stderr.
#[derive(Debug, Default)]
pub struct StderrTracer;

impl ExecTracer for StderrTracer {
    fn on_statement(&mut self, line: u32, debug: u32) {
        if debug > 0 {
            eprintln!("[lagoon] line {line}: statement executed (debug {debug})");
        }
    }

    fn on_watcher_registered(&mut self, index: usize) {
        eprintln!("[lagoon] watcher #{index} registered");
    }

    fn on_watcher_fired(&mut self, index: usize) {
        eprintln!("[lagoon] watcher #{index} fired");
    }

    fn on_watcher_cancelled(&mut self, index: usize) {
        eprintln!("[lagoon] watcher #{index} cancelled (all dependencies undefined)");
    }

    fn on_task_spawned(&mut self, name: &str) {
        eprintln!("[lagoon] task '{name}' spawned");
    }

    fn on_task_completed(&mut self, name: &str) {
        eprintln!("[lagoon] task '{name}' completed");
    }

    fn on_timer_fired(&mut self, line: u32) {
        eprintln!("[lagoon] after-timer from line {line} fired");
    }

    fn on_lifetime_expired(&mut self, name: &str) {
        eprintln!("[lagoon] last lifetime of '{name}' expired");
    }

    fn on_frame_error(&mut self, error: &RunError) {
        eprintln!("[lagoon] contained frame error: {error}");
    }

    fn on_completion_hint(&mut self, watchers: usize, timers: usize, tasks: usize) {
        eprintln!("[lagoon] main finished with reactive work pending ({watchers} watchers, {timers} timers, {tasks} tasks); servicing until idle");
    }
}

/// Tracer that records every event for later inspection.
///
/// Used by tests asserting on scheduling behavior.
#[derive(Debug, Default)]
pub struct RecordingTracer {
    events: Vec<TraceEvent>,
}

impl RecordingTracer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the recorded events in order.
    #[must_use]
    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    /// Consumes the tracer and returns the recorded events.
    #[must_use]
    pub fn into_events(self) -> Vec<TraceEvent> {
        self.events
    }
}

impl ExecTracer for RecordingTracer {
    fn on_statement(&mut self, line: u32, debug: u32) {
        self.events.push(TraceEvent::Statement { line, debug });
    }

    fn on_watcher_registered(&mut self, index: usize) {
        self.events.push(TraceEvent::WatcherRegistered { index });
    }

    fn on_watcher_fired(&mut self, index: usize) {
        self.events.push(TraceEvent::WatcherFired { index });
    }

    fn on_watcher_cancelled(&mut self, index: usize) {
        self.events.push(TraceEvent::WatcherCancelled { index });
    }

    fn on_task_spawned(&mut self, name: &str) {
        self.events.push(TraceEvent::TaskSpawned { name: name.to_owned() });
    }

    fn on_task_completed(&mut self, name: &str) {
        self.events.push(TraceEvent::TaskCompleted { name: name.to_owned() });
    }

    fn on_timer_fired(&mut self, line: u32) {
        self.events.push(TraceEvent::TimerFired { line });
    }

    fn on_lifetime_expired(&mut self, name: &str) {
        self.events.push(TraceEvent::LifetimeExpired { name: name.to_owned() });
    }

    fn on_frame_error(&mut self, error: &RunError) {
        self.events.push(TraceEvent::FrameError { error: error.clone() });
    }

    fn on_completion_hint(&mut self, pending_watchers: usize, pending_timers: usize, pending_tasks: usize) {
        self.events.push(TraceEvent::CompletionHint {
            pending_watchers,
            pending_timers,
            pending_tasks,
        });
    }
}
