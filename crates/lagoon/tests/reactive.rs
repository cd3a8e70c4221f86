//! Scheduler behaviors: watcher ordering and cancellation, after-timers,
//! async tasks, frame isolation, and the completion hint.

mod common;

use common::*;
use lagoon::syntax::BinaryOp;
use lagoon::{CollectStringPrint, ErrorKind, RecordingTracer, RunOptions, Runner, TraceEvent};
use pretty_assertions::assert_eq;

#[test]
fn when_runs_immediately_if_already_true() {
    let program = vec![
        declare(1, VV, "c", num(3.0)),
        when_stmt(
            2,
            binary(name("c"), BinaryOp::Eq, num(3.0)),
            vec![print_stmt(2, vec![text("now")])],
        ),
    ];
    assert_eq!(run_ok(program), "now\n");
}

#[test]
fn watchers_fire_in_registration_order() {
    let program = vec![
        declare(1, VV, "c", num(0.0)),
        when_stmt(
            2,
            binary(name("c"), BinaryOp::Gt, num(0.0)),
            vec![print_stmt(2, vec![text("first")])],
        ),
        when_stmt(
            3,
            binary(name("c"), BinaryOp::Gt, num(0.0)),
            vec![print_stmt(3, vec![text("second")])],
        ),
        assign(4, "c", num(1.0)),
    ];
    assert_eq!(run_ok(program), "first\nsecond\n");
}

#[test]
fn watcher_sees_changes_made_by_other_watchers() {
    // a watcher body's own writes feed the same tick's later rounds
    let program = vec![
        declare(1, VV, "a", num(0.0)),
        declare(2, VV, "b", num(0.0)),
        when_stmt(
            3,
            binary(name("a"), BinaryOp::Eq, num(1.0)),
            vec![assign(3, "b", num(1.0))],
        ),
        when_stmt(
            4,
            binary(name("b"), BinaryOp::Eq, num(1.0)),
            vec![print_stmt(4, vec![text("chained")])],
        ),
        assign(5, "a", num(1.0)),
    ];
    assert_eq!(run_ok(program), "chained\n");
}

#[test]
fn watcher_cancelled_when_dependency_expires() {
    // c lives for two statements; once it expires the watcher is dead
    let program = vec![
        declare_full(1, VV, "c", Some("2"), num(0.0), 0),
        when_stmt(
            2,
            binary(name("c"), BinaryOp::Eq, num(1.0)),
            vec![print_stmt(2, vec![text("never")])],
        ),
        print_stmt(3, vec![text("tick")]),
        print_stmt(4, vec![text("tock")]),
    ];
    let mut print = CollectStringPrint::new();
    let mut tracer = RecordingTracer::new();
    Runner::new(program, "test.lgn")
        .run_traced(RunOptions::default(), &mut print, &mut tracer)
        .unwrap();
    assert_eq!(print.output(), "tick\ntock\n");
    assert!(
        tracer.events().iter().any(|e| matches!(e, TraceEvent::WatcherCancelled { .. })),
        "expected a cancellation event, got: {:?}",
        tracer.events()
    );
}

#[test]
fn after_line_timer_fires_after_counted_statements() {
    let program = vec![
        after_stmt(1, "2", vec![print_stmt(1, vec![text("later")])]),
        print_stmt(2, vec![text("one")]),
        print_stmt(3, vec![text("two")]),
        print_stmt(4, vec![text("three")]),
    ];
    assert_eq!(run_ok(program), "one\ntwo\nlater\nthree\n");
}

#[test]
fn after_clock_timer_fires_at_idle() {
    let program = vec![
        after_stmt(1, "30ms", vec![print_stmt(1, vec![text("later")])]),
        print_stmt(2, vec![text("main")]),
    ];
    assert_eq!(run_ok(program), "main\nlater\n");
}

#[test]
fn after_timers_mature_in_scheduling_order() {
    // both timers reach zero on the third statement; they fire in the
    // order they were scheduled
    let program = vec![
        after_stmt(1, "2", vec![print_stmt(1, vec![text("a")])]),
        after_stmt(2, "1", vec![print_stmt(2, vec![text("b")])]),
        print_stmt(3, vec![text("main")]),
    ];
    assert_eq!(run_ok(program), "main\na\nb\n");
}

#[test]
fn after_cancelled_when_host_scope_pops() {
    let program = vec![
        fn_def(
            1,
            "arm",
            &[],
            vec![after_stmt(1, "1", vec![print_stmt(1, vec![text("never")])])],
            false,
        ),
        expr_stmt(2, call_name("arm", vec![])),
        print_stmt(3, vec![text("one")]),
        print_stmt(4, vec![text("two")]),
    ];
    assert_eq!(run_ok(program), "one\ntwo\n");
}

#[test]
fn watcher_errors_do_not_kill_the_main_frame() {
    let program = vec![
        declare(1, VV, "c", num(0.0)),
        when_stmt(
            2,
            binary(name("c"), BinaryOp::Eq, num(1.0)),
            vec![print_stmt(2, vec![index(name("c"), num(9.0))])],
        ),
        assign(3, "c", num(1.0)),
        print_stmt(4, vec![text("alive")]),
    ];
    let mut print = CollectStringPrint::new();
    let mut tracer = RecordingTracer::new();
    Runner::new(program, "test.lgn")
        .run_traced(RunOptions::default(), &mut print, &mut tracer)
        .unwrap();
    assert_eq!(print.output(), "alive\n");
    assert!(
        tracer
            .events()
            .iter()
            .any(|e| matches!(e, TraceEvent::FrameError { error } if error.kind == ErrorKind::IndexOutOfBounds)),
        "expected a contained IndexOutOfBounds, got: {:?}",
        tracer.events()
    );
}

#[test]
fn async_tasks_run_when_main_awaits_or_finishes() {
    // two tasks spawned back to back resolve in FIFO order
    let program = vec![
        fn_def(1, "make", &["x"], vec![ret(1, Some(name("x")))], true),
        declare(2, CC, "p1", call_name("make", vec![num(1.0)])),
        declare(3, CC, "p2", call_name("make", vec![num(2.0)])),
        print_stmt(4, vec![await_expr(name("p2"))]),
        print_stmt(5, vec![await_expr(name("p1"))]),
    ];
    let mut print = CollectStringPrint::new();
    let mut tracer = RecordingTracer::new();
    Runner::new(program, "test.lgn")
        .run_traced(RunOptions::default(), &mut print, &mut tracer)
        .unwrap();
    assert_eq!(print.output(), "2\n1\n");
    let spawns: Vec<_> = tracer
        .events()
        .iter()
        .filter(|e| matches!(e, TraceEvent::TaskSpawned { .. }))
        .collect();
    assert_eq!(spawns.len(), 2);
}

#[test]
fn await_on_a_plain_value_passes_through() {
    let program = vec![print_stmt(1, vec![await_expr(num(7.0))])];
    assert_eq!(run_ok(program), "7\n");
}

#[test]
fn unfinished_tasks_run_after_main_returns() {
    let program = vec![
        fn_def(
            1,
            "announce",
            &[],
            vec![print_stmt(1, vec![text("from task")]), ret(1, None)],
            true,
        ),
        expr_stmt(2, call_name("announce", vec![])),
        print_stmt(3, vec![text("main done")]),
    ];
    let mut print = CollectStringPrint::new();
    let mut tracer = RecordingTracer::new();
    Runner::new(program, "test.lgn")
        .run_traced(RunOptions::default(), &mut print, &mut tracer)
        .unwrap();
    assert_eq!(print.output(), "main done\nfrom task\n");
    assert!(
        tracer.events().iter().any(|e| matches!(e, TraceEvent::CompletionHint { .. })),
        "expected a completion hint, got: {:?}",
        tracer.events()
    );
}

#[test]
fn awaiting_an_unresolvable_promise_is_an_error() {
    // the task errors, so its promise never resolves; the awaiting frame
    // receives the contained error
    let program = vec![
        fn_def(
            1,
            "broken",
            &[],
            vec![print_stmt(1, vec![index(name_at(1, "nope"), num(0.0))])],
            true,
        ),
        declare(2, CC, "p", call_name("broken", vec![])),
        print_stmt(3, vec![await_expr(name("p"))]),
    ];
    let diag = run_err(program);
    assert_eq!(diag.kind, ErrorKind::UndefinedVariable);
}
