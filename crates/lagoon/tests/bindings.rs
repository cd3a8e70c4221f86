//! Binding semantics: modifier permissions, redeclaration, line-count
//! lifetimes, and the persisted runtime store.

mod common;

use common::*;
use lagoon::syntax::BinaryOp;
use lagoon::{ErrorKind, Limits, PlainValue, RunOptions, RuntimeStore};
use pretty_assertions::assert_eq;

#[test]
fn const_const_blocks_reassignment_and_edits() {
    let program = vec![
        declare(1, CC, "x", num(1.0)),
        assign(2, "x", num(2.0)),
    ];
    assert_eq!(run_err(program).kind, ErrorKind::ImmutableBinding);

    let program = vec![
        declare(1, CC, "xs", list(vec![num(1.0)])),
        assign_index(2, "xs", vec![num(-1.0)], num(9.0)),
    ];
    assert_eq!(run_err(program).kind, ErrorKind::ImmutableBinding);
}

#[test]
fn const_var_allows_edits_but_not_reassignment() {
    let program = vec![
        declare(1, CV, "xs", list(vec![num(1.0)])),
        assign_index(2, "xs", vec![num(-1.0)], num(9.0)),
        print_stmt(3, vec![index(name("xs"), num(-1.0))]),
        assign(4, "xs", num(0.0)),
    ];
    let (result, output) = run(program);
    assert_eq!(output, "9\n");
    assert_eq!(result.unwrap_err().kind, ErrorKind::ImmutableBinding);
}

#[test]
fn var_const_allows_reassignment_but_not_edits() {
    let program = vec![
        declare(1, VC, "n", num(123.0)),
        assign(2, "n", num(456.0)),
        print_stmt(3, vec![name("n")]),
        assign_index(4, "n", vec![num(0.0)], num(9.0)),
    ];
    let (result, output) = run(program);
    assert_eq!(output, "456\n");
    assert_eq!(result.unwrap_err().kind, ErrorKind::ImmutableBinding);
}

#[test]
fn same_confidence_redeclaration_of_const_is_blocked() {
    let program = vec![
        declare(1, CC, "x", num(1.0)),
        declare(2, CC, "x", num(2.0)),
    ];
    assert_eq!(run_err(program).kind, ErrorKind::RedeclarationBlocked);
}

#[test]
fn var_redeclaration_at_equal_confidence_wins() {
    let program = vec![
        declare(1, VV, "x", num(1.0)),
        declare(2, VV, "x", num(2.0)),
        print_stmt(3, vec![name("x")]),
    ];
    assert_eq!(run_ok(program), "2\n");
}

#[test]
fn higher_confidence_binding_stays_behind_the_head() {
    // the head is the lowest-confidence live binding
    let program = vec![
        declare_full(1, VV, "x", None, num(10.0), 5),
        declare_full(2, VV, "x", None, num(20.0), 0),
        print_stmt(3, vec![name("x")]),
    ];
    assert_eq!(run_ok(program), "20\n");
}

#[test]
fn expired_head_reveals_the_next_lifetime() {
    // the 2-line binding shadows the infinite one, then expires: its line
    // count ticks on its own statement and on the first print
    let program = vec![
        declare_full(1, VV, "x", None, num(1.0), 1),
        declare_full(2, VV, "x", Some("2"), num(2.0), 0),
        print_stmt(3, vec![name("x")]),
        print_stmt(4, vec![name("x")]),
    ];
    assert_eq!(run_ok(program), "2\n1\n");
}

#[test]
fn fully_expired_variable_reads_as_undefined() {
    let program = vec![
        declare_full(1, VV, "x", Some("2"), num(1.0), 0),
        print_stmt(2, vec![name("x")]),
        print_stmt(3, vec![name_at(3, "x")]),
    ];
    let (result, output) = run(program);
    assert_eq!(output, "1\n");
    let diag = result.unwrap_err();
    assert_eq!(diag.kind, ErrorKind::UndefinedVariable);
    assert_eq!(diag.span.line, 3);
}

#[test]
fn assignment_to_undeclared_name_fails() {
    let program = vec![assign(1, "ghost", num(1.0))];
    assert_eq!(run_err(program).kind, ErrorKind::UndeclaredAssignment);

    // builtins are immutable names, not variables
    let program = vec![assign(1, "print", num(1.0))];
    assert_eq!(run_err(program).kind, ErrorKind::UndeclaredAssignment);
}

#[test]
fn declarations_shadow_outer_scopes() {
    let program = vec![
        declare(1, VV, "x", num(1.0)),
        fn_def(
            2,
            "inner",
            &[],
            vec![
                declare(2, VV, "x", num(99.0)),
                print_stmt(2, vec![name("x")]),
            ],
            false,
        ),
        expr_stmt(3, call_name("inner", vec![])),
        print_stmt(4, vec![name("x")]),
    ];
    assert_eq!(run_ok(program), "99\n1\n");
}

#[test]
fn recursion_depth_is_bounded() {
    let mut options = RunOptions::default();
    options.limits = Limits {
        max_recursion_depth: 16,
        max_statements: None,
    };
    let program = vec![
        fn_def(1, "loop_forever", &[], vec![expr_stmt(1, call_name("loop_forever", vec![]))], false),
        expr_stmt(2, call_name("loop_forever", vec![])),
    ];
    let (result, _) = run_with_options(program, options);
    assert_eq!(result.unwrap_err().kind, ErrorKind::InternalInvariant);
}

#[test]
fn statement_budget_is_bounded() {
    let mut options = RunOptions::default();
    options.limits = Limits {
        max_recursion_depth: 64,
        max_statements: Some(10),
    };
    // a self-retriggering watcher would otherwise run forever between ticks
    let program: Vec<_> = (0..32).map(|i| print_stmt(i + 1, vec![num(f64::from(i))])).collect();
    let (result, _) = run_with_options(program, options);
    assert_eq!(result.unwrap_err().kind, ErrorKind::InternalInvariant);
}

#[test]
fn top_level_const_const_persists_and_reloads() {
    let dir = std::env::temp_dir().join(format!("lagoon-persist-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);

    let mut options = RunOptions::default();
    options.runtime_dir = Some(dir.clone());
    let program = vec![declare(1, CC, "answer", num(42.0))];
    run_with_options(program, options).0.unwrap();

    let store = RuntimeStore::new(dir.clone());
    assert_eq!(
        store.load_constants().unwrap(),
        vec![("answer".to_owned(), PlainValue::Number(42.0))]
    );

    // a later run sees the constant without declaring it
    let mut options = RunOptions::default();
    options.runtime_dir = Some(dir.clone());
    let program = vec![print_stmt(1, vec![name("answer")])];
    let (result, output) = run_with_options(program, options);
    result.unwrap();
    assert_eq!(output, "42\n");

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn history_records_supplanted_heads() {
    // observable indirectly: the new equal-confidence head wins, and the
    // expired head reveals nothing once its lines run out
    let program = vec![
        declare_full(1, VV, "x", Some("2"), num(1.0), 0),
        declare_full(2, VV, "x", None, num(2.0), 0),
        print_stmt(3, vec![name("x")]),
        print_stmt(4, vec![name("x")]),
    ];
    assert_eq!(run_ok(program), "2\n2\n");
}

#[test]
fn comparisons_coerce_maybe_to_half() {
    let program = vec![
        print_stmt(1, vec![binary(boolean(None), BinaryOp::Lt, num(1.0))]),
        print_stmt(2, vec![binary(boolean(None), BinaryOp::Gt, num(0.0))]),
    ];
    assert_eq!(run_ok(program), "true\ntrue\n");
}
