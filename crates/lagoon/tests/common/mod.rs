//! Shared AST constructors for the integration tests.
//!
//! The parser is a separate collaborator, so test programs are built
//! directly as statement trees. Statements carry real line numbers so
//! diagnostics can be asserted on.

#![allow(dead_code, reason = "each test binary uses a subset of these helpers")]

use lagoon::syntax::{BinaryOp, Expr, ExprLoc, Literal, Modifier, Span, Stmt, StmtKind};
use lagoon::{CollectStringPrint, Diagnostic, Outcome, RunOptions, Runner};

pub const VV: &[Modifier] = &[Modifier::Var, Modifier::Var];
pub const CC: &[Modifier] = &[Modifier::Const, Modifier::Const];
pub const CV: &[Modifier] = &[Modifier::Const, Modifier::Var];
pub const VC: &[Modifier] = &[Modifier::Var, Modifier::Const];

pub fn sp(line: u32) -> Span {
    Span::new(line, 1, 1)
}

pub fn num(x: f64) -> ExprLoc {
    ExprLoc::new(Expr::Literal(Literal::Number(x)), Span::default())
}

pub fn text(s: &str) -> ExprLoc {
    ExprLoc::new(Expr::Literal(Literal::Str(s.into())), Span::default())
}

pub fn boolean(b: Option<bool>) -> ExprLoc {
    ExprLoc::new(Expr::Literal(Literal::Bool(b)), Span::default())
}

pub fn name(n: &str) -> ExprLoc {
    ExprLoc::new(Expr::Name(n.into()), Span::default())
}

pub fn name_at(line: u32, n: &str) -> ExprLoc {
    ExprLoc::new(Expr::Name(n.into()), sp(line))
}

pub fn list(items: Vec<ExprLoc>) -> ExprLoc {
    ExprLoc::new(Expr::List(items), Span::default())
}

pub fn binary(left: ExprLoc, op: BinaryOp, right: ExprLoc) -> ExprLoc {
    ExprLoc::new(
        Expr::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        },
        Span::default(),
    )
}

pub fn index(object: ExprLoc, key: ExprLoc) -> ExprLoc {
    ExprLoc::new(
        Expr::Index {
            object: Box::new(object),
            index: Box::new(key),
        },
        Span::default(),
    )
}

pub fn member(object: ExprLoc, m: &str) -> ExprLoc {
    ExprLoc::new(
        Expr::Member {
            object: Box::new(object),
            member: m.into(),
        },
        Span::default(),
    )
}

pub fn call(callee: ExprLoc, args: Vec<ExprLoc>) -> ExprLoc {
    ExprLoc::new(
        Expr::Call {
            callee: Box::new(callee),
            args,
        },
        Span::default(),
    )
}

pub fn call_name(n: &str, args: Vec<ExprLoc>) -> ExprLoc {
    call(name(n), args)
}

pub fn await_expr(inner: ExprLoc) -> ExprLoc {
    ExprLoc::new(Expr::Await(Box::new(inner)), Span::default())
}

pub fn stmt(line: u32, kind: StmtKind) -> Stmt {
    Stmt::new(kind, sp(line))
}

/// `print <args>!`
pub fn print_stmt(line: u32, args: Vec<ExprLoc>) -> Stmt {
    stmt(line, StmtKind::Expr(call(name_at(line, "print"), args)))
}

pub fn expr_stmt(line: u32, expr: ExprLoc) -> Stmt {
    stmt(line, StmtKind::Expr(expr))
}

/// Declaration with infinite lifetime and confidence 0.
pub fn declare(line: u32, modifiers: &[Modifier], ident: &str, expr: ExprLoc) -> Stmt {
    declare_full(line, modifiers, ident, None, expr, 0)
}

pub fn declare_full(
    line: u32,
    modifiers: &[Modifier],
    ident: &str,
    lifetime: Option<&str>,
    expr: ExprLoc,
    confidence: i64,
) -> Stmt {
    stmt(
        line,
        StmtKind::Declare {
            modifiers: modifiers.to_vec(),
            name: ident.into(),
            ty: None,
            lifetime: lifetime.map(Into::into),
            expr,
            confidence,
        },
    )
}

pub fn assign(line: u32, ident: &str, expr: ExprLoc) -> Stmt {
    stmt(
        line,
        StmtKind::Assign {
            name: ident.into(),
            indexes: vec![],
            expr,
            confidence: 0,
        },
    )
}

pub fn assign_index(line: u32, ident: &str, indexes: Vec<ExprLoc>, expr: ExprLoc) -> Stmt {
    stmt(
        line,
        StmtKind::Assign {
            name: ident.into(),
            indexes,
            expr,
            confidence: 0,
        },
    )
}

pub fn if_stmt(line: u32, cond: ExprLoc, then_body: Vec<Stmt>, else_body: Option<Vec<Stmt>>) -> Stmt {
    stmt(
        line,
        StmtKind::If {
            cond,
            then_body,
            else_body,
        },
    )
}

pub fn when_stmt(line: u32, cond: ExprLoc, body: Vec<Stmt>) -> Stmt {
    stmt(line, StmtKind::When { cond, body })
}

pub fn after_stmt(line: u32, delay: &str, body: Vec<Stmt>) -> Stmt {
    stmt(
        line,
        StmtKind::After {
            delay: delay.into(),
            body,
        },
    )
}

pub fn fn_def(line: u32, ident: &str, params: &[&str], body: Vec<Stmt>, is_async: bool) -> Stmt {
    stmt(
        line,
        StmtKind::FunctionDef {
            name: ident.into(),
            params: params.iter().map(|p| (*p).into()).collect(),
            body,
            is_async,
        },
    )
}

pub fn class_def(line: u32, ident: &str, body: Vec<Stmt>) -> Stmt {
    stmt(line, StmtKind::ClassDef { name: ident.into(), body })
}

pub fn ret(line: u32, expr: Option<ExprLoc>) -> Stmt {
    stmt(line, StmtKind::Return { expr })
}

pub fn delete_stmt(line: u32, ident: &str) -> Stmt {
    stmt(line, StmtKind::Delete { name: ident.into() })
}

pub fn reverse_stmt(line: u32) -> Stmt {
    stmt(line, StmtKind::Reverse)
}

/// Runs a program, returning the outcome and everything printed.
pub fn run(program: Vec<Stmt>) -> (Result<Outcome, Diagnostic>, String) {
    run_with_options(program, RunOptions::default())
}

pub fn run_with_options(program: Vec<Stmt>, options: RunOptions) -> (Result<Outcome, Diagnostic>, String) {
    let mut print = CollectStringPrint::new();
    let result = Runner::new(program, "test.lgn").run(options, &mut print);
    (result, print.into_output())
}

/// Runs a program that must complete cleanly; returns the printed output.
pub fn run_ok(program: Vec<Stmt>) -> String {
    let (result, output) = run(program);
    result.unwrap_or_else(|diag| panic!("program failed: {diag}\noutput so far: {output}"));
    output
}

/// Runs a program that must fail; returns the diagnostic.
pub fn run_err(program: Vec<Stmt>) -> Diagnostic {
    let (result, output) = run(program);
    match result {
        Ok(_) => panic!("program unexpectedly succeeded with output: {output}"),
        Err(diag) => diag,
    }
}
