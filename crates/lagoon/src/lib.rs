#![doc = include_str!("../../../README.md")]

mod binding;
mod builtins;
mod diagnostic;
mod errors;
mod eval;
mod expressions;
mod function;
mod heap;
mod interp;
mod io;
pub mod keywords;
mod limits;
mod namespace;
mod run;
mod scheduler;
mod statements;
mod storage;
pub mod tracer;
mod types;
mod value;

/// The statement and expression trees the parser collaborator produces.
pub mod syntax {
    pub use crate::{
        expressions::{BinaryOp, Expr, ExprLoc, Literal, Span, UnaryOp},
        statements::{Modifier, Stmt, StmtKind},
    };
}

pub use crate::{
    diagnostic::Diagnostic,
    errors::{ErrorKind, RunError, RunResult},
    io::{CollectStringPrint, NoPrint, PrintWriter, StdPrint},
    limits::{DEFAULT_MAX_RECURSION_DEPTH, Limits},
    run::{Outcome, RunOptions, Runner},
    storage::RuntimeStore,
    tracer::{ExecTracer, NoopTracer, RecordingTracer, StderrTracer, TraceEvent},
    value::{PlainKey, PlainValue},
};
