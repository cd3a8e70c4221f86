//! Statement trees consumed by the executor.
//!
//! One [`Stmt`] per source statement. The parser collaborator records two
//! attributes the surface syntax encodes in punctuation: `debug` (the count
//! of terminating `!` minus one) and `confidence` (lowered by one per `?`
//! suffix, default 0).

use serde::{Deserialize, Serialize};

use crate::expressions::{ExprLoc, Span};

/// Declaration modifier: `const` forbids, `var` permits.
///
/// The first modifier of a declaration controls re-assignment
/// (`can_be_reset`), the second in-place mutation (`can_edit_value`); a
/// single modifier applies to both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Modifier {
    Const,
    Var,
}

/// A statement with its source location and attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
    /// Count of terminating `!` minus one; reported through the tracer.
    pub debug: u32,
}

impl Stmt {
    #[must_use]
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Self { kind, span, debug: 0 }
    }
}

/// Every statement kind the executor dispatches on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StmtKind {
    /// `const var<"2s"> name: Type = expr`
    Declare {
        modifiers: Vec<Modifier>,
        name: Box<str>,
        /// Type annotation; carried for the parser but ignored at runtime.
        ty: Option<Box<str>>,
        /// Lifetime annotation: an integer line count (`"2"`), a duration
        /// (`"1s"`, `"500ms"`), or `"Infinity"`.
        lifetime: Option<Box<str>>,
        expr: ExprLoc,
        confidence: i64,
    },
    /// `name[i][j] = expr`
    Assign {
        name: Box<str>,
        indexes: Vec<ExprLoc>,
        expr: ExprLoc,
        confidence: i64,
    },
    /// `if cond { … } else { … }` — a `maybe` condition runs both branches.
    If {
        cond: ExprLoc,
        then_body: Vec<Stmt>,
        else_body: Option<Vec<Stmt>>,
    },
    /// `when cond { … }` — reactive watcher over the condition's identifiers.
    When { cond: ExprLoc, body: Vec<Stmt> },
    /// `after delay { … }` — deferred by a line count or duration.
    After { delay: Box<str>, body: Vec<Stmt> },
    /// Named function definition (any `function` alias, or `fn`).
    FunctionDef {
        name: Box<str>,
        params: Vec<Box<str>>,
        body: Vec<Stmt>,
        is_async: bool,
    },
    /// `class Name { … }` — the body's declarations become instance members.
    ClassDef { name: Box<str>, body: Vec<Stmt> },
    /// `return expr` — unwinds to the enclosing function frame.
    Return { expr: Option<ExprLoc> },
    /// `delete name` — removes every binding for the identifier, keywords
    /// included. Idempotent on missing names.
    Delete { name: Box<str> },
    /// `reverse` — reverses the remaining statements of the enclosing block.
    Reverse,
    /// `import name from source` — pulls names from the host's importable
    /// table into the innermost namespace.
    Import { names: Vec<Box<str>>, source: Box<str> },
    /// `export name to target` — records names in the exported table.
    Export { names: Vec<Box<str>>, target: Box<str> },
    /// A bare expression; evaluated for its side effects.
    Expr(ExprLoc),
}
