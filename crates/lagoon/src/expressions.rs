//! Expression trees consumed by the evaluator.
//!
//! The lexer/parser collaborator produces these; the engine never parses
//! source text itself. Every node carries a [`Span`] so runtime errors can
//! point back at the offending token.

use serde::{Deserialize, Serialize};

use crate::statements::Stmt;

/// Source location of a token or expression (1-based line and column).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub line: u32,
    pub column: u32,
    /// Width in characters of the offending token, used for caret rendering.
    pub len: u32,
}

impl Span {
    #[must_use]
    pub fn new(line: u32, column: u32, len: u32) -> Self {
        Self { line, column, len }
    }
}

/// A literal value appearing directly in source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Number(f64),
    Str(Box<str>),
    /// Three-valued boolean literal; `None` is `maybe`.
    Bool(Option<bool>),
    Undefined,
    /// The distinguished empty-argument value (the empty name).
    Blank,
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    /// Numeric negation.
    Neg,
    /// Logical negation (`;` in surface syntax), Kleene-style.
    Not,
}

/// Binary operators.
///
/// `And`/`Or` follow Kleene three-valued logic; comparisons coerce both
/// operands to numbers first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    And,
    Or,
}

/// An expression in the tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Literal(Literal),
    /// An identifier, resolved through the namespace stack at evaluation time.
    Name(Box<str>),
    /// List literal; elements receive default user indices `-1, 0, 1, …`.
    List(Vec<ExprLoc>),
    /// Map literal with number or string keys.
    MapLit(Vec<(ExprLoc, ExprLoc)>),
    /// Anonymous function literal.
    FunctionLit {
        params: Vec<Box<str>>,
        body: Vec<Stmt>,
        is_async: bool,
    },
    Unary {
        op: UnaryOp,
        operand: Box<ExprLoc>,
    },
    Binary {
        left: Box<ExprLoc>,
        op: BinaryOp,
        right: Box<ExprLoc>,
    },
    /// Index access: `object[index]`.
    Index {
        object: Box<ExprLoc>,
        index: Box<ExprLoc>,
    },
    /// Member access: `object.member`.
    ///
    /// A member resolving to a receiver-mutating builtin (`push`, `pop`) is
    /// bound to the receiver for its next call.
    Member {
        object: Box<ExprLoc>,
        member: Box<str>,
    },
    /// Call: `callee(args…)`.
    Call {
        callee: Box<ExprLoc>,
        args: Vec<ExprLoc>,
    },
    /// Await: suspends the frame until the operand's promise resolves;
    /// non-promise operands pass through unchanged.
    Await(Box<ExprLoc>),
}

/// An expression together with its source location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExprLoc {
    pub expr: Expr,
    pub span: Span,
}

impl ExprLoc {
    #[must_use]
    pub fn new(expr: Expr, span: Span) -> Self {
        Self { expr, span }
    }
}

/// Collects every identifier referenced anywhere in an expression.
///
/// Used by `when` registration to build a watcher's dependency set.
pub(crate) fn collect_names(expr: &ExprLoc, out: &mut Vec<Box<str>>) {
    match &expr.expr {
        Expr::Literal(_) | Expr::FunctionLit { .. } => {}
        Expr::Name(name) => {
            if !out.contains(name) {
                out.push(name.clone());
            }
        }
        Expr::List(items) => {
            for item in items {
                collect_names(item, out);
            }
        }
        Expr::MapLit(pairs) => {
            for (key, value) in pairs {
                collect_names(key, out);
                collect_names(value, out);
            }
        }
        Expr::Unary { operand, .. } => collect_names(operand, out),
        Expr::Binary { left, right, .. } => {
            collect_names(left, out);
            collect_names(right, out);
        }
        Expr::Index { object, index } => {
            collect_names(object, out);
            collect_names(index, out);
        }
        Expr::Member { object, .. } => collect_names(object, out),
        Expr::Call { callee, args } => {
            collect_names(callee, out);
            for arg in args {
                collect_names(arg, out);
            }
        }
        Expr::Await(inner) => collect_names(inner, out),
    }
}
