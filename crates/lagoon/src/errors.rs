use std::{borrow::Cow, fmt};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

use crate::expressions::Span;

/// Result type alias for operations that can produce a runtime error.
pub type RunResult<T> = Result<T, RunError>;

/// Result type alias for executor steps, which can also unwind for
/// `return` and `exit()`.
pub(crate) type ExecResult<T> = Result<T, Unwind>;

/// Error kinds surfaced by the engine.
///
/// Uses strum derives for automatic `Display`, `FromStr`, and `Into<&'static str>`
/// implementations. The string representation matches the variant name exactly
/// (e.g., `TypeMismatch` -> "TypeMismatch").
///
/// `LexSyntax` and `ParseSyntax` are reserved for the lexer/parser collaborator;
/// the runtime never raises them itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Invalid token stream (raised by the lexer collaborator).
    LexSyntax,
    /// Invalid statement structure (raised by the parser collaborator).
    ParseSyntax,
    /// An operand or argument had a type the operation cannot accept.
    TypeMismatch,
    /// A numeric index fell outside `[-1, len - 1]`.
    IndexOutOfBounds,
    /// An in-bounds index that no value was ever assigned to.
    UnassignedIndex,
    /// A name with no live binding was read.
    UndefinedVariable,
    /// Assignment to a name that was never declared as a variable.
    UndeclaredAssignment,
    /// A write through a binding whose head lifetime forbids it.
    ImmutableBinding,
    /// Re-declaration of a `const`-reset binding at the same confidence.
    RedeclarationBlocked,
    /// A call received the wrong number of arguments.
    ArityMismatch,
    /// A malformed pattern reached one of the regex builtins.
    InvalidRegex,
    /// A filesystem operation failed.
    Io,
    /// A value conversion with no defined result.
    ConversionImpossible,
    /// An internal contract was violated; always indicates a bug or a
    /// deliberately unimplemented reserved word.
    InternalInvariant,
}

/// A runtime error carrying its kind, message, and source location.
///
/// Errors are ordinary values inside the engine; they surface to the host as
/// a [`crate::Diagnostic`] once the frame they aborted has unwound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunError {
    pub kind: ErrorKind,
    pub message: Cow<'static, str>,
    pub span: Span,
}

impl RunError {
    pub fn new(kind: ErrorKind, message: impl Into<Cow<'static, str>>, span: Span) -> Self {
        Self {
            kind,
            message: message.into(),
            span,
        }
    }

    /// Shorthand for [`ErrorKind::TypeMismatch`].
    pub fn type_mismatch(message: impl Into<Cow<'static, str>>, span: Span) -> Self {
        Self::new(ErrorKind::TypeMismatch, message, span)
    }

    /// Shorthand for [`ErrorKind::IndexOutOfBounds`].
    pub fn index_out_of_bounds(message: impl Into<Cow<'static, str>>, span: Span) -> Self {
        Self::new(ErrorKind::IndexOutOfBounds, message, span)
    }

    /// Shorthand for [`ErrorKind::UndefinedVariable`].
    pub fn undefined(name: &str, span: Span) -> Self {
        Self::new(ErrorKind::UndefinedVariable, format!("'{name}' is not defined"), span)
    }

    /// Shorthand for [`ErrorKind::InternalInvariant`].
    pub fn internal(message: impl Into<Cow<'static, str>>, span: Span) -> Self {
        Self::new(ErrorKind::InternalInvariant, message, span)
    }
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// Non-local exits threaded through the executor.
///
/// `return` and `exit()` are not errors, but they unwind the same way, so the
/// executor's `Result` error channel carries all three. `From<RunError>` keeps
/// `?` working for the common case.
#[derive(Debug)]
pub(crate) enum Unwind {
    /// A runtime error aborting the current frame.
    Error(RunError),
    /// An explicit `return`, carrying the returned value.
    Return(crate::value::Value),
    /// The `exit()` builtin: terminate the whole program cleanly.
    Exit,
}

impl From<RunError> for Unwind {
    fn from(err: RunError) -> Self {
        Self::Error(err)
    }
}
