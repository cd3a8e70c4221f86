//! Host-facing error reporting.
//!
//! A [`Diagnostic`] is the public form of a runtime error: the error kind and
//! message plus enough location information to print a single-line report
//! with a caret under the offending token.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    errors::{ErrorKind, RunError},
    expressions::Span,
};

/// A rendered runtime error with source location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The script name the error occurred in.
    pub script_name: String,
    /// What went wrong.
    pub kind: ErrorKind,
    /// Human-readable description.
    pub message: String,
    /// Location of the offending token.
    pub span: Span,
    /// The source line containing the offending token, when the runner holds
    /// the source text.
    pub source_line: Option<String>,
}

impl Diagnostic {
    /// Builds a diagnostic from an internal error, extracting the offending
    /// line from `source` when available.
    pub(crate) fn from_error(err: RunError, script_name: &str, source: Option<&str>) -> Self {
        let source_line = source
            .and_then(|text| text.lines().nth(err.span.line.saturating_sub(1) as usize))
            .map(str::to_owned);
        Self {
            script_name: script_name.to_owned(),
            kind: err.kind,
            message: err.message.into_owned(),
            span: err.span,
            source_line,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}: {}: {}",
            self.script_name, self.span.line, self.span.column, self.kind, self.message
        )?;
        if let Some(line) = &self.source_line {
            let caret_offset = self.span.column.saturating_sub(1) as usize;
            let caret_width = (self.span.len.max(1)) as usize;
            write!(f, "\n  {line}\n  {}{}", " ".repeat(caret_offset), "^".repeat(caret_width))?;
        }
        Ok(())
    }
}

impl std::error::Error for Diagnostic {}
