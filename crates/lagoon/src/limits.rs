//! Execution resource limits.
//!
//! The engine is a tree-walking interpreter, so the two resources worth
//! bounding are call depth (Rust stack) and total executed statements
//! (runaway reactive loops). Both checks are plain counters.

use serde::{Deserialize, Serialize};

use crate::{
    errors::{ErrorKind, RunError, RunResult},
    expressions::Span,
};

/// Default maximum user-function call depth.
pub const DEFAULT_MAX_RECURSION_DEPTH: usize = 500;

/// Bounds on a single run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limits {
    /// Maximum user-function call depth.
    pub max_recursion_depth: usize,
    /// Maximum number of executed statements across all frames, or `None`
    /// for no budget.
    pub max_statements: Option<u64>,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_recursion_depth: DEFAULT_MAX_RECURSION_DEPTH,
            max_statements: None,
        }
    }
}

impl Limits {
    /// No statement budget and the default recursion bound.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Checks a prospective call depth.
    pub(crate) fn check_recursion_depth(&self, depth: usize, span: Span) -> RunResult<()> {
        if depth > self.max_recursion_depth {
            return Err(RunError::new(
                ErrorKind::InternalInvariant,
                format!("maximum call depth ({}) exceeded", self.max_recursion_depth),
                span,
            ));
        }
        Ok(())
    }

    /// Checks the executed-statement budget.
    pub(crate) fn check_statements(&self, executed: u64, span: Span) -> RunResult<()> {
        if let Some(max) = self.max_statements
            && executed > max
        {
            return Err(RunError::new(
                ErrorKind::InternalInvariant,
                format!("statement budget ({max}) exceeded"),
                span,
            ));
        }
        Ok(())
    }
}
