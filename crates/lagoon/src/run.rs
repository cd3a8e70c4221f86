//! Public interface for running Lagoon programs.

use std::path::PathBuf;

use ahash::AHashMap;

use crate::{
    diagnostic::Diagnostic,
    errors::Unwind,
    interp::Interp,
    io::PrintWriter,
    limits::Limits,
    namespace::ROOT_NS,
    statements::Stmt,
    storage::RuntimeStore,
    tracer::{ExecTracer, NoopTracer},
    value::PlainValue,
};

/// Options for one run.
#[derive(Debug, Default)]
pub struct RunOptions {
    /// Execution bounds.
    pub limits: Limits,
    /// Directory for persisted constants/globals; `None` disables the store.
    pub runtime_dir: Option<PathBuf>,
    /// Names the program may `import`, with their plain values.
    pub importables: Vec<(String, PlainValue)>,
}

/// Result of a clean run.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    /// Process exit code: always 0 here; an uncaught error surfaces as the
    /// `Err` side of [`Runner::run`] and corresponds to a nonzero exit.
    pub exit_code: i32,
    /// `(name, target)` pairs recorded by `export` statements, for the host
    /// to hand to other programs.
    pub exported: Vec<(String, String)>,
}

/// Primary interface for running a parsed program.
///
/// The parser collaborator produces the statement stream; `Runner` executes
/// it: preloads the root namespace, runs the main frame, then services
/// remaining reactive and async work until idle.
///
/// # Example
/// ```
/// use lagoon::{CollectStringPrint, RunOptions, Runner};
/// use lagoon::syntax::{Expr, ExprLoc, Literal, Span, Stmt, StmtKind};
///
/// let span = Span::new(1, 1, 5);
/// let program = vec![Stmt::new(
///     StmtKind::Expr(ExprLoc::new(
///         Expr::Call {
///             callee: Box::new(ExprLoc::new(Expr::Name("print".into()), span)),
///             args: vec![ExprLoc::new(Expr::Literal(Literal::Number(42.0)), span)],
///         },
///         span,
///     )),
///     span,
/// )];
/// let mut print = CollectStringPrint::new();
/// let runner = Runner::new(program, "answer.lgn");
/// runner.run(RunOptions::default(), &mut print).unwrap();
/// assert_eq!(print.output(), "42\n");
/// ```
#[derive(Debug, Clone)]
pub struct Runner {
    program: Vec<Stmt>,
    script_name: String,
    source: Option<String>,
}

impl Runner {
    /// Creates a runner for a parsed program. `script_name` appears in
    /// diagnostics.
    #[must_use]
    pub fn new(program: Vec<Stmt>, script_name: &str) -> Self {
        Self {
            program,
            script_name: script_name.to_owned(),
            source: None,
        }
    }

    /// Attaches the source text, enabling caret rendering in diagnostics.
    #[must_use]
    pub fn with_source(mut self, source: &str) -> Self {
        self.source = Some(source.to_owned());
        self
    }

    /// Runs the program to completion with no tracing.
    ///
    /// Returns the outcome on clean completion (including `exit()`); an
    /// uncaught main-frame error comes back as a rendered [`Diagnostic`] and
    /// corresponds to a nonzero process exit.
    pub fn run(&self, options: RunOptions, print: &mut impl PrintWriter) -> Result<Outcome, Diagnostic> {
        self.run_traced(options, print, &mut NoopTracer)
    }

    /// Runs the program with an execution tracer attached.
    pub fn run_traced(
        &self,
        options: RunOptions,
        print: &mut impl PrintWriter,
        tracer: &mut impl ExecTracer,
    ) -> Result<Outcome, Diagnostic> {
        let importables: AHashMap<Box<str>, PlainValue> = options
            .importables
            .into_iter()
            .map(|(name, value)| (name.into_boxed_str(), value))
            .collect();
        let storage = options.runtime_dir.map(RuntimeStore::new);
        let mut interp = Interp::new(options.limits, importables, storage, print, tracer);

        if let Err(err) = interp.preload() {
            return Err(Diagnostic::from_error(err, &self.script_name, self.source.as_deref()));
        }

        let chain = [ROOT_NS];
        let main_result = interp.exec_block(&self.program, &chain);
        let idle_result = match main_result {
            Ok(()) | Err(Unwind::Return(_)) => interp.run_to_idle(),
            Err(Unwind::Exit) => Ok(()),
            Err(Unwind::Error(err)) => {
                return Err(Diagnostic::from_error(err, &self.script_name, self.source.as_deref()));
            }
        };
        match idle_result {
            // reactive frames are isolated; only exit() lands here
            Ok(()) | Err(Unwind::Exit) => {}
            Err(Unwind::Return(_)) => {}
            Err(Unwind::Error(err)) => {
                return Err(Diagnostic::from_error(err, &self.script_name, self.source.as_deref()));
            }
        }

        Ok(Outcome {
            exit_code: 0,
            exported: interp
                .exported
                .iter()
                .map(|(name, target)| (name.to_string(), target.to_string()))
                .collect(),
        })
    }
}
