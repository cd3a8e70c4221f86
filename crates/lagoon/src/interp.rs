//! The statement executor.
//!
//! [`Interp`] owns every store (heap, bindings, namespaces, scheduler) and
//! threads `&mut` access through its methods; the expression evaluator lives
//! in `eval.rs` as further `impl Interp` blocks. Execution is a plain
//! tree-walk: one dispatch per statement kind, with per-statement
//! housekeeping (lifetime decrement, expiry sweep, timers, watcher firing)
//! after every executed statement in any frame.

use std::{
    rc::Rc,
    time::{Duration, Instant},
};

use ahash::{AHashMap, AHashSet};

use crate::{
    binding::{Bindings, INFINITE_LIFETIME, VarId, Variable},
    builtins,
    errors::{ErrorKind, ExecResult, RunError, RunResult, Unwind},
    expressions::{ExprLoc, Span, collect_names},
    function::FunctionData,
    heap::{Heap, HeapData, HeapId},
    io::PrintWriter,
    limits::Limits,
    namespace::{NamespaceId, Namespaces, ROOT_NS, Slot},
    scheduler::{AfterTimer, Scheduler, Task, TimerKind, Watcher},
    statements::{Modifier, Stmt, StmtKind},
    storage::RuntimeStore,
    tracer::ExecTracer,
    value::{PlainValue, Value, to_bool3},
};

/// The executor: all runtime state plus the output and tracing seams.
pub(crate) struct Interp<'a, P: PrintWriter, Tr: ExecTracer> {
    pub heap: Heap,
    pub bindings: Bindings,
    pub namespaces: Namespaces,
    pub scheduler: Scheduler,
    pub limits: Limits,
    pub print: &'a mut P,
    pub tracer: &'a mut Tr,
    pub importables: AHashMap<Box<str>, PlainValue>,
    pub exported: Vec<(Box<str>, Box<str>)>,
    pub storage: Option<RuntimeStore>,
    statements_executed: u64,
    call_depth: usize,
    /// Most recent contained task error; surfaced to a stuck `await`.
    last_task_error: Option<RunError>,
}

impl<'a, P: PrintWriter, Tr: ExecTracer> Interp<'a, P, Tr> {
    pub fn new(
        limits: Limits,
        importables: AHashMap<Box<str>, PlainValue>,
        storage: Option<RuntimeStore>,
        print: &'a mut P,
        tracer: &'a mut Tr,
    ) -> Self {
        Self {
            heap: Heap::new(),
            bindings: Bindings::new(),
            namespaces: Namespaces::new(),
            scheduler: Scheduler::new(),
            limits,
            print,
            tracer,
            importables,
            exported: Vec::new(),
            storage,
            statements_executed: 0,
            call_depth: 0,
            last_task_error: None,
        }
    }

    /// Preloads the root namespace (keywords, builtins, constants) and any
    /// persisted runtime state.
    pub fn preload(&mut self) -> RunResult<()> {
        builtins::preload_root(&mut self.namespaces, &mut self.heap);
        if let Some(store) = &self.storage {
            let constants = store
                .load_constants()
                .map_err(|err| RunError::new(ErrorKind::Io, format!("cannot load runtime constants: {err}"), Span::default()))?;
            for (name, plain) in constants {
                let value = plain.into_value(&mut self.heap);
                self.namespaces.get_mut(ROOT_NS).insert(name.into(), Slot::Name(value));
            }
        }
        if let Some(store) = &self.storage {
            let globals = store
                .load_globals()
                .map_err(|err| RunError::new(ErrorKind::Io, format!("cannot load runtime globals: {err}"), Span::default()))?;
            for (name, plain) in globals {
                let value = plain.into_value(&mut self.heap);
                builtins::seed_global(&mut self.namespaces, &mut self.bindings, &name, value);
            }
        }
        Ok(())
    }

    /// Executes a statement block in the given scope chain.
    ///
    /// `reverse` is handled here: it flips the order of the remaining
    /// statements of this block and of no other.
    pub fn exec_block(&mut self, stmts: &[Stmt], chain: &[NamespaceId]) -> ExecResult<()> {
        let mut order: Vec<usize> = (0..stmts.len()).collect();
        let mut at = 0;
        while at < order.len() {
            let stmt = &stmts[order[at]];
            if matches!(stmt.kind, StmtKind::Reverse) {
                order[at + 1..].reverse();
            } else {
                self.exec_stmt(stmt, chain)?;
            }
            self.after_statement(stmt)?;
            at += 1;
        }
        Ok(())
    }

    /// Executes `body` in a fresh child namespace pushed onto `chain`.
    /// Timers hosted by the child scope are cancelled when it pops.
    fn run_child_block(&mut self, body: &[Stmt], chain: &[NamespaceId]) -> ExecResult<()> {
        let ns = self.namespaces.alloc();
        let mut child = chain.to_vec();
        child.push(ns);
        let result = self.exec_block(body, &child);
        self.scheduler.cancel_scope(ns);
        result
    }

    fn exec_stmt(&mut self, stmt: &Stmt, chain: &[NamespaceId]) -> ExecResult<()> {
        match &stmt.kind {
            StmtKind::Declare {
                modifiers,
                name,
                ty: _,
                lifetime,
                expr,
                confidence,
            } => self.exec_declare(modifiers, name, lifetime.as_deref(), expr, *confidence, stmt.span, chain),
            StmtKind::Assign {
                name,
                indexes,
                expr,
                confidence,
            } => self.exec_assign(name, indexes, expr, *confidence, stmt.span, chain),
            StmtKind::If {
                cond,
                then_body,
                else_body,
            } => {
                let cond_value = self.eval_expr(cond, chain)?;
                match to_bool3(&cond_value, &self.heap) {
                    Some(true) => self.run_child_block(then_body, chain),
                    Some(false) => match else_body {
                        Some(body) => self.run_child_block(body, chain),
                        None => Ok(()),
                    },
                    // maybe: both branches, in source order
                    None => {
                        self.run_child_block(then_body, chain)?;
                        match else_body {
                            Some(body) => self.run_child_block(body, chain),
                            None => Ok(()),
                        }
                    }
                }
            }
            StmtKind::When { cond, body } => self.exec_when(cond, body, chain),
            StmtKind::After { delay, body } => {
                let (lines_left, temporal) = parse_lifetime_spec(delay, stmt.span)?;
                let kind = match temporal {
                    Some(duration) => TimerKind::Clock(Instant::now() + duration),
                    None => TimerKind::Lines(lines_left),
                };
                self.scheduler.timers.push(AfterTimer {
                    kind,
                    body: Rc::from(body.as_slice()),
                    scope: chain.to_vec(),
                    host_scope: *chain.last().expect("scope chain is never empty"),
                    fresh: true,
                    cancelled: false,
                    fired: false,
                    line: stmt.span.line,
                });
                Ok(())
            }
            StmtKind::FunctionDef {
                name,
                params,
                body,
                is_async,
            } => {
                let data = FunctionData {
                    name: name.clone(),
                    params: Rc::from(params.as_slice()),
                    body: Rc::from(body.as_slice()),
                    is_async: *is_async,
                    scope: chain.to_vec(),
                };
                let id = self.heap.alloc(HeapData::Function(data));
                self.namespaces.insert_local(chain, name.clone(), Slot::Name(Value::Ref(id)));
                Ok(())
            }
            StmtKind::ClassDef { name, body } => {
                let data = crate::function::ClassData {
                    name: name.clone(),
                    body: Rc::from(body.as_slice()),
                    scope: chain.to_vec(),
                };
                let id = self.heap.alloc(HeapData::Class(data));
                self.namespaces.insert_local(chain, name.clone(), Slot::Name(Value::Ref(id)));
                Ok(())
            }
            StmtKind::Return { expr } => {
                let value = match expr {
                    Some(expr) => self.eval_expr(expr, chain)?,
                    None => Value::Undefined,
                };
                Err(Unwind::Return(value))
            }
            StmtKind::Delete { name } => {
                let removed = self.namespaces.remove_all(chain, name);
                for var_id in removed {
                    self.bindings.get_mut(var_id).lifetimes.clear();
                }
                Ok(())
            }
            StmtKind::Reverse => Ok(()), // handled by exec_block
            StmtKind::Import { names, source } => {
                for name in names {
                    let Some(plain) = self.importables.get(name.as_ref()).cloned() else {
                        return Err(RunError::new(
                            ErrorKind::UndefinedVariable,
                            format!("'{name}' is not importable from '{source}'"),
                            stmt.span,
                        )
                        .into());
                    };
                    let value = plain.into_value(&mut self.heap);
                    self.namespaces.insert_local(chain, name.clone(), Slot::Name(value));
                }
                Ok(())
            }
            StmtKind::Export { names, target } => {
                for name in names {
                    if self.namespaces.lookup(chain, name).is_none() {
                        return Err(RunError::undefined(name, stmt.span).into());
                    }
                    self.exported.push((name.clone(), target.clone()));
                }
                Ok(())
            }
            StmtKind::Expr(expr) => {
                self.eval_expr(expr, chain)?;
                Ok(())
            }
        }
    }

    fn exec_declare(
        &mut self,
        modifiers: &[Modifier],
        name: &str,
        lifetime: Option<&str>,
        expr: &ExprLoc,
        confidence: i64,
        span: Span,
        chain: &[NamespaceId],
    ) -> ExecResult<()> {
        let value = self.eval_expr(expr, chain)?;
        let (lines_left, temporal) = match lifetime {
            Some(spec) => parse_lifetime_spec(spec, span)?,
            None => (INFINITE_LIFETIME, None),
        };
        let (can_be_reset, can_edit_value) = modifier_flags(modifiers);

        let innermost = *chain.last().expect("scope chain is never empty");
        let existing = match self.namespaces.get(innermost).get(name) {
            Some(Slot::Variable(var_id)) => Some(*var_id),
            _ => None,
        };
        let var_id = match existing {
            Some(var_id) => {
                let now = Instant::now();
                let variable = self.bindings.get_mut(var_id);
                variable.clear_outdated(now);
                if let Some(head) = variable.head()
                    && !head.can_be_reset
                    && head.confidence == confidence
                {
                    return Err(RunError::new(
                        ErrorKind::RedeclarationBlocked,
                        format!("'{name}' was declared const and cannot be re-declared at the same confidence"),
                        span,
                    )
                    .into());
                }
                variable.add_lifetime(value.clone(), confidence, lines_left, can_be_reset, can_edit_value, temporal);
                var_id
            }
            None => {
                let mut variable = Variable::new(name.into());
                variable.add_lifetime(value.clone(), confidence, lines_left, can_be_reset, can_edit_value, temporal);
                let var_id = self.bindings.insert(variable);
                self.namespaces.insert_local(chain, name.into(), Slot::Variable(var_id));
                var_id
            }
        };
        self.scheduler.record_write(var_id);

        // top-level `const const` bindings persist to the runtime store
        if chain.len() == 1
            && !can_be_reset
            && !can_edit_value
            && let Some(store) = &self.storage
        {
            let snapshot = PlainValue::capture(&value, &self.heap);
            if snapshot.is_storable() {
                store
                    .save_constant(name, &snapshot)
                    .map_err(|err| RunError::new(ErrorKind::Io, format!("cannot persist '{name}': {err}"), span))?;
            }
        }
        Ok(())
    }

    fn exec_assign(
        &mut self,
        name: &str,
        indexes: &[ExprLoc],
        expr: &ExprLoc,
        confidence: i64,
        span: Span,
        chain: &[NamespaceId],
    ) -> ExecResult<()> {
        let value = self.eval_expr(expr, chain)?;
        let Some((_, slot)) = self.namespaces.lookup(chain, name) else {
            return Err(RunError::new(
                ErrorKind::UndeclaredAssignment,
                format!("'{name}' was never declared"),
                span,
            )
            .into());
        };
        let Slot::Variable(var_id) = slot else {
            return Err(RunError::new(
                ErrorKind::UndeclaredAssignment,
                format!("'{name}' is an immutable name, not a variable"),
                span,
            )
            .into());
        };

        let now = Instant::now();
        let variable = self.bindings.get_mut(var_id);
        variable.clear_outdated(now);
        let Some(head) = variable.head() else {
            return Err(RunError::undefined(name, span).into());
        };
        let (can_be_reset, can_edit_value) = (head.can_be_reset, head.can_edit_value);
        let target = head.value.clone();

        if indexes.is_empty() {
            if !can_be_reset {
                return Err(RunError::new(
                    ErrorKind::ImmutableBinding,
                    format!("'{name}' was declared const and cannot be re-assigned"),
                    span,
                )
                .into());
            }
            self.bindings
                .get_mut(var_id)
                .add_lifetime(value, confidence, INFINITE_LIFETIME, can_be_reset, can_edit_value, None);
        } else {
            if !can_edit_value {
                return Err(RunError::new(
                    ErrorKind::ImmutableBinding,
                    format!("'{name}' was declared const and cannot be edited in place"),
                    span,
                )
                .into());
            }
            let mut current = target;
            for index in &indexes[..indexes.len() - 1] {
                let key = self.eval_expr(index, chain)?;
                current = self.index_get(&current, &key, index.span)?;
            }
            let last = indexes.last().expect("indexes is non-empty");
            let key = self.eval_expr(last, chain)?;
            self.index_set(&current, &key, value, last.span)?;
        }
        self.scheduler.record_write(var_id);
        Ok(())
    }

    fn exec_when(&mut self, cond: &ExprLoc, body: &[Stmt], chain: &[NamespaceId]) -> ExecResult<()> {
        let mut names = Vec::new();
        collect_names(cond, &mut names);
        let mut deps = Vec::new();
        for name in &names {
            if let Some((_, Slot::Variable(var_id))) = self.namespaces.lookup(chain, name)
                && !deps.contains(&var_id)
            {
                deps.push(var_id);
            }
        }
        let last_seen = dep_snapshots(&self.bindings, &self.heap, &deps);
        let index = self.scheduler.watchers.len();
        self.scheduler.watchers.push(Watcher {
            cond: cond.clone(),
            body: Rc::from(body),
            scope: chain.to_vec(),
            deps,
            last_seen,
            in_progress: false,
            cancelled: false,
        });
        self.tracer.on_watcher_registered(index);

        // run once immediately when the predicate is already true
        let cond_value = self.eval_expr(cond, chain)?;
        if to_bool3(&cond_value, &self.heap) == Some(true) {
            self.scheduler.watchers[index].in_progress = true;
            self.tracer.on_watcher_fired(index);
            let result = self.run_child_block(body, chain);
            self.scheduler.watchers[index].in_progress = false;
            result?;
        }
        Ok(())
    }

    /// Per-statement housekeeping: statement budget, lifetime line ticks and
    /// expiry, empty-variable sweep, watcher auto-cancel, timer maturation,
    /// and the watcher pass over the tick's write set.
    fn after_statement(&mut self, stmt: &Stmt) -> ExecResult<()> {
        self.statements_executed += 1;
        self.limits.check_statements(self.statements_executed, stmt.span)?;
        self.tracer.on_statement(stmt.span.line, stmt.debug);

        let now = Instant::now();
        for variable in self.bindings.iter_mut() {
            variable.decrement_lines();
            if variable.clear_outdated(now) {
                self.tracer.on_lifetime_expired(&variable.name);
            }
        }
        self.namespaces.sweep_expired(&self.bindings);
        self.cancel_dead_watchers();

        for timer in &mut self.scheduler.timers {
            if timer.cancelled || timer.fired {
                continue;
            }
            if timer.fresh {
                timer.fresh = false;
            } else if let TimerKind::Lines(count) = &mut timer.kind
                && *count > 0
            {
                *count -= 1;
            }
        }

        self.reactive_pass()
    }

    /// Cancels watchers whose every dependency has become undefined.
    fn cancel_dead_watchers(&mut self) {
        for index in 0..self.scheduler.watchers.len() {
            let watcher = &self.scheduler.watchers[index];
            if watcher.cancelled || watcher.deps.is_empty() {
                continue;
            }
            if watcher.deps.iter().all(|dep| self.bindings.get(*dep).is_undefined()) {
                self.scheduler.watchers[index].cancelled = true;
                self.tracer.on_watcher_cancelled(index);
            }
        }
    }

    /// Fires matured timers and eligible watchers, once, unless a reactive
    /// body is already running (nested writes are deferred to the outer
    /// pass).
    fn reactive_pass(&mut self) -> ExecResult<()> {
        if self.scheduler.reactive_in_progress {
            return Ok(());
        }
        self.scheduler.reactive_in_progress = true;
        let result = self.fire_reactive(Instant::now());
        self.scheduler.reactive_in_progress = false;
        result
    }

    fn fire_reactive(&mut self, now: Instant) -> ExecResult<()> {
        // timers mature in scheduling order
        for index in 0..self.scheduler.timers.len() {
            let ready = {
                let timer = &self.scheduler.timers[index];
                !timer.cancelled
                    && !timer.fired
                    && match timer.kind {
                        TimerKind::Lines(count) => count <= 0,
                        TimerKind::Clock(deadline) => now >= deadline,
                    }
            };
            if !ready {
                continue;
            }
            self.scheduler.timers[index].fired = true;
            let body = self.scheduler.timers[index].body.clone();
            let scope = self.scheduler.timers[index].scope.clone();
            let line = self.scheduler.timers[index].line;
            self.tracer.on_timer_fired(line);
            self.run_isolated(&body, &scope)?;
        }

        // watcher pass: loop until a pass generates no further writes,
        // firing each watcher at most once per tick
        let mut fired: AHashSet<usize> = AHashSet::new();
        loop {
            let writes = std::mem::take(&mut self.scheduler.write_set);
            if writes.is_empty() {
                break;
            }
            for index in 0..self.scheduler.watchers.len() {
                let watcher = &self.scheduler.watchers[index];
                if watcher.cancelled || watcher.in_progress || fired.contains(&index) {
                    continue;
                }
                if !watcher.deps.iter().any(|dep| writes.contains(dep)) {
                    continue;
                }
                let deps = watcher.deps.clone();
                let snapshots = dep_snapshots(&self.bindings, &self.heap, &deps);
                let watcher = &mut self.scheduler.watchers[index];
                let changed = snapshots != watcher.last_seen;
                watcher.last_seen = snapshots;
                if !changed {
                    continue;
                }
                fired.insert(index);
                let cond = watcher.cond.clone();
                let scope = watcher.scope.clone();
                let body = watcher.body.clone();
                self.scheduler.watchers[index].in_progress = true;
                let outcome = self.fire_watcher(index, &cond, &body, &scope);
                self.scheduler.watchers[index].in_progress = false;
                outcome?;
            }
        }
        Ok(())
    }

    fn fire_watcher(&mut self, index: usize, cond: &ExprLoc, body: &Rc<[Stmt]>, scope: &[NamespaceId]) -> ExecResult<()> {
        let cond_value = match self.eval_expr(cond, scope) {
            Ok(value) => value,
            Err(Unwind::Error(err)) => {
                self.tracer.on_frame_error(&err);
                return Ok(());
            }
            Err(other) => return Err(other),
        };
        if to_bool3(&cond_value, &self.heap) == Some(true) {
            self.tracer.on_watcher_fired(index);
            self.run_isolated(body, scope)?;
        }
        Ok(())
    }

    /// Runs a reactive body with frame isolation: errors are reported through
    /// the tracer and contained; only `exit()` escapes.
    fn run_isolated(&mut self, body: &Rc<[Stmt]>, scope: &[NamespaceId]) -> ExecResult<()> {
        match self.run_child_block(body, scope) {
            Ok(()) | Err(Unwind::Return(_)) => Ok(()),
            Err(Unwind::Error(err)) => {
                self.tracer.on_frame_error(&err);
                Ok(())
            }
            Err(Unwind::Exit) => Err(Unwind::Exit),
        }
    }

    /// Calls a user function value. Sync functions run in place; async
    /// functions enqueue a task and return a fresh promise.
    pub fn call_function_value(&mut self, func_id: HeapId, args: Vec<Value>, span: Span) -> ExecResult<Value> {
        let data = match self.heap.get(func_id) {
            HeapData::Function(data) => data.clone(),
            _ => return Err(RunError::internal("call target is not a function", span).into()),
        };
        if args.len() != data.params.len() {
            return Err(RunError::new(
                ErrorKind::ArityMismatch,
                format!("'{}' takes {} argument(s), got {}", data.name, data.params.len(), args.len()),
                span,
            )
            .into());
        }
        if data.is_async {
            let promise = self.heap.alloc(HeapData::Promise(None));
            self.tracer.on_task_spawned(&data.name);
            self.scheduler.ready.push_back(Task {
                name: data.name.clone(),
                func: func_id,
                args,
                promise,
            });
            return Ok(Value::Ref(promise));
        }
        self.invoke_sync(&data, args, span)
    }

    fn invoke_sync(&mut self, data: &FunctionData, args: Vec<Value>, span: Span) -> ExecResult<Value> {
        self.limits.check_recursion_depth(self.call_depth + 1, span)?;
        self.call_depth += 1;
        let ns = self.namespaces.alloc();
        for (param, arg) in data.params.iter().zip(args) {
            self.namespaces.get_mut(ns).insert(param.clone(), Slot::Name(arg));
        }
        let mut chain = data.scope.clone();
        chain.push(ns);
        let result = self.exec_block(&data.body, &chain);
        self.scheduler.cancel_scope(ns);
        self.call_depth -= 1;
        match result {
            Ok(()) => Ok(Value::Undefined),
            Err(Unwind::Return(value)) => Ok(value),
            Err(other) => Err(other),
        }
    }

    /// Instantiates a class: runs the body in a fresh namespace and wraps it
    /// as the new object's member namespace.
    pub fn instantiate_class(&mut self, class_id: HeapId, args: Vec<Value>, span: Span) -> ExecResult<Value> {
        let data = match self.heap.get(class_id) {
            HeapData::Class(data) => data.clone(),
            _ => return Err(RunError::internal("call target is not a class", span).into()),
        };
        if !args.is_empty() {
            return Err(RunError::new(
                ErrorKind::ArityMismatch,
                format!("class '{}' takes no constructor arguments", data.name),
                span,
            )
            .into());
        }
        self.limits.check_recursion_depth(self.call_depth + 1, span)?;
        self.call_depth += 1;
        let ns = self.namespaces.alloc();
        let mut chain = data.scope.clone();
        chain.push(ns);
        let result = self.exec_block(&data.body, &chain);
        self.scheduler.cancel_scope(ns);
        self.call_depth -= 1;
        match result {
            Ok(()) | Err(Unwind::Return(_)) => Ok(Value::Ref(self.heap.alloc(HeapData::Object {
                class_name: data.name.clone(),
                namespace: ns,
            }))),
            Err(other) => Err(other),
        }
    }

    /// Runs one spawned task to completion and resolves its promise.
    fn run_task(&mut self, task: Task) -> ExecResult<()> {
        let data = match self.heap.get(task.func) {
            HeapData::Function(data) => data.clone(),
            _ => return Ok(()),
        };
        match self.invoke_sync(&data, task.args, Span::default()) {
            Ok(value) => {
                *self.heap.get_mut(task.promise) = HeapData::Promise(Some(value));
                self.tracer.on_task_completed(&task.name);
                Ok(())
            }
            Err(Unwind::Error(err)) => {
                self.tracer.on_frame_error(&err);
                self.last_task_error = Some(err);
                Ok(())
            }
            Err(Unwind::Return(_)) => Ok(()),
            Err(Unwind::Exit) => Err(Unwind::Exit),
        }
    }

    /// Drives the scheduler until the promise resolves: runs ready tasks in
    /// FIFO order, then waits out clock timers. A promise no remaining work
    /// can resolve is an error.
    pub fn drive_promise(&mut self, promise: HeapId, span: Span) -> ExecResult<Value> {
        loop {
            if let HeapData::Promise(Some(value)) = self.heap.get(promise) {
                return Ok(value.clone());
            }
            if let Some(task) = self.scheduler.ready.pop_front() {
                self.run_task(task)?;
                continue;
            }
            if let Some(deadline) = self.scheduler.next_deadline() {
                let now = Instant::now();
                if deadline > now {
                    std::thread::sleep(deadline - now);
                }
                self.reactive_pass()?;
                continue;
            }
            return Err(match self.last_task_error.take() {
                Some(err) => Unwind::Error(err),
                None => RunError::internal("awaited a promise that can never resolve", span).into(),
            });
        }
    }

    /// Services remaining tasks, timers, and watcher work after the main
    /// frame returns, until the engine is idle.
    pub fn run_to_idle(&mut self) -> ExecResult<()> {
        let pending_watchers = self.scheduler.live_watchers();
        let pending_timers = self.scheduler.live_timers();
        let pending_tasks = self.scheduler.ready.len();
        if pending_watchers + pending_timers + pending_tasks > 0 {
            self.tracer.on_completion_hint(pending_watchers, pending_timers, pending_tasks);
        }
        loop {
            while let Some(task) = self.scheduler.ready.pop_front() {
                self.run_task(task)?;
            }
            self.reactive_pass()?;
            if !self.scheduler.ready.is_empty() {
                continue;
            }
            match self.scheduler.next_deadline() {
                Some(deadline) => {
                    let now = Instant::now();
                    if deadline > now {
                        std::thread::sleep(deadline - now);
                    }
                    self.reactive_pass()?;
                }
                None => break,
            }
        }
        Ok(())
    }
}

/// Head-value snapshots for a watcher's dependencies.
fn dep_snapshots(bindings: &Bindings, heap: &Heap, deps: &[VarId]) -> Vec<PlainValue> {
    deps.iter()
        .map(|dep| match bindings.get(*dep).value() {
            Some(value) => PlainValue::capture(value, heap),
            None => PlainValue::Undefined,
        })
        .collect()
}

/// Maps declaration modifiers to `(can_be_reset, can_edit_value)`.
///
/// The first modifier governs re-assignment, the second in-place edits; one
/// modifier applies to both, none defaults to fully mutable.
fn modifier_flags(modifiers: &[Modifier]) -> (bool, bool) {
    match modifiers {
        [] => (true, true),
        [only] => (*only == Modifier::Var, *only == Modifier::Var),
        [first, second, ..] => (*first == Modifier::Var, *second == Modifier::Var),
    }
}

/// Parses a lifetime/delay annotation: a line count, a duration (`ms`, `s`,
/// `m`, `h` suffixes), or `Infinity`.
fn parse_lifetime_spec(spec: &str, span: Span) -> RunResult<(i64, Option<Duration>)> {
    let spec = spec.trim();
    if spec.eq_ignore_ascii_case("infinity") || spec == "inf" {
        return Ok((INFINITE_LIFETIME, None));
    }
    if let Ok(lines) = spec.parse::<i64>() {
        if lines >= 0 {
            return Ok((lines, None));
        }
        return Err(RunError::type_mismatch(format!("negative lifetime '{spec}'"), span));
    }
    for (suffix, scale) in [("ms", 0.001), ("s", 1.0), ("m", 60.0), ("h", 3600.0)] {
        if let Some(number) = spec.strip_suffix(suffix)
            && let Ok(amount) = number.trim().parse::<f64>()
            && amount >= 0.0
        {
            return Ok((INFINITE_LIFETIME, Some(Duration::from_secs_f64(amount * scale))));
        }
    }
    Err(RunError::type_mismatch(format!("invalid lifetime '{spec}'"), span))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modifier_pairs_map_to_permission_flags() {
        use Modifier::{Const, Var};
        assert_eq!(modifier_flags(&[Const, Const]), (false, false));
        assert_eq!(modifier_flags(&[Var, Var]), (true, true));
        assert_eq!(modifier_flags(&[Const, Var]), (false, true));
        assert_eq!(modifier_flags(&[Var, Const]), (true, false));
        assert_eq!(modifier_flags(&[Var]), (true, true));
    }

    #[test]
    fn lifetime_specs_parse_lines_and_durations() {
        let span = Span::default();
        assert_eq!(parse_lifetime_spec("3", span).unwrap(), (3, None));
        assert_eq!(parse_lifetime_spec("Infinity", span).unwrap(), (INFINITE_LIFETIME, None));
        let (lines, temporal) = parse_lifetime_spec("500ms", span).unwrap();
        assert_eq!(lines, INFINITE_LIFETIME);
        assert_eq!(temporal, Some(Duration::from_millis(500)));
        let (_, temporal) = parse_lifetime_spec("2s", span).unwrap();
        assert_eq!(temporal, Some(Duration::from_secs(2)));
        assert!(parse_lifetime_spec("sideways", span).is_err());
    }
}
