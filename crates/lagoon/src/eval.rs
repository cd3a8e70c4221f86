//! The expression evaluator.
//!
//! Further `impl Interp` blocks: one dispatch over expression kinds, with
//! per-kind helpers. Operators follow the conversion matrix in `value.rs`;
//! boolean operators use Kleene three-valued logic; numeric equality is
//! ratio-based so comparing against zero can be `maybe`.

use std::{rc::Rc, time::Instant};

use crate::{
    builtins::Builtin,
    errors::{ErrorKind, ExecResult, RunError},
    expressions::{BinaryOp, Expr, ExprLoc, Literal, Span, UnaryOp},
    function::FunctionData,
    heap::{HeapData, HeapId},
    interp::Interp,
    io::PrintWriter,
    namespace::{NamespaceId, Slot},
    tracer::ExecTracer,
    types::{LagoonMap, number},
    value::{Value, map_key_from_value, payload_eq, to_bool3, to_display, to_number},
};

impl<P: PrintWriter, Tr: ExecTracer> Interp<'_, P, Tr> {
    /// Reduces an expression tree to a value against the given scope chain.
    pub fn eval_expr(&mut self, expr: &ExprLoc, chain: &[NamespaceId]) -> ExecResult<Value> {
        let span = expr.span;
        match &expr.expr {
            Expr::Literal(literal) => Ok(self.eval_literal(literal)),
            Expr::Name(name) => self.resolve_name(name, chain, span),
            Expr::List(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    values.push(self.eval_expr(item, chain)?);
                }
                Ok(self.heap.list(values))
            }
            Expr::MapLit(pairs) => {
                let mut map = LagoonMap::new();
                for (key_expr, value_expr) in pairs {
                    let key_value = self.eval_expr(key_expr, chain)?;
                    let value = self.eval_expr(value_expr, chain)?;
                    let key = map_key_from_value(&key_value, &self.heap, key_expr.span)?;
                    map.set(key, value);
                }
                Ok(Value::Ref(self.heap.alloc(HeapData::Map(map))))
            }
            Expr::FunctionLit { params, body, is_async } => {
                let data = FunctionData {
                    name: "<anonymous>".into(),
                    params: Rc::from(params.as_slice()),
                    body: Rc::from(body.as_slice()),
                    is_async: *is_async,
                    scope: chain.to_vec(),
                };
                Ok(Value::Ref(self.heap.alloc(HeapData::Function(data))))
            }
            Expr::Unary { op, operand } => {
                let value = self.eval_expr(operand, chain)?;
                match op {
                    UnaryOp::Neg => {
                        let x = to_number(&value, &self.heap, span)?;
                        Ok(self.heap.number(-x))
                    }
                    UnaryOp::Not => Ok(Value::Bool(kleene_not(to_bool3(&value, &self.heap)))),
                }
            }
            Expr::Binary { left, op, right } => self.eval_binary(left, *op, right, chain, span),
            Expr::Index { object, index } => {
                let object = self.eval_expr(object, chain)?;
                let key = self.eval_expr(index, chain)?;
                self.index_get(&object, &key, span)
            }
            Expr::Member { object, member } => {
                let object = self.eval_expr(object, chain)?;
                self.member_lookup(&object, member, span)
            }
            Expr::Call { callee, args } => {
                let callee_value = self.eval_expr(callee, chain)?;
                let mut arg_values = Vec::with_capacity(args.len());
                for arg in args {
                    arg_values.push(self.eval_expr(arg, chain)?);
                }
                self.call_value(callee_value, arg_values, span)
            }
            Expr::Await(inner) => {
                let value = self.eval_expr(inner, chain)?;
                if let Value::Ref(id) = value {
                    let promise_state = match self.heap.get(id) {
                        HeapData::Promise(state) => Some(state.clone()),
                        _ => None,
                    };
                    match promise_state {
                        Some(Some(resolved)) => return Ok(resolved),
                        Some(None) => return self.drive_promise(id, span),
                        None => {}
                    }
                }
                Ok(value)
            }
        }
    }

    fn eval_literal(&mut self, literal: &Literal) -> Value {
        match literal {
            Literal::Number(x) => self.heap.number(*x),
            Literal::Str(s) => self.heap.string(s),
            Literal::Bool(b) => Value::Bool(*b),
            Literal::Undefined => Value::Undefined,
            Literal::Blank => Value::Blank,
        }
    }

    fn resolve_name(&mut self, name: &str, chain: &[NamespaceId], span: Span) -> ExecResult<Value> {
        let Some((_, slot)) = self.namespaces.lookup(chain, name) else {
            return Err(RunError::undefined(name, span).into());
        };
        match slot {
            Slot::Name(value) => {
                if let Value::Keyword(keyword) = &value
                    && matches!(keyword.as_ref(), "previous" | "next")
                {
                    return Err(RunError::internal(
                        format!("the reserved word '{keyword}' has no runtime meaning"),
                        span,
                    )
                    .into());
                }
                Ok(value)
            }
            Slot::Variable(var_id) => {
                let now = Instant::now();
                let variable = self.bindings.get_mut(var_id);
                variable.clear_outdated(now);
                match variable.value() {
                    Some(value) => Ok(value.clone()),
                    None => Err(RunError::undefined(name, span).into()),
                }
            }
        }
    }

    fn eval_binary(
        &mut self,
        left: &ExprLoc,
        op: BinaryOp,
        right: &ExprLoc,
        chain: &[NamespaceId],
        span: Span,
    ) -> ExecResult<Value> {
        let lhs = self.eval_expr(left, chain)?;
        let rhs = self.eval_expr(right, chain)?;
        match op {
            BinaryOp::Add => {
                if lhs.as_text(&self.heap).is_some() || rhs.as_text(&self.heap).is_some() {
                    let joined = format!("{}{}", to_display(&lhs, &self.heap), to_display(&rhs, &self.heap));
                    return Ok(self.heap.string(&joined));
                }
                let (a, b) = self.numeric_operands(&lhs, &rhs, span)?;
                Ok(self.heap.number(a + b))
            }
            BinaryOp::Sub => {
                let (a, b) = self.numeric_operands(&lhs, &rhs, span)?;
                Ok(self.heap.number(a - b))
            }
            BinaryOp::Mul => {
                let (a, b) = self.numeric_operands(&lhs, &rhs, span)?;
                Ok(self.heap.number(a * b))
            }
            BinaryOp::Div => {
                let (a, b) = self.numeric_operands(&lhs, &rhs, span)?;
                if b == 0.0 {
                    return Err(RunError::type_mismatch("division by zero", span).into());
                }
                Ok(self.heap.number(a / b))
            }
            BinaryOp::Pow => {
                let (a, b) = self.numeric_operands(&lhs, &rhs, span)?;
                Ok(self.heap.number(a.powf(b)))
            }
            BinaryOp::Eq => Ok(Value::Bool(self.equality(&lhs, &rhs))),
            BinaryOp::Ne => Ok(Value::Bool(kleene_not(self.equality(&lhs, &rhs)))),
            BinaryOp::Lt => {
                let (a, b) = self.numeric_operands(&lhs, &rhs, span)?;
                Ok(Value::Bool(Some(a < b)))
            }
            BinaryOp::Gt => {
                let (a, b) = self.numeric_operands(&lhs, &rhs, span)?;
                Ok(Value::Bool(Some(a > b)))
            }
            BinaryOp::Le => {
                let (a, b) = self.numeric_operands(&lhs, &rhs, span)?;
                Ok(Value::Bool(Some(a <= b)))
            }
            BinaryOp::Ge => {
                let (a, b) = self.numeric_operands(&lhs, &rhs, span)?;
                Ok(Value::Bool(Some(a >= b)))
            }
            BinaryOp::And => Ok(Value::Bool(kleene_and(
                to_bool3(&lhs, &self.heap),
                to_bool3(&rhs, &self.heap),
            ))),
            BinaryOp::Or => Ok(Value::Bool(kleene_or(
                to_bool3(&lhs, &self.heap),
                to_bool3(&rhs, &self.heap),
            ))),
        }
    }

    fn numeric_operands(&self, lhs: &Value, rhs: &Value, span: Span) -> Result<(f64, f64), RunError> {
        Ok((to_number(lhs, &self.heap, span)?, to_number(rhs, &self.heap, span)?))
    }

    /// Equality between two values: ratio-based for number pairs, structural
    /// payload equality otherwise.
    fn equality(&self, lhs: &Value, rhs: &Value) -> Option<bool> {
        if let (Some(a), Some(b)) = (lhs.as_number(&self.heap), rhs.as_number(&self.heap)) {
            return numbers_equal(a, b);
        }
        Some(payload_eq(lhs, rhs, &self.heap))
    }

    /// `object[key]` over every indexable type.
    pub(crate) fn index_get(&mut self, object: &Value, key: &Value, span: Span) -> ExecResult<Value> {
        let Some(id) = object.ref_id() else {
            return Err(non_indexable(object, self, span).into());
        };
        enum Hit {
            Value(Value),
            Text(String),
            Digit(f64),
        }
        let hit = match self.heap.get(id) {
            HeapData::List(list) => {
                let index = numeric_key(key, self, "list", span)?;
                Hit::Value(list.get(index, span)?)
            }
            HeapData::Str(s) => {
                let index = numeric_key(key, self, "string", span)?;
                Hit::Text(s.get(index, span)?)
            }
            HeapData::Number(x) => {
                let index = numeric_key(key, self, "number", span)?;
                Hit::Digit(number::digit_get(*x, index, span)?)
            }
            HeapData::Map(map) => {
                let map_key = map_key_from_value(key, &self.heap, span)?;
                Hit::Value(map.get(&map_key, span)?)
            }
            _ => return Err(non_indexable(object, self, span).into()),
        };
        Ok(match hit {
            Hit::Value(value) => value,
            Hit::Text(text) => self.heap.string(&text),
            Hit::Digit(digit) => self.heap.number(digit),
        })
    }

    /// `object[key] = value` over every indexable type.
    pub(crate) fn index_set(&mut self, object: &Value, key: &Value, value: Value, span: Span) -> ExecResult<()> {
        enum Kind {
            List,
            Str,
            Number,
            Map,
        }
        let Some(id) = object.ref_id() else {
            return Err(non_indexable(object, self, span).into());
        };
        let kind = match self.heap.get(id) {
            HeapData::List(_) => Kind::List,
            HeapData::Str(_) => Kind::Str,
            HeapData::Number(_) => Kind::Number,
            HeapData::Map(_) => Kind::Map,
            _ => return Err(non_indexable(object, self, span).into()),
        };
        match kind {
            Kind::List => {
                let index = numeric_key(key, self, "list", span)?;
                match self.heap.get_mut(id) {
                    HeapData::List(list) => list.set(index, value, span)?,
                    _ => unreachable!(),
                }
            }
            Kind::Str => {
                let index = numeric_key(key, self, "string", span)?;
                let text = to_display(&value, &self.heap);
                match self.heap.get_mut(id) {
                    HeapData::Str(s) => s.set(index, &text, span)?,
                    _ => unreachable!(),
                }
            }
            Kind::Number => {
                let index = numeric_key(key, self, "number", span)?;
                let digit = value
                    .as_number(&self.heap)
                    .ok_or_else(|| RunError::type_mismatch("Cannot assign a non-number into a number.", span))?;
                match self.heap.get_mut(id) {
                    HeapData::Number(x) => *x = number::digit_set(*x, index, digit, span)?,
                    _ => unreachable!(),
                }
            }
            Kind::Map => {
                let map_key = map_key_from_value(key, &self.heap, span)?;
                match self.heap.get_mut(id) {
                    HeapData::Map(map) => map.set(map_key, value),
                    _ => unreachable!(),
                }
            }
        }
        Ok(())
    }

    /// `object.member`: `push`/`pop`/`length` on lists and strings (the
    /// first two bound to their receiver), object members from the object's
    /// namespace.
    pub(crate) fn member_lookup(&mut self, object: &Value, member: &str, span: Span) -> ExecResult<Value> {
        let Some(id) = object.ref_id() else {
            return Err(RunError::type_mismatch(
                format!("a {} has no members", object.type_name(&self.heap)),
                span,
            )
            .into());
        };
        enum Hit {
            Value(Value),
            Length(f64),
            ObjectNs(NamespaceId),
        }
        let hit = match self.heap.get(id) {
            HeapData::List(list) => match member {
                "push" => Hit::Value(Value::Bound(Builtin::ListPush, id)),
                "pop" => Hit::Value(Value::Bound(Builtin::ListPop, id)),
                "length" => Hit::Length(list.len() as f64),
                _ => {
                    return Err(RunError::new(
                        ErrorKind::UndefinedVariable,
                        format!("'{member}' is not a member of a list"),
                        span,
                    )
                    .into());
                }
            },
            HeapData::Str(s) => match member {
                "push" => Hit::Value(Value::Bound(Builtin::StrPush, id)),
                "pop" => Hit::Value(Value::Bound(Builtin::StrPop, id)),
                "length" => Hit::Length(s.len() as f64),
                _ => {
                    return Err(RunError::new(
                        ErrorKind::UndefinedVariable,
                        format!("'{member}' is not a member of a string"),
                        span,
                    )
                    .into());
                }
            },
            HeapData::Object { namespace, .. } => Hit::ObjectNs(*namespace),
            _ => {
                return Err(RunError::type_mismatch(
                    format!("a {} has no members", object.type_name(&self.heap)),
                    span,
                )
                .into());
            }
        };
        match hit {
            Hit::Value(value) => Ok(value),
            Hit::Length(len) => Ok(self.heap.number(len)),
            Hit::ObjectNs(ns) => {
                let Some(slot) = self.namespaces.get(ns).get(member).cloned() else {
                    return Err(RunError::new(
                        ErrorKind::UndefinedVariable,
                        format!("'{member}' is not a member of this object"),
                        span,
                    )
                    .into());
                };
                match slot {
                    Slot::Name(value) => Ok(value),
                    Slot::Variable(var_id) => {
                        let now = Instant::now();
                        let variable = self.bindings.get_mut(var_id);
                        variable.clear_outdated(now);
                        match variable.value() {
                            Some(value) => Ok(value.clone()),
                            None => Err(RunError::undefined(member, span).into()),
                        }
                    }
                }
            }
        }
    }

    /// Dispatches a call over every callable value kind.
    pub(crate) fn call_value(&mut self, callee: Value, args: Vec<Value>, span: Span) -> ExecResult<Value> {
        enum Target {
            Function,
            Class,
            Signal,
        }
        match callee {
            Value::Builtin(builtin) => builtin.call(&mut self.heap, &mut *self.print, None, args, span),
            Value::Bound(builtin, receiver) => builtin.call(&mut self.heap, &mut *self.print, Some(receiver), args, span),
            Value::Ref(id) => {
                let target = match self.heap.get(id) {
                    HeapData::Function(_) => Target::Function,
                    HeapData::Class(_) => Target::Class,
                    HeapData::Signal(_) => Target::Signal,
                    _ => return Err(not_callable(&callee, self, span).into()),
                };
                match target {
                    Target::Function => self.call_function_value(id, args, span),
                    Target::Class => self.instantiate_class(id, args, span),
                    Target::Signal => self.call_signal(id, args, span),
                }
            }
            other => Err(not_callable(&other, self, span).into()),
        }
    }

    /// A signal (from `use`) reads when called with the blank value and
    /// writes otherwise.
    fn call_signal(&mut self, signal: HeapId, mut args: Vec<Value>, span: Span) -> ExecResult<Value> {
        if args.len() > 1 {
            return Err(RunError::new(
                ErrorKind::ArityMismatch,
                format!("a signal takes at most 1 argument, got {}", args.len()),
                span,
            )
            .into());
        }
        if args.is_empty() {
            args.push(Value::Blank);
        }
        let arg = args.swap_remove(0);
        match self.heap.get_mut(signal) {
            HeapData::Signal(inner) => {
                if matches!(arg, Value::Blank) {
                    Ok(inner.clone())
                } else {
                    *inner = arg;
                    Ok(Value::Undefined)
                }
            }
            _ => Err(RunError::internal("signal cell vanished", span).into()),
        }
    }
}

fn numeric_key<P: PrintWriter, Tr: ExecTracer>(
    key: &Value,
    interp: &Interp<'_, P, Tr>,
    noun: &str,
    span: Span,
) -> Result<f64, RunError> {
    key.as_number(&interp.heap)
        .ok_or_else(|| RunError::type_mismatch(format!("Cannot index a {noun} with a non-number value."), span))
}

fn non_indexable<P: PrintWriter, Tr: ExecTracer>(value: &Value, interp: &Interp<'_, P, Tr>, span: Span) -> RunError {
    RunError::type_mismatch(format!("a {} cannot be indexed", value.type_name(&interp.heap)), span)
}

fn not_callable<P: PrintWriter, Tr: ExecTracer>(value: &Value, interp: &Interp<'_, P, Tr>, span: Span) -> RunError {
    RunError::type_mismatch(format!("a {} is not callable", value.type_name(&interp.heap)), span)
}

/// Ratio-based numeric equality: division by a zero right operand yields
/// `maybe` unless both sides are zero.
fn numbers_equal(a: f64, b: f64) -> Option<bool> {
    if b == 0.0 {
        if a == 0.0 { Some(true) } else { None }
    } else {
        Some(((a / b) - 1.0).abs() < number::FLOAT_TO_INT_PREC)
    }
}

fn kleene_not(x: Option<bool>) -> Option<bool> {
    x.map(|b| !b)
}

fn kleene_and(a: Option<bool>, b: Option<bool>) -> Option<bool> {
    match (a, b) {
        (Some(false), _) | (_, Some(false)) => Some(false),
        (Some(true), Some(true)) => Some(true),
        _ => None,
    }
}

fn kleene_or(a: Option<bool>, b: Option<bool>) -> Option<bool> {
    match (a, b) {
        (Some(true), _) | (_, Some(true)) => Some(true),
        (Some(false), Some(false)) => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kleene_tables() {
        let (t, f, m) = (Some(true), Some(false), None);
        assert_eq!(kleene_and(t, m), m);
        assert_eq!(kleene_and(f, m), f);
        assert_eq!(kleene_and(t, t), t);
        assert_eq!(kleene_or(t, m), t);
        assert_eq!(kleene_or(f, m), m);
        assert_eq!(kleene_or(f, f), f);
        assert_eq!(kleene_not(m), m);
        assert_eq!(kleene_not(t), f);
    }

    #[test]
    fn zero_divisor_equality_is_maybe() {
        assert_eq!(numbers_equal(0.0, 0.0), Some(true));
        assert_eq!(numbers_equal(1.0, 0.0), None);
        assert_eq!(numbers_equal(0.0, 1.0), Some(false));
        assert_eq!(numbers_equal(3.0, 3.0), Some(true));
        assert_eq!(numbers_equal(3.0, 4.0), Some(false));
    }
}
