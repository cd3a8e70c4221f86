//! The builtin identifier table.
//!
//! Builtins are an enum dispatched by [`Builtin::call`]; arity `None` marks
//! the variadic ones. Missing trailing arguments of a fixed-arity builtin
//! arrive as [`Value::Blank`] (that is how `pop()` and signal reads spell
//! themselves); surplus arguments are an `ArityMismatch`.

pub(crate) mod math;
pub(crate) mod regex_fns;
pub(crate) mod words;

use std::borrow::Cow;

use crate::{
    binding::{INFINITE_LIFETIME, Variable},
    errors::{ErrorKind, RunError, Unwind},
    expressions::Span,
    heap::{Heap, HeapData},
    io::PrintWriter,
    keywords::{RESERVED_KEYWORDS, function_keywords},
    namespace::{Namespaces, ROOT_NS, Slot},
    types::LagoonMap,
    value::{Value, to_bool3, to_display, to_number},
};

pub(crate) use math::MathFn;

/// Every builtin function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Builtin {
    Print,
    Read,
    Write,
    Sleep,
    Exit,
    MapNew,
    ToBoolean,
    ToNumber,
    ToString,
    Use,
    New,
    Current,
    RegexMatch,
    RegexFindall,
    RegexReplace,
    Math(MathFn),
    /// A tens number word (`twenty`…`ninety`): adds a ones argument.
    Tens(u16),
    ListPush,
    ListPop,
    StrPush,
    StrPop,
}

impl Builtin {
    /// The identifier (or member name) this builtin answers to.
    pub fn name(self) -> &'static str {
        match self {
            Self::Print => "print",
            Self::Read => "read",
            Self::Write => "write",
            Self::Sleep => "sleep",
            Self::Exit => "exit",
            Self::MapNew => "Map",
            Self::ToBoolean => "Boolean",
            Self::ToNumber => "Number",
            Self::ToString => "String",
            Self::Use => "use",
            Self::New => "new",
            Self::Current => "current",
            Self::RegexMatch => "regex_match",
            Self::RegexFindall => "regex_findall",
            Self::RegexReplace => "regex_replace",
            Self::Math(f) => f.name(),
            Self::Tens(base) => words::tens_word(base),
            Self::ListPush | Self::StrPush => "push",
            Self::ListPop | Self::StrPop => "pop",
        }
    }

    /// Declared argument count; `None` is variadic.
    pub fn arity(self) -> Option<usize> {
        match self {
            Self::Print => None,
            Self::Exit | Self::MapNew => Some(0),
            Self::Write => Some(2),
            Self::Math(f) => Some(f.arity()),
            _ => Some(1),
        }
    }

    /// Receiver-mutating builtins are passed their receiver by reference.
    pub fn mutates_receiver(self) -> bool {
        matches!(self, Self::ListPush | Self::ListPop | Self::StrPush | Self::StrPop)
    }

    /// Calls the builtin.
    ///
    /// `recv` is the bound receiver for `mutates_receiver` builtins; `args`
    /// excludes it.
    pub fn call(
        self,
        heap: &mut Heap,
        print: &mut impl PrintWriter,
        recv: Option<crate::heap::HeapId>,
        mut args: Vec<Value>,
        span: Span,
    ) -> Result<Value, Unwind> {
        if let Some(arity) = self.arity() {
            if args.len() > arity {
                return Err(RunError::new(
                    ErrorKind::ArityMismatch,
                    format!("'{}' takes {arity} argument(s), got {}", self.name(), args.len()),
                    span,
                )
                .into());
            }
            args.resize(arity, Value::Blank);
        }
        match self {
            Self::Print => {
                let mut first = true;
                for arg in &args {
                    if first {
                        first = false;
                    } else {
                        print.stdout_push(' ');
                    }
                    print.stdout_write(Cow::Owned(to_display(arg, heap)));
                }
                print.stdout_push('\n');
                Ok(Value::Undefined)
            }
            Self::Read => {
                let path = args[0]
                    .as_text(heap)
                    .ok_or_else(|| RunError::type_mismatch("'read' requires its argument to be a string.", span))?;
                let contents = std::fs::read_to_string(&path)
                    .map_err(|err| RunError::new(ErrorKind::Io, format!("cannot read '{path}': {err}"), span))?;
                Ok(heap.string(&contents))
            }
            Self::Write => {
                let path = args[0]
                    .as_text(heap)
                    .ok_or_else(|| RunError::type_mismatch("'write' requires its path to be a string.", span))?;
                let contents = to_display(&args[1], heap);
                std::fs::write(&path, contents)
                    .map_err(|err| RunError::new(ErrorKind::Io, format!("cannot write '{path}': {err}"), span))?;
                Ok(Value::Undefined)
            }
            Self::Sleep => {
                let seconds = args[0]
                    .as_number(heap)
                    .ok_or_else(|| RunError::type_mismatch("'sleep' requires numerical input.", span))?;
                if seconds > 0.0 {
                    std::thread::sleep(std::time::Duration::from_secs_f64(seconds));
                }
                Ok(Value::Undefined)
            }
            Self::Exit => Err(Unwind::Exit),
            Self::MapNew => Ok(Value::Ref(heap.alloc(HeapData::Map(LagoonMap::new())))),
            Self::ToBoolean => Ok(Value::Bool(to_bool3(&args[0], heap))),
            Self::ToNumber => {
                let x = to_number(&args[0], heap, span)?;
                Ok(heap.number(x))
            }
            Self::ToString => {
                let text = to_display(&args[0], heap);
                Ok(heap.string(&text))
            }
            Self::Use => {
                let initial = args.swap_remove(0);
                Ok(Value::Ref(heap.alloc(HeapData::Signal(initial))))
            }
            Self::New | Self::Current => Ok(args.swap_remove(0)),
            Self::RegexMatch => Ok(regex_fns::regex_match(&args[0], heap, span)?),
            Self::RegexFindall => Ok(regex_fns::regex_findall(&args[0], heap, span)?),
            Self::RegexReplace => Ok(regex_fns::regex_replace(&args[0], heap, span)?),
            Self::Math(f) => {
                let mut numbers = Vec::with_capacity(args.len());
                for arg in &args {
                    let x = arg
                        .as_number(heap)
                        .ok_or_else(|| RunError::type_mismatch("Cannot pass a non-number value into a math function.", span))?;
                    numbers.push(x);
                }
                Ok(heap.number(f.eval(&numbers)))
            }
            Self::Tens(base) => {
                let ones = args[0].as_number(heap).ok_or_else(|| {
                    RunError::type_mismatch(
                        format!("'{}' expects a number for the ones digit.", words::tens_word(base)),
                        span,
                    )
                })?;
                Ok(heap.number(f64::from(base) + ones))
            }
            Self::ListPush | Self::ListPop | Self::StrPush | Self::StrPop => self.call_method(heap, recv, args, span),
        }
    }

    fn call_method(
        self,
        heap: &mut Heap,
        recv: Option<crate::heap::HeapId>,
        mut args: Vec<Value>,
        span: Span,
    ) -> Result<Value, Unwind> {
        let recv = recv.ok_or_else(|| RunError::type_mismatch(format!("'{}' requires a receiver.", self.name()), span))?;
        let pop_index = |arg: &Value, heap: &Heap| -> Result<Option<f64>, RunError> {
            match arg {
                Value::Blank => Ok(None),
                other => other
                    .as_number(heap)
                    .map(Some)
                    .ok_or_else(|| RunError::type_mismatch("'pop' expects a numeric index.", span)),
            }
        };
        match self {
            Self::ListPush => {
                let val = args.swap_remove(0);
                match heap.get_mut(recv) {
                    HeapData::List(list) => {
                        list.push(val);
                        Ok(Value::Undefined)
                    }
                    _ => Err(RunError::type_mismatch("'push' receiver is not a list.", span).into()),
                }
            }
            Self::ListPop => {
                let index = pop_index(&args[0], heap)?;
                match heap.get_mut(recv) {
                    HeapData::List(list) => Ok(list.pop(index, span)?),
                    _ => Err(RunError::type_mismatch("'pop' receiver is not a list.", span).into()),
                }
            }
            Self::StrPush => {
                let text = to_display(&args[0], heap);
                match heap.get_mut(recv) {
                    HeapData::Str(s) => {
                        s.push(&text);
                        Ok(Value::Undefined)
                    }
                    _ => Err(RunError::type_mismatch("'push' receiver is not a string.", span).into()),
                }
            }
            Self::StrPop => {
                let index = pop_index(&args[0], heap)?;
                let popped = match heap.get_mut(recv) {
                    HeapData::Str(s) => s.pop(index, span)?,
                    _ => return Err(RunError::type_mismatch("'pop' receiver is not a string.", span).into()),
                };
                Ok(heap.string(&popped))
            }
            _ => unreachable!("call_method is only reached for receiver builtins"),
        }
    }
}

/// The named builtin functions preloaded into the root namespace.
const BUILTIN_FUNCTIONS: &[Builtin] = &[
    Builtin::Print,
    Builtin::Read,
    Builtin::Write,
    Builtin::Sleep,
    Builtin::Exit,
    Builtin::MapNew,
    Builtin::ToBoolean,
    Builtin::ToNumber,
    Builtin::ToString,
    Builtin::Use,
    Builtin::New,
    Builtin::Current,
    Builtin::RegexMatch,
    Builtin::RegexFindall,
    Builtin::RegexReplace,
];

/// Preloads the root namespace: keywords, builtin functions, value
/// constants, math names, and the number words.
pub(crate) fn preload_root(namespaces: &mut Namespaces, heap: &mut Heap) {
    for kw in RESERVED_KEYWORDS {
        let value = Value::Keyword((*kw).into());
        namespaces.get_mut(ROOT_NS).insert((*kw).into(), Slot::Name(value));
    }
    for alias in function_keywords() {
        let value = Value::Keyword(alias.as_ref().into());
        namespaces.get_mut(ROOT_NS).insert(alias.clone(), Slot::Name(value));
    }
    for builtin in BUILTIN_FUNCTIONS {
        namespaces
            .get_mut(ROOT_NS)
            .insert(builtin.name().into(), Slot::Name(Value::Builtin(*builtin)));
    }
    for f in MathFn::ALL {
        namespaces
            .get_mut(ROOT_NS)
            .insert(f.name().into(), Slot::Name(Value::Builtin(Builtin::Math(*f))));
    }
    for (name, x) in math::MATH_CONSTANTS {
        let value = heap.number(*x);
        namespaces.get_mut(ROOT_NS).insert((*name).into(), Slot::Name(value));
    }
    for (name, x) in words::ONES_WORDS {
        let value = heap.number(*x);
        namespaces.get_mut(ROOT_NS).insert((*name).into(), Slot::Name(value));
    }
    for (name, base) in words::TENS_WORDS {
        namespaces
            .get_mut(ROOT_NS)
            .insert((*name).into(), Slot::Name(Value::Builtin(Builtin::Tens(*base))));
    }
    namespaces
        .get_mut(ROOT_NS)
        .insert("true".into(), Slot::Name(Value::Bool(Some(true))));
    namespaces
        .get_mut(ROOT_NS)
        .insert("false".into(), Slot::Name(Value::Bool(Some(false))));
    namespaces
        .get_mut(ROOT_NS)
        .insert("maybe".into(), Slot::Name(Value::Bool(None)));
    namespaces
        .get_mut(ROOT_NS)
        .insert("undefined".into(), Slot::Name(Value::Undefined));
    namespaces.get_mut(ROOT_NS).insert("".into(), Slot::Name(Value::Blank));
}

/// Seeds a root-level `var var` global, used when loading persisted globals.
pub(crate) fn seed_global(
    namespaces: &mut Namespaces,
    bindings: &mut crate::binding::Bindings,
    name: &str,
    value: Value,
) {
    let mut variable = Variable::new(name.into());
    variable.add_lifetime(value, crate::binding::DEFAULT_CONFIDENCE, INFINITE_LIFETIME, true, true, None);
    let var_id = bindings.insert(variable);
    namespaces.get_mut(ROOT_NS).insert(name.into(), Slot::Variable(var_id));
}
