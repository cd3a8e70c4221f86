//! The runtime value model.
//!
//! [`Value`] is a small tagged enum: immediates (booleans, keywords,
//! builtins) are stored inline, every mutable value lives in the heap arena
//! behind [`Value::Ref`]. The conversion matrix (`to_bool3` / `to_number` /
//! `to_display`) is total over every variant.
//!
//! [`PlainValue`] is the host-facing plain-data form: importable inputs,
//! persisted constants, and watcher change-detection snapshots all use it.

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::{
    builtins::Builtin,
    errors::{ErrorKind, RunError, RunResult},
    expressions::Span,
    heap::{Heap, HeapData, HeapId},
    types::{LagoonMap, MapKey},
    types::number::{FLOAT_TO_INT_PREC, format_number},
};

/// A runtime value.
#[derive(Debug, Clone)]
pub(crate) enum Value {
    Undefined,
    /// The distinguished empty-argument value.
    Blank,
    /// Three-valued boolean; `None` is `maybe`.
    Bool(Option<bool>),
    /// Reserved-word sentinel: reading a keyword name yields this.
    Keyword(Rc<str>),
    /// A builtin function handle.
    Builtin(Builtin),
    /// A receiver-mutating builtin bound to its receiver (`xs.push`).
    Bound(Builtin, HeapId),
    /// Reference into the heap arena (numbers, strings, lists, maps,
    /// functions, classes, objects, promises, signals).
    Ref(HeapId),
}

impl Value {
    /// The heap id behind a `Ref`, if any.
    pub fn ref_id(&self) -> Option<HeapId> {
        match self {
            Self::Ref(id) => Some(*id),
            _ => None,
        }
    }

    /// The numeric payload, without coercion.
    pub fn as_number(&self, heap: &Heap) -> Option<f64> {
        match self {
            Self::Ref(id) => match heap.get(*id) {
                HeapData::Number(x) => Some(*x),
                _ => None,
            },
            _ => None,
        }
    }

    /// The string payload, without coercion.
    pub fn as_text(&self, heap: &Heap) -> Option<String> {
        match self {
            Self::Ref(id) => match heap.get(*id) {
                HeapData::Str(s) => Some(s.text()),
                _ => None,
            },
            _ => None,
        }
    }

    /// A short noun for error messages.
    pub fn type_name(&self, heap: &Heap) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Blank => "blank",
            Self::Bool(_) => "boolean",
            Self::Keyword(_) => "keyword",
            Self::Builtin(_) | Self::Bound(..) => "builtin function",
            Self::Ref(id) => match heap.get(*id) {
                HeapData::Number(_) => "number",
                HeapData::Str(_) => "string",
                HeapData::List(_) => "list",
                HeapData::Map(_) => "map",
                HeapData::Function(_) => "function",
                HeapData::Class(_) => "class",
                HeapData::Object { .. } => "object",
                HeapData::Promise(_) => "promise",
                HeapData::Signal(_) => "signal",
            },
        }
    }
}

/// Converts a value to a three-valued boolean. Total.
pub(crate) fn to_bool3(value: &Value, heap: &Heap) -> Option<bool> {
    match value {
        Value::Undefined => Some(false),
        Value::Bool(b) => *b,
        Value::Blank | Value::Keyword(_) | Value::Builtin(_) | Value::Bound(..) => None,
        Value::Ref(id) => match heap.get(*id) {
            HeapData::Number(x) => {
                if x.round() != 0.0 {
                    Some(true)
                } else if x.abs() > FLOAT_TO_INT_PREC {
                    None
                } else {
                    Some(false)
                }
            }
            HeapData::Str(s) => {
                let text = s.text();
                if !text.trim().is_empty() {
                    Some(true)
                } else if s.is_empty() {
                    Some(false)
                } else {
                    None
                }
            }
            HeapData::List(l) => Some(!l.is_empty()),
            HeapData::Map(m) => Some(!m.is_empty()),
            HeapData::Function(_) | HeapData::Class(_) | HeapData::Object { .. } => None,
            HeapData::Promise(_) | HeapData::Signal(_) => None,
        },
    }
}

/// Converts a value to a number, or fails with `ConversionImpossible`.
pub(crate) fn to_number(value: &Value, heap: &Heap, span: Span) -> RunResult<f64> {
    let impossible = |what: &str| RunError::new(ErrorKind::ConversionImpossible, format!("Cannot turn {what} into a number."), span);
    match value {
        Value::Undefined => Ok(0.0),
        Value::Bool(Some(true)) => Ok(1.0),
        Value::Bool(Some(false)) => Ok(0.0),
        Value::Bool(None) => Ok(0.5),
        Value::Ref(id) => match heap.get(*id) {
            HeapData::Number(x) => Ok(*x),
            HeapData::Str(s) => {
                let text = s.text();
                text.trim()
                    .parse::<f64>()
                    .map_err(|_| impossible(&format!("the string '{text}'")))
            }
            HeapData::List(l) if l.is_empty() => Ok(0.0),
            HeapData::List(_) => Err(impossible("a non-empty list")),
            HeapData::Map(m) if m.is_empty() => Ok(0.0),
            HeapData::Map(_) => Err(impossible("a non-empty map")),
            other => Err(impossible(&format!("a {}", heap_noun(other)))),
        },
        other => Err(impossible(&format!("a {}", other.type_name(heap)))),
    }
}

fn heap_noun(data: &HeapData) -> &'static str {
    match data {
        HeapData::Number(_) => "number",
        HeapData::Str(_) => "string",
        HeapData::List(_) => "list",
        HeapData::Map(_) => "map",
        HeapData::Function(_) => "function",
        HeapData::Class(_) => "class",
        HeapData::Object { .. } => "object",
        HeapData::Promise(_) => "promise",
        HeapData::Signal(_) => "signal",
    }
}

const MAX_DISPLAY_DEPTH: usize = 32;

/// Converts a value to its display string. Total; cycles render as `…` once
/// the depth cap is reached.
pub(crate) fn to_display(value: &Value, heap: &Heap) -> String {
    display_with_depth(value, heap, 0)
}

fn display_with_depth(value: &Value, heap: &Heap, depth: usize) -> String {
    if depth > MAX_DISPLAY_DEPTH {
        return "…".to_owned();
    }
    match value {
        Value::Undefined => "undefined".to_owned(),
        Value::Blank => String::new(),
        Value::Bool(Some(true)) => "true".to_owned(),
        Value::Bool(Some(false)) => "false".to_owned(),
        Value::Bool(None) => "maybe".to_owned(),
        Value::Keyword(kw) => kw.to_string(),
        Value::Builtin(b) => format!("<builtin {}>", b.name()),
        Value::Bound(b, _) => format!("<builtin {}>", b.name()),
        Value::Ref(id) => match heap.get(*id) {
            HeapData::Number(x) => format_number(*x),
            HeapData::Str(s) => s.text(),
            HeapData::List(l) => {
                let items: Vec<String> = l.values().iter().map(|v| display_with_depth(v, heap, depth + 1)).collect();
                format!("[{}]", items.join(", "))
            }
            HeapData::Map(m) => {
                let items: Vec<String> = m
                    .iter()
                    .map(|(k, v)| format!("{}: {}", k.display(), display_with_depth(v, heap, depth + 1)))
                    .collect();
                format!("{{{}}}", items.join(", "))
            }
            HeapData::Function(f) => format!("<function ({})>", f.params.join(", ")),
            HeapData::Class(c) => format!("<class {}>", c.name),
            HeapData::Object { class_name, .. } => format!("<object {class_name}>"),
            HeapData::Promise(None) => "<promise>".to_owned(),
            HeapData::Promise(Some(v)) => format!("<promise: {}>", display_with_depth(v, heap, depth + 1)),
            HeapData::Signal(_) => "<signal>".to_owned(),
        },
    }
}

/// Structural equality on value payloads, used by `==` and by watcher change
/// detection. Two references to the same cell are always equal; otherwise
/// containers compare element-wise and leaf cells by payload. Functions,
/// classes, objects, promises, and signals compare by identity only.
pub(crate) fn payload_eq(a: &Value, b: &Value, heap: &Heap) -> bool {
    payload_eq_depth(a, b, heap, 0)
}

fn payload_eq_depth(a: &Value, b: &Value, heap: &Heap, depth: usize) -> bool {
    if depth > MAX_DISPLAY_DEPTH {
        return true;
    }
    match (a, b) {
        (Value::Undefined, Value::Undefined) | (Value::Blank, Value::Blank) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Keyword(x), Value::Keyword(y)) => x == y,
        (Value::Builtin(x), Value::Builtin(y)) => x == y,
        (Value::Bound(x, xr), Value::Bound(y, yr)) => x == y && xr == yr,
        (Value::Ref(x), Value::Ref(y)) => {
            if x == y {
                return true;
            }
            match (heap.get(*x), heap.get(*y)) {
                (HeapData::Number(m), HeapData::Number(n)) => (m - n).abs() < FLOAT_TO_INT_PREC,
                (HeapData::Str(s), HeapData::Str(t)) => s.text() == t.text(),
                (HeapData::List(s), HeapData::List(t)) => {
                    s.len() == t.len()
                        && s.values()
                            .iter()
                            .zip(t.values())
                            .all(|(u, v)| payload_eq_depth(u, v, heap, depth + 1))
                }
                (HeapData::Map(s), HeapData::Map(t)) => {
                    s.len() == t.len()
                        && s.iter().zip(t.iter()).all(|((ka, va), (kb, vb))| {
                            ka == kb && payload_eq_depth(va, vb, heap, depth + 1)
                        })
                }
                _ => false,
            }
        }
        _ => false,
    }
}

/// Builds a map key from a value; only numbers and strings qualify.
pub(crate) fn map_key_from_value(value: &Value, heap: &Heap, span: Span) -> RunResult<MapKey> {
    match value {
        Value::Ref(id) => match heap.get(*id) {
            HeapData::Number(x) => Ok(MapKey::Number(*x)),
            HeapData::Str(s) => Ok(MapKey::Str(s.text().into())),
            _ => Err(RunError::type_mismatch("Keys of a map must be a number or a string.", span)),
        },
        _ => Err(RunError::type_mismatch("Keys of a map must be a number or a string.", span)),
    }
}

/// Host-facing plain-data form of a value.
///
/// `PlainValue` is what crosses the engine boundary: importable names come in
/// as it, persisted constants round-trip through it, and watchers snapshot
/// dependency heads with it (its `PartialEq` is the "payload equality" change
/// detection runs on).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlainValue {
    Undefined,
    Blank,
    /// `None` is `maybe`.
    Bool(Option<bool>),
    Number(f64),
    Str(String),
    List(Vec<PlainValue>),
    Map(Vec<(PlainKey, PlainValue)>),
    /// Display-form placeholder for values that cannot round-trip
    /// (functions, objects, promises, cycles). Never persisted.
    Opaque(String),
}

/// A plain map key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlainKey {
    Number(f64),
    Str(String),
}

impl PlainValue {
    /// Captures a snapshot of a runtime value.
    ///
    /// Containers recurse with a cycle guard: a revisited cell or a value
    /// past the depth cap captures as `Opaque`.
    pub(crate) fn capture(value: &Value, heap: &Heap) -> Self {
        let mut visited = Vec::new();
        Self::capture_guarded(value, heap, &mut visited)
    }

    fn capture_guarded(value: &Value, heap: &Heap, visited: &mut Vec<HeapId>) -> Self {
        match value {
            Value::Undefined => Self::Undefined,
            Value::Blank => Self::Blank,
            Value::Bool(b) => Self::Bool(*b),
            Value::Keyword(kw) => Self::Opaque(format!("<keyword {kw}>")),
            Value::Builtin(b) => Self::Opaque(format!("<builtin {}>", b.name())),
            Value::Bound(b, id) => Self::Opaque(format!("<builtin {} bound #{}>", b.name(), id.index())),
            Value::Ref(id) => {
                if visited.contains(id) || visited.len() > MAX_DISPLAY_DEPTH {
                    return Self::Opaque("<cycle>".to_owned());
                }
                visited.push(*id);
                let captured = match heap.get(*id) {
                    HeapData::Number(x) => Self::Number(*x),
                    HeapData::Str(s) => Self::Str(s.text()),
                    HeapData::List(l) => {
                        Self::List(l.values().iter().map(|v| Self::capture_guarded(v, heap, visited)).collect())
                    }
                    HeapData::Map(m) => Self::Map(
                        m.iter()
                            .map(|(k, v)| {
                                let key = match k {
                                    MapKey::Number(n) => PlainKey::Number(*n),
                                    MapKey::Str(s) => PlainKey::Str(s.to_string()),
                                };
                                (key, Self::capture_guarded(v, heap, visited))
                            })
                            .collect(),
                    ),
                    HeapData::Function(f) => Self::Opaque(format!("<function ({})>", f.params.join(", "))),
                    HeapData::Class(c) => Self::Opaque(format!("<class {}>", c.name)),
                    HeapData::Object { class_name, namespace } => {
                        Self::Opaque(format!("<object {class_name} #{}>", namespace.index()))
                    }
                    HeapData::Promise(None) => Self::Opaque(format!("<promise #{}>", id.index())),
                    HeapData::Promise(Some(v)) => {
                        let inner = Self::capture_guarded(v, heap, visited);
                        Self::Opaque(format!("<promise: {inner:?}>"))
                    }
                    HeapData::Signal(_) => Self::Opaque(format!("<signal #{}>", id.index())),
                };
                visited.pop();
                captured
            }
        }
    }

    /// Materializes the plain value into the heap.
    pub(crate) fn into_value(self, heap: &mut Heap) -> Value {
        match self {
            Self::Undefined => Value::Undefined,
            Self::Blank => Value::Blank,
            Self::Bool(b) => Value::Bool(b),
            Self::Number(x) => heap.number(x),
            Self::Str(s) => heap.string(&s),
            Self::List(items) => {
                let values: Vec<Value> = items.into_iter().map(|item| item.into_value(heap)).collect();
                heap.list(values)
            }
            Self::Map(entries) => {
                let mut map = LagoonMap::new();
                for (key, item) in entries {
                    let value = item.into_value(heap);
                    let key = match key {
                        PlainKey::Number(n) => MapKey::Number(n),
                        PlainKey::Str(s) => MapKey::Str(s.into()),
                    };
                    map.set(key, value);
                }
                Value::Ref(heap.alloc(HeapData::Map(map)))
            }
            Self::Opaque(text) => heap.string(&text),
        }
    }

    /// True when the value contains no `Opaque` part and can be persisted.
    pub fn is_storable(&self) -> bool {
        match self {
            Self::Opaque(_) => false,
            Self::List(items) => items.iter().all(Self::is_storable),
            Self::Map(entries) => entries.iter().all(|(_, v)| v.is_storable()),
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boolean_conversion_is_idempotent() {
        let heap = Heap::new();
        for b in [Some(true), Some(false), None] {
            let v = Value::Bool(b);
            assert_eq!(to_bool3(&Value::Bool(to_bool3(&v, &heap)), &heap), to_bool3(&v, &heap));
        }
    }

    #[test]
    fn string_truthiness_distinguishes_empty_from_whitespace() {
        let mut heap = Heap::new();
        let empty = heap.string("");
        let space = heap.string(" ");
        let word = heap.string("hi");
        assert_eq!(to_bool3(&empty, &heap), Some(false));
        assert_eq!(to_bool3(&space, &heap), None);
        assert_eq!(to_bool3(&word, &heap), Some(true));
    }

    #[test]
    fn small_nonzero_numbers_are_maybe() {
        let mut heap = Heap::new();
        let tiny = heap.number(1e-4);
        let zero = heap.number(0.0);
        let one = heap.number(1.0);
        assert_eq!(to_bool3(&tiny, &heap), None);
        assert_eq!(to_bool3(&zero, &heap), Some(false));
        assert_eq!(to_bool3(&one, &heap), Some(true));
    }

    #[test]
    fn maybe_coerces_to_half() {
        let heap = Heap::new();
        assert_eq!(to_number(&Value::Bool(None), &heap, Span::default()).unwrap(), 0.5);
    }

    #[test]
    fn number_display_round_trips_integers() {
        let mut heap = Heap::new();
        let n = heap.number(42.0);
        let text = to_display(&n, &heap);
        let back = heap.string(&text);
        let reparsed = to_number(&back, &heap, Span::default()).unwrap();
        assert_eq!(to_display(&heap.number(reparsed), &heap), text);
    }

    #[test]
    fn cyclic_list_captures_without_recursing() {
        let mut heap = Heap::new();
        let list = heap.list(vec![]);
        let id = list.ref_id().unwrap();
        if let HeapData::List(l) = heap.get_mut(id) {
            l.push(Value::Ref(id));
        }
        let snapshot = PlainValue::capture(&list, &heap);
        assert_eq!(snapshot, PlainValue::List(vec![PlainValue::Opaque("<cycle>".to_owned())]));
    }
}
