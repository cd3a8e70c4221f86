//! Regex builtins.
//!
//! Each takes a single comma-joined argument string: `pattern,string` for
//! `regex_match`/`regex_findall` and `pattern,replacement,string` for
//! `regex_replace`. Malformed patterns fail with `InvalidRegex`.

use regex::Regex;

use crate::{
    errors::{ErrorKind, RunError, RunResult},
    expressions::Span,
    heap::Heap,
    value::Value,
};

fn compile(pattern: &str, span: Span) -> RunResult<Regex> {
    Regex::new(pattern).map_err(|err| RunError::new(ErrorKind::InvalidRegex, format!("Invalid regex pattern: {err}"), span))
}

fn argument_text(arg: &Value, heap: &Heap, usage: &'static str, span: Span) -> RunResult<String> {
    arg.as_text(heap)
        .ok_or_else(|| RunError::type_mismatch(usage, span))
}

/// `regex_match("pattern,string")` — true when the pattern matches anywhere.
pub(crate) fn regex_match(arg: &Value, heap: &Heap, span: Span) -> RunResult<Value> {
    const USAGE: &str = "regex_match requires 'pattern,string'";
    let text = argument_text(arg, heap, USAGE, span)?;
    let (pattern, subject) = text
        .split_once(',')
        .ok_or_else(|| RunError::type_mismatch(USAGE, span))?;
    let regex = compile(pattern, span)?;
    Ok(Value::Bool(Some(regex.is_match(subject))))
}

/// `regex_findall("pattern,string")` — list of every match.
pub(crate) fn regex_findall(arg: &Value, heap: &mut Heap, span: Span) -> RunResult<Value> {
    const USAGE: &str = "regex_findall requires 'pattern,string'";
    let text = argument_text(arg, heap, USAGE, span)?;
    let (pattern, subject) = text
        .split_once(',')
        .ok_or_else(|| RunError::type_mismatch(USAGE, span))?;
    let regex = compile(pattern, span)?;
    let matches: Vec<String> = regex.find_iter(subject).map(|m| m.as_str().to_owned()).collect();
    let values: Vec<Value> = matches.iter().map(|m| heap.string(m)).collect();
    Ok(heap.list(values))
}

/// `regex_replace("pattern,replacement,string")` — replaces every match.
pub(crate) fn regex_replace(arg: &Value, heap: &mut Heap, span: Span) -> RunResult<Value> {
    const USAGE: &str = "regex_replace requires 'pattern,replacement,string'";
    let text = argument_text(arg, heap, USAGE, span)?;
    let mut parts = text.splitn(3, ',');
    let (Some(pattern), Some(replacement), Some(subject)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(RunError::type_mismatch(USAGE, span));
    };
    let regex = compile(pattern, span)?;
    let replaced = regex.replace_all(subject, replacement).into_owned();
    Ok(heap.string(&replaced))
}
