//! Map behavior: number- or string-keyed dictionaries.

use indexmap::IndexMap;

use crate::{
    errors::{ErrorKind, RunError, RunResult},
    expressions::Span,
    types::number::format_number,
};
use crate::value::Value;

/// A map key: numbers and strings only.
///
/// Number keys hash by bit pattern with `-0.0` normalized to `0.0`, so the
/// two zeroes address one entry.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum MapKey {
    Number(f64),
    Str(Box<str>),
}

impl MapKey {
    fn canonical_bits(x: f64) -> u64 {
        if x == 0.0 { 0.0_f64.to_bits() } else { x.to_bits() }
    }

    /// Renders the key the way map display prints it.
    pub fn display(&self) -> String {
        match self {
            Self::Number(n) => format_number(*n),
            Self::Str(s) => s.to_string(),
        }
    }
}

impl Eq for MapKey {}

impl std::hash::Hash for MapKey {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        match self {
            Self::Number(n) => {
                state.write_u8(0);
                state.write_u64(Self::canonical_bits(*n));
            }
            Self::Str(s) => {
                state.write_u8(1);
                s.hash(state);
            }
        }
    }
}

/// An insertion-ordered dictionary of language values.
#[derive(Debug, Default)]
pub(crate) struct LagoonMap {
    entries: IndexMap<MapKey, Value, ahash::RandomState>,
}

impl LagoonMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&MapKey, &Value)> {
        self.entries.iter()
    }

    pub fn get(&self, key: &MapKey, span: Span) -> RunResult<Value> {
        self.entries
            .get(key)
            .cloned()
            .ok_or_else(|| RunError::new(ErrorKind::UnassignedIndex, format!("Key '{}' not in map.", key.display()), span))
    }

    pub fn set(&mut self, key: MapKey, val: Value) {
        self.entries.insert(key, val);
    }
}
