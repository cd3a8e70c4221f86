//! Names, variables, and confidence-ranked lifetimes.
//!
//! A `Name` is an immutable binding. A `Variable` carries an ordered list of
//! lifetimes: the head (index 0) is the observed binding, and the list is
//! ordered so the head has the lowest confidence present. Insertion goes
//! before the first entry of greater-or-equal confidence, which makes a
//! newer binding at equal confidence the new head.

use std::time::{Duration, Instant};

use smallvec::SmallVec;

use crate::value::Value;

/// Line-count sentinel for lifetimes that never expire by line.
pub(crate) const INFINITE_LIFETIME: i64 = 100_000_000_000;

/// Default statement confidence when no `?` suffix lowered it.
pub(crate) const DEFAULT_CONFIDENCE: i64 = 0;

/// One validity window of a variable binding.
#[derive(Debug, Clone)]
pub(crate) struct VariableLifetime {
    pub value: Value,
    /// Remaining executed statements before this lifetime expires.
    pub lines_left: i64,
    pub confidence: i64,
    /// Whether plain re-assignment / same-confidence re-declaration is allowed.
    pub can_be_reset: bool,
    /// Whether in-place edits through `index_set` are allowed.
    pub can_edit_value: bool,
    pub created_at: Instant,
    pub is_temporal: bool,
    pub temporal_duration: Duration,
}

/// A variable: its live lifetimes plus the history of supplanted head values.
#[derive(Debug)]
pub(crate) struct Variable {
    pub name: Box<str>,
    pub lifetimes: SmallVec<[VariableLifetime; 2]>,
    pub history: Vec<Value>,
}

impl Variable {
    pub fn new(name: Box<str>) -> Self {
        Self {
            name,
            lifetimes: SmallVec::new(),
            history: Vec::new(),
        }
    }

    /// The observed lifetime, when any is live.
    pub fn head(&self) -> Option<&VariableLifetime> {
        self.lifetimes.first()
    }

    /// The observed value, when any lifetime is live.
    pub fn value(&self) -> Option<&Value> {
        self.lifetimes.first().map(|l| &l.value)
    }

    /// True when every lifetime has expired; reads must fail.
    pub fn is_undefined(&self) -> bool {
        self.lifetimes.is_empty()
    }

    /// Inserts a lifetime at the first position whose confidence is
    /// greater than or equal to the new one. When the insertion supplants
    /// the head of a non-empty list, the old head value moves to `history`.
    pub fn add_lifetime(
        &mut self,
        value: Value,
        confidence: i64,
        lines_left: i64,
        can_be_reset: bool,
        can_edit_value: bool,
        temporal: Option<Duration>,
    ) {
        let at = self
            .lifetimes
            .iter()
            .position(|l| l.confidence >= confidence)
            .unwrap_or(self.lifetimes.len());
        if at == 0
            && let Some(old_head) = self.lifetimes.first()
        {
            self.history.push(old_head.value.clone());
        }
        self.lifetimes.insert(
            at,
            VariableLifetime {
                value,
                lines_left,
                confidence,
                can_be_reset,
                can_edit_value,
                created_at: Instant::now(),
                is_temporal: temporal.is_some(),
                temporal_duration: temporal.unwrap_or_default(),
            },
        );
    }

    /// Removes lifetimes that ran out of lines or whose temporal duration
    /// elapsed. Returns true when the last live lifetime was removed by this
    /// call.
    pub fn clear_outdated(&mut self, now: Instant) -> bool {
        if self.lifetimes.is_empty() {
            return false;
        }
        self.lifetimes
            .retain(|l| l.lines_left != 0 && !(l.is_temporal && now.duration_since(l.created_at) >= l.temporal_duration));
        self.lifetimes.is_empty()
    }

    /// Ticks every live lifetime down by one executed statement.
    pub fn decrement_lines(&mut self) {
        for lifetime in &mut self.lifetimes {
            if lifetime.lines_left > 0 {
                lifetime.lines_left -= 1;
            }
        }
    }
}

/// Index of a variable in the central store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct VarId(u32);

impl VarId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Central storage for all variables.
///
/// Namespaces bind identifiers to `VarId`s, so the same variable reached via
/// two namespaces is one object, and the scheduler's write-set can subscribe
/// by id. Variables are never removed: an expired variable keeps its slot
/// (empty lifetimes) while every namespace entry pointing at it is swept.
#[derive(Debug, Default)]
pub(crate) struct Bindings {
    vars: Vec<Variable>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, variable: Variable) -> VarId {
        let id = VarId(u32::try_from(self.vars.len()).expect("variable count exceeds u32"));
        self.vars.push(variable);
        id
    }

    pub fn get(&self, id: VarId) -> &Variable {
        &self.vars[id.index()]
    }

    pub fn get_mut(&mut self, id: VarId) -> &mut Variable {
        &mut self.vars[id.index()]
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Variable> {
        self.vars.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lifetime_values(var: &Variable) -> Vec<i64> {
        var.lifetimes.iter().map(|l| l.confidence).collect()
    }

    #[test]
    fn head_has_lowest_confidence() {
        let mut var = Variable::new("x".into());
        var.add_lifetime(Value::Bool(Some(true)), 2, INFINITE_LIFETIME, true, true, None);
        var.add_lifetime(Value::Bool(Some(false)), 0, INFINITE_LIFETIME, true, true, None);
        var.add_lifetime(Value::Bool(None), 1, INFINITE_LIFETIME, true, true, None);
        assert_eq!(lifetime_values(&var), vec![0, 1, 2]);
    }

    #[test]
    fn equal_confidence_newcomer_becomes_head() {
        let mut var = Variable::new("x".into());
        var.add_lifetime(Value::Bool(Some(true)), 0, INFINITE_LIFETIME, true, true, None);
        var.add_lifetime(Value::Bool(Some(false)), 0, INFINITE_LIFETIME, true, true, None);
        assert_eq!(var.value().and_then(|v| match v {
            Value::Bool(b) => *b,
            _ => unreachable!(),
        }), Some(false));
        assert_eq!(var.history.len(), 1);
    }

    #[test]
    fn supplanting_the_head_records_history() {
        let mut var = Variable::new("x".into());
        var.add_lifetime(Value::Bool(Some(true)), 1, INFINITE_LIFETIME, true, true, None);
        // lower confidence lands in front of the head
        var.add_lifetime(Value::Bool(Some(false)), 0, INFINITE_LIFETIME, true, true, None);
        assert_eq!(var.history.len(), 1);
        // higher confidence lands behind; no history entry
        var.add_lifetime(Value::Bool(None), 5, INFINITE_LIFETIME, true, true, None);
        assert_eq!(var.history.len(), 1);
    }

    #[test]
    fn line_expiry_clears_lifetimes() {
        let mut var = Variable::new("x".into());
        var.add_lifetime(Value::Bool(Some(true)), 0, 2, true, true, None);
        var.decrement_lines();
        assert!(!var.clear_outdated(Instant::now()));
        var.decrement_lines();
        assert!(var.clear_outdated(Instant::now()));
        assert!(var.is_undefined());
    }

    #[test]
    fn temporal_expiry_uses_wall_clock() {
        let mut var = Variable::new("x".into());
        var.add_lifetime(
            Value::Bool(Some(true)),
            0,
            INFINITE_LIFETIME,
            true,
            true,
            Some(Duration::from_millis(5)),
        );
        assert!(!var.clear_outdated(Instant::now()));
        std::thread::sleep(Duration::from_millis(10));
        assert!(var.clear_outdated(Instant::now()));
    }
}
