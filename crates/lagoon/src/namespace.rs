//! Namespaces and the scope chain.
//!
//! All namespaces live in one central arena and are addressed by
//! [`NamespaceId`]; a scope chain is a plain `Vec<NamespaceId>` from
//! outermost (the root) to innermost. Storing namespaces centrally instead
//! of nesting owned maps gives interior mutability without `Rc<RefCell>`:
//! a watcher or function that captured a chain by id sees later mutations
//! to those namespaces, and the executor only ever needs one `&mut` at a
//! time.
//!
//! Namespaces are not freed when a scope pops: watchers and functions may
//! still hold the chain. The arena lives for the length of the run.

use indexmap::IndexMap;

use crate::binding::{Bindings, VarId};
use crate::value::Value;

/// Index of a namespace in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NamespaceId(u32);

impl NamespaceId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// The root (global) namespace is always at index 0.
pub(crate) const ROOT_NS: NamespaceId = NamespaceId(0);

/// One binding slot: an immutable `Name` or a reference to a variable.
#[derive(Debug, Clone)]
pub(crate) enum Slot {
    Name(Value),
    Variable(VarId),
}

/// A single namespace: insertion-ordered identifier → binding.
#[derive(Debug, Default)]
pub(crate) struct Namespace {
    entries: IndexMap<Box<str>, Slot, ahash::RandomState>,
}

impl Namespace {
    pub fn get(&self, name: &str) -> Option<&Slot> {
        self.entries.get(name)
    }

    pub fn insert(&mut self, name: Box<str>, slot: Slot) {
        self.entries.insert(name, slot);
    }

    pub fn remove(&mut self, name: &str) -> Option<Slot> {
        self.entries.shift_remove(name)
    }
}

/// Storage for all namespaces during execution.
#[derive(Debug)]
pub(crate) struct Namespaces {
    arena: Vec<Namespace>,
}

impl Namespaces {
    /// Creates the arena with the root namespace at index 0.
    pub fn new() -> Self {
        Self {
            arena: vec![Namespace::default()],
        }
    }

    /// Allocates a fresh, empty namespace.
    pub fn alloc(&mut self) -> NamespaceId {
        let id = NamespaceId(u32::try_from(self.arena.len()).expect("namespace count exceeds u32"));
        self.arena.push(Namespace::default());
        id
    }

    pub fn get(&self, id: NamespaceId) -> &Namespace {
        &self.arena[id.index()]
    }

    pub fn get_mut(&mut self, id: NamespaceId) -> &mut Namespace {
        &mut self.arena[id.index()]
    }

    /// Looks an identifier up through a scope chain, innermost first.
    pub fn lookup(&self, chain: &[NamespaceId], name: &str) -> Option<(NamespaceId, Slot)> {
        for &ns in chain.iter().rev() {
            if let Some(slot) = self.arena[ns.index()].get(name) {
                return Some((ns, slot.clone()));
            }
        }
        None
    }

    /// Inserts a binding into the innermost namespace of a chain.
    pub fn insert_local(&mut self, chain: &[NamespaceId], name: Box<str>, slot: Slot) {
        let innermost = *chain.last().expect("scope chain is never empty");
        self.get_mut(innermost).insert(name, slot);
    }

    /// Removes every binding for `name` along the chain, returning the
    /// variables that lost a binding. Idempotent on missing names.
    pub fn remove_all(&mut self, chain: &[NamespaceId], name: &str) -> Vec<VarId> {
        let mut removed = Vec::new();
        for &ns in chain {
            if let Some(Slot::Variable(var_id)) = self.arena[ns.index()].remove(name) {
                removed.push(var_id);
            }
        }
        removed
    }

    /// Sweeps variable bindings whose variable has no live lifetime out of
    /// every namespace, so an expired variable is gone rather than present
    /// and empty. Returns the swept variable ids.
    pub fn sweep_expired(&mut self, bindings: &Bindings) -> Vec<VarId> {
        let mut swept = Vec::new();
        for namespace in &mut self.arena {
            namespace.entries.retain(|_, slot| match slot {
                Slot::Variable(var_id) if bindings.get(*var_id).is_undefined() => {
                    swept.push(*var_id);
                    false
                }
                _ => true,
            });
        }
        swept
    }
}
