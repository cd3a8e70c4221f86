//! User-defined functions and class templates.

use std::rc::Rc;

use crate::{namespace::NamespaceId, statements::Stmt};

/// A user-defined function ready for execution.
///
/// The body and parameter list are shared (`Rc`) because a call must execute
/// the body while the heap that owns the function stays mutable. The captured
/// scope chain is the namespace stack at definition time, by reference: outer
/// mutations are visible to later calls.
#[derive(Debug, Clone)]
pub(crate) struct FunctionData {
    /// Function name; `<anonymous>` for function literals.
    pub name: Box<str>,
    pub params: Rc<[Box<str>]>,
    pub body: Rc<[Stmt]>,
    /// Async functions run as scheduler tasks and return promises.
    pub is_async: bool,
    /// Namespace chain captured at definition time.
    pub scope: Vec<NamespaceId>,
}

/// A class template.
///
/// Calling the class value executes `body` in a fresh namespace and wraps the
/// result as an object whose members are the body's bindings.
#[derive(Debug, Clone)]
pub(crate) struct ClassData {
    pub name: Box<str>,
    pub body: Rc<[Stmt]>,
    /// Namespace chain captured at declaration time.
    pub scope: Vec<NamespaceId>,
}
