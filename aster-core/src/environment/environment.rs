use std::{cell::RefCell, collections::HashMap, rc::Rc};

use crate::parser::prelude::Statement;

use super::value::Value;

/// A runtime variable cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub value: Value,
    pub mutable: bool,
}

/// A function stored in a scope: either the `print` builtin or a
/// user-defined closure.
#[derive(Debug, Clone)]
pub enum Callable {
    Print,
    Closure(Rc<Closure>),
}

/// A user function together with the scope it was defined in. Invocation
/// binds arguments in a fresh child of that scope.
pub struct Closure {
    pub parameters: Vec<String>,
    pub body: Vec<Statement>,
    pub scope: Rc<RefCell<Scope>>,
}

impl std::fmt::Debug for Closure {
    // The captured scope holds this closure, so the derived impl would
    // recurse forever.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Closure")
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

/// A chained name-to-binding store. Lookup walks innermost-first, so
/// bindings in a child scope shadow the parent's.
#[derive(Debug, Default)]
pub struct Scope {
    bindings: HashMap<String, Binding>,
    callables: HashMap<(String, usize), Callable>,
    parent: Option<Rc<RefCell<Scope>>>,
}

impl Scope {
    pub fn root() -> Rc<RefCell<Self>> {
        let scope = Rc::new(RefCell::new(Scope::default()));
        scope.borrow_mut().define_callable("print", 1, Callable::Print);

        scope
    }

    pub fn child(parent: &Rc<RefCell<Scope>>) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Scope {
            bindings: HashMap::new(),
            callables: HashMap::new(),
            parent: Some(parent.clone()),
        }))
    }

    pub fn define(&mut self, name: String, mutable: bool, value: Value) {
        self.bindings.insert(name, Binding { value, mutable });
    }

    pub fn define_callable(&mut self, name: &str, arity: usize, callable: Callable) {
        self.callables.insert((name.to_string(), arity), callable);
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        match self.bindings.get(name) {
            Some(binding) => Some(binding.value.clone()),
            None => match &self.parent {
                Some(parent) => parent.borrow().get(name),
                None => None,
            },
        }
    }

    /// Writes `value` into the nearest binding of `name`, walking the
    /// parent chain. Returns false when no binding exists.
    pub fn assign(&mut self, name: &str, value: Value) -> bool {
        match self.bindings.get_mut(name) {
            Some(binding) => {
                binding.value = value;
                true
            },
            None => match &self.parent {
                Some(parent) => parent.borrow_mut().assign(name, value),
                None => false,
            },
        }
    }

    pub fn callable(&self, name: &str, arity: usize) -> Option<Callable> {
        match self.callables.get(&(name.to_string(), arity)) {
            Some(callable) => Some(callable.clone()),
            None => match &self.parent {
                Some(parent) => parent.borrow().callable(name, arity),
                None => None,
            },
        }
    }
}
