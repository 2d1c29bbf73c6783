use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::value::{RuntimeError, Value};

struct Scope {
    values: HashMap<String, Value>,
    enclosing: Option<Env>,
}

/// Handle to one lexical scope. Cloning shares the scope.
#[derive(Clone)]
pub struct Env(Rc<RefCell<Scope>>);

impl Env {
    /// A root scope with no enclosing environment.
    pub fn global() -> Self {
        Env(Rc::new(RefCell::new(Scope {
            values: HashMap::new(),
            enclosing: None,
        })))
    }

    /// A fresh scope enclosed by `self`.
    pub fn child(&self) -> Self {
        Env(Rc::new(RefCell::new(Scope {
            values: HashMap::new(),
            enclosing: Some(self.clone()),
        })))
    }

    /// Insert or overwrite in this scope only.
    pub fn define(&self, name: impl Into<String>, value: Value) {
        self.0.borrow_mut().values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Result<Value, RuntimeError> {
        self.get_by_name(name)
            .ok_or_else(|| RuntimeError::UndefinedVariable(name.to_string()))
    }

    /// Lookup that reports absence as `None` instead of an error.
    pub fn get_by_name(&self, name: &str) -> Option<Value> {
        let mut scope = self.clone();
        loop {
            let next = {
                let inner = scope.0.borrow();
                if let Some(v) = inner.values.get(name) {
                    return Some(v.clone());
                }
                inner.enclosing.clone()?
            };
            scope = next;
        }
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.with_value_mut(name, |_| ()).is_ok()
    }

    /// Overwrite an existing binding in the nearest scope that holds it.
    pub fn assign(&self, name: &str, value: Value) -> Result<(), RuntimeError> {
        self.with_value_mut(name, |slot| *slot = value)
    }

    /// Run `f` on the binding in the nearest scope that holds `name`.
    pub fn with_value_mut<R>(
        &self,
        name: &str,
        f: impl FnOnce(&mut Value) -> R,
    ) -> Result<R, RuntimeError> {
        let mut scope = self.clone();
        loop {
            let next = {
                let mut inner = scope.0.borrow_mut();
                if let Some(slot) = inner.values.get_mut(name) {
                    return Ok(f(slot));
                }
                inner.enclosing.clone()
            };
            match next {
                Some(outer) => scope = outer,
                None => return Err(RuntimeError::UndefinedVariable(name.to_string())),
            }
        }
    }

    /// Snapshot of the bindings held directly by this scope.
    pub fn local_bindings(&self) -> Vec<(String, Value)> {
        self.0
            .borrow()
            .values
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn enclosing(&self) -> Option<Env> {
        self.0.borrow().enclosing.clone()
    }

    /// Drop every binding in this scope; breaks `Rc` cycles through closures.
    pub fn clear(&self) {
        self.0.borrow_mut().values.clear();
    }

    pub fn ptr_eq(&self, other: &Env) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for Env {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Env {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.0.borrow();
        let mut names: Vec<&String> = inner.values.keys().collect();
        names.sort();
        f.debug_struct("Env")
            .field("names", &names)
            .field("has_enclosing", &inner.enclosing.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_walks_enclosing_scopes() {
        let global = Env::global();
        global.define("x", Value::Int(1));
        let inner = global.child().child();
        assert_eq!(inner.get("x").unwrap(), Value::Int(1));
    }

    #[test]
    fn define_shadows_without_touching_outer() {
        let global = Env::global();
        global.define("x", Value::Int(1));
        let inner = global.child();
        inner.define("x", Value::Int(2));
        assert_eq!(inner.get("x").unwrap(), Value::Int(2));
        assert_eq!(global.get("x").unwrap(), Value::Int(1));
    }

    #[test]
    fn assign_mutates_nearest_binding() {
        let global = Env::global();
        global.define("x", Value::Int(1));
        let inner = global.child();
        inner.assign("x", Value::Int(5)).unwrap();
        assert_eq!(global.get("x").unwrap(), Value::Int(5));
        assert!(inner.local_bindings().is_empty());
    }

    #[test]
    fn assign_never_creates_binding() {
        let global = Env::global();
        let err = global.assign("missing", Value::Int(1)).unwrap_err();
        assert_eq!(err, RuntimeError::UndefinedVariable("missing".to_string()));
        assert!(!global.is_defined("missing"));
    }

    #[test]
    fn get_undefined_fails() {
        let global = Env::global();
        assert!(global.get("nope").is_err());
        assert_eq!(global.get_by_name("nope"), None);
    }
}
