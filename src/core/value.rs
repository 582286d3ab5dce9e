//! [`Value`]: the dynamically-typed slot every reactive container stores.
//!
//! Rust has no single type that stands in for "anything a JS property might
//! hold", so this crate gives that role to an explicit enum. Nesting a
//! `Value::Object`/`Value::Array` inside another container is how deep
//! reactivity is expressed: the nested container already carries its own
//! `KeyMap`, so reading through it tracks its own deps rather than the
//! parent's.

use std::rc::Rc;

use crate::collections::{ReactiveArray, ReactiveObject};
use crate::primitives::refs::Ref;

/// A value held in a reactive container's storage slot.
#[derive(Clone)]
#[allow(clippy::large_enum_variant)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    Str(Rc<str>),
    Ref(Ref),
    Object(ReactiveObject),
    Array(ReactiveArray),
}

impl Value {
    pub fn is_ref(&self) -> bool {
        matches!(self, Value::Ref(_))
    }

    pub fn is_container(&self) -> bool {
        matches!(self, Value::Object(_) | Value::Array(_))
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(Rc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(Rc::from(s.as_str()))
    }
}

impl From<Ref> for Value {
    fn from(r: Ref) -> Self {
        Value::Ref(r)
    }
}

impl From<ReactiveObject> for Value {
    fn from(o: ReactiveObject) -> Self {
        Value::Object(o)
    }
}

impl From<ReactiveArray> for Value {
    fn from(a: ReactiveArray) -> Self {
        Value::Array(a)
    }
}

/// Deliberately shallow: containers print only their kind, not their
/// contents, since a `Value` can reach a cycle through a self-referencing
/// reactive object.
impl std::fmt::Debug for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "Null"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Number(n) => write!(f, "Number({n})"),
            Value::Str(s) => write!(f, "Str({s:?})"),
            Value::Ref(_) => write!(f, "Ref(..)"),
            Value::Object(_) => write!(f, "Object(..)"),
            Value::Array(_) => write!(f, "Array(..)"),
        }
    }
}
