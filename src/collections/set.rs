//! `ReactiveSet<T>`: the Set sibling of [`super::ReactiveMap`], on the same
//! ad-hoc per-value `Dep` model.

use std::cell::RefCell;
use std::hash::Hash;
use std::rc::Rc;

use indexmap::IndexSet;

use crate::core::dep::KeyMap;
use crate::core::key::{Key, TargetKind, TrackOpTypes, TriggerOpTypes};
use crate::core::value::Value;
use crate::reactivity::tracking::{track, trigger};

struct SetStorage<T> {
    key_map: KeyMap,
    values: RefCell<IndexSet<T>>,
}

#[derive(Clone)]
pub struct ReactiveSet<T> {
    storage: Rc<SetStorage<T>>,
}

impl<T> ReactiveSet<T>
where
    T: Eq + Hash + Clone + Into<Value>,
{
    pub fn new() -> Self {
        Self {
            storage: Rc::new(SetStorage {
                key_map: KeyMap::new(),
                values: RefCell::new(IndexSet::new()),
            }),
        }
    }

    pub fn ptr_eq(&self, other: &ReactiveSet<T>) -> bool {
        Rc::ptr_eq(&self.storage, &other.storage)
    }

    pub fn size(&self) -> usize {
        track(
            &self.storage.key_map,
            TargetKind::Set,
            TrackOpTypes::Iterate,
            &Key::Iterate,
        );
        self.storage.values.borrow().len()
    }

    pub fn has(&self, value: &T) -> bool {
        track(&self.storage.key_map, TargetKind::Set, TrackOpTypes::Has, &dep_key(value));
        self.storage.values.borrow().contains(value)
    }

    /// Returns `true` if `value` was newly inserted.
    pub fn add(&self, value: T) -> bool {
        let inserted = self.storage.values.borrow_mut().insert(value.clone());
        if inserted {
            trigger(
                &self.storage.key_map,
                TargetKind::Set,
                TriggerOpTypes::Add,
                Some(&dep_key(&value)),
                Some(value.into()),
                None,
            );
        }
        inserted
    }

    pub fn delete(&self, value: &T) -> bool {
        let removed = self.storage.values.borrow_mut().shift_remove(value);
        if removed {
            trigger(
                &self.storage.key_map,
                TargetKind::Set,
                TriggerOpTypes::Delete,
                Some(&dep_key(value)),
                None,
                Some(value.clone().into()),
            );
        }
        removed
    }

    pub fn clear(&self) {
        let had_values = !self.storage.values.borrow().is_empty();
        self.storage.values.borrow_mut().clear();
        if had_values {
            trigger(
                &self.storage.key_map,
                TargetKind::Set,
                TriggerOpTypes::Clear,
                None,
                None,
                None,
            );
        }
    }

    pub fn values(&self) -> Vec<T> {
        track(
            &self.storage.key_map,
            TargetKind::Set,
            TrackOpTypes::Iterate,
            &Key::Iterate,
        );
        self.storage.values.borrow().iter().cloned().collect()
    }
}

impl<T> Default for ReactiveSet<T>
where
    T: Eq + Hash + Clone + Into<Value>,
{
    fn default() -> Self {
        Self::new()
    }
}

fn dep_key<T: Clone + Into<Value>>(value: &T) -> Key {
    match value.clone().into() {
        Value::Str(s) => Key::Prop(s),
        Value::Number(n) => Key::Prop(Rc::from(n.to_string().as_str())),
        _ => Key::Iterate,
    }
}
