//! `ReactiveObject`: a dynamically-keyed property bag. Plays the role the
//! source design's `get`/`set`/`has`/`ownKeys` proxy traps play, as a
//! concrete typed method surface instead of dynamic dispatch.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::core::dep::KeyMap;
use crate::core::key::{Key, TargetKind, TrackOpTypes, TriggerOpTypes};
use crate::core::value::Value;
use crate::reactivity::equality::has_changed;
use crate::reactivity::tracking::{track, trigger};

struct ObjectStorage {
    key_map: KeyMap,
    props: RefCell<IndexMap<Rc<str>, Value>>,
}

/// A reactive property bag. Four constructors (`reactive`, `readonly`,
/// `shallow_reactive`, `shallow_readonly`) produce handles differing only in
/// the `readonly`/`shallow` flags carried alongside the shared storage —
/// `readonly(reactive(x))` and `reactive(x)` point at the same `KeyMap` and
/// `props`, so writes through one are visible through the other.
#[derive(Clone)]
pub struct ReactiveObject {
    storage: Rc<ObjectStorage>,
    readonly: bool,
    shallow: bool,
}

impl ReactiveObject {
    pub fn new() -> Self {
        Self::from_props(IndexMap::new())
    }

    pub fn from_props(props: IndexMap<Rc<str>, Value>) -> Self {
        Self {
            storage: Rc::new(ObjectStorage {
                key_map: KeyMap::new(),
                props: RefCell::new(props),
            }),
            readonly: false,
            shallow: false,
        }
    }

    /// Build a view over the same storage with different `readonly`/
    /// `shallow` flags. `pub(crate)` rather than private: a readonly parent's
    /// `get` needs to wrap a nested `ReactiveArray` the same way, from
    /// `collections::array`.
    pub(crate) fn view(&self, readonly: bool, shallow: bool) -> Self {
        Self {
            storage: self.storage.clone(),
            readonly,
            shallow,
        }
    }

    pub fn is_reactive(&self) -> bool {
        !self.readonly
    }

    pub fn is_readonly(&self) -> bool {
        self.readonly
    }

    pub fn is_shallow(&self) -> bool {
        self.shallow
    }

    pub fn ptr_eq(&self, other: &ReactiveObject) -> bool {
        Rc::ptr_eq(&self.storage, &other.storage)
    }

    /// Stable identity for cycle detection in `watch`'s deep traversal.
    pub(crate) fn id_ptr(&self) -> usize {
        Rc::as_ptr(&self.storage) as usize
    }

    /// A detached copy of this object's own entries in a fresh, unobserved
    /// container: mutating it never triggers this object's effects, and
    /// vice versa.
    pub fn to_raw(&self) -> ReactiveObject {
        ReactiveObject::from_props(self.storage.props.borrow().clone())
    }

    pub fn get(&self, key: &Key) -> Value {
        if !self.readonly {
            track(&self.storage.key_map, TargetKind::Object, TrackOpTypes::Get, key);
        }
        let stored = self
            .storage
            .props
            .borrow()
            .get(prop_name(key))
            .cloned()
            .unwrap_or(Value::Null);

        if self.shallow {
            return stored;
        }
        match stored {
            Value::Ref(r) => r.get(),
            // A readonly parent's child must read back as "the same
            // readonly/shallow variant" (spec.md §4.3 get-trap step 8), not
            // the mutable handle the child happens to be stored as —
            // otherwise `readonly(parent).get(key).set(...)` would silently
            // mutate through the child.
            Value::Object(o) if self.readonly => Value::Object(o.view(true, false)),
            Value::Array(a) if self.readonly => Value::Array(a.view(true, false)),
            other => other,
        }
    }

    pub fn set(&self, key: Key, value: Value) {
        if self.readonly {
            tracing::warn!(?key, "write to a readonly reactive object ignored");
            return;
        }

        let name = prop_name(&key).clone();
        let old = self.storage.props.borrow().get(&name).cloned();

        if !self.shallow {
            if let Some(Value::Ref(old_ref)) = &old {
                if !matches!(value, Value::Ref(_)) {
                    old_ref.set(value);
                    return;
                }
            }
        }

        let had_key = old.is_some();
        self.storage.props.borrow_mut().insert(name, value.clone());

        if !had_key {
            trigger(
                &self.storage.key_map,
                TargetKind::Object,
                TriggerOpTypes::Add,
                Some(&key),
                Some(value),
                None,
            );
        } else {
            let old_value = old.unwrap();
            if has_changed(&old_value, &value) {
                trigger(
                    &self.storage.key_map,
                    TargetKind::Object,
                    TriggerOpTypes::Set,
                    Some(&key),
                    Some(value),
                    Some(old_value),
                );
            }
        }
    }

    pub fn delete(&self, key: &Key) -> bool {
        if self.readonly {
            tracing::warn!(?key, "delete on a readonly reactive object ignored");
            return false;
        }
        let removed = self.storage.props.borrow_mut().shift_remove(prop_name(key));
        if let Some(old_value) = removed {
            trigger(
                &self.storage.key_map,
                TargetKind::Object,
                TriggerOpTypes::Delete,
                Some(key),
                None,
                Some(old_value),
            );
            true
        } else {
            false
        }
    }

    pub fn has(&self, key: &Key) -> bool {
        track(&self.storage.key_map, TargetKind::Object, TrackOpTypes::Has, key);
        self.storage.props.borrow().contains_key(prop_name(key))
    }

    pub fn own_keys(&self) -> Vec<Key> {
        track(
            &self.storage.key_map,
            TargetKind::Object,
            TrackOpTypes::Iterate,
            &Key::Iterate,
        );
        self.storage
            .props
            .borrow()
            .keys()
            .map(|k| Key::Prop(k.clone()))
            .collect()
    }
}

impl Default for ReactiveObject {
    fn default() -> Self {
        Self::new()
    }
}

fn prop_name(key: &Key) -> &Rc<str> {
    match key {
        Key::Prop(name) => name,
        other => panic!("ReactiveObject keys must be Key::Prop, got {other:?}"),
    }
}

/// Build a `ReactiveObject` (mutable, deep) from a value.
pub fn reactive(props: IndexMap<Rc<str>, Value>) -> ReactiveObject {
    ReactiveObject::from_props(props)
}

/// A deep readonly view over `target`'s existing storage.
pub fn readonly(target: &ReactiveObject) -> ReactiveObject {
    target.view(true, false)
}

/// A shallow mutable view: only top-level reads/writes are tracked.
pub fn shallow_reactive(props: IndexMap<Rc<str>, Value>) -> ReactiveObject {
    let mut obj = ReactiveObject::from_props(props);
    obj.shallow = true;
    obj
}

/// A shallow readonly view over `target`'s existing storage.
pub fn shallow_readonly(target: &ReactiveObject) -> ReactiveObject {
    target.view(true, true)
}
