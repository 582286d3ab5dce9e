//! `ReactiveArray`: an ordered, length-bearing sequence. The array-shaped
//! sibling of [`super::object::ReactiveObject`] — same track/trigger
//! contract, with the extra `Length` key and the length-truncation
//! selection rule from the dependency graph.

use std::cell::RefCell;
use std::rc::Rc;

use crate::core::context::{pause_tracking, reset_tracking};
use crate::core::dep::KeyMap;
use crate::core::key::{Key, TargetKind, TrackOpTypes, TriggerOpTypes};
use crate::core::value::Value;
use crate::reactivity::equality::has_changed;
use crate::reactivity::tracking::{track, trigger};

struct ArrayStorage {
    key_map: KeyMap,
    data: RefCell<Vec<Value>>,
}

#[derive(Clone)]
pub struct ReactiveArray {
    storage: Rc<ArrayStorage>,
    readonly: bool,
    shallow: bool,
}

impl ReactiveArray {
    pub fn new() -> Self {
        Self::from_vec(Vec::new())
    }

    pub fn from_vec(data: Vec<Value>) -> Self {
        Self {
            storage: Rc::new(ArrayStorage {
                key_map: KeyMap::new(),
                data: RefCell::new(data),
            }),
            readonly: false,
            shallow: false,
        }
    }

    /// Build a view over the same storage with different `readonly`/
    /// `shallow` flags. `pub(crate)` rather than private: a readonly parent's
    /// `get` needs to wrap a nested `ReactiveArray` the same way, from
    /// `collections::object`.
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

    pub fn ptr_eq(&self, other: &ReactiveArray) -> bool {
        Rc::ptr_eq(&self.storage, &other.storage)
    }

    /// Stable identity for cycle detection in `watch`'s deep traversal.
    pub(crate) fn id_ptr(&self) -> usize {
        Rc::as_ptr(&self.storage) as usize
    }

    pub fn to_raw(&self) -> ReactiveArray {
        ReactiveArray::from_vec(self.storage.data.borrow().clone())
    }

    /// Tracked length read.
    pub fn length(&self) -> usize {
        track(&self.storage.key_map, TargetKind::Array, TrackOpTypes::Get, &Key::Length);
        self.storage.data.borrow().len()
    }

    fn raw_len(&self) -> usize {
        self.storage.data.borrow().len()
    }

    pub fn get(&self, index: usize) -> Value {
        if !self.readonly {
            track(
                &self.storage.key_map,
                TargetKind::Array,
                TrackOpTypes::Get,
                &Key::Index(index),
            );
        }
        let stored = self
            .storage
            .data
            .borrow()
            .get(index)
            .cloned()
            .unwrap_or(Value::Null);

        if self.shallow {
            return stored;
        }
        // Integer-indexed array reads preserve the ref as-is: the caller
        // unwraps explicitly, unlike a property read on `ReactiveObject`.
        match stored {
            // A readonly parent's child must read back as "the same
            // readonly/shallow variant" (spec.md §4.3 get-trap step 8), not
            // the mutable handle the child happens to be stored as —
            // otherwise `readonly(parent).get(i).set(...)` would silently
            // mutate through the child.
            Value::Object(o) if self.readonly => Value::Object(o.view(true, false)),
            Value::Array(a) if self.readonly => Value::Array(a.view(true, false)),
            other => other,
        }
    }

    pub fn set(&self, index: usize, value: Value) {
        if self.readonly {
            tracing::warn!(index, "write to a readonly reactive array ignored");
            return;
        }
        let had_key = index < self.raw_len();

        if !self.shallow && had_key {
            let old_at = self.storage.data.borrow()[index].clone();
            if let Value::Ref(old_ref) = old_at {
                if !matches!(value, Value::Ref(_)) {
                    old_ref.set(value);
                    return;
                }
            }
        }

        let old = {
            let mut data = self.storage.data.borrow_mut();
            if index >= data.len() {
                data.resize(index + 1, Value::Null);
                None
            } else {
                Some(std::mem::replace(&mut data[index], value.clone()))
            }
        };

        if !had_key {
            trigger(
                &self.storage.key_map,
                TargetKind::Array,
                TriggerOpTypes::Add,
                Some(&Key::Index(index)),
                Some(value),
                None,
            );
        } else {
            let old_value = old.unwrap_or(Value::Null);
            if has_changed(&old_value, &value) {
                trigger(
                    &self.storage.key_map,
                    TargetKind::Array,
                    TriggerOpTypes::Set,
                    Some(&Key::Index(index)),
                    Some(value),
                    Some(old_value),
                );
            }
        }
    }

    /// Shrink or grow the backing storage to `new_length`, truncation-style:
    /// any index dropped fires along with `Length`.
    pub fn set_length(&self, new_length: usize) {
        if self.readonly {
            tracing::warn!("write to a readonly reactive array's length ignored");
            return;
        }
        let old_length = self.raw_len();
        if old_length == new_length {
            return;
        }
        self.storage.data.borrow_mut().resize(new_length, Value::Null);
        trigger(
            &self.storage.key_map,
            TargetKind::Array,
            TriggerOpTypes::Set,
            Some(&Key::Length),
            Some(Value::from(new_length as f64)),
            Some(Value::from(old_length as f64)),
        );
    }

    /// Tracks every index in `[0, length)` before searching, so a later
    /// insert/remove in the searched range is observed.
    pub fn includes(&self, needle: &Value) -> bool {
        let len = self.length();
        for i in 0..len {
            track(&self.storage.key_map, TargetKind::Array, TrackOpTypes::Get, &Key::Index(i));
        }
        self.storage.data.borrow().iter().any(|v| search_equal(v, needle))
    }

    pub fn index_of(&self, needle: &Value) -> Option<usize> {
        let len = self.length();
        for i in 0..len {
            track(&self.storage.key_map, TargetKind::Array, TrackOpTypes::Get, &Key::Index(i));
        }
        self.storage.data.borrow().iter().position(|v| search_equal(v, needle))
    }

    pub fn last_index_of(&self, needle: &Value) -> Option<usize> {
        let len = self.length();
        for i in 0..len {
            track(&self.storage.key_map, TargetKind::Array, TrackOpTypes::Get, &Key::Index(i));
        }
        self.storage
            .data
            .borrow()
            .iter()
            .rposition(|v| search_equal(v, needle))
    }

    /// Append `value`; pauses tracking around the internal length read so
    /// the call does not subscribe the caller to its own mutation.
    pub fn push(&self, value: Value) {
        if self.readonly {
            tracing::warn!("push on a readonly reactive array ignored");
            return;
        }
        pause_tracking();
        let idx = self.raw_len();
        reset_tracking();
        self.storage.data.borrow_mut().push(value.clone());
        trigger(
            &self.storage.key_map,
            TargetKind::Array,
            TriggerOpTypes::Add,
            Some(&Key::Index(idx)),
            Some(value),
            None,
        );
    }

    pub fn pop(&self) -> Option<Value> {
        if self.readonly {
            tracing::warn!("pop on a readonly reactive array ignored");
            return None;
        }
        pause_tracking();
        let old_len = self.raw_len();
        reset_tracking();
        if old_len == 0 {
            return None;
        }
        let popped = self.storage.data.borrow_mut().pop();
        trigger(
            &self.storage.key_map,
            TargetKind::Array,
            TriggerOpTypes::Set,
            Some(&Key::Length),
            Some(Value::from((old_len - 1) as f64)),
            Some(Value::from(old_len as f64)),
        );
        popped
    }

    pub fn shift(&self) -> Option<Value> {
        if self.readonly {
            tracing::warn!("shift on a readonly reactive array ignored");
            return None;
        }
        pause_tracking();
        let old_len = self.raw_len();
        reset_tracking();
        if old_len == 0 {
            return None;
        }
        let removed = {
            let mut data = self.storage.data.borrow_mut();
            data.remove(0)
        };
        self.notify_shift(old_len, old_len - 1, 0);
        Some(removed)
    }

    pub fn unshift(&self, value: Value) {
        if self.readonly {
            tracing::warn!("unshift on a readonly reactive array ignored");
            return;
        }
        pause_tracking();
        let old_len = self.raw_len();
        reset_tracking();
        self.storage.data.borrow_mut().insert(0, value);
        self.notify_shift(old_len, old_len + 1, 0);
    }

    /// Remove `delete_count` elements starting at `start`, inserting
    /// `items` in their place; returns the removed elements.
    pub fn splice(&self, start: usize, delete_count: usize, items: Vec<Value>) -> Vec<Value> {
        if self.readonly {
            tracing::warn!("splice on a readonly reactive array ignored");
            return Vec::new();
        }
        pause_tracking();
        let old_len = self.raw_len();
        reset_tracking();
        let start = start.min(old_len);
        let end = (start + delete_count).min(old_len);
        let removed: Vec<Value> = {
            let mut data = self.storage.data.borrow_mut();
            data.splice(start..end, items).collect()
        };
        let new_len = self.raw_len();
        self.notify_shift(old_len, new_len, start);
        removed
    }

    /// Shared tail of shift/unshift/splice: every index from `from` onward
    /// shifted value (or ceased to exist), plus the length itself.
    fn notify_shift(&self, old_len: usize, new_len: usize, from: usize) {
        let upto = old_len.max(new_len);
        for i in from..upto {
            trigger(
                &self.storage.key_map,
                TargetKind::Array,
                TriggerOpTypes::Set,
                Some(&Key::Index(i)),
                None,
                None,
            );
        }
        if old_len != new_len {
            trigger(
                &self.storage.key_map,
                TargetKind::Array,
                TriggerOpTypes::Set,
                Some(&Key::Length),
                Some(Value::from(new_len as f64)),
                Some(Value::from(old_len as f64)),
            );
        }
    }
}

impl Default for ReactiveArray {
    fn default() -> Self {
        Self::new()
    }
}

fn search_equal(a: &Value, b: &Value) -> bool {
    fn unwrap(v: &Value) -> Value {
        match v {
            Value::Ref(r) => r.get(),
            other => other.clone(),
        }
    }
    !has_changed(&unwrap(a), &unwrap(b))
}

pub fn reactive(data: Vec<Value>) -> ReactiveArray {
    ReactiveArray::from_vec(data)
}

pub fn readonly(target: &ReactiveArray) -> ReactiveArray {
    target.view(true, false)
}

pub fn shallow_reactive(data: Vec<Value>) -> ReactiveArray {
    let mut arr = ReactiveArray::from_vec(data);
    arr.shallow = true;
    arr
}

pub fn shallow_readonly(target: &ReactiveArray) -> ReactiveArray {
    target.view(true, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::effect::{effect, EffectOptions};
    use std::cell::Cell;

    #[test]
    fn push_triggers_both_index_and_length_subscribers() {
        let a = ReactiveArray::new();
        let len_runs = Rc::new(Cell::new(0));
        let l = len_runs.clone();
        let ae = a.clone();
        effect(
            move || {
                ae.length();
                l.set(l.get() + 1);
            },
            EffectOptions::default(),
        );
        assert_eq!(len_runs.get(), 1);
        a.push(Value::from(1.0));
        assert_eq!(len_runs.get(), 2);
        assert_eq!(a.get(0).as_number(), Some(1.0));
    }

    #[test]
    fn set_length_truncates_and_only_notifies_dropped_indices() {
        let a = ReactiveArray::new();
        a.push(Value::from(1.0));
        a.push(Value::from(2.0));
        a.push(Value::from(3.0));

        let fired = Rc::new(RefCell::new(Vec::<usize>::new()));
        for i in 0..3 {
            let f = fired.clone();
            let ae = a.clone();
            effect(
                move || {
                    ae.get(i);
                    f.borrow_mut().push(i);
                },
                EffectOptions::default(),
            );
        }
        fired.borrow_mut().clear();

        a.set_length(1);
        let got = fired.borrow().clone();
        assert!(got.contains(&1));
        assert!(got.contains(&2));
        assert!(!got.contains(&0));
    }

    #[test]
    fn includes_tracks_every_current_index() {
        let a = ReactiveArray::new();
        a.push(Value::from(1.0));
        a.push(Value::from(2.0));
        assert!(a.includes(&Value::from(2.0)));
        assert!(!a.includes(&Value::from(3.0)));
        assert_eq!(a.index_of(&Value::from(2.0)), Some(1));
    }

    #[test]
    fn readonly_array_ignores_writes() {
        let a = ReactiveArray::new();
        a.push(Value::from(1.0));
        let ro = readonly(&a);
        ro.set(0, Value::from(99.0));
        assert_eq!(a.get(0).as_number(), Some(1.0));
    }

    #[test]
    fn readonly_view_is_deep_nested_child_array_rejects_writes_too() {
        use crate::collections::object::{readonly as readonly_object, ReactiveObject};

        let child = ReactiveArray::new();
        child.push(Value::from(1.0));
        let parent = ReactiveObject::new();
        parent.set(Key::prop("items"), Value::Array(child.clone()));

        let ro_parent = readonly_object(&parent);
        let ro_child = match ro_parent.get(&Key::prop("items")) {
            Value::Array(a) => a,
            _ => panic!("expected an array"),
        };
        assert!(ro_child.is_readonly());

        ro_child.set(0, Value::from(99.0));
        assert_eq!(child.get(0).as_number(), Some(1.0));
    }
}
