//! `Ref`: a single-value reactive cell, plus `computed`'s scalar sibling
//! conveniences (`unref`, `to_ref`, `to_refs`, `custom_ref`).
//!
//! A ref is logically a target with exactly one dependency key — there is
//! no property name to key on, so reads and writes both funnel through the
//! synthetic [`Key::Value`]. Unlike [`crate::collections::ReactiveObject`],
//! a `Ref` owns its `KeyMap` directly rather than via a target-kind split,
//! since there is only ever the one key.

use std::cell::RefCell;
use std::rc::Rc;

use crate::core::dep::KeyMap;
use crate::core::key::{Key, TargetKind, TrackOpTypes, TriggerOpTypes};
use crate::core::value::Value;
use crate::reactivity::equality::has_changed;
use crate::reactivity::tracking::{track, trigger};

/// How a ref's `get`/`set` are actually implemented.
enum RefStorage {
    /// Plain cell: `get` reads `raw`, `set` compares-then-stores.
    Plain { raw: RefCell<Value>, shallow: bool },
    /// Delegates to caller-supplied closures; used by [`custom_ref`] and
    /// [`to_ref`]/[`to_refs`], which read/write someone else's storage.
    Custom {
        get: Box<dyn Fn() -> Value>,
        set: Box<dyn Fn(Value)>,
    },
}

struct RefInner {
    key_map: KeyMap,
    storage: RefStorage,
}

/// A reactive single-value cell. Cloning an existing `Ref` shares the same
/// cell (it is a reference-counted handle), matching how a reactive object
/// already behaves — there is no separate "clone the value" operation.
#[derive(Clone)]
pub struct Ref {
    inner: Rc<RefInner>,
}

impl Ref {
    fn from_storage(storage: RefStorage) -> Self {
        Self {
            inner: Rc::new(RefInner {
                key_map: KeyMap::new(),
                storage,
            }),
        }
    }

    /// Read `.value`, tracking the current effect against this cell.
    pub fn get(&self) -> Value {
        track(
            &self.inner.key_map,
            TargetKind::Object,
            TrackOpTypes::Get,
            &Key::Value,
        );
        match &self.inner.storage {
            RefStorage::Plain { raw, .. } => raw.borrow().clone(),
            RefStorage::Custom { get, .. } => get(),
        }
    }

    /// Write `.value`. A no-op (no trigger) when the new raw value compares
    /// equal (NaN-aware) to the stored raw value.
    pub fn set(&self, value: Value) {
        match &self.inner.storage {
            RefStorage::Plain { raw, shallow } => {
                let old = raw.borrow().clone();
                if !has_changed(&old, &value) {
                    return;
                }
                let stored = if *shallow {
                    value.clone()
                } else {
                    crate::collections::reactive_if_container(value.clone())
                };
                *raw.borrow_mut() = stored;
                trigger(
                    &self.inner.key_map,
                    TargetKind::Object,
                    TriggerOpTypes::Set,
                    Some(&Key::Value),
                    Some(value),
                    Some(old),
                );
            }
            RefStorage::Custom { set, .. } => set(value),
        }
    }

    /// Force a trigger on this cell's subscribers without changing its
    /// stored value. Used when the value was mutated in place rather than
    /// replaced wholesale.
    pub fn trigger(&self) {
        let current = match &self.inner.storage {
            RefStorage::Plain { raw, .. } => raw.borrow().clone(),
            RefStorage::Custom { get, .. } => get(),
        };
        trigger(
            &self.inner.key_map,
            TargetKind::Object,
            TriggerOpTypes::Set,
            Some(&Key::Value),
            Some(current.clone()),
            Some(current),
        );
    }

    pub fn ptr_eq(&self, other: &Ref) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Stable identity for cycle detection in `watch`'s deep traversal.
    pub(crate) fn id_ptr(&self) -> usize {
        Rc::as_ptr(&self.inner) as usize
    }
}

/// Construct a ref. An object/array value is wrapped into its reactive
/// container form, so nested mutations remain observable.
///
/// Named with the raw-identifier escape since `ref` is a Rust keyword.
pub fn r#ref(value: Value) -> Ref {
    let stored = crate::collections::reactive_if_container(value);
    Ref::from_storage(RefStorage::Plain {
        raw: RefCell::new(stored),
        shallow: false,
    })
}

/// Construct a ref whose value is stored as-is: an object/array value is
/// not recursively wrapped, so only whole-value replacement is observed.
pub fn shallow_ref(value: Value) -> Ref {
    Ref::from_storage(RefStorage::Plain {
        raw: RefCell::new(value),
        shallow: true,
    })
}

/// `true` if `value` is a ref (as opposed to a plain `Value`).
pub fn is_ref(value: &Value) -> bool {
    value.is_ref()
}

/// `x.value` if `x` is a ref, else `x` unchanged.
pub fn unref(value: Value) -> Value {
    match value {
        Value::Ref(r) => r.get(),
        other => other,
    }
}

/// Force-trigger `r`'s subscribers without changing its value.
pub fn trigger_ref(r: &Ref) {
    r.trigger();
}

/// A `{get, set}` pair, as handed in to a [`custom_ref`] factory.
pub type CustomRefTrack = Rc<dyn Fn()>;
pub type CustomRefTrigger = Rc<dyn Fn()>;

/// Build a ref whose reads/writes are entirely defined by `factory`: it
/// receives a `track` closure (call it from your getter) and a `trigger`
/// closure (call it from your setter after storing the new value), and
/// must return the `(get, set)` pair that becomes this ref's storage.
pub fn custom_ref(
    factory: impl FnOnce(CustomRefTrack, CustomRefTrigger) -> (Box<dyn Fn() -> Value>, Box<dyn Fn(Value)>),
) -> Ref {
    let key_map = Rc::new(KeyMap::new());
    let track_km = key_map.clone();
    let track_fn: CustomRefTrack = Rc::new(move || {
        track(&track_km, TargetKind::Object, TrackOpTypes::Get, &Key::Value);
    });
    let trigger_km = key_map.clone();
    let trigger_fn: CustomRefTrigger = Rc::new(move || {
        trigger(
            &trigger_km,
            TargetKind::Object,
            TriggerOpTypes::Set,
            Some(&Key::Value),
            None,
            None,
        );
    });

    let (get, set) = factory(track_fn, trigger_fn);
    Ref {
        inner: Rc::new(RefInner {
            // `key_map` above is only used by the closures; this inner one
            // is never read, since `get`/`set` already did their own
            // tracking/triggering via the closures they were handed.
            key_map: KeyMap::new(),
            storage: RefStorage::Custom { get, set },
        }),
    }
}

/// Like [`custom_ref`], but catches a panicking factory and reports it as
/// [`crate::error::ReactiveError::CustomRefFactory`] instead of propagating
/// it — an opt-in helper for callers that want a `Result` at this boundary
/// rather than a panic, not the default path.
pub fn try_custom_ref(
    factory: impl FnOnce(CustomRefTrack, CustomRefTrigger) -> (Box<dyn Fn() -> Value>, Box<dyn Fn(Value)>),
) -> Result<Ref, crate::error::ReactiveError> {
    std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| custom_ref(factory))).map_err(|payload| {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "custom ref factory panicked with a non-string payload".to_string());
        crate::error::ReactiveError::CustomRefFactory(message)
    })
}

/// A ref whose get/set simply delegate to `object[key]`. Reads/writes are
/// observed by the object's own `KeyMap`, not by a ref-local dep — so this
/// ref shares tracking identity with the property it was built from.
pub fn to_ref(object: crate::collections::ReactiveObject, key: impl Into<Key>) -> Ref {
    let key = key.into();
    let get_obj = object.clone();
    let get_key = key.clone();
    let set_obj = object.clone();
    let set_key = key;
    Ref::from_storage(RefStorage::Custom {
        get: Box::new(move || get_obj.get(&get_key)),
        set: Box::new(move |v| set_obj.set(set_key.clone(), v)),
    })
}

/// One [`to_ref`] per own key of `object`.
pub fn to_refs(object: &crate::collections::ReactiveObject) -> Vec<(Key, Ref)> {
    object
        .own_keys()
        .into_iter()
        .map(|key| (key.clone(), to_ref(object.clone(), key)))
        .collect()
}

/// A single slot of a [`ProxyRefs`] view: either a ref (auto-unwrapped on
/// read, written through on write) or a plain value passed through as-is.
enum RefOrPlain {
    Ref(Ref),
    Plain(Value),
}

/// A flat, auto-unwrapping view over a bag of named slots that may mix refs
/// and plain values — typically built from [`to_refs`]'s output so template
/// code can read `view.get(&Key::prop("count"))` instead of
/// `view.get(&Key::prop("count")).value`.
///
/// A [`crate::collections::ReactiveObject`] needs no such wrapper: its own
/// `get`/`set` already unwrap/write-through a stored ref directly (see
/// `ReactiveObject`'s "assigning through a stored ref" behavior), which is
/// what the source design's "reactive targets are returned unchanged" rule
/// for `proxyRefs` describes.
#[derive(Clone)]
pub struct ProxyRefs {
    slots: Rc<RefCell<std::collections::HashMap<Key, RefOrPlain>>>,
}

impl ProxyRefs {
    /// Read a slot: a ref slot unwraps to its current value, a plain slot
    /// returns the stored value, and a missing key reads as `Value::Null`.
    pub fn get(&self, key: &Key) -> Value {
        match self.slots.borrow().get(key) {
            Some(RefOrPlain::Ref(r)) => r.get(),
            Some(RefOrPlain::Plain(v)) => v.clone(),
            None => Value::Null,
        }
    }

    /// Write a slot: if it currently holds a ref and `value` is not itself a
    /// ref, write through the ref's `value`; otherwise replace the slot
    /// wholesale (a ref value installs a new ref slot, a plain value over a
    /// plain slot just replaces it).
    pub fn set(&self, key: Key, value: Value) {
        let existing_ref = match self.slots.borrow().get(&key) {
            Some(RefOrPlain::Ref(r)) if !matches!(value, Value::Ref(_)) => Some(r.clone()),
            _ => None,
        };
        if let Some(r) = existing_ref {
            r.set(value);
            return;
        }
        let slot = match value {
            Value::Ref(r) => RefOrPlain::Ref(r),
            other => RefOrPlain::Plain(other),
        };
        self.slots.borrow_mut().insert(key, slot);
    }
}

/// Build a [`ProxyRefs`] view over `refs` (typically [`to_refs`]'s output):
/// reading a key auto-unwraps the ref at that slot, and writing a key whose
/// slot holds a ref writes through to the ref instead of replacing the slot.
pub fn proxy_refs(refs: Vec<(Key, Ref)>) -> ProxyRefs {
    let slots = refs
        .into_iter()
        .map(|(k, r)| (k, RefOrPlain::Ref(r)))
        .collect();
    ProxyRefs {
        slots: Rc::new(RefCell::new(slots)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::effect::{effect, EffectOptions};
    use std::cell::Cell;

    #[test]
    fn read_tracks_and_write_triggers() {
        let r = r#ref(Value::from(1.0));
        let runs = Rc::new(Cell::new(0));
        let run = runs.clone();
        let re = r.clone();
        effect(
            move || {
                re.get();
                run.set(run.get() + 1);
            },
            EffectOptions::default(),
        );
        assert_eq!(runs.get(), 1);
        r.set(Value::from(2.0));
        assert_eq!(runs.get(), 2);
    }

    #[test]
    fn setting_equal_value_is_a_no_op() {
        let r = r#ref(Value::from(1.0));
        let runs = Rc::new(Cell::new(0));
        let run = runs.clone();
        let re = r.clone();
        effect(
            move || {
                re.get();
                run.set(run.get() + 1);
            },
            EffectOptions::default(),
        );
        r.set(Value::from(1.0));
        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn unref_unwraps_refs_and_passes_through_plain_values() {
        let r = r#ref(Value::from(5.0));
        assert_eq!(unref(Value::Ref(r)).as_number(), Some(5.0));
        assert_eq!(unref(Value::from(5.0)).as_number(), Some(5.0));
    }

    #[test]
    fn trigger_ref_reruns_subscribers_without_changing_value() {
        let r = shallow_ref(Value::from(1.0));
        let runs = Rc::new(Cell::new(0));
        let run = runs.clone();
        let re = r.clone();
        effect(
            move || {
                re.get();
                run.set(run.get() + 1);
            },
            EffectOptions::default(),
        );
        trigger_ref(&r);
        assert_eq!(runs.get(), 2);
    }

    #[test]
    fn two_handles_to_the_same_ref_share_identity() {
        let a = r#ref(Value::from(1.0));
        let b = a.clone();
        assert!(a.ptr_eq(&b));
        let other = r#ref(Value::from(1.0));
        assert!(!a.ptr_eq(&other));
    }

    #[test]
    fn proxy_refs_auto_unwraps_reads_and_writes_through() {
        let a = r#ref(Value::from(1.0));
        let view = proxy_refs(vec![(Key::prop("a"), a.clone())]);

        assert_eq!(view.get(&Key::prop("a")).as_number(), Some(1.0));
        view.set(Key::prop("a"), Value::from(2.0));
        assert_eq!(a.get().as_number(), Some(2.0));
        assert_eq!(view.get(&Key::prop("a")).as_number(), Some(2.0));
    }

    #[test]
    fn proxy_refs_from_to_refs_mirrors_the_source_object() {
        use crate::collections::object::ReactiveObject;

        let o = ReactiveObject::new();
        o.set(Key::prop("count"), Value::from(1.0));
        let view = proxy_refs(to_refs(&o));

        assert_eq!(view.get(&Key::prop("count")).as_number(), Some(1.0));
        view.set(Key::prop("count"), Value::from(9.0));
        assert_eq!(o.get(&Key::prop("count")).as_number(), Some(9.0));
    }
}
