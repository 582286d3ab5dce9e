//! `ReactiveMap<K, V>`: the source design names Map/WeakMap as an external
//! collaborator sharing the track/trigger contract but does not specify it;
//! this crate implements it directly on the same per-key `Dep` model as
//! [`super::ReactiveObject`].

use std::cell::RefCell;
use std::hash::Hash;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::core::dep::KeyMap;
use crate::core::key::{Key, TargetKind, TrackOpTypes, TriggerOpTypes};
use crate::core::value::Value;
use crate::reactivity::equality::has_changed;
use crate::reactivity::tracking::{track, trigger};

struct MapStorage<K, V> {
    key_map: KeyMap,
    entries: RefCell<IndexMap<K, V>>,
}

/// A reactive key/value map. Distinguishes key-iteration (`.keys()`) from
/// value/entry iteration (`.values()`/`.entries()`) with two separate
/// synthetic deps, matching the source design's `ITERATE_KEY` /
/// `MAP_KEY_ITERATE_KEY` split.
#[derive(Clone)]
pub struct ReactiveMap<K, V> {
    storage: Rc<MapStorage<K, V>>,
}

impl<K, V> ReactiveMap<K, V>
where
    K: Eq + Hash + Clone + Into<Value>,
    V: Clone,
{
    pub fn new() -> Self {
        Self {
            storage: Rc::new(MapStorage {
                key_map: KeyMap::new(),
                entries: RefCell::new(IndexMap::new()),
            }),
        }
    }

    pub fn ptr_eq(&self, other: &ReactiveMap<K, V>) -> bool {
        Rc::ptr_eq(&self.storage, &other.storage)
    }

    pub fn size(&self) -> usize {
        track(
            &self.storage.key_map,
            TargetKind::Map,
            TrackOpTypes::Iterate,
            &Key::Iterate,
        );
        self.storage.entries.borrow().len()
    }

    pub fn has(&self, key: &K) -> bool {
        track(&self.storage.key_map, TargetKind::Map, TrackOpTypes::Has, &dep_key(key));
        self.storage.entries.borrow().contains_key(key)
    }

    pub fn get(&self, key: &K) -> Option<V> {
        track(&self.storage.key_map, TargetKind::Map, TrackOpTypes::Get, &dep_key(key));
        self.storage.entries.borrow().get(key).cloned()
    }

    pub fn set(&self, key: K, value: V)
    where
        V: Into<Value>,
    {
        let existing = self.storage.entries.borrow().get(&key).cloned();
        let had_key = existing.is_some();
        self.storage.entries.borrow_mut().insert(key.clone(), value.clone());

        if !had_key {
            trigger(
                &self.storage.key_map,
                TargetKind::Map,
                TriggerOpTypes::Add,
                Some(&dep_key(&key)),
                Some(value.into()),
                None,
            );
        } else {
            let old_raw: Value = existing.unwrap().into();
            let new_raw: Value = value.into();
            if has_changed(&old_raw, &new_raw) {
                trigger(
                    &self.storage.key_map,
                    TargetKind::Map,
                    TriggerOpTypes::Set,
                    Some(&dep_key(&key)),
                    Some(new_raw),
                    Some(old_raw),
                );
            }
        }
    }

    pub fn delete(&self, key: &K) -> bool
    where
        V: Into<Value>,
    {
        let removed = self.storage.entries.borrow_mut().shift_remove(key);
        if let Some(old) = removed {
            trigger(
                &self.storage.key_map,
                TargetKind::Map,
                TriggerOpTypes::Delete,
                Some(&dep_key(key)),
                None,
                Some(old.into()),
            );
            true
        } else {
            false
        }
    }

    pub fn clear(&self) {
        let had_entries = !self.storage.entries.borrow().is_empty();
        self.storage.entries.borrow_mut().clear();
        if had_entries {
            trigger(
                &self.storage.key_map,
                TargetKind::Map,
                TriggerOpTypes::Clear,
                None,
                None,
                None,
            );
        }
    }

    /// Key-only iteration: subscribes to `MAP_KEY_ITERATE_KEY`, distinct
    /// from `values()`/`entries()`'s `ITERATE_KEY`.
    pub fn keys(&self) -> Vec<K> {
        track(
            &self.storage.key_map,
            TargetKind::Map,
            TrackOpTypes::Iterate,
            &Key::MapKeyIterate,
        );
        self.storage.entries.borrow().keys().cloned().collect()
    }

    pub fn values(&self) -> Vec<V> {
        track(
            &self.storage.key_map,
            TargetKind::Map,
            TrackOpTypes::Iterate,
            &Key::Iterate,
        );
        self.storage.entries.borrow().values().cloned().collect()
    }

    pub fn entries(&self) -> Vec<(K, V)> {
        track(
            &self.storage.key_map,
            TargetKind::Map,
            TrackOpTypes::Iterate,
            &Key::Iterate,
        );
        self.storage
            .entries
            .borrow()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

impl<K, V> Default for ReactiveMap<K, V>
where
    K: Eq + Hash + Clone + Into<Value>,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

fn dep_key<K: Clone + Into<Value>>(key: &K) -> Key {
    match key.clone().into() {
        Value::Str(s) => Key::Prop(s),
        Value::Number(n) => Key::Prop(Rc::from(n.to_string().as_str())),
        _ => Key::Iterate,
    }
}
