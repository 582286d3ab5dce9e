//! The dependency graph: [`Dep`] (effects subscribed to one key) and
//! [`KeyMap`] (the keys of one target).
//!
//! In the source design a global weak `Target -> KeyMap` table exists so
//! that observing a target never keeps it alive. In Rust, embedding a
//! `KeyMap` directly as a field of the owning container gives the same
//! guarantee for free: the KeyMap is dropped exactly when its container is,
//! because nothing outside the container ever owns it. See `DESIGN.md` for
//! the full reasoning.
//!
//! `Dep -> Effect` is a strong edge and `Effect -> Dep` is a weak one (the
//! inverse of the natural GC'd-language direction), which avoids an `Rc`
//! cycle while keeping "an effect with live subscribers stays alive" true.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use indexmap::IndexMap;

use super::key::Key;
use crate::primitives::effect::EffectInner;

/// The set of effects currently subscribed to one `(target, key)` pair.
///
/// Backed by an `IndexMap` keyed on the effect's id: O(1) membership checks
/// (an effect may only appear once) and insertion-order iteration (effects
/// run in the order they first subscribed).
#[derive(Default)]
pub struct Dep {
    effects: RefCell<IndexMap<u64, Rc<EffectInner>>>,
}

impl Dep {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Add `effect`, returning `true` if it was not already present.
    pub fn add(&self, effect: Rc<EffectInner>) -> bool {
        let id = effect.id();
        let mut effects = self.effects.borrow_mut();
        if effects.contains_key(&id) {
            false
        } else {
            effects.insert(id, effect);
            true
        }
    }

    pub fn remove(&self, id: u64) {
        self.effects.borrow_mut().shift_remove(&id);
    }

    pub fn is_empty(&self) -> bool {
        self.effects.borrow().is_empty()
    }

    pub fn len(&self) -> usize {
        self.effects.borrow().len()
    }

    /// A copy of the current members, in insertion order. Trigger must run
    /// effects against a copy: running an effect mutates this same Dep
    /// (cleanup removes it, re-tracking re-adds it), so iterating the live
    /// map would risk skipped or repeated entries.
    pub fn snapshot(&self) -> Vec<Rc<EffectInner>> {
        self.effects.borrow().values().cloned().collect()
    }
}

/// A target's own `Key -> Dep` table. Deps are created lazily on first
/// track and are never explicitly pruned (an empty Dep is harmless).
#[derive(Default)]
pub struct KeyMap {
    deps: RefCell<HashMap<Key, Rc<Dep>>>,
}

impl KeyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get-or-create the Dep for `key`.
    pub fn dep_for(&self, key: &Key) -> Rc<Dep> {
        if let Some(dep) = self.deps.borrow().get(key) {
            return dep.clone();
        }
        let dep = Dep::new();
        self.deps.borrow_mut().insert(key.clone(), dep.clone());
        dep
    }

    /// Look up a Dep without creating one.
    pub fn get(&self, key: &Key) -> Option<Rc<Dep>> {
        self.deps.borrow().get(key).cloned()
    }

    /// True if this target has never been tracked at all (trigger is then a
    /// guaranteed no-op and can skip dependency-selection work entirely).
    pub fn is_empty(&self) -> bool {
        self.deps.borrow().is_empty()
    }

    /// Every index key currently tracked, for array length-truncation
    /// triggers (`key >= new_length`).
    pub fn index_deps_at_or_above(&self, new_length: usize) -> Vec<Rc<Dep>> {
        self.deps
            .borrow()
            .iter()
            .filter_map(|(k, d)| match k {
                Key::Index(i) if *i >= new_length => Some(d.clone()),
                _ => None,
            })
            .collect()
    }

    /// Every dep in this KeyMap, for `Clear`-style triggers that invalidate
    /// a target wholesale.
    pub fn all_deps(&self) -> Vec<Rc<Dep>> {
        self.deps.borrow().values().cloned().collect()
    }
}
