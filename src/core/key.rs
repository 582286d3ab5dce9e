//! Dependency keys and operation-type tags.
//!
//! The source design keys its dependency graph off arbitrary strings/symbols
//! (a property name, a stringified array index, or one of two reserved
//! symbols used to represent "enumeration of this target"). Rust lets us
//! make that distinction a real type instead of recovering it at runtime by
//! inspecting a string, so `Key::Index`/`Key::Length` are first-class
//! variants rather than numeric strings.

use std::rc::Rc;

/// Identifies a single dependency slot within a target's [`super::KeyMap`].
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum Key {
    /// An object property name.
    Prop(Rc<str>),
    /// An array index.
    Index(usize),
    /// An array's `length`.
    Length,
    /// Reserved: subscribes to "the set of own keys changed".
    Iterate,
    /// Reserved: subscribes to "the set of map keys changed" (distinct from
    /// `Iterate`, which also fires for value-only iteration of a map).
    MapKeyIterate,
    /// The single slot of a `Ref` or `Computed` cell.
    Value,
}

impl Key {
    pub fn prop(name: impl Into<Rc<str>>) -> Self {
        Key::Prop(name.into())
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::Prop(Rc::from(s))
    }
}

impl From<usize> for Key {
    fn from(i: usize) -> Self {
        Key::Index(i)
    }
}

/// Why a read happened; informational, consumed only by `on_track` hooks.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TrackOpTypes {
    Get,
    Has,
    Iterate,
}

/// Why a write happened; drives trigger's dependency-selection rules.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TriggerOpTypes {
    Set,
    Add,
    Delete,
    Clear,
}

/// What kind of container raised the trigger; needed because the selection
/// rules for `Add`/`Delete`/`Set`/array-length differ by container kind.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TargetKind {
    Object,
    Array,
    Map,
    Set,
}
