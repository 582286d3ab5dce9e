// ============================================================================
// reactive-core - A fine-grained reactive dependency-tracking engine
// ============================================================================
//
// track/trigger, the effect runtime, reactive objects/arrays/maps/sets, and
// the ref/computed/watch primitives built on top of them.
// ============================================================================

pub mod collections;
pub mod core;
pub mod error;
mod macros;
pub mod primitives;
pub mod reactivity;

// Re-export the dependency-graph vocabulary at crate root.
pub use core::context::{enable_tracking, is_tracking, pause_tracking, reset_tracking};
pub use core::key::{Key, TargetKind, TrackOpTypes, TriggerOpTypes};
pub use core::value::Value;

pub use error::ReactiveError;

// Re-export primitives at crate root.
pub use primitives::computed::{computed, computed_with, Computed};
pub use primitives::effect::{effect, stop, DebugEvent, DebugHook, DebugOp, Effect, EffectOptions};
pub use primitives::refs::{
    custom_ref, is_ref, proxy_refs, r#ref, shallow_ref, to_ref, to_refs, trigger_ref,
    try_custom_ref, unref, CustomRefTrack, CustomRefTrigger, ProxyRefs, Ref,
};
pub use primitives::watch::{
    watch, watch_effect, Flush, OnInvalidate, WatchCallback, WatchHandle, WatchOptions,
    WatchSource, WatchValue,
};

// Re-export reactivity functions.
pub use reactivity::equality::has_changed;
pub use reactivity::scheduling::{Scheduler, SharedScheduler, SyncScheduler};
pub use reactivity::{track, trigger};

// Re-export reactive containers.
pub use collections::{
    reactive, reactive_array, readonly, readonly_array, shallow_reactive, shallow_reactive_array,
    shallow_readonly, shallow_readonly_array, ReactiveArray, ReactiveMap, ReactiveObject,
    ReactiveSet,
};
