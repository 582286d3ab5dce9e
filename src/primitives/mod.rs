// ============================================================================
// reactive-core - Primitives Module
// The effect runtime plus the derived-value primitives built on top of it:
// ref, computed, watch/watch_effect.
// ============================================================================

pub mod computed;
pub mod effect;
pub mod refs;
pub mod watch;

pub use computed::{computed, computed_with, Computed};
pub use effect::{effect, stop, DebugEvent, DebugHook, DebugOp, Effect, EffectOptions, SchedulerFn};
pub use refs::{
    custom_ref, is_ref, r#ref, shallow_ref, to_ref, to_refs, trigger_ref, try_custom_ref, unref,
    CustomRefTrack, CustomRefTrigger, Ref,
};
pub use watch::{watch, watch_effect, Flush, OnInvalidate, WatchCallback, WatchHandle, WatchOptions, WatchSource, WatchValue};
