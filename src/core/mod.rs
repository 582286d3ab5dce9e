//! Fundamental types shared by every reactive primitive: the `Key`/op-type
//! vocabulary, the per-target dependency map, and the thread-local runtime
//! context that tracks which effect (if any) is currently executing.

pub mod context;
pub mod dep;
pub mod key;
pub mod value;

pub use context::{enable_tracking, is_tracking, pause_tracking, reset_tracking, with_context, ReactiveContext};
pub use dep::{Dep, KeyMap};
pub use key::{Key, TargetKind, TrackOpTypes, TriggerOpTypes};
pub use value::Value;
