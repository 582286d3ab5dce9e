// ============================================================================
// reactive-core - Reactive Containers
// Typed method-surface stand-ins for the source design's dynamic proxy:
// ReactiveObject, ReactiveArray, ReactiveMap, ReactiveSet.
// ============================================================================

mod array;
mod map;
mod object;
mod set;

pub use array::ReactiveArray;
pub use map::ReactiveMap;
pub use object::ReactiveObject;
pub use set::ReactiveSet;

pub use array::{
    reactive as reactive_array, readonly as readonly_array,
    shallow_reactive as shallow_reactive_array, shallow_readonly as shallow_readonly_array,
};
pub use object::{reactive, readonly, shallow_reactive, shallow_readonly};

use crate::core::value::Value;

/// Every `Value::Object`/`Value::Array` is already a reactive container by
/// construction — there is no "plain" object/array representation to wrap,
/// unlike the source language where an arbitrary object literal needs a
/// `Proxy` wrapped around it on the way in. This is a no-op kept as a named
/// call site so callers (`ref`, collection inserts) read the same whether
/// or not wrapping is actually needed.
pub fn reactive_if_container(value: Value) -> Value {
    value
}
