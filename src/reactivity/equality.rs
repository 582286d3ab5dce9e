//! `has_changed`: the single change-detection primitive used by ref writes,
//! object/array `Set` triggers, computed cache invalidation, and collection
//! value updates.
//!
//! This is "Object.is"-style comparison: `NaN` is considered equal to
//! `NaN` (unlike `==`/IEEE 754), but every value remains distinct from
//! every other value. Containers (`Ref`/`Object`/`Array`/`Map`/`Set`) are
//! compared by identity, matching `Object.is` on object references.

use crate::core::value::Value;

/// `true` if `new` differs from `old` under NaN-aware, identity-for-containers
/// equality — i.e. this is a real change and should trigger.
pub fn has_changed(old: &Value, new: &Value) -> bool {
    !same_value(old, new)
}

fn same_value(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => same_number(*a, *b),
        (Value::Str(a), Value::Str(b)) => a == b,
        (Value::Ref(a), Value::Ref(b)) => a.ptr_eq(b),
        (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
        (Value::Array(a), Value::Array(b)) => a.ptr_eq(b),
        _ => false,
    }
}

/// `Object.is`-style float comparison: `NaN` equals `NaN`, `+0` and `-0`
/// are distinct (unlike `==`), everything else is ordinary equality.
fn same_number(a: f64, b: f64) -> bool {
    if a.is_nan() && b.is_nan() {
        return true;
    }
    if a == 0.0 && b == 0.0 {
        return a.is_sign_positive() == b.is_sign_positive();
    }
    a == b
}
