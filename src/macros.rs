// ============================================================================
// reactive-core - Ergonomic Macros
// ============================================================================

/// Helper macro to clone variables into a move closure.
///
/// This reduces the boilerplate of manually cloning `Rc`-backed handles
/// (`Ref`, `Computed`, reactive containers) before moving them into a
/// closure.
///
/// # Usage
///
/// ```rust
/// use reactive_core::{cloned, r#ref, computed, core::value::Value};
///
/// let a = r#ref(Value::from(1.0));
/// let b = r#ref(Value::from(2.0));
///
/// // Instead of:
/// // let a_clone = a.clone();
/// // let b_clone = b.clone();
/// // computed(move || Value::from(a_clone.get().as_number().unwrap() + b_clone.get().as_number().unwrap()));
///
/// // Use:
/// let sum = computed(cloned!(a, b => move || {
///     Value::from(a.get().as_number().unwrap() + b.get().as_number().unwrap())
/// }));
/// assert_eq!(sum.get().as_number(), Some(3.0));
/// ```
#[macro_export]
macro_rules! cloned {
    ($($n:ident),+ => $e:expr) => {
        {
            $( let $n = $n.clone(); )+
            $e
        }
    };
}
