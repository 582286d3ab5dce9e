//! `cloned!` usage across the derived-value primitives, exercised the way an
//! application actually composes them rather than as unit tests of the
//! macro's expansion.

use reactive_core::{cloned, computed, computed_with, effect, r#ref, EffectOptions, Value};

#[test]
fn cloned_avoids_manual_clone_boilerplate_in_a_computed() {
    let a = r#ref(Value::from(10.0));
    let b = r#ref(Value::from(20.0));

    let sum = computed(cloned!(a, b => move || {
        Value::from(a.get().as_number().unwrap() + b.get().as_number().unwrap())
    }));

    assert_eq!(sum.get().as_number(), Some(30.0));
    a.set(Value::from(15.0));
    assert_eq!(sum.get().as_number(), Some(35.0));
}

#[test]
fn cloned_works_inside_an_effect_capturing_multiple_refs() {
    let a = r#ref(Value::from(0.0));
    let b = r#ref(Value::from(0.0));
    let runs = std::rc::Rc::new(std::cell::Cell::new(0));

    let r = runs.clone();
    let _e = effect(
        cloned!(a, b => move || {
            let _ = a.get();
            let _ = b.get();
            r.set(r.get() + 1);
        }),
        EffectOptions::default(),
    );

    assert_eq!(runs.get(), 1);
    a.set(Value::from(1.0));
    assert_eq!(runs.get(), 2);
}

#[test]
fn cloned_nests_cleanly_when_one_computed_wraps_another() {
    let a = r#ref(Value::from(1.0));

    let d = computed(cloned!(a => move || {
        let inner = computed(cloned!(a => move || Value::from(a.get().as_number().unwrap() * 2.0)));
        inner.get()
    }));

    assert_eq!(d.get().as_number(), Some(2.0));
}

#[test]
fn cloned_writes_through_a_computed_setter() {
    let a = r#ref(Value::from(1.0));

    let get_a = a.clone();
    let set_a = a.clone();
    let doubled = computed_with(
        cloned!(get_a => move || Value::from(get_a.get().as_number().unwrap() * 2.0)),
        cloned!(set_a => move |v: Value| set_a.set(Value::from(v.as_number().unwrap() / 2.0))),
    );

    doubled.set(Value::from(10.0));
    assert_eq!(a.get().as_number(), Some(5.0));
}
