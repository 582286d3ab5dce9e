//! Stop/drop semantics and the readonly-view surface, exercised across
//! module boundaries through the public API.

use std::cell::Cell;
use std::rc::Rc;

use indexmap::IndexMap;
use reactive_core::{
    computed, effect, r#ref, readonly, reactive, stop, watch, watch_effect, EffectOptions, Key,
    Value, WatchOptions, WatchSource,
};

#[test]
fn stopping_an_effect_unsubscribes_it_and_is_idempotent() {
    let r = r#ref(Value::from(0.0));
    let runs = Rc::new(Cell::new(0));

    let run = runs.clone();
    let re = r.clone();
    let handle = effect(
        move || {
            re.get();
            run.set(run.get() + 1);
        },
        EffectOptions::default(),
    );
    assert_eq!(runs.get(), 1);

    r.set(Value::from(1.0));
    assert_eq!(runs.get(), 2);

    stop(&handle);
    stop(&handle); // idempotent
    r.set(Value::from(2.0));
    assert_eq!(runs.get(), 2);
}

#[test]
fn readonly_view_shares_storage_but_rejects_writes() {
    let mut props = IndexMap::new();
    props.insert(Rc::from("count"), Value::from(1.0));
    let o = reactive(props);
    let ro = readonly(&o);

    assert!(ro.is_readonly());
    ro.set(Key::prop("count"), Value::from(99.0));
    // the write was a no-op; the writable handle still sees the old value
    assert_eq!(o.get(&Key::prop("count")).as_number(), Some(1.0));

    o.set(Key::prop("count"), Value::from(2.0));
    assert_eq!(ro.get(&Key::prop("count")).as_number(), Some(2.0));
}

#[test]
fn watch_handle_stop_runs_the_pending_invalidation_and_unsubscribes() {
    let o = {
        let mut props = IndexMap::new();
        props.insert(Rc::from("n"), Value::from(1.0));
        reactive(props)
    };
    let cleanups = Rc::new(Cell::new(0));

    let c = cleanups.clone();
    let oe = o.clone();
    let handle = watch_effect(
        move |inv| {
            oe.get(&Key::prop("n"));
            let c = c.clone();
            inv.on_invalidate(move || c.set(c.get() + 1));
        },
        WatchOptions::default(),
    );

    assert_eq!(cleanups.get(), 0);
    handle.stop();
    assert_eq!(cleanups.get(), 1);
    assert!(!handle.is_active());
}

#[test]
fn computed_cleanup_stops_reacting_once_its_backing_effect_is_gc_able() {
    // A computed's `.get()` keeps working correctly across repeated reads
    // once its source has changed several times, exercising the dirty-flag
    // cleanup/re-track cycle rather than accumulating stale subscriptions.
    let r = r#ref(Value::from(1.0));
    let rc = r.clone();
    let c = computed(move || Value::from(rc.get().as_number().unwrap() * 3.0));

    for i in 1..=5 {
        r.set(Value::from(i as f64));
        assert_eq!(c.get().as_number(), Some(i as f64 * 3.0));
    }
}

#[test]
fn watch_on_ref_stops_calling_back_after_stop() {
    let r = r#ref(Value::from(1.0));
    let calls = Rc::new(Cell::new(0));

    let c = calls.clone();
    let handle = watch(
        WatchSource::from(r.clone()),
        Box::new(move |_new, _old, _inv| c.set(c.get() + 1)),
        WatchOptions::default(),
    );

    r.set(Value::from(2.0));
    assert_eq!(calls.get(), 1);

    handle.stop();
    r.set(Value::from(3.0));
    assert_eq!(calls.get(), 1);
}
