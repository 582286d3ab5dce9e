//! `watch`/`watch_effect`: deep-observing change subscriptions layered on
//! top of [`effect`](crate::primitives::effect::effect). Both funnel a
//! source read into a lazy runner effect whose scheduler decides *when* the
//! user's callback actually fires, rather than letting a trigger invoke it
//! inline — that indirection is what makes the three flush modes possible.
//!
//! Unlike the source design, a single dynamically-typed `watch(source, cb)`
//! entry point cannot tell "a getter closure" from "a getter closure with no
//! `cb`" at compile time, so this crate splits that distinction into two
//! functions ([`watch`] and [`watch_effect`]) that share the traversal and
//! flush-mode plumbing below.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use crate::collections::{ReactiveArray, ReactiveObject};
use crate::core::value::Value;
use crate::primitives::effect::{effect, DebugHook, Effect, EffectOptions, SchedulerFn};
use crate::primitives::refs::Ref;
use crate::reactivity::equality::has_changed;
use crate::reactivity::scheduling::SharedScheduler;

/// When a watcher's job actually runs relative to the trigger that woke it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Flush {
    /// The scheduler runs the job synchronously, inside the trigger call.
    Sync,
    /// Deferred to the caller-supplied [`Scheduler`](crate::reactivity::Scheduler),
    /// intended to run before a render/update pass.
    Pre,
    /// Deferred to the caller-supplied scheduler, intended to run after one.
    Post,
}

/// What [`watch`] reads. Modeled as an enum rather than runtime type
/// inspection, since there is no dynamic `typeof` to dispatch on here.
pub enum WatchSource {
    Ref(Ref),
    /// Reading the object/array itself, implicitly deep.
    Object(ReactiveObject),
    Array(ReactiveArray),
    /// Each element read independently; any `Object`/`Array` element is
    /// deep-traversed regardless of `WatchOptions::deep`.
    Many(Vec<WatchSource>),
    Getter(Box<dyn FnMut() -> Value>),
}

impl WatchSource {
    pub fn getter(f: impl FnMut() -> Value + 'static) -> Self {
        WatchSource::Getter(Box::new(f))
    }

    pub fn many(sources: Vec<WatchSource>) -> Self {
        WatchSource::Many(sources)
    }
}

impl From<Ref> for WatchSource {
    fn from(r: Ref) -> Self {
        WatchSource::Ref(r)
    }
}

impl From<ReactiveObject> for WatchSource {
    fn from(o: ReactiveObject) -> Self {
        WatchSource::Object(o)
    }
}

impl From<ReactiveArray> for WatchSource {
    fn from(a: ReactiveArray) -> Self {
        WatchSource::Array(a)
    }
}

/// The watched value: a single source reads as [`Self::Single`]; a
/// [`WatchSource::Many`] reads as [`Self::Many`], positionally matching the
/// source vec.
#[derive(Clone, Debug)]
pub enum WatchValue {
    Single(Value),
    Many(Vec<Value>),
}

impl WatchValue {
    pub fn as_single(&self) -> Option<&Value> {
        match self {
            WatchValue::Single(v) => Some(v),
            WatchValue::Many(_) => None,
        }
    }

    pub fn as_many(&self) -> Option<&[Value]> {
        match self {
            WatchValue::Many(vs) => Some(vs),
            WatchValue::Single(_) => None,
        }
    }
}

fn watch_value_changed(old: Option<&WatchValue>, new: &WatchValue) -> bool {
    match (old, new) {
        (None, _) => true,
        (Some(WatchValue::Single(a)), WatchValue::Single(b)) => has_changed(a, b),
        (Some(WatchValue::Many(a)), WatchValue::Many(b)) => {
            a.len() != b.len() || a.iter().zip(b.iter()).any(|(x, y)| has_changed(x, y))
        }
        _ => true,
    }
}

/// Recursively reads every nested value of `value` to subscribe the current
/// effect to all of it, terminating on cycles via `seen`'s container
/// pointers. Covers refs, reactive objects and reactive arrays — the only
/// container shapes [`Value`] itself can carry; a `ReactiveMap`/`ReactiveSet`
/// held inside a `Getter` source is read (and thus top-level tracked) by the
/// getter itself, but is not a `Value` variant so deep-traverse cannot
/// recurse into its entries the way it does for objects and arrays.
fn traverse(value: &Value, seen: &mut HashSet<usize>) {
    match value {
        Value::Ref(r) => {
            if seen.insert(r.id_ptr()) {
                traverse(&r.get(), seen);
            }
        }
        Value::Object(o) => {
            if seen.insert(o.id_ptr()) {
                for key in o.own_keys() {
                    let v = o.get(&key);
                    traverse(&v, seen);
                }
            }
        }
        Value::Array(a) => {
            if seen.insert(a.id_ptr()) {
                let len = a.length();
                for i in 0..len {
                    let v = a.get(i);
                    traverse(&v, seen);
                }
            }
        }
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::Str(_) => {}
    }
}

fn single_value_getter(source: WatchSource, deep: bool) -> Box<dyn FnMut() -> Value> {
    match source {
        WatchSource::Ref(r) => Box::new(move || r.get()),
        WatchSource::Object(o) => Box::new(move || {
            let v = Value::Object(o.clone());
            traverse(&v, &mut HashSet::new());
            v
        }),
        WatchSource::Array(a) => Box::new(move || {
            let v = Value::Array(a.clone());
            traverse(&v, &mut HashSet::new());
            v
        }),
        WatchSource::Getter(mut f) => Box::new(move || {
            let v = f();
            if deep {
                traverse(&v, &mut HashSet::new());
            }
            v
        }),
        WatchSource::Many(_) => panic!("watch sources cannot nest Many more than one level deep"),
    }
}

fn build_getter(source: WatchSource, deep: bool) -> Box<dyn FnMut() -> WatchValue> {
    match source {
        WatchSource::Many(sources) => {
            let mut getters: Vec<Box<dyn FnMut() -> Value>> = sources
                .into_iter()
                .map(|s| {
                    let child_deep =
                        deep || matches!(&s, WatchSource::Object(_) | WatchSource::Array(_));
                    single_value_getter(s, child_deep)
                })
                .collect();
            Box::new(move || WatchValue::Many(getters.iter_mut().map(|g| g()).collect()))
        }
        other => {
            let mut getter = single_value_getter(other, deep);
            Box::new(move || WatchValue::Single(getter()))
        }
    }
}

/// A `fn(invalidate_cb)` handed to a watch callback or `watch_effect` body,
/// allowing it to register cleanup that runs either before the next
/// invocation or when the watcher is stopped.
#[derive(Clone)]
pub struct OnInvalidate(Rc<RefCell<Option<Box<dyn FnOnce()>>>>);

impl OnInvalidate {
    pub fn on_invalidate(&self, f: impl FnOnce() + 'static) {
        *self.0.borrow_mut() = Some(Box::new(f));
    }
}

pub type WatchCallback = Box<dyn FnMut(WatchValue, Option<WatchValue>, &OnInvalidate)>;

/// Construction-time knobs shared by [`watch`] and [`watch_effect`].
pub struct WatchOptions {
    /// Run the callback once immediately instead of only seeding `old_value`.
    /// Ignored by `watch_effect`, which always runs on construction.
    pub immediate: bool,
    /// Force a changed-value verdict regardless of `has_changed`, and
    /// deep-traverse `Getter`/`Many` sources for tracking purposes.
    pub deep: bool,
    pub flush: Flush,
    pub scheduler: Option<SharedScheduler>,
    pub on_track: Option<DebugHook>,
    pub on_trigger: Option<DebugHook>,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            immediate: false,
            deep: false,
            flush: Flush::Pre,
            scheduler: None,
            on_track: None,
            on_trigger: None,
        }
    }
}

/// The stop handle returned by [`watch`]/[`watch_effect`].
pub struct WatchHandle {
    effect: Effect,
}

impl WatchHandle {
    pub fn stop(&self) {
        crate::primitives::effect::stop(&self.effect);
    }

    pub fn is_active(&self) -> bool {
        self.effect.is_active()
    }
}

fn scheduler_fn_for(
    flush: Flush,
    scheduler: Option<SharedScheduler>,
    job: Rc<dyn Fn()>,
) -> SchedulerFn {
    Rc::new(move |_effect| match flush {
        Flush::Sync => job(),
        Flush::Pre | Flush::Post => {
            if let Some(sched) = &scheduler {
                let job = job.clone();
                sched.schedule(Box::new(move || job()));
            } else {
                tracing::debug!(?flush, "no scheduler supplied for deferred watch flush; running inline");
                job();
            }
        }
    })
}

/// Watch `source`, invoking `cb(new, old, on_invalidate)` whenever it
/// changes. See [`WatchOptions`] for `immediate`/`deep`/`flush`.
pub fn watch(source: WatchSource, cb: WatchCallback, options: WatchOptions) -> WatchHandle {
    let is_ref_source = matches!(&source, WatchSource::Ref(_));
    let force_deep =
        options.deep || matches!(&source, WatchSource::Object(_) | WatchSource::Array(_));
    let mut evaluate = build_getter(source, force_deep);

    let current = Rc::new(RefCell::new(WatchValue::Single(Value::Null)));
    let old_value: Rc<RefCell<Option<WatchValue>>> = Rc::new(RefCell::new(None));
    let invalidate: Rc<RefCell<Option<Box<dyn FnOnce()>>>> = Rc::new(RefCell::new(None));
    let cb = Rc::new(RefCell::new(cb));

    let store_target = current.clone();
    let runner_body = move || {
        let v = evaluate();
        *store_target.borrow_mut() = v;
    };

    let runner_slot: Rc<RefCell<Option<Effect>>> = Rc::new(RefCell::new(None));

    let job: Rc<dyn Fn()> = {
        let runner_slot = runner_slot.clone();
        let current = current.clone();
        let old_value = old_value.clone();
        let invalidate = invalidate.clone();
        let cb = cb.clone();
        Rc::new(move || {
            let runner = runner_slot
                .borrow()
                .clone()
                .expect("runner set at construction");
            if !runner.is_active() {
                return;
            }
            runner.run();
            let new_value = current.borrow().clone();
            let changed = force_deep
                || is_ref_source
                || watch_value_changed(old_value.borrow().as_ref(), &new_value);
            if changed {
                if let Some(prev) = invalidate.borrow_mut().take() {
                    prev();
                }
                let on_invalidate = OnInvalidate(invalidate.clone());
                let prev_value = old_value.borrow().clone();
                (cb.borrow_mut())(new_value.clone(), prev_value, &on_invalidate);
                *old_value.borrow_mut() = Some(new_value);
            }
        })
    };

    let on_stop_invalidate = invalidate.clone();
    let runner = effect(
        runner_body,
        EffectOptions {
            lazy: true,
            scheduler: Some(scheduler_fn_for(options.flush, options.scheduler, job.clone())),
            on_track: options.on_track,
            on_trigger: options.on_trigger,
            on_stop: Some(Box::new(move || {
                if let Some(f) = on_stop_invalidate.borrow_mut().take() {
                    f();
                }
            })),
            allow_recurse: false,
        },
    );
    *runner_slot.borrow_mut() = Some(runner.clone());

    if options.immediate {
        job();
    } else {
        runner.run();
        *old_value.borrow_mut() = Some(current.borrow().clone());
    }

    WatchHandle { effect: runner }
}

/// Run `f` immediately and re-run it whenever any reactive state it read
/// changes; `f` receives an [`OnInvalidate`] to register its own cleanup,
/// which also runs once when the watcher is stopped.
pub fn watch_effect(f: impl FnMut(&OnInvalidate) + 'static, options: WatchOptions) -> WatchHandle {
    let invalidate: Rc<RefCell<Option<Box<dyn FnOnce()>>>> = Rc::new(RefCell::new(None));
    let f = Rc::new(RefCell::new(f));

    let runner_invalidate = invalidate.clone();
    let runner_f = f.clone();
    let runner_body = move || {
        if let Some(prev) = runner_invalidate.borrow_mut().take() {
            prev();
        }
        let on_invalidate = OnInvalidate(runner_invalidate.clone());
        (runner_f.borrow_mut())(&on_invalidate);
    };

    let runner_slot: Rc<RefCell<Option<Effect>>> = Rc::new(RefCell::new(None));
    let job: Rc<dyn Fn()> = {
        let runner_slot = runner_slot.clone();
        Rc::new(move || {
            let runner = runner_slot
                .borrow()
                .clone()
                .expect("runner set at construction");
            if runner.is_active() {
                runner.run();
            }
        })
    };

    let on_stop_invalidate = invalidate.clone();
    let runner = effect(
        runner_body,
        EffectOptions {
            lazy: false,
            scheduler: Some(scheduler_fn_for(options.flush, options.scheduler, job)),
            on_track: options.on_track,
            on_trigger: options.on_trigger,
            on_stop: Some(Box::new(move || {
                if let Some(f) = on_stop_invalidate.borrow_mut().take() {
                    f();
                }
            })),
            allow_recurse: false,
        },
    );
    *runner_slot.borrow_mut() = Some(runner.clone());

    WatchHandle { effect: runner }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::key::Key;
    use crate::collections::object::ReactiveObject;
    use crate::primitives::refs::r#ref;
    use std::cell::Cell;

    #[test]
    fn watch_on_ref_runs_cb_with_old_and_new_value() {
        let r = r#ref(Value::from(1.0));
        let seen = Rc::new(RefCell::new(Vec::<(f64, Option<f64>)>::new()));
        let log = seen.clone();
        let handle = watch(
            WatchSource::from(r.clone()),
            Box::new(move |new, old, _inv| {
                log.borrow_mut().push((
                    new.as_single().unwrap().as_number().unwrap(),
                    old.as_ref().and_then(|o| o.as_single()).and_then(|v| v.as_number()),
                ));
            }),
            WatchOptions::default(),
        );
        assert!(seen.borrow().is_empty());
        r.set(Value::from(2.0));
        assert_eq!(seen.borrow().clone(), vec![(2.0, Some(1.0))]);
        handle.stop();
        r.set(Value::from(3.0));
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn immediate_runs_cb_once_with_no_old_value() {
        let r = r#ref(Value::from(1.0));
        let seen = Rc::new(RefCell::new(Vec::<Option<f64>>::new()));
        let log = seen.clone();
        watch(
            WatchSource::from(r),
            Box::new(move |_new, old, _inv| {
                log.borrow_mut()
                    .push(old.as_ref().and_then(|o| o.as_single()).and_then(|v| v.as_number()));
            }),
            WatchOptions {
                immediate: true,
                ..Default::default()
            },
        );
        assert_eq!(seen.borrow().clone(), vec![None]);
    }

    #[test]
    fn deep_watch_on_object_reruns_when_nested_property_changes() {
        let o = ReactiveObject::new();
        o.set(Key::prop("n"), Value::from(1.0));
        let runs = Rc::new(Cell::new(0));
        let r = runs.clone();
        watch(
            WatchSource::from(o.clone()),
            Box::new(move |_new, _old, _inv| r.set(r.get() + 1)),
            WatchOptions::default(),
        );
        o.set(Key::prop("n"), Value::from(2.0));
        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn watch_many_sources_compares_element_wise() {
        let a = r#ref(Value::from(1.0));
        let b = r#ref(Value::from(10.0));
        let runs = Rc::new(Cell::new(0));
        let run = runs.clone();
        watch(
            WatchSource::many(vec![WatchSource::from(a.clone()), WatchSource::from(b.clone())]),
            Box::new(move |_new, _old, _inv| run.set(run.get() + 1)),
            WatchOptions::default(),
        );
        a.set(Value::from(2.0));
        assert_eq!(runs.get(), 1);
        b.set(Value::from(20.0));
        assert_eq!(runs.get(), 2);
    }

    #[test]
    fn watch_effect_runs_immediately_and_reruns_on_dependency_change() {
        let o = ReactiveObject::new();
        o.set(Key::prop("n"), Value::from(1.0));
        let runs = Rc::new(Cell::new(0));
        let r = runs.clone();
        let oe = o.clone();
        watch_effect(
            move |_inv| {
                oe.get(&Key::prop("n"));
                r.set(r.get() + 1);
            },
            WatchOptions::default(),
        );
        assert_eq!(runs.get(), 1);
        o.set(Key::prop("n"), Value::from(2.0));
        assert_eq!(runs.get(), 2);
    }

    #[test]
    fn on_invalidate_runs_before_next_invocation_and_on_stop() {
        let o = ReactiveObject::new();
        o.set(Key::prop("n"), Value::from(1.0));
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
        o.set(Key::prop("n"), Value::from(2.0));
        assert_eq!(cleanups.get(), 1);
        handle.stop();
        assert_eq!(cleanups.get(), 2);
    }
}
