//! `Computed`: a lazily re-evaluating, cached [`Effect`] exposed through the
//! same `get`/`set` shape as a [`Ref`](crate::primitives::refs::Ref).
//!
//! Two layers cooperate: an inner lazy effect wrapping the user's getter,
//! whose *scheduler* (rather than running the getter inline) just flips a
//! `dirty` flag and triggers the computed's own synthetic `Value` dep; and
//! the outer synthetic `(self, Value)` edge that the inner layer's trigger
//! fires, which is what propagates invalidation to whoever reads the
//! computed. A chain of computeds memoizes correctly because each link only
//! re-evaluates when read after having been marked dirty, never eagerly.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::core::dep::KeyMap;
use crate::core::key::{Key, TargetKind, TrackOpTypes, TriggerOpTypes};
use crate::core::value::Value;
use crate::primitives::effect::{effect, Effect, EffectOptions};
use crate::reactivity::tracking::{track, trigger};

struct ComputedInner {
    key_map: KeyMap,
    value: RefCell<Value>,
    dirty: Cell<bool>,
    setter: Option<Box<dyn Fn(Value)>>,
    runner: RefCell<Option<Effect>>,
}

/// A lazily-recomputed, cached value derived from other reactive state.
#[derive(Clone)]
pub struct Computed {
    inner: Rc<ComputedInner>,
}

impl Computed {
    fn new(mut getter: Box<dyn FnMut() -> Value>, setter: Option<Box<dyn Fn(Value)>>) -> Self {
        let inner = Rc::new(ComputedInner {
            key_map: KeyMap::new(),
            value: RefCell::new(Value::Null),
            dirty: Cell::new(true),
            setter,
            runner: RefCell::new(None),
        });

        // The wrapped effect writes its result straight into `inner.value`:
        // an `Effect`'s raw closure has no return channel of its own (see
        // `primitives::effect`), so the getter's result is threaded out
        // through the same `Rc` the scheduler below closes over.
        let store_target = inner.clone();
        let runner_body = move || {
            let result = getter();
            *store_target.value.borrow_mut() = result;
        };

        // The scheduler IS the invalidation path: a source changing never
        // re-runs the getter synchronously, it only marks this computed
        // dirty and propagates that outward to whatever reads `.get()`.
        let scheduler_target = inner.clone();
        let runner = effect(
            runner_body,
            EffectOptions {
                lazy: true,
                scheduler: Some(Rc::new(move |_effect| {
                    if !scheduler_target.dirty.get() {
                        scheduler_target.dirty.set(true);
                        trigger(
                            &scheduler_target.key_map,
                            TargetKind::Object,
                            TriggerOpTypes::Set,
                            Some(&Key::Value),
                            None,
                            None,
                        );
                    }
                })),
                ..Default::default()
            },
        );
        *inner.runner.borrow_mut() = Some(runner);

        Self { inner }
    }

    /// Read `.value`. Re-invokes the getter first if dirty, then tracks the
    /// current effect against this computed's own synthetic dep.
    pub fn get(&self) -> Value {
        if self.inner.dirty.get() {
            self.recompute();
        }
        track(
            &self.inner.key_map,
            TargetKind::Object,
            TrackOpTypes::Get,
            &Key::Value,
        );
        self.inner.value.borrow().clone()
    }

    fn recompute(&self) {
        let runner = self
            .inner
            .runner
            .borrow()
            .clone()
            .expect("runner set at construction");
        runner.run();
        self.inner.dirty.set(false);
    }

    /// Write `.value`: delegates to the user's setter if one was supplied;
    /// otherwise this is a misuse signal (a computed with no setter), logged
    /// and ignored rather than panicking.
    pub fn set(&self, value: Value) {
        match &self.inner.setter {
            Some(setter) => setter(value),
            None => tracing::warn!("write to a computed with no setter ignored"),
        }
    }

    pub fn ptr_eq(&self, other: &Computed) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

/// Build a read-only computed from a getter closure.
pub fn computed(getter: impl FnMut() -> Value + 'static) -> Computed {
    Computed::new(Box::new(getter), None)
}

/// Build a computed with both a getter and a setter.
pub fn computed_with(
    getter: impl FnMut() -> Value + 'static,
    setter: impl Fn(Value) + 'static,
) -> Computed {
    Computed::new(Box::new(getter), Some(Box::new(setter)))
}
