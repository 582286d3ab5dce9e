//! The effect runtime: construction, invocation, nesting, cleanup and
//! stopping of reactive computations.
//!
//! An effect is a user closure plus bookkeeping. Running it is always
//! "cleanup, then re-track from scratch": every dep the effect belonged to
//! is forgotten before the closure runs, and only the deps actually touched
//! during this run are re-subscribed. That is what makes a conditional read
//! like `if o.get("ok") { o.get("x") } else { o.get("y") }` correctly drop
//! the unreached branch's subscription once the condition flips.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::core::context::{with_context, ReactiveContext};
use crate::core::dep::Dep;

/// Receives the effect instead of having it invoked synchronously on
/// trigger. Enables batching, deferred flush, and `watch`'s flush modes.
pub type SchedulerFn = Rc<dyn Fn(Rc<EffectInner>)>;

/// Debug hook invoked on every dependency edge touched (`track`) or fired
/// (`trigger`) by this effect.
pub type DebugHook = Rc<dyn Fn(DebugEvent)>;

/// Run once when the effect transitions from active to stopped.
pub type OnStopFn = Box<dyn FnOnce()>;

/// Which kind of edge a [`DebugEvent`] describes: a read being subscribed
/// (`track`) or a write resolving to effects to re-run (`trigger`).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DebugOp {
    Track(crate::core::key::TrackOpTypes),
    Trigger(crate::core::key::TriggerOpTypes),
}

/// The `{effect, target, type, key, new_value?, old_value?}` shape handed to
/// `on_track`/`on_trigger` hooks. Only constructed when a hook is actually
/// registered, so the common path pays nothing for it.
#[derive(Clone, Debug)]
pub struct DebugEvent {
    pub effect_id: u64,
    pub target_kind: crate::core::key::TargetKind,
    pub op: DebugOp,
    pub key: Option<crate::core::key::Key>,
    pub new_value: Option<crate::core::value::Value>,
    pub old_value: Option<crate::core::value::Value>,
}

/// Construction-time knobs for [`effect`].
pub struct EffectOptions {
    /// Don't run the effect immediately; wait for the first explicit call
    /// or the first trigger.
    pub lazy: bool,
    /// If set, trigger hands the effect to this closure instead of running
    /// it inline.
    pub scheduler: Option<SchedulerFn>,
    pub on_track: Option<DebugHook>,
    pub on_trigger: Option<DebugHook>,
    pub on_stop: Option<OnStopFn>,
    /// Allow this effect to re-trigger itself while it is still executing.
    /// Only safe in combination with `scheduler`, which breaks the
    /// synchronous re-entry cycle by deferring the re-run.
    pub allow_recurse: bool,
}

impl Default for EffectOptions {
    fn default() -> Self {
        Self {
            lazy: false,
            scheduler: None,
            on_track: None,
            on_trigger: None,
            on_stop: None,
            allow_recurse: false,
        }
    }
}

/// The heap-allocated effect state. Always held behind `Rc` since both the
/// caller's [`Effect`] handle and every [`Dep`] it subscribes to need a
/// reference to it; `Dep -> EffectInner` is the strong edge, the effect's
/// own `deps` list holds the weaker direction (see `core::dep`).
pub struct EffectInner {
    id: u64,
    raw: RefCell<Box<dyn FnMut()>>,
    active: Cell<bool>,
    /// Weak: `Dep -> EffectInner` is the strong edge (a Dep is what keeps an
    /// observed effect alive); this back-reference only needs to find the
    /// Dep to unsubscribe from, not keep it alive, and a strong pair here
    /// would be an uncollectable `Rc` cycle.
    deps: RefCell<Vec<Weak<Dep>>>,
    scheduler: Option<SchedulerFn>,
    on_track: Option<DebugHook>,
    on_trigger: Option<DebugHook>,
    on_stop: RefCell<Option<OnStopFn>>,
    allow_recurse: bool,
}

impl EffectInner {
    fn new(raw: Box<dyn FnMut()>, options: EffectOptions) -> Rc<Self> {
        let id = with_context(ReactiveContext::next_id);
        Rc::new(Self {
            id,
            raw: RefCell::new(raw),
            active: Cell::new(true),
            deps: RefCell::new(Vec::new()),
            scheduler: options.scheduler,
            on_track: options.on_track,
            on_trigger: options.on_trigger,
            on_stop: RefCell::new(options.on_stop),
            allow_recurse: options.allow_recurse,
        })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    pub fn allow_recurse(&self) -> bool {
        self.allow_recurse
    }

    pub fn has_scheduler(&self) -> bool {
        self.scheduler.is_some()
    }

    pub fn scheduler(&self) -> Option<&SchedulerFn> {
        self.scheduler.as_ref()
    }

    pub fn on_track(&self) -> Option<&DebugHook> {
        self.on_track.as_ref()
    }

    pub fn on_trigger(&self) -> Option<&DebugHook> {
        self.on_trigger.as_ref()
    }

    /// Called by `track()` when this effect reads a (target, key) for the
    /// first time this run: record the Dep so cleanup can find it again.
    pub fn add_dep(&self, dep: &Rc<Dep>) {
        self.deps.borrow_mut().push(Rc::downgrade(dep));
    }

    fn cleanup(&self) {
        let deps = self.deps.borrow_mut().split_off(0);
        for dep in deps {
            if let Some(dep) = dep.upgrade() {
                dep.remove(self.id);
            }
        }
    }

    /// Run the effect now, honoring §4.2's invocation semantics: a stopped
    /// effect with no scheduler still runs its closure once (so a one-shot
    /// call after `stop` behaves like calling the raw closure directly); a
    /// stopped effect with a scheduler does nothing; an effect already on
    /// the stack (re-entrant invocation) is silently skipped.
    pub fn run(self: &Rc<Self>) {
        if !self.active.get() {
            if self.scheduler.is_none() {
                (self.raw.borrow_mut())();
            }
            return;
        }

        if with_context(|ctx| ctx.is_effect_active(self)) {
            return;
        }

        self.cleanup();

        with_context(|ctx| {
            ctx.enable_tracking();
            ctx.push_effect(self.clone());
        });

        struct PopGuard<'a>(&'a Rc<EffectInner>);
        impl Drop for PopGuard<'_> {
            fn drop(&mut self) {
                with_context(|ctx| {
                    ctx.pop_effect(self.0);
                    ctx.reset_tracking();
                });
            }
        }
        let _guard = PopGuard(self);

        (self.raw.borrow_mut())();
    }

    pub fn stop(self: &Rc<Self>) {
        if self.active.get() {
            self.cleanup();
            if let Some(on_stop) = self.on_stop.borrow_mut().take() {
                on_stop();
            }
            self.active.set(false);
        }
    }
}

/// A handle to a running effect, returned by [`effect`]. Cloning shares the
/// same underlying computation (it is a reference-counted handle, not a new
/// effect).
#[derive(Clone)]
pub struct Effect {
    inner: Rc<EffectInner>,
}

impl Effect {
    /// Run the effect's closure now (cleanup, re-track, execute).
    pub fn run(&self) {
        self.inner.run();
    }

    pub fn is_active(&self) -> bool {
        self.inner.is_active()
    }

    pub fn id(&self) -> u64 {
        self.inner.id()
    }

    pub(crate) fn inner(&self) -> &Rc<EffectInner> {
        &self.inner
    }
}

/// Create a reactive effect. Runs immediately unless `options.lazy` is set.
pub fn effect(f: impl FnMut() + 'static, options: EffectOptions) -> Effect {
    let lazy = options.lazy;
    let inner = EffectInner::new(Box::new(f), options);
    let handle = Effect { inner };
    if !lazy {
        handle.run();
    }
    handle
}

/// Stop an effect: idempotent, safe to call mid-execution of another
/// effect.
pub fn stop(handle: &Effect) {
    handle.inner().stop();
}

#[cfg(test)]
impl EffectInner {
    /// A bare, never-run effect instance for exercising `Dep`/`KeyMap` in
    /// isolation without going through `effect()`.
    pub(crate) fn test_instance() -> Rc<Self> {
        EffectInner::new(Box::new(|| {}), EffectOptions::default())
    }
}
