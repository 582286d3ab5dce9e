//! Thread-local runtime state: the effect stack, the tracking-state stack,
//! and the monotonic effect-id counter.
//!
//! Every participant in the reactive graph (track, trigger, effect
//! invocation, `pause_tracking`/`enable_tracking`) reads and mutates the
//! same state, so it lives in one place rather than being threaded through
//! every call explicitly. A `thread_local!` gives each thread its own
//! context rather than requiring genuinely global mutable state, and means
//! two tests run sequentially on the same thread never bleed tracking state
//! into each other as long as effects are stopped/dropped between them.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::primitives::effect::EffectInner;

/// Per-thread reactive runtime state.
pub struct ReactiveContext {
    /// The effect currently executing, if any. The top of `effect_stack`.
    effect_stack: RefCell<Vec<Rc<EffectInner>>>,

    /// Nested save/restore stack for `should_track`. `pause_tracking` and
    /// `enable_tracking` push the current flag and set a new one;
    /// `reset_tracking` pops it.
    tracking_stack: RefCell<Vec<bool>>,

    /// Whether a `track()` call right now would actually record anything.
    should_track: Cell<bool>,

    next_effect_id: Cell<u64>,
}

impl ReactiveContext {
    fn new() -> Self {
        Self {
            effect_stack: RefCell::new(Vec::new()),
            tracking_stack: RefCell::new(Vec::new()),
            should_track: Cell::new(true),
            next_effect_id: Cell::new(1),
        }
    }

    pub fn next_id(&self) -> u64 {
        let id = self.next_effect_id.get();
        self.next_effect_id.set(id + 1);
        id
    }

    pub fn active_effect(&self) -> Option<Rc<EffectInner>> {
        self.effect_stack.borrow().last().cloned()
    }

    pub fn push_effect(&self, effect: Rc<EffectInner>) {
        self.effect_stack.borrow_mut().push(effect);
    }

    /// Pop the top of the effect stack. The caller is expected to pass the
    /// same effect it just pushed (invocation is strictly LIFO); a mismatch
    /// means a push/pop bug elsewhere.
    pub fn pop_effect(&self, effect: &Rc<EffectInner>) {
        let mut stack = self.effect_stack.borrow_mut();
        match stack.pop() {
            Some(top) if Rc::ptr_eq(&top, effect) => {}
            Some(top) => {
                stack.push(top);
                debug_assert!(false, "effect stack pop did not match the active effect");
            }
            None => debug_assert!(false, "effect stack underflow"),
        }
    }

    pub fn is_effect_active(&self, effect: &Rc<EffectInner>) -> bool {
        self.effect_stack
            .borrow()
            .iter()
            .any(|e| Rc::ptr_eq(e, effect))
    }

    pub fn should_track(&self) -> bool {
        self.should_track.get()
    }

    pub fn pause_tracking(&self) {
        self.tracking_stack.borrow_mut().push(self.should_track.get());
        self.should_track.set(false);
    }

    pub fn enable_tracking(&self) {
        self.tracking_stack.borrow_mut().push(self.should_track.get());
        self.should_track.set(true);
    }

    pub fn reset_tracking(&self) {
        let prev = self.tracking_stack.borrow_mut().pop().unwrap_or(true);
        self.should_track.set(prev);
    }
}

impl Default for ReactiveContext {
    fn default() -> Self {
        Self::new()
    }
}

thread_local! {
    static CONTEXT: ReactiveContext = ReactiveContext::new();
}

/// Access the thread-local reactive context.
pub fn with_context<R>(f: impl FnOnce(&ReactiveContext) -> R) -> R {
    CONTEXT.with(f)
}

/// Whether tracking is currently enabled and an effect is executing: the
/// precondition `track()` checks before doing anything at all.
pub fn is_tracking() -> bool {
    with_context(|ctx| ctx.should_track() && ctx.active_effect().is_some())
}

/// Push a `should_track = false` frame. Pair with [`reset_tracking`].
pub fn pause_tracking() {
    with_context(|ctx| ctx.pause_tracking());
}

/// Push a `should_track = true` frame. Pair with [`reset_tracking`].
pub fn enable_tracking() {
    with_context(|ctx| ctx.enable_tracking());
}

/// Pop the most recent `pause_tracking`/`enable_tracking` frame, restoring
/// whatever `should_track` was before it (defaulting to `true` if the stack
/// is empty, matching the source behavior of an unbalanced pop).
pub fn reset_tracking() {
    with_context(|ctx| ctx.reset_tracking());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracking_defaults_to_disabled_with_no_active_effect() {
        // should_track defaults true, but with no active effect is_tracking
        // is false until an effect invocation pushes one.
        assert!(!is_tracking());
    }

    #[test]
    fn pause_and_reset_are_nestable() {
        with_context(|ctx| {
            assert!(ctx.should_track());
            ctx.pause_tracking();
            assert!(!ctx.should_track());
            ctx.enable_tracking();
            assert!(ctx.should_track());
            ctx.reset_tracking();
            assert!(!ctx.should_track());
            ctx.reset_tracking();
            assert!(ctx.should_track());
        });
    }

    #[test]
    fn effect_ids_are_monotonic() {
        with_context(|ctx| {
            let a = ctx.next_id();
            let b = ctx.next_id();
            assert!(b > a);
        });
    }
}
