//! The `Scheduler` trait: the interface `watch`'s `Pre`/`Post` flush modes
//! and `effect`'s own `scheduler` option hand jobs to, in place of the
//! host-framework `queuePreFlushCb`/`queuePostRenderEffect` the source
//! design only names as an external collaborator.
//!
//! In the source language effects are scheduled via `queueMicrotask`; Rust
//! has no microtask queue, so without a caller-supplied scheduler this
//! crate just runs the job synchronously. That is not a lesser substitute —
//! for a library with no event loop of its own, "flush immediately unless
//! told otherwise" is the more predictable default.

use std::rc::Rc;

/// A sink for deferred work. An application embeds this crate by handing
/// `watch`'s `Pre`/`Post` flush modes (or an effect's own `scheduler`
/// option) a `Scheduler` wired into its own render loop or task queue.
pub trait Scheduler {
    fn schedule(&self, job: Box<dyn FnOnce()>);
}

/// Runs every job immediately, inline, on the calling thread. The default
/// when no scheduler is supplied, and a reasonable choice for tests and
/// simple programs that have no render loop to defer to.
pub struct SyncScheduler;

impl Scheduler for SyncScheduler {
    fn schedule(&self, job: Box<dyn FnOnce()>) {
        job();
    }
}

/// Wrap a `Scheduler` trait object so it can be shared across closures.
pub type SharedScheduler = Rc<dyn Scheduler>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn sync_scheduler_runs_inline() {
        let ran = Rc::new(Cell::new(false));
        let r = ran.clone();
        let scheduler = SyncScheduler;
        scheduler.schedule(Box::new(move || r.set(true)));
        assert!(ran.get());
    }
}
