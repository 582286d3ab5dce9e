//! Error types surfaced by this crate.
//!
//! Most misuse conditions in a reactive runtime are silent no-ops by design
//! (see the module docs on `reactivity::tracking`), so the error surface
//! here is intentionally small: the handful of conditions that are genuinely
//! exceptional rather than "this is just how tracking works".

use thiserror::Error;

/// Errors raised by the reactive runtime itself, as opposed to panics that
/// originate in user-supplied closures (getters, watch callbacks, custom-ref
/// factories), which are never caught here and simply propagate.
#[derive(Debug, Error)]
pub enum ReactiveError {
    /// A caller-supplied [`crate::reactivity::scheduling::Scheduler`] rejected a job, e.g.
    /// because the executor it is bound to has already shut down.
    #[error("scheduler rejected job: {0}")]
    SchedulerRejected(String),

    /// A `custom_ref` factory panicked. `custom_ref` itself lets the panic
    /// propagate; this variant exists for callers that opt into catching it
    /// via [`crate::primitives::refs::try_custom_ref`].
    #[error("custom ref factory panicked: {0}")]
    CustomRefFactory(String),
}
