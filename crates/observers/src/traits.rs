//! Capability traits for observers.
//!
//! These traits abstract over the integrator's event and action types, so an
//! observer states what it needs instead of naming concrete types.
//!
//! # Example
//!
//! ```rust
//! use onezone_core::Observer;
//! use onezone_observers::traits::{CanStopEarly, HasSnapshot};
//!
//! struct StopWhenEnriched {
//!     metallicity: f64,
//! }
//!
//! impl<E: HasSnapshot, A: CanStopEarly> Observer<E, A> for StopWhenEnriched {
//!     fn observe(&mut self, event: &E) -> Option<A> {
//!         (event.snapshot().metallicity >= self.metallicity).then(A::stop_early)
//!     }
//! }
//! ```

use onezone_singlezone::{Action, Event, Snapshot};

/// An event that carries the state of a zone.
pub trait HasSnapshot {
    /// Returns the snapshot this event reports.
    fn snapshot(&self) -> &Snapshot;
}

/// An action type that can signal early termination.
pub trait CanStopEarly {
    /// Returns the action that stops the run early.
    fn stop_early() -> Self;
}

impl HasSnapshot for Event<'_> {
    fn snapshot(&self) -> &Snapshot {
        self.snapshot
    }
}

impl CanStopEarly for Action {
    fn stop_early() -> Self {
        Self::StopEarly
    }
}
