//! Capability traits for solver-agnostic observers.
//!
//! These traits abstract over solver-specific event and action types, so an
//! observer written against them works with any solver that implements them.
//!
//! # Event traits
//!
//! - [`HasTime`]: events that carry a simulation time
//! - [`HasStates`]: events that carry continuous states
//!
//! # Action traits
//!
//! - [`CanStopEarly`]: actions that can signal early termination
//!
//! # Example
//!
//! ```rust
//! use strand_core::Observer;
//! use strand_observers::traits::{CanStopEarly, HasStates};
//!
//! struct Floor {
//!     index: usize,
//!     limit: f64,
//! }
//!
//! impl<E: HasStates, A: CanStopEarly> Observer<E, A> for Floor {
//!     fn observe(&mut self, event: &E) -> Option<A> {
//!         let below = event.states().get(self.index).is_some_and(|&x| x < self.limit);
//!         below.then(A::stop_early)
//!     }
//! }
//! ```

use strand_solvers::transient::euler;

/// An event that carries a simulation time.
pub trait HasTime {
    /// Returns the simulation time of this event.
    fn time(&self) -> f64;
}

/// An event that carries the continuous states.
pub trait HasStates {
    fn states(&self) -> &[f64];
}

/// An action type that can signal early termination.
pub trait CanStopEarly {
    /// Returns the action that stops the solver early.
    fn stop_early() -> Self;
}

impl HasTime for euler::Event<'_> {
    fn time(&self) -> f64 {
        self.time
    }
}

impl HasStates for euler::Event<'_> {
    fn states(&self) -> &[f64] {
        self.states
    }
}

impl CanStopEarly for euler::Action {
    fn stop_early() -> Self {
        Self::StopEarly
    }
}
