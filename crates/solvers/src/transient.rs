//! Solvers that advance hybrid models through time.
//!
//! A model implementing [`ModelExchange`] supplies derivatives, event
//! indicators and discrete updates; solvers in this module own the
//! integration and the event protocol around it.
//!
//! # Solvers
//!
//! - [`euler`]: fixed-step forward Euler with time, state and step events
//!
//! [`ModelExchange`]: strand_core::ModelExchange

pub mod euler;
