//! Reusable observers for the Strand simulation master.
//!
//! This crate provides [`Observer`] implementations and capability traits that
//! work with any solver whose events and actions implement them.
//!
//! # Modules
//!
//! - [`traits`]: capability traits for solver-agnostic observers
//!   ([`HasTime`], [`HasStates`], [`CanStopEarly`])
//!
//! # Observers
//!
//! - [`EventLog`]: logs every step that handled an event
//! - [`StopAtTime`]: stops a run once simulation time reaches a limit
//!
//! [`Observer`]: strand_core::Observer
//! [`HasTime`]: traits::HasTime
//! [`HasStates`]: traits::HasStates
//! [`CanStopEarly`]: traits::CanStopEarly

mod event_log;
mod stop_at_time;
pub mod traits;

pub use event_log::EventLog;
pub use stop_at_time::StopAtTime;
