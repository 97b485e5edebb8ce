//! Core traits and types for Strand.
//!
//! This crate defines the shared abstractions that the simulation master,
//! the reference models, and observers build on:
//!
//! - [`ModelExchange`]: the capability interface a hybrid model exposes to
//!   the master: lifecycle calls, state access, derivatives and event
//!   indicators
//! - [`Status`]: the ordered status every model call returns
//! - [`EventInfo`] and [`StepOutcome`]: what the model reports after a
//!   discrete update or a completed integrator step
//! - [`ModelDescription`] and [`VariableDescriptor`]: immutable metadata used
//!   to size buffers and fetch outputs
//! - [`Callbacks`]: the structured logging callback handed to a model
//! - [`Observer`]: receives solver events and optionally returns control actions

mod description;
mod logging;
mod model_exchange;
mod observer;
mod status;
mod value;

pub use description::{
    DescriptionError, ModelDescription, ParseKindError, ValueReference, VariableDescriptor,
    VariableKind,
};
pub use logging::{Callbacks, LogMessage, log_message};
pub use model_exchange::{EventInfo, InstanceKind, Instantiate, ModelExchange, StepOutcome};
pub use observer::Observer;
pub use status::Status;
pub use value::Value;
