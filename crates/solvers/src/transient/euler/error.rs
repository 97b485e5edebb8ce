use std::collections::TryReserveError;

use strand_core::Status;

use super::{Call, Mode};

/// Errors that can occur during a fixed-step simulation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("could not instantiate model `{0}`")]
    Instantiation(String),

    /// A model call returned a status stricter than [`Status::Warning`].
    #[error("{call} failed with status {status}")]
    Model { call: Call, status: Status },

    #[error("{call} is not allowed in {mode}")]
    InvalidTransition { call: Call, mode: Mode },

    #[error("{call} issued after the instance was released")]
    Released { call: Call },

    #[error("discrete states did not converge within {iterations} iterations at t={time}")]
    Diverged { iterations: usize, time: f64 },

    #[error("could not allocate {buffer} buffer")]
    Allocation {
        buffer: &'static str,
        #[source]
        source: TryReserveError,
    },

    #[error("session was closed after an earlier failure")]
    Closed,
}

impl Error {
    /// Returns the model status behind a failed call, if any.
    #[must_use]
    pub fn status(&self) -> Option<Status> {
        match self {
            Self::Model { status, .. } => Some(*status),
            _ => None,
        }
    }
}
