//! Fixed-step forward Euler master for Model Exchange models.
//!
//! The master owns the integrator and drives a model instance through its
//! lifecycle: setup, continuous-time integration with explicit Euler,
//!
//! ```text
//! x_{n+1} = x_n + xdot_n * (t_{n+1} - t_n)
//! ```
//!
//! and event mode whenever a time, state or step event is detected. After each
//! event the discrete-state update is repeated until the model reports it has
//! converged.
//!
//! # Example
//!
//! ```ignore
//! use strand_solvers::transient::euler::{self, Config};
//!
//! let config = Config::new(0.0, 3.0, 0.01)?;
//! let solution = euler::solve_unobserved(&model, &description, config)?;
//!
//! println!("{solution}");
//! ```
//!
//! For external control over each step, create a [`Session`] and call
//! [`Session::step`] until it reports [`Progress::Finished`].

mod action;
mod config;
mod detect;
mod discrete;
mod error;
mod event;
mod integrate;
mod lifecycle;
mod output;
mod session;
mod solution;

#[cfg(test)]
mod tests;

pub use action::Action;
pub use config::{Config, ConfigError, IterationLimit};
pub use detect::{Crossing, zero_crossing};
pub use error::Error;
pub use event::Event;
pub use integrate::forward_euler;
pub use lifecycle::{Call, Mode};
pub use output::Output;
pub use session::{Progress, Session};
pub use solution::{Counters, Solution, Status};

use strand_core::{ModelDescription, ModelExchange, Observer};

/// Simulates a model from start to stop time.
///
/// # Algorithm
///
/// 1. Instantiate the model, set up the experiment and initialize it.
/// 2. Repeat discrete updates until the model reports convergence.
/// 3. Enter continuous-time mode and emit step 0 to the observer.
/// 4. For each step:
///    - Fetch states and derivatives.
///    - Advance time by the step size, clamped to the stop time and to the
///      next scheduled event.
///    - Update the states with forward Euler.
///    - Detect time, state and step events.
///    - On any event, enter event mode, iterate discrete updates, and return
///      to continuous-time mode.
///    - Record the output variables and emit an [`Event`] to the observer.
/// 5. Terminate and release the instance.
///
/// The run ends early if the model requests termination or the observer
/// returns [`Action::StopEarly`].
///
/// # Errors
///
/// Returns an error if any model call fails with a status worse than
/// `Warning`, if a bounded event iteration diverges, or if the buffers cannot
/// be allocated. The instance is terminated and released before returning.
pub fn solve<M, Obs>(
    model: &M,
    description: &ModelDescription,
    config: Config,
    observer: Obs,
) -> Result<Solution, Error>
where
    M: ModelExchange,
    Obs: for<'e> Observer<Event<'e>, Action>,
{
    let mut session = Session::new(model, description, config, observer)?;
    while let Progress::Running = session.step()? {}
    session.finish()
}

/// Simulates a model from start to stop time without observation.
///
/// This is a convenience wrapper around [`solve`] that discards events.
///
/// # Errors
///
/// Returns an error under the same conditions as [`solve`].
pub fn solve_unobserved<M: ModelExchange>(
    model: &M,
    description: &ModelDescription,
    config: Config,
) -> Result<Solution, Error> {
    solve(model, description, config, ())
}
