//! Event iteration: discrete updates until the model reports stability.

use strand_core::{EventInfo, ModelExchange};

use super::{Error, IterationLimit, lifecycle::Lifecycle};

/// Calls the discrete-state update until no further update is needed.
///
/// The loop ends once the model clears `new_discrete_states_needed` or sets
/// `terminate_simulation`. Each call starts from a cleared `info`, so fields
/// the model leaves untouched read as "nothing to report". Returns the number
/// of updates performed.
///
/// # Errors
///
/// Returns an error if an update fails, or [`Error::Diverged`] if a bounded
/// `limit` is exhausted while the model still requests updates.
pub(crate) fn iterate<M: ModelExchange>(
    lifecycle: &mut Lifecycle<'_, M>,
    info: &mut EventInfo,
    limit: IterationLimit,
    time: f64,
) -> Result<usize, Error> {
    info.new_discrete_states_needed = true;
    info.terminate_simulation = false;

    let mut iterations = 0;
    while info.new_discrete_states_needed && !info.terminate_simulation {
        if matches!(limit, IterationLimit::Bounded(max) if iterations >= max) {
            return Err(Error::Diverged { iterations, time });
        }

        *info = EventInfo::default();
        lifecycle.new_discrete_states(info)?;
        iterations += 1;

        if info.values_of_continuous_states_changed {
            log::debug!("continuous state values changed at t={time}");
        }
        if info.nominals_of_continuous_states_changed {
            log::debug!("nominals of continuous states changed at t={time}");
        }
    }

    log::trace!("event iteration converged after {iterations} update(s) at t={time}");
    Ok(iterations)
}
