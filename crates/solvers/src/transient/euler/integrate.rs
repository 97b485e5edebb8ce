//! Fixed-step forward Euler.

use strand_core::EventInfo;

/// Fraction of a step below which a proposed time snaps onto the stop or
/// event time.
const SNAP: f64 = 1e-9;

/// The time an integration step ends at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Advance {
    pub(crate) time: f64,
    pub(crate) time_event: bool,
}

/// Proposes the end time of the next step.
///
/// The step ends at `time + step_size`, limited to `stop_time`. If a time
/// event is pending and that time is reached, the step ends exactly at the
/// event time instead. Events scheduled after `stop_time` are left for a
/// later run. The result never lies before `time`.
pub(crate) fn advance(time: f64, step_size: f64, stop_time: f64, info: &EventInfo) -> Advance {
    let tolerance = step_size * SNAP;

    let mut next = (time + step_size).min(stop_time);
    if stop_time - next <= tolerance {
        next = stop_time;
    }

    match info.next_event_time() {
        Some(event_time) if event_time <= stop_time && next >= event_time - tolerance => Advance {
            time: event_time.max(time),
            time_event: true,
        },
        _ => Advance {
            time: next,
            time_event: false,
        },
    }
}

/// Applies one forward Euler update in place: `x += dt * xdot`.
pub fn forward_euler(states: &mut [f64], derivatives: &[f64], dt: f64) {
    debug_assert_eq!(states.len(), derivatives.len());
    for (x, dx) in states.iter_mut().zip(derivatives) {
        *x += dt * dx;
    }
}
