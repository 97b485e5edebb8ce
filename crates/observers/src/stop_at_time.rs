use strand_core::Observer;

use crate::traits::{CanStopEarly, HasTime};

/// Stops a run at the first event at or after a given time.
///
/// Use it to end a simulation before its configured stop time without
/// rebuilding the config.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StopAtTime {
    time: f64,
}

impl StopAtTime {
    #[must_use]
    pub fn new(time: f64) -> Self {
        Self { time }
    }
}

impl<E: HasTime, A: CanStopEarly> Observer<E, A> for StopAtTime {
    fn observe(&mut self, event: &E) -> Option<A> {
        (event.time() >= self.time).then(A::stop_early)
    }
}
