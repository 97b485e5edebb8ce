use super::Crossing;

/// Event emitted by the Euler master for each recorded step.
///
/// Step 0 is the state right after setup, before any integration.
/// Steps 1..N are emitted after each completed step, once any discrete
/// update has converged.
#[derive(Debug, Clone, Copy)]
pub struct Event<'a> {
    /// The step number (0 for the initial state).
    pub step: usize,

    /// Simulation time at the end of the step.
    pub time: f64,

    /// Continuous states after the Euler update.
    pub states: &'a [f64],

    /// Derivatives the update was computed from.
    pub derivatives: &'a [f64],

    /// Event indicators at `time`.
    pub indicators: &'a [f64],

    /// Event indicators at the end of the previous step.
    pub previous_indicators: &'a [f64],

    /// The step ended at a scheduled event time.
    pub time_event: bool,

    /// At least one indicator changed sign.
    pub state_event: bool,

    /// The model requested event mode after the step.
    pub step_event: bool,
}

impl Event<'_> {
    /// Returns `true` if any event was handled in this step.
    #[must_use]
    pub fn has_event(&self) -> bool {
        self.time_event || self.state_event || self.step_event
    }

    /// Iterates over the indicators that crossed zero in this step.
    pub fn crossings(&self) -> impl Iterator<Item = (usize, Crossing)> + '_ {
        self.previous_indicators
            .iter()
            .zip(self.indicators)
            .enumerate()
            .filter_map(|(index, (&previous, &current))| {
                Crossing::between(previous, current).map(|crossing| (index, crossing))
            })
    }
}
