use crate::{Callbacks, Status, ValueReference};

/// The kind of instance requested from a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstanceKind {
    /// The host owns the integrator; the model supplies derivatives and events.
    ModelExchange,

    /// The model carries its own integrator.
    CoSimulation,
}

/// Everything a model needs to create an instance.
#[derive(Debug, Clone)]
pub struct Instantiate<'a> {
    pub instance_name: &'a str,
    pub kind: InstanceKind,
    pub guid: &'a str,
    pub resource_location: Option<&'a str>,
    pub callbacks: Callbacks,
    pub visible: bool,
    pub logging_on: bool,
}

/// What a model reports after a discrete-state update.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EventInfo {
    /// Another discrete update is required before integration may resume.
    pub new_discrete_states_needed: bool,

    /// The model asks the master to end the simulation.
    pub terminate_simulation: bool,

    /// The nominal values of the continuous states changed.
    pub nominals_of_continuous_states_changed: bool,

    /// The values of the continuous states changed.
    pub values_of_continuous_states_changed: bool,

    /// `next_event_time` holds a scheduled time event.
    pub next_event_time_defined: bool,

    /// Time of the next scheduled event, valid if `next_event_time_defined`.
    pub next_event_time: f64,
}

impl EventInfo {
    /// Returns the scheduled time of the next event, if any.
    #[must_use]
    pub fn next_event_time(&self) -> Option<f64> {
        self.next_event_time_defined.then_some(self.next_event_time)
    }
}

/// What a model reports once an integrator step is complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StepOutcome {
    /// The model requests event mode (a step event).
    pub enter_event_mode: bool,

    /// The model asks the master to end the simulation.
    pub terminate_simulation: bool,
}

/// The capability interface of a hybrid model in Model Exchange form.
///
/// An implementor is a capability object (for example an adapter around a
/// loaded model binary) that creates instances and operates on them. The
/// master owns each [`Instance`](ModelExchange::Instance) exclusively and
/// hands it back through [`free_instance`](ModelExchange::free_instance)
/// exactly once.
///
/// Every operation returns a [`Status`]. Out-parameters are only meaningful
/// when the status [is usable](Status::is_usable).
pub trait ModelExchange {
    /// An instantiated model.
    type Instance;

    /// Creates an instance, or returns `None` if the model cannot.
    fn instantiate(&self, request: Instantiate<'_>) -> Option<Self::Instance>;

    /// Releases an instance and all resources it holds.
    fn free_instance(&self, instance: Self::Instance);

    /// Enables or disables debug logging for the given categories.
    ///
    /// An empty category list addresses all categories.
    fn set_debug_logging(
        &self,
        _instance: &mut Self::Instance,
        _logging_on: bool,
        _categories: &[String],
    ) -> Status {
        Status::Ok
    }

    /// Informs the instance about the experiment interval and tolerance.
    fn setup_experiment(
        &self,
        instance: &mut Self::Instance,
        tolerance: Option<f64>,
        start_time: f64,
        stop_time: Option<f64>,
    ) -> Status;

    fn enter_initialization_mode(&self, instance: &mut Self::Instance) -> Status;

    /// Leaves initialization; the instance is then in event mode.
    fn exit_initialization_mode(&self, instance: &mut Self::Instance) -> Status;

    fn enter_event_mode(&self, instance: &mut Self::Instance) -> Status;

    /// Recomputes discrete states and fills `info`.
    fn new_discrete_states(&self, instance: &mut Self::Instance, info: &mut EventInfo) -> Status;

    fn enter_continuous_time_mode(&self, instance: &mut Self::Instance) -> Status;

    /// Signals the end of an integrator step and reports step events.
    fn completed_integrator_step(
        &self,
        instance: &mut Self::Instance,
        no_set_state_prior: bool,
        outcome: &mut StepOutcome,
    ) -> Status;

    fn set_time(&self, instance: &mut Self::Instance, time: f64) -> Status;

    fn set_continuous_states(&self, instance: &mut Self::Instance, states: &[f64]) -> Status;

    fn get_continuous_states(&self, instance: &mut Self::Instance, states: &mut [f64]) -> Status;

    fn get_derivatives(&self, instance: &mut Self::Instance, derivatives: &mut [f64]) -> Status;

    fn get_event_indicators(
        &self,
        instance: &mut Self::Instance,
        indicators: &mut [f64],
    ) -> Status;

    fn get_real(
        &self,
        instance: &mut Self::Instance,
        references: &[ValueReference],
        values: &mut [f64],
    ) -> Status;

    fn get_integer(
        &self,
        instance: &mut Self::Instance,
        references: &[ValueReference],
        values: &mut [i32],
    ) -> Status;

    fn get_boolean(
        &self,
        instance: &mut Self::Instance,
        references: &[ValueReference],
        values: &mut [bool],
    ) -> Status;

    fn terminate(&self, instance: &mut Self::Instance) -> Status;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_event_time_requires_flag() {
        let mut info = EventInfo {
            next_event_time: 2.5,
            ..EventInfo::default()
        };
        assert_eq!(info.next_event_time(), None);

        info.next_event_time_defined = true;
        assert_eq!(info.next_event_time(), Some(2.5));
    }

    #[test]
    fn defaults_request_nothing() {
        let info = EventInfo::default();
        assert!(!info.new_discrete_states_needed);
        assert!(!info.terminate_simulation);
        assert_eq!(
            StepOutcome::default(),
            StepOutcome {
                enter_event_mode: false,
                terminate_simulation: false,
            }
        );
    }
}
