use strand_core::{
    DescriptionError, EventInfo, Instantiate, ModelDescription, ModelExchange, Status,
    StepOutcome, ValueReference, VariableDescriptor,
};

use crate::instance::Base;

/// A single state falling at a constant rate: `dx/dt = -rate`.
///
/// The model has no event indicators and schedules no time events, so a
/// simulation of it only ever takes plain integration steps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decay {
    initial: f64,
    rate: f64,
}

/// An instance of [`Decay`].
#[derive(Debug)]
pub struct DecayInstance {
    base: Base,
    x: f64,
}

impl Default for Decay {
    fn default() -> Self {
        Self {
            initial: 1.0,
            rate: 1.0,
        }
    }
}

impl Decay {
    pub const GUID: &'static str = "{8c4e810f-3df3-4a00-8276-176fa3c9f000}";

    #[must_use]
    pub fn new(initial: f64, rate: f64) -> Self {
        Self { initial, rate }
    }

    /// Describes the state `x` and its derivative.
    ///
    /// # Errors
    ///
    /// Never fails in practice; the variable names are fixed and distinct.
    pub fn description(&self) -> Result<ModelDescription, DescriptionError> {
        ModelDescription::new("Decay", Self::GUID, 1, 0)
            .with_variables([
                VariableDescriptor::real("x", 0),
                VariableDescriptor::real("der(x)", 1),
            ])
            .map(|description| description.with_log_categories(crate::LOG_CATEGORIES))
    }
}

impl ModelExchange for Decay {
    type Instance = DecayInstance;

    fn instantiate(&self, request: Instantiate<'_>) -> Option<DecayInstance> {
        Some(DecayInstance {
            base: Base::new(&request, Self::GUID)?,
            x: self.initial,
        })
    }

    fn free_instance(&self, _instance: DecayInstance) {}

    fn set_debug_logging(
        &self,
        instance: &mut DecayInstance,
        logging_on: bool,
        categories: &[String],
    ) -> Status {
        instance.base.set_debug_logging(logging_on, categories)
    }

    fn setup_experiment(
        &self,
        instance: &mut DecayInstance,
        _tolerance: Option<f64>,
        start_time: f64,
        _stop_time: Option<f64>,
    ) -> Status {
        instance.base.time = start_time;
        Status::Ok
    }

    fn enter_initialization_mode(&self, _instance: &mut DecayInstance) -> Status {
        Status::Ok
    }

    fn exit_initialization_mode(&self, _instance: &mut DecayInstance) -> Status {
        Status::Ok
    }

    fn enter_event_mode(&self, _instance: &mut DecayInstance) -> Status {
        Status::Ok
    }

    fn new_discrete_states(&self, _instance: &mut DecayInstance, info: &mut EventInfo) -> Status {
        *info = EventInfo::default();
        Status::Ok
    }

    fn enter_continuous_time_mode(&self, _instance: &mut DecayInstance) -> Status {
        Status::Ok
    }

    fn completed_integrator_step(
        &self,
        _instance: &mut DecayInstance,
        _no_set_state_prior: bool,
        outcome: &mut StepOutcome,
    ) -> Status {
        *outcome = StepOutcome::default();
        Status::Ok
    }

    fn set_time(&self, instance: &mut DecayInstance, time: f64) -> Status {
        instance.base.time = time;
        Status::Ok
    }

    fn set_continuous_states(&self, instance: &mut DecayInstance, states: &[f64]) -> Status {
        let mut x = [0.0];
        let status = instance.base.copy("states", &mut x, states);
        if status.is_usable() {
            instance.x = x[0];
        }
        status
    }

    fn get_continuous_states(&self, instance: &mut DecayInstance, states: &mut [f64]) -> Status {
        instance.base.copy("states", states, &[instance.x])
    }

    fn get_derivatives(&self, instance: &mut DecayInstance, derivatives: &mut [f64]) -> Status {
        instance.base.copy("derivatives", derivatives, &[-self.rate])
    }

    fn get_event_indicators(&self, instance: &mut DecayInstance, indicators: &mut [f64]) -> Status {
        instance.base.copy("event indicators", indicators, &[])
    }

    fn get_real(
        &self,
        instance: &mut DecayInstance,
        references: &[ValueReference],
        values: &mut [f64],
    ) -> Status {
        let x = instance.x;
        instance.base.fetch(references, values, |reference| match reference.0 {
            0 => Some(x),
            1 => Some(-self.rate),
            _ => None,
        })
    }

    fn get_integer(
        &self,
        instance: &mut DecayInstance,
        references: &[ValueReference],
        values: &mut [i32],
    ) -> Status {
        instance.base.fetch(references, values, |_| None)
    }

    fn get_boolean(
        &self,
        instance: &mut DecayInstance,
        references: &[ValueReference],
        values: &mut [bool],
    ) -> Status {
        instance.base.fetch(references, values, |_| None)
    }

    fn terminate(&self, _instance: &mut DecayInstance) -> Status {
        Status::Ok
    }
}
