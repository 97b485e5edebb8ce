use std::fmt;

use strand_core::{
    EventInfo, Instantiate, ModelExchange, Status, StepOutcome, Value, VariableDescriptor,
    VariableKind,
};

use super::Error;

/// A call the master issues to a model instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Call {
    SetDebugLogging,
    SetupExperiment,
    EnterInitializationMode,
    ExitInitializationMode,
    EnterEventMode,
    NewDiscreteStates,
    EnterContinuousTimeMode,
    CompletedIntegratorStep,
    SetTime,
    SetContinuousStates,
    GetContinuousStates,
    GetDerivatives,
    GetEventIndicators,
    GetReal,
    GetInteger,
    GetBoolean,
    Terminate,
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SetDebugLogging => "set debug logging",
            Self::SetupExperiment => "setup experiment",
            Self::EnterInitializationMode => "enter initialization mode",
            Self::ExitInitializationMode => "exit initialization mode",
            Self::EnterEventMode => "enter event mode",
            Self::NewDiscreteStates => "new discrete states",
            Self::EnterContinuousTimeMode => "enter continuous time mode",
            Self::CompletedIntegratorStep => "completed integrator step",
            Self::SetTime => "set time",
            Self::SetContinuousStates => "set continuous states",
            Self::GetContinuousStates => "get continuous states",
            Self::GetDerivatives => "get derivatives",
            Self::GetEventIndicators => "get event indicators",
            Self::GetReal => "get real",
            Self::GetInteger => "get integer",
            Self::GetBoolean => "get boolean",
            Self::Terminate => "terminate",
        };
        f.write_str(name)
    }
}

/// Lifecycle state of a model instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Instantiated,
    SetupDone,
    InitializationMode,
    EventMode,
    ContinuousTimeMode,
    Terminated,

    /// A call failed; only teardown is allowed.
    Failed,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Instantiated => "instantiated state",
            Self::SetupDone => "setup-done state",
            Self::InitializationMode => "initialization mode",
            Self::EventMode => "event mode",
            Self::ContinuousTimeMode => "continuous-time mode",
            Self::Terminated => "terminated state",
            Self::Failed => "failed state",
        };
        f.write_str(name)
    }
}

const ACTIVE: &[Mode] = &[
    Mode::InitializationMode,
    Mode::EventMode,
    Mode::ContinuousTimeMode,
];

/// Owns one model instance and enforces the order of lifecycle calls.
///
/// The first status stricter than [`Status::Warning`] moves the controller to
/// [`Mode::Failed`]; from then on it issues no calls except teardown. The
/// instance is released exactly once, at the latest when the controller is
/// dropped.
pub(crate) struct Lifecycle<'a, M: ModelExchange> {
    model: &'a M,
    instance: Option<M::Instance>,
    mode: Mode,
    name: String,
}

impl<'a, M: ModelExchange> Lifecycle<'a, M> {
    /// Instantiates the model.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Instantiation`] if the model returns no instance.
    pub(crate) fn instantiate(model: &'a M, request: Instantiate<'_>) -> Result<Self, Error> {
        let name = request.instance_name.to_owned();
        let instance = model
            .instantiate(request)
            .ok_or_else(|| Error::Instantiation(name.clone()))?;

        log::debug!("instantiated `{name}`");

        Ok(Self {
            model,
            instance: Some(instance),
            mode: Mode::Instantiated,
            name,
        })
    }

    pub(crate) fn mode(&self) -> Mode {
        self.mode
    }

    pub(crate) fn set_debug_logging(
        &mut self,
        logging_on: bool,
        categories: &[String],
    ) -> Result<(), Error> {
        let allowed = &[
            Mode::Instantiated,
            Mode::SetupDone,
            Mode::InitializationMode,
            Mode::EventMode,
            Mode::ContinuousTimeMode,
        ];
        self.call(Call::SetDebugLogging, allowed, |model, instance| {
            model.set_debug_logging(instance, logging_on, categories)
        })
    }

    pub(crate) fn setup_experiment(
        &mut self,
        tolerance: Option<f64>,
        start_time: f64,
        stop_time: f64,
    ) -> Result<(), Error> {
        self.transition(
            Call::SetupExperiment,
            Mode::Instantiated,
            Mode::SetupDone,
            |model, instance| {
                model.setup_experiment(instance, tolerance, start_time, Some(stop_time))
            },
        )
    }

    pub(crate) fn enter_initialization_mode(&mut self) -> Result<(), Error> {
        self.transition(
            Call::EnterInitializationMode,
            Mode::SetupDone,
            Mode::InitializationMode,
            |model, instance| model.enter_initialization_mode(instance),
        )
    }

    pub(crate) fn exit_initialization_mode(&mut self) -> Result<(), Error> {
        self.transition(
            Call::ExitInitializationMode,
            Mode::InitializationMode,
            Mode::EventMode,
            |model, instance| model.exit_initialization_mode(instance),
        )
    }

    pub(crate) fn enter_event_mode(&mut self) -> Result<(), Error> {
        self.transition(
            Call::EnterEventMode,
            Mode::ContinuousTimeMode,
            Mode::EventMode,
            |model, instance| model.enter_event_mode(instance),
        )
    }

    pub(crate) fn enter_continuous_time_mode(&mut self) -> Result<(), Error> {
        self.transition(
            Call::EnterContinuousTimeMode,
            Mode::EventMode,
            Mode::ContinuousTimeMode,
            |model, instance| model.enter_continuous_time_mode(instance),
        )
    }

    pub(crate) fn new_discrete_states(&mut self, info: &mut EventInfo) -> Result<(), Error> {
        self.call(Call::NewDiscreteStates, &[Mode::EventMode], |model, instance| {
            model.new_discrete_states(instance, info)
        })
    }

    pub(crate) fn completed_integrator_step(&mut self) -> Result<StepOutcome, Error> {
        let mut outcome = StepOutcome::default();
        self.call(
            Call::CompletedIntegratorStep,
            &[Mode::ContinuousTimeMode],
            |model, instance| model.completed_integrator_step(instance, true, &mut outcome),
        )?;
        Ok(outcome)
    }

    pub(crate) fn set_time(&mut self, time: f64) -> Result<(), Error> {
        let allowed = &[Mode::EventMode, Mode::ContinuousTimeMode];
        self.call(Call::SetTime, allowed, |model, instance| {
            model.set_time(instance, time)
        })
    }

    pub(crate) fn set_continuous_states(&mut self, states: &[f64]) -> Result<(), Error> {
        let allowed = &[Mode::EventMode, Mode::ContinuousTimeMode];
        self.call(Call::SetContinuousStates, allowed, |model, instance| {
            model.set_continuous_states(instance, states)
        })
    }

    pub(crate) fn get_continuous_states(&mut self, states: &mut [f64]) -> Result<(), Error> {
        self.call(Call::GetContinuousStates, ACTIVE, |model, instance| {
            model.get_continuous_states(instance, states)
        })
    }

    pub(crate) fn get_derivatives(&mut self, derivatives: &mut [f64]) -> Result<(), Error> {
        self.call(Call::GetDerivatives, ACTIVE, |model, instance| {
            model.get_derivatives(instance, derivatives)
        })
    }

    pub(crate) fn get_event_indicators(&mut self, indicators: &mut [f64]) -> Result<(), Error> {
        self.call(Call::GetEventIndicators, ACTIVE, |model, instance| {
            model.get_event_indicators(instance, indicators)
        })
    }

    /// Fetches the current value of one variable.
    pub(crate) fn get_value(&mut self, variable: &VariableDescriptor) -> Result<Value, Error> {
        let references = [variable.value_reference()];

        match variable.kind() {
            VariableKind::Real => {
                let mut values = [0.0];
                self.call(Call::GetReal, ACTIVE, |model, instance| {
                    model.get_real(instance, &references, &mut values)
                })?;
                Ok(Value::Real(values[0]))
            }
            VariableKind::Integer => {
                let mut values = [0];
                self.call(Call::GetInteger, ACTIVE, |model, instance| {
                    model.get_integer(instance, &references, &mut values)
                })?;
                Ok(Value::Integer(values[0]))
            }
            VariableKind::Boolean => {
                let mut values = [false];
                self.call(Call::GetBoolean, ACTIVE, |model, instance| {
                    model.get_boolean(instance, &references, &mut values)
                })?;
                Ok(Value::Boolean(values[0]))
            }
        }
    }

    /// Terminates the instance at the end of a regular run.
    pub(crate) fn terminate(&mut self) -> Result<(), Error> {
        let allowed = &[Mode::EventMode, Mode::ContinuousTimeMode];
        self.call(Call::Terminate, allowed, |model, instance| {
            model.terminate(instance)
        })?;
        self.mode = Mode::Terminated;
        log::debug!("terminated `{}`", self.name);
        Ok(())
    }

    /// Releases the instance without terminating it first.
    pub(crate) fn release(&mut self) {
        if let Some(instance) = self.instance.take() {
            self.model.free_instance(instance);
            log::debug!("released `{}`", self.name);
        }
    }

    /// Best-effort terminate and release after a failure.
    ///
    /// A failing terminate is logged, never returned; release always follows.
    pub(crate) fn teardown(&mut self) {
        let Some(instance) = self.instance.as_mut() else {
            return;
        };

        if self.mode != Mode::Terminated {
            let status = self.model.terminate(instance);
            if status.is_usable() {
                self.mode = Mode::Terminated;
            } else {
                log::error!(
                    "{} failed with status {status} during teardown of `{}`",
                    Call::Terminate,
                    self.name
                );
            }
        }

        self.release();
    }

    fn transition(
        &mut self,
        call: Call,
        from: Mode,
        to: Mode,
        f: impl FnOnce(&M, &mut M::Instance) -> Status,
    ) -> Result<(), Error> {
        self.call(call, &[from], f)?;
        self.mode = to;
        log::debug!("`{}` entered {to}", self.name);
        Ok(())
    }

    fn call(
        &mut self,
        call: Call,
        allowed: &[Mode],
        f: impl FnOnce(&M, &mut M::Instance) -> Status,
    ) -> Result<(), Error> {
        let Some(instance) = self.instance.as_mut() else {
            return Err(Error::Released { call });
        };
        if !allowed.contains(&self.mode) {
            return Err(Error::InvalidTransition {
                call,
                mode: self.mode,
            });
        }

        match f(self.model, instance) {
            Status::Ok => Ok(()),
            Status::Warning => {
                log::warn!("{call} returned a warning for `{}`", self.name);
                Ok(())
            }
            status => {
                self.mode = Mode::Failed;
                Err(Error::Model { call, status })
            }
        }
    }
}

impl<M: ModelExchange> Drop for Lifecycle<'_, M> {
    fn drop(&mut self) {
        self.teardown();
    }
}
