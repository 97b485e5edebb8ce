use strand_core::{
    DescriptionError, EventInfo, Instantiate, ModelDescription, ModelExchange, Status,
    StepOutcome, ValueReference, VariableDescriptor,
};

use crate::instance::Base;

/// A counter that ticks at a fixed period.
///
/// The ticker has no continuous states. It schedules a time event one period
/// after the start time and every period after that, and counts the events it
/// sees. With a tick limit it asks the master to terminate once the limit is
/// reached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ticker {
    period: f64,
    limit: Option<i32>,
}

/// An instance of [`Ticker`].
#[derive(Debug)]
pub struct TickerInstance {
    base: Base,
    start_time: f64,
    ticks: i32,
    last_tick: f64,
}

impl Ticker {
    pub const GUID: &'static str = "{5b7f2c1e-0d44-4c4b-9a3b-7e2f1d6c9a10}";

    #[must_use]
    pub fn new(period: f64) -> Self {
        Self {
            period,
            limit: None,
        }
    }

    /// Terminates the simulation after `limit` ticks.
    #[must_use]
    pub fn with_limit(self, limit: i32) -> Self {
        Self {
            limit: Some(limit),
            ..self
        }
    }

    /// Describes the tick count and the time of the last tick.
    ///
    /// Before the first tick `last_tick` reads as the start time.
    ///
    /// # Errors
    ///
    /// Never fails in practice; the variable names are fixed and distinct.
    pub fn description(&self) -> Result<ModelDescription, DescriptionError> {
        ModelDescription::new("Ticker", Self::GUID, 0, 0)
            .with_variables([
                VariableDescriptor::integer("ticks", 0),
                VariableDescriptor::real("last_tick", 1),
            ])
            .map(|description| description.with_log_categories(crate::LOG_CATEGORIES))
    }

    fn next_tick(&self, ticker: &TickerInstance) -> f64 {
        ticker.start_time + f64::from(ticker.ticks + 1) * self.period
    }
}

impl ModelExchange for Ticker {
    type Instance = TickerInstance;

    fn instantiate(&self, request: Instantiate<'_>) -> Option<TickerInstance> {
        let base = Base::new(&request, Self::GUID)?;
        if !(self.period.is_finite() && self.period > 0.0) {
            base.error(&format!("period must be positive, got {}", self.period));
            return None;
        }

        Some(TickerInstance {
            base,
            start_time: 0.0,
            ticks: 0,
            last_tick: 0.0,
        })
    }

    fn free_instance(&self, _instance: TickerInstance) {}

    fn set_debug_logging(
        &self,
        instance: &mut TickerInstance,
        logging_on: bool,
        categories: &[String],
    ) -> Status {
        instance.base.set_debug_logging(logging_on, categories)
    }

    fn setup_experiment(
        &self,
        instance: &mut TickerInstance,
        _tolerance: Option<f64>,
        start_time: f64,
        _stop_time: Option<f64>,
    ) -> Status {
        instance.base.time = start_time;
        instance.start_time = start_time;
        instance.last_tick = start_time;
        Status::Ok
    }

    fn enter_initialization_mode(&self, _instance: &mut TickerInstance) -> Status {
        Status::Ok
    }

    fn exit_initialization_mode(&self, _instance: &mut TickerInstance) -> Status {
        Status::Ok
    }

    fn enter_event_mode(&self, _instance: &mut TickerInstance) -> Status {
        Status::Ok
    }

    fn new_discrete_states(&self, instance: &mut TickerInstance, info: &mut EventInfo) -> Status {
        *info = EventInfo::default();

        while instance.base.time >= self.next_tick(instance) {
            instance.last_tick = self.next_tick(instance);
            instance.ticks += 1;
            instance
                .base
                .event(&format!("tick {} at t={}", instance.ticks, instance.base.time));
        }

        if self.limit.is_some_and(|limit| instance.ticks >= limit) {
            instance.base.event("tick limit reached");
            info.terminate_simulation = true;
        } else {
            info.next_event_time_defined = true;
            info.next_event_time = self.next_tick(instance);
        }
        Status::Ok
    }

    fn enter_continuous_time_mode(&self, _instance: &mut TickerInstance) -> Status {
        Status::Ok
    }

    fn completed_integrator_step(
        &self,
        _instance: &mut TickerInstance,
        _no_set_state_prior: bool,
        outcome: &mut StepOutcome,
    ) -> Status {
        *outcome = StepOutcome::default();
        Status::Ok
    }

    fn set_time(&self, instance: &mut TickerInstance, time: f64) -> Status {
        instance.base.time = time;
        Status::Ok
    }

    fn set_continuous_states(&self, instance: &mut TickerInstance, states: &[f64]) -> Status {
        instance.base.copy("states", &mut [], states)
    }

    fn get_continuous_states(&self, instance: &mut TickerInstance, states: &mut [f64]) -> Status {
        instance.base.copy("states", states, &[])
    }

    fn get_derivatives(&self, instance: &mut TickerInstance, derivatives: &mut [f64]) -> Status {
        instance.base.copy("derivatives", derivatives, &[])
    }

    fn get_event_indicators(
        &self,
        instance: &mut TickerInstance,
        indicators: &mut [f64],
    ) -> Status {
        instance.base.copy("event indicators", indicators, &[])
    }

    fn get_real(
        &self,
        instance: &mut TickerInstance,
        references: &[ValueReference],
        values: &mut [f64],
    ) -> Status {
        let last_tick = instance.last_tick;
        instance
            .base
            .fetch(references, values, |reference| (reference.0 == 1).then_some(last_tick))
    }

    fn get_integer(
        &self,
        instance: &mut TickerInstance,
        references: &[ValueReference],
        values: &mut [i32],
    ) -> Status {
        let ticks = instance.ticks;
        instance
            .base
            .fetch(references, values, |reference| (reference.0 == 0).then_some(ticks))
    }

    fn get_boolean(
        &self,
        instance: &mut TickerInstance,
        references: &[ValueReference],
        values: &mut [bool],
    ) -> Status {
        instance.base.fetch(references, values, |_| None)
    }

    fn terminate(&self, _instance: &mut TickerInstance) -> Status {
        Status::Ok
    }
}
