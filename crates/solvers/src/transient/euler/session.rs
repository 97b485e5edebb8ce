use strand_core::{
    Callbacks, EventInfo, InstanceKind, Instantiate, ModelDescription, ModelExchange, Observer,
    Value,
};

use super::{
    Action, Config, Counters, Error, Event, Mode, Output, Solution, Status,
    detect::{self, Crossing, Detection},
    discrete,
    integrate::{self, forward_euler},
    lifecycle::Lifecycle,
};

/// Progress reported by [`Session::step`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Progress {
    /// More steps remain; call [`Session::step`] again.
    Running,

    /// The simulation is over; call [`Session::finish`].
    Finished(Status),
}

/// A running simulation of one model instance.
///
/// Creating a session performs the whole setup sequence: instantiate, set up
/// the experiment, pass through initialization mode, converge the initial
/// event iteration, and enter continuous-time mode. Each call to
/// [`step`](Session::step) then advances by one fixed step; [`solve`](super::solve)
/// drives the same loop to completion.
///
/// The session owns the instance. On any failure it terminates and releases
/// the instance before returning the error; dropping an unfinished session
/// does the same.
pub struct Session<'a, M: ModelExchange, Obs> {
    lifecycle: Lifecycle<'a, M>,
    config: Config,
    time: f64,
    states: Vec<f64>,
    derivatives: Vec<f64>,
    indicators: Vec<f64>,
    previous_indicators: Vec<f64>,
    refresh_indicators: bool,
    event_info: EventInfo,
    output: Output,
    sample: Vec<Value>,
    counters: Counters,
    observer: Obs,
    finished: Option<Status>,
    failed: bool,
}

impl<'a, M, Obs> Session<'a, M, Obs>
where
    M: ModelExchange,
    Obs: for<'e> Observer<Event<'e>, Action>,
{
    /// Sets up a simulation whose model logs through the `log` facade.
    ///
    /// # Errors
    ///
    /// Returns an error if instantiation, buffer allocation, or any setup call
    /// fails. An instance that was already created is released first.
    pub fn new(
        model: &'a M,
        description: &ModelDescription,
        config: Config,
        observer: Obs,
    ) -> Result<Self, Error> {
        Self::with_callbacks(model, description, config, Callbacks::default(), observer)
    }

    /// Sets up a simulation with custom model callbacks.
    ///
    /// # Errors
    ///
    /// Returns an error if instantiation, buffer allocation, or any setup call
    /// fails. An instance that was already created is released first.
    pub fn with_callbacks(
        model: &'a M,
        description: &ModelDescription,
        config: Config,
        callbacks: Callbacks,
        observer: Obs,
    ) -> Result<Self, Error> {
        let instance_name = config
            .instance_name()
            .unwrap_or(description.model_identifier())
            .to_owned();

        let mut lifecycle = Lifecycle::instantiate(
            model,
            Instantiate {
                instance_name: &instance_name,
                kind: InstanceKind::ModelExchange,
                guid: description.guid(),
                resource_location: config.resource_location(),
                callbacks,
                visible: config.visible(),
                logging_on: config.logging_on(),
            },
        )?;

        if !config.debug_categories().is_empty() {
            lifecycle.set_debug_logging(true, config.debug_categories())?;
        }

        let nx = description.number_of_continuous_states();
        let nz = description.number_of_event_indicators();
        let states = zeroed(nx, "state")?;
        let derivatives = zeroed(nx, "derivative")?;
        let indicators = zeroed(nz, "event indicator")?;
        let previous_indicators = zeroed(nz, "previous event indicator")?;
        let output = Output::with_capacity(description.variables(), config.estimated_steps())
            .map_err(|source| Error::Allocation {
                buffer: "output",
                source,
            })?;
        let mut sample = Vec::new();
        sample
            .try_reserve_exact(description.variables().len())
            .map_err(|source| Error::Allocation {
                buffer: "sample",
                source,
            })?;

        let start_time = config.start_time();
        lifecycle.setup_experiment(config.tolerance(), start_time, config.stop_time())?;
        lifecycle.enter_initialization_mode()?;
        lifecycle.exit_initialization_mode()?;

        let mut event_info = EventInfo::default();
        let iterations = discrete::iterate(
            &mut lifecycle,
            &mut event_info,
            config.iteration_limit(),
            start_time,
        )?;

        let mut session = Self {
            lifecycle,
            config,
            time: start_time,
            states,
            derivatives,
            indicators,
            previous_indicators,
            refresh_indicators: false,
            event_info,
            output,
            sample,
            counters: Counters {
                discrete_updates: iterations,
                ..Counters::default()
            },
            observer,
            finished: None,
            failed: false,
        };

        if session.event_info.terminate_simulation {
            session.finished = Some(session.terminated());
            return Ok(session);
        }

        session.lifecycle.enter_continuous_time_mode()?;
        session.lifecycle.get_continuous_states(&mut session.states)?;
        session.lifecycle.get_derivatives(&mut session.derivatives)?;
        session.lifecycle.get_event_indicators(&mut session.indicators)?;
        session
            .previous_indicators
            .copy_from_slice(&session.indicators);

        if let Some(Action::StopEarly) = session.emit(Detection::default()) {
            session.finished = Some(Status::StoppedByObserver);
        }

        Ok(session)
    }

    /// Advances the simulation by one step.
    ///
    /// Returns [`Progress::Finished`] on the step that reaches the stop time,
    /// when the model requests termination, or when the observer stops the
    /// run. Further calls keep returning the same result without touching the
    /// model.
    ///
    /// # Errors
    ///
    /// Returns an error if a model call fails or the event iteration diverges.
    /// The instance is terminated and released before the error is returned,
    /// and every later call returns [`Error::Closed`].
    pub fn step(&mut self) -> Result<Progress, Error> {
        if self.failed {
            return Err(Error::Closed);
        }
        if let Some(status) = self.finished {
            return Ok(Progress::Finished(status));
        }

        match self.advance() {
            Ok(progress) => {
                if let Progress::Finished(status) = progress {
                    self.finished = Some(status);
                }
                Ok(progress)
            }
            Err(error) => {
                self.failed = true;
                self.lifecycle.teardown();
                Err(error)
            }
        }
    }

    /// Terminates and releases the instance and returns the solution.
    ///
    /// Finishing before the simulation is over reports [`Status::Cancelled`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Closed`] if an earlier step failed, or an error if the
    /// model fails to terminate. The instance is released in either case.
    pub fn finish(mut self) -> Result<Solution, Error> {
        if self.failed {
            return Err(Error::Closed);
        }

        let terminated = self.lifecycle.terminate();
        self.lifecycle.release();
        terminated?;

        Ok(Solution {
            status: self.finished.unwrap_or(Status::Cancelled),
            counters: self.counters,
            start_time: self.config.start_time(),
            step_size: self.config.step_size(),
            final_time: self.time,
            states: std::mem::take(&mut self.states),
            output: std::mem::take(&mut self.output),
        })
    }
}

impl<M: ModelExchange, Obs> Session<'_, M, Obs> {
    /// Current simulation time.
    #[must_use]
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Continuous states after the last Euler update.
    #[must_use]
    pub fn states(&self) -> &[f64] {
        &self.states
    }

    /// Event indicators at the end of the last step.
    #[must_use]
    pub fn indicators(&self) -> &[f64] {
        &self.indicators
    }

    #[must_use]
    pub fn counters(&self) -> Counters {
        self.counters
    }

    #[must_use]
    pub fn output(&self) -> &Output {
        &self.output
    }

    /// Lifecycle state of the instance.
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.lifecycle.mode()
    }

    /// How the simulation ended, once it has.
    #[must_use]
    pub fn status(&self) -> Option<Status> {
        self.finished
    }
}

impl<M, Obs> Session<'_, M, Obs>
where
    M: ModelExchange,
    Obs: for<'e> Observer<Event<'e>, Action>,
{
    fn advance(&mut self) -> Result<Progress, Error> {
        let stop_time = self.config.stop_time();
        if self.time >= stop_time {
            return Ok(Progress::Finished(Status::Complete));
        }

        if self.refresh_indicators {
            self.lifecycle.get_event_indicators(&mut self.indicators)?;
            self.refresh_indicators = false;
        }

        // The model may have changed its states during event handling.
        self.lifecycle.get_continuous_states(&mut self.states)?;
        self.lifecycle.get_derivatives(&mut self.derivatives)?;

        let previous = self.time;
        let next = integrate::advance(
            previous,
            self.config.step_size(),
            stop_time,
            &self.event_info,
        );
        self.time = next.time;
        self.lifecycle.set_time(self.time)?;

        forward_euler(&mut self.states, &self.derivatives, self.time - previous);
        self.lifecycle.set_continuous_states(&self.states)?;
        log::trace!("time = {}", self.time);

        self.previous_indicators.copy_from_slice(&self.indicators);
        self.lifecycle.get_event_indicators(&mut self.indicators)?;
        let state_event = detect::zero_crossing(&self.previous_indicators, &self.indicators);

        let outcome = self.lifecycle.completed_integrator_step()?;
        if outcome.terminate_simulation {
            return Ok(Progress::Finished(self.terminated()));
        }

        let detection = Detection {
            time_event: next.time_event,
            state_event,
            step_event: outcome.enter_event_mode,
        };
        if detection.any() && self.handle_events(detection)? {
            return Ok(Progress::Finished(self.terminated()));
        }

        self.counters.steps += 1;
        self.record()?;

        if let Some(Action::StopEarly) = self.emit(detection) {
            return Ok(Progress::Finished(Status::StoppedByObserver));
        }

        if self.time >= stop_time {
            Ok(Progress::Finished(Status::Complete))
        } else {
            Ok(Progress::Running)
        }
    }

    /// Runs event mode for the detected events.
    ///
    /// Returns `true` if the model requested termination.
    fn handle_events(&mut self, detection: Detection) -> Result<bool, Error> {
        self.lifecycle.enter_event_mode()?;
        let time = self.time;

        if detection.time_event {
            self.counters.time_events += 1;
            log::debug!("time event at t={time}");
        }
        if detection.state_event {
            self.counters.state_events += 1;
            for (index, (&previous, &current)) in self
                .previous_indicators
                .iter()
                .zip(&self.indicators)
                .enumerate()
            {
                if let Some(crossing) = Crossing::between(previous, current) {
                    log::debug!("state event {crossing} z[{index}] at t={time}");
                }
            }
        }
        if detection.step_event {
            self.counters.step_events += 1;
            log::debug!("step event at t={time}");
        }

        self.counters.discrete_updates += discrete::iterate(
            &mut self.lifecycle,
            &mut self.event_info,
            self.config.iteration_limit(),
            time,
        )?;
        if self.event_info.terminate_simulation {
            return Ok(true);
        }

        self.lifecycle.enter_continuous_time_mode()?;
        self.refresh_indicators = true;
        Ok(false)
    }

    fn record(&mut self) -> Result<(), Error> {
        self.sample.clear();
        for variable in self.output.variables() {
            self.sample.push(self.lifecycle.get_value(variable)?);
        }
        self.output.record(self.time, &self.sample);
        Ok(())
    }

    fn emit(&mut self, detection: Detection) -> Option<Action> {
        let event = Event {
            step: self.counters.steps,
            time: self.time,
            states: &self.states,
            derivatives: &self.derivatives,
            indicators: &self.indicators,
            previous_indicators: &self.previous_indicators,
            time_event: detection.time_event,
            state_event: detection.state_event,
            step_event: detection.step_event,
        };
        self.observer.observe(&event)
    }

    fn terminated(&self) -> Status {
        log::info!("model requested termination at t={}", self.time);
        Status::Terminated { time: self.time }
    }
}

fn zeroed(len: usize, buffer: &'static str) -> Result<Vec<f64>, Error> {
    let mut values = Vec::new();
    values
        .try_reserve_exact(len)
        .map_err(|source| Error::Allocation { buffer, source })?;
    values.resize(len, 0.0);
    Ok(values)
}
