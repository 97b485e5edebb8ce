use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
};

use approx::assert_relative_eq;

use strand_core::{
    EventInfo, Instantiate, ModelDescription, ModelExchange, Status as ModelStatus, StepOutcome,
    Value, ValueReference, VariableDescriptor,
};

use super::{
    Action, Call, Config, Error, Event, IterationLimit, Mode, Progress, Session, Status, solve,
    solve_unobserved,
};

/// A model whose behavior is scripted per test.
///
/// Every state decays with `slope`. With `sawtooth` set, the states double
/// as event indicators and reset to their initial values when they cross
/// zero. Calls are recorded by name.
#[derive(Default)]
struct Script {
    initial: Vec<f64>,
    slope: f64,
    sawtooth: bool,
    time_events: Vec<f64>,
    step_event_at: Option<usize>,
    terminate_in_init: bool,
    terminate_on_step: Option<usize>,
    terminate_on_update: Option<usize>,
    endless_updates: bool,
    /// Discrete updates each event iteration needs before it settles.
    updates_per_event: usize,
    refuse: bool,
    warn_on: Option<&'static str>,

    /// Fails a call with `status` once it has succeeded `after` times.
    fail: Option<(&'static str, usize, ModelStatus)>,

    /// Instance name followed by the debug categories the master requested.
    logging: RefCell<Vec<String>>,
    calls: RefCell<Vec<&'static str>>,
    counts: RefCell<HashMap<&'static str, usize>>,
    freed: Cell<usize>,
}

struct Instance {
    time: f64,
    states: Vec<f64>,
    steps: usize,
    updates: usize,
    unsettled: usize,
    events: i32,
    pending: usize,
}

impl Script {
    fn decay() -> Self {
        Self {
            initial: vec![1.0],
            slope: -1.0,
            ..Self::default()
        }
    }

    fn description(&self) -> ModelDescription {
        let nx = self.initial.len();
        let nz = if self.sawtooth { nx } else { 0 };
        let mut variables = Vec::new();
        if nx > 0 {
            variables.push(VariableDescriptor::real("x", 0));
        }
        variables.push(VariableDescriptor::integer("events", 100));
        variables.push(VariableDescriptor::boolean("late", 200));

        ModelDescription::new("Script", "{script}", nx, nz)
            .with_variables(variables)
            .unwrap()
    }

    fn record(&self, call: &'static str) -> ModelStatus {
        self.calls.borrow_mut().push(call);
        let mut counts = self.counts.borrow_mut();
        let count = counts.entry(call).or_default();
        *count += 1;

        match self.fail {
            Some((name, after, status)) if name == call && *count > after => status,
            _ if self.warn_on == Some(call) => ModelStatus::Warning,
            _ => ModelStatus::Ok,
        }
    }

    fn calls(&self) -> Vec<&'static str> {
        self.calls.borrow().clone()
    }

    fn count(&self, call: &'static str) -> usize {
        self.calls.borrow().iter().filter(|&&name| name == call).count()
    }
}

impl ModelExchange for Script {
    type Instance = Instance;

    fn instantiate(&self, request: Instantiate<'_>) -> Option<Instance> {
        self.record("instantiate");
        self.logging.borrow_mut().push(request.instance_name.to_owned());
        (!self.refuse).then(|| Instance {
            time: 0.0,
            states: self.initial.clone(),
            steps: 0,
            updates: 0,
            unsettled: 0,
            events: 0,
            pending: 0,
        })
    }

    fn free_instance(&self, _instance: Instance) {
        self.record("free_instance");
        self.freed.set(self.freed.get() + 1);
    }

    fn set_debug_logging(
        &self,
        _: &mut Instance,
        logging_on: bool,
        categories: &[String],
    ) -> ModelStatus {
        if logging_on {
            self.logging.borrow_mut().extend(categories.iter().cloned());
        }
        self.record("set_debug_logging")
    }

    fn setup_experiment(
        &self,
        instance: &mut Instance,
        _tolerance: Option<f64>,
        start_time: f64,
        _stop_time: Option<f64>,
    ) -> ModelStatus {
        instance.time = start_time;
        self.record("setup_experiment")
    }

    fn enter_initialization_mode(&self, _: &mut Instance) -> ModelStatus {
        self.record("enter_initialization_mode")
    }

    fn exit_initialization_mode(&self, _: &mut Instance) -> ModelStatus {
        self.record("exit_initialization_mode")
    }

    fn enter_event_mode(&self, _: &mut Instance) -> ModelStatus {
        self.record("enter_event_mode")
    }

    fn new_discrete_states(&self, instance: &mut Instance, info: &mut EventInfo) -> ModelStatus {
        let status = self.record("new_discrete_states");
        instance.updates += 1;

        if self.terminate_in_init && instance.steps == 0 {
            info.terminate_simulation = true;
            return status;
        }
        if self.endless_updates {
            info.new_discrete_states_needed = true;
            return status;
        }
        if self.terminate_on_update == Some(instance.updates) {
            info.terminate_simulation = true;
            return status;
        }
        instance.unsettled += 1;
        if instance.unsettled < self.updates_per_event {
            info.new_discrete_states_needed = true;
            return status;
        }
        instance.unsettled = 0;

        if self.sawtooth {
            for (x, &x0) in instance.states.iter_mut().zip(&self.initial) {
                if *x <= 0.0 {
                    *x = x0;
                    instance.events += 1;
                    info.values_of_continuous_states_changed = true;
                }
            }
        }

        while let Some(&time) = self.time_events.get(instance.pending) {
            if time > instance.time {
                break;
            }
            instance.pending += 1;
            instance.events += 1;
        }
        if let Some(&time) = self.time_events.get(instance.pending) {
            info.next_event_time_defined = true;
            info.next_event_time = time;
        }

        status
    }

    fn enter_continuous_time_mode(&self, _: &mut Instance) -> ModelStatus {
        self.record("enter_continuous_time_mode")
    }

    fn completed_integrator_step(
        &self,
        instance: &mut Instance,
        _no_set_state_prior: bool,
        outcome: &mut StepOutcome,
    ) -> ModelStatus {
        instance.steps += 1;
        outcome.enter_event_mode = self.step_event_at == Some(instance.steps);
        outcome.terminate_simulation = self.terminate_on_step == Some(instance.steps);
        self.record("completed_integrator_step")
    }

    fn set_time(&self, instance: &mut Instance, time: f64) -> ModelStatus {
        instance.time = time;
        self.record("set_time")
    }

    fn set_continuous_states(&self, instance: &mut Instance, states: &[f64]) -> ModelStatus {
        instance.states.copy_from_slice(states);
        self.record("set_continuous_states")
    }

    fn get_continuous_states(&self, instance: &mut Instance, states: &mut [f64]) -> ModelStatus {
        states.copy_from_slice(&instance.states);
        self.record("get_continuous_states")
    }

    fn get_derivatives(&self, _: &mut Instance, derivatives: &mut [f64]) -> ModelStatus {
        derivatives.fill(self.slope);
        self.record("get_derivatives")
    }

    fn get_event_indicators(&self, instance: &mut Instance, indicators: &mut [f64]) -> ModelStatus {
        if self.sawtooth {
            indicators.copy_from_slice(&instance.states);
        }
        self.record("get_event_indicators")
    }

    fn get_real(
        &self,
        instance: &mut Instance,
        _references: &[ValueReference],
        values: &mut [f64],
    ) -> ModelStatus {
        values[0] = instance.states[0];
        self.record("get_real")
    }

    fn get_integer(
        &self,
        instance: &mut Instance,
        _references: &[ValueReference],
        values: &mut [i32],
    ) -> ModelStatus {
        values[0] = instance.events;
        self.record("get_integer")
    }

    fn get_boolean(
        &self,
        instance: &mut Instance,
        _references: &[ValueReference],
        values: &mut [bool],
    ) -> ModelStatus {
        values[0] = instance.time > 1.5;
        self.record("get_boolean")
    }

    fn terminate(&self, _: &mut Instance) -> ModelStatus {
        self.record("terminate")
    }
}

fn real(value: Value) -> f64 {
    value.as_f64()
}

#[test]
fn constant_slope_runs_to_stop_time() {
    let model = Script::decay();
    let solution = solve_unobserved(&model, &model.description(), Config::default())
        .expect("should complete");

    assert_eq!(solution.status, Status::Complete);
    assert_eq!(solution.counters.steps, 300);
    assert_eq!(solution.counters.time_events, 0);
    assert_eq!(solution.counters.state_events, 0);
    assert_eq!(solution.counters.step_events, 0);
    assert_eq!(solution.final_time, 3.0);
    assert_relative_eq!(solution.states[0], -2.0, epsilon = 1e-9);

    let output = &solution.output;
    assert_eq!(output.len(), 300);
    assert_eq!(output.times().last(), Some(&3.0));
    let x = output.get("x").unwrap();
    assert_relative_eq!(real(x[0]), 0.99, epsilon = 1e-12);
    assert_relative_eq!(real(x[299]), -2.0, epsilon = 1e-9);
    assert_eq!(output.get("late").unwrap()[0], Value::Boolean(false));
    assert_eq!(output.get("late").unwrap()[299], Value::Boolean(true));

    assert_eq!(model.freed.get(), 1);
    assert_eq!(model.count("terminate"), 1);
    assert!(model.calls().ends_with(&["terminate", "free_instance"]));
}

#[test]
fn setup_follows_the_lifecycle_order() {
    let model = Script::decay();
    let config = Config::new(0.0, 0.01, 0.01).unwrap();
    solve_unobserved(&model, &model.description(), config).unwrap();

    let calls = model.calls();
    assert_eq!(
        calls[..6],
        [
            "instantiate",
            "setup_experiment",
            "enter_initialization_mode",
            "exit_initialization_mode",
            "new_discrete_states",
            "enter_continuous_time_mode",
        ]
    );
}

#[test]
fn termination_during_initialization_takes_no_steps() {
    let model = Script {
        terminate_in_init: true,
        ..Script::decay()
    };

    let solution = solve_unobserved(&model, &model.description(), Config::default()).unwrap();

    assert_eq!(solution.status, Status::Terminated { time: 0.0 });
    assert_eq!(solution.counters.steps, 0);
    assert!(solution.output.is_empty());
    assert_eq!(
        model.calls(),
        [
            "instantiate",
            "setup_experiment",
            "enter_initialization_mode",
            "exit_initialization_mode",
            "new_discrete_states",
            "terminate",
            "free_instance",
        ]
    );
}

#[test]
fn setup_failure_releases_the_instance() {
    let model = Script {
        fail: Some(("setup_experiment", 0, ModelStatus::Error)),
        ..Script::decay()
    };

    let result = solve_unobserved(&model, &model.description(), Config::default());

    assert!(matches!(
        result,
        Err(Error::Model {
            call: Call::SetupExperiment,
            status: ModelStatus::Error,
        })
    ));
    assert_eq!(model.freed.get(), 1);
    assert_eq!(model.count("enter_initialization_mode"), 0);
    assert_eq!(model.calls().last(), Some(&"free_instance"));
}

#[test]
fn refused_instance_is_an_error() {
    let model = Script {
        refuse: true,
        ..Script::decay()
    };

    let result = solve_unobserved(&model, &model.description(), Config::default());

    assert!(matches!(result, Err(Error::Instantiation(ref name)) if name == "Script"));
    assert_eq!(model.freed.get(), 0);
}

#[test]
fn stepped_session_matches_solve() {
    let script = || Script {
        sawtooth: true,
        time_events: vec![0.505, 2.25],
        step_event_at: Some(42),
        ..Script::decay()
    };
    let config = Config::new(0.0, 3.0, 0.01).unwrap();

    let model = script();
    let mut solved_states = Vec::new();
    let solved = solve(
        &model,
        &model.description(),
        config.clone(),
        |event: &Event<'_>| -> Option<Action> {
            solved_states.push((event.time, event.states.to_vec()));
            None
        },
    )
    .unwrap();

    let model = script();
    let description = model.description();
    let mut stepped_states = Vec::new();
    let mut session = Session::new(
        &model,
        &description,
        config,
        |event: &Event<'_>| -> Option<Action> {
            stepped_states.push((event.time, event.states.to_vec()));
            None
        },
    )
    .unwrap();
    while session.step().unwrap() == Progress::Running {}
    let stepped = session.finish().unwrap();

    assert_eq!(solved.status, Status::Complete);
    assert_eq!(solved.counters, stepped.counters);
    assert_eq!(solved.output, stepped.output);
    assert_eq!(solved_states, stepped_states);
    assert_eq!(solved.counters.time_events, 2);
    assert_eq!(solved.counters.step_events, 1);
    assert_eq!(solved.counters.state_events, 2);
    assert_eq!(solved.counters.steps, 301);
}

#[test]
fn time_event_ends_the_step_exactly() {
    let model = Script {
        time_events: vec![0.505],
        ..Script::decay()
    };
    let config = Config::new(0.0, 1.0, 0.01).unwrap();

    let mut event_times = Vec::new();
    let solution = solve(
        &model,
        &model.description(),
        config,
        |event: &Event<'_>| -> Option<Action> {
            if event.time_event {
                event_times.push(event.time);
            }
            None
        },
    )
    .unwrap();

    assert_eq!(event_times, [0.505]);
    assert_eq!(solution.counters.time_events, 1);
    assert_eq!(solution.counters.steps, 101);
    assert_eq!(solution.final_time, 1.0);
    assert_eq!(solution.output.get("events").unwrap()[100], Value::Integer(1));
    assert_relative_eq!(solution.states[0], 0.0, epsilon = 1e-9);
}

#[test]
fn state_event_resets_the_sawtooth() {
    let model = Script {
        sawtooth: true,
        ..Script::decay()
    };
    let config = Config::new(0.0, 1.5, 0.01).unwrap();

    let mut crossings = Vec::new();
    let solution = solve(
        &model,
        &model.description(),
        config,
        |event: &Event<'_>| -> Option<Action> {
            if event.state_event {
                crossings.extend(event.crossings());
            }
            None
        },
    )
    .unwrap();

    // The state crosses zero once, near t=1, and restarts from 1.
    assert_eq!(solution.counters.state_events, 1);
    assert_eq!(crossings, [(0, super::Crossing::Falling)]);
    assert_eq!(solution.output.get("events").unwrap().last(), Some(&Value::Integer(1)));
    assert_relative_eq!(solution.states[0], 0.5, epsilon = 1e-9);
}

#[test]
fn indicator_reset_is_not_a_crossing() {
    let model = Script {
        initial: vec![0.2],
        slope: -1.0,
        sawtooth: true,
        ..Script::default()
    };
    let config = Config::new(0.0, 1.0, 0.01).unwrap();

    let solution = solve_unobserved(&model, &model.description(), config).unwrap();

    // A reset from below zero back to 0.2 would look like a rising crossing
    // if the indicators were not refreshed after the event.
    assert_eq!(solution.counters.state_events, 4);
}

#[test]
fn step_event_enters_event_mode() {
    let model = Script {
        step_event_at: Some(3),
        ..Script::decay()
    };
    let config = Config::new(0.0, 0.1, 0.01).unwrap();

    let solution = solve_unobserved(&model, &model.description(), config).unwrap();

    assert_eq!(solution.counters.step_events, 1);
    assert_eq!(model.count("enter_event_mode"), 1);
    assert_eq!(model.count("enter_continuous_time_mode"), 2);
}

#[test]
fn completed_step_termination_is_not_counted() {
    let model = Script {
        terminate_on_step: Some(5),
        ..Script::decay()
    };

    let solution = solve_unobserved(&model, &model.description(), Config::default()).unwrap();

    assert!(matches!(solution.status, Status::Terminated { time } if (time - 0.05).abs() < 1e-12));
    assert_eq!(solution.counters.steps, 4);
    assert_eq!(solution.output.len(), 4);
    assert_eq!(model.freed.get(), 1);
}

#[test]
fn termination_in_event_iteration_ends_the_run() {
    let model = Script {
        time_events: vec![0.5],
        terminate_on_update: Some(2),
        ..Script::decay()
    };

    let solution = solve_unobserved(&model, &model.description(), Config::default()).unwrap();

    assert!(matches!(solution.status, Status::Terminated { time } if time == 0.5));
    assert_eq!(solution.counters.time_events, 1);
    assert_eq!(solution.counters.steps, 49);
    assert_eq!(model.count("terminate"), 1);
}

#[test]
fn bounded_iteration_diverges() {
    let model = Script {
        endless_updates: true,
        ..Script::decay()
    };
    let config = Config::default().with_iteration_limit(IterationLimit::Bounded(5));

    let result = solve_unobserved(&model, &model.description(), config);

    assert!(matches!(
        result,
        Err(Error::Diverged {
            iterations: 5,
            ..
        })
    ));
    assert_eq!(model.count("new_discrete_states"), 5);
    assert_eq!(model.freed.get(), 1);
}

#[test]
fn event_iteration_runs_until_the_model_settles() {
    let model = Script {
        updates_per_event: 3,
        step_event_at: Some(5),
        ..Script::decay()
    };
    let config = Config::new(0.0, 0.1, 0.01).unwrap();

    let solution = solve_unobserved(&model, &model.description(), config).unwrap();

    assert_eq!(solution.status, Status::Complete);
    assert_eq!(solution.counters.step_events, 1);
    assert_eq!(solution.counters.discrete_updates, 6);

    // Continuous-time mode is entered only after the third update of each
    // iteration, once at setup and once after the step event.
    let calls = model.calls();
    let entries: Vec<_> = calls
        .iter()
        .enumerate()
        .filter(|&(_, &call)| call == "enter_continuous_time_mode")
        .map(|(index, _)| index)
        .collect();
    assert_eq!(entries.len(), 2);
    for &entry in &entries {
        assert_eq!(
            calls[entry - 3..entry],
            ["new_discrete_states"; 3],
            "unsettled update before {entry}"
        );
        assert_ne!(calls[entry - 4], "new_discrete_states");
    }
}

#[test]
fn time_event_after_stop_time_is_never_reached() {
    let model = Script {
        time_events: vec![1.0 + 1e-12],
        ..Script::decay()
    };
    let config = Config::new(0.0, 1.0, 0.1).unwrap();

    let solution = solve_unobserved(&model, &model.description(), config).unwrap();

    assert_eq!(solution.status, Status::Complete);
    assert_eq!(solution.final_time, 1.0);
    assert_eq!(solution.counters.time_events, 0);
    assert_eq!(solution.counters.steps, 10);
    assert!(solution.output.times().iter().all(|&time| time <= 1.0));
    assert_eq!(solution.output.get("events").unwrap().last(), Some(&Value::Integer(0)));
}

#[test]
fn observer_can_stop_early() {
    let model = Script::decay();

    let solution = solve(
        &model,
        &model.description(),
        Config::default(),
        |event: &Event<'_>| (event.step == 10).then_some(Action::StopEarly),
    )
    .unwrap();

    assert_eq!(solution.status, Status::StoppedByObserver);
    assert_eq!(solution.counters.steps, 10);
    assert_relative_eq!(solution.final_time, 0.1, epsilon = 1e-12);
    assert_eq!(model.count("terminate"), 1);
}

#[test]
fn observer_sees_the_initial_state() {
    let model = Script::decay();
    let config = Config::new(0.0, 0.02, 0.01).unwrap();

    let mut steps = Vec::new();
    solve(
        &model,
        &model.description(),
        config,
        |event: &Event<'_>| -> Option<Action> {
            steps.push((event.step, event.time, event.derivatives[0]));
            None
        },
    )
    .unwrap();

    assert_eq!(steps.len(), 3);
    assert_eq!(steps[0], (0, 0.0, -1.0));
    assert_eq!(steps[2].0, 2);
}

#[test]
fn discard_aborts_and_tears_down() {
    let model = Script {
        // The first fetch happens during setup.
        fail: Some(("get_derivatives", 3, ModelStatus::Discard)),
        ..Script::decay()
    };
    let description = model.description();
    let mut session = Session::new(&model, &description, Config::default(), ()).unwrap();

    assert_eq!(session.step().unwrap(), Progress::Running);
    assert_eq!(session.step().unwrap(), Progress::Running);
    let error = session.step().unwrap_err();

    assert_eq!(error.status(), Some(ModelStatus::Discard));
    assert_eq!(model.freed.get(), 1);
    assert!(model.calls().ends_with(&["get_derivatives", "terminate", "free_instance"]));
    assert!(matches!(session.step(), Err(Error::Closed)));
    assert!(matches!(session.finish(), Err(Error::Closed)));
    assert_eq!(model.freed.get(), 1);
}

#[test]
fn warnings_do_not_stop_the_run() {
    let model = Script {
        warn_on: Some("set_time"),
        ..Script::decay()
    };
    let config = Config::new(0.0, 0.1, 0.01).unwrap();

    let solution = solve_unobserved(&model, &model.description(), config).unwrap();

    assert_eq!(solution.status, Status::Complete);
    assert_eq!(solution.counters.steps, 10);
}

#[test]
fn terminate_failure_is_reported_after_release() {
    let model = Script {
        fail: Some(("terminate", 0, ModelStatus::Fatal)),
        ..Script::decay()
    };
    let config = Config::new(0.0, 0.1, 0.01).unwrap();

    let result = solve_unobserved(&model, &model.description(), config);

    assert!(matches!(
        result,
        Err(Error::Model {
            call: Call::Terminate,
            status: ModelStatus::Fatal,
        })
    ));
    assert_eq!(model.count("terminate"), 1);
    assert_eq!(model.freed.get(), 1);
}

#[test]
fn finishing_early_is_cancelled() {
    let model = Script::decay();
    let description = model.description();
    let mut session = Session::new(&model, &description, Config::default(), ()).unwrap();

    for _ in 0..5 {
        session.step().unwrap();
    }
    assert_eq!(session.mode(), Mode::ContinuousTimeMode);
    assert_eq!(session.status(), None);
    assert_relative_eq!(session.time(), 0.05, epsilon = 1e-12);

    let solution = session.finish().unwrap();
    assert_eq!(solution.status, Status::Cancelled);
    assert_eq!(solution.counters.steps, 5);
    assert_eq!(model.count("terminate"), 1);
    assert_eq!(model.freed.get(), 1);
}

#[test]
fn finished_session_keeps_reporting_its_status() {
    let model = Script::decay();
    let description = model.description();
    let config = Config::new(0.0, 0.02, 0.01).unwrap();
    let mut session = Session::new(&model, &description, config, ()).unwrap();

    assert_eq!(session.step().unwrap(), Progress::Running);
    assert_eq!(session.step().unwrap(), Progress::Finished(Status::Complete));
    let calls = model.calls().len();
    assert_eq!(session.step().unwrap(), Progress::Finished(Status::Complete));
    assert_eq!(model.calls().len(), calls);
}

#[test]
fn dropping_a_session_releases_the_instance() {
    let model = Script::decay();
    let description = model.description();
    let mut session = Session::new(&model, &description, Config::default(), ()).unwrap();
    session.step().unwrap();
    drop(session);

    assert_eq!(model.freed.get(), 1);
    assert!(model.calls().ends_with(&["terminate", "free_instance"]));
}

#[test]
fn debug_categories_are_forwarded() {
    let model = Script::decay();
    let description = model.description();
    let config = Config::new(0.0, 0.01, 0.01)
        .unwrap()
        .with_instance_name("ball")
        .with_debug_categories(["logEvents", "logStatusError"]);

    solve_unobserved(&model, &description, config).unwrap();

    assert_eq!(*model.logging.borrow(), ["ball", "logEvents", "logStatusError"]);
    assert_eq!(model.calls()[1], "set_debug_logging");
}
