use strand_core::{
    DescriptionError, EventInfo, Instantiate, ModelDescription, ModelExchange, Status,
    StepOutcome, ValueReference, VariableDescriptor,
};

use crate::instance::Base;

/// A ball dropped onto the floor.
///
/// States are the height `h` and velocity `v`, with `dh/dt = v` and
/// `dv/dt = -g`. The only event indicator is `h`; when it crosses zero the
/// ball is put back on the floor and its velocity reversed and scaled by the
/// restitution coefficient. Once a bounce leaves the ball slower than
/// `min_speed` it comes to rest and stays there.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BouncingBall {
    height: f64,
    gravity: f64,
    restitution: f64,
    min_speed: f64,
}

/// An instance of [`BouncingBall`].
#[derive(Debug)]
pub struct BallInstance {
    base: Base,
    h: f64,
    v: f64,
    bounces: i32,
    resting: bool,
}

impl Default for BouncingBall {
    fn default() -> Self {
        Self {
            height: 1.0,
            gravity: 9.81,
            restitution: 0.7,
            min_speed: 0.1,
        }
    }
}

impl BouncingBall {
    pub const GUID: &'static str = "{1AE5E10D-9521-4DE3-80B9-D0EAAA7D5F1F}";

    /// Drops the ball from `height` with default gravity and restitution.
    #[must_use]
    pub fn new(height: f64) -> Self {
        Self {
            height,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_gravity(self, gravity: f64) -> Self {
        Self { gravity, ..self }
    }

    #[must_use]
    pub fn with_restitution(self, restitution: f64) -> Self {
        Self {
            restitution,
            ..self
        }
    }

    /// Describes the two states, the bounce count and the resting flag.
    ///
    /// # Errors
    ///
    /// Never fails in practice; the variable names are fixed and distinct.
    pub fn description(&self) -> Result<ModelDescription, DescriptionError> {
        ModelDescription::new("BouncingBall", Self::GUID, 2, 1)
            .with_variables([
                VariableDescriptor::real("h", 0),
                VariableDescriptor::real("v", 1),
                VariableDescriptor::integer("bounces", 2),
                VariableDescriptor::boolean("resting", 3),
            ])
            .map(|description| description.with_log_categories(crate::LOG_CATEGORIES))
    }

    fn bounce(&self, ball: &mut BallInstance) -> bool {
        if ball.resting || ball.h > 0.0 || ball.v >= 0.0 {
            return false;
        }

        ball.h = 0.0;
        ball.v = -self.restitution * ball.v;
        ball.bounces += 1;
        ball.base.event(&format!(
            "bounce {} at t={} with v={}",
            ball.bounces, ball.base.time, ball.v
        ));

        if ball.v < self.min_speed {
            ball.v = 0.0;
            ball.resting = true;
            ball.base.event(&format!("ball at rest at t={}", ball.base.time));
        }
        true
    }
}

impl ModelExchange for BouncingBall {
    type Instance = BallInstance;

    fn instantiate(&self, request: Instantiate<'_>) -> Option<BallInstance> {
        Some(BallInstance {
            base: Base::new(&request, Self::GUID)?,
            h: self.height,
            v: 0.0,
            bounces: 0,
            resting: false,
        })
    }

    fn free_instance(&self, _instance: BallInstance) {}

    fn set_debug_logging(
        &self,
        instance: &mut BallInstance,
        logging_on: bool,
        categories: &[String],
    ) -> Status {
        instance.base.set_debug_logging(logging_on, categories)
    }

    fn setup_experiment(
        &self,
        instance: &mut BallInstance,
        _tolerance: Option<f64>,
        start_time: f64,
        _stop_time: Option<f64>,
    ) -> Status {
        instance.base.time = start_time;
        Status::Ok
    }

    fn enter_initialization_mode(&self, _instance: &mut BallInstance) -> Status {
        Status::Ok
    }

    fn exit_initialization_mode(&self, _instance: &mut BallInstance) -> Status {
        Status::Ok
    }

    fn enter_event_mode(&self, _instance: &mut BallInstance) -> Status {
        Status::Ok
    }

    fn new_discrete_states(&self, instance: &mut BallInstance, info: &mut EventInfo) -> Status {
        *info = EventInfo {
            values_of_continuous_states_changed: self.bounce(instance),
            ..EventInfo::default()
        };
        Status::Ok
    }

    fn enter_continuous_time_mode(&self, _instance: &mut BallInstance) -> Status {
        Status::Ok
    }

    fn completed_integrator_step(
        &self,
        _instance: &mut BallInstance,
        _no_set_state_prior: bool,
        outcome: &mut StepOutcome,
    ) -> Status {
        *outcome = StepOutcome::default();
        Status::Ok
    }

    fn set_time(&self, instance: &mut BallInstance, time: f64) -> Status {
        instance.base.time = time;
        Status::Ok
    }

    fn set_continuous_states(&self, instance: &mut BallInstance, states: &[f64]) -> Status {
        let mut x = [0.0; 2];
        let status = instance.base.copy("states", &mut x, states);
        if status.is_usable() {
            [instance.h, instance.v] = x;
        }
        status
    }

    fn get_continuous_states(&self, instance: &mut BallInstance, states: &mut [f64]) -> Status {
        instance.base.copy("states", states, &[instance.h, instance.v])
    }

    fn get_derivatives(&self, instance: &mut BallInstance, derivatives: &mut [f64]) -> Status {
        let dx = if instance.resting {
            [0.0, 0.0]
        } else {
            [instance.v, -self.gravity]
        };
        instance.base.copy("derivatives", derivatives, &dx)
    }

    fn get_event_indicators(&self, instance: &mut BallInstance, indicators: &mut [f64]) -> Status {
        instance.base.copy("event indicators", indicators, &[instance.h])
    }

    fn get_real(
        &self,
        instance: &mut BallInstance,
        references: &[ValueReference],
        values: &mut [f64],
    ) -> Status {
        let (h, v) = (instance.h, instance.v);
        instance.base.fetch(references, values, |reference| match reference.0 {
            0 => Some(h),
            1 => Some(v),
            _ => None,
        })
    }

    fn get_integer(
        &self,
        instance: &mut BallInstance,
        references: &[ValueReference],
        values: &mut [i32],
    ) -> Status {
        let bounces = instance.bounces;
        instance
            .base
            .fetch(references, values, |reference| (reference.0 == 2).then_some(bounces))
    }

    fn get_boolean(
        &self,
        instance: &mut BallInstance,
        references: &[ValueReference],
        values: &mut [bool],
    ) -> Status {
        let resting = instance.resting;
        instance
            .base
            .fetch(references, values, |reference| (reference.0 == 3).then_some(resting))
    }

    fn terminate(&self, _instance: &mut BallInstance) -> Status {
        Status::Ok
    }
}
