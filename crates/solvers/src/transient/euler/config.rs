use thiserror::Error;

/// Limit on discrete-update iterations within one event.
///
/// The default trusts the model to converge. A model that keeps requesting
/// new discrete states then blocks the master indefinitely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum IterationLimit {
    #[default]
    Unbounded,

    /// Fail with [`Error::Diverged`](super::Error::Diverged) after this many
    /// updates in a single event.
    Bounded(usize),
}

/// Configuration for a fixed-step simulation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawConfig", into = "RawConfig"))]
pub struct Config {
    start_time: f64,
    stop_time: f64,
    step_size: f64,
    tolerance: Option<f64>,
    instance_name: Option<String>,
    resource_location: Option<String>,
    logging_on: bool,
    visible: bool,
    debug_categories: Vec<String>,
    iteration_limit: IterationLimit,
}

/// Errors that can occur when validating a simulation config.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("start_time must be finite")]
    StartTime,

    #[error("stop_time must be finite and greater than start_time")]
    StopTime,

    #[error("step_size must be finite and positive")]
    StepSize,

    #[error("tolerance must be finite and positive")]
    Tolerance,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            start_time: 0.0,
            stop_time: 3.0,
            step_size: 0.01,
            tolerance: None,
            instance_name: None,
            resource_location: None,
            logging_on: false,
            visible: false,
            debug_categories: Vec::new(),
            iteration_limit: IterationLimit::Unbounded,
        }
    }
}

impl Config {
    /// Creates a config for the interval `[start_time, stop_time]` with a
    /// fixed step size.
    ///
    /// # Errors
    ///
    /// Returns an error if a time is non-finite, if `stop_time` does not lie
    /// after `start_time`, or if `step_size` is not positive.
    pub fn new(start_time: f64, stop_time: f64, step_size: f64) -> Result<Self, ConfigError> {
        if !start_time.is_finite() {
            return Err(ConfigError::StartTime);
        }
        if !stop_time.is_finite() || stop_time <= start_time {
            return Err(ConfigError::StopTime);
        }
        if !step_size.is_finite() || step_size <= 0.0 {
            return Err(ConfigError::StepSize);
        }

        Ok(Self {
            start_time,
            stop_time,
            step_size,
            ..Self::default()
        })
    }

    /// Sets the tolerance passed to the model at setup.
    ///
    /// # Errors
    ///
    /// Returns an error if the tolerance is not finite and positive.
    pub fn with_tolerance(mut self, tolerance: f64) -> Result<Self, ConfigError> {
        if !tolerance.is_finite() || tolerance <= 0.0 {
            return Err(ConfigError::Tolerance);
        }
        self.tolerance = Some(tolerance);
        Ok(self)
    }

    /// Names the instance; defaults to the model identifier.
    #[must_use]
    pub fn with_instance_name(mut self, name: impl Into<String>) -> Self {
        self.instance_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_resource_location(mut self, location: impl Into<String>) -> Self {
        self.resource_location = Some(location.into());
        self
    }

    /// Turns model logging on at instantiation.
    #[must_use]
    pub fn with_logging(mut self, logging_on: bool) -> Self {
        self.logging_on = logging_on;
        self
    }

    #[must_use]
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Categories passed to the model's debug logging after instantiation.
    ///
    /// The debug logging call is skipped while the list is empty.
    #[must_use]
    pub fn with_debug_categories<S: Into<String>>(
        mut self,
        categories: impl IntoIterator<Item = S>,
    ) -> Self {
        self.debug_categories = categories.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_iteration_limit(mut self, limit: IterationLimit) -> Self {
        self.iteration_limit = limit;
        self
    }

    #[must_use]
    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    #[must_use]
    pub fn stop_time(&self) -> f64 {
        self.stop_time
    }

    #[must_use]
    pub fn step_size(&self) -> f64 {
        self.step_size
    }

    #[must_use]
    pub fn tolerance(&self) -> Option<f64> {
        self.tolerance
    }

    #[must_use]
    pub fn instance_name(&self) -> Option<&str> {
        self.instance_name.as_deref()
    }

    #[must_use]
    pub fn resource_location(&self) -> Option<&str> {
        self.resource_location.as_deref()
    }

    #[must_use]
    pub fn logging_on(&self) -> bool {
        self.logging_on
    }

    #[must_use]
    pub fn visible(&self) -> bool {
        self.visible
    }

    #[must_use]
    pub fn debug_categories(&self) -> &[String] {
        &self.debug_categories
    }

    #[must_use]
    pub fn iteration_limit(&self) -> IterationLimit {
        self.iteration_limit
    }

    /// Estimated number of steps over the interval, used to presize output.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn estimated_steps(&self) -> usize {
        // Finite and positive by construction.
        ((self.stop_time - self.start_time) / self.step_size).ceil() as usize
    }
}

/// Unvalidated form used for (de)serialization.
#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawConfig {
    start_time: f64,
    stop_time: f64,
    step_size: f64,
    tolerance: Option<f64>,
    instance_name: Option<String>,
    resource_location: Option<String>,
    logging_on: bool,
    visible: bool,
    debug_categories: Vec<String>,
    iteration_limit: IterationLimit,
}

#[cfg(feature = "serde")]
impl Default for RawConfig {
    fn default() -> Self {
        Config::default().into()
    }
}

#[cfg(feature = "serde")]
impl From<Config> for RawConfig {
    fn from(config: Config) -> Self {
        Self {
            start_time: config.start_time,
            stop_time: config.stop_time,
            step_size: config.step_size,
            tolerance: config.tolerance,
            instance_name: config.instance_name,
            resource_location: config.resource_location,
            logging_on: config.logging_on,
            visible: config.visible,
            debug_categories: config.debug_categories,
            iteration_limit: config.iteration_limit,
        }
    }
}

#[cfg(feature = "serde")]
impl TryFrom<RawConfig> for Config {
    type Error = ConfigError;

    fn try_from(raw: RawConfig) -> Result<Self, Self::Error> {
        let mut config = Self::new(raw.start_time, raw.stop_time, raw.step_size)?
            .with_logging(raw.logging_on)
            .with_visible(raw.visible)
            .with_debug_categories(raw.debug_categories)
            .with_iteration_limit(raw.iteration_limit);

        if let Some(tolerance) = raw.tolerance {
            config = config.with_tolerance(tolerance)?;
        }
        config.instance_name = raw.instance_name;
        config.resource_location = raw.resource_location;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_reference_run() {
        let config = Config::default();
        assert_eq!(config.start_time(), 0.0);
        assert_eq!(config.stop_time(), 3.0);
        assert_eq!(config.step_size(), 0.01);
        assert_eq!(config.iteration_limit(), IterationLimit::Unbounded);
        assert_eq!(config.estimated_steps(), 300);
    }

    #[test]
    fn rejects_invalid_intervals() {
        assert_eq!(Config::new(f64::NAN, 1.0, 0.1), Err(ConfigError::StartTime));
        assert_eq!(Config::new(1.0, 1.0, 0.1), Err(ConfigError::StopTime));
        assert_eq!(Config::new(0.0, f64::INFINITY, 0.1), Err(ConfigError::StopTime));
        assert_eq!(Config::new(0.0, 1.0, 0.0), Err(ConfigError::StepSize));
        assert_eq!(Config::new(0.0, 1.0, -0.1), Err(ConfigError::StepSize));
    }

    #[test]
    fn rejects_invalid_tolerance() {
        let config = Config::new(0.0, 1.0, 0.1).unwrap();
        assert_eq!(
            config.clone().with_tolerance(0.0),
            Err(ConfigError::Tolerance)
        );
        assert_eq!(
            config.with_tolerance(1e-6).unwrap().tolerance(),
            Some(1e-6)
        );
    }

    #[test]
    fn builder_sets_options() {
        let config = Config::new(0.0, 1.0, 0.1)
            .unwrap()
            .with_instance_name("ball")
            .with_logging(true)
            .with_debug_categories(["logEvents", "logAll"])
            .with_iteration_limit(IterationLimit::Bounded(8));

        assert_eq!(config.instance_name(), Some("ball"));
        assert!(config.logging_on());
        assert_eq!(config.debug_categories(), ["logEvents", "logAll"]);
        assert_eq!(config.iteration_limit(), IterationLimit::Bounded(8));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserializes_with_validation() {
        let config: Config = serde_json::from_str(
            r#"{
                "stop_time": 10.0,
                "step_size": 0.5,
                "instance_name": "ticker",
                "iteration_limit": { "bounded": 4 }
            }"#,
        )
        .expect("valid config");

        assert_eq!(config.start_time(), 0.0);
        assert_eq!(config.stop_time(), 10.0);
        assert_eq!(config.step_size(), 0.5);
        assert_eq!(config.instance_name(), Some("ticker"));
        assert_eq!(config.iteration_limit(), IterationLimit::Bounded(4));

        let invalid = serde_json::from_str::<Config>(r#"{ "step_size": -1.0 }"#);
        assert!(invalid.is_err());
    }
}
