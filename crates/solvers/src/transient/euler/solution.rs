use std::fmt;

use super::Output;

/// Indicates how a simulation ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Status {
    /// Reached the stop time.
    Complete,

    /// The model requested termination at `time`.
    Terminated { time: f64 },

    /// Stopped early due to an observer action.
    StoppedByObserver,

    /// Finished by the caller before the stop time was reached.
    Cancelled,
}

/// Step and event counts of a simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Counters {
    /// Completed integration steps.
    pub steps: usize,

    pub time_events: usize,
    pub state_events: usize,
    pub step_events: usize,

    /// Discrete-state updates across all event iterations, including the
    /// initial one.
    pub discrete_updates: usize,
}

/// The result of a fixed-step simulation.
#[derive(Debug, Clone)]
pub struct Solution {
    /// How the simulation ended.
    pub status: Status,

    pub counters: Counters,

    pub start_time: f64,
    pub step_size: f64,

    /// Time at which the simulation ended.
    pub final_time: f64,

    /// Continuous states after the last step.
    pub states: Vec<f64>,

    /// Observed variables, one column per completed step.
    pub output: Output,
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Status::Complete => writeln!(
                f,
                "Simulation from {} to {} terminated successfully",
                self.start_time, self.final_time
            )?,
            Status::Terminated { time } => writeln!(
                f,
                "Simulation from {} terminated by the model at t={time}",
                self.start_time
            )?,
            Status::StoppedByObserver => writeln!(
                f,
                "Simulation from {} stopped by observer at t={}",
                self.start_time, self.final_time
            )?,
            Status::Cancelled => writeln!(
                f,
                "Simulation from {} cancelled at t={}",
                self.start_time, self.final_time
            )?,
        }

        writeln!(f, "  steps ............ {}", self.counters.steps)?;
        writeln!(f, "  fixed step size .. {}", self.step_size)?;
        writeln!(f, "  time events ...... {}", self.counters.time_events)?;
        writeln!(f, "  state events ..... {}", self.counters.state_events)?;
        write!(f, "  step events ...... {}", self.counters.step_events)
    }
}
