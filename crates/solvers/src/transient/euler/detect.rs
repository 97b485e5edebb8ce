//! Event detection after an integration step.

use std::fmt;

/// Direction of a zero crossing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Crossing {
    /// The indicator went from positive to negative.
    Falling,

    /// The indicator went from negative to positive.
    Rising,
}

impl Crossing {
    /// Classifies the change of one indicator between two steps.
    ///
    /// Returns `None` unless the product of the two values is negative, so an
    /// indicator that touches or leaves zero is not a crossing.
    #[must_use]
    pub fn between(previous: f64, current: f64) -> Option<Self> {
        if previous * current >= 0.0 || previous.is_nan() || current.is_nan() {
            None
        } else if previous > 0.0 {
            Some(Self::Falling)
        } else {
            Some(Self::Rising)
        }
    }
}

impl fmt::Display for Crossing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Falling => "-\\-",
            Self::Rising => "-/-",
        })
    }
}

/// Returns `true` if any indicator changed sign between two steps.
///
/// Every index is checked.
#[must_use]
pub fn zero_crossing(previous: &[f64], current: &[f64]) -> bool {
    debug_assert_eq!(previous.len(), current.len());
    previous
        .iter()
        .zip(current)
        .fold(false, |crossed, (&p, &c)| crossed | (p * c < 0.0))
}

/// Events detected for one step, in detection order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct Detection {
    pub(crate) time_event: bool,
    pub(crate) state_event: bool,
    pub(crate) step_event: bool,
}

impl Detection {
    pub(crate) fn any(self) -> bool {
        self.time_event || self.state_event || self.step_event
    }
}
