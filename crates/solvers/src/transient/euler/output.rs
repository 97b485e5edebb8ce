use std::collections::TryReserveError;

use strand_core::{Value, VariableDescriptor};

/// Extra columns reserved beyond the estimated step count.
const SLACK: usize = 10;

/// Most columns reserved up front; longer runs grow the buffer as they go.
const MAX_RESERVED: usize = 1 << 20;

/// Recorded values of the observed variables.
///
/// One row per declared variable and one column per recorded step. Storage
/// is presized from the expected step count and grows if a run records more.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Output {
    variables: Vec<VariableDescriptor>,
    times: Vec<f64>,
    rows: Vec<Vec<Value>>,
}

impl Output {
    /// Creates an empty buffer with room for `estimated_steps` columns, up to
    /// a fixed cap.
    pub(crate) fn with_capacity(
        variables: &[VariableDescriptor],
        estimated_steps: usize,
    ) -> Result<Self, TryReserveError> {
        let capacity = estimated_steps.saturating_add(SLACK).min(MAX_RESERVED);

        let mut times = Vec::new();
        times.try_reserve_exact(capacity)?;

        let mut rows = Vec::new();
        rows.try_reserve_exact(variables.len())?;
        for _ in variables {
            let mut row = Vec::new();
            row.try_reserve_exact(capacity)?;
            rows.push(row);
        }

        Ok(Self {
            variables: variables.to_vec(),
            times,
            rows,
        })
    }

    /// Appends one column.
    pub(crate) fn record(&mut self, time: f64, values: &[Value]) {
        debug_assert_eq!(values.len(), self.rows.len());
        self.times.push(time);
        for (row, &value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
    }

    /// The observed variables, in row order.
    #[must_use]
    pub fn variables(&self) -> &[VariableDescriptor] {
        &self.variables
    }

    /// Number of recorded columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.times.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Time of each recorded column.
    #[must_use]
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Recorded values of the variable at `index`.
    #[must_use]
    pub fn row(&self, index: usize) -> Option<&[Value]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    /// Recorded values of the variable called `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[Value]> {
        let index = self
            .variables
            .iter()
            .position(|variable| variable.name() == name)?;
        self.row(index)
    }

    /// Values of all variables at column `step`.
    pub fn column(&self, step: usize) -> Option<impl Iterator<Item = Value> + '_> {
        (step < self.len()).then(|| self.rows.iter().map(move |row| row[step]))
    }
}
