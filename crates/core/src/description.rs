use std::{collections::HashSet, fmt, str::FromStr};

use thiserror::Error;

/// Handle used to fetch a variable's value from a model instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ValueReference(pub u32);

impl fmt::Display for ValueReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The scalar type of a model variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum VariableKind {
    Real,
    Integer,
    Boolean,
}

/// Error returned when parsing an unknown [`VariableKind`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown variable kind `{0}`")]
pub struct ParseKindError(String);

impl FromStr for VariableKind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "real" => Ok(Self::Real),
            "integer" => Ok(Self::Integer),
            "boolean" => Ok(Self::Boolean),
            _ => Err(ParseKindError(s.to_owned())),
        }
    }
}

/// A named model variable observed as simulation output.
///
/// Descriptors are read-only once created.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VariableDescriptor {
    name: String,
    kind: VariableKind,
    value_reference: ValueReference,
}

impl VariableDescriptor {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        kind: VariableKind,
        value_reference: ValueReference,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            value_reference,
        }
    }

    /// Shorthand for a real-valued variable.
    #[must_use]
    pub fn real(name: impl Into<String>, value_reference: u32) -> Self {
        Self::new(name, VariableKind::Real, ValueReference(value_reference))
    }

    /// Shorthand for an integer-valued variable.
    #[must_use]
    pub fn integer(name: impl Into<String>, value_reference: u32) -> Self {
        Self::new(name, VariableKind::Integer, ValueReference(value_reference))
    }

    /// Shorthand for a boolean variable.
    #[must_use]
    pub fn boolean(name: impl Into<String>, value_reference: u32) -> Self {
        Self::new(name, VariableKind::Boolean, ValueReference(value_reference))
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn kind(&self) -> VariableKind {
        self.kind
    }

    #[must_use]
    pub fn value_reference(&self) -> ValueReference {
        self.value_reference
    }
}

/// Errors that can occur when building a [`ModelDescription`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DescriptionError {
    #[error("variable `{0}` is declared more than once")]
    DuplicateVariable(String),
}

/// Static metadata describing a model.
///
/// The counts size the state and indicator buffers of a simulation, and the
/// variables define which outputs are recorded. The description is fixed
/// before a run begins.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModelDescription {
    model_identifier: String,
    guid: String,
    number_of_continuous_states: usize,
    number_of_event_indicators: usize,
    variables: Vec<VariableDescriptor>,
    log_categories: Vec<String>,
}

impl ModelDescription {
    /// Creates a description with no output variables.
    #[must_use]
    pub fn new(
        model_identifier: impl Into<String>,
        guid: impl Into<String>,
        number_of_continuous_states: usize,
        number_of_event_indicators: usize,
    ) -> Self {
        Self {
            model_identifier: model_identifier.into(),
            guid: guid.into(),
            number_of_continuous_states,
            number_of_event_indicators,
            variables: Vec::new(),
            log_categories: Vec::new(),
        }
    }

    /// Appends output variables, keeping their declaration order.
    ///
    /// # Errors
    ///
    /// Returns [`DescriptionError::DuplicateVariable`] if a name repeats.
    pub fn with_variables(
        mut self,
        variables: impl IntoIterator<Item = VariableDescriptor>,
    ) -> Result<Self, DescriptionError> {
        let mut names: HashSet<String> = self
            .variables
            .iter()
            .map(|variable| variable.name.clone())
            .collect();

        for variable in variables {
            if !names.insert(variable.name.clone()) {
                return Err(DescriptionError::DuplicateVariable(variable.name));
            }
            self.variables.push(variable);
        }

        Ok(self)
    }

    /// Sets the log categories the model declares.
    #[must_use]
    pub fn with_log_categories<S: Into<String>>(
        mut self,
        categories: impl IntoIterator<Item = S>,
    ) -> Self {
        self.log_categories = categories.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn model_identifier(&self) -> &str {
        &self.model_identifier
    }

    #[must_use]
    pub fn guid(&self) -> &str {
        &self.guid
    }

    /// Number of continuous states (`nx`).
    #[must_use]
    pub fn number_of_continuous_states(&self) -> usize {
        self.number_of_continuous_states
    }

    /// Number of event indicators (`nz`).
    #[must_use]
    pub fn number_of_event_indicators(&self) -> usize {
        self.number_of_event_indicators
    }

    #[must_use]
    pub fn variables(&self) -> &[VariableDescriptor] {
        &self.variables
    }

    #[must_use]
    pub fn log_categories(&self) -> &[String] {
        &self.log_categories
    }

    /// Looks up a variable by name.
    #[must_use]
    pub fn variable(&self, name: &str) -> Option<&VariableDescriptor> {
        self.variables.iter().find(|variable| variable.name == name)
    }
}
