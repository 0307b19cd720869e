//! Beamline modes.
//!
//! A mode names the parameters that auto-cascade while it is active, plus
//! the set points written (without moving) when the mode is activated.

use std::collections::BTreeMap;

use refl_common::value::ParameterValue;

#[derive(Debug, Clone, PartialEq)]
pub struct BeamlineMode {
    name: String,
    parameters: Vec<String>,
    initial_setpoints: BTreeMap<String, ParameterValue>,
}

impl BeamlineMode {
    pub fn new<I, S>(name: impl Into<String>, parameters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            parameters: parameters.into_iter().map(Into::into).collect(),
            initial_setpoints: BTreeMap::new(),
        }
    }

    /// Set points applied with `set_point_only` on activation.
    pub fn with_initial_setpoints<I, S, V>(mut self, setpoints: I) -> Self
    where
        I: IntoIterator<Item = (S, V)>,
        S: Into<String>,
        V: Into<ParameterValue>,
    {
        self.initial_setpoints = setpoints
            .into_iter()
            .map(|(name, value)| (name.into(), value.into()))
            .collect();
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameter_names(&self) -> &[String] {
        &self.parameters
    }

    pub fn initial_setpoints(&self) -> &BTreeMap<String, ParameterValue> {
        &self.initial_setpoints
    }

    pub fn has_parameter(&self, name: &str) -> bool {
        self.parameters.iter().any(|p| p == name)
    }

    /// Indices of the parameters in this mode, in beamline order.
    ///
    /// With `after = Some(i)` only parameters strictly after index `i` are
    /// returned; with `None` all of them are.
    pub fn parameters_in_mode<'a, I>(&self, parameters: I, after: Option<usize>) -> Vec<usize>
    where
        I: IntoIterator<Item = &'a str>,
    {
        parameters
            .into_iter()
            .enumerate()
            .filter(|(index, _)| after.is_none_or(|first| *index > first))
            .filter(|(_, name)| self.has_parameter(name))
            .map(|(index, _)| index)
            .collect()
    }
}
