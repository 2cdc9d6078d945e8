//! Shape and parameter definitions
//!
//! A [`ShapeDefinition`] is the declarative description of one load
//! pattern: its identity, presentation strings, and an ordered list of
//! [`ParameterDefinition`]s. Definitions arrive from the remote schema
//! service as JSON and are validated once when the catalog is built.

use crate::error::SchemaError;
use crate::value::ParamValue;
use serde::{Deserialize, Serialize};

/// Declared type of a parameter
///
/// Drives codec dispatch; the wire form is the lowercase string the
/// schema service emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    /// Base-10 integer
    Int,
    /// Floating point number
    Float,
    /// Structured JSON value
    Json,
}

/// One declared parameter of a shape
///
/// `name` doubles as the flat-config key. `label`, `description`, `help`
/// and `unit` are presentation metadata; `min`/`max`/`step` are advisory
/// bounds, carried but not enforced by the codec.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDefinition {
    /// Unique name within the shape, and the flat-config key
    pub name: String,
    /// Declared type
    #[serde(rename = "type")]
    pub ty: ParamType,
    /// Default value, used when the flat config lacks the key
    pub default: ParamValue,
    /// Short display label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Longer description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Help text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    /// Unit suffix, e.g. "users/sec"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Advisory lower bound
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Advisory upper bound
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Advisory step granularity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
}

impl ParameterDefinition {
    /// Create a new parameter definition
    #[must_use]
    pub fn new(name: impl Into<String>, ty: ParamType, default: impl Into<ParamValue>) -> Self {
        Self {
            name: name.into(),
            ty,
            default: default.into(),
            label: None,
            description: None,
            help: None,
            unit: None,
            min: None,
            max: None,
            step: None,
        }
    }

    /// With display label
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// With description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// With advisory minimum
    #[must_use]
    pub fn with_min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    /// With advisory maximum
    #[must_use]
    pub fn with_max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    /// With advisory step
    #[must_use]
    pub fn with_step(mut self, step: f64) -> Self {
        self.step = Some(step);
        self
    }

    /// Whether the declared default agrees with the declared type
    ///
    /// `Int` defaults for `Float` parameters are tolerated; the catalog
    /// normalizes them on construction (the remote schema writes `10`
    /// where it means `10.0`).
    #[must_use]
    pub fn default_matches_type(&self) -> bool {
        matches!(
            (self.ty, &self.default),
            (ParamType::Int, ParamValue::Int(_))
                | (ParamType::Float, ParamValue::Float(_) | ParamValue::Int(_))
                | (ParamType::Json, ParamValue::Json(_))
        )
    }

    /// Normalize the default into the declared type's variant
    pub(crate) fn normalize_default(&mut self) {
        if self.ty == ParamType::Float {
            if let ParamValue::Int(i) = self.default {
                self.default = ParamValue::Float(i as f64);
            }
        }
    }
}

/// One named load pattern and its parameter schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeDefinition {
    /// Shape identifier (case-sensitive)
    ///
    /// On the wire the key lives outside the definition (the catalog is a
    /// key-to-definition map), so it defaults empty here and is filled in
    /// when the catalog is assembled.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub key: String,
    /// Display name
    pub name: String,
    /// Display description
    pub description: String,
    /// Ordered parameter list (order is display order)
    pub parameters: Vec<ParameterDefinition>,
}

impl ShapeDefinition {
    /// Create a new shape definition with no parameters
    #[must_use]
    pub fn new(
        key: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            description: description.into(),
            parameters: Vec::new(),
        }
    }

    /// Append a parameter (declaration order is preserved)
    #[must_use]
    pub fn with_parameter(mut self, parameter: ParameterDefinition) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Look up a parameter by name
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&ParameterDefinition> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Validate the definition and normalize defaults
    ///
    /// Rejects duplicate parameter names and defaults that do not match
    /// their declared type.
    pub(crate) fn validate(&mut self) -> Result<(), SchemaError> {
        for i in 0..self.parameters.len() {
            let name = &self.parameters[i].name;
            if self.parameters[..i].iter().any(|p| &p.name == name) {
                return Err(SchemaError::DuplicateParameter {
                    shape: self.key.clone(),
                    name: name.clone(),
                });
            }
            if !self.parameters[i].default_matches_type() {
                return Err(SchemaError::DefaultTypeMismatch {
                    shape: self.key.clone(),
                    name: name.clone(),
                });
            }
        }
        for parameter in &mut self.parameters {
            parameter.normalize_default();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_remote_schema_json() {
        let raw = r#"{
            "name": "Sinusoidal Wave",
            "description": "Smooth sinusoidal oscillation",
            "parameters": [
                {"name": "SINE_PERIOD_SEC", "type": "int", "default": 300, "min": 1, "label": "Period (seconds)"},
                {"name": "SINE_PHASE_OFFSET", "type": "float", "default": 0, "step": 0.1}
            ]
        }"#;

        let shape: ShapeDefinition = serde_json::from_str(raw).unwrap();
        assert_eq!(shape.parameters.len(), 2);

        let period = shape.parameter("SINE_PERIOD_SEC").unwrap();
        assert_eq!(period.ty, ParamType::Int);
        assert_eq!(period.default, ParamValue::Int(300));
        assert_eq!(period.min, Some(1.0));
        assert_eq!(period.label.as_deref(), Some("Period (seconds)"));
    }

    #[test]
    fn validate_rejects_duplicate_names() {
        let mut shape = ShapeDefinition::new("s", "S", "")
            .with_parameter(ParameterDefinition::new("A", ParamType::Int, 1))
            .with_parameter(ParameterDefinition::new("A", ParamType::Int, 2));

        assert!(matches!(
            shape.validate(),
            Err(SchemaError::DuplicateParameter { .. })
        ));
    }

    #[test]
    fn validate_rejects_mismatched_default() {
        let mut shape = ShapeDefinition::new("s", "S", "").with_parameter(
            ParameterDefinition::new("A", ParamType::Json, 1),
        );

        assert!(matches!(
            shape.validate(),
            Err(SchemaError::DefaultTypeMismatch { .. })
        ));
    }

    #[test]
    fn validate_widens_int_default_for_float_parameter() {
        // The remote metadata writes `"default": 10` for float parameters.
        let mut shape = ShapeDefinition::new("s", "S", "").with_parameter(
            ParameterDefinition::new("RATE", ParamType::Float, 10),
        );

        shape.validate().unwrap();
        assert_eq!(
            shape.parameter("RATE").unwrap().default,
            ParamValue::Float(10.0)
        );
    }

    #[test]
    fn parameter_order_is_declaration_order() {
        let shape = ShapeDefinition::new("s", "S", "")
            .with_parameter(ParameterDefinition::new("Z", ParamType::Int, 0))
            .with_parameter(ParameterDefinition::new("A", ParamType::Int, 0));

        let names: Vec<_> = shape.parameters.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Z", "A"]);
    }
}
