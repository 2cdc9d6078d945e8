//! Shape catalog
//!
//! The [`SchemaCatalog`] maps shape keys to their definitions. It is
//! loaded once per session (from the remote schema service) and read-only
//! afterward; all validation happens at construction so lookups never
//! fail structurally.

use crate::definition::{ParamType, ParameterDefinition, ShapeDefinition};
use crate::error::SchemaError;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use serde_json::json;

/// Immutable-for-the-session mapping from shape key to definition
///
/// Keys are case-sensitive; iteration order is the order shapes were
/// declared in, which is also display order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SchemaCatalog {
    shapes: IndexMap<String, ShapeDefinition>,
}

impl SchemaCatalog {
    /// Build a catalog from already-keyed shape definitions
    ///
    /// # Errors
    /// - [`SchemaError::DuplicateShape`] if two definitions share a key
    /// - [`SchemaError::DuplicateParameter`] /
    ///   [`SchemaError::DefaultTypeMismatch`] from per-shape validation
    pub fn from_shapes(
        shapes: impl IntoIterator<Item = ShapeDefinition>,
    ) -> Result<Self, SchemaError> {
        let mut map = IndexMap::new();
        for mut shape in shapes {
            shape.validate()?;
            let key = shape.key.clone();
            if map.insert(key.clone(), shape).is_some() {
                return Err(SchemaError::DuplicateShape { key });
            }
        }
        Ok(Self { shapes: map })
    }

    /// Build a catalog from the wire form: a key-to-definition map
    ///
    /// The remote service keeps the key outside the definition body; it is
    /// copied in here so a [`ShapeDefinition`] is self-describing.
    ///
    /// # Errors
    /// Same as [`SchemaCatalog::from_shapes`] (duplicate keys cannot occur
    /// in a map).
    pub fn from_wire(shapes: IndexMap<String, ShapeDefinition>) -> Result<Self, SchemaError> {
        Self::from_shapes(shapes.into_iter().map(|(key, mut shape)| {
            shape.key = key;
            shape
        }))
    }

    /// Look up a shape
    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ShapeDefinition> {
        self.shapes.get(key)
    }

    /// Look up a shape, erroring on a missing key
    ///
    /// # Errors
    /// [`SchemaError::UnknownShape`]
    pub fn require(&self, key: &str) -> Result<&ShapeDefinition, SchemaError> {
        self.get(key).ok_or_else(|| SchemaError::UnknownShape {
            key: key.to_string(),
        })
    }

    /// Whether a key is present
    #[inline]
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.shapes.contains_key(key)
    }

    /// Shape keys in declaration order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.shapes.keys().map(String::as_str)
    }

    /// Key/definition pairs in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ShapeDefinition)> {
        self.shapes.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// First shape key, if any (used as a last-resort fallback)
    #[must_use]
    pub fn first_key(&self) -> Option<&str> {
        self.shapes.keys().next().map(String::as_str)
    }

    /// Number of shapes
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    /// Whether the catalog holds no shapes
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// The built-in catalog of the five production shapes
    ///
    /// Mirrors the schema the controller service publishes; used as an
    /// offline reference and as a test fixture.
    #[must_use]
    pub fn builtin() -> &'static SchemaCatalog {
        &BUILTIN
    }
}

static BUILTIN: Lazy<SchemaCatalog> = Lazy::new(|| {
    SchemaCatalog::from_shapes([
        cyclic_shape(),
        stages_shape(),
        spike_shape(),
        sinusoidal_shape(),
        step_shape(),
    ])
    .expect("builtin shape catalog is valid")
});

fn cyclic_shape() -> ShapeDefinition {
    ShapeDefinition::new(
        "cyclic",
        "Cyclic Ramp (Triangular)",
        "Linear ramp up and down between min/max users with configurable plateaus",
    )
    .with_parameter(
        ParameterDefinition::new("SHAPE_RAMP_MIN_USERS", ParamType::Int, 10)
            .with_min(0.0)
            .with_label("Minimum Users"),
    )
    .with_parameter(
        ParameterDefinition::new("SHAPE_RAMP_MAX_USERS", ParamType::Int, 100)
            .with_min(1.0)
            .with_label("Maximum Users"),
    )
    .with_parameter(
        ParameterDefinition::new("SHAPE_RAMP_SPAWN_RATE", ParamType::Float, 5.0)
            .with_min(0.01)
            .with_step(0.01)
            .with_label("Spawn Rate (users/sec)"),
    )
    .with_parameter(
        ParameterDefinition::new("SHAPE_RAMP_HOLD_MAX_SEC", ParamType::Int, 0)
            .with_min(0.0)
            .with_label("Hold at Max (seconds)"),
    )
    .with_parameter(
        ParameterDefinition::new("SHAPE_RAMP_HOLD_MIN_SEC", ParamType::Int, 0)
            .with_min(0.0)
            .with_label("Hold at Min (seconds)"),
    )
    .with_parameter(
        ParameterDefinition::new("SHAPE_RAMP_DURATION_SEC", ParamType::Int, 0)
            .with_min(0.0)
            .with_label("Total Duration (0=infinite)"),
    )
}

fn stages_shape() -> ShapeDefinition {
    ShapeDefinition::new(
        "stages",
        "Stages (K6-style)",
        "Pre-defined stages with specific user counts, durations, and spawn rates",
    )
    .with_parameter(
        ParameterDefinition::new(
            "STAGES_JSON",
            ParamType::Json,
            json!([
                {"duration": 60, "users": 10, "spawn_rate": 10},
                {"duration": 120, "users": 50, "spawn_rate": 10},
                {"duration": 180, "users": 100, "spawn_rate": 10},
                {"duration": 240, "users": 30, "spawn_rate": 10}
            ]),
        )
        .with_label("Stages Configuration")
        .with_description("Array of stages: [{duration, users, spawn_rate}, ...]"),
    )
}

fn spike_shape() -> ShapeDefinition {
    ShapeDefinition::new(
        "spike",
        "Spike Testing",
        "Sudden dramatic increase in users, then back to baseline",
    )
    .with_parameter(
        ParameterDefinition::new("SPIKE_NORMAL_USERS", ParamType::Int, 10)
            .with_min(0.0)
            .with_label("Normal Users (baseline)"),
    )
    .with_parameter(
        ParameterDefinition::new("SPIKE_MAX_USERS", ParamType::Int, 100)
            .with_min(1.0)
            .with_label("Spike Users (peak)"),
    )
    .with_parameter(
        ParameterDefinition::new("SPIKE_START_SEC", ParamType::Int, 180)
            .with_min(0.0)
            .with_label("Spike Start (seconds)"),
    )
    .with_parameter(
        ParameterDefinition::new("SPIKE_DURATION_SEC", ParamType::Int, 60)
            .with_min(1.0)
            .with_label("Spike Duration (seconds)"),
    )
    .with_parameter(
        ParameterDefinition::new("SPIKE_TOTAL_DURATION_SEC", ParamType::Int, 600)
            .with_min(0.0)
            .with_label("Total Duration (0=infinite)"),
    )
}

fn sinusoidal_shape() -> ShapeDefinition {
    ShapeDefinition::new(
        "sinusoidal",
        "Sinusoidal Wave",
        "Smooth sinusoidal oscillation for realistic traffic variations",
    )
    .with_parameter(
        ParameterDefinition::new("SINE_MIN_USERS", ParamType::Int, 10)
            .with_min(0.0)
            .with_label("Minimum Users"),
    )
    .with_parameter(
        ParameterDefinition::new("SINE_MAX_USERS", ParamType::Int, 100)
            .with_min(1.0)
            .with_label("Maximum Users"),
    )
    .with_parameter(
        ParameterDefinition::new("SINE_PERIOD_SEC", ParamType::Int, 300)
            .with_min(1.0)
            .with_label("Period (seconds)"),
    )
    .with_parameter(
        ParameterDefinition::new("SINE_PHASE_OFFSET", ParamType::Float, 0.0)
            .with_step(0.1)
            .with_label("Phase Offset (radians)"),
    )
    .with_parameter(
        ParameterDefinition::new("SINE_DURATION_SEC", ParamType::Int, 0)
            .with_min(0.0)
            .with_label("Total Duration (0=infinite)"),
    )
}

fn step_shape() -> ShapeDefinition {
    ShapeDefinition::new(
        "step",
        "Step Load",
        "Gradual increase in fixed increments at regular intervals",
    )
    .with_parameter(
        ParameterDefinition::new("STEP_STARTING_USERS", ParamType::Int, 10)
            .with_min(0.0)
            .with_label("Starting Users"),
    )
    .with_parameter(
        ParameterDefinition::new("STEP_LOAD_INCREMENT", ParamType::Int, 10)
            .with_min(1.0)
            .with_label("User Increment per Step"),
    )
    .with_parameter(
        ParameterDefinition::new("STEP_TIME_SEC", ParamType::Int, 30)
            .with_min(1.0)
            .with_label("Time Between Steps (seconds)"),
    )
    .with_parameter(
        ParameterDefinition::new("STEP_MAX_USERS", ParamType::Int, 0)
            .with_min(0.0)
            .with_label("Max Users (0=no limit)"),
    )
    .with_parameter(
        ParameterDefinition::new("STEP_SPAWN_RATE", ParamType::Float, 10.0)
            .with_min(0.1)
            .with_step(0.1)
            .with_label("Spawn Rate"),
    )
    .with_parameter(
        ParameterDefinition::new("STEP_DURATION_SEC", ParamType::Int, 600)
            .with_min(0.0)
            .with_label("Total Duration (0=infinite)"),
    )
}
