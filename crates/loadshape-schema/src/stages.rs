//! Staged load plan editing
//!
//! The `stages` shape carries its whole configuration in one `Json`
//! parameter: an ordered list of [`Stage`]s. [`StagePlan`] is the editor
//! model for that list. Every operation is pure: it returns a fresh plan
//! and never mutates its receiver, so the owning controller can detect
//! changes by comparison.

use crate::error::{DecodeError, SchemaError};
use crate::value::ParamValue;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Seconds added to the previous stage's duration when appending
pub const NEW_STAGE_STEP_SECS: u64 = 60;
/// User count for a freshly appended stage
pub const NEW_STAGE_USERS: u64 = 10;
/// Spawn rate for a freshly appended stage
pub const NEW_STAGE_SPAWN_RATE: f64 = 10.0;

/// One segment of a staged load pattern
///
/// `duration` is in whole seconds and meant to be >= 1, `spawn_rate` > 0;
/// both bounds are advisory here and enforced by input widgets, not the
/// model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    /// Stage end time in seconds from test start
    pub duration: u64,
    /// Target user count
    pub users: u64,
    /// Users spawned per second while ramping to the target
    pub spawn_rate: f64,
}

impl Stage {
    /// Create a stage
    #[inline]
    #[must_use]
    pub fn new(duration: u64, users: u64, spawn_rate: f64) -> Self {
        Self {
            duration,
            users,
            spawn_rate,
        }
    }
}

/// The editable field of a stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageField {
    /// `duration`, integer seconds
    Duration,
    /// `users`, integer count
    Users,
    /// `spawn_rate`, float
    SpawnRate,
}

/// An ordered, never-empty list of stages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StagePlan(Vec<Stage>);

impl StagePlan {
    /// Create a plan from explicit stages
    ///
    /// # Errors
    /// [`SchemaError::EmptyStagePlan`] for an empty list.
    pub fn new(stages: Vec<Stage>) -> Result<Self, SchemaError> {
        if stages.is_empty() {
            return Err(SchemaError::EmptyStagePlan);
        }
        Ok(Self(stages))
    }

    /// Decode a plan out of a `Json` parameter value
    ///
    /// # Errors
    /// - [`DecodeError::StagesNotJson`] if the value is not structured
    /// - [`DecodeError::InvalidStages`] if the structure is not a stage list
    /// - [`DecodeError::EmptyStages`] if the list has no elements
    pub fn from_value(value: &ParamValue) -> Result<Self, DecodeError> {
        let ParamValue::Json(raw) = value else {
            return Err(DecodeError::StagesNotJson);
        };
        let stages: Vec<Stage> = serde_json::from_value(raw.clone())
            .map_err(|source| DecodeError::InvalidStages { source })?;
        if stages.is_empty() {
            return Err(DecodeError::EmptyStages);
        }
        Ok(Self(stages))
    }

    /// Encode the plan back into a `Json` parameter value
    #[must_use]
    pub fn to_value(&self) -> ParamValue {
        let stages = self
            .0
            .iter()
            .map(|s| {
                json!({
                    "duration": s.duration,
                    "users": s.users,
                    "spawn_rate": s.spawn_rate,
                })
            })
            .collect();
        ParamValue::Json(serde_json::Value::Array(stages))
    }

    /// The stages, in order
    #[inline]
    #[must_use]
    pub fn stages(&self) -> &[Stage] {
        &self.0
    }

    /// Number of stages
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false for a plan built through the public constructors;
    /// present for completeness
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Append one stage
    ///
    /// The new stage ends [`NEW_STAGE_STEP_SECS`] after the last one (or
    /// at [`NEW_STAGE_STEP_SECS`] if the plan were somehow empty) and
    /// starts from the fixed user count and spawn rate.
    #[must_use]
    pub fn push_stage(&self) -> Self {
        let duration = self
            .0
            .last()
            .map_or(NEW_STAGE_STEP_SECS, |s| s.duration + NEW_STAGE_STEP_SECS);
        let mut stages = self.0.clone();
        stages.push(Stage::new(duration, NEW_STAGE_USERS, NEW_STAGE_SPAWN_RATE));
        Self(stages)
    }

    /// Remove the stage at `index`
    ///
    /// Refuses to go below one stage: with a single-element plan this is
    /// a no-op returning an equal plan, not an error.
    ///
    /// # Panics
    /// If `index` is out of range (caller contract violation).
    #[must_use]
    pub fn remove_stage(&self, index: usize) -> Self {
        assert!(index < self.0.len(), "stage index {index} out of range");
        if self.0.len() == 1 {
            return self.clone();
        }
        let mut stages = self.0.clone();
        stages.remove(index);
        Self(stages)
    }

    /// Replace one field of the stage at `index` from raw input text
    ///
    /// `spawn_rate` parses as a float, the other fields as integers.
    ///
    /// # Errors
    /// [`DecodeError::InvalidStageField`] if `raw` does not parse.
    ///
    /// # Panics
    /// If `index` is out of range (caller contract violation).
    pub fn update_field(
        &self,
        index: usize,
        field: StageField,
        raw: &str,
    ) -> Result<Self, DecodeError> {
        assert!(index < self.0.len(), "stage index {index} out of range");
        let mut stages = self.0.clone();
        let stage = &mut stages[index];
        match field {
            StageField::Duration => {
                stage.duration = parse_int_field(field, raw)?;
            }
            StageField::Users => {
                stage.users = parse_int_field(field, raw)?;
            }
            StageField::SpawnRate => {
                stage.spawn_rate =
                    raw.trim()
                        .parse::<f64>()
                        .map_err(|_| DecodeError::InvalidStageField {
                            field,
                            raw: raw.to_string(),
                        })?;
            }
        }
        Ok(Self(stages))
    }
}

impl Default for StagePlan {
    /// The single-stage plan the workload falls back to
    fn default() -> Self {
        Self(vec![Stage::new(
            NEW_STAGE_STEP_SECS,
            NEW_STAGE_USERS,
            NEW_STAGE_SPAWN_RATE,
        )])
    }
}

fn parse_int_field(field: StageField, raw: &str) -> Result<u64, DecodeError> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| DecodeError::InvalidStageField {
            field,
            raw: raw.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn plan(stages: &[(u64, u64, f64)]) -> StagePlan {
        StagePlan::new(
            stages
                .iter()
                .map(|&(d, u, r)| Stage::new(d, u, r))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn new_rejects_empty() {
        assert!(matches!(
            StagePlan::new(Vec::new()),
            Err(SchemaError::EmptyStagePlan)
        ));
    }

    #[test]
    fn push_chains_durations() {
        let plan = plan(&[(60, 10, 10.0)]);
        let grown = plan.push_stage();

        assert_eq!(
            grown.stages(),
            &[
                Stage::new(60, 10, 10.0),
                Stage::new(120, NEW_STAGE_USERS, NEW_STAGE_SPAWN_RATE),
            ]
        );
        // purity: original untouched
        assert_eq!(plan.len(), 1);
    }

    #[test]
    fn remove_refuses_below_one() {
        let plan = plan(&[(60, 5, 2.5)]);
        let after = plan.remove_stage(0);
        assert_eq!(after, plan);
    }

    #[test]
    fn remove_drops_the_indexed_stage() {
        let plan = plan(&[(60, 10, 10.0), (120, 50, 10.0), (180, 100, 10.0)]);
        let after = plan.remove_stage(1);

        let users: Vec<_> = after.stages().iter().map(|s| s.users).collect();
        assert_eq!(users, [10, 100]);
        assert_eq!(plan.len(), 3);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn remove_out_of_range_panics() {
        let _ = plan(&[(60, 10, 10.0)]).remove_stage(3);
    }

    #[test]
    fn update_spawn_rate_parses_float() {
        let plan = plan(&[(60, 10, 10.0)]);
        let after = plan.update_field(0, StageField::SpawnRate, "2.5").unwrap();
        assert_eq!(after.stages()[0].spawn_rate, 2.5);
        assert_eq!(plan.stages()[0].spawn_rate, 10.0);
    }

    #[test]
    fn update_duration_parses_integer() {
        let plan = plan(&[(60, 10, 10.0)]);
        let after = plan.update_field(0, StageField::Duration, "90").unwrap();
        assert_eq!(after.stages()[0].duration, 90);
    }

    #[test]
    fn update_rejects_unparsable_input() {
        let plan = plan(&[(60, 10, 10.0)]);
        let err = plan.update_field(0, StageField::Users, "lots").unwrap_err();
        assert!(matches!(err, DecodeError::InvalidStageField { .. }));
    }

    #[test]
    fn update_touches_only_the_named_field() {
        let plan = plan(&[(60, 10, 10.0), (120, 50, 5.0)]);
        let after = plan.update_field(1, StageField::Users, "75").unwrap();

        assert_eq!(after.stages()[1], Stage::new(120, 75, 5.0));
        assert_eq!(after.stages()[0], plan.stages()[0]);
    }

    #[test]
    fn value_roundtrip() {
        let plan = plan(&[(60, 5, 2.5), (120, 30, 10.0)]);
        let back = StagePlan::from_value(&plan.to_value()).unwrap();
        assert_eq!(back, plan);
    }

    #[test]
    fn from_value_rejects_scalars() {
        assert!(matches!(
            StagePlan::from_value(&ParamValue::Int(3)),
            Err(DecodeError::StagesNotJson)
        ));
    }

    #[test]
    fn from_value_rejects_missing_fields() {
        let value = ParamValue::Json(serde_json::json!([{"duration": 60, "users": 5}]));
        assert!(matches!(
            StagePlan::from_value(&value),
            Err(DecodeError::InvalidStages { .. })
        ));
    }

    #[test]
    fn from_value_rejects_empty_list() {
        let value = ParamValue::Json(serde_json::json!([]));
        assert!(matches!(
            StagePlan::from_value(&value),
            Err(DecodeError::EmptyStages)
        ));
    }

    #[test]
    fn default_plan_is_the_workload_fallback() {
        let plan = StagePlan::default();
        assert_eq!(plan.stages(), &[Stage::new(60, 10, 10.0)]);
    }
}
