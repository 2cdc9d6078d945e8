//! Session draft state
//!
//! The draft is the one mutable piece of the session: the active shape
//! key, a typed value for every parameter of that shape, and the global
//! noise percentage. It is owned by the synchronizer, mutated only
//! through the methods here, and discarded when the session ends; the
//! flat remote record stays the system of record.

use crate::error::SyncError;
use crate::service::ConfigSnapshot;
use indexmap::IndexMap;
use loadshape_schema::{codec, ConfigRecord, ParamValue, SchemaCatalog, ShapeDefinition};

/// Non-parameter config key holding the active shape
pub const SHAPE_TYPE_KEY: &str = "LOAD_SHAPE_TYPE";
/// Non-parameter config key holding the noise percentage
pub const NOISE_PERCENT_KEY: &str = "NOISE_PERCENT";
/// Shape assumed when the remote record does not name one
pub const FALLBACK_SHAPE: &str = "cyclic";

/// The editable, session-local copy of the remote configuration
#[derive(Debug, Clone, PartialEq)]
pub struct DraftState {
    active_shape: String,
    values: IndexMap<String, ParamValue>,
    noise_percent: f64,
}

impl DraftState {
    /// Decode a draft out of a remote snapshot
    ///
    /// The active shape is the snapshot's `current_shape`, else the
    /// record's `LOAD_SHAPE_TYPE`, else [`FALLBACK_SHAPE`]; a key the
    /// catalog does not carry degrades the same way. Parameter values
    /// decode with the default-substituting policy, so a malformed remote
    /// value never blocks the load.
    ///
    /// # Errors
    /// [`SyncError::EmptyCatalog`] if the catalog has no shapes at all.
    pub fn from_snapshot(
        catalog: &SchemaCatalog,
        snapshot: &ConfigSnapshot,
    ) -> Result<Self, SyncError> {
        let requested = snapshot
            .current_shape
            .as_deref()
            .or_else(|| snapshot.config.get(SHAPE_TYPE_KEY).map(String::as_str))
            .unwrap_or(FALLBACK_SHAPE);

        let key = if catalog.contains(requested) {
            requested
        } else if catalog.contains(FALLBACK_SHAPE) {
            tracing::warn!(shape = %requested, "remote shape not in catalog, using fallback");
            FALLBACK_SHAPE
        } else {
            tracing::warn!(shape = %requested, "remote shape not in catalog, using first entry");
            catalog.first_key().ok_or(SyncError::EmptyCatalog)?
        };

        let shape = catalog.require(key)?;
        let values = shape
            .parameters
            .iter()
            .map(|def| (def.name.clone(), codec::decode_or_default(&snapshot.config, def)))
            .collect();

        Ok(Self {
            active_shape: key.to_string(),
            values,
            noise_percent: decode_noise(&snapshot.config),
        })
    }

    /// A draft sitting on a shape's declared defaults
    #[must_use]
    pub fn from_defaults(shape: &ShapeDefinition) -> Self {
        Self {
            active_shape: shape.key.clone(),
            values: shape
                .parameters
                .iter()
                .map(|def| (def.name.clone(), def.default.clone()))
                .collect(),
            noise_percent: 0.0,
        }
    }

    /// Switch the active shape
    ///
    /// Replaces the value map wholesale with the new shape's defaults:
    /// no merge, no carry-over, even for parameter names both shapes
    /// declare. Switching always starts from a clean slate.
    ///
    /// # Panics
    /// If `key` is not in the catalog (caller contract violation; callers
    /// are expected to offer only catalog keys).
    pub fn select_shape(&mut self, catalog: &SchemaCatalog, key: &str) {
        let Some(shape) = catalog.get(key) else {
            panic!("shape '{key}' is not in the catalog");
        };
        self.active_shape = shape.key.clone();
        self.values = shape
            .parameters
            .iter()
            .map(|def| (def.name.clone(), def.default.clone()))
            .collect();
    }

    /// Replace one parameter value
    ///
    /// # Errors
    /// [`SyncError::UnknownParameter`] if the active shape does not
    /// declare `name`; the draft never holds keys outside the schema.
    pub fn set_parameter(
        &mut self,
        name: &str,
        value: ParamValue,
    ) -> Result<(), SyncError> {
        match self.values.get_mut(name) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(SyncError::UnknownParameter {
                name: name.to_string(),
            }),
        }
    }

    /// Set the global noise percentage (advisory range 0–100)
    #[inline]
    pub fn set_noise_percent(&mut self, noise_percent: f64) {
        self.noise_percent = noise_percent;
    }

    /// Active shape key
    #[inline]
    #[must_use]
    pub fn active_shape(&self) -> &str {
        &self.active_shape
    }

    /// One parameter value
    #[inline]
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    /// All parameter values, in the shape's declaration order
    #[inline]
    #[must_use]
    pub fn values(&self) -> &IndexMap<String, ParamValue> {
        &self.values
    }

    /// Noise percentage
    #[inline]
    #[must_use]
    pub fn noise_percent(&self) -> f64 {
        self.noise_percent
    }

    /// Build the full flat payload for submission
    ///
    /// Always contains `LOAD_SHAPE_TYPE` and `NOISE_PERCENT` plus exactly
    /// one string entry per parameter of the active shape. Parameters the
    /// draft somehow lacks fall back to their declared defaults, keeping
    /// the payload total.
    #[must_use]
    pub fn to_payload(&self, shape: &ShapeDefinition) -> ConfigRecord {
        let mut payload = ConfigRecord::new();
        payload.insert(SHAPE_TYPE_KEY.to_string(), self.active_shape.clone());
        payload.insert(
            NOISE_PERCENT_KEY.to_string(),
            self.noise_percent.to_string(),
        );
        for def in &shape.parameters {
            let value = self.values.get(&def.name).unwrap_or(&def.default);
            payload.insert(def.name.clone(), value.encode());
        }
        payload
    }
}

fn decode_noise(record: &ConfigRecord) -> f64 {
    match record.get(NOISE_PERCENT_KEY) {
        None => 0.0,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(raw = %raw, "noise percent does not parse, using 0");
            0.0
        }),
    }
}
