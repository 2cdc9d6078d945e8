//! Flat-config parameter codec
//!
//! The remote store is a flat string-to-string record; every typed value
//! crosses it through [`decode`] / [`ParamValue::encode`]. Decoding is
//! strict and uniform: any malformed value is a typed [`DecodeError`],
//! whatever the declared type. Callers that prefer graceful degradation
//! use [`decode_or_default`], which substitutes the declared default on
//! any failure.

use crate::definition::{ParamType, ParameterDefinition};
use crate::error::DecodeError;
use crate::value::ParamValue;
use indexmap::IndexMap;

/// The entire remote configuration, flat string keys to string values
///
/// Includes the two always-present non-parameter keys `LOAD_SHAPE_TYPE`
/// and `NOISE_PERCENT` alongside shape parameters.
pub type ConfigRecord = IndexMap<String, String>;

/// Decode one parameter out of a flat record
///
/// An absent key yields the declared default unchanged. A present key is
/// parsed per the declared type.
///
/// # Errors
/// [`DecodeError`] naming the parameter and the raw text, for any of the
/// three types.
pub fn decode(record: &ConfigRecord, def: &ParameterDefinition) -> Result<ParamValue, DecodeError> {
    let Some(raw) = record.get(&def.name) else {
        return Ok(def.default.clone());
    };
    decode_raw(raw, def)
}

/// Decode a raw string per a parameter's declared type
///
/// # Errors
/// [`DecodeError`] for malformed input.
pub fn decode_raw(raw: &str, def: &ParameterDefinition) -> Result<ParamValue, DecodeError> {
    match def.ty {
        ParamType::Int => raw
            .trim()
            .parse::<i64>()
            .map(ParamValue::Int)
            .map_err(|_| DecodeError::InvalidInt {
                name: def.name.clone(),
                raw: raw.to_string(),
            }),
        ParamType::Float => raw
            .trim()
            .parse::<f64>()
            .map(ParamValue::Float)
            .map_err(|_| DecodeError::InvalidFloat {
                name: def.name.clone(),
                raw: raw.to_string(),
            }),
        ParamType::Json => serde_json::from_str(raw)
            .map(ParamValue::Json)
            .map_err(|source| DecodeError::InvalidJson {
                name: def.name.clone(),
                source,
            }),
    }
}

/// Decode one parameter, substituting the declared default on failure
///
/// This is the session-load policy: a malformed remote value must not
/// block the whole configuration from loading, so it degrades to the
/// default with a logged warning.
#[must_use]
pub fn decode_or_default(record: &ConfigRecord, def: &ParameterDefinition) -> ParamValue {
    match decode(record, def) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(parameter = %def.name, %err, "falling back to declared default");
            def.default.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(pairs: &[(&str, &str)]) -> ConfigRecord {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn int_def(name: &str, default: i64) -> ParameterDefinition {
        ParameterDefinition::new(name, ParamType::Int, default)
    }

    #[test]
    fn absent_key_returns_default() {
        let def = int_def("SINE_PERIOD_SEC", 300);
        let value = decode(&record(&[]), &def).unwrap();
        assert_eq!(value, ParamValue::Int(300));
    }

    #[test]
    fn int_decodes_base_10() {
        let def = int_def("SINE_PERIOD_SEC", 300);
        let value = decode(&record(&[("SINE_PERIOD_SEC", "120")]), &def).unwrap();
        assert_eq!(value, ParamValue::Int(120));
    }

    #[test]
    fn int_rejects_garbage() {
        let def = int_def("SINE_PERIOD_SEC", 300);
        let err = decode(&record(&[("SINE_PERIOD_SEC", "abc")]), &def).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidInt { .. }));
        assert_eq!(err.parameter(), Some("SINE_PERIOD_SEC"));
    }

    #[test]
    fn float_decodes() {
        let def = ParameterDefinition::new("SPAWN", ParamType::Float, 5.0);
        let value = decode(&record(&[("SPAWN", "2.5")]), &def).unwrap();
        assert_eq!(value, ParamValue::Float(2.5));
    }

    #[test]
    fn float_rejects_garbage() {
        let def = ParameterDefinition::new("SPAWN", ParamType::Float, 5.0);
        let err = decode(&record(&[("SPAWN", "fast")]), &def).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidFloat { .. }));
    }

    #[test]
    fn json_decodes_structure() {
        let def = ParameterDefinition::new("STAGES_JSON", ParamType::Json, json!([]));
        let value = decode(
            &record(&[("STAGES_JSON", r#"[{"duration":60,"users":5,"spawn_rate":2.5}]"#)]),
            &def,
        )
        .unwrap();
        assert_eq!(
            value,
            ParamValue::Json(json!([{"duration":60,"users":5,"spawn_rate":2.5}]))
        );
    }

    #[test]
    fn json_rejects_garbage() {
        let def = ParameterDefinition::new("STAGES_JSON", ParamType::Json, json!([]));
        let err = decode(&record(&[("STAGES_JSON", "not valid json")]), &def).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidJson { .. }));
    }

    #[test]
    fn decode_or_default_falls_back_for_json() {
        let fallback = json!([{"duration": 60, "users": 10, "spawn_rate": 10}]);
        let def = ParameterDefinition::new("STAGES_JSON", ParamType::Json, fallback.clone());
        let value = decode_or_default(&record(&[("STAGES_JSON", "not valid json")]), &def);
        assert_eq!(value, ParamValue::Json(fallback));
    }

    #[test]
    fn decode_or_default_falls_back_for_numbers_too() {
        let def = int_def("SINE_PERIOD_SEC", 300);
        let value = decode_or_default(&record(&[("SINE_PERIOD_SEC", "NaNish")]), &def);
        assert_eq!(value, ParamValue::Int(300));
    }

    #[test]
    fn int_roundtrip() {
        let def = int_def("X", 0);
        let v = ParamValue::Int(-42);
        let rec = record(&[("X", &v.encode())]);
        assert_eq!(decode(&rec, &def).unwrap(), v);
    }

    #[test]
    fn float_roundtrip_whole_number() {
        let def = ParameterDefinition::new("X", ParamType::Float, 0.0);
        let v = ParamValue::Float(10.0);
        let rec = record(&[("X", &v.encode())]);
        assert_eq!(decode(&rec, &def).unwrap(), v);
    }

    #[test]
    fn json_roundtrip_preserves_element_order() {
        let def = ParameterDefinition::new("X", ParamType::Json, json!([]));
        let v = ParamValue::Json(json!([{"users": 1}, {"users": 2}, {"users": 3}]));
        let rec = record(&[("X", &v.encode())]);
        assert_eq!(decode(&rec, &def).unwrap(), v);
    }
}
