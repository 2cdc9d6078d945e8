//! Typed parameter values
//!
//! A [`ParamValue`] is the in-session representation of one configuration
//! parameter. The remote store only speaks flat strings; the tagged union
//! here is what the editing layer works with between decode and encode.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// A typed parameter value
///
/// Untagged on the wire: schema defaults arrive as bare JSON scalars or
/// structures (`10`, `5.0`, `[{...}]`), so integers deserialize as `Int`,
/// non-integral numbers as `Float`, and anything structured as `Json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Integer parameter
    Int(i64),
    /// Floating point parameter
    Float(f64),
    /// Structured (JSON) parameter, e.g. a stage list
    Json(JsonValue),
}

impl ParamValue {
    /// Encode into the flat string form the remote store expects
    ///
    /// Total: numbers render in plain decimal form, structured values as
    /// compact JSON text.
    #[must_use]
    pub fn encode(&self) -> String {
        match self {
            Self::Int(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Json(v) => v.to_string(),
        }
    }

    /// Integer accessor
    #[inline]
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Float accessor (also accepts `Int`, which widens losslessly enough
    /// for the advisory bounds this is used with)
    #[inline]
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Structured value accessor
    #[inline]
    #[must_use]
    pub fn as_json(&self) -> Option<&JsonValue> {
        match self {
            Self::Json(v) => Some(v),
            _ => None,
        }
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<JsonValue> for ParamValue {
    fn from(value: JsonValue) -> Self {
        Self::Json(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn encode_int() {
        assert_eq!(ParamValue::Int(300).encode(), "300");
        assert_eq!(ParamValue::Int(-7).encode(), "-7");
    }

    #[test]
    fn encode_float_plain_numeric() {
        assert_eq!(ParamValue::Float(2.5).encode(), "2.5");
        // Whole floats render without a fractional part; decode as f64
        // still round-trips.
        assert_eq!(ParamValue::Float(10.0).encode(), "10");
    }

    #[test]
    fn encode_json_is_compact() {
        let v = ParamValue::Json(json!([{"duration": 60, "users": 5}]));
        assert_eq!(v.encode(), r#"[{"duration":60,"users":5}]"#);
    }

    #[test]
    fn untagged_deserialization_picks_narrowest_type() {
        let i: ParamValue = serde_json::from_str("10").unwrap();
        assert_eq!(i, ParamValue::Int(10));

        let f: ParamValue = serde_json::from_str("5.0").unwrap();
        assert_eq!(f, ParamValue::Float(5.0));

        let j: ParamValue = serde_json::from_str(r#"[{"duration": 60}]"#).unwrap();
        assert!(matches!(j, ParamValue::Json(_)));
    }

    #[test]
    fn as_f64_widens_int() {
        assert_eq!(ParamValue::Int(4).as_f64(), Some(4.0));
        assert_eq!(ParamValue::Float(4.5).as_f64(), Some(4.5));
        assert_eq!(ParamValue::Json(json!([])).as_f64(), None);
    }
}
