//! Error types for the schema crate

/// Schema construction and validation errors
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// Two parameters of one shape share a name
    #[error("shape '{shape}' declares parameter '{name}' more than once")]
    DuplicateParameter {
        /// Shape key
        shape: String,
        /// Offending parameter name
        name: String,
    },

    /// A declared default does not match the declared parameter type
    #[error("shape '{shape}' parameter '{name}' default does not match its declared type")]
    DefaultTypeMismatch {
        /// Shape key
        shape: String,
        /// Offending parameter name
        name: String,
    },

    /// Two shapes share a key
    #[error("shape '{key}' is declared more than once")]
    DuplicateShape {
        /// Offending key
        key: String,
    },

    /// Catalog lookup for a key that is not present
    #[error("unknown shape '{key}'")]
    UnknownShape {
        /// Requested key
        key: String,
    },

    /// A stage plan must always hold at least one stage
    #[error("stage plan must contain at least one stage")]
    EmptyStagePlan,
}

/// Flat-config decode errors
///
/// Encoding is total; decoding is the only partial direction. All three
/// parameter types fail the same way: with a typed error naming the key
/// and the raw text that did not parse.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// Integer parameter did not parse as base-10
    #[error("parameter '{name}': '{raw}' is not an integer")]
    InvalidInt {
        /// Parameter name (flat-config key)
        name: String,
        /// Raw string value
        raw: String,
    },

    /// Float parameter did not parse
    #[error("parameter '{name}': '{raw}' is not a number")]
    InvalidFloat {
        /// Parameter name (flat-config key)
        name: String,
        /// Raw string value
        raw: String,
    },

    /// JSON parameter did not parse as JSON
    #[error("parameter '{name}': value is not valid JSON: {source}")]
    InvalidJson {
        /// Parameter name (flat-config key)
        name: String,
        /// Underlying parse error
        source: serde_json::Error,
    },

    /// A structured value did not match the expected stage layout
    #[error("stage list is malformed: {source}")]
    InvalidStages {
        /// Underlying parse error
        source: serde_json::Error,
    },

    /// A stage list was decoded from a non-structured value
    #[error("stage list must be a structured JSON value")]
    StagesNotJson,

    /// A stage list decoded to zero stages
    #[error("stage list must contain at least one stage")]
    EmptyStages,

    /// A raw stage field edit did not parse
    #[error("stage field {field:?}: '{raw}' does not parse")]
    InvalidStageField {
        /// Field being edited
        field: crate::stages::StageField,
        /// Raw string value
        raw: String,
    },
}

impl DecodeError {
    /// Parameter name the failure belongs to, when there is one
    #[must_use]
    pub fn parameter(&self) -> Option<&str> {
        match self {
            Self::InvalidInt { name, .. }
            | Self::InvalidFloat { name, .. }
            | Self::InvalidJson { name, .. } => Some(name),
            Self::InvalidStages { .. }
            | Self::StagesNotJson
            | Self::EmptyStages
            | Self::InvalidStageField { .. } => None,
        }
    }
}
