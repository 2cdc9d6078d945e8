//! Loadshape Schema
//!
//! Schema-driven parameter model for load shape configuration.
//!
//! # Core Concepts
//!
//! - [`SchemaCatalog`]: shape key to [`ShapeDefinition`] mapping, loaded
//!   once per session and read-only afterward
//! - [`ParameterDefinition`]: one named, typed, defaulted parameter
//! - [`ParamValue`]: tagged union of the three parameter types
//! - [`codec`]: conversion between typed values and the flat
//!   string-keyed [`ConfigRecord`]
//! - [`StagePlan`]: pure editor model for the staged load pattern
//!
//! # Example
//!
//! ```rust
//! use loadshape_schema::{codec, SchemaCatalog};
//!
//! let catalog = SchemaCatalog::builtin();
//! let shape = catalog.require("sinusoidal")?;
//! let record = loadshape_schema::ConfigRecord::new();
//!
//! // Absent keys decode to the declared defaults.
//! let period = codec::decode(&record, shape.parameter("SINE_PERIOD_SEC").unwrap())?;
//! assert_eq!(period.as_i64(), Some(300));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod catalog;
pub mod codec;
pub mod definition;
pub mod error;
pub mod stages;
pub mod value;

// Re-exports for convenience
pub use catalog::SchemaCatalog;
pub use codec::ConfigRecord;
pub use definition::{ParamType, ParameterDefinition, ShapeDefinition};
pub use error::{DecodeError, SchemaError};
pub use stages::{Stage, StageField, StagePlan};
pub use value::ParamValue;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
