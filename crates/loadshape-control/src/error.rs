//! Error types for the control crate
//!
//! Every failure is recovered at the boundary of the operation that
//! caused it (load/apply/restart) and turned into a user-visible message;
//! none is fatal to the session and no operation retries on its own.

use loadshape_schema::{DecodeError, SchemaError};

/// Failure talking to the external configuration service
///
/// Distinguishes a server that answered and rejected from a server that
/// could not be reached at all.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The server responded with an error status
    #[error("server rejected request ({status}): {message}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Message from the error body, or the status text
        message: String,
    },

    /// No response was received (connection, DNS, timeout)
    #[error("could not reach server: {0}")]
    Transport(String),

    /// The request or response payload could not be built or decoded
    #[error("malformed payload: {0}")]
    Payload(String),
}

/// Session synchronization failures, by operation
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Shape catalog fetch failed; the session cannot leave Loading
    #[error("failed to load shape catalog: {0}")]
    SchemaLoad(#[source] ServiceError),

    /// The remote published a catalog with no shapes
    #[error("shape catalog is empty")]
    EmptyCatalog,

    /// Config fetch failed after the catalog loaded
    #[error("failed to load configuration: {0}")]
    ConfigLoad(#[source] ServiceError),

    /// Submit failed; the draft is preserved unchanged
    #[error("failed to apply configuration: {0}")]
    Apply(#[source] ServiceError),

    /// Restart-only request failed; nothing changed
    #[error("failed to restart load generator: {0}")]
    Restart(#[source] ServiceError),

    /// A parameter failed strict decoding
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Catalog-level violation surfaced mid-session
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// An operation that needs a loaded session ran before one completed
    #[error("no configuration loaded yet")]
    NotLoaded,

    /// A draft edit referenced a parameter the active shape does not declare
    #[error("active shape has no parameter '{name}'")]
    UnknownParameter {
        /// Requested parameter name
        name: String,
    },
}
