//! Loadshape Control
//!
//! Session state and synchronization for load shape configuration:
//!
//! - [`DraftState`]: the editable, session-local copy of the remote
//!   configuration (active shape, typed parameter values, noise level)
//! - [`ConfigSynchronizer`]: the load → edit → apply → restart cycle
//! - [`ConfigService`]: the collaborator seam to the external
//!   configuration store, with [`HttpConfigService`] as the production
//!   implementation
//!
//! # Example
//!
//! ```rust,ignore
//! use loadshape_control::{ConfigSynchronizer, HttpConfigService};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let service = HttpConfigService::new("http://localhost:8080")?;
//! let sync = ConfigSynchronizer::new(service);
//!
//! sync.load().await?;
//! sync.select_shape("spike").await?;
//! sync.apply().await?; // remote restarts, reload follows after a delay
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod draft;
pub mod error;
pub mod http;
pub mod service;
pub mod sync;

// Re-exports for convenience
pub use draft::{DraftState, FALLBACK_SHAPE, NOISE_PERCENT_KEY, SHAPE_TYPE_KEY};
pub use error::{ServiceError, SyncError};
pub use http::HttpConfigService;
pub use service::{ConfigService, ConfigSnapshot};
pub use sync::{ConfigSynchronizer, SessionPhase, SyncSettings, DEFAULT_RELOAD_DELAY};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
