//! External configuration service contract
//!
//! The synchronizer only ever talks to a [`ConfigService`]; the HTTP
//! implementation lives in [`crate::http`] and tests substitute an
//! in-memory one. Transport mechanics stay behind this seam.

use crate::error::ServiceError;
use async_trait::async_trait;
use loadshape_schema::{ConfigRecord, SchemaCatalog};
use serde::Deserialize;
use std::sync::Arc;

/// The remote configuration state, as returned by the service
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigSnapshot {
    /// The entire flat configuration record
    #[serde(default)]
    pub config: ConfigRecord,
    /// The shape key the service reports as active
    #[serde(default)]
    pub current_shape: Option<String>,
    /// Deployment the config was read from (informational)
    #[serde(default)]
    pub deployment_name: Option<String>,
    /// Namespace the deployment lives in (informational)
    #[serde(default)]
    pub namespace: Option<String>,
}

/// Collaborator interface to the external configuration store
///
/// Every call may fail with a server-side rejection, a transport failure,
/// or a local payload problem, see [`ServiceError`]. Callers surface the
/// failure and let the operator retry; implementations must not retry on
/// their own.
#[async_trait]
pub trait ConfigService: Send + Sync {
    /// Fetch the shape catalog
    async fn fetch_shapes(&self) -> Result<SchemaCatalog, ServiceError>;

    /// Fetch the current remote configuration
    async fn fetch_config(&self) -> Result<ConfigSnapshot, ServiceError>;

    /// Replace the remote configuration with a flat payload
    ///
    /// The remote side restarts the workload implicitly on success.
    async fn put_config(&self, payload: &ConfigRecord) -> Result<(), ServiceError>;

    /// Restart the workload without touching configuration
    async fn restart(&self) -> Result<(), ServiceError>;
}

/// Shared handles delegate, so a caller can keep one and hand another to
/// the synchronizer
#[async_trait]
impl<S: ConfigService + ?Sized> ConfigService for Arc<S> {
    async fn fetch_shapes(&self) -> Result<SchemaCatalog, ServiceError> {
        (**self).fetch_shapes().await
    }

    async fn fetch_config(&self) -> Result<ConfigSnapshot, ServiceError> {
        (**self).fetch_config().await
    }

    async fn put_config(&self, payload: &ConfigRecord) -> Result<(), ServiceError> {
        (**self).put_config(payload).await
    }

    async fn restart(&self) -> Result<(), ServiceError> {
        (**self).restart().await
    }
}
