//! Configuration synchronizer
//!
//! Orchestrates the full load → edit → apply → restart cycle against the
//! external configuration service. One synchronizer owns one session:
//! the catalog, the draft, and the phase machine live behind a single
//! async mutex, and at most one remote operation is meant to be in
//! flight at a time (re-entrant triggering is the caller's job to
//! prevent; a generation counter makes stale responses harmless either
//! way).

use crate::draft::DraftState;
use crate::error::SyncError;
use crate::service::{ConfigService, ConfigSnapshot};
use loadshape_schema::{ParamValue, SchemaCatalog};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Wait between a successful apply and the reconciling reload
///
/// The service exposes no restart-complete signal, so the synchronizer
/// re-reads remote state after a heuristic delay.
pub const DEFAULT_RELOAD_DELAY: Duration = Duration::from_secs(3);

/// Session lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// Fetching schema and configuration; no usable draft yet
    #[default]
    Loading,
    /// Draft available and editable
    Ready,
    /// A submit is in flight
    Applying,
}

/// Tunables for the synchronizer
#[derive(Debug, Clone)]
pub struct SyncSettings {
    /// Delay before the post-apply reload
    pub reload_delay: Duration,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            reload_delay: DEFAULT_RELOAD_DELAY,
        }
    }
}

#[derive(Default)]
struct SessionState {
    phase: SessionPhase,
    catalog: Option<SchemaCatalog>,
    snapshot: Option<ConfigSnapshot>,
    draft: Option<DraftState>,
}

/// Orchestrator for one configuration session
///
/// Cheap to clone; clones share the same session state.
#[derive(Clone)]
pub struct ConfigSynchronizer {
    service: Arc<dyn ConfigService>,
    settings: SyncSettings,
    state: Arc<Mutex<SessionState>>,
    generation: Arc<AtomicU64>,
}

impl fmt::Debug for ConfigSynchronizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigSynchronizer")
            .field("settings", &self.settings)
            .field("generation", &self.generation.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl ConfigSynchronizer {
    /// Create a synchronizer with default settings
    #[must_use]
    pub fn new(service: impl ConfigService + 'static) -> Self {
        Self::with_settings(service, SyncSettings::default())
    }

    /// Create a synchronizer with explicit settings
    #[must_use]
    pub fn with_settings(service: impl ConfigService + 'static, settings: SyncSettings) -> Self {
        Self {
            service: Arc::new(service),
            settings,
            state: Arc::new(Mutex::new(SessionState::default())),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Load (or reload) the shape catalog and remote configuration
    ///
    /// On success the session enters `Ready` with a freshly decoded
    /// draft. On failure any previously loaded session data stays usable
    /// and the caller may retry; nothing retries automatically.
    ///
    /// # Errors
    /// [`SyncError::SchemaLoad`], [`SyncError::EmptyCatalog`] or
    /// [`SyncError::ConfigLoad`].
    pub async fn load(&self) -> Result<(), SyncError> {
        let generation = self.next_generation();
        self.state.lock().await.phase = SessionPhase::Loading;

        let result = self.load_generation(generation).await;
        if result.is_err() {
            let mut state = self.state.lock().await;
            state.phase = if state.draft.is_some() {
                SessionPhase::Ready
            } else {
                SessionPhase::Loading
            };
        }
        result
    }

    async fn load_generation(&self, generation: u64) -> Result<(), SyncError> {
        tracing::info!("loading shape catalog and configuration");
        let catalog = self
            .service
            .fetch_shapes()
            .await
            .map_err(SyncError::SchemaLoad)?;
        if catalog.is_empty() {
            return Err(SyncError::EmptyCatalog);
        }
        let snapshot = self
            .service
            .fetch_config()
            .await
            .map_err(SyncError::ConfigLoad)?;
        let draft = DraftState::from_snapshot(&catalog, &snapshot)?;

        let mut state = self.state.lock().await;
        if self.generation.load(Ordering::SeqCst) != generation {
            tracing::debug!(generation, "discarding stale load response");
            return Ok(());
        }
        tracing::info!(shape = %draft.active_shape(), shapes = catalog.len(), "configuration loaded");
        state.catalog = Some(catalog);
        state.snapshot = Some(snapshot);
        state.draft = Some(draft);
        state.phase = SessionPhase::Ready;
        Ok(())
    }

    /// Submit the draft and let the remote restart the workload
    ///
    /// Builds the full flat payload (`LOAD_SHAPE_TYPE`, `NOISE_PERCENT`,
    /// one entry per active-shape parameter), submits it, and schedules a
    /// fixed-delay reload to reconcile with whatever the restart
    /// produced. On failure the draft is preserved unchanged so edits are
    /// not lost.
    ///
    /// # Errors
    /// [`SyncError::NotLoaded`] before a successful load,
    /// [`SyncError::Apply`] on submit failure.
    pub async fn apply(&self) -> Result<(), SyncError> {
        let (payload, generation) = {
            let mut guard = self.state.lock().await;
            let state = &mut *guard;
            let (Some(catalog), Some(draft)) = (&state.catalog, &state.draft) else {
                return Err(SyncError::NotLoaded);
            };
            let shape = catalog.require(draft.active_shape())?;
            let payload = draft.to_payload(shape);
            state.phase = SessionPhase::Applying;
            (payload, self.next_generation())
        };

        tracing::info!(entries = payload.len(), "submitting configuration");
        match self.service.put_config(&payload).await {
            Ok(()) => {
                self.state.lock().await.phase = SessionPhase::Ready;
                tracing::info!(
                    delay_secs = self.settings.reload_delay.as_secs_f64(),
                    "configuration applied, workload restarting"
                );
                self.schedule_reload(generation);
                Ok(())
            }
            Err(err) => {
                self.state.lock().await.phase = SessionPhase::Ready;
                tracing::error!(%err, "apply failed, draft preserved");
                Err(SyncError::Apply(err))
            }
        }
    }

    /// Restart the workload without touching configuration
    ///
    /// Does not change the draft or the session phase and does not
    /// trigger a reload.
    ///
    /// # Errors
    /// [`SyncError::Restart`].
    pub async fn restart_only(&self) -> Result<(), SyncError> {
        tracing::info!("requesting restart without configuration change");
        self.service.restart().await.map_err(SyncError::Restart)
    }

    /// Switch the active shape, resetting all parameters to its defaults
    ///
    /// # Errors
    /// [`SyncError::NotLoaded`] before a load;
    /// [`SyncError::Schema`] (unknown shape) for a key outside the
    /// catalog.
    pub async fn select_shape(&self, key: &str) -> Result<(), SyncError> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        let (Some(catalog), Some(draft)) = (&state.catalog, &mut state.draft) else {
            return Err(SyncError::NotLoaded);
        };
        catalog.require(key)?;
        draft.select_shape(catalog, key);
        Ok(())
    }

    /// Replace one draft parameter value
    ///
    /// # Errors
    /// [`SyncError::NotLoaded`] or [`SyncError::UnknownParameter`].
    pub async fn set_parameter(&self, name: &str, value: ParamValue) -> Result<(), SyncError> {
        let mut state = self.state.lock().await;
        let Some(draft) = &mut state.draft else {
            return Err(SyncError::NotLoaded);
        };
        draft.set_parameter(name, value)
    }

    /// Set the draft noise percentage
    ///
    /// # Errors
    /// [`SyncError::NotLoaded`].
    pub async fn set_noise_percent(&self, noise_percent: f64) -> Result<(), SyncError> {
        let mut state = self.state.lock().await;
        let Some(draft) = &mut state.draft else {
            return Err(SyncError::NotLoaded);
        };
        draft.set_noise_percent(noise_percent);
        Ok(())
    }

    /// Current session phase
    pub async fn phase(&self) -> SessionPhase {
        self.state.lock().await.phase
    }

    /// A copy of the loaded catalog, if any
    pub async fn catalog(&self) -> Option<SchemaCatalog> {
        self.state.lock().await.catalog.clone()
    }

    /// A copy of the current draft, if any
    pub async fn draft(&self) -> Option<DraftState> {
        self.state.lock().await.draft.clone()
    }

    /// A copy of the last remote snapshot, if any
    pub async fn snapshot(&self) -> Option<ConfigSnapshot> {
        self.state.lock().await.snapshot.clone()
    }

    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn schedule_reload(&self, generation: u64) {
        let sync = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(sync.settings.reload_delay).await;
            if sync.generation.load(Ordering::SeqCst) != generation {
                tracing::debug!(generation, "skipping reload, superseded by a newer operation");
                return;
            }
            if let Err(err) = sync.load().await {
                tracing::warn!(%err, "post-apply reload failed");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_phase_is_loading() {
        assert_eq!(SessionPhase::default(), SessionPhase::Loading);
    }

    #[test]
    fn default_settings_use_the_fixed_delay() {
        assert_eq!(SyncSettings::default().reload_delay, DEFAULT_RELOAD_DELAY);
    }
}
