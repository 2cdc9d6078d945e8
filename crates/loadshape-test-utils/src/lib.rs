//! Testing utilities for the loadshape workspace
//!
//! Shared fixtures and an in-memory configuration service with failure
//! injection.

#![allow(missing_docs)]

use async_trait::async_trait;
use loadshape_control::{ConfigService, ConfigSnapshot, ServiceError, SHAPE_TYPE_KEY};
use loadshape_schema::{
    ConfigRecord, ParamType, ParameterDefinition, SchemaCatalog, ShapeDefinition,
};
use serde_json::json;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

/// A small two-shape catalog used across the workspace's tests
pub fn fixture_catalog() -> SchemaCatalog {
    SchemaCatalog::from_shapes([
        ShapeDefinition::new("cyclic", "Cyclic Ramp", "Linear ramp up and down")
            .with_parameter(ParameterDefinition::new("period", ParamType::Int, 300))
            .with_parameter(ParameterDefinition::new("rate", ParamType::Float, 5.0)),
        ShapeDefinition::new("stages", "Stages", "Pre-defined stages").with_parameter(
            ParameterDefinition::new(
                "STAGES_JSON",
                ParamType::Json,
                json!([{"duration": 60, "users": 10, "spawn_rate": 10}]),
            ),
        ),
    ])
    .expect("fixture catalog is valid")
}

pub fn record(pairs: &[(&str, &str)]) -> ConfigRecord {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// In-memory configuration service
///
/// Holds a catalog and a flat record, counts every call, and can be told
/// to fail any of the four operations with an injected server error.
pub struct InMemoryConfigService {
    catalog: SchemaCatalog,
    record: Mutex<ConfigRecord>,
    fail_shapes: AtomicBool,
    fail_config: AtomicBool,
    fail_put: AtomicBool,
    fail_restart: AtomicBool,
    shape_fetches: AtomicUsize,
    config_fetches: AtomicUsize,
    puts: AtomicUsize,
    restarts: AtomicUsize,
}

impl InMemoryConfigService {
    pub fn new(catalog: SchemaCatalog) -> Self {
        Self::with_record(catalog, ConfigRecord::new())
    }

    pub fn with_record(catalog: SchemaCatalog, record: ConfigRecord) -> Self {
        Self {
            catalog,
            record: Mutex::new(record),
            fail_shapes: AtomicBool::new(false),
            fail_config: AtomicBool::new(false),
            fail_put: AtomicBool::new(false),
            fail_restart: AtomicBool::new(false),
            shape_fetches: AtomicUsize::new(0),
            config_fetches: AtomicUsize::new(0),
            puts: AtomicUsize::new(0),
            restarts: AtomicUsize::new(0),
        }
    }

    pub fn set_fail_shapes(&self, fail: bool) {
        self.fail_shapes.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_config(&self, fail: bool) {
        self.fail_config.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_put(&self, fail: bool) {
        self.fail_put.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_restart(&self, fail: bool) {
        self.fail_restart.store(fail, Ordering::SeqCst);
    }

    /// The record as the remote currently holds it
    pub fn stored_record(&self) -> ConfigRecord {
        self.record.lock().expect("record lock").clone()
    }

    pub fn shape_fetches(&self) -> usize {
        self.shape_fetches.load(Ordering::SeqCst)
    }

    pub fn config_fetches(&self) -> usize {
        self.config_fetches.load(Ordering::SeqCst)
    }

    pub fn puts(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub fn restarts(&self) -> usize {
        self.restarts.load(Ordering::SeqCst)
    }

    fn injected_failure(&self, operation: &str) -> ServiceError {
        ServiceError::Server {
            status: 500,
            message: format!("injected {operation} failure"),
        }
    }
}

#[async_trait]
impl ConfigService for InMemoryConfigService {
    async fn fetch_shapes(&self) -> Result<SchemaCatalog, ServiceError> {
        self.shape_fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail_shapes.load(Ordering::SeqCst) {
            return Err(self.injected_failure("shapes"));
        }
        Ok(self.catalog.clone())
    }

    async fn fetch_config(&self) -> Result<ConfigSnapshot, ServiceError> {
        self.config_fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail_config.load(Ordering::SeqCst) {
            return Err(self.injected_failure("config"));
        }
        let record = self.stored_record();
        Ok(ConfigSnapshot {
            current_shape: record.get(SHAPE_TYPE_KEY).cloned(),
            config: record,
            deployment_name: Some("loadgenerator".to_string()),
            namespace: Some("default".to_string()),
        })
    }

    async fn put_config(&self, payload: &ConfigRecord) -> Result<(), ServiceError> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        if self.fail_put.load(Ordering::SeqCst) {
            return Err(self.injected_failure("put"));
        }
        let mut record = self.record.lock().expect("record lock");
        for (key, value) in payload {
            record.insert(key.clone(), value.clone());
        }
        Ok(())
    }

    async fn restart(&self) -> Result<(), ServiceError> {
        self.restarts.fetch_add(1, Ordering::SeqCst);
        if self.fail_restart.load(Ordering::SeqCst) {
            return Err(self.injected_failure("restart"));
        }
        Ok(())
    }
}
