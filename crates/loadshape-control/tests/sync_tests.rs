use loadshape_control::{
    ConfigSynchronizer, SessionPhase, SyncError, SyncSettings, NOISE_PERCENT_KEY, SHAPE_TYPE_KEY,
};
use loadshape_schema::{ParamValue, SchemaCatalog};
use loadshape_test_utils::{fixture_catalog, record, InMemoryConfigService};
use std::sync::Arc;
use std::time::Duration;

fn service_with(pairs: &[(&str, &str)]) -> Arc<InMemoryConfigService> {
    Arc::new(InMemoryConfigService::with_record(
        fixture_catalog(),
        record(pairs),
    ))
}

fn fast_settings() -> SyncSettings {
    SyncSettings {
        reload_delay: Duration::from_millis(30),
    }
}

#[tokio::test]
async fn load_decodes_remote_state() {
    let service = service_with(&[
        (SHAPE_TYPE_KEY, "stages"),
        ("STAGES_JSON", r#"[{"duration":90,"users":20,"spawn_rate":4}]"#),
        (NOISE_PERCENT_KEY, "12.5"),
    ]);
    let sync = ConfigSynchronizer::new(service.clone());

    sync.load().await.unwrap();

    assert_eq!(sync.phase().await, SessionPhase::Ready);
    let draft = sync.draft().await.unwrap();
    assert_eq!(draft.active_shape(), "stages");
    assert_eq!(draft.noise_percent(), 12.5);
    assert_eq!(
        draft.value("STAGES_JSON"),
        Some(&ParamValue::Json(
            serde_json::json!([{"duration":90,"users":20,"spawn_rate":4}])
        ))
    );
}

#[tokio::test]
async fn empty_remote_record_loads_defaults() {
    let service = service_with(&[]);
    let sync = ConfigSynchronizer::new(service);

    sync.load().await.unwrap();

    let draft = sync.draft().await.unwrap();
    assert_eq!(draft.active_shape(), "cyclic");
    assert_eq!(draft.value("period"), Some(&ParamValue::Int(300)));
    assert_eq!(draft.noise_percent(), 0.0);
}

#[tokio::test]
async fn schema_load_failure_keeps_session_in_loading() {
    let service = service_with(&[]);
    service.set_fail_shapes(true);
    let sync = ConfigSynchronizer::new(service.clone());

    let err = sync.load().await.unwrap_err();

    assert!(matches!(err, SyncError::SchemaLoad(_)));
    assert_eq!(sync.phase().await, SessionPhase::Loading);
    assert!(sync.draft().await.is_none());

    // user-initiated retry succeeds once the service recovers
    service.set_fail_shapes(false);
    sync.load().await.unwrap();
    assert_eq!(sync.phase().await, SessionPhase::Ready);
}

#[tokio::test]
async fn config_load_failure_surfaces_separately() {
    let service = service_with(&[]);
    service.set_fail_config(true);
    let sync = ConfigSynchronizer::new(service);

    let err = sync.load().await.unwrap_err();
    assert!(matches!(err, SyncError::ConfigLoad(_)));
}

#[tokio::test]
async fn empty_catalog_is_a_load_error() {
    let service = Arc::new(InMemoryConfigService::new(SchemaCatalog::default()));
    let sync = ConfigSynchronizer::new(service);

    let err = sync.load().await.unwrap_err();
    assert!(matches!(err, SyncError::EmptyCatalog));
}

#[tokio::test]
async fn apply_before_load_is_rejected() {
    let sync = ConfigSynchronizer::new(service_with(&[]));
    assert!(matches!(sync.apply().await, Err(SyncError::NotLoaded)));
}

#[tokio::test]
async fn apply_submits_the_complete_payload() {
    let service = service_with(&[(SHAPE_TYPE_KEY, "stages")]);
    let sync = ConfigSynchronizer::with_settings(service.clone(), fast_settings());

    sync.load().await.unwrap();
    sync.set_parameter(
        "STAGES_JSON",
        ParamValue::Json(serde_json::json!([{"duration":60,"users":5,"spawn_rate":2.5}])),
    )
    .await
    .unwrap();
    sync.set_noise_percent(20.0).await.unwrap();
    sync.apply().await.unwrap();

    assert_eq!(service.puts(), 1);
    let stored = service.stored_record();
    assert_eq!(stored.get(SHAPE_TYPE_KEY), Some(&"stages".to_string()));
    assert_eq!(stored.get(NOISE_PERCENT_KEY), Some(&"20".to_string()));
    assert_eq!(
        stored.get("STAGES_JSON").map(String::as_str),
        Some(r#"[{"duration":60,"spawn_rate":2.5,"users":5}]"#)
    );
}

#[tokio::test]
async fn apply_failure_preserves_the_draft() {
    let service = service_with(&[]);
    let sync = ConfigSynchronizer::new(service.clone());

    sync.load().await.unwrap();
    sync.set_parameter("period", ParamValue::Int(42)).await.unwrap();

    service.set_fail_put(true);
    let err = sync.apply().await.unwrap_err();

    assert!(matches!(err, SyncError::Apply(_)));
    assert_eq!(sync.phase().await, SessionPhase::Ready);
    let draft = sync.draft().await.unwrap();
    assert_eq!(draft.value("period"), Some(&ParamValue::Int(42)));

    // the retry goes through with the same edits
    service.set_fail_put(false);
    sync.apply().await.unwrap();
    assert_eq!(
        service.stored_record().get("period"),
        Some(&"42".to_string())
    );
}

#[tokio::test]
async fn post_apply_reload_reconciles_after_the_delay() {
    let service = service_with(&[]);
    let sync = ConfigSynchronizer::with_settings(service.clone(), fast_settings());

    sync.load().await.unwrap();
    assert_eq!(service.config_fetches(), 1);

    sync.apply().await.unwrap();
    // no reload before the delay elapses
    assert_eq!(service.config_fetches(), 1);

    tokio::time::sleep(Duration::from_millis(120)).await;
    assert_eq!(service.config_fetches(), 2);
    assert_eq!(sync.phase().await, SessionPhase::Ready);
}

#[tokio::test]
async fn superseded_reload_is_discarded() {
    let service = service_with(&[]);
    let sync = ConfigSynchronizer::with_settings(service.clone(), fast_settings());

    sync.load().await.unwrap();
    sync.apply().await.unwrap();

    // a newer user-initiated load supersedes the scheduled reload
    sync.load().await.unwrap();
    let fetches_after_manual_load = service.config_fetches();

    tokio::time::sleep(Duration::from_millis(120)).await;
    assert_eq!(service.config_fetches(), fetches_after_manual_load);
}

#[tokio::test]
async fn select_shape_resets_parameters_to_new_defaults() {
    let service = service_with(&[("period", "42")]);
    let sync = ConfigSynchronizer::new(service);

    sync.load().await.unwrap();
    sync.select_shape("stages").await.unwrap();

    let draft = sync.draft().await.unwrap();
    assert_eq!(draft.active_shape(), "stages");
    let keys: Vec<_> = draft.values().keys().cloned().collect();
    assert_eq!(keys, ["STAGES_JSON"]);
}

#[tokio::test]
async fn select_unknown_shape_is_rejected() {
    let sync = ConfigSynchronizer::new(service_with(&[]));
    sync.load().await.unwrap();

    let err = sync.select_shape("sawtooth").await.unwrap_err();
    assert!(matches!(err, SyncError::Schema(_)));
}

#[tokio::test]
async fn restart_only_leaves_everything_untouched() {
    let service = service_with(&[]);
    let sync = ConfigSynchronizer::new(service.clone());

    sync.load().await.unwrap();
    let draft_before = sync.draft().await.unwrap();

    sync.restart_only().await.unwrap();

    assert_eq!(service.restarts(), 1);
    assert_eq!(service.puts(), 0);
    assert_eq!(sync.phase().await, SessionPhase::Ready);
    assert_eq!(sync.draft().await.unwrap(), draft_before);
}

#[tokio::test]
async fn restart_failure_changes_nothing() {
    let service = service_with(&[]);
    let sync = ConfigSynchronizer::new(service.clone());
    sync.load().await.unwrap();

    service.set_fail_restart(true);
    let err = sync.restart_only().await.unwrap_err();

    assert!(matches!(err, SyncError::Restart(_)));
    assert_eq!(sync.phase().await, SessionPhase::Ready);
    assert!(sync.draft().await.is_some());
}
