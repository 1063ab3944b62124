//! File backend round trips.

#![cfg(feature = "persistent")]

mod common;

use std::fs;
use std::sync::Arc;

use chrono::Utc;
use tempfile::tempdir;

use rivalwatch::storage::{open_state_store, PersistentConfig};
use rivalwatch::{
    AlertType, CandidateAlert, MonitorService, PageRecord, PreferenceKey, Severity, StateStore,
    StorageError, StoredState,
};

use common::{quick_config, ScriptedProvider, Step};

#[test]
fn aggregate_round_trips_field_for_field() {
    let dir = tempdir().unwrap();
    let store = open_state_store(dir.path(), None).unwrap();

    let mut state = StoredState::initial(Utc::now());
    state.add_competitor("acme.com");
    state.add_competitor("rival.io");
    state.preferences.set(PreferenceKey::Backlinks, false);
    let competitor = state.competitor_mut("acme.com").unwrap();
    let mut snap = common::snapshot_for("acme.com", 120);
    let mut page = PageRecord::new("https://acme.com/").with_title("Acme");
    page.schema_types.insert("LocalBusiness".to_string());
    snap.pages.push(page);
    snap.gbp_data.rating = 4.6;
    snap.gbp_data.last_post_date = Some("2024-04-29".to_string());
    competitor.record_snapshot(snap);

    store.save(&state).unwrap();
    assert_eq!(store.load().unwrap().unwrap(), state);
}

#[test]
fn service_state_survives_restart() {
    let dir = tempdir().unwrap();
    let provider = Arc::new(ScriptedProvider::new());
    provider.push(
        "acme.com",
        Step::Reply(vec![
            CandidateAlert::baseline(),
            CandidateAlert::new(AlertType::Custom("price_change".to_string()), Severity::High),
        ]),
    );

    let saved = {
        let store = Arc::new(open_state_store(dir.path(), None).unwrap());
        let service = MonitorService::open(store, provider.clone(), quick_config()).unwrap();
        service.add_competitor("acme.com").unwrap();
        let report = service.run_cycle().unwrap();
        service.mark_addressed(&report.new_alerts[0].id).unwrap();
        service.state().unwrap()
    };

    let store = Arc::new(open_state_store(dir.path(), None).unwrap());
    let service = MonitorService::open(store, provider, quick_config()).unwrap();
    let loaded = service.state().unwrap();
    assert_eq!(loaded, saved);
    assert_eq!(loaded.alerts.len(), 2);
    assert!(loaded
        .alerts
        .as_slice()
        .iter()
        .any(|a| a.alert_type == AlertType::Custom("price_change".to_string())));
}

#[test]
fn corrupted_record_fails_open() {
    let dir = tempdir().unwrap();
    {
        let store = open_state_store(dir.path(), None).unwrap();
        let mut state = StoredState::initial(Utc::now());
        state.add_competitor("acme.com");
        store.save(&state).unwrap();
        let text = fs::read_to_string(store.path()).unwrap();
        fs::write(store.path(), text.replace("acme.com", "acne.com")).unwrap();
    }

    let store = Arc::new(open_state_store(dir.path(), None).unwrap());
    let err = MonitorService::open(store, Arc::new(ScriptedProvider::new()), quick_config())
        .unwrap_err();
    assert!(err.is_storage());
}

#[test]
fn checksum_verification_can_be_disabled() {
    let dir = tempdir().unwrap();
    let config = PersistentConfig {
        verify_checksum: false,
        ..PersistentConfig::default()
    };
    let store = open_state_store(dir.path(), Some(config)).unwrap();
    let mut state = StoredState::initial(Utc::now());
    state.add_competitor("acme.com");
    store.save(&state).unwrap();

    let text = fs::read_to_string(store.path()).unwrap();
    fs::write(store.path(), text.replace("acme.com", "acne.com")).unwrap();

    let loaded = store.load().unwrap().unwrap();
    assert!(loaded.competitor("acne.com").is_some());
}

#[test]
fn truncated_record_is_rejected() {
    let dir = tempdir().unwrap();
    let store = open_state_store(dir.path(), None).unwrap();
    store.save(&StoredState::initial(Utc::now())).unwrap();

    let text = fs::read_to_string(store.path()).unwrap();
    fs::write(store.path(), &text[..text.len() / 2]).unwrap();

    assert!(matches!(store.load(), Err(StorageError::Serialization(_))));
}
