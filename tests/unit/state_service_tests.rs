//! StateService 测试

use crate::helpers::{metrics, state_record, storage_settings, BUCKET, HISTORY_KEY, STATE_KEY};
use crate::mocks::{InMemoryObjectStore, RecordingStateStore};
use sms_monitor::models::{AlertLevel, StateLevel};
use sms_monitor::repositories::{ObjectStateRepository, StateStore};
use sms_monitor::services::StateService;
use std::sync::Arc;

const ALL_LEVELS: [AlertLevel; 3] = [AlertLevel::Ok, AlertLevel::Warning, AlertLevel::Critical];

fn level_of(level: AlertLevel) -> StateLevel {
    StateLevel::from(level)
}

#[tokio::test]
async fn test_bootstrap_always_changes() {
    for level in ALL_LEVELS {
        let store = Arc::new(RecordingStateStore::new(None));
        let service = StateService::new(store.clone());

        let change = service
            .process_state_change(&metrics(100, 5, 5.0, level))
            .await
            .unwrap();

        assert!(change.state_changed, "首次运行应视为状态变化");
        assert_eq!(change.previous_state.alert_level, StateLevel::Unknown);
        assert_eq!(change.previous_state.timestamp, "N/A");
        assert_eq!(change.current_state.alert_level, level_of(level));
        assert_eq!(store.write_count(), 1);
        assert_eq!(store.append_count(), 1);
    }
}

#[tokio::test]
async fn test_same_level_does_not_change() {
    let store = Arc::new(RecordingStateStore::new(Some(state_record(StateLevel::Warning))));
    let service = StateService::new(store.clone());

    let change = service
        .process_state_change(&metrics(100, 5, 5.0, AlertLevel::Warning))
        .await
        .unwrap();

    assert!(!change.state_changed);
    assert_eq!(store.write_count(), 1);
    assert_eq!(store.append_count(), 0, "未变化时不应写入历史");
}

#[tokio::test]
async fn test_every_transition_pair() {
    for previous in ALL_LEVELS {
        for new in ALL_LEVELS {
            let store = Arc::new(RecordingStateStore::new(Some(state_record(level_of(previous)))));
            let service = StateService::new(store.clone());

            let change = service
                .process_state_change(&metrics(100, 5, 5.0, new))
                .await
                .unwrap();

            assert_eq!(change.state_changed, previous != new, "{:?} -> {:?}", previous, new);
            assert_eq!(store.write_count(), 1);
            if previous != new {
                assert_eq!(store.append_count(), 1);
                let appended = store.appends.lock().unwrap()[0].clone();
                assert_eq!(appended, change.current_state);
            } else {
                assert_eq!(store.append_count(), 0);
            }
        }
    }
}

#[tokio::test]
async fn test_write_failure_is_not_fatal() {
    let store = Arc::new(RecordingStateStore::with_failing_writes(Some(state_record(StateLevel::Ok))));
    let service = StateService::new(store.clone());

    let change = service
        .process_state_change(&metrics(100, 30, 30.0, AlertLevel::Critical))
        .await
        .unwrap();

    assert!(change.state_changed);
    assert_eq!(change.previous_state.alert_level, StateLevel::Ok);
    assert_eq!(store.write_count(), 1);
    assert_eq!(store.append_count(), 1);
}

#[tokio::test]
async fn test_previous_without_level_counts_as_changed() {
    let store = InMemoryObjectStore::new();
    store.insert(BUCKET, STATE_KEY, r#"{"timestamp": "2022-12-31 23:50:00"}"#);
    let repo = Arc::new(ObjectStateRepository::new(Arc::new(store.clone()), &storage_settings()));

    let change = StateService::new(repo)
        .process_state_change(&metrics(100, 1, 1.0, AlertLevel::Ok))
        .await
        .unwrap();

    assert!(change.state_changed);
}

#[tokio::test]
async fn test_null_previous_level_counts_as_changed() {
    let store = InMemoryObjectStore::new();
    store.insert(
        BUCKET,
        STATE_KEY,
        r#"{"timestamp": "2022-12-31 23:50:00", "alert_level": null, "total_messages": null, "failed_messages": null, "failure_rate": null}"#,
    );
    let repo = Arc::new(ObjectStateRepository::new(Arc::new(store.clone()), &storage_settings()));

    let change = StateService::new(repo.clone())
        .process_state_change(&metrics(100, 30, 30.0, AlertLevel::Critical))
        .await
        .unwrap();

    assert!(change.state_changed);
    assert_eq!(change.previous_state.alert_level, StateLevel::Unknown);
    assert_eq!(store.put_count(STATE_KEY), 1);

    // 坏记录被覆盖后，下一次运行可正常比较
    let stored = repo.read_current().await.unwrap();
    assert_eq!(stored.alert_level, StateLevel::Critical);
}

#[tokio::test]
async fn test_state_survives_across_invocations() {
    let store = InMemoryObjectStore::new();
    let repo = Arc::new(ObjectStateRepository::new(Arc::new(store.clone()), &storage_settings()));
    let service = StateService::new(repo.clone());

    let sequence = [
        (AlertLevel::Ok, true),
        (AlertLevel::Ok, false),
        (AlertLevel::Critical, true),
        (AlertLevel::Critical, false),
        (AlertLevel::Ok, true),
    ];

    for (level, expected_change) in sequence {
        let change = service
            .process_state_change(&metrics(100, 0, 0.0, level))
            .await
            .unwrap();
        assert_eq!(change.state_changed, expected_change, "{:?}", level);
    }

    assert_eq!(store.put_count(STATE_KEY), 5);
    assert_eq!(store.put_count(HISTORY_KEY), 3);

    let levels: Vec<StateLevel> = repo
        .read_history()
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.alert_level)
        .collect();
    assert_eq!(levels, vec![StateLevel::Ok, StateLevel::Critical, StateLevel::Ok]);
}

#[tokio::test]
async fn test_read_failure_propagates() {
    let store = InMemoryObjectStore::new();
    store.insert(BUCKET, STATE_KEY, "not json");
    let repo = Arc::new(ObjectStateRepository::new(Arc::new(store.clone()), &storage_settings()));

    let result = StateService::new(repo)
        .process_state_change(&metrics(100, 1, 1.0, AlertLevel::Ok))
        .await;

    assert!(result.is_err());
    assert_eq!(store.put_count(STATE_KEY), 0);
}
