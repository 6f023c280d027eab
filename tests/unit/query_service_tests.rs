//! QueryService 测试

use crate::helpers::{query_options, result_rows, OUTPUT_LOCATION};
use crate::mocks::MockQueryEngine;
use sms_monitor::config::AthenaSettings;
use sms_monitor::models::{AlertLevel, AlertThresholds, ExecutionStatus, QueryState};
use sms_monitor::services::{QueryOptions, QueryService};
use sms_monitor::AppError;
use std::sync::Arc;
use std::time::Duration;

fn service(engine: Arc<MockQueryEngine>) -> QueryService {
    QueryService::new(engine, query_options())
}

#[test]
fn test_failure_detection_query() {
    let service = service(Arc::new(MockQueryEngine::default()));
    let query = service.failure_detection_query();

    assert!(query.contains("SELECT"));
    assert!(query.contains("FROM clicksend_canary.sms_logs"));
    assert!(query.contains("WHERE from_unixtime(sent_date)"));
    assert!(query.contains("INTERVAL '30' MINUTE"));
    assert!(query.contains("direction = 'outbound'"));
    assert!(query.contains("NOT IN (200, 201)"));
    assert!(query.contains("CASE"));
    assert!(query.contains("CRITICAL"));
    assert!(query.contains("WARNING"));
}

#[tokio::test]
async fn test_execute_query_success() {
    let engine = Arc::new(MockQueryEngine::new(
        vec![QueryState::Queued, QueryState::Running, QueryState::Succeeded],
        result_rows("100", "5", "5.0", "WARNING"),
    ));
    let service = service(engine.clone());

    let metrics = service.execute_query().await.unwrap();
    assert_eq!(metrics.total_messages, 100);
    assert_eq!(metrics.failed_messages, 5);
    assert_eq!(metrics.alert_level, AlertLevel::Warning);

    assert_eq!(engine.poll_count(), 3);
    let submitted = engine.submitted();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].workgroup, "test-workgroup");
    assert_eq!(submitted[0].database.as_deref(), Some("clicksend_canary"));
    assert_eq!(submitted[0].output_location.as_deref(), Some(OUTPUT_LOCATION));
}

#[tokio::test]
async fn test_output_location_from_settings_reaches_submission() {
    let settings = AthenaSettings {
        workgroup: "primary".to_string(),
        output_location: Some("s3://clicksend-canary-data/athena-query-results/".to_string()),
        ..AthenaSettings::default()
    };
    let options = QueryOptions {
        poll_interval: Duration::from_millis(1),
        ..QueryOptions::from_settings(&settings, AlertThresholds::default())
    };
    let engine = Arc::new(MockQueryEngine::new(
        vec![QueryState::Succeeded],
        result_rows("10", "0", "0.0", "OK"),
    ));

    QueryService::new(engine.clone(), options)
        .execute_query()
        .await
        .unwrap();

    let submitted = engine.submitted();
    assert_eq!(
        submitted[0].output_location.as_deref(),
        Some("s3://clicksend-canary-data/athena-query-results/")
    );
    assert_eq!(submitted[0].database.as_deref(), Some("clicksend_canary"));
}

#[test]
fn test_blank_output_location_is_omitted() {
    let settings = AthenaSettings {
        output_location: Some("   ".to_string()),
        ..AthenaSettings::default()
    };
    let options = QueryOptions::from_settings(&settings, AlertThresholds::default());
    assert!(options.output_location.is_none());
}

#[tokio::test]
async fn test_wait_returns_immediately_on_success() {
    let engine = Arc::new(MockQueryEngine::new(vec![QueryState::Succeeded], vec![]));
    let service = service(engine.clone());

    let state = service
        .wait_for_completion("test-execution-id", Duration::from_millis(1))
        .await
        .unwrap();
    assert_eq!(state, QueryState::Succeeded);
    assert_eq!(engine.poll_count(), 1);
}

#[tokio::test]
async fn test_wait_failed_state_carries_reason() {
    let engine = Arc::new(MockQueryEngine::with_statuses(vec![
        ExecutionStatus::new(QueryState::Running),
        ExecutionStatus::new(QueryState::Failed).with_reason("TABLE_NOT_FOUND: sms_logs"),
    ]));
    let service = service(engine);

    let err = service
        .wait_for_completion("test-execution-id", Duration::from_millis(1))
        .await
        .unwrap_err();
    match err {
        AppError::QueryError(msg) => {
            assert!(msg.contains("FAILED"));
            assert!(msg.contains("TABLE_NOT_FOUND"));
        }
        other => panic!("expected QueryError, got {:?}", other),
    }
}

#[tokio::test]
async fn test_wait_cancelled_is_error() {
    let engine = Arc::new(MockQueryEngine::new(vec![QueryState::Cancelled], vec![]));
    let err = service(engine)
        .wait_for_completion("test-execution-id", Duration::from_millis(1))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::QueryError(_)));
}

#[tokio::test]
async fn test_wait_times_out() {
    let engine = Arc::new(MockQueryEngine::new(vec![QueryState::Running], vec![]));
    let err = service(engine.clone())
        .wait_for_completion("test-execution-id", Duration::from_millis(20))
        .await
        .unwrap_err();

    match err {
        AppError::QueryError(msg) => assert!(msg.contains("timed out")),
        other => panic!("expected QueryError, got {:?}", other),
    }
    assert!(engine.poll_count() > 1);
}

#[tokio::test]
async fn test_submit_rejected() {
    let engine = Arc::new(MockQueryEngine::rejecting());
    let err = service(engine.clone()).execute_query().await.unwrap_err();
    assert!(matches!(err, AppError::QueryError(_)));
    assert_eq!(engine.poll_count(), 0);
}

#[tokio::test]
async fn test_missing_data_row_is_query_error() {
    let mut rows = result_rows("0", "0", "", "");
    rows.truncate(1);
    let engine = Arc::new(MockQueryEngine::new(vec![QueryState::Succeeded], rows));

    let err = service(engine).execute_query().await.unwrap_err();
    assert!(matches!(err, AppError::QueryError(_)));
}

#[tokio::test]
async fn test_zero_messages_is_ok() {
    let engine = Arc::new(MockQueryEngine::new(
        vec![QueryState::Succeeded],
        result_rows("0", "0", "", ""),
    ));

    let metrics = service(engine).execute_query().await.unwrap();
    assert_eq!(metrics.total_messages, 0);
    assert_eq!(metrics.failure_rate, 0.0);
    assert_eq!(metrics.alert_level, AlertLevel::Ok);
}
