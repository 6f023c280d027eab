//! 分区修复测试

use crate::helpers::{query_options, repair_settings};
use crate::mocks::MockQueryEngine;
use sms_monitor::models::{ExecutionStatus, QueryState};
use sms_monitor::services::{QueryService, RepairService};
use std::sync::Arc;

fn repair_service(engine: Arc<MockQueryEngine>, settings: sms_monitor::config::Settings) -> RepairService {
    RepairService::new(Arc::new(QueryService::new(engine, query_options())), settings)
}

#[tokio::test]
async fn test_repair_success() {
    let engine = Arc::new(MockQueryEngine::new(
        vec![QueryState::Queued, QueryState::Succeeded],
        vec![],
    ));
    let service = repair_service(engine.clone(), repair_settings());

    let response = service.invoke().await;

    assert!(response.is_success());
    assert_eq!(response.message, "MSCK REPAIR executed successfully");
    let data = response.data.unwrap();
    assert_eq!(data.query_execution_id, "test-execution-id");
    assert_eq!(data.state, "SUCCEEDED");

    let submitted = engine.submitted();
    assert_eq!(submitted[0].query, "MSCK REPAIR TABLE clicksend_canary.sms_logs;");
    assert_eq!(submitted[0].database.as_deref(), Some("clicksend_canary"));
    assert_eq!(submitted[0].output_location.as_deref(), Some("s3://results-bucket/athena/"));
    assert_eq!(submitted[0].workgroup, "test-workgroup");
}

#[tokio::test]
async fn test_repair_query_failure() {
    let engine = Arc::new(MockQueryEngine::with_statuses(vec![
        ExecutionStatus::new(QueryState::Failed).with_reason("Access denied"),
    ]));

    let response = repair_service(engine, repair_settings()).invoke().await;

    assert!(!response.is_success());
    assert_eq!(response.code, "QUERY_ERROR");
    assert!(response.error.unwrap().details.contains("Access denied"));
}

#[tokio::test]
async fn test_repair_missing_configuration() {
    let engine = Arc::new(MockQueryEngine::new(vec![QueryState::Succeeded], vec![]));
    let mut settings = repair_settings();
    settings.athena.workgroup = String::new();
    settings.athena.output_location = None;

    let response = repair_service(engine.clone(), settings).invoke().await;

    assert_eq!(response.code, "CONFIGURATION_ERROR");
    let details = response.error.unwrap().details;
    assert!(details.contains("ATHENA_WORKGROUP"));
    assert!(engine.submitted().is_empty());
}
