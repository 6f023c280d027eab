//! Athena 查询引擎客户端

use super::QueryEngine;
use crate::errors::AppError;
use crate::models::{ExecutionStatus, QueryState, QuerySubmission, ResultRows};
use aws_sdk_athena::error::DisplayErrorContext;
use aws_sdk_athena::types::{QueryExecutionContext, ResultConfiguration};
use aws_sdk_athena::Client;

/// Athena 查询引擎
#[derive(Clone)]
pub struct AthenaQueryEngine {
    client: Client,
}

impl AthenaQueryEngine {
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            client: Client::new(sdk_config),
        }
    }
}

#[async_trait::async_trait]
impl QueryEngine for AthenaQueryEngine {
    async fn submit(&self, submission: &QuerySubmission) -> Result<String, AppError> {
        let context = submission
            .database
            .as_ref()
            .map(|db| QueryExecutionContext::builder().database(db).build());
        let result_config = submission
            .output_location
            .as_ref()
            .map(|location| ResultConfiguration::builder().output_location(location).build());

        let output = self
            .client
            .start_query_execution()
            .query_string(&submission.query)
            .work_group(&submission.workgroup)
            .set_query_execution_context(context)
            .set_result_configuration(result_config)
            .send()
            .await
            .map_err(|e| {
                AppError::QueryError(format!("查询提交失败: {}", DisplayErrorContext(&e)))
            })?;

        output
            .query_execution_id()
            .map(str::to_string)
            .ok_or_else(|| AppError::QueryError("查询提交未返回执行 ID".to_string()))
    }

    async fn poll(&self, execution_id: &str) -> Result<ExecutionStatus, AppError> {
        let output = self
            .client
            .get_query_execution()
            .query_execution_id(execution_id)
            .send()
            .await
            .map_err(|e| {
                AppError::QueryError(format!("查询状态获取失败: {}", DisplayErrorContext(&e)))
            })?;

        let status = output.query_execution().and_then(|q| q.status());
        let state = status
            .and_then(|s| s.state())
            .map(|s| QueryState::parse(s.as_str()))
            .ok_or_else(|| AppError::QueryError(format!("查询 {} 缺少执行状态", execution_id)))?;

        Ok(ExecutionStatus {
            state,
            reason: status
                .and_then(|s| s.state_change_reason())
                .map(str::to_string),
        })
    }

    async fn fetch_results(&self, execution_id: &str) -> Result<ResultRows, AppError> {
        let output = self
            .client
            .get_query_results()
            .query_execution_id(execution_id)
            .send()
            .await
            .map_err(|e| {
                AppError::QueryError(format!("查询结果获取失败: {}", DisplayErrorContext(&e)))
            })?;

        let rows = output
            .result_set()
            .map(|rs| rs.rows())
            .unwrap_or_default()
            .iter()
            .map(|row| {
                row.data()
                    .iter()
                    .map(|datum| datum.var_char_value().map(str::to_string))
                    .collect()
            })
            .collect();

        Ok(rows)
    }
}
