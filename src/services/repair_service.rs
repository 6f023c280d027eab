//! 分区修复服务
//!
//! 执行 `MSCK REPAIR TABLE`，让新写入的分区可被查询。

use crate::config::Settings;
use crate::errors::AppError;
use crate::models::{InvocationResponse, QuerySubmission, RepairOutcome};
use crate::services::QueryService;
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;
use uuid::Uuid;

/// 分区修复服务
pub struct RepairService {
    query_service: Arc<QueryService>,
    settings: Settings,
}

impl RepairService {
    pub fn new(query_service: Arc<QueryService>, settings: Settings) -> Self {
        Self {
            query_service,
            settings,
        }
    }

    /// 提交修复语句并等待完成
    pub async fn repair_table(&self) -> Result<RepairOutcome, AppError> {
        let config = self.settings.repair_config()?;

        let submission = QuerySubmission {
            query: format!("MSCK REPAIR TABLE {}.{};", config.database, config.table),
            workgroup: config.workgroup.clone(),
            database: Some(config.database.clone()),
            output_location: Some(config.output_location.clone()),
        };
        tracing::info!(query = %submission.query, "执行分区修复");

        let execution_id = self.query_service.start_query(&submission).await?;
        let poll_interval = Duration::from_millis(self.settings.athena.repair_poll_interval_ms);
        let state = self
            .query_service
            .wait_for_completion(&execution_id, poll_interval)
            .await?;

        tracing::info!(execution_id = %execution_id, "✅ 分区修复完成");

        Ok(RepairOutcome {
            query_execution_id: execution_id,
            state: state.to_string(),
        })
    }

    /// 执行修复并生成统一响应
    pub async fn invoke(&self) -> InvocationResponse<RepairOutcome> {
        let invocation_id = Uuid::new_v4().to_string();
        let span = tracing::info_span!("repair", invocation_id = %invocation_id);

        let response = async {
            match self.repair_table().await {
                Ok(outcome) => InvocationResponse::success("MSCK REPAIR executed successfully", outcome),
                Err(e) => {
                    tracing::error!(error = %e, code = e.category().as_str(), "分区修复失败");
                    InvocationResponse::failure(&e)
                }
            }
        }
        .instrument(span)
        .await;

        response.with_invocation_id(invocation_id)
    }
}
