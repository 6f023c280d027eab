//! 失败率查询服务
//!
//! 提交聚合查询、轮询到终态，并把表格结果解析为 [`QueryMetrics`]。

use crate::clients::QueryEngine;
use crate::config::AthenaSettings;
use crate::errors::AppError;
use crate::models::{
    failure_rate, AlertLevel, AlertThresholds, QueryMetrics, QueryState, QuerySubmission,
    ResultRows,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// 查询执行参数
#[derive(Debug, Clone)]
pub struct QueryOptions {
    pub workgroup: String,
    pub database: String,
    pub table: String,
    pub output_location: Option<String>,
    pub window_minutes: u32,
    pub poll_interval: Duration,
    pub max_wait: Duration,
    pub thresholds: AlertThresholds,
}

impl QueryOptions {
    pub fn from_settings(settings: &AthenaSettings, thresholds: AlertThresholds) -> Self {
        Self {
            workgroup: settings.workgroup.clone(),
            database: settings.database.clone(),
            table: settings.table.clone(),
            output_location: settings
                .output_location
                .as_ref()
                .map(|location| location.trim().to_string())
                .filter(|location| !location.is_empty()),
            window_minutes: settings.window_minutes,
            poll_interval: Duration::from_millis(settings.poll_interval_ms),
            max_wait: Duration::from_secs(settings.max_wait_seconds),
            thresholds,
        }
    }
}

/// 失败率查询服务
pub struct QueryService {
    engine: Arc<dyn QueryEngine>,
    options: QueryOptions,
}

impl QueryService {
    pub fn new(engine: Arc<dyn QueryEngine>, options: QueryOptions) -> Self {
        Self { engine, options }
    }

    /// 生成失败检测 SQL
    ///
    /// 统计窗口内的出站短信，状态码不在 {200, 201} 的视为失败。
    pub fn failure_detection_query(&self) -> String {
        let o = &self.options;
        let failed = "COUNT_IF(status_code NOT IN (200, 201))";
        format!(
            r#"
SELECT
    COUNT(*) AS total_messages,
    {failed} AS failed_messages,
    ROUND(CAST({failed} AS DOUBLE) * 100.0 / NULLIF(COUNT(*), 0), 2) AS failure_rate,
    CASE
        WHEN COUNT(*) = 0 THEN 'OK'
        WHEN CAST({failed} AS DOUBLE) * 100.0 / COUNT(*) >= {critical} THEN 'CRITICAL'
        WHEN CAST({failed} AS DOUBLE) * 100.0 / COUNT(*) >= {warning} THEN 'WARNING'
        ELSE 'OK'
    END AS alert_level
FROM {database}.{table}
WHERE from_unixtime(sent_date) >= current_timestamp - INTERVAL '{window}' MINUTE
  AND direction = 'outbound'
"#,
            failed = failed,
            critical = o.thresholds.critical_percent,
            warning = o.thresholds.warning_percent,
            database = o.database,
            table = o.table,
            window = o.window_minutes,
        )
    }

    /// 执行失败检测查询并返回指标
    pub async fn execute_query(&self) -> Result<QueryMetrics, AppError> {
        let submission = QuerySubmission {
            query: self.failure_detection_query(),
            workgroup: self.options.workgroup.clone(),
            database: Some(self.options.database.clone()),
            output_location: self.options.output_location.clone(),
        };

        let execution_id = self.start_query(&submission).await?;
        self.wait_for_completion(&execution_id, self.options.poll_interval)
            .await?;

        let rows = self.engine.fetch_results(&execution_id).await?;
        let metrics = parse_query_results(&rows, &self.options.thresholds)?;

        tracing::info!(
            execution_id = %execution_id,
            total_messages = metrics.total_messages,
            failed_messages = metrics.failed_messages,
            failure_rate = metrics.failure_rate,
            alert_level = %metrics.alert_level,
            "📈 失败率查询完成"
        );
        Ok(metrics)
    }

    /// 提交查询
    pub async fn start_query(&self, submission: &QuerySubmission) -> Result<String, AppError> {
        let execution_id = self.engine.submit(submission).await?;
        tracing::info!(
            execution_id = %execution_id,
            workgroup = %submission.workgroup,
            "查询已提交"
        );
        Ok(execution_id)
    }

    /// 按固定间隔轮询直到终态
    ///
    /// 非 SUCCEEDED 终态或超过最长等待时间都返回 `QueryError`。
    pub async fn wait_for_completion(
        &self,
        execution_id: &str,
        poll_interval: Duration,
    ) -> Result<QueryState, AppError> {
        let deadline = Instant::now() + self.options.max_wait;
        let mut last_state: Option<QueryState> = None;

        loop {
            let status = self.engine.poll(execution_id).await?;

            if last_state.as_ref() != Some(&status.state) {
                tracing::info!(execution_id = %execution_id, state = %status.state, "查询执行状态");
                last_state = Some(status.state.clone());
            }

            if status.state.is_terminal() {
                if status.state == QueryState::Succeeded {
                    return Ok(status.state);
                }
                let reason = status.reason.unwrap_or_else(|| status.state.to_string());
                tracing::error!(execution_id = %execution_id, state = %status.state, reason = %reason, "查询执行失败");
                return Err(AppError::QueryError(format!(
                    "Query execution {}: {}",
                    status.state, reason
                )));
            }

            if Instant::now() >= deadline {
                tracing::error!(
                    execution_id = %execution_id,
                    max_wait_seconds = self.options.max_wait.as_secs(),
                    "查询执行超时"
                );
                return Err(AppError::QueryError(format!(
                    "Query execution timed out after {} seconds",
                    self.options.max_wait.as_secs()
                )));
            }

            tokio::time::sleep(poll_interval).await;
        }
    }
}

/// 按列位置把结果解析为指标：total, failed, rate, level
pub fn parse_query_results(rows: &ResultRows, thresholds: &AlertThresholds) -> Result<QueryMetrics, AppError> {
    let data = rows
        .get(1)
        .ok_or_else(|| AppError::QueryError("查询结果缺少数据行".to_string()))?;

    if data.len() < 4 {
        return Err(AppError::QueryError(format!(
            "查询结果列数不足: 期望 4 列，实际 {} 列",
            data.len()
        )));
    }

    let cell = |idx: usize| {
        data[idx]
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    };

    let total_messages = parse_count(cell(0), "total_messages")?;
    let failed_messages = parse_count(cell(1), "failed_messages")?;

    let rate = match cell(2) {
        Some(raw) => Some(raw.parse::<f64>().map_err(|_| {
            AppError::QueryError(format!("failure_rate 不是有效数值: {}", raw))
        })?),
        None => failure_rate(total_messages, failed_messages),
    };

    let alert_level = match cell(3) {
        Some(raw) => raw.parse::<AlertLevel>().map_err(AppError::QueryError)?,
        None => thresholds.classify(rate),
    };

    Ok(QueryMetrics {
        total_messages,
        failed_messages,
        failure_rate: rate.unwrap_or(0.0),
        alert_level,
    })
}

fn parse_count(raw: Option<&str>, column: &str) -> Result<i64, AppError> {
    let Some(raw) = raw else {
        return Ok(0);
    };
    raw.parse::<i64>()
        .or_else(|_| raw.parse::<f64>().map(|v| v as i64))
        .map_err(|_| AppError::QueryError(format!("{} 不是有效整数: {}", column, raw)))
}
