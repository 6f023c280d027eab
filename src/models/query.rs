//! 查询引擎交互模型

use serde::{Deserialize, Serialize};
use std::fmt;

/// 查询执行状态
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum QueryState {
    Queued,
    Running,
    Succeeded,
    Failed,
    Cancelled,
    /// 引擎返回了无法识别的状态
    Other(String),
}

impl QueryState {
    /// 是否为终态
    pub fn is_terminal(&self) -> bool {
        matches!(self, QueryState::Succeeded | QueryState::Failed | QueryState::Cancelled)
    }

    pub fn as_str(&self) -> &str {
        match self {
            QueryState::Queued => "QUEUED",
            QueryState::Running => "RUNNING",
            QueryState::Succeeded => "SUCCEEDED",
            QueryState::Failed => "FAILED",
            QueryState::Cancelled => "CANCELLED",
            QueryState::Other(s) => s,
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "QUEUED" => QueryState::Queued,
            "RUNNING" => QueryState::Running,
            "SUCCEEDED" => QueryState::Succeeded,
            "FAILED" => QueryState::Failed,
            "CANCELLED" => QueryState::Cancelled,
            other => QueryState::Other(other.to_string()),
        }
    }
}

impl fmt::Display for QueryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 一次状态轮询结果
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionStatus {
    pub state: QueryState,
    pub reason: Option<String>,
}

impl ExecutionStatus {
    pub fn new(state: QueryState) -> Self {
        Self { state, reason: None }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

/// 查询提交参数
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySubmission {
    pub query: String,
    pub workgroup: String,
    pub database: Option<String>,
    pub output_location: Option<String>,
}

/// 表格结果：首行为表头，单元格可能为空值
pub type ResultRows = Vec<Vec<Option<String>>>;
