//! 通用数据结构

use crate::errors::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 调用结果状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvocationStatus {
    Success,
    Failure,
}

/// 失败详情
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub details: String,
}

/// 统一调用响应结构
#[derive(Debug, Clone, Serialize)]
pub struct InvocationResponse<T: Serialize> {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub status: InvocationStatus,
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invocation_id: Option<String>,
}

impl<T: Serialize> InvocationResponse<T> {
    /// 创建成功响应
    pub fn success(message: &str, data: T) -> Self {
        Self {
            status_code: 200,
            status: InvocationStatus::Success,
            code: "OK".to_string(),
            message: message.to_string(),
            data: Some(data),
            error: None,
            timestamp: Utc::now(),
            invocation_id: None,
        }
    }

    /// 由错误创建失败响应
    pub fn failure(err: &AppError) -> Self {
        Self {
            status_code: err.status_code(),
            status: InvocationStatus::Failure,
            code: err.category().as_str().to_string(),
            message: err.to_string(),
            data: None,
            error: Some(ErrorBody {
                error: err.summary().to_string(),
                details: err.details(),
            }),
            timestamp: Utc::now(),
            invocation_id: None,
        }
    }

    /// 设置调用 ID
    pub fn with_invocation_id(mut self, invocation_id: String) -> Self {
        self.invocation_id = Some(invocation_id);
        self
    }

    pub fn is_success(&self) -> bool {
        self.status == InvocationStatus::Success
    }
}

/// 评估成功时的响应数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationOutcome {
    pub state_changed: bool,
    pub notification_sent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    pub current_state: super::StateRecord,
    pub previous_state: super::StateRecord,
}

/// 分区修复成功时的响应数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepairOutcome {
    pub query_execution_id: String,
    pub state: String,
}
