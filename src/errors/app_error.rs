//! 统一错误类型定义

use serde::Serialize;

/// 应用错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // 配置错误：必需配置缺失或为空
    #[error("配置错误: {0}")]
    ConfigError(String),

    // 查询引擎错误：提交被拒绝、非成功终态、超时或结果格式错误
    #[error("查询执行失败: {0}")]
    QueryError(String),

    // 存储读取错误
    #[error("状态读取失败: {0}")]
    StorageReadError(String),

    // 存储写入错误（仅在仓库内部出现，对外降级为 false）
    #[error("状态写入失败: {0}")]
    StorageWriteError(String),

    // 邮件发送错误
    #[error("告警邮件发送失败: {0}")]
    NotificationError(String),

    // 序列化错误
    #[error("序列化错误")]
    SerializationError(#[from] serde_json::Error),

    // 内部错误
    #[error("内部服务错误: {0}")]
    InternalError(String),
}

/// 错误分类，对应响应中的 `code`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCategory {
    ConfigurationError,
    QueryError,
    StorageError,
    NotificationError,
    UnexpectedError,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::ConfigurationError => "CONFIGURATION_ERROR",
            ErrorCategory::QueryError => "QUERY_ERROR",
            ErrorCategory::StorageError => "STORAGE_ERROR",
            ErrorCategory::NotificationError => "NOTIFICATION_ERROR",
            ErrorCategory::UnexpectedError => "UNEXPECTED_ERROR",
        }
    }
}

impl AppError {
    /// 错误分类
    pub fn category(&self) -> ErrorCategory {
        match self {
            AppError::ConfigError(_) => ErrorCategory::ConfigurationError,
            AppError::QueryError(_) => ErrorCategory::QueryError,
            AppError::StorageReadError(_) | AppError::StorageWriteError(_) => {
                ErrorCategory::StorageError
            }
            AppError::NotificationError(_) => ErrorCategory::NotificationError,
            AppError::SerializationError(_) | AppError::InternalError(_) => {
                ErrorCategory::UnexpectedError
            }
        }
    }

    /// 响应状态码
    pub fn status_code(&self) -> u16 {
        match self.category() {
            ErrorCategory::ConfigurationError => 500,
            ErrorCategory::QueryError => 502,
            ErrorCategory::StorageError => 503,
            ErrorCategory::NotificationError => 502,
            ErrorCategory::UnexpectedError => 500,
        }
    }

    /// 面向调用方的错误摘要
    pub fn summary(&self) -> &'static str {
        match self {
            AppError::ConfigError(_) => "Invalid or missing configuration",
            AppError::QueryError(_) => "Failed to execute failure detection query",
            AppError::StorageReadError(_) | AppError::StorageWriteError(_) => {
                "Failed to access alert state storage"
            }
            AppError::NotificationError(_) => "Failed to send alert email",
            AppError::SerializationError(_) | AppError::InternalError(_) => {
                "Unexpected error occurred"
            }
        }
    }

    /// 错误详情（不含摘要前缀）
    pub fn details(&self) -> String {
        match self {
            AppError::ConfigError(msg)
            | AppError::QueryError(msg)
            | AppError::StorageReadError(msg)
            | AppError::StorageWriteError(msg)
            | AppError::NotificationError(msg)
            | AppError::InternalError(msg) => msg.clone(),
            AppError::SerializationError(e) => e.to_string(),
        }
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::ConfigError(err.to_string())
    }
}
