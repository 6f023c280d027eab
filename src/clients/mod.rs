//! 外部服务客户端
//!
//! 核心逻辑只通过这里的 trait 访问查询引擎、对象存储与邮件通道，
//! 具体实现（Athena / S3 / SES / SMTP）在构造时注入。

mod athena;
mod s3;
mod ses;
mod smtp;

pub use athena::AthenaQueryEngine;
pub use s3::S3ObjectStore;
pub use ses::SesTransport;
pub use smtp::SmtpTransport;

use crate::errors::AppError;
use crate::models::{ExecutionStatus, QuerySubmission, ResultRows};

/// 分析查询引擎
#[async_trait::async_trait]
pub trait QueryEngine: Send + Sync {
    /// 提交查询，返回执行 ID
    async fn submit(&self, submission: &QuerySubmission) -> Result<String, AppError>;

    /// 获取执行状态
    async fn poll(&self, execution_id: &str) -> Result<ExecutionStatus, AppError>;

    /// 获取表格结果（含表头行）
    async fn fetch_results(&self, execution_id: &str) -> Result<ResultRows, AppError>;
}

/// 对象存储
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync {
    /// 读取对象，不存在时返回 `None`
    async fn get(&self, bucket: &str, key: &str) -> Result<Option<Vec<u8>>, AppError>;

    /// 写入（覆盖）对象
    async fn put(&self, bucket: &str, key: &str, body: Vec<u8>, content_type: &str) -> Result<(), AppError>;

    /// 按前缀列举，最多返回 `max_keys` 个，返回数量
    async fn count(&self, bucket: &str, prefix: &str, max_keys: i32) -> Result<usize, AppError>;
}

/// 待发送的邮件
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingEmail {
    pub source: String,
    pub recipients: Vec<String>,
    pub subject: String,
    pub body: String,
}

/// 邮件发送通道
#[async_trait::async_trait]
pub trait EmailTransport: Send + Sync {
    /// 发送邮件，返回消息 ID
    async fn send(&self, email: &OutgoingEmail) -> Result<String, AppError>;
}
