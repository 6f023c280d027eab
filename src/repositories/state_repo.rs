//! 告警状态仓库
//!
//! 在对象存储中维护两个对象：当前状态（每次评估覆盖写入）与
//! 状态变化历史（换行分隔的 JSON，只追加）。
//!
//! 并发限制：两者都没有版本校验。当前状态为后写者胜出；历史追加是
//! 读-改-写，并发调用可能丢失记录。部署上假定同一时刻只有一个调用。

use crate::clients::ObjectStore;
use crate::config::StorageSettings;
use crate::errors::AppError;
use crate::models::StateRecord;
use std::sync::Arc;

const STATE_CONTENT_TYPE: &str = "application/json";
const HISTORY_CONTENT_TYPE: &str = "application/jsonl";

/// 状态存储接口
#[async_trait::async_trait]
pub trait StateStore: Send + Sync {
    /// 当前状态对象是否存在；对象缺失返回 `false` 而不是错误
    async fn exists_current(&self) -> Result<bool, AppError>;

    /// 读取当前状态，调用前需确认存在
    async fn read_current(&self) -> Result<StateRecord, AppError>;

    /// 覆盖写入当前状态，失败返回 `false`
    async fn write_current(&self, record: &StateRecord) -> bool;

    /// 向历史追加一条记录，失败返回 `false`
    async fn append_history(&self, record: &StateRecord) -> bool;
}

/// 基于对象存储的状态仓库
#[derive(Clone)]
pub struct ObjectStateRepository {
    store: Arc<dyn ObjectStore>,
    bucket: String,
    state_key: String,
    history_key: String,
}

impl ObjectStateRepository {
    pub fn new(store: Arc<dyn ObjectStore>, settings: &StorageSettings) -> Self {
        Self {
            store,
            bucket: settings.bucket.clone(),
            state_key: settings.state_key.clone(),
            history_key: settings.history_key.clone(),
        }
    }

    /// 历史对象是否存在
    pub async fn exists_history(&self) -> Result<bool, AppError> {
        self.exists(&self.history_key).await
    }

    /// 读取完整历史，按写入顺序返回
    pub async fn read_history(&self) -> Result<Vec<StateRecord>, AppError> {
        let content = match self.store.get(&self.bucket, &self.history_key).await? {
            Some(bytes) => decode_utf8(bytes, &self.history_key)?,
            None => return Ok(Vec::new()),
        };

        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                serde_json::from_str(line).map_err(|e| {
                    AppError::StorageReadError(format!("历史记录解析失败: {}", e))
                })
            })
            .collect()
    }

    async fn exists(&self, key: &str) -> Result<bool, AppError> {
        Ok(self.store.count(&self.bucket, key, 1).await? > 0)
    }

    async fn try_append_history(&self, record: &StateRecord) -> Result<(), AppError> {
        let mut content = if self.exists_history().await? {
            match self.store.get(&self.bucket, &self.history_key).await? {
                Some(bytes) => decode_utf8(bytes, &self.history_key)?,
                None => String::new(),
            }
        } else {
            String::new()
        };

        if !content.is_empty() && !content.ends_with('\n') {
            content.push('\n');
        }
        content.push_str(&serde_json::to_string(record)?);
        content.push('\n');

        self.store
            .put(&self.bucket, &self.history_key, content.into_bytes(), HISTORY_CONTENT_TYPE)
            .await
    }
}

fn decode_utf8(bytes: Vec<u8>, key: &str) -> Result<String, AppError> {
    String::from_utf8(bytes)
        .map_err(|e| AppError::StorageReadError(format!("{} 不是有效的 UTF-8: {}", key, e)))
}

#[async_trait::async_trait]
impl StateStore for ObjectStateRepository {
    async fn exists_current(&self) -> Result<bool, AppError> {
        self.exists(&self.state_key).await
    }

    async fn read_current(&self) -> Result<StateRecord, AppError> {
        let bytes = self
            .store
            .get(&self.bucket, &self.state_key)
            .await?
            .ok_or_else(|| {
                AppError::StorageReadError(format!(
                    "当前状态不存在: s3://{}/{}",
                    self.bucket, self.state_key
                ))
            })?;

        let record: StateRecord = serde_json::from_slice(&bytes)
            .map_err(|e| AppError::StorageReadError(format!("当前状态解析失败: {}", e)))?;

        tracing::info!(
            alert_level = %record.alert_level,
            timestamp = %record.timestamp,
            "📊 已读取上次状态"
        );
        Ok(record)
    }

    async fn write_current(&self, record: &StateRecord) -> bool {
        let body = match serde_json::to_vec(record) {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(error = %e, "当前状态序列化失败");
                return false;
            }
        };

        match self
            .store
            .put(&self.bucket, &self.state_key, body, STATE_CONTENT_TYPE)
            .await
        {
            Ok(()) => {
                tracing::info!(
                    bucket = %self.bucket,
                    key = %self.state_key,
                    alert_level = %record.alert_level,
                    "💾 当前状态已更新"
                );
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, key = %self.state_key, "当前状态写入失败");
                false
            }
        }
    }

    async fn append_history(&self, record: &StateRecord) -> bool {
        match self.try_append_history(record).await {
            Ok(()) => {
                tracing::info!(
                    key = %self.history_key,
                    alert_level = %record.alert_level,
                    "📝 状态变化已写入历史"
                );
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, key = %self.history_key, "状态历史追加失败");
                false
            }
        }
    }
}
