//! 告警状态变化检测

use crate::errors::AppError;
use crate::models::{QueryMetrics, StateChange, StateRecord};
use crate::repositories::StateStore;
use crate::utils::{parse_state_timestamp, state_timestamp_now};
use chrono::Utc;
use std::sync::Arc;

/// 状态变化检测服务
///
/// 状态机 {UNKNOWN, OK, WARNING, CRITICAL}，上一状态通过 [`StateStore`]
/// 跨调用保存。首次运行（无当前状态对象）前序为 UNKNOWN，必定视为变化。
pub struct StateService {
    store: Arc<dyn StateStore>,
}

impl StateService {
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self { store }
    }

    /// 比较并记录新状态
    ///
    /// 当前状态总是先写入，再按需追加历史；两者的写入失败都只记录日志。
    pub async fn process_state_change(&self, metrics: &QueryMetrics) -> Result<StateChange, AppError> {
        let current_state = StateRecord::from_metrics(metrics, state_timestamp_now());

        let (previous_state, state_changed) = if self.store.exists_current().await? {
            let previous = self.store.read_current().await?;
            let changed = has_state_changed(&current_state, &previous);
            (previous, changed)
        } else {
            tracing::info!("首次运行，尚无历史状态");
            (StateRecord::bootstrap(), true)
        };

        if state_changed {
            let since = parse_state_timestamp(&previous_state.timestamp)
                .map(|t| (Utc::now() - t).num_minutes());
            tracing::warn!(
                previous_level = %previous_state.alert_level,
                alert_level = %current_state.alert_level,
                previous_minutes = ?since,
                "🚨 告警状态发生变化"
            );
        } else {
            tracing::info!(alert_level = %current_state.alert_level, "✓ 告警状态未变化");
        }

        if !self.store.write_current(&current_state).await {
            tracing::warn!("当前状态未能持久化，继续进行通知判断");
        }

        if state_changed && !self.store.append_history(&current_state).await {
            tracing::warn!("状态变化未能写入历史");
        }

        Ok(StateChange {
            state_changed,
            current_state,
            previous_state,
        })
    }
}

/// 级别不同即视为变化；上一状态缺少级别时为 UNKNOWN，同样视为变化
pub fn has_state_changed(current: &StateRecord, previous: &StateRecord) -> bool {
    current.alert_level != previous.alert_level
}
