//! 失败率监控编排
//!
//! 查询 → 状态比较 → （状态变化时）发送邮件，所有结果统一为
//! [`InvocationResponse`]，错误不会越过这一层。

use crate::config::EmailSettings;
use crate::errors::AppError;
use crate::models::{EvaluationOutcome, InvocationResponse};
use crate::services::{EmailService, QueryService, StateService};
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

/// 监控编排服务
pub struct MonitorService {
    query_service: Arc<QueryService>,
    state_service: Arc<StateService>,
    email_service: Arc<EmailService>,
    email_settings: EmailSettings,
}

impl MonitorService {
    pub fn new(
        query_service: Arc<QueryService>,
        state_service: Arc<StateService>,
        email_service: Arc<EmailService>,
        email_settings: EmailSettings,
    ) -> Self {
        Self {
            query_service,
            state_service,
            email_service,
            email_settings,
        }
    }

    /// 执行一次评估
    ///
    /// 邮件配置在开始时校验；状态先落盘再通知，通知失败不会回滚已记录的状态。
    pub async fn evaluate(&self) -> Result<EvaluationOutcome, AppError> {
        let email_config = self.email_settings.email_config()?;

        let metrics = self.query_service.execute_query().await?;
        let change = self.state_service.process_state_change(&metrics).await?;

        let message_id = if change.state_changed {
            let result = self.email_service.send_alert(&metrics, &email_config).await?;
            Some(result.message_id)
        } else {
            tracing::info!(alert_level = %metrics.alert_level, "状态未变化，跳过通知");
            None
        };

        Ok(EvaluationOutcome {
            state_changed: change.state_changed,
            notification_sent: message_id.is_some(),
            message_id,
            current_state: change.current_state,
            previous_state: change.previous_state,
        })
    }

    /// 执行评估并生成统一响应
    pub async fn invoke(&self) -> InvocationResponse<EvaluationOutcome> {
        let invocation_id = Uuid::new_v4().to_string();
        let span = tracing::info_span!("evaluate", invocation_id = %invocation_id);

        let response = async {
            tracing::info!("🌱 开始失败率评估");
            match self.evaluate().await {
                Ok(outcome) => {
                    let message = if outcome.state_changed {
                        "Alert state changed, notification sent"
                    } else {
                        "Alert state unchanged, no notification sent"
                    };
                    tracing::info!(state_changed = outcome.state_changed, "✅ 评估完成");
                    InvocationResponse::success(message, outcome)
                }
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        code = e.category().as_str(),
                        "评估失败"
                    );
                    InvocationResponse::failure(&e)
                }
            }
        }
        .instrument(span)
        .await;

        response.with_invocation_id(invocation_id)
    }
}
