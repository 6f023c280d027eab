//! 告警邮件服务

use crate::clients::{EmailTransport, OutgoingEmail};
use crate::config::EmailConfig;
use crate::errors::AppError;
use crate::models::{AlertLevel, QueryMetrics};
use std::sync::Arc;

/// 邮件发送结果
#[derive(Debug, Clone, PartialEq)]
pub struct SendResult {
    pub message_id: String,
    pub subject: String,
    pub recipients: usize,
}

/// 告警邮件服务
pub struct EmailService {
    transport: Arc<dyn EmailTransport>,
}

impl EmailService {
    pub fn new(transport: Arc<dyn EmailTransport>) -> Self {
        Self { transport }
    }

    /// 发送告警邮件
    pub async fn send_alert(&self, metrics: &QueryMetrics, config: &EmailConfig) -> Result<SendResult, AppError> {
        let email = OutgoingEmail {
            source: config.source_address.clone(),
            recipients: config.recipients.clone(),
            subject: alert_subject(metrics.alert_level).to_string(),
            body: alert_body(metrics),
        };

        let message_id = self.transport.send(&email).await.map_err(|e| {
            tracing::error!(error = %e, alert_level = %metrics.alert_level, "告警邮件发送失败");
            match e {
                AppError::NotificationError(_) => e,
                other => AppError::NotificationError(other.to_string()),
            }
        })?;

        tracing::info!(
            message_id = %message_id,
            alert_level = %metrics.alert_level,
            recipients = email.recipients.len(),
            "📧 告警邮件已发送"
        );

        Ok(SendResult {
            message_id,
            subject: email.subject,
            recipients: email.recipients.len(),
        })
    }
}

/// 根据级别确定邮件主题
pub fn alert_subject(level: AlertLevel) -> &'static str {
    match level {
        AlertLevel::Critical => "Critical: SMS Failure Alert",
        AlertLevel::Warning => "Warning: SMS Failure Alert",
        AlertLevel::Ok => "Cleared: SMS Failure Alert",
    }
}

/// 纯文本邮件正文
pub fn alert_body(metrics: &QueryMetrics) -> String {
    format!(
        "Alert Level: {}\nTotal Messages: {}\nFailed Messages: {}\nFailure Rate: {}%\n",
        metrics.alert_level,
        metrics.total_messages,
        metrics.failed_messages,
        metrics.failure_rate_display(),
    )
}
