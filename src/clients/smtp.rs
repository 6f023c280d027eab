//! SMTP 邮件通道

use super::{EmailTransport, OutgoingEmail};
use crate::config::{Settings, SmtpSettings};
use crate::errors::AppError;
use lettre::{
    message::Mailbox, transport::smtp::authentication::Credentials, AsyncSmtpTransport,
    AsyncTransport, Message, Tokio1Executor,
};
use secrecy::ExposeSecret;

/// 通过 SMTP 发送邮件
pub struct SmtpTransport {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpTransport {
    /// 创建 SMTP 通道，密码取自 `SMTP_PASSWORD`
    pub fn new(smtp_settings: &SmtpSettings) -> Result<Self, AppError> {
        let password = Settings::smtp_password()
            .ok_or_else(|| AppError::ConfigError("SMTP_PASSWORD 未设置".to_string()))?;

        let creds = Credentials::new(
            smtp_settings.username.clone(),
            password.expose_secret().clone(),
        );

        let mailer = if smtp_settings.tls {
            // 465 端口使用隐式 TLS，其余使用 STARTTLS
            let builder = if smtp_settings.port == 465 {
                AsyncSmtpTransport::<Tokio1Executor>::relay(&smtp_settings.host)
            } else {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&smtp_settings.host)
            };
            builder
                .map_err(|e| AppError::ConfigError(format!("SMTP 配置错误: {}", e)))?
                .port(smtp_settings.port)
                .credentials(creds)
                .build()
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&smtp_settings.host)
                .port(smtp_settings.port)
                .credentials(creds)
                .build()
        };

        tracing::info!(host = %smtp_settings.host, port = smtp_settings.port, "SMTP 通道已配置");

        Ok(Self { mailer })
    }
}

fn mailbox(address: &str) -> Result<Mailbox, AppError> {
    address
        .parse()
        .map_err(|e| AppError::NotificationError(format!("邮箱地址无效 {}: {}", address, e)))
}

#[async_trait::async_trait]
impl EmailTransport for SmtpTransport {
    async fn send(&self, email: &OutgoingEmail) -> Result<String, AppError> {
        let mut builder = Message::builder()
            .from(mailbox(&email.source)?)
            .subject(email.subject.clone());
        for recipient in &email.recipients {
            builder = builder.to(mailbox(recipient)?);
        }

        let message = builder
            .body(email.body.clone())
            .map_err(|e| AppError::NotificationError(format!("邮件构建失败: {}", e)))?;

        let response = self
            .mailer
            .send(message)
            .await
            .map_err(|e| AppError::NotificationError(e.to_string()))?;

        Ok(response.message().collect::<Vec<_>>().join(" "))
    }
}
