//! SES 邮件通道

use super::{EmailTransport, OutgoingEmail};
use crate::errors::AppError;
use aws_sdk_ses::error::DisplayErrorContext;
use aws_sdk_ses::types::{Body, Content, Destination, Message};
use aws_sdk_ses::Client;

/// 通过 Amazon SES 发送邮件
#[derive(Clone)]
pub struct SesTransport {
    client: Client,
}

impl SesTransport {
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            client: Client::new(sdk_config),
        }
    }
}

fn content(data: &str) -> Result<Content, AppError> {
    Content::builder()
        .data(data)
        .charset("UTF-8")
        .build()
        .map_err(|e| AppError::NotificationError(format!("邮件构建失败: {}", e)))
}

#[async_trait::async_trait]
impl EmailTransport for SesTransport {
    async fn send(&self, email: &OutgoingEmail) -> Result<String, AppError> {
        let message = Message::builder()
            .subject(content(&email.subject)?)
            .body(Body::builder().text(content(&email.body)?).build())
            .build();

        let destination = Destination::builder()
            .set_to_addresses(Some(email.recipients.clone()))
            .build();

        let output = self
            .client
            .send_email()
            .source(&email.source)
            .destination(destination)
            .message(message)
            .send()
            .await
            .map_err(|e| AppError::NotificationError(DisplayErrorContext(&e).to_string()))?;

        Ok(output.message_id().to_string())
    }
}
