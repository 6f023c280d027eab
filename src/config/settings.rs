//! 应用配置加载和管理

use crate::errors::AppError;
use crate::models::AlertThresholds;
use config::{Config, ConfigError, Environment, File};
use secrecy::SecretString;
use serde::Deserialize;
use std::env;
use validator::Validate;

/// 应用配置结构
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub athena: AthenaSettings,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub email: EmailSettings,
    #[serde(default)]
    pub smtp: SmtpSettings,
    #[serde(default)]
    pub thresholds: AlertThresholds,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Athena 查询配置
#[derive(Debug, Clone, Deserialize)]
pub struct AthenaSettings {
    #[serde(default)]
    pub workgroup: String,
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default = "default_table")]
    pub table: String,
    /// 查询结果输出位置（s3://bucket/prefix）
    #[serde(default)]
    pub output_location: Option<String>,
    /// 告警查询轮询间隔（毫秒）
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// 分区修复轮询间隔（毫秒）
    #[serde(default = "default_repair_poll_interval_ms")]
    pub repair_poll_interval_ms: u64,
    /// 最长等待时间（秒）
    #[serde(default = "default_max_wait_seconds")]
    pub max_wait_seconds: u64,
    /// 统计窗口（分钟）
    #[serde(default = "default_window_minutes")]
    pub window_minutes: u32,
}

impl Default for AthenaSettings {
    fn default() -> Self {
        Self {
            workgroup: String::new(),
            database: default_database(),
            table: default_table(),
            output_location: None,
            poll_interval_ms: default_poll_interval_ms(),
            repair_poll_interval_ms: default_repair_poll_interval_ms(),
            max_wait_seconds: default_max_wait_seconds(),
            window_minutes: default_window_minutes(),
        }
    }
}

fn default_database() -> String { "clicksend_canary".to_string() }
fn default_table() -> String { "sms_logs".to_string() }
fn default_poll_interval_ms() -> u64 { 1000 }
fn default_repair_poll_interval_ms() -> u64 { 2000 }
fn default_max_wait_seconds() -> u64 { 180 }
fn default_window_minutes() -> u32 { 30 }

/// 状态存储配置
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    #[serde(default = "default_bucket")]
    pub bucket: String,
    #[serde(default = "default_state_key")]
    pub state_key: String,
    #[serde(default = "default_history_key")]
    pub history_key: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            bucket: default_bucket(),
            state_key: default_state_key(),
            history_key: default_history_key(),
        }
    }
}

fn default_bucket() -> String { "clicksend-canary-data".to_string() }
fn default_state_key() -> String { "alert_state/current_state.json".to_string() }
fn default_history_key() -> String { "alert_state/state_history.jsonl".to_string() }

/// 邮件发送通道
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EmailTransportKind {
    #[default]
    Ses,
    Smtp,
}

/// 告警邮件配置（原始值，调用开始时校验）
#[derive(Debug, Clone, Deserialize, Default)]
pub struct EmailSettings {
    #[serde(default)]
    pub transport: EmailTransportKind,
    #[serde(default)]
    pub source_email: String,
    /// 逗号分隔的收件人列表
    #[serde(default)]
    pub recipients: String,
}

/// 校验后的告警邮件配置
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct EmailConfig {
    #[validate(email(message = "发件人邮箱格式无效"))]
    pub source_address: String,
    #[validate(length(min = 1, message = "收件人列表为空"))]
    pub recipients: Vec<String>,
}

impl EmailSettings {
    /// 解析并校验发件人与收件人
    pub fn email_config(&self) -> Result<EmailConfig, AppError> {
        let source_address = self.source_email.trim().to_string();
        if source_address.is_empty() {
            return Err(AppError::ConfigError("SES_SOURCE_EMAIL 未设置".to_string()));
        }

        let recipients = parse_recipients(&self.recipients);
        if recipients.is_empty() {
            return Err(AppError::ConfigError("ALERT_RECIPIENTS 未设置或为空".to_string()));
        }

        let config = EmailConfig { source_address, recipients };
        config.validate()?;

        if let Some(bad) = config.recipients.iter().find(|r| !validator::validate_email(r.as_str())) {
            return Err(AppError::ConfigError(format!("收件人邮箱格式无效: {}", bad)));
        }

        Ok(config)
    }
}

/// 拆分逗号分隔的收件人，去除空白与空项
pub fn parse_recipients(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// SMTP 邮件服务配置
#[derive(Debug, Clone, Deserialize)]
pub struct SmtpSettings {
    /// SMTP 服务器地址
    #[serde(default = "default_smtp_host")]
    pub host: String,
    /// SMTP 端口
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    /// SMTP 用户名
    #[serde(default)]
    pub username: String,
    /// 是否使用 TLS
    #[serde(default = "default_true")]
    pub tls: bool,
}

impl Default for SmtpSettings {
    fn default() -> Self {
        Self {
            host: default_smtp_host(),
            port: default_smtp_port(),
            username: String::new(),
            tls: true,
        }
    }
}

fn default_smtp_host() -> String { "smtp.example.com".to_string() }
fn default_smtp_port() -> u16 { 587 }
fn default_true() -> bool { true }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// `pretty` 或 `json`
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info,sms_monitor=debug".to_string() }
fn default_log_format() -> String { "pretty".to_string() }

/// 分区修复所需配置
#[derive(Debug, Clone, PartialEq)]
pub struct RepairConfig {
    pub database: String,
    pub table: String,
    pub workgroup: String,
    pub output_location: String,
}

impl Settings {
    /// 从配置文件和环境变量加载配置
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("APP_ENV").unwrap_or_else(|_| "development".into());

        let settings = Config::builder()
            // 加载默认配置
            .add_source(File::with_name("config/default").required(false))
            // 根据环境加载对应配置
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // 环境变量覆盖，前缀 SMS_MONITOR，分隔符 __
            .add_source(
                Environment::with_prefix("SMS_MONITOR")
                    .prefix_separator("_")
                    .separator("__"),
            )
            // 兼容已部署函数使用的扁平环境变量
            .set_override_option("athena.workgroup", non_empty_var("ATHENA_WORKGROUP"))?
            .set_override_option("athena.database", non_empty_var("ATHENA_DATABASE"))?
            .set_override_option("athena.table", non_empty_var("ATHENA_TABLE"))?
            .set_override_option("athena.output_location", legacy_output_location())?
            .set_override_option("storage.bucket", non_empty_var("S3_BUCKET"))?
            .set_override_option("email.source_email", non_empty_var("SES_SOURCE_EMAIL"))?
            .set_override_option("email.recipients", env::var("ALERT_RECIPIENTS").ok())?
            .build()?;

        settings.try_deserialize()
    }

    /// 校验告警邮件配置
    pub fn email_config(&self) -> Result<EmailConfig, AppError> {
        self.email.email_config()
    }

    /// 校验分区修复配置，缺失项一并报告
    pub fn repair_config(&self) -> Result<RepairConfig, AppError> {
        let output_location = self.athena.output_location.clone().unwrap_or_default();
        let required = [
            ("ATHENA_DATABASE", self.athena.database.trim()),
            ("ATHENA_TABLE", self.athena.table.trim()),
            ("ATHENA_WORKGROUP", self.athena.workgroup.trim()),
            ("S3_OUTPUT_BUCKET/S3_OUTPUT_PREFIX", output_location.trim()),
        ];

        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.is_empty())
            .map(|(name, _)| *name)
            .collect();

        if !missing.is_empty() {
            return Err(AppError::ConfigError(format!(
                "缺少必需的环境变量: {}",
                missing.join(", ")
            )));
        }

        Ok(RepairConfig {
            database: self.athena.database.trim().to_string(),
            table: self.athena.table.trim().to_string(),
            workgroup: self.athena.workgroup.trim().to_string(),
            output_location: output_location.trim().to_string(),
        })
    }

    /// 获取 SMTP 密码（从环境变量）
    pub fn smtp_password() -> Option<SecretString> {
        env::var("SMTP_PASSWORD").ok().map(SecretString::new)
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

// 桶与前缀必须同时提供
fn legacy_output_location() -> Option<String> {
    let bucket = non_empty_var("S3_OUTPUT_BUCKET")?;
    let prefix = non_empty_var("S3_OUTPUT_PREFIX")?;
    Some(format!("s3://{}/{}", bucket, prefix.trim_start_matches('/')))
}
