//! SMS Monitor - 短信投递失败率监控

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sms_monitor::{
    clients::{
        AthenaQueryEngine, EmailTransport, S3ObjectStore, SesTransport, SmtpTransport,
    },
    config::{EmailTransportKind, LoggingSettings, Settings},
    models::InvocationResponse,
    repositories::ObjectStateRepository,
    services::{
        EmailService, MonitorService, QueryOptions, QueryService, RepairService, StateService,
    },
};

#[derive(Parser)]
#[command(name = "sms-monitor", version, about = "短信投递失败率监控")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Clone, Copy)]
enum Command {
    /// 评估失败率并在告警级别变化时发送邮件（默认）
    Evaluate,
    /// 修复分区表元数据
    Repair,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // 加载环境变量
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // 加载配置
    let settings = Settings::load().context("配置加载失败")?;

    // 初始化日志
    init_tracing(&settings.logging);
    info!("✅ 配置加载完成");

    let sdk_config = aws_config::load_from_env().await;

    let engine = Arc::new(AthenaQueryEngine::new(&sdk_config));
    let query_service = Arc::new(QueryService::new(
        engine,
        QueryOptions::from_settings(&settings.athena, settings.thresholds),
    ));

    let success = match cli.command.unwrap_or(Command::Evaluate) {
        Command::Evaluate => {
            let object_store = Arc::new(S3ObjectStore::new(&sdk_config));
            let state_repo = Arc::new(ObjectStateRepository::new(object_store, &settings.storage));

            let transport: Arc<dyn EmailTransport> = match settings.email.transport {
                EmailTransportKind::Ses => Arc::new(SesTransport::new(&sdk_config)),
                EmailTransportKind::Smtp => Arc::new(
                    SmtpTransport::new(&settings.smtp).context("邮件服务初始化失败")?,
                ),
            };

            let monitor = MonitorService::new(
                query_service,
                Arc::new(StateService::new(state_repo)),
                Arc::new(EmailService::new(transport)),
                settings.email.clone(),
            );
            emit(&monitor.invoke().await)?
        }
        Command::Repair => {
            let repair = RepairService::new(query_service, settings.clone());
            emit(&repair.invoke().await)?
        }
    };

    if !success {
        std::process::exit(1);
    }
    Ok(())
}

/// 输出响应 JSON，返回是否成功
fn emit<T: Serialize>(response: &InvocationResponse<T>) -> anyhow::Result<bool> {
    println!("{}", serde_json::to_string_pretty(response)?);
    Ok(response.is_success())
}

/// 初始化日志系统
fn init_tracing(logging: &LoggingSettings) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&logging.level));

    let registry = tracing_subscriber::registry().with(env_filter);

    if logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}
