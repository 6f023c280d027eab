//! 配置管理模块

mod settings;

pub use settings::{
	parse_recipients,
	AthenaSettings,
	EmailConfig,
	EmailSettings,
	EmailTransportKind,
	LoggingSettings,
	RepairConfig,
	Settings,
	SmtpSettings,
	StorageSettings,
};
