//! SMS Monitor - 短信投递失败率监控
//!
//! 定期对已落盘的短信投递记录执行聚合查询，计算失败率并分级，
//! 与上一次记录的告警级别比较，仅在级别变化时发送邮件通知。
//! 另提供分区修复，使新写入的分区可被查询。

pub mod clients;
pub mod config;
pub mod errors;
pub mod models;
pub mod repositories;
pub mod services;
pub mod utils;

pub use errors::AppError;
