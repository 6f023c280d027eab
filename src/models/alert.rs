//! 告警模型

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 告警级别
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertLevel {
    Ok,
    Warning,
    Critical,
}

impl AlertLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertLevel::Ok => "OK",
            AlertLevel::Warning => "WARNING",
            AlertLevel::Critical => "CRITICAL",
        }
    }

    /// 按默认阈值根据失败率分级
    ///
    /// 失败率为 `None`（总数为 0）时视为 OK。
    pub fn from_failure_rate(rate: Option<f64>) -> Self {
        AlertThresholds::default().classify(rate)
    }
}

impl fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "OK" => Ok(AlertLevel::Ok),
            "WARNING" => Ok(AlertLevel::Warning),
            "CRITICAL" => Ok(AlertLevel::Critical),
            other => Err(format!("未知的告警级别: {}", other)),
        }
    }
}

/// 失败率阈值（百分比）
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AlertThresholds {
    #[serde(default = "default_warning_percent")]
    pub warning_percent: f64,
    #[serde(default = "default_critical_percent")]
    pub critical_percent: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            warning_percent: default_warning_percent(),
            critical_percent: default_critical_percent(),
        }
    }
}

fn default_warning_percent() -> f64 { 3.0 }
fn default_critical_percent() -> f64 { 25.0 }

impl AlertThresholds {
    /// `[0, warning)` → OK，`[warning, critical)` → WARNING，`>= critical` → CRITICAL
    pub fn classify(&self, rate: Option<f64>) -> AlertLevel {
        match rate {
            Some(r) if r >= self.critical_percent => AlertLevel::Critical,
            Some(r) if r >= self.warning_percent => AlertLevel::Warning,
            _ => AlertLevel::Ok,
        }
    }
}

/// 计算失败率（百分比，保留两位小数），总数为 0 时无定义
///
/// 分级与展示使用同一个舍入后的值，邮件中的失败率与级别不会互相矛盾。
pub fn failure_rate(total: i64, failed: i64) -> Option<f64> {
    if total <= 0 {
        return None;
    }
    Some(round_two(failed as f64 * 100.0 / total as f64))
}

/// 一次聚合查询的结果
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryMetrics {
    pub total_messages: i64,
    pub failed_messages: i64,
    pub failure_rate: f64,
    pub alert_level: AlertLevel,
}

impl QueryMetrics {
    /// 由计数构造，失败率与级别按阈值计算
    pub fn from_counts(total_messages: i64, failed_messages: i64, thresholds: &AlertThresholds) -> Self {
        let rate = failure_rate(total_messages, failed_messages);
        Self {
            total_messages,
            failed_messages,
            failure_rate: rate.unwrap_or(0.0),
            alert_level: thresholds.classify(rate),
        }
    }

    /// 失败率展示文本，整数值保留一位小数（30 → "30.0"）
    pub fn failure_rate_display(&self) -> String {
        format_rate(self.failure_rate)
    }
}

pub(crate) fn format_rate(rate: f64) -> String {
    if rate.fract() == 0.0 {
        format!("{:.1}", rate)
    } else {
        format!("{}", rate)
    }
}

fn round_two(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
