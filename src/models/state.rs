//! 告警状态模型

use super::alert::{format_rate, AlertLevel, QueryMetrics};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// 持久化的状态级别
///
/// `Unknown` 仅用于首次运行（尚无当前状态对象）；读取到缺失或无法识别的
/// 级别时同样落到 `Unknown`，保证与任何新级别比较都视为变化。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum StateLevel {
    Ok,
    Warning,
    Critical,
    #[default]
    #[serde(other)]
    Unknown,
}

impl StateLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            StateLevel::Unknown => "UNKNOWN",
            StateLevel::Ok => "OK",
            StateLevel::Warning => "WARNING",
            StateLevel::Critical => "CRITICAL",
        }
    }
}

impl From<AlertLevel> for StateLevel {
    fn from(level: AlertLevel) -> Self {
        match level {
            AlertLevel::Ok => StateLevel::Ok,
            AlertLevel::Warning => StateLevel::Warning,
            AlertLevel::Critical => StateLevel::Critical,
        }
    }
}

impl fmt::Display for StateLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 状态记录中的计数值，兼容历史数据中的字符串写法
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum MetricValue {
    Integer(i64),
    Decimal(f64),
    Text(String),
}

impl Default for MetricValue {
    fn default() -> Self {
        MetricValue::Integer(0)
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Integer(v) => write!(f, "{}", v),
            MetricValue::Decimal(v) => f.write_str(&format_rate(*v)),
            MetricValue::Text(v) => f.write_str(v),
        }
    }
}

/// 状态快照
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StateRecord {
    #[serde(default = "not_available")]
    pub timestamp: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub alert_level: StateLevel,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_messages: MetricValue,
    #[serde(default, deserialize_with = "null_as_default")]
    pub failed_messages: MetricValue,
    #[serde(default = "zero_rate", deserialize_with = "null_as_zero_rate")]
    pub failure_rate: MetricValue,
}

fn not_available() -> String { "N/A".to_string() }
fn zero_rate() -> MetricValue { MetricValue::Decimal(0.0) }

// 查询引擎可能返回空值，旧记录中因此存在 null 字段
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_zero_rate<'de, D>(deserializer: D) -> Result<MetricValue, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<MetricValue>::deserialize(deserializer)?.unwrap_or_else(zero_rate))
}

impl StateRecord {
    /// 由查询结果构造，附带 UTC 时间戳
    pub fn from_metrics(metrics: &QueryMetrics, timestamp: String) -> Self {
        Self {
            timestamp,
            alert_level: metrics.alert_level.into(),
            total_messages: MetricValue::Integer(metrics.total_messages),
            failed_messages: MetricValue::Integer(metrics.failed_messages),
            failure_rate: MetricValue::Decimal(metrics.failure_rate),
        }
    }

    /// 首次运行时的占位前序状态
    pub fn bootstrap() -> Self {
        Self {
            timestamp: not_available(),
            alert_level: StateLevel::Unknown,
            total_messages: MetricValue::default(),
            failed_messages: MetricValue::default(),
            failure_rate: zero_rate(),
        }
    }
}

/// 状态比较结果
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StateChange {
    pub state_changed: bool,
    pub current_state: StateRecord,
    pub previous_state: StateRecord,
}
