//! 时间处理工具

use chrono::{DateTime, NaiveDateTime, Utc};

/// 状态记录使用的时间格式（UTC）
pub const STATE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 当前 UTC 时间的状态时间戳
pub fn state_timestamp_now() -> String {
    format_state_timestamp(&Utc::now())
}

/// 格式化为状态时间戳
pub fn format_state_timestamp(dt: &DateTime<Utc>) -> String {
    dt.format(STATE_TIMESTAMP_FORMAT).to_string()
}

/// 解析状态时间戳，`N/A` 等占位值返回 `None`
pub fn parse_state_timestamp(s: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(s, STATE_TIMESTAMP_FORMAT)
        .ok()
        .map(|dt| dt.and_utc())
}
