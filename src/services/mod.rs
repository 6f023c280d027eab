//! 业务逻辑层（Service）

mod email_service;
mod monitor_service;
mod query_service;
mod repair_service;
mod state_service;

pub use email_service::{alert_body, alert_subject, EmailService, SendResult};
pub use monitor_service::MonitorService;
pub use query_service::{parse_query_results, QueryOptions, QueryService};
pub use repair_service::RepairService;
pub use state_service::{has_state_changed, StateService};
