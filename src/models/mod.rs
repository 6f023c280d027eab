//! 数据模型模块

mod alert;
mod common;
mod query;
mod state;

pub use alert::*;
pub use common::*;
pub use query::*;
pub use state::*;
