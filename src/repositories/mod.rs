//! 数据访问层（Repository）

mod state_repo;

pub use state_repo::{ObjectStateRepository, StateStore};
