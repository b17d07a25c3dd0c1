pub mod registry;
pub mod session;
pub mod tasker;

pub use crate::domain::model::{SiteRunReport, TaskOutput, TaskRecord, TaskStatus};
pub use crate::domain::ports::{Site, Storage, Task};
pub use crate::utils::error::Result;
