pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliArgs;

pub use adapters::{HttpClient, LocalStorage};
pub use app::sites::default_registry;
pub use config::{AccountsAdapter, ConfigAdapter, ConfigLoader};
pub use core::tasker::{Tasker, TaskerSummary};
pub use utils::error::{Result, TaskerError};
