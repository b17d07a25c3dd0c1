pub mod adapter;
#[cfg(feature = "cli")]
pub mod cli;
pub mod loader;
pub mod models;
pub mod paths;

pub use adapter::{AccountsAdapter, ConfigAdapter};
pub use loader::ConfigLoader;
pub use models::{Account, DebugConfig, LogLevel, RequesterConfig, SiteConfig, TaskerConfig};
