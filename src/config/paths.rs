//! Application identity, default file locations and request defaults.

use std::path::PathBuf;

pub const PACKAGE_NAME: &str = "daily_tasker";
pub const APP_NAME: &str = "DailyTasker";
pub const APP_DIR_NAME: &str = "daily_tasker";

/// Overrides the platform config directory when set.
pub const HOME_ENV_VAR: &str = "DAILY_TASKER_HOME";

pub const SITE_CONFIG_FILENAME: &str = "site_config.toml";
pub const SITE_ACCOUNTS_FILENAME: &str = "site_accounts.toml";

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
AppleWebKit/537.36 (KHTML, like Gecko) \
Chrome/136.0.0.0 Safari/537.36 Edg/136.0.0.0";

pub const DEFAULT_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";

pub const DEFAULT_ACCEPT_LANGUAGE: &str = "en,zh;q=0.9,zh-CN;q=0.8";

pub const SITE_CONFIG_TEMPLATE: &str = include_str!("../../templates/site_config.toml");
pub const SITE_ACCOUNTS_TEMPLATE: &str = include_str!("../../templates/site_accounts.toml");

pub fn base_config_dir() -> PathBuf {
    if let Some(home) = std::env::var_os(HOME_ENV_VAR).filter(|v| !v.is_empty()) {
        return PathBuf::from(home);
    }
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(".").join(format!(".{}", APP_DIR_NAME)))
}

pub fn config_dir() -> PathBuf {
    base_config_dir().join("config")
}

/// Global fallbacks for the site config, in lookup order.
pub fn site_config_fallbacks() -> Vec<PathBuf> {
    let dir = config_dir();
    vec![dir.join("site_config.toml"), dir.join("site_config.json")]
}

/// Global fallbacks for the accounts file, in lookup order.
pub fn site_accounts_fallbacks() -> Vec<PathBuf> {
    let dir = config_dir();
    vec![dir.join("site_accounts.toml"), dir.join("site_accounts.json")]
}
