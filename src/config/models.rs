use crate::utils::cookies::{resolve_cookies, to_cookie_header, RawCookies};
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_path, validate_positive_number, validate_seconds, validate_url, Validate,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

fn trimmed<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    let raw = String::deserialize(deserializer)?;
    Ok(raw.trim().to_string())
}

fn trimmed_opt<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty()))
}

fn default_true() -> bool {
    true
}

/// A `[global.*]` table that maps onto one struct.
pub trait ConfigSection: DeserializeOwned + Default {
    /// Key under `[global]`.
    const SECTION: &'static str;
    /// Keys the struct understands; anything else is dropped with a warning.
    const FIELDS: &'static [&'static str];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequesterConfig {
    #[serde(deserialize_with = "trimmed")]
    pub user_agent: String,
    pub request_interval: f64,
    pub retry_times: u32,
    pub retry_interval: f64,
    pub timeout: f64,
    // Browser-only settings, parsed for compatibility with existing files.
    pub headless: bool,
    #[serde(deserialize_with = "trimmed")]
    pub user_data_folder: String,
    #[serde(deserialize_with = "trimmed")]
    pub profile_name: String,
    pub auto_close: bool,
    pub disable_images: bool,
    pub mute_audio: bool,
}

impl Default for RequesterConfig {
    fn default() -> Self {
        Self {
            user_agent: String::new(),
            request_interval: 5.0,
            retry_times: 3,
            retry_interval: 5.0,
            timeout: 30.0,
            headless: true,
            user_data_folder: String::new(),
            profile_name: String::new(),
            auto_close: true,
            disable_images: true,
            mute_audio: true,
        }
    }
}

impl ConfigSection for RequesterConfig {
    const SECTION: &'static str = "requests";
    const FIELDS: &'static [&'static str] = &[
        "user_agent",
        "request_interval",
        "retry_times",
        "retry_interval",
        "timeout",
        "headless",
        "user_data_folder",
        "profile_name",
        "auto_close",
        "disable_images",
        "mute_audio",
    ];
}

impl Validate for RequesterConfig {
    fn validate(&self) -> Result<()> {
        validate_seconds("global.requests.request_interval", self.request_interval, true)?;
        validate_seconds("global.requests.retry_interval", self.retry_interval, true)?;
        validate_seconds("global.requests.timeout", self.timeout, false)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskerConfig {
    pub parallel: bool,
    pub max_workers: usize,
    pub save_results: bool,
    #[serde(deserialize_with = "trimmed")]
    pub results_path: String,
    pub generate_report: bool,
}

impl Default for TaskerConfig {
    fn default() -> Self {
        Self {
            parallel: false,
            max_workers: 5,
            save_results: false,
            results_path: "results/".to_string(),
            generate_report: false,
        }
    }
}

impl ConfigSection for TaskerConfig {
    const SECTION: &'static str = "runtime";
    const FIELDS: &'static [&'static str] = &[
        "parallel",
        "max_workers",
        "save_results",
        "results_path",
        "generate_report",
    ];
}

impl Validate for TaskerConfig {
    fn validate(&self) -> Result<()> {
        validate_positive_number("global.runtime.max_workers", self.max_workers, 1)?;
        if self.save_results || self.generate_report {
            validate_path("global.runtime.results_path", &self.results_path)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    #[serde(alias = "debug")]
    Debug,
    #[default]
    #[serde(alias = "info")]
    Info,
    #[serde(alias = "warning", alias = "WARN", alias = "warn")]
    Warning,
    #[serde(alias = "error")]
    Error,
}

impl LogLevel {
    /// Level name as understood by `EnvFilter`.
    pub fn as_directive(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    pub log_level: LogLevel,
}

impl ConfigSection for DebugConfig {
    const SECTION: &'static str = "debug";
    const FIELDS: &'static [&'static str] = &["log_level"];
}

/// One `[sites.<name>]` table. Keys beyond `enabled` and `signin_url` are
/// site specific and kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default, deserialize_with = "trimmed_opt")]
    pub signin_url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            signin_url: None,
            extra: Map::new(),
        }
    }
}

impl SiteConfig {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    /// String extra, trimmed; empty strings count as absent.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.extra
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("enabled".to_string(), Value::Bool(self.enabled));
        map.insert(
            "signin_url".to_string(),
            self.signin_url.clone().map(Value::String).unwrap_or(Value::Null),
        );
        for (key, value) in &self.extra {
            map.insert(key.clone(), value.clone());
        }
        Value::Object(map)
    }
}

impl Validate for SiteConfig {
    fn validate(&self) -> Result<()> {
        if let Some(url) = &self.signin_url {
            validate_url("signin_url", url)?;
        }
        if let Some(url) = self.get_str("check_url") {
            validate_url("check_url", url)?;
        }
        Ok(())
    }
}

/// An account exactly as written in the accounts file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AccountEntry {
    pub username: Option<String>,
    pub password: Option<String>,
    pub cookies: Option<RawCookies>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "AccountEntry")]
pub struct Account {
    pub username: String,
    pub password: String,
    pub cookies: BTreeMap<String, String>,
}

impl From<AccountEntry> for Account {
    fn from(entry: AccountEntry) -> Self {
        Self {
            username: entry.username.unwrap_or_default().trim().to_string(),
            password: entry.password.unwrap_or_default().trim().to_string(),
            cookies: entry
                .cookies
                .map(|raw| resolve_cookies(&raw))
                .unwrap_or_default(),
        }
    }
}

impl Account {
    pub fn cookie_header(&self) -> Option<String> {
        (!self.cookies.is_empty()).then(|| to_cookie_header(&self.cookies))
    }
}
