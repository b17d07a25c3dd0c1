use crate::config::models::{
    Account, ConfigSection, DebugConfig, RequesterConfig, SiteConfig, TaskerConfig,
};
use crate::utils::error::{Result, TaskerError};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::OnceLock;

pub type SiteAccounts = BTreeMap<String, Account>;

/// Typed views over the raw site config.
#[derive(Debug, Clone)]
pub struct ConfigAdapter {
    raw: Value,
}

impl ConfigAdapter {
    pub fn new(raw: Value) -> Self {
        Self { raw }
    }

    fn global_section(&self, name: &str) -> Option<&Value> {
        self.raw.get("global").and_then(|g| g.get(name))
    }

    fn section<T: ConfigSection>(&self) -> Result<T> {
        let section_name = format!("global.{}", T::SECTION);
        let table = match self.global_section(T::SECTION) {
            None | Some(Value::Null) => return Ok(T::default()),
            Some(Value::Object(table)) => table,
            Some(other) => {
                return Err(TaskerError::ConfigTypeError {
                    section: section_name,
                    message: format!("expected a table, got {}", json_type_name(other)),
                })
            }
        };

        let mut filtered = Map::new();
        let mut unknown = Vec::new();
        for (key, value) in table {
            if T::FIELDS.contains(&key.as_str()) {
                filtered.insert(key.clone(), value.clone());
            } else {
                unknown.push(key.as_str());
            }
        }
        if !unknown.is_empty() {
            tracing::warn!(
                "[config] Ignoring unknown keys for [{}]: {}",
                section_name,
                unknown.join(", ")
            );
        }

        serde_json::from_value(Value::Object(filtered)).map_err(|e| TaskerError::ConfigTypeError {
            section: section_name,
            message: e.to_string(),
        })
    }

    pub fn requester_config(&self) -> Result<RequesterConfig> {
        self.section()
    }

    pub fn tasker_config(&self) -> Result<TaskerConfig> {
        self.section()
    }

    pub fn debug_config(&self) -> Result<DebugConfig> {
        self.section()
    }

    /// Names under `[sites]`, sorted.
    pub fn site_names(&self) -> Vec<String> {
        self.raw
            .get("sites")
            .and_then(Value::as_object)
            .map(|sites| {
                let mut names: Vec<String> = sites.keys().cloned().collect();
                names.sort();
                names
            })
            .unwrap_or_default()
    }

    pub fn site_config(&self, site: &str) -> Result<SiteConfig> {
        let section = format!("sites.{}", site);
        match self.raw.get("sites").and_then(|s| s.get(site)) {
            None | Some(Value::Null) => Ok(SiteConfig::default()),
            Some(value @ Value::Object(_)) => serde_json::from_value(value.clone())
                .map_err(|e| TaskerError::ConfigTypeError {
                    section,
                    message: e.to_string(),
                }),
            Some(other) => Err(TaskerError::ConfigTypeError {
                section,
                message: format!("expected a table, got {}", json_type_name(other)),
            }),
        }
    }
}

/// Accounts grouped by site, parsed once on first use.
#[derive(Debug)]
pub struct AccountsAdapter {
    raw: Value,
    parsed: OnceLock<BTreeMap<String, SiteAccounts>>,
}

impl AccountsAdapter {
    pub fn new(raw: Value) -> Self {
        Self {
            raw,
            parsed: OnceLock::new(),
        }
    }

    pub fn parse(&self) -> &BTreeMap<String, SiteAccounts> {
        self.parsed.get_or_init(|| {
            let mut all = BTreeMap::new();
            let Some(sites) = self.raw.as_object() else {
                return all;
            };

            for (site_name, site_block) in sites {
                let mut parsed = SiteAccounts::new();
                let accounts = site_block.get("accounts").and_then(Value::as_object);
                for (user_key, data) in accounts.into_iter().flatten() {
                    match serde_json::from_value::<Account>(data.clone()) {
                        Ok(account) => {
                            parsed.insert(user_key.clone(), account);
                        }
                        Err(e) => tracing::warn!(
                            "[config] Skipping account '{}' of site '{}': {}",
                            user_key,
                            site_name,
                            e
                        ),
                    }
                }
                all.insert(site_name.clone(), parsed);
            }
            all
        })
    }

    pub fn accounts(&self, site: &str) -> Option<&SiteAccounts> {
        self.parse().get(site)
    }

    pub fn account(&self, site: &str, user: &str) -> Result<&Account> {
        self.accounts(site)
            .and_then(|accounts| accounts.get(user))
            .ok_or_else(|| TaskerError::UnknownAccount {
                site: site.to_string(),
                user: user.to_string(),
            })
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "a table",
    }
}
