//! Locating and parsing the site config and accounts files.
//!
//! Lookup order for each file:
//! 1. a path given on the command line
//! 2. the default file name in the working directory
//! 3. the global fallbacks under the platform config directory

use crate::config::paths;
use crate::utils::error::{Result, TaskerError};
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| path.to_path_buf()),
        Err(_) => path.to_path_buf(),
    }
}

pub fn resolve_file_path(
    user_path: Option<&Path>,
    working_dir: &Path,
    local_filename: &str,
    fallbacks: &[PathBuf],
) -> Option<PathBuf> {
    if let Some(user_path) = user_path {
        let path = expand_home(user_path);
        let path = std::fs::canonicalize(&path).unwrap_or(path);
        if path.is_file() {
            return Some(path);
        }
        tracing::warn!("[config] Specified file not found: {}", path.display());
    }

    let local_path = working_dir.join(local_filename);
    if local_path.is_file() {
        tracing::debug!("[config] Using local file: {}", local_path.display());
        return Some(local_path);
    }

    if let Some(fallback) = fallbacks.iter().find(|p| p.is_file()) {
        tracing::debug!("[config] Using fallback file: {}", fallback.display());
        return Some(fallback.clone());
    }

    tracing::warn!("[config] No file found at any location for: {}", local_filename);
    None
}

/// Replaces `${VAR}` with the environment value; unknown variables stay as written.
pub fn substitute_env_vars(content: &str) -> String {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").unwrap());

    re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
    })
    .into_owned()
}

fn ensure_table(data: Value, path: &Path, format: &str) -> Value {
    if data.is_object() {
        return data;
    }
    tracing::warn!(
        "[config] {} content is not a table: {}",
        format.to_uppercase(),
        path.display()
    );
    Value::Object(Map::new())
}

/// Parses a `.toml` or `.json` file into a JSON value.
pub fn load_by_extension(path: &Path) -> Result<Value> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "json" => {
            let content = substitute_env_vars(&std::fs::read_to_string(path)?);
            let data: Value = serde_json::from_str(&content)?;
            Ok(ensure_table(data, path, "json"))
        }
        "toml" => {
            let content = substitute_env_vars(&std::fs::read_to_string(path)?);
            let data: Value = toml::from_str(&content).map_err(|e| TaskerError::TomlError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
            Ok(ensure_table(data, path, "toml"))
        }
        _ => Err(TaskerError::UnsupportedExtension {
            extension: if extension.is_empty() {
                "<none>".to_string()
            } else {
                format!(".{}", extension)
            },
        }),
    }
}

/// Loads config files and remembers what it parsed, keyed by resolved path.
pub struct ConfigLoader {
    working_dir: PathBuf,
    config_fallbacks: Vec<PathBuf>,
    accounts_fallbacks: Vec<PathBuf>,
    cache: Mutex<HashMap<PathBuf, Value>>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        let working_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::with_locations(
            working_dir,
            paths::site_config_fallbacks(),
            paths::site_accounts_fallbacks(),
        )
    }

    pub fn with_locations(
        working_dir: PathBuf,
        config_fallbacks: Vec<PathBuf>,
        accounts_fallbacks: Vec<PathBuf>,
    ) -> Self {
        Self {
            working_dir,
            config_fallbacks,
            accounts_fallbacks,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn load_site_config(&self, config_path: Option<&Path>) -> Result<Value> {
        let path = resolve_file_path(
            config_path,
            &self.working_dir,
            paths::SITE_CONFIG_FILENAME,
            &self.config_fallbacks,
        )
        .ok_or_else(|| TaskerError::MissingConfigFile {
            kind: "site config".to_string(),
        })?;
        self.load_cached(&path)
    }

    pub fn load_site_accounts(&self, accounts_path: Option<&Path>) -> Result<Value> {
        let path = resolve_file_path(
            accounts_path,
            &self.working_dir,
            paths::SITE_ACCOUNTS_FILENAME,
            &self.accounts_fallbacks,
        )
        .ok_or_else(|| TaskerError::MissingConfigFile {
            kind: "site accounts".to_string(),
        })?;
        self.load_cached(&path)
    }

    fn load_cached(&self, path: &Path) -> Result<Value> {
        if let Some(value) = self.lock_cache().get(path) {
            tracing::debug!("[config] Cache hit: {}", path.display());
            return Ok(value.clone());
        }

        tracing::info!("[config] Loading {}", path.display());
        let value = load_by_extension(path)?;
        self.lock_cache().insert(path.to_path_buf(), value.clone());
        Ok(value)
    }

    pub fn clear_cache(&self) {
        self.lock_cache().clear();
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, HashMap<PathBuf, Value>> {
        // a poisoned cache only means another thread panicked mid-insert
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Writes the bundled templates into `dir`. Existing files are left alone
/// unless `overwrite` is set. Returns the files that were written.
pub fn write_templates(dir: &Path, overwrite: bool) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;

    let mut written = Vec::new();
    for (name, content) in [
        (paths::SITE_CONFIG_FILENAME, paths::SITE_CONFIG_TEMPLATE),
        (paths::SITE_ACCOUNTS_FILENAME, paths::SITE_ACCOUNTS_TEMPLATE),
    ] {
        let target = dir.join(name);
        if target.exists() && !overwrite {
            tracing::info!("[config] Keeping existing {}", target.display());
            continue;
        }
        std::fs::write(&target, content)?;
        written.push(target);
    }
    Ok(written)
}
