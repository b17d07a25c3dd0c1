use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Cookies as written in the accounts file: either a raw `Cookie` header
/// copied from a browser or a table of name/value pairs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawCookies {
    Header(String),
    Table(BTreeMap<String, String>),
}

impl Default for RawCookies {
    fn default() -> Self {
        RawCookies::Table(BTreeMap::new())
    }
}

pub fn resolve_cookies(raw: &RawCookies) -> BTreeMap<String, String> {
    match raw {
        RawCookies::Header(header) => parse_cookie_header(header),
        RawCookies::Table(table) => table
            .iter()
            .filter_map(|(name, value)| {
                let name = name.trim();
                (!name.is_empty()).then(|| (name.to_string(), value.trim().to_string()))
            })
            .collect(),
    }
}

pub fn parse_cookie_header(header: &str) -> BTreeMap<String, String> {
    let mut cookies = BTreeMap::new();
    for pair in header.split(';') {
        let Some((name, value)) = pair.split_once('=') else {
            if !pair.trim().is_empty() {
                tracing::debug!("[cookies] Skipping malformed cookie pair: {:?}", pair.trim());
            }
            continue;
        };
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        cookies.insert(name.to_string(), value.trim().to_string());
    }
    cookies
}

pub fn to_cookie_header(cookies: &BTreeMap<String, String>) -> String {
    cookies
        .iter()
        .map(|(name, value)| format!("{}={}", name, value))
        .collect::<Vec<_>>()
        .join("; ")
}
