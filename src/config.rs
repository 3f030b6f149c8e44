// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Settings kept in the `settings` table, with environment overrides.

use crate::categories::CategoryRegistry;
use crate::error::{Error, Result};
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;

pub const API_URL: &str = "api_url";
pub const API_TOKEN: &str = "api_token";
pub const CURRENCY: &str = "currency";
pub const CATEGORY_SET: &str = "category_set";

pub const KNOWN_KEYS: [&str; 4] = [API_URL, API_TOKEN, CURRENCY, CATEGORY_SET];

pub const API_URL_ENV: &str = "SPENDLENS_API_URL";
pub const API_TOKEN_ENV: &str = "SPENDLENS_API_TOKEN";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settings {
    pub api_url: Option<String>,
    #[serde(skip_serializing)]
    pub api_token: Option<String>,
    pub currency: String,
    pub category_set: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: None,
            api_token: None,
            currency: "USD".to_string(),
            category_set: "basic".to_string(),
        }
    }
}

impl Settings {
    /// Stored settings, then `SPENDLENS_API_URL` / `SPENDLENS_API_TOKEN`
    /// on top.
    pub fn load(conn: &Connection) -> Result<Self> {
        let mut s = Settings::default();
        if let Some(v) = get_setting(conn, API_URL)? {
            s.api_url = Some(v);
        }
        if let Some(v) = get_setting(conn, API_TOKEN)? {
            s.api_token = Some(v);
        }
        if let Some(v) = get_setting(conn, CURRENCY)? {
            s.currency = v;
        }
        if let Some(v) = get_setting(conn, CATEGORY_SET)? {
            s.category_set = v;
        }
        if let Some(v) = env_value(API_URL_ENV) {
            s.api_url = Some(v);
        }
        if let Some(v) = env_value(API_TOKEN_ENV) {
            s.api_token = Some(v);
        }
        Ok(s)
    }

    pub fn base_registry(&self) -> CategoryRegistry {
        CategoryRegistry::named(&self.category_set)
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
    let v: Option<String> = conn
        .query_row(
            "SELECT value FROM settings WHERE key=?1",
            params![key],
            |r| r.get(0),
        )
        .optional()?;
    Ok(v)
}

/// Store a setting. Only [`KNOWN_KEYS`] are accepted.
pub fn set_setting(conn: &Connection, key: &str, value: &str) -> Result<()> {
    if !KNOWN_KEYS.contains(&key) {
        return Err(Error::NotFound(format!(
            "setting '{}' (known: {})",
            key,
            KNOWN_KEYS.join(", ")
        )));
    }
    let value = match key {
        CURRENCY => value.trim().to_uppercase(),
        CATEGORY_SET => value.trim().to_lowercase(),
        _ => value.trim().to_string(),
    };
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, value],
    )?;
    Ok(())
}
