//! Catalog settings.
//! All fields have defaults; `from_env` overlays `SYSCAT_*` environment variables.

use serde::{Deserialize, Serialize};

pub const ENV_ADMIN_MAILBOX: &str = "SYSCAT_ADMIN_MAILBOX";
pub const ENV_ADMIN_USER: &str = "SYSCAT_ADMIN_USER";
pub const ENV_LOG: &str = "SYSCAT_LOG";
pub const ENV_DEBUG_TABLES: &str = "SYSCAT_DEBUG_TABLES";

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct CatalogSettings {
    /// Capacity of the administration task's command queue.
    #[serde(default = "CatalogSettings::default_admin_mailbox")]
    pub admin_mailbox: usize,
    /// Name of the built-in administrator whose permissions can't be changed.
    #[serde(default = "CatalogSettings::default_admin_user")]
    pub admin_user: String,
    /// Tracing filter used when `RUST_LOG` is unset.
    #[serde(default = "CatalogSettings::default_log_filter")]
    pub log_filter: String,
    /// Register the hidden `_debug_scratch` table.
    #[serde(default = "CatalogSettings::default_debug_tables")]
    pub debug_tables: bool,
}

impl CatalogSettings {
    fn default_admin_mailbox() -> usize { 64 }
    fn default_admin_user() -> String { "admin".to_string() }
    fn default_log_filter() -> String { "info".to_string() }
    fn default_debug_tables() -> bool { true }

    pub fn from_env() -> Self {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Overlay values from `lookup` onto the defaults. Unparseable values are ignored.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut s = Self::default();
        if let Some(n) = lookup(ENV_ADMIN_MAILBOX).and_then(|v| v.trim().parse::<usize>().ok()) {
            s.admin_mailbox = n.max(1);
        }
        if let Some(u) = lookup(ENV_ADMIN_USER).filter(|v| !v.trim().is_empty()) {
            s.admin_user = u.trim().to_string();
        }
        if let Some(f) = lookup(ENV_LOG).filter(|v| !v.trim().is_empty()) {
            s.log_filter = f;
        }
        if let Some(v) = lookup(ENV_DEBUG_TABLES) {
            match v.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => s.debug_tables = true,
                "0" | "false" | "no" | "off" => s.debug_tables = false,
                _ => {}
            }
        }
        s
    }
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            admin_mailbox: Self::default_admin_mailbox(),
            admin_user: Self::default_admin_user(),
            log_filter: Self::default_log_filter(),
            debug_tables: Self::default_debug_tables(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let m: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |k| m.get(k).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let s = CatalogSettings::from_lookup(|_| None);
        assert_eq!(s, CatalogSettings::default());
        assert_eq!(s.admin_mailbox, 64);
        assert_eq!(s.admin_user, "admin");
    }

    #[test]
    fn env_overrides() {
        let s = CatalogSettings::from_lookup(lookup_from(&[
            (ENV_ADMIN_MAILBOX, "8"),
            (ENV_ADMIN_USER, "root"),
            (ENV_DEBUG_TABLES, "off"),
            (ENV_LOG, "syscat=debug"),
        ]));
        assert_eq!(s.admin_mailbox, 8);
        assert_eq!(s.admin_user, "root");
        assert!(!s.debug_tables);
        assert_eq!(s.log_filter, "syscat=debug");
    }

    #[test]
    fn bad_values_fall_back() {
        let s = CatalogSettings::from_lookup(lookup_from(&[(ENV_ADMIN_MAILBOX, "lots"), (ENV_DEBUG_TABLES, "maybe")]));
        assert_eq!(s.admin_mailbox, 64);
        assert!(s.debug_tables);
        let s = CatalogSettings::from_lookup(lookup_from(&[(ENV_ADMIN_MAILBOX, "0")]));
        assert_eq!(s.admin_mailbox, 1);
    }

    #[test]
    fn deserializes_partial_json() {
        let s: CatalogSettings = serde_json::from_str(r#"{"admin_user":"ops"}"#).unwrap();
        assert_eq!(s.admin_user, "ops");
        assert_eq!(s.admin_mailbox, 64);
    }
}
