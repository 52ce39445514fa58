//! Client configuration for the hosted note store.
//!
//! Every surface (desktop, CLI) resolves a [`BoardConfig`] from environment
//! variables, optionally layered over values embedded at build time.

use std::collections::HashMap;
use std::env;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::util::{is_http_url, normalize_text_option};

pub const SUPABASE_URL_VAR: &str = "SUPABASE_URL";
pub const SUPABASE_ANON_KEY_VAR: &str = "SUPABASE_ANON_KEY";
pub const NOTES_TABLE_VAR: &str = "WALL_NOTES_TABLE";
pub const LIVE_UPDATES_VAR: &str = "WALL_LIVE_UPDATES";

pub const DEFAULT_NOTES_TABLE: &str = "notes";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Connection settings for the notes table and its change feed.
#[derive(Clone, PartialEq, Eq)]
pub struct BoardConfig {
    /// Project URL without trailing slash, e.g. `https://demo.supabase.co`
    pub supabase_url: String,
    /// Public anon key sent with every request
    pub supabase_anon_key: String,
    /// Table holding the notes
    pub table: String,
    /// Whether remote change notifications are consumed
    pub live_updates: bool,
}

impl fmt::Debug for BoardConfig {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("BoardConfig")
            .field("supabase_url", &self.supabase_url)
            .field("supabase_anon_key", &"[REDACTED]")
            .field("table", &self.table)
            .field("live_updates", &self.live_updates)
            .finish()
    }
}

/// Build-provisioned defaults, overridden by runtime environment values.
///
/// Only public endpoints/keys belong here; secret credentials must never be
/// embedded.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct BootstrapConfig {
    #[serde(default)]
    pub supabase_url: Option<String>,
    #[serde(default)]
    pub supabase_anon_key: Option<String>,
    #[serde(default)]
    pub notes_table: Option<String>,
    #[serde(default)]
    pub live_updates: Option<bool>,
}

impl BootstrapConfig {
    /// Parse an embedded bootstrap JSON document.
    pub fn parse(payload: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(payload)
            .map_err(|error| ConfigError::Invalid(format!("invalid bootstrap JSON: {error}")))
    }

    fn lookup(&self, name: &str) -> Option<String> {
        match name {
            SUPABASE_URL_VAR => self.supabase_url.clone(),
            SUPABASE_ANON_KEY_VAR => self.supabase_anon_key.clone(),
            NOTES_TABLE_VAR => self.notes_table.clone(),
            LIVE_UPDATES_VAR => self.live_updates.map(|enabled| enabled.to_string()),
            _ => None,
        }
    }
}

impl BoardConfig {
    pub fn new(
        supabase_url: impl AsRef<str>,
        supabase_anon_key: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let supabase_url = normalize_project_url(supabase_url.as_ref())?;
        let supabase_anon_key = supabase_anon_key.into().trim().to_string();
        if supabase_anon_key.is_empty() {
            return Err(ConfigError::Invalid(
                "Supabase anon key must not be empty".to_string(),
            ));
        }

        Ok(Self {
            supabase_url,
            supabase_anon_key,
            table: DEFAULT_NOTES_TABLE.to_string(),
            live_updates: true,
        })
    }

    #[must_use]
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    #[must_use]
    pub const fn with_live_updates(mut self, live_updates: bool) -> Self {
        self.live_updates = live_updates;
        self
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with_bootstrap(&BootstrapConfig::default())
    }

    /// Resolve from the process environment, falling back to embedded values.
    pub fn from_env_with_bootstrap(bootstrap: &BootstrapConfig) -> Result<Self, ConfigError> {
        let values: HashMap<String, String> = env::vars().collect();
        Self::from_lookup(|name| {
            normalize_text_option(values.get(name).cloned()).or_else(|| bootstrap.lookup(name))
        })
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let supabase_url = required_trimmed(&lookup, SUPABASE_URL_VAR)?;
        let supabase_anon_key = required_trimmed(&lookup, SUPABASE_ANON_KEY_VAR)?;

        let table = normalize_text_option(lookup(NOTES_TABLE_VAR))
            .unwrap_or_else(|| DEFAULT_NOTES_TABLE.to_string());
        validate_table_name(&table)?;

        let live_updates = match normalize_text_option(lookup(LIVE_UPDATES_VAR)) {
            Some(raw) => parse_flag(&raw).ok_or_else(|| {
                ConfigError::Invalid(format!("{LIVE_UPDATES_VAR} must be a boolean, got '{raw}'"))
            })?,
            None => true,
        };

        Ok(Self::new(supabase_url, supabase_anon_key)?
            .with_table(table)
            .with_live_updates(live_updates))
    }

    /// PostgREST endpoint for the notes table.
    #[must_use]
    pub fn rest_table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.supabase_url, self.table)
    }

    /// Realtime WebSocket endpoint, keyed with the anon key.
    #[must_use]
    pub fn realtime_url(&self) -> String {
        let ws_base = self
            .supabase_url
            .strip_prefix("https://")
            .map(|rest| format!("wss://{rest}"))
            .or_else(|| {
                self.supabase_url
                    .strip_prefix("http://")
                    .map(|rest| format!("ws://{rest}"))
            })
            .unwrap_or_else(|| self.supabase_url.clone());
        format!(
            "{ws_base}/realtime/v1/websocket?apikey={}&vsn=1.0.0",
            self.supabase_anon_key
        )
    }
}

pub fn normalize_project_url(url: &str) -> Result<String, ConfigError> {
    let trimmed = url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(
            "Supabase URL must not be empty".to_string(),
        ));
    }
    if !is_http_url(trimmed) {
        return Err(ConfigError::Invalid(
            "Supabase URL must include http:// or https://".to_string(),
        ));
    }
    let trimmed = trimmed
        .strip_suffix("/rest/v1")
        .unwrap_or(trimmed)
        .trim_end_matches('/');
    Ok(trimmed.to_string())
}

fn validate_table_name(table: &str) -> Result<(), ConfigError> {
    let valid = table
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || ch == '_');
    if valid {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{NOTES_TABLE_VAR} may only contain letters, digits and '_'"
        )))
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn required_trimmed(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<String, ConfigError> {
    normalize_text_option(lookup(name)).ok_or(ConfigError::MissingVar(name))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let values: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect();
        move |name| values.get(name).cloned()
    }

    #[test]
    fn from_lookup_applies_defaults() {
        let config = BoardConfig::from_lookup(lookup_from(&[
            (SUPABASE_URL_VAR, "https://demo.supabase.co/"),
            (SUPABASE_ANON_KEY_VAR, " anon "),
        ]))
        .unwrap();

        assert_eq!(config.supabase_url, "https://demo.supabase.co");
        assert_eq!(config.supabase_anon_key, "anon");
        assert_eq!(config.table, "notes");
        assert!(config.live_updates);
    }

    #[test]
    fn from_lookup_requires_url_and_key() {
        let error = BoardConfig::from_lookup(lookup_from(&[(SUPABASE_ANON_KEY_VAR, "anon")]))
            .unwrap_err();
        assert!(matches!(error, ConfigError::MissingVar(SUPABASE_URL_VAR)));

        let error = BoardConfig::from_lookup(lookup_from(&[(
            SUPABASE_URL_VAR,
            "https://demo.supabase.co",
        )]))
        .unwrap_err();
        assert!(matches!(error, ConfigError::MissingVar(SUPABASE_ANON_KEY_VAR)));
    }

    #[test]
    fn from_lookup_parses_live_updates_flag() {
        let config = BoardConfig::from_lookup(lookup_from(&[
            (SUPABASE_URL_VAR, "https://demo.supabase.co"),
            (SUPABASE_ANON_KEY_VAR, "anon"),
            (LIVE_UPDATES_VAR, "off"),
        ]))
        .unwrap();
        assert!(!config.live_updates);

        let error = BoardConfig::from_lookup(lookup_from(&[
            (SUPABASE_URL_VAR, "https://demo.supabase.co"),
            (SUPABASE_ANON_KEY_VAR, "anon"),
            (LIVE_UPDATES_VAR, "sometimes"),
        ]))
        .unwrap_err();
        assert!(error.to_string().contains(LIVE_UPDATES_VAR));
    }

    #[test]
    fn from_lookup_rejects_bad_table_name() {
        let error = BoardConfig::from_lookup(lookup_from(&[
            (SUPABASE_URL_VAR, "https://demo.supabase.co"),
            (SUPABASE_ANON_KEY_VAR, "anon"),
            (NOTES_TABLE_VAR, "notes?select=*"),
        ]))
        .unwrap_err();
        assert!(matches!(error, ConfigError::Invalid(_)));
    }

    #[test]
    fn normalize_project_url_requires_scheme_and_strips_rest_path() {
        assert!(normalize_project_url("demo.supabase.co").is_err());
        assert!(normalize_project_url("  ").is_err());
        assert_eq!(
            normalize_project_url("https://demo.supabase.co/rest/v1/").unwrap(),
            "https://demo.supabase.co"
        );
    }

    #[test]
    fn derived_endpoints() {
        let config = BoardConfig::new("https://demo.supabase.co", "anon").unwrap();
        assert_eq!(
            config.rest_table_url(),
            "https://demo.supabase.co/rest/v1/notes"
        );
        assert_eq!(
            config.realtime_url(),
            "wss://demo.supabase.co/realtime/v1/websocket?apikey=anon&vsn=1.0.0"
        );

        let local = BoardConfig::new("http://127.0.0.1:54321", "anon").unwrap();
        assert!(local.realtime_url().starts_with("ws://127.0.0.1:54321/"));
    }

    #[test]
    fn bootstrap_values_fill_gaps() {
        let bootstrap = BootstrapConfig::parse(
            r#"{"supabase_url":"https://embedded.supabase.co","supabase_anon_key":"embedded","live_updates":false}"#,
        )
        .unwrap();
        let config = BoardConfig::from_lookup(|name| bootstrap.lookup(name)).unwrap();
        assert_eq!(config.supabase_url, "https://embedded.supabase.co");
        assert!(!config.live_updates);
    }

    #[test]
    fn bootstrap_rejects_unknown_fields() {
        let error = BootstrapConfig::parse(r#"{"api_base_url":"x"}"#).unwrap_err();
        assert!(error.to_string().contains("unknown field"));
    }

    #[test]
    fn debug_redacts_anon_key() {
        let config = BoardConfig::new("https://demo.supabase.co", "secret-anon").unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("secret-anon"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
