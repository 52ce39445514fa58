//! Desktop bootstrap configuration loaded from build-time generated JSON.

use wall_core::config::{BootstrapConfig, ConfigError};
use wall_core::BoardConfig;

/// Loads the generated bootstrap JSON from `OUT_DIR`.
///
/// If parsing fails, this logs a warning and returns an empty config so the
/// process environment alone decides.
pub fn load_bootstrap_config() -> BootstrapConfig {
    let raw = include_str!(concat!(env!("OUT_DIR"), "/wall-bootstrap.json"));
    BootstrapConfig::parse(raw).unwrap_or_else(|error| {
        tracing::warn!("Failed to parse desktop bootstrap config: {}", error);
        BootstrapConfig::default()
    })
}

/// Board settings from the environment, falling back to the embedded values.
pub fn resolve_board_config() -> Result<BoardConfig, ConfigError> {
    BoardConfig::from_env_with_bootstrap(&load_bootstrap_config())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_config_parses() {
        let raw = include_str!(concat!(env!("OUT_DIR"), "/wall-bootstrap.json"));
        assert!(BootstrapConfig::parse(raw).is_ok());
    }

    #[test]
    fn bootstrap_fills_missing_environment() {
        let bootstrap = BootstrapConfig::parse(
            r#"{"supabase_url": "https://demo.supabase.co", "supabase_anon_key": "anon", "live_updates": false}"#,
        )
        .unwrap();
        assert_eq!(bootstrap.live_updates, Some(false));
        assert_eq!(bootstrap.notes_table, None);
    }
}
