//! Config file discovery, loading, and environment variable overlay.

use std::env;
use std::path::{Path, PathBuf};

use crate::{ConfigError, JamConfig};

/// Information about where config values came from.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    /// Config files that were loaded (in order)
    pub files: Vec<PathBuf>,
    /// Environment variables that overrode config values
    pub env_overrides: Vec<String>,
}

/// Discover config files in standard locations.
///
/// Returns paths in load order (system, user, local).
/// Only returns files that exist.
pub fn discover_config_files() -> Vec<PathBuf> {
    discover_config_files_with_override(None)
}

/// Discover config files, optionally with a CLI override path.
///
/// If `cli_path` is provided and exists, it replaces the local override.
/// Returns paths in load order (system, user, local/cli).
pub fn discover_config_files_with_override(cli_path: Option<&Path>) -> Vec<PathBuf> {
    let mut files = Vec::new();

    // System config
    let system = PathBuf::from("/etc/jamboree/config.toml");
    if system.exists() {
        files.push(system);
    }

    // User config (XDG_CONFIG_HOME or ~/.config)
    if let Some(config_dir) = directories::BaseDirs::new().map(|d| d.config_dir().to_path_buf()) {
        let user = config_dir.join("jamboree/config.toml");
        if user.exists() {
            files.push(user);
        }
    }

    // CLI override takes precedence over local
    if let Some(path) = cli_path {
        if path.exists() {
            files.push(path.to_path_buf());
            return files;
        }
    }

    // Local override (current directory)
    let local = PathBuf::from("jamboree.toml");
    if local.exists() {
        files.push(local);
    }

    files
}

/// Load one file into a raw TOML table.
pub fn load_table(path: &Path) -> Result<toml::Table, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    contents
        .parse::<toml::Table>()
        .map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}

/// Merge `overlay` into `base`, later values winning; tables merge
/// recursively so a file can override one key without restating a section.
pub fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        let both_tables =
            value.is_table() && base.get(&key).is_some_and(toml::Value::is_table);
        if both_tables {
            if let (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) =
                (base.get_mut(&key), value)
            {
                merge_tables(existing, incoming);
            }
        } else {
            base.insert(key, value);
        }
    }
}

/// Turn a merged table into the typed config.
pub fn table_to_config(table: toml::Table, origin: &Path) -> Result<JamConfig, ConfigError> {
    toml::Value::Table(table)
        .try_into()
        .map_err(|e: toml::de::Error| ConfigError::Parse {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })
}

/// Apply `JAMBOREE_*` environment variable overrides.
pub fn apply_env_overrides(config: &mut JamConfig, sources: &mut ConfigSources) {
    if let Ok(v) = env::var("JAMBOREE_LOG_LEVEL") {
        config.infra.telemetry.log_level = v;
        sources.env_overrides.push("JAMBOREE_LOG_LEVEL".into());
    }
    if let Ok(v) = env::var("JAMBOREE_RELAY_URL") {
        config.infra.relay.url = v;
        sources.env_overrides.push("JAMBOREE_RELAY_URL".into());
    }
    if let Ok(v) = env::var("JAMBOREE_MAX_ATTEMPTS") {
        if let Ok(n) = v.parse() {
            config.tuning.materialize.max_attempts = n;
            sources.env_overrides.push("JAMBOREE_MAX_ATTEMPTS".into());
        }
    }
    if let Ok(v) = env::var("JAMBOREE_COMMAND_GAP_MS") {
        if let Ok(n) = v.parse() {
            config.tuning.pacing.command_gap_ms = n;
            sources.env_overrides.push("JAMBOREE_COMMAND_GAP_MS".into());
        }
    }
}
