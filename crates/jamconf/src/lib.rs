//! Minimal configuration loading for Jamboree.
//!
//! This crate provides configuration loading with minimal dependencies,
//! designed to be imported by every Jamboree crate without causing
//! circular dependency issues.
//!
//! # Configuration Philosophy
//!
//! Configuration is split into two categories:
//!
//! - **Infrastructure** (`InfraConfig`): Things that physically cannot
//!   change at runtime - the relay endpoint, telemetry settings.
//!
//! - **Tuning** (`TuningConfig`): Timing and retry seeds for the engine -
//!   materialization attempts and backoff, command pacing gaps, clip slot
//!   scanning, tempo bounds.
//!
//! # Config File Locations
//!
//! Files are loaded in order (later wins):
//! 1. `/etc/jamboree/config.toml` (system)
//! 2. `~/.config/jamboree/config.toml` (user)
//! 3. `./jamboree.toml` (local override)
//! 4. Environment variables (`JAMBOREE_*`)
//!
//! # Example Config
//!
//! ```toml
//! [relay]
//! url = "ws://127.0.0.1:8080"
//!
//! [telemetry]
//! log_level = "info"
//!
//! [tuning.materialize]
//! max_attempts = 5
//! backoff_step_ms = 300
//!
//! [tuning.pacing]
//! command_gap_ms = 50
//! lead_in_ms = 100
//! ```

pub mod infra;
pub mod loader;
pub mod tuning;

pub use infra::{InfraConfig, RelayConfig, TelemetryConfig};
pub use loader::{discover_config_files_with_override, ConfigSources};
pub use tuning::{ClipTuning, MaterializeTuning, PacingTuning, TempoTuning, TuningConfig};

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Complete Jamboree configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JamConfig {
    /// Infrastructure - cannot change at runtime.
    #[serde(flatten)]
    pub infra: InfraConfig,

    /// Tuning - seeds engine timing.
    #[serde(default)]
    pub tuning: TuningConfig,
}

impl JamConfig {
    /// Load configuration from all sources.
    ///
    /// Load order (later wins):
    /// 1. Compiled defaults
    /// 2. `/etc/jamboree/config.toml`
    /// 3. `~/.config/jamboree/config.toml`
    /// 4. `./jamboree.toml`
    /// 5. Environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let (config, _sources) = Self::load_with_sources_from(None)?;
        Ok(config)
    }

    /// Load configuration from a specific file path, then apply env
    /// overrides. If `config_path` is provided it takes precedence over
    /// the local `./jamboree.toml` override; system and user configs still
    /// load first.
    pub fn load_from(config_path: Option<&std::path::Path>) -> Result<Self, ConfigError> {
        let (config, _sources) = Self::load_with_sources_from(config_path)?;
        Ok(config)
    }

    /// Load configuration and return information about sources.
    pub fn load_with_sources() -> Result<(Self, ConfigSources), ConfigError> {
        Self::load_with_sources_from(None)
    }

    /// Load configuration from optional path and return source information.
    pub fn load_with_sources_from(
        config_path: Option<&std::path::Path>,
    ) -> Result<(Self, ConfigSources), ConfigError> {
        let mut sources = ConfigSources::default();
        let mut merged = toml::Table::new();
        let mut last_path = PathBuf::from("<defaults>");

        for path in loader::discover_config_files_with_override(config_path) {
            let table = loader::load_table(&path)?;
            loader::merge_tables(&mut merged, table);
            sources.files.push(path.clone());
            last_path = path;
        }

        let mut config = if merged.is_empty() {
            JamConfig::default()
        } else {
            loader::table_to_config(merged, &last_path)?
        };

        loader::apply_env_overrides(&mut config, &mut sources);

        Ok((config, sources))
    }

    /// Serialize config to TOML string.
    pub fn to_toml(&self) -> String {
        let mut output = String::new();

        output.push_str("# Jamboree Configuration\n\n");

        output.push_str("[relay]\n");
        output.push_str(&format!("url = \"{}\"\n", self.infra.relay.url));

        output.push_str("\n[telemetry]\n");
        output.push_str(&format!(
            "log_level = \"{}\"\n",
            self.infra.telemetry.log_level
        ));

        output.push_str("\n[tuning.materialize]\n");
        output.push_str(&format!(
            "max_attempts = {}\n",
            self.tuning.materialize.max_attempts
        ));
        output.push_str(&format!(
            "backoff_step_ms = {}\n",
            self.tuning.materialize.backoff_step_ms
        ));

        output.push_str("\n[tuning.pacing]\n");
        output.push_str(&format!(
            "command_gap_ms = {}\n",
            self.tuning.pacing.command_gap_ms
        ));
        output.push_str(&format!("lead_in_ms = {}\n", self.tuning.pacing.lead_in_ms));

        output.push_str("\n[tuning.clips]\n");
        output.push_str(&format!(
            "slots_scanned = {}\n",
            self.tuning.clips.slots_scanned
        ));
        output.push_str(&format!(
            "preferred_slots = {}\n",
            self.tuning.clips.preferred_slots
        ));

        output.push_str("\n[tuning.tempo]\n");
        output.push_str(&format!("min_bpm = {:.1}\n", self.tuning.tempo.min_bpm));
        output.push_str(&format!("max_bpm = {:.1}\n", self.tuning.tempo.max_bpm));
        output.push_str(&format!("ramp_steps = {}\n", self.tuning.tempo.ramp_steps));
        output.push_str(&format!(
            "ramp_interval_ms = {}\n",
            self.tuning.tempo.ramp_interval_ms
        ));

        output
    }
}
