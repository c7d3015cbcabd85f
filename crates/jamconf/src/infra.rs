//! Infrastructure configuration - fixed for the lifetime of the process.

use serde::{Deserialize, Serialize};

/// Infrastructure settings that cannot change at runtime.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InfraConfig {
    #[serde(default)]
    pub relay: RelayConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Where the planner relay lives. The transport is run by the host bridge;
/// the engine only needs the endpoint for diagnostics and hand-off.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelayConfig {
    #[serde(default = "default_relay_url")]
    pub url: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            url: default_relay_url(),
        }
    }
}

fn default_relay_url() -> String {
    "ws://127.0.0.1:8080".to_string()
}

/// Log verbosity seed. Subscribers are installed by binaries, not here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
