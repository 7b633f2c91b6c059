//! Configuration loading for the backingfiles CLI.

use std::path::Path;

use backingfiles::ProvisionSettings;
use tracing::warn;

/// Load settings from a JSON file.
///
/// Returns defaults if the file does not exist or cannot be parsed.
pub fn load_config(config_path: &Path) -> ProvisionSettings {
    try_load_json(config_path).unwrap_or_default()
}

fn try_load_json(config_path: &Path) -> Option<ProvisionSettings> {
    if !config_path.exists() {
        tracing::debug!("No config file at {}, using defaults", config_path.display());
        return None;
    }

    let content = match std::fs::read_to_string(config_path) {
        Ok(c) => c,
        Err(e) => {
            warn!(
                "Failed to read config file {}: {}",
                config_path.display(),
                e
            );
            return None;
        }
    };

    match serde_json::from_str::<ProvisionSettings>(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            warn!(
                "Failed to parse config file {}: {}",
                config_path.display(),
                e
            );
            None
        }
    }
}
