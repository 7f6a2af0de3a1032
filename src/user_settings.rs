use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::{Config, NetworkProfile};
use crate::operation_log::app_data_dir;

const SETTINGS_FILE: &str = "settings.json";

fn default_selected_network() -> NetworkProfile {
    NetworkProfile::Testnet
}

fn default_hide_balance() -> bool {
    false
}

fn default_poll_interval_secs() -> u64 {
    30
}

/// User settings that persist between sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSettings {
    /// Network profile the dashboard starts on
    #[serde(default = "default_selected_network")]
    pub selected_network: NetworkProfile,
    /// Mask the total and per-asset balances
    #[serde(default = "default_hide_balance")]
    pub hide_balance: bool,
    /// Overrides the configured USD price of one ETH
    #[serde(default)]
    pub native_price_override: Option<f64>,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            selected_network: default_selected_network(),
            hide_balance: default_hide_balance(),
            native_price_override: None,
            poll_interval_secs: default_poll_interval_secs(),
        }
    }
}

impl UserSettings {
    pub fn settings_path() -> PathBuf {
        app_data_dir().join(SETTINGS_FILE)
    }

    /// Load settings from the default location, or defaults if not found
    pub fn load() -> Self {
        Self::load_from(&Self::settings_path())
    }

    pub fn load_from(path: &Path) -> Self {
        if path.exists() {
            match fs::read_to_string(path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(settings) => {
                        tracing::info!("Loaded settings from {:?}", path);
                        return settings;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse settings file: {}", e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read settings file: {}", e);
                }
            }
        }
        tracing::info!("Using default settings");
        Self::default()
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::settings_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        tracing::info!("Saved settings to {:?}", path);
        Ok(())
    }

    /// Overlay these settings on `config`
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(price) = self
            .native_price_override
            .filter(|p| p.is_finite() && *p >= 0.0)
        {
            config.native_price_usd = price;
        }
        if self.poll_interval_secs > 0 {
            config.poll_interval = Duration::from_secs(self.poll_interval_secs);
        }
    }
}
