use std::fs;
use std::path::Path;
use std::time::Duration;

use log::debug;
use serde::Deserialize;

use crate::display::LoopConfig;
use crate::driver::{PortSettings, DEFAULT_BAUD_RATE, DEFAULT_DEVICES};
use crate::filter::gamma::DEFAULT_GAMMA;
use crate::messages::MessageOptions;
use crate::BoardError;

/// Board settings as read from a TOML file. Missing keys take their defaults.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BoardConfig {
    /// Serial devices tried in order.
    pub devices: Vec<String>,
    pub baud_rate: u32,
    pub refresh_ms: u64,
    pub message_timeout_secs: u64,
    pub gamma: f32,
    pub afterglow: f32,
    /// How long writes may keep failing before the device counts as lost.
    pub failure_budget_ms: u64,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            devices: DEFAULT_DEVICES.iter().map(|path| path.to_string()).collect(),
            baud_rate: DEFAULT_BAUD_RATE,
            refresh_ms: 20,
            message_timeout_secs: 30,
            gamma: DEFAULT_GAMMA,
            afterglow: 0.85,
            failure_budget_ms: 3000,
        }
    }
}

impl BoardConfig {
    pub fn from_toml(source: &str) -> Result<Self, BoardError> {
        Ok(toml::from_str(source)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, BoardError> {
        let path = path.as_ref();
        debug!("loading board config from {}", path.display());
        Self::from_toml(&fs::read_to_string(path)?)
    }

    pub fn refresh(&self) -> Duration {
        Duration::from_millis(self.refresh_ms.max(1))
    }

    pub fn port_settings(&self) -> PortSettings {
        PortSettings {
            candidates: self.devices.clone(),
            baud_rate: self.baud_rate,
            ..PortSettings::default()
        }
    }

    pub fn loop_config(&self) -> LoopConfig {
        LoopConfig::with_failure_budget(
            self.refresh(),
            Duration::from_millis(self.failure_budget_ms),
        )
    }

    pub fn message_options(&self) -> MessageOptions {
        MessageOptions {
            timeout: Duration::from_secs(self.message_timeout_secs),
            gamma: self.gamma,
            afterglow: self.afterglow,
        }
    }
}
