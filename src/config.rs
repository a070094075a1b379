//! Runtime configuration, constructed once at startup and passed by reference.

use crate::constants::*;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub network: NetworkConfig,
    pub servo: ServoConfig,
    pub supervisor: SupervisorConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkCredentials {
    pub ssid: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Tried in order until one of them yields an address.
    pub networks: Vec<NetworkCredentials>,
    pub port: u16,
    pub connect_timeout_secs: u64,
    pub poll_interval_ms: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        NetworkConfig {
            networks: Vec::new(),
            port: HTTP_PORT,
            connect_timeout_secs: CONNECT_TIMEOUT.as_secs(),
            poll_interval_ms: POLL_INTERVAL.as_millis() as u64,
        }
    }
}

impl NetworkConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoseEntry {
    pub channel: usize,
    pub angle: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServoConfig {
    /// GPIO numbers; position in the list is the 1-based channel index.
    pub pins: Vec<u8>,
    pub pwm_frequency: u32,
    /// Applied in order before any network traffic is accepted.
    pub initial_pose: Vec<PoseEntry>,
}

impl Default for ServoConfig {
    fn default() -> Self {
        ServoConfig {
            pins: DEFAULT_PINS.to_vec(),
            pwm_frequency: DEFAULT_PWM_FREQUENCY,
            initial_pose: vec![
                PoseEntry { channel: 4, angle: 90 },
                PoseEntry { channel: 3, angle: 90 },
                PoseEntry { channel: 2, angle: 180 },
                PoseEntry { channel: 1, angle: 90 },
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SupervisorConfig {
    pub reset_cooldown_secs: u64,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        SupervisorConfig {
            reset_cooldown_secs: RESET_COOLDOWN.as_secs(),
        }
    }
}

impl SupervisorConfig {
    pub fn reset_cooldown(&self) -> Duration {
        Duration::from_secs(self.reset_cooldown_secs)
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let servo = &self.servo;
        if servo.pins.is_empty() {
            return Err(ConfigError::Invalid("at least one servo pin is required".into()));
        }
        if servo.pwm_frequency == 0 {
            return Err(ConfigError::Invalid("PWM frequency must be positive".into()));
        }
        if self.network.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid("poll interval must be positive".into()));
        }
        for entry in &servo.initial_pose {
            if !(1..=servo.pins.len()).contains(&entry.channel) {
                return Err(ConfigError::Invalid(format!(
                    "initial pose channel {} is not one of the {} configured pins",
                    entry.channel,
                    servo.pins.len()
                )));
            }
            if !(0..=DEFAULT_DEGREES).contains(&entry.angle) {
                return Err(ConfigError::Invalid(format!(
                    "initial pose angle {} for channel {} must be between 0 and {}",
                    entry.angle, entry.channel, DEFAULT_DEGREES
                )));
            }
        }
        Ok(())
    }
}
