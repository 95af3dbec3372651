//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::ibus::protocol::{ChannelMapping, IBUS_NUM_CHANNELS};
use crate::serial::IBUS_BAUD_RATE;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub serial: SerialConfig,
    pub channels: ChannelMapping,
    pub monitor: MonitorConfig,
    pub recorder: RecorderConfig,
}

/// Serial port configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SerialConfig {
    #[serde(default = "default_serial_port")]
    pub port: String,

    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    #[serde(default = "default_reconnect_interval_ms")]
    pub reconnect_interval_ms: u64,
}

/// Consumer-side monitoring configuration
#[derive(Debug, Deserialize, Clone)]
pub struct MonitorConfig {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[serde(default = "default_stale_after_ms")]
    pub stale_after_ms: u64,

    #[serde(default = "default_status_interval_s")]
    pub status_interval_s: u64,
}

/// Channel-stream recorder configuration
#[derive(Debug, Deserialize, Clone)]
pub struct RecorderConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    #[serde(default = "default_max_records_per_file")]
    pub max_records_per_file: usize,

    #[serde(default = "default_max_files_to_keep")]
    pub max_files_to_keep: usize,
}

// Default value functions
fn default_serial_port() -> String { "/dev/ttyUSB0".to_string() }
fn default_baud_rate() -> u32 { IBUS_BAUD_RATE }
fn default_reconnect_interval_ms() -> u64 { 1000 }

fn default_poll_interval_ms() -> u64 { 20 }
fn default_stale_after_ms() -> u64 { 500 }
fn default_status_interval_s() -> u64 { 5 }

fn default_log_dir() -> String { "./logs".to_string() }
fn default_max_records_per_file() -> usize { 10000 }
fn default_max_files_to_keep() -> usize { 10 }

impl Default for Config {
    fn default() -> Self {
        Self {
            serial: SerialConfig::default(),
            channels: ChannelMapping::default(),
            monitor: MonitorConfig::default(),
            recorder: RecorderConfig::default(),
        }
    }
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: default_serial_port(),
            baud_rate: default_baud_rate(),
            reconnect_interval_ms: default_reconnect_interval_ms(),
        }
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            stale_after_ms: default_stale_after_ms(),
            status_interval_s: default_status_interval_s(),
        }
    }
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            log_dir: default_log_dir(),
            max_records_per_file: default_max_records_per_file(),
            max_files_to_keep: default_max_files_to_keep(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use ibus_bridge::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        if self.serial.port.is_empty() {
            return Err(crate::error::IbusBridgeError::Config(
                toml::de::Error::custom("serial port cannot be empty")
            ));
        }

        // iBUS receivers run at a fixed line rate; anything else is a wiring mistake
        if self.serial.baud_rate != IBUS_BAUD_RATE {
            return Err(crate::error::IbusBridgeError::Config(
                toml::de::Error::custom(format!(
                    "baud_rate must be {} (iBUS line rate)",
                    IBUS_BAUD_RATE
                ))
            ));
        }

        if self.serial.reconnect_interval_ms == 0 || self.serial.reconnect_interval_ms > 60000 {
            return Err(crate::error::IbusBridgeError::Config(
                toml::de::Error::custom("reconnect_interval_ms must be between 1 and 60000")
            ));
        }

        if self.monitor.poll_interval_ms == 0 || self.monitor.poll_interval_ms > 1000 {
            return Err(crate::error::IbusBridgeError::Config(
                toml::de::Error::custom("poll_interval_ms must be between 1 and 1000")
            ));
        }

        if self.monitor.stale_after_ms < self.monitor.poll_interval_ms
            || self.monitor.stale_after_ms > 60000 {
            return Err(crate::error::IbusBridgeError::Config(
                toml::de::Error::custom(
                    "stale_after_ms must be between poll_interval_ms and 60000"
                )
            ));
        }

        if self.monitor.status_interval_s == 0 {
            return Err(crate::error::IbusBridgeError::Config(
                toml::de::Error::custom("status_interval_s must be greater than 0")
            ));
        }

        // Role mapping indices address the 10 extracted channels
        for (role, index) in self.channels.roles() {
            if index >= IBUS_NUM_CHANNELS {
                return Err(crate::error::IbusBridgeError::Config(
                    toml::de::Error::custom(format!(
                        "channels.{} index {} is out of bounds (must be 0-{})",
                        role,
                        index,
                        IBUS_NUM_CHANNELS - 1
                    ))
                ));
            }
        }

        if self.recorder.enabled && self.recorder.log_dir.is_empty() {
            return Err(crate::error::IbusBridgeError::Config(
                toml::de::Error::custom("recorder log_dir cannot be empty when enabled")
            ));
        }

        if self.recorder.max_records_per_file == 0 {
            return Err(crate::error::IbusBridgeError::Config(
                toml::de::Error::custom("max_records_per_file must be greater than 0")
            ));
        }

        if self.recorder.max_files_to_keep == 0 {
            return Err(crate::error::IbusBridgeError::Config(
                toml::de::Error::custom("max_files_to_keep must be greater than 0")
            ));
        }

        Ok(())
    }
}
