// src/config/mod.rs
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    pub processor: ProcessorConfig,
    pub window: WindowConfig,
    pub alerts: AlertConfig,
    pub render: RenderConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProcessorConfig {
    pub channel_labels: Vec<String>,
    /// Index of the channel the rolling statistics and alerts run on.
    pub target_channel: usize,
    pub track_angle: bool,
    /// Trailing samples averaged per axis before the angle estimate; 1
    /// uses the latest sample directly.
    pub angle_smooth_len: usize,
    pub verbose: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct WindowConfig {
    pub capacity: usize,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AlertConfig {
    pub sigma_warn: f64,
    pub sigma_over: f64,
    pub cooldown_secs: f64,
    /// Alerts are suppressed for this long after startup.
    pub startup_grace_secs: f64,
    pub warning_asset: String,
    pub over_range_asset: String,
    pub audio_wait: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RenderConfig {
    /// Redraw every n-th sample. Plotting is slow; thinning keeps
    /// ingestion responsive.
    pub interval: u64,
    pub pause_secs: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LoggingConfig {
    pub enabled: bool,
    pub flush_threshold: usize,
    pub directory: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            processor: ProcessorConfig {
                channel_labels: vec![
                    "Ax".to_string(),
                    "Ay".to_string(),
                    "Az".to_string(),
                    "A".to_string(),
                ],
                target_channel: 3,
                track_angle: true,
                angle_smooth_len: 10,
                verbose: false,
            },
            window: WindowConfig { capacity: 400 },
            alerts: AlertConfig {
                sigma_warn: 5.0,
                sigma_over: 7.0,
                cooldown_secs: 2.0,
                startup_grace_secs: 3.0,
                warning_asset: "sfx/warning1.mp3".to_string(),
                over_range_asset: "sfx/warning2.mp3".to_string(),
                audio_wait: false,
            },
            render: RenderConfig {
                interval: 1,
                pause_secs: 0.005,
            },
            logging: LoggingConfig {
                enabled: true,
                flush_threshold: 20,
                directory: "logs".to_string(),
            },
        }
    }
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, String> {
    let config_str =
        fs::read_to_string(path).map_err(|e| format!("Failed to read config file: {}", e))?;

    serde_yaml::from_str(&config_str).map_err(|e| format!("Failed to parse config file: {}", e))
}

pub fn save_config<P: AsRef<Path>>(config: &Config, path: P) -> Result<(), String> {
    let yaml =
        serde_yaml::to_string(config).map_err(|e| format!("Failed to serialize config: {}", e))?;

    fs::write(path, yaml).map_err(|e| format!("Failed to write config file: {}", e))
}
