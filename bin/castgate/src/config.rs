use std::{path::Path, time::Duration};

use castgate::ResumePolicy;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub resume: ResumeConfig,
    pub http: HttpConfig,
    pub player: PlayerConfig,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ResumeConfig {
    pub enabled: bool,
    pub delay_ms: u64,
    pub suppress_window_secs: u64,
}

impl Default for ResumeConfig {
    fn default() -> Self {
        let policy = ResumePolicy::default();
        Self {
            enabled: policy.enabled,
            delay_ms: policy.delay.as_millis() as u64,
            suppress_window_secs: policy.suppress_window.as_secs(),
        }
    }
}

impl From<&ResumeConfig> for ResumePolicy {
    fn from(config: &ResumeConfig) -> Self {
        ResumePolicy {
            enabled: config.enabled,
            delay: Duration::from_millis(config.delay_ms),
            suppress_window: Duration::from_secs(config.suppress_window_secs),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// HTTP timeout, in seconds
    pub timeout_secs: u64,
    /// Random Chrome user agent when absent
    pub user_agent: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            user_agent: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub segment_limit: usize,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self { segment_limit: 5 }
    }
}

impl Config {
    pub fn load(file: Option<&Path>) -> anyhow::Result<Self> {
        let Some(file) = file else {
            return Ok(Self::default());
        };
        let data = std::fs::read_to_string(file)?;
        let config = toml::from_str(&data)?;
        log::info!("Loaded config from {}", file.display());
        Ok(config)
    }
}
