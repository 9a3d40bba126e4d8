use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;

use crate::model::window::WindowConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub system: SystemConfig,
    pub api: ApiConfig,
    #[serde(default)]
    pub window: WindowConfig,
    pub pairs: Vec<PairConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SystemConfig {
    pub bind_addr: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    /// Days of history requested per pair.
    pub limit: u32,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_timeout() -> u64 { 10 }

/// One trading pair to fetch, predict, and chart.
#[derive(Debug, Clone, Deserialize)]
pub struct PairConfig {
    pub fsym: String,
    pub tsym: String,
    pub model_file: String,
}

impl PairConfig {
    pub fn title(&self) -> String {
        format!("{} - {}", self.fsym, self.tsym)
    }
}

#[derive(Debug, Clone)]
pub struct EnvConfig {
    pub cryptocompare_api_key: Option<String>,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path))?;

        if config.pairs.is_empty() {
            anyhow::bail!("config has no [[pairs]] entries");
        }
        if config.window.length == 0 {
            anyhow::bail!("window.length must be positive");
        }

        Ok(config)
    }
}

impl EnvConfig {
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        Ok(Self {
            cryptocompare_api_key: std::env::var("CRYPTOCOMPARE_API_KEY").ok(),
        })
    }
}
