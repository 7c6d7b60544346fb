//! Runtime configuration read from the environment (and an optional `.env` file)

use std::path::PathBuf;
use serde::Deserialize;

pub const DEFAULT_API_ENDPOINT: &str = "https://www.googleapis.com/youtube/v3";
pub const DEFAULT_VOLUME_PERCENT: u8 = 80;

fn default_api_endpoint() -> String {
    DEFAULT_API_ENDPOINT.to_string()
}

fn default_mpv_path() -> String {
    "mpv".to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".data")
}

fn default_volume() -> u8 {
    DEFAULT_VOLUME_PERCENT
}

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub youtube_api_key: String,
    #[serde(default = "default_api_endpoint")]
    pub youtube_api_endpoint: String,
    #[serde(default = "default_mpv_path")]
    pub mpv_path: String,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_volume")]
    pub default_volume: u8,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        // A missing .env is normal; real environment variables still apply
        if let Err(e) = dotenv::dotenv() {
            tracing::debug!(error = %e, "No .env file loaded");
        }

        Self::from_vars(std::env::vars())
    }

    /// Build from explicit `NAME=value` pairs; the only place a missing key is reported
    pub fn from_vars<I>(vars: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config = envy::from_iter::<_, Self>(vars)?;
        if config.youtube_api_key.is_empty() {
            tracing::warn!("YOUTUBE_API_KEY is not set, searches will fail");
        }
        Ok(config)
    }
}
