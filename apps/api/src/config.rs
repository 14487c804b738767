use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

const DEFAULT_INFERENCE_API_URL: &str = "http://localhost:8001";

/// Application configuration loaded from environment variables.
/// Every variable has a default; startup fails only on malformed values.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the inference service hosting `/predict/` and `/analysis/`.
    pub inference_api_url: String,
    /// Directory holding the durable key-value files (the skill profile).
    pub data_dir: PathBuf,
    /// Byte budget for a single durable entry. `None` means unlimited.
    pub storage_quota_bytes: Option<u64>,
    pub recommendation_top_k: u32,
    pub service_timeout: Duration,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let inference_api_url = std::env::var("INFERENCE_API_URL")
            .unwrap_or_else(|_| DEFAULT_INFERENCE_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let recommendation_top_k: u32 = parse_env("RECOMMENDATION_TOP_K", 5)?;
        if recommendation_top_k == 0 {
            bail!("RECOMMENDATION_TOP_K must be greater than zero");
        }

        let timeout_secs: u64 = parse_env("SERVICE_TIMEOUT_SECS", 30)?;
        if timeout_secs == 0 {
            bail!("SERVICE_TIMEOUT_SECS must be greater than zero");
        }

        let storage_quota_bytes = match std::env::var("STORAGE_QUOTA_BYTES") {
            Ok(raw) => Some(
                raw.parse::<u64>()
                    .context("STORAGE_QUOTA_BYTES must be a byte count")?,
            ),
            Err(_) => None,
        };

        Ok(Config {
            inference_api_url,
            data_dir: std::env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".skillmatch")),
            storage_quota_bytes,
            recommendation_top_k,
            service_timeout: Duration::from_secs(timeout_secs),
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}
