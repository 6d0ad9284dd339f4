use anyhow::{bail, Context, Result};

use crate::models::RoomType;

/// Pipeline policy knobs with tunable thresholds. Defaults reproduce the
/// production behavior; tests construct variants directly.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Rooms eligible for pass 2 feature detection.
    pub target_rooms: Vec<RoomType>,

    /// Minimum count of actionable images a room needs before consolidation
    /// asserts room-level findings.
    pub min_actionable_images: usize,

    /// Upper bound on images classified concurrently.
    pub max_concurrent_images: usize,

    /// Per-call classifier timeout; a timed-out call marks the image failed.
    pub classify_timeout_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            target_rooms: vec![RoomType::Kitchen, RoomType::Bathroom],
            min_actionable_images: 2,
            max_concurrent_images: 4,
            classify_timeout_secs: 60,
        }
    }
}

/// Connection settings for the vision model provider, read from the
/// environment. Only the API key is required.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub requests_per_minute: u32,
    pub max_retries: u32,
    pub retry_backoff_seconds: f64,
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").unwrap_or_default();
        let api_key = api_key.trim().to_string();
        if api_key.is_empty() {
            bail!("OPENAI_API_KEY is required. Set it in your environment.");
        }

        Ok(Self {
            api_key,
            model: env_or("OPENAI_MODEL", "gpt-4.1-mini"),
            base_url: env_or("OPENAI_BASE_URL", "https://api.openai.com/v1"),
            requests_per_minute: parse_env("REQUESTS_PER_MINUTE", 60)?,
            max_retries: parse_env("MAX_RETRIES", 3)?,
            retry_backoff_seconds: parse_env("RETRY_BACKOFF_SECONDS", 1.5)?,
        })
    }
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_env<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .with_context(|| format!("invalid value for {name}: '{value}'")),
        _ => Ok(default),
    }
}
