use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::GatewayConfig;
use crate::models::{RoomType, FEATURE_WHITELIST};

use super::gateway::{ClassifierGateway, Pass1Response, Pass2Response};
use super::rate_limit::RateLimiter;
use super::retry::with_retry;
use super::{prompts, schemas};

/// HTTP timeout for a single provider request. Retries and the per-image
/// pipeline timeout are layered on top of this.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Production classifier gateway: an OpenAI-compatible Chat Completions
/// endpoint with JSON-schema constrained output.
pub struct OpenAiGateway {
    http: Client,
    config: GatewayConfig,
    limiter: RateLimiter,
}

impl OpenAiGateway {
    pub fn new(config: GatewayConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to create HTTP client")?;
        let limiter = RateLimiter::new(config.requests_per_minute);

        Ok(Self {
            http,
            config,
            limiter,
        })
    }

    async fn call(&self, system_prompt: &str, schema: Value, user_content: Value) -> Result<Value> {
        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );
        let body = json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": system_prompt },
                { "role": "user", "content": user_content },
            ],
            "response_format": {
                "type": "json_schema",
                "json_schema": schema,
            },
        });

        with_retry(
            self.config.max_retries,
            self.config.retry_backoff_seconds,
            || async {
                self.limiter.acquire().await;
                let response = self
                    .http
                    .post(&url)
                    .bearer_auth(&self.config.api_key)
                    .json(&body)
                    .send()
                    .await
                    .context("classifier request failed")?
                    .error_for_status()
                    .context("classifier returned error status")?;

                let completion: ChatCompletion = response
                    .json()
                    .await
                    .context("malformed completion payload")?;
                let choice = completion
                    .choices
                    .into_iter()
                    .next()
                    .context("completion had no choices")?;
                let output = choice
                    .message
                    .content
                    .filter(|text| !text.is_empty())
                    .context("empty response output")?;

                serde_json::from_str(&output).context("response output was not valid JSON")
            },
        )
        .await
    }
}

#[async_trait]
impl ClassifierGateway for OpenAiGateway {
    async fn classify_pass1(&self, image_data_url: &str) -> Result<Pass1Response> {
        let content = json!([
            { "type": "input_image", "image_url": { "url": image_data_url } },
        ]);
        let value = self
            .call(prompts::PASS1_SYSTEM, schemas::pass1_schema(), content)
            .await?;
        serde_json::from_value(value).context("pass 1 payload did not match schema")
    }

    async fn classify_pass2(
        &self,
        image_data_url: &str,
        room_type: RoomType,
    ) -> Result<Pass2Response> {
        let whitelist = FEATURE_WHITELIST
            .iter()
            .map(|feature| feature.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let system_prompt = format!("{}\nAllowed feature IDs: {whitelist}", prompts::PASS2_SYSTEM);
        let content = json!([
            { "type": "text", "text": format!("Room type: {}", room_type.as_str()) },
            { "type": "input_image", "image_url": { "url": image_data_url } },
        ]);
        let value = self
            .call(&system_prompt, schemas::pass2_schema(), content)
            .await?;
        serde_json::from_value(value).context("pass 2 payload did not match schema")
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}
