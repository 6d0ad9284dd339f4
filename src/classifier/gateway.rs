use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;

use crate::models::{RoomType, Severity};

/// Raw pass 1 payload as returned by the provider.
#[derive(Debug, Clone, Deserialize)]
pub struct Pass1Response {
    pub room_type: RoomType,
    pub actionable: bool,
    pub confidence: f64,
}

/// Raw pass 2 detection. `feature_id` stays a string here; the pipeline
/// filters it against the whitelist before it becomes a typed detection.
#[derive(Debug, Clone, Deserialize)]
pub struct RawFeature {
    pub feature_id: String,
    pub severity: Severity,
    pub confidence: f64,
    pub explanation: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Pass2Response {
    pub features: Vec<RawFeature>,
}

/// Wraps calls to the external vision model. Errors are opaque failure
/// signals (network, malformed response, provider error) that the per-image
/// pipeline catches per image.
#[async_trait]
pub trait ClassifierGateway: Send + Sync {
    async fn classify_pass1(&self, image_data_url: &str) -> Result<Pass1Response>;

    async fn classify_pass2(
        &self,
        image_data_url: &str,
        room_type: RoomType,
    ) -> Result<Pass2Response>;
}
