use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::room::{FeatureId, RoomType, Severity};

/// Pass 1 output for one image: room classification and actionability gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pass1Result {
    pub room_type: RoomType,
    pub actionable: bool,
    pub confidence: f64,
}

/// One defect detected in one image by pass 2.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureDetection {
    pub feature_id: FeatureId,
    pub severity: Severity,
    pub confidence: f64,
    pub explanation: String,
}

/// A deduplicated room-level finding produced by consolidation.
/// `source_filename` records which image supplied the kept occurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfirmedFeature {
    pub feature_id: FeatureId,
    pub severity: Severity,
    pub confidence: f64,
    pub evidence: String,
    pub source_filename: String,
}

/// Per-image pipeline output. `pass1` is `None` and `error` is `Some` when
/// the classifier failed for this image; such images never reach pass 2.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub filename: String,
    pub pass1: Option<Pass1Result>,
    #[serde(default)]
    pub pass2: Vec<FeatureDetection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ImageRecord {
    pub fn failed(filename: String, error: String) -> Self {
        Self {
            filename,
            pass1: None,
            pass2: Vec::new(),
            error: Some(error),
        }
    }
}

/// Consolidated findings for one room type within a property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomRecord {
    pub room_type: RoomType,
    pub confirmed_features: Vec<ConfirmedFeature>,
}

/// The immutable per-property result of one pipeline run.
/// `target_images` and `review_images` partition all filenames exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseRecord {
    pub property_id: String,
    pub created_at: DateTime<Utc>,
    pub images: Vec<ImageRecord>,
    pub rooms: Vec<RoomRecord>,
    pub target_images: Vec<String>,
    pub review_images: Vec<String>,
}

impl CaseRecord {
    pub fn image(&self, filename: &str) -> Option<&ImageRecord> {
        self.images.iter().find(|image| image.filename == filename)
    }
}
