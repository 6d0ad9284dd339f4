use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::room::FeatureId;

/// Reviewer judgment on a whole image's pass-1 classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Classification {
    #[serde(rename = "correct")]
    Correct,
    #[serde(rename = "fp")]
    FalsePositive,
    #[serde(rename = "fn")]
    FalseNegative,
}

/// Reviewer judgment on one detected feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Agree,
    Disagree,
}

/// The two kinds of feedback a reviewer can attach. Serialized flat into the
/// entry object so the on-disk log keeps the original shape
/// (`classification` for image-level, `feature_id` + `verdict` for
/// feature-level).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeedbackKind {
    Feature {
        feature_id: FeatureId,
        verdict: Verdict,
    },
    Image {
        classification: Classification,
    },
}

/// One appended human judgment. Entries are never mutated or deleted;
/// corrections append a new entry for the same key and the latest wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackEntry {
    pub id: String,
    pub property_id: String,
    pub filename: String,
    pub submitted_at: DateTime<Utc>,
    #[serde(flatten)]
    pub kind: FeedbackKind,
}

/// Resolution key: multiple entries may share a key, the latest appended one
/// is authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FeedbackKey {
    Image {
        property_id: String,
        filename: String,
    },
    Feature {
        property_id: String,
        filename: String,
        feature_id: FeatureId,
    },
}

impl FeedbackEntry {
    pub fn key(&self) -> FeedbackKey {
        match &self.kind {
            FeedbackKind::Image { .. } => FeedbackKey::Image {
                property_id: self.property_id.clone(),
                filename: self.filename.clone(),
            },
            FeedbackKind::Feature { feature_id, .. } => FeedbackKey::Feature {
                property_id: self.property_id.clone(),
                filename: self.filename.clone(),
                feature_id: *feature_id,
            },
        }
    }
}

/// An append request from the review surface. The store stamps id and
/// submission time and validates the references before accepting it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRequest {
    pub property_id: String,
    pub filename: String,
    #[serde(flatten)]
    pub kind: FeedbackKind,
}

/// Current (latest-wins) verdict for one detected feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedVerdict {
    pub filename: String,
    pub feature_id: FeatureId,
    pub verdict: Verdict,
}

/// Current feedback state for one property, resolved by the latest-wins rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedFeedback {
    pub property_id: String,
    pub image_classifications: BTreeMap<String, Classification>,
    pub feature_verdicts: Vec<ResolvedVerdict>,
}
