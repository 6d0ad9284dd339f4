use serde::{Deserialize, Serialize};

use crate::models::{FeatureId, RoomType};

/// Precision/recall over human-labeled image classifications.
/// `precision` and `recall` are percentages in [0, 100]; both are 0 when
/// their denominator is empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationStats {
    pub correct: u64,
    pub false_positive: u64,
    pub false_negative: u64,
    pub precision: f64,
    pub recall: f64,
}

/// How many images survive the pass 1 target-room gate. `noise_reduction`
/// is the percentage of classified images discarded as non-target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunnelStats {
    pub total_images: u64,
    pub classified_images: u64,
    pub failed_images: u64,
    pub target_room_images: u64,
    pub noise_reduction: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomCount {
    pub room_type: RoomType,
    pub count: u64,
}

/// Counts of raw detections by severity, not deduplicated by room record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeverityBreakdown {
    pub low: u64,
    pub medium: u64,
    pub high: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCount {
    pub feature_id: FeatureId,
    pub count: u64,
}

/// Feature frequency for one target room, sorted by descending count, ties
/// broken by feature id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomLeaderboard {
    pub room_type: RoomType,
    pub features: Vec<FeatureCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceStats {
    pub mean_pass1: f64,
    pub mean_pass2: f64,
}

/// One row of the prioritized review queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtRiskProperty {
    pub property_id: String,
    pub high_severity_detections: u64,
    pub total_detections: u64,
}

/// Latest-wins tallies of feature-level reviewer verdicts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureFeedbackStats {
    pub agree: u64,
    pub disagree: u64,
}

/// The read-only benchmark summary served to the review surface. Computed
/// from scratch on every query; identical inputs produce identical output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkSummary {
    pub classification: ClassificationStats,
    pub funnel: FunnelStats,
    pub room_distribution: Vec<RoomCount>,
    /// Percentage of target-room images pass 1 marked actionable.
    pub actionability_rate: f64,
    pub severity: SeverityBreakdown,
    pub damage_leaderboards: Vec<RoomLeaderboard>,
    pub confidence: ConfidenceStats,
    pub at_risk_properties: Vec<AtRiskProperty>,
    pub feature_feedback: FeatureFeedbackStats,
}
