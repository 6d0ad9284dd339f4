//! The policy decisions embedded in the pipeline, pulled out as named
//! predicates so they can be tested independently of the full run.

use log::warn;

use crate::classifier::RawFeature;
use crate::config::PipelineConfig;
use crate::models::{FeatureDetection, FeatureId, Pass1Result, RoomType};

pub fn is_target_room(config: &PipelineConfig, room_type: RoomType) -> bool {
    config.target_rooms.contains(&room_type)
}

/// Pass 2 runs only for actionable images of a target room. The same
/// predicate decides the target side of the target/review partition.
pub fn is_target_image(config: &PipelineConfig, pass1: &Pass1Result) -> bool {
    pass1.actionable && is_target_room(config, pass1.room_type)
}

/// A single photo is not enough evidence to assert a confirmed room-level
/// defect; consolidation requires this many actionable images.
pub fn meets_consolidation_threshold(config: &PipelineConfig, actionable_images: usize) -> bool {
    actionable_images >= config.min_actionable_images
}

/// Filter raw pass 2 detections against the feature whitelist. Unknown ids
/// are dropped with a data-quality warning; sibling detections from the
/// same call are unaffected.
pub fn filter_whitelisted(filename: &str, raw_features: Vec<RawFeature>) -> Vec<FeatureDetection> {
    let mut detections = Vec::with_capacity(raw_features.len());
    for raw in raw_features {
        match FeatureId::parse(&raw.feature_id) {
            Some(feature_id) => detections.push(FeatureDetection {
                feature_id,
                severity: raw.severity,
                confidence: raw.confidence,
                explanation: raw.explanation,
            }),
            None => warn!(
                "Dropping detection with unknown feature id '{}' for {filename}",
                raw.feature_id
            ),
        }
    }
    detections
}
