use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::config::PipelineConfig;
use crate::models::{ConfirmedFeature, FeatureDetection, FeatureId, ImageRecord, RoomRecord, RoomType};

use super::policy;

/// Everything known about one room type within a property, gathered from
/// the per-image records.
struct RoomGroup {
    actionable_images: usize,
    detections: Vec<(String, FeatureDetection)>,
}

/// Merge per-image detections into room-level records.
///
/// Images are grouped by pass 1 room type; a group earns a room record only
/// when enough of its images are actionable. Within a group, detections
/// sharing a feature id are one logical finding; the occurrence with the
/// highest confidence is kept, along with its explanation text and source
/// filename. Confirmed features are ordered by descending confidence, ties
/// broken by feature id.
pub fn consolidate_rooms(config: &PipelineConfig, images: &[ImageRecord]) -> Vec<RoomRecord> {
    let mut groups: BTreeMap<RoomType, RoomGroup> = BTreeMap::new();

    for image in images {
        let Some(pass1) = &image.pass1 else {
            continue;
        };

        let group = groups.entry(pass1.room_type).or_insert_with(|| RoomGroup {
            actionable_images: 0,
            detections: Vec::new(),
        });
        if pass1.actionable {
            group.actionable_images += 1;
        }
        for detection in &image.pass2 {
            group
                .detections
                .push((image.filename.clone(), detection.clone()));
        }
    }

    groups
        .into_iter()
        .filter(|(_, group)| policy::meets_consolidation_threshold(config, group.actionable_images))
        .map(|(room_type, group)| consolidate_group(room_type, group))
        .collect()
}

fn consolidate_group(room_type: RoomType, group: RoomGroup) -> RoomRecord {
    let mut best: BTreeMap<FeatureId, ConfirmedFeature> = BTreeMap::new();

    for (filename, detection) in group.detections {
        let replace = match best.get(&detection.feature_id) {
            Some(existing) => detection.confidence > existing.confidence,
            None => true,
        };
        if replace {
            best.insert(
                detection.feature_id,
                ConfirmedFeature {
                    feature_id: detection.feature_id,
                    severity: detection.severity,
                    confidence: detection.confidence,
                    evidence: detection.explanation,
                    source_filename: filename,
                },
            );
        }
    }

    let mut confirmed_features: Vec<ConfirmedFeature> = best.into_values().collect();
    confirmed_features.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.feature_id.as_str().cmp(b.feature_id.as_str()))
    });

    RoomRecord {
        room_type,
        confirmed_features,
    }
}
