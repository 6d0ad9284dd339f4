use chrono::Utc;

use crate::config::PipelineConfig;
use crate::models::{CaseRecord, ImageRecord, RoomRecord};

use super::policy;

/// Assemble the immutable per-property record. The target/review partition
/// is computed purely from pass 1 results: actionable target-room images go
/// to `target_images`, everything else (failed images included) goes to
/// `review_images`.
pub fn build_case(
    config: &PipelineConfig,
    property_id: &str,
    images: Vec<ImageRecord>,
    rooms: Vec<RoomRecord>,
) -> CaseRecord {
    let mut target_images = Vec::new();
    let mut review_images = Vec::new();

    for image in &images {
        let is_target = image
            .pass1
            .as_ref()
            .map(|pass1| policy::is_target_image(config, pass1))
            .unwrap_or(false);
        if is_target {
            target_images.push(image.filename.clone());
        } else {
            review_images.push(image.filename.clone());
        }
    }

    CaseRecord {
        property_id: property_id.to_string(),
        created_at: Utc::now(),
        images,
        rooms,
        target_images,
        review_images,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::models::{Pass1Result, RoomType};

    fn image(filename: &str, room_type: RoomType, actionable: bool) -> ImageRecord {
        ImageRecord {
            filename: filename.to_string(),
            pass1: Some(Pass1Result {
                room_type,
                actionable,
                confidence: 0.8,
            }),
            pass2: Vec::new(),
            error: None,
        }
    }

    #[test]
    fn partition_is_exact_with_no_overlap_or_omission() {
        let config = PipelineConfig::default();
        let images = vec![
            image("kitchen_1.jpg", RoomType::Kitchen, true),
            image("bedroom_1.jpg", RoomType::Bedroom, true),
            image("bath_1.jpg", RoomType::Bathroom, false),
            ImageRecord::failed("broken.jpg".to_string(), "pass 1 failed".to_string()),
        ];

        let case = build_case(&config, "case_001", images, Vec::new());

        let mut partitioned: Vec<&String> = case
            .target_images
            .iter()
            .chain(case.review_images.iter())
            .collect();
        partitioned.sort();
        let unique: BTreeSet<_> = partitioned.iter().collect();
        assert_eq!(partitioned.len(), case.images.len());
        assert_eq!(unique.len(), partitioned.len());

        assert_eq!(case.target_images, vec!["kitchen_1.jpg"]);
        assert_eq!(
            case.review_images,
            vec!["bedroom_1.jpg", "bath_1.jpg", "broken.jpg"]
        );
    }

    #[test]
    fn failed_images_land_in_review() {
        let config = PipelineConfig::default();
        let images = vec![ImageRecord::failed(
            "broken.jpg".to_string(),
            "pass 1 timed out after 60s".to_string(),
        )];

        let case = build_case(&config, "case_002", images, Vec::new());
        assert!(case.target_images.is_empty());
        assert_eq!(case.review_images, vec!["broken.jpg"]);
    }
}
