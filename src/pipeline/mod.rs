pub mod case_builder;
pub mod consolidate;
pub mod per_image;
pub mod policy;

use std::sync::Arc;

use log::{info, warn};

use crate::classifier::ClassifierGateway;
use crate::config::PipelineConfig;
use crate::io::ImageInput;
use crate::models::CaseRecord;

/// Runs the full pipeline for one property: per-image classification, room
/// consolidation, case assembly. Re-running a property produces a fresh
/// case record that replaces the previous one wholesale.
pub struct PropertyProcessor {
    gateway: Arc<dyn ClassifierGateway>,
    config: PipelineConfig,
}

impl PropertyProcessor {
    pub fn new(gateway: Arc<dyn ClassifierGateway>, config: PipelineConfig) -> Self {
        Self { gateway, config }
    }

    pub async fn process_property(
        &self,
        property_id: &str,
        images: Vec<ImageInput>,
    ) -> CaseRecord {
        if images.is_empty() {
            warn!("No images found for property {property_id}");
        }
        info!(
            "Processing property {property_id} with {} images",
            images.len()
        );

        let records =
            per_image::classify_images(Arc::clone(&self.gateway), &self.config, images).await;
        let rooms = consolidate::consolidate_rooms(&self.config, &records);
        let case = case_builder::build_case(&self.config, property_id, records, rooms);

        info!(
            "Property {property_id}: {} target images, {} review images, {} rooms",
            case.target_images.len(),
            case.review_images.len(),
            case.rooms.len()
        );
        case
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use anyhow::{anyhow, Result};
    use async_trait::async_trait;

    use super::*;
    use crate::classifier::{Pass1Response, Pass2Response, RawFeature};
    use crate::models::{RoomType, Severity};

    /// Scripted gateway keyed by data URL; tests use the filename as the
    /// data URL so scripts stay readable.
    #[derive(Default)]
    struct MockGateway {
        pass1: HashMap<String, Pass1Response>,
        pass2: HashMap<String, Vec<RawFeature>>,
        failing: Vec<String>,
        pass2_calls: Mutex<Vec<String>>,
    }

    impl MockGateway {
        fn with_pass1(
            mut self,
            filename: &str,
            room_type: RoomType,
            actionable: bool,
            confidence: f64,
        ) -> Self {
            self.pass1.insert(
                filename.to_string(),
                Pass1Response {
                    room_type,
                    actionable,
                    confidence,
                },
            );
            self
        }

        fn with_pass2(mut self, filename: &str, features: Vec<RawFeature>) -> Self {
            self.pass2.insert(filename.to_string(), features);
            self
        }

        fn with_failure(mut self, filename: &str) -> Self {
            self.failing.push(filename.to_string());
            self
        }
    }

    #[async_trait]
    impl ClassifierGateway for MockGateway {
        async fn classify_pass1(&self, image_data_url: &str) -> Result<Pass1Response> {
            if self.failing.iter().any(|name| name == image_data_url) {
                return Err(anyhow!("provider unavailable"));
            }
            self.pass1
                .get(image_data_url)
                .cloned()
                .ok_or_else(|| anyhow!("unexpected pass 1 call for {image_data_url}"))
        }

        async fn classify_pass2(
            &self,
            image_data_url: &str,
            _room_type: RoomType,
        ) -> Result<Pass2Response> {
            self.pass2_calls
                .lock()
                .unwrap()
                .push(image_data_url.to_string());
            Ok(Pass2Response {
                features: self.pass2.get(image_data_url).cloned().unwrap_or_default(),
            })
        }
    }

    fn input(filename: &str) -> ImageInput {
        ImageInput {
            filename: filename.to_string(),
            data_url: filename.to_string(),
        }
    }

    fn raw_feature(feature_id: &str, severity: Severity, confidence: f64) -> RawFeature {
        RawFeature {
            feature_id: feature_id.to_string(),
            severity,
            confidence,
            explanation: "visible in photo".to_string(),
        }
    }

    #[tokio::test]
    async fn two_actionable_bathrooms_one_inactionable_kitchen() {
        let gateway = MockGateway::default()
            .with_pass1("bath_1.jpg", RoomType::Bathroom, true, 0.92)
            .with_pass1("bath_2.jpg", RoomType::Bathroom, true, 0.88)
            .with_pass1("kitchen_1.jpg", RoomType::Kitchen, false, 0.75)
            .with_pass2(
                "bath_1.jpg",
                vec![raw_feature("mold", Severity::High, 0.9)],
            )
            .with_pass2(
                "bath_2.jpg",
                vec![raw_feature("mold", Severity::High, 0.7)],
            );

        let processor =
            PropertyProcessor::new(Arc::new(gateway), PipelineConfig::default());
        let case = processor
            .process_property(
                "case_001",
                vec![input("bath_1.jpg"), input("bath_2.jpg"), input("kitchen_1.jpg")],
            )
            .await;

        assert_eq!(case.rooms.len(), 1);
        assert_eq!(case.rooms[0].room_type, RoomType::Bathroom);
        assert_eq!(case.target_images, vec!["bath_1.jpg", "bath_2.jpg"]);
        assert_eq!(case.review_images, vec!["kitchen_1.jpg"]);
        assert_eq!(case.rooms[0].confirmed_features.len(), 1);
        assert_eq!(case.rooms[0].confirmed_features[0].source_filename, "bath_1.jpg");
    }

    #[tokio::test]
    async fn one_failing_image_does_not_abort_the_run() {
        let gateway = MockGateway::default()
            .with_failure("broken.jpg")
            .with_pass1("kitchen_1.jpg", RoomType::Kitchen, true, 0.9)
            .with_pass2(
                "kitchen_1.jpg",
                vec![raw_feature("water_damage", Severity::Medium, 0.8)],
            );

        let processor =
            PropertyProcessor::new(Arc::new(gateway), PipelineConfig::default());
        let case = processor
            .process_property("case_002", vec![input("broken.jpg"), input("kitchen_1.jpg")])
            .await;

        assert_eq!(case.images.len(), 2);
        let failed = case.image("broken.jpg").unwrap();
        assert!(failed.pass1.is_none());
        assert!(failed.error.as_deref().unwrap().contains("pass 1 failed"));
        assert!(case.review_images.contains(&"broken.jpg".to_string()));

        let ok = case.image("kitchen_1.jpg").unwrap();
        assert_eq!(ok.pass2.len(), 1);
    }

    #[tokio::test]
    async fn pass2_runs_only_for_actionable_target_rooms() {
        let gateway = Arc::new(
            MockGateway::default()
                .with_pass1("bedroom_1.jpg", RoomType::Bedroom, true, 0.9)
                .with_pass1("kitchen_1.jpg", RoomType::Kitchen, false, 0.9)
                .with_pass1("bath_1.jpg", RoomType::Bathroom, true, 0.9),
        );

        let processor = PropertyProcessor::new(
            Arc::clone(&gateway) as Arc<dyn ClassifierGateway>,
            PipelineConfig::default(),
        );
        let case = processor
            .process_property(
                "case_003",
                vec![input("bedroom_1.jpg"), input("kitchen_1.jpg"), input("bath_1.jpg")],
            )
            .await;

        let pass2_calls = gateway.pass2_calls.lock().unwrap().clone();
        assert_eq!(pass2_calls, vec!["bath_1.jpg"]);
        assert_eq!(case.target_images, vec!["bath_1.jpg"]);
    }

    #[tokio::test]
    async fn unknown_feature_ids_are_dropped_from_records() {
        let gateway = MockGateway::default()
            .with_pass1("bath_1.jpg", RoomType::Bathroom, true, 0.9)
            .with_pass2(
                "bath_1.jpg",
                vec![
                    raw_feature("unknown_widget", Severity::Low, 0.9),
                    raw_feature("cracked_tile", Severity::Low, 0.6),
                ],
            );

        let processor =
            PropertyProcessor::new(Arc::new(gateway), PipelineConfig::default());
        let case = processor
            .process_property("case_004", vec![input("bath_1.jpg")])
            .await;

        let image = case.image("bath_1.jpg").unwrap();
        assert_eq!(image.pass2.len(), 1);
        assert_eq!(image.pass2[0].feature_id.as_str(), "cracked_tile");
    }

    #[tokio::test]
    async fn results_keep_input_order_under_concurrency() {
        let mut gateway = MockGateway::default();
        for index in 0..8 {
            gateway = gateway.with_pass1(
                &format!("img_{index}.jpg"),
                RoomType::Bedroom,
                false,
                0.5,
            );
        }

        let processor =
            PropertyProcessor::new(Arc::new(gateway), PipelineConfig::default());
        let inputs: Vec<ImageInput> = (0..8).map(|i| input(&format!("img_{i}.jpg"))).collect();
        let case = processor.process_property("case_005", inputs).await;

        let filenames: Vec<_> = case
            .images
            .iter()
            .map(|image| image.filename.as_str())
            .collect();
        let expected: Vec<String> = (0..8).map(|i| format!("img_{i}.jpg")).collect();
        assert_eq!(filenames, expected.iter().map(String::as_str).collect::<Vec<_>>());
    }
}
