mod aggregate;
mod types;

pub use aggregate::summarize;
pub use types::{
    AtRiskProperty, BenchmarkSummary, ClassificationStats, ConfidenceStats, FeatureCount,
    FeatureFeedbackStats, FunnelStats, RoomCount, RoomLeaderboard, SeverityBreakdown,
};

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::config::PipelineConfig;
    use crate::models::{
        CaseRecord, Classification, FeatureDetection, FeatureId, FeedbackEntry, FeedbackKind,
        ImageRecord, Pass1Result, RoomType, Severity, Verdict,
    };

    fn image(
        filename: &str,
        room_type: RoomType,
        actionable: bool,
        confidence: f64,
        pass2: Vec<FeatureDetection>,
    ) -> ImageRecord {
        ImageRecord {
            filename: filename.to_string(),
            pass1: Some(Pass1Result {
                room_type,
                actionable,
                confidence,
            }),
            pass2,
            error: None,
        }
    }

    fn detection(feature_id: FeatureId, severity: Severity, confidence: f64) -> FeatureDetection {
        FeatureDetection {
            feature_id,
            severity,
            confidence,
            explanation: "visible".to_string(),
        }
    }

    fn case(property_id: &str, images: Vec<ImageRecord>) -> CaseRecord {
        CaseRecord {
            property_id: property_id.to_string(),
            created_at: Utc::now(),
            images,
            rooms: Vec::new(),
            target_images: Vec::new(),
            review_images: Vec::new(),
        }
    }

    fn image_feedback(filename: &str, classification: Classification) -> FeedbackEntry {
        FeedbackEntry {
            id: filename.to_string(),
            property_id: "case_001".to_string(),
            filename: filename.to_string(),
            submitted_at: Utc::now(),
            kind: FeedbackKind::Image { classification },
        }
    }

    fn feature_feedback(filename: &str, feature_id: FeatureId, verdict: Verdict) -> FeedbackEntry {
        FeedbackEntry {
            id: filename.to_string(),
            property_id: "case_001".to_string(),
            filename: filename.to_string(),
            submitted_at: Utc::now(),
            kind: FeedbackKind::Feature {
                feature_id,
                verdict,
            },
        }
    }

    #[test]
    fn empty_log_yields_zero_precision_and_recall() {
        let config = PipelineConfig::default();
        let summary = summarize(&config, &[], &[]);
        assert_eq!(summary.classification.precision, 0.0);
        assert_eq!(summary.classification.recall, 0.0);
        assert_eq!(summary.funnel.noise_reduction, 0.0);
        assert_eq!(summary.actionability_rate, 0.0);
        assert_eq!(summary.confidence.mean_pass1, 0.0);
    }

    #[test]
    fn one_of_each_classification_gives_fifty_percent() {
        let config = PipelineConfig::default();
        let feedback = vec![
            image_feedback("a.jpg", Classification::Correct),
            image_feedback("b.jpg", Classification::FalsePositive),
            image_feedback("c.jpg", Classification::FalseNegative),
        ];

        let summary = summarize(&config, &[], &feedback);
        assert_eq!(summary.classification.correct, 1);
        assert_eq!(summary.classification.false_positive, 1);
        assert_eq!(summary.classification.false_negative, 1);
        assert_eq!(summary.classification.precision, 50.0);
        assert_eq!(summary.classification.recall, 50.0);
    }

    #[test]
    fn latest_classification_wins_per_image() {
        let config = PipelineConfig::default();
        let feedback = vec![
            image_feedback("a.jpg", Classification::FalsePositive),
            image_feedback("a.jpg", Classification::Correct),
        ];

        let summary = summarize(&config, &[], &feedback);
        assert_eq!(summary.classification.correct, 1);
        assert_eq!(summary.classification.false_positive, 0);
    }

    #[test]
    fn funnel_counts_target_rooms_and_failures() {
        let config = PipelineConfig::default();
        let cases = vec![case(
            "case_001",
            vec![
                image("k.jpg", RoomType::Kitchen, true, 0.9, Vec::new()),
                image("b.jpg", RoomType::Bathroom, false, 0.8, Vec::new()),
                image("bed.jpg", RoomType::Bedroom, false, 0.7, Vec::new()),
                image("ext.jpg", RoomType::Exterior, false, 0.6, Vec::new()),
                ImageRecord::failed("broken.jpg".to_string(), "pass 1 failed".to_string()),
            ],
        )];

        let summary = summarize(&config, &cases, &[]);
        assert_eq!(summary.funnel.total_images, 5);
        assert_eq!(summary.funnel.classified_images, 4);
        assert_eq!(summary.funnel.failed_images, 1);
        assert_eq!(summary.funnel.target_room_images, 2);
        assert_eq!(summary.funnel.noise_reduction, 50.0);
        // One of the two target-room images is actionable.
        assert_eq!(summary.actionability_rate, 50.0);
    }

    #[test]
    fn severity_counts_raw_detections_not_room_records() {
        let config = PipelineConfig::default();
        let cases = vec![case(
            "case_001",
            vec![
                image(
                    "k1.jpg",
                    RoomType::Kitchen,
                    true,
                    0.9,
                    vec![detection(FeatureId::Mold, Severity::High, 0.9)],
                ),
                image(
                    "k2.jpg",
                    RoomType::Kitchen,
                    true,
                    0.9,
                    vec![
                        detection(FeatureId::Mold, Severity::High, 0.8),
                        detection(FeatureId::CrackedTile, Severity::Low, 0.6),
                    ],
                ),
            ],
        )];

        let summary = summarize(&config, &cases, &[]);
        // Duplicate mold detections both count here.
        assert_eq!(summary.severity.high, 2);
        assert_eq!(summary.severity.low, 1);
        assert_eq!(summary.severity.medium, 0);
    }

    #[test]
    fn leaderboards_sorted_by_count_then_feature_id() {
        let config = PipelineConfig::default();
        let cases = vec![case(
            "case_001",
            vec![
                image(
                    "k1.jpg",
                    RoomType::Kitchen,
                    true,
                    0.9,
                    vec![
                        detection(FeatureId::WaterDamage, Severity::Medium, 0.8),
                        detection(FeatureId::CrackedTile, Severity::Low, 0.6),
                    ],
                ),
                image(
                    "k2.jpg",
                    RoomType::Kitchen,
                    true,
                    0.9,
                    vec![detection(FeatureId::CrackedTile, Severity::Low, 0.7)],
                ),
                image(
                    "b1.jpg",
                    RoomType::Bathroom,
                    true,
                    0.9,
                    vec![detection(FeatureId::Mold, Severity::High, 0.9)],
                ),
            ],
        )];

        let summary = summarize(&config, &cases, &[]);
        assert_eq!(summary.damage_leaderboards.len(), 2);

        let kitchen = summary
            .damage_leaderboards
            .iter()
            .find(|board| board.room_type == RoomType::Kitchen)
            .unwrap();
        let ids: Vec<_> = kitchen
            .features
            .iter()
            .map(|feature| (feature.feature_id, feature.count))
            .collect();
        assert_eq!(
            ids,
            [(FeatureId::CrackedTile, 2), (FeatureId::WaterDamage, 1)]
        );

        let bathroom = summary
            .damage_leaderboards
            .iter()
            .find(|board| board.room_type == RoomType::Bathroom)
            .unwrap();
        assert_eq!(bathroom.features.len(), 1);
        assert_eq!(bathroom.features[0].feature_id, FeatureId::Mold);
    }

    #[test]
    fn at_risk_ranked_by_high_severity_then_total() {
        let config = PipelineConfig::default();
        let cases = vec![
            case(
                "calm",
                vec![image(
                    "k.jpg",
                    RoomType::Kitchen,
                    true,
                    0.9,
                    vec![detection(FeatureId::CrackedTile, Severity::Low, 0.5)],
                )],
            ),
            case(
                "severe",
                vec![image(
                    "b.jpg",
                    RoomType::Bathroom,
                    true,
                    0.9,
                    vec![detection(FeatureId::Mold, Severity::High, 0.9)],
                )],
            ),
            case(
                "busy",
                vec![image(
                    "k.jpg",
                    RoomType::Kitchen,
                    true,
                    0.9,
                    vec![
                        detection(FeatureId::CrackedTile, Severity::Low, 0.5),
                        detection(FeatureId::WaterDamage, Severity::Medium, 0.6),
                    ],
                )],
            ),
        ];

        let summary = summarize(&config, &cases, &[]);
        let order: Vec<_> = summary
            .at_risk_properties
            .iter()
            .map(|property| property.property_id.as_str())
            .collect();
        assert_eq!(order, ["severe", "busy", "calm"]);
    }

    #[test]
    fn confidence_means_cover_all_images_and_detections() {
        let config = PipelineConfig::default();
        let cases = vec![case(
            "case_001",
            vec![
                image("a.jpg", RoomType::Kitchen, true, 0.8, Vec::new()),
                image(
                    "b.jpg",
                    RoomType::Bathroom,
                    true,
                    0.6,
                    vec![
                        detection(FeatureId::Mold, Severity::High, 0.9),
                        detection(FeatureId::WaterDamage, Severity::Low, 0.5),
                    ],
                ),
            ],
        )];

        let summary = summarize(&config, &cases, &[]);
        assert!((summary.confidence.mean_pass1 - 0.7).abs() < 1e-9);
        assert!((summary.confidence.mean_pass2 - 0.7).abs() < 1e-9);
    }

    #[test]
    fn feature_verdicts_resolve_latest_before_counting() {
        let config = PipelineConfig::default();
        let feedback = vec![
            feature_feedback("a.jpg", FeatureId::Mold, Verdict::Agree),
            feature_feedback("a.jpg", FeatureId::Mold, Verdict::Disagree),
            feature_feedback("b.jpg", FeatureId::CrackedTile, Verdict::Agree),
        ];

        let summary = summarize(&config, &[], &feedback);
        assert_eq!(summary.feature_feedback.agree, 1);
        assert_eq!(summary.feature_feedback.disagree, 1);
    }

    #[test]
    fn summarize_is_idempotent() {
        let config = PipelineConfig::default();
        let cases = vec![case(
            "case_001",
            vec![image(
                "k.jpg",
                RoomType::Kitchen,
                true,
                0.9,
                vec![detection(FeatureId::Mold, Severity::High, 0.9)],
            )],
        )];
        let feedback = vec![
            image_feedback("k.jpg", Classification::Correct),
            feature_feedback("k.jpg", FeatureId::Mold, Verdict::Agree),
        ];

        let first = summarize(&config, &cases, &feedback);
        let second = summarize(&config, &cases, &feedback);
        assert_eq!(first, second);
    }
}
