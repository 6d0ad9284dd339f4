use std::collections::{BTreeMap, HashMap};

use crate::config::PipelineConfig;
use crate::models::{
    CaseRecord, Classification, FeatureId, FeedbackEntry, FeedbackKind, RoomType, Severity,
    Verdict,
};
use crate::pipeline::policy;

use super::types::{
    AtRiskProperty, BenchmarkSummary, ClassificationStats, ConfidenceStats, FeatureCount,
    FeatureFeedbackStats, FunnelStats, RoomCount, RoomLeaderboard, SeverityBreakdown,
};

/// Fold all case records and the full feedback log into the benchmark
/// summary. Pure: no state is kept between calls, and the only
/// order-sensitivity is the latest-wins rule over the feedback log.
pub fn summarize(
    config: &PipelineConfig,
    cases: &[CaseRecord],
    feedback: &[FeedbackEntry],
) -> BenchmarkSummary {
    BenchmarkSummary {
        classification: classification_stats(feedback),
        funnel: funnel_stats(config, cases),
        room_distribution: room_distribution(cases),
        actionability_rate: actionability_rate(config, cases),
        severity: severity_breakdown(cases),
        damage_leaderboards: damage_leaderboards(config, cases),
        confidence: confidence_stats(cases),
        at_risk_properties: at_risk_properties(cases),
        feature_feedback: feature_feedback(feedback),
    }
}

fn percentage(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64 * 100.0
    }
}

fn classification_stats(feedback: &[FeedbackEntry]) -> ClassificationStats {
    // Resolve the latest image-level classification per (property, filename).
    let mut resolved: HashMap<(&str, &str), Classification> = HashMap::new();
    for entry in feedback {
        if let FeedbackKind::Image { classification } = &entry.kind {
            resolved.insert(
                (entry.property_id.as_str(), entry.filename.as_str()),
                *classification,
            );
        }
    }

    let mut correct = 0;
    let mut false_positive = 0;
    let mut false_negative = 0;
    for classification in resolved.values() {
        match classification {
            Classification::Correct => correct += 1,
            Classification::FalsePositive => false_positive += 1,
            Classification::FalseNegative => false_negative += 1,
        }
    }

    ClassificationStats {
        correct,
        false_positive,
        false_negative,
        precision: percentage(correct, correct + false_positive),
        recall: percentage(correct, correct + false_negative),
    }
}

fn funnel_stats(config: &PipelineConfig, cases: &[CaseRecord]) -> FunnelStats {
    let mut total_images = 0;
    let mut classified_images = 0;
    let mut target_room_images = 0;

    for case in cases {
        for image in &case.images {
            total_images += 1;
            if let Some(pass1) = &image.pass1 {
                classified_images += 1;
                if policy::is_target_room(config, pass1.room_type) {
                    target_room_images += 1;
                }
            }
        }
    }

    FunnelStats {
        total_images,
        classified_images,
        failed_images: total_images - classified_images,
        target_room_images,
        noise_reduction: percentage(classified_images - target_room_images, classified_images),
    }
}

fn room_distribution(cases: &[CaseRecord]) -> Vec<RoomCount> {
    let mut counts: BTreeMap<RoomType, u64> = BTreeMap::new();
    for case in cases {
        for image in &case.images {
            if let Some(pass1) = &image.pass1 {
                *counts.entry(pass1.room_type).or_insert(0) += 1;
            }
        }
    }

    counts
        .into_iter()
        .map(|(room_type, count)| RoomCount { room_type, count })
        .collect()
}

fn actionability_rate(config: &PipelineConfig, cases: &[CaseRecord]) -> f64 {
    let mut target_room_images = 0;
    let mut actionable = 0;
    for case in cases {
        for image in &case.images {
            if let Some(pass1) = &image.pass1 {
                if policy::is_target_room(config, pass1.room_type) {
                    target_room_images += 1;
                    if pass1.actionable {
                        actionable += 1;
                    }
                }
            }
        }
    }
    percentage(actionable, target_room_images)
}

fn severity_breakdown(cases: &[CaseRecord]) -> SeverityBreakdown {
    let mut breakdown = SeverityBreakdown {
        low: 0,
        medium: 0,
        high: 0,
    };
    for case in cases {
        for image in &case.images {
            for detection in &image.pass2 {
                match detection.severity {
                    Severity::Low => breakdown.low += 1,
                    Severity::Medium => breakdown.medium += 1,
                    Severity::High => breakdown.high += 1,
                }
            }
        }
    }
    breakdown
}

fn damage_leaderboards(config: &PipelineConfig, cases: &[CaseRecord]) -> Vec<RoomLeaderboard> {
    config
        .target_rooms
        .iter()
        .map(|&room_type| {
            let mut counts: BTreeMap<FeatureId, u64> = BTreeMap::new();
            for case in cases {
                for image in &case.images {
                    let in_room = image
                        .pass1
                        .as_ref()
                        .map(|pass1| pass1.room_type == room_type)
                        .unwrap_or(false);
                    if !in_room {
                        continue;
                    }
                    for detection in &image.pass2 {
                        *counts.entry(detection.feature_id).or_insert(0) += 1;
                    }
                }
            }

            let mut features: Vec<FeatureCount> = counts
                .into_iter()
                .map(|(feature_id, count)| FeatureCount { feature_id, count })
                .collect();
            features.sort_by(|a, b| {
                b.count
                    .cmp(&a.count)
                    .then_with(|| a.feature_id.as_str().cmp(b.feature_id.as_str()))
            });

            RoomLeaderboard {
                room_type,
                features,
            }
        })
        .collect()
}

fn confidence_stats(cases: &[CaseRecord]) -> ConfidenceStats {
    let mut pass1_sum = 0.0;
    let mut pass1_count = 0u64;
    let mut pass2_sum = 0.0;
    let mut pass2_count = 0u64;

    for case in cases {
        for image in &case.images {
            if let Some(pass1) = &image.pass1 {
                pass1_sum += pass1.confidence;
                pass1_count += 1;
            }
            for detection in &image.pass2 {
                pass2_sum += detection.confidence;
                pass2_count += 1;
            }
        }
    }

    ConfidenceStats {
        mean_pass1: if pass1_count == 0 {
            0.0
        } else {
            pass1_sum / pass1_count as f64
        },
        mean_pass2: if pass2_count == 0 {
            0.0
        } else {
            pass2_sum / pass2_count as f64
        },
    }
}

fn at_risk_properties(cases: &[CaseRecord]) -> Vec<AtRiskProperty> {
    let mut properties: Vec<AtRiskProperty> = cases
        .iter()
        .map(|case| {
            let mut high_severity_detections = 0;
            let mut total_detections = 0;
            for image in &case.images {
                for detection in &image.pass2 {
                    total_detections += 1;
                    if detection.severity == Severity::High {
                        high_severity_detections += 1;
                    }
                }
            }
            AtRiskProperty {
                property_id: case.property_id.clone(),
                high_severity_detections,
                total_detections,
            }
        })
        .collect();

    properties.sort_by(|a, b| {
        b.high_severity_detections
            .cmp(&a.high_severity_detections)
            .then_with(|| b.total_detections.cmp(&a.total_detections))
            .then_with(|| a.property_id.cmp(&b.property_id))
    });
    properties
}

fn feature_feedback(feedback: &[FeedbackEntry]) -> FeatureFeedbackStats {
    let mut resolved: HashMap<(&str, &str, FeatureId), Verdict> = HashMap::new();
    for entry in feedback {
        if let FeedbackKind::Feature {
            feature_id,
            verdict,
        } = &entry.kind
        {
            resolved.insert(
                (
                    entry.property_id.as_str(),
                    entry.filename.as_str(),
                    *feature_id,
                ),
                *verdict,
            );
        }
    }

    let mut stats = FeatureFeedbackStats {
        agree: 0,
        disagree: 0,
    };
    for verdict in resolved.values() {
        match verdict {
            Verdict::Agree => stats.agree += 1,
            Verdict::Disagree => stats.disagree += 1,
        }
    }
    stats
}
