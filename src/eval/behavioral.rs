//! Layer 2 evaluator: objection triples, buying intent, competitive mentions,
//! engagement trajectory.
//!
//! Behavioral signals carry closed vocabularies (objection types, marker
//! types, phases), so matching is exact-set rather than fuzzy; the engagement
//! trajectory additionally scores ordinal agreement on its three rating
//! dimensions.

use std::collections::HashSet;

use crate::schemas::behavioral::BehavioralSignals;
use crate::schemas::transcript::Transcript;

use super::metrics::{ordinal_agreement, precision_recall_f1};
use super::report::{LayerReport, SignalMetrics};
use super::structural::{check_score_distribution, validate_utterance_indices};

/// Ordered scale for prospect participation in a phase.
pub const PARTICIPATION_SCALE: [&str; 3] = ["low", "moderate", "high"];
/// Ordered scale for how probing the prospect's questions are.
pub const QUESTION_DEPTH_SCALE: [&str; 3] = ["surface", "moderate", "deep"];
/// Ordered scale for vocal/textual energy.
pub const ENERGY_SCALE: [&str; 3] = ["low", "medium", "high"];

/// Evaluate Layer 2 behavioral signal extraction.
pub struct BehavioralEvaluator;

impl BehavioralEvaluator {
    pub fn evaluate(
        &self,
        extracted: &BehavioralSignals,
        ground_truth: &BehavioralSignals,
        transcript: &Transcript,
    ) -> LayerReport {
        let max_idx = transcript.max_turn_index();

        LayerReport {
            layer_name: "Behavioral".into(),
            signal_metrics: vec![
                self.eval_objection_triples(extracted, ground_truth, max_idx),
                self.eval_buying_intent(extracted, ground_truth),
                self.eval_competitive_mentions(extracted, ground_truth, max_idx),
                self.eval_engagement_trajectory(extracted, ground_truth),
            ],
        }
    }

    fn eval_objection_triples(
        &self,
        extracted: &BehavioralSignals,
        ground_truth: &BehavioralSignals,
        max_idx: usize,
    ) -> SignalMetrics {
        let ext_types: HashSet<_> = extracted
            .objection_triples
            .iter()
            .map(|t| t.objection.objection_type)
            .collect();
        let gt_types: HashSet<_> = ground_truth
            .objection_triples
            .iter()
            .map(|t| t.objection.objection_type)
            .collect();

        let (p, r, f) = precision_recall_f1(&ext_types, &gt_types);

        // Resolution and outcome agreement over triples sharing an objection
        // type; first extracted match wins.
        let mut resolution_matches = 0usize;
        let mut outcome_matches = 0usize;
        let mut matched_count = 0usize;
        for gt_triple in &ground_truth.objection_triples {
            if let Some(ext_triple) = extracted
                .objection_triples
                .iter()
                .find(|t| t.objection.objection_type == gt_triple.objection.objection_type)
            {
                matched_count += 1;
                if let (Some(ext_res), Some(gt_res)) = (&ext_triple.resolution, &gt_triple.resolution)
                {
                    if ext_res.resolution_type == gt_res.resolution_type {
                        resolution_matches += 1;
                    }
                }
                if ext_triple.outcome.resolved == gt_triple.outcome.resolved {
                    outcome_matches += 1;
                }
            }
        }

        let combined_accuracy = if matched_count > 0 {
            let resolution_accuracy = resolution_matches as f64 / matched_count as f64;
            let outcome_accuracy = outcome_matches as f64 / matched_count as f64;
            Some((resolution_accuracy + outcome_accuracy) / 2.0)
        } else {
            None
        };

        let mut issues = Vec::new();
        for t in &extracted.objection_triples {
            issues.extend(validate_utterance_indices(
                &t.objection.source_utterance_indices,
                max_idx,
                &format!("objection:{:?}", t.objection.objection_type),
            ));
            if let Some(res) = &t.resolution {
                issues.extend(validate_utterance_indices(
                    &res.source_utterance_indices,
                    max_idx,
                    &format!("resolution:{:?}", res.resolution_type),
                ));
            }
        }

        let confidences: Vec<f64> = extracted
            .objection_triples
            .iter()
            .map(|t| t.confidence)
            .collect();
        let (dist, dist_issues) = check_score_distribution(&confidences, "objection_confidence");
        issues.extend(dist_issues);

        SignalMetrics {
            precision: Some(p),
            recall: Some(r),
            f1: Some(f),
            count_extracted: extracted.objection_triples.len(),
            count_ground_truth: ground_truth.objection_triples.len(),
            accuracy: combined_accuracy,
            structural_issues: issues,
            score_distribution: Some(dist),
            ..SignalMetrics::named("objection_triples")
        }
    }

    fn eval_buying_intent(
        &self,
        extracted: &BehavioralSignals,
        ground_truth: &BehavioralSignals,
    ) -> SignalMetrics {
        let ext_types: HashSet<_> = extracted
            .buying_intent_markers
            .iter()
            .map(|m| m.marker_type)
            .collect();
        let gt_types: HashSet<_> = ground_truth
            .buying_intent_markers
            .iter()
            .map(|m| m.marker_type)
            .collect();

        let (p, r, f) = precision_recall_f1(&ext_types, &gt_types);

        let confidences: Vec<f64> = extracted
            .buying_intent_markers
            .iter()
            .map(|m| m.confidence)
            .collect();
        let (dist, issues) = check_score_distribution(&confidences, "buying_intent_confidence");

        SignalMetrics {
            precision: Some(p),
            recall: Some(r),
            f1: Some(f),
            count_extracted: extracted.buying_intent_markers.len(),
            count_ground_truth: ground_truth.buying_intent_markers.len(),
            score_distribution: Some(dist),
            structural_issues: issues,
            ..SignalMetrics::named("buying_intent")
        }
    }

    fn eval_competitive_mentions(
        &self,
        extracted: &BehavioralSignals,
        ground_truth: &BehavioralSignals,
        max_idx: usize,
    ) -> SignalMetrics {
        let ext_names: HashSet<String> = extracted
            .competitive_mentions
            .iter()
            .map(|cm| cm.competitor.to_lowercase())
            .collect();
        let gt_names: HashSet<String> = ground_truth
            .competitive_mentions
            .iter()
            .map(|cm| cm.competitor.to_lowercase())
            .collect();

        let (p, r, f) = precision_recall_f1(&ext_names, &gt_names);

        // Sentiment agreement on matched competitors, first match wins.
        let mut sentiment_matches = 0usize;
        let mut matched_count = 0usize;
        for gt_cm in &ground_truth.competitive_mentions {
            if let Some(ext_cm) = extracted
                .competitive_mentions
                .iter()
                .find(|cm| cm.competitor.to_lowercase() == gt_cm.competitor.to_lowercase())
            {
                matched_count += 1;
                if ext_cm.sentiment == gt_cm.sentiment {
                    sentiment_matches += 1;
                }
            }
        }

        let sentiment_accuracy = if matched_count > 0 {
            Some(sentiment_matches as f64 / matched_count as f64)
        } else {
            None
        };

        let mut issues = Vec::new();
        for cm in &extracted.competitive_mentions {
            issues.extend(validate_utterance_indices(
                &cm.source_utterance_indices,
                max_idx,
                &format!("competitor:{}", cm.competitor),
            ));
        }

        SignalMetrics {
            precision: Some(p),
            recall: Some(r),
            f1: Some(f),
            count_extracted: extracted.competitive_mentions.len(),
            count_ground_truth: ground_truth.competitive_mentions.len(),
            accuracy: sentiment_accuracy,
            structural_issues: issues,
            ..SignalMetrics::named("competitive_mentions")
        }
    }

    fn eval_engagement_trajectory(
        &self,
        extracted: &BehavioralSignals,
        ground_truth: &BehavioralSignals,
    ) -> SignalMetrics {
        let ext_phases: HashSet<_> = extracted
            .engagement_trajectory
            .iter()
            .map(|p| p.phase)
            .collect();
        let gt_phases: HashSet<_> = ground_truth
            .engagement_trajectory
            .iter()
            .map(|p| p.phase)
            .collect();

        let (p, r, f) = precision_recall_f1(&ext_phases, &gt_phases);

        // Ordinal agreement over the three rating dimensions for phases
        // present in both trajectories.
        let mut agreements: Vec<f64> = Vec::new();
        for gt_point in &ground_truth.engagement_trajectory {
            if let Some(ext_point) = extracted
                .engagement_trajectory
                .iter()
                .find(|pt| pt.phase == gt_point.phase)
            {
                agreements.push(ordinal_agreement(
                    ext_point.participation_level.as_str(),
                    gt_point.participation_level.as_str(),
                    &PARTICIPATION_SCALE,
                ));
                agreements.push(ordinal_agreement(
                    ext_point.question_depth.as_str(),
                    gt_point.question_depth.as_str(),
                    &QUESTION_DEPTH_SCALE,
                ));
                agreements.push(ordinal_agreement(
                    ext_point.energy.as_str(),
                    gt_point.energy.as_str(),
                    &ENERGY_SCALE,
                ));
            }
        }

        let mean_agreement = if agreements.is_empty() {
            None
        } else {
            Some(agreements.iter().sum::<f64>() / agreements.len() as f64)
        };

        SignalMetrics {
            precision: Some(p),
            recall: Some(r),
            f1: Some(f),
            count_extracted: extracted.engagement_trajectory.len(),
            count_ground_truth: ground_truth.engagement_trajectory.len(),
            ordinal_agreement: mean_agreement,
            ..SignalMetrics::named("engagement_trajectory")
        }
    }
}
