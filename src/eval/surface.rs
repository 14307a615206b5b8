//! Layer 1 evaluator: aspects, topics, entities, key phrases.

use crate::schemas::surface::SurfaceSignals;
use crate::schemas::transcript::Transcript;

use super::fuzzy::{compute_fuzzy_precision_recall, token_overlap_similarity};
use super::report::{LayerReport, SignalMetrics};
use super::structural::{
    check_score_distribution, check_timeline_consistency, validate_utterance_indices,
};

// Fuzzy match thresholds per signal type. Entities need near-exact names,
// key phrases tolerate heavy paraphrase.
pub const ASPECT_THRESHOLD: f64 = 0.6;
pub const TOPIC_THRESHOLD: f64 = 0.5;
pub const ENTITY_THRESHOLD: f64 = 0.8;
pub const KEYPHRASE_THRESHOLD: f64 = 0.4;

/// Evaluate Layer 1 surface signal extraction.
pub struct SurfaceEvaluator;

impl SurfaceEvaluator {
    pub fn evaluate(
        &self,
        extracted: &SurfaceSignals,
        ground_truth: &SurfaceSignals,
        transcript: &Transcript,
    ) -> LayerReport {
        let max_idx = transcript.max_turn_index();

        LayerReport {
            layer_name: "Surface".into(),
            signal_metrics: vec![
                self.eval_aspects(extracted, ground_truth, max_idx),
                self.eval_topics(extracted, ground_truth, transcript),
                self.eval_entities(extracted, ground_truth),
                self.eval_key_phrases(extracted, ground_truth),
            ],
        }
    }

    fn eval_aspects(
        &self,
        extracted: &SurfaceSignals,
        ground_truth: &SurfaceSignals,
        max_idx: usize,
    ) -> SignalMetrics {
        let ext_names: Vec<String> = extracted.aspects.iter().map(|a| a.aspect.clone()).collect();
        let gt_names: Vec<String> = ground_truth
            .aspects
            .iter()
            .map(|a| a.aspect.clone())
            .collect();

        let result = compute_fuzzy_precision_recall(
            &ext_names,
            &gt_names,
            token_overlap_similarity,
            ASPECT_THRESHOLD,
        );

        // Sentiment polarity agreement and intensity error on matched pairs.
        let mut polarity_matches = 0usize;
        let mut intensity_errors: Vec<f64> = Vec::new();
        for (ext_name, gt_name, _) in &result.matched {
            let ext_aspect = extracted.aspects.iter().find(|a| &a.aspect == ext_name);
            let gt_aspect = ground_truth.aspects.iter().find(|a| &a.aspect == gt_name);
            if let (Some(ext), Some(gt)) = (ext_aspect, gt_aspect) {
                if ext.sentiment == gt.sentiment {
                    polarity_matches += 1;
                }
                intensity_errors.push((ext.intensity - gt.intensity).abs());
            }
        }

        let polarity_accuracy = if result.matched.is_empty() {
            None
        } else {
            Some(polarity_matches as f64 / result.matched.len() as f64)
        };
        let intensity_mae = if intensity_errors.is_empty() {
            None
        } else {
            Some(intensity_errors.iter().sum::<f64>() / intensity_errors.len() as f64)
        };

        let mut issues = Vec::new();
        for a in &extracted.aspects {
            issues.extend(validate_utterance_indices(
                &a.source_utterance_indices,
                max_idx,
                &format!("aspect:{}", a.aspect),
            ));
        }

        let intensities: Vec<f64> = extracted.aspects.iter().map(|a| a.intensity).collect();
        let (dist, dist_issues) = check_score_distribution(&intensities, "aspect_intensity");
        issues.extend(dist_issues);

        SignalMetrics {
            precision: Some(result.precision),
            recall: Some(result.recall),
            f1: Some(result.f1),
            count_extracted: ext_names.len(),
            count_ground_truth: gt_names.len(),
            accuracy: polarity_accuracy,
            mae: intensity_mae,
            structural_issues: issues,
            score_distribution: Some(dist),
            matched_pairs: result.matched,
            ..SignalMetrics::named("aspects")
        }
    }

    fn eval_topics(
        &self,
        extracted: &SurfaceSignals,
        ground_truth: &SurfaceSignals,
        transcript: &Transcript,
    ) -> SignalMetrics {
        let ext_names: Vec<String> = extracted.topics.iter().map(|t| t.name.clone()).collect();
        let gt_names: Vec<String> = ground_truth.topics.iter().map(|t| t.name.clone()).collect();

        let result = compute_fuzzy_precision_recall(
            &ext_names,
            &gt_names,
            token_overlap_similarity,
            TOPIC_THRESHOLD,
        );

        // Timeline label agreement and relevance error on matched pairs.
        let mut timeline_matches = 0usize;
        let mut relevance_errors: Vec<f64> = Vec::new();
        for (ext_name, gt_name, _) in &result.matched {
            let ext_topic = extracted.topics.iter().find(|t| &t.name == ext_name);
            let gt_topic = ground_truth.topics.iter().find(|t| &t.name == gt_name);
            if let (Some(ext), Some(gt)) = (ext_topic, gt_topic) {
                if ext.timeline_position == gt.timeline_position {
                    timeline_matches += 1;
                }
                relevance_errors.push((ext.relevance - gt.relevance).abs());
            }
        }

        let timeline_accuracy = if result.matched.is_empty() {
            None
        } else {
            Some(timeline_matches as f64 / result.matched.len() as f64)
        };
        let relevance_mae = if relevance_errors.is_empty() {
            None
        } else {
            Some(relevance_errors.iter().sum::<f64>() / relevance_errors.len() as f64)
        };

        let mut issues = check_timeline_consistency(&extracted.topics, &transcript.utterances);

        let relevances: Vec<f64> = extracted.topics.iter().map(|t| t.relevance).collect();
        let (dist, dist_issues) = check_score_distribution(&relevances, "topic_relevance");
        issues.extend(dist_issues);

        SignalMetrics {
            precision: Some(result.precision),
            recall: Some(result.recall),
            f1: Some(result.f1),
            count_extracted: ext_names.len(),
            count_ground_truth: gt_names.len(),
            accuracy: timeline_accuracy,
            mae: relevance_mae,
            structural_issues: issues,
            score_distribution: Some(dist),
            matched_pairs: result.matched,
            ..SignalMetrics::named("topics")
        }
    }

    fn eval_entities(
        &self,
        extracted: &SurfaceSignals,
        ground_truth: &SurfaceSignals,
    ) -> SignalMetrics {
        let ext_names: Vec<String> = extracted.entities.iter().map(|e| e.name.clone()).collect();
        let gt_names: Vec<String> = ground_truth
            .entities
            .iter()
            .map(|e| e.name.clone())
            .collect();

        let result = compute_fuzzy_precision_recall(
            &ext_names,
            &gt_names,
            token_overlap_similarity,
            ENTITY_THRESHOLD,
        );

        let mut type_matches = 0usize;
        for (ext_name, gt_name, _) in &result.matched {
            let ext_ent = extracted.entities.iter().find(|e| &e.name == ext_name);
            let gt_ent = ground_truth.entities.iter().find(|e| &e.name == gt_name);
            if let (Some(ext), Some(gt)) = (ext_ent, gt_ent) {
                if ext.entity_type == gt.entity_type {
                    type_matches += 1;
                }
            }
        }

        let type_accuracy = if result.matched.is_empty() {
            None
        } else {
            Some(type_matches as f64 / result.matched.len() as f64)
        };

        SignalMetrics {
            precision: Some(result.precision),
            recall: Some(result.recall),
            f1: Some(result.f1),
            count_extracted: ext_names.len(),
            count_ground_truth: gt_names.len(),
            accuracy: type_accuracy,
            matched_pairs: result.matched,
            ..SignalMetrics::named("entities")
        }
    }

    fn eval_key_phrases(
        &self,
        extracted: &SurfaceSignals,
        ground_truth: &SurfaceSignals,
    ) -> SignalMetrics {
        let ext_phrases: Vec<String> = extracted
            .key_phrases
            .iter()
            .map(|kp| kp.phrase.clone())
            .collect();
        let gt_phrases: Vec<String> = ground_truth
            .key_phrases
            .iter()
            .map(|kp| kp.phrase.clone())
            .collect();

        let result = compute_fuzzy_precision_recall(
            &ext_phrases,
            &gt_phrases,
            token_overlap_similarity,
            KEYPHRASE_THRESHOLD,
        );

        let mut relevance_errors: Vec<f64> = Vec::new();
        for (ext_phrase, gt_phrase, _) in &result.matched {
            let ext_kp = extracted.key_phrases.iter().find(|kp| &kp.phrase == ext_phrase);
            let gt_kp = ground_truth.key_phrases.iter().find(|kp| &kp.phrase == gt_phrase);
            if let (Some(ext), Some(gt)) = (ext_kp, gt_kp) {
                relevance_errors.push((ext.relevance - gt.relevance).abs());
            }
        }

        let relevance_mae = if relevance_errors.is_empty() {
            None
        } else {
            Some(relevance_errors.iter().sum::<f64>() / relevance_errors.len() as f64)
        };

        let relevances: Vec<f64> = extracted.key_phrases.iter().map(|kp| kp.relevance).collect();
        let (dist, issues) = check_score_distribution(&relevances, "keyphrase_relevance");

        SignalMetrics {
            precision: Some(result.precision),
            recall: Some(result.recall),
            f1: Some(result.f1),
            count_extracted: ext_phrases.len(),
            count_ground_truth: gt_phrases.len(),
            mae: relevance_mae,
            score_distribution: Some(dist),
            structural_issues: issues,
            matched_pairs: result.matched,
            ..SignalMetrics::named("key_phrases")
        }
    }
}
