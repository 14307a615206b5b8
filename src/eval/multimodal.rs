//! Layer 4 evaluator: text/audio divergences and composite sentiment.
//!
//! Multimodal signals are optional on both sides, so this evaluator returns
//! `Option<LayerReport>`: `None` when neither side has anything to compare,
//! and a degenerate report when only one side does.

use std::collections::HashSet;

use crate::schemas::multimodal::MultimodalSignals;
use crate::schemas::transcript::Transcript;

use super::metrics::precision_recall_f1;
use super::report::{LayerReport, SignalMetrics};
use super::structural::{check_score_distribution, validate_utterance_indices};

/// Evaluate Layer 4 multimodal signal extraction.
pub struct MultimodalEvaluator;

impl MultimodalEvaluator {
    pub fn evaluate(
        &self,
        extracted: Option<&MultimodalSignals>,
        ground_truth: Option<&MultimodalSignals>,
        transcript: &Transcript,
    ) -> Option<LayerReport> {
        match (extracted, ground_truth) {
            (None, None) => None,
            (Some(ext), None) => Some(self.extraction_only_report(ext)),
            (None, Some(gt)) => Some(self.ground_truth_only_report(gt)),
            (Some(ext), Some(gt)) => Some(LayerReport {
                layer_name: "Multimodal".into(),
                signal_metrics: vec![
                    self.eval_divergences(ext, gt, transcript),
                    self.eval_composite_sentiments(ext, gt),
                ],
            }),
        }
    }

    /// Extraction reported multimodal signals the ground truth does not have.
    /// Every reported divergence is unsupported, but nothing was missed.
    fn extraction_only_report(&self, extracted: &MultimodalSignals) -> LayerReport {
        LayerReport {
            layer_name: "Multimodal".into(),
            signal_metrics: vec![SignalMetrics {
                precision: Some(0.0),
                recall: Some(1.0),
                f1: Some(0.0),
                count_extracted: extracted.divergences.len(),
                count_ground_truth: 0,
                structural_issues: vec![format!(
                    "extraction reports {} divergences but ground truth has none",
                    extracted.divergences.len()
                )],
                ..SignalMetrics::named("divergences")
            }],
        }
    }

    /// Ground truth has multimodal signals but the extraction produced none.
    fn ground_truth_only_report(&self, ground_truth: &MultimodalSignals) -> LayerReport {
        LayerReport {
            layer_name: "Multimodal".into(),
            signal_metrics: vec![SignalMetrics {
                precision: Some(0.0),
                recall: Some(0.0),
                f1: Some(0.0),
                count_extracted: 0,
                count_ground_truth: ground_truth.divergences.len(),
                structural_issues: vec![format!(
                    "ground truth has {} divergences but extraction produced no multimodal signals",
                    ground_truth.divergences.len()
                )],
                ..SignalMetrics::named("divergences")
            }],
        }
    }

    /// Divergences match on utterance index; the divergence type is scored as
    /// accuracy over the matched indices.
    fn eval_divergences(
        &self,
        extracted: &MultimodalSignals,
        ground_truth: &MultimodalSignals,
        transcript: &Transcript,
    ) -> SignalMetrics {
        let ext_indices: HashSet<i64> = extracted
            .divergences
            .iter()
            .map(|d| d.utterance_index)
            .collect();
        let gt_indices: HashSet<i64> = ground_truth
            .divergences
            .iter()
            .map(|d| d.utterance_index)
            .collect();

        let (p, r, f) = precision_recall_f1(&ext_indices, &gt_indices);

        let mut type_matches = 0usize;
        let mut type_total = 0usize;
        for gt_div in &ground_truth.divergences {
            if let Some(ext_div) = extracted
                .divergences
                .iter()
                .find(|d| d.utterance_index == gt_div.utterance_index)
            {
                type_total += 1;
                if ext_div.divergence_type == gt_div.divergence_type {
                    type_matches += 1;
                }
            }
        }
        let accuracy = if type_total > 0 {
            Some(type_matches as f64 / type_total as f64)
        } else {
            None
        };

        let all_indices: Vec<i64> = extracted
            .divergences
            .iter()
            .map(|d| d.utterance_index)
            .collect();
        let mut issues =
            validate_utterance_indices(&all_indices, transcript.max_turn_index(), "divergence");

        let confidences: Vec<f64> = extracted.divergences.iter().map(|d| d.confidence).collect();
        let (dist, dist_issues) = check_score_distribution(&confidences, "divergence_confidence");
        issues.extend(dist_issues);

        SignalMetrics {
            precision: Some(p),
            recall: Some(r),
            f1: Some(f),
            count_extracted: extracted.divergences.len(),
            count_ground_truth: ground_truth.divergences.len(),
            accuracy,
            structural_issues: issues,
            score_distribution: Some(dist),
            ..SignalMetrics::named("divergences")
        }
    }

    /// Composite sentiments match on utterance index; the adjusted polarity
    /// is scored as accuracy over the matched indices.
    fn eval_composite_sentiments(
        &self,
        extracted: &MultimodalSignals,
        ground_truth: &MultimodalSignals,
    ) -> SignalMetrics {
        let ext_indices: HashSet<i64> = extracted
            .composite_sentiments
            .iter()
            .map(|c| c.utterance_index)
            .collect();
        let gt_indices: HashSet<i64> = ground_truth
            .composite_sentiments
            .iter()
            .map(|c| c.utterance_index)
            .collect();

        let (p, r, f) = precision_recall_f1(&ext_indices, &gt_indices);

        let mut polarity_matches = 0usize;
        let mut polarity_total = 0usize;
        for gt_cs in &ground_truth.composite_sentiments {
            if let Some(ext_cs) = extracted
                .composite_sentiments
                .iter()
                .find(|c| c.utterance_index == gt_cs.utterance_index)
            {
                polarity_total += 1;
                if ext_cs.adjusted_polarity == gt_cs.adjusted_polarity {
                    polarity_matches += 1;
                }
            }
        }
        let accuracy = if polarity_total > 0 {
            Some(polarity_matches as f64 / polarity_total as f64)
        } else {
            None
        };

        SignalMetrics {
            precision: Some(p),
            recall: Some(r),
            f1: Some(f),
            count_extracted: extracted.composite_sentiments.len(),
            count_ground_truth: ground_truth.composite_sentiments.len(),
            accuracy,
            ..SignalMetrics::named("composite_sentiments")
        }
    }
}
