//! Layer 3 evaluator: mental model, persona indicators, language fingerprint.

use std::collections::HashSet;

use crate::schemas::psychographic::PsychographicSignals;
use crate::schemas::transcript::Transcript;

use super::fuzzy::{compute_fuzzy_precision_recall, token_overlap_similarity};
use super::metrics::precision_recall_f1;
use super::report::{LayerReport, SignalMetrics};
use super::structural::check_score_distribution;

/// Metaphors and framing patterns are free text; vocabulary is matched as an
/// exact lowercased set.
pub const METAPHOR_THRESHOLD: f64 = 0.5;

/// Evaluate Layer 3 psychographic signal extraction.
pub struct PsychographicEvaluator;

impl PsychographicEvaluator {
    pub fn evaluate(
        &self,
        extracted: &PsychographicSignals,
        ground_truth: &PsychographicSignals,
        _transcript: &Transcript,
    ) -> LayerReport {
        LayerReport {
            layer_name: "Psychographic".into(),
            signal_metrics: vec![
                self.eval_mental_model(extracted, ground_truth),
                self.eval_persona_indicators(extracted, ground_truth),
                self.eval_language_fingerprint(extracted, ground_truth),
            ],
        }
    }

    /// The mental model is a single record, not a set: primary-type agreement
    /// stands in for P/R/F1, and the evidence overlap is kept informational
    /// in `matched_pairs`.
    fn eval_mental_model(
        &self,
        extracted: &PsychographicSignals,
        ground_truth: &PsychographicSignals,
    ) -> SignalMetrics {
        let ext_mm = &extracted.mental_model;
        let gt_mm = &ground_truth.mental_model;

        let primary_match = if ext_mm.primary == gt_mm.primary { 1.0 } else { 0.0 };

        let accuracy = match gt_mm.secondary {
            Some(gt_secondary) => {
                let secondary_match = if ext_mm.secondary == Some(gt_secondary) {
                    1.0
                } else {
                    0.0
                };
                (primary_match + secondary_match) / 2.0
            }
            None => primary_match,
        };

        let confidence_delta = (ext_mm.confidence - gt_mm.confidence).abs();

        let ext_evidence = ext_mm.evidence.join(" ");
        let gt_evidence = gt_mm.evidence.join(" ");
        let evidence_sim = token_overlap_similarity(&ext_evidence, &gt_evidence);

        SignalMetrics {
            precision: Some(primary_match),
            recall: Some(primary_match),
            f1: Some(primary_match),
            count_extracted: 1,
            count_ground_truth: 1,
            accuracy: Some(accuracy),
            mae: Some(confidence_delta),
            matched_pairs: vec![(ext_evidence, gt_evidence, evidence_sim)],
            ..SignalMetrics::named("mental_model")
        }
    }

    fn eval_persona_indicators(
        &self,
        extracted: &PsychographicSignals,
        ground_truth: &PsychographicSignals,
    ) -> SignalMetrics {
        let ext_archetypes: HashSet<_> = extracted
            .persona_indicators
            .iter()
            .map(|pi| pi.archetype)
            .collect();
        let gt_archetypes: HashSet<_> = ground_truth
            .persona_indicators
            .iter()
            .map(|pi| pi.archetype)
            .collect();

        let (p, r, f) = precision_recall_f1(&ext_archetypes, &gt_archetypes);

        // Confidence error over matched archetypes, first match wins.
        let mut confidence_errors: Vec<f64> = Vec::new();
        for gt_pi in &ground_truth.persona_indicators {
            if let Some(ext_pi) = extracted
                .persona_indicators
                .iter()
                .find(|pi| pi.archetype == gt_pi.archetype)
            {
                confidence_errors.push((ext_pi.confidence - gt_pi.confidence).abs());
            }
        }

        let mae = if confidence_errors.is_empty() {
            None
        } else {
            Some(confidence_errors.iter().sum::<f64>() / confidence_errors.len() as f64)
        };

        let confidences: Vec<f64> = extracted
            .persona_indicators
            .iter()
            .map(|pi| pi.confidence)
            .collect();
        let (dist, issues) = check_score_distribution(&confidences, "persona_confidence");

        SignalMetrics {
            precision: Some(p),
            recall: Some(r),
            f1: Some(f),
            count_extracted: extracted.persona_indicators.len(),
            count_ground_truth: ground_truth.persona_indicators.len(),
            mae,
            score_distribution: Some(dist),
            structural_issues: issues,
            ..SignalMetrics::named("persona_indicators")
        }
    }

    /// P/R/F1 is the unweighted mean across the three fingerprint sub-signals
    /// (vocabulary exact-set, metaphors fuzzy, framing patterns fuzzy).
    fn eval_language_fingerprint(
        &self,
        extracted: &PsychographicSignals,
        ground_truth: &PsychographicSignals,
    ) -> SignalMetrics {
        let ext_fp = &extracted.language_fingerprint;
        let gt_fp = &ground_truth.language_fingerprint;

        let ext_vocab: HashSet<String> = ext_fp
            .distinctive_vocabulary
            .iter()
            .map(|v| v.to_lowercase())
            .collect();
        let gt_vocab: HashSet<String> = gt_fp
            .distinctive_vocabulary
            .iter()
            .map(|v| v.to_lowercase())
            .collect();
        let (vocab_p, vocab_r, vocab_f) = precision_recall_f1(&ext_vocab, &gt_vocab);

        let metaphors = compute_fuzzy_precision_recall(
            &ext_fp.metaphors,
            &gt_fp.metaphors,
            token_overlap_similarity,
            METAPHOR_THRESHOLD,
        );
        let framing = compute_fuzzy_precision_recall(
            &ext_fp.framing_patterns,
            &gt_fp.framing_patterns,
            token_overlap_similarity,
            METAPHOR_THRESHOLD,
        );

        let avg = |values: [f64; 3]| values.iter().sum::<f64>() / values.len() as f64;

        SignalMetrics {
            precision: Some(avg([vocab_p, metaphors.precision, framing.precision])),
            recall: Some(avg([vocab_r, metaphors.recall, framing.recall])),
            f1: Some(avg([vocab_f, metaphors.f1, framing.f1])),
            count_extracted: ext_fp.distinctive_vocabulary.len()
                + ext_fp.metaphors.len()
                + ext_fp.framing_patterns.len(),
            count_ground_truth: gt_fp.distinctive_vocabulary.len()
                + gt_fp.metaphors.len()
                + gt_fp.framing_patterns.len(),
            matched_pairs: metaphors.matched,
            ..SignalMetrics::named("language_fingerprint")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schemas::psychographic::{
        Archetype, LanguageFingerprint, MentalModel, MentalModelType, PersonaIndicator,
    };
    use crate::schemas::transcript::{CallMetadata, Transcript};

    fn transcript() -> Transcript {
        Transcript {
            call_metadata: CallMetadata {
                call_id: "call_001".into(),
                call_date: "2026-02-07".into(),
                call_number: 1,
                duration_minutes: 30,
            },
            account_profile: None,
            utterances: vec![],
        }
    }

    fn signals(primary: MentalModelType, secondary: Option<MentalModelType>) -> PsychographicSignals {
        PsychographicSignals {
            mental_model: MentalModel {
                primary,
                secondary,
                evidence: vec!["we need to cut spend".into()],
                confidence: 0.8,
                reasoning: "budget language".into(),
            },
            persona_indicators: vec![],
            language_fingerprint: LanguageFingerprint::default(),
        }
    }

    #[test]
    fn mental_model_primary_match() {
        let report = PsychographicEvaluator.evaluate(
            &signals(MentalModelType::CostReduction, None),
            &signals(MentalModelType::CostReduction, None),
            &transcript(),
        );
        let mm = report.metric("mental_model").unwrap();
        assert_eq!(mm.precision, Some(1.0));
        assert_eq!(mm.f1, Some(1.0));
        assert_eq!(mm.accuracy, Some(1.0));
        assert_eq!(mm.mae, Some(0.0));
        // Evidence overlap is informational.
        assert_eq!(mm.matched_pairs.len(), 1);
        assert_eq!(mm.matched_pairs[0].2, 1.0);
    }

    #[test]
    fn mental_model_secondary_halves_accuracy() {
        let report = PsychographicEvaluator.evaluate(
            &signals(MentalModelType::CostReduction, None),
            &signals(
                MentalModelType::CostReduction,
                Some(MentalModelType::Efficiency),
            ),
            &transcript(),
        );
        let mm = report.metric("mental_model").unwrap();
        // Primary matches, secondary missed.
        assert_eq!(mm.accuracy, Some(0.5));
        assert_eq!(mm.f1, Some(1.0));
    }

    #[test]
    fn mental_model_miss_scores_zero() {
        let report = PsychographicEvaluator.evaluate(
            &signals(MentalModelType::GrowthEnablement, None),
            &signals(MentalModelType::CostReduction, None),
            &transcript(),
        );
        let mm = report.metric("mental_model").unwrap();
        assert_eq!(mm.f1, Some(0.0));
        assert_eq!(mm.accuracy, Some(0.0));
    }

    #[test]
    fn persona_confidence_mae_on_matched() {
        let indicator = |archetype, confidence| PersonaIndicator {
            archetype,
            confidence,
            evidence: vec![],
            reasoning: "asks for benchmarks".into(),
        };
        let mut ext = signals(MentalModelType::Efficiency, None);
        ext.persona_indicators = vec![indicator(Archetype::AnalyticalEvaluator, 0.9)];
        let mut gt = signals(MentalModelType::Efficiency, None);
        gt.persona_indicators = vec![
            indicator(Archetype::AnalyticalEvaluator, 0.7),
            indicator(Archetype::ExecutiveChampion, 0.6),
        ];

        let report = PsychographicEvaluator.evaluate(&ext, &gt, &transcript());
        let personas = report.metric("persona_indicators").unwrap();
        assert_eq!(personas.precision, Some(1.0));
        assert_eq!(personas.recall, Some(0.5));
        assert!((personas.mae.unwrap() - 0.2).abs() < 1e-9);
    }

    #[test]
    fn fingerprint_averages_three_subsignals() {
        let mut ext = signals(MentalModelType::Efficiency, None);
        ext.language_fingerprint = LanguageFingerprint {
            distinctive_vocabulary: vec!["runway".into()],
            metaphors: vec!["boiling the ocean".into()],
            framing_patterns: vec!["frames cost as risk".into()],
        };
        let mut gt = signals(MentalModelType::Efficiency, None);
        gt.language_fingerprint = LanguageFingerprint {
            distinctive_vocabulary: vec!["runway".into()],
            metaphors: vec!["boiling the ocean".into()],
            framing_patterns: vec!["frames cost as risk".into()],
        };

        let report = PsychographicEvaluator.evaluate(&ext, &gt, &transcript());
        let fp = report.metric("language_fingerprint").unwrap();
        assert_eq!(fp.precision, Some(1.0));
        assert_eq!(fp.recall, Some(1.0));
        assert_eq!(fp.f1, Some(1.0));
        assert_eq!(fp.count_extracted, 3);
    }

    #[test]
    fn fingerprint_partial_vocabulary() {
        let mut ext = signals(MentalModelType::Efficiency, None);
        ext.language_fingerprint = LanguageFingerprint {
            distinctive_vocabulary: vec!["Runway".into(), "burn rate".into()],
            metaphors: vec![],
            framing_patterns: vec![],
        };
        let mut gt = signals(MentalModelType::Efficiency, None);
        gt.language_fingerprint = LanguageFingerprint {
            distinctive_vocabulary: vec!["runway".into()],
            metaphors: vec![],
            framing_patterns: vec![],
        };

        let report = PsychographicEvaluator.evaluate(&ext, &gt, &transcript());
        let fp = report.metric("language_fingerprint").unwrap();
        // vocab P=0.5 (case-insensitive), metaphors/framing both empty -> 1.0 each.
        assert!((fp.precision.unwrap() - (0.5 + 1.0 + 1.0) / 3.0).abs() < 1e-9);
    }
}
