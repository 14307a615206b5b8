//! Top-level evaluation entry points.
//!
//! [`evaluate`] computes the deterministic metrics for one extraction;
//! [`Runner`] optionally layers LLM-as-judge scores and NLP baseline
//! agreement on top, and aggregates a corpus.

use std::collections::{HashMap, HashSet};

use rayon::prelude::*;
use serde::Serialize;

use crate::schemas::extraction::ExtractionResult;
use crate::schemas::transcript::Transcript;

use super::baselines::{
    entity_baseline_agreement, keyphrase_baseline_agreement, sentiment_baseline_agreement,
    BaselineOracle,
};
use super::behavioral::BehavioralEvaluator;
use super::judge::{Judge, JudgeRequest};
use super::multimodal::MultimodalEvaluator;
use super::psychographic::PsychographicEvaluator;
use super::report::{CorpusReport, EvaluationReport, LayerReport};
use super::surface::SurfaceEvaluator;

/// Per-signal caps on judge calls, to control cost.
const MAX_ASPECT_JUDGMENTS: usize = 5;
const MAX_TRIPLE_JUDGMENTS: usize = 5;
const MAX_COMPETITIVE_JUDGMENTS: usize = 3;
const MAX_DIVERGENCE_JUDGMENTS: usize = 5;

/// One unit of evaluation work.
#[derive(Debug, Clone)]
pub struct EvalCase {
    pub extracted: ExtractionResult,
    pub ground_truth: ExtractionResult,
    pub transcript: Transcript,
}

/// Evaluate a single extraction result against ground truth.
///
/// Runs the deterministic metrics only; attach a [`Runner`] for judge and
/// baseline scoring.
pub fn evaluate(
    extracted: &ExtractionResult,
    ground_truth: &ExtractionResult,
    transcript: &Transcript,
) -> EvaluationReport {
    EvaluationReport {
        transcript_id: extracted.transcript_id.clone(),
        surface: SurfaceEvaluator.evaluate(&extracted.surface, &ground_truth.surface, transcript),
        behavioral: BehavioralEvaluator.evaluate(
            &extracted.behavioral,
            &ground_truth.behavioral,
            transcript,
        ),
        psychographic: PsychographicEvaluator.evaluate(
            &extracted.psychographic,
            &ground_truth.psychographic,
            transcript,
        ),
        multimodal: MultimodalEvaluator.evaluate(
            extracted.multimodal.as_ref(),
            ground_truth.multimodal.as_ref(),
            transcript,
        ),
    }
}

/// Evaluation driver with optional judge and baseline oracles.
#[derive(Default)]
pub struct Runner {
    judge: Option<Judge>,
    baselines: Option<Box<dyn BaselineOracle>>,
}

impl Runner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_judge(mut self, judge: Judge) -> Self {
        self.judge = Some(judge);
        self
    }

    pub fn with_baselines(mut self, oracle: Box<dyn BaselineOracle>) -> Self {
        self.baselines = Some(oracle);
        self
    }

    /// Evaluate one case, including any attached oracles.
    pub fn evaluate(&mut self, case: &EvalCase) -> EvaluationReport {
        let mut report = evaluate(&case.extracted, &case.ground_truth, &case.transcript);

        if let Some(ref oracle) = self.baselines {
            add_baselines(oracle.as_ref(), &case.extracted, &case.transcript, &mut report.surface);
        }

        if self.judge.is_some() {
            self.add_judge_scores(case, &mut report);
        }

        report
    }

    /// Evaluate a corpus of cases.
    ///
    /// The oracle-free path fans out across threads; with a judge or
    /// baselines attached, cases run sequentially so the judge cache is
    /// shared across the corpus.
    pub fn evaluate_corpus(&mut self, cases: &[EvalCase]) -> CorpusReport {
        let reports = if self.judge.is_none() && self.baselines.is_none() {
            cases
                .par_iter()
                .map(|case| evaluate(&case.extracted, &case.ground_truth, &case.transcript))
                .collect()
        } else {
            cases.iter().map(|case| self.evaluate(case)).collect()
        };
        CorpusReport { reports }
    }

    fn add_judge_scores(&mut self, case: &EvalCase, report: &mut EvaluationReport) {
        let Some(ref mut judge) = self.judge else {
            return;
        };

        // Keyed on the extraction's transcript_id so cache keys and score
        // attribution carry the same identity as the report itself.
        let transcript_id = case.extracted.transcript_id.clone();
        let excerpt = case.transcript.formatted();
        let ext = &case.extracted;
        let gt = &case.ground_truth;

        // Aspect quality, over the fuzzy-matched pairs.
        if let Some(m) = report.surface.metric_mut("aspects") {
            let pairs: Vec<(String, String)> = m
                .matched_pairs
                .iter()
                .take(MAX_ASPECT_JUDGMENTS)
                .map(|(e, g, _)| (e.clone(), g.clone()))
                .collect();
            for (ext_name, gt_name) in pairs {
                let ext_obj = ext.surface.aspects.iter().find(|a| a.aspect == ext_name);
                let gt_obj = gt.surface.aspects.iter().find(|a| a.aspect == gt_name);
                let (Some(ext_obj), Some(gt_obj)) = (ext_obj, gt_obj) else {
                    continue;
                };
                let request = JudgeRequest::aspect(
                    &transcript_id,
                    &excerpt,
                    to_json(ext_obj),
                    to_json(gt_obj),
                );
                if let Some(score) = judge.score(&request) {
                    m.judge_scores.push(score);
                }
            }
            m.refresh_mean_judge_score();
        }

        // Objection triple completeness.
        if let Some(m) = report.behavioral.metric_mut("objection_triples") {
            for ext_triple in ext.behavioral.objection_triples.iter().take(MAX_TRIPLE_JUDGMENTS) {
                let gt_json = gt
                    .behavioral
                    .objection_triples
                    .iter()
                    .find(|t| t.objection.objection_type == ext_triple.objection.objection_type)
                    .map(to_json)
                    .unwrap_or_else(|| "{}".to_string());
                let request = JudgeRequest::objection_triple(
                    &transcript_id,
                    &excerpt,
                    to_json(ext_triple),
                    gt_json,
                );
                if let Some(score) = judge.score(&request) {
                    m.judge_scores.push(score);
                }
            }
            m.refresh_mean_judge_score();
        }

        // Competitive mention context.
        if let Some(m) = report.behavioral.metric_mut("competitive_mentions") {
            for ext_cm in ext
                .behavioral
                .competitive_mentions
                .iter()
                .take(MAX_COMPETITIVE_JUDGMENTS)
            {
                let gt_json = gt
                    .behavioral
                    .competitive_mentions
                    .iter()
                    .find(|cm| cm.competitor.to_lowercase() == ext_cm.competitor.to_lowercase())
                    .map(to_json)
                    .unwrap_or_else(|| "{}".to_string());
                let request = JudgeRequest::competitive(
                    &transcript_id,
                    &excerpt,
                    to_json(ext_cm),
                    gt_json,
                );
                if let Some(score) = judge.score(&request) {
                    m.judge_scores.push(score);
                }
            }
            m.refresh_mean_judge_score();
        }

        // Persona reasoning, all indicators.
        if let Some(m) = report.psychographic.metric_mut("persona_indicators") {
            for ext_pi in &ext.psychographic.persona_indicators {
                let gt_json = gt
                    .psychographic
                    .persona_indicators
                    .iter()
                    .find(|pi| pi.archetype == ext_pi.archetype)
                    .map(to_json)
                    .unwrap_or_else(|| "{}".to_string());
                let request =
                    JudgeRequest::persona(&transcript_id, &excerpt, to_json(ext_pi), gt_json);
                if let Some(score) = judge.score(&request) {
                    m.judge_scores.push(score);
                }
            }
            m.refresh_mean_judge_score();
        }

        // Framing patterns, one score for the whole fingerprint.
        if let Some(m) = report.psychographic.metric_mut("language_fingerprint") {
            let request = JudgeRequest::framing(
                &transcript_id,
                &excerpt,
                to_json(&ext.psychographic.language_fingerprint),
                to_json(&gt.psychographic.language_fingerprint),
            );
            if let Some(score) = judge.score(&request) {
                m.judge_scores.push(score);
            }
            m.refresh_mean_judge_score();
        }

        // Divergence interpretation, only when both sides have multimodal data.
        if let (Some(multimodal), Some(ext_mm), Some(gt_mm)) =
            (report.multimodal.as_mut(), &ext.multimodal, &gt.multimodal)
        {
            if let Some(m) = multimodal.metric_mut("divergences") {
                for ext_d in ext_mm.divergences.iter().take(MAX_DIVERGENCE_JUDGMENTS) {
                    let gt_json = gt_mm
                        .divergences
                        .iter()
                        .find(|d| d.utterance_index == ext_d.utterance_index)
                        .map(to_json)
                        .unwrap_or_else(|| "{}".to_string());
                    let request = JudgeRequest::divergence(
                        &transcript_id,
                        &excerpt,
                        to_json(ext_d),
                        gt_json,
                    );
                    if let Some(score) = judge.score(&request) {
                        m.judge_scores.push(score);
                    }
                }
                m.refresh_mean_judge_score();
            }
        }
    }
}

/// Attach NLP baseline agreement scores to the surface metrics.
fn add_baselines(
    oracle: &dyn BaselineOracle,
    extracted: &ExtractionResult,
    transcript: &Transcript,
    surface: &mut LayerReport,
) {
    let transcript_text: String = transcript
        .utterances
        .iter()
        .map(|u| u.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");

    if let Some(m) = surface.metric_mut("entities") {
        let ext_entities: HashSet<String> = extracted
            .surface
            .entities
            .iter()
            .map(|e| e.name.to_lowercase())
            .collect();
        m.baseline_agreement = entity_baseline_agreement(oracle, &ext_entities, &transcript_text);
    }

    if let Some(m) = surface.metric_mut("key_phrases") {
        let ext_phrases: HashSet<String> = extracted
            .surface
            .key_phrases
            .iter()
            .map(|kp| kp.phrase.to_lowercase())
            .collect();
        m.baseline_agreement =
            keyphrase_baseline_agreement(oracle, &ext_phrases, &transcript_text);
    }

    if let Some(m) = surface.metric_mut("aspects") {
        let utterance_map: HashMap<i64, &str> = transcript
            .utterances
            .iter()
            .map(|u| (u.turn_index as i64, u.text.as_str()))
            .collect();
        let mut pairs = Vec::new();
        for aspect in &extracted.surface.aspects {
            let source_text: String = aspect
                .source_utterance_indices
                .iter()
                .filter_map(|idx| utterance_map.get(idx).copied())
                .collect::<Vec<_>>()
                .join(" ");
            if !source_text.trim().is_empty() {
                pairs.push((source_text, aspect.sentiment));
            }
        }
        m.baseline_agreement = sentiment_baseline_agreement(oracle, &pairs);
    }
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
}
