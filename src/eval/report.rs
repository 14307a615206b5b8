//! Evaluation report models.
//!
//! One `SignalMetrics` per signal type per transcript, grouped into
//! `LayerReport`s, assembled into a per-transcript `EvaluationReport`, and
//! aggregated across transcripts into a `CorpusReport`. Metrics that could
//! not be computed are `None` and are excluded from every aggregate; absent
//! is never treated as a worst score.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::fuzzy::MatchedPair;
use super::metrics::DistributionStats;

/// A single LLM-as-judge rubric score on the 1-5 Likert scale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JudgeScore {
    pub score: u8,
    pub justification: String,
}

/// Precision/recall/F1 and optional supplementary metrics for one signal type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalMetrics {
    pub signal_name: String,
    pub precision: Option<f64>,
    pub recall: Option<f64>,
    pub f1: Option<f64>,
    pub count_extracted: usize,
    pub count_ground_truth: usize,

    // Supplementary metrics (signal-type-specific)
    pub accuracy: Option<f64>,
    pub mae: Option<f64>,
    pub ordinal_agreement: Option<f64>,
    pub baseline_agreement: Option<f64>,

    // LLM-as-judge scores
    #[serde(default)]
    pub judge_scores: Vec<JudgeScore>,
    pub mean_judge_score: Option<f64>,

    // Structural issues and score calibration
    #[serde(default)]
    pub structural_issues: Vec<String>,
    pub score_distribution: Option<DistributionStats>,

    // Matched pairs for debugging
    #[serde(default)]
    pub matched_pairs: Vec<MatchedPair>,
}

impl SignalMetrics {
    /// A metrics record with everything optional absent.
    pub fn named(signal_name: &str) -> Self {
        Self {
            signal_name: signal_name.to_string(),
            precision: None,
            recall: None,
            f1: None,
            count_extracted: 0,
            count_ground_truth: 0,
            accuracy: None,
            mae: None,
            ordinal_agreement: None,
            baseline_agreement: None,
            judge_scores: Vec::new(),
            mean_judge_score: None,
            structural_issues: Vec::new(),
            score_distribution: None,
            matched_pairs: Vec::new(),
        }
    }

    /// Recompute `mean_judge_score` from the accumulated judge scores.
    pub fn refresh_mean_judge_score(&mut self) {
        if self.judge_scores.is_empty() {
            self.mean_judge_score = None;
        } else {
            let sum: f64 = self.judge_scores.iter().map(|j| j.score as f64).sum();
            self.mean_judge_score = Some(sum / self.judge_scores.len() as f64);
        }
    }
}

/// Evaluation report for one extraction layer.
///
/// Invariant: exactly one `SignalMetrics` per signal type the layer defines,
/// even when a signal type is empty on both sides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerReport {
    pub layer_name: String,
    pub signal_metrics: Vec<SignalMetrics>,
}

impl LayerReport {
    /// Average F1 across signal types that have one.
    pub fn mean_f1(&self) -> Option<f64> {
        mean(self.signal_metrics.iter().filter_map(|m| m.f1))
    }

    pub fn metric(&self, signal_name: &str) -> Option<&SignalMetrics> {
        self.signal_metrics.iter().find(|m| m.signal_name == signal_name)
    }

    pub fn metric_mut(&mut self, signal_name: &str) -> Option<&mut SignalMetrics> {
        self.signal_metrics
            .iter_mut()
            .find(|m| m.signal_name == signal_name)
    }
}

/// Complete evaluation report for one extraction result vs ground truth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub transcript_id: String,
    pub surface: LayerReport,
    pub behavioral: LayerReport,
    pub psychographic: LayerReport,
    /// Present iff either side produced multimodal data.
    pub multimodal: Option<LayerReport>,
}

impl EvaluationReport {
    /// Flat view of all signal metrics across layers.
    pub fn all_signal_metrics(&self) -> Vec<&SignalMetrics> {
        let mut metrics: Vec<&SignalMetrics> = Vec::new();
        for layer in [&self.surface, &self.behavioral, &self.psychographic] {
            metrics.extend(layer.signal_metrics.iter());
        }
        if let Some(ref multimodal) = self.multimodal {
            metrics.extend(multimodal.signal_metrics.iter());
        }
        metrics
    }

    /// Average F1 over exactly the signal types that have an F1.
    pub fn overall_f1(&self) -> Option<f64> {
        mean(self.all_signal_metrics().iter().filter_map(|m| m.f1))
    }

    /// Human-readable summary of evaluation results.
    pub fn summary(&self) -> String {
        let mut lines = vec![
            format!("Evaluation Report: {}", self.transcript_id),
            "=".repeat(60),
        ];

        let layers: Vec<&LayerReport> = {
            let mut l = vec![&self.surface, &self.behavioral, &self.psychographic];
            if let Some(ref m) = self.multimodal {
                l.push(m);
            }
            l
        };

        for layer in layers {
            let mean_f1 = layer
                .mean_f1()
                .map(|f| format!("{f:.2}"))
                .unwrap_or_else(|| "n/a".into());
            lines.push(format!("\n{} (avg F1: {mean_f1})", layer.layer_name));
            lines.push("-".repeat(40));
            for m in &layer.signal_metrics {
                lines.push(format!(
                    "  {:30} {}  {}  {}  ({} extracted, {} gt)",
                    m.signal_name,
                    fmt_metric("P", m.precision),
                    fmt_metric("R", m.recall),
                    fmt_metric("F1", m.f1),
                    m.count_extracted,
                    m.count_ground_truth,
                ));
                if let Some(acc) = m.accuracy {
                    lines.push(format!("    accuracy={acc:.2}"));
                }
                if let Some(mae) = m.mae {
                    lines.push(format!("    MAE={mae:.3}"));
                }
                if let Some(oa) = m.ordinal_agreement {
                    lines.push(format!("    ordinal_agreement={oa:.2}"));
                }
                if let Some(judge) = m.mean_judge_score {
                    lines.push(format!("    judge={judge:.1}/5"));
                }
                if let Some(ba) = m.baseline_agreement {
                    lines.push(format!("    baseline_agreement={ba:.2}"));
                }
                for issue in m.structural_issues.iter().take(3) {
                    lines.push(format!("    ! {issue}"));
                }
                if m.structural_issues.len() > 3 {
                    lines.push(format!(
                        "    ... and {} more",
                        m.structural_issues.len() - 3
                    ));
                }
            }
        }

        let overall = self
            .overall_f1()
            .map(|f| format!("{f:.2}"))
            .unwrap_or_else(|| "n/a".into());
        lines.push(format!("\nOverall F1: {overall}"));
        lines.join("\n")
    }
}

/// Per-signal-type corpus means; absent per-transcript values are excluded.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignalAverages {
    pub precision: Option<f64>,
    pub recall: Option<f64>,
    pub f1: Option<f64>,
}

/// Aggregated evaluation across multiple transcripts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusReport {
    pub reports: Vec<EvaluationReport>,
}

impl CorpusReport {
    pub fn n_transcripts(&self) -> usize {
        self.reports.len()
    }

    /// Aggregate precision/recall/F1 per signal type across transcripts.
    pub fn mean_metrics_by_signal(&self) -> HashMap<String, SignalAverages> {
        let mut accum: HashMap<String, (Vec<f64>, Vec<f64>, Vec<f64>)> = HashMap::new();

        for report in &self.reports {
            for m in report.all_signal_metrics() {
                let entry = accum.entry(m.signal_name.clone()).or_default();
                if let Some(p) = m.precision {
                    entry.0.push(p);
                }
                if let Some(r) = m.recall {
                    entry.1.push(r);
                }
                if let Some(f) = m.f1 {
                    entry.2.push(f);
                }
            }
        }

        accum
            .into_iter()
            .map(|(name, (ps, rs, fs))| {
                (
                    name,
                    SignalAverages {
                        precision: mean(ps.into_iter()),
                        recall: mean(rs.into_iter()),
                        f1: mean(fs.into_iter()),
                    },
                )
            })
            .collect()
    }

    /// Mean of per-transcript overall F1 values, excluding absent ones.
    pub fn mean_overall_f1(&self) -> Option<f64> {
        mean(self.reports.iter().filter_map(|r| r.overall_f1()))
    }

    /// Human-readable corpus-level summary.
    pub fn summary(&self) -> String {
        let mut lines = vec![
            format!("Corpus Evaluation ({} transcripts)", self.n_transcripts()),
            "=".repeat(60),
        ];

        let agg = self.mean_metrics_by_signal();
        let mut names: Vec<&String> = agg.keys().collect();
        names.sort();
        for name in names {
            let vals = &agg[name];
            lines.push(format!(
                "  {:30} {}  {}  {}",
                name,
                fmt_metric("P", vals.precision),
                fmt_metric("R", vals.recall),
                fmt_metric("F1", vals.f1),
            ));
        }

        let overall = self
            .mean_overall_f1()
            .map(|f| format!("{f:.2}"))
            .unwrap_or_else(|| "n/a".into());
        lines.push(format!("\nMean Overall F1: {overall}"));
        lines.join("\n")
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let collected: Vec<f64> = values.collect();
    if collected.is_empty() {
        None
    } else {
        Some(collected.iter().sum::<f64>() / collected.len() as f64)
    }
}

fn fmt_metric(label: &str, value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{label}={v:.2}"),
        None => format!("{label}=n/a"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(name: &str, p: f64, r: f64, f: f64) -> SignalMetrics {
        SignalMetrics {
            precision: Some(p),
            recall: Some(r),
            f1: Some(f),
            ..SignalMetrics::named(name)
        }
    }

    fn make_report() -> EvaluationReport {
        EvaluationReport {
            transcript_id: "test_call".into(),
            surface: LayerReport {
                layer_name: "Surface".into(),
                signal_metrics: vec![metrics("topics", 0.8, 0.6, 0.686)],
            },
            behavioral: LayerReport {
                layer_name: "Behavioral".into(),
                signal_metrics: vec![metrics("objection_triples", 1.0, 0.5, 0.667)],
            },
            psychographic: LayerReport {
                layer_name: "Psychographic".into(),
                signal_metrics: vec![SignalMetrics {
                    f1: Some(1.0),
                    ..SignalMetrics::named("mental_model")
                }],
            },
            multimodal: None,
        }
    }

    #[test]
    fn overall_f1_is_mean_of_present_values() {
        let report = make_report();
        let expected = (0.686 + 0.667 + 1.0) / 3.0;
        assert!((report.overall_f1().unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn absent_f1_excluded_not_zero_filled() {
        let mut report = make_report();
        report
            .behavioral
            .signal_metrics
            .push(SignalMetrics::named("buying_intent"));
        let expected = (0.686 + 0.667 + 1.0) / 3.0;
        assert!((report.overall_f1().unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn overall_f1_absent_when_no_f1s() {
        let report = EvaluationReport {
            transcript_id: "empty".into(),
            surface: LayerReport {
                layer_name: "Surface".into(),
                signal_metrics: vec![SignalMetrics::named("topics")],
            },
            behavioral: LayerReport {
                layer_name: "Behavioral".into(),
                signal_metrics: vec![],
            },
            psychographic: LayerReport {
                layer_name: "Psychographic".into(),
                signal_metrics: vec![],
            },
            multimodal: None,
        };
        assert_eq!(report.overall_f1(), None);
    }

    #[test]
    fn all_signal_metrics_spans_layers() {
        assert_eq!(make_report().all_signal_metrics().len(), 3);
    }

    #[test]
    fn summary_mentions_layers_and_signals() {
        let summary = make_report().summary();
        assert!(summary.contains("test_call"));
        assert!(summary.contains("Surface"));
        assert!(summary.contains("topics"));
    }

    #[test]
    fn refresh_mean_judge_score() {
        let mut m = SignalMetrics::named("test");
        m.refresh_mean_judge_score();
        assert_eq!(m.mean_judge_score, None);

        m.judge_scores = vec![
            JudgeScore {
                score: 4,
                justification: "good".into(),
            },
            JudgeScore {
                score: 2,
                justification: "weak".into(),
            },
        ];
        m.refresh_mean_judge_score();
        assert_eq!(m.mean_judge_score, Some(3.0));
    }

    #[test]
    fn corpus_mean_metrics_by_signal() {
        let mut r1 = make_report();
        r1.transcript_id = "call1".into();
        r1.surface.signal_metrics = vec![metrics("topics", 0.8, 0.6, 0.686)];
        let mut r2 = make_report();
        r2.transcript_id = "call2".into();
        r2.surface.signal_metrics = vec![metrics("topics", 0.6, 0.8, 0.686)];

        let corpus = CorpusReport {
            reports: vec![r1, r2],
        };
        let agg = corpus.mean_metrics_by_signal();
        let topics = &agg["topics"];
        assert!((topics.precision.unwrap() - 0.7).abs() < 1e-9);
        assert!((topics.recall.unwrap() - 0.7).abs() < 1e-9);
        assert!((topics.f1.unwrap() - 0.686).abs() < 1e-9);
    }
}
