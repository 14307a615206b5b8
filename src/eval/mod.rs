//! Evaluation engine for extraction quality.
//!
//! Compares LLM signal extraction against human ground truth annotations:
//! - Fuzzy set matching with per-signal similarity thresholds
//! - Precision/recall/F1, accuracy, MAE, and ordinal agreement
//! - Structural validation (index bounds, timeline consistency, score
//!   calibration)
//! - Optional LLM-as-judge rubric scoring and NLP baseline cross-checks
//!
//! Entry points are [`runner::evaluate`] for one transcript and
//! [`runner::Runner`] for a corpus with oracles attached.

pub mod baselines;
pub mod behavioral;
pub mod fuzzy;
pub mod judge;
pub mod metrics;
pub mod multimodal;
pub mod psychographic;
pub mod report;
pub mod runner;
pub mod structural;
pub mod surface;

pub use baselines::BaselineOracle;
pub use behavioral::BehavioralEvaluator;
pub use fuzzy::{compute_fuzzy_precision_recall, token_overlap_similarity, FuzzyMatchResult};
pub use judge::{HttpJudge, Judge, JudgeOracle, JudgeRequest};
pub use metrics::{precision_recall_f1, DistributionStats};
pub use multimodal::MultimodalEvaluator;
pub use psychographic::PsychographicEvaluator;
pub use report::{CorpusReport, EvaluationReport, JudgeScore, LayerReport, SignalMetrics};
pub use runner::{evaluate, EvalCase, Runner};
pub use surface::SurfaceEvaluator;
