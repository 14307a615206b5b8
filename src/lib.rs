//! call-intel - Sales Call Signal Evaluation
//!
//! Measures how well an LLM extraction pipeline recovers structured buyer
//! intelligence from B2B sales call transcripts, by comparing extraction
//! output against human-annotated ground truth.
//!
//! Signals are organized into four layers:
//!
//! - **Surface**: aspect sentiment, topics, entities, key phrases
//! - **Behavioral**: objection triples, buying intent, competitive mentions,
//!   engagement trajectory
//! - **Psychographic**: mental model, persona indicators, language fingerprint
//! - **Multimodal**: text/audio divergences and composite sentiment
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use call_intel::eval::{evaluate, EvalCase, Runner, Judge, HttpJudge};
//!
//! // Deterministic metrics only
//! let report = evaluate(&extracted, &ground_truth, &transcript);
//! println!("{}", report.summary());
//!
//! // With LLM-as-judge scoring
//! let mut runner = Runner::new().with_judge(Judge::new(Box::new(HttpJudge::from_env()?)));
//! let corpus = runner.evaluate_corpus(&cases);
//! println!("{}", corpus.summary());
//! ```

pub mod eval;
pub mod schemas;

pub use eval::{evaluate, CorpusReport, EvalCase, EvaluationReport, Runner};
pub use schemas::{ExtractionResult, Transcript};
