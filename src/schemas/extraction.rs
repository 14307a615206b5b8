//! Top-level extraction result composing all signal layers.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::behavioral::BehavioralSignals;
use super::multimodal::MultimodalSignals;
use super::psychographic::PsychographicSignals;
use super::surface::SurfaceSignals;

/// Complete signal extraction output for a single sales call transcript.
///
/// Instances are produced by the extraction orchestrator (or loaded from a
/// human-annotated ground-truth file) and consumed read-only by the
/// evaluation engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub transcript_id: String,
    pub extraction_timestamp: DateTime<Utc>,
    pub surface: SurfaceSignals,
    pub behavioral: BehavioralSignals,
    pub psychographic: PsychographicSignals,
    pub multimodal: Option<MultimodalSignals>,
    pub overall_confidence: f64,
    #[serde(default)]
    pub notes: Vec<String>,
}

impl ExtractionResult {
    /// Decode an extraction result from possibly-sloppy LLM JSON.
    ///
    /// This is the lenient-decode step that sits in front of the evaluation
    /// engine; the engine itself only ever sees the typed result. Fallbacks:
    ///
    /// - any list field missing -> empty list
    /// - `multimodal`, optional sub-objects -> `None`
    /// - unknown objection / resolution / intent-marker categories -> `other`
    ///
    /// Anything else malformed (wrong types, missing required scalar fields)
    /// is a hard error for the extraction layer to repair and retry.
    pub fn from_json_lenient(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("extraction result failed lenient decode")
    }
}
