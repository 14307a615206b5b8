//! Layer 3: psychographic signal schemas (mental models, persona indicators,
//! language fingerprints).

use serde::{Deserialize, Serialize};

/// The evaluation frame the buyer is using to make their decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MentalModelType {
    CostReduction,
    GrowthEnablement,
    RiskMitigation,
    Efficiency,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    AnalyticalEvaluator,
    ExecutiveChampion,
    ReluctantAdopter,
}

/// The evaluation framework the buyer is using, with supporting evidence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MentalModel {
    pub primary: MentalModelType,
    pub secondary: Option<MentalModelType>,
    #[serde(default)]
    pub evidence: Vec<String>,
    pub confidence: f64,
    pub reasoning: String,
}

/// Signals suggesting which buyer archetype the prospect matches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaIndicator {
    pub archetype: Archetype,
    pub confidence: f64,
    #[serde(default)]
    pub evidence: Vec<String>,
    pub reasoning: String,
}

/// Distinctive vocabulary and framing patterns used by the prospect.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LanguageFingerprint {
    #[serde(default)]
    pub distinctive_vocabulary: Vec<String>,
    #[serde(default)]
    pub metaphors: Vec<String>,
    #[serde(default)]
    pub framing_patterns: Vec<String>,
}

/// Container for all Layer 3 psychographic signals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PsychographicSignals {
    pub mental_model: MentalModel,
    #[serde(default)]
    pub persona_indicators: Vec<PersonaIndicator>,
    #[serde(default)]
    pub language_fingerprint: LanguageFingerprint,
}
