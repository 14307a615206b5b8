//! Multimodal divergence schemas: text/audio contradictions and composite sentiment.

use serde::{Deserialize, Serialize};

use super::surface::SentimentPolarity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DivergenceType {
    TextPositiveAudioNegative,
    TextNegativeAudioPositive,
    TextNeutralAudioNegative,
    TextNeutralAudioPositive,
}

/// A detected contradiction between text sentiment and non-verbal cues.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DivergenceSignal {
    pub utterance_index: i64,
    #[serde(rename = "type")]
    pub divergence_type: DivergenceType,
    pub text_sentiment: SentimentPolarity,
    #[serde(default)]
    pub nonverbal_cues: Vec<String>,
    pub interpretation: String,
    pub confidence: f64,
}

/// Sentiment score adjusted by multimodal signal fusion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompositeSentiment {
    pub utterance_index: i64,
    pub original_text_polarity: SentimentPolarity,
    pub adjusted_polarity: SentimentPolarity,
    pub confidence: f64,
    pub note: Option<String>,
}

/// Container for all multimodal divergence signals.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MultimodalSignals {
    #[serde(default)]
    pub divergences: Vec<DivergenceSignal>,
    #[serde(default)]
    pub composite_sentiments: Vec<CompositeSentiment>,
}
