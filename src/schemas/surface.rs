//! Layer 1: surface signal schemas (aspect sentiment, topics, entities, key phrases).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentPolarity {
    Positive,
    Negative,
    Neutral,
    Mixed,
}

impl SentimentPolarity {
    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentPolarity::Positive => "positive",
            SentimentPolarity::Negative => "negative",
            SentimentPolarity::Neutral => "neutral",
            SentimentPolarity::Mixed => "mixed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Person,
    Company,
    Product,
    Competitor,
}

/// Where in the call a topic concentrates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimelinePosition {
    Early,
    Mid,
    Late,
}

impl TimelinePosition {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimelinePosition::Early => "early",
            TimelinePosition::Mid => "mid",
            TimelinePosition::Late => "late",
        }
    }
}

/// Sentiment about a specific aspect within an utterance or across utterances.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AspectSentiment {
    pub aspect: String,
    pub sentiment: SentimentPolarity,
    /// Strength of the sentiment, 0.0-1.0.
    pub intensity: f64,
    pub context: Option<String>,
    #[serde(default)]
    pub source_utterance_indices: Vec<i64>,
}

/// A topic discussed during the call with timeline positioning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicDetection {
    pub name: String,
    pub timeline_position: TimelinePosition,
    pub relevance: f64,
}

/// A person, company, product, or competitor mentioned in the call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedEntity {
    pub name: String,
    pub entity_type: EntityType,
    pub role: Option<String>,
    pub mention_count: u32,
}

/// An important term or concept from the conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyPhrase {
    pub phrase: String,
    pub relevance: f64,
    pub context: Option<String>,
}

/// Container for all Layer 1 surface signals.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SurfaceSignals {
    #[serde(default)]
    pub aspects: Vec<AspectSentiment>,
    #[serde(default)]
    pub topics: Vec<TopicDetection>,
    #[serde(default)]
    pub entities: Vec<NamedEntity>,
    #[serde(default)]
    pub key_phrases: Vec<KeyPhrase>,
}
