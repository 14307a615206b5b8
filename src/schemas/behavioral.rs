//! Layer 2: behavioral signal schemas: objection triples, buying intent,
//! competitive mentions, engagement trajectory.

use serde::{Deserialize, Serialize};

use super::surface::{SentimentPolarity, TimelinePosition};

/// Category of concern raised by the prospect. Unrecognized categories
/// decode as `Other` rather than failing the whole extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectionType {
    Pricing,
    Implementation,
    Competition,
    Timeline,
    Risk,
    Authority,
    Need,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionType {
    RoiArgument,
    SocialProof,
    Discount,
    PhasedRollout,
    TechnicalDemo,
    RiskMitigation,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentMarkerType {
    TimelineQuestion,
    StakeholderIntroduction,
    IfToWhenShift,
    ImplementationDetail,
    BudgetConfirmation,
    NextStepsRequest,
    #[serde(other)]
    Other,
}

/// A concern or pushback raised by the prospect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Objection {
    #[serde(rename = "type")]
    pub objection_type: ObjectionType,
    pub specific_language: String,
    pub speaker_role: String,
    pub conversation_stage: TimelinePosition,
    #[serde(default)]
    pub source_utterance_indices: Vec<i64>,
}

/// A sales rep's attempt to address an objection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resolution {
    #[serde(rename = "type")]
    pub resolution_type: ResolutionType,
    pub specific_language: String,
    pub speaker_role: String,
    #[serde(default)]
    pub source_utterance_indices: Vec<i64>,
}

/// The result of an objection-resolution exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectionOutcome {
    pub resolved: bool,
    pub deal_progressed: bool,
    pub next_action: Option<String>,
}

/// An objection -> resolution -> outcome sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectionTriple {
    pub objection: Objection,
    pub resolution: Option<Resolution>,
    pub outcome: ObjectionOutcome,
    pub confidence: f64,
}

/// A linguistic cue that correlates with deal progression.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuyingIntentMarker {
    #[serde(rename = "type")]
    pub marker_type: IntentMarkerType,
    pub evidence: String,
    pub confidence: f64,
    #[serde(default)]
    pub source_utterance_indices: Vec<i64>,
}

/// A reference to a competitor during the call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompetitiveMention {
    pub competitor: String,
    pub context: String,
    pub sentiment: SentimentPolarity,
    pub comparison_type: Option<String>,
    #[serde(default)]
    pub source_utterance_indices: Vec<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipationLevel {
    Low,
    Moderate,
    High,
}

impl ParticipationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParticipationLevel::Low => "low",
            ParticipationLevel::Moderate => "moderate",
            ParticipationLevel::High => "high",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionDepth {
    Surface,
    Moderate,
    Deep,
}

impl QuestionDepth {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionDepth::Surface => "surface",
            QuestionDepth::Moderate => "moderate",
            QuestionDepth::Deep => "deep",
        }
    }
}

/// Prospect engagement level at a phase of the conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngagementTrajectoryPoint {
    pub phase: TimelinePosition,
    pub participation_level: ParticipationLevel,
    pub question_depth: QuestionDepth,
    pub energy: super::transcript::EnergyLevel,
    pub notes: Option<String>,
}

/// Container for all Layer 2 behavioral signals.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BehavioralSignals {
    #[serde(default)]
    pub objection_triples: Vec<ObjectionTriple>,
    #[serde(default)]
    pub buying_intent_markers: Vec<BuyingIntentMarker>,
    #[serde(default)]
    pub competitive_mentions: Vec<CompetitiveMention>,
    #[serde(default)]
    pub engagement_trajectory: Vec<EngagementTrajectoryPoint>,
}
