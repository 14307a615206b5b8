//! Input schemas: sales-call transcripts with optional paralinguistic annotations.

use serde::{Deserialize, Serialize};

/// Simulated audio/video signals embedded in transcript annotations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParalinguisticAnnotation {
    pub pause_before_sec: Option<f64>,
    pub energy: Option<EnergyLevel>,
    pub pitch: Option<PitchDirection>,
    #[serde(default)]
    pub hesitation_markers: Vec<String>,
    pub tone: Option<String>,
    #[serde(default)]
    pub behaviors: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnergyLevel {
    Low,
    Medium,
    High,
}

impl EnergyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnergyLevel::Low => "low",
            EnergyLevel::Medium => "medium",
            EnergyLevel::High => "high",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PitchDirection {
    Rising,
    Falling,
    Flat,
}

/// A single speaker turn in a sales call transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Utterance {
    pub speaker: String,
    pub text: String,
    pub turn_index: usize,
    pub paralinguistic: Option<ParalinguisticAnnotation>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompanySize {
    Startup,
    Smb,
    MidMarket,
    Enterprise,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DealStage {
    Discovery,
    Evaluation,
    Negotiation,
    Close,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DealOutcome {
    Won,
    Lost,
    Stalled,
}

/// A participant in the buying process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StakeholderProfile {
    pub name: String,
    pub role: String,
    pub persona_type: crate::schemas::psychographic::Archetype,
}

/// Company and deal context for a sales engagement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountProfile {
    pub company_name: String,
    pub company_size: CompanySize,
    pub industry: String,
    pub deal_stage: DealStage,
    pub deal_outcome: DealOutcome,
    pub stakeholders: Vec<StakeholderProfile>,
}

/// Metadata for a single sales call recording.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallMetadata {
    pub call_id: String,
    pub call_date: String,
    pub call_number: u32,
    pub duration_minutes: u32,
}

/// A full sales call: ordered utterances plus call and account context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    pub call_metadata: CallMetadata,
    pub account_profile: Option<AccountProfile>,
    pub utterances: Vec<Utterance>,
}

impl Transcript {
    /// Highest turn index present, 0 for an empty transcript.
    pub fn max_turn_index(&self) -> usize {
        self.utterances
            .iter()
            .map(|u| u.turn_index)
            .max()
            .unwrap_or(0)
    }

    /// Render the transcript as `[idx] speaker: text` lines for judge prompts.
    pub fn formatted(&self) -> String {
        self.utterances
            .iter()
            .map(|u| format!("[{}] {}: {}", u.turn_index, u.speaker, u.text))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
