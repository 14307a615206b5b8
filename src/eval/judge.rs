//! LLM-as-judge scoring using rubric-based Likert scales.
//!
//! Uses Claude Haiku for cost efficiency. Scores are cached per judge
//! instance keyed on transcript, signal type, and a digest of the candidate
//! payload, so re-evaluating the same extraction never re-bills.

use std::collections::HashMap;

use anyhow::{anyhow, Result};
use serde_json::Value;
use sha2::{Digest, Sha256};

use super::report::JudgeScore;

/// Model used for judge calls.
pub const JUDGE_MODEL: &str = "claude-haiku-4-5-20251001";

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const MAX_TOKENS: u32 = 256;

// -- Rubric definitions --

pub const ASPECT_GRANULARITY_RUBRIC: &str = "\
5 - Excellent: Aspect is at exactly the right level of granularity (e.g., \"pricing\" not \"cost\" or \"the 185K annual license pricing\"). Captures the precise concept discussed.
4 - Good: Aspect is slightly too broad or narrow but captures the right concept.
3 - Acceptable: Aspect is recognizable but significantly too broad (e.g., \"business\" instead of \"implementation timeline\").
2 - Poor: Aspect is misleading or conflates multiple distinct aspects.
1 - Unacceptable: Aspect is completely wrong or nonsensical.";

pub const OBJECTION_TRIPLE_RUBRIC: &str = "\
5 - Excellent: All three components (objection, resolution, outcome) are accurate, specific language closely matches transcript, and source indices are correct.
4 - Good: Components are correct but specific language is paraphrased rather than quoted from the transcript.
3 - Acceptable: Objection and outcome are correct but resolution type or specifics are partially wrong.
2 - Poor: Objection type is correct but resolution or outcome are significantly wrong.
1 - Unacceptable: Objection is misidentified or the triple does not correspond to a real exchange in the transcript.";

pub const PERSONA_REASONING_RUBRIC: &str = "\
5 - Excellent: Reasoning cites specific transcript evidence, correctly maps behavior patterns to archetype definition, and acknowledges nuance.
4 - Good: Reasoning is correct and grounded in the transcript but misses some supporting evidence.
3 - Acceptable: Reasoning reaches the right conclusion but with weak or generic justification.
2 - Poor: Reasoning has logical gaps or cites evidence that does not support the conclusion.
1 - Unacceptable: Reasoning contradicts the transcript or fundamentally mischaracterizes the buyer.";

pub const FRAMING_PATTERN_RUBRIC: &str = "\
5 - Excellent: Patterns are specific, accurate, insightful, and would help a marketer tailor content for this buyer.
4 - Good: Patterns are accurate and somewhat specific but not deeply insightful.
3 - Acceptable: Patterns are generic but not wrong (e.g., \"uses business language\").
2 - Poor: Patterns are vague or partially inaccurate.
1 - Unacceptable: Patterns are wrong or completely generic.";

pub const COMPETITIVE_CONTEXT_RUBRIC: &str = "\
5 - Excellent: Context captures the full nuance of how the competitor was mentioned (as leverage, genuine alternative, or incumbent) with accurate sentiment and comparison type.
4 - Good: Context is accurate but misses some nuance of the mention.
3 - Acceptable: Context captures the basic mention but mischaracterizes the sentiment or comparison type.
2 - Poor: Context is significantly incomplete or misleading.
1 - Unacceptable: Context is wrong.";

pub const DIVERGENCE_INTERPRETATION_RUBRIC: &str = "\
5 - Excellent: Interpretation correctly synthesizes text content with nonverbal cues, explains the psychological state, and notes business implications.
4 - Good: Interpretation is correct but lacks business implications or is somewhat superficial.
3 - Acceptable: Interpretation is plausible but generic, could apply to many situations rather than this specific moment.
2 - Poor: Interpretation contradicts either the text or the nonverbal cues.
1 - Unacceptable: Interpretation is completely wrong.";

/// A single scoring request handed to the oracle.
#[derive(Debug, Clone)]
pub struct JudgeRequest {
    pub transcript_id: String,
    pub signal_type: String,
    pub transcript_excerpt: String,
    pub signal_json: String,
    pub ground_truth_json: String,
    pub rubric: &'static str,
    pub signal_description: &'static str,
}

/// Backend that turns a judge prompt into raw model text.
///
/// Production uses [`HttpJudge`]; tests substitute a canned oracle.
pub trait JudgeOracle: Send + Sync {
    fn complete(&self, prompt: &str) -> Result<String>;
}

/// Oracle backed by the Anthropic messages API.
pub struct HttpJudge {
    client: reqwest::blocking::Client,
    api_key: String,
    model: String,
}

impl HttpJudge {
    /// Reads `ANTHROPIC_API_KEY` from the environment.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("ANTHROPIC_API_KEY")
            .map_err(|_| anyhow!("ANTHROPIC_API_KEY not set; judge scoring requires API access"))?;
        Ok(Self {
            client: reqwest::blocking::Client::new(),
            api_key,
            model: JUDGE_MODEL.to_string(),
        })
    }
}

impl JudgeOracle for HttpJudge {
    fn complete(&self, prompt: &str) -> Result<String> {
        let request_body = serde_json::json!({
            "model": self.model,
            "max_tokens": MAX_TOKENS,
            "messages": [{"role": "user", "content": prompt}]
        });

        let response = self
            .client
            .post(API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request_body)
            .send()?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(anyhow!("judge API error {status}: {body}"));
        }

        let json: Value = response.json()?;
        let text = json["content"][0]["text"]
            .as_str()
            .ok_or_else(|| anyhow!("judge API response missing content text"))?;
        Ok(text.to_string())
    }
}

/// Rubric-based judge with an instance-local score cache.
pub struct Judge {
    oracle: Box<dyn JudgeOracle>,
    cache: HashMap<String, JudgeScore>,
}

impl Judge {
    pub fn new(oracle: Box<dyn JudgeOracle>) -> Self {
        Self {
            oracle,
            cache: HashMap::new(),
        }
    }

    /// Score one signal against its reference annotation.
    ///
    /// Returns `None` when the oracle is unavailable or errors; unparseable
    /// model output still yields a score (midpoint 3, with the raw text in
    /// the justification).
    pub fn score(&mut self, request: &JudgeRequest) -> Option<JudgeScore> {
        let key = cache_key(
            &request.transcript_id,
            &request.signal_type,
            &request.signal_json,
        );
        if let Some(cached) = self.cache.get(&key) {
            return Some(cached.clone());
        }

        let prompt = build_judge_prompt(request);
        let raw = match self.oracle.complete(&prompt) {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!(
                    transcript_id = %request.transcript_id,
                    signal_type = %request.signal_type,
                    error = %err,
                    "judge call failed, skipping score"
                );
                return None;
            }
        };

        let score = parse_judge_response(&raw);
        self.cache.insert(key, score.clone());
        Some(score)
    }
}

/// Constructors binding each signal type to its rubric.
impl JudgeRequest {
    fn new(
        transcript_id: &str,
        signal_type: &str,
        transcript_excerpt: &str,
        signal_json: String,
        ground_truth_json: String,
        rubric: &'static str,
        signal_description: &'static str,
    ) -> Self {
        Self {
            transcript_id: transcript_id.to_string(),
            signal_type: signal_type.to_string(),
            transcript_excerpt: transcript_excerpt.to_string(),
            signal_json,
            ground_truth_json,
            rubric,
            signal_description,
        }
    }

    pub fn aspect(
        transcript_id: &str,
        excerpt: &str,
        signal_json: String,
        gt_json: String,
    ) -> Self {
        Self::new(
            transcript_id,
            "aspect",
            excerpt,
            signal_json,
            gt_json,
            ASPECT_GRANULARITY_RUBRIC,
            "aspect-based sentiment",
        )
    }

    pub fn objection_triple(
        transcript_id: &str,
        excerpt: &str,
        signal_json: String,
        gt_json: String,
    ) -> Self {
        Self::new(
            transcript_id,
            "objection_triple",
            excerpt,
            signal_json,
            gt_json,
            OBJECTION_TRIPLE_RUBRIC,
            "objection-resolution-outcome triple",
        )
    }

    pub fn persona(
        transcript_id: &str,
        excerpt: &str,
        signal_json: String,
        gt_json: String,
    ) -> Self {
        Self::new(
            transcript_id,
            "persona",
            excerpt,
            signal_json,
            gt_json,
            PERSONA_REASONING_RUBRIC,
            "persona indicator",
        )
    }

    pub fn framing(
        transcript_id: &str,
        excerpt: &str,
        signal_json: String,
        gt_json: String,
    ) -> Self {
        Self::new(
            transcript_id,
            "framing",
            excerpt,
            signal_json,
            gt_json,
            FRAMING_PATTERN_RUBRIC,
            "language fingerprint / framing patterns",
        )
    }

    pub fn competitive(
        transcript_id: &str,
        excerpt: &str,
        signal_json: String,
        gt_json: String,
    ) -> Self {
        Self::new(
            transcript_id,
            "competitive",
            excerpt,
            signal_json,
            gt_json,
            COMPETITIVE_CONTEXT_RUBRIC,
            "competitive mention",
        )
    }

    pub fn divergence(
        transcript_id: &str,
        excerpt: &str,
        signal_json: String,
        gt_json: String,
    ) -> Self {
        Self::new(
            transcript_id,
            "divergence",
            excerpt,
            signal_json,
            gt_json,
            DIVERGENCE_INTERPRETATION_RUBRIC,
            "multimodal divergence",
        )
    }
}

/// Deterministic cache key from signal identity.
fn cache_key(transcript_id: &str, signal_type: &str, signal_json: &str) -> String {
    let digest = Sha256::digest(signal_json.as_bytes());
    let hash = hex::encode(digest);
    format!("{transcript_id}:{signal_type}:{}", &hash[..12])
}

fn build_judge_prompt(request: &JudgeRequest) -> String {
    format!(
        "You are evaluating the quality of a signal extracted from a sales call transcript by an AI system.\n\
         \n\
         ## Transcript (relevant excerpt)\n\
         {excerpt}\n\
         \n\
         ## Extracted Signal ({description})\n\
         {signal}\n\
         \n\
         ## Ground Truth (reference annotation)\n\
         {ground_truth}\n\
         \n\
         ## Evaluation Rubric\n\
         Score from 1 to 5:\n\
         \n\
         {rubric}\n\
         \n\
         ## Instructions\n\
         1. Read the transcript excerpt carefully\n\
         2. Compare the extracted signal against the ground truth\n\
         3. Apply the rubric criteria\n\
         4. Return ONLY valid JSON: {{\"score\": <1-5>, \"justification\": \"<2-3 sentences>\"}}",
        excerpt = request.transcript_excerpt,
        description = request.signal_description,
        signal = request.signal_json,
        ground_truth = request.ground_truth_json,
        rubric = request.rubric,
    )
}

/// Parse the model's JSON reply, tolerating markdown fences.
///
/// Malformed output falls back to the midpoint score of 3 rather than
/// failing the evaluation run.
fn parse_judge_response(raw: &str) -> JudgeScore {
    let trimmed = raw.trim();
    let text = strip_markdown_fence(trimmed);

    match serde_json::from_str::<Value>(text) {
        Ok(data) => match data.get("score").and_then(Value::as_i64) {
            Some(s) => JudgeScore {
                score: s.clamp(1, 5) as u8,
                justification: data
                    .get("justification")
                    .and_then(Value::as_str)
                    .unwrap_or("")
                    .to_string(),
            },
            None => parse_failure(trimmed),
        },
        Err(_) => parse_failure(trimmed),
    }
}

fn parse_failure(raw: &str) -> JudgeScore {
    let preview: String = raw.chars().take(200).collect();
    JudgeScore {
        score: 3,
        justification: format!("Parse error: {preview}"),
    }
}

fn strip_markdown_fence(text: &str) -> &str {
    if !text.starts_with("```") {
        return text;
    }
    let without_open = match text.find('\n') {
        Some(pos) => &text[pos + 1..],
        None => return text,
    };
    match without_open.rfind("```") {
        Some(pos) => &without_open[..pos],
        None => without_open,
    }
}
