//! Traditional NLP baselines for cross-validation of LLM extraction.
//!
//! The engine never bundles NLP models; a [`BaselineOracle`] implementation
//! supplies reference entities, key phrases, and sentiment from whatever
//! tooling the deployment has available. When the oracle errors for a
//! capability, the corresponding agreement metric is simply absent.

use std::collections::HashSet;

use anyhow::Result;

use crate::schemas::surface::SentimentPolarity;

/// External supplier of baseline NLP annotations.
pub trait BaselineOracle: Send + Sync {
    /// Named entities in the text, lowercased.
    fn entities(&self, text: &str) -> Result<HashSet<String>>;

    /// Key phrases in the text, lowercased.
    fn key_phrases(&self, text: &str) -> Result<HashSet<String>>;

    /// Sentiment polarity of the text. Baselines do not produce `Mixed`.
    fn sentiment(&self, text: &str) -> Result<SentimentPolarity>;
}

/// Fraction of baseline entities found in the extraction output.
///
/// Matching is bidirectional substring containment, so "acme" agrees with
/// "acme corp" in either direction. `None` when the oracle is unavailable
/// or detects no entities.
pub fn entity_baseline_agreement(
    oracle: &dyn BaselineOracle,
    extracted_entities: &HashSet<String>,
    transcript_text: &str,
) -> Option<f64> {
    let baseline = match oracle.entities(transcript_text) {
        Ok(entities) => entities,
        Err(err) => {
            tracing::warn!(error = %err, "entity baseline unavailable");
            return None;
        }
    };
    if baseline.is_empty() {
        return None;
    }

    let found = baseline
        .iter()
        .filter(|be| {
            extracted_entities
                .iter()
                .any(|ee| ee.contains(be.as_str()) || be.contains(ee.as_str()))
        })
        .count();

    Some(found as f64 / baseline.len() as f64)
}

/// Fraction of baseline key phrases sharing at least one token with an
/// extracted phrase.
pub fn keyphrase_baseline_agreement(
    oracle: &dyn BaselineOracle,
    extracted_phrases: &HashSet<String>,
    transcript_text: &str,
) -> Option<f64> {
    let baseline = match oracle.key_phrases(transcript_text) {
        Ok(phrases) => phrases,
        Err(err) => {
            tracing::warn!(error = %err, "keyphrase baseline unavailable");
            return None;
        }
    };
    if baseline.is_empty() {
        return None;
    }

    let extracted_tokens: Vec<HashSet<&str>> = extracted_phrases
        .iter()
        .map(|p| p.split_whitespace().collect())
        .collect();

    let found = baseline
        .iter()
        .filter(|bp| {
            let bp_tokens: HashSet<&str> = bp.split_whitespace().collect();
            extracted_tokens
                .iter()
                .any(|et| !et.is_disjoint(&bp_tokens))
        })
        .count();

    Some(found as f64 / baseline.len() as f64)
}

/// Agreement between extracted aspect polarities and the baseline's
/// classification of the same source text.
///
/// `Mixed` has no baseline counterpart and is compared as `Neutral`.
pub fn sentiment_baseline_agreement(
    oracle: &dyn BaselineOracle,
    extracted_polarities: &[(String, SentimentPolarity)],
) -> Option<f64> {
    if extracted_polarities.is_empty() {
        return None;
    }

    let mut matches = 0usize;
    for (source_text, ext_polarity) in extracted_polarities {
        let baseline_polarity = match oracle.sentiment(source_text) {
            Ok(polarity) => polarity,
            Err(err) => {
                tracing::warn!(error = %err, "sentiment baseline unavailable");
                return None;
            }
        };
        let ext_mapped = match ext_polarity {
            SentimentPolarity::Mixed => SentimentPolarity::Neutral,
            other => *other,
        };
        if ext_mapped == baseline_polarity {
            matches += 1;
        }
    }

    Some(matches as f64 / extracted_polarities.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    struct StubOracle {
        entities: Vec<&'static str>,
        phrases: Vec<&'static str>,
        positive_markers: Vec<&'static str>,
    }

    impl StubOracle {
        fn new() -> Self {
            Self {
                entities: vec!["acme", "salesforce"],
                phrases: vec!["annual pricing", "rollout plan"],
                positive_markers: vec!["great", "love"],
            }
        }
    }

    impl BaselineOracle for StubOracle {
        fn entities(&self, _text: &str) -> Result<HashSet<String>> {
            Ok(self.entities.iter().map(|e| e.to_string()).collect())
        }

        fn key_phrases(&self, _text: &str) -> Result<HashSet<String>> {
            Ok(self.phrases.iter().map(|p| p.to_string()).collect())
        }

        fn sentiment(&self, text: &str) -> Result<SentimentPolarity> {
            if self.positive_markers.iter().any(|m| text.contains(m)) {
                Ok(SentimentPolarity::Positive)
            } else {
                Ok(SentimentPolarity::Neutral)
            }
        }
    }

    struct UnavailableOracle;

    impl BaselineOracle for UnavailableOracle {
        fn entities(&self, _text: &str) -> Result<HashSet<String>> {
            Err(anyhow!("model not installed"))
        }

        fn key_phrases(&self, _text: &str) -> Result<HashSet<String>> {
            Err(anyhow!("model not installed"))
        }

        fn sentiment(&self, _text: &str) -> Result<SentimentPolarity> {
            Err(anyhow!("model not installed"))
        }
    }

    #[test]
    fn entity_agreement_uses_substring_containment() {
        let oracle = StubOracle::new();
        let extracted: HashSet<String> =
            ["acme corp".to_string(), "zendesk".to_string()].into();
        // "acme" is contained in "acme corp"; "salesforce" is missed.
        let agreement = entity_baseline_agreement(&oracle, &extracted, "text").unwrap();
        assert!((agreement - 0.5).abs() < 1e-9);
    }

    #[test]
    fn keyphrase_agreement_on_token_overlap() {
        let oracle = StubOracle::new();
        let extracted: HashSet<String> = ["pricing concerns".to_string()].into();
        // "annual pricing" shares "pricing"; "rollout plan" shares nothing.
        let agreement = keyphrase_baseline_agreement(&oracle, &extracted, "text").unwrap();
        assert!((agreement - 0.5).abs() < 1e-9);
    }

    #[test]
    fn sentiment_agreement_maps_mixed_to_neutral() {
        let oracle = StubOracle::new();
        let polarities = vec![
            ("this is great".to_string(), SentimentPolarity::Positive),
            ("about the timeline".to_string(), SentimentPolarity::Mixed),
        ];
        // Both agree: positive matches, mixed is compared as neutral.
        let agreement = sentiment_baseline_agreement(&oracle, &polarities).unwrap();
        assert!((agreement - 1.0).abs() < 1e-9);
    }

    #[test]
    fn unavailable_oracle_yields_none() {
        let oracle = UnavailableOracle;
        let extracted: HashSet<String> = HashSet::new();
        assert!(entity_baseline_agreement(&oracle, &extracted, "text").is_none());
        assert!(keyphrase_baseline_agreement(&oracle, &extracted, "text").is_none());
        let polarities = vec![("text".to_string(), SentimentPolarity::Positive)];
        assert!(sentiment_baseline_agreement(&oracle, &polarities).is_none());
    }

    #[test]
    fn empty_extraction_lists_yield_none_for_sentiment() {
        let oracle = StubOracle::new();
        assert!(sentiment_baseline_agreement(&oracle, &[]).is_none());
    }
}
