//! Programmatic structural validation for extraction outputs.
//!
//! These checks flag data-quality problems in the extraction under
//! evaluation (out-of-range indices, timeline labels contradicting the
//! transcript, degenerate confidence distributions). They are recorded as
//! issue strings on the relevant signal metrics and never abort evaluation.

use crate::schemas::surface::{TimelinePosition, TopicDetection};
use crate::schemas::transcript::Utterance;

use super::metrics::{score_distribution_stats, DistributionStats};

/// Std-dev below which a score set with n >= 3 is flagged as miscalibrated.
pub const LOW_VARIANCE_STD: f64 = 0.05;

/// Minimum sample size for the low-variance check.
pub const LOW_VARIANCE_MIN_N: usize = 3;

/// Minimum sample size for the single-bucket clustering check.
pub const SINGLE_BUCKET_MIN_N: usize = 5;

/// Check that utterance indices are non-negative and within bounds.
pub fn validate_utterance_indices(indices: &[i64], max_index: usize, label: &str) -> Vec<String> {
    let mut issues = Vec::new();
    for &idx in indices {
        if idx < 0 {
            issues.push(format!("{label}: negative index {idx}"));
        } else if idx as usize > max_index {
            issues.push(format!("{label}: index {idx} exceeds max {max_index}"));
        }
    }
    issues
}

/// Verify that topic timeline positions are consistent with the transcript.
///
/// For each topic whose name appears in utterance text (case-insensitive
/// substring), the median mention turn determines which third of the call
/// the topic actually concentrates in; a label pointing at a different third
/// is flagged. Topics never mentioned verbatim are unverifiable and skipped.
pub fn check_timeline_consistency(
    topics: &[TopicDetection],
    utterances: &[Utterance],
) -> Vec<String> {
    if utterances.is_empty() {
        return Vec::new();
    }

    let total_turns = utterances.len();
    let third = total_turns as f64 / 3.0;
    let mut issues = Vec::new();

    for topic in topics {
        let topic_lower = topic.name.to_lowercase();
        let mut mention_indices: Vec<usize> = utterances
            .iter()
            .filter(|u| u.text.to_lowercase().contains(&topic_lower))
            .map(|u| u.turn_index)
            .collect();

        if mention_indices.is_empty() {
            continue;
        }

        mention_indices.sort_unstable();
        let median_idx = mention_indices[mention_indices.len() / 2];

        let expected = if (median_idx as f64) < third {
            TimelinePosition::Early
        } else if (median_idx as f64) < 2.0 * third {
            TimelinePosition::Mid
        } else {
            TimelinePosition::Late
        };

        if topic.timeline_position != expected {
            issues.push(format!(
                "Topic '{}': labeled '{}' but mentions concentrate in '{}' (median turn {}/{})",
                topic.name,
                topic.timeline_position.as_str(),
                expected.as_str(),
                median_idx,
                total_turns,
            ));
        }
    }

    issues
}

/// Analyze a score distribution and flag degenerate patterns.
///
/// Flags very low variance (std below [`LOW_VARIANCE_STD`] with at least
/// [`LOW_VARIANCE_MIN_N`] scores) and all scores clustering into a single
/// bucket (with at least [`SINGLE_BUCKET_MIN_N`] scores).
pub fn check_score_distribution(scores: &[f64], label: &str) -> (DistributionStats, Vec<String>) {
    let stats = score_distribution_stats(scores);
    let mut issues = Vec::new();

    if stats.n >= LOW_VARIANCE_MIN_N {
        if let Some(std_dev) = stats.std_dev {
            if std_dev < LOW_VARIANCE_STD {
                issues.push(format!(
                    "{label}: very low variance (std={std_dev:.3}), scores may not be well-calibrated"
                ));
            }
        }

        if stats.n >= SINGLE_BUCKET_MIN_N {
            if let Some(bucket) = stats.sole_bucket_label() {
                issues.push(format!("{label}: all {} scores in bucket {bucket}", stats.n));
            }
        }
    }

    (stats, issues)
}
