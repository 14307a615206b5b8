//! Core metric functions: precision, recall, F1, MAE, ordinal agreement,
//! and score-distribution statistics.
//!
//! Conventions (shared by every evaluator in this crate):
//! - empty predicted and empty actual -> precision 1.0
//! - empty actual -> recall 1.0 regardless of predictions ("nothing to find")
//! - metrics that cannot be computed return `None`, never a NaN sentinel and
//!   never 0.0; callers exclude absent values from aggregation.

use std::collections::HashSet;
use std::hash::Hash;

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Fraction of predicted items that are correct.
pub fn precision<T: Eq + Hash>(predicted: &HashSet<T>, actual: &HashSet<T>) -> f64 {
    if predicted.is_empty() {
        return if actual.is_empty() { 1.0 } else { 0.0 };
    }
    predicted.intersection(actual).count() as f64 / predicted.len() as f64
}

/// Fraction of actual items that were found.
pub fn recall<T: Eq + Hash>(predicted: &HashSet<T>, actual: &HashSet<T>) -> f64 {
    if actual.is_empty() {
        return 1.0;
    }
    predicted.intersection(actual).count() as f64 / actual.len() as f64
}

/// Harmonic mean of precision and recall.
pub fn f1(p: f64, r: f64) -> f64 {
    if p + r == 0.0 {
        return 0.0;
    }
    2.0 * p * r / (p + r)
}

/// Compute precision, recall, and F1 in one call.
pub fn precision_recall_f1<T: Eq + Hash>(
    predicted: &HashSet<T>,
    actual: &HashSet<T>,
) -> (f64, f64, f64) {
    let p = precision(predicted, actual);
    let r = recall(predicted, actual);
    (p, r, f1(p, r))
}

/// Mean absolute error between two aligned score lists.
///
/// `None` on empty input or length mismatch.
pub fn mean_absolute_error(predicted: &[f64], actual: &[f64]) -> Option<f64> {
    if predicted.is_empty() || predicted.len() != actual.len() {
        return None;
    }
    let total: f64 = predicted
        .iter()
        .zip(actual)
        .map(|(p, a)| (p - a).abs())
        .sum();
    Some(total / predicted.len() as f64)
}

/// Agreement score for ordered categorical values.
///
/// 1.0 for exact match, 0.0 for maximum disagreement or values outside the
/// scale. A one-element scale can only agree.
pub fn ordinal_agreement(predicted: &str, actual: &str, scale: &[&str]) -> f64 {
    let (Some(pi), Some(ai)) = (
        scale.iter().position(|s| *s == predicted),
        scale.iter().position(|s| *s == actual),
    ) else {
        return 0.0;
    };
    let max_dist = scale.len() - 1;
    if max_dist == 0 {
        return 1.0;
    }
    let dist = pi.abs_diff(ai);
    1.0 - dist as f64 / max_dist as f64
}

/// Number of equal-width buckets used for [0,1] score histograms.
pub const NUM_BUCKETS: usize = 5;

/// Human-readable labels for the five score buckets.
pub const BUCKET_LABELS: [&str; NUM_BUCKETS] =
    ["0.0-0.2", "0.2-0.4", "0.4-0.6", "0.6-0.8", "0.8-1.0"];

/// Distribution statistics for a list of 0-1 scores.
///
/// Used to detect degenerate extraction output (e.g. every confidence pinned
/// at 0.9). Empty input yields `None` mean/std and zeroed buckets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionStats {
    pub mean: Option<f64>,
    pub std_dev: Option<f64>,
    pub buckets: [usize; NUM_BUCKETS],
    pub n: usize,
}

impl DistributionStats {
    /// Number of buckets that received at least one score.
    pub fn occupied_buckets(&self) -> usize {
        self.buckets.iter().filter(|&&c| c > 0).count()
    }

    /// Label of the single occupied bucket, if exactly one is occupied.
    pub fn sole_bucket_label(&self) -> Option<&'static str> {
        if self.occupied_buckets() != 1 {
            return None;
        }
        self.buckets
            .iter()
            .position(|&c| c > 0)
            .map(|i| BUCKET_LABELS[i])
    }
}

/// Compute distribution statistics (population std) for a list of 0-1 scores.
pub fn score_distribution_stats(scores: &[f64]) -> DistributionStats {
    if scores.is_empty() {
        return DistributionStats {
            mean: None,
            std_dev: None,
            buckets: [0; NUM_BUCKETS],
            n: 0,
        };
    }

    let mean = scores.iter().mean();
    let std_dev = scores.iter().population_std_dev();

    let mut buckets = [0usize; NUM_BUCKETS];
    for &s in scores {
        let bucket = if s < 0.2 {
            0
        } else if s < 0.4 {
            1
        } else if s < 0.6 {
            2
        } else if s < 0.8 {
            3
        } else {
            4
        };
        buckets[bucket] += 1;
    }

    DistributionStats {
        mean: Some(mean),
        std_dev: Some(std_dev),
        buckets,
        n: scores.len(),
    }
}
