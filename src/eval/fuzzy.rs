//! Fuzzy string matching for comparing extracted vs ground-truth lists.
//!
//! Free-text signals (topic names, aspect names, key phrases) rarely match
//! their reference annotations verbatim, so precision/recall is computed over
//! a greedy one-to-one alignment under a similarity threshold instead of set
//! equality.

/// Jaccard similarity on lowercased whitespace tokens.
///
/// Both empty -> 1.0, exactly one empty -> 0.0; symmetric.
pub fn token_overlap_similarity(a: &str, b: &str) -> f64 {
    let tokens_a: std::collections::HashSet<String> =
        a.to_lowercase().split_whitespace().map(String::from).collect();
    let tokens_b: std::collections::HashSet<String> =
        b.to_lowercase().split_whitespace().map(String::from).collect();

    if tokens_a.is_empty() && tokens_b.is_empty() {
        return 1.0;
    }
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }
    let intersection = tokens_a.intersection(&tokens_b).count();
    let union = tokens_a.union(&tokens_b).count();
    intersection as f64 / union as f64
}

/// A matched (extracted, ground_truth, similarity) triple.
pub type MatchedPair = (String, String, f64);

/// Outcome of fuzzy precision/recall computation.
#[derive(Debug, Clone)]
pub struct FuzzyMatchResult {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub matched: Vec<MatchedPair>,
}

/// Compute precision, recall, and F1 over a greedy 1:1 fuzzy matching.
///
/// Every (extracted, ground_truth) pair at or above `threshold` becomes a
/// candidate; candidates are assigned highest-similarity-first, each item
/// usable at most once on either side. Greedy assignment is deliberate; it
/// is deterministic and the per-signal thresholds were tuned against it, so
/// it is not replaced with an optimal bipartite matching.
///
/// Empty-input conventions follow [`super::metrics`]: both empty -> (1,1,1),
/// extracted empty -> (0,0,0), ground truth empty -> (0,1,0); recall stays
/// 1.0 when there was nothing to find, while F1 still penalizes the
/// hallucinated items through precision.
pub fn compute_fuzzy_precision_recall<F>(
    extracted: &[String],
    ground_truth: &[String],
    similarity_fn: F,
    threshold: f64,
) -> FuzzyMatchResult
where
    F: Fn(&str, &str) -> f64,
{
    if extracted.is_empty() && ground_truth.is_empty() {
        return FuzzyMatchResult {
            precision: 1.0,
            recall: 1.0,
            f1: 1.0,
            matched: Vec::new(),
        };
    }
    if extracted.is_empty() {
        return FuzzyMatchResult {
            precision: 0.0,
            recall: 0.0,
            f1: 0.0,
            matched: Vec::new(),
        };
    }
    if ground_truth.is_empty() {
        return FuzzyMatchResult {
            precision: 0.0,
            recall: 1.0,
            f1: 0.0,
            matched: Vec::new(),
        };
    }

    // All candidate pairs at or above the threshold.
    let mut pairs: Vec<(f64, usize, usize)> = Vec::new();
    for (i, ext) in extracted.iter().enumerate() {
        for (j, gt) in ground_truth.iter().enumerate() {
            let score = similarity_fn(ext, gt);
            if score >= threshold {
                pairs.push((score, i, j));
            }
        }
    }

    // Greedy 1:1 assignment by descending similarity; stable sort keeps
    // original pair order among ties.
    pairs.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

    let mut used_extracted = vec![false; extracted.len()];
    let mut used_gt = vec![false; ground_truth.len()];
    let mut matched: Vec<MatchedPair> = Vec::new();

    for (score, i, j) in pairs {
        if !used_extracted[i] && !used_gt[j] {
            used_extracted[i] = true;
            used_gt[j] = true;
            matched.push((extracted[i].clone(), ground_truth[j].clone(), score));
        }
    }

    let n_matched = matched.len() as f64;
    let p = n_matched / extracted.len() as f64;
    let r = n_matched / ground_truth.len() as f64;

    FuzzyMatchResult {
        precision: p,
        recall: r,
        f1: super::metrics::f1(p, r),
        matched,
    }
}
