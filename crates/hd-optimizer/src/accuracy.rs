//! Prediction-accuracy metrics.
//!
//! Error- and ranking-based fitness for configurations evaluated against
//! real outcomes rather than simulated seasons: mean absolute error as the
//! diagnostic, pairwise ordering accuracy as the primary ranking signal,
//! top-K overlap, and Spearman rank correlation.

use hd_types::{PlayerId, RankingMetrics, ScoringParameters};

use hd_sim::{WeekView, WeeklyScores};

/// Players with fewer actual points than this are noise (injured early,
/// barely used) and are excluded from ranking metrics.
const MEANINGFUL_POINTS: f64 = 3.0;

/// Accuracy evaluation of one configuration over a week range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccuracyReport {
    /// Mean absolute error over all (predicted, actual) pairs.
    pub mae: f64,
    pub total_error: f64,
    /// Number of (player, week) samples behind the report.
    pub sample_count: u32,
    pub ranking: RankingMetrics,
}

/// Configuration-driven projection collaborator. The scoring heuristics
/// live outside this core; the engine only needs a number per player-week.
pub trait ProjectionModel: Sync {
    fn project(
        &self,
        params: &ScoringParameters,
        scores: &dyn WeeklyScores,
        player: PlayerId,
        week: u8,
    ) -> f64;
}

/// Raw projected points, ignoring the configuration entirely. Useful as a
/// control model and in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughProjection;

impl ProjectionModel for PassthroughProjection {
    fn project(
        &self,
        _params: &ScoringParameters,
        scores: &dyn WeeklyScores,
        player: PlayerId,
        week: u8,
    ) -> f64 {
        scores.projected(player, week)
    }
}

/// The default config-driven model: the same performance-deviation
/// adjustment the lineup selector applies.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeviationAdjustedProjection;

impl ProjectionModel for DeviationAdjustedProjection {
    fn project(
        &self,
        params: &ScoringParameters,
        scores: &dyn WeeklyScores,
        player: PlayerId,
        week: u8,
    ) -> f64 {
        WeekView {
            week,
            scores,
            params,
        }
        .projection(player)
    }
}

/// Fraction of player pairs whose predicted ordering matches the actual
/// ordering. Actual-point ties are skipped; returns `None` when no valid
/// comparison exists.
pub fn pairwise_accuracy(predicted: &[f64], actual: &[f64]) -> Option<f64> {
    let mut correct = 0u64;
    let mut total = 0u64;
    for i in 0..predicted.len() {
        for j in (i + 1)..predicted.len() {
            if actual[i] == actual[j] {
                continue;
            }
            if (predicted[i] > predicted[j]) == (actual[i] > actual[j]) {
                correct += 1;
            }
            total += 1;
        }
    }
    (total > 0).then(|| correct as f64 / total as f64)
}

/// Overlap between the predicted and actual top-K sets, as a fraction of K.
/// Returns `None` with fewer than K players.
pub fn top_k_overlap(predicted: &[f64], actual: &[f64], k: usize) -> Option<f64> {
    if predicted.len() < k || k == 0 {
        return None;
    }
    let top_indices = |values: &[f64]| -> Vec<usize> {
        let mut indices: Vec<usize> = (0..values.len()).collect();
        indices.sort_by(|&a, &b| {
            values[b]
                .partial_cmp(&values[a])
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.cmp(&b))
        });
        indices.truncate(k);
        indices
    };

    let predicted_top: std::collections::HashSet<usize> =
        top_indices(predicted).into_iter().collect();
    let overlap = top_indices(actual)
        .into_iter()
        .filter(|idx| predicted_top.contains(idx))
        .count();
    Some(overlap as f64 / k as f64)
}

/// Spearman rank correlation with average ranks on ties. Returns `None` for
/// fewer than two samples or zero variance on either side.
pub fn spearman_correlation(predicted: &[f64], actual: &[f64]) -> Option<f64> {
    if predicted.len() < 2 {
        return None;
    }
    let rank_a = ranks(predicted);
    let rank_b = ranks(actual);

    let n = rank_a.len() as f64;
    let mean_a = rank_a.iter().sum::<f64>() / n;
    let mean_b = rank_b.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (a, b) in rank_a.iter().zip(&rank_b) {
        let da = a - mean_a;
        let db = b - mean_b;
        cov += da * db;
        var_a += da * da;
        var_b += db * db;
    }
    if var_a == 0.0 || var_b == 0.0 {
        return None;
    }
    Some(cov / (var_a.sqrt() * var_b.sqrt()))
}

/// 1-based ranks, averaging over ties.
fn ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| {
        values[a]
            .partial_cmp(&values[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut result = vec![0.0; values.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && values[order[j + 1]] == values[order[i]] {
            j += 1;
        }
        // Average rank across the tie group.
        let rank = (i + 1 + j + 1) as f64 / 2.0;
        for &idx in &order[i..=j] {
            result[idx] = rank;
        }
        i = j + 1;
    }
    result
}

/// Evaluate a configuration-driven projection model over a week range.
///
/// MAE accumulates over every (player, week) sample with any signal;
/// ranking metrics are computed per week over meaningful performances and
/// averaged across the weeks that had enough data.
pub fn evaluate_projections(
    model: &dyn ProjectionModel,
    params: &ScoringParameters,
    scores: &dyn WeeklyScores,
    players: &[PlayerId],
    weeks: std::ops::RangeInclusive<u8>,
) -> AccuracyReport {
    let mut total_error = 0.0;
    let mut samples = 0u32;

    let mut pairwise_sum = 0.0;
    let mut pairwise_weeks = 0u32;
    let mut top_sums = [0.0f64; 3];
    let mut top_weeks = [0u32; 3];
    let mut spearman_sum = 0.0;
    let mut spearman_weeks = 0u32;

    for week in weeks {
        let mut predicted = Vec::new();
        let mut actual = Vec::new();
        for &player in players {
            let projection = model.project(params, scores, player, week);
            let actual_points = scores.actual(player, week);
            if projection == 0.0 && actual_points == 0.0 {
                continue;
            }
            total_error += (projection - actual_points).abs();
            samples += 1;

            if actual_points >= MEANINGFUL_POINTS {
                predicted.push(projection);
                actual.push(actual_points);
            }
        }

        if let Some(value) = pairwise_accuracy(&predicted, &actual) {
            pairwise_sum += value;
            pairwise_weeks += 1;
        }
        for (slot, k) in [5usize, 10, 20].into_iter().enumerate() {
            if let Some(value) = top_k_overlap(&predicted, &actual, k) {
                top_sums[slot] += value;
                top_weeks[slot] += 1;
            }
        }
        if let Some(value) = spearman_correlation(&predicted, &actual) {
            spearman_sum += value;
            spearman_weeks += 1;
        }
    }

    let average = |sum: f64, count: u32| if count > 0 { sum / f64::from(count) } else { 0.0 };
    AccuracyReport {
        mae: if samples > 0 {
            total_error / f64::from(samples)
        } else {
            0.0
        },
        total_error,
        sample_count: samples,
        ranking: RankingMetrics {
            pairwise_accuracy: average(pairwise_sum, pairwise_weeks),
            top_5_overlap: average(top_sums[0], top_weeks[0]),
            top_10_overlap: average(top_sums[1], top_weeks[1]),
            top_20_overlap: average(top_sums[2], top_weeks[2]),
            rank_correlation: average(spearman_sum, spearman_weeks),
        },
    }
}
