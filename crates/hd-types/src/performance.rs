//! Configuration performance records and the "better than" rules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::scoring::ScoringConfig;

/// Win rates within this distance are treated as tied and fall through to
/// the points tiebreaker; exact ties never displace a recorded best.
const WIN_RATE_EPSILON: f64 = 1e-4;
const POINTS_EPSILON: f64 = 1e-2;

/// Ranking-quality metrics attached to prediction-error records.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankingMetrics {
    /// Fraction of pairwise player comparisons ordered correctly (0.0-1.0).
    pub pairwise_accuracy: f64,
    pub top_5_overlap: f64,
    pub top_10_overlap: f64,
    pub top_20_overlap: f64,
    /// Spearman rank correlation (-1.0 to +1.0).
    pub rank_correlation: f64,
}

/// Scalar fitness signal for one evaluated configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Metric {
    /// Higher is better. `avg_points` breaks win-rate ties.
    WinRate { win_rate: f64, avg_points: f64 },
    /// Lower error is better; when both records carry ranking metrics,
    /// pairwise accuracy is primary and the error is a diagnostic.
    PredictionError {
        mae: f64,
        ranking: Option<RankingMetrics>,
    },
}

impl Metric {
    /// Primary scalar value, for display/serialization.
    pub fn value(&self) -> f64 {
        match self {
            Metric::WinRate { win_rate, .. } => *win_rate,
            Metric::PredictionError { mae, .. } => *mae,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Metric::WinRate { .. } => "win_rate",
            Metric::PredictionError { .. } => "prediction_error",
        }
    }

    /// Strict comparison: `true` only when `self` is strictly better than
    /// `other`. Equal metrics leave an existing best in place, and metrics
    /// of different kinds are never comparable.
    pub fn beats(&self, other: &Metric) -> bool {
        match (self, other) {
            (
                Metric::WinRate {
                    win_rate: a,
                    avg_points: pts_a,
                },
                Metric::WinRate {
                    win_rate: b,
                    avg_points: pts_b,
                },
            ) => {
                if (a - b).abs() > WIN_RATE_EPSILON {
                    a > b
                } else {
                    pts_a - pts_b > POINTS_EPSILON
                }
            }
            (
                Metric::PredictionError {
                    mae: a,
                    ranking: rank_a,
                },
                Metric::PredictionError {
                    mae: b,
                    ranking: rank_b,
                },
            ) => match (rank_a, rank_b) {
                (Some(ra), Some(rb)) => ra.pairwise_accuracy > rb.pairwise_accuracy,
                _ => a < b,
            },
            _ => false,
        }
    }
}

/// Performance record for one evaluated configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigPerformance {
    pub configuration: ScoringConfig,
    pub metric: Metric,
    /// Number of evaluated samples backing the metric. A record with zero
    /// samples is invalid and never becomes a recorded best.
    pub sample_count: u32,
    pub identifier: String,
    pub recorded_at: DateTime<Utc>,
}

impl ConfigPerformance {
    pub fn new(
        configuration: ScoringConfig,
        metric: Metric,
        sample_count: u32,
        identifier: impl Into<String>,
    ) -> Self {
        Self {
            configuration,
            metric,
            sample_count,
            identifier: identifier.into(),
            recorded_at: Utc::now(),
        }
    }

    /// Whether this record should replace `current` as the best.
    pub fn is_better_than(&self, current: Option<&ConfigPerformance>) -> bool {
        // Invalid records never win, even against an empty slot.
        if self.sample_count == 0 {
            return false;
        }
        match current {
            None => true,
            Some(best) if best.sample_count == 0 => true,
            Some(best) => self.metric.beats(&best.metric),
        }
    }
}
