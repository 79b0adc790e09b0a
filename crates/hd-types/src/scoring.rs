//! Typed scoring configuration.
//!
//! One complete scoring/strategy policy as a nested struct tree, one struct
//! per scoring section. The JSON representation keeps the historical
//! `SCREAMING_SNAKE_CASE` keys so baselines and checkpoints stay diffable
//! against older config folders.
//!
//! A configuration splits into two parts: [`SharedParameters`] (identical
//! across every horizon, synchronized by the optimizer) and
//! [`HorizonParameters`] (independently tuned per horizon). The checkpoint
//! format persists the parts separately; [`ScoringParameters`] flattens both
//! into the single tree the simulator consumes.

use serde::{Deserialize, Serialize};

/// Draft-order bonus points for hitting primary/secondary positions on time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct DraftOrderBonuses {
    pub primary: f64,
    pub secondary: f64,
}

/// Average-draft-position scoring: market consensus influence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct AdpScoring {
    pub weight: f64,
    /// ADP picks per scoring tier.
    pub steps: u32,
}

/// Expert-consensus ranking influence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct PlayerRatingScoring {
    pub weight: f64,
}

/// NFL team strength influence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct TeamQualityScoring {
    pub weight: f64,
    /// Minimum weeks of team data before this signal is trusted.
    pub min_weeks: u8,
}

/// Actual-vs-projected deviation influence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct PerformanceScoring {
    pub weight: f64,
    /// Deviation fraction per scoring tier.
    pub steps: f64,
    pub min_weeks: u8,
}

/// Current-week opponent strength (additive impact).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct MatchupScoring {
    pub weight: f64,
    /// Maximum additive point impact.
    pub impact_scale: f64,
    pub min_weeks: u8,
}

/// Home/away/international game adjustments.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct LocationModifiers {
    pub home: f64,
    pub away: f64,
    pub international: f64,
}

/// Parameters shared across all horizons. The optimizer keeps these
/// byte-identical in every horizon's baseline whenever one is updated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct SharedParameters {
    pub same_pos_bye_weight: f64,
    pub diff_pos_bye_weight: f64,
    pub draft_order_bonuses: DraftOrderBonuses,
    pub adp_scoring: AdpScoring,
}

impl Default for SharedParameters {
    fn default() -> Self {
        Self {
            same_pos_bye_weight: 0.2,
            diff_pos_bye_weight: 0.1,
            draft_order_bonuses: DraftOrderBonuses {
                primary: 87.0,
                secondary: 78.0,
            },
            adp_scoring: AdpScoring {
                weight: 1.5,
                steps: 25,
            },
        }
    }
}

/// Parameters tuned independently per horizon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct HorizonParameters {
    pub normalization_max_scale: f64,
    pub player_rating_scoring: PlayerRatingScoring,
    pub team_quality_scoring: TeamQualityScoring,
    pub performance_scoring: PerformanceScoring,
    pub matchup_scoring: MatchupScoring,
    pub location_modifiers: LocationModifiers,
}

impl Default for HorizonParameters {
    fn default() -> Self {
        Self {
            normalization_max_scale: 100.0,
            player_rating_scoring: PlayerRatingScoring { weight: 2.0 },
            team_quality_scoring: TeamQualityScoring {
                weight: 1.0,
                min_weeks: 3,
            },
            performance_scoring: PerformanceScoring {
                weight: 4.0,
                steps: 0.08,
                min_weeks: 5,
            },
            matchup_scoring: MatchupScoring {
                weight: 2.0,
                impact_scale: 88.0,
                min_weeks: 5,
            },
            location_modifiers: LocationModifiers {
                home: 2.0,
                away: -2.0,
                international: -5.0,
            },
        }
    }
}

/// The full parameter tree for one horizon: shared and horizon-specific
/// parts flattened into a single JSON object.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoringParameters {
    #[serde(flatten)]
    pub shared: SharedParameters,
    #[serde(flatten)]
    pub weekly: HorizonParameters,
}

impl ScoringParameters {
    pub fn from_parts(shared: SharedParameters, weekly: HorizonParameters) -> Self {
        Self { shared, weekly }
    }
}

/// One complete scoring/strategy policy with its metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub config_name: String,
    pub description: String,
    pub parameters: ScoringParameters,
}

impl ScoringConfig {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            config_name: name.into(),
            description: description.into(),
            parameters: ScoringParameters::default(),
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self::new("baseline", "Default scoring configuration")
    }
}
