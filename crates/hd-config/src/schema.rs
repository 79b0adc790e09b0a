//! Static parameter schema.
//!
//! Every tunable parameter is declared once here with its bounds, step
//! precision, and scope. The accessor functions map parameter names onto the
//! typed configuration tree, so "apply candidate at path" is a
//! compile-time-checked field write rather than nested-map traversal.

use hd_types::{ConfigError, ScoringParameters};

/// Step precision of a parameter's discrete value grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    /// Whole-number steps.
    Integer,
    /// 0.1 steps.
    Tenth,
    /// 0.01 steps.
    Hundredth,
}

impl Precision {
    pub fn step(&self) -> f64 {
        match self {
            Precision::Integer => 1.0,
            Precision::Tenth => 0.1,
            Precision::Hundredth => 0.01,
        }
    }

    pub fn decimals(&self) -> u32 {
        match self {
            Precision::Integer => 0,
            Precision::Tenth => 1,
            Precision::Hundredth => 2,
        }
    }

    /// Round a value onto this precision's grid.
    pub fn round(&self, value: f64) -> f64 {
        let factor = 10f64.powi(self.decimals() as i32);
        (value * factor).round() / factor
    }
}

/// Whether a parameter applies identically across all horizons or is
/// independently tunable per horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamScope {
    Shared,
    PerHorizon,
}

/// A single tunable parameter: its bounds, precision, and scope.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterDef {
    pub name: &'static str,
    pub min: f64,
    pub max: f64,
    pub precision: Precision,
    pub scope: ParamScope,
}

const fn shared(name: &'static str, min: f64, max: f64, precision: Precision) -> ParameterDef {
    ParameterDef {
        name,
        min,
        max,
        precision,
        scope: ParamScope::Shared,
    }
}

const fn per_horizon(name: &'static str, min: f64, max: f64, precision: Precision) -> ParameterDef {
    ParameterDef {
        name,
        min,
        max,
        precision,
        scope: ParamScope::PerHorizon,
    }
}

/// Every tunable parameter, in coordinate-search order: shared parameters
/// first, then the horizon-specific scoring knobs.
pub const PARAMETERS: [ParameterDef; 19] = [
    shared("SAME_POS_BYE_WEIGHT", 0.0, 0.5, Precision::Hundredth),
    shared("DIFF_POS_BYE_WEIGHT", 0.0, 0.3, Precision::Hundredth),
    shared("PRIMARY_BONUS", 25.0, 150.0, Precision::Integer),
    shared("SECONDARY_BONUS", 25.0, 150.0, Precision::Integer),
    shared("ADP_SCORING_WEIGHT", 0.5, 7.0, Precision::Hundredth),
    shared("ADP_SCORING_STEPS", 5.0, 50.0, Precision::Integer),
    per_horizon("NORMALIZATION_MAX_SCALE", 50.0, 200.0, Precision::Integer),
    per_horizon("PLAYER_RATING_SCORING_WEIGHT", 0.5, 4.0, Precision::Hundredth),
    per_horizon("TEAM_QUALITY_SCORING_WEIGHT", 0.0, 4.0, Precision::Hundredth),
    per_horizon("TEAM_QUALITY_MIN_WEEKS", 1.0, 12.0, Precision::Integer),
    per_horizon("PERFORMANCE_SCORING_WEIGHT", 0.0, 8.0, Precision::Hundredth),
    per_horizon("PERFORMANCE_SCORING_STEPS", 0.01, 0.3, Precision::Hundredth),
    per_horizon("PERFORMANCE_MIN_WEEKS", 1.0, 14.0, Precision::Integer),
    per_horizon("MATCHUP_IMPACT_SCALE", 25.0, 250.0, Precision::Integer),
    per_horizon("MATCHUP_SCORING_WEIGHT", 0.0, 4.0, Precision::Hundredth),
    per_horizon("MATCHUP_MIN_WEEKS", 1.0, 14.0, Precision::Integer),
    per_horizon("LOCATION_HOME", -5.0, 15.0, Precision::Tenth),
    per_horizon("LOCATION_AWAY", -15.0, 5.0, Precision::Tenth),
    per_horizon("LOCATION_INTERNATIONAL", -25.0, 5.0, Precision::Tenth),
];

/// Look up a parameter definition by name. Unknown names are a fatal
/// configuration error, never retried.
pub fn lookup(name: &str) -> Result<&'static ParameterDef, ConfigError> {
    PARAMETERS
        .iter()
        .find(|def| def.name == name)
        .ok_or_else(|| ConfigError::UnknownParameter {
            name: name.to_string(),
        })
}

/// The full ordered set of legal values for a parameter:
/// `{min, min+step, ..., max}` with `step = 10^(-precision)`. A half-step
/// epsilon at the upper bound absorbs floating-point drift so the count is
/// exact and the search space stays enumerable.
pub fn discrete_range(def: &ParameterDef) -> Vec<f64> {
    let step = def.precision.step();
    let mut values = Vec::new();
    let mut current = def.min;
    while current <= def.max + step / 2.0 {
        values.push(def.precision.round(current));
        current += step;
    }
    values
}

/// Read the named parameter's value out of a configuration tree.
pub fn value_of(params: &ScoringParameters, name: &str) -> Result<f64, ConfigError> {
    let value = match name {
        "SAME_POS_BYE_WEIGHT" => params.shared.same_pos_bye_weight,
        "DIFF_POS_BYE_WEIGHT" => params.shared.diff_pos_bye_weight,
        "PRIMARY_BONUS" => params.shared.draft_order_bonuses.primary,
        "SECONDARY_BONUS" => params.shared.draft_order_bonuses.secondary,
        "ADP_SCORING_WEIGHT" => params.shared.adp_scoring.weight,
        "ADP_SCORING_STEPS" => f64::from(params.shared.adp_scoring.steps),
        "NORMALIZATION_MAX_SCALE" => params.weekly.normalization_max_scale,
        "PLAYER_RATING_SCORING_WEIGHT" => params.weekly.player_rating_scoring.weight,
        "TEAM_QUALITY_SCORING_WEIGHT" => params.weekly.team_quality_scoring.weight,
        "TEAM_QUALITY_MIN_WEEKS" => f64::from(params.weekly.team_quality_scoring.min_weeks),
        "PERFORMANCE_SCORING_WEIGHT" => params.weekly.performance_scoring.weight,
        "PERFORMANCE_SCORING_STEPS" => params.weekly.performance_scoring.steps,
        "PERFORMANCE_MIN_WEEKS" => f64::from(params.weekly.performance_scoring.min_weeks),
        "MATCHUP_IMPACT_SCALE" => params.weekly.matchup_scoring.impact_scale,
        "MATCHUP_SCORING_WEIGHT" => params.weekly.matchup_scoring.weight,
        "MATCHUP_MIN_WEEKS" => f64::from(params.weekly.matchup_scoring.min_weeks),
        "LOCATION_HOME" => params.weekly.location_modifiers.home,
        "LOCATION_AWAY" => params.weekly.location_modifiers.away,
        "LOCATION_INTERNATIONAL" => params.weekly.location_modifiers.international,
        other => {
            return Err(ConfigError::UnknownParameter {
                name: other.to_string(),
            })
        }
    };
    Ok(value)
}

/// Write the named parameter into a configuration tree. Integer-precision
/// fields stored as integers are rounded onto their grid.
pub fn apply_value(
    params: &mut ScoringParameters,
    name: &str,
    value: f64,
) -> Result<(), ConfigError> {
    match name {
        "SAME_POS_BYE_WEIGHT" => params.shared.same_pos_bye_weight = value,
        "DIFF_POS_BYE_WEIGHT" => params.shared.diff_pos_bye_weight = value,
        "PRIMARY_BONUS" => params.shared.draft_order_bonuses.primary = value,
        "SECONDARY_BONUS" => params.shared.draft_order_bonuses.secondary = value,
        "ADP_SCORING_WEIGHT" => params.shared.adp_scoring.weight = value,
        "ADP_SCORING_STEPS" => params.shared.adp_scoring.steps = value.round() as u32,
        "NORMALIZATION_MAX_SCALE" => params.weekly.normalization_max_scale = value,
        "PLAYER_RATING_SCORING_WEIGHT" => params.weekly.player_rating_scoring.weight = value,
        "TEAM_QUALITY_SCORING_WEIGHT" => params.weekly.team_quality_scoring.weight = value,
        "TEAM_QUALITY_MIN_WEEKS" => {
            params.weekly.team_quality_scoring.min_weeks = value.round() as u8
        }
        "PERFORMANCE_SCORING_WEIGHT" => params.weekly.performance_scoring.weight = value,
        "PERFORMANCE_SCORING_STEPS" => params.weekly.performance_scoring.steps = value,
        "PERFORMANCE_MIN_WEEKS" => params.weekly.performance_scoring.min_weeks = value.round() as u8,
        "MATCHUP_IMPACT_SCALE" => params.weekly.matchup_scoring.impact_scale = value,
        "MATCHUP_SCORING_WEIGHT" => params.weekly.matchup_scoring.weight = value,
        "MATCHUP_MIN_WEEKS" => params.weekly.matchup_scoring.min_weeks = value.round() as u8,
        "LOCATION_HOME" => params.weekly.location_modifiers.home = value,
        "LOCATION_AWAY" => params.weekly.location_modifiers.away = value,
        "LOCATION_INTERNATIONAL" => params.weekly.location_modifiers.international = value,
        other => {
            return Err(ConfigError::UnknownParameter {
                name: other.to_string(),
            })
        }
    }
    Ok(())
}
