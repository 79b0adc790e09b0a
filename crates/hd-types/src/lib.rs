// Core types shared across the huddle workspace

pub mod errors;
pub mod horizon;
pub mod outcome;
pub mod performance;
pub mod roster;
pub mod scoring;

pub use errors::{CheckpointError, ConfigError, HdError, HdResult, SimError};
pub use horizon::Horizon;
pub use outcome::{MatchupSide, Opponent, WeeklyMatchupOutcome};
pub use performance::{ConfigPerformance, Metric, RankingMetrics};
pub use roster::{InjuryStatus, Player, PlayerId, Position, Roster};
pub use scoring::{
    AdpScoring, DraftOrderBonuses, HorizonParameters, LocationModifiers, MatchupScoring,
    PerformanceScoring, PlayerRatingScoring, ScoringConfig, ScoringParameters, SharedParameters,
    TeamQualityScoring,
};
