//! # hd-sim
//!
//! Synthetic fantasy-season simulation: weekly player data sources, the
//! lineup-selection collaborator seam, league assembly, and the
//! week-by-week season replay that turns one scoring configuration into
//! win/loss outcomes.

pub mod data;
pub mod league;
pub mod lineup;
pub mod season;

pub use data::{discover_seasons, SeasonDataSet, WeeklyScores};
pub use league::assemble_league;
pub use lineup::{LineupSelector, SlotLineupSelector, Starter, WeekView};
pub use season::{SeasonSimulator, LEAGUE_AVERAGE_FALLBACK};
