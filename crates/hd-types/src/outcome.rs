//! Weekly matchup outcomes produced by the season simulator.

use serde::{Deserialize, Serialize};

/// The opponent side of a matchup. A league with an odd team count pairs the
/// leftover team against the league-average sentinel rather than skipping it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Opponent {
    Team(usize),
    LeagueAverage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchupSide {
    TeamA,
    TeamB,
}

/// Result of one head-to-head matchup in one simulated week.
///
/// Created fresh for every simulated season and discarded once aggregated
/// into win/loss counts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeeklyMatchupOutcome {
    pub week: u8,
    pub team_a: usize,
    pub team_b: Opponent,
    pub score_a: f64,
    pub score_b: f64,
    pub winner: MatchupSide,
}

impl WeeklyMatchupOutcome {
    pub fn involves(&self, team: usize) -> bool {
        self.team_a == team || self.team_b == Opponent::Team(team)
    }

    /// Whether `team` won this matchup; `None` if it did not play in it.
    pub fn won_by(&self, team: usize) -> Option<bool> {
        if self.team_a == team {
            Some(self.winner == MatchupSide::TeamA)
        } else if self.team_b == Opponent::Team(team) {
            Some(self.winner == MatchupSide::TeamB)
        } else {
            None
        }
    }

    /// Points `team` scored in this matchup; `None` if it did not play in it.
    pub fn points_for(&self, team: usize) -> Option<f64> {
        if self.team_a == team {
            Some(self.score_a)
        } else if self.team_b == Opponent::Team(team) {
            Some(self.score_b)
        } else {
            None
        }
    }
}
