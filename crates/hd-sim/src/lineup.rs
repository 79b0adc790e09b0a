//! Lineup selection.
//!
//! The season simulator treats lineup choice as an opaque,
//! deterministic-given-input collaborator behind the [`LineupSelector`]
//! trait. The default implementation fills a standard slot layout greedily
//! by configuration-driven projections.

use hd_types::{PlayerId, Position, Roster, ScoringParameters};

use crate::data::WeeklyScores;

/// Everything a selector may consult for one team-week: the week number,
/// the weekly data source, and the scoring configuration driving the
/// projections.
pub struct WeekView<'a> {
    pub week: u8,
    pub scores: &'a dyn WeeklyScores,
    pub params: &'a ScoringParameters,
}

impl WeekView<'_> {
    /// Configuration-driven projection for one player this week.
    ///
    /// Base projection adjusted by the performance-deviation signal: once a
    /// player has at least `MIN_WEEKS` of completed weeks, his average
    /// relative deviation (actual vs projected) nudges the projection up or
    /// down, scaled by the section's weight and step size and clamped to
    /// half the base either way.
    pub fn projection(&self, player: PlayerId) -> f64 {
        let base = self.scores.projected(player, self.week);
        if base <= 0.0 {
            return base;
        }

        let perf = &self.params.weekly.performance_scoring;
        let mut deviation_sum = 0.0;
        let mut observed = 0u8;
        for week in 1..self.week {
            let projected = self.scores.projected(player, week);
            if projected > 0.0 {
                deviation_sum += (self.scores.actual(player, week) - projected) / projected;
                observed += 1;
            }
        }
        if observed < perf.min_weeks || observed == 0 {
            return base;
        }

        let adjustment =
            (perf.weight * perf.steps * (deviation_sum / f64::from(observed))).clamp(-0.5, 0.5);
        base * (1.0 + adjustment)
    }
}

/// A starter chosen for one week, with the projection that earned the slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Starter {
    pub player_id: PlayerId,
    pub position: Position,
    pub projected_points: f64,
}

/// Lineup-selection collaborator.
pub trait LineupSelector: Send + Sync {
    /// Pick the optimal starters for a roster in a given week. An empty
    /// roster yields an empty lineup, never an error.
    fn select_starters(&self, roster: &Roster, week: &WeekView<'_>) -> Vec<Starter>;
}

/// Standard slot layout: QB, 2 RB, 2 WR, TE, FLEX (RB/WR/TE), K, DST.
#[derive(Debug, Clone, Copy)]
pub struct SlotLineupSelector {
    pub qb: usize,
    pub rb: usize,
    pub wr: usize,
    pub te: usize,
    pub flex: usize,
    pub k: usize,
    pub dst: usize,
}

impl Default for SlotLineupSelector {
    fn default() -> Self {
        Self {
            qb: 1,
            rb: 2,
            wr: 2,
            te: 1,
            flex: 1,
            k: 1,
            dst: 1,
        }
    }
}

impl SlotLineupSelector {
    fn quota(&self, position: Position) -> usize {
        match position {
            Position::Qb => self.qb,
            Position::Rb => self.rb,
            Position::Wr => self.wr,
            Position::Te => self.te,
            Position::K => self.k,
            Position::Dst => self.dst,
        }
    }
}

impl LineupSelector for SlotLineupSelector {
    fn select_starters(&self, roster: &Roster, week: &WeekView<'_>) -> Vec<Starter> {
        // Rank the whole roster once, best projection first; ties broken by
        // player id so selection is deterministic given input.
        let mut ranked: Vec<Starter> = roster
            .players
            .iter()
            .map(|player| Starter {
                player_id: player.id,
                position: player.position,
                projected_points: week.projection(player.id),
            })
            .collect();
        ranked.sort_by(|a, b| {
            b.projected_points
                .partial_cmp(&a.projected_points)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.player_id.cmp(&b.player_id))
        });

        let mut filled: std::collections::HashMap<Position, usize> = Default::default();
        let mut flex_used = 0usize;
        let mut starters = Vec::new();

        for candidate in ranked {
            let used = filled.entry(candidate.position).or_insert(0);
            if *used < self.quota(candidate.position) {
                *used += 1;
                starters.push(candidate);
            } else if candidate.position.flex_eligible() && flex_used < self.flex {
                flex_used += 1;
                starters.push(candidate);
            }
        }

        starters
    }
}
