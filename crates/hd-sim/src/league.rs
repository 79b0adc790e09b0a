//! League assembly.
//!
//! Builds the simulated league's rosters from a season dataset via a snake
//! draft: shuffled initial order, reversing direction each round, every team
//! picking greedily on season-total projections from the top of the
//! remaining pool. Index 0 in the returned list is always the tracked team.

use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashMap;

use hd_types::{HdResult, Position, Roster, SimError};
use tracing::debug;

use crate::data::SeasonDataSet;

/// Per-position roster caps for a 15-man roster.
fn position_cap(position: Position) -> usize {
    match position {
        Position::Qb => 2,
        Position::Rb => 5,
        Position::Wr => 5,
        Position::Te => 2,
        Position::K => 1,
        Position::Dst => 1,
    }
}

/// How far down the remaining pool a pick may reach; a little draft-room
/// noise so repeated simulations explore different rosters.
const PICK_WINDOW: usize = 3;

/// Draft `num_teams` rosters of `roster_size` players each from the dataset.
pub fn assemble_league<R: Rng>(
    rng: &mut R,
    dataset: &SeasonDataSet,
    num_teams: usize,
    roster_size: usize,
) -> HdResult<Vec<Roster>> {
    if num_teams == 0 {
        return Err(SimError::EmptyLeague.into());
    }

    // Pool sorted by season-total projection, best first; ties by id so the
    // draft is reproducible for a fixed RNG.
    let mut pool: Vec<_> = dataset.players().cloned().collect();
    pool.sort_by(|a, b| {
        dataset
            .season_projection(b.id)
            .partial_cmp(&dataset.season_projection(a.id))
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });

    let mut rosters: Vec<Roster> = (0..num_teams)
        .map(|idx| {
            if idx == 0 {
                Roster::new("huddle")
            } else {
                Roster::new(format!("opponent_{idx}"))
            }
        })
        .collect();
    let mut counts: Vec<HashMap<Position, usize>> = vec![HashMap::new(); num_teams];

    let mut order: Vec<usize> = (0..num_teams).collect();
    order.shuffle(rng);

    for round in 0..roster_size {
        let picks: Vec<usize> = if round % 2 == 0 {
            order.clone()
        } else {
            order.iter().rev().copied().collect()
        };

        for team in picks {
            // First few available players this team can still legally take.
            let eligible: Vec<usize> = pool
                .iter()
                .enumerate()
                .filter(|(_, p)| {
                    counts[team].get(&p.position).copied().unwrap_or(0) < position_cap(p.position)
                })
                .map(|(idx, _)| idx)
                .take(PICK_WINDOW)
                .collect();

            let Some(&pick_idx) = eligible.get(rng.gen_range(0..eligible.len().max(1))) else {
                continue; // pool exhausted for this team's needs
            };
            let player = pool.remove(pick_idx);
            *counts[team].entry(player.position).or_insert(0) += 1;
            rosters[team].players.push(player);
        }
    }

    debug!(
        teams = num_teams,
        roster_size,
        pool_left = pool.len(),
        "assembled league rosters"
    );
    Ok(rosters)
}
