//! Weekly player data sources.
//!
//! A season dataset is a folder of per-position JSON files, each an array of
//! player records with per-week projected and actual point arrays. Missing
//! values are always treated as zero, never as an error; absence of data is
//! normal (byes, injuries, late-season additions).

use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use hd_types::{HdResult, InjuryStatus, Player, PlayerId, Position, SimError};
use tracing::{debug, warn};

/// Scoring/data collaborator: weekly projected and actual point values per
/// player. Weeks are 1-based; anything unknown is 0.0.
pub trait WeeklyScores: Sync {
    fn projected(&self, player: PlayerId, week: u8) -> f64;
    fn actual(&self, player: PlayerId, week: u8) -> f64;
}

const POSITION_FILES: [&str; 6] = [
    "qb_data.json",
    "rb_data.json",
    "wr_data.json",
    "te_data.json",
    "k_data.json",
    "dst_data.json",
];

#[derive(Debug, Deserialize)]
struct PlayerRecord {
    id: PlayerId,
    name: String,
    position: String,
    #[serde(default)]
    bye_week: Option<u8>,
    #[serde(default)]
    injury: InjuryStatus,
    #[serde(default)]
    projected_points: Vec<f64>,
    #[serde(default)]
    actual_points: Vec<f64>,
}

#[derive(Debug, Clone)]
struct PlayerSeason {
    player: Player,
    projected: Vec<f64>,
    actual: Vec<f64>,
}

/// One historical season's worth of player data, loaded into memory.
#[derive(Debug, Clone)]
pub struct SeasonDataSet {
    pub label: String,
    players: HashMap<PlayerId, PlayerSeason>,
}

impl SeasonDataSet {
    /// Load a season folder containing the per-position JSON files.
    ///
    /// A missing or malformed position file is logged and skipped; loading
    /// fails only when no player could be read at all.
    pub fn from_folder(folder: &Path) -> HdResult<Self> {
        let label = folder
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("season")
            .to_string();

        let mut players = HashMap::new();
        for file_name in POSITION_FILES {
            let path = folder.join(file_name);
            if !path.exists() {
                warn!(file = %path.display(), "missing position file, skipping");
                continue;
            }
            let contents = fs::read_to_string(&path)?;
            let records: Vec<PlayerRecord> = match serde_json::from_str(&contents) {
                Ok(records) => records,
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "malformed position file, skipping");
                    continue;
                }
            };

            for record in records {
                let position: Position = match record.position.parse() {
                    Ok(position) => position,
                    Err(e) => {
                        warn!(player = %record.name, error = %e, "skipping player");
                        continue;
                    }
                };
                players.insert(
                    record.id,
                    PlayerSeason {
                        player: Player {
                            id: record.id,
                            name: record.name,
                            position,
                            bye_week: record.bye_week,
                            injury: record.injury,
                        },
                        projected: record.projected_points,
                        actual: record.actual_points,
                    },
                );
            }
        }

        if players.is_empty() {
            return Err(SimError::DataLoadFailed {
                message: format!("no players loaded from {}", folder.display()),
            }
            .into());
        }

        debug!(label, players = players.len(), "loaded season dataset");
        Ok(Self { label, players })
    }

    /// Build a dataset directly from players and their weekly point arrays.
    pub fn from_players(
        label: impl Into<String>,
        entries: Vec<(Player, Vec<f64>, Vec<f64>)>,
    ) -> Self {
        let players = entries
            .into_iter()
            .map(|(player, projected, actual)| {
                (
                    player.id,
                    PlayerSeason {
                        player,
                        projected,
                        actual,
                    },
                )
            })
            .collect();
        Self {
            label: label.into(),
            players,
        }
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id).map(|entry| &entry.player)
    }

    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.players.values().map(|entry| &entry.player)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Sum of a player's projected points across the season, used as the
    /// draft value when assembling league rosters.
    pub fn season_projection(&self, id: PlayerId) -> f64 {
        self.players
            .get(&id)
            .map(|entry| entry.projected.iter().sum())
            .unwrap_or(0.0)
    }
}

fn week_value(values: &[f64], week: u8) -> f64 {
    if week == 0 {
        return 0.0;
    }
    values.get(usize::from(week) - 1).copied().unwrap_or(0.0)
}

impl WeeklyScores for SeasonDataSet {
    fn projected(&self, player: PlayerId, week: u8) -> f64 {
        self.players
            .get(&player)
            .map(|entry| week_value(&entry.projected, week))
            .unwrap_or(0.0)
    }

    fn actual(&self, player: PlayerId, week: u8) -> f64 {
        self.players
            .get(&player)
            .map(|entry| week_value(&entry.actual, week))
            .unwrap_or(0.0)
    }
}

/// List historical season folders under a data directory, sorted by name.
pub fn discover_seasons(data_dir: &Path) -> HdResult<Vec<PathBuf>> {
    if !data_dir.exists() {
        return Err(SimError::DataLoadFailed {
            message: format!("data directory does not exist: {}", data_dir.display()),
        }
        .into());
    }

    let mut folders: Vec<PathBuf> = fs::read_dir(data_dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    folders.sort();
    Ok(folders)
}
