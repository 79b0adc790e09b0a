//! Fantasy roster model used by the season simulator.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type PlayerId = u32;

/// Fantasy-relevant positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    #[serde(rename = "QB")]
    Qb,
    #[serde(rename = "RB")]
    Rb,
    #[serde(rename = "WR")]
    Wr,
    #[serde(rename = "TE")]
    Te,
    #[serde(rename = "K")]
    K,
    #[serde(rename = "DST")]
    Dst,
}

impl Position {
    pub const ALL: [Position; 6] = [
        Position::Qb,
        Position::Rb,
        Position::Wr,
        Position::Te,
        Position::K,
        Position::Dst,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Position::Qb => "QB",
            Position::Rb => "RB",
            Position::Wr => "WR",
            Position::Te => "TE",
            Position::K => "K",
            Position::Dst => "DST",
        }
    }

    /// Whether the position fills a FLEX slot.
    pub fn flex_eligible(&self) -> bool {
        matches!(self, Position::Rb | Position::Wr | Position::Te)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Position {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "QB" => Ok(Position::Qb),
            "RB" => Ok(Position::Rb),
            "WR" => Ok(Position::Wr),
            "TE" => Ok(Position::Te),
            "K" => Ok(Position::K),
            "DST" | "D/ST" | "DEF" => Ok(Position::Dst),
            other => Err(format!("unknown position: {other}")),
        }
    }
}

/// Injury designation carried into a given week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InjuryStatus {
    #[default]
    Healthy,
    Questionable,
    Doubtful,
    Out,
}

impl InjuryStatus {
    /// Fraction of a player's points he contributes under this designation.
    /// Non-trivial injury flags scale the contribution down; `Out` zeroes it.
    pub fn point_share(&self) -> f64 {
        match self {
            InjuryStatus::Healthy => 1.0,
            InjuryStatus::Questionable | InjuryStatus::Doubtful => 0.5,
            InjuryStatus::Out => 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub position: Position,
    pub bye_week: Option<u8>,
    #[serde(default)]
    pub injury: InjuryStatus,
}

impl Player {
    pub fn on_bye(&self, week: u8) -> bool {
        self.bye_week == Some(week)
    }
}

/// A team's drafted roster for one simulated season.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Roster {
    pub name: String,
    pub players: Vec<Player>,
}

impl Roster {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            players: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn at_position(&self, position: Position) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(move |p| p.position == position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_parsing_accepts_aliases() {
        assert_eq!("qb".parse::<Position>().unwrap(), Position::Qb);
        assert_eq!("D/ST".parse::<Position>().unwrap(), Position::Dst);
        assert!("XX".parse::<Position>().is_err());
    }

    #[test]
    fn flex_eligibility() {
        assert!(Position::Rb.flex_eligible());
        assert!(Position::Te.flex_eligible());
        assert!(!Position::Qb.flex_eligible());
        assert!(!Position::Dst.flex_eligible());
    }

    #[test]
    fn injury_point_share() {
        assert_eq!(InjuryStatus::Healthy.point_share(), 1.0);
        assert_eq!(InjuryStatus::Questionable.point_share(), 0.5);
        assert_eq!(InjuryStatus::Out.point_share(), 0.0);
    }

    #[test]
    fn bye_week_check() {
        let player = Player {
            id: 7,
            name: "Test RB".to_string(),
            position: Position::Rb,
            bye_week: Some(9),
            injury: InjuryStatus::Healthy,
        };
        assert!(player.on_bye(9));
        assert!(!player.on_bye(10));
    }
}
