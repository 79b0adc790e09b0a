//! Optimization horizons.
//!
//! Each horizon is an independent optimization scope with its own tuned
//! configuration: the full rest-of-season view used for drafting, plus four
//! weekly ranges that capture how scoring behavior shifts across the season.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{ConfigError, SimError};

/// One of the five independent optimization scopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Horizon {
    /// Rest of season: full 17-week view, used for draft/season-long decisions.
    #[serde(rename = "ros")]
    RestOfSeason,
    #[serde(rename = "1-5")]
    Weeks1To5,
    #[serde(rename = "6-9")]
    Weeks6To9,
    #[serde(rename = "10-13")]
    Weeks10To13,
    #[serde(rename = "14-17")]
    Weeks14To17,
}

impl Horizon {
    /// All horizons, in checkpoint order.
    pub const ALL: [Horizon; 5] = [
        Horizon::RestOfSeason,
        Horizon::Weeks1To5,
        Horizon::Weeks6To9,
        Horizon::Weeks10To13,
        Horizon::Weeks14To17,
    ];

    /// The four weekly ranges (everything except rest-of-season).
    pub const WEEKLY: [Horizon; 4] = [
        Horizon::Weeks1To5,
        Horizon::Weeks6To9,
        Horizon::Weeks10To13,
        Horizon::Weeks14To17,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Horizon::RestOfSeason => "ros",
            Horizon::Weeks1To5 => "1-5",
            Horizon::Weeks6To9 => "6-9",
            Horizon::Weeks10To13 => "10-13",
            Horizon::Weeks14To17 => "14-17",
        }
    }

    /// Checkpoint file name for this horizon.
    pub fn file_name(&self) -> String {
        format!("horizon_{}.json", self.as_str())
    }

    /// Inclusive week range covered by this horizon.
    pub fn week_range(&self) -> (u8, u8) {
        match self {
            Horizon::RestOfSeason => (1, 17),
            Horizon::Weeks1To5 => (1, 5),
            Horizon::Weeks6To9 => (6, 9),
            Horizon::Weeks10To13 => (10, 13),
            Horizon::Weeks14To17 => (14, 17),
        }
    }

    pub fn contains_week(&self, week: u8) -> bool {
        let (start, end) = self.week_range();
        week >= start && week <= end
    }

    /// Weekly horizon a given week falls into.
    pub fn for_week(week: u8) -> Result<Horizon, SimError> {
        match week {
            1..=5 => Ok(Horizon::Weeks1To5),
            6..=9 => Ok(Horizon::Weeks6To9),
            10..=13 => Ok(Horizon::Weeks10To13),
            14..=17 => Ok(Horizon::Weeks14To17),
            _ => Err(SimError::InvalidWeek { week }),
        }
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Horizon {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ros" => Ok(Horizon::RestOfSeason),
            "1-5" => Ok(Horizon::Weeks1To5),
            "6-9" => Ok(Horizon::Weeks6To9),
            "10-13" => Ok(Horizon::Weeks10To13),
            "14-17" => Ok(Horizon::Weeks14To17),
            other => Err(ConfigError::UnknownHorizon {
                name: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn week_maps_to_expected_horizon() {
        assert_eq!(Horizon::for_week(1).unwrap(), Horizon::Weeks1To5);
        assert_eq!(Horizon::for_week(5).unwrap(), Horizon::Weeks1To5);
        assert_eq!(Horizon::for_week(6).unwrap(), Horizon::Weeks6To9);
        assert_eq!(Horizon::for_week(13).unwrap(), Horizon::Weeks10To13);
        assert_eq!(Horizon::for_week(17).unwrap(), Horizon::Weeks14To17);
    }

    #[test]
    fn invalid_weeks_rejected() {
        assert!(Horizon::for_week(0).is_err());
        assert!(Horizon::for_week(18).is_err());
    }

    #[test]
    fn round_trip_parse() {
        for horizon in Horizon::ALL {
            let parsed: Horizon = horizon.as_str().parse().unwrap();
            assert_eq!(parsed, horizon);
        }
        assert!("week-99".parse::<Horizon>().is_err());
    }

    #[test]
    fn file_names_are_distinct() {
        let names: std::collections::HashSet<String> =
            Horizon::ALL.iter().map(|h| h.file_name()).collect();
        assert_eq!(names.len(), 5);
        assert!(names.contains("horizon_ros.json"));
        assert!(names.contains("horizon_14-17.json"));
    }

    #[test]
    fn ranges_cover_season_without_overlap() {
        for week in 1..=17u8 {
            let matching: Vec<_> = Horizon::WEEKLY
                .iter()
                .filter(|h| h.contains_week(week))
                .collect();
            assert_eq!(matching.len(), 1, "week {week} should be in exactly one range");
            assert!(Horizon::RestOfSeason.contains_week(week));
        }
    }
}
