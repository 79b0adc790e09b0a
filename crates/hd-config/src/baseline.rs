//! Baseline/checkpoint folder format.
//!
//! A baseline folder uses the same layout a checkpoint does: one
//! `shared_parameters.json` carrying the horizon-independent parameters,
//! plus one `horizon_<name>.json` per horizon carrying that horizon's
//! parameters and the performance metrics that produced them. Loading a
//! baseline is strict (every file must be present), while checkpoint
//! resume (in hd-optimizer) tolerates missing horizon files.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use hd_types::{
    ConfigError, HdResult, Horizon, HorizonParameters, Metric, RankingMetrics, ScoringConfig,
    ScoringParameters, SharedParameters,
};
use tracing::debug;

/// File name of the horizon-independent parameter file.
pub const SHARED_FILE: &str = "shared_parameters.json";

/// Performance metrics block persisted alongside a parameter set.
///
/// `metric_value` is null for a horizon seeded from baseline without any
/// evaluation; in that case `note` explains the absence so downstream
/// consumers never read stale numbers as real results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceRecord {
    pub metric_kind: Option<String>,
    pub metric_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_points: Option<f64>,
    #[serde(default)]
    pub sample_count: u32,
    pub identifier: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ranking: Option<RankingMetrics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl PerformanceRecord {
    /// Record for a horizon seeded from baseline with no evaluation behind it.
    pub fn baseline_placeholder(timestamp: DateTime<Utc>) -> Self {
        Self {
            metric_kind: None,
            metric_value: None,
            avg_points: None,
            sample_count: 0,
            identifier: "baseline".to_string(),
            timestamp,
            ranking: None,
            note: Some("No optimization performed - parameters seeded from baseline".to_string()),
        }
    }

    pub fn from_metric(
        metric: &Metric,
        sample_count: u32,
        identifier: &str,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let (avg_points, ranking) = match metric {
            Metric::WinRate { avg_points, .. } => (Some(*avg_points), None),
            Metric::PredictionError { ranking, .. } => (None, *ranking),
        };
        Self {
            metric_kind: Some(metric.kind().to_string()),
            metric_value: Some(metric.value()),
            avg_points,
            sample_count,
            identifier: identifier.to_string(),
            timestamp,
            ranking,
            note: None,
        }
    }

    /// Reconstruct the metric, or `None` for a baseline placeholder.
    pub fn to_metric(&self) -> Option<Metric> {
        let value = self.metric_value?;
        match self.metric_kind.as_deref()? {
            "win_rate" => Some(Metric::WinRate {
                win_rate: value,
                avg_points: self.avg_points.unwrap_or(0.0),
            }),
            "prediction_error" => Some(Metric::PredictionError {
                mae: value,
                ranking: self.ranking,
            }),
            _ => None,
        }
    }
}

/// On-disk shape of `shared_parameters.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedFile {
    pub config_name: String,
    pub description: String,
    pub parameters: SharedParameters,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance_metrics: Option<PerformanceRecord>,
}

/// On-disk shape of a `horizon_<name>.json` file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HorizonFile {
    pub config_name: String,
    pub description: String,
    pub parameters: HorizonParameters,
    pub performance_metrics: PerformanceRecord,
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> HdResult<T> {
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

/// Load the five horizon baselines from a folder.
///
/// Strict: the folder, the shared file, and every horizon file must exist.
/// Each horizon's configuration merges the shared parameters with that
/// horizon's own file; no merging happens across horizons.
pub fn load_baseline_folder(folder: &Path) -> HdResult<HashMap<Horizon, ScoringConfig>> {
    if !folder.exists() {
        return Err(ConfigError::FolderMissing {
            path: folder.to_path_buf(),
        }
        .into());
    }
    if !folder.is_dir() {
        return Err(ConfigError::NotADirectory {
            path: folder.to_path_buf(),
        }
        .into());
    }

    let shared_path = folder.join(SHARED_FILE);
    if !shared_path.exists() {
        return Err(ConfigError::MissingRequiredFile {
            path: folder.to_path_buf(),
            file: SHARED_FILE.to_string(),
        }
        .into());
    }
    let shared: SharedFile = read_json(&shared_path)?;

    let mut configs = HashMap::new();
    for horizon in Horizon::ALL {
        let file_path = folder.join(horizon.file_name());
        if !file_path.exists() {
            return Err(ConfigError::MissingRequiredFile {
                path: folder.to_path_buf(),
                file: horizon.file_name(),
            }
            .into());
        }
        let horizon_file: HorizonFile = read_json(&file_path)?;
        debug!(horizon = %horizon, file = %file_path.display(), "loaded horizon baseline");

        configs.insert(
            horizon,
            ScoringConfig {
                config_name: horizon_file.config_name,
                description: horizon_file.description,
                parameters: ScoringParameters::from_parts(
                    shared.parameters,
                    horizon_file.parameters,
                ),
            },
        );
    }

    Ok(configs)
}

/// Test fixture: writes a complete baseline folder with distinguishable
/// per-horizon values.
#[cfg(test)]
pub(crate) fn write_baseline_fixture(folder: &Path) {
    let shared = SharedFile {
        config_name: "Fixture shared".to_string(),
        description: "shared parameters".to_string(),
        parameters: SharedParameters::default(),
        performance_metrics: None,
    };
    fs::write(
        folder.join(SHARED_FILE),
        serde_json::to_string_pretty(&shared).unwrap(),
    )
    .unwrap();

    for (idx, horizon) in Horizon::ALL.iter().enumerate() {
        let mut parameters = HorizonParameters::default();
        // Distinguish horizons so merge bugs are visible.
        parameters.normalization_max_scale = 100.0 + idx as f64;
        let file = HorizonFile {
            config_name: format!("Fixture {horizon}"),
            description: format!("baseline for {horizon}"),
            parameters,
            performance_metrics: PerformanceRecord::baseline_placeholder(Utc::now()),
        };
        fs::write(
            folder.join(horizon.file_name()),
            serde_json::to_string_pretty(&file).unwrap(),
        )
        .unwrap();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn loads_all_five_horizons() {
        let dir = tempdir().unwrap();
        write_baseline_fixture(dir.path());

        let configs = load_baseline_folder(dir.path()).unwrap();
        assert_eq!(configs.len(), 5);
        assert_eq!(
            configs[&Horizon::RestOfSeason]
                .parameters
                .weekly
                .normalization_max_scale,
            100.0
        );
        assert_eq!(
            configs[&Horizon::Weeks14To17]
                .parameters
                .weekly
                .normalization_max_scale,
            104.0
        );
        // Shared part is identical everywhere.
        for horizon in Horizon::ALL {
            assert_eq!(
                configs[&horizon].parameters.shared,
                SharedParameters::default()
            );
        }
    }

    #[test]
    fn missing_folder_is_fatal() {
        let dir = tempdir().unwrap();
        let result = load_baseline_folder(&dir.path().join("nope"));
        assert!(result.is_err());
    }

    #[test]
    fn missing_shared_file_is_fatal() {
        let dir = tempdir().unwrap();
        write_baseline_fixture(dir.path());
        fs::remove_file(dir.path().join(SHARED_FILE)).unwrap();
        assert!(load_baseline_folder(dir.path()).is_err());
    }

    #[test]
    fn missing_horizon_file_is_fatal_for_baselines() {
        let dir = tempdir().unwrap();
        write_baseline_fixture(dir.path());
        fs::remove_file(dir.path().join(Horizon::Weeks6To9.file_name())).unwrap();
        assert!(load_baseline_folder(dir.path()).is_err());
    }

    #[test]
    fn placeholder_record_has_mandatory_note() {
        let record = PerformanceRecord::baseline_placeholder(Utc::now());
        assert!(record.metric_value.is_none());
        assert_eq!(record.sample_count, 0);
        assert!(record.note.is_some());
        assert!(record.to_metric().is_none());
    }

    #[test]
    fn metric_round_trips_through_record() {
        let metric = Metric::WinRate {
            win_rate: 0.61,
            avg_points: 1423.5,
        };
        let record = PerformanceRecord::from_metric(&metric, 80, "cfg_03", Utc::now());
        assert_eq!(record.to_metric(), Some(metric));

        let error_metric = Metric::PredictionError {
            mae: 4.2,
            ranking: Some(RankingMetrics {
                pairwise_accuracy: 0.71,
                top_5_overlap: 0.6,
                top_10_overlap: 0.65,
                top_20_overlap: 0.7,
                rank_correlation: 0.55,
            }),
        };
        let record = PerformanceRecord::from_metric(&error_metric, 300, "cfg_07", Utc::now());
        assert_eq!(record.to_metric(), Some(error_metric));
    }
}
