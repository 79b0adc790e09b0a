//! Best-configuration tracking and checkpoint persistence.
//!
//! The results manager owns the in-memory best-per-horizon table and the
//! on-disk checkpoint folders. Checkpoints are staged under a temporary
//! name and renamed into place, so a crash or interrupt mid-write never
//! leaves a corrupt checkpoint visible to a later resume.

use chrono::Utc;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use hd_config::baseline::{HorizonFile, PerformanceRecord, SharedFile, SHARED_FILE};
use hd_types::{
    CheckpointError, ConfigPerformance, HdResult, Horizon, Metric, ScoringConfig,
    ScoringParameters,
};
use tracing::{debug, info, warn};

const CHECKPOINT_PREFIX: &str = "checkpoint_";

/// Tracks the best configuration found so far, per horizon, and persists
/// the table to resumable checkpoint folders.
#[derive(Debug, Default)]
pub struct ResultsManager {
    best: HashMap<Horizon, ConfigPerformance>,
}

impl ResultsManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one evaluated configuration. Returns whether it became the
    /// new best for the horizon. Records with zero samples never win and
    /// never displace anything.
    pub fn add_result(
        &mut self,
        horizon: Horizon,
        configuration: ScoringConfig,
        metric: Metric,
        sample_count: u32,
        identifier: &str,
    ) -> bool {
        let candidate = ConfigPerformance::new(configuration, metric, sample_count, identifier);
        if candidate.is_better_than(self.best.get(&horizon)) {
            info!(
                %horizon,
                identifier,
                metric = candidate.metric.value(),
                sample_count,
                "new best configuration"
            );
            self.best.insert(horizon, candidate);
            true
        } else {
            false
        }
    }

    pub fn best(&self, horizon: Horizon) -> Option<&ConfigPerformance> {
        self.best.get(&horizon)
    }

    pub fn bests(&self) -> &HashMap<Horizon, ConfigPerformance> {
        &self.best
    }

    /// One line per horizon for the exit report.
    pub fn summary(&self) -> String {
        let mut lines = Vec::new();
        for horizon in Horizon::ALL {
            match self.best.get(&horizon) {
                Some(perf) => lines.push(format!(
                    "  {horizon}: {} = {:.4} ({} samples, {})",
                    perf.metric.kind(),
                    perf.metric.value(),
                    perf.sample_count,
                    perf.identifier
                )),
                None => lines.push(format!("  {horizon}: no recorded best")),
            }
        }
        lines.join("\n")
    }

    /// Serialize the best-config table to a timestamped checkpoint folder.
    ///
    /// Horizons without a recorded best are populated from `baselines` with
    /// null metrics and an explanatory note, so a checkpoint never claims
    /// performance numbers it does not have. The folder appears atomically.
    pub fn save_checkpoint(
        &self,
        output_dir: &Path,
        baselines: &HashMap<Horizon, ScoringConfig>,
    ) -> HdResult<PathBuf> {
        let shared_source = baselines
            .get(&Horizon::RestOfSeason)
            .ok_or(CheckpointError::NothingToSave)?;

        fs::create_dir_all(output_dir)?;

        let now = Utc::now();
        let stamp = now.format("%Y%m%d_%H%M%S%3f").to_string();
        let mut final_path = output_dir.join(format!("{CHECKPOINT_PREFIX}{stamp}"));
        let mut suffix = 0u32;
        while final_path.exists() {
            suffix += 1;
            final_path = output_dir.join(format!("{CHECKPOINT_PREFIX}{stamp}_{suffix}"));
        }

        let stage_path = output_dir.join(format!(
            ".{}.tmp",
            final_path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("checkpoint")
        ));
        if stage_path.exists() {
            fs::remove_dir_all(&stage_path)?;
        }
        fs::create_dir_all(&stage_path)?;

        let shared = SharedFile {
            config_name: "Shared parameters".to_string(),
            description: "Horizon-independent parameters".to_string(),
            parameters: shared_source.parameters.shared,
            performance_metrics: None,
        };
        fs::write(
            stage_path.join(SHARED_FILE),
            serde_json::to_string_pretty(&shared)?,
        )?;

        for horizon in Horizon::ALL {
            let file = match self.best.get(&horizon) {
                Some(perf) => HorizonFile {
                    config_name: perf.configuration.config_name.clone(),
                    description: format!("Best configuration for horizon {horizon}"),
                    parameters: perf.configuration.parameters.weekly,
                    performance_metrics: PerformanceRecord::from_metric(
                        &perf.metric,
                        perf.sample_count,
                        &perf.identifier,
                        perf.recorded_at,
                    ),
                },
                None => {
                    let baseline = baselines
                        .get(&horizon)
                        .ok_or(CheckpointError::NothingToSave)?;
                    debug!(%horizon, "no recorded best, seeding checkpoint from baseline");
                    HorizonFile {
                        config_name: baseline.config_name.clone(),
                        description: format!(
                            "Baseline parameters for horizon {horizon} (not optimized)"
                        ),
                        parameters: baseline.parameters.weekly,
                        performance_metrics: PerformanceRecord::baseline_placeholder(now),
                    }
                }
            };
            fs::write(
                stage_path.join(horizon.file_name()),
                serde_json::to_string_pretty(&file)?,
            )?;
        }

        fs::rename(&stage_path, &final_path).map_err(|e| CheckpointError::StageFailed {
            path: final_path.clone(),
            message: e.to_string(),
        })?;
        info!(path = %final_path.display(), "checkpoint saved");
        Ok(final_path)
    }

    /// Restore the best-config table from a checkpoint folder.
    ///
    /// A missing folder or missing shared file is rejected outright.
    /// Individually missing horizon files (and baseline-seeded files with
    /// no real metrics) leave that horizon as "no prior best". Returns
    /// whether at least one horizon was restored.
    pub fn load_checkpoint(&mut self, folder: &Path) -> HdResult<bool> {
        if !folder.is_dir() {
            return Err(CheckpointError::FolderMissing {
                path: folder.to_path_buf(),
            }
            .into());
        }
        let shared_path = folder.join(SHARED_FILE);
        if !shared_path.exists() {
            return Err(CheckpointError::MissingSharedFile {
                path: folder.to_path_buf(),
            }
            .into());
        }
        let shared: SharedFile = serde_json::from_str(&fs::read_to_string(&shared_path)?)?;

        let mut restored = 0usize;
        for horizon in Horizon::ALL {
            let path = folder.join(horizon.file_name());
            if !path.exists() {
                debug!(%horizon, "horizon file absent, treating as no prior best");
                continue;
            }
            let file: HorizonFile = serde_json::from_str(&fs::read_to_string(&path)?)?;
            let record = &file.performance_metrics;

            let Some(metric) = record.to_metric() else {
                debug!(%horizon, "baseline placeholder, not restored as best");
                continue;
            };
            if record.sample_count == 0 {
                debug!(%horizon, "zero-sample record, not restored as best");
                continue;
            }

            self.best.insert(
                horizon,
                ConfigPerformance {
                    configuration: ScoringConfig {
                        config_name: file.config_name,
                        description: file.description,
                        parameters: ScoringParameters::from_parts(
                            shared.parameters,
                            file.parameters,
                        ),
                    },
                    metric,
                    sample_count: record.sample_count,
                    identifier: record.identifier.clone(),
                    recorded_at: record.timestamp,
                },
            );
            restored += 1;
        }

        info!(
            path = %folder.display(),
            restored,
            "checkpoint loaded"
        );
        Ok(restored > 0)
    }

    /// Newest checkpoint folder in `output_dir` by sortable name.
    pub fn latest_checkpoint(output_dir: &Path) -> HdResult<Option<PathBuf>> {
        if !output_dir.exists() {
            return Ok(None);
        }
        let mut folders = checkpoint_folders(output_dir)?;
        Ok(folders.pop())
    }

    /// Delete the oldest checkpoint folders so at most `max_retained - 1`
    /// remain, making room for the next save. Delete failures are logged
    /// and never block checkpoint creation.
    pub fn cleanup(output_dir: &Path, max_retained: usize) -> usize {
        let mut folders = match checkpoint_folders(output_dir) {
            Ok(folders) => folders,
            Err(e) => {
                warn!(error = %e, "checkpoint cleanup skipped");
                return 0;
            }
        };

        let mut deleted = 0usize;
        while folders.len() >= max_retained.max(1) {
            let oldest = folders.remove(0);
            match fs::remove_dir_all(&oldest) {
                Ok(()) => {
                    info!(path = %oldest.display(), "deleted old checkpoint");
                    deleted += 1;
                }
                Err(e) => {
                    warn!(path = %oldest.display(), error = %e, "failed to delete old checkpoint");
                }
            }
        }
        deleted
    }
}

fn checkpoint_folders(output_dir: &Path) -> HdResult<Vec<PathBuf>> {
    if !output_dir.exists() {
        return Ok(Vec::new());
    }
    let mut folders: Vec<PathBuf> = fs::read_dir(output_dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_dir()
                && path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|name| name.starts_with(CHECKPOINT_PREFIX))
        })
        .collect();
    folders.sort();
    Ok(folders)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn win_rate(rate: f64, points: f64) -> Metric {
        Metric::WinRate {
            win_rate: rate,
            avg_points: points,
        }
    }

    fn default_baselines() -> HashMap<Horizon, ScoringConfig> {
        Horizon::ALL
            .iter()
            .map(|&h| (h, ScoringConfig::default()))
            .collect()
    }

    #[test]
    fn add_result_tracks_best_per_horizon() {
        let mut manager = ResultsManager::new();
        let config = ScoringConfig::default();

        assert!(manager.add_result(
            Horizon::RestOfSeason,
            config.clone(),
            win_rate(0.50, 1400.0),
            80,
            "baseline"
        ));
        assert!(!manager.add_result(
            Horizon::RestOfSeason,
            config.clone(),
            win_rate(0.48, 1500.0),
            80,
            "worse"
        ));
        assert!(manager.add_result(
            Horizon::RestOfSeason,
            config.clone(),
            win_rate(0.61, 1350.0),
            80,
            "better"
        ));
        assert_eq!(
            manager.best(Horizon::RestOfSeason).unwrap().identifier,
            "better"
        );
        // Other horizons untouched.
        assert!(manager.best(Horizon::Weeks1To5).is_none());
    }

    #[test]
    fn zero_sample_records_never_recorded() {
        let mut manager = ResultsManager::new();
        assert!(!manager.add_result(
            Horizon::Weeks6To9,
            ScoringConfig::default(),
            win_rate(0.99, 9999.0),
            0,
            "invalid"
        ));
        assert!(manager.best(Horizon::Weeks6To9).is_none());
    }

    #[test]
    fn checkpoint_round_trip_restores_bests() {
        let dir = tempdir().unwrap();
        let baselines = default_baselines();
        let mut manager = ResultsManager::new();

        let mut tuned = ScoringConfig::default();
        tuned.parameters.weekly.normalization_max_scale = 160.0;
        tuned.parameters.shared.adp_scoring.weight = 2.75;
        manager.add_result(
            Horizon::RestOfSeason,
            tuned.clone(),
            win_rate(0.58, 1410.0),
            120,
            "cfg_ros",
        );
        manager.add_result(
            Horizon::Weeks1To5,
            tuned.clone(),
            win_rate(0.64, 402.0),
            120,
            "cfg_early",
        );

        let path = manager.save_checkpoint(dir.path(), &baselines).unwrap();
        assert!(path.is_dir());
        assert!(path.join(SHARED_FILE).exists());
        for horizon in Horizon::ALL {
            assert!(path.join(horizon.file_name()).exists());
        }

        let mut reloaded = ResultsManager::new();
        assert!(reloaded.load_checkpoint(&path).unwrap());
        assert_eq!(reloaded.bests().len(), 2);

        let restored = reloaded.best(Horizon::RestOfSeason).unwrap();
        assert_eq!(restored.metric, win_rate(0.58, 1410.0));
        assert_eq!(restored.sample_count, 120);
        assert_eq!(
            restored
                .configuration
                .parameters
                .weekly
                .normalization_max_scale,
            160.0
        );
        // Shared parameters come back from the shared file. The tuned shared
        // value was not adopted into the baselines, so the checkpoint carries
        // the baseline shared part.
        assert_eq!(
            restored.configuration.parameters.shared,
            baselines[&Horizon::RestOfSeason].parameters.shared
        );
    }

    #[test]
    fn unoptimized_horizons_are_flagged_not_faked() {
        let dir = tempdir().unwrap();
        let baselines = default_baselines();
        let mut manager = ResultsManager::new();
        manager.add_result(
            Horizon::RestOfSeason,
            ScoringConfig::default(),
            win_rate(0.52, 1390.0),
            60,
            "cfg",
        );

        let path = manager.save_checkpoint(dir.path(), &baselines).unwrap();
        let raw = fs::read_to_string(path.join(Horizon::Weeks10To13.file_name())).unwrap();
        let file: HorizonFile = serde_json::from_str(&raw).unwrap();
        assert!(file.performance_metrics.metric_value.is_none());
        assert_eq!(file.performance_metrics.sample_count, 0);
        assert!(file.performance_metrics.note.is_some());
    }

    #[test]
    fn loading_partial_checkpoint_restores_what_exists() {
        let dir = tempdir().unwrap();
        let baselines = default_baselines();
        let mut manager = ResultsManager::new();
        for horizon in [Horizon::RestOfSeason, Horizon::Weeks1To5, Horizon::Weeks6To9] {
            manager.add_result(
                horizon,
                ScoringConfig::default(),
                win_rate(0.55, 1300.0),
                40,
                "cfg",
            );
        }
        let path = manager.save_checkpoint(dir.path(), &baselines).unwrap();

        // Drop two horizon files entirely.
        fs::remove_file(path.join(Horizon::Weeks10To13.file_name())).unwrap();
        fs::remove_file(path.join(Horizon::Weeks14To17.file_name())).unwrap();

        let mut reloaded = ResultsManager::new();
        assert!(reloaded.load_checkpoint(&path).unwrap());
        assert_eq!(reloaded.bests().len(), 3);
        assert!(reloaded.best(Horizon::Weeks10To13).is_none());
        assert!(reloaded.best(Horizon::Weeks14To17).is_none());
    }

    #[test]
    fn missing_shared_file_rejected() {
        let dir = tempdir().unwrap();
        let baselines = default_baselines();
        let manager = ResultsManager::new();
        let path = manager.save_checkpoint(dir.path(), &baselines).unwrap();
        fs::remove_file(path.join(SHARED_FILE)).unwrap();

        let mut reloaded = ResultsManager::new();
        assert!(reloaded.load_checkpoint(&path).is_err());
    }

    #[test]
    fn missing_folder_rejected() {
        let dir = tempdir().unwrap();
        let mut manager = ResultsManager::new();
        assert!(manager
            .load_checkpoint(&dir.path().join("checkpoint_nope"))
            .is_err());
    }

    #[test]
    fn all_placeholder_checkpoint_loads_nothing() {
        let dir = tempdir().unwrap();
        let baselines = default_baselines();
        let manager = ResultsManager::new();
        let path = manager.save_checkpoint(dir.path(), &baselines).unwrap();

        let mut reloaded = ResultsManager::new();
        assert!(!reloaded.load_checkpoint(&path).unwrap());
        assert!(reloaded.bests().is_empty());
    }

    #[test]
    fn latest_checkpoint_picks_newest_by_name() {
        let dir = tempdir().unwrap();
        for name in [
            "checkpoint_20240101_000000000",
            "checkpoint_20250301_120000000",
            "checkpoint_20240901_060000000",
        ] {
            fs::create_dir(dir.path().join(name)).unwrap();
        }
        fs::create_dir(dir.path().join("not_a_checkpoint")).unwrap();

        let latest = ResultsManager::latest_checkpoint(dir.path()).unwrap().unwrap();
        assert!(latest.ends_with("checkpoint_20250301_120000000"));
    }

    #[test]
    fn cleanup_deletes_oldest_beyond_retention() {
        let dir = tempdir().unwrap();
        for idx in 0..6 {
            fs::create_dir(dir.path().join(format!("checkpoint_2024010{idx}_000000000"))).unwrap();
        }

        let deleted = ResultsManager::cleanup(dir.path(), 4);
        assert_eq!(deleted, 3);

        let remaining = checkpoint_folders(dir.path()).unwrap();
        assert_eq!(remaining.len(), 3);
        // The newest folders survive.
        assert!(remaining[0].ends_with("checkpoint_20240103_000000000"));
        assert!(remaining[2].ends_with("checkpoint_20240105_000000000"));
    }

    #[test]
    fn cleanup_of_missing_dir_is_a_noop() {
        let dir = tempdir().unwrap();
        assert_eq!(ResultsManager::cleanup(&dir.path().join("nothing"), 3), 0);
    }

    #[test]
    fn no_stage_folder_left_behind() {
        let dir = tempdir().unwrap();
        let baselines = default_baselines();
        let manager = ResultsManager::new();
        manager.save_checkpoint(dir.path(), &baselines).unwrap();

        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }
}
