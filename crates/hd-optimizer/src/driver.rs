//! Iterative coordinate-wise optimization driver.
//!
//! One parameter at a time: generate candidate values (baseline first),
//! evaluate every candidate, record the best per horizon, adopt the winner
//! into the baselines, checkpoint, move on. The loop runs a fixed cycle
//! budget and is safely interruptible at every parameter boundary; there is
//! deliberately no automatic convergence detection.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;
use std::path::PathBuf;
use uuid::Uuid;

use hd_config::{CandidateGenerator, HorizonCandidates, PARAMETERS};
use hd_sim::SeasonDataSet;
use hd_types::{HdResult, Horizon, Metric, PlayerId, ScoringConfig};
use tracing::{info, info_span, warn};

use crate::accuracy::{evaluate_projections, ProjectionModel};
use crate::results::ResultsManager;
use crate::runner::{CancelHandle, ParallelRunner};

/// Which horizons the optimizer touches for horizon-specific parameters.
/// Shared parameters are always optimized (they must stay synchronized).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeFilter {
    RestOfSeason,
    Weekly,
    Both,
}

impl ModeFilter {
    pub fn horizons(&self) -> &'static [Horizon] {
        const ROS: [Horizon; 1] = [Horizon::RestOfSeason];
        match self {
            ModeFilter::RestOfSeason => &ROS,
            ModeFilter::Weekly => &Horizon::WEEKLY,
            ModeFilter::Both => &Horizon::ALL,
        }
    }
}

impl std::str::FromStr for ModeFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ros" => Ok(ModeFilter::RestOfSeason),
            "weekly" => Ok(ModeFilter::Weekly),
            "both" => Ok(ModeFilter::Both),
            other => Err(format!("unknown mode: {other} (expected ros|weekly|both)")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DriverSettings {
    pub output_dir: PathBuf,
    pub mode: ModeFilter,
    /// Full passes over the parameter list before stopping.
    pub max_cycles: usize,
    /// Checkpoint folders retained in the output directory.
    pub checkpoint_retention: usize,
}

impl Default for DriverSettings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("optimal_configs"),
            mode: ModeFilter::Both,
            max_cycles: 1,
            checkpoint_retention: 5,
        }
    }
}

/// Candidate evaluation seam. Implementations turn one configuration into a
/// fitness metric; the driver never cares how.
pub trait CandidateEvaluator: Sync {
    /// Evaluate over the full season, returning one (metric, samples) pair
    /// per horizon: overall for rest-of-season, per week range otherwise.
    fn evaluate_full(&self, config: &ScoringConfig) -> HdResult<HashMap<Horizon, (Metric, u32)>>;

    /// Evaluate over a single horizon's week range only.
    fn evaluate_horizon(&self, config: &ScoringConfig, horizon: Horizon)
        -> HdResult<(Metric, u32)>;
}

/// Final report of one optimization run.
#[derive(Debug)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub cycles_completed: usize,
    pub parameters_optimized: usize,
    pub cancelled: bool,
    pub last_checkpoint: Option<PathBuf>,
    pub best_summary: String,
}

impl RunSummary {
    pub fn report(&self) -> String {
        let checkpoint = self
            .last_checkpoint
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "none".to_string());
        format!(
            "run {}: {} parameter batches across {} cycle(s){}\nlast checkpoint: {}\nbest per horizon:\n{}",
            self.run_id,
            self.parameters_optimized,
            self.cycles_completed,
            if self.cancelled { " (interrupted)" } else { "" },
            checkpoint,
            self.best_summary
        )
    }
}

pub struct OptimizationDriver<'a, E: CandidateEvaluator> {
    generator: CandidateGenerator,
    evaluator: &'a E,
    results: ResultsManager,
    settings: DriverSettings,
    cancel: CancelHandle,
    run_id: Uuid,
    rng: ChaCha8Rng,
}

impl<'a, E: CandidateEvaluator> OptimizationDriver<'a, E> {
    pub fn new(
        generator: CandidateGenerator,
        evaluator: &'a E,
        settings: DriverSettings,
        seed: u64,
    ) -> Self {
        Self {
            generator,
            evaluator,
            results: ResultsManager::new(),
            settings,
            cancel: CancelHandle::new(),
            run_id: Uuid::new_v4(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Handle for operator-requested aborts; honored at parameter
    /// boundaries so checkpoints stay consistent.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    pub fn results(&self) -> &ResultsManager {
        &self.results
    }

    pub fn generator(&self) -> &CandidateGenerator {
        &self.generator
    }

    /// Restore the best-config table from the newest checkpoint in the
    /// output directory, if any. Baselines are whatever the generator was
    /// built from; pass the checkpoint folder there to fully resume.
    pub fn resume_from_latest(&mut self) -> HdResult<Option<PathBuf>> {
        let Some(path) = ResultsManager::latest_checkpoint(&self.settings.output_dir)? else {
            return Ok(None);
        };
        let restored = self.results.load_checkpoint(&path)?;
        info!(path = %path.display(), restored, "resumed from checkpoint");
        Ok(Some(path))
    }

    /// Run the coordinate loop to its cycle budget (or cancellation) and
    /// report the final checkpoint and best metrics per horizon.
    pub fn run(&mut self) -> HdResult<RunSummary> {
        let span = info_span!("optimization_run", run_id = %self.run_id);
        let _guard = span.enter();

        let mut parameters_optimized = 0usize;
        let mut cycles_completed = 0usize;
        let mut last_checkpoint = None;
        let mut cancelled = false;

        'cycles: for cycle in 0..self.settings.max_cycles {
            info!(cycle, total = self.settings.max_cycles, "starting cycle");
            for def in &PARAMETERS {
                if self.cancel.is_cancelled() {
                    info!(param = def.name, "cancelled before parameter, stopping");
                    cancelled = true;
                    break 'cycles;
                }

                info!(param = def.name, "optimizing parameter");
                self.optimize_parameter(def.name)?;
                parameters_optimized += 1;

                ResultsManager::cleanup(
                    &self.settings.output_dir,
                    self.settings.checkpoint_retention,
                );
                let path = self
                    .results
                    .save_checkpoint(&self.settings.output_dir, self.generator.baselines())?;
                last_checkpoint = Some(path);
            }
            cycles_completed = cycle + 1;
        }

        let summary = RunSummary {
            run_id: self.run_id,
            cycles_completed,
            parameters_optimized,
            cancelled,
            last_checkpoint,
            best_summary: self.results.summary(),
        };
        info!(
            parameters_optimized,
            cycles_completed, cancelled, "optimization run finished"
        );
        Ok(summary)
    }

    /// One coordinate step: evaluate all candidates for one parameter and
    /// adopt the winner. Public so a run can be driven parameter-by-
    /// parameter (the checkpoint boundary) by external schedulers.
    pub fn optimize_parameter(&mut self, param: &str) -> HdResult<()> {
        match self.generator.horizon_candidates(&mut self.rng, param)? {
            HorizonCandidates::Shared(values) => self.optimize_shared(param, &values),
            HorizonCandidates::PerHorizon(per_horizon) => {
                for &horizon in self.settings.mode.horizons() {
                    let Some(values) = per_horizon.get(&horizon) else {
                        continue;
                    };
                    self.optimize_for_horizon(param, horizon, values)?;
                }
                Ok(())
            }
        }
    }

    /// Shared parameter: each candidate is simulated once over the full
    /// season, the outcome is recorded per horizon, and the overall metric
    /// decides which value every horizon adopts.
    fn optimize_shared(&mut self, param: &str, values: &[f64]) -> HdResult<()> {
        let mut adopted: Option<(f64, Metric)> = None;

        for (idx, &value) in values.iter().enumerate() {
            let identifier = format!("{param}[{idx}]");
            let probe = self
                .generator
                .apply_candidate(Horizon::RestOfSeason, param, value)?;

            let metrics = match self.evaluator.evaluate_full(&probe) {
                Ok(metrics) => metrics,
                Err(e) => {
                    warn!(param, value, error = %e, "candidate failed, excluded from comparison");
                    continue;
                }
            };

            for horizon in Horizon::ALL {
                let Some(&(metric, samples)) = metrics.get(&horizon) else {
                    continue;
                };
                let config = self.generator.apply_candidate(horizon, param, value)?;
                self.results
                    .add_result(horizon, config, metric, samples, &identifier);
            }

            if let Some(&(metric, samples)) = metrics.get(&Horizon::RestOfSeason) {
                let wins = samples > 0
                    && adopted
                        .as_ref()
                        .map_or(true, |(_, best)| metric.beats(best));
                if wins {
                    adopted = Some((value, metric));
                }
            }
        }

        match adopted {
            Some((value, metric)) => {
                self.generator
                    .adopt_value(Horizon::RestOfSeason, param, value)?;
                info!(
                    param,
                    value,
                    metric = metric.value(),
                    "adopted shared value across all horizons"
                );
            }
            None => warn!(param, "no candidate produced a valid result; baseline kept"),
        }
        Ok(())
    }

    /// Horizon-specific parameter: candidates are evaluated over that
    /// horizon's week range only, and only that horizon's baseline moves.
    fn optimize_for_horizon(
        &mut self,
        param: &str,
        horizon: Horizon,
        values: &[f64],
    ) -> HdResult<()> {
        let mut adopted: Option<(f64, Metric)> = None;

        for (idx, &value) in values.iter().enumerate() {
            let identifier = format!("{param}[{idx}]@{horizon}");
            let config = self.generator.apply_candidate(horizon, param, value)?;

            let (metric, samples) = match self.evaluator.evaluate_horizon(&config, horizon) {
                Ok(result) => result,
                Err(e) => {
                    warn!(param, value, %horizon, error = %e, "candidate failed, excluded from comparison");
                    continue;
                }
            };

            self.results
                .add_result(horizon, config, metric, samples, &identifier);

            let wins = samples > 0
                && adopted
                    .as_ref()
                    .map_or(true, |(_, best)| metric.beats(best));
            if wins {
                adopted = Some((value, metric));
            }
        }

        match adopted {
            Some((value, metric)) => {
                self.generator.adopt_value(horizon, param, value)?;
                info!(
                    param,
                    value,
                    %horizon,
                    metric = metric.value(),
                    "adopted horizon value"
                );
            }
            None => {
                warn!(param, %horizon, "no candidate produced a valid result; baseline kept")
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Production evaluators
// ---------------------------------------------------------------------------

/// Win-rate fitness: runs parallel season batches and aggregates the
/// tracked team's record. Index 0 of the assembled league is the team the
/// configuration under test drives.
pub struct WinRateEvaluator {
    runner: ParallelRunner,
    sources: Vec<SeasonDataSet>,
    simulations_per_candidate: usize,
}

const TRACKED_TEAM: usize = 0;

impl WinRateEvaluator {
    pub fn new(
        runner: ParallelRunner,
        sources: Vec<SeasonDataSet>,
        simulations_per_candidate: usize,
    ) -> Self {
        Self {
            runner,
            sources,
            simulations_per_candidate,
        }
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.runner.cancel_handle()
    }
}

#[derive(Default)]
struct Tally {
    wins: u32,
    games: u32,
    points: f64,
}

impl Tally {
    fn record(&mut self, won: bool, points: f64) {
        if won {
            self.wins += 1;
        }
        self.games += 1;
        self.points += points;
    }

    fn metric(&self, completed_units: u32) -> (Metric, u32) {
        if self.games == 0 || completed_units == 0 {
            return (
                Metric::WinRate {
                    win_rate: 0.0,
                    avg_points: 0.0,
                },
                0,
            );
        }
        (
            Metric::WinRate {
                win_rate: f64::from(self.wins) / f64::from(self.games),
                avg_points: self.points / f64::from(completed_units),
            },
            completed_units,
        )
    }
}

impl CandidateEvaluator for WinRateEvaluator {
    fn evaluate_full(&self, config: &ScoringConfig) -> HdResult<HashMap<Horizon, (Metric, u32)>> {
        let reports = self.runner.run_batch(
            config,
            self.simulations_per_candidate,
            &self.sources,
            1..=17,
        )?;

        let mut completed_units = 0u32;
        let mut tallies: HashMap<Horizon, Tally> = HashMap::new();
        for report in &reports {
            let Some(outcomes) = report.completed() else {
                continue;
            };
            completed_units += 1;
            for outcome in outcomes {
                let Some(won) = outcome.won_by(TRACKED_TEAM) else {
                    continue;
                };
                let points = outcome.points_for(TRACKED_TEAM).unwrap_or(0.0);
                tallies
                    .entry(Horizon::RestOfSeason)
                    .or_default()
                    .record(won, points);
                if let Ok(weekly) = Horizon::for_week(outcome.week) {
                    tallies.entry(weekly).or_default().record(won, points);
                }
            }
        }

        let mut metrics = HashMap::new();
        for horizon in Horizon::ALL {
            let tally = tallies.remove(&horizon).unwrap_or_default();
            metrics.insert(horizon, tally.metric(completed_units));
        }
        Ok(metrics)
    }

    fn evaluate_horizon(
        &self,
        config: &ScoringConfig,
        horizon: Horizon,
    ) -> HdResult<(Metric, u32)> {
        let (start, end) = horizon.week_range();
        let reports = self.runner.run_batch(
            config,
            self.simulations_per_candidate,
            &self.sources,
            start..=end,
        )?;

        let mut completed_units = 0u32;
        let mut tally = Tally::default();
        for report in &reports {
            let Some(outcomes) = report.completed() else {
                continue;
            };
            completed_units += 1;
            for outcome in outcomes {
                if let Some(won) = outcome.won_by(TRACKED_TEAM) {
                    tally.record(won, outcome.points_for(TRACKED_TEAM).unwrap_or(0.0));
                }
            }
        }
        Ok(tally.metric(completed_units))
    }
}

/// Prediction-error fitness: measures how well the configuration-driven
/// projections rank real outcomes, per horizon week range.
pub struct AccuracyEvaluator<M: ProjectionModel> {
    model: M,
    sources: Vec<SeasonDataSet>,
}

impl<M: ProjectionModel> AccuracyEvaluator<M> {
    pub fn new(model: M, sources: Vec<SeasonDataSet>) -> Self {
        Self { model, sources }
    }
}

impl<M: ProjectionModel> CandidateEvaluator for AccuracyEvaluator<M> {
    fn evaluate_full(&self, config: &ScoringConfig) -> HdResult<HashMap<Horizon, (Metric, u32)>> {
        let mut metrics = HashMap::new();
        for horizon in Horizon::ALL {
            metrics.insert(horizon, self.evaluate_horizon(config, horizon)?);
        }
        Ok(metrics)
    }

    fn evaluate_horizon(
        &self,
        config: &ScoringConfig,
        horizon: Horizon,
    ) -> HdResult<(Metric, u32)> {
        let (start, end) = horizon.week_range();

        let mut total_error = 0.0;
        let mut samples = 0u32;
        let mut ranking_sum = hd_types::RankingMetrics {
            pairwise_accuracy: 0.0,
            top_5_overlap: 0.0,
            top_10_overlap: 0.0,
            top_20_overlap: 0.0,
            rank_correlation: 0.0,
        };
        let mut weighted = 0u32;

        for source in &self.sources {
            let mut players: Vec<PlayerId> = source.players().map(|p| p.id).collect();
            players.sort_unstable();
            let report = evaluate_projections(
                &self.model,
                &config.parameters,
                source,
                &players,
                start..=end,
            );
            if report.sample_count == 0 {
                continue;
            }
            total_error += report.total_error;
            samples += report.sample_count;
            let w = f64::from(report.sample_count);
            ranking_sum.pairwise_accuracy += report.ranking.pairwise_accuracy * w;
            ranking_sum.top_5_overlap += report.ranking.top_5_overlap * w;
            ranking_sum.top_10_overlap += report.ranking.top_10_overlap * w;
            ranking_sum.top_20_overlap += report.ranking.top_20_overlap * w;
            ranking_sum.rank_correlation += report.ranking.rank_correlation * w;
            weighted += report.sample_count;
        }

        if samples == 0 {
            return Ok((
                Metric::PredictionError {
                    mae: 0.0,
                    ranking: None,
                },
                0,
            ));
        }

        let w = f64::from(weighted);
        Ok((
            Metric::PredictionError {
                mae: total_error / f64::from(samples),
                ranking: Some(hd_types::RankingMetrics {
                    pairwise_accuracy: ranking_sum.pairwise_accuracy / w,
                    top_5_overlap: ranking_sum.top_5_overlap / w,
                    top_10_overlap: ranking_sum.top_10_overlap / w,
                    top_20_overlap: ranking_sum.top_20_overlap / w,
                    rank_correlation: ranking_sum.rank_correlation / w,
                }),
            },
            samples,
        ))
    }
}
