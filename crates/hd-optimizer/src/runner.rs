//! Parallel season runner.
//!
//! A pure fan-out/fan-in primitive: N independent season replays are
//! submitted to a bounded rayon pool and collected back in submission order,
//! regardless of completion order, so downstream aggregation is
//! deterministic for a fixed base seed. Every unit owns a deep copy of the
//! configuration and its own seeded RNG; workers share no mutable state.

use crossbeam_channel::Sender;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use std::ops::RangeInclusive;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use hd_sim::{assemble_league, SeasonDataSet, SeasonSimulator, SlotLineupSelector};
use hd_types::{HdError, HdResult, ScoringConfig, SimError, WeeklyMatchupOutcome};
use tracing::{debug, warn};

/// Shared flag for operator-requested aborts. Cancelling stops new unit
/// submission; in-flight units finish so no partial state is torn down.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Emitted once per finished unit when a progress sender is attached.
#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub unit: usize,
    pub total: usize,
    pub source: String,
}

/// What happened to one unit of work. Failures are values, not exceptions:
/// the batch driver aggregates them without unwinding.
#[derive(Debug, Clone)]
pub enum UnitOutcome {
    Completed(Vec<WeeklyMatchupOutcome>),
    Failed(String),
    Cancelled,
}

/// Report for one unit, in submission order.
#[derive(Debug, Clone)]
pub struct UnitReport {
    pub unit: usize,
    pub source: String,
    pub outcome: UnitOutcome,
}

impl UnitReport {
    pub fn completed(&self) -> Option<&[WeeklyMatchupOutcome]> {
        match &self.outcome {
            UnitOutcome::Completed(outcomes) => Some(outcomes),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunnerSettings {
    /// Fixed worker-pool size.
    pub workers: usize,
    pub league_size: usize,
    pub roster_size: usize,
    /// Base seed; each unit derives its own RNG from this and its index.
    pub base_seed: u64,
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self {
            workers: 4,
            league_size: 10,
            roster_size: 15,
            base_seed: 0,
        }
    }
}

pub struct ParallelRunner {
    pool: rayon::ThreadPool,
    settings: RunnerSettings,
    progress: Option<Sender<ProgressEvent>>,
    cancel: CancelHandle,
}

impl ParallelRunner {
    pub fn new(settings: RunnerSettings) -> HdResult<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(settings.workers.max(1))
            .build()
            .map_err(|e| HdError::Internal(format!("failed to build worker pool: {e}")))?;
        debug!(workers = settings.workers, "parallel runner initialized");
        Ok(Self {
            pool,
            settings,
            progress: None,
            cancel: CancelHandle::new(),
        })
    }

    /// Attach a progress sender; one event per finished unit.
    pub fn with_progress(mut self, sender: Sender<ProgressEvent>) -> Self {
        self.progress = Some(sender);
        self
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Run `simulation_count` independent season replays per data source and
    /// return one report per unit in submission order. Already-completed
    /// units survive a cancellation; cancelled units are marked as such.
    pub fn run_batch(
        &self,
        config: &ScoringConfig,
        simulation_count: usize,
        sources: &[SeasonDataSet],
        weeks: RangeInclusive<u8>,
    ) -> HdResult<Vec<UnitReport>> {
        if sources.is_empty() {
            return Err(SimError::NoDataSources.into());
        }

        let units: Vec<(usize, &SeasonDataSet)> = sources
            .iter()
            .flat_map(|source| std::iter::repeat(source).take(simulation_count))
            .enumerate()
            .collect();
        let total = units.len();

        let reports: Vec<UnitReport> = self.pool.install(|| {
            units
                .into_par_iter()
                .map(|(unit, source)| {
                    if self.cancel.is_cancelled() {
                        return UnitReport {
                            unit,
                            source: source.label.clone(),
                            outcome: UnitOutcome::Cancelled,
                        };
                    }

                    let report = self.run_unit(config, source, unit, weeks.clone());
                    if let Some(sender) = &self.progress {
                        let _ = sender.send(ProgressEvent {
                            unit,
                            total,
                            source: source.label.clone(),
                        });
                    }
                    report
                })
                .collect()
        });

        let completed = reports.iter().filter(|r| r.completed().is_some()).count();
        debug!(total, completed, "batch finished");
        Ok(reports)
    }

    fn run_unit(
        &self,
        config: &ScoringConfig,
        source: &SeasonDataSet,
        unit: usize,
        weeks: RangeInclusive<u8>,
    ) -> UnitReport {
        // Own copy of the configuration and an independent RNG stream.
        let config = config.clone();
        let mut rng = ChaCha8Rng::seed_from_u64(
            self.settings
                .base_seed
                .wrapping_add((unit as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)),
        );

        let outcome = match assemble_league(
            &mut rng,
            source,
            self.settings.league_size,
            self.settings.roster_size,
        ) {
            Ok(rosters) => {
                let selector = SlotLineupSelector::default();
                let simulator = SeasonSimulator::new(&selector, source);
                match simulator.simulate_season(&mut rng, &rosters, &config, weeks) {
                    Ok(outcomes) => UnitOutcome::Completed(outcomes),
                    Err(e) => {
                        warn!(unit, error = %e, "season simulation failed");
                        UnitOutcome::Failed(e.to_string())
                    }
                }
            }
            Err(e) => {
                warn!(unit, error = %e, "league assembly failed");
                UnitOutcome::Failed(e.to_string())
            }
        };

        UnitReport {
            unit,
            source: source.label.clone(),
            outcome,
        }
    }
}
