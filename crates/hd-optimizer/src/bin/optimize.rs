//! Iterative optimization CLI.
//!
//! Thin wrapper over the driver: picks a baseline (explicit folder or the
//! most recent checkpoint in the output directory), loads the historical
//! season datasets, and runs the coordinate loop. Exit code 0 on
//! completion, non-zero on unrecoverable setup failure.

use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use hd_config::CandidateGenerator;
use hd_optimizer::{
    DriverSettings, ModeFilter, OptimizationDriver, ParallelRunner, ProgressEvent, ResultsManager,
    RunnerSettings, WinRateEvaluator,
};
use hd_sim::{discover_seasons, SeasonDataSet};

struct Args {
    mode: ModeFilter,
    baseline: Option<PathBuf>,
    output: PathBuf,
    data: PathBuf,
    workers: usize,
    test_values: usize,
    simulations: usize,
    cycles: usize,
    seed: u64,
}

impl Args {
    fn parse() -> Result<Self> {
        let mut args = Args {
            mode: ModeFilter::Both,
            baseline: None,
            output: PathBuf::from("optimal_configs"),
            data: PathBuf::from("sim_data"),
            workers: 4,
            test_values: 5,
            simulations: 25,
            cycles: 1,
            seed: 0,
        };

        let mut iter = std::env::args().skip(1);
        while let Some(flag) = iter.next() {
            let mut value = |name: &str| {
                iter.next()
                    .with_context(|| format!("missing value for {name}"))
            };
            match flag.as_str() {
                "--mode" => args.mode = value("--mode")?.parse().map_err(anyhow::Error::msg)?,
                "--baseline" => args.baseline = Some(PathBuf::from(value("--baseline")?)),
                "--output" => args.output = PathBuf::from(value("--output")?),
                "--data" => args.data = PathBuf::from(value("--data")?),
                "--workers" => args.workers = value("--workers")?.parse()?,
                "--test-values" => args.test_values = value("--test-values")?.parse()?,
                "--sims" => args.simulations = value("--sims")?.parse()?,
                "--cycles" => args.cycles = value("--cycles")?.parse()?,
                "--seed" => args.seed = value("--seed")?.parse()?,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                other => bail!("unknown flag: {other} (try --help)"),
            }
        }
        Ok(args)
    }
}

fn print_usage() {
    println!(
        "hd-optimize [--mode ros|weekly|both] [--baseline DIR] [--output DIR] [--data DIR]\n\
         \x20           [--workers N] [--test-values N] [--sims N] [--cycles N] [--seed N]\n\
         \n\
         Without --baseline, the most recent checkpoint in the output directory\n\
         is used and the run resumes from it."
    );
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse()?;

    // Baseline: explicit folder, or the newest checkpoint in the output dir.
    let (baseline, resuming) = match args.baseline {
        Some(path) => (path, false),
        None => match ResultsManager::latest_checkpoint(&args.output)? {
            Some(path) => {
                info!(path = %path.display(), "no baseline given, resuming from latest checkpoint");
                (path, true)
            }
            None => bail!(
                "no baseline folder given and no checkpoint found in {}",
                args.output.display()
            ),
        },
    };

    let generator = CandidateGenerator::from_folder(&baseline, args.test_values)
        .with_context(|| format!("loading baseline from {}", baseline.display()))?;

    // Historical season data: one folder per season.
    let season_folders = discover_seasons(&args.data)
        .with_context(|| format!("scanning data directory {}", args.data.display()))?;
    if season_folders.is_empty() {
        bail!("no season folders found in {}", args.data.display());
    }
    let mut sources = Vec::new();
    for folder in &season_folders {
        sources.push(
            SeasonDataSet::from_folder(folder)
                .with_context(|| format!("loading season data from {}", folder.display()))?,
        );
    }
    info!(seasons = sources.len(), "season datasets loaded");

    let (progress_tx, progress_rx) = crossbeam_channel::unbounded::<ProgressEvent>();
    std::thread::spawn(move || {
        let mut finished = 0usize;
        for event in progress_rx {
            finished += 1;
            if finished % 25 == 0 {
                info!(
                    finished,
                    batch_total = event.total,
                    source = %event.source,
                    "simulation progress"
                );
            }
        }
    });

    let runner = ParallelRunner::new(RunnerSettings {
        workers: args.workers,
        base_seed: args.seed,
        ..RunnerSettings::default()
    })?
    .with_progress(progress_tx);

    let evaluator = WinRateEvaluator::new(runner, sources, args.simulations);
    let mut driver = OptimizationDriver::new(
        generator,
        &evaluator,
        DriverSettings {
            output_dir: args.output.clone(),
            mode: args.mode,
            max_cycles: args.cycles,
            checkpoint_retention: 5,
        },
        args.seed,
    );

    if resuming {
        match driver.resume_from_latest() {
            Ok(Some(_)) => {}
            Ok(None) => {}
            Err(e) => warn!(error = %e, "could not restore prior bests, continuing fresh"),
        }
    }

    let summary = driver.run()?;
    println!("{}", summary.report());
    Ok(())
}
