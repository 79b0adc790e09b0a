//! # hd-optimizer
//!
//! The coordinate-wise optimization core: a bounded worker pool that fans
//! season simulations out and back in, a results manager that tracks the
//! best configuration per horizon and persists resumable checkpoints, the
//! accuracy/ranking metrics for prediction-error optimization, and the
//! iterative driver that ties it all together.

pub mod accuracy;
pub mod driver;
pub mod results;
pub mod runner;

pub use accuracy::{
    evaluate_projections, AccuracyReport, DeviationAdjustedProjection, PassthroughProjection,
    ProjectionModel,
};
pub use driver::{
    AccuracyEvaluator, CandidateEvaluator, DriverSettings, ModeFilter, OptimizationDriver,
    RunSummary, WinRateEvaluator,
};
pub use results::ResultsManager;
pub use runner::{
    CancelHandle, ParallelRunner, ProgressEvent, RunnerSettings, UnitOutcome, UnitReport,
};
