//! # hd-config
//!
//! Parameter schema and configuration generation for the huddle
//! optimization engine.
//!
//! Provides the static table of tunable parameters (bounds, precision,
//! shared/per-horizon scope), discrete candidate-value generation, baseline
//! folder loading, and the apply-candidate operation that stamps one
//! proposed value into a deep copy of a baseline configuration.

pub mod baseline;
pub mod generator;
pub mod schema;

pub use baseline::{load_baseline_folder, HorizonFile, PerformanceRecord, SharedFile, SHARED_FILE};
pub use generator::{CandidateGenerator, HorizonCandidates};
pub use schema::{ParamScope, ParameterDef, Precision, PARAMETERS};
