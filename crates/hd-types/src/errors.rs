use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the huddle system
#[derive(Error, Debug)]
pub enum HdError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Simulation error: {0}")]
    Sim(#[from] SimError),

    #[error("Checkpoint error: {0}")]
    Checkpoint(#[from] CheckpointError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Parameter-schema and baseline-loading errors. These are setup errors:
/// they surface to the operator and halt the run, never retried.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unknown parameter: {name}")]
    UnknownParameter { name: String },

    #[error("Unknown horizon: {name}")]
    UnknownHorizon { name: String },

    #[error("No baseline configuration loaded for horizon {horizon}")]
    MissingBaseline { horizon: String },

    #[error("Baseline folder does not exist: {path}")]
    FolderMissing { path: PathBuf },

    #[error("Baseline path is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("Missing required file {file} in {path}")]
    MissingRequiredFile { path: PathBuf, file: String },

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },
}

/// Season-simulation errors
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid week number: {week} (must be 1-17)")]
    InvalidWeek { week: u8 },

    #[error("League has no teams")]
    EmptyLeague,

    #[error("No season data sources provided")]
    NoDataSources,

    #[error("Data loading failed: {message}")]
    DataLoadFailed { message: String },
}

/// Checkpoint persistence errors
#[derive(Error, Debug)]
pub enum CheckpointError {
    #[error("Checkpoint folder does not exist: {path}")]
    FolderMissing { path: PathBuf },

    #[error("Checkpoint folder is missing shared_parameters.json: {path}")]
    MissingSharedFile { path: PathBuf },

    #[error("Failed to stage checkpoint at {path}: {message}")]
    StageFailed { path: PathBuf, message: String },

    #[error("Nothing to checkpoint: no baselines available")]
    NothingToSave,
}

/// Result type alias for huddle operations
pub type HdResult<T> = Result<T, HdError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = ConfigError::UnknownParameter {
            name: "BOGUS_WEIGHT".to_string(),
        };
        assert!(error.to_string().contains("BOGUS_WEIGHT"));
    }

    #[test]
    fn test_error_conversion() {
        let config_error = ConfigError::MissingBaseline {
            horizon: "ros".to_string(),
        };
        let hd_error: HdError = config_error.into();

        match hd_error {
            HdError::Config(_) => (),
            _ => panic!("Expected Config error"),
        }
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let hd_error: HdError = io_error.into();
        assert!(matches!(hd_error, HdError::Io(_)));
    }
}
