use thiserror::Error;

/// Application-specific errors for the CLI
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Missing required argument: {arg}")]
    MissingArgument { arg: String },

    #[error("Invalid configuration file {path}: {source}")]
    InvalidConfig {
        path: String,
        #[source]
        source: s2uc::Error,
    },

    #[error("{errors} dataset(s) failed during batch processing")]
    BatchFailures { errors: usize },

    #[error(transparent)]
    Pipeline(#[from] s2uc::Error),
}
