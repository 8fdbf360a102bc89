//! Crate-level error type and `Result` alias for stable, structured error handling.
//! Converts underlying I/O, TIFF, JSON and GDAL errors, and provides semantic variants
//! for the failure kinds of the band-synthesis pipeline (unknown sensor, missing input,
//! unresolvable CRS) so callers must handle them instead of silently continuing.
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("GDAL error: {0}")]
    Gdal(#[from] crate::io::GdalError),

    #[error("TIFF error: {0}")]
    Tiff(#[from] tiff::TiffError),

    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Unrecognized sensor identity: {code:?} (expected 'A' or 'B')")]
    UnknownSensor { code: char },

    #[error("Dataset name {name:?} is too short to carry a sensor identity")]
    InvalidDatasetName { name: String },

    #[error("Dataset path does not exist: {path:?}")]
    MissingDataset { path: PathBuf },

    #[error("Missing input raster: {path:?}")]
    MissingInput { path: PathBuf },

    #[error("Cannot identify a projected CRS authority for {path:?}")]
    UnresolvableCrs { path: PathBuf },

    #[error("Ground sample distance changed during reprojection: source {source_gsd}, output {output_gsd}")]
    GsdMismatch { source_gsd: f64, output_gsd: f64 },

    #[error("Grid mismatch for {what}: expected {expected_nx}x{expected_ny}, got {nx}x{ny}")]
    GridMismatch {
        what: String,
        expected_nx: usize,
        expected_ny: usize,
        nx: usize,
        ny: usize,
    },

    #[error("Resample error: {0}")]
    Resample(String),

    #[error("Warp error: {0}")]
    Warp(String),

    #[error("Unsupported raster: {0}")]
    Unsupported(String),

    #[error("{stage} failed: {source}")]
    Stage {
        stage: &'static str,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Wrap an error with the name of the pipeline stage it aborted.
    pub fn in_stage(self, stage: &'static str) -> Self {
        match self {
            already @ Error::Stage { .. } => already,
            other => Error::Stage {
                stage,
                source: Box::new(other),
            },
        }
    }

    pub fn resample<E: std::fmt::Display>(e: E) -> Self {
        Error::Resample(e.to_string())
    }
}

/// Attach a stage name to the error side of a result.
pub trait StageExt<T> {
    fn stage(self, stage: &'static str) -> Result<T>;
}

impl<T> StageExt<T> for Result<T> {
    fn stage(self, stage: &'static str) -> Result<T> {
        self.map_err(|e| e.in_stage(stage))
    }
}
