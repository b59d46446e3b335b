//! Error types for the hy-app service layer.

use std::path::PathBuf;

use hy_job::{JobError, ValidationReport};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Failed to read job file: {path}")]
    JobFileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse job: {0}")]
    Parse(String),

    #[error("Job validation failed ({} problem(s)):\n{0}", .0.len())]
    Validation(ValidationReport),

    #[error("Meteorology file not found: {path}")]
    MetFileNotFound { path: PathBuf },

    #[error("Failed to read defaults file: {path}: {message}")]
    Defaults { path: PathBuf, message: String },

    #[error("Composition failed: {0}")]
    Compose(String),

    #[error("Failed to write artifact: {path}")]
    ArtifactWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{failed} of {total} jobs not translated")]
    BatchIncomplete { failed: usize, total: usize },

    #[error("Manifest error: {0}")]
    Manifest(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl From<JobError> for AppError {
    fn from(err: JobError) -> Self {
        match err {
            JobError::Validation(report) => AppError::Validation(report),
            other => AppError::Parse(other.to_string()),
        }
    }
}

impl From<ValidationReport> for AppError {
    fn from(report: ValidationReport) -> Self {
        AppError::Validation(report)
    }
}

impl From<hy_compose::ComposeError> for AppError {
    fn from(err: hy_compose::ComposeError) -> Self {
        AppError::Compose(err.to_string())
    }
}

impl AppError {
    /// The semantic problems behind a rejected job, if that is what this is.
    pub fn report(&self) -> Option<&ValidationReport> {
        match self {
            AppError::Validation(report) => Some(report),
            _ => None,
        }
    }
}
