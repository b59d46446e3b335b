//! hy-job: job description schema, reference resolution and validation.

pub mod emissions;
pub mod error;
pub mod job;
pub mod mode;
pub mod refs;
pub mod schema;
pub mod units;
pub mod validate;

pub use emissions::{EmissionCycle, EmissionMatrixBuilder, EmissionRecord, group_cycles};
pub use error::{ValidationError, ValidationReport};
pub use job::{
    ConcentrationBackward, ConcentrationForward, Job, ModeVariant, PhysicsConfig, SimulationMeta,
};
pub use mode::{FieldRule, Mode, ModeField};
pub use refs::ReferenceResolver;
pub use schema::*;
pub use units::UnitRegistry;
pub use validate::{field_present, validate_job};

use std::path::Path;

pub type JobResult<T> = Result<T, JobError>;

#[derive(thiserror::Error, Debug)]
pub enum JobError {
    #[error("Job validation failed: {0}")]
    Validation(#[from] ValidationReport),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported job file extension: {extension}")]
    UnsupportedFormat { extension: String },
}

pub fn parse_json(content: &str) -> JobResult<JobDef> {
    Ok(serde_json::from_str(content)?)
}

pub fn parse_yaml(content: &str) -> JobResult<JobDef> {
    Ok(serde_yaml::from_str(content)?)
}

/// Read a job description; the extension picks the format.
pub fn load_job_def(path: &Path) -> JobResult<JobDef> {
    let content = std::fs::read_to_string(path)?;
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    match extension.as_str() {
        "json" => parse_json(&content),
        "yaml" | "yml" => parse_yaml(&content),
        _ => Err(JobError::UnsupportedFormat { extension }),
    }
}

/// Read and validate a job description.
pub fn load_job(path: &Path) -> JobResult<Job> {
    let def = load_job_def(path)?;
    Ok(validate_job(&def)?)
}

pub fn save_json(path: &Path, def: &JobDef) -> JobResult<()> {
    let content = serde_json::to_string_pretty(def)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn save_yaml(path: &Path, def: &JobDef) -> JobResult<()> {
    let content = serde_yaml::to_string(def)?;
    std::fs::write(path, content)?;
    Ok(())
}
