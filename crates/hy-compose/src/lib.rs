//! hy-compose: text artifacts for the dispersion model from a validated job.
//!
//! Composers read a [`hy_job::Job`] and never report schema problems; any
//! error here means a validated job broke a contract.

pub mod control;
pub mod defaults;
pub mod emitimes;
pub mod format;
pub mod reader;
pub mod setup;

pub use control::{ControlFile, compose_control};
pub use defaults::{DepositionDefaults, PhysicsDefaults, SamplingInterval, initd_code};
pub use emitimes::{EmitimesFile, compose_emitimes};
pub use reader::{ControlSummary, GridLines, PollutantLine, parse_control, parse_setup};
pub use setup::{SetupConfig, compose_setup};

use hy_core::HyError;
use hy_job::{Job, Mode};

pub type ComposeResult<T> = Result<T, ComposeError>;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ComposeError {
    #[error("Contract violation: {0}")]
    Contract(#[from] HyError),

    #[error("Parse error at line {line}: {reason}")]
    Parse { line: usize, reason: String },
}

/// Every text artifact for one job.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactSet {
    pub mode: Mode,
    pub control: ControlFile,
    pub setup: SetupConfig,
    pub emitimes: Option<EmitimesFile>,
}

pub fn compose_all(job: &Job, defaults: &PhysicsDefaults) -> ComposeResult<ArtifactSet> {
    let span = tracing::debug_span!("compose", job_id = job.job_id().unwrap_or("-"));
    let _guard = span.enter();

    let control = compose_control(job, defaults)?;
    let setup = compose_setup(job, defaults);
    let emitimes = compose_emitimes(job)?;
    tracing::debug!(
        control_lines = control.lines().len(),
        emitimes = emitimes.is_some(),
        "artifacts composed"
    );

    Ok(ArtifactSet {
        mode: job.mode(),
        control,
        setup,
        emitimes,
    })
}
