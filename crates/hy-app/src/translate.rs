//! Job description to composed artifacts.

use std::path::PathBuf;

use hy_compose::{ArtifactSet, PhysicsDefaults, compose_all};
use hy_job::{CustomZonesDef, Job, JobDef, PlotConfigDef, validate_job};

use crate::error::AppResult;
use crate::hash::job_digest;
use crate::met::MetFileResolver;

/// What a downstream plotting step needs: the requested plot and the display
/// zones of the plotted pollutant's unit.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotHandoff {
    pub config: PlotConfigDef,
    pub zones: Option<CustomZonesDef>,
}

#[derive(Debug, Clone)]
pub struct Translation {
    pub job: Job,
    pub artifacts: ArtifactSet,
    pub met_paths: Vec<PathBuf>,
    pub plot: Option<PlotHandoff>,
    /// SHA-256 of the job description, recorded in the manifest.
    pub job_sha256: String,
}

/// Validate, resolve meteorology, then compose. A rejected job yields no
/// artifacts.
pub fn translate(
    def: &JobDef,
    resolver: &dyn MetFileResolver,
    defaults: &PhysicsDefaults,
) -> AppResult<Translation> {
    let span = tracing::info_span!("translate", job_id = def.job_id.as_deref().unwrap_or("-"));
    let _guard = span.enter();

    let job = validate_job(def)?;
    let met_paths = resolver.resolve_all(job.met_files())?;
    let artifacts = compose_all(&job, defaults)?;

    let plot = job.plot().map(|config| PlotHandoff {
        config: config.clone(),
        zones: job.plot_zones().cloned(),
    });

    tracing::info!(
        mode = %job.mode(),
        met_files = met_paths.len(),
        emitimes = artifacts.emitimes.is_some(),
        "job translated"
    );

    Ok(Translation {
        job,
        artifacts,
        met_paths,
        plot,
        job_sha256: job_digest(def),
    })
}
