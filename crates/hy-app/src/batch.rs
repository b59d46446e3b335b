//! Parallel translation of independent jobs.

use std::path::PathBuf;

use hy_compose::PhysicsDefaults;
use rayon::prelude::*;

use crate::error::AppResult;
use crate::job_service::load_job_def;
use crate::met::MetFileResolver;
use crate::translate::{Translation, translate};

#[derive(Debug)]
pub struct BatchOutcome {
    pub source: PathBuf,
    pub result: AppResult<Translation>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchSummary {
    pub translated: usize,
    pub rejected: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn of(outcomes: &[BatchOutcome]) -> Self {
        let mut summary = Self::default();
        for outcome in outcomes {
            match &outcome.result {
                Ok(_) => summary.translated += 1,
                Err(e) if e.report().is_some() => summary.rejected += 1,
                Err(_) => summary.failed += 1,
            }
        }
        summary
    }
}

/// Translate each job file on the rayon pool. Outcomes keep input order.
pub fn translate_batch(
    sources: &[PathBuf],
    resolver: &dyn MetFileResolver,
    defaults: &PhysicsDefaults,
) -> Vec<BatchOutcome> {
    tracing::info!(jobs = sources.len(), "batch translation started");
    let outcomes: Vec<BatchOutcome> = sources
        .par_iter()
        .map(|source| BatchOutcome {
            source: source.clone(),
            result: load_job_def(source).and_then(|def| translate(&def, resolver, defaults)),
        })
        .collect();

    let summary = BatchSummary::of(&outcomes);
    tracing::info!(
        translated = summary.translated,
        rejected = summary.rejected,
        failed = summary.failed,
        "batch translation finished"
    );
    outcomes
}
