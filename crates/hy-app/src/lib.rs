//! Application service layer for the HYSPLIT job translator.
//!
//! The CLI goes through this crate for everything that touches the file
//! system: reading job files, checking meteorology inputs, translating, and
//! writing the composed artifacts with a manifest.

pub mod batch;
pub mod error;
pub mod hash;
pub mod job_service;
pub mod met;
pub mod store;
pub mod translate;

pub use batch::{BatchOutcome, BatchSummary, translate_batch};
pub use error::{AppError, AppResult};
pub use hash::{content_digest, job_digest};
pub use job_service::{load_defaults, load_job, load_job_def};
pub use met::{AcceptAllResolver, FsMetFileResolver, MetFileResolver, met_path};
pub use store::{ArtifactEntry, ArtifactKind, ArtifactManifest, ArtifactStore, PlannedArtifact};
pub use translate::{PlotHandoff, Translation, translate};
