//! Meteorology file resolution.
//!
//! The translator only passes met file handles through to CONTROL; a
//! resolver decides whether a handle has to exist before artifacts are
//! composed.

use std::path::{Path, PathBuf};

use hy_job::FileRefDef;

use crate::error::{AppError, AppResult};

/// `directory` joined with `fileName`, as the model will open it.
pub fn met_path(met: &FileRefDef) -> PathBuf {
    Path::new(&met.directory).join(&met.file_name)
}

pub trait MetFileResolver: Sync {
    fn resolve(&self, met: &FileRefDef) -> AppResult<PathBuf>;

    fn resolve_all(&self, mets: &[FileRefDef]) -> AppResult<Vec<PathBuf>> {
        mets.iter().map(|m| self.resolve(m)).collect()
    }
}

/// Requires every met file to exist, relative directories taken from `base`.
#[derive(Debug, Clone, Default)]
pub struct FsMetFileResolver {
    base: Option<PathBuf>,
}

impl FsMetFileResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base(base: impl Into<PathBuf>) -> Self {
        Self {
            base: Some(base.into()),
        }
    }
}

impl MetFileResolver for FsMetFileResolver {
    fn resolve(&self, met: &FileRefDef) -> AppResult<PathBuf> {
        let path = match &self.base {
            Some(base) => base.join(met_path(met)),
            None => met_path(met),
        };
        if !path.is_file() {
            return Err(AppError::MetFileNotFound { path });
        }
        tracing::debug!(path = %path.display(), "met file found");
        Ok(path)
    }
}

/// Passes handles through unchecked.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAllResolver;

impl MetFileResolver for AcceptAllResolver {
    fn resolve(&self, met: &FileRefDef) -> AppResult<PathBuf> {
        Ok(met_path(met))
    }
}
