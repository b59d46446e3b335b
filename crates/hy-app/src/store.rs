//! Artifact storage.
//!
//! Layout under the store root (normally the job's output directory):
//! `{fileName}.CONTROL`, `{fileName}.SETUP.CFG`, the EMITIMES file at its
//! configured path, and `{fileName}.manifest.json`.

use std::fs;
use std::path::{Path, PathBuf};

use hy_job::Mode;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::hash::content_digest;
use crate::translate::Translation;

pub const CONTROL_SUFFIX: &str = "CONTROL";
pub const SETUP_SUFFIX: &str = "SETUP.CFG";
pub const MANIFEST_SUFFIX: &str = "manifest.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Control,
    Setup,
    Emitimes,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactEntry {
    pub kind: ArtifactKind,
    /// Relative to the store root.
    pub path: PathBuf,
    pub sha256: String,
    pub bytes: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactManifest {
    pub job_id: Option<String>,
    pub mode: Mode,
    /// Digest of the job description the artifacts were composed from.
    pub job_sha256: String,
    pub timestamp: String,
    pub artifacts: Vec<ArtifactEntry>,
}

/// One artifact's text and where it goes.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedArtifact {
    pub kind: ArtifactKind,
    pub path: PathBuf,
    pub content: String,
}

/// Artifacts of a translation, in write order.
pub fn plan(translation: &Translation) -> Vec<PlannedArtifact> {
    let base = &translation.job.meta().output_file.file_name;
    let set = &translation.artifacts;

    let mut planned = vec![
        PlannedArtifact {
            kind: ArtifactKind::Control,
            path: PathBuf::from(format!("{}.{}", base, CONTROL_SUFFIX)),
            content: set.control.to_text(),
        },
        PlannedArtifact {
            kind: ArtifactKind::Setup,
            path: PathBuf::from(format!("{}.{}", base, SETUP_SUFFIX)),
            content: set.setup.to_text(),
        },
    ];
    if let Some(emitimes) = &set.emitimes {
        planned.push(PlannedArtifact {
            kind: ArtifactKind::Emitimes,
            path: PathBuf::from(&emitimes.path),
            content: emitimes.to_text(),
        });
    }
    planned
}

#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root_dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(root_dir: PathBuf) -> AppResult<Self> {
        if !root_dir.exists() {
            fs::create_dir_all(&root_dir)?;
        }
        Ok(Self { root_dir })
    }

    /// Store rooted at the job's output directory, resolved against `base`.
    pub fn for_translation(base: &Path, translation: &Translation) -> AppResult<Self> {
        Self::new(base.join(&translation.job.meta().output_file.directory))
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    fn manifest_path(&self, file_name: &str) -> PathBuf {
        self.root_dir
            .join(format!("{}.{}", file_name, MANIFEST_SUFFIX))
    }

    pub fn has_manifest(&self, file_name: &str) -> bool {
        self.manifest_path(file_name).exists()
    }

    /// Write every artifact and the manifest. Files are staged next to
    /// their targets and renamed into place only once all of them are on
    /// disk; on failure the staged files are removed.
    pub fn write(&self, translation: &Translation) -> AppResult<ArtifactManifest> {
        let planned = plan(translation);
        let manifest = ArtifactManifest {
            job_id: translation.job.job_id().map(str::to_string),
            mode: translation.job.mode(),
            job_sha256: translation.job_sha256.clone(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            artifacts: planned
                .iter()
                .map(|artifact| ArtifactEntry {
                    kind: artifact.kind,
                    path: artifact.path.clone(),
                    sha256: content_digest(&artifact.content),
                    bytes: artifact.content.len(),
                })
                .collect(),
        };
        let manifest_json = serde_json::to_string_pretty(&manifest)?;
        let manifest_path = self.manifest_path(&translation.job.meta().output_file.file_name);

        let mut files: Vec<(PathBuf, &str)> = planned
            .iter()
            .map(|artifact| (self.root_dir.join(&artifact.path), artifact.content.as_str()))
            .collect();
        files.push((manifest_path, manifest_json.as_str()));

        let mut staged: Vec<(PathBuf, PathBuf)> = Vec::with_capacity(files.len());
        for (path, content) in files {
            let partial = partial_path(&path);
            if let Err(source) = stage(&partial, content) {
                discard(&staged);
                return Err(AppError::ArtifactWrite { path, source });
            }
            staged.push((partial, path));
        }

        for (i, (partial, path)) in staged.iter().enumerate() {
            if let Err(source) = fs::rename(partial, path) {
                discard(&staged[i..]);
                return Err(AppError::ArtifactWrite {
                    path: path.clone(),
                    source,
                });
            }
            tracing::debug!(path = %path.display(), "artifact written");
        }

        tracing::info!(
            root = %self.root_dir.display(),
            artifacts = manifest.artifacts.len(),
            "artifacts stored"
        );
        Ok(manifest)
    }

    pub fn load_manifest(&self, file_name: &str) -> AppResult<ArtifactManifest> {
        let content = fs::read_to_string(self.manifest_path(file_name))?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Artifacts whose on-disk content no longer matches the manifest digest.
    pub fn stale_artifacts(&self, manifest: &ArtifactManifest) -> Vec<PathBuf> {
        manifest
            .artifacts
            .iter()
            .filter(|entry| {
                fs::read_to_string(self.root_dir.join(&entry.path))
                    .map(|content| content_digest(&content) != entry.sha256)
                    .unwrap_or(true)
            })
            .map(|entry| entry.path.clone())
            .collect()
    }
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".partial");
    path.with_file_name(name)
}

fn stage(partial: &Path, content: &str) -> std::io::Result<()> {
    if let Some(parent) = partial.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(partial, content)
}

fn discard(staged: &[(PathBuf, PathBuf)]) {
    for (partial, _) in staged {
        let _ = fs::remove_file(partial);
    }
}
