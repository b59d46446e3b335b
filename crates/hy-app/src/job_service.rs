//! Job and defaults loading.

use std::path::Path;

use hy_compose::PhysicsDefaults;
use hy_job::{Job, JobDef, JobError};

use crate::error::{AppError, AppResult};

/// Read a job description without validating it.
pub fn load_job_def(path: &Path) -> AppResult<JobDef> {
    hy_job::load_job_def(path).map_err(|e| match e {
        JobError::Io(source) => AppError::JobFileRead {
            path: path.to_path_buf(),
            source,
        },
        other => other.into(),
    })
}

/// Read and validate a job description.
pub fn load_job(path: &Path) -> AppResult<Job> {
    let def = load_job_def(path)?;
    let job = hy_job::validate_job(&def)?;
    tracing::info!(path = %path.display(), mode = %job.mode(), "job loaded");
    Ok(job)
}

/// Model defaults from a YAML or JSON file, or the built-in set.
pub fn load_defaults(path: Option<&Path>) -> AppResult<PhysicsDefaults> {
    let Some(path) = path else {
        return Ok(PhysicsDefaults::default());
    };

    let defaults_error = |message: String| AppError::Defaults {
        path: path.to_path_buf(),
        message,
    };
    let content = std::fs::read_to_string(path).map_err(|e| defaults_error(e.to_string()))?;
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    let defaults = if is_json {
        serde_json::from_str(&content).map_err(|e| defaults_error(e.to_string()))?
    } else {
        serde_yaml::from_str(&content).map_err(|e| defaults_error(e.to_string()))?
    };
    tracing::debug!(path = %path.display(), "model defaults loaded");
    Ok(defaults)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn demo(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("../../demos")
            .join(name)
    }

    #[test]
    fn demo_jobs_load() {
        for name in [
            "conc_forward.json",
            "conc_backward.json",
            "traj_forward.json",
            "traj_backward.json",
        ] {
            assert!(load_job(&demo(name)).is_ok(), "{name}");
        }
    }

    #[test]
    fn missing_file_names_the_path() {
        let path = demo("missing.json");
        match load_job(&path) {
            Err(AppError::JobFileRead { path: p, .. }) => assert_eq!(p, path),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn partial_defaults_file() {
        let path = std::env::temp_dir().join("hy_app_defaults_partial.yaml");
        std::fs::write(&path, "max_particles: 2500\nconfig_mode: Puff\n").unwrap();
        let defaults = load_defaults(Some(&path)).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(defaults.max_particles, 2500);
        assert_eq!(defaults.config_mode, hy_job::ConfigMode::Puff);
        assert_eq!(defaults.top_of_model_m_agl, 10_000.0);
    }

    #[test]
    fn no_defaults_file_uses_builtin() {
        assert_eq!(load_defaults(None).unwrap(), PhysicsDefaults::default());
    }
}
