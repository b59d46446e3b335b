//! Content digests for artifact manifests.

use hy_job::JobDef;
use sha2::{Digest, Sha256};

pub fn content_digest(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Digest of the job description as the translator saw it.
pub fn job_digest(def: &JobDef) -> String {
    let json = serde_json::to_string(def).unwrap_or_default();
    content_digest(&json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_hex_sha256() {
        assert_eq!(
            content_digest(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(content_digest("abc").len(), 64);
    }

    #[test]
    fn job_digest_tracks_content() {
        let json = include_str!("../../../demos/traj_forward.json");
        let a: JobDef = serde_json::from_str(json).unwrap();
        let mut b = a.clone();
        assert_eq!(job_digest(&a), job_digest(&b));
        b.job_id = Some("other".to_string());
        assert_ne!(job_digest(&a), job_digest(&b));
    }
}
