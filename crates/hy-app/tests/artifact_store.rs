use std::path::PathBuf;

use hy_app::store::plan;
use hy_app::{
    AcceptAllResolver, AppError, ArtifactKind, ArtifactStore, content_digest, job_digest,
    load_job_def, translate,
};
use hy_compose::PhysicsDefaults;
use hy_job::Mode;

fn demo(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../demos")
        .join(name)
}

fn scratch(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(name);
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

#[test]
fn forward_concentration_writes_all_artifacts() {
    let def = load_job_def(&demo("conc_forward.json")).unwrap();
    let translation = translate(&def, &AcceptAllResolver, &PhysicsDefaults::default()).unwrap();

    let base = scratch("hy_app_store_conc_fwd");
    let store = ArtifactStore::for_translation(&base, &translation).unwrap();
    let manifest = store.write(&translation).unwrap();

    assert_eq!(manifest.mode, Mode::ConcFwd);
    assert_eq!(manifest.job_id.as_deref(), Some("HysplitGenericRun001"));
    assert_eq!(manifest.job_sha256, job_digest(&def));
    let kinds: Vec<ArtifactKind> = manifest.artifacts.iter().map(|a| a.kind).collect();
    assert_eq!(
        kinds,
        vec![ArtifactKind::Control, ArtifactKind::Setup, ArtifactKind::Emitimes]
    );

    let root = base.join("./output/");
    let control = std::fs::read_to_string(root.join("hysplit_output.CONTROL")).unwrap();
    assert_eq!(control, translation.artifacts.control.to_text());
    assert_eq!(manifest.artifacts[0].sha256, content_digest(&control));
    assert!(root.join("hysplit_output.SETUP.CFG").is_file());
    assert!(root.join("EMITIMES").is_file());

    let loaded = store.load_manifest("hysplit_output").unwrap();
    assert_eq!(loaded, manifest);
    assert!(store.stale_artifacts(&loaded).is_empty());

    let _ = std::fs::remove_dir_all(&base);
}

#[test]
fn trajectory_writes_control_and_setup_only() {
    let def = load_job_def(&demo("traj_forward.json")).unwrap();
    let translation = translate(&def, &AcceptAllResolver, &PhysicsDefaults::default()).unwrap();

    let planned = plan(&translation);
    assert_eq!(planned.len(), 2);
    assert!(planned.iter().all(|p| p.kind != ArtifactKind::Emitimes));

    let base = scratch("hy_app_store_traj_fwd");
    let store = ArtifactStore::for_translation(&base, &translation).unwrap();
    let manifest = store.write(&translation).unwrap();
    assert_eq!(manifest.artifacts.len(), 2);
    assert!(store.has_manifest("hysplit_output"));

    let _ = std::fs::remove_dir_all(&base);
}

#[test]
fn edited_artifact_is_stale() {
    let def = load_job_def(&demo("conc_backward.json")).unwrap();
    let translation = translate(&def, &AcceptAllResolver, &PhysicsDefaults::default()).unwrap();

    let root = scratch("hy_app_store_stale");
    let store = ArtifactStore::new(root.clone()).unwrap();
    let manifest = store.write(&translation).unwrap();

    std::fs::write(root.join("hysplit_output.SETUP.CFG"), " &SETUP\n /\n").unwrap();
    assert_eq!(
        store.stale_artifacts(&manifest),
        vec![PathBuf::from("hysplit_output.SETUP.CFG")]
    );

    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn rewriting_produces_identical_digests() {
    let def = load_job_def(&demo("conc_forward.json")).unwrap();
    let defaults = PhysicsDefaults::default();
    let root = scratch("hy_app_store_idempotent");
    let store = ArtifactStore::new(root.clone()).unwrap();

    let first = store
        .write(&translate(&def, &AcceptAllResolver, &defaults).unwrap())
        .unwrap();
    let second = store
        .write(&translate(&def, &AcceptAllResolver, &defaults).unwrap())
        .unwrap();
    assert_eq!(first.artifacts, second.artifacts);

    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn failed_write_leaves_nothing_behind() {
    let def = load_job_def(&demo("conc_forward.json")).unwrap();
    let translation = translate(&def, &AcceptAllResolver, &PhysicsDefaults::default()).unwrap();

    let root = scratch("hy_app_store_failed_write");
    let store = ArtifactStore::new(root.clone()).unwrap();
    // a directory where the EMITIMES staging file would go
    std::fs::create_dir_all(root.join("EMITIMES.partial")).unwrap();

    match store.write(&translation) {
        Err(AppError::ArtifactWrite { path, .. }) => assert_eq!(path, root.join("./EMITIMES")),
        other => panic!("unexpected: {:?}", other),
    }

    let mut left: Vec<String> = std::fs::read_dir(&root)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    left.sort();
    assert_eq!(left, vec!["EMITIMES.partial".to_string()]);
    assert!(!store.has_manifest("hysplit_output"));

    let _ = std::fs::remove_dir_all(&root);
}
