//! Build database scenarios (spec.md §8: S4, invariant 7).

use tapioca_db::{BuildDatabase, BuildRef, ProjectConfig};
use tapioca_manifest::{BlockInfo, FileInfo, Manifest};

fn manifest_with_block(hash: [u8; 64]) -> Manifest {
    let mut m = Manifest::new(8).unwrap();
    let block = BlockInfo::new(hash, 8);
    m.add_file(FileInfo { path: "f".to_string(), blocks: vec![block], hash: [0u8; 64], size: 8 })
        .unwrap();
    m
}

// Scenario S4 from spec.md §8.
#[tokio::test]
async fn scenario_s4_dead_block_detection() {
    let dir = tempfile::tempdir().unwrap();
    let db = BuildDatabase::open(dir.path()).await.unwrap();

    let hash = [7u8; 64];
    let r1 = BuildRef::new("game", "release", "1");
    let r2 = BuildRef::new("game", "release", "2");

    db.save_build(&manifest_with_block(hash), &r1).await.unwrap();
    db.save_build(&manifest_with_block(hash), &r2).await.unwrap();

    db.purge_build(&r1).await.unwrap();
    assert!(!db.is_block_dead(&hash).await.unwrap());

    db.purge_build(&r2).await.unwrap();
    assert!(db.is_block_dead(&hash).await.unwrap());
}

// Invariant 7: after save+purge of the only build referencing a block's
// hash, the block is reported dead.
#[tokio::test]
async fn invariant_7_purging_the_only_reference_marks_block_dead() {
    let dir = tempfile::tempdir().unwrap();
    let db = BuildDatabase::open(dir.path()).await.unwrap();

    let hash = [3u8; 64];
    let req = BuildRef::new("solo", "main", "42");
    db.save_build(&manifest_with_block(hash), &req).await.unwrap();
    assert!(!db.is_block_dead(&hash).await.unwrap());

    db.purge_build(&req).await.unwrap();
    assert!(db.is_block_dead(&hash).await.unwrap());
}

#[tokio::test]
async fn get_build_is_memoized_and_invalidated_on_write() {
    let dir = tempfile::tempdir().unwrap();
    let db = BuildDatabase::open(dir.path()).await.unwrap();
    let req = BuildRef::new("game", "release", "1");

    assert!(db.get_build(&req).await.unwrap().is_none());

    db.save_build(&manifest_with_block([1u8; 64]), &req).await.unwrap();
    let fetched = db.get_build(&req).await.unwrap().unwrap();
    assert_eq!(fetched.len(), 1);

    db.purge_build(&req).await.unwrap();
    assert!(db.get_build(&req).await.unwrap().is_none());
}

#[tokio::test]
async fn project_config_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let db = BuildDatabase::open(dir.path()).await.unwrap();

    assert!(db.get_config("game").await.unwrap().is_none());

    let config = ProjectConfig::new("game", 1024 * 1024, "release");
    db.save_config(&config).await.unwrap();

    let fetched = db.get_config("game").await.unwrap().unwrap();
    assert_eq!(fetched, config);
}
