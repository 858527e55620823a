//! End-to-end manifest invariants, built through the public API rather than
//! crate-internal constructors.

use pretty_assertions::assert_eq;
use tapioca_manifest::{FileInfoBuilder, Manifest, ManifestDiff};

fn build_single_file(data: &[u8], block_size: u32) -> Manifest {
    let mut manifest = Manifest::new(block_size).unwrap();
    let mut builder = FileInfoBuilder::new("a.bin");
    let mut block_id = 0u64;
    for chunk in data.chunks(block_size as usize) {
        let hash = tapioca_hash::hash_block(chunk);
        builder.append(
            tapioca_manifest::BlockInfo::new(hash, chunk.len() as u32),
            Some(chunk),
        );
        block_id += 1;
    }
    assert!(block_id > 0);
    manifest.add_file(builder.build()).unwrap();
    manifest
}

// Scenario S1 from spec.md §8.
#[test]
fn scenario_s1_two_block_file() {
    let data = vec![0u8; 1_500_000];
    let manifest = build_single_file(&data, 1_048_576);

    let file = manifest.file("a.bin").unwrap();
    assert_eq!(file.blocks.len(), 2);
    assert_eq!(file.blocks[0].size, 1_048_576);
    assert_eq!(file.blocks[1].size, 451_424);
    assert_ne!(file.blocks[0].hash, file.blocks[1].hash);
    assert_eq!(manifest.total_space(), 1_500_000);
}

// Invariant 5 from spec.md §8.
#[test]
fn diff_of_manifest_with_itself_is_unchanged() {
    let manifest = build_single_file(b"some file contents to split into blocks", 8);
    let diff = ManifestDiff::new(&manifest, &manifest);
    assert!(!diff.has_changed());
}

#[test]
fn binary_serialization_is_stable_across_round_trips() {
    let manifest = build_single_file(b"round trip me please, thank you very much!!", 8);
    let once = tapioca_manifest::to_bytes(&manifest).unwrap();
    let restored = tapioca_manifest::from_bytes(&once).unwrap();
    let twice = tapioca_manifest::to_bytes(&restored).unwrap();
    assert_eq!(restored, manifest);
    assert_eq!(once, twice);
}
