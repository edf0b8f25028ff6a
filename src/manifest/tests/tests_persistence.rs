use tempfile::TempDir;

use crate::manifest::RunIndex;
use crate::record::Scalar;
use crate::sstable::{RunDescriptor, RunFileCounter};

#[test]
fn missing_catalog_opens_empty() {
    let dir = TempDir::new().unwrap();
    let index = RunIndex::open(dir.path().to_path_buf()).unwrap();
    assert!(index.is_empty());
}

#[test]
fn reject_descriptor_with_inverted_range() {
    let dir = TempDir::new().unwrap();
    let mut index = RunIndex::open(dir.path().to_path_buf()).unwrap();
    let bad = RunDescriptor {
        filename: "sst_0.sst".into(),
        smallest_key: Scalar::Int(5),
        largest_key: Scalar::Int(1),
    };
    assert!(index.add_run(bad).is_err());
}

#[test]
fn flush_then_reload_restores_descriptor_list() {
    let dir = TempDir::new().unwrap();
    let run_dir = dir.path().to_path_buf();

    // Write a real run so the descriptor's filename resolves on reload.
    let mut counter = RunFileCounter::default();
    let record = crate::record::Record::make(Scalar::Int(1), Scalar::Str("a".into()));
    let desc = crate::sstable::write_run(&run_dir, &mut counter, &[record]).unwrap();

    let mut index = RunIndex::open(run_dir.clone()).unwrap();
    index.add_run(desc).unwrap();
    index.flush_catalog().unwrap();

    let reloaded = RunIndex::open(run_dir).unwrap();
    assert_eq!(reloaded.len(), 1);
}

#[test]
fn truncated_catalog_is_a_parse_error_not_an_empty_catalog() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("Index.sst"), [1, 0, 0]).unwrap();
    let result = RunIndex::open(dir.path().to_path_buf());
    assert!(result.is_err());
}

#[test]
fn absurd_declared_run_count_is_rejected_without_allocating() {
    let dir = TempDir::new().unwrap();
    let mut buf = Vec::new();
    // Declare a run count near u32::MAX — a naive `Vec::with_capacity`
    // on this value would abort the process instead of erroring.
    buf.extend_from_slice(&u32::MAX.to_le_bytes());
    buf.extend_from_slice(&8u32.to_le_bytes());
    std::fs::write(dir.path().join("Index.sst"), buf).unwrap();
    let result = RunIndex::open(dir.path().to_path_buf());
    assert!(result.is_err());
}
