use tempfile::TempDir;

use crate::record::{Record, Scalar};
use crate::sstable::{load_run, write_run, RunError, RunFileCounter};

fn record(key: i32, value: &str) -> Record {
    Record::make(Scalar::Int(key), Scalar::Str(value.to_string()))
}

#[test]
fn empty_input_produces_zero_record_descriptor() {
    let dir = TempDir::new().unwrap();
    let mut counter = RunFileCounter::default();
    let desc = write_run(dir.path(), &mut counter, &[]).unwrap();
    assert!(desc.smallest_key.is_empty());
    assert!(desc.largest_key.is_empty());
    let loaded = load_run(dir.path(), &desc.filename).unwrap();
    assert!(loaded.is_empty());
}

#[test]
fn round_trips_ordered_records() {
    let dir = TempDir::new().unwrap();
    let mut counter = RunFileCounter::default();
    let records = vec![record(1, "a"), record(2, "b"), record(3, "c")];
    let desc = write_run(dir.path(), &mut counter, &records).unwrap();
    assert_eq!(desc.smallest_key, Scalar::Int(1));
    assert_eq!(desc.largest_key, Scalar::Int(3));

    let loaded = load_run(dir.path(), &desc.filename).unwrap();
    assert_eq!(loaded.len(), 3);
    for (original, reloaded) in records.iter().zip(loaded.iter()) {
        assert_eq!(original.key, reloaded.key);
        assert_eq!(original.value, reloaded.value);
    }
}

#[test]
fn name_collision_is_rejected() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("sst_0.sst"), b"existing").unwrap();
    let mut counter = RunFileCounter::default();
    let err = write_run(dir.path(), &mut counter, &[]).unwrap_err();
    assert!(matches!(err, RunError::NameCollision { filename } if filename == "sst_0.sst"));
}

#[test]
fn truncated_header_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sst_0.sst");
    std::fs::write(&path, [1, 0, 0]).unwrap();
    let err = load_run(dir.path(), "sst_0.sst").unwrap_err();
    assert!(matches!(err, RunError::TruncatedRun { .. }));
}

#[test]
fn declared_count_exceeding_file_is_truncated_run() {
    let dir = TempDir::new().unwrap();
    let mut counter = RunFileCounter::default();
    let desc = write_run(dir.path(), &mut counter, &[record(1, "a")]).unwrap();
    let path = dir.path().join(&desc.filename);
    let mut bytes = std::fs::read(&path).unwrap();
    // Bump the declared record count past what the file actually holds.
    bytes[0] = 5;
    std::fs::write(&path, bytes).unwrap();
    let err = load_run(dir.path(), &desc.filename).unwrap_err();
    assert!(matches!(err, RunError::TruncatedRun { .. }));
}

#[test]
fn corrupt_checksum_is_reported_with_offset() {
    let dir = TempDir::new().unwrap();
    let mut counter = RunFileCounter::default();
    let desc = write_run(dir.path(), &mut counter, &[record(1, "a")]).unwrap();
    let path = dir.path().join(&desc.filename);
    let mut bytes = std::fs::read(&path).unwrap();
    // Flip a byte inside the first record's checksum field (right after the 8-byte header).
    bytes[8] ^= 0xFF;
    std::fs::write(&path, bytes).unwrap();
    let err = load_run(dir.path(), &desc.filename).unwrap_err();
    assert!(matches!(err, RunError::CorruptRecord { .. }));
}

#[test]
fn empty_file_loads_as_empty_run() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sst_0.sst");
    std::fs::write(&path, []).unwrap();
    let loaded = load_run(dir.path(), "sst_0.sst").unwrap();
    assert!(loaded.is_empty());
}

#[test]
fn absurd_declared_count_is_rejected_without_allocating() {
    let dir = TempDir::new().unwrap();
    let mut counter = RunFileCounter::default();
    let desc = write_run(dir.path(), &mut counter, &[record(1, "a")]).unwrap();
    let path = dir.path().join(&desc.filename);
    let mut bytes = std::fs::read(&path).unwrap();
    // Declare a record count near u32::MAX — a naive `Vec::with_capacity`
    // on this value would abort the process instead of erroring.
    bytes[0..4].copy_from_slice(&u32::MAX.to_le_bytes());
    std::fs::write(&path, bytes).unwrap();
    let err = load_run(dir.path(), &desc.filename).unwrap_err();
    assert!(matches!(err, RunError::TruncatedRun { .. }));
}
