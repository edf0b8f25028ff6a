use std::collections::BTreeMap;

use tempfile::TempDir;

use crate::manifest::RunIndex;
use crate::record::{Record, Scalar};
use crate::sstable::{write_run, RunFileCounter};

fn record(key: i32, value: i32) -> Record {
    Record::make(Scalar::Int(key), Scalar::Int(value))
}

#[test]
fn search_prefers_newest_run_on_overlapping_keys() {
    let dir = TempDir::new().unwrap();
    let run_dir = dir.path().to_path_buf();
    let mut counter = RunFileCounter::default();

    let old = write_run(&run_dir, &mut counter, &[record(1, 100)]).unwrap();
    let new = write_run(&run_dir, &mut counter, &[record(1, 200)]).unwrap();

    let mut index = RunIndex::open(run_dir).unwrap();
    index.add_run(old).unwrap();
    index.add_run(new).unwrap();

    let hit = index.search(&record(1, 0)).unwrap();
    assert_eq!(hit.value, Scalar::Int(200));
}

#[test]
fn search_for_absent_key_returns_empty() {
    let dir = TempDir::new().unwrap();
    let run_dir = dir.path().to_path_buf();
    let mut counter = RunFileCounter::default();
    let desc = write_run(&run_dir, &mut counter, &[record(1, 100)]).unwrap();

    let mut index = RunIndex::open(run_dir).unwrap();
    index.add_run(desc).unwrap();

    let hit = index.search(&record(99, 0)).unwrap();
    assert!(hit.is_empty());
}

#[test]
fn scan_merges_overlapping_runs_newest_wins() {
    let dir = TempDir::new().unwrap();
    let run_dir = dir.path().to_path_buf();
    let mut counter = RunFileCounter::default();

    let run1 = write_run(&run_dir, &mut counter, &[record(1, 10), record(2, 20)]).unwrap();
    let run2 = write_run(&run_dir, &mut counter, &[record(2, 21), record(3, 30)]).unwrap();

    let mut index = RunIndex::open(run_dir).unwrap();
    index.add_run(run1).unwrap();
    index.add_run(run2).unwrap();

    let mut out = BTreeMap::new();
    index.scan(&record(1, 0), &record(3, 0), &mut out).unwrap();

    assert_eq!(out.get(&Scalar::Int(2)), Some(&Scalar::Int(21)));
    assert_eq!(out.len(), 3);
}

#[test]
fn scan_prunes_non_overlapping_runs() {
    let dir = TempDir::new().unwrap();
    let run_dir = dir.path().to_path_buf();
    let mut counter = RunFileCounter::default();

    let in_range = write_run(&run_dir, &mut counter, &[record(5, 50)]).unwrap();
    let out_of_range = write_run(&run_dir, &mut counter, &[record(100, 1000)]).unwrap();

    let mut index = RunIndex::open(run_dir).unwrap();
    index.add_run(in_range).unwrap();
    index.add_run(out_of_range).unwrap();

    let mut out = BTreeMap::new();
    index.scan(&record(0, 0), &record(10, 0), &mut out).unwrap();
    assert_eq!(out.len(), 1);
    assert!(out.contains_key(&Scalar::Int(5)));
}
