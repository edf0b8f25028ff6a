use std::collections::BTreeMap;

use tempfile::TempDir;

use crate::memtable::Memtable;
use crate::record::{Record, Scalar};

#[test]
fn scan_yields_keys_in_inclusive_range() {
    let dir = TempDir::new().unwrap();
    let mut memtable = Memtable::new(dir.path().to_path_buf(), 10, 0);
    for key in 1..=5 {
        memtable
            .put(Record::make(Scalar::Int(key), Scalar::Int(key * 10)))
            .unwrap();
    }

    let mut out = BTreeMap::new();
    memtable.scan(
        &Record::make(Scalar::Int(2), Scalar::Int(0)),
        &Record::make(Scalar::Int(4), Scalar::Int(0)),
        &mut out,
    );

    let collected: Vec<(Scalar, Scalar)> = out.into_iter().collect();
    assert_eq!(
        collected,
        vec![
            (Scalar::Int(2), Scalar::Int(20)),
            (Scalar::Int(3), Scalar::Int(30)),
            (Scalar::Int(4), Scalar::Int(40)),
        ]
    );
}

#[test]
fn scan_overwrites_accumulator_entries_for_same_key() {
    let dir = TempDir::new().unwrap();
    let mut memtable = Memtable::new(dir.path().to_path_buf(), 10, 0);
    memtable.put(Record::make(Scalar::Int(1), Scalar::Str("new".into()))).unwrap();

    let mut out = BTreeMap::new();
    out.insert(Scalar::Int(1), Scalar::Str("stale".into()));
    memtable.scan(
        &Record::make(Scalar::Int(1), Scalar::Int(0)),
        &Record::make(Scalar::Int(1), Scalar::Int(0)),
        &mut out,
    );
    assert_eq!(out.get(&Scalar::Int(1)), Some(&Scalar::Str("new".into())));
}
