use tempfile::TempDir;

use crate::memtable::Memtable;
use crate::record::{Record, Scalar};

fn probe(key: i32) -> Record {
    Record::make(Scalar::Int(key), Scalar::Int(0))
}

#[test]
fn get_on_missing_key_is_empty() {
    let dir = TempDir::new().unwrap();
    let memtable = Memtable::new(dir.path().to_path_buf(), 4, 0);
    assert!(memtable.get(&probe(7)).is_empty());
}

#[test]
fn put_then_get_returns_value() {
    let dir = TempDir::new().unwrap();
    let mut memtable = Memtable::new(dir.path().to_path_buf(), 4, 0);
    memtable
        .put(Record::make(Scalar::Int(1), Scalar::Str("one".into())))
        .unwrap();
    let got = memtable.get(&probe(1));
    assert_eq!(got.value, Scalar::Str("one".into()));
}

#[test]
fn update_in_place_does_not_grow_table() {
    let dir = TempDir::new().unwrap();
    let mut memtable = Memtable::new(dir.path().to_path_buf(), 4, 0);
    memtable.put(Record::make(Scalar::Int(1), Scalar::Int(10))).unwrap();
    let flush = memtable.put(Record::make(Scalar::Int(1), Scalar::Int(20))).unwrap();
    assert!(flush.is_none());
    assert_eq!(memtable.len(), 1);
    assert_eq!(memtable.get(&probe(1)).value, Scalar::Int(20));
}

#[test]
fn cross_tag_equal_key_overwrites_existing_entry() {
    let dir = TempDir::new().unwrap();
    let mut memtable = Memtable::new(dir.path().to_path_buf(), 4, 0);
    memtable
        .put(Record::make(Scalar::Int(100), Scalar::Str("a".into())))
        .unwrap();
    assert_eq!(memtable.len(), 1);
    memtable
        .put(Record::make(Scalar::Long(100), Scalar::Str("b".into())))
        .unwrap();
    assert_eq!(memtable.len(), 1);
    assert_eq!(memtable.get(&probe(100)).value, Scalar::Str("b".into()));
}
