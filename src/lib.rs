//! An embeddable, single-process, ordered key-value store.
//!
//! Keys and values are dynamically typed scalars drawn from a closed set
//! (`INT`, `LONG`, `DOUBLE`, `CHAR`, `STRING`). Writes land in a bounded
//! in-memory ordered table; once it reaches capacity, its contents are
//! flushed to an immutable, sorted run file on disk, and a descriptor is
//! appended to a catalog that indexes every run written so far.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────┐
//! │                        Engine                         │
//! │  ┌────────────────┐        ┌─────────────────────────┐│
//! │  │   Memtable     │ flush  │   Runs (sst_<n>.sst)     ││
//! │  │  (bounded, M)  │───────▶│   + RunIndex (Index.sst) ││
//! │  └────────────────┘        └─────────────────────────┘│
//! └───────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`record`] | Typed scalars, the key/value record, total order, wire format |
//! | [`memtable`] | Bounded in-memory ordered table with flush-on-overflow |
//! | [`sstable`] | Run file I/O — write/load an immutable sorted run |
//! | [`manifest`] | Run catalog — newest-wins search, oldest-to-newest scan |
//! | [`engine`] | Embedding API: open, close, put, get, scan |
//! | [`encoding`] | Deterministic binary encode/decode traits shared by the above |
//!
//! ## Non-goals
//!
//! No concurrent access to a single handle, no write-ahead log or
//! `fsync` discipline, no background compaction, no per-key deletion, no
//! secondary indexing, no transactions, no networked access.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use typedstore::engine::{Engine, EngineConfig};
//! use typedstore::record::Scalar;
//!
//! let mut db = Engine::open("/tmp/my_db", EngineConfig::default()).unwrap();
//!
//! db.put(Scalar::Int(1), Scalar::Str("one".into())).unwrap();
//! assert_eq!(db.get(Scalar::Int(1)).unwrap(), Some(Scalar::Str("one".into())));
//!
//! let hits = db.scan(Scalar::Int(0), Scalar::Int(10)).unwrap();
//! assert_eq!(hits.len(), 1);
//!
//! db.close().unwrap();
//! ```

#![allow(dead_code)]

pub mod encoding;
pub mod engine;
pub mod manifest;
pub mod memtable;
pub mod record;
pub mod sstable;
