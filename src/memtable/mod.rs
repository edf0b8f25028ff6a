//! The ordered in-memory table that absorbs writes.
//!
//! A [`Memtable`] is a key-ordered map bounded by a capacity `M`. A `put`
//! that would push the table past `M` distinct keys instead flushes the
//! current contents to a fresh run file (via [`crate::sstable::write_run`])
//! before accepting the new key — see [`Memtable::put`] for the exact
//! state machine.
//!
//! `BTreeMap` is the balanced ordered structure backing the table: it
//! gives the O(log n) point operations and O(k + log n) range scans the
//! design calls for without hand-rolling a red-black tree, and its
//! `Ord`-based deduplication is exactly what collapses cross-tag-equal
//! keys (`INT(100)` and `LONG(100)` are the same map key).

#[cfg(test)]
mod tests;

use std::collections::BTreeMap;
use std::path::PathBuf;

use thiserror::Error;
use tracing::trace;

use crate::record::{Record, Scalar};
use crate::sstable::{self, FlushInfo, RunError, RunFileCounter};

/// Errors raised by the memory table.
#[derive(Debug, Error)]
pub enum MemtableError {
    /// Flushing the table to a run file failed. The table is left
    /// untouched; the caller may retry the `put`.
    #[error(transparent)]
    Flush(#[from] RunError),
}

/// The bounded, ordered in-memory table (component B).
pub struct Memtable {
    table: BTreeMap<Scalar, Scalar>,
    capacity: usize,
    run_dir: PathBuf,
    counter: RunFileCounter,
}

impl Memtable {
    /// Creates an empty table bounded by `capacity`, writing any future
    /// flush into `run_dir` using a filename counter seeded from
    /// `existing_runs` (normally the catalog's run count at open time).
    pub fn new(run_dir: PathBuf, capacity: usize, existing_runs: usize) -> Self {
        Self {
            table: BTreeMap::new(),
            capacity,
            run_dir,
            counter: RunFileCounter::seeded(existing_runs),
        }
    }

    /// Current number of distinct keys held in memory.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// True iff the table holds no records.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Inserts or updates `record`.
    ///
    /// - If `record.key` already exists, its value is overwritten in
    ///   place and `Ok(None)` is returned — no flush, regardless of how
    ///   full the table is (this is deliberate: an update at capacity
    ///   must not create a one-key run).
    /// - If the table has fewer than `capacity` keys, the record is
    ///   inserted and `Ok(None)` is returned.
    /// - Otherwise (table is at capacity and `record.key` is new): the
    ///   current contents are flushed to a new run file, the table is
    ///   cleared, `record` is inserted, and `Ok(Some(flush_info))` is
    ///   returned.
    ///
    /// On flush failure the table is left completely unmodified and the
    /// error propagates to the caller.
    pub fn put(&mut self, record: Record) -> Result<Option<FlushInfo>, MemtableError> {
        let Record { key, value } = record;

        if self.table.contains_key(&key) {
            trace!(key = %key, "memtable update in place");
            self.table.insert(key, value);
            return Ok(None);
        }

        if self.table.len() < self.capacity {
            trace!(key = %key, "memtable insert");
            self.table.insert(key, value);
            return Ok(None);
        }

        let info = self.flush()?;
        self.table.insert(key, value);
        Ok(Some(info))
    }

    /// Flushes the table unconditionally if it is non-empty, for use at
    /// close time. Returns `None` if the table was already empty.
    pub fn flush_if_nonempty(&mut self) -> Result<Option<FlushInfo>, MemtableError> {
        if self.table.is_empty() {
            return Ok(None);
        }
        Ok(Some(self.flush()?))
    }

    fn flush(&mut self) -> Result<FlushInfo, MemtableError> {
        let records: Vec<Record> = self
            .table
            .iter()
            .map(|(key, value)| Record {
                key: key.clone(),
                value: value.clone(),
            })
            .collect();
        let info = sstable::write_run(&self.run_dir, &mut self.counter, &records)?;
        self.table.clear();
        Ok(info)
    }

    /// Looks up `key_probe.key`, returning the matching record or an
    /// empty one if absent. Only the key side of `key_probe` is
    /// consulted.
    pub fn get(&self, key_probe: &Record) -> Record {
        match self.table.get(&key_probe.key) {
            Some(value) => Record {
                key: key_probe.key.clone(),
                value: value.clone(),
            },
            None => Record::empty(),
        }
    }

    /// Inserts every record whose key lies in `[lo.key, hi.key]` into
    /// `out`, overwriting any prior value for the same key — the memory
    /// table is always the newest source, so its values must win.
    pub fn scan(&self, lo: &Record, hi: &Record, out: &mut BTreeMap<Scalar, Scalar>) {
        for (key, value) in self.table.range(lo.key.clone()..=hi.key.clone()) {
            out.insert(key.clone(), value.clone());
        }
    }
}
