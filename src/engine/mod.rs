//! The embedding API: `open`/`close`/`put`/`get`/`scan` over a single
//! database directory.
//!
//! This facade is deliberately thin — it owns no algorithmic complexity
//! of its own, only the wiring between the memory table (component B)
//! and the run catalog (component D), plus directory lifecycle. A single
//! [`Engine`] handle is not safe to share across threads or to open
//! twice against the same directory concurrently.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::PathBuf;

use thiserror::Error;
use tracing::{error, info, trace};

use crate::manifest::{CatalogError, RunIndex};
use crate::memtable::{Memtable, MemtableError};
use crate::record::{Record, Scalar};
use crate::sstable::RunError;

#[cfg(test)]
mod tests;

/// Configuration for [`Engine::open`].
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    /// Maximum number of distinct keys the memory table holds before a
    /// `put` triggers a flush (the design's capacity `M`).
    pub memtable_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { memtable_capacity: 1024 }
    }
}

/// Errors surfaced by the embedding API, aggregating every lower layer.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The memory table rejected an operation.
    #[error(transparent)]
    Memtable(#[from] MemtableError),

    /// The run catalog rejected an operation.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// A run file operation failed directly (outside the catalog, e.g.
    /// during `open`'s directory setup).
    #[error(transparent)]
    Run(#[from] RunError),

    /// A filesystem operation outside the core subsystems failed (e.g.
    /// creating the database directory).
    #[error("storage I/O error at {path}: {source}")]
    StorageIo {
        /// Path of the directory or file involved.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// An operation was attempted before `open` completed or after
    /// `close` consumed the handle's resources.
    #[error("operation attempted on a closed or unopened handle")]
    NotOpen,

    /// `scan` was called with `lo > hi`.
    #[error("invalid scan range: lo ({lo}) > hi ({hi})")]
    InvalidRange {
        /// The requested lower bound.
        lo: String,
        /// The requested upper bound.
        hi: String,
    },
}

/// A handle to an open database directory.
pub struct Engine {
    data_dir: PathBuf,
    memtable: Option<Memtable>,
    index: Option<RunIndex>,
}

impl Engine {
    /// Opens (creating if missing) the database directory at `data_dir`,
    /// reloading its catalog and re-seeding the run filename counter from
    /// the catalog's size.
    pub fn open(data_dir: impl Into<PathBuf>, config: EngineConfig) -> Result<Self, EngineError> {
        let data_dir = data_dir.into();
        fs::create_dir_all(&data_dir).map_err(|source| EngineError::StorageIo {
            path: data_dir.clone(),
            source,
        })?;

        let index = RunIndex::open(data_dir.clone())?;
        let memtable = Memtable::new(data_dir.clone(), config.memtable_capacity, index.len());

        info!(dir = %data_dir.display(), runs = index.len(), "engine opened");
        Ok(Self {
            data_dir,
            memtable: Some(memtable),
            index: Some(index),
        })
    }

    /// Inserts or updates `key` with `value`. On a triggered flush, the
    /// resulting run descriptor is registered with the catalog.
    pub fn put(&mut self, key: Scalar, value: Scalar) -> Result<(), EngineError> {
        trace!(key = %key, "engine put");
        let memtable = self.memtable.as_mut().ok_or(EngineError::NotOpen)?;
        if let Some(flush_info) = memtable.put(Record { key, value })? {
            let index = self.index.as_mut().ok_or(EngineError::NotOpen)?;
            index.add_run(flush_info)?;
        }
        Ok(())
    }

    /// Looks up `key`: memory table first, then the catalog newest-first.
    /// Returns `None` if no record for `key` has ever been written.
    pub fn get(&self, key: Scalar) -> Result<Option<Scalar>, EngineError> {
        trace!(key = %key, "engine get");
        let memtable = self.memtable.as_ref().ok_or(EngineError::NotOpen)?;
        let index = self.index.as_ref().ok_or(EngineError::NotOpen)?;

        let probe = Record {
            key,
            value: Scalar::Int(0),
        };

        let hit = memtable.get(&probe);
        if !hit.is_empty() {
            return Ok(Some(hit.value));
        }

        let hit = index.search(&probe)?;
        Ok(if hit.is_empty() { None } else { Some(hit.value) })
    }

    /// Returns every record whose key lies in `[lo, hi]`, ascending by
    /// key, merging the memory table and every overlapping run with
    /// newest-wins semantics.
    pub fn scan(&self, lo: Scalar, hi: Scalar) -> Result<Vec<Record>, EngineError> {
        trace!(lo = %lo, hi = %hi, "engine scan");
        if lo > hi {
            return Err(EngineError::InvalidRange {
                lo: lo.to_string(),
                hi: hi.to_string(),
            });
        }
        let memtable = self.memtable.as_ref().ok_or(EngineError::NotOpen)?;
        let index = self.index.as_ref().ok_or(EngineError::NotOpen)?;

        let lo_probe = Record {
            key: lo,
            value: Scalar::Int(0),
        };
        let hi_probe = Record {
            key: hi,
            value: Scalar::Int(0),
        };

        let mut acc: BTreeMap<Scalar, Scalar> = BTreeMap::new();
        // Runs first (oldest-to-newest), then the memory table, so the
        // newest value for any duplicated key is the one left standing.
        index.scan(&lo_probe, &hi_probe, &mut acc)?;
        memtable.scan(&lo_probe, &hi_probe, &mut acc);

        Ok(acc.into_iter().map(|(key, value)| Record { key, value }).collect())
    }

    /// Flushes a non-empty memory table, writes the catalog, and releases
    /// the handle's resources. Further operations on this handle fail
    /// with [`EngineError::NotOpen`].
    pub fn close(&mut self) -> Result<(), EngineError> {
        let mut memtable = self.memtable.take().ok_or(EngineError::NotOpen)?;
        let mut index = self.index.take().ok_or(EngineError::NotOpen)?;

        if let Some(flush_info) = memtable.flush_if_nonempty()? {
            index.add_run(flush_info)?;
        }
        if let Err(source) = index.flush_catalog() {
            error!(error = %source, dir = %self.data_dir.display(), "failed to flush catalog on close");
            return Err(source.into());
        }

        info!(dir = %self.data_dir.display(), "engine closed");
        Ok(())
    }
}
