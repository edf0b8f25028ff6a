//! The run catalog: an ordered, append-only list of run descriptors with
//! newest-wins point search and oldest-to-newest range scan (component D).
//!
//! The catalog is a single file, `Index.sst`, rewritten wholesale
//! (truncate-and-write) whenever it is flushed — there is no WAL behind
//! it and no `fsync` call, matching the design's durability model: a
//! crash between writes can lose the most recent flush's descriptor, but
//! never corrupts the file in place (the old contents are only replaced
//! after the new buffer is fully assembled in memory).

#[cfg(test)]
mod tests;

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::PathBuf;

use thiserror::Error;
use tracing::{error, info, trace};

use crate::encoding::{Decode, Encode, EncodingError, MAX_VEC_ELEMENTS};
use crate::record::{Record, Scalar};
use crate::sstable::{self, RunDescriptor, RunError, HEADER_CHECKSUM};

/// Name of the catalog file within a database directory.
pub const CATALOG_FILENAME: &str = "Index.sst";

/// Errors raised by the run catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A filesystem operation failed.
    #[error("storage I/O error at {path}: {source}")]
    StorageIo {
        /// Path of the catalog file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The catalog file is present but could not be parsed. Fatal to
    /// `open` — never silently treated as an empty catalog.
    #[error("catalog file is present but unparseable: {reason}")]
    Parse {
        /// Human-readable parse failure detail.
        reason: String,
    },

    /// A descriptor violated the `smallest_key <= largest_key` invariant.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Loading a run referenced by the catalog failed.
    #[error(transparent)]
    Run(#[from] RunError),
}

/// The ordered list of run descriptors plus a handle to the directory
/// they live in (component D).
pub struct RunIndex {
    runs: Vec<RunDescriptor>,
    run_dir: PathBuf,
}

impl RunIndex {
    /// Opens the catalog under `run_dir`: if `Index.sst` is missing, the
    /// index starts empty; if present but empty, likewise empty; if
    /// present and non-empty, it is fully parsed — a parse failure is
    /// fatal and returned as [`CatalogError::Parse`].
    pub fn open(run_dir: PathBuf) -> Result<Self, CatalogError> {
        let runs = reload_catalog(&run_dir)?;
        info!(runs = runs.len(), "catalog loaded");
        Ok(Self { runs, run_dir })
    }

    /// Number of run descriptors currently registered.
    pub fn len(&self) -> usize {
        self.runs.len()
    }

    /// True iff no runs are registered.
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Appends `desc`. Rejected if `desc.smallest_key > desc.largest_key`.
    pub fn add_run(&mut self, desc: RunDescriptor) -> Result<(), CatalogError> {
        if desc.smallest_key > desc.largest_key {
            return Err(CatalogError::InvalidArgument(format!(
                "run {} has smallest_key > largest_key",
                desc.filename
            )));
        }
        trace!(filename = %desc.filename, "registered run in catalog");
        self.runs.push(desc);
        Ok(())
    }

    /// Searches runs from newest to oldest, returning the first non-empty
    /// hit for `key_probe.key`, or an empty record if none of the runs
    /// that could contain the key actually do.
    pub fn search(&self, key_probe: &Record) -> Result<Record, CatalogError> {
        for desc in self.runs.iter().rev() {
            if desc.smallest_key > key_probe.key || key_probe.key > desc.largest_key {
                continue;
            }
            let records = sstable::load_run(&self.run_dir, &desc.filename)?;
            if let Some(hit) = records.into_iter().find(|r| r.key == key_probe.key) {
                return Ok(hit);
            }
        }
        Ok(Record::empty())
    }

    /// Inserts every in-range record from every overlapping run into
    /// `out`, iterating oldest-to-newest so that, for a key updated
    /// across flushes, the newest run's value is the one left standing
    /// in the accumulator.
    pub fn scan(&self, lo: &Record, hi: &Record, out: &mut BTreeMap<Scalar, Scalar>) -> Result<(), CatalogError> {
        for desc in &self.runs {
            if lo.key > desc.largest_key || desc.smallest_key > hi.key {
                continue;
            }
            let records = sstable::load_run(&self.run_dir, &desc.filename)?;
            for record in records {
                if record.key >= lo.key && record.key <= hi.key {
                    out.insert(record.key, record.value);
                }
            }
        }
        Ok(())
    }

    /// Rewrites the catalog file wholesale from the in-memory list.
    pub fn flush_catalog(&self) -> Result<(), CatalogError> {
        let mut buf = Vec::new();
        let num_runs = u32::try_from(self.runs.len())
            .map_err(|_| CatalogError::InvalidArgument(format!("catalog has {} runs, exceeds u32::MAX", self.runs.len())))?;
        num_runs.encode_to(&mut buf).expect("u32 encode is infallible");
        HEADER_CHECKSUM.encode_to(&mut buf).expect("u32 encode is infallible");
        for desc in &self.runs {
            desc.encode_to(&mut buf).map_err(|source| {
                error!(error = %source, "failed to encode run descriptor");
                CatalogError::Parse {
                    reason: source.to_string(),
                }
            })?;
        }

        let path = self.run_dir.join(CATALOG_FILENAME);
        fs::write(&path, &buf).map_err(|source| CatalogError::StorageIo { path, source })?;
        info!(runs = self.runs.len(), "catalog flushed");
        Ok(())
    }
}

fn reload_catalog(run_dir: &std::path::Path) -> Result<Vec<RunDescriptor>, CatalogError> {
    let path = run_dir.join(CATALOG_FILENAME);
    let bytes = match fs::read(&path) {
        Ok(bytes) => bytes,
        Err(source) if source.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => return Err(CatalogError::StorageIo { path, source }),
    };

    if bytes.is_empty() {
        return Ok(Vec::new());
    }

    let (num_runs, mut offset) = u32::decode_from(&bytes).map_err(parse_error)?;
    let (_header_checksum, consumed) = u32::decode_from(&bytes[offset..]).map_err(parse_error)?;
    offset += consumed;

    if num_runs > MAX_VEC_ELEMENTS {
        return Err(CatalogError::Parse {
            reason: format!("catalog declares {num_runs} runs, exceeds MAX_VEC_ELEMENTS ({MAX_VEC_ELEMENTS})"),
        });
    }

    let mut runs = Vec::with_capacity(num_runs as usize);
    for _ in 0..num_runs {
        let (desc, consumed) = RunDescriptor::decode_from(&bytes[offset..]).map_err(parse_error)?;
        offset += consumed;
        runs.push(desc);
    }
    Ok(runs)
}

fn parse_error(source: EncodingError) -> CatalogError {
    CatalogError::Parse {
        reason: source.to_string(),
    }
}
