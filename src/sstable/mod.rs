//! Run file I/O — the on-disk format for a single immutable, sorted run.
//!
//! A run file is a header (`num_records`, `header_checksum`) followed by
//! exactly `num_records` serialized [`Record`]s in ascending key order.
//! `header_checksum` is a fixed value (`8`, the combined byte size of the
//! two header fields) rather than a function of the file contents — the
//! same size-only fingerprint [`Record`]'s own checksum field uses.
//!
//! This module owns the monotonically increasing filename counter
//! (`sst_<n>.sst`); the catalog (`manifest`) neither assigns nor tracks
//! filenames, only records them.

#[cfg(test)]
mod tests;

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, trace, warn};

use crate::encoding::{Decode, Encode, EncodingError, MAX_VEC_ELEMENTS};
use crate::record::{Record, Scalar};

/// Fixed header checksum for both run files and the catalog file: the
/// combined byte size of `num_records`/`num_runs` plus the checksum field
/// itself (`4 + 4`). Faithful to the size-only fingerprint scheme used
/// throughout this format — see [`Record`]'s own checksum field.
pub(crate) const HEADER_CHECKSUM: u32 = 8;

/// Errors from writing or loading a run file.
#[derive(Debug, Error)]
pub enum RunError {
    /// A filesystem operation failed.
    #[error("storage I/O error at {path}: {source}")]
    StorageIo {
        /// Path of the file being read or written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The run's header claims more records than the file actually holds.
    #[error("run file {filename} declares {declared} record(s) but the file is truncated")]
    TruncatedRun {
        /// Name of the run file.
        filename: String,
        /// The `num_records` value read from the header.
        declared: u32,
    },

    /// A record's checksum or tag was invalid.
    #[error("corrupt record in {filename} at byte offset {offset}: {source}")]
    CorruptRecord {
        /// Name of the run file.
        filename: String,
        /// Byte offset of the offending record within the file.
        offset: usize,
        /// The underlying decode failure.
        #[source]
        source: EncodingError,
    },

    /// The chosen run filename already exists on disk.
    #[error("run file {filename} already exists")]
    NameCollision {
        /// The colliding filename.
        filename: String,
    },

    /// A caller-supplied argument was invalid (e.g. a run too large to
    /// address with a `u32` record count).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// A run's metadata: filename plus the inclusive key range it covers.
///
/// Produced by [`write_run`] at flush time and owned afterwards by the
/// catalog (`manifest::RunIndex`). Also doubles as the memory table's
/// `FlushInfo` — the two concepts share an identical shape in the design.
#[derive(Debug, Clone)]
pub struct RunDescriptor {
    /// Name of the run file, relative to the database directory.
    pub filename: String,
    /// Smallest key present in the run (or the zero sentinel if empty).
    pub smallest_key: Scalar,
    /// Largest key present in the run (or the zero sentinel if empty).
    pub largest_key: Scalar,
}

/// Alias used at the memory-table/run-I/O boundary, matching the design's
/// own terminology (`put` returns a `FlushInfo`, not a bare descriptor).
pub type FlushInfo = RunDescriptor;

impl Encode for RunDescriptor {
    fn encode_to(&self, buf: &mut Vec<u8>) -> Result<(), EncodingError> {
        self.filename.encode_to(buf)?;
        // The value side of each embedded record is an ignored
        // placeholder; readers must tolerate any value tag there.
        Record {
            key: self.smallest_key.clone(),
            value: Scalar::Int(0),
        }
        .encode_to(buf)?;
        Record {
            key: self.largest_key.clone(),
            value: Scalar::Int(0),
        }
        .encode_to(buf)?;
        Ok(())
    }
}

impl Decode for RunDescriptor {
    fn decode_from(buf: &[u8]) -> Result<(Self, usize), EncodingError> {
        let (filename, mut offset) = String::decode_from(buf)?;
        let (smallest, consumed) = Record::decode_from(&buf[offset..])?;
        offset += consumed;
        let (largest, consumed) = Record::decode_from(&buf[offset..])?;
        offset += consumed;
        Ok((
            RunDescriptor {
                filename,
                smallest_key: smallest.key,
                largest_key: largest.key,
            },
            offset,
        ))
    }
}

/// Owns the monotonically increasing `sst_<n>.sst` filename counter.
///
/// The counter is local, process-wide state of this component (§9 Design
/// Notes): on reopen it is re-seeded from the catalog's run count, never
/// by scanning the directory (the directory may hold files belonging to
/// an unrelated database sharing the same path prefix).
#[derive(Debug, Clone, Copy)]
pub struct RunFileCounter {
    next: u64,
}

impl RunFileCounter {
    /// A counter re-seeded from `existing_runs` (typically the catalog's
    /// descriptor count at open time).
    pub fn seeded(existing_runs: usize) -> Self {
        Self {
            next: existing_runs as u64,
        }
    }

    /// Returns the next filename and advances the counter.
    fn next_name(&mut self) -> String {
        let name = format!("sst_{}.sst", self.next);
        self.next += 1;
        name
    }
}

impl Default for RunFileCounter {
    fn default() -> Self {
        Self::seeded(0)
    }
}

/// Writes `records` (already in ascending key order) to a fresh run file
/// under `run_dir`, returning its descriptor.
///
/// An empty `records` slice still produces a valid (zero-record) file and
/// a descriptor whose keys are the empty sentinel.
pub fn write_run(run_dir: &Path, counter: &mut RunFileCounter, records: &[Record]) -> Result<RunDescriptor, RunError> {
    let filename = counter.next_name();
    let path = run_dir.join(&filename);
    if path.exists() {
        return Err(RunError::NameCollision { filename });
    }

    let num_records = u32::try_from(records.len())
        .map_err(|_| RunError::InvalidArgument(format!("run has {} records, exceeds u32::MAX", records.len())))?;

    let mut buf = Vec::new();
    num_records
        .encode_to(&mut buf)
        .expect("u32 encode is infallible");
    HEADER_CHECKSUM.encode_to(&mut buf).expect("u32 encode is infallible");
    for record in records {
        record.encode_to(&mut buf).map_err(|source| RunError::CorruptRecord {
            filename: filename.clone(),
            offset: buf.len(),
            source,
        })?;
    }

    fs::write(&path, &buf).map_err(|source| RunError::StorageIo {
        path: path.clone(),
        source,
    })?;

    let (smallest_key, largest_key) = match (records.first(), records.last()) {
        (Some(first), Some(last)) => (first.key.clone(), last.key.clone()),
        _ => (Scalar::Int(0), Scalar::Int(0)),
    };

    info!(
        filename = %filename,
        records = records.len(),
        smallest = %smallest_key,
        largest = %largest_key,
        "flushed run"
    );

    Ok(RunDescriptor {
        filename,
        smallest_key,
        largest_key,
    })
}

/// Loads every record from `run_dir/filename` into a freshly-built,
/// caller-owned vector (already in the file's stored order).
///
/// A zero-length file is tolerated and yields an empty run, matching the
/// abandoned plaintext layout's on-disk convention.
pub fn load_run(run_dir: &Path, filename: &str) -> Result<Vec<Record>, RunError> {
    let path = run_dir.join(filename);
    let bytes = fs::read(&path).map_err(|source| RunError::StorageIo {
        path: path.clone(),
        source,
    })?;

    if bytes.is_empty() {
        warn!(filename, "loaded empty run file via plaintext-compat path");
        return Ok(Vec::new());
    }

    let (num_records, mut offset) = u32::decode_from(&bytes).map_err(|_| RunError::TruncatedRun {
        filename: filename.to_string(),
        declared: 0,
    })?;
    let (_header_checksum, consumed) = u32::decode_from(&bytes[offset..]).map_err(|_| RunError::TruncatedRun {
        filename: filename.to_string(),
        declared: num_records,
    })?;
    offset += consumed;

    if num_records > MAX_VEC_ELEMENTS {
        return Err(RunError::TruncatedRun {
            filename: filename.to_string(),
            declared: num_records,
        });
    }

    let mut records = Vec::with_capacity(num_records as usize);
    for _ in 0..num_records {
        match Record::decode_from(&bytes[offset..]) {
            Ok((record, consumed)) => {
                records.push(record);
                offset += consumed;
            }
            Err(EncodingError::UnexpectedEof { .. }) => {
                return Err(RunError::TruncatedRun {
                    filename: filename.to_string(),
                    declared: num_records,
                });
            }
            Err(source) => {
                return Err(RunError::CorruptRecord {
                    filename: filename.to_string(),
                    offset,
                    source,
                });
            }
        }
    }

    trace!(filename, records = records.len(), "loaded run");
    Ok(records)
}
