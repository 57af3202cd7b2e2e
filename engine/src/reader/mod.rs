//! Per-format event file readers
//!
//! The engine never parses physics formats itself; it consumes files through
//! the narrow [`EventReader`] trait, one implementation per supported input
//! format. End of file is a value (`Ok(None)`), not an error: sources turn
//! it into a file-queue advance. An out-of-bounds random-access index is an
//! error and is never clamped, because it indicates a caching bug rather
//! than a data condition.

mod json;
mod memory;

use std::path::Path;

use thiserror::Error;

use crate::models::record::EventRecord;

pub use json::JsonLinesReader;
pub use memory::InMemoryReader;

/// Errors from the reader layer.
#[derive(Debug, Error)]
pub enum ReaderError {
    #[error("I/O error reading event file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed record at line {line}: {message}")]
    Malformed { line: usize, message: String },

    #[error("No such record index: {0}")]
    NoSuchRecord(usize),

    #[error("No file is open")]
    NotOpen,
}

/// Narrow interface to an event file format.
///
/// Readers are stateful: `open` binds a file, `read_next_event` streams it,
/// and `cache_events` slurps the remaining records into memory so
/// `read_event` can serve random-access indices.
pub trait EventReader {
    /// Open the file at `path` for reading, replacing any open file.
    fn open(&mut self, path: &Path) -> Result<(), ReaderError>;

    /// Close the open file and drop any cached records.
    fn close(&mut self);

    /// Read the next record from the stream; `Ok(None)` at end of file.
    fn read_next_event(&mut self) -> Result<Option<EventRecord>, ReaderError>;

    /// Cache the open file's records for random access; returns the count.
    fn cache_events(&mut self) -> Result<usize, ReaderError>;

    /// Return the cached record at `index` without consuming it.
    fn read_event(&mut self, index: usize) -> Result<EventRecord, ReaderError>;

    /// Number of records in the cache (0 before `cache_events`).
    fn num_events(&self) -> usize;

    /// Cross section from the file header, or 0.0 if not applicable.
    fn cross_section(&self) -> f64 {
        0.0
    }

    /// True if this reader can serve records by index after caching.
    fn supports_random_access(&self) -> bool;
}
