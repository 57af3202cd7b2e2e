//! In-memory event reader
//!
//! Serves preloaded record sets keyed by path, with the same open/stream/
//! cache lifecycle as a file-backed reader.
//!
//! NOTE: Available in all builds to support integration testing, but should
//! only be used in test code. The read counter exposes how many records the
//! reader has actually served, which lets tests verify the read-flag short
//! circuit without reaching into source internals.

use std::cell::Cell;
use std::collections::HashMap;
use std::io;
use std::path::Path;
use std::rc::Rc;

use crate::models::record::EventRecord;

use super::{EventReader, ReaderError};

/// Reader over preloaded per-path record sets.
#[derive(Default)]
pub struct InMemoryReader {
    files: HashMap<String, Vec<EventRecord>>,
    current: Vec<EventRecord>,
    position: usize,
    cached: bool,
    is_open: bool,
    cross_section: f64,
    random_access: bool,
    reads: Rc<Cell<usize>>,
}

impl InMemoryReader {
    /// Create an empty reader with random access enabled.
    pub fn new() -> Self {
        Self {
            random_access: true,
            ..Self::default()
        }
    }

    /// Preload the records served for `path`.
    pub fn add_file(&mut self, path: impl Into<String>, records: Vec<EventRecord>) {
        self.files.insert(path.into(), records);
    }

    /// Set the cross section reported for every open file.
    pub fn set_cross_section(&mut self, cross_section: f64) {
        self.cross_section = cross_section;
    }

    /// Disable random access, to exercise read-mode validation.
    pub fn set_random_access(&mut self, random_access: bool) {
        self.random_access = random_access;
    }

    /// Shared counter of records served, across both access disciplines.
    pub fn read_counter(&self) -> Rc<Cell<usize>> {
        Rc::clone(&self.reads)
    }
}

impl EventReader for InMemoryReader {
    fn open(&mut self, path: &Path) -> Result<(), ReaderError> {
        let key = path.to_string_lossy().to_string();
        let records = self.files.get(&key).ok_or_else(|| {
            ReaderError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such in-memory file: {}", key),
            ))
        })?;
        self.current = records.clone();
        self.position = 0;
        self.cached = false;
        self.is_open = true;
        Ok(())
    }

    fn close(&mut self) {
        self.current.clear();
        self.position = 0;
        self.cached = false;
        self.is_open = false;
    }

    fn read_next_event(&mut self) -> Result<Option<EventRecord>, ReaderError> {
        if !self.is_open {
            return Err(ReaderError::NotOpen);
        }
        if self.position >= self.current.len() {
            return Ok(None);
        }
        let record = self.current[self.position].clone();
        self.position += 1;
        self.reads.set(self.reads.get() + 1);
        Ok(Some(record))
    }

    fn cache_events(&mut self) -> Result<usize, ReaderError> {
        if !self.is_open {
            return Err(ReaderError::NotOpen);
        }
        self.cached = true;
        Ok(self.current.len())
    }

    fn read_event(&mut self, index: usize) -> Result<EventRecord, ReaderError> {
        if !self.cached || index >= self.current.len() {
            return Err(ReaderError::NoSuchRecord(index));
        }
        self.reads.set(self.reads.get() + 1);
        Ok(self.current[index].clone())
    }

    fn num_events(&self) -> usize {
        if self.cached {
            self.current.len()
        } else {
            0
        }
    }

    fn cross_section(&self) -> f64 {
        self.cross_section
    }

    fn supports_random_access(&self) -> bool {
        self.random_access
    }
}
