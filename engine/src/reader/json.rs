//! JSON Lines event file reader
//!
//! File layout: the first line is a header object (`{"cross_section": ...}`,
//! value in picobarn, 0 when not applicable), and every following line is
//! one serialized [`EventRecord`]. Blank lines are skipped. This is the
//! bundled on-disk format; physics formats live behind the same trait in
//! their own crates.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::models::record::EventRecord;

use super::{EventReader, ReaderError};

#[derive(Debug, Deserialize)]
struct FileHeader {
    #[serde(default)]
    cross_section: f64,
}

/// Streaming reader for JSON Lines event files with random-access caching.
#[derive(Default)]
pub struct JsonLinesReader {
    stream: Option<BufReader<File>>,
    path: Option<PathBuf>,
    cross_section: f64,
    records: Vec<EventRecord>,
    line: usize,
}

impl JsonLinesReader {
    /// Create a reader with no file open.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read one non-blank line; `Ok(None)` at end of file.
    fn next_line(&mut self) -> Result<Option<String>, ReaderError> {
        let stream = self.stream.as_mut().ok_or(ReaderError::NotOpen)?;
        let mut buffer = String::new();
        loop {
            buffer.clear();
            let bytes = stream.read_line(&mut buffer)?;
            if bytes == 0 {
                return Ok(None);
            }
            self.line += 1;
            if !buffer.trim().is_empty() {
                return Ok(Some(buffer));
            }
        }
    }
}

impl EventReader for JsonLinesReader {
    fn open(&mut self, path: &Path) -> Result<(), ReaderError> {
        self.close();

        let file = File::open(path)?;
        self.stream = Some(BufReader::new(file));
        self.path = Some(path.to_path_buf());

        // First line is always the header
        let header_line = self.next_line()?.ok_or(ReaderError::Malformed {
            line: 0,
            message: "missing header line".to_string(),
        })?;
        let header: FileHeader =
            serde_json::from_str(header_line.trim()).map_err(|err| ReaderError::Malformed {
                line: self.line,
                message: err.to_string(),
            })?;
        self.cross_section = header.cross_section;

        debug!(
            path = %path.display(),
            cross_section = self.cross_section,
            "opened event file"
        );
        Ok(())
    }

    fn close(&mut self) {
        self.stream = None;
        self.path = None;
        self.cross_section = 0.0;
        self.records.clear();
        self.line = 0;
    }

    fn read_next_event(&mut self) -> Result<Option<EventRecord>, ReaderError> {
        let Some(line) = self.next_line()? else {
            return Ok(None);
        };
        let record =
            serde_json::from_str(line.trim()).map_err(|err| ReaderError::Malformed {
                line: self.line,
                message: err.to_string(),
            })?;
        Ok(Some(record))
    }

    fn cache_events(&mut self) -> Result<usize, ReaderError> {
        self.records.clear();
        while let Some(record) = self.read_next_event()? {
            self.records.push(record);
        }
        if let Some(path) = &self.path {
            debug!(
                path = %path.display(),
                records = self.records.len(),
                "cached records for random access"
            );
        }
        Ok(self.records.len())
    }

    fn read_event(&mut self, index: usize) -> Result<EventRecord, ReaderError> {
        self.records
            .get(index)
            .cloned()
            .ok_or(ReaderError::NoSuchRecord(index))
    }

    fn num_events(&self) -> usize {
        self.records.len()
    }

    fn cross_section(&self) -> f64 {
        self.cross_section
    }

    fn supports_random_access(&self) -> bool {
        true
    }
}
