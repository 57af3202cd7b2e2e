//! Event sources and the read-mode state machine
//!
//! An [`EventSource`] owns everything needed to feed one stream of
//! pre-generated events into the overlay loop: the configured file list and
//! its FIFO processing queue, a read-mode state machine over cached record
//! indices, exactly one sampling policy, a transform chain, an open map of
//! named double parameters, and the format reader for the files.
//!
//! End-of-file surfaces as [`ReadOutcome::FileExhausted`] and is recovered
//! by advancing the file queue; an empty queue is [`SourceError::EndOfData`]
//! and is fatal for the run. Neither is ever silently dropped: a source that
//! runs dry unnoticed would corrupt the statistical normalization of the
//! whole sample.

use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::{ConfigError, SourceConfig};
use crate::models::event::PrimaryEvent;
use crate::models::particle::Particle;
use crate::models::record::{EventRecord, TrackRecord};
use crate::models::vertex::Vertex;
use crate::reader::{EventReader, ReaderError};
use crate::rng::RngManager;
use crate::sampling::SamplingPolicy;
use crate::transform::{Transform, TransformChain};

/// Shuffle window for SemiRandom mode: randomization never moves an index
/// outside its 1024-record block.
pub const SEMI_RANDOM_BLOCK_SIZE: usize = 1024;

/// How records are read from each open file.
///
/// Fixed at configuration time; all modes except `Sequential` require the
/// source's reader to support random access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadMode {
    /// Stream records in file order without caching
    Sequential,

    /// Cache all record indices, consume them in natural order
    Linear,

    /// Cache all record indices, full shuffle, consume in order: every
    /// record is read exactly once per file pass with no duplicates
    Random,

    /// Fresh uniform index per read; repeats and gaps are possible
    PureRandom,

    /// Shuffle within 1024-record blocks, consume in order
    SemiRandom,
}

impl ReadMode {
    /// True for every mode that serves records by cached index.
    pub fn requires_random_access(self) -> bool {
        !matches!(self, ReadMode::Sequential)
    }

    /// True for modes that consume a prebuilt index list by cursor.
    fn uses_index_list(self) -> bool {
        matches!(self, ReadMode::Linear | ReadMode::Random | ReadMode::SemiRandom)
    }
}

/// Outcome of one read attempt on a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// A record is loaded and ready for `build_primaries`
    Ready,

    /// The open file has no more records; advance the file queue and retry
    FileExhausted,
}

/// Errors from an event source. All of these are fatal at the run boundary.
// Display/Error are implemented by hand: thiserror's derive treats any field
// named `source` as an error cause, but here `source` is the event-source name.
#[derive(Debug)]
pub enum SourceError {
    EndOfData { source: String },

    NoSuchRecord { source: String, index: usize },

    Reader { source: String, error: ReaderError },

    MalformedRecord { source: String, message: String },
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceError::EndOfData { source } => {
                write!(f, "Event source '{source}' ran out of files")
            }
            SourceError::NoSuchRecord { source, index } => {
                write!(f, "No such record index {index} in source '{source}'")
            }
            SourceError::Reader { source, error } => {
                write!(f, "Error reading events from '{source}': {error}")
            }
            SourceError::MalformedRecord { source, message } => {
                write!(f, "Malformed record in source '{source}': {message}")
            }
        }
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SourceError::Reader { error, .. } => Some(error),
            _ => None,
        }
    }
}

/// One configured, independently-sampled provider of pre-generated events.
///
/// # Example
/// ```no_run
/// use overlay_engine_core_rs::{EventSource, JsonLinesReader, ReadMode, SamplingPolicy};
///
/// let mut source = EventSource::new("signal", Box::new(JsonLinesReader::new()));
/// source.add_file("/data/signal_0.jsonl");
/// source.set_read_mode(ReadMode::Random).unwrap();
/// source.set_sampling(SamplingPolicy::poisson(0.5).unwrap());
/// ```
pub struct EventSource {
    /// Unique source name, used in every error message
    name: String,

    /// Configured input files, in submission order
    files: Vec<PathBuf>,

    /// Processing queue, drained over the run
    file_queue: VecDeque<PathBuf>,

    /// Read-mode state machine selector
    read_mode: ReadMode,

    /// When false, reads are skipped and the held record is reused
    read_flag: bool,

    /// Cached record indices in consumption order (index-list modes only)
    event_list: Vec<usize>,

    /// Position in `event_list`
    cursor: usize,

    /// Draw-count policy for this source
    sampling: SamplingPolicy,

    /// Geometric transforms applied to every draw
    transforms: TransformChain,

    /// Open named double parameters
    params: HashMap<String, f64>,

    /// Format reader for the input files
    reader: Box<dyn EventReader>,

    /// Record loaded by the last successful read
    current: Option<EventRecord>,
}

impl EventSource {
    /// Create a source with defaults: sequential reads, read flag on, and
    /// a fixed sampling of one draw per tick.
    pub fn new(name: impl Into<String>, reader: Box<dyn EventReader>) -> Self {
        Self {
            name: name.into(),
            files: Vec::new(),
            file_queue: VecDeque::new(),
            read_mode: ReadMode::Sequential,
            read_flag: true,
            event_list: Vec::new(),
            cursor: 0,
            sampling: SamplingPolicy::Fixed { count: 1.0 },
            transforms: TransformChain::new(),
            params: HashMap::new(),
            reader,
            current: None,
        }
    }

    /// Build a fully-configured source from a validated config.
    pub fn from_config(
        config: &SourceConfig,
        reader: Box<dyn EventReader>,
    ) -> Result<Self, ConfigError> {
        if config.files.is_empty() {
            return Err(ConfigError::NoFiles(config.name.clone()));
        }

        let mut source = Self::new(config.name.clone(), reader);
        for file in &config.files {
            source.add_file(file.clone());
        }
        source.set_read_mode(config.read_mode)?;
        source.set_sampling(config.sampling.build()?);
        for transform in &config.transforms {
            source.add_transform(transform.build()?);
        }
        for (key, value) in &config.params {
            source.set_param(key.clone(), *value);
        }
        Ok(source)
    }

    /// Unique name of this source
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Configured input files
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Add an input file to the end of the configured list.
    pub fn add_file(&mut self, file: impl Into<PathBuf>) {
        self.files.push(file.into());
    }

    /// Current read mode
    pub fn read_mode(&self) -> ReadMode {
        self.read_mode
    }

    /// Set the read mode, validated against the reader's capability.
    /// Illegal to change mid-run; set it once at configuration time.
    pub fn set_read_mode(&mut self, mode: ReadMode) -> Result<(), ConfigError> {
        if mode.requires_random_access() && !self.reader.supports_random_access() {
            return Err(ConfigError::InvalidReadMode {
                source: self.name.clone(),
                mode,
            });
        }
        self.read_mode = mode;
        Ok(())
    }

    /// Replace the sampling policy.
    pub fn set_sampling(&mut self, sampling: SamplingPolicy) {
        self.sampling = sampling;
    }

    /// Current sampling policy
    pub fn sampling(&self) -> &SamplingPolicy {
        &self.sampling
    }

    /// Number of draws to take from this source for the given event.
    pub fn sample_count(&self, event_id: u64, rng: &mut RngManager) -> u64 {
        self.sampling.number_of_events(event_id, rng)
    }

    /// Append a transform to this source's chain.
    pub fn add_transform(&mut self, transform: Transform) {
        self.transforms.add(transform);
    }

    /// The transform chain
    pub fn transforms(&self) -> &TransformChain {
        &self.transforms
    }

    /// Apply the transform chain to a generated event.
    pub fn apply_transforms(&self, event: &mut PrimaryEvent, rng: &mut RngManager) {
        self.transforms.apply(event, rng);
    }

    /// Set a named double parameter. The "weight" parameter scales the
    /// weight of every vertex this source builds.
    pub fn set_param(&mut self, name: impl Into<String>, value: f64) {
        self.params.insert(name.into(), value);
    }

    /// Look up a named double parameter.
    pub fn param(&self, name: &str) -> Option<f64> {
        self.params.get(name).copied()
    }

    /// Set the read flag. When false, `read_next` skips the reader entirely
    /// and the held record is rebuilt on the next `build_primaries` call;
    /// filtering collaborators use this to retry an overlay without burning
    /// a new input record.
    pub fn set_read_flag(&mut self, read_flag: bool) {
        self.read_flag = read_flag;
    }

    /// Current read flag
    pub fn read_flag(&self) -> bool {
        self.read_flag
    }

    /// Number of records cached from the open file
    pub fn num_events(&self) -> usize {
        self.reader.num_events()
    }

    /// Queue all configured files and open the first, then run the sampling
    /// setup hook (cross-section pull from the open file's header).
    ///
    /// Called once at run start, before the first tick.
    pub fn initialize(&mut self, rng: &mut RngManager) -> Result<(), SourceError> {
        self.queue_files();
        self.read_next_file(rng)?;

        // A zero cross section means the config left it to the file header
        if let SamplingPolicy::CrossSection {
            cross_section,
            luminosity,
            mean,
        } = &mut self.sampling
        {
            if *cross_section == 0.0 {
                *cross_section = self.reader.cross_section();
            }
            *mean = luminosity.poisson_mean(*cross_section);
            debug!(
                source = %self.name,
                cross_section = *cross_section,
                mean = *mean,
                "calculated Poisson mean from cross section"
            );
        }
        Ok(())
    }

    /// Reset the processing queue from the configured file list.
    pub fn queue_files(&mut self) {
        self.file_queue = self.files.iter().cloned().collect();
    }

    /// Pop and open the next queued file. For any non-sequential mode this
    /// rebuilds the record cache and the shuffled index list before the
    /// read is retried. An empty queue is fatal `EndOfData`.
    pub fn read_next_file(&mut self, rng: &mut RngManager) -> Result<(), SourceError> {
        let Some(path) = self.file_queue.pop_front() else {
            return Err(SourceError::EndOfData {
                source: self.name.clone(),
            });
        };

        debug!(source = %self.name, path = %path.display(), "opening next file");
        self.reader.open(&path).map_err(|error| SourceError::Reader {
            source: self.name.clone(),
            error,
        })?;
        self.current = None;

        if self.read_mode.requires_random_access() {
            let count = self
                .reader
                .cache_events()
                .map_err(|error| SourceError::Reader {
                    source: self.name.clone(),
                    error,
                })?;
            self.create_event_list(count, rng);
        }
        Ok(())
    }

    /// Build the index consumption order for the freshly cached file.
    fn create_event_list(&mut self, count: usize, rng: &mut RngManager) {
        self.cursor = 0;
        self.event_list.clear();
        if !self.read_mode.uses_index_list() {
            return;
        }

        self.event_list.extend(0..count);
        match self.read_mode {
            ReadMode::Random => rng.shuffle(&mut self.event_list),
            ReadMode::SemiRandom => {
                let blocks = count / SEMI_RANDOM_BLOCK_SIZE;
                for block in 0..blocks {
                    let start = block * SEMI_RANDOM_BLOCK_SIZE;
                    rng.shuffle(&mut self.event_list[start..start + SEMI_RANDOM_BLOCK_SIZE]);
                }
                // Final partial block
                rng.shuffle(&mut self.event_list[blocks * SEMI_RANDOM_BLOCK_SIZE..]);
            }
            _ => {}
        }

        trace!(
            source = %self.name,
            count,
            head = ?&self.event_list[..self.event_list.len().min(20)],
            "built event index list"
        );
    }

    /// Advance the read-mode state machine by one record.
    ///
    /// With the read flag off the held record is reused and the reader is
    /// not touched. `FileExhausted` means the caller should advance the
    /// file queue via [`read_next_file`](Self::read_next_file) and retry
    /// exactly once.
    pub fn read_next(&mut self, rng: &mut RngManager) -> Result<ReadOutcome, SourceError> {
        if !self.read_flag {
            trace!(source = %self.name, "read flag off, reusing held record");
            return Ok(ReadOutcome::Ready);
        }

        match self.read_mode {
            ReadMode::Sequential => {
                let next = self
                    .reader
                    .read_next_event()
                    .map_err(|error| SourceError::Reader {
                        source: self.name.clone(),
                        error,
                    })?;
                match next {
                    Some(record) => {
                        self.current = Some(record);
                        Ok(ReadOutcome::Ready)
                    }
                    None => Ok(ReadOutcome::FileExhausted),
                }
            }
            ReadMode::PureRandom => {
                let count = self.reader.num_events();
                if count == 0 {
                    return Ok(ReadOutcome::FileExhausted);
                }
                let index = rng.range(0, count as i64) as usize;
                self.current = Some(self.read_record(index)?);
                Ok(ReadOutcome::Ready)
            }
            ReadMode::Linear | ReadMode::Random | ReadMode::SemiRandom => {
                if self.cursor >= self.event_list.len() {
                    return Ok(ReadOutcome::FileExhausted);
                }
                let index = self.event_list[self.cursor];
                self.cursor += 1;
                // Indices are consumed but never removed, so "exactly once
                // per pass" stays verifiable across ticks
                self.current = Some(self.read_record(index)?);
                Ok(ReadOutcome::Ready)
            }
        }
    }

    /// Fetch a cached record by index, mapping out-of-bounds to the fatal
    /// `NoSuchRecord` error.
    fn read_record(&mut self, index: usize) -> Result<EventRecord, SourceError> {
        self.reader.read_event(index).map_err(|error| match error {
            ReaderError::NoSuchRecord(index) => SourceError::NoSuchRecord {
                source: self.name.clone(),
                index,
            },
            error => SourceError::Reader {
                source: self.name.clone(),
                error,
            },
        })
    }

    /// Build primary vertices and particle trees from the held record into
    /// the caller's scratch event.
    ///
    /// Each parentless track seeds one vertex at its position; daughter
    /// tracks attach to their parent's particle. When no record is held the
    /// scratch event stays empty, which the orchestrator silently drops.
    pub fn build_primaries(&self, scratch: &mut PrimaryEvent) -> Result<(), SourceError> {
        let Some(record) = &self.current else {
            return Ok(());
        };

        let tracks = &record.tracks;
        for (index, track) in tracks.iter().enumerate() {
            if let Some(parent) = track.parent {
                if parent >= index {
                    return Err(SourceError::MalformedRecord {
                        source: self.name.clone(),
                        message: format!(
                            "track {} has parent {} at or past itself",
                            index, parent
                        ),
                    });
                }
            }
        }

        let mut children: Vec<Vec<usize>> = vec![Vec::new(); tracks.len()];
        let mut roots = Vec::new();
        for (index, track) in tracks.iter().enumerate() {
            match track.parent {
                Some(parent) => children[parent].push(index),
                None => roots.push(index),
            }
        }

        let weight = record.weight * self.params.get("weight").copied().unwrap_or(1.0);
        for root in roots {
            let track = &tracks[root];
            let mut vertex = Vertex::new(track.x, track.y, track.z);
            vertex.set_weight(weight);
            vertex.add_particle(build_particle(root, tracks, &children));
            scratch.add_vertex(vertex);
        }
        Ok(())
    }
}

/// Recursively assemble a particle and its daughter tree from flat tracks.
fn build_particle(index: usize, tracks: &[TrackRecord], children: &[Vec<usize>]) -> Particle {
    let track = &tracks[index];
    let mut particle = Particle::new(track.pdg_id, track.px, track.py, track.pz, track.energy);
    for &child in &children[index] {
        particle.add_daughter(build_particle(child, tracks, children));
    }
    particle
}
