//! JSON persistence for timelines and recordings.
//!
//! Layout under the storage root:
//!
//! ```text
//! <root>/timelines/<id>.json
//! <root>/recordings/<id>.json
//! ```
//!
//! Documents missing optional fields load with defaults and unknown fields are
//! ignored. A document that is not valid JSON, or that breaks a timeline
//! invariant, is rejected as a whole and skipped with a warning; it never
//! stops the rest of the directory from loading.

mod error;

pub use error::StorageError;

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::recorder::RecordedEncounter;
use crate::timeline::Timeline;

const TIMELINES_DIR: &str = "timelines";
const RECORDINGS_DIR: &str = "recordings";

pub trait TimelineStore {
    fn load_timelines(&self) -> Result<Vec<Timeline>, StorageError>;
    fn save_timeline(&mut self, timeline: &Timeline) -> Result<(), StorageError>;
    /// Returns whether a document was removed
    fn delete_timeline(&mut self, id: &str) -> Result<bool, StorageError>;
}

pub trait RecordingStore {
    fn save_recording(&mut self, recording: &RecordedEncounter) -> Result<(), StorageError>;
    fn load_recordings(&self) -> Result<Vec<RecordedEncounter>, StorageError>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Document parsing
// ─────────────────────────────────────────────────────────────────────────────

/// Parse and validate one timeline document
pub fn parse_timeline_document(path: &Path, text: &str) -> Result<Timeline, StorageError> {
    let timeline: Timeline = serde_json::from_str(text).map_err(|source| StorageError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    timeline
        .validate()
        .map_err(|reason| StorageError::InvalidDocument {
            path: path.to_path_buf(),
            reason,
        })?;
    Ok(timeline)
}

pub fn parse_recording_document(
    path: &Path,
    text: &str,
) -> Result<RecordedEncounter, StorageError> {
    let recording: RecordedEncounter =
        serde_json::from_str(text).map_err(|source| StorageError::Json {
            path: path.to_path_buf(),
            source,
        })?;
    if recording.id.trim().is_empty() {
        return Err(StorageError::InvalidDocument {
            path: path.to_path_buf(),
            reason: "recording id is empty".to_string(),
        });
    }
    Ok(recording)
}

/// File name for a document id.
///
/// Ids made of `[A-Za-z0-9_-]` are used as-is. Anything else becomes `_` and
/// a short digest of the raw id is appended, so `a/b` and `a_b` never share
/// a file.
fn file_name_for(id: &str) -> String {
    let is_plain = |c: char| c.is_ascii_alphanumeric() || c == '-' || c == '_';
    if !id.is_empty() && id.chars().all(is_plain) {
        return format!("{}.json", id);
    }
    let stem: String = id
        .chars()
        .map(|c| if is_plain(c) { c } else { '_' })
        .collect();
    let digest = Sha256::digest(id.as_bytes());
    let suffix: String = digest[..4].iter().map(|b| format!("{:02x}", b)).collect();
    format!("{}~{}.json", stem, suffix)
}

// ─────────────────────────────────────────────────────────────────────────────
// Directory store
// ─────────────────────────────────────────────────────────────────────────────

/// Stores each document as a pretty-printed JSON file
#[derive(Debug, Clone)]
pub struct JsonDirectoryStore {
    root: PathBuf,
}

impl JsonDirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `<config dir>/cadence`
    pub fn default_root() -> Result<PathBuf, StorageError> {
        dirs::config_dir()
            .map(|dir| dir.join("cadence"))
            .ok_or(StorageError::NoStorageDirectory)
    }

    pub fn open_default() -> Result<Self, StorageError> {
        Ok(Self::new(Self::default_root()?))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn timelines_dir(&self) -> PathBuf {
        self.root.join(TIMELINES_DIR)
    }

    pub fn recordings_dir(&self) -> PathBuf {
        self.root.join(RECORDINGS_DIR)
    }

    fn write_document<T: Serialize>(&self, dir: &Path, id: &str, doc: &T) -> Result<(), StorageError> {
        fs::create_dir_all(dir).map_err(|source| StorageError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = dir.join(file_name_for(id));
        let json = serde_json::to_string_pretty(doc).map_err(|source| StorageError::Json {
            path: path.clone(),
            source,
        })?;

        // Write-then-rename so a crash never leaves a half-written document
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|source| StorageError::Io {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &path).map_err(|source| StorageError::Io {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "Document written");
        Ok(())
    }

    /// Read every `*.json` document in `dir`, in file-name order.
    /// A missing directory is an empty collection.
    fn read_documents<T>(
        &self,
        dir: &Path,
        parse: impl Fn(&Path, &str) -> Result<T, StorageError>,
    ) -> Result<Vec<T>, StorageError> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StorageError::Io {
                    path: dir.to_path_buf(),
                    source,
                });
            }
        };

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();

        let mut documents = Vec::with_capacity(paths.len());
        for path in paths {
            let text = match fs::read_to_string(&path) {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Unreadable document skipped");
                    continue;
                }
            };
            match parse(&path, &text) {
                Ok(doc) => documents.push(doc),
                Err(e) => tracing::warn!(error = %e, "Rejected document skipped"),
            }
        }
        Ok(documents)
    }
}

impl TimelineStore for JsonDirectoryStore {
    fn load_timelines(&self) -> Result<Vec<Timeline>, StorageError> {
        let timelines = self.read_documents(&self.timelines_dir(), parse_timeline_document)?;
        tracing::info!(count = timelines.len(), "Timelines loaded");
        Ok(timelines)
    }

    fn save_timeline(&mut self, timeline: &Timeline) -> Result<(), StorageError> {
        timeline
            .validate()
            .map_err(|reason| StorageError::InvalidDocument {
                path: self.timelines_dir().join(file_name_for(&timeline.id)),
                reason,
            })?;
        self.write_document(&self.timelines_dir(), &timeline.id, timeline)
    }

    fn delete_timeline(&mut self, id: &str) -> Result<bool, StorageError> {
        let path = self.timelines_dir().join(file_name_for(id));
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }
}

impl RecordingStore for JsonDirectoryStore {
    fn save_recording(&mut self, recording: &RecordedEncounter) -> Result<(), StorageError> {
        self.write_document(&self.recordings_dir(), &recording.id, recording)
    }

    fn load_recordings(&self) -> Result<Vec<RecordedEncounter>, StorageError> {
        self.read_documents(&self.recordings_dir(), parse_recording_document)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// In-memory store
// ─────────────────────────────────────────────────────────────────────────────

/// Keeps documents in memory; used when no storage directory is configured
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    timelines: Vec<Timeline>,
    recordings: Vec<RecordedEncounter>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recordings(&self) -> &[RecordedEncounter] {
        &self.recordings
    }
}

impl TimelineStore for MemoryStore {
    fn load_timelines(&self) -> Result<Vec<Timeline>, StorageError> {
        Ok(self.timelines.clone())
    }

    fn save_timeline(&mut self, timeline: &Timeline) -> Result<(), StorageError> {
        match self.timelines.iter_mut().find(|t| t.id == timeline.id) {
            Some(slot) => *slot = timeline.clone(),
            None => self.timelines.push(timeline.clone()),
        }
        Ok(())
    }

    fn delete_timeline(&mut self, id: &str) -> Result<bool, StorageError> {
        let before = self.timelines.len();
        self.timelines.retain(|t| t.id != id);
        Ok(self.timelines.len() != before)
    }
}

impl RecordingStore for MemoryStore {
    fn save_recording(&mut self, recording: &RecordedEncounter) -> Result<(), StorageError> {
        self.recordings.push(recording.clone());
        Ok(())
    }

    fn load_recordings(&self) -> Result<Vec<RecordedEncounter>, StorageError> {
        Ok(self.recordings.clone())
    }
}
