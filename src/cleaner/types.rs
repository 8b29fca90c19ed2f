use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Conversion factor from the user-facing megabyte value to bytes
pub const BYTES_PER_MEGABYTE: u64 = 1024 * 1024;

/// Minimum acceptable file size in bytes
///
/// Files strictly below the threshold are removal targets. A threshold of
/// zero never matches anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Threshold(u64);

impl Threshold {
    pub const fn from_bytes(bytes: u64) -> Self {
        Self(bytes)
    }

    pub const fn from_megabytes(megabytes: u32) -> Self {
        Self(megabytes as u64 * BYTES_PER_MEGABYTE)
    }

    pub const fn bytes(self) -> u64 {
        self.0
    }

    pub fn megabytes(self) -> f64 {
        self.0 as f64 / BYTES_PER_MEGABYTE as f64
    }

    /// Whether a file of `len` bytes falls below this threshold
    pub const fn is_below(self, len: u64) -> bool {
        len < self.0
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} MB", self.megabytes())
    }
}

/// Kind of media a catalog entry points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    #[default]
    Video,
    Audio,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Video => write!(f, "video"),
            MediaKind::Audio => write!(f, "audio"),
        }
    }
}

/// A media item known to the catalog, bearing an optional path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateItem {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    #[serde(default)]
    pub kind: MediaKind,
}

impl CandidateItem {
    pub fn new(id: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            id: id.into(),
            path: Some(path.into()),
            kind: MediaKind::default(),
        }
    }

    pub fn without_path(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            path: None,
            kind: MediaKind::default(),
        }
    }

    pub fn with_kind(mut self, kind: MediaKind) -> Self {
        self.kind = kind;
        self
    }

    /// Path to stat, or `None` when the path is unset or empty
    pub fn resolved_path(&self) -> Option<&Path> {
        self.path
            .as_deref()
            .filter(|path| !path.as_os_str().is_empty())
    }

    /// File name for log lines, falling back to the id
    pub fn display_name(&self) -> String {
        self.resolved_path()
            .and_then(|path| path.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.id.clone())
    }
}

/// What happened to a single item during a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemStatus {
    /// At or above the threshold
    Kept { size: u64 },
    /// Path unset, missing, or metadata unreadable
    SkippedMissing,
    /// Classified as below the threshold but not (yet) removed
    BelowThreshold { size: u64 },
    Removed { size: u64 },
    RemovalFailed { size: u64, error: String },
}

impl ItemStatus {
    pub fn size(&self) -> Option<u64> {
        match self {
            ItemStatus::Kept { size }
            | ItemStatus::BelowThreshold { size }
            | ItemStatus::Removed { size }
            | ItemStatus::RemovalFailed { size, .. } => Some(*size),
            ItemStatus::SkippedMissing => None,
        }
    }

    /// True for every item that landed in the removal set
    pub fn is_marked(&self) -> bool {
        matches!(
            self,
            ItemStatus::BelowThreshold { .. }
                | ItemStatus::Removed { .. }
                | ItemStatus::RemovalFailed { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRecord {
    pub item: CandidateItem,
    pub status: ItemStatus,
}

/// Classification of one snapshot, produced fresh on every run
#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    /// One record per examined item, in input order
    pub records: Vec<ItemRecord>,
    pub examined: usize,
    pub skipped_missing: usize,
    pub cancelled: bool,
}

impl ScanResult {
    /// Items below the threshold, in classification order
    pub fn below_threshold(&self) -> impl Iterator<Item = &ItemRecord> {
        self.records.iter().filter(|record| record.status.is_marked())
    }

    pub fn marked_count(&self) -> usize {
        self.below_threshold().count()
    }

    pub fn marked_bytes(&self) -> u64 {
        self.below_threshold()
            .filter_map(|record| record.status.size())
            .sum()
    }
}

/// Counts and per-item records for one completed run
#[derive(Debug, Clone, Default)]
pub struct RunOutcome {
    pub examined: usize,
    pub skipped_missing: usize,
    pub marked_for_removal: usize,
    pub removed: usize,
    pub failed_to_remove: usize,
    /// Last value handed to the progress sink
    pub final_progress: f64,
    pub cancelled: bool,
    pub records: Vec<ItemRecord>,
}

impl RunOutcome {
    /// Every item that was classified below the threshold
    pub fn removal_set(&self) -> impl Iterator<Item = &CandidateItem> {
        self.records
            .iter()
            .filter(|record| record.status.is_marked())
            .map(|record| &record.item)
    }

    pub fn failures(&self) -> impl Iterator<Item = (&CandidateItem, &str)> {
        self.records.iter().filter_map(|record| match &record.status {
            ItemStatus::RemovalFailed { error, .. } => Some((&record.item, error.as_str())),
            _ => None,
        })
    }

    pub fn bytes_removed(&self) -> u64 {
        self.records
            .iter()
            .filter_map(|record| match record.status {
                ItemStatus::Removed { size } => Some(size),
                _ => None,
            })
            .sum()
    }
}
