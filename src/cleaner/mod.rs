//! Size-threshold cleaner
//!
//! Examines a snapshot of catalog items, finds the ones whose files are
//! smaller than a byte threshold, and removes them through a deletion
//! capability supplied by the caller. The cleaner owns no catalog, no
//! configuration and no threads: hosts decide when to run it and what
//! "remove" means.

pub mod cancel;
pub mod core;
mod progress;
pub mod types;

pub use cancel::CancellationToken;
pub use self::core::SizeThresholdCleaner;
pub use progress::PROGRESS_COMPLETE;
pub use types::{
    BYTES_PER_MEGABYTE, CandidateItem, ItemRecord, ItemStatus, MediaKind, RunOutcome, ScanResult,
    Threshold,
};
