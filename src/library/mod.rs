//! Media library collaborators
//!
//! The cleaner never touches a catalog directly. A [`Library`] supplies the
//! snapshot of candidate items and removes single items on request; the
//! file-backed [`JsonLibrary`] is the implementation the CLI uses.

use anyhow::Result;

use crate::cleaner::CandidateItem;

pub mod index;
pub mod walker;

pub use index::{JsonLibrary, RescanSummary};
pub use walker::{DiscoveredMedia, MediaMatcher, discover_media};

/// How far a removal reaches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeleteOptions {
    /// Also delete the file on disk; otherwise only the catalog entry goes
    pub delete_file_location: bool,
}

/// A catalog of media items
pub trait Library {
    /// Snapshot of every media item currently in the catalog
    fn items(&self) -> Result<Vec<CandidateItem>>;

    /// Remove one item. Either the item is gone from the catalog afterwards
    /// or the catalog is unchanged and an error is returned.
    fn delete_item(&mut self, item: &CandidateItem, options: &DeleteOptions) -> Result<()>;
}
