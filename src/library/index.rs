use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use super::walker::{MediaMatcher, discover_media};
use super::{DeleteOptions, Library};
use crate::cleaner::{CandidateItem, MediaKind};

const CATALOG_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct CatalogFile {
    version: u32,
    #[serde(default)]
    items: Vec<CandidateItem>,
}

/// Counts from rebuilding the catalog against the library root
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RescanSummary {
    pub added: usize,
    pub kept: usize,
    pub dropped: usize,
}

/// Media catalog persisted as a JSON index file
///
/// Every mutation that goes through [`Library::delete_item`] is written back
/// before it returns, so a sweep removing m items rewrites the whole index m
/// times. That keeps an interrupted sweep consistent; very large catalogs pay
/// for it in write volume.
#[derive(Debug)]
pub struct JsonLibrary {
    path: PathBuf,
    items: Vec<CandidateItem>,
}

impl JsonLibrary {
    /// Open the catalog at `path`; a missing file is an empty catalog
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let items = match fs::read_to_string(&path) {
            Ok(content) => {
                let catalog: CatalogFile = serde_json::from_str(&content)
                    .with_context(|| format!("Failed to parse catalog: {}", path.display()))?;
                if catalog.version > CATALOG_VERSION {
                    anyhow::bail!(
                        "Catalog {} has unsupported version {}",
                        path.display(),
                        catalog.version
                    );
                }
                catalog.items
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("No catalog at {}, starting empty", path.display());
                Vec::new()
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read catalog: {}", path.display()));
            }
        };

        Ok(Self { path, items })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> &[CandidateItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add an entry with a fresh id. Not persisted until [`save`](Self::save).
    pub fn add(&mut self, path: impl Into<PathBuf>, kind: MediaKind) -> &CandidateItem {
        let item = CandidateItem::new(Uuid::new_v4().to_string(), path).with_kind(kind);
        self.items.push(item);
        &self.items[self.items.len() - 1]
    }

    /// Write the catalog, replacing the previous file atomically
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let catalog = CatalogFile {
            version: CATALOG_VERSION,
            items: self.items.clone(),
        };
        let content = serde_json::to_string_pretty(&catalog).context("Failed to serialize catalog")?;

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write catalog: {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("Failed to replace catalog: {}", self.path.display()))?;

        Ok(())
    }

    /// Rebuild the catalog from the media files under `root`
    ///
    /// Paths already in the catalog keep their ids; entries whose files are
    /// no longer found are dropped.
    pub fn rescan(&mut self, root: &Path, matcher: &MediaMatcher) -> Result<RescanSummary> {
        let discovered = discover_media(root, matcher)?;

        // Entries without a path can never be matched again and are dropped too
        let previous = self.items.len();
        let mut existing: HashMap<PathBuf, CandidateItem> = self
            .items
            .drain(..)
            .filter_map(|item| item.path.clone().map(|path| (path, item)))
            .collect();

        let mut summary = RescanSummary::default();
        for media in discovered {
            match existing.remove(&media.path) {
                Some(item) => {
                    summary.kept += 1;
                    self.items.push(item.with_kind(media.kind));
                }
                None => {
                    summary.added += 1;
                    self.add(media.path, media.kind);
                }
            }
        }
        summary.dropped = previous - summary.kept;

        tracing::info!(
            "Library scan of {}: {} added, {} kept, {} dropped",
            root.display(),
            summary.added,
            summary.kept,
            summary.dropped
        );

        Ok(summary)
    }
}

impl Library for JsonLibrary {
    fn items(&self) -> Result<Vec<CandidateItem>> {
        Ok(self.items.clone())
    }

    fn delete_item(&mut self, item: &CandidateItem, options: &DeleteOptions) -> Result<()> {
        let position = self
            .items
            .iter()
            .position(|entry| entry.id == item.id)
            .ok_or_else(|| anyhow!("Item {} is not in the catalog", item.id))?;

        let removed = self.items.remove(position);
        if let Err(e) = self.save() {
            self.items.insert(position, removed);
            return Err(e);
        }

        // Catalog removal is committed; deleting the file is best effort
        if options.delete_file_location {
            if let Some(path) = item.resolved_path() {
                match fs::remove_file(path) {
                    Ok(()) => tracing::debug!("Deleted file {}", path.display()),
                    Err(e) if e.kind() == ErrorKind::NotFound => {}
                    Err(e) => tracing::warn!(
                        "Removed {} from the catalog but could not delete the file: {}",
                        path.display(),
                        e
                    ),
                }
            }
        }

        Ok(())
    }
}
