use anyhow::{Context, Result};
use std::fs;

use super::cancel::CancellationToken;
use super::progress::{self, PROGRESS_COMPLETE, ProgressReporter};
use super::types::{
    BYTES_PER_MEGABYTE, CandidateItem, ItemRecord, ItemStatus, RunOutcome, ScanResult, Threshold,
};

/// Removes catalog items whose files are smaller than a byte threshold
///
/// A run has two phases over one snapshot of items: classify every item by
/// its on-disk size, then hand each item below the threshold to the caller's
/// deletion capability. Both phases poll the cancellation token between
/// items. The progress sink always receives a final 100, including when the
/// item source fails.
#[derive(Debug, Clone, Copy)]
pub struct SizeThresholdCleaner {
    threshold: Threshold,
}

impl SizeThresholdCleaner {
    pub fn new(threshold: Threshold) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> Threshold {
        self.threshold
    }

    /// Classify and remove a snapshot of items
    pub fn run<D>(
        &self,
        items: &[CandidateItem],
        delete_fn: D,
        progress: Option<&mut dyn FnMut(f64)>,
        cancel: &CancellationToken,
    ) -> RunOutcome
    where
        D: FnMut(&CandidateItem) -> Result<()>,
    {
        let mut reporter = progress::guarded(progress);
        self.sweep(items, delete_fn, &mut *reporter, cancel)
    }

    /// Like [`run`](Self::run), but enumerates the items through `source`
    ///
    /// A source failure is the only fatal error of a run. It is returned
    /// after the final progress report has fired.
    pub fn run_with_source<S, D>(
        &self,
        source: S,
        delete_fn: D,
        progress: Option<&mut dyn FnMut(f64)>,
        cancel: &CancellationToken,
    ) -> Result<RunOutcome>
    where
        S: FnOnce() -> Result<Vec<CandidateItem>>,
        D: FnMut(&CandidateItem) -> Result<()>,
    {
        let mut reporter = progress::guarded(progress);

        let items = source()
            .inspect_err(|e| tracing::error!("Failed to enumerate media items: {:#}", e))
            .context("Failed to enumerate media items")?;

        Ok(self.sweep(&items, delete_fn, &mut *reporter, cancel))
    }

    /// Classify a snapshot without removing anything
    pub fn scan(
        &self,
        items: &[CandidateItem],
        progress: Option<&mut dyn FnMut(f64)>,
        cancel: &CancellationToken,
    ) -> ScanResult {
        let mut reporter = progress::guarded(progress);
        self.classify(items, &mut *reporter, cancel)
    }

    fn sweep<D>(
        &self,
        items: &[CandidateItem],
        mut delete_fn: D,
        reporter: &mut ProgressReporter<'_>,
        cancel: &CancellationToken,
    ) -> RunOutcome
    where
        D: FnMut(&CandidateItem) -> Result<()>,
    {
        if items.is_empty() {
            tracing::info!("No media items found");
            return RunOutcome {
                final_progress: PROGRESS_COMPLETE,
                ..RunOutcome::default()
            };
        }

        tracing::info!(
            "Checking {} media items against the {} threshold",
            items.len(),
            self.threshold
        );

        let mut scan = self.classify(items, reporter, cancel);
        let marked_for_removal = scan.marked_count();
        let mut removed = 0;
        let mut failed_to_remove = 0;
        let mut cancelled = scan.cancelled;

        if marked_for_removal > 0 && !cancelled {
            tracing::info!("Removing {} small media items", marked_for_removal);

            for record in scan
                .records
                .iter_mut()
                .filter(|record| matches!(record.status, ItemStatus::BelowThreshold { .. }))
            {
                if cancel.is_cancelled() {
                    tracing::info!(
                        "Cleanup cancelled after removing {}/{} items",
                        removed,
                        marked_for_removal
                    );
                    cancelled = true;
                    break;
                }

                let size = record.status.size().unwrap_or_default();
                match delete_fn(&record.item) {
                    Ok(()) => {
                        removed += 1;
                        tracing::debug!("Removed {}", record.item.display_name());
                        record.status = ItemStatus::Removed { size };
                    }
                    Err(e) => {
                        failed_to_remove += 1;
                        tracing::error!(
                            "Failed to remove {}: {:#}",
                            record
                                .item
                                .resolved_path()
                                .map(|path| path.display().to_string())
                                .unwrap_or_else(|| record.item.id.clone()),
                            e
                        );
                        record.status = ItemStatus::RemovalFailed {
                            size,
                            error: format!("{e:#}"),
                        };
                    }
                }
            }
        } else if marked_for_removal == 0 {
            tracing::info!("No media items below {} found", self.threshold);
        }

        tracing::info!(
            "Size filter finished: examined {} items, removed {}",
            scan.examined,
            removed
        );

        RunOutcome {
            examined: scan.examined,
            skipped_missing: scan.skipped_missing,
            marked_for_removal,
            removed,
            failed_to_remove,
            final_progress: PROGRESS_COMPLETE,
            cancelled,
            records: scan.records,
        }
    }

    fn classify(
        &self,
        items: &[CandidateItem],
        reporter: &mut ProgressReporter<'_>,
        cancel: &CancellationToken,
    ) -> ScanResult {
        let total = items.len();
        let mut scan = ScanResult {
            records: Vec::with_capacity(total),
            ..ScanResult::default()
        };

        for item in items {
            if cancel.is_cancelled() {
                tracing::info!("Cleanup cancelled after examining {}/{} items", scan.examined, total);
                scan.cancelled = true;
                break;
            }

            // Reported before counting the item, so the first value is always 0
            reporter.report_position(scan.examined, total);
            scan.examined += 1;

            let status = match self.file_size(item) {
                None => {
                    scan.skipped_missing += 1;
                    ItemStatus::SkippedMissing
                }
                Some(size) if self.threshold.is_below(size) => {
                    tracing::debug!(
                        "Marked small file for removal: {} ({:.2} MB)",
                        item.display_name(),
                        size as f64 / BYTES_PER_MEGABYTE as f64
                    );
                    ItemStatus::BelowThreshold { size }
                }
                Some(size) => ItemStatus::Kept { size },
            };

            scan.records.push(ItemRecord {
                item: item.clone(),
                status,
            });
        }

        scan
    }

    /// Byte length of the item's file, or `None` when it cannot be resolved
    fn file_size(&self, item: &CandidateItem) -> Option<u64> {
        let Some(path) = item.resolved_path() else {
            tracing::debug!("Skipping {}: no path", item.id);
            return None;
        };

        match fs::metadata(path) {
            Ok(metadata) if metadata.is_file() => Some(metadata.len()),
            Ok(_) => {
                tracing::debug!("Skipping {}: not a regular file", path.display());
                None
            }
            Err(e) => {
                tracing::debug!("Skipping {}: {}", path.display(), e);
                None
            }
        }
    }
}
