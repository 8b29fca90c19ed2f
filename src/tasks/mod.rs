//! Cleanup tasks run by the host
//!
//! Two entry points share one implementation: the post-scan task runs after
//! every library scan, the manual task when the user asks for it. Both
//! check the enabled flag and convert the configured size before handing a
//! [`Library`] to the cleaner.

use anyhow::Result;

use crate::cleaner::{CancellationToken, RunOutcome, SizeThresholdCleaner};
use crate::config::FilterConfig;
use crate::library::{DeleteOptions, Library};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupTask {
    /// Runs after a library scan
    PostScan,
    /// Runs on demand
    Manual,
}

impl CleanupTask {
    pub fn name(&self) -> &'static str {
        match self {
            CleanupTask::PostScan => "Clean up small files",
            CleanupTask::Manual => "File size filter",
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            CleanupTask::PostScan => "FileSizeCleanup",
            CleanupTask::Manual => "FileSizeFilter",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            CleanupTask::PostScan => "Remove files below the minimum size after a library scan",
            CleanupTask::Manual => "Remove media files below the minimum size from the library",
        }
    }

    /// Run the cleaner over `library` if the filter is enabled
    ///
    /// Returns `Ok(None)` when the filter is disabled. Only a failure to list
    /// the library's items is returned as an error; per-item removal
    /// failures are recorded in the outcome.
    pub fn execute<L: Library>(
        &self,
        config: &FilterConfig,
        library: &mut L,
        progress: Option<&mut dyn FnMut(f64)>,
        cancel: &CancellationToken,
    ) -> Result<Option<RunOutcome>> {
        if !config.enabled {
            match self {
                CleanupTask::PostScan => {
                    tracing::debug!("File size filter is disabled, skipping {}", self.key());
                }
                CleanupTask::Manual => {
                    tracing::info!("File size filter is disabled, skipping {}", self.key());
                    if let Some(progress) = progress {
                        progress(100.0);
                    }
                }
            }
            return Ok(None);
        }

        let threshold = config.threshold();
        tracing::info!(
            "{}: removing media files smaller than {} MB",
            self.name(),
            config.min_file_size_mb
        );

        let options = DeleteOptions {
            delete_file_location: config.library.delete_files,
        };
        let cleaner = SizeThresholdCleaner::new(threshold);

        let items = library.items();
        let outcome = cleaner
            .run_with_source(
                || items,
                |item| library.delete_item(item, &options),
                progress,
                cancel,
            )
            .inspect_err(|e| tracing::error!("{} failed: {:#}", self.name(), e))?;

        Ok(Some(outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleaner::{BYTES_PER_MEGABYTE, CandidateItem};
    use anyhow::anyhow;
    use std::fs;
    use tempfile::TempDir;

    /// In-memory catalog with scriptable failures
    #[derive(Default)]
    struct MemoryLibrary {
        items: Vec<CandidateItem>,
        unavailable: bool,
        locked: Vec<String>,
        deletes: Vec<(String, DeleteOptions)>,
    }

    impl Library for MemoryLibrary {
        fn items(&self) -> Result<Vec<CandidateItem>> {
            if self.unavailable {
                return Err(anyhow!("library database unavailable"));
            }
            Ok(self.items.clone())
        }

        fn delete_item(&mut self, item: &CandidateItem, options: &DeleteOptions) -> Result<()> {
            self.deletes.push((item.id.clone(), *options));
            if self.locked.contains(&item.id) {
                anyhow::bail!("{} is locked", item.id);
            }
            self.items.retain(|entry| entry.id != item.id);
            Ok(())
        }
    }

    fn library_with_files(dir: &std::path::Path, sizes_mb: &[(&str, u64)]) -> MemoryLibrary {
        let items = sizes_mb
            .iter()
            .map(|(name, mb)| {
                let path = dir.join(name);
                fs::File::create(&path)
                    .unwrap()
                    .set_len(mb * BYTES_PER_MEGABYTE)
                    .unwrap();
                CandidateItem::new(*name, path)
            })
            .collect();
        MemoryLibrary {
            items,
            ..MemoryLibrary::default()
        }
    }

    fn config(enabled: bool, min_file_size_mb: u32) -> FilterConfig {
        FilterConfig {
            enabled,
            min_file_size_mb,
            ..FilterConfig::default()
        }
    }

    #[test]
    fn test_task_identity() {
        assert_eq!(CleanupTask::PostScan.key(), "FileSizeCleanup");
        assert_eq!(CleanupTask::Manual.key(), "FileSizeFilter");
        assert_ne!(CleanupTask::PostScan.name(), CleanupTask::Manual.name());
    }

    #[test]
    fn test_disabled_manual_task_reports_complete() {
        let mut library = MemoryLibrary::default();
        let mut seen = Vec::new();
        let mut sink = |p: f64| seen.push(p);

        let outcome = CleanupTask::Manual
            .execute(&config(false, 100), &mut library, Some(&mut sink), &CancellationToken::new())
            .unwrap();

        assert!(outcome.is_none());
        assert_eq!(seen, vec![100.0]);
    }

    #[test]
    fn test_disabled_post_scan_task_is_silent() {
        let mut library = MemoryLibrary::default();
        let mut seen = Vec::new();
        let mut sink = |p: f64| seen.push(p);

        let outcome = CleanupTask::PostScan
            .execute(&config(false, 100), &mut library, Some(&mut sink), &CancellationToken::new())
            .unwrap();

        assert!(outcome.is_none());
        assert!(seen.is_empty());
    }

    #[test]
    fn test_enabled_task_removes_small_items() {
        let temp_dir = TempDir::new().unwrap();
        let mut library = library_with_files(temp_dir.path(), &[("a.mkv", 1), ("b.mkv", 3)]);

        let outcome = CleanupTask::PostScan
            .execute(&config(true, 2), &mut library, None, &CancellationToken::new())
            .unwrap()
            .expect("enabled task returns an outcome");

        assert_eq!(outcome.removed, 1);
        assert_eq!(library.items.len(), 1);
        assert_eq!(library.items[0].id, "b.mkv");
        assert_eq!(
            library.deletes,
            vec![("a.mkv".to_string(), DeleteOptions::default())]
        );
    }

    #[test]
    fn test_delete_files_option_is_forwarded() {
        let temp_dir = TempDir::new().unwrap();
        let mut library = library_with_files(temp_dir.path(), &[("a.mkv", 1)]);
        let mut config = config(true, 2);
        config.library.delete_files = true;

        CleanupTask::Manual
            .execute(&config, &mut library, None, &CancellationToken::new())
            .unwrap();

        assert!(library.deletes[0].1.delete_file_location);
    }

    #[test]
    fn test_locked_item_is_counted_not_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let mut library =
            library_with_files(temp_dir.path(), &[("a.mkv", 1), ("b.mkv", 1), ("c.mkv", 1)]);
        library.locked.push("a.mkv".to_string());

        let outcome = CleanupTask::Manual
            .execute(&config(true, 2), &mut library, None, &CancellationToken::new())
            .unwrap()
            .unwrap();

        assert_eq!(outcome.failed_to_remove, 1);
        assert_eq!(outcome.removed, 2);
        assert_eq!(library.deletes.len(), 3);
    }

    #[test]
    fn test_unavailable_library_is_fatal_after_progress_completes() {
        let mut library = MemoryLibrary {
            unavailable: true,
            ..MemoryLibrary::default()
        };
        let mut seen = Vec::new();
        let mut sink = |p: f64| seen.push(p);

        let result = CleanupTask::Manual.execute(
            &config(true, 100),
            &mut library,
            Some(&mut sink),
            &CancellationToken::new(),
        );

        assert!(result.is_err());
        assert_eq!(seen, vec![100.0]);
    }

    #[test]
    fn test_second_run_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let mut library = library_with_files(temp_dir.path(), &[("a.mkv", 1), ("b.mkv", 3)]);
        let config = config(true, 2);

        let first = CleanupTask::Manual
            .execute(&config, &mut library, None, &CancellationToken::new())
            .unwrap()
            .unwrap();
        let second = CleanupTask::Manual
            .execute(&config, &mut library, None, &CancellationToken::new())
            .unwrap()
            .unwrap();

        assert_eq!(first.removed, 1);
        assert_eq!(second.marked_for_removal, 0);
        assert_eq!(second.examined, 1);
    }
}
