//! Scan command implementation
//!
//! Rebuilds the catalog from the library root, then runs the post-scan
//! cleanup task.

use anyhow::{Context as _, Result};
use clap::Args;
use std::path::PathBuf;

use super::{load_config, report_outcome, run_task};
use crate::cli::Context;
use crate::library::{JsonLibrary, MediaMatcher};
use crate::tasks::CleanupTask;

#[derive(Args)]
pub struct ScanArgs {
    /// Library root to scan (defaults to library.root from config)
    #[arg(value_name = "ROOT")]
    pub root: Option<PathBuf>,

    /// Only rebuild the catalog; skip the size cleanup
    #[arg(long)]
    pub no_cleanup: bool,
}

pub async fn execute(args: ScanArgs, ctx: &Context) -> Result<()> {
    let output = &ctx.output;

    let overrides = serde_json::json!({
        "library": {
            "root": args.root.as_ref().map(|p| p.display().to_string()),
        }
    });
    let config = load_config(ctx, overrides)?;

    let root = config
        .library
        .root
        .as_deref()
        .context("No library root given; pass ROOT or set library.root in the config")?;
    // Catalog paths must not depend on the working directory
    let root = root
        .canonicalize()
        .with_context(|| format!("Library root not found: {}", root.display()))?;

    output.header(&format!("Scanning {}", root.display()));

    let matcher = MediaMatcher::new(&config.library.media_patterns)?;
    let mut library = JsonLibrary::open(&config.library.index_path)?;
    let summary = library.rescan(&root, &matcher)?;
    library.save()?;

    output.key_value("Added:", &summary.added.to_string(), summary.added > 0);
    output.key_value("Kept:", &summary.kept.to_string(), false);
    output.key_value("Dropped:", &summary.dropped.to_string(), false);
    output.success(&format!(
        "Catalog updated: {} items in {}",
        library.len(),
        library.path().display()
    ));

    if args.no_cleanup {
        output.verbose("Skipping size cleanup (--no-cleanup)");
        return Ok(());
    }

    let task = CleanupTask::PostScan;
    if let Some(outcome) = run_task(task, config, library, output).await? {
        output.category(task.name());
        report_outcome(task, &outcome, output);
    }

    Ok(())
}
